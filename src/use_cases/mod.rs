// Use cases layer: application workflows for the arena server.

pub mod directory;
pub mod ranking;
pub mod room;
pub mod types;

pub use directory::{RoomDirectory, RoomError, RoomHandle, RoomSettings};
pub use ranking::{RankingError, RankingService};
pub use types::{Departure, LobbyNotice, RoomCommand, RoomSummary, RoomUpdate, Welcome};
