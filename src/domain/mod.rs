// Domain layer: core simulation types and rules.

pub mod events;
pub mod geometry;
pub mod interpolation;
pub mod king;
pub mod leaderboard;
pub mod ports;
pub mod state;
pub mod systems;
pub mod tuning;
pub mod world;

#[cfg(test)]
pub(crate) mod test_support;

pub use events::RoomEvent;
pub use state::{PlayerId, PlayerInput, PowerupKind, WorldSnapshot};
pub use world::{JoinRejected, TickOutcome, World};
