// Network adapter modules split by client sockets vs plain HTTP routes.

pub mod client;
pub mod internal;

pub use client::{open_room, ws_handler};
pub use internal::{create_room_handler, list_rooms_handler, ranking_handler};
