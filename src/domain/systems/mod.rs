// Per-phase simulation rules. Free functions work on a single boat; the phases that
// touch several entities at once extend `World` directly.

pub mod combat;
pub mod firing;
pub mod islands;
pub mod mines;
pub mod movement;
pub mod powerups;
pub mod projectiles;
pub mod ramming;
