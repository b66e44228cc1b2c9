// Gameplay tuning tables.
//
// Keep this separate from runtime/server configuration (ports, channel sizes, file paths).

pub mod arena;
pub mod boat;
pub mod cannon;
pub mod mine;
pub mod powerup;
pub mod ram;

pub use arena::{ArenaTuning, BountyTuning, PLAYER_COLORS};
pub use boat::{BoatTuning, DashTuning};
pub use cannon::{CannonTuning, ChargeAuthority};
pub use mine::MineTuning;
pub use powerup::PowerupTuning;
pub use ram::RamTuning;

/// Every gameplay parameter a room simulates with.
#[derive(Debug, Clone, Default)]
pub struct Tuning {
    pub arena: ArenaTuning,
    pub boat: BoatTuning,
    pub dash: DashTuning,
    pub cannon: CannonTuning,
    pub powerup: PowerupTuning,
    pub mine: MineTuning,
    pub ram: RamTuning,
    pub bounty: BountyTuning,
}

impl Tuning {
    /// Fixed simulation step in seconds.
    pub fn dt(&self) -> f32 {
        1.0 / self.arena.tick_rate
    }
}
