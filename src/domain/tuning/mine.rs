/// Gameplay tuning for dropped mines.

#[derive(Debug, Clone, Copy)]
pub struct MineTuning {
    /// Seconds between drops.
    pub cooldown: f32,

    /// Seconds before an untouched mine disappears.
    pub lifetime: f32,

    pub damage: f32,
    pub radius: f32,

    /// The owner cannot trigger a fresh mine for this many seconds.
    pub owner_arming_time: f32,

    /// Mines drop this fraction of the boat length behind center.
    pub stern_offset: f32,
}

impl Default for MineTuning {
    fn default() -> Self {
        Self {
            cooldown: 30.0,
            lifetime: 180.0,
            damage: 100.0,
            radius: 8.0,
            owner_arming_time: 1.5,
            stern_offset: 0.6,
        }
    }
}
