// Gameplay tuning for power-up spawning and buffs.
use crate::domain::state::PowerupKind;

#[derive(Debug, Clone, Copy)]
pub struct PowerupTuning {
    /// Seconds of room time between spawn attempts.
    pub spawn_interval: f32,

    /// Cap on simultaneously floating power-ups.
    pub max_active: usize,

    /// Pickup radius (the boat width is added on top).
    pub radius: f32,

    /// Hit points restored by a health pickup.
    pub heal: f32,

    /// Buff durations in seconds.
    pub speed_duration: f32,
    pub trishot_duration: f32,
    pub shield_duration: f32,
}

impl PowerupTuning {
    /// Buff duration for a kind; health is instant and has none.
    pub fn duration(&self, kind: PowerupKind) -> f32 {
        match kind {
            PowerupKind::Health => 0.0,
            PowerupKind::Speed => self.speed_duration,
            PowerupKind::Trishot => self.trishot_duration,
            PowerupKind::Shield => self.shield_duration,
        }
    }
}

impl Default for PowerupTuning {
    fn default() -> Self {
        Self {
            spawn_interval: 8.0,
            max_active: 6,
            radius: 8.0,
            heal: 40.0,
            speed_duration: 6.0,
            trishot_duration: 8.0,
            shield_duration: 5.0,
        }
    }
}
