// Gameplay tuning for charged cannon fire and projectile ballistics.
use std::f32::consts::PI;

/// Which side decides how charged a released shot was.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChargeAuthority {
    /// Use the client-declared charge fraction when one was sent.
    Client,
    /// Always derive the charge from the server's own charge-start tick.
    Server,
}

#[derive(Debug, Clone, Copy)]
pub struct CannonTuning {
    /// Launch speed at zero and full charge.
    pub min_launch_speed: f32,
    pub max_launch_speed: f32,

    /// Seconds of holding fire to reach full charge.
    pub charge_time: f32,

    /// Seconds between shots.
    pub cooldown: f32,

    /// Launch elevation in radians.
    pub launch_angle: f32,

    /// Downward acceleration applied to projectile vertical velocity.
    pub gravity: f32,

    /// Altitude projectiles spawn at.
    pub spawn_height: f32,

    /// Projectiles spawn this fraction of the boat length ahead of center.
    pub bow_offset: f32,

    /// Heading offset of the side shots while trishot is active.
    pub trishot_spread: f32,

    pub direct_radius: f32,
    pub direct_damage: f32,
    pub splash_radius: f32,
    pub splash_damage: f32,

    /// Altitude band (exclusive) in which projectiles can hit boats.
    pub boat_band_low: f32,
    pub boat_band_high: f32,

    /// Projectiles below this altitude can strike islands.
    pub island_height: f32,

    pub charge_authority: ChargeAuthority,
}

impl CannonTuning {
    /// Launch speed for a charge fraction; out-of-range fractions are clamped.
    pub fn launch_speed(&self, power: f32) -> f32 {
        let power = power.clamp(0.0, 1.0);
        self.min_launch_speed + power * (self.max_launch_speed - self.min_launch_speed)
    }
}

impl Default for CannonTuning {
    fn default() -> Self {
        Self {
            min_launch_speed: 200.0,
            max_launch_speed: 600.0,
            charge_time: 2.0,
            cooldown: 1.0,
            launch_angle: PI / 10.0,
            gravity: 100.0,
            spawn_height: 3.0,
            bow_offset: 0.6,
            trishot_spread: 0.15,
            direct_radius: 20.0,
            direct_damage: 100.0,
            splash_radius: 50.0,
            splash_damage: 50.0,
            boat_band_low: -1.0,
            boat_band_high: 15.0,
            island_height: 12.0,
            charge_authority: ChargeAuthority::Client,
        }
    }
}
