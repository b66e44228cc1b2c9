/// Gameplay tuning for boat-to-boat ramming.

#[derive(Debug, Clone, Copy)]
pub struct RamTuning {
    /// Collision radius per boat; two boats touch at twice this distance.
    pub collision_radius: f32,

    /// Closing speed along the contact normal required to deal damage.
    pub min_relative_speed: f32,

    /// Damage per unit of closing speed.
    pub damage_factor: f32,

    pub max_damage: f32,
    pub knockback_force: f32,

    /// Seconds before the same pair can damage each other again.
    pub cooldown: f32,

    /// Damage multiplier when either boat is dashing.
    pub dash_multiplier: f32,

    /// Share of the damage taken by the slower and the faster boat.
    pub slower_ratio: f32,
    pub faster_ratio: f32,
}

impl Default for RamTuning {
    fn default() -> Self {
        Self {
            collision_radius: 8.0,
            min_relative_speed: 40.0,
            damage_factor: 0.4,
            max_damage: 80.0,
            knockback_force: 120.0,
            cooldown: 1.0,
            dash_multiplier: 1.5,
            slower_ratio: 0.65,
            faster_ratio: 0.35,
        }
    }
}
