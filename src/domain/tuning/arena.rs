// Map, lifecycle and room-level gameplay tuning.

/// Boat colors handed out by lowest free slot.
pub const PLAYER_COLORS: [u32; 16] = [
    0xe74c3c, 0x3498db, 0x2ecc71, 0xf39c12, 0x9b59b6, 0x1abc9c, 0xe67e22, 0xecf0f1, 0xff6b81,
    0x7bed9f, 0x00bcd4, 0xff5722, 0x8bc34a, 0x673ab7, 0xffc107, 0x795548,
];

#[derive(Debug, Clone, Copy)]
pub struct ArenaTuning {
    /// Edge length of the square map in world units.
    pub map_size: f32,

    /// Boats are clamped this far inside the map edge.
    pub boundary_margin: f32,

    /// Speed multiplier applied when a boat is clamped at the map edge.
    pub wall_bounce: f32,

    /// Simulation ticks per second.
    pub tick_rate: f32,

    /// Maximum players per room.
    pub max_players: usize,

    pub max_hp: f32,

    /// Seconds a sunk boat waits before respawning.
    pub respawn_seconds: f32,

    /// Score granted for every kill.
    pub kill_score: u32,

    /// Island count is drawn uniformly from this inclusive range.
    pub island_count_min: u32,
    pub island_count_max: u32,
    pub island_radius_min: f32,
    pub island_radius_max: f32,

    /// Islands are placed within +-(spread * map_size).
    pub island_spread: f32,

    /// Extra gap required between island shores.
    pub island_separation: f32,

    /// Hit points lost per tick spent grinding against an island.
    pub island_penalty: f32,

    /// Speed multiplier applied when a boat is pushed off an island.
    pub island_bounce: f32,

    /// Spawn points are sampled within +-(spread * map_size).
    pub spawn_spread: f32,

    /// Minimum distance from any island shore to a spawn point.
    pub spawn_clearance: f32,

    /// Rejection-sampling caps.
    pub island_attempts: u32,
    pub spawn_attempts: u32,
}

impl ArenaTuning {
    pub fn map_half(&self) -> f32 {
        self.map_size / 2.0
    }
}

impl Default for ArenaTuning {
    fn default() -> Self {
        Self {
            map_size: 5000.0,
            boundary_margin: 20.0,
            wall_bounce: -0.5,
            tick_rate: 20.0,
            max_players: 16,
            max_hp: 100.0,
            respawn_seconds: 9.0,
            kill_score: 100,
            island_count_min: 5,
            island_count_max: 8,
            island_radius_min: 30.0,
            island_radius_max: 90.0,
            island_spread: 0.35,
            island_separation: 40.0,
            island_penalty: 5.0,
            island_bounce: -0.3,
            spawn_spread: 0.3,
            spawn_clearance: 50.0,
            island_attempts: 200,
            spawn_attempts: 100,
        }
    }
}

/// King/bounty rules.
#[derive(Debug, Clone, Copy)]
pub struct BountyTuning {
    /// Kills required before a player can be crowned.
    pub min_kills: u32,

    /// Extra score for sinking the current king.
    pub kill_bonus: u32,
}

impl Default for BountyTuning {
    fn default() -> Self {
        Self {
            min_kills: 3,
            kill_bonus: 100,
        }
    }
}
