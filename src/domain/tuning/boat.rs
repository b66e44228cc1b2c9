/// Gameplay tuning for boat movement.

#[derive(Debug, Clone, Copy)]
pub struct BoatTuning {
    /// Maximum forward speed in units per second.
    pub max_speed: f32,

    /// Forward acceleration in units per second squared.
    pub acceleration: f32,

    /// Reverse acceleration in units per second squared.
    pub reverse_acceleration: f32,

    /// Per-tick speed retention, normalized to the tick rate.
    pub drag: f32,

    /// Speeds below this snap to zero after drag.
    pub stop_threshold: f32,

    /// Reverse speed cap as a fraction of the forward cap.
    pub reverse_fraction: f32,

    /// Turn rate in radians per second at full speed.
    pub angular_speed: f32,

    /// Fraction of the turn rate available at a standstill.
    pub min_turn_fraction: f32,

    pub length: f32,
    pub width: f32,

    /// Speed-buff multipliers.
    pub speed_buff_acceleration: f32,
    pub speed_buff_max_speed: f32,
}

impl Default for BoatTuning {
    fn default() -> Self {
        Self {
            max_speed: 120.0,
            acceleration: 60.0,
            reverse_acceleration: 30.0,
            drag: 0.98,
            stop_threshold: 0.5,
            reverse_fraction: 0.3,
            angular_speed: 1.0,
            min_turn_fraction: 0.3,
            length: 12.0,
            width: 5.0,
            speed_buff_acceleration: 1.6,
            speed_buff_max_speed: 1.5,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct DashTuning {
    /// Speed forced while a dash is active.
    pub speed: f32,

    /// Dash length in seconds.
    pub duration: f32,

    /// Seconds from dash start until the next dash is allowed.
    pub cooldown: f32,

    /// A boat must be moving faster than this to dash.
    pub min_speed: f32,
}

impl Default for DashTuning {
    fn default() -> Self {
        Self {
            speed: 250.0,
            duration: 0.4,
            cooldown: 5.0,
            min_speed: 5.0,
        }
    }
}
