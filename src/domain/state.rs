// Domain-level simulation entities and input/snapshot types.

use std::collections::HashMap;

/// Connection-scoped player identity.
pub type PlayerId = u64;

/// Timers closer to zero than this are treated as expired (absorbs f32 step error).
const TIMER_EPSILON: f32 = 1e-4;

/// Counts a timer down by `dt`, clamping at zero.
pub fn countdown(remaining: f32, dt: f32) -> f32 {
    let left = remaining - dt;
    if left <= TIMER_EPSILON { 0.0 } else { left }
}

/// Latest control state received from a client. Overwritten, never queued.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PlayerInput {
    pub forward: bool,
    pub backward: bool,
    pub left: bool,
    pub right: bool,
    pub shoot: bool,
    pub dash: bool,
    pub mine: bool,
    /// Client-declared charge in [0, 1]; `None` when absent or unusable.
    pub charge_fraction: Option<f32>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Lifecycle {
    Alive,
    Dead { respawn_timer: f32 },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DashState {
    Ready,
    /// Dashing; `cooldown` keeps running underneath.
    Active { remaining: f32, cooldown: f32 },
    Cooling { remaining: f32 },
}

impl DashState {
    pub fn is_active(&self) -> bool {
        matches!(self, DashState::Active { .. })
    }

    /// Seconds until another dash is allowed.
    pub fn cooldown_remaining(&self) -> f32 {
        match *self {
            DashState::Ready => 0.0,
            DashState::Active { cooldown, .. } => cooldown,
            DashState::Cooling { remaining } => remaining,
        }
    }

    pub fn advance(self, dt: f32) -> Self {
        match self {
            DashState::Ready => DashState::Ready,
            DashState::Active {
                remaining,
                cooldown,
            } => {
                let remaining = countdown(remaining, dt);
                let cooldown = countdown(cooldown, dt);
                if remaining > 0.0 {
                    DashState::Active {
                        remaining,
                        cooldown,
                    }
                } else {
                    DashState::cooling(cooldown)
                }
            }
            DashState::Cooling { remaining } => DashState::cooling(countdown(remaining, dt)),
        }
    }

    /// Ends an active dash early; the cooldown is kept.
    pub fn cancel(self) -> Self {
        match self {
            DashState::Active { cooldown, .. } => DashState::cooling(cooldown),
            other => other,
        }
    }

    fn cooling(remaining: f32) -> Self {
        if remaining > 0.0 {
            DashState::Cooling { remaining }
        } else {
            DashState::Ready
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PowerupKind {
    Health,
    Speed,
    Trishot,
    Shield,
}

impl PowerupKind {
    pub const ALL: [PowerupKind; 4] = [
        PowerupKind::Health,
        PowerupKind::Speed,
        PowerupKind::Trishot,
        PowerupKind::Shield,
    ];
}

/// Remaining buff durations in seconds; a buff is active while its timer is > 0.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Buffs {
    pub speed: f32,
    pub trishot: f32,
    pub shield: f32,
}

impl Buffs {
    pub fn advance(&mut self, dt: f32) {
        self.speed = countdown(self.speed, dt);
        self.trishot = countdown(self.trishot, dt);
        self.shield = countdown(self.shield, dt);
    }

    pub fn grant(&mut self, kind: PowerupKind, duration: f32) {
        match kind {
            PowerupKind::Health => {}
            PowerupKind::Speed => self.speed = duration,
            PowerupKind::Trishot => self.trishot = duration,
            PowerupKind::Shield => self.shield = duration,
        }
    }

    pub fn speed_active(&self) -> bool {
        self.speed > 0.0
    }

    pub fn trishot_active(&self) -> bool {
        self.trishot > 0.0
    }

    pub fn shield_active(&self) -> bool {
        self.shield > 0.0
    }
}

#[derive(Debug, Clone)]
pub struct Player {
    pub id: PlayerId,
    pub name: String,
    pub color: u32,
    pub color_index: usize,

    pub x: f32,
    pub z: f32,
    /// Radians; 0 faces +Z.
    pub heading: f32,
    /// Signed speed along the heading.
    pub speed: f32,
    pub vx: f32,
    pub vz: f32,

    pub hp: f32,
    pub lifecycle: Lifecycle,
    pub score: u32,
    pub kills: u32,
    pub deaths: u32,

    pub input: PlayerInput,

    // Cannon charge tracking.
    pub was_shooting: bool,
    pub charge_start: f32,

    pub fire_cooldown: f32,
    pub mine_cooldown: f32,
    pub dash: DashState,
    pub buffs: Buffs,

    /// Room time of the last ram evaluation against each opponent.
    pub ram_cooldowns: HashMap<PlayerId, f32>,
}

impl Player {
    pub fn new(id: PlayerId, name: String, color_index: usize, color: u32, max_hp: f32) -> Self {
        Self {
            id,
            name,
            color,
            color_index,
            x: 0.0,
            z: 0.0,
            heading: 0.0,
            speed: 0.0,
            vx: 0.0,
            vz: 0.0,
            hp: max_hp,
            lifecycle: Lifecycle::Alive,
            score: 0,
            kills: 0,
            deaths: 0,
            input: PlayerInput::default(),
            was_shooting: false,
            charge_start: 0.0,
            fire_cooldown: 0.0,
            mine_cooldown: 0.0,
            dash: DashState::Ready,
            buffs: Buffs::default(),
            ram_cooldowns: HashMap::new(),
        }
    }

    pub fn is_alive(&self) -> bool {
        matches!(self.lifecycle, Lifecycle::Alive)
    }

    /// Recomputes velocity from speed and heading.
    pub fn sync_velocity(&mut self) {
        self.vx = self.heading.sin() * self.speed;
        self.vz = self.heading.cos() * self.speed;
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Projectile {
    pub id: u64,
    pub owner_id: PlayerId,
    pub x: f32,
    /// Altitude above the water plane.
    pub y: f32,
    pub z: f32,
    pub vx: f32,
    pub vy: f32,
    pub vz: f32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Mine {
    pub id: u64,
    pub owner_id: PlayerId,
    pub x: f32,
    pub z: f32,
    /// Room time the mine was dropped.
    pub spawned_at: f32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Powerup {
    pub id: u64,
    pub x: f32,
    pub z: f32,
    pub kind: PowerupKind,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Island {
    pub x: f32,
    pub z: f32,
    pub radius: f32,
}

#[derive(Debug, Clone)]
pub struct PlayerSnapshot {
    pub id: PlayerId,
    pub name: String,
    pub color: u32,
    pub x: f32,
    pub z: f32,
    pub angle: f32,
    pub speed: f32,
    pub hp: f32,
    pub alive: bool,
    pub score: u32,
    pub kills: u32,
    pub deaths: u32,
    pub dashing: bool,
    pub dash_cooldown: f32,
    pub speed_buff: bool,
    pub trishot_buff: bool,
    pub shield_buff: bool,
}

#[derive(Debug, Clone)]
pub struct ProjectileSnapshot {
    pub id: u64,
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

#[derive(Debug, Clone)]
pub struct MineSnapshot {
    pub id: u64,
    pub owner_id: PlayerId,
    pub x: f32,
    pub z: f32,
}

/// Full authoritative room state for one tick.
#[derive(Debug, Clone)]
pub struct WorldSnapshot {
    pub tick: u64,
    pub king_id: Option<PlayerId>,
    pub players: Vec<PlayerSnapshot>,
    pub projectiles: Vec<ProjectileSnapshot>,
    pub mines: Vec<MineSnapshot>,
    pub powerups: Vec<Powerup>,
}

impl From<&Player> for PlayerSnapshot {
    fn from(p: &Player) -> Self {
        Self {
            id: p.id,
            name: p.name.clone(),
            color: p.color,
            x: p.x,
            z: p.z,
            angle: p.heading,
            speed: p.speed,
            hp: p.hp,
            alive: p.is_alive(),
            score: p.score,
            kills: p.kills,
            deaths: p.deaths,
            dashing: p.dash.is_active(),
            dash_cooldown: p.dash.cooldown_remaining(),
            speed_buff: p.buffs.speed_active(),
            trishot_buff: p.buffs.trishot_active(),
            shield_buff: p.buffs.shield_active(),
        }
    }
}

impl From<&Projectile> for ProjectileSnapshot {
    fn from(p: &Projectile) -> Self {
        Self {
            id: p.id,
            x: p.x,
            y: p.y,
            z: p.z,
        }
    }
}

impl From<&Mine> for MineSnapshot {
    fn from(m: &Mine) -> Self {
        Self {
            id: m.id,
            owner_id: m.owner_id,
            x: m.x,
            z: m.z,
        }
    }
}
