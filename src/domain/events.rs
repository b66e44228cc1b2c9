// Outbound room events queued during a tick and flushed once at tick end.

use super::state::{PlayerId, PowerupKind};

#[derive(Debug, Clone, PartialEq)]
pub enum RoomEvent {
    Fire {
        player_id: PlayerId,
        x: f32,
        z: f32,
        angle: f32,
        power: f32,
        trishot: bool,
    },
    /// Projectile impact; `target_id` is `None` for water and island splashes.
    Hit {
        x: f32,
        z: f32,
        target_id: Option<PlayerId>,
        shooter_id: PlayerId,
        damage: f32,
    },
    Dash {
        player_id: PlayerId,
        x: f32,
        z: f32,
        angle: f32,
    },
    MineDrop {
        player_id: PlayerId,
        x: f32,
        z: f32,
    },
    MineExplode {
        x: f32,
        z: f32,
        target_id: PlayerId,
    },
    ShieldBreak {
        player_id: PlayerId,
        x: f32,
        z: f32,
    },
    /// `player_a` is the rammer (the faster boat).
    Ram {
        x: f32,
        z: f32,
        player_a: PlayerId,
        player_b: PlayerId,
        intensity: f32,
    },
    Kill {
        victim_id: PlayerId,
        victim_name: String,
        killer_id: Option<PlayerId>,
        killer_name: Option<String>,
        is_king_kill: bool,
    },
    KingChange {
        new_king_id: Option<PlayerId>,
        new_king_name: Option<String>,
        prev_king_id: Option<PlayerId>,
    },
    PlayerJoined {
        id: PlayerId,
        name: String,
        color: u32,
    },
    PlayerLeft {
        id: PlayerId,
    },
    PowerupSpawn {
        id: u64,
        x: f32,
        z: f32,
        kind: PowerupKind,
    },
    PowerupPickup {
        id: u64,
        player_id: PlayerId,
        kind: PowerupKind,
    },
}
