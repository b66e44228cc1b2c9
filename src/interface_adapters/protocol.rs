// Wire protocol DTOs and conversions for public arena server messages.
// Every frame is `{"type": <camelCase name>, "data": <payload>}`; payload fields are camelCase.

use crate::domain::leaderboard::RankingEntry;
use crate::domain::state::{Island, MineSnapshot, PlayerSnapshot, Powerup, ProjectileSnapshot};
use crate::domain::{PlayerInput, PowerupKind, RoomEvent, WorldSnapshot};
use crate::use_cases::{RoomSummary, Welcome};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Messages the client sends to the server over the WebSocket.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "camelCase")]
pub enum ClientMessage {
    CreateRoom(CreateRoomPayload),
    JoinRoom(JoinRoomPayload),
    LeaveRoom,
    GetRooms,
    GetRanking,
    Input(PlayerInputDto),
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateRoomPayload {
    #[serde(default)]
    pub room_name: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JoinRoomPayload {
    #[serde(default)]
    pub room_name: String,
    #[serde(default)]
    pub name: Option<String>,
}

/// Control state sent by the client at its own input rate.
///
/// Fields are read leniently: flags take the truthiness of whatever was sent and a
/// charge fraction that is not a number counts as absent.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerInputDto {
    #[serde(default, deserialize_with = "truthy")]
    pub forward: bool,
    #[serde(default, deserialize_with = "truthy")]
    pub backward: bool,
    #[serde(default, deserialize_with = "truthy")]
    pub left: bool,
    #[serde(default, deserialize_with = "truthy")]
    pub right: bool,
    #[serde(default, deserialize_with = "truthy")]
    pub shoot: bool,
    #[serde(default, deserialize_with = "truthy")]
    pub dash: bool,
    #[serde(default, deserialize_with = "truthy")]
    pub mine: bool,
    #[serde(default, deserialize_with = "number_or_none")]
    pub charge_fraction: Option<f32>,
}

fn truthy<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Null => false,
        Value::Bool(b) => b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    })
}

fn number_or_none<'de, D>(deserializer: D) -> Result<Option<f32>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Number(n) => n.as_f64().map(|f| f as f32),
        _ => None,
    })
}

impl From<PlayerInputDto> for PlayerInput {
    fn from(input: PlayerInputDto) -> Self {
        Self {
            forward: input.forward,
            backward: input.backward,
            left: input.left,
            right: input.right,
            shoot: input.shoot,
            dash: input.dash,
            mine: input.mine,
            // Non-finite claims are treated as absent; range is clamped at fire time.
            charge_fraction: input.charge_fraction.filter(|f| f.is_finite()),
        }
    }
}

/// Messages the server sends to connected clients over the WebSocket.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", content = "data", rename_all = "camelCase")]
pub enum ServerMessage {
    Welcome(WelcomeDto),
    State(StateDto),
    Fire(FireDto),
    Hit(HitDto),
    Dash(DashDto),
    MineDrop(MineDropDto),
    MineExplode(MineExplodeDto),
    ShieldBreak(ShieldBreakDto),
    Ram(RamDto),
    Kill(KillDto),
    KingChange(KingChangeDto),
    PlayerJoined(PlayerJoinedDto),
    PlayerLeft(PlayerLeftDto),
    PowerupSpawn(PowerupDto),
    PowerupPickup(PowerupPickupDto),
    RoomList(Vec<RoomSummaryDto>),
    RoomError(RoomErrorDto),
    Ranking(Vec<RankingEntry>),
    CreateRoomResult(CreateRoomResultDto),
}

fn wire_id(id: u64) -> String {
    id.to_string()
}

#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PowerupKindDto {
    Health,
    Speed,
    Trishot,
    Shield,
}

impl From<PowerupKind> for PowerupKindDto {
    fn from(kind: PowerupKind) -> Self {
        match kind {
            PowerupKind::Health => PowerupKindDto::Health,
            PowerupKind::Speed => PowerupKindDto::Speed,
            PowerupKind::Trishot => PowerupKindDto::Trishot,
            PowerupKind::Shield => PowerupKindDto::Shield,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct IslandDto {
    pub x: f32,
    pub z: f32,
    pub radius: f32,
}

impl From<&Island> for IslandDto {
    fn from(island: &Island) -> Self {
        Self {
            x: island.x,
            z: island.z,
            radius: island.radius,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PowerupDto {
    pub id: String,
    pub x: f32,
    pub z: f32,
    #[serde(rename = "type")]
    pub kind: PowerupKindDto,
}

impl From<&Powerup> for PowerupDto {
    fn from(powerup: &Powerup) -> Self {
        Self {
            id: wire_id(powerup.id),
            x: powerup.x,
            z: powerup.z,
            kind: powerup.kind.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WelcomeDto {
    pub id: String,
    pub room_name: String,
    pub islands: Vec<IslandDto>,
    pub map_size: f32,
    pub powerups: Vec<PowerupDto>,
}

impl From<&Welcome> for WelcomeDto {
    fn from(welcome: &Welcome) -> Self {
        Self {
            id: wire_id(welcome.player_id),
            room_name: welcome.room_name.to_string(),
            islands: welcome.islands.iter().map(IslandDto::from).collect(),
            map_size: welcome.map_size,
            powerups: welcome.powerups.iter().map(PowerupDto::from).collect(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct BuffsDto {
    pub speed: bool,
    pub trishot: bool,
    pub shield: bool,
}

/// Per-player state as drawn by clients.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerStateDto {
    pub id: String,
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
    pub buffs: BuffsDto,
}

impl From<&PlayerSnapshot> for PlayerStateDto {
    fn from(p: &PlayerSnapshot) -> Self {
        Self {
            id: wire_id(p.id),
            name: p.name.clone(),
            color: p.color,
            x: p.x,
            z: p.z,
            angle: p.angle,
            speed: p.speed,
            hp: p.hp,
            alive: p.alive,
            score: p.score,
            kills: p.kills,
            deaths: p.deaths,
            dashing: p.dashing,
            dash_cooldown: p.dash_cooldown,
            buffs: BuffsDto {
                speed: p.speed_buff,
                trishot: p.trishot_buff,
                shield: p.shield_buff,
            },
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ProjectileStateDto {
    pub id: String,
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl From<&ProjectileSnapshot> for ProjectileStateDto {
    fn from(p: &ProjectileSnapshot) -> Self {
        Self {
            id: wire_id(p.id),
            x: p.x,
            y: p.y,
            z: p.z,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MineStateDto {
    pub id: String,
    pub owner_id: String,
    pub x: f32,
    pub z: f32,
}

impl From<&MineSnapshot> for MineStateDto {
    fn from(m: &MineSnapshot) -> Self {
        Self {
            id: wire_id(m.id),
            owner_id: wire_id(m.owner_id),
            x: m.x,
            z: m.z,
        }
    }
}

/// Full authoritative snapshot sent every tick.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StateDto {
    pub tick: u64,
    pub king_id: Option<String>,
    pub players: Vec<PlayerStateDto>,
    pub projectiles: Vec<ProjectileStateDto>,
    pub mines: Vec<MineStateDto>,
    pub powerups: Vec<PowerupDto>,
}

impl From<&WorldSnapshot> for StateDto {
    fn from(snapshot: &WorldSnapshot) -> Self {
        Self {
            tick: snapshot.tick,
            king_id: snapshot.king_id.map(wire_id),
            players: snapshot.players.iter().map(PlayerStateDto::from).collect(),
            projectiles: snapshot
                .projectiles
                .iter()
                .map(ProjectileStateDto::from)
                .collect(),
            mines: snapshot.mines.iter().map(MineStateDto::from).collect(),
            powerups: snapshot.powerups.iter().map(PowerupDto::from).collect(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FireDto {
    pub player_id: String,
    pub x: f32,
    pub z: f32,
    pub angle: f32,
    pub power: f32,
    pub trishot: bool,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HitDto {
    pub x: f32,
    pub z: f32,
    pub target_id: Option<String>,
    pub shooter_id: String,
    pub damage: f32,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashDto {
    pub player_id: String,
    pub x: f32,
    pub z: f32,
    pub angle: f32,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MineDropDto {
    pub player_id: String,
    pub x: f32,
    pub z: f32,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MineExplodeDto {
    pub x: f32,
    pub z: f32,
    pub target_id: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ShieldBreakDto {
    pub player_id: String,
    pub x: f32,
    pub z: f32,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RamDto {
    pub x: f32,
    pub z: f32,
    pub player_a: String,
    pub player_b: String,
    pub intensity: f32,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct KillDto {
    pub victim_id: String,
    pub victim_name: String,
    pub killer_id: Option<String>,
    pub killer_name: Option<String>,
    pub is_king_kill: bool,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct KingChangeDto {
    pub new_king_id: Option<String>,
    pub new_king_name: Option<String>,
    pub prev_king_id: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PlayerJoinedDto {
    pub id: String,
    pub name: String,
    pub color: u32,
}

#[derive(Debug, Clone, Serialize)]
pub struct PlayerLeftDto {
    pub id: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PowerupPickupDto {
    pub id: String,
    pub player_id: String,
    #[serde(rename = "type")]
    pub kind: PowerupKindDto,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomSummaryDto {
    pub name: String,
    pub players: usize,
    pub max_players: usize,
}

impl From<&RoomSummary> for RoomSummaryDto {
    fn from(room: &RoomSummary) -> Self {
        Self {
            name: room.name.clone(),
            players: room.players,
            max_players: room.max_players,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct RoomErrorDto {
    pub message: String,
}

/// Reply to `createRoom`: `ok` with the normalised name, or an error message.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateRoomResultDto {
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub room_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ServerMessage {
    pub fn room_list(rooms: &[RoomSummary]) -> Self {
        ServerMessage::RoomList(rooms.iter().map(RoomSummaryDto::from).collect())
    }

    pub fn room_error(message: impl Into<String>) -> Self {
        ServerMessage::RoomError(RoomErrorDto {
            message: message.into(),
        })
    }
}

impl From<&RoomEvent> for ServerMessage {
    fn from(event: &RoomEvent) -> Self {
        match event {
            RoomEvent::Fire {
                player_id,
                x,
                z,
                angle,
                power,
                trishot,
            } => ServerMessage::Fire(FireDto {
                player_id: wire_id(*player_id),
                x: *x,
                z: *z,
                angle: *angle,
                power: *power,
                trishot: *trishot,
            }),
            RoomEvent::Hit {
                x,
                z,
                target_id,
                shooter_id,
                damage,
            } => ServerMessage::Hit(HitDto {
                x: *x,
                z: *z,
                target_id: target_id.map(wire_id),
                shooter_id: wire_id(*shooter_id),
                damage: *damage,
            }),
            RoomEvent::Dash {
                player_id,
                x,
                z,
                angle,
            } => ServerMessage::Dash(DashDto {
                player_id: wire_id(*player_id),
                x: *x,
                z: *z,
                angle: *angle,
            }),
            RoomEvent::MineDrop { player_id, x, z } => ServerMessage::MineDrop(MineDropDto {
                player_id: wire_id(*player_id),
                x: *x,
                z: *z,
            }),
            RoomEvent::MineExplode { x, z, target_id } => {
                ServerMessage::MineExplode(MineExplodeDto {
                    x: *x,
                    z: *z,
                    target_id: wire_id(*target_id),
                })
            }
            RoomEvent::ShieldBreak { player_id, x, z } => {
                ServerMessage::ShieldBreak(ShieldBreakDto {
                    player_id: wire_id(*player_id),
                    x: *x,
                    z: *z,
                })
            }
            RoomEvent::Ram {
                x,
                z,
                player_a,
                player_b,
                intensity,
            } => ServerMessage::Ram(RamDto {
                x: *x,
                z: *z,
                player_a: wire_id(*player_a),
                player_b: wire_id(*player_b),
                intensity: *intensity,
            }),
            RoomEvent::Kill {
                victim_id,
                victim_name,
                killer_id,
                killer_name,
                is_king_kill,
            } => ServerMessage::Kill(KillDto {
                victim_id: wire_id(*victim_id),
                victim_name: victim_name.clone(),
                killer_id: killer_id.map(wire_id),
                killer_name: killer_name.clone(),
                is_king_kill: *is_king_kill,
            }),
            RoomEvent::KingChange {
                new_king_id,
                new_king_name,
                prev_king_id,
            } => ServerMessage::KingChange(KingChangeDto {
                new_king_id: new_king_id.map(wire_id),
                new_king_name: new_king_name.clone(),
                prev_king_id: prev_king_id.map(wire_id),
            }),
            RoomEvent::PlayerJoined { id, name, color } => {
                ServerMessage::PlayerJoined(PlayerJoinedDto {
                    id: wire_id(*id),
                    name: name.clone(),
                    color: *color,
                })
            }
            RoomEvent::PlayerLeft { id } => {
                ServerMessage::PlayerLeft(PlayerLeftDto { id: wire_id(*id) })
            }
            RoomEvent::PowerupSpawn { id, x, z, kind } => ServerMessage::PowerupSpawn(PowerupDto {
                id: wire_id(*id),
                x: *x,
                z: *z,
                kind: (*kind).into(),
            }),
            RoomEvent::PowerupPickup {
                id,
                player_id,
                kind,
            } => ServerMessage::PowerupPickup(PowerupPickupDto {
                id: wire_id(*id),
                player_id: wire_id(*player_id),
                kind: (*kind).into(),
            }),
        }
    }
}
