// Use-case level inputs/outputs for the room loop and the lobby.

use std::sync::Arc;

use tokio::sync::oneshot;

use crate::domain::leaderboard::RankingEntry;
use crate::domain::state::{Island, Powerup};
use crate::domain::{JoinRejected, PlayerId, PlayerInput, RoomEvent, TickOutcome, WorldSnapshot};

/// Commands a connection sends into a room's world task.
#[derive(Debug)]
pub enum RoomCommand {
    Join {
        player_id: PlayerId,
        name: String,
        reply: oneshot::Sender<Result<Welcome, JoinRejected>>,
    },
    Leave {
        player_id: PlayerId,
        reply: oneshot::Sender<Option<Departure>>,
    },
    Input {
        player_id: PlayerId,
        input: PlayerInput,
    },
}

/// Static room data a player needs once, on entry.
#[derive(Debug, Clone)]
pub struct Welcome {
    pub player_id: PlayerId,
    pub room_name: Arc<str>,
    pub islands: Vec<Island>,
    pub map_size: f32,
    pub powerups: Vec<Powerup>,
}

/// What remains of a player after leaving, for the weekly ranking.
#[derive(Debug, Clone)]
pub struct Departure {
    pub name: String,
    pub kills: u32,
    /// Players still in the room afterwards.
    pub remaining: usize,
}

/// One tick's output, broadcast to the room's serializer.
#[derive(Debug, Clone)]
pub struct RoomUpdate {
    pub events: Vec<RoomEvent>,
    pub snapshot: WorldSnapshot,
}

impl From<TickOutcome> for RoomUpdate {
    fn from(outcome: TickOutcome) -> Self {
        Self {
            events: outcome.events,
            snapshot: outcome.snapshot,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoomSummary {
    pub name: String,
    pub players: usize,
    pub max_players: usize,
}

/// Process-wide notices fanned out to every connection.
#[derive(Debug, Clone)]
pub enum LobbyNotice {
    RoomList(Vec<RoomSummary>),
    Ranking(Vec<RankingEntry>),
}
