// Room directory: creates, finds and tears down room world tasks.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::time::Duration;

use axum::extract::ws::Utf8Bytes;
use rand::SeedableRng;
use rand::rngs::StdRng;
use tokio::sync::{Notify, RwLock, broadcast, mpsc, oneshot, watch};
use tracing::{debug, info};

use super::room::room_task;
use super::types::{Departure, LobbyNotice, RoomCommand, RoomSummary, RoomUpdate, Welcome};
use crate::domain::leaderboard::RankingEntry;
use crate::domain::tuning::Tuning;
use crate::domain::{JoinRejected, PlayerId, World};

/// Longest room name kept after trimming.
pub const MAX_ROOM_NAME_CHARS: usize = 24;

/// Shared configuration for spawning room worlds.
#[derive(Debug, Clone)]
pub struct RoomSettings {
    /// Capacity for inbound room commands.
    pub input_channel_capacity: usize,
    /// Capacity for per-room update and frame broadcasts.
    pub room_broadcast_capacity: usize,
    /// Capacity for the process-wide lobby broadcast.
    pub lobby_broadcast_capacity: usize,
    /// How long a room may stay empty after creation before it is removed.
    pub empty_room_grace: Duration,
    /// Gameplay parameters every new room is simulated with.
    pub tuning: Tuning,
}

impl RoomSettings {
    /// Fixed tick interval derived from the tuning's tick rate.
    pub fn tick_interval(&self) -> Duration {
        Duration::from_secs_f32(self.tuning.dt())
    }
}

/// Errors returned by room directory operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoomError {
    /// Room name is empty after trimming.
    InvalidName,
    /// A room with that name already exists.
    NameConflict,
    NotFound,
    RoomFull,
    /// The player is already in that room.
    AlreadyJoined,
    /// The room's world task is gone.
    Closed,
}

impl RoomError {
    pub fn message(&self) -> &'static str {
        match self {
            RoomError::InvalidName => "Room name required",
            RoomError::NameConflict => "Room already exists",
            RoomError::NotFound => "Room not found",
            RoomError::RoomFull => "Room is full",
            RoomError::AlreadyJoined => "Already in this room",
            RoomError::Closed => "Room is closed",
        }
    }
}

impl From<JoinRejected> for RoomError {
    fn from(rejected: JoinRejected) -> Self {
        match rejected {
            JoinRejected::RoomFull => RoomError::RoomFull,
            JoinRejected::AlreadyJoined => RoomError::AlreadyJoined,
        }
    }
}

/// Per-room channels.
#[derive(Clone)]
pub struct RoomHandle {
    /// Normalised room name, also the directory key.
    pub name: Arc<str>,
    /// Distinguishes a room from a later one created under the same name.
    pub instance: u64,
    /// Sender for commands into the room world task.
    pub commands_tx: mpsc::Sender<RoomCommand>,
    /// Broadcast sender for raw tick output.
    pub updates_tx: broadcast::Sender<RoomUpdate>,
    /// Broadcast sender for serialized frames (events, then state).
    pub frames_tx: broadcast::Sender<Utf8Bytes>,
    /// Watch sender holding the latest serialized `state` frame.
    pub latest_state_tx: watch::Sender<Utf8Bytes>,
    player_count: Arc<AtomicUsize>,
    max_players: usize,
    shutdown: Arc<Notify>,
}

impl RoomHandle {
    pub fn player_count(&self) -> usize {
        self.player_count.load(Ordering::Acquire)
    }

    pub fn summary(&self) -> RoomSummary {
        RoomSummary {
            name: self.name.to_string(),
            players: self.player_count(),
            max_players: self.max_players,
        }
    }
}

/// Trims and truncates a requested room name.
pub fn normalize_room_name(raw: &str) -> Result<String, RoomError> {
    let name: String = raw.trim().chars().take(MAX_ROOM_NAME_CHARS).collect();
    let name = name.trim_end().to_string();
    if name.is_empty() {
        return Err(RoomError::InvalidName);
    }
    Ok(name)
}

/// Thread-safe directory of active rooms.
pub struct RoomDirectory {
    /// Global settings applied to newly created rooms.
    settings: RoomSettings,
    /// Map of room name to active handle.
    rooms: RwLock<HashMap<String, RoomHandle>>,
    next_instance: AtomicU64,
    /// Room list and ranking notices for every connection.
    lobby_tx: broadcast::Sender<LobbyNotice>,
}

impl RoomDirectory {
    pub fn new(settings: RoomSettings) -> Self {
        let (lobby_tx, _lobby_rx) = broadcast::channel(settings.lobby_broadcast_capacity);
        Self {
            settings,
            rooms: RwLock::new(HashMap::new()),
            next_instance: AtomicU64::new(1),
            lobby_tx,
        }
    }

    /// Creates a room, generates its islands and starts its world task.
    ///
    /// The room is removed again whenever it is found empty after a grace period.
    pub async fn create_room(self: &Arc<Self>, raw_name: &str) -> Result<RoomHandle, RoomError> {
        let name = normalize_room_name(raw_name)?;

        let room = {
            let mut rooms = self.rooms.write().await;
            if rooms.contains_key(&name) {
                return Err(RoomError::NameConflict);
            }

            // Channel wiring for the room world loop.
            let capacity = self.settings.room_broadcast_capacity;
            let (commands_tx, commands_rx) =
                mpsc::channel::<RoomCommand>(self.settings.input_channel_capacity);
            let (updates_tx, _updates_rx) = broadcast::channel::<RoomUpdate>(capacity);
            let (frames_tx, _frames_rx) = broadcast::channel::<Utf8Bytes>(capacity);
            let (latest_state_tx, _latest_rx) = watch::channel::<Utf8Bytes>(Utf8Bytes::from(""));
            let player_count = Arc::new(AtomicUsize::new(0));
            let shutdown = Arc::new(Notify::new());

            let world = World::new(self.settings.tuning.clone(), StdRng::from_entropy());
            let room = RoomHandle {
                name: Arc::from(name.as_str()),
                instance: self.next_instance.fetch_add(1, Ordering::Relaxed),
                commands_tx,
                updates_tx: updates_tx.clone(),
                frames_tx,
                latest_state_tx,
                player_count: player_count.clone(),
                max_players: world.max_players(),
                shutdown: shutdown.clone(),
            };

            // Spawn the authoritative world loop for this room.
            tokio::spawn(room_task(
                room.name.clone(),
                world,
                commands_rx,
                updates_tx,
                player_count,
                self.settings.tick_interval(),
                shutdown,
            ));

            rooms.insert(name, room.clone());
            room
        };

        info!(room = %room.name, "room created");
        self.spawn_empty_room_reaper(&room);
        self.broadcast_room_list().await;
        Ok(room)
    }

    /// Stops a room's world task and forgets it.
    pub async fn destroy_room(&self, name: &str) -> bool {
        let removed = self.rooms.write().await.remove(name);
        let Some(room) = removed else {
            return false;
        };
        room.shutdown.notify_one();
        info!(room = %room.name, "room destroyed");
        self.broadcast_room_list().await;
        true
    }

    /// Destroys the room only if it is the same instance and still has no players.
    pub async fn destroy_if_empty(&self, name: &str, instance: u64) -> bool {
        let removed = {
            let mut rooms = self.rooms.write().await;
            match rooms.get(name) {
                Some(room) if room.instance == instance && room.player_count() == 0 => {
                    rooms.remove(name)
                }
                _ => None,
            }
        };
        let Some(room) = removed else {
            return false;
        };
        room.shutdown.notify_one();
        info!(room = %room.name, "empty room destroyed");
        self.broadcast_room_list().await;
        true
    }

    fn spawn_empty_room_reaper(self: &Arc<Self>, room: &RoomHandle) {
        let directory = Arc::clone(self);
        let name = room.name.clone();
        let instance = room.instance;
        let grace = self.settings.empty_room_grace;
        // Rooms can also empty without a directory leave, e.g. an abandoned join.
        tokio::spawn(async move {
            loop {
                tokio::time::sleep(grace).await;
                match directory.get_room(&name).await {
                    Some(room) if room.instance == instance => {}
                    _ => break,
                }
                if directory.destroy_if_empty(&name, instance).await {
                    debug!(room = %name, "empty room reaped");
                    break;
                }
            }
        });
    }

    /// Rooms with at least one player, sorted by name.
    pub async fn list_rooms(&self) -> Vec<RoomSummary> {
        let rooms = self.rooms.read().await;
        let mut list: Vec<RoomSummary> = rooms
            .values()
            .filter(|room| room.player_count() > 0)
            .map(RoomHandle::summary)
            .collect();
        list.sort_by(|a, b| a.name.cmp(&b.name));
        list
    }

    pub async fn get_room(&self, name: &str) -> Option<RoomHandle> {
        let rooms = self.rooms.read().await;
        rooms.get(name).cloned()
    }

    pub async fn room_count(&self) -> usize {
        self.rooms.read().await.len()
    }

    /// Adds a player to a room and returns the room's channels and static layout.
    pub async fn join(
        &self,
        raw_room_name: &str,
        player_id: PlayerId,
        name: String,
    ) -> Result<(RoomHandle, Welcome), RoomError> {
        let room_name = normalize_room_name(raw_room_name).map_err(|_| RoomError::NotFound)?;

        let joined = {
            // Holding the read lock keeps the room from being reaped mid-join.
            let rooms = self.rooms.read().await;
            let room = rooms.get(&room_name).cloned().ok_or(RoomError::NotFound)?;

            let (reply, reply_rx) = oneshot::channel();
            room.commands_tx
                .send(RoomCommand::Join {
                    player_id,
                    name,
                    reply,
                })
                .await
                .map_err(|_| RoomError::Closed)?;
            let welcome = reply_rx.await.map_err(|_| RoomError::Closed)??;
            (room, welcome)
        };

        self.broadcast_room_list().await;
        Ok(joined)
    }

    /// Removes a player from a room; destroys the room when it becomes empty.
    pub async fn leave(
        &self,
        room: &RoomHandle,
        player_id: PlayerId,
    ) -> Result<Option<Departure>, RoomError> {
        let (reply, reply_rx) = oneshot::channel();
        room.commands_tx
            .send(RoomCommand::Leave { player_id, reply })
            .await
            .map_err(|_| RoomError::Closed)?;
        let departure = reply_rx.await.map_err(|_| RoomError::Closed)?;

        let emptied = departure.as_ref().is_some_and(|d| d.remaining == 0);
        if !(emptied && self.destroy_if_empty(&room.name, room.instance).await) {
            self.broadcast_room_list().await;
        }
        Ok(departure)
    }

    pub fn subscribe_lobby(&self) -> broadcast::Receiver<LobbyNotice> {
        self.lobby_tx.subscribe()
    }

    pub async fn broadcast_room_list(&self) {
        let rooms = self.list_rooms().await;
        // No receivers just means no connections are open.
        let _ = self.lobby_tx.send(LobbyNotice::RoomList(rooms));
    }

    pub fn broadcast_ranking(&self, entries: Vec<RankingEntry>) {
        let _ = self.lobby_tx.send(LobbyNotice::Ranking(entries));
    }
}
