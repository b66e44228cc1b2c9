use crate::interface_adapters::protocol::{
    ClientMessage, CreateRoomResultDto, JoinRoomPayload, PlayerInputDto, ServerMessage, StateDto,
    WelcomeDto,
};
use crate::interface_adapters::state::AppState;
use crate::interface_adapters::utils::rng::{next_player_id, rand_id};
use crate::use_cases::directory::normalize_room_name;
use crate::use_cases::{
    Departure, LobbyNotice, RoomCommand, RoomError, RoomHandle, RoomUpdate,
};

use axum::{
    Error,
    extract::{
        State,
        ws::{CloseFrame, Message, Utf8Bytes, WebSocket, WebSocketUpgrade, close_code},
    },
    response::IntoResponse,
};
use futures::SinkExt;
use std::{
    sync::Arc,
    time::{Duration, Instant},
};
use tokio::sync::{broadcast, mpsc, watch};
use tracing::{Instrument, debug, error, info, info_span, warn};

#[derive(Debug)]
enum NetError {
    // Categorizes connection lifecycle failures so callers can decide policy.
    #[allow(dead_code)]
    Ws(axum::Error),
    #[allow(dead_code)]
    Serialization(serde_json::Error),
    LobbyClosed,
    RoomClosed,
}

impl From<axum::Error> for NetError {
    fn from(e: axum::Error) -> Self {
        NetError::Ws(e)
    }
}

const LOG_THROTTLE: Duration = Duration::from_secs(2);
const MAX_INVALID_JSON: u32 = 10;
const MAX_DISPLAY_NAME_CHARS: usize = 16;
const DEFAULT_DISPLAY_NAME: &str = "Sailor";

pub async fn room_update_serializer(
    mut updates_rx: broadcast::Receiver<RoomUpdate>,
    frames_tx: broadcast::Sender<Utf8Bytes>,
    latest_state_tx: watch::Sender<Utf8Bytes>,
) {
    // Serialize each tick once: its events in emission order, then the snapshot.
    loop {
        match updates_rx.recv().await {
            Ok(update) => {
                for event in &update.events {
                    if let Some(bytes) = encode(&ServerMessage::from(event)) {
                        let _ = frames_tx.send(bytes);
                    }
                }

                let state = ServerMessage::State(StateDto::from(&update.snapshot));
                let Some(bytes) = encode(&state) else {
                    continue;
                };
                // Store the latest snapshot for lag recovery.
                let _ = latest_state_tx.send(bytes.clone());
                let _ = frames_tx.send(bytes);
            }
            Err(broadcast::error::RecvError::Lagged(n)) => {
                warn!(missed = n, "room serializer lagged; skipping to latest update");
            }
            Err(broadcast::error::RecvError::Closed) => {
                debug!("room updates channel closed; serializer exiting");
                break;
            }
        }
    }
}

fn encode(msg: &ServerMessage) -> Option<Utf8Bytes> {
    match serde_json::to_string(msg) {
        Ok(txt) => Some(Utf8Bytes::from(txt)),
        Err(e) => {
            error!(error = ?e, "failed to serialize room frame");
            None
        }
    }
}

pub fn spawn_room_serializer(room: &RoomHandle) {
    tokio::spawn(room_update_serializer(
        room.updates_tx.subscribe(),
        room.frames_tx.clone(),
        room.latest_state_tx.clone(),
    ));
}

/// Creates a room and starts serializing its updates for subscribers.
pub async fn open_room(state: &AppState, raw_name: &str) -> Result<RoomHandle, RoomError> {
    let room = state.directory.create_room(raw_name).await?;
    spawn_room_serializer(&room);
    Ok(room)
}

/// Display name shown to other players: trimmed, capped, never empty.
pub fn display_name(raw: Option<&str>) -> String {
    let name: String = raw
        .unwrap_or_default()
        .trim()
        .chars()
        .take(MAX_DISPLAY_NAME_CHARS)
        .collect();
    let name = name.trim_end();
    if name.is_empty() {
        DEFAULT_DISPLAY_NAME.to_string()
    } else {
        name.to_string()
    }
}

pub async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| {
        // Separate connection id for correlating logs; player id is fixed per connection.
        let conn_id = rand_id();
        let player_id = next_player_id();
        let span = info_span!("conn", conn_id, player_id, room = tracing::field::Empty);
        handle_socket(socket, state, player_id).instrument(span)
    })
}

async fn handle_socket(mut socket: WebSocket, state: Arc<AppState>, player_id: u64) {
    let mut ctx = ConnCtx::new(player_id, state);
    info!("client connected");

    // Every connection starts with the current room list.
    let rooms = ctx.state.directory.list_rooms().await;
    if let Err(e) = ctx.send(&mut socket, &ServerMessage::room_list(&rooms)).await {
        warn!(error = ?e, "failed to send initial room list");
        ctx.disconnect_cleanup().await;
        return;
    }

    if let Err(e) = run_client_loop(&mut socket, &mut ctx).await {
        warn!(error = ?e, "client loop exited with error");
    }
    ctx.disconnect_cleanup().await;
}

async fn send_message(socket: &mut WebSocket, msg: &ServerMessage) -> Result<usize, NetError> {
    let txt = serde_json::to_string(msg).map_err(NetError::Serialization)?;
    let bytes = txt.len();
    socket
        .send(Message::Text(txt.into()))
        .await
        .map_err(NetError::Ws)?;
    Ok(bytes)
}

// Room membership of a connection and its frame subscriptions.
struct JoinedRoom {
    handle: RoomHandle,
    frames_rx: broadcast::Receiver<Utf8Bytes>,
    latest_state_rx: watch::Receiver<Utf8Bytes>,
}

struct ConnCtx {
    player_id: u64,
    state: Arc<AppState>,
    lobby_rx: broadcast::Receiver<LobbyNotice>,
    room: Option<JoinedRoom>,
    // Count lag recovery snapshots sent to this client.
    lag_recovery_count: u64,

    msgs_in: u64,
    msgs_out: u64,
    bytes_in: u64,
    bytes_out: u64,

    invalid_json: u32,

    last_input_full_log: Instant,
    last_room_lag_log: Instant,
    last_invalid_input_log: Instant,

    close_frame: Option<CloseFrame>,
}

enum LoopControl {
    Continue,
    Disconnect,
}

fn should_log(last: &mut Instant) -> bool {
    if last.elapsed() >= LOG_THROTTLE {
        *last = Instant::now();
        true
    } else {
        false
    }
}

async fn next_room_frame(
    room: Option<&mut JoinedRoom>,
) -> Result<Utf8Bytes, broadcast::error::RecvError> {
    match room {
        Some(joined) => joined.frames_rx.recv().await,
        // Outside a room this branch never fires.
        None => std::future::pending().await,
    }
}

async fn run_client_loop(socket: &mut WebSocket, ctx: &mut ConnCtx) -> Result<(), NetError> {
    loop {
        let outcome = tokio::select! {
            // Incoming Message from Client
            incoming = socket.recv() => ctx.handle_incoming_ws(socket, incoming).await,

            // Room list and ranking notices
            notice = ctx.lobby_rx.recv() => ctx.forward_lobby_notice(socket, notice).await,

            // Outgoing room frames
            frame = next_room_frame(ctx.room.as_mut()) => ctx.forward_room_frame(socket, frame).await,
        };

        let (disconnect, fatal) = match outcome {
            Ok(LoopControl::Continue) => (false, None),
            Ok(LoopControl::Disconnect) => (true, None),
            Err(e) => (true, Some(e)),
        };

        if disconnect {
            if let Some(frame) = ctx.close_frame.take() {
                let _ = socket.send(Message::Close(Some(frame))).await;
            }
            if let Err(err) = socket.close().await.map_err(NetError::Ws) {
                debug!(error = ?err, "socket close error");
            }
            return match fatal {
                Some(err) => Err(err),
                None => Ok(()),
            };
        }
    }
}

impl ConnCtx {
    fn new(player_id: u64, state: Arc<AppState>) -> Self {
        let lobby_rx = state.directory.subscribe_lobby();
        let now = Instant::now() - LOG_THROTTLE;
        Self {
            player_id,
            state,
            lobby_rx,
            room: None,
            lag_recovery_count: 0,
            msgs_in: 0,
            msgs_out: 0,
            bytes_in: 0,
            bytes_out: 0,
            invalid_json: 0,
            last_input_full_log: now,
            last_room_lag_log: now,
            last_invalid_input_log: now,
            close_frame: None,
        }
    }

    async fn send(&mut self, socket: &mut WebSocket, msg: &ServerMessage) -> Result<(), NetError> {
        let bytes = send_message(socket, msg).await?;
        self.msgs_out += 1;
        self.bytes_out += bytes as u64;
        Ok(())
    }

    async fn send_room_error(
        &mut self,
        socket: &mut WebSocket,
        err: RoomError,
    ) -> Result<LoopControl, NetError> {
        self.send(socket, &ServerMessage::room_error(err.message()))
            .await?;
        Ok(LoopControl::Continue)
    }

    async fn handle_incoming_ws(
        &mut self,
        socket: &mut WebSocket,
        incoming: Option<Result<Message, Error>>,
    ) -> Result<LoopControl, NetError> {
        let player_id = self.player_id;
        match incoming {
            Some(Ok(msg)) => match msg {
                Message::Text(text) => {
                    self.msgs_in += 1;
                    self.bytes_in += text.len() as u64;

                    match serde_json::from_str::<ClientMessage>(&text) {
                        Ok(message) => self.handle_client_message(socket, message).await,
                        Err(parse_err) => {
                            self.invalid_json += 1;
                            if should_log(&mut self.last_invalid_input_log) {
                                warn!(
                                    player_id,
                                    bytes = text.len(),
                                    error = %parse_err,
                                    "failed to parse client message"
                                );
                            }

                            if self.invalid_json > MAX_INVALID_JSON {
                                self.close_frame = Some(CloseFrame {
                                    code: close_code::POLICY,
                                    reason: "too many invalid messages".into(),
                                });
                                return Ok(LoopControl::Disconnect);
                            }

                            Ok(LoopControl::Continue)
                        }
                    }
                }
                Message::Binary(_) => {
                    self.close_frame = Some(CloseFrame {
                        code: close_code::UNSUPPORTED,
                        reason: "binary messages not supported".into(),
                    });
                    Ok(LoopControl::Disconnect)
                }
                Message::Ping(_) | Message::Pong(_) => Ok(LoopControl::Continue),
                Message::Close(_) => Ok(LoopControl::Disconnect),
            },
            Some(Err(e)) => {
                warn!(player_id, error = %e, "websocket recv error");
                Ok(LoopControl::Disconnect)
            }
            None => {
                info!(player_id, "websocket closed");
                Ok(LoopControl::Disconnect)
            }
        }
    }

    async fn handle_client_message(
        &mut self,
        socket: &mut WebSocket,
        message: ClientMessage,
    ) -> Result<LoopControl, NetError> {
        match message {
            ClientMessage::CreateRoom(payload) => {
                let result = match open_room(&self.state, &payload.room_name).await {
                    Ok(room) => CreateRoomResultDto {
                        ok: true,
                        room_name: Some(room.name.to_string()),
                        error: None,
                    },
                    Err(err) => CreateRoomResultDto {
                        ok: false,
                        room_name: None,
                        error: Some(err.message().to_string()),
                    },
                };
                self.send(socket, &ServerMessage::CreateRoomResult(result))
                    .await?;
                Ok(LoopControl::Continue)
            }
            ClientMessage::JoinRoom(payload) => self.join_room(socket, payload).await,
            ClientMessage::LeaveRoom => {
                self.leave_current_room().await;
                Ok(LoopControl::Continue)
            }
            ClientMessage::GetRooms => {
                let rooms = self.state.directory.list_rooms().await;
                self.send(socket, &ServerMessage::room_list(&rooms)).await?;
                Ok(LoopControl::Continue)
            }
            ClientMessage::GetRanking => {
                let entries = match self.state.ranking.current().await {
                    Ok(entries) => entries,
                    Err(e) => {
                        warn!(error = ?e, "failed to read ranking");
                        Vec::new()
                    }
                };
                self.send(socket, &ServerMessage::Ranking(entries)).await?;
                Ok(LoopControl::Continue)
            }
            ClientMessage::Input(input) => match self.forward_input(input) {
                Ok(()) => Ok(LoopControl::Continue),
                Err(NetError::RoomClosed) => {
                    warn!(player_id = self.player_id, "room input channel closed");
                    self.room = None;
                    self.send_room_error(socket, RoomError::Closed).await
                }
                Err(e) => Err(e),
            },
        }
    }

    async fn join_room(
        &mut self,
        socket: &mut WebSocket,
        payload: JoinRoomPayload,
    ) -> Result<LoopControl, NetError> {
        // Joining while in a room leaves the old one first.
        self.leave_current_room().await;

        let Ok(room_name) = normalize_room_name(&payload.room_name) else {
            return self.send_room_error(socket, RoomError::NotFound).await;
        };
        let Some(room) = self.state.directory.get_room(&room_name).await else {
            return self.send_room_error(socket, RoomError::NotFound).await;
        };

        // Subscribe before joining so the first frames after the join are not missed.
        let frames_rx = room.frames_tx.subscribe();
        let latest_state_rx = room.latest_state_tx.subscribe();

        let name = display_name(payload.name.as_deref());
        let (handle, welcome) = match self
            .state
            .directory
            .join(&room_name, self.player_id, name)
            .await
        {
            Ok(joined) => joined,
            Err(err) => return self.send_room_error(socket, err).await,
        };

        // The room may have been replaced between lookup and join.
        let (frames_rx, latest_state_rx) = if handle.instance == room.instance {
            (frames_rx, latest_state_rx)
        } else {
            (
                handle.frames_tx.subscribe(),
                handle.latest_state_tx.subscribe(),
            )
        };

        tracing::Span::current().record("room", &*handle.name);
        self.room = Some(JoinedRoom {
            handle,
            frames_rx,
            latest_state_rx,
        });
        self.send(socket, &ServerMessage::Welcome(WelcomeDto::from(&welcome)))
            .await?;
        Ok(LoopControl::Continue)
    }

    fn forward_input(&mut self, input: PlayerInputDto) -> Result<(), NetError> {
        let player_id = self.player_id;
        let Some(joined) = &self.room else {
            if should_log(&mut self.last_invalid_input_log) {
                debug!(player_id, "input outside a room ignored");
            }
            return Ok(());
        };

        let command = RoomCommand::Input {
            player_id,
            input: input.into(),
        };
        match joined.handle.commands_tx.try_send(command) {
            Ok(()) => Ok(()),
            Err(mpsc::error::TrySendError::Full(_cmd)) => {
                if should_log(&mut self.last_input_full_log) {
                    warn!(player_id, "input channel full; dropping input");
                }
                Ok(())
            }
            Err(mpsc::error::TrySendError::Closed(_cmd)) => Err(NetError::RoomClosed),
        }
    }

    async fn leave_current_room(&mut self) {
        let Some(joined) = self.room.take() else {
            return;
        };
        match self.state.directory.leave(&joined.handle, self.player_id).await {
            Ok(Some(departure)) => self.record_departure(departure).await,
            Ok(None) => {}
            Err(e) => warn!(room = %joined.handle.name, error = ?e, "failed to leave room"),
        }
    }

    async fn record_departure(&self, departure: Departure) {
        match self
            .state
            .ranking
            .record_departure(&departure.name, departure.kills)
            .await
        {
            Ok(Some(entries)) => self.state.directory.broadcast_ranking(entries),
            Ok(None) => {}
            Err(e) => warn!(error = ?e, "failed to record weekly ranking"),
        }
    }

    async fn forward_lobby_notice(
        &mut self,
        socket: &mut WebSocket,
        notice: Result<LobbyNotice, broadcast::error::RecvError>,
    ) -> Result<LoopControl, NetError> {
        let msg = match notice {
            Ok(LobbyNotice::RoomList(rooms)) => ServerMessage::room_list(&rooms),
            Ok(LobbyNotice::Ranking(entries)) => ServerMessage::Ranking(entries),
            Err(broadcast::error::RecvError::Lagged(n)) => {
                debug!(missed = n, "lobby notices lagged; resending room list");
                let rooms = self.state.directory.list_rooms().await;
                ServerMessage::room_list(&rooms)
            }
            Err(broadcast::error::RecvError::Closed) => return Err(NetError::LobbyClosed),
        };
        match self.send(socket, &msg).await {
            Ok(()) => Ok(LoopControl::Continue),
            Err(err) => {
                warn!(error = ?err, "failed to send lobby notice");
                Ok(LoopControl::Disconnect)
            }
        }
    }

    async fn forward_room_frame(
        &mut self,
        socket: &mut WebSocket,
        frame: Result<Utf8Bytes, broadcast::error::RecvError>,
    ) -> Result<LoopControl, NetError> {
        let player_id = self.player_id;
        let bytes = match frame {
            Ok(bytes) => bytes,
            Err(broadcast::error::RecvError::Lagged(n)) => {
                if should_log(&mut self.last_room_lag_log) {
                    warn!(missed = n, "room frames lagged; sending snapshot");
                }

                // Resync strategy: send the latest room snapshot.
                let latest = match &self.room {
                    Some(joined) => joined.latest_state_rx.borrow().clone(),
                    None => return Ok(LoopControl::Continue),
                };
                if latest.is_empty() {
                    return Ok(LoopControl::Continue);
                }
                self.lag_recovery_count += 1;
                debug!(
                    player_id,
                    bytes = latest.len(),
                    count = self.lag_recovery_count,
                    "sending lag recovery snapshot"
                );
                latest
            }
            Err(broadcast::error::RecvError::Closed) => {
                warn!(player_id, "room frames closed; leaving room");
                self.room = None;
                return self.send_room_error(socket, RoomError::Closed).await;
            }
        };

        let bytes_len = bytes.len();
        match socket.send(Message::Text(bytes)).await.map_err(NetError::Ws) {
            Ok(()) => {
                self.msgs_out += 1;
                self.bytes_out += bytes_len as u64;
                Ok(LoopControl::Continue)
            }
            Err(err) => {
                // Log unexpected send failures; disconnect will follow immediately.
                warn!(error = ?err, "failed to send room frame");
                Ok(LoopControl::Disconnect)
            }
        }
    }

    async fn disconnect_cleanup(&mut self) {
        self.leave_current_room().await;

        debug!(
            player_id = self.player_id,
            msgs_in = self.msgs_in,
            msgs_out = self.msgs_out,
            bytes_in = self.bytes_in,
            bytes_out = self.bytes_out,
            invalid_json = self.invalid_json,
            lag_recovery_count = self.lag_recovery_count,
            "connection stats"
        );
        info!(player_id = self.player_id, "client disconnected");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn when_name_is_missing_or_blank_then_default_is_used() {
        assert_eq!(display_name(None), "Sailor");
        assert_eq!(display_name(Some("   ")), "Sailor");
    }

    #[test]
    fn when_name_is_long_then_it_is_capped() {
        let name = display_name(Some("  Captain Longname The Third  "));
        assert_eq!(name.chars().count(), MAX_DISPLAY_NAME_CHARS);
        assert_eq!(name, "Captain Longname");
    }

    #[test]
    fn when_should_log_fires_then_it_throttles_until_the_window_passes() {
        let mut last = Instant::now() - LOG_THROTTLE;
        assert!(should_log(&mut last));
        assert!(!should_log(&mut last));
    }
}
