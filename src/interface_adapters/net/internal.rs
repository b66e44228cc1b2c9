use crate::interface_adapters::http::error_response;
use crate::interface_adapters::net::client::open_room;
use crate::interface_adapters::protocol::RoomSummaryDto;
use crate::interface_adapters::state::AppState;
use crate::use_cases::RoomError;

use axum::{
    extract::{Json, State},
    http::StatusCode,
    response::IntoResponse,
};
use std::sync::Arc;
use tracing::warn;

#[derive(Debug, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateRoomRequest {
    #[serde(default)]
    room_name: String,
}

#[derive(Debug, serde::Serialize)]
#[serde(rename_all = "camelCase")]
struct CreateRoomResponse {
    // Normalised name the room was registered under.
    room_name: String,
}

pub async fn create_room_handler(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<CreateRoomRequest>,
) -> impl IntoResponse {
    match open_room(&state, &payload.room_name).await {
        Ok(room) => (
            StatusCode::CREATED,
            Json(CreateRoomResponse {
                room_name: room.name.to_string(),
            }),
        )
            .into_response(),
        Err(err @ RoomError::InvalidName) => {
            error_response(StatusCode::BAD_REQUEST, err.message())
        }
        Err(err @ RoomError::NameConflict) => error_response(StatusCode::CONFLICT, err.message()),
        Err(err) => error_response(StatusCode::SERVICE_UNAVAILABLE, err.message()),
    }
}

pub async fn list_rooms_handler(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let rooms = state.directory.list_rooms().await;
    let rooms: Vec<RoomSummaryDto> = rooms.iter().map(RoomSummaryDto::from).collect();
    Json(rooms)
}

pub async fn ranking_handler(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    match state.ranking.current().await {
        Ok(entries) => Json(entries).into_response(),
        Err(e) => {
            warn!(error = ?e, "failed to read ranking");
            error_response(StatusCode::SERVICE_UNAVAILABLE, "ranking unavailable")
        }
    }
}
