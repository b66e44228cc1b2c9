use std::sync::atomic::{AtomicU64, Ordering};

use crate::domain::PlayerId;

static NEXT_PLAYER_ID: AtomicU64 = AtomicU64::new(1);

/// Process-unique player id. Ids are never reused, so ids carried by late events
/// can't be confused with a newer player.
pub fn next_player_id() -> PlayerId {
    NEXT_PLAYER_ID.fetch_add(1, Ordering::Relaxed)
}

/// Random id for correlating one connection's log lines.
pub fn rand_id() -> u64 {
    rand::random()
}
