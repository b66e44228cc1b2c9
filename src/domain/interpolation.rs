// Client-side snapshot interpolation.
//
// Renderers replay `state` snapshots a fixed delay behind an estimate of the server
// clock so that network jitter is hidden. The server does not use this itself; it is
// the executable form of the contract clients follow.

use std::collections::VecDeque;

use super::geometry::{lerp, lerp_angle};
use super::state::{PlayerSnapshot, WorldSnapshot};

/// Render delay behind the estimated live server time.
pub const INTERP_DELAY_MS: f64 = 150.0;

/// Fraction of the observed clock error folded into the offset per snapshot.
const OFFSET_SMOOTHING: f64 = 0.01;

/// Snapshots older than this behind the render time are dropped.
const RETENTION_MS: f64 = 500.0;

/// Minimum snapshots kept regardless of age.
const MIN_RETAINED: usize = 2;

struct Buffered {
    server_time_ms: f64,
    snapshot: WorldSnapshot,
}

pub struct SnapshotBuffer {
    tick_interval_ms: f64,
    /// Local clock minus server clock, once known.
    offset_ms: Option<f64>,
    states: VecDeque<Buffered>,
}

impl SnapshotBuffer {
    pub fn new(tick_interval_ms: f64) -> Self {
        Self {
            tick_interval_ms,
            offset_ms: None,
            states: VecDeque::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    /// Forgets everything, e.g. after switching rooms.
    pub fn clear(&mut self) {
        self.states.clear();
        self.offset_ms = None;
    }

    pub fn offset_ms(&self) -> Option<f64> {
        self.offset_ms
    }

    /// Buffers a snapshot received at local time `now_ms`.
    pub fn push(&mut self, now_ms: f64, snapshot: WorldSnapshot) {
        let server_time_ms = snapshot.tick as f64 * self.tick_interval_ms;
        let observed = now_ms - server_time_ms;
        let offset = match self.offset_ms {
            None => observed,
            Some(current) => current + (observed - current) * OFFSET_SMOOTHING,
        };
        self.offset_ms = Some(offset);

        self.states.push_back(Buffered {
            server_time_ms,
            snapshot,
        });

        let render_time = now_ms - offset - INTERP_DELAY_MS;
        while self.states.len() > MIN_RETAINED
            && self
                .states
                .front()
                .is_some_and(|s| s.server_time_ms < render_time - RETENTION_MS)
        {
            self.states.pop_front();
        }
    }

    /// Server time being rendered at local time `now_ms`.
    pub fn render_time(&self, now_ms: f64) -> Option<f64> {
        self.offset_ms
            .map(|offset| now_ms - offset - INTERP_DELAY_MS)
    }

    /// World state to draw at local time `now_ms`.
    ///
    /// Interpolates between the two snapshots bracketing the render time and holds the
    /// oldest or newest snapshot when the render time falls outside the buffer.
    pub fn sample(&self, now_ms: f64) -> Option<WorldSnapshot> {
        let render_time = self.render_time(now_ms)?;
        let first = self.states.front()?;
        if render_time <= first.server_time_ms {
            return Some(first.snapshot.clone());
        }

        for (a, b) in self.states.iter().zip(self.states.iter().skip(1)) {
            if a.server_time_ms <= render_time && render_time < b.server_time_ms {
                let t = (render_time - a.server_time_ms) / (b.server_time_ms - a.server_time_ms);
                return Some(blend(&a.snapshot, &b.snapshot, t as f32));
            }
        }

        self.states.back().map(|s| s.snapshot.clone())
    }
}

// Players take their discrete fields from the newer snapshot; entities that only exist
// in the newer snapshot are shown as-is.
fn blend(a: &WorldSnapshot, b: &WorldSnapshot, t: f32) -> WorldSnapshot {
    let players = b
        .players
        .iter()
        .map(|bp| match a.players.iter().find(|ap| ap.id == bp.id) {
            Some(ap) => PlayerSnapshot {
                x: lerp(ap.x, bp.x, t),
                z: lerp(ap.z, bp.z, t),
                angle: lerp_angle(ap.angle, bp.angle, t),
                speed: lerp(ap.speed, bp.speed, t),
                ..bp.clone()
            },
            None => bp.clone(),
        })
        .collect();

    WorldSnapshot {
        players,
        ..b.clone()
    }
}
