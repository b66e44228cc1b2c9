// Shared test doubles and world builders for unit tests.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use rand::SeedableRng;
use rand::rngs::StdRng;

use super::leaderboard::WeeklyRanking;
use super::ports::{Clock, LeaderboardStore, StoreError};
use super::state::PlayerId;
use super::tuning::Tuning;
use super::world::World;

/// World without islands, with the given players joined and the join events cleared.
pub(crate) fn test_world(ids: &[PlayerId]) -> World {
    let mut world = World::with_islands(Tuning::default(), Vec::new(), StdRng::seed_from_u64(1));
    join_all(&mut world, ids);
    world
}

/// World with a generated island layout for the given seed.
pub(crate) fn seeded_world(seed: u64, ids: &[PlayerId]) -> World {
    let mut world = World::new(Tuning::default(), StdRng::seed_from_u64(seed));
    join_all(&mut world, ids);
    world
}

fn join_all(world: &mut World, ids: &[PlayerId]) {
    for id in ids {
        world
            .add_player(*id, format!("p{id}"))
            .expect("test player should join");
    }
    world.events.clear();
}

/// Moves a player to a fixed spot and stops it.
pub(crate) fn place(world: &mut World, id: PlayerId, x: f32, z: f32) {
    let p = world
        .players
        .iter_mut()
        .find(|p| p.id == id)
        .expect("player should exist");
    p.x = x;
    p.z = z;
    p.speed = 0.0;
    p.vx = 0.0;
    p.vz = 0.0;
}

// Shared fixed time source for deterministic use-case tests.
pub(crate) struct FixedClock(pub(crate) u64);

impl Clock for FixedClock {
    fn now_epoch_seconds(&self) -> u64 {
        self.0
    }
}

#[derive(Clone, Copy, Default)]
pub(crate) struct FailureFlags {
    pub load: bool,
    pub save: bool,
}

#[derive(Clone, Default)]
pub(crate) struct RecordingStore {
    stored: Arc<Mutex<Option<WeeklyRanking>>>,
    saves: Arc<Mutex<u32>>,
    failures: FailureFlags,
}

impl RecordingStore {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn with_ranking(self, ranking: WeeklyRanking) -> Self {
        *self.stored.lock().expect("stored mutex poisoned") = Some(ranking);
        self
    }

    pub(crate) fn with_failures(mut self, failures: FailureFlags) -> Self {
        self.failures = failures;
        self
    }

    pub(crate) fn stored(&self) -> Option<WeeklyRanking> {
        self.stored.lock().expect("stored mutex poisoned").clone()
    }

    pub(crate) fn save_count(&self) -> u32 {
        *self.saves.lock().expect("saves mutex poisoned")
    }
}

#[async_trait]
impl LeaderboardStore for RecordingStore {
    async fn load(&self) -> Result<Option<WeeklyRanking>, StoreError> {
        if self.failures.load {
            return Err(StoreError::Io("load failed".to_string()));
        }
        Ok(self.stored())
    }

    async fn save(&self, ranking: &WeeklyRanking) -> Result<(), StoreError> {
        if self.failures.save {
            return Err(StoreError::Io("save failed".to_string()));
        }
        *self.stored.lock().expect("stored mutex poisoned") = Some(ranking.clone());
        *self.saves.lock().expect("saves mutex poisoned") += 1;
        Ok(())
    }
}
