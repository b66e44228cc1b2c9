use tokio::sync::Mutex;
use tracing::{info, warn};

use crate::domain::leaderboard::{RankingEntry, WeeklyRanking, format_date, week_start};
use crate::domain::ports::{Clock, LeaderboardStore, StoreError};

#[derive(Debug)]
pub enum RankingError {
    Storage(String),
}

// Weekly ranking workflow with injected clock and storage.
pub struct RankingService<C, S> {
    pub clock: C,
    pub store: S,
    // Loaded lazily from the store, then kept in memory.
    cached: Mutex<Option<WeeklyRanking>>,
}

impl<C, S> RankingService<C, S>
where
    C: Clock,
    S: LeaderboardStore,
{
    pub fn new(clock: C, store: S) -> Self {
        Self {
            clock,
            store,
            cached: Mutex::new(None),
        }
    }

    // Current week's entries, best first.
    pub async fn current(&self) -> Result<Vec<RankingEntry>, RankingError> {
        let mut cached = self.cached.lock().await;
        let week = week_start(self.clock.now_epoch_seconds());
        let ranking = self.load_week(cached.take(), week).await?;
        let entries = ranking.entries.clone();
        *cached = Some(ranking);
        Ok(entries)
    }

    // Records a departing player's kills. Returns the new entries when the ranking changed.
    pub async fn record_departure(
        &self,
        name: &str,
        kills: u32,
    ) -> Result<Option<Vec<RankingEntry>>, RankingError> {
        if kills == 0 {
            return Ok(None);
        }

        let mut cached = self.cached.lock().await;
        let now = self.clock.now_epoch_seconds();
        let mut ranking = self.load_week(cached.take(), week_start(now)).await?;

        let changed = ranking.record(name, kills, format_date(now));
        let entries = ranking.entries.clone();
        let saved = if changed {
            self.store.save(&ranking).await
        } else {
            Ok(())
        };
        // Keep the in-memory copy even if persisting failed.
        *cached = Some(ranking);

        if let Err(err) = saved {
            return Err(RankingError::Storage(describe(err)));
        }
        if changed {
            info!(name, kills, "weekly ranking updated");
            Ok(Some(entries))
        } else {
            Ok(None)
        }
    }

    async fn load_week(
        &self,
        cached: Option<WeeklyRanking>,
        week: u64,
    ) -> Result<WeeklyRanking, RankingError> {
        let ranking = match cached {
            Some(ranking) => ranking,
            None => match self.store.load().await {
                Ok(Some(ranking)) => ranking,
                Ok(None) => WeeklyRanking::new(week),
                Err(StoreError::Corrupt(reason)) => {
                    warn!(%reason, "stored ranking unreadable; starting a fresh week");
                    WeeklyRanking::new(week)
                }
                Err(err) => return Err(RankingError::Storage(describe(err))),
            },
        };
        Ok(ranking.for_week(week))
    }
}

fn describe(err: StoreError) -> String {
    match err {
        StoreError::Io(reason) => format!("io: {reason}"),
        StoreError::Corrupt(reason) => format!("corrupt: {reason}"),
    }
}
