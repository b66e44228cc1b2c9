use async_trait::async_trait;

use crate::domain::leaderboard::WeeklyRanking;

// Errors reported by leaderboard storage adapters.
#[derive(Debug)]
pub enum StoreError {
    Io(String),
    Corrupt(String),
}

// Port for weekly ranking persistence.
#[async_trait]
pub trait LeaderboardStore: Send + Sync {
    // Returns `None` when nothing has been stored yet.
    async fn load(&self) -> Result<Option<WeeklyRanking>, StoreError>;
    async fn save(&self, ranking: &WeeklyRanking) -> Result<(), StoreError>;
}

// Port for retrieving the current time.
pub trait Clock: Send + Sync {
    fn now_epoch_seconds(&self) -> u64;
}
