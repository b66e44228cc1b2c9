use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::domain::leaderboard::WeeklyRanking;
use crate::domain::ports::{Clock, LeaderboardStore, StoreError};
use crate::use_cases::{RankingService, RoomDirectory};

pub type Ranking = RankingService<SystemClock, JsonFileStore>;

// Application state shared by every route and connection.
#[derive(Clone)]
pub struct AppState {
    pub directory: Arc<RoomDirectory>,
    pub ranking: Arc<Ranking>,
}

// JSON file store for the weekly ranking.
#[derive(Clone)]
pub struct JsonFileStore {
    pub path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl LeaderboardStore for JsonFileStore {
    async fn load(&self) -> Result<Option<WeeklyRanking>, StoreError> {
        let bytes = match tokio::fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(StoreError::Io(err.to_string())),
        };
        serde_json::from_slice(&bytes)
            .map(Some)
            .map_err(|err| StoreError::Corrupt(err.to_string()))
    }

    async fn save(&self, ranking: &WeeklyRanking) -> Result<(), StoreError> {
        let json =
            serde_json::to_vec_pretty(ranking).map_err(|err| StoreError::Io(err.to_string()))?;
        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(dir)
                .await
                .map_err(|err| StoreError::Io(err.to_string()))?;
        }

        // Write then rename so readers never see a half-written file.
        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, json)
            .await
            .map_err(|err| StoreError::Io(err.to_string()))?;
        tokio::fs::rename(&tmp, &self.path)
            .await
            .map_err(|err| StoreError::Io(err.to_string()))
    }
}

// System clock adapter used by the ranking service.
#[derive(Clone)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_epoch_seconds(&self) -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::leaderboard::RankingEntry;

    fn temp_path(tag: &str) -> PathBuf {
        std::env::temp_dir()
            .join(format!("boat-arena-{tag}-{}", crate::interface_adapters::utils::rng::rand_id()))
            .join("ranking.json")
    }

    #[tokio::test]
    async fn when_file_is_missing_then_load_returns_none() {
        let store = JsonFileStore::new(temp_path("missing"));

        assert!(matches!(store.load().await, Ok(None)));
    }

    #[tokio::test]
    async fn when_ranking_is_saved_then_it_loads_back() {
        let store = JsonFileStore::new(temp_path("saved"));
        let ranking = WeeklyRanking {
            week_start: 1_715_558_400,
            entries: vec![RankingEntry {
                name: "Ann".to_string(),
                kills: 3,
                date: "2024-05-15".to_string(),
            }],
        };

        store.save(&ranking).await.expect("save");

        assert_eq!(store.load().await.expect("load"), Some(ranking));
    }

    #[tokio::test]
    async fn when_file_is_garbage_then_load_reports_corruption() {
        let path = temp_path("garbage");
        tokio::fs::create_dir_all(path.parent().expect("parent"))
            .await
            .expect("mkdir");
        tokio::fs::write(&path, b"not json").await.expect("write");

        let store = JsonFileStore::new(path);

        assert!(matches!(store.load().await, Err(StoreError::Corrupt(_))));
    }
}
