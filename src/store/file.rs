use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::{Loaded, ScheduleRepository, codec};
use crate::error::AppError;
use crate::models::Schedule;

/// Timetable persisted as a single CSV file, with a snapshot cached
/// between loads.
pub struct CsvScheduleStore {
    path: PathBuf,
    cache: RwLock<Option<Schedule>>,
}

impl CsvScheduleStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            cache: RwLock::new(None),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let file_name = self
            .path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "schedule.csv".to_string());
        self.path
            .with_file_name(format!(".{}.{}.tmp", file_name, Uuid::new_v4()))
    }
}

#[async_trait]
impl ScheduleRepository for CsvScheduleStore {
    async fn load(&self) -> Result<Loaded, AppError> {
        if let Some(schedule) = self.cache.read().await.as_ref() {
            return Ok(Loaded::Found(schedule.clone()));
        }

        // 読み込み中は書き込みロックを保持し、save の invalidate と競合させない
        let mut cache = self.cache.write().await;
        if let Some(schedule) = cache.as_ref() {
            return Ok(Loaded::Found(schedule.clone()));
        }

        let bytes = match tokio::fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                warn!("schedule file not found: {}", self.path.display());
                return Ok(Loaded::NotFound);
            }
            Err(e) => return Err(e.into()),
        };

        // 保存済みファイルの破損はクライアントの責任ではない
        let schedule = codec::parse_schedule(bytes.as_slice()).map_err(|e| {
            AppError::Storage(format!("{} is corrupt: {}", self.path.display(), e))
        })?;
        debug!(
            "loaded {} sessions from {}",
            schedule.len(),
            self.path.display()
        );
        *cache = Some(schedule.clone());
        Ok(Loaded::Found(schedule))
    }

    async fn save(&self, schedule: &Schedule) -> Result<(), AppError> {
        let bytes = codec::encode_schedule(schedule)?;

        // 一時ファイルに書いてから rename で差し替える
        let tmp = self.temp_path();
        tokio::fs::write(&tmp, &bytes).await?;
        let mut cache = self.cache.write().await;
        if let Err(e) = tokio::fs::rename(&tmp, &self.path).await {
            tokio::fs::remove_file(&tmp).await.ok();
            return Err(e.into());
        }
        cache.take();
        drop(cache);
        info!(
            "saved {} sessions to {}",
            schedule.len(),
            self.path.display()
        );
        Ok(())
    }

    async fn invalidate(&self) {
        let mut cache = self.cache.write().await;
        if cache.take().is_some() {
            debug!("schedule cache invalidated");
        }
    }
}
