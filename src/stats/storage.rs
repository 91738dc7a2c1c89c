use super::report::StatsReport;
use crate::error::StatsError;
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Durable sink for stats snapshots
#[async_trait]
pub trait StatsStore: Send + Sync {
    /// Write `report` under `key`, replacing an earlier write with the same key
    async fn persist(&self, key: &str, report: &StatsReport) -> Result<PathBuf, StatsError>;
}

/// Pretty-printed JSON files, one per session key, in a single directory
pub struct JsonFileStore {
    directory: PathBuf,
}

impl JsonFileStore {
    pub fn new<P: AsRef<Path>>(directory: P) -> Self {
        Self {
            directory: directory.as_ref().to_path_buf(),
        }
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    pub fn path_for(&self, key: &str) -> PathBuf {
        self.directory.join(format!("{}.json", key))
    }
}

#[async_trait]
impl StatsStore for JsonFileStore {
    async fn persist(&self, key: &str, report: &StatsReport) -> Result<PathBuf, StatsError> {
        let path = self.path_for(key);
        let json = serde_json::to_string_pretty(report)?;

        tokio::fs::create_dir_all(&self.directory)
            .await
            .map_err(|source| StatsError::Write {
                path: self.directory.display().to_string(),
                source,
            })?;

        tokio::fs::write(&path, json)
            .await
            .map_err(|source| StatsError::Write {
                path: path.display().to_string(),
                source,
            })?;

        info!("Stats saved to {}", path.display());
        Ok(path)
    }
}

/// Keeps the latest report per key in memory
#[derive(Default)]
pub struct MemoryStatsStore {
    reports: Mutex<BTreeMap<String, StatsReport>>,
}

impl MemoryStatsStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<StatsReport> {
        self.reports.lock().get(key).cloned()
    }

    pub fn keys(&self) -> Vec<String> {
        self.reports.lock().keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.reports.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.reports.lock().is_empty()
    }
}

#[async_trait]
impl StatsStore for MemoryStatsStore {
    async fn persist(&self, key: &str, report: &StatsReport) -> Result<PathBuf, StatsError> {
        self.reports.lock().insert(key.to_string(), report.clone());
        debug!("Stats kept in memory under {}", key);
        Ok(PathBuf::from(key))
    }
}
