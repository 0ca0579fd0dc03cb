use chrono::NaiveDate;
use housing_allocation::workflows::allocation::{AllocationSnapshot, SnapshotError, SnapshotStore};
use metrics_exporter_prometheus::PrometheusHandle;
use std::path::{Path, PathBuf};
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Snapshot persisted as a pretty-printed JSON document on local disk.
#[derive(Debug, Clone)]
pub(crate) struct JsonFileSnapshotStore {
    path: PathBuf,
}

impl JsonFileSnapshotStore {
    pub(crate) fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub(crate) fn path(&self) -> &Path {
        &self.path
    }

    fn unavailable(&self, err: std::io::Error) -> SnapshotError {
        SnapshotError::Unavailable(format!("{}: {err}", self.path.display()))
    }
}

impl SnapshotStore for JsonFileSnapshotStore {
    fn load(&self) -> Result<AllocationSnapshot, SnapshotError> {
        let raw = std::fs::read_to_string(&self.path).map_err(|err| self.unavailable(err))?;
        AllocationSnapshot::from_json_str(&raw)
    }

    fn save(&self, snapshot: &AllocationSnapshot) -> Result<(), SnapshotError> {
        let json = snapshot.to_json_pretty()?;
        std::fs::write(&self.path, json).map_err(|err| self.unavailable(err))
    }
}

pub(crate) fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|err| format!("failed to parse '{raw}' as YYYY-MM-DD ({err})"))
}
