//! Application-owned lab data context.
//!
//! Holds the current immutable dataset snapshot and its load status. Built once
//! at startup and shared with whatever renders the data; `reload` re-runs the
//! loader and swaps the snapshot wholesale.

use std::sync::Arc;

use indexmap::IndexMap;
use serde::Serialize;
use tokio::sync::{Mutex, RwLock};
use tracing::{error, info, instrument};

use crate::core::categories::CategoryTable;
use crate::db::{DataOrigin, LabDataLoader, LoadReport};
use crate::models::AllResults;

pub const NO_DATA_MESSAGE: &str = "No lab data found. Please check your data files.";
pub const LOAD_FAILED_MESSAGE: &str = "Failed to load lab data. Please try again later.";

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", rename_all = "camelCase")]
pub enum LoadStatus {
    Loading,
    #[serde(rename_all = "camelCase")]
    Ready { is_demo: bool },
    Empty { message: String },
    Failed { message: String },
}

impl LoadStatus {
    fn from_report(report: &LoadReport) -> Self {
        if !report.data.is_empty() {
            LoadStatus::Ready { is_demo: report.is_demo() }
        } else if report.failed() {
            LoadStatus::Failed { message: LOAD_FAILED_MESSAGE.to_string() }
        } else {
            LoadStatus::Empty { message: NO_DATA_MESSAGE.to_string() }
        }
    }

    pub fn is_demo(&self) -> bool {
        matches!(self, LoadStatus::Ready { is_demo: true })
    }
}

struct Snapshot {
    data: Arc<AllResults>,
    status: LoadStatus,
}

pub struct LabDataContext {
    loader: LabDataLoader,
    categories: CategoryTable,
    snapshot: RwLock<Snapshot>,
    // Concurrent reload requests run one after another.
    reload_lock: Mutex<()>,
}

impl LabDataContext {
    /// A context with no data yet; call `reload` to populate it.
    pub fn new(loader: LabDataLoader, categories: CategoryTable) -> Self {
        Self {
            loader,
            categories,
            snapshot: RwLock::new(Snapshot {
                data: Arc::new(AllResults::default()),
                status: LoadStatus::Loading,
            }),
            reload_lock: Mutex::new(()),
        }
    }

    /// A context seeded with data that is already in memory.
    pub fn preloaded(
        loader: LabDataLoader,
        categories: CategoryTable,
        data: AllResults,
        origin: DataOrigin,
    ) -> Self {
        let mut context = Self::new(loader, categories);
        let status = LoadStatus::Ready { is_demo: origin == DataOrigin::Demo };
        context.snapshot = RwLock::new(Snapshot { data: Arc::new(data), status });
        context
    }

    /// Re-runs the loader. A load that finds nothing keeps the previous
    /// snapshot and reports the empty or failed status.
    #[instrument(skip(self))]
    pub async fn reload(&self) -> LoadStatus {
        let _guard = self.reload_lock.lock().await;
        self.snapshot.write().await.status = LoadStatus::Loading;

        let report = self.loader.load().await;
        let status = LoadStatus::from_report(&report);

        let mut snapshot = self.snapshot.write().await;
        match &status {
            LoadStatus::Ready { .. } => {
                info!(
                    "Successfully loaded data: {} tests, {} results",
                    report.data.tests.len(),
                    report.data.results.len()
                );
                snapshot.data = Arc::new(report.data);
            }
            LoadStatus::Failed { message } | LoadStatus::Empty { message } => {
                error!("{}", message);
            }
            LoadStatus::Loading => {}
        }
        snapshot.status = status.clone();
        status
    }

    pub async fn snapshot(&self) -> Arc<AllResults> {
        self.snapshot.read().await.data.clone()
    }

    pub async fn status(&self) -> LoadStatus {
        self.snapshot.read().await.status.clone()
    }

    pub async fn test_categories(&self) -> IndexMap<String, Vec<String>> {
        let data = self.snapshot().await;
        self.categories.categorize(&data)
    }
}
