//! API module for the labtrend dashboard
//!
//! JSON endpoints over the current lab data snapshot and the custom dashboard
//! layout.

use std::sync::Arc;

use tokio::sync::Mutex;

use crate::config::Config;
use crate::context::LabDataContext;
use crate::core::layout::{DashboardLayout, TestSelection};

pub mod handlers;
pub mod middleware;
pub mod routes;

pub use routes::configure;

/// Shared application state
pub struct AppState {
    pub context: Arc<LabDataContext>,
    pub dashboard: Mutex<DashboardLayout>,
    /// Pending "Add Graph" checklist. Locked after `dashboard` when both are held.
    pub selection: Mutex<TestSelection>,
    pub graphs_per_row: usize,
}

impl AppState {
    pub fn new(context: Arc<LabDataContext>, config: &Config) -> Self {
        Self {
            context,
            dashboard: Mutex::new(DashboardLayout::new()),
            selection: Mutex::new(TestSelection::default()),
            graphs_per_row: config.dashboard.graphs_per_row,
        }
    }
}
