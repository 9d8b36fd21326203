//! Labtrend core library
//!
//! This module exports the core functionality of the labtrend lab result
//! dashboard: data model, loading, aggregation, chart building and the
//! custom dashboard layout.

pub mod api;
pub mod context;
pub mod core;
pub mod db;
pub mod error;
pub mod models;
pub mod ui;

pub use context::{LabDataContext, LoadStatus};
pub use error::{LabError, Result};

/// Application configuration
pub mod config {
    use std::path::PathBuf;

    use serde::Deserialize;

    use crate::core::categories::{Category, CategoryTable};
    use crate::core::layout::DEFAULT_GRAPHS_PER_ROW;

    #[derive(Debug, Clone, Default, Deserialize)]
    #[serde(default)]
    pub struct Config {
        pub server: ServerConfig,
        pub data: DataConfig,
        pub dashboard: DashboardConfig,
        pub logging: LoggingConfig,
        /// Replaces the built-in category keyword table when present.
        pub categories: Option<Vec<Category>>,
    }

    impl Config {
        pub fn category_table(&self) -> CategoryTable {
            match &self.categories {
                Some(categories) => CategoryTable::new(categories.clone()),
                None => CategoryTable::default(),
            }
        }
    }

    #[derive(Debug, Clone, Deserialize)]
    #[serde(default)]
    pub struct ServerConfig {
        pub host: String,
        pub port: u16,
        /// Allowed browser origin; any origin when unset.
        pub cors_origin: Option<String>,
    }

    impl Default for ServerConfig {
        fn default() -> Self {
            Self {
                host: "127.0.0.1".into(),
                port: 8080,
                cors_origin: None,
            }
        }
    }

    #[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
    #[serde(rename_all = "lowercase")]
    pub enum SourceKind {
        Fs,
        Http,
    }

    #[derive(Debug, Clone, Deserialize)]
    #[serde(default)]
    pub struct DataConfig {
        pub source: SourceKind,
        /// Directory holding `real/` and `demo/` for the fs source.
        pub root: PathBuf,
        /// Base URL holding `real/` and `demo/` for the http source.
        pub base_url: Option<String>,
        pub real_dir: String,
        pub demo_dir: String,
        pub index_file: String,
        pub demo_files: Vec<String>,
        /// Serve the fs root under `/data`.
        pub serve_static: bool,
    }

    impl Default for DataConfig {
        fn default() -> Self {
            Self {
                source: SourceKind::Fs,
                root: PathBuf::from("public/data"),
                base_url: None,
                real_dir: "real".into(),
                demo_dir: "demo".into(),
                index_file: "index.json".into(),
                demo_files: vec!["labData.json".into(), "additional.json".into()],
                serve_static: true,
            }
        }
    }

    #[derive(Debug, Clone, Deserialize)]
    #[serde(default)]
    pub struct DashboardConfig {
        pub graphs_per_row: usize,
    }

    impl Default for DashboardConfig {
        fn default() -> Self {
            Self {
                graphs_per_row: DEFAULT_GRAPHS_PER_ROW,
            }
        }
    }

    #[derive(Debug, Clone, Deserialize)]
    #[serde(default)]
    pub struct LoggingConfig {
        pub level: String,
        pub json: bool,
    }

    impl Default for LoggingConfig {
        fn default() -> Self {
            Self {
                level: "info".into(),
                json: false,
            }
        }
    }

    /// Load configuration from file
    pub fn load_config() -> Result<Config, ::config::ConfigError> {
        // Environment-specific settings override the defaults
        let env = std::env::var("LABTREND_ENV").unwrap_or_else(|_| "development".into());

        ::config::Config::builder()
            .add_source(::config::File::with_name("config/default").required(false))
            .add_source(::config::File::with_name(&format!("config/{}", env)).required(false))
            // Environment variables win, e.g. LABTREND_SERVER__PORT=9000
            .add_source(
                ::config::Environment::with_prefix("LABTREND")
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()
    }

}
