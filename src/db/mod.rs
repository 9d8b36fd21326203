//! Lab data loading for the labtrend dashboard
//!
//! Data is loaded in two phases. The real phase reads an index of file names
//! and merges every listed file. Only when that yields nothing is the fixed
//! demo file set read. A failure inside a phase downgrades that phase to "no
//! data" and never stops the next phase from running.

use std::sync::Arc;

use futures::future::join_all;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, error, info, instrument, warn};

use crate::config::{DataConfig, SourceKind};
use crate::error::{LabError, Result};
use crate::models::AllResults;

pub mod source;

pub use source::{DataSource, FsDataSource};

#[cfg(feature = "remote")]
pub use source::HttpDataSource;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DataOrigin {
    Real,
    Demo,
}

/// Relative locations tried by the loader.
#[derive(Debug, Clone, PartialEq)]
pub struct LoaderSettings {
    pub real_dir: String,
    pub demo_dir: String,
    pub index_file: String,
    pub demo_files: Vec<String>,
}

impl Default for LoaderSettings {
    fn default() -> Self {
        Self::from(&DataConfig::default())
    }
}

impl From<&DataConfig> for LoaderSettings {
    fn from(config: &DataConfig) -> Self {
        Self {
            real_dir: config.real_dir.clone(),
            demo_dir: config.demo_dir.clone(),
            index_file: config.index_file.clone(),
            demo_files: config.demo_files.clone(),
        }
    }
}

/// Outcome of one load. An empty `data` with no failed phases means "no data
/// configured"; with failed phases it means the load failed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LoadReport {
    pub data: AllResults,
    pub origin: Option<DataOrigin>,
    pub failed_phases: Vec<DataOrigin>,
    pub dropped_results: usize,
}

impl LoadReport {
    pub fn is_demo(&self) -> bool {
        self.origin == Some(DataOrigin::Demo)
    }

    pub fn failed(&self) -> bool {
        self.data.is_empty() && !self.failed_phases.is_empty()
    }
}

pub struct LabDataLoader {
    source: Arc<dyn DataSource>,
    settings: LoaderSettings,
}

impl LabDataLoader {
    pub fn new(source: Arc<dyn DataSource>, settings: LoaderSettings) -> Self {
        Self { source, settings }
    }

    pub fn from_config(config: &DataConfig) -> Result<Self> {
        Ok(Self::new(source_from_config(config)?, LoaderSettings::from(config)))
    }

    #[instrument(skip(self))]
    pub async fn load(&self) -> LoadReport {
        let mut report = LoadReport::default();

        for origin in [DataOrigin::Real, DataOrigin::Demo] {
            match self.load_phase(origin).await {
                Ok((data, dropped)) if !data.is_empty() => {
                    info!(
                        "Using {} lab data from {}: {} tests, {} results",
                        if origin == DataOrigin::Real { "real" } else { "demo" },
                        self.source.describe(),
                        data.tests.len(),
                        data.results.len()
                    );
                    report.data = data;
                    report.origin = Some(origin);
                    report.dropped_results = dropped;
                    return report;
                }
                Ok(_) => debug!("No {:?} lab data found", origin),
                Err(e) => {
                    warn!("Failed to load {:?} lab data: {}", origin, e);
                    report.failed_phases.push(origin);
                }
            }
        }

        error!("No lab data found");
        report
    }

    async fn load_phase(&self, origin: DataOrigin) -> Result<(AllResults, usize)> {
        let mut data = match origin {
            DataOrigin::Real => self.load_real().await?,
            DataOrigin::Demo => self.load_demo().await?,
        };
        let dropped = data.retain_parseable_dates();
        if dropped > 0 {
            warn!("Dropped {} {:?} results with unparseable dates", dropped, origin);
        }
        Ok((data, dropped))
    }

    async fn load_real(&self) -> Result<AllResults> {
        let index_path = join_path(&self.settings.real_dir, &self.settings.index_file);
        let files: Vec<String> = match self.fetch_json(&index_path).await? {
            Some(files) => files,
            None => return Ok(AllResults::default()),
        };

        let paths: Vec<String> = files
            .iter()
            .map(|file| join_path(&self.settings.real_dir, file))
            .collect();
        let fetched = join_all(paths.iter().map(|path| self.fetch_json::<AllResults>(path))).await;

        let mut merged = AllResults::default();
        for file in fetched {
            if let Some(data) = file? {
                merged.merge(data);
            }
        }
        Ok(merged)
    }

    async fn load_demo(&self) -> Result<AllResults> {
        let mut merged = AllResults::default();
        for file in &self.settings.demo_files {
            let path = join_path(&self.settings.demo_dir, file);
            if let Some(data) = self.fetch_json::<AllResults>(&path).await? {
                merged.merge(data);
            }
        }
        Ok(merged)
    }

    async fn fetch_json<T: DeserializeOwned>(&self, path: &str) -> Result<Option<T>> {
        match self.source.fetch(path).await? {
            Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            None => Ok(None),
        }
    }
}

fn join_path(dir: &str, file: &str) -> String {
    let dir = dir.trim_end_matches('/');
    if dir.is_empty() {
        file.to_string()
    } else {
        format!("{}/{}", dir, file)
    }
}

/// Builds the configured data source.
pub fn source_from_config(config: &DataConfig) -> Result<Arc<dyn DataSource>> {
    match config.source {
        SourceKind::Fs => Ok(Arc::new(FsDataSource::new(config.root.clone()))),
        #[cfg(feature = "remote")]
        SourceKind::Http => {
            let base_url = config.base_url.as_deref().ok_or_else(|| {
                LabError::Config(::config::ConfigError::Message(
                    "data.base_url is required for the http source".into(),
                ))
            })?;
            Ok(Arc::new(HttpDataSource::new(base_url)?))
        }
        #[cfg(not(feature = "remote"))]
        SourceKind::Http => Err(LabError::Config(::config::ConfigError::Message(
            "the http data source needs the `remote` feature".into(),
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::source::MockDataSource;
    use serde_json::json;

    fn file(tests: &[&str], results: &[(&str, &str)]) -> Vec<u8> {
        let tests: Vec<_> = tests.iter().map(|name| json!({ "name": name })).collect();
        let results: Vec<_> = results
            .iter()
            .map(|(test, date)| {
                json!({
                    "test": test,
                    "date": date,
                    "result": { "result": 1.0, "resultValid": true, "resultAcceptability": "Excellent" },
                    "resultNotes": "",
                    "additionalInfo": ""
                })
            })
            .collect();
        serde_json::to_vec(&json!({ "tests": tests, "results": results })).unwrap()
    }

    fn loader(mut mock: MockDataSource) -> LabDataLoader {
        mock.expect_describe().return_const("mock source".to_string());
        LabDataLoader::new(Arc::new(mock), LoaderSettings::default())
    }

    #[tokio::test]
    async fn test_real_data_short_circuits_demo() {
        let mut mock = MockDataSource::new();
        mock.expect_fetch()
            .withf(|path| path == "real/index.json")
            .times(1)
            .returning(|_| Ok(Some(br#"["a.json", "b.json", "gone.json"]"#.to_vec())));
        mock.expect_fetch()
            .withf(|path| path == "real/a.json")
            .returning(|_| Ok(Some(file(&["Glucose"], &[("Glucose", "01 Jan 2024")]))));
        mock.expect_fetch()
            .withf(|path| path == "real/b.json")
            .returning(|_| Ok(Some(file(&["Glucose"], &[("Insulin", "02 Jan 2024")]))));
        mock.expect_fetch()
            .withf(|path| path == "real/gone.json")
            .returning(|_| Ok(None));

        let report = loader(mock).load().await;
        assert_eq!(report.origin, Some(DataOrigin::Real));
        assert!(!report.is_demo());
        // Concatenated without de-duplication, in index order.
        assert_eq!(report.data.tests.len(), 2);
        assert_eq!(report.data.results[0].test, "Glucose");
        assert_eq!(report.data.results[1].test, "Insulin");
    }

    #[tokio::test]
    async fn test_empty_real_index_falls_back_to_demo() {
        let mut mock = MockDataSource::new();
        mock.expect_fetch()
            .withf(|path| path == "real/index.json")
            .returning(|_| Ok(Some(b"[]".to_vec())));
        mock.expect_fetch()
            .withf(|path| path == "demo/labData.json")
            .returning(|_| Ok(Some(file(&["Glucose"], &[("Glucose", "01 Jan 2024")]))));
        mock.expect_fetch()
            .withf(|path| path == "demo/additional.json")
            .returning(|_| Ok(None));

        let report = loader(mock).load().await;
        assert!(report.is_demo());
        assert_eq!(report.data.results.len(), 1);
        assert!(report.failed_phases.is_empty());
    }

    #[tokio::test]
    async fn test_real_failure_still_tries_demo() {
        let mut mock = MockDataSource::new();
        mock.expect_fetch()
            .withf(|path| path == "real/index.json")
            .returning(|_| Ok(Some(br#"["broken.json"]"#.to_vec())));
        mock.expect_fetch()
            .withf(|path| path == "real/broken.json")
            .returning(|_| Ok(Some(b"{ not json".to_vec())));
        mock.expect_fetch()
            .withf(|path| path.starts_with("demo/"))
            .times(2)
            .returning(|_| Ok(Some(file(&["HBA1c"], &[]))));

        let report = loader(mock).load().await;
        assert!(report.is_demo());
        assert_eq!(report.data.tests.len(), 2);
        assert_eq!(report.failed_phases, vec![DataOrigin::Real]);
        assert!(!report.failed());
    }

    #[tokio::test]
    async fn test_nothing_anywhere_is_empty_not_failed() {
        let mut mock = MockDataSource::new();
        mock.expect_fetch().returning(|_| Ok(None));

        let report = loader(mock).load().await;
        assert!(report.data.is_empty());
        assert_eq!(report.origin, None);
        assert!(!report.failed());
    }

    #[tokio::test]
    async fn test_all_phases_erroring_is_failed() {
        let mut mock = MockDataSource::new();
        mock.expect_fetch().returning(|_| {
            Err(LabError::Io(std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied")))
        });

        let report = loader(mock).load().await;
        assert!(report.failed());
        assert_eq!(report.failed_phases, vec![DataOrigin::Real, DataOrigin::Demo]);
    }

    #[tokio::test]
    async fn test_unparseable_dates_dropped_at_load() {
        let mut mock = MockDataSource::new();
        mock.expect_fetch()
            .withf(|path| path == "real/index.json")
            .returning(|_| Ok(Some(br#"["a.json"]"#.to_vec())));
        mock.expect_fetch()
            .withf(|path| path == "real/a.json")
            .returning(|_| {
                Ok(Some(file(
                    &["Glucose"],
                    &[("Glucose", "01 Jan 2024"), ("Glucose", "2024/01/02")],
                )))
            });

        let report = loader(mock).load().await;
        assert_eq!(report.origin, Some(DataOrigin::Real));
        assert_eq!(report.dropped_results, 1);
        assert_eq!(report.data.results.len(), 1);
    }

    #[test]
    fn test_join_path() {
        assert_eq!(join_path("real/", "index.json"), "real/index.json");
        assert_eq!(join_path("", "index.json"), "index.json");
    }
}
