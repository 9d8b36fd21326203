//! Where lab data files are read from.

use std::path::PathBuf;

use async_trait::async_trait;
use tracing::debug;

use crate::error::Result;

/// A store of JSON lab data files addressed by relative path.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DataSource: Send + Sync {
    /// Raw contents of the file at `path`, or `None` when it does not exist.
    async fn fetch(&self, path: &str) -> Result<Option<Vec<u8>>>;

    fn describe(&self) -> String;
}

/// Files under a local directory.
#[derive(Debug, Clone)]
pub struct FsDataSource {
    root: PathBuf,
}

impl FsDataSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

#[async_trait]
impl DataSource for FsDataSource {
    async fn fetch(&self, path: &str) -> Result<Option<Vec<u8>>> {
        let full = self.root.join(path);
        match tokio::fs::read(&full).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("{} not found", full.display());
                Ok(None)
            }
            Err(e) => Err(e.into()),
        }
    }

    fn describe(&self) -> String {
        format!("directory {}", self.root.display())
    }
}

#[cfg(feature = "remote")]
pub use remote::HttpDataSource;

#[cfg(feature = "remote")]
mod remote {
    use async_trait::async_trait;
    use reqwest::Client;
    use tracing::debug;
    use url::Url;

    use super::DataSource;
    use crate::error::Result;

    /// Static files served over HTTP. Any non-success status counts as absent.
    #[derive(Debug, Clone)]
    pub struct HttpDataSource {
        client: Client,
        base: Url,
    }

    impl HttpDataSource {
        pub fn new(base_url: &str) -> Result<Self> {
            let mut base = base_url.to_string();
            if !base.ends_with('/') {
                base.push('/');
            }
            Ok(Self {
                client: Client::new(),
                base: Url::parse(&base)?,
            })
        }
    }

    #[async_trait]
    impl DataSource for HttpDataSource {
        async fn fetch(&self, path: &str) -> Result<Option<Vec<u8>>> {
            let url = self.base.join(path)?;
            let response = self.client.get(url.clone()).send().await?;
            if !response.status().is_success() {
                debug!("{} returned {}", url, response.status());
                return Ok(None);
            }
            Ok(Some(response.bytes().await?.to_vec()))
        }

        fn describe(&self) -> String {
            self.base.to_string()
        }
    }
}
