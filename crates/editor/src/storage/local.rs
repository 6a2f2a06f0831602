use super::{ProjectData, StorageBackend};
use anyhow::{Context as _, Result};
use futures::FutureExt as _;
use futures::future::LocalBoxFuture;
use log::debug;
use std::io::ErrorKind;
use std::path::PathBuf;
use tokio::fs;

/// Stores the project as a JSON file.
#[derive(Clone, Debug)]
pub struct LocalStorage {
    path: PathBuf,
}

impl LocalStorage {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    async fn write(&self, data: &ProjectData) -> Result<()> {
        let json = serde_json::to_vec_pretty(data)?;
        fs::write(&self.path, json)
            .await
            .with_context(|| format!("writing {}", self.path.display()))?;
        debug!("Stored project to {}", self.path.display());
        Ok(())
    }

    async fn read(&self) -> Result<ProjectData> {
        let bytes = match fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(error) if error.kind() == ErrorKind::NotFound => {
                debug!("No project stored at {}", self.path.display());
                return Ok(ProjectData::default());
            }
            Err(error) => {
                return Err(error).with_context(|| format!("reading {}", self.path.display()));
            }
        };
        serde_json::from_slice(&bytes)
            .with_context(|| format!("decoding {}", self.path.display()))
    }
}

impl StorageBackend for LocalStorage {
    fn store<'call>(&'call self, data: &'call ProjectData) -> LocalBoxFuture<'call, Result<()>> {
        self.write(data).boxed_local()
    }

    fn load(&self) -> LocalBoxFuture<'_, Result<ProjectData>> {
        self.read().boxed_local()
    }
}
