//! State file store
//!
//! Writes the assembled component pool and run summary to JSON files on
//! the controller. Writes go through a temp file plus rename so readers
//! never observe a half-written state file.

use std::path::{Path, PathBuf};

use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info};

use fleetprobe_api::summary::RunSummary;
use fleetprobe_model::ComponentPool;

use crate::error::PublishError;

const COMPONENTS_FILE: &str = "components.json";
const SUMMARY_FILE: &str = "summary.json";

/// JSON state store rooted at a directory on the controller
#[derive(Debug, Clone)]
pub struct StateStore {
    dir: PathBuf,
}

impl StateStore {
    /// Create a store rooted at `dir`
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// The directory state files live in
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Persist a collection result: components plus summary
    pub async fn publish(
        &self,
        pool: &ComponentPool,
        summary: &RunSummary,
    ) -> Result<(), PublishError> {
        fs::create_dir_all(&self.dir).await?;

        self.write_json(COMPONENTS_FILE, pool).await?;
        self.write_json(SUMMARY_FILE, summary).await?;

        info!(
            dir = %self.dir.display(),
            components = pool.len(),
            "state files written"
        );

        Ok(())
    }

    /// Load the component pool from the previous run, if any
    pub async fn load_components(&self) -> Result<Option<ComponentPool>, PublishError> {
        let path = self.dir.join(COMPONENTS_FILE);

        match fs::read_to_string(&path).await {
            Ok(text) => Ok(Some(serde_json::from_str(&text)?)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Load the summary from the previous run, if any
    pub async fn load_summary(&self) -> Result<Option<RunSummary>, PublishError> {
        let path = self.dir.join(SUMMARY_FILE);

        match fs::read_to_string(&path).await {
            Ok(text) => Ok(Some(serde_json::from_str(&text)?)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Serialize `value` to `name`, atomically via temp file and rename
    async fn write_json<T: serde::Serialize>(
        &self,
        name: &str,
        value: &T,
    ) -> Result<(), PublishError> {
        let json = serde_json::to_vec_pretty(value)?;

        let tmp = self.dir.join(format!(".{name}.tmp"));
        let path = self.dir.join(name);

        let mut file = fs::File::create(&tmp).await?;
        file.write_all(&json).await?;
        file.sync_all().await?;
        drop(file);

        fs::rename(&tmp, &path).await?;

        debug!(path = %path.display(), bytes = json.len(), "wrote state file");

        Ok(())
    }
}
