use super::Editor;
use crate::error::EditorError;
use crate::events::{EventData, EventKey};
use crate::storage::{ProjectData, StorageBackend};
use anyhow::{Result, anyhow};
use log::{debug, error, info};
use std::rc::Rc;

impl Editor {
    fn storage_failure(&self, failure: &anyhow::Error) -> anyhow::Error {
        let message = format!("{failure:#}");
        error!("Storage failed: {message}");
        self.emit(&EventKey::StorageError, &mut EventData::Error(&message));
        EditorError::Storage(message).into()
    }

    /// The active backend, `None` when storage is disabled.
    fn active_backend(&self) -> Result<Option<Rc<dyn StorageBackend>>> {
        if !self.storage.is_enabled() {
            return Ok(None);
        }
        match self.storage.current() {
            Some(backend) => Ok(Some(backend)),
            None => {
                let missing = anyhow!(
                    "storage '{}' is not registered",
                    self.storage.config().storage_type
                );
                Err(self.storage_failure(&missing))
            }
        }
    }

    /// Persist the current project through the active backend.
    ///
    /// With storage disabled nothing is written and the snapshot is returned.
    ///
    /// # Errors
    /// Returns [`EditorError::Storage`] when the backend fails or is not registered.
    pub async fn store(&mut self) -> Result<ProjectData> {
        let data = self.get_project_data();
        let Some(backend) = self.active_backend()? else {
            debug!("Storage disabled, skipping store");
            return Ok(data);
        };
        if let Err(failure) = backend.store(&data).await {
            return Err(self.storage_failure(&failure));
        }
        self.changes = 0;
        self.emit(&EventKey::Store, &mut EventData::Project(&data));
        info!("Stored project with {} rules", data.styles.len());
        Ok(data)
    }

    /// Load the project from the active backend into the model.
    ///
    /// An empty payload leaves the model untouched. With storage disabled an
    /// empty payload is returned.
    ///
    /// # Errors
    /// Returns [`EditorError::Storage`] when the backend fails or is not
    /// registered; the model is unchanged.
    pub async fn load(&mut self) -> Result<ProjectData> {
        let Some(backend) = self.active_backend()? else {
            debug!("Storage disabled, skipping load");
            return Ok(ProjectData::default());
        };
        let data = match backend.load().await {
            Ok(data) => data,
            Err(failure) => return Err(self.storage_failure(&failure)),
        };
        self.load_project_data(&data);
        self.emit(&EventKey::Load, &mut EventData::Project(&data));
        info!("Loaded project with {} rules", data.styles.len());
        Ok(data)
    }

    /// Load once if autoload is configured, then become ready.
    ///
    /// # Errors
    /// Returns [`EditorError::Storage`] when the load fails; the editor still becomes ready.
    pub async fn load_on_start(&mut self) -> Result<()> {
        let config = self.storage.config();
        let result = if config.autoload && self.storage.is_enabled() {
            self.load().await.map(|_| ())
        } else {
            Ok(())
        };
        self.mark_ready();
        result
    }

    /// Store when autosave is on and enough changes piled up.
    ///
    /// Returns whether a store happened.
    ///
    /// # Errors
    /// Returns [`EditorError::Storage`] when the backend fails.
    pub async fn autosave(&mut self) -> Result<bool> {
        let config = self.storage.config();
        if !config.autosave || !self.storage.is_enabled() {
            return Ok(false);
        }
        if self.changes < config.steps_before_save.max(1) {
            return Ok(false);
        }
        self.store().await?;
        Ok(true)
    }
}
