//! Project snapshots and pluggable persistence backends.

mod local;
mod memory;

pub use local::LocalStorage;
pub use memory::MemoryStorage;

use css::RuleDefinition;
use futures::future::LocalBoxFuture;
use html::ComponentDefinition;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::rc::Rc;

/// One page of a project.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PageData {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// The page wrapper with its whole subtree.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub component: Option<ComponentDefinition>,
}

/// Full editor snapshot handed to backends.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProjectData {
    pub styles: Vec<RuleDefinition>,
    pub pages: Vec<PageData>,
}

impl ProjectData {
    /// Whether the payload carries no styles and no pages.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.styles.is_empty() && self.pages.is_empty()
    }
}

/// Persistence adapter. Futures are not `Send`; the editor is single-threaded.
pub trait StorageBackend {
    /// Persist `data`.
    fn store<'call>(&'call self, data: &'call ProjectData) -> LocalBoxFuture<'call, anyhow::Result<()>>;

    /// Read the last stored payload. Nothing stored yet yields empty data.
    fn load(&self) -> LocalBoxFuture<'_, anyhow::Result<ProjectData>>;
}

fn default_type() -> String {
    "local".to_owned()
}

const fn enabled() -> bool {
    true
}

const fn one() -> usize {
    1
}

fn default_path() -> String {
    "trowel-project.json".to_owned()
}

/// Storage settings.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StorageConfig {
    /// Backend id. `""` or `"none"` disables persistence.
    #[serde(rename = "type", default = "default_type")]
    pub storage_type: String,
    #[serde(default = "enabled")]
    pub autoload: bool,
    #[serde(default = "enabled")]
    pub autosave: bool,
    /// Changes needed before [`crate::Editor::autosave`] stores.
    #[serde(default = "one")]
    pub steps_before_save: usize,
    /// File used by the `local` backend.
    #[serde(default = "default_path")]
    pub path: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            storage_type: default_type(),
            autoload: true,
            autosave: true,
            steps_before_save: 1,
            path: default_path(),
        }
    }
}

impl StorageConfig {
    /// Settings with persistence turned off.
    #[must_use]
    pub fn disabled() -> Self {
        Self {
            storage_type: String::new(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn is_enabled(&self) -> bool {
        !self.storage_type.is_empty() && self.storage_type != "none"
    }
}

/// Registered backends and the configuration picking the active one.
#[derive(Clone)]
pub struct StorageManager {
    config: StorageConfig,
    backends: IndexMap<String, Rc<dyn StorageBackend>>,
}

impl StorageManager {
    /// A manager with the `local` file backend registered.
    #[must_use]
    pub fn new(config: StorageConfig) -> Self {
        let mut backends: IndexMap<String, Rc<dyn StorageBackend>> = IndexMap::new();
        backends.insert("local".to_owned(), Rc::new(LocalStorage::new(&config.path)));
        Self { config, backends }
    }

    /// Register or replace a backend.
    pub fn add(&mut self, id: &str, backend: Rc<dyn StorageBackend>) {
        self.backends.insert(id.to_owned(), backend);
    }

    #[must_use]
    pub fn get(&self, id: &str) -> Option<Rc<dyn StorageBackend>> {
        self.backends.get(id).map(Rc::clone)
    }

    /// The backend selected by the configured type, if persistence is on.
    #[must_use]
    pub fn current(&self) -> Option<Rc<dyn StorageBackend>> {
        if !self.is_enabled() {
            return None;
        }
        self.get(&self.config.storage_type)
    }

    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.config.is_enabled()
    }

    #[must_use]
    pub const fn config(&self) -> &StorageConfig {
        &self.config
    }

    /// Switch the active backend.
    pub fn set_type(&mut self, storage_type: &str) {
        storage_type.clone_into(&mut self.config.storage_type);
    }
}
