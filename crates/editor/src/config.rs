//! Editor configuration.
//!
//! Configuration is read from JSON (camelCase keys) or built in code, and a
//! few settings can be overridden from `TROWEL_*` environment variables.

use crate::devices::Device;
use crate::error::EditorError;
use crate::plugins::PluginRef;
use crate::storage::StorageConfig;
use anyhow::Result;
use css::RuleDefinition;
use html::ComponentDefinition;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::env;

/// CSS prepended to every serialization unless disabled per call.
pub const DEFAULT_PROTECTED_CSS: &str = "* { box-sizing: border-box; } body {margin: 0;}";

/// CSS applied to the canvas frame only.
pub const DEFAULT_BASE_CSS: &str = "* { box-sizing: border-box; } body { background-color: #fff; margin: 0; padding: 0; } \
     body, html { height: 100%; } * ::-webkit-scrollbar-track { background: rgba(0, 0, 0, 0.1) } \
     * ::-webkit-scrollbar-thumb { background: rgba(255, 255, 255, 0.2) } \
     * ::-webkit-scrollbar { width: 10px }";

/// Seed components: markup or definitions.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ComponentsSource {
    Markup(String),
    Definitions(Vec<ComponentDefinition>),
    Single(ComponentDefinition),
}

/// Seed styles: CSS text or rule definitions.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StyleSource {
    Css(String),
    Rules(Vec<RuleDefinition>),
}

/// `storageManager`: `false`, a backend type, or full settings.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StorageSetting {
    Enabled(bool),
    Type(String),
    Config(StorageConfig),
}

impl Default for StorageSetting {
    fn default() -> Self {
        Self::Config(StorageConfig::default())
    }
}

impl StorageSetting {
    /// The effective settings.
    #[must_use]
    pub fn resolve(&self) -> StorageConfig {
        match self {
            Self::Enabled(true) => StorageConfig::default(),
            Self::Enabled(false) => StorageConfig::disabled(),
            Self::Type(storage_type) => StorageConfig {
                storage_type: storage_type.clone(),
                ..StorageConfig::default()
            },
            Self::Config(config) => config.clone(),
        }
    }
}

/// `deviceManager` settings.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DeviceConfig {
    /// Replaces the preset list when not empty.
    pub devices: Vec<Device>,
    /// Initially selected device.
    pub default: Option<String>,
}

/// `commands` settings.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CommandsConfig {
    /// Skip re-running an active stoppable command unless forced.
    pub strict: bool,
}

impl Default for CommandsConfig {
    fn default() -> Self {
        Self { strict: true }
    }
}

/// Options for [`crate::Editor::init`].
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EditorConfig {
    /// Host container markup, imported when `from_element` is set.
    pub container: Option<String>,
    /// Import from `container` instead of `components`/`style`.
    pub from_element: bool,
    pub components: Option<ComponentsSource>,
    pub style: Option<StyleSource>,
    pub protected_css: String,
    pub base_css: String,
    /// Default for [`crate::GetCssOptions::keep_unused_styles`].
    pub keep_unused_styles: bool,
    pub storage_manager: StorageSetting,
    pub device_manager: DeviceConfig,
    pub commands: CommandsConfig,
    /// Options passed to plugins, keyed by plugin name.
    pub plugins_opts: Map<String, Value>,
    /// Plugins run in order during initialization.
    #[serde(skip)]
    pub plugins: Vec<PluginRef>,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            container: None,
            from_element: false,
            components: None,
            style: None,
            protected_css: DEFAULT_PROTECTED_CSS.to_owned(),
            base_css: DEFAULT_BASE_CSS.to_owned(),
            keep_unused_styles: false,
            storage_manager: StorageSetting::default(),
            device_manager: DeviceConfig::default(),
            commands: CommandsConfig::default(),
            plugins_opts: Map::new(),
            plugins: Vec::new(),
        }
    }
}

impl EditorConfig {
    /// Parse a JSON configuration.
    ///
    /// # Errors
    /// Returns [`EditorError::Configuration`] for malformed JSON or unexpected option types.
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json)
            .map_err(|error| EditorError::Configuration(error.to_string()).into())
    }

    /// Same configuration with a plugin appended.
    #[must_use]
    pub fn with_plugin(mut self, plugin: impl Into<PluginRef>) -> Self {
        self.plugins.push(plugin.into());
        self
    }

    /// Same configuration with seed markup.
    #[must_use]
    pub fn with_components(mut self, markup: &str) -> Self {
        self.components = Some(ComponentsSource::Markup(markup.to_owned()));
        self
    }

    /// Same configuration with seed CSS.
    #[must_use]
    pub fn with_style(mut self, css: &str) -> Self {
        self.style = Some(StyleSource::Css(css.to_owned()));
        self
    }

    /// Same configuration with `storage` settings.
    #[must_use]
    pub fn with_storage(mut self, storage: StorageConfig) -> Self {
        self.storage_manager = StorageSetting::Config(storage);
        self
    }

    /// Override settings from the environment.
    ///
    /// Reads the following variables:
    /// - `TROWEL_STORAGE_TYPE`: backend id, `none` disables persistence
    /// - `TROWEL_STORAGE_PATH`: file used by the `local` backend
    /// - `TROWEL_AUTOSAVE`: `1` or `0`
    /// - `TROWEL_KEEP_UNUSED_STYLES`: `1` keeps rules no component uses
    /// - `TROWEL_DEVICE`: initially selected device
    #[must_use]
    pub fn apply_env(mut self) -> Self {
        let mut storage = self.storage_manager.resolve();
        if let Ok(storage_type) = env::var("TROWEL_STORAGE_TYPE") {
            storage.storage_type = storage_type;
        }
        if let Ok(path) = env::var("TROWEL_STORAGE_PATH") {
            storage.path = path;
        }
        if let Ok(autosave) = env::var("TROWEL_AUTOSAVE") {
            storage.autosave = autosave == "1";
        }
        self.storage_manager = StorageSetting::Config(storage);
        if let Ok(keep) = env::var("TROWEL_KEEP_UNUSED_STYLES") {
            self.keep_unused_styles = keep == "1";
        }
        if let Ok(device) = env::var("TROWEL_DEVICE") {
            self.device_manager.default = Some(device);
        }
        self
    }
}
