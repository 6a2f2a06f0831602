//! Page-builder editor core.
//!
//! [`Editor`] owns the component tree and the CSS composer, runs commands,
//! tracks the selection and synchronizes the project with a storage backend.

pub mod commands;
pub mod config;
pub mod devices;
mod editor;
pub mod error;
pub mod events;
pub mod plugins;
pub mod selection;
pub mod storage;

pub use commands::{Command, CommandCaller, CommandHandler, CommandManager, CommandOptions};
pub use config::{ComponentsSource, EditorConfig, StorageSetting, StyleSource};
pub use devices::{DEFAULT_DEVICE, Device, DeviceManager};
pub use editor::{Editor, GetCssOptions};
pub use error::EditorError;
pub use events::{CommandHook, EventBus, EventData, EventKey, Listener, ListenerId};
pub use plugins::{Plugin, PluginRef, PluginRegistry, PluginResolver};
pub use selection::{Selection, SelectionChange};
pub use storage::{
    LocalStorage, MemoryStorage, PageData, ProjectData, StorageBackend, StorageConfig,
    StorageManager,
};
