//! Device presets used for responsive editing.

use crate::error::EditorError;
use anyhow::Result;
use serde::{Deserialize, Serialize};

/// Name of the device selected when nothing else is configured.
pub const DEFAULT_DEVICE: &str = "desktop";

/// A device preset.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Device {
    /// Lookup key; falls back to `name` when empty.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub id: String,
    pub name: String,
    /// Canvas width, e.g. `770px`. `None` means full width.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<String>,
    /// Width used for the media query of rules targeting this device.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width_media: Option<String>,
}

impl Device {
    #[must_use]
    pub fn new(id: &str, name: &str) -> Self {
        Self {
            id: id.to_owned(),
            name: name.to_owned(),
            width: None,
            width_media: None,
        }
    }

    #[must_use]
    pub fn with_width(mut self, width: &str, width_media: &str) -> Self {
        self.width = Some(width.to_owned());
        self.width_media = Some(width_media.to_owned());
        self
    }

    /// The effective id.
    #[must_use]
    pub fn key(&self) -> &str {
        if self.id.is_empty() { &self.name } else { &self.id }
    }

    fn matches(&self, name: &str) -> bool {
        self.key() == name || self.name == name
    }
}

/// Desktop, tablet and two mobile presets.
#[must_use]
pub fn default_devices() -> Vec<Device> {
    vec![
        Device::new(DEFAULT_DEVICE, "Desktop"),
        Device::new("tablet", "Tablet").with_width("770px", "992px"),
        Device::new("mobileLandscape", "Mobile landscape").with_width("568px", "768px"),
        Device::new("mobilePortrait", "Mobile portrait").with_width("320px", "480px"),
    ]
}

/// Known devices and the currently selected one.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DeviceManager {
    devices: Vec<Device>,
    selected: String,
}

impl Default for DeviceManager {
    fn default() -> Self {
        Self {
            devices: default_devices(),
            selected: DEFAULT_DEVICE.to_owned(),
        }
    }
}

impl DeviceManager {
    /// Build from configured devices; an empty list keeps the presets.
    ///
    /// # Errors
    /// Returns [`EditorError::Configuration`] when two devices share an id.
    pub fn new(devices: Vec<Device>, selected: Option<String>) -> Result<Self> {
        let mut manager = Self::default();
        if !devices.is_empty() {
            manager.devices.clear();
            for device in devices {
                manager.add(device)?;
            }
        }
        if let Some(selected) = selected {
            manager.selected = selected;
        }
        Ok(manager)
    }

    #[must_use]
    pub fn get_all(&self) -> &[Device] {
        &self.devices
    }

    /// Find a device by id or display name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Device> {
        self.devices.iter().find(|device| device.matches(name))
    }

    /// Register a device.
    ///
    /// # Errors
    /// Returns [`EditorError::Configuration`] when the id is already taken.
    pub fn add(&mut self, device: Device) -> Result<()> {
        if self.devices.iter().any(|existing| existing.key() == device.key()) {
            return Err(EditorError::Configuration(format!(
                "device '{}' is defined twice",
                device.key()
            ))
            .into());
        }
        self.devices.push(device);
        Ok(())
    }

    /// Store `name` as selected; returns whether it names a known device.
    pub fn select(&mut self, name: &str) -> bool {
        name.clone_into(&mut self.selected);
        self.get(name).is_some()
    }

    #[must_use]
    pub fn selected(&self) -> &str {
        &self.selected
    }

    /// Media condition for rules targeting `name`, if the device has one.
    #[must_use]
    pub fn media_text(&self, name: &str) -> Option<String> {
        self.get(name)?
            .width_media
            .as_ref()
            .map(|width| format!("(max-width: {width})"))
    }
}
