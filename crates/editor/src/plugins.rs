//! Plugin registry. Plugins are looked up by name in an explicit registry,
//! with an optional resolver consulted for names it does not hold.

use crate::Editor;
use anyhow::Result;
use core::fmt::{Debug, Formatter, Result as FmtResult};
use indexmap::IndexMap;
use serde_json::Value;
use std::rc::Rc;

/// A plugin: `(editor, options)`, run once during initialization.
pub type Plugin = Rc<dyn Fn(&mut Editor, &Value) -> Result<()>>;

/// Fallback lookup for plugin names missing from a [`PluginRegistry`].
pub trait PluginResolver {
    fn resolve(&self, name: &str) -> Option<Plugin>;
}

/// A plugin given by name or as a value.
#[derive(Clone)]
pub enum PluginRef {
    Named(String),
    Inline(Plugin),
}

impl PluginRef {
    /// Wrap a closure as an inline plugin.
    pub fn inline<F>(plugin: F) -> Self
    where
        F: Fn(&mut Editor, &Value) -> Result<()> + 'static,
    {
        Self::Inline(Rc::new(plugin))
    }

    #[must_use]
    pub fn name(&self) -> Option<&str> {
        match self {
            Self::Named(name) => Some(name),
            Self::Inline(_) => None,
        }
    }
}

impl Debug for PluginRef {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> FmtResult {
        match self {
            Self::Named(name) => formatter.debug_tuple("Named").field(name).finish(),
            Self::Inline(_) => formatter.write_str("Inline(..)"),
        }
    }
}

impl From<&str> for PluginRef {
    fn from(name: &str) -> Self {
        Self::Named(name.to_owned())
    }
}

/// Named plugins available to editors.
#[derive(Clone, Default)]
pub struct PluginRegistry {
    plugins: IndexMap<String, Plugin>,
    resolver: Option<Rc<dyn PluginResolver>>,
}

impl PluginRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Same registry falling back to `resolver` for unknown names.
    #[must_use]
    pub fn with_resolver(mut self, resolver: Rc<dyn PluginResolver>) -> Self {
        self.resolver = Some(resolver);
        self
    }

    /// Register or replace a plugin.
    pub fn add<F>(&mut self, name: &str, plugin: F)
    where
        F: Fn(&mut Editor, &Value) -> Result<()> + 'static,
    {
        self.plugins.insert(name.to_owned(), Rc::new(plugin));
    }

    /// Look `name` up in the registry, then in the resolver.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<Plugin> {
        self.plugins
            .get(name)
            .map(Rc::clone)
            .or_else(|| self.resolver.as_ref()?.resolve(name))
    }

    #[must_use]
    pub fn has(&self, name: &str) -> bool {
        self.get(name).is_some()
    }
}
