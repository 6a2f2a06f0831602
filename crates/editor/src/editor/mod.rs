//! The editor facade tying the document model, commands, selection,
//! devices and storage together.

mod canvas;
mod commands;
mod selection;
mod storage;

use crate::commands::CommandManager;
use crate::config::{ComponentsSource, EditorConfig, StyleSource};
use crate::devices::DeviceManager;
use crate::error::EditorError;
use crate::events::{EventBus, EventData, EventKey, ListenerId};
use crate::plugins::{PluginRef, PluginRegistry};
use crate::selection::Selection;
use crate::storage::{PageData, ProjectData, StorageManager};
use anyhow::Result;
use core::slice;
use css::{
    CssComposer, CssOptions, CssRule, RuleDefinition, RuleId, RuleScope, StyleMap, UsedSelectors,
};
use css_syntax::parse_stylesheet;
use html::{ComponentDefinition, ComponentTree, ImportSource, NodeId, parse_markup};
use log::{debug, error, info, warn};
use serde_json::{Map, Value};
use std::rc::Rc;

/// Options for [`Editor::get_css`].
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct GetCssOptions {
    /// Overrides the configured `keepUnusedStyles`.
    pub keep_unused_styles: Option<bool>,
    /// Leave out the protected CSS.
    pub avoid_protected: bool,
}

/// A page-builder editor instance.
pub struct Editor {
    config: EditorConfig,
    components: ComponentTree,
    css: CssComposer,
    commands: CommandManager,
    selection: Selection,
    devices: DeviceManager,
    storage: StorageManager,
    events: EventBus,
    registry: PluginRegistry,
    meta: Map<String, Value>,
    changes: usize,
    ready: bool,
    import_errors: Vec<anyhow::Error>,
}

impl Editor {
    /// Build an editor with no named plugins available.
    ///
    /// # Errors
    /// Returns [`EditorError::Configuration`] for invalid options and any error
    /// raised by a plugin.
    pub fn init(config: EditorConfig) -> Result<Self> {
        Self::init_with_registry(config, &PluginRegistry::new())
    }

    /// Build an editor, resolving named plugins through `registry`.
    ///
    /// Seed content is imported first. A malformed seed is logged and kept in
    /// [`Editor::import_errors`]; the editor is still built. Plugins then run in
    /// order, and the editor becomes ready unless an autoload is pending.
    ///
    /// # Errors
    /// Returns [`EditorError::Configuration`] for invalid options or unresolved
    /// plugins, and any error raised by a plugin.
    pub fn init_with_registry(config: EditorConfig, registry: &PluginRegistry) -> Result<Self> {
        if config.from_element && config.container.is_none() {
            return Err(EditorError::Configuration(
                "fromElement requires a container".to_owned(),
            )
            .into());
        }
        let devices = DeviceManager::new(
            config.device_manager.devices.clone(),
            config.device_manager.default.clone(),
        )?;
        let storage = StorageManager::new(config.storage_manager.resolve());
        let mut editor = Self {
            commands: CommandManager::new(config.commands.strict),
            config,
            components: ComponentTree::new(),
            css: CssComposer::new(),
            selection: Selection::new(),
            devices,
            storage,
            events: EventBus::new(),
            registry: registry.clone(),
            meta: Map::new(),
            changes: 0,
            ready: false,
            import_errors: Vec::new(),
        };
        editor.register_core_commands();
        editor.import_seed();

        let plugins = editor.config.plugins.clone();
        for plugin in &plugins {
            editor.use_plugin(plugin, None)?;
        }
        editor.changes = 0;

        let storage_config = editor.storage.config();
        if storage_config.autoload && editor.storage.is_enabled() {
            debug!("Waiting for the initial load before becoming ready");
        } else {
            editor.mark_ready();
        }
        info!(
            "Editor initialized with {} components and {} rules",
            editor.components.len(),
            editor.css.len()
        );
        Ok(editor)
    }

    fn import_seed(&mut self) {
        let result = if self.config.from_element {
            let container = self.config.container.clone().unwrap_or_default();
            self.import_document(ImportSource::Markup(&container))
        } else {
            self.import_config_sources()
        };
        if let Err(failure) = result {
            error!("Failed to import the initial content: {failure}");
            self.import_errors.push(failure);
        }
    }

    fn import_config_sources(&mut self) -> Result<()> {
        match self.config.components.clone() {
            Some(ComponentsSource::Markup(markup)) => {
                self.import_document(ImportSource::Markup(&markup))?;
            }
            Some(ComponentsSource::Definitions(definitions)) => {
                self.components.set_components(&definitions);
            }
            Some(ComponentsSource::Single(definition)) => {
                self.components.set_components(slice::from_ref(&definition));
            }
            None => {}
        }
        match self.config.style.clone() {
            Some(StyleSource::Css(css)) => {
                self.css.add_rules(&css).map_err(EditorError::from)?;
            }
            Some(StyleSource::Rules(rules)) => {
                self.css.add_definitions(&rules);
            }
            None => {}
        }
        Ok(())
    }

    /// Errors hit while importing the seed content during initialization.
    #[must_use]
    pub fn import_errors(&self) -> &[anyhow::Error] {
        &self.import_errors
    }

    #[must_use]
    pub const fn config(&self) -> &EditorConfig {
        &self.config
    }

    /// Run a plugin now.
    ///
    /// Options are `options` when given, else `pluginsOpts[name]`, else `{}`.
    ///
    /// # Errors
    /// Returns [`EditorError::Configuration`] when a named plugin cannot be
    /// resolved, and whatever the plugin returns.
    pub fn use_plugin(&mut self, plugin: &PluginRef, options: Option<&Value>) -> Result<()> {
        let (callback, name) = match plugin {
            PluginRef::Named(name) => {
                let callback = self.registry.get(name).ok_or_else(|| {
                    EditorError::Configuration(format!("plugin '{name}' is not registered"))
                })?;
                (callback, Some(name.as_str()))
            }
            PluginRef::Inline(callback) => (Rc::clone(callback), None),
        };
        let options = options
            .cloned()
            .or_else(|| name.and_then(|key| self.config.plugins_opts.get(key).cloned()))
            .unwrap_or_else(|| Value::Object(Map::new()));
        debug!("Running plugin {}", name.unwrap_or("<inline>"));
        callback(self, &options)
    }

    #[must_use]
    pub const fn plugins(&self) -> &PluginRegistry {
        &self.registry
    }

    /// Replace the components and append the styles found in `source`.
    ///
    /// The `<style>` text is parsed before anything changes, so a CSS error
    /// leaves the editor untouched.
    ///
    /// # Errors
    /// Returns [`EditorError::Parse`] for malformed CSS, or an error when the
    /// markup cannot be read.
    pub fn import_document(&mut self, source: ImportSource<'_>) -> Result<()> {
        let parsed = parse_markup(source)?;
        let sheet = parse_stylesheet(&parsed.styles).map_err(EditorError::from)?;
        let (removed, added) = self.components.set_components(&parsed.components);
        let rules = self.css.add_stylesheet(&sheet);
        debug!(
            "Imported {} components and {} rules",
            added.len(),
            rules.len()
        );
        self.after_tree_change(&removed, &added);
        self.record_change();
        Ok(())
    }

    /// Body markup of the page.
    #[must_use]
    pub fn get_html(&self) -> String {
        self.components.to_html()
    }

    /// Serialized rules, with the protected CSS first unless `avoid_protected` is set.
    #[must_use]
    pub fn get_css(&self, options: &GetCssOptions) -> String {
        let usage = UsedSelectors {
            classes: self.components.class_names(),
            ids: self.components.ids(),
        };
        let keep_unused_styles = options
            .keep_unused_styles
            .unwrap_or(self.config.keep_unused_styles);
        let rules = self.css.to_css(&usage, CssOptions { keep_unused_styles });
        if options.avoid_protected {
            rules
        } else {
            format!("{}{rules}", self.config.protected_css)
        }
    }

    /// Rules no live component references.
    #[must_use]
    pub fn unused_rules(&self) -> Vec<&CssRule> {
        let usage = UsedSelectors {
            classes: self.components.class_names(),
            ids: self.components.ids(),
        };
        self.css.unused_rules(&usage)
    }

    /// Definitions of the top-level components.
    #[must_use]
    pub fn get_components(&self) -> Vec<ComponentDefinition> {
        self.components
            .components()
            .into_iter()
            .filter_map(|node| self.components.to_definition(node))
            .collect()
    }

    /// Every rule in insertion order.
    #[must_use]
    pub fn get_style(&self) -> &[CssRule] {
        self.css.get_all()
    }

    #[must_use]
    pub const fn tree(&self) -> &ComponentTree {
        &self.components
    }

    /// Direct tree access. Changes made here are not tracked for autosave.
    pub const fn tree_mut(&mut self) -> &mut ComponentTree {
        &mut self.components
    }

    #[must_use]
    pub const fn css(&self) -> &CssComposer {
        &self.css
    }

    /// Direct composer access. Changes made here are not tracked for autosave.
    pub const fn css_mut(&mut self) -> &mut CssComposer {
        &mut self.css
    }

    /// Replace the top-level components.
    pub fn set_components(&mut self, definitions: &[ComponentDefinition]) -> Vec<NodeId> {
        let (removed, added) = self.components.set_components(definitions);
        self.after_tree_change(&removed, &added);
        self.record_change();
        added
    }

    /// Append components to `parent`, or to the wrapper when `None`.
    ///
    /// # Errors
    /// Fails when `parent` is unknown or cannot hold children.
    pub fn add_components(
        &mut self,
        parent: Option<NodeId>,
        definitions: &[ComponentDefinition],
    ) -> Result<Vec<NodeId>> {
        let parent = parent.unwrap_or_else(|| self.components.wrapper());
        let added = self.components.append_definitions(parent, definitions)?;
        self.after_tree_change(&[], &added);
        self.record_change();
        Ok(added)
    }

    /// Remove a component with its subtree, deselecting whatever was removed.
    ///
    /// # Errors
    /// Fails for the wrapper and for unknown ids.
    pub fn remove_component(&mut self, node: NodeId) -> Result<Vec<NodeId>> {
        let removed = self.components.remove(node)?;
        self.after_tree_change(&removed, &[]);
        self.record_change();
        Ok(removed)
    }

    /// Move a component under `parent` at `index`.
    ///
    /// # Errors
    /// Fails for unknown ids, the wrapper and moves into the node's own subtree.
    pub fn move_component(
        &mut self,
        node: NodeId,
        parent: NodeId,
        index: Option<usize>,
    ) -> Result<()> {
        self.components.move_to(node, parent, index)?;
        self.record_change();
        Ok(())
    }

    /// Replace every rule with the rules in `css`.
    ///
    /// # Errors
    /// Returns [`EditorError::Parse`]; the rules are unchanged on failure.
    pub fn set_style(&mut self, css: &str) -> Result<Vec<RuleId>> {
        let sheet = parse_stylesheet(css).map_err(EditorError::from)?;
        self.css.clear();
        let added = self.css.add_stylesheet(&sheet);
        self.record_change();
        Ok(added)
    }

    /// Replace every rule with `definitions`.
    pub fn set_style_definitions(&mut self, definitions: &[RuleDefinition]) -> Vec<RuleId> {
        let added = self.css.replace_with_definitions(definitions);
        self.record_change();
        added
    }

    /// Append the rules in `css`.
    ///
    /// # Errors
    /// Returns [`EditorError::Parse`]; the rules are unchanged on failure.
    pub fn add_style(&mut self, css: &str) -> Result<Vec<RuleId>> {
        let added = self.css.add_rules(css).map_err(EditorError::from)?;
        self.record_change();
        Ok(added)
    }

    /// Find or create the rule for `selector` in `scope` and set its style.
    pub fn set_rule(&mut self, selector: &str, style: StyleMap, scope: &RuleScope) -> RuleId {
        let id = self.css.set_rule(selector, style, scope);
        self.record_change();
        id
    }

    /// Remove every component and rule.
    pub fn clear_canvas(&mut self) {
        let removed = self.components.clear();
        self.css.clear();
        self.after_tree_change(&removed, &[]);
        self.record_change();
    }

    /// Snapshot of styles and the page tree.
    #[must_use]
    pub fn get_project_data(&self) -> ProjectData {
        ProjectData {
            styles: self.css.to_definitions(),
            pages: vec![PageData {
                id: None,
                component: self.components.to_definition(self.components.wrapper()),
            }],
        }
    }

    /// Replace the model with `data`. An empty payload changes nothing.
    pub fn load_project_data(&mut self, data: &ProjectData) {
        if data.is_empty() {
            debug!("Empty project data, keeping the current model");
            return;
        }
        self.css.replace_with_definitions(&data.styles);
        let page = data.pages.first().and_then(|page| page.component.as_ref());
        let (removed, added) = match page {
            Some(wrapper) => self.components.load_wrapper(wrapper),
            None => (self.components.clear(), Vec::new()),
        };
        self.after_tree_change(&removed, &added);
    }

    /// Prune the selection and report tree changes.
    fn after_tree_change(&mut self, removed: &[NodeId], added: &[NodeId]) {
        let tree = &self.components;
        let changes = self.selection.retain_alive(|node| tree.contains(node));
        self.emit_selection_changes(&changes);
        for node in removed {
            self.emit(&EventKey::ComponentRemove, &mut EventData::Component(*node));
        }
        for node in added {
            self.emit(&EventKey::ComponentAdd, &mut EventData::Component(*node));
        }
    }

    /// Count a model change and fire `update`.
    pub fn record_change(&mut self) {
        self.changes = self.changes.saturating_add(1);
        self.emit(&EventKey::Update, &mut EventData::Empty);
    }

    /// Changes since the last store.
    #[must_use]
    pub const fn changes(&self) -> usize {
        self.changes
    }

    #[must_use]
    pub const fn is_ready(&self) -> bool {
        self.ready
    }

    fn mark_ready(&mut self) {
        if self.ready {
            return;
        }
        self.ready = true;
        info!("Editor ready");
        self.emit(&EventKey::Ready, &mut EventData::Empty);
    }

    /// Subscribe to an event.
    pub fn on<F>(&mut self, key: impl Into<EventKey>, listener: F) -> ListenerId
    where
        F: Fn(&Self, &mut EventData<'_>) + 'static,
    {
        self.events.on(key.into(), Rc::new(listener))
    }

    /// Unsubscribe; returns whether the listener existed.
    pub fn off(&mut self, id: ListenerId) -> bool {
        self.events.off(id)
    }

    /// Run `callback` once the editor is ready, immediately if it already is.
    pub fn on_ready<F>(&mut self, callback: F)
    where
        F: Fn(&Self) + 'static,
    {
        if self.ready {
            callback(self);
            return;
        }
        self.on(EventKey::Ready, move |editor, _| callback(editor));
    }

    /// Fire `key` with a host payload.
    pub fn trigger(&self, key: impl Into<EventKey>, payload: &Value) {
        self.emit(&key.into(), &mut EventData::Custom(payload));
    }

    pub(crate) fn emit(&self, key: &EventKey, data: &mut EventData<'_>) {
        for listener in self.events.listeners_for(key) {
            listener(self, data);
        }
    }

    /// Store a host value on the editor.
    pub fn set_meta(&mut self, key: &str, value: Value) {
        self.meta.insert(key.to_owned(), value);
    }

    #[must_use]
    pub fn meta(&self, key: &str) -> Option<&Value> {
        self.meta.get(key)
    }

    #[must_use]
    pub const fn commands(&self) -> &CommandManager {
        &self.commands
    }

    pub const fn commands_mut(&mut self) -> &mut CommandManager {
        &mut self.commands
    }

    #[must_use]
    pub const fn devices(&self) -> &DeviceManager {
        &self.devices
    }

    pub const fn devices_mut(&mut self) -> &mut DeviceManager {
        &mut self.devices
    }

    /// Name of the selected device.
    #[must_use]
    pub fn get_device(&self) -> &str {
        self.devices.selected()
    }

    /// Select a device by name. Unknown names are kept with a warning.
    pub fn set_device(&mut self, name: &str) {
        if !self.devices.select(name) {
            warn!("Device '{name}' is not defined");
        }
        self.emit(&EventKey::DeviceSelect, &mut EventData::Device(name));
    }

    #[must_use]
    pub const fn storage(&self) -> &StorageManager {
        &self.storage
    }

    pub const fn storage_mut(&mut self) -> &mut StorageManager {
        &mut self.storage
    }
}
