//! Command definitions, call options and the registry tracking active commands.

use crate::Editor;
use crate::events::CommandHook;
use anyhow::Result;
use core::fmt::{Debug, Formatter, Result as FmtResult};
use indexmap::IndexMap;
use serde_json::{Map, Value};
use std::rc::Rc;

/// Run or stop handler: `(editor, caller, options) -> result`.
pub type CommandHandler = Rc<dyn Fn(&mut Editor, &CommandCaller, &mut CommandOptions) -> Result<Value>>;

/// Who invoked a command.
#[derive(Clone, Debug, PartialEq)]
pub struct CommandCaller {
    /// The id the command was invoked with.
    pub command_id: String,
    /// The `sender` option, if the host passed one.
    pub sender: Option<Value>,
}

/// JSON-like bag of options passed to handlers and before-hook listeners.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CommandOptions {
    values: Map<String, Value>,
}

/// Loose truthiness used for the `abort` and `force` flags (`1`, `true`, `"yes"`).
fn truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(flag) => *flag,
        Value::Number(number) => number.as_f64().is_some_and(|float| float != 0.0),
        Value::String(text) => !text.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

impl CommandOptions {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Options from a JSON object; any other value yields empty options.
    #[must_use]
    pub fn from_value(value: Value) -> Self {
        match value {
            Value::Object(values) => Self { values },
            _ => Self::default(),
        }
    }

    /// Same options with `key` set.
    #[must_use]
    pub fn with(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.set(key, value);
        self
    }

    pub fn set(&mut self, key: &str, value: impl Into<Value>) {
        self.values.insert(key.to_owned(), value.into());
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    /// Whether a before-hook listener asked to abort the call.
    #[must_use]
    pub fn is_aborted(&self) -> bool {
        self.values.get("abort").is_some_and(truthy)
    }

    /// Mark the call as aborted.
    pub fn abort(&mut self) {
        self.set("abort", true);
    }

    /// Whether the call bypasses the active-state checks.
    #[must_use]
    pub fn is_forced(&self) -> bool {
        self.values.get("force").is_some_and(truthy)
    }

    #[must_use]
    pub const fn as_map(&self) -> &Map<String, Value> {
        &self.values
    }
}

/// A command definition.
#[derive(Clone, Default)]
pub struct Command {
    run: Option<CommandHandler>,
    stop: Option<CommandHandler>,
    fields: Map<String, Value>,
}

impl Debug for Command {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> FmtResult {
        formatter
            .debug_struct("Command")
            .field("run", &self.run.is_some())
            .field("stop", &self.stop.is_some())
            .field("fields", &self.fields)
            .finish()
    }
}

impl Command {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Same command with a run handler.
    #[must_use]
    pub fn on_run<F>(mut self, handler: F) -> Self
    where
        F: Fn(&mut Editor, &CommandCaller, &mut CommandOptions) -> Result<Value> + 'static,
    {
        self.run = Some(Rc::new(handler));
        self
    }

    /// Same command with a stop handler, which makes it stoppable.
    #[must_use]
    pub fn on_stop<F>(mut self, handler: F) -> Self
    where
        F: Fn(&mut Editor, &CommandCaller, &mut CommandOptions) -> Result<Value> + 'static,
    {
        self.stop = Some(Rc::new(handler));
        self
    }

    /// Same command with an extra field readable through [`Command::field`].
    #[must_use]
    pub fn with_field(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.fields.insert(key.to_owned(), value.into());
        self
    }

    #[must_use]
    pub fn field(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    /// Stoppable commands stay active between run and stop.
    #[must_use]
    pub const fn is_stoppable(&self) -> bool {
        self.stop.is_some()
    }

    pub(crate) fn run_handler(&self) -> Option<CommandHandler> {
        self.run.as_ref().map(Rc::clone)
    }

    pub(crate) fn stop_handler(&self) -> Option<CommandHandler> {
        self.stop.as_ref().map(Rc::clone)
    }
}

/// Registered commands and the set of currently active ones.
#[derive(Clone, Debug)]
pub struct CommandManager {
    commands: IndexMap<String, Command>,
    active: IndexMap<String, Value>,
    strict: bool,
}

impl Default for CommandManager {
    fn default() -> Self {
        Self::new(true)
    }
}

impl CommandManager {
    /// In strict mode an active stoppable command is not run again unless forced.
    #[must_use]
    pub fn new(strict: bool) -> Self {
        Self {
            commands: IndexMap::new(),
            active: IndexMap::new(),
            strict,
        }
    }

    /// Register or replace a command.
    pub fn add(&mut self, id: &str, command: Command) {
        self.commands.insert(id.to_owned(), command);
    }

    #[must_use]
    pub fn get(&self, id: &str) -> Option<&Command> {
        self.commands.get(id)
    }

    #[must_use]
    pub fn has(&self, id: &str) -> bool {
        self.commands.contains_key(id)
    }

    /// Unregister a command; it is no longer active either.
    pub fn remove(&mut self, id: &str) -> Option<Command> {
        self.active.shift_remove(id);
        self.commands.shift_remove(id)
    }

    /// Registered ids in registration order.
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.commands.keys().map(String::as_str)
    }

    #[must_use]
    pub fn is_active(&self, id: &str) -> bool {
        self.active.contains_key(id)
    }

    /// Active ids with the value their run handler returned.
    #[must_use]
    pub const fn active(&self) -> &IndexMap<String, Value> {
        &self.active
    }

    #[must_use]
    pub fn active_ids(&self) -> Vec<&str> {
        self.active.keys().map(String::as_str).collect()
    }

    #[must_use]
    pub const fn is_strict(&self) -> bool {
        self.strict
    }

    /// The hook points emitted around command calls.
    #[must_use]
    pub const fn events(&self) -> [CommandHook; 5] {
        CommandHook::ALL
    }

    pub(crate) fn set_active(&mut self, id: &str, result: Value) {
        self.active.insert(id.to_owned(), result);
    }

    pub(crate) fn clear_active(&mut self, id: &str) {
        self.active.shift_remove(id);
    }
}
