//! Event keys, payloads and the listener registry.
//!
//! Keys are structured values; their `Display`/`FromStr` forms are the
//! string names hosts subscribe with (`component:selected`,
//! `command:run:before:<id>`, ...).

use crate::Editor;
use crate::commands::CommandOptions;
use crate::storage::ProjectData;
use core::convert::Infallible;
use core::fmt::{Display, Formatter, Result as FmtResult};
use core::str::FromStr;
use html::NodeId;
use serde_json::Value;
use std::rc::Rc;

/// The five command hook points.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum CommandHook {
    /// After a run handler returned.
    Run,
    /// Before a run handler; listeners may abort.
    RunBefore,
    /// After a stop handler returned.
    Stop,
    /// Before a stop handler; listeners may abort.
    StopBefore,
    /// A before-hook listener aborted the call.
    Abort,
}

impl CommandHook {
    /// Every hook in declaration order.
    pub const ALL: [Self; 5] = [
        Self::Run,
        Self::RunBefore,
        Self::Stop,
        Self::StopBefore,
        Self::Abort,
    ];

    /// Name segment after `command:`.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Run => "run",
            Self::RunBefore => "run:before",
            Self::Stop => "stop",
            Self::StopBefore => "stop:before",
            Self::Abort => "abort",
        }
    }
}

/// An event the editor emits.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum EventKey {
    Ready,
    Load,
    Store,
    Update,
    StorageError,
    ComponentAdd,
    ComponentRemove,
    ComponentSelected,
    ComponentDeselected,
    ComponentToggled,
    DeviceSelect,
    /// A command hook, either for one command id or for every command.
    Command {
        hook: CommandHook,
        id: Option<String>,
    },
    /// Host-defined events.
    Custom(String),
}

impl EventKey {
    /// The command hook scoped to `id`.
    #[must_use]
    pub fn command(hook: CommandHook, id: &str) -> Self {
        Self::Command {
            hook,
            id: Some(id.to_owned()),
        }
    }

    /// The command hook for every command.
    #[must_use]
    pub const fn any_command(hook: CommandHook) -> Self {
        Self::Command { hook, id: None }
    }
}

impl Display for EventKey {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> FmtResult {
        let name = match self {
            Self::Ready => "ready",
            Self::Load => "storage:load",
            Self::Store => "storage:store",
            Self::Update => "update",
            Self::StorageError => "storage:error",
            Self::ComponentAdd => "component:add",
            Self::ComponentRemove => "component:remove",
            Self::ComponentSelected => "component:selected",
            Self::ComponentDeselected => "component:deselected",
            Self::ComponentToggled => "component:toggled",
            Self::DeviceSelect => "device:select",
            Self::Command { hook, id: None } => return write!(formatter, "command:{}", hook.name()),
            Self::Command {
                hook,
                id: Some(id),
            } => return write!(formatter, "command:{}:{id}", hook.name()),
            Self::Custom(custom) => custom.as_str(),
        };
        formatter.write_str(name)
    }
}

fn parse_command_key(rest: &str) -> Option<EventKey> {
    // Longer prefixes first so `run:before` is not read as `run` with id `before`.
    let ordered = [
        CommandHook::RunBefore,
        CommandHook::StopBefore,
        CommandHook::Run,
        CommandHook::Stop,
        CommandHook::Abort,
    ];
    ordered.into_iter().find_map(|hook| {
        let tail = rest.strip_prefix(hook.name())?;
        if tail.is_empty() {
            return Some(EventKey::any_command(hook));
        }
        let id = tail.strip_prefix(':')?;
        (!id.is_empty()).then(|| EventKey::command(hook, id))
    })
}

impl FromStr for EventKey {
    type Err = Infallible;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        let key = match name {
            "ready" | "load" => Self::Ready,
            "storage:load" => Self::Load,
            "storage:store" => Self::Store,
            "update" => Self::Update,
            "storage:error" => Self::StorageError,
            "component:add" => Self::ComponentAdd,
            "component:remove" => Self::ComponentRemove,
            "component:selected" => Self::ComponentSelected,
            "component:deselected" => Self::ComponentDeselected,
            "component:toggled" => Self::ComponentToggled,
            "device:select" => Self::DeviceSelect,
            other => other
                .strip_prefix("command:")
                .and_then(parse_command_key)
                .unwrap_or_else(|| Self::Custom(other.to_owned())),
        };
        Ok(key)
    }
}

impl From<&str> for EventKey {
    fn from(name: &str) -> Self {
        match name.parse() {
            Ok(key) => key,
            Err(never) => match never {},
        }
    }
}

/// Payload handed to listeners.
#[derive(Debug)]
pub enum EventData<'data> {
    Empty,
    /// The component an event is about.
    Component(NodeId),
    /// A command hook. Before-hook listeners may set `abort` on the options.
    Command {
        id: &'data str,
        options: &'data mut CommandOptions,
        result: Option<&'data Value>,
    },
    /// Project data stored or loaded.
    Project(&'data ProjectData),
    /// Selected device name.
    Device(&'data str),
    /// Failure message.
    Error(&'data str),
    /// Host payload for custom events.
    Custom(&'data Value),
}

/// A subscribed callback.
pub type Listener = Rc<dyn Fn(&Editor, &mut EventData<'_>)>;

/// Handle returned by [`EventBus::on`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

/// Registry of listeners keyed by event.
#[derive(Clone, Default)]
pub struct EventBus {
    listeners: Vec<(ListenerId, EventKey, Listener)>,
    next_id: u64,
}

impl EventBus {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribe `listener` to `key`.
    pub fn on(&mut self, key: EventKey, listener: Listener) -> ListenerId {
        let id = ListenerId(self.next_id);
        self.next_id = self.next_id.saturating_add(1);
        self.listeners.push((id, key, listener));
        id
    }

    /// Unsubscribe; returns whether the listener existed.
    pub fn off(&mut self, id: ListenerId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(existing, _, _)| *existing != id);
        before != self.listeners.len()
    }

    /// Snapshot of the listeners for `key`, in subscription order.
    #[must_use]
    pub fn listeners_for(&self, key: &EventKey) -> Vec<Listener> {
        self.listeners
            .iter()
            .filter(|(_, listener_key, _)| listener_key == key)
            .map(|(_, _, listener)| Rc::clone(listener))
            .collect()
    }

    #[must_use]
    pub fn has_listeners(&self, key: &EventKey) -> bool {
        self.listeners
            .iter()
            .any(|(_, listener_key, _)| listener_key == key)
    }
}
