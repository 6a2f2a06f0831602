use super::{Editor, GetCssOptions};
use crate::commands::{Command, CommandCaller, CommandOptions};
use crate::error::EditorError;
use crate::events::{CommandHook, EventData, EventKey};
use anyhow::Result;
use log::{debug, warn};
use serde_json::{Value, json};

impl Editor {
    pub(super) fn register_core_commands(&mut self) {
        self.commands.add(
            "core:component-delete",
            Command::new().on_run(|editor, _, _| {
                let mut removed = 0_usize;
                for node in editor.get_selected_all() {
                    if editor.components.contains(node) {
                        removed = removed.saturating_add(editor.remove_component(node)?.len());
                    }
                }
                Ok(Value::from(removed))
            }),
        );
        self.commands.add(
            "core:canvas-clear",
            Command::new().on_run(|editor, _, _| {
                editor.clear_canvas();
                Ok(Value::Null)
            }),
        );
        self.commands.add(
            "export-template",
            Command::new().on_run(|editor, _, _| {
                Ok(json!({
                    "html": editor.get_html(),
                    "css": editor.get_css(&GetCssOptions::default()),
                }))
            }),
        );
    }

    /// Fire the scoped and then the generic event for `hook`.
    fn emit_command(
        &self,
        hook: CommandHook,
        id: &str,
        options: &mut CommandOptions,
        result: Option<&Value>,
    ) {
        for key in [EventKey::command(hook, id), EventKey::any_command(hook)] {
            let mut data = EventData::Command {
                id,
                options: &mut *options,
                result,
            };
            self.emit(&key, &mut data);
        }
    }

    /// Fire a before-hook; returns false when a listener aborted the call.
    fn before_command(&self, hook: CommandHook, id: &str, options: &mut CommandOptions) -> bool {
        self.emit_command(hook, id, options, None);
        if options.is_aborted() {
            debug!("Command '{id}' aborted");
            self.emit_command(CommandHook::Abort, id, options, None);
            return false;
        }
        true
    }

    /// Run a command.
    ///
    /// Returns `Ok(None)` when the command is unknown, was skipped because it
    /// is already active, or a before-hook listener aborted it. Otherwise
    /// returns what the run handler returned (`null` without a handler).
    ///
    /// # Errors
    /// Propagates errors returned by the run handler.
    pub fn run_command(&mut self, id: &str, options: CommandOptions) -> Result<Option<Value>> {
        let Some(command) = self.commands.get(id) else {
            warn!("{}", EditorError::UnknownCommand(id.to_owned()));
            return Ok(None);
        };
        let handler = command.run_handler();
        let stoppable = command.is_stoppable();
        let mut options = options;
        if stoppable
            && self.commands.is_strict()
            && self.commands.is_active(id)
            && !options.is_forced()
        {
            debug!("Command '{id}' is already active");
            return Ok(None);
        }
        if !self.before_command(CommandHook::RunBefore, id, &mut options) {
            return Ok(None);
        }
        let caller = CommandCaller {
            command_id: id.to_owned(),
            sender: options.get("sender").cloned(),
        };
        let result = match handler {
            Some(run) => run(self, &caller, &mut options)?,
            None => Value::Null,
        };
        if stoppable {
            self.commands.set_active(id, result.clone());
        }
        self.emit_command(CommandHook::Run, id, &mut options, Some(&result));
        Ok(Some(result))
    }

    /// Stop an active command.
    ///
    /// Inactive commands are skipped unless `force` is set.
    ///
    /// # Errors
    /// Propagates errors returned by the stop handler.
    pub fn stop_command(&mut self, id: &str, options: CommandOptions) -> Result<Option<Value>> {
        let Some(command) = self.commands.get(id) else {
            warn!("{}", EditorError::UnknownCommand(id.to_owned()));
            return Ok(None);
        };
        let handler = command.stop_handler();
        let mut options = options;
        if !self.commands.is_active(id) && !options.is_forced() {
            debug!("Command '{id}' is not active");
            return Ok(None);
        }
        if !self.before_command(CommandHook::StopBefore, id, &mut options) {
            return Ok(None);
        }
        let caller = CommandCaller {
            command_id: id.to_owned(),
            sender: options.get("sender").cloned(),
        };
        let result = match handler {
            Some(stop) => stop(self, &caller, &mut options)?,
            None => Value::Null,
        };
        self.commands.clear_active(id);
        self.emit_command(CommandHook::Stop, id, &mut options, Some(&result));
        Ok(Some(result))
    }
}
