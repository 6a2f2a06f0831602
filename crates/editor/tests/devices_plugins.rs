//! Devices, plugins, configuration and custom events.

use editor::{
    DEFAULT_DEVICE, Device, DeviceManager, Editor, EditorConfig, EditorError, EventData, GetCssOptions,
    Plugin, PluginRef, PluginRegistry, PluginResolver, StorageSetting,
};
use serde_json::{Value, json};
use std::cell::RefCell;
use std::rc::Rc;

#[cfg(test)]
mod tests {
    use super::*;

    fn init_logging() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    fn config() -> EditorConfig {
        EditorConfig {
            storage_manager: StorageSetting::Enabled(false),
            ..EditorConfig::default()
        }
    }

    /// A fresh editor selects the desktop sentinel and switches to any named device.
    ///
    /// # Panics
    /// Panics if the device name is not reported back.
    #[test]
    fn device_default_and_switching() {
        init_logging();
        let mut editor = Editor::init(config()).expect("valid config");
        assert_eq!(editor.get_device(), DEFAULT_DEVICE);
        assert_eq!(editor.devices().get_all().len(), 4);

        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        editor.on("device:select", move |_, data| {
            if let EventData::Device(name) = data {
                sink.borrow_mut().push((*name).to_owned());
            }
        });
        editor.set_device("tablet");
        assert_eq!(editor.get_device(), "tablet");
        assert_eq!(editor.canvas_width(), Some("770px"));
        editor.set_device("Watch");
        assert_eq!(editor.get_device(), "Watch");
        assert_eq!(*seen.borrow(), ["tablet", "Watch"]);
    }

    /// Configured devices replace the presets; duplicate ids are rejected.
    ///
    /// # Panics
    /// Panics if the configured list is not used.
    #[test]
    fn configured_devices() {
        init_logging();
        let json = r#"{
            "storageManager": false,
            "deviceManager": {
                "devices": [{"name": "Desktop"}, {"name": "Mobile", "width": "320px", "widthMedia": "480px"}],
                "default": "Mobile"
            }
        }"#;
        let editor = Editor::init(EditorConfig::from_json(json).expect("valid json"))
            .expect("valid config");
        assert_eq!(editor.devices().get_all().len(), 2);
        assert_eq!(editor.get_device(), "Mobile");
        assert_eq!(
            editor.devices().media_text("Mobile").as_deref(),
            Some("(max-width: 480px)")
        );
        assert_eq!(editor.devices().media_text("Desktop"), None);

        let duplicate = DeviceManager::new(
            vec![Device::new("a", "A"), Device::new("a", "Other")],
            None,
        );
        assert!(duplicate.is_err());
    }

    /// Plugins run in order before ready, with options from the call or `pluginsOpts`.
    ///
    /// # Panics
    /// Panics if a plugin is skipped or receives the wrong options.
    #[test]
    fn runs_plugins_in_order() {
        init_logging();
        let mut registry = PluginRegistry::new();
        registry.add("meta", |editor, options| {
            editor.set_meta("meta-options", options.clone());
            editor.set_meta("ready-during-plugin", Value::from(editor.is_ready()));
            Ok(())
        });
        let seed = config()
            .with_plugin("meta")
            .with_plugin(PluginRef::inline(|editor, options| {
                editor.set_meta("inline-options", options.clone());
                Ok(())
            }));
        let mut with_opts = seed;
        with_opts
            .plugins_opts
            .insert("meta".to_owned(), json!({ "color": "red" }));

        let mut editor = Editor::init_with_registry(with_opts, &registry).expect("valid config");
        assert_eq!(editor.meta("meta-options"), Some(&json!({ "color": "red" })));
        assert_eq!(editor.meta("inline-options"), Some(&json!({})));
        assert_eq!(editor.meta("ready-during-plugin"), Some(&Value::from(false)));
        assert!(editor.is_ready());

        editor
            .use_plugin(&PluginRef::from("meta"), Some(&json!({ "color": "blue" })))
            .expect("registered");
        assert_eq!(editor.meta("meta-options"), Some(&json!({ "color": "blue" })));
    }

    /// Unknown plugin names fail initialization; a resolver can supply them.
    ///
    /// # Panics
    /// Panics if the missing plugin is accepted or the resolver is ignored.
    #[test]
    fn resolves_plugins() {
        struct Resolver;

        impl PluginResolver for Resolver {
            fn resolve(&self, name: &str) -> Option<Plugin> {
                (name == "late").then(|| {
                    let plugin: Plugin =
                        Rc::new(|editor: &mut Editor, _: &Value| -> anyhow::Result<()> {
                            editor.set_meta("late", Value::Bool(true));
                            Ok(())
                        });
                    plugin
                })
            }
        }

        init_logging();
        let failure = Editor::init(config().with_plugin("missing"))
            .err()
            .expect("unresolved plugin");
        assert!(matches!(
            failure.downcast_ref::<EditorError>(),
            Some(EditorError::Configuration(_))
        ));

        let registry = PluginRegistry::new().with_resolver(Rc::new(Resolver));
        assert!(registry.has("late"));
        let editor =
            Editor::init_with_registry(config().with_plugin("late"), &registry).expect("resolved");
        assert_eq!(editor.meta("late"), Some(&Value::Bool(true)));
    }

    /// Plugin errors propagate out of initialization.
    ///
    /// # Panics
    /// Panics if the error is swallowed.
    #[test]
    fn plugin_errors_propagate() {
        init_logging();
        let seed = config().with_plugin(PluginRef::inline(|_, _| Err(anyhow::anyhow!("boom"))));
        let failure = Editor::init(seed).err().expect("plugin error");
        assert_eq!(failure.to_string(), "boom");
    }

    /// JSON configuration accepts markup, rule arrays and storage shorthands.
    ///
    /// # Panics
    /// Panics if an option is misread.
    #[test]
    fn reads_json_config() {
        init_logging();
        let json = r##"{
            "components": "<div id=\"hero\" class=\"x\"></div>",
            "style": [{"selectors": ["x"], "style": {"color": "red"}}, {"selectors": ["#hero"], "style": {"margin": "0"}}],
            "protectedCss": "",
            "storageManager": "none"
        }"##;
        let config = EditorConfig::from_json(json).expect("valid json");
        let editor = Editor::init(config).expect("valid config");
        assert_eq!(
            editor.get_css(&GetCssOptions::default()),
            ".x{color:red;}#hero{margin:0;}"
        );
        assert!(!editor.storage().is_enabled());

        let malformed = EditorConfig::from_json(r#"{"fromElement": "yes"}"#)
            .err()
            .expect("wrong type");
        assert!(malformed.to_string().starts_with("ConfigurationError"));
    }

    /// Custom events reach listeners and can be unsubscribed.
    ///
    /// # Panics
    /// Panics if a removed listener still runs.
    #[test]
    fn custom_events() {
        init_logging();
        let mut editor = Editor::init(config()).expect("valid config");
        let received = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&received);
        let listener = editor.on("my:event", move |_, data| {
            if let EventData::Custom(payload) = data {
                sink.borrow_mut().push((*payload).clone());
            }
        });
        editor.trigger("my:event", &json!(1));
        assert!(editor.off(listener));
        assert!(!editor.off(listener));
        editor.trigger("my:event", &json!(2));
        assert_eq!(*received.borrow(), [json!(1)]);
    }
}
