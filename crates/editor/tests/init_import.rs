//! Initialization, seed import and HTML/CSS output.

use editor::config::DEFAULT_PROTECTED_CSS;
use editor::{
    ComponentsSource, Editor, EditorConfig, EditorError, GetCssOptions, StorageSetting,
    StyleSource,
};
use css::RuleDefinition;
use html::{ComponentDefinition, ImportSource, parse_document_handle};
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

    fn editor_with(markup: &str) -> Editor {
        Editor::init(config().with_components(markup)).expect("valid config")
    }

    const KEEP: GetCssOptions = GetCssOptions {
        keep_unused_styles: Some(true),
        avoid_protected: false,
    };

    /// An editor without content prints an empty body and is ready at once.
    ///
    /// # Panics
    /// Panics if the empty editor prints anything else.
    #[test]
    fn empty_editor() {
        init_logging();
        let editor = Editor::init(config()).expect("valid config");
        assert_eq!(editor.get_html(), "<body></body>");
        assert_eq!(editor.get_css(&GetCssOptions::default()), DEFAULT_PROTECTED_CSS);
        assert!(editor.is_ready());
        assert!(editor.import_errors().is_empty());
    }

    /// Imported markup prints back in normalized form.
    ///
    /// # Panics
    /// Panics if the markup is not reproduced.
    #[test]
    fn imports_markup() {
        init_logging();
        let html = r#"<div class="test1"></div><div class="test2"></div>"#;
        let editor = editor_with(html);
        assert_eq!(editor.get_html(), format!("<body>{html}</body>"));
        assert_eq!(editor.get_components().len(), 2);
    }

    /// Rules for classes nothing uses are pruned from the output by default.
    ///
    /// # Panics
    /// Panics if the CSS differs from the canonical text.
    #[test]
    fn prunes_unused_styles() {
        init_logging();
        let editor = editor_with(
            r#"<div class="test2"></div><style>.test2{color:red}.test3{color:blue}</style>"#,
        );
        assert_eq!(
            editor.get_css(&GetCssOptions::default()),
            format!("{DEFAULT_PROTECTED_CSS}.test2{{color:red;}}")
        );
        assert_eq!(
            editor.get_css(&KEEP),
            format!("{DEFAULT_PROTECTED_CSS}.test2{{color:red;}}.test3{{color:blue;}}")
        );
        assert_eq!(editor.unused_rules().len(), 1);
        let without_protected = GetCssOptions {
            avoid_protected: true,
            ..GetCssOptions::default()
        };
        assert_eq!(editor.get_css(&without_protected), ".test2{color:red;}");
    }

    /// A media block holding only unused rules disappears unless unused styles are kept.
    ///
    /// # Panics
    /// Panics if the media block is printed incorrectly.
    #[test]
    fn media_rules_follow_pruning() {
        init_logging();
        let mut seed = config().with_components(r#"<div class="test2"></div>"#);
        seed.style = Some(StyleSource::Css(
            ".test2{color:red}@media only screen and (max-width: 620px){.notused{color:red}}"
                .to_owned(),
        ));
        let editor = Editor::init(seed).expect("valid config");
        assert!(!editor.get_css(&GetCssOptions::default()).contains("@media"));
        assert!(editor.get_css(&KEEP).ends_with(
            ".test2{color:red;}@media only screen and (max-width: 620px){.notused{color:red;}}"
        ));

        let mut keep_config = config().with_components(r#"<div class="test2"></div>"#);
        keep_config.keep_unused_styles = true;
        keep_config.style = Some(StyleSource::Css(".notused{color:red}".to_owned()));
        let keeping = Editor::init(keep_config).expect("valid config");
        assert!(keeping.get_css(&GetCssOptions::default()).contains(".notused{color:red;}"));
    }

    /// Font faces are kept verbatim and counted one by one.
    ///
    /// # Panics
    /// Panics if font faces are merged or dropped.
    #[test]
    fn keeps_every_font_face() {
        init_logging();
        let editor = editor_with(
            "<style>@font-face{font-family:A;src:url(a.woff)}@font-face{font-family:B;src:url(b.woff)}</style>",
        );
        assert_eq!(editor.get_style().len(), 2);
        let css = editor.get_css(&GetCssOptions::default());
        assert_eq!(css.matches("@font-face{").count(), 2);
    }

    /// A malformed seed stylesheet is recorded and the editor is still built.
    ///
    /// # Panics
    /// Panics if initialization fails or the error is not recorded.
    #[test]
    fn bad_seed_css_is_recorded() {
        init_logging();
        let editor = editor_with(r#"<div class="a"></div><style>.a{color red}</style>"#);
        assert_eq!(editor.get_html(), "<body></body>");
        assert!(editor.get_style().is_empty());
        let failure = &editor.import_errors()[0];
        assert!(matches!(
            failure.downcast_ref::<EditorError>(),
            Some(EditorError::Parse(_))
        ));
    }

    /// Importing markup with broken CSS changes nothing.
    ///
    /// # Panics
    /// Panics if the editor is modified.
    #[test]
    fn import_is_atomic() {
        init_logging();
        let mut editor = editor_with(r#"<p class="kept"></p><style>.kept{margin:0}</style>"#);
        let before = editor.get_project_data();
        let failure = editor
            .import_document(ImportSource::Markup("<div></div><style>.x{color red}</style>"))
            .expect_err("malformed css");
        assert!(failure.to_string().starts_with("ParseError"));
        assert_eq!(editor.get_project_data(), before);
    }

    /// A live container node imports its children and styles.
    ///
    /// # Panics
    /// Panics if the container content is not imported.
    #[test]
    fn imports_live_container() {
        init_logging();
        let document = parse_document_handle(
            r#"<div id="gjs"><style>.c{margin:0}</style><p class="c">Text</p></div>"#,
        )
        .expect("readable markup");
        let html_element = Rc::clone(&document.children.borrow()[0]);
        let body = Rc::clone(&html_element.children.borrow()[1]);
        let container = Rc::clone(&body.children.borrow()[0]);

        let mut editor = Editor::init(config()).expect("valid config");
        editor
            .import_document(ImportSource::Node(&container))
            .expect("readable container");
        assert_eq!(editor.get_html(), r#"<body><p class="c">Text</p></body>"#);
        assert_eq!(
            editor.get_css(&GetCssOptions::default()),
            format!("{DEFAULT_PROTECTED_CSS}.c{{margin:0;}}")
        );
    }

    /// `fromElement` imports the configured container and requires one.
    ///
    /// # Panics
    /// Panics if the container is ignored or the missing container is accepted.
    #[test]
    fn from_element() {
        init_logging();
        let missing = EditorConfig {
            from_element: true,
            ..config()
        };
        let failure = Editor::init(missing).err().expect("container required");
        assert!(matches!(
            failure.downcast_ref::<EditorError>(),
            Some(EditorError::Configuration(_))
        ));

        let with_container = EditorConfig {
            from_element: true,
            container: Some(r#"<section class="s"></section>"#.to_owned()),
            components: Some(ComponentsSource::Markup("<p>ignored</p>".to_owned())),
            ..config()
        };
        let editor = Editor::init(with_container).expect("valid config");
        assert_eq!(editor.get_html(), r#"<body><section class="s"></section></body>"#);
    }

    /// Definitions are accepted as seed components and exposed back.
    ///
    /// # Panics
    /// Panics if the definitions are not applied.
    #[test]
    fn definition_seed() {
        init_logging();
        let seed = EditorConfig {
            components: Some(ComponentsSource::Definitions(vec![
                ComponentDefinition::element("h1").with_child(ComponentDefinition::text("Title")),
            ])),
            ..config()
        };
        let editor = Editor::init(seed).expect("valid config");
        assert_eq!(editor.get_html(), "<body><h1>Title</h1></body>");
        assert_eq!(editor.get_components()[0].tag_name.as_deref(), Some("h1"));
    }

    /// Style edits go through the composer and count as changes.
    ///
    /// # Panics
    /// Panics if the rules are not replaced.
    #[test]
    fn replaces_styles() {
        init_logging();
        let mut editor = editor_with(r#"<div class="a"></div><style>.a{color:red}</style>"#);
        assert_eq!(editor.changes(), 0);
        editor.set_style(".a{color:blue}").expect("valid css");
        assert_eq!(editor.get_style().len(), 1);
        assert!(editor.get_css(&GetCssOptions::default()).ends_with(".a{color:blue;}"));
        assert!(editor.set_style(".a{color blue}").is_err());
        assert_eq!(editor.get_style().len(), 1);
        assert_eq!(editor.changes(), 1);
    }

    /// Rule definitions replace the styles and count as one change.
    ///
    /// # Panics
    /// Panics if the definitions are not applied or not tracked.
    #[test]
    fn replaces_styles_from_definitions() {
        init_logging();
        let mut editor = editor_with(r#"<div class="a"></div><style>.a{color:red}.b{margin:0}</style>"#);
        let updates = Rc::new(RefCell::new(0_u32));
        let counter = Rc::clone(&updates);
        editor.on("update", move |_, _| *counter.borrow_mut() += 1);

        let added = editor.set_style_definitions(&[
            RuleDefinition::with_classes(&["a"]).with_property("color", "green"),
            RuleDefinition::with_classes(&["test4"]),
        ]);
        assert_eq!(added.len(), 2);
        assert_eq!(editor.get_style().len(), 2);
        assert_eq!(
            editor.get_css(&GetCssOptions {
                avoid_protected: true,
                ..GetCssOptions::default()
            }),
            ".a{color:green;}"
        );
        assert_eq!(editor.changes(), 1);
        assert_eq!(*updates.borrow(), 1);
    }

    /// The canvas document carries the base CSS, the page CSS and the body.
    ///
    /// # Panics
    /// Panics if a part of the frame document is missing.
    #[test]
    fn canvas_document() {
        init_logging();
        let editor = editor_with(r#"<div class="a"></div><style>.a{color:red}</style>"#);
        let canvas = editor.canvas_html();
        assert!(canvas.contains("body { background-color: #fff"));
        assert!(canvas.contains(".a{color:red;}"));
        assert!(canvas.contains(r#"<body><div class="a"></div></body>"#));
        assert_eq!(editor.canvas_width(), None);
    }
}
