//! Markup import: html5ever parses the input into an rcdom tree, which is
//! converted into component definitions plus the text of every `<style>`.

use crate::dom::ComponentDefinition;
use anyhow::Result;
use html5ever::tendril::TendrilSink as _;
use html5ever::tree_builder::TreeBuilderOpts;
use html5ever::{ParseOpts, parse_document};
use log::debug;
use markup5ever_rcdom::{Handle, NodeData, RcDom};

/// Input accepted by [`parse_markup`].
#[derive(Clone, Copy)]
pub enum ImportSource<'src> {
    /// An HTML string, parsed as a full document.
    Markup(&'src str),
    /// A live rcdom node. A document imports its `<body>`; an element imports its children.
    Node(&'src Handle),
}

/// Result of importing markup.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ParsedMarkup {
    /// Top-level components in source order.
    pub components: Vec<ComponentDefinition>,
    /// Contents of every `<style>` element, concatenated in document order.
    pub styles: String,
}

/// Parse `html` as a document with html5ever.
///
/// # Errors
/// Returns an error if reading the input fails.
pub fn parse_document_handle(html: &str) -> Result<Handle> {
    let opts = ParseOpts {
        tree_builder: TreeBuilderOpts {
            exact_errors: false,
            scripting_enabled: false,
            ..TreeBuilderOpts::default()
        },
        ..ParseOpts::default()
    };
    let dom = parse_document(RcDom::default(), opts)
        .from_utf8()
        .read_from(&mut html.as_bytes())?;
    Ok(dom.document)
}

/// Convert markup into component definitions and collected CSS.
///
/// # Errors
/// Returns an error if the markup cannot be read.
pub fn parse_markup(source: ImportSource<'_>) -> Result<ParsedMarkup> {
    let document;
    let root = match source {
        ImportSource::Markup(html) => {
            document = parse_document_handle(html)?;
            &document
        }
        ImportSource::Node(handle) => handle,
    };
    let mut parsed = ParsedMarkup::default();
    collect_styles(root, &mut parsed.styles);
    let content_root = if matches!(root.data, NodeData::Document) {
        find_element(root, "body")
    } else {
        Some(Handle::clone(root))
    };
    if let Some(content_root) = content_root {
        for child in content_root.children.borrow().iter() {
            if let Some(definition) = convert(child) {
                parsed.components.push(definition);
            }
        }
    }
    if parsed.components.iter().all(is_blank_text) {
        parsed.components.clear();
    }
    debug!(
        "Imported {} top-level components and {} bytes of CSS",
        parsed.components.len(),
        parsed.styles.len()
    );
    Ok(parsed)
}

fn is_blank_text(definition: &ComponentDefinition) -> bool {
    definition.component_type.as_deref() == Some("textnode")
        && definition
            .content
            .as_deref()
            .is_some_and(|text| text.trim().is_empty())
}

fn element_name(handle: &Handle) -> Option<String> {
    match &handle.data {
        NodeData::Element { name, .. } => Some(name.local.to_string()),
        _ => None,
    }
}

fn find_element(handle: &Handle, tag: &str) -> Option<Handle> {
    if element_name(handle).as_deref() == Some(tag) {
        return Some(Handle::clone(handle));
    }
    handle
        .children
        .borrow()
        .iter()
        .find_map(|child| find_element(child, tag))
}

fn text_of(handle: &Handle, out: &mut String) {
    for child in handle.children.borrow().iter() {
        if let NodeData::Text { contents } = &child.data {
            out.push_str(&contents.borrow());
        }
    }
}

fn collect_styles(handle: &Handle, out: &mut String) {
    if element_name(handle).as_deref() == Some("style") {
        text_of(handle, out);
        out.push('\n');
        return;
    }
    for child in handle.children.borrow().iter() {
        collect_styles(child, out);
    }
}

fn convert(handle: &Handle) -> Option<ComponentDefinition> {
    match &handle.data {
        NodeData::Element { name, attrs, .. } => {
            let tag = name.local.to_string();
            if tag == "script" || tag == "style" {
                return None;
            }
            let mut definition = ComponentDefinition::element(&tag);
            for attr in attrs.borrow().iter() {
                let attr_name = attr.name.local.to_string();
                if attr_name == "class" {
                    for class in attr.value.split_whitespace() {
                        if !definition.classes.iter().any(|existing| existing == class) {
                            definition.classes.push(class.to_owned());
                        }
                    }
                } else {
                    definition
                        .attributes
                        .insert(attr_name, attr.value.to_string());
                }
            }
            definition.components = handle.children.borrow().iter().filter_map(convert).collect();
            Some(definition)
        }
        NodeData::Text { contents } => {
            let text = contents.borrow().to_string();
            (text == " " || !text.trim().is_empty()).then(|| ComponentDefinition::text(&text))
        }
        NodeData::Comment { contents } => Some(ComponentDefinition::comment(contents)),
        _ => None,
    }
}
