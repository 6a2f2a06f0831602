use super::{Component, ComponentKind, ComponentTree};
use indextree::NodeId;

/// Elements printed without a closing tag.
const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source", "track",
    "wbr",
];

fn escape_text(text: &str, out: &mut String) {
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            other => out.push(other),
        }
    }
}

fn escape_attribute(value: &str, out: &mut String) {
    for ch in value.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '"' => out.push_str("&quot;"),
            other => out.push(other),
        }
    }
}

fn push_attributes(component: &Component, out: &mut String) {
    for (name, value) in component.attributes() {
        out.push(' ');
        out.push_str(name);
        out.push_str("=\"");
        escape_attribute(value, out);
        out.push('"');
    }
    if !component.classes().is_empty() {
        out.push_str(" class=\"");
        escape_attribute(&component.classes().join(" "), out);
        out.push('"');
    }
}

impl ComponentTree {
    /// Markup of the whole page, `<body>` included.
    #[must_use]
    pub fn to_html(&self) -> String {
        self.node_to_html(self.wrapper)
    }

    /// Markup of `node` and its subtree; empty for unknown ids.
    #[must_use]
    pub fn node_to_html(&self, node: NodeId) -> String {
        let mut out = String::new();
        self.write_node(node, &mut out);
        out
    }

    /// Markup of the children of `node`.
    #[must_use]
    pub fn inner_html(&self, node: NodeId) -> String {
        let mut out = String::new();
        for child in self.children(node) {
            self.write_node(child, &mut out);
        }
        out
    }

    fn write_node(&self, node: NodeId, out: &mut String) {
        let Some(component) = self.get(node) else {
            return;
        };
        match &component.kind {
            ComponentKind::Text(text) => escape_text(text, out),
            ComponentKind::Comment(text) => {
                out.push_str("<!--");
                out.push_str(text);
                out.push_str("-->");
            }
            ComponentKind::Wrapper | ComponentKind::Element { .. } => {
                let tag = component.tag_name().unwrap_or("div");
                out.push('<');
                out.push_str(tag);
                push_attributes(component, out);
                out.push('>');
                if VOID_ELEMENTS.contains(&tag) {
                    return;
                }
                for child in self.children(node) {
                    self.write_node(child, out);
                }
                out.push_str("</");
                out.push_str(tag);
                out.push('>');
            }
        }
    }
}
