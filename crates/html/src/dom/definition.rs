use super::{Component, ComponentKind};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Component type names with a dedicated node kind.
const TEXT_TYPE: &str = "textnode";
const COMMENT_TYPE: &str = "comment";
const WRAPPER_TYPE: &str = "wrapper";

/// Plain-object form of a component and its subtree.
///
/// `{}` is an empty `div`. `type: "textnode"` and `type: "comment"` read their
/// text from `content`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ComponentDefinition {
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub component_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tag_name: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub classes: Vec<String>,
    #[serde(skip_serializing_if = "IndexMap::is_empty")]
    pub attributes: IndexMap<String, String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub components: Vec<Self>,
}

impl ComponentDefinition {
    /// An element definition.
    #[must_use]
    pub fn element(tag: &str) -> Self {
        Self {
            tag_name: Some(tag.to_owned()),
            ..Self::default()
        }
    }

    /// A text node definition.
    #[must_use]
    pub fn text(content: &str) -> Self {
        Self {
            component_type: Some(TEXT_TYPE.to_owned()),
            content: Some(content.to_owned()),
            ..Self::default()
        }
    }

    /// A comment definition.
    #[must_use]
    pub fn comment(content: &str) -> Self {
        Self {
            component_type: Some(COMMENT_TYPE.to_owned()),
            content: Some(content.to_owned()),
            ..Self::default()
        }
    }

    /// Same definition with a class token added.
    #[must_use]
    pub fn with_class(mut self, class: &str) -> Self {
        self.classes.push(class.to_owned());
        self
    }

    /// Same definition with an attribute set.
    #[must_use]
    pub fn with_attribute(mut self, name: &str, value: &str) -> Self {
        self.attributes.insert(name.to_owned(), value.to_owned());
        self
    }

    /// Same definition with a child appended.
    #[must_use]
    pub fn with_child(mut self, child: Self) -> Self {
        self.components.push(child);
        self
    }

    /// Inline text of an element definition, printed as its first child.
    pub(crate) fn element_content(&self) -> Option<&str> {
        match self.component_type.as_deref() {
            Some(TEXT_TYPE | COMMENT_TYPE) => None,
            _ => self.content.as_deref().filter(|content| !content.is_empty()),
        }
    }

    /// Build the node this definition describes, without its children.
    #[must_use]
    pub fn to_component(&self) -> Component {
        let content = self.content.clone().unwrap_or_default();
        let kind = match self.component_type.as_deref() {
            Some(TEXT_TYPE) => return Component::text(content),
            Some(COMMENT_TYPE) => return Component::new(ComponentKind::Comment(content)),
            Some(WRAPPER_TYPE) => ComponentKind::Wrapper,
            _ => ComponentKind::Element {
                tag: self
                    .tag_name
                    .as_deref()
                    .unwrap_or("div")
                    .to_ascii_lowercase(),
            },
        };
        let mut component = Component::new(kind);
        component.component_type = self
            .component_type
            .clone()
            .filter(|name| name != "default" && name != WRAPPER_TYPE);
        for class in &self.classes {
            component.add_class(class);
        }
        for (name, value) in &self.attributes {
            component.set_attribute(name, value);
        }
        component
    }

    /// Describe a single node, without its children.
    #[must_use]
    pub fn from_component(component: &Component) -> Self {
        let definition = match &component.kind {
            ComponentKind::Text(content) => return Self::text(content),
            ComponentKind::Comment(content) => return Self::comment(content),
            ComponentKind::Wrapper => Self {
                component_type: Some(WRAPPER_TYPE.to_owned()),
                ..Self::default()
            },
            ComponentKind::Element { tag } => Self {
                component_type: component.component_type.clone(),
                tag_name: (tag != "div").then(|| tag.clone()),
                ..Self::default()
            },
        };
        definition.with_node_data(component)
    }

    fn with_node_data(mut self, component: &Component) -> Self {
        self.classes = component.classes().to_vec();
        self.attributes = component.attributes().clone();
        self
    }
}
