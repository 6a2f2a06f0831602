//! Component tree: an arena of component nodes rooted at a page wrapper.

mod definition;
mod printing;
mod query;

pub use definition::ComponentDefinition;
pub use query::SelectorQuery;

use core::error::Error;
use core::fmt::{Display, Formatter, Result as FmtResult};
use indexmap::IndexMap;
use indextree::{Arena, Node, NodeError, NodeId};
use log::debug;
use std::collections::HashSet;

/// What a component node represents.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ComponentKind {
    /// The page root, printed as `<body>`.
    Wrapper,
    /// An element with a lowercase tag name.
    Element { tag: String },
    /// A text node.
    Text(String),
    /// A comment node.
    Comment(String),
}

/// One node of the component tree.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Component {
    /// Node kind.
    pub kind: ComponentKind,
    /// Optional component type name (`image`, `link`, ...).
    pub component_type: Option<String>,
    classes: Vec<String>,
    attributes: IndexMap<String, String>,
}

impl Component {
    /// A component of the given kind with no classes or attributes.
    #[must_use]
    pub fn new(kind: ComponentKind) -> Self {
        Self {
            kind,
            component_type: None,
            classes: Vec::new(),
            attributes: IndexMap::new(),
        }
    }

    /// An element component.
    #[must_use]
    pub fn element(tag: &str) -> Self {
        Self::new(ComponentKind::Element {
            tag: tag.to_ascii_lowercase(),
        })
    }

    /// A text component.
    #[must_use]
    pub fn text(content: impl Into<String>) -> Self {
        Self::new(ComponentKind::Text(content.into()))
    }

    /// Tag name used for matching and printing; the wrapper reports `body`.
    #[must_use]
    pub fn tag_name(&self) -> Option<&str> {
        match &self.kind {
            ComponentKind::Wrapper => Some("body"),
            ComponentKind::Element { tag } => Some(tag.as_str()),
            ComponentKind::Text(_) | ComponentKind::Comment(_) => None,
        }
    }

    /// Whether the node may hold children.
    #[must_use]
    pub const fn is_container(&self) -> bool {
        matches!(
            self.kind,
            ComponentKind::Wrapper | ComponentKind::Element { .. }
        )
    }

    /// Class tokens in insertion order.
    #[must_use]
    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    #[must_use]
    pub fn has_class(&self, name: &str) -> bool {
        self.classes.iter().any(|class| class == name)
    }

    /// Add a class token, returning `false` when it was already present.
    pub fn add_class(&mut self, name: &str) -> bool {
        let name = name.trim();
        if name.is_empty() || self.has_class(name) {
            return false;
        }
        self.classes.push(name.to_owned());
        true
    }

    /// Remove a class token, returning whether it was present.
    pub fn remove_class(&mut self, name: &str) -> bool {
        let before = self.classes.len();
        self.classes.retain(|class| class != name);
        before != self.classes.len()
    }

    /// Attributes in insertion order. `class` is never part of this map.
    #[must_use]
    pub const fn attributes(&self) -> &IndexMap<String, String> {
        &self.attributes
    }

    #[must_use]
    pub fn get_attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    /// Set an attribute. Setting `class` replaces the class tokens instead.
    pub fn set_attribute(&mut self, name: &str, value: &str) {
        let name = name.to_ascii_lowercase();
        if name == "class" {
            self.classes.clear();
            for class in value.split_whitespace() {
                self.add_class(class);
            }
            return;
        }
        self.attributes.insert(name, value.to_owned());
    }

    /// Remove an attribute, returning its previous value.
    pub fn remove_attribute(&mut self, name: &str) -> Option<String> {
        if name.eq_ignore_ascii_case("class") {
            let joined = self.classes.join(" ");
            self.classes.clear();
            return (!joined.is_empty()).then_some(joined);
        }
        self.attributes.shift_remove(name)
    }

    /// The `id` attribute.
    #[must_use]
    pub fn id(&self) -> Option<&str> {
        self.get_attribute("id")
    }
}

/// Structural mutation failures.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TreeError {
    /// The node id does not refer to a live node.
    UnknownNode(NodeId),
    /// The wrapper cannot be removed or moved.
    WrapperIsFixed,
    /// Text and comment nodes cannot hold children.
    NotAContainer(NodeId),
    /// The move would put a node inside itself.
    Cycle(NodeId),
}

impl Display for TreeError {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> FmtResult {
        match self {
            Self::UnknownNode(node) => write!(formatter, "Unknown component {node:?}"),
            Self::WrapperIsFixed => write!(formatter, "The page wrapper cannot be removed or moved"),
            Self::NotAContainer(node) => {
                write!(formatter, "Component {node:?} cannot contain children")
            }
            Self::Cycle(node) => write!(
                formatter,
                "Component {node:?} cannot be moved inside its own subtree"
            ),
        }
    }
}

impl Error for TreeError {}

/// The document's component tree.
#[derive(Clone, Debug)]
pub struct ComponentTree {
    arena: Arena<Component>,
    wrapper: NodeId,
}

impl Default for ComponentTree {
    fn default() -> Self {
        Self::new()
    }
}

impl ComponentTree {
    /// A tree holding only the wrapper.
    #[must_use]
    pub fn new() -> Self {
        let mut arena = Arena::new();
        let wrapper = arena.new_node(Component::new(ComponentKind::Wrapper));
        Self { arena, wrapper }
    }

    /// The page root.
    #[must_use]
    pub const fn wrapper(&self) -> NodeId {
        self.wrapper
    }

    /// Whether `node` is a live node of this tree.
    #[must_use]
    pub fn contains(&self, node: NodeId) -> bool {
        self.arena
            .get(node)
            .is_some_and(|entry| !entry.is_removed())
    }

    #[must_use]
    pub fn get(&self, node: NodeId) -> Option<&Component> {
        self.arena
            .get(node)
            .filter(|entry| !entry.is_removed())
            .map(Node::get)
    }

    pub fn get_mut(&mut self, node: NodeId) -> Option<&mut Component> {
        self.arena
            .get_mut(node)
            .filter(|entry| !entry.is_removed())
            .map(Node::get_mut)
    }

    fn require(&self, node: NodeId) -> Result<&Component, TreeError> {
        self.get(node).ok_or(TreeError::UnknownNode(node))
    }

    /// Children of `node` in order.
    #[must_use]
    pub fn children(&self, node: NodeId) -> Vec<NodeId> {
        if !self.contains(node) {
            return Vec::new();
        }
        node.children(&self.arena).collect()
    }

    /// Parent of `node`; `None` for the wrapper and unknown ids.
    #[must_use]
    pub fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.arena
            .get(node)
            .filter(|entry| !entry.is_removed())
            .and_then(Node::parent)
    }

    /// Position of `node` among its siblings.
    #[must_use]
    pub fn index_of(&self, node: NodeId) -> Option<usize> {
        let parent = self.parent(node)?;
        parent.children(&self.arena).position(|child| child == node)
    }

    /// Top-level components (children of the wrapper).
    #[must_use]
    pub fn components(&self) -> Vec<NodeId> {
        self.children(self.wrapper)
    }

    /// Strict descendants of `node` in document order.
    #[must_use]
    pub fn descendants(&self, node: NodeId) -> Vec<NodeId> {
        if !self.contains(node) {
            return Vec::new();
        }
        node.descendants(&self.arena).skip(1).collect()
    }

    /// Number of live components, not counting the wrapper.
    #[must_use]
    pub fn len(&self) -> usize {
        self.descendants(self.wrapper).len()
    }

    /// True when the wrapper has no children.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.components().is_empty()
    }

    /// Append `component` as the last child of `parent`.
    ///
    /// # Errors
    /// Fails when `parent` is unknown or cannot hold children.
    pub fn append(&mut self, parent: NodeId, component: Component) -> Result<NodeId, TreeError> {
        if !self.require(parent)?.is_container() {
            return Err(TreeError::NotAContainer(parent));
        }
        let node = self.arena.new_node(component);
        parent
            .checked_append(node, &mut self.arena)
            .map_err(|error| self.map_node_error(&error, node))?;
        Ok(node)
    }

    /// Build components from definitions and append them to `parent`.
    ///
    /// # Errors
    /// Fails when `parent` is unknown or cannot hold children.
    pub fn append_definitions(
        &mut self,
        parent: NodeId,
        definitions: &[ComponentDefinition],
    ) -> Result<Vec<NodeId>, TreeError> {
        let mut added = Vec::with_capacity(definitions.len());
        for definition in definitions {
            added.push(self.append_definition(parent, definition)?);
        }
        Ok(added)
    }

    fn append_definition(
        &mut self,
        parent: NodeId,
        definition: &ComponentDefinition,
    ) -> Result<NodeId, TreeError> {
        let node = self.append(parent, definition.to_component())?;
        if let Some(content) = definition.element_content() {
            self.append(node, Component::text(content))?;
        }
        for child in &definition.components {
            self.append_definition(node, child)?;
        }
        Ok(node)
    }

    /// Replace every top-level component, returning the removed and the added ids.
    pub fn set_components(
        &mut self,
        definitions: &[ComponentDefinition],
    ) -> (Vec<NodeId>, Vec<NodeId>) {
        let removed = self.clear();
        let wrapper = self.wrapper;
        let added = self
            .append_definitions(wrapper, definitions)
            .unwrap_or_default();
        (removed, added)
    }

    /// Remove every top-level component, returning the ids that were removed.
    pub fn clear(&mut self) -> Vec<NodeId> {
        let removed = self.descendants(self.wrapper);
        for child in self.components() {
            child.remove_subtree(&mut self.arena);
        }
        removed
    }

    /// Remove `node` and its subtree, returning every removed id.
    ///
    /// # Errors
    /// Fails for the wrapper and for unknown ids.
    pub fn remove(&mut self, node: NodeId) -> Result<Vec<NodeId>, TreeError> {
        if node == self.wrapper {
            return Err(TreeError::WrapperIsFixed);
        }
        self.require(node)?;
        let removed: Vec<NodeId> = node.descendants(&self.arena).collect();
        node.remove_subtree(&mut self.arena);
        debug!("Removed {} components", removed.len());
        Ok(removed)
    }

    /// Move `node` under `parent` at `index` (append when out of range).
    ///
    /// # Errors
    /// Fails for unknown ids, the wrapper, non-container parents and moves into
    /// the node's own subtree. The tree is unchanged on failure.
    pub fn move_to(
        &mut self,
        node: NodeId,
        parent: NodeId,
        index: Option<usize>,
    ) -> Result<(), TreeError> {
        if node == self.wrapper {
            return Err(TreeError::WrapperIsFixed);
        }
        self.require(node)?;
        if !self.require(parent)?.is_container() {
            return Err(TreeError::NotAContainer(parent));
        }
        if parent.ancestors(&self.arena).any(|ancestor| ancestor == node) {
            return Err(TreeError::Cycle(node));
        }
        let anchor = index.and_then(|position| {
            parent
                .children(&self.arena)
                .filter(|child| *child != node)
                .nth(position)
        });
        node.detach(&mut self.arena);
        let result = match anchor {
            Some(sibling) => sibling.checked_insert_before(node, &mut self.arena),
            None => parent.checked_append(node, &mut self.arena),
        };
        result.map_err(|error| self.map_node_error(&error, node))
    }

    fn map_node_error(&self, error: &NodeError, node: NodeId) -> TreeError {
        debug!("Tree operation on {node:?} failed: {error:?}");
        match error {
            NodeError::Removed => TreeError::UnknownNode(node),
            _ if node == self.wrapper => TreeError::WrapperIsFixed,
            _ => TreeError::Cycle(node),
        }
    }

    /// Descendants of `root` matching `selector`, in document order.
    #[must_use]
    pub fn find(&self, root: NodeId, selector: &str) -> Vec<NodeId> {
        let query = SelectorQuery::parse(selector);
        self.descendants(root)
            .into_iter()
            .filter(|node| query.matches(self, *node))
            .collect()
    }

    /// Every class token used by a live component.
    #[must_use]
    pub fn class_names(&self) -> HashSet<String> {
        self.wrapper
            .descendants(&self.arena)
            .filter_map(|node| self.get(node))
            .flat_map(|component| component.classes.iter().cloned())
            .collect()
    }

    /// Every `id` attribute used by a live component.
    #[must_use]
    pub fn ids(&self) -> HashSet<String> {
        self.wrapper
            .descendants(&self.arena)
            .filter_map(|node| self.get(node))
            .filter_map(|component| component.id().map(str::to_owned))
            .collect()
    }

    /// Definition of `node` and its subtree.
    #[must_use]
    pub fn to_definition(&self, node: NodeId) -> Option<ComponentDefinition> {
        let component = self.get(node)?;
        let mut definition = ComponentDefinition::from_component(component);
        definition.components = self
            .children(node)
            .into_iter()
            .filter_map(|child| self.to_definition(child))
            .collect();
        Some(definition)
    }

    /// Replace the wrapper's attributes and children from a wrapper definition.
    pub fn load_wrapper(&mut self, definition: &ComponentDefinition) -> (Vec<NodeId>, Vec<NodeId>) {
        let wrapper = self.wrapper;
        if let Some(component) = self.get_mut(wrapper) {
            let mut loaded = definition.to_component();
            loaded.kind = ComponentKind::Wrapper;
            *component = loaded;
        }
        self.set_components(&definition.components)
    }
}
