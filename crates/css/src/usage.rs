//! Which selectors are referenced by live components.

use crate::rule::{Selector, SelectorKind};
use std::collections::HashSet;

/// Answers whether a selector token is referenced by the document.
pub trait SelectorUsage {
    /// True when some live component carries this class.
    fn uses_class(&self, name: &str) -> bool;
    /// True when some live component carries this id.
    fn uses_id(&self, name: &str) -> bool;

    /// Dispatch on the selector kind.
    fn uses(&self, selector: &Selector) -> bool {
        match selector.kind {
            SelectorKind::Class => self.uses_class(&selector.name),
            SelectorKind::Id => self.uses_id(&selector.name),
        }
    }
}

/// Set-backed usage collected from a component tree.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct UsedSelectors {
    /// Class names in use.
    pub classes: HashSet<String>,
    /// Ids in use.
    pub ids: HashSet<String>,
}

impl UsedSelectors {
    /// Build from iterators of class names and ids.
    pub fn new<C, I>(classes: C, ids: I) -> Self
    where
        C: IntoIterator,
        C::Item: Into<String>,
        I: IntoIterator,
        I::Item: Into<String>,
    {
        Self {
            classes: classes.into_iter().map(Into::into).collect(),
            ids: ids.into_iter().map(Into::into).collect(),
        }
    }
}

impl SelectorUsage for UsedSelectors {
    fn uses_class(&self, name: &str) -> bool {
        self.classes.contains(name)
    }

    fn uses_id(&self, name: &str) -> bool {
        self.ids.contains(name)
    }
}

/// Usage that reports every selector as used.
#[derive(Copy, Clone, Debug, Default)]
pub struct KeepAll;

impl SelectorUsage for KeepAll {
    fn uses_class(&self, _name: &str) -> bool {
        true
    }

    fn uses_id(&self, _name: &str) -> bool {
        true
    }
}
