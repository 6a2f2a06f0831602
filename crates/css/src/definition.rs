//! Plain serializable form of a rule, used for configuration and project data.

use crate::rule::{AtRule, CssRule, RuleId, Selector, SelectorKind, StyleMap};
use serde::{Deserialize, Serialize};

/// A selector entry: `"name"`, `".name"`, `"#id"` or `{ "name": .., "type": .. }`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SelectorDefinition {
    /// String form.
    Name(String),
    /// Object form. `type` is `"class"` (default) or `"id"`.
    Object {
        /// Name without prefix.
        name: String,
        /// `class` or `id`.
        #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
        kind: Option<String>,
    },
}

impl SelectorDefinition {
    /// Convert into a selector token.
    #[must_use]
    pub fn to_selector(&self) -> Selector {
        match self {
            Self::Name(name) => Selector::parse(name),
            Self::Object { name, kind } => match kind.as_deref() {
                Some("id") => Selector::id(name.trim_start_matches('#')),
                _ => Selector::class(name.trim_start_matches('.')),
            },
        }
    }
}

impl From<&Selector> for SelectorDefinition {
    fn from(selector: &Selector) -> Self {
        match selector.kind {
            SelectorKind::Class => Self::Name(selector.name.clone()),
            SelectorKind::Id => Self::Name(selector.full_name()),
        }
    }
}

impl From<&str> for SelectorDefinition {
    fn from(name: &str) -> Self {
        Self::Name(name.to_owned())
    }
}

/// Serializable rule.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RuleDefinition {
    /// Class/id selectors.
    pub selectors: Vec<SelectorDefinition>,
    /// Extra selector text.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub selectors_add: String,
    /// State qualifier.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub state: String,
    /// Declarations.
    #[serde(skip_serializing_if = "StyleMap::is_empty")]
    pub style: StyleMap,
    /// At-rule kind (`media` when only `mediaText` is set).
    #[serde(skip_serializing_if = "String::is_empty")]
    pub at_rule_type: String,
    /// At-rule condition.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub media_text: String,
    /// Marks `@font-face`-style rules.
    #[serde(skip_serializing_if = "core::ops::Not::not")]
    pub single_at_rule: bool,
}

impl RuleDefinition {
    /// A definition with class selectors only.
    #[must_use]
    pub fn with_classes(classes: &[&str]) -> Self {
        Self {
            selectors: classes.iter().copied().map(SelectorDefinition::from).collect(),
            ..Self::default()
        }
    }

    /// Same definition with a declaration added.
    #[must_use]
    pub fn with_property(mut self, name: &str, value: &str) -> Self {
        self.style.insert(name.to_owned(), value.to_owned());
        self
    }

    pub(crate) fn at_rule(&self) -> Option<AtRule> {
        if self.at_rule_type.is_empty() && self.media_text.is_empty() {
            return None;
        }
        let kind = if self.at_rule_type.is_empty() {
            String::from("media")
        } else {
            self.at_rule_type.clone()
        };
        Some(AtRule {
            kind,
            params: self.media_text.clone(),
        })
    }

    pub(crate) fn into_rule(self, id: RuleId) -> CssRule {
        let at_rule = self.at_rule();
        let mut selectors: Vec<Selector> = Vec::with_capacity(self.selectors.len());
        for selector in self.selectors.iter().map(SelectorDefinition::to_selector) {
            if !selectors.contains(&selector) {
                selectors.push(selector);
            }
        }
        CssRule {
            id,
            selectors,
            selectors_add: self.selectors_add,
            state: self.state,
            style: self.style,
            at_rule,
            single_at_rule: self.single_at_rule,
        }
    }
}

impl From<&CssRule> for RuleDefinition {
    fn from(rule: &CssRule) -> Self {
        let (at_rule_type, media_text) = rule
            .at_rule
            .as_ref()
            .map(|at_rule| (at_rule.kind.clone(), at_rule.params.clone()))
            .unwrap_or_default();
        Self {
            selectors: rule.selectors.iter().map(SelectorDefinition::from).collect(),
            selectors_add: rule.selectors_add.clone(),
            state: rule.state.clone(),
            style: rule.style.clone(),
            at_rule_type,
            media_text,
            single_at_rule: rule.single_at_rule,
        }
    }
}
