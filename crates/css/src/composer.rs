//! Ordered rule collection with find-or-create access and canonical output.

use crate::definition::RuleDefinition;
use crate::rule::{
    AtRule, CssRule, RuleId, RuleScope, StyleMap, parse_selector_prelude, style_from_declarations,
};
use crate::usage::SelectorUsage;
use css_syntax::{CssItem, Stylesheet, SyntaxError, parse_stylesheet};
use indexmap::IndexMap;
use log::{debug, warn};

/// Output options for [`CssComposer::to_css`].
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct CssOptions {
    /// Print rules whose selectors no component references.
    pub keep_unused_styles: bool,
}

/// The editor's style sheet.
#[derive(Clone, Debug, Default)]
pub struct CssComposer {
    rules: Vec<CssRule>,
    next_id: u64,
}

impl CssComposer {
    /// An empty composer.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    const fn allocate_id(&mut self) -> RuleId {
        let id = RuleId(self.next_id);
        self.next_id = self.next_id.saturating_add(1);
        id
    }

    /// Parse `css` and append every rule it contains.
    ///
    /// # Errors
    /// Returns the first syntax error; the collection is not modified.
    pub fn add_rules(&mut self, css: &str) -> Result<Vec<RuleId>, SyntaxError> {
        let sheet = parse_stylesheet(css)?;
        Ok(self.add_stylesheet(&sheet))
    }

    /// Append the rules of an already parsed sheet.
    pub fn add_stylesheet(&mut self, sheet: &Stylesheet) -> Vec<RuleId> {
        let mut added = Vec::new();
        for item in &sheet.items {
            match item {
                CssItem::Style(style_rule) => {
                    let parsed = parse_selector_prelude(&style_rule.prelude);
                    let id = self.allocate_id();
                    self.rules.push(CssRule {
                        id,
                        selectors: parsed.selectors,
                        selectors_add: parsed.selectors_add,
                        state: parsed.state,
                        style: style_from_declarations(&style_rule.declarations),
                        at_rule: None,
                        single_at_rule: false,
                    });
                    added.push(id);
                }
                CssItem::Group(group) => {
                    let at_rule = AtRule {
                        kind: group.name.clone(),
                        params: group.prelude.clone(),
                    };
                    for nested in &group.rules {
                        let parsed = parse_selector_prelude(&nested.prelude);
                        let id = self.allocate_id();
                        self.rules.push(CssRule {
                            id,
                            selectors: parsed.selectors,
                            selectors_add: parsed.selectors_add,
                            state: parsed.state,
                            style: style_from_declarations(&nested.declarations),
                            at_rule: Some(at_rule.clone()),
                            single_at_rule: false,
                        });
                        added.push(id);
                    }
                }
                CssItem::AtRule(at_rule) => {
                    let id = self.allocate_id();
                    self.rules.push(CssRule {
                        id,
                        selectors: Vec::new(),
                        selectors_add: String::new(),
                        state: String::new(),
                        style: style_from_declarations(&at_rule.declarations),
                        at_rule: Some(AtRule {
                            kind: at_rule.name.clone(),
                            params: at_rule.prelude.clone(),
                        }),
                        single_at_rule: true,
                    });
                    added.push(id);
                }
                CssItem::Statement { name, prelude } => {
                    warn!("Ignoring unsupported statement @{name} {prelude}");
                }
            }
        }
        debug!("Added {} CSS rules", added.len());
        added
    }

    /// Append rules from their plain definitions.
    pub fn add_definitions(&mut self, definitions: &[RuleDefinition]) -> Vec<RuleId> {
        definitions
            .iter()
            .map(|definition| {
                let id = self.allocate_id();
                self.rules.push(definition.clone().into_rule(id));
                id
            })
            .collect()
    }

    /// Drop every rule and load `definitions` instead.
    pub fn replace_with_definitions(&mut self, definitions: &[RuleDefinition]) -> Vec<RuleId> {
        self.rules.clear();
        self.add_definitions(definitions)
    }

    /// Plain definitions of every rule, in insertion order.
    #[must_use]
    pub fn to_definitions(&self) -> Vec<RuleDefinition> {
        self.rules.iter().map(RuleDefinition::from).collect()
    }

    /// Rules in insertion order.
    #[must_use]
    pub fn get_all(&self) -> &[CssRule] {
        &self.rules
    }

    /// Number of rules.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.rules.len()
    }

    /// True when there are no rules.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    #[must_use]
    pub fn get(&self, id: RuleId) -> Option<&CssRule> {
        self.rules.iter().find(|rule| rule.id == id)
    }

    pub fn get_mut(&mut self, id: RuleId) -> Option<&mut CssRule> {
        self.rules.iter_mut().find(|rule| rule.id == id)
    }

    /// First top-level rule targeting exactly `.name` with no state.
    #[must_use]
    pub fn get_class_rule(&self, name: &str) -> Option<&CssRule> {
        let name = name.trim_start_matches('.');
        self.rules.iter().find(|rule| rule.is_class_rule(name))
    }

    /// Find the rule for `selector` in `scope`.
    #[must_use]
    pub fn get_rule(&self, selector: &str, scope: &RuleScope) -> Option<&CssRule> {
        let parsed = parse_selector_prelude(selector);
        self.rules
            .iter()
            .find(|rule| rule.matches_scope(&parsed, scope))
    }

    /// Find or create the rule for `selector` in `scope` and replace its style.
    pub fn set_rule(&mut self, selector: &str, style: StyleMap, scope: &RuleScope) -> RuleId {
        let parsed = parse_selector_prelude(selector);
        if let Some(rule) = self
            .rules
            .iter_mut()
            .find(|rule| rule.matches_scope(&parsed, scope))
        {
            rule.set_style(style);
            return rule.id;
        }
        let id = self.allocate_id();
        let state = if scope.state.is_empty() {
            parsed.state
        } else {
            scope.state.clone()
        };
        debug!("Creating rule {selector} in scope {scope:?}");
        self.rules.push(CssRule {
            id,
            selectors: parsed.selectors,
            selectors_add: parsed.selectors_add,
            state,
            style,
            at_rule: scope.at_rule.clone(),
            single_at_rule: false,
        });
        id
    }

    /// Remove a rule, returning it.
    pub fn remove(&mut self, id: RuleId) -> Option<CssRule> {
        let index = self.rules.iter().position(|rule| rule.id == id)?;
        Some(self.rules.remove(index))
    }

    /// Remove every rule.
    pub fn clear(&mut self) {
        self.rules.clear();
    }

    fn is_referenced(rule: &CssRule, usage: &dyn SelectorUsage) -> bool {
        rule.single_at_rule
            || !rule.selectors_add.is_empty()
            || rule.selectors.iter().any(|selector| usage.uses(selector))
    }

    fn renders(rule: &CssRule, usage: &dyn SelectorUsage, options: CssOptions) -> bool {
        !rule.style.is_empty() && (options.keep_unused_styles || Self::is_referenced(rule, usage))
    }

    /// Rules that the pruning pass drops because nothing references them.
    #[must_use]
    pub fn unused_rules(&self, usage: &dyn SelectorUsage) -> Vec<&CssRule> {
        self.rules
            .iter()
            .filter(|rule| !Self::is_referenced(rule, usage))
            .collect()
    }

    /// Canonical CSS text.
    ///
    /// Top-level rules come first in insertion order, then one block per
    /// distinct at-rule header in order of first appearance. Single at-rules
    /// print one block each.
    #[must_use]
    pub fn to_css(&self, usage: &dyn SelectorUsage, options: CssOptions) -> String {
        let mut out = String::new();
        let mut grouped: IndexMap<String, Vec<&CssRule>> = IndexMap::new();
        for rule in &self.rules {
            if rule.at_rule.is_some() {
                grouped.entry(rule.at_rule_header()).or_default().push(rule);
                continue;
            }
            if Self::renders(rule, usage, options)
                && let Some(block) = rule.to_css_block()
            {
                out.push_str(&block);
            }
        }
        for (header, rules) in grouped {
            let mut body = String::new();
            for rule in rules {
                if !Self::renders(rule, usage, options) {
                    continue;
                }
                let Some(block) = rule.to_css_block() else {
                    continue;
                };
                if rule.single_at_rule {
                    out.push_str(&format!("{header}{{{block}}}"));
                } else {
                    body.push_str(&block);
                }
            }
            if !body.is_empty() {
                out.push_str(&format!("{header}{{{body}}}"));
            }
        }
        out
    }
}
