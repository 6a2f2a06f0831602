//! Style model and CSS composer of the editor.
//!
//! Rules are kept in insertion order. Each rule carries its class/id selector
//! tokens, an optional state, any extra selector text that is not a plain
//! class/id compound, its declarations and an optional enclosing at-rule.
//! [`CssComposer::to_css`] prints them canonically, grouping at-rules and
//! pruning rules no live component references.

mod composer;
mod definition;
mod rule;
mod usage;

pub use composer::{CssComposer, CssOptions};
pub use css_syntax::SyntaxError;
pub use definition::{RuleDefinition, SelectorDefinition};
pub use rule::{
    AtRule, CssRule, ParsedSelectors, RuleId, RuleScope, Selector, SelectorKind, StyleMap,
    parse_selector_prelude, style_from_declarations,
};
pub use usage::{KeepAll, SelectorUsage, UsedSelectors};
