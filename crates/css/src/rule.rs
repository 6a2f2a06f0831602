//! The style model: one CSS rule, its selectors and its declaration block.

use core::fmt::{Display, Formatter, Result as FmtResult};
use css_syntax::Declaration;
use indexmap::IndexMap;

/// Ordered declaration map (property name → value).
pub type StyleMap = IndexMap<String, String>;

/// Stable identifier of a rule inside one composer.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RuleId(pub u64);

/// Whether a selector token targets a class or an id.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum SelectorKind {
    /// `.name`
    Class,
    /// `#name`
    Id,
}

/// A single class or id selector token.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Selector {
    /// Name without the `.`/`#` prefix.
    pub name: String,
    /// Token kind.
    pub kind: SelectorKind,
}

impl Selector {
    /// A class selector token.
    #[must_use]
    pub fn class(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: SelectorKind::Class,
        }
    }

    /// An id selector token.
    #[must_use]
    pub fn id(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: SelectorKind::Id,
        }
    }

    /// Parse `.name`, `#name` or a bare class name.
    #[must_use]
    pub fn parse(token: &str) -> Self {
        let token = token.trim();
        token.strip_prefix('#').map_or_else(
            || Self::class(token.strip_prefix('.').unwrap_or(token)),
            Self::id,
        )
    }

    /// Prefixed form (`.name` / `#name`).
    #[must_use]
    pub fn full_name(&self) -> String {
        match self.kind {
            SelectorKind::Class => format!(".{}", self.name),
            SelectorKind::Id => format!("#{}", self.name),
        }
    }
}

/// At-rule wrapping a rule, e.g. `@media (max-width: 992px)`.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct AtRule {
    /// Name without `@` (`media`, `font-face`, `supports`, ...).
    pub kind: String,
    /// Condition or prelude text, may be empty.
    pub params: String,
}

impl AtRule {
    /// A media at-rule for the given condition.
    #[must_use]
    pub fn media(condition: impl Into<String>) -> Self {
        Self {
            kind: String::from("media"),
            params: condition.into(),
        }
    }
}

impl Display for AtRule {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> FmtResult {
        if self.params.is_empty() {
            write!(formatter, "@{}", self.kind)
        } else {
            write!(formatter, "@{} {}", self.kind, self.params)
        }
    }
}

/// Scope used by the find-or-create accessors.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RuleScope {
    /// State qualifier (`hover`), empty for none. Overrides a state parsed from the selector.
    pub state: String,
    /// Enclosing at-rule, `None` for the top level.
    pub at_rule: Option<AtRule>,
}

impl RuleScope {
    /// Scope inside a media condition.
    #[must_use]
    pub fn media(condition: impl Into<String>) -> Self {
        Self {
            state: String::new(),
            at_rule: Some(AtRule::media(condition)),
        }
    }

    /// Same scope with a state qualifier.
    #[must_use]
    pub fn with_state(mut self, state: impl Into<String>) -> Self {
        self.state = state.into();
        self
    }
}

/// A selector prelude split into class/id tokens and everything else.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ParsedSelectors {
    /// Tokens of the first pure class compound or single id.
    pub selectors: Vec<Selector>,
    /// State taken from that part (`:hover` → `hover`).
    pub state: String,
    /// Remaining comma parts, joined by `, `.
    pub selectors_add: String,
}

/// Whether `name` is a plausible CSS identifier for a class or id.
fn is_ident(name: &str) -> bool {
    let body = name.strip_prefix('-').unwrap_or(name);
    body.chars()
        .next()
        .is_some_and(|first| first.is_alphabetic() || first == '_')
        && body
            .chars()
            .all(|ch| ch.is_alphanumeric() || ch == '-' || ch == '_')
}

/// Split a trailing `:state` / `::state` off a selector part.
///
/// The state keeps every colon but the first, so `::before` is stored as `:before`.
fn split_state(part: &str) -> (&str, &str) {
    part.find(':').map_or((part, ""), |pos| {
        let (head, tail) = part.split_at(pos);
        (head, tail.get(1..).unwrap_or_default())
    })
}

/// Try to read one comma part as `.a.b[:state]` or `#id[:state]`.
fn parse_simple_part(part: &str) -> Option<(Vec<Selector>, String)> {
    let (head, state) = split_state(part);
    let pseudo = state.strip_prefix(':').unwrap_or(state);
    if pseudo.contains(':') || pseudo.chars().any(char::is_whitespace) {
        return None;
    }
    if let Some(id) = head.strip_prefix('#') {
        return is_ident(id).then(|| (vec![Selector::id(id)], state.to_owned()));
    }
    let classes = head.strip_prefix('.')?;
    let mut out = Vec::new();
    for class in classes.split('.') {
        if !is_ident(class) {
            return None;
        }
        if !out.iter().any(|existing: &Selector| existing.name == class) {
            out.push(Selector::class(class));
        }
    }
    Some((out, state.to_owned()))
}

/// Split a selector list on top-level commas (commas inside `()`/`[]` are kept).
fn split_selector_list(prelude: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0_usize;
    let mut start = 0_usize;
    for (index, ch) in prelude.char_indices() {
        match ch {
            '(' | '[' => depth = depth.saturating_add(1),
            ')' | ']' => depth = depth.saturating_sub(1),
            ',' if depth == 0 => {
                parts.push(prelude.get(start..index).unwrap_or_default().trim());
                start = index.saturating_add(1);
            }
            _ => {}
        }
    }
    parts.push(prelude.get(start..).unwrap_or_default().trim());
    parts.retain(|part| !part.is_empty());
    parts
}

/// Classify a selector prelude into selector tokens, state and extra selectors.
///
/// Only the first comma part that is a pure class compound or a single id
/// becomes tokens; every other part is kept verbatim in `selectors_add`.
#[must_use]
pub fn parse_selector_prelude(prelude: &str) -> ParsedSelectors {
    let mut parsed = ParsedSelectors::default();
    let mut extra: Vec<&str> = Vec::new();
    for part in split_selector_list(prelude) {
        if parsed.selectors.is_empty()
            && let Some((selectors, state)) = parse_simple_part(part)
        {
            parsed.selectors = selectors;
            parsed.state = state;
            continue;
        }
        extra.push(part);
    }
    parsed.selectors_add = extra.join(", ");
    parsed
}

/// Convert parsed declarations into a style map, folding `!important` into the value.
#[must_use]
pub fn style_from_declarations(declarations: &[Declaration]) -> StyleMap {
    declarations
        .iter()
        .map(|declaration| {
            let value = if declaration.important {
                format!("{} !important", declaration.value)
            } else {
                declaration.value.clone()
            };
            (declaration.name.clone(), value)
        })
        .collect()
}

/// One CSS rule.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CssRule {
    pub(crate) id: RuleId,
    /// Class/id tokens in insertion order.
    pub selectors: Vec<Selector>,
    /// Extra selectors that are not plain class/id compounds.
    pub selectors_add: String,
    /// State qualifier without the colon.
    pub state: String,
    /// Declarations.
    pub style: StyleMap,
    /// Enclosing at-rule, if any.
    pub at_rule: Option<AtRule>,
    /// True for `@font-face`-like rules whose body is the declaration block.
    pub single_at_rule: bool,
}

impl CssRule {
    /// The rule's identifier.
    #[must_use]
    pub const fn id(&self) -> RuleId {
        self.id
    }

    /// The declaration map.
    #[must_use]
    pub const fn get_style(&self) -> &StyleMap {
        &self.style
    }

    /// Replace the declaration map.
    pub fn set_style(&mut self, style: StyleMap) {
        self.style = style;
    }

    /// Set a single property, keeping its position if it already exists.
    pub fn set_property(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.style.insert(name.into(), value.into());
    }

    /// Selector names (without prefixes) in insertion order.
    pub fn selector_names(&self) -> impl Iterator<Item = &str> {
        self.selectors.iter().map(|selector| selector.name.as_str())
    }

    /// Whether this rule targets exactly the single class `name` at the top level.
    #[must_use]
    pub fn is_class_rule(&self, name: &str) -> bool {
        self.at_rule.is_none()
            && self.state.is_empty()
            && self.selectors_add.is_empty()
            && matches!(self.selectors.as_slice(), [only] if only.kind == SelectorKind::Class && only.name == name)
    }

    /// Whether this rule has the given selectors, state, extra selectors and at-rule.
    #[must_use]
    pub fn matches_scope(&self, parsed: &ParsedSelectors, scope: &RuleScope) -> bool {
        let state = if scope.state.is_empty() {
            parsed.state.as_str()
        } else {
            scope.state.as_str()
        };
        self.selectors.len() == parsed.selectors.len()
            && parsed
                .selectors
                .iter()
                .all(|selector| self.selectors.contains(selector))
            && self.state == state
            && self.selectors_add == parsed.selectors_add
            && self.at_rule == scope.at_rule
            && !self.single_at_rule
    }

    /// Selector text: `.a.b:state` followed by extra selectors, joined by `, `.
    #[must_use]
    pub fn selectors_to_string(&self) -> String {
        let mut parts = Vec::with_capacity(2);
        if !self.selectors.is_empty() {
            let mut compound: String = self.selectors.iter().map(Selector::full_name).collect();
            if !self.state.is_empty() {
                compound.push(':');
                compound.push_str(&self.state);
            }
            parts.push(compound);
        }
        if !self.selectors_add.is_empty() {
            parts.push(self.selectors_add.clone());
        }
        parts.join(", ")
    }

    /// Canonical declaration body: `prop:value;` pairs with no whitespace between them.
    #[must_use]
    pub fn style_to_string(&self) -> String {
        self.style
            .iter()
            .map(|(name, value)| format!("{name}:{value};"))
            .collect()
    }

    /// `selectors{body}`, or just the body for single at-rules.
    ///
    /// Returns `None` when there is nothing to print (empty body or no selector).
    #[must_use]
    pub fn to_css_block(&self) -> Option<String> {
        let body = self.style_to_string();
        if body.is_empty() {
            return None;
        }
        if self.single_at_rule {
            return Some(body);
        }
        let selectors = self.selectors_to_string();
        (!selectors.is_empty()).then(|| format!("{selectors}{{{body}}}"))
    }

    /// The at-rule header (`@media (max-width: 992px)`), empty at the top level.
    #[must_use]
    pub fn at_rule_header(&self) -> String {
        self.at_rule.as_ref().map(ToString::to_string).unwrap_or_default()
    }
}
