//! CSS Syntax Module Level 3: stylesheet parsing.
//! See <https://www.w3.org/TR/css-syntax-3/>
//!
//! Produces a flat list of items in source order: style rules, grouping
//! at-rules (`@media`, `@supports`, ...) with their nested style rules,
//! declaration-bodied at-rules (`@font-face`, `@page`) and block-less
//! statements (`@import`). Any invalid rule or declaration fails the whole
//! parse so callers never observe a partially parsed sheet.
use core::fmt::{Display, Formatter, Result as FmtResult};
use core::error::Error;
use cssparser::AtRuleParser as CssAtRuleParser;
use cssparser::BasicParseErrorKind;
use cssparser::CowRcStr;
use cssparser::DeclarationParser as CssDeclarationParser;
use cssparser::ParseError;
use cssparser::Parser;
use cssparser::ParserInput;
use cssparser::ParserState;
use cssparser::QualifiedRuleParser as CssQualifiedRuleParser;
use cssparser::RuleBodyItemParser as CssRuleBodyItemParser;
use cssparser::RuleBodyParser as CssRuleBodyParser;
use cssparser::StyleSheetParser;
use log::debug;

/// At-rules whose block contains nested rules rather than declarations.
const GROUPING_AT_RULES: &[&str] = &[
    "media",
    "supports",
    "container",
    "layer",
    "document",
    "keyframes",
    "-webkit-keyframes",
];

/// A single CSS declaration (property: value [!important]).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Declaration {
    /// Lowercased property name.
    pub name: String,
    /// Raw value text (without trailing !important).
    pub value: String,
    /// Whether the declaration was marked as `!important`.
    pub important: bool,
}

/// A single style rule with a raw prelude and parsed declarations.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StyleRule {
    /// Raw prelude text (typically the selector list).
    pub prelude: String,
    /// Declarations within the rule block.
    pub declarations: Vec<Declaration>,
}

/// A grouping at-rule such as `@media screen { ... }`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GroupRule {
    /// Lowercased at-rule name without the `@`.
    pub name: String,
    /// Raw prelude text, e.g. the media condition.
    pub prelude: String,
    /// Nested style rules in source order.
    pub rules: Vec<StyleRule>,
}

/// An at-rule whose block holds declarations, e.g. `@font-face`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AtRule {
    /// Lowercased at-rule name without the `@`.
    pub name: String,
    /// Raw prelude text (often empty).
    pub prelude: String,
    /// Declarations within the block.
    pub declarations: Vec<Declaration>,
}

/// One top-level item of a stylesheet.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CssItem {
    /// A qualified style rule.
    Style(StyleRule),
    /// A grouping at-rule with nested rules.
    Group(GroupRule),
    /// A declaration-bodied at-rule.
    AtRule(AtRule),
    /// A block-less at-rule such as `@import url(x);`.
    Statement {
        /// Lowercased at-rule name.
        name: String,
        /// Raw prelude text.
        prelude: String,
    },
}

/// A parsed stylesheet.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Stylesheet {
    /// Top-level items in source order.
    pub items: Vec<CssItem>,
}

/// A parse failure with its source position.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SyntaxError {
    /// 1-based line of the offending token.
    pub line: u32,
    /// 1-based column of the offending token.
    pub column: u32,
    /// Short description of the failure.
    pub message: String,
    /// Source slice the parser skipped while recovering.
    pub snippet: String,
}

impl Display for SyntaxError {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> FmtResult {
        write!(
            formatter,
            "CSS syntax error at {}:{}: {}",
            self.line, self.column, self.message
        )?;
        if !self.snippet.is_empty() {
            write!(formatter, " near `{}`", self.snippet.trim())?;
        }
        Ok(())
    }
}

impl Error for SyntaxError {}

impl SyntaxError {
    fn from_parse_error(error: &ParseError<'_, ()>, snippet: &str) -> Self {
        Self {
            line: error.location.line.saturating_add(1),
            column: error.location.column,
            message: format!("{:?}", error.kind),
            snippet: snippet.to_owned(),
        }
    }
}

/// Parse `!important` at the end of a value, returning (`value_without_important`, `important_flag`).
fn split_important_tail(value: &str) -> (String, bool) {
    let trimmed = value.trim();
    let lower = trimmed.to_ascii_lowercase();
    if let Some(flagged) = lower.strip_suffix("important")
        && let Some(head) = flagged.trim_end().strip_suffix('!')
    {
        let end = head.trim_end().len();
        return (trimmed.get(..end).unwrap_or_default().to_owned(), true);
    }
    (trimmed.to_owned(), false)
}

/// Consume every remaining token of `input` and return the raw, trimmed text.
fn consume_raw<'input>(input: &mut Parser<'input, '_>) -> String {
    let start = input.position();
    while input.next_including_whitespace_and_comments().is_ok() {}
    input.slice_from(start).trim().to_owned()
}

/// A declaration parser that records property name and its raw value.
struct BodyDeclParser;

impl CssDeclarationParser<'_> for BodyDeclParser {
    type Declaration = Declaration;
    type Error = ();

    fn parse_value<'input>(
        &mut self,
        name: CowRcStr<'input>,
        input: &mut Parser<'input, '_>,
        _decl_start: &ParserState,
    ) -> Result<Self::Declaration, ParseError<'input, Self::Error>> {
        let raw = consume_raw(input);
        let (value, important) = split_important_tail(&raw);
        if value.is_empty() {
            return Err(input.new_custom_error(()));
        }
        Ok(Declaration {
            name: name.to_ascii_lowercase(),
            value,
            important,
        })
    }
}

impl CssAtRuleParser<'_> for BodyDeclParser {
    type Prelude = ();
    type AtRule = Declaration; // Not produced
    type Error = ();

    #[inline]
    fn parse_prelude<'input>(
        &mut self,
        _name: CowRcStr<'input>,
        _input: &mut Parser<'input, '_>,
    ) -> Result<Self::Prelude, ParseError<'input, Self::Error>> {
        Ok(())
    }

    #[inline]
    fn parse_block<'input>(
        &mut self,
        _prelude: Self::Prelude,
        _state: &ParserState,
        input: &mut Parser<'input, '_>,
    ) -> Result<Self::AtRule, ParseError<'input, Self::Error>> {
        Err(input.new_error(BasicParseErrorKind::AtRuleBodyInvalid))
    }

    #[inline]
    fn rule_without_block(
        &mut self,
        _prelude: Self::Prelude,
        _state: &ParserState,
    ) -> Result<Self::AtRule, Self::Error> {
        Err(())
    }
}

impl CssQualifiedRuleParser<'_> for BodyDeclParser {
    type Prelude = ();
    type QualifiedRule = Declaration; // Not produced
    type Error = ();

    #[inline]
    fn parse_prelude<'input>(
        &mut self,
        input: &mut Parser<'input, '_>,
    ) -> Result<Self::Prelude, ParseError<'input, Self::Error>> {
        Err(input.new_error(BasicParseErrorKind::QualifiedRuleInvalid))
    }

    #[inline]
    fn parse_block<'input>(
        &mut self,
        _prelude: Self::Prelude,
        _state: &ParserState,
        input: &mut Parser<'input, '_>,
    ) -> Result<Self::QualifiedRule, ParseError<'input, Self::Error>> {
        Err(input.new_error(BasicParseErrorKind::QualifiedRuleInvalid))
    }
}

impl CssRuleBodyItemParser<'_, Declaration, ()> for BodyDeclParser {
    fn parse_declarations(&self) -> bool {
        true
    }
    fn parse_qualified(&self) -> bool {
        false
    }
}

/// Prelude of an at-rule, classified by how its block must be read.
enum AtPrelude {
    /// Block holds nested rules.
    Group { name: String, prelude: String },
    /// Block holds declarations.
    Declarations { name: String, prelude: String },
}

/// Rule-level parser used both at the top level and inside grouping blocks.
///
/// Failures inside nested blocks and declaration lists are collected in
/// `errors` because cssparser only reports the outermost rule as invalid.
#[derive(Default)]
struct TopLevelParser {
    errors: Vec<SyntaxError>,
}

impl CssAtRuleParser<'_> for TopLevelParser {
    type Prelude = AtPrelude;
    type AtRule = CssItem;
    type Error = ();

    #[inline]
    fn parse_prelude<'input>(
        &mut self,
        name: CowRcStr<'input>,
        input: &mut Parser<'input, '_>,
    ) -> Result<Self::Prelude, ParseError<'input, Self::Error>> {
        let lowered = name.to_ascii_lowercase();
        let prelude = consume_raw(input);
        if GROUPING_AT_RULES.contains(&lowered.as_str()) {
            Ok(AtPrelude::Group {
                name: lowered,
                prelude,
            })
        } else {
            Ok(AtPrelude::Declarations {
                name: lowered,
                prelude,
            })
        }
    }

    #[inline]
    fn parse_block<'input>(
        &mut self,
        prelude: Self::Prelude,
        _state: &ParserState,
        input: &mut Parser<'input, '_>,
    ) -> Result<Self::AtRule, ParseError<'input, Self::Error>> {
        match prelude {
            AtPrelude::Group { name, prelude } => {
                let mut rules = Vec::new();
                for item in parse_rule_list(input, &mut self.errors) {
                    match item {
                        CssItem::Style(rule) => rules.push(rule),
                        other => debug!("Dropping nested at-rule inside @{name}: {other:?}"),
                    }
                }
                Ok(CssItem::Group(GroupRule {
                    name,
                    prelude,
                    rules,
                }))
            }
            AtPrelude::Declarations { name, prelude } => {
                let declarations = parse_declarations_from_block(input, &mut self.errors);
                Ok(CssItem::AtRule(AtRule {
                    name,
                    prelude,
                    declarations,
                }))
            }
        }
    }

    #[inline]
    fn rule_without_block(
        &mut self,
        prelude: Self::Prelude,
        _state: &ParserState,
    ) -> Result<Self::AtRule, Self::Error> {
        match prelude {
            AtPrelude::Declarations { name, prelude } => Ok(CssItem::Statement { name, prelude }),
            AtPrelude::Group { .. } => Err(()),
        }
    }
}

impl CssQualifiedRuleParser<'_> for TopLevelParser {
    type Prelude = String; // raw selector/prelude
    type QualifiedRule = CssItem;
    type Error = ();

    #[inline]
    fn parse_prelude<'input>(
        &mut self,
        input: &mut Parser<'input, '_>,
    ) -> Result<Self::Prelude, ParseError<'input, Self::Error>> {
        let prelude = consume_raw(input);
        if prelude.is_empty() {
            return Err(input.new_error(BasicParseErrorKind::QualifiedRuleInvalid));
        }
        Ok(prelude)
    }

    #[inline]
    fn parse_block<'input>(
        &mut self,
        prelude: Self::Prelude,
        _state: &ParserState,
        input: &mut Parser<'input, '_>,
    ) -> Result<Self::QualifiedRule, ParseError<'input, Self::Error>> {
        let declarations = parse_declarations_from_block(input, &mut self.errors);
        Ok(CssItem::Style(StyleRule {
            prelude,
            declarations,
        }))
    }
}

/// Parse a list of rules from `input`, recording failures in `errors`.
fn parse_rule_list(input: &mut Parser, errors: &mut Vec<SyntaxError>) -> Vec<CssItem> {
    let mut nested = TopLevelParser::default();
    let mut out = Vec::new();
    for result in StyleSheetParser::new(input, &mut nested) {
        match result {
            Ok(item) => out.push(item),
            Err((error, snippet)) => errors.push(SyntaxError::from_parse_error(&error, snippet)),
        }
    }
    errors.append(&mut nested.errors);
    out
}

/// Parse declarations from a rule block using `cssparser` body parser.
fn parse_declarations_from_block(
    block: &mut Parser,
    errors: &mut Vec<SyntaxError>,
) -> Vec<Declaration> {
    let mut out: Vec<Declaration> = Vec::new();
    let mut body = BodyDeclParser;
    for result in CssRuleBodyParser::new(block, &mut body) {
        match result {
            Ok(decl) => out.push(decl),
            Err((error, snippet)) => errors.push(SyntaxError::from_parse_error(&error, snippet)),
        }
    }
    out
}

/// Parse a full stylesheet into a `Stylesheet` using cssparser.
///
/// # Errors
/// Returns the first [`SyntaxError`] encountered anywhere in the sheet,
/// including inside nested blocks and declaration lists.
pub fn parse_stylesheet(css: &str) -> Result<Stylesheet, SyntaxError> {
    let mut input = ParserInput::new(css);
    let mut parser = Parser::new(&mut input);
    let mut errors = Vec::new();
    let items = parse_rule_list(&mut parser, &mut errors);
    if let Some(first) = errors.into_iter().next() {
        return Err(first);
    }
    Ok(Stylesheet { items })
}
