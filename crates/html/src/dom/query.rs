//! Structural queries over the component tree.
//!
//! Supports type, class, id, attribute (`[name]`, `[name=value]`) and
//! universal selectors, the four combinators and comma-separated lists.
//! Pseudo-classes are not supported; a compound carrying one never matches.
//! Matching runs right to left from the candidate node.

use super::ComponentTree;
use core::mem::take;
use indextree::NodeId;
use log::debug;

#[derive(Clone, Debug, PartialEq, Eq)]
enum Simple {
    Type(String),
    Class(String),
    Id(String),
    Attribute { name: String, value: Option<String> },
    Universal,
    /// A pseudo-class or pseudo-element.
    Pseudo(String),
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum Combinator {
    Descendant,
    Child,
    AdjacentSibling,
    GeneralSibling,
}

type Compound = Vec<Simple>;

/// Compounds from left to right; the combinator links a compound to the one before it.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
struct Complex {
    parts: Vec<(Combinator, Compound)>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
enum Token {
    Combinator(Combinator),
    Whitespace,
    Simple(Simple),
}

struct Tokenizer<'input> {
    bytes: &'input [u8],
    index: usize,
}

impl<'input> Tokenizer<'input> {
    const fn new(input: &'input str) -> Self {
        Self {
            bytes: input.as_bytes(),
            index: 0,
        }
    }

    fn peek(&self) -> Option<u8> {
        self.bytes.get(self.index).copied()
    }

    fn bump(&mut self) {
        self.index = self.index.saturating_add(1);
    }

    fn skip_spaces(&mut self) -> bool {
        let start = self.index;
        while self.peek().is_some_and(|byte| byte.is_ascii_whitespace()) {
            self.bump();
        }
        self.index != start
    }

    fn ident(&mut self) -> String {
        let start = self.index;
        while self
            .peek()
            .is_some_and(|byte| byte.is_ascii_alphanumeric() || byte == b'-' || byte == b'_')
        {
            self.bump();
        }
        String::from_utf8_lossy(self.bytes.get(start..self.index).unwrap_or_default()).into_owned()
    }

    fn attribute(&mut self) -> Simple {
        self.bump();
        self.skip_spaces();
        let name = self.ident().to_ascii_lowercase();
        self.skip_spaces();
        let mut value = None;
        if self.peek() == Some(b'=') {
            self.bump();
            self.skip_spaces();
            let quote = self.peek().filter(|byte| *byte == b'"' || *byte == b'\'');
            if quote.is_some() {
                self.bump();
            }
            let start = self.index;
            while let Some(byte) = self.peek() {
                let done = quote.map_or(byte == b']' || byte.is_ascii_whitespace(), |close| {
                    byte == close
                });
                if done {
                    break;
                }
                self.bump();
            }
            value = Some(
                String::from_utf8_lossy(self.bytes.get(start..self.index).unwrap_or_default())
                    .into_owned(),
            );
            if quote.is_some() {
                self.bump();
            }
            self.skip_spaces();
        }
        if self.peek() == Some(b']') {
            self.bump();
        }
        Simple::Attribute { name, value }
    }

    /// Read `:name` or `::name`, including a parenthesized argument.
    fn pseudo(&mut self) -> Simple {
        let start = self.index;
        while self.peek() == Some(b':') {
            self.bump();
        }
        self.ident();
        if self.peek() == Some(b'(') {
            let mut depth = 0_usize;
            while let Some(byte) = self.peek() {
                self.bump();
                match byte {
                    b'(' => depth = depth.saturating_add(1),
                    b')' => {
                        depth = depth.saturating_sub(1);
                        if depth == 0 {
                            break;
                        }
                    }
                    _ => {}
                }
            }
        }
        let text =
            String::from_utf8_lossy(self.bytes.get(start..self.index).unwrap_or_default()).into_owned();
        debug!("Unsupported pseudo selector {text}, the compound will not match");
        Simple::Pseudo(text)
    }

    fn next_token(&mut self) -> Option<Token> {
        if self.skip_spaces() && self.peek().is_some() {
            return Some(Token::Whitespace);
        }
        let byte = self.peek()?;
        let token = match byte {
            b'*' => {
                self.bump();
                Token::Simple(Simple::Universal)
            }
            b'.' => {
                self.bump();
                Token::Simple(Simple::Class(self.ident()))
            }
            b'#' => {
                self.bump();
                Token::Simple(Simple::Id(self.ident()))
            }
            b'[' => Token::Simple(self.attribute()),
            b':' => Token::Simple(self.pseudo()),
            b'>' => {
                self.bump();
                Token::Combinator(Combinator::Child)
            }
            b'+' => {
                self.bump();
                Token::Combinator(Combinator::AdjacentSibling)
            }
            b'~' => {
                self.bump();
                Token::Combinator(Combinator::GeneralSibling)
            }
            _ => {
                let ident = self.ident();
                if ident.is_empty() {
                    // Unsupported syntax: skip the byte.
                    self.bump();
                    return self.next_token();
                }
                Token::Simple(Simple::Type(ident.to_ascii_lowercase()))
            }
        };
        Some(token)
    }
}

/// Split on commas outside parentheses and brackets.
fn split_list(input: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0_usize;
    let mut start = 0_usize;
    for (index, ch) in input.char_indices() {
        match ch {
            '(' | '[' => depth = depth.saturating_add(1),
            ')' | ']' => depth = depth.saturating_sub(1),
            ',' if depth == 0 => {
                parts.push(input.get(start..index).unwrap_or_default());
                start = index.saturating_add(1);
            }
            _ => {}
        }
    }
    parts.push(input.get(start..).unwrap_or_default());
    parts
}

fn parse_complex(input: &str) -> Complex {
    let mut tokenizer = Tokenizer::new(input.trim());
    let mut parts: Vec<(Combinator, Compound)> = Vec::new();
    let mut current = Compound::new();
    let mut pending = Combinator::Descendant;
    while let Some(token) = tokenizer.next_token() {
        match token {
            Token::Simple(simple) => current.push(simple),
            Token::Whitespace => {
                if !current.is_empty() {
                    parts.push((pending, take(&mut current)));
                    pending = Combinator::Descendant;
                }
            }
            Token::Combinator(combinator) => {
                if !current.is_empty() {
                    parts.push((pending, take(&mut current)));
                }
                pending = combinator;
            }
        }
    }
    if !current.is_empty() {
        parts.push((pending, current));
    }
    Complex { parts }
}

/// A parsed selector list.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SelectorQuery {
    selectors: Vec<Complex>,
}

impl SelectorQuery {
    /// Parse a comma-separated selector list. Unsupported syntax is skipped.
    #[must_use]
    pub fn parse(input: &str) -> Self {
        Self {
            selectors: split_list(input)
                .into_iter()
                .map(parse_complex)
                .filter(|complex| !complex.parts.is_empty())
                .collect(),
        }
    }

    /// Whether `node` matches any selector of the list.
    #[must_use]
    pub fn matches(&self, tree: &ComponentTree, node: NodeId) -> bool {
        self.selectors
            .iter()
            .any(|complex| matches_parts(tree, node, &complex.parts))
    }
}

fn matches_compound(tree: &ComponentTree, node: NodeId, compound: &Compound) -> bool {
    let Some(component) = tree.get(node) else {
        return false;
    };
    let Some(tag) = component.tag_name() else {
        return false;
    };
    compound.iter().all(|simple| match simple {
        Simple::Type(name) => tag == name.as_str(),
        Simple::Class(name) => component.has_class(name),
        Simple::Id(name) => component.id() == Some(name.as_str()),
        Simple::Attribute { name, value } => {
            let actual = if name == "class" {
                (!component.classes().is_empty()).then(|| component.classes().join(" "))
            } else {
                component.get_attribute(name).map(str::to_owned)
            };
            match (actual, value) {
                (Some(found), Some(expected)) => found == *expected,
                (found, None) => found.is_some(),
                (None, Some(_)) => false,
            }
        }
        Simple::Universal => true,
        Simple::Pseudo(_) => false,
    })
}

fn previous_elements(tree: &ComponentTree, node: NodeId) -> Vec<NodeId> {
    let Some(parent) = tree.parent(node) else {
        return Vec::new();
    };
    let siblings = tree.children(parent);
    let position = siblings
        .iter()
        .position(|sibling| *sibling == node)
        .unwrap_or_default();
    siblings
        .into_iter()
        .take(position)
        .rev()
        .filter(|sibling| tree.get(*sibling).and_then(|found| found.tag_name()).is_some())
        .collect()
}

fn matches_parts(tree: &ComponentTree, node: NodeId, parts: &[(Combinator, Compound)]) -> bool {
    let Some(((combinator, compound), rest)) = parts.split_last() else {
        return true;
    };
    if !matches_compound(tree, node, compound) {
        return false;
    }
    if rest.is_empty() {
        return true;
    }
    match combinator {
        Combinator::Child => tree
            .parent(node)
            .is_some_and(|parent| matches_parts(tree, parent, rest)),
        Combinator::Descendant => {
            let mut cursor = tree.parent(node);
            while let Some(ancestor) = cursor {
                if matches_parts(tree, ancestor, rest) {
                    return true;
                }
                cursor = tree.parent(ancestor);
            }
            false
        }
        Combinator::AdjacentSibling => previous_elements(tree, node)
            .first()
            .is_some_and(|sibling| matches_parts(tree, *sibling, rest)),
        Combinator::GeneralSibling => previous_elements(tree, node)
            .into_iter()
            .any(|sibling| matches_parts(tree, sibling, rest)),
    }
}
