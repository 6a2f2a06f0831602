//! Component tree model of the editor and the markup import pipeline.

pub mod dom;
pub mod parser;

pub use dom::{
    Component, ComponentDefinition, ComponentKind, ComponentTree, SelectorQuery, TreeError,
};
pub use indextree::NodeId;
pub use parser::{ImportSource, ParsedMarkup, parse_document_handle, parse_markup};
