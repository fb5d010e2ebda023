//! In-memory HTML document: tokenizer, arena DOM, selectors, markup serialization and
//! form-control state.

pub mod dom;
pub mod forms;
pub mod selector;

mod entities;
mod serialize;
mod tokenizer;
mod types;

pub use crate::dom::{Document, DomError};
pub use crate::forms::{input_type, select_type};
pub use crate::selector::{SelectorError, SelectorList, parse_selector_list};
pub use crate::tokenizer::tokenize;
pub use crate::types::{Element, Id, NodeData, NodeId, Token};
