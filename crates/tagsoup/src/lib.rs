//! A fast tag-soup HTML parser.
//!
//! The tree mirrors the literal nesting of the input. Nothing is inserted,
//! reordered or repaired, and any syntax fault aborts the parse.
//!
//! ```
//! let dom = tagsoup::parse_document(b"<p class=x>a &amp; b</p>").unwrap();
//! assert_eq!(tagsoup::render(&dom, dom.root()), r#"<p class="x">a &amp; b</p>"#);
//! ```

pub mod arena;
pub mod category;
pub mod dom;
pub mod entities;
pub mod render;
pub mod scanner;
pub mod tag;

mod builder;
mod error;

pub use crate::arena::{BLOCK_SIZE, NodeArena, NodeId};
pub use crate::builder::{
    ParseStats, ParserConfig, parse, parse_document, parse_with_config, parse_with_stats,
};
pub use crate::category::{Category, categorize};
pub use crate::dom::{Attribute, Dom, ElementData, Node, NodeData};
pub use crate::entities::decode_entities;
pub use crate::error::{ByteContext, Eof, ParseError};
pub use crate::render::{render, render_to};
pub use crate::tag::Tag;
