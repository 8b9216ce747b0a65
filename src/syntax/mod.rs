//! Go syntax highlighting
//!
//! Parses Go source with tree-sitter and walks the tree to produce colored
//! spans:
//!
//! ```text
//! source text → GoParser::parse → Tree → walk → Span stream
//! ```
//!
//! Spans carry byte offsets; [`SourceMap`] resolves them to line/column.

mod kind;
mod parser;
mod span;
mod walker;

pub use kind::{Keyword, NodeKind, TraversalDefect};
pub use parser::{GoParser, ParseError};
pub use span::{LineCol, Position, ResolvedSpan, SourceMap, Span};
pub use walker::{collect_spans, try_walk, walk};
