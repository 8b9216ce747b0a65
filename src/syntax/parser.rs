//! Go parsing via tree-sitter
//!
//! The grammar is external; this wrapper only turns its output into a
//! `Result`. A tree that contains error or missing nodes counts as a failed
//! parse, so the walker is never asked to color half-understood text.

use std::fmt;

use tree_sitter::{Node, Parser, Tree};

use super::span::{Position, SourceMap};

/// Why a document could not be parsed
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// The grammar could not be loaded into the parser
    Language(String),
    /// The parser gave up without producing a tree
    NoTree,
    /// The source has a syntax error at this (0-indexed) position
    Syntax { line: usize, column: usize },
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseError::Language(e) => write!(f, "failed to load Go grammar: {}", e),
            ParseError::NoTree => write!(f, "parser produced no tree"),
            ParseError::Syntax { line, column } => {
                write!(f, "syntax error at {}:{}", line + 1, column + 1)
            }
        }
    }
}

impl std::error::Error for ParseError {}

/// A tree-sitter parser loaded with the Go grammar
pub struct GoParser {
    parser: Parser,
}

impl GoParser {
    pub fn new() -> Result<Self, ParseError> {
        let mut parser = Parser::new();
        parser
            .set_language(&tree_sitter_go::LANGUAGE.into())
            .map_err(|e| ParseError::Language(e.to_string()))?;
        Ok(Self { parser })
    }

    /// Parse a whole document from scratch
    pub fn parse(&mut self, source: &str) -> Result<Tree, ParseError> {
        let tree = self.parser.parse(source, None).ok_or(ParseError::NoTree)?;

        let root = tree.root_node();
        if root.has_error() {
            let offset = first_error(root).map_or(0, |node| node.start_byte());
            let pos = SourceMap::new(source).line_col(Position(offset));
            tracing::trace!("Syntax error node at byte {}", offset);
            return Err(ParseError::Syntax {
                line: pos.line,
                column: pos.column,
            });
        }

        Ok(tree)
    }
}

/// Depth-first search for the first error or missing node
fn first_error(node: Node<'_>) -> Option<Node<'_>> {
    if node.is_error() || node.is_missing() {
        return Some(node);
    }
    if !node.has_error() {
        return None;
    }
    let mut cursor = node.walk();
    let children: Vec<Node<'_>> = node.children(&mut cursor).collect();
    children.into_iter().find_map(first_error)
}
