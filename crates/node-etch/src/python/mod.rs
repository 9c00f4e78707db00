//! Python front end
//!
//! Source is parsed with tree-sitter and lowered into a small syntax tree
//! covering the slice of Python that node definitions are written in.
//! Helpers render annotations and default values back to text. Nothing is
//! ever evaluated.

pub mod ast;
pub mod lower;
pub mod render;

pub use ast::{ClassDef, Constant, Expr, FunctionDef, Keyword, Module, Stmt};
pub use render::{default_value, type_label};

use std::fmt;

/// Syntax error at a source line
#[derive(Debug, Clone, PartialEq)]
pub struct ParseError {
    /// Line number (1-indexed, 0 when not tied to a line)
    pub line: usize,
    pub message: String,
}

impl ParseError {
    pub fn new(line: usize, message: impl Into<String>) -> Self {
        Self {
            line,
            message: message.into(),
        }
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}: {}", self.line, self.message)
    }
}

impl std::error::Error for ParseError {}

/// A module plus the syntax errors tree-sitter recovered from
#[derive(Debug, Clone, Default)]
pub struct ParsedModule {
    pub module: Module,
    pub errors: Vec<ParseError>,
}

/// Parse Python source.
///
/// Syntax errors never fail the parse: they are listed in
/// [`ParsedModule::errors`] and the statements around them are kept. `Err`
/// means the grammar could not be loaded at all.
pub fn parse(src: &str) -> Result<ParsedModule, ParseError> {
    let normalized = src.replace("\r\n", "\n").replace('\r', "\n");
    let tree = lower::parse_tree(&normalized)?;
    let root = tree.root_node();
    Ok(ParsedModule {
        module: lower::lower_module(root, &normalized),
        errors: lower::syntax_errors(root, &normalized),
    })
}
