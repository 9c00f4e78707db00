//! node-etch: Documentation generator for image-generation node repositories
//!
//! This crate documents a repository of Python node definitions by:
//! - Parsing each source file with tree-sitter and lowering it into a small
//!   Python AST (no interpreter)
//! - Extracting node classes, their input fields and their output types
//! - Merging an optional hand-written supplement (`node-docs.yaml` or
//!   `node-docs.md`)
//! - Writing markdown, as one document or one page per node, or JSON
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────┐    ┌──────────────────┐
//! │ *.py sources    │    │ node-docs.yaml   │
//! │ (python parse)  │    │ node-docs.md     │
//! └────────┬────────┘    └────────┬─────────┘
//!          │                      │
//!          ▼                      ▼
//!   ┌────────────┐         ┌────────────┐
//!   │ NodeModule │         │ Supplement │
//!   └──────┬─────┘         └──────┬─────┘
//!          └──────────┬───────────┘
//!                     ▼
//!          ┌──────────┴──────────┐
//!          ▼                     ▼
//!    ┌──────────┐         ┌──────────┐
//!    │ Markdown │         │   JSON   │
//!    └──────────┘         └──────────┘
//! ```
//!
//! # Usage
//!
//! ```no_run
//! use node_etch::{EtchBuilder, Layout};
//!
//! let output = EtchBuilder::new("my-nodes")
//!     .layout(Layout::PerNode)
//!     .build()
//!     .expect("Failed to generate docs");
//! println!("Documentation generated: {}", output.output.display());
//! ```

// Core types
pub mod node;

// Parsing and introspection
pub mod diagnostics;
pub mod introspect;
pub mod python;
pub mod resolver;
pub mod supplement;

// Output
pub mod emitter;
pub mod markdown;
pub mod printer;
pub mod slug;

// Pipeline
pub mod builder;
pub mod etcher;
pub mod test;

// Re-exports for convenience
pub use diagnostics::{
    Diagnostic, DiagnosticKind, DiagnosticSeverity, DiagnosticsCollector, EtchError, EtchResult,
};
pub use node::{
    FieldRecord, FunctionRecord, Location, NodeModule, NodeRecord, OutputDefinition, OutputRecord,
};

pub use introspect::{Introspector, NodeOrder};
pub use resolver::{clean_path_arg, SourceResolver};
pub use supplement::{InsertionPoint, Supplement, SupplementMetadata, SupplementSection};

pub use emitter::{render_json, Emitter, Layout, OutputFormat};
pub use markdown::{MarkdownRenderer, Page};

// Terminal output
pub use printer::EtchPrinter;

// Builder API
pub use builder::{BuildOutput, EtchBuilder};
pub use etcher::{EtchConfig, Etcher};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");
