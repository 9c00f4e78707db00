//! EtchBuilder - fluent API for documentation generation
//!
//! Wraps [`EtchConfig`] so callers (the `node-docs` CLI, build scripts,
//! tests) can configure a run without naming every field.

use crate::diagnostics::EtchResult;
use crate::emitter::{Layout, OutputFormat};
use crate::etcher::{EtchConfig, Etcher};
use crate::introspect::NodeOrder;
use std::path::PathBuf;

/// Build output describing what was generated
#[derive(Debug)]
pub struct BuildOutput {
    /// Files written, index first for the per-node layout
    pub files: Vec<PathBuf>,
    /// Output file or directory
    pub output: PathBuf,
    /// Number of nodes documented
    pub node_count: usize,
    /// Number of warnings raised during the run
    pub warning_count: usize,
}

impl BuildOutput {
    /// Create a new build output
    pub fn new(output: impl Into<PathBuf>) -> Self {
        Self {
            files: vec![],
            output: output.into(),
            node_count: 0,
            warning_count: 0,
        }
    }

    /// Get all generated files
    pub fn all_files(&self) -> impl Iterator<Item = &PathBuf> {
        self.files.iter()
    }
}

/// Builder for configuring documentation generation
///
/// # Example
///
/// ```no_run
/// use node_etch::{EtchBuilder, Layout};
///
/// EtchBuilder::new("my-nodes")
///     .output("docs/my-nodes")
///     .layout(Layout::PerNode)
///     .build()
///     .expect("Failed to generate docs");
/// ```
#[derive(Debug, Clone)]
pub struct EtchBuilder {
    config: EtchConfig,
}

impl EtchBuilder {
    /// Create a new builder for a node repository
    pub fn new(target: impl Into<PathBuf>) -> Self {
        Self {
            config: EtchConfig::new(target),
        }
    }

    /// Set the output file or directory
    pub fn output(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.output = Some(path.into());
        self
    }

    /// Set the layout
    pub fn layout(mut self, layout: Layout) -> Self {
        self.config.layout = layout;
        self
    }

    /// Set the output format
    pub fn format(mut self, format: OutputFormat) -> Self {
        self.config.format = format;
        self
    }

    /// Set the node order
    pub fn order(mut self, order: NodeOrder) -> Self {
        self.config.order = order;
        self
    }

    /// Scan subdirectories
    pub fn recursive(mut self, recursive: bool) -> Self {
        self.config.recursive = recursive;
        self
    }

    /// Read the supplement files
    pub fn supplement(mut self, enable: bool) -> Self {
        self.config.use_supplement = enable;
        self
    }

    /// Show source locations in node sections
    pub fn include_locations(mut self, include: bool) -> Self {
        self.config.include_locations = include;
        self
    }

    /// Get the configuration
    pub fn config(&self) -> &EtchConfig {
        &self.config
    }

    /// Create the etcher without running it
    pub fn etcher(self) -> Etcher {
        Etcher::new(self.config)
    }

    /// Generate the documentation
    pub fn build(self) -> EtchResult<BuildOutput> {
        self.etcher().run()
    }
}
