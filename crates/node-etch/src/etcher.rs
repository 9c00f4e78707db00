//! Etcher - documentation generation orchestrator
//!
//! Runs the pipeline once: resolve the target repository, introspect its
//! node definitions, load the supplement, then render and write.

use crate::builder::BuildOutput;
use crate::diagnostics::{DiagnosticsCollector, EtchResult};
use crate::emitter::{Emitter, Layout, OutputFormat};
use crate::introspect::{Introspector, NodeOrder};
use crate::markdown::MarkdownRenderer;
use crate::node::NodeModule;
use crate::resolver::SourceResolver;
use crate::supplement::Supplement;
use std::path::PathBuf;

/// Configuration for the Etcher
#[derive(Debug, Clone)]
pub struct EtchConfig {
    /// Node repository to document
    pub target: PathBuf,
    /// Output file or directory; derived from the repository name when unset
    pub output: Option<PathBuf>,
    /// Single document or one file per node
    pub layout: Layout,
    /// Markdown or JSON
    pub format: OutputFormat,
    /// Node order
    pub order: NodeOrder,
    /// Whether to scan subdirectories
    pub recursive: bool,
    /// Whether to read `node-docs.yaml` / `node-docs.md`
    pub use_supplement: bool,
    /// Whether to show source locations in node sections
    pub include_locations: bool,
}

impl Default for EtchConfig {
    fn default() -> Self {
        Self {
            target: PathBuf::from("."),
            output: None,
            layout: Layout::default(),
            format: OutputFormat::default(),
            order: NodeOrder::default(),
            recursive: false,
            use_supplement: true,
            include_locations: false,
        }
    }
}

impl EtchConfig {
    /// Create a new config for a repository
    pub fn new(target: impl Into<PathBuf>) -> Self {
        Self {
            target: target.into(),
            ..Default::default()
        }
    }

    /// Emitter for the configured layout and format
    pub fn emitter(&self) -> Emitter {
        Emitter::new(self.layout, self.format)
            .with_renderer(MarkdownRenderer::new().with_locations(self.include_locations))
    }
}

/// The main documentation generator
///
/// Etcher coordinates the pipeline:
/// 1. Validate the target and list its Python sources
/// 2. Introspect node, output and function definitions
/// 3. Load the supplement
/// 4. Render and write the documentation
pub struct Etcher {
    /// Configuration
    config: EtchConfig,
    /// Diagnostics collector
    diagnostics: DiagnosticsCollector,
    /// Extracted records
    module: NodeModule,
    /// Loaded supplement
    supplement: Supplement,
}

impl Etcher {
    /// Create a new Etcher with the given configuration
    pub fn new(config: EtchConfig) -> Self {
        Self {
            config,
            diagnostics: DiagnosticsCollector::new(),
            module: NodeModule::default(),
            supplement: Supplement::new(),
        }
    }

    /// Get the configuration
    pub fn config(&self) -> &EtchConfig {
        &self.config
    }

    /// Get the extracted records
    pub fn module(&self) -> &NodeModule {
        &self.module
    }

    /// Get the loaded supplement
    pub fn supplement(&self) -> &Supplement {
        &self.supplement
    }

    /// Get the diagnostics collector
    pub fn diagnostics(&self) -> &DiagnosticsCollector {
        &self.diagnostics
    }

    /// Resolve, introspect and load the supplement without writing
    /// anything.
    ///
    /// Fails only when the target is missing or not a directory.
    pub fn extract(&mut self) -> EtchResult<&NodeModule> {
        let resolver = SourceResolver::new(&self.config.target)?.recursive(self.config.recursive);
        let files = resolver.python_files()?;
        tracing::info!(
            target = %resolver.root().display(),
            files = files.len(),
            "extracting node documentation"
        );

        let mut introspector = Introspector::new(resolver.root()).with_order(self.config.order);
        for file in &files {
            introspector.add_file(file);
        }
        let (module, diagnostics) = introspector.finish(resolver.module_name());
        self.module = module;
        self.diagnostics.extend(diagnostics);

        self.supplement = if self.config.use_supplement {
            Supplement::load(resolver.root(), &mut self.diagnostics)
        } else {
            Supplement::new()
        };

        Ok(&self.module)
    }

    /// Run the documentation generation pipeline
    pub fn run(&mut self) -> EtchResult<BuildOutput> {
        self.extract()?;

        let emitter = self.config.emitter();
        let output = self
            .config
            .output
            .clone()
            .unwrap_or_else(|| emitter.default_output(&self.module.name));

        let files = emitter.emit(
            &self.module,
            &self.supplement,
            &output,
            &mut self.diagnostics,
        )?;
        tracing::info!(output = %output.display(), files = files.len(), "documentation written");

        let mut build = BuildOutput::new(output);
        build.files = files;
        build.node_count = self.module.nodes.len();
        build.warning_count = self.diagnostics.warning_count();
        Ok(build)
    }

    /// Generate a terminal preview of the extracted nodes.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use node_etch::{EtchConfig, Etcher};
    ///
    /// let mut etcher = Etcher::new(EtchConfig::new("my-nodes"));
    /// etcher.extract().unwrap();
    /// println!("{}", etcher.preview_plain());
    /// ```
    pub fn preview_plain(&self) -> String {
        use crate::printer::EtchPrinter;
        EtchPrinter::new(&self.module, false).to_string()
    }

    /// Print a colored preview of the extracted nodes to stdout.
    pub fn print_preview(&self) {
        use crate::printer::EtchPrinter;
        EtchPrinter::new(&self.module, true).print_to_stdout();
    }
}
