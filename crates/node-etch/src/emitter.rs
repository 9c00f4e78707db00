//! Output emission
//!
//! Writes the rendered documentation to disk in the configured layout and
//! format. Existing files are overwritten.

use crate::diagnostics::{DiagnosticKind, DiagnosticsCollector, EtchError, EtchResult};
use crate::markdown::MarkdownRenderer;
use crate::node::NodeModule;
use crate::supplement::{Supplement, SupplementMetadata};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// How markdown output is split into files
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Layout {
    /// One document
    #[default]
    Single,
    /// A directory with `index.md` and one file per node
    PerNode,
}

impl FromStr for Layout {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "single" => Ok(Layout::Single),
            "per-node" | "per_node" | "pernode" => Ok(Layout::PerNode),
            _ => Err(format!("unknown layout '{}'", s)),
        }
    }
}

/// Output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Markdown,
    /// The introspected records as JSON
    Json,
}

impl OutputFormat {
    /// File extension for single-file output
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Markdown => "md",
            OutputFormat::Json => "json",
        }
    }
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "markdown" | "md" => Ok(OutputFormat::Markdown),
            "json" => Ok(OutputFormat::Json),
            _ => Err(format!("unknown output format '{}'", s)),
        }
    }
}

/// JSON document shape
#[derive(Serialize)]
struct JsonDocument<'a> {
    #[serde(flatten)]
    module: &'a NodeModule,
    metadata: &'a SupplementMetadata,
    supplement: Vec<JsonSection<'a>>,
}

#[derive(Serialize)]
struct JsonSection<'a> {
    key: String,
    content: &'a str,
}

/// Writes documentation files
#[derive(Debug, Clone, Default)]
pub struct Emitter {
    pub layout: Layout,
    pub format: OutputFormat,
    pub renderer: MarkdownRenderer,
}

impl Emitter {
    /// Create an emitter for a layout and format
    pub fn new(layout: Layout, format: OutputFormat) -> Self {
        Self {
            layout,
            format,
            renderer: MarkdownRenderer::new(),
        }
    }

    /// Set the markdown renderer
    pub fn with_renderer(mut self, renderer: MarkdownRenderer) -> Self {
        self.renderer = renderer;
        self
    }

    /// Whether output goes to a directory
    pub fn writes_directory(&self) -> bool {
        self.format == OutputFormat::Markdown && self.layout == Layout::PerNode
    }

    /// Default destination for a module, relative to the working directory:
    /// `<name>.md`, `<name>.json`, or the `<name>` directory.
    pub fn default_output(&self, module_name: &str) -> PathBuf {
        if self.writes_directory() {
            PathBuf::from(module_name)
        } else {
            PathBuf::from(format!("{}.{}", module_name, self.format.extension()))
        }
    }

    /// Render and write; returns every file written.
    pub fn emit(
        &self,
        module: &NodeModule,
        supplement: &Supplement,
        output: &Path,
        diagnostics: &mut DiagnosticsCollector,
    ) -> EtchResult<Vec<PathBuf>> {
        match (self.format, self.layout) {
            (OutputFormat::Json, layout) => {
                if layout == Layout::PerNode {
                    diagnostics.info(
                        DiagnosticKind::Introspection,
                        "JSON output is always a single file, layout ignored",
                    );
                }
                let json = render_json(module, supplement)?;
                write_file(output, &json)?;
                Ok(vec![output.to_path_buf()])
            }
            (OutputFormat::Markdown, Layout::Single) => {
                let markdown = self.renderer.render_single(module, supplement, diagnostics);
                write_file(output, &markdown)?;
                Ok(vec![output.to_path_buf()])
            }
            (OutputFormat::Markdown, Layout::PerNode) => {
                let pages = self.renderer.render_per_node(module, supplement, diagnostics);
                fs::create_dir_all(output).map_err(|e| EtchError::write(output, e))?;
                let mut written = Vec::with_capacity(pages.len());
                for page in pages {
                    let path = output.join(&page.file_name);
                    write_file(&path, &page.content)?;
                    written.push(path);
                }
                Ok(written)
            }
        }
    }
}

/// The module and supplement as pretty-printed JSON
pub fn render_json(module: &NodeModule, supplement: &Supplement) -> EtchResult<String> {
    let document = JsonDocument {
        module,
        metadata: &supplement.metadata,
        supplement: supplement
            .sections()
            .iter()
            .map(|s| JsonSection {
                key: s.point.key(),
                content: &s.content,
            })
            .collect(),
    };
    let mut json = serde_json::to_string_pretty(&document)?;
    json.push('\n');
    Ok(json)
}

fn write_file(path: &Path, content: &str) -> EtchResult<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| EtchError::write(path, e))?;
    }
    fs::write(path, content).map_err(|e| EtchError::write(path, e))?;
    tracing::debug!(path = %path.display(), bytes = content.len(), "wrote file");
    Ok(())
}
