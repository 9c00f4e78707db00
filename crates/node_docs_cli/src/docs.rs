//! The `node-docs` command
//!
//! Documents one node repository: a single markdown file by default, a
//! directory of pages with `--layout per-node`, or JSON with
//! `--format json`.

use anyhow::{Context, Result};
use clap::Parser;
use node_etch::{clean_path_arg, EtchBuilder, Layout, NodeOrder, OutputFormat};
use std::io::IsTerminal;
use std::path::PathBuf;

/// Generate documentation for an InvokeAI node repository
#[derive(Debug, Parser)]
#[command(name = "node-docs", version)]
#[command(about = "Generate markdown documentation for a repository of nodes", long_about = None)]
pub struct Cli {
    /// Node repository directory
    pub directory: String,

    /// Output file, or directory for the per-node layout
    /// (default: derived from the repository name)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Output layout: single or per-node
    #[arg(long, default_value = "single")]
    pub layout: Layout,

    /// Output format: markdown or json
    #[arg(long, default_value = "markdown")]
    pub format: OutputFormat,

    /// Node order: title or source
    #[arg(long, default_value = "title")]
    pub order: NodeOrder,

    /// Scan subdirectories too
    #[arg(short, long, default_value_t = false)]
    pub recursive: bool,

    /// Ignore node-docs.yaml / node-docs.md
    #[arg(long, default_value_t = false)]
    pub no_supplement: bool,

    /// Print a summary of the discovered nodes instead of writing files
    #[arg(long, default_value_t = false)]
    pub list: bool,

    /// Only report errors
    #[arg(short, long, default_value_t = false)]
    pub quiet: bool,
}

impl Cli {
    fn builder(&self) -> EtchBuilder {
        let mut builder = EtchBuilder::new(clean_path_arg(&self.directory))
            .layout(self.layout)
            .format(self.format)
            .order(self.order)
            .recursive(self.recursive)
            .supplement(!self.no_supplement);
        if let Some(output) = &self.output {
            builder = builder.output(output);
        }
        builder
    }
}

/// Run the command
pub fn run(cli: &Cli) -> Result<()> {
    let mut etcher = cli.builder().etcher();

    if cli.list {
        etcher
            .extract()
            .with_context(|| format!("failed to read {}", cli.directory))?;
        etcher.print_preview();
    } else {
        let build = etcher
            .run()
            .with_context(|| format!("failed to document {}", cli.directory))?;
        for file in build.all_files() {
            tracing::info!(file = %file.display(), "file written");
        }
        println!("Documentation generated: {}", build.output.display());
    }

    if !cli.quiet {
        etcher
            .diagnostics()
            .print_summary(std::io::stderr().is_terminal());
    }
    Ok(())
}
