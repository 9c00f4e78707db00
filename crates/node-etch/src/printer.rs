//! Terminal summary of discovered nodes
//!
//! Backs `node-docs --list`: one entry per node with its inputs and
//! output, without writing any files.
//!
//! # Example
//!
//! ```
//! use node_etch::printer::EtchPrinter;
//! use node_etch::test::{mock_add_numbers, mock_module};
//!
//! let module = mock_module("math", vec![mock_add_numbers()]);
//! let printer = EtchPrinter::new(&module, false);
//! assert!(printer.to_string().contains("add_numbers"));
//! ```

use crate::node::{FieldRecord, NodeModule, NodeRecord};
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::io;
use termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};

/// Terminal node printer
pub struct EtchPrinter<'a> {
    module: &'a NodeModule,
    use_color: bool,
}

impl<'a> EtchPrinter<'a> {
    /// Create a new printer
    pub fn new(module: &'a NodeModule, use_color: bool) -> Self {
        Self { module, use_color }
    }

    /// Print directly to stdout
    pub fn print_to_stdout(&self) {
        let choice = if self.use_color {
            ColorChoice::Auto
        } else {
            ColorChoice::Never
        };
        let mut stdout = StandardStream::stdout(choice);
        if let Err(e) = self.write_colored(&mut stdout) {
            eprintln!("Error printing node list: {}", e);
        }
    }

    /// Write to any termcolor sink
    pub fn write_colored<W: WriteColor>(&self, w: &mut W) -> io::Result<()> {
        w.set_color(ColorSpec::new().set_bold(true))?;
        write!(w, "{}", self.module.name)?;
        w.reset()?;
        writeln!(w, " ({})\n", self.counts())?;

        for node in &self.module.nodes {
            w.set_color(ColorSpec::new().set_fg(Some(Color::Cyan)).set_bold(true))?;
            write!(w, "{}", node.id)?;
            w.reset()?;
            write!(w, "  {}", node.title)?;
            w.set_color(ColorSpec::new().set_fg(Some(Color::White)).set_dimmed(true))?;
            write!(w, "{}", tail(node))?;
            w.reset()?;
            writeln!(w)?;

            if !node.description.is_empty() {
                writeln!(w, "  {}", node.description)?;
            }
            w.set_color(ColorSpec::new().set_fg(Some(Color::Magenta)))?;
            write!(w, "  inputs:")?;
            w.reset()?;
            writeln!(w, " {}", fields(&node.inputs))?;
            w.set_color(ColorSpec::new().set_fg(Some(Color::Magenta)))?;
            write!(w, "  output:")?;
            w.reset()?;
            writeln!(w, " {}\n", output(node))?;
        }
        Ok(())
    }

    fn counts(&self) -> String {
        format!(
            "{}, {}, {}",
            plural(self.module.nodes.len(), "node"),
            plural(self.module.outputs.len(), "output definition"),
            plural(self.module.functions.len(), "function")
        )
    }

    fn styled(&self, code: &str, s: &str) -> String {
        if self.use_color {
            format!("\x1b[{}m{}\x1b[0m", code, s)
        } else {
            s.to_string()
        }
    }
}

impl Display for EtchPrinter<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        writeln!(f, "{} ({})\n", self.styled("1", &self.module.name), self.counts())?;
        for node in &self.module.nodes {
            writeln!(
                f,
                "{}  {}{}",
                self.styled("1;36", &node.id),
                node.title,
                self.styled("90", &tail(node))
            )?;
            if !node.description.is_empty() {
                writeln!(f, "  {}", node.description)?;
            }
            writeln!(f, "  {} {}", self.styled("35", "inputs:"), fields(&node.inputs))?;
            writeln!(f, "  {} {}\n", self.styled("35", "output:"), output(node))?;
        }
        Ok(())
    }
}

/// Category, version and location after the title
fn tail(node: &NodeRecord) -> String {
    let mut out = String::new();
    if let Some(category) = &node.category {
        out.push_str(&format!("  [{}]", category));
    }
    if let Some(version) = &node.version {
        out.push_str(&format!("  v{}", version));
    }
    out.push_str(&format!("  {}", node.location));
    out
}

fn fields(fields: &[FieldRecord]) -> String {
    if fields.is_empty() {
        return "none".to_string();
    }
    fields
        .iter()
        .map(|f| match &f.default {
            Some(default) => format!("{}: {} = {}", f.name, f.type_label, default),
            None => format!("{}: {}", f.name, f.type_label),
        })
        .collect::<Vec<_>>()
        .join(", ")
}

fn output(node: &NodeRecord) -> String {
    match &node.output {
        Some(output) if output.fields.is_empty() => output.type_name.clone(),
        Some(output) => format!("{} ({})", output.type_name, fields(&output.fields)),
        None => "unknown".to_string(),
    }
}

fn plural(count: usize, noun: &str) -> String {
    if count == 1 {
        format!("1 {}", noun)
    } else {
        format!("{} {}s", count, noun)
    }
}
