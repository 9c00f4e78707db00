//! Markdown rendering
//!
//! Renders a [`NodeModule`] with the fixed node-docs template and splices
//! supplement sections in at their insertion points. Supplement sections
//! that have no slot are appended at the end and reported.

use crate::diagnostics::{Diagnostic, DiagnosticKind, DiagnosticsCollector};
use crate::node::{FieldRecord, NodeModule, NodeRecord};
use crate::slug::{unique_slug, Anchors};
use crate::supplement::{InsertionPoint, Supplement, SupplementSection};
use std::collections::HashSet;

/// Placeholder for an absent default
pub const NO_DEFAULT: &str = "—";

/// A rendered file, relative to the output location
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page {
    /// File name (`index.md`, `add-numbers.md`)
    pub file_name: String,
    pub content: String,
}

/// Markdown renderer for node documentation
#[derive(Debug, Clone, Default)]
pub struct MarkdownRenderer {
    /// Whether to include source locations in node sections
    pub include_locations: bool,
}

impl MarkdownRenderer {
    /// Create a new markdown renderer
    pub fn new() -> Self {
        Self::default()
    }

    /// Set whether to include source locations
    pub fn with_locations(mut self, include: bool) -> Self {
        self.include_locations = include;
        self
    }

    /// Render the whole module as one document
    pub fn render_single(
        &self,
        module: &NodeModule,
        supplement: &Supplement,
        diagnostics: &mut DiagnosticsCollector,
    ) -> String {
        let mut splice = Splice::new(supplement, module);
        let anchors = plan_anchors(module, splice.has(&InsertionPoint::Intro));
        let links: Vec<String> = anchors.iter().map(|a| format!("#{}", a)).collect();

        let mut doc = Document::new();
        self.render_head(&mut doc, module, &mut splice);
        render_overview(&mut doc, module, &links);

        if !module.nodes.is_empty() {
            doc.push("## Nodes");
            for node in &module.nodes {
                self.render_node(&mut doc, node, 3, &mut splice);
                doc.push("---");
            }
        }

        render_tail(&mut doc, &mut splice, diagnostics);
        doc.finish()
    }

    /// Render an index page plus one page per node
    pub fn render_per_node(
        &self,
        module: &NodeModule,
        supplement: &Supplement,
        diagnostics: &mut DiagnosticsCollector,
    ) -> Vec<Page> {
        let mut splice = Splice::new(supplement, module);

        let mut used = vec!["index".to_string()];
        let file_names: Vec<String> = module
            .nodes
            .iter()
            .map(|node| {
                let name = unique_slug(&node.id, &used);
                used.push(name.clone());
                format!("{}.md", name)
            })
            .collect();

        let mut pages = Vec::with_capacity(module.nodes.len() + 1);
        for (node, file_name) in module.nodes.iter().zip(&file_names) {
            let mut doc = Document::new();
            doc.push(format!("# {}", node.title));
            self.render_node_body(&mut doc, node, 2, &mut splice);
            doc.push(format!("[Back to {}](index.md)", module.name));
            pages.push(Page {
                file_name: file_name.clone(),
                content: doc.finish(),
            });
        }

        let mut index = Document::new();
        self.render_head(&mut index, module, &mut splice);
        render_overview(&mut index, module, &file_names);
        render_tail(&mut index, &mut splice, diagnostics);
        pages.insert(
            0,
            Page {
                file_name: "index.md".to_string(),
                content: index.finish(),
            },
        );
        pages
    }

    /// Heading, metadata and introduction
    fn render_head(&self, doc: &mut Document, module: &NodeModule, splice: &mut Splice<'_>) {
        doc.push(format!("# {}", module.name));

        let meta = &splice.supplement.metadata;
        if let Some(name) = &meta.repository_name {
            doc.push(format!("**Repository Name:** {}", name));
        }
        if let Some(author) = &meta.author {
            doc.push(format!("**Author:** {}", author));
        }
        if let Some(license) = &meta.license {
            doc.push(format!("**License:** {}", license));
        }
        if !meta.requirements.is_empty() {
            doc.push("**Requirements:**");
            doc.push(bullet_list(&meta.requirements));
        }
        if !meta.keywords.is_empty() {
            doc.push(format!("**Keywords:** {}", meta.keywords.join(", ")));
        }
        if let Some(description) = &meta.description {
            doc.push(description.clone());
        }

        if let Some(intro) = splice.take(&InsertionPoint::Intro) {
            doc.push("## Introduction");
            doc.push_content(intro);
        }
    }

    /// One node section, headed at `level`
    fn render_node(
        &self,
        doc: &mut Document,
        node: &NodeRecord,
        level: usize,
        splice: &mut Splice<'_>,
    ) {
        doc.push(format!("{} {}", "#".repeat(level), node.title));
        self.render_node_body(doc, node, level + 1, splice);
    }

    /// Node metadata, inputs and output; sub-headings at `level`
    fn render_node_body(
        &self,
        doc: &mut Document,
        node: &NodeRecord,
        level: usize,
        splice: &mut Splice<'_>,
    ) {
        doc.push(format!("**ID:** {}", code(&node.id)));
        doc.push(format!(
            "**Category:** {}",
            node.category.as_deref().unwrap_or(NO_DEFAULT)
        ));
        if !node.tags.is_empty() {
            doc.push(format!("**Tags:** {}", node.tags.join(", ")));
        }
        if let Some(version) = &node.version {
            doc.push(format!("**Version:** {}", version));
        }
        if self.include_locations {
            doc.push(format!("**Source:** {}", code(&node.location.to_string())));
        }
        doc.push(format!("**Description:** {}", node.description).trim_end().to_string());
        if !node.long_description.is_empty() {
            doc.push(node.long_description.clone());
        }
        if let Some(extra) = splice.take(&InsertionPoint::Node(node.id.clone())) {
            doc.push_content(extra);
        }

        let heading = "#".repeat(level);

        if !node.inputs.is_empty() {
            doc.push(details_open(&heading, "Inputs"));
            doc.push(inputs_table(&node.inputs));
            doc.push("</details>");
        }

        doc.push(details_open(&heading, "Output"));
        match &node.output {
            Some(output) => {
                doc.push(format!("**Type:** {}", code(&output.type_name)));
                if !output.fields.is_empty() {
                    doc.push(outputs_table(&output.fields));
                }
            }
            None => doc.push("No output information available."),
        }
        doc.push("</details>");
    }
}

/// Blocks separated by blank lines
struct Document {
    blocks: Vec<String>,
}

impl Document {
    fn new() -> Self {
        Self { blocks: Vec::new() }
    }

    fn push(&mut self, block: impl Into<String>) {
        self.blocks.push(block.into());
    }

    /// Supplement text, verbatim apart from surrounding blank lines
    fn push_content(&mut self, content: &str) {
        let trimmed = content.trim_matches(|c| c == '\n' || c == '\r').trim_end();
        if !trimmed.is_empty() {
            self.blocks.push(trimmed.to_string());
        }
    }

    fn finish(self) -> String {
        let mut out = self.blocks.join("\n\n");
        out.push('\n');
        out
    }
}

/// Supplement sections not yet placed
struct Splice<'a> {
    supplement: &'a Supplement,
    node_ids: HashSet<&'a str>,
    used: HashSet<InsertionPoint>,
}

impl<'a> Splice<'a> {
    fn new(supplement: &'a Supplement, module: &'a NodeModule) -> Self {
        Self {
            supplement,
            node_ids: module.nodes.iter().map(|n| n.id.as_str()).collect(),
            used: HashSet::new(),
        }
    }

    fn has(&self, point: &InsertionPoint) -> bool {
        self.supplement.section(point).is_some()
    }

    /// Content for `point`, marking it placed
    fn take(&mut self, point: &InsertionPoint) -> Option<&'a str> {
        let section = self.supplement.section(point)?;
        self.used.insert(point.clone());
        Some(section.content.as_str())
    }

    /// Sections with no slot, in file order
    fn unmatched(&self) -> Vec<&'a SupplementSection> {
        self.supplement
            .sections()
            .iter()
            .filter(|s| !self.used.contains(&s.point))
            .filter(|s| match &s.point {
                InsertionPoint::Node(id) => !self.node_ids.contains(id.as_str()),
                _ => true,
            })
            .collect()
    }
}

/// Heading ids of each node section, computed in document order
fn plan_anchors(module: &NodeModule, has_intro: bool) -> Vec<String> {
    let mut anchors = Anchors::new();
    anchors.anchor(&module.name);
    if has_intro {
        anchors.anchor("Introduction");
    }
    anchors.anchor("Overview");
    if !module.nodes.is_empty() {
        anchors.anchor("Nodes");
    }
    if !module.functions.is_empty() {
        anchors.anchor("Functions");
    }
    if !module.outputs.is_empty() {
        anchors.anchor("Output Definitions");
    }
    if !module.nodes.is_empty() {
        anchors.anchor("Nodes");
    }

    module
        .nodes
        .iter()
        .map(|node| {
            let anchor = anchors.anchor(&node.title);
            if !node.inputs.is_empty() {
                anchors.anchor("Inputs");
            }
            anchors.anchor("Output");
            anchor
        })
        .collect()
}

/// Overview with node links (one per node, in order), functions and
/// output definitions
fn render_overview(doc: &mut Document, module: &NodeModule, links: &[String]) {
    doc.push("## Overview");

    if !module.nodes.is_empty() {
        doc.push("### Nodes");
        let items: Vec<String> = module
            .nodes
            .iter()
            .zip(links)
            .map(|(node, link)| {
                let item = format!("- [{}]({})", link_text(&node.title), link);
                if node.description.is_empty() {
                    item
                } else {
                    format!("{} - {}", item, node.description)
                }
            })
            .collect();
        doc.push(items.join("\n"));
    }

    if !module.functions.is_empty() {
        doc.push(details_open("###", "Functions"));
        let items: Vec<String> = module
            .functions
            .iter()
            .map(|f| {
                if f.description.is_empty() {
                    format!("- {}", code(&f.name))
                } else {
                    format!("- {} - {}", code(&f.name), f.description)
                }
            })
            .collect();
        doc.push(items.join("\n"));
        doc.push("</details>");
    }

    if !module.outputs.is_empty() {
        doc.push(details_open("###", "Output Definitions"));
        let items: Vec<String> = module
            .outputs
            .iter()
            .map(|o| {
                format!(
                    "- {} - Output definition with {} field{}",
                    code(&o.class_name),
                    o.fields.len(),
                    if o.fields.len() == 1 { "" } else { "s" }
                )
            })
            .collect();
        doc.push(items.join("\n"));
        doc.push("</details>");
    }
}

/// Footnotes, then every supplement section that found no slot
fn render_tail(
    doc: &mut Document,
    splice: &mut Splice<'_>,
    diagnostics: &mut DiagnosticsCollector,
) {
    if let Some(outro) = splice.take(&InsertionPoint::Outro) {
        doc.push("## Footnotes");
        doc.push_content(outro);
    }

    for section in splice.unmatched() {
        let message = match &section.point {
            InsertionPoint::Node(id) => format!(
                "supplement section `{}` names unknown node `{}`, appended at the end",
                section.point, id
            ),
            _ => format!(
                "supplement section `{}` has no place in the template, appended at the end",
                section.point
            ),
        };
        diagnostics.add(Diagnostic::warning(DiagnosticKind::SupplementMismatch, message));
        doc.push(format!("## {}", section.point));
        doc.push_content(&section.content);
    }
}

fn details_open(heading: &str, title: &str) -> String {
    format!("<details>\n<summary>\n\n{} {}\n\n</summary>", heading, title)
}

fn bullet_list(items: &[String]) -> String {
    items
        .iter()
        .map(|item| format!("- {}", item))
        .collect::<Vec<_>>()
        .join("\n")
}

fn inputs_table(fields: &[FieldRecord]) -> String {
    let mut rows = vec![
        "| Name | Type | Default | Required | Description |".to_string(),
        "| ---- | ---- | ------- | -------- | ----------- |".to_string(),
    ];
    for field in fields {
        let default = match &field.default {
            Some(default) => code_cell(default),
            None => NO_DEFAULT.to_string(),
        };
        rows.push(row(&[
            code_cell(&field.name),
            code_cell(&field.type_label),
            default,
            if field.required { "required" } else { "optional" }.to_string(),
            cell(&field.description),
        ]));
    }
    rows.join("\n")
}

fn outputs_table(fields: &[FieldRecord]) -> String {
    let mut rows = vec![
        "| Name | Type | Description |".to_string(),
        "| ---- | ---- | ----------- |".to_string(),
    ];
    for field in fields {
        rows.push(row(&[
            code_cell(&field.name),
            code_cell(&field.type_label),
            cell(&field.description),
        ]));
    }
    rows.join("\n")
}

fn row(cells: &[String]) -> String {
    let mut line = String::from("|");
    for c in cells {
        line.push(' ');
        line.push_str(c);
        line.push_str(" |");
    }
    line
}

/// Table cell text: newlines folded to spaces, pipes escaped
pub fn cell(text: &str) -> String {
    text.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .replace('|', "\\|")
}

/// Inline code inside a table cell
fn code_cell(text: &str) -> String {
    let text = cell(text);
    if text.is_empty() {
        return text;
    }
    code(&text)
}

/// Inline code span, widening the fence when the text holds backticks
pub fn code(text: &str) -> String {
    if text.contains('`') {
        format!("`` {} ``", text)
    } else {
        format!("`{}`", text)
    }
}

/// Escape brackets in link text
fn link_text(text: &str) -> String {
    text.replace('[', "\\[").replace(']', "\\]")
}
