//! Hand-written supplement merged into generated documents
//!
//! A repository may carry `node-docs.yaml` (or `.yml`) and/or `node-docs.md`
//! at its root. Both provide sections keyed by an [`InsertionPoint`]; the
//! YAML file additionally carries repository metadata.
//!
//! YAML layout:
//!
//! ```yaml
//! repository_name: Math Nodes
//! author: someone
//! requirements: [numpy]
//! intro: |
//!   Text under "Introduction".
//! outro: Text under "Footnotes".
//! nodes:
//!   add_numbers: Text placed in the add_numbers section.
//! changelog: Any other key becomes a section appended at the end.
//! ```
//!
//! Markdown layout: each `<!-- node-docs: KEY -->` line opens a section
//! that runs until the next marker.

use crate::diagnostics::{Diagnostic, DiagnosticKind, DiagnosticsCollector};
use lazy_static::lazy_static;
use regex::Regex;
use serde::Serialize;
use serde_yaml::Value;
use std::fmt;
use std::path::{Path, PathBuf};

/// YAML supplement file names, in lookup order
pub const YAML_FILES: &[&str] = &["node-docs.yaml", "node-docs.yml"];
/// Markdown supplement file name
pub const MARKDOWN_FILE: &str = "node-docs.md";

const METADATA_KEYS: &[&str] = &[
    "repository_name",
    "author",
    "license",
    "requirements",
    "description",
    "keywords",
];

lazy_static! {
    /// `<!-- node-docs: KEY -->` section marker
    static ref MARKER_REGEX: Regex =
        Regex::new(r"^\s*<!--\s*node-docs:\s*(\S+?)\s*-->\s*$").unwrap();
}

/// Where a section goes in the generated document
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum InsertionPoint {
    /// Under "Introduction"
    Intro,
    /// Under "Footnotes"
    Outro,
    /// Inside the section of the node with this id
    Node(String),
    /// No slot in the template
    Custom(String),
}

impl InsertionPoint {
    /// Parse a section key (`intro`, `outro`, `node:<id>`, anything else)
    pub fn parse(key: &str) -> Self {
        let key = key.trim();
        match key.to_lowercase().as_str() {
            "intro" => InsertionPoint::Intro,
            "outro" => InsertionPoint::Outro,
            _ => match key.strip_prefix("node:") {
                Some(id) if !id.trim().is_empty() => InsertionPoint::Node(id.trim().to_string()),
                _ => InsertionPoint::Custom(key.to_string()),
            },
        }
    }

    /// Key as written in a supplement file
    pub fn key(&self) -> String {
        match self {
            InsertionPoint::Intro => "intro".to_string(),
            InsertionPoint::Outro => "outro".to_string(),
            InsertionPoint::Node(id) => format!("node:{}", id),
            InsertionPoint::Custom(key) => key.clone(),
        }
    }
}

impl fmt::Display for InsertionPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.key())
    }
}

/// A hand-written markdown fragment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SupplementSection {
    pub point: InsertionPoint,
    pub content: String,
}

impl SupplementSection {
    pub fn new(point: InsertionPoint, content: impl Into<String>) -> Self {
        Self {
            point,
            content: content.into(),
        }
    }
}

/// Repository metadata shown under the document heading
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SupplementMetadata {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub repository_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub license: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub requirements: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub keywords: Vec<String>,
}

impl SupplementMetadata {
    /// Whether no metadata is set
    pub fn is_empty(&self) -> bool {
        *self == SupplementMetadata::default()
    }
}

/// Everything read from the supplement files
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Supplement {
    pub metadata: SupplementMetadata,
    sections: Vec<SupplementSection>,
    /// Files the supplement was read from
    pub files: Vec<PathBuf>,
}

impl Supplement {
    /// Create an empty supplement
    pub fn new() -> Self {
        Self::default()
    }

    /// Load the supplement files at `root`. Missing files are not an
    /// error; unreadable or malformed ones are reported and ignored.
    pub fn load(root: &Path, diagnostics: &mut DiagnosticsCollector) -> Self {
        let mut supplement = Supplement::new();

        if let Some(path) = YAML_FILES
            .iter()
            .map(|name| root.join(name))
            .find(|path| path.is_file())
        {
            if let Some(content) = read(&path, diagnostics) {
                let file = display_name(root, &path);
                if supplement.merge_yaml(&content, &file, diagnostics) {
                    supplement.files.push(path);
                }
            }
        }

        let markdown = root.join(MARKDOWN_FILE);
        if markdown.is_file() {
            if let Some(content) = read(&markdown, diagnostics) {
                let file = display_name(root, &markdown);
                supplement.merge_markdown(&content, &file, diagnostics);
                supplement.files.push(markdown);
            }
        }

        if !supplement.files.is_empty() {
            tracing::debug!(
                sections = supplement.sections.len(),
                "loaded supplement from {} file(s)",
                supplement.files.len()
            );
        }
        supplement
    }

    /// Sections in file order
    pub fn sections(&self) -> &[SupplementSection] {
        &self.sections
    }

    /// Section for an insertion point
    pub fn section(&self, point: &InsertionPoint) -> Option<&SupplementSection> {
        self.sections.iter().find(|s| &s.point == point)
    }

    /// Whether there is nothing to merge
    pub fn is_empty(&self) -> bool {
        self.sections.is_empty() && self.metadata.is_empty()
    }

    /// Add a section, replacing one with the same insertion point.
    /// Returns `true` when a section was replaced.
    pub fn insert(&mut self, section: SupplementSection) -> bool {
        match self.sections.iter_mut().find(|s| s.point == section.point) {
            Some(existing) => {
                *existing = section;
                true
            }
            None => {
                self.sections.push(section);
                false
            }
        }
    }

    /// Merge a YAML supplement. Returns `false` when the document could not
    /// be used.
    pub fn merge_yaml(
        &mut self,
        content: &str,
        file: &str,
        diagnostics: &mut DiagnosticsCollector,
    ) -> bool {
        if content.trim().is_empty() {
            return true;
        }

        let value: Value = match serde_yaml::from_str(content) {
            Ok(value) => value,
            Err(e) => {
                diagnostics.add(
                    Diagnostic::warning(
                        DiagnosticKind::Supplement,
                        format!("invalid YAML, supplement ignored: {}", e),
                    )
                    .in_file(file),
                );
                return false;
            }
        };

        let mapping = match value {
            Value::Mapping(mapping) => mapping,
            Value::Null => return true,
            _ => {
                diagnostics.add(
                    Diagnostic::warning(
                        DiagnosticKind::Supplement,
                        "expected a mapping at the top level, supplement ignored",
                    )
                    .in_file(file),
                );
                return false;
            }
        };

        for (key, value) in &mapping {
            let Some(key) = scalar(key) else {
                diagnostics.add(
                    Diagnostic::warning(DiagnosticKind::Supplement, "ignoring non-scalar key")
                        .in_file(file),
                );
                continue;
            };

            if METADATA_KEYS.contains(&key.as_str()) {
                self.set_metadata(&key, value, file, diagnostics);
                continue;
            }

            if key == "nodes" {
                let Value::Mapping(nodes) = value else {
                    diagnostics.add(
                        Diagnostic::warning(
                            DiagnosticKind::Supplement,
                            "`nodes` must map node ids to markdown",
                        )
                        .in_file(file),
                    );
                    continue;
                };
                for (id, text) in nodes {
                    match (scalar(id), scalar(text)) {
                        (Some(id), Some(text)) => {
                            self.insert(SupplementSection::new(
                                InsertionPoint::Node(id),
                                text.trim_end(),
                            ));
                        }
                        _ => diagnostics.add(
                            Diagnostic::warning(
                                DiagnosticKind::Supplement,
                                "ignoring non-text entry under `nodes`",
                            )
                            .in_file(file),
                        ),
                    }
                }
                continue;
            }

            match scalar(value) {
                Some(text) => {
                    self.insert(SupplementSection::new(
                        InsertionPoint::parse(&key),
                        text.trim_end(),
                    ));
                }
                None => diagnostics.add(
                    Diagnostic::warning(
                        DiagnosticKind::Supplement,
                        format!("section `{}` is not text, ignored", key),
                    )
                    .in_file(file),
                ),
            }
        }
        true
    }

    /// Merge a marker-delimited markdown supplement. Its sections replace
    /// same-keyed ones from YAML; a marker repeated within the file appends
    /// to the earlier section.
    pub fn merge_markdown(
        &mut self,
        content: &str,
        file: &str,
        diagnostics: &mut DiagnosticsCollector,
    ) {
        let mut current: Option<(InsertionPoint, usize, Vec<&str>)> = None;
        let mut preamble = false;
        let mut seen: Vec<String> = Vec::new();

        let lines = content.lines().enumerate().map(|(i, line)| (i + 1, line));
        for (number, line) in lines {
            if let Some(captures) = MARKER_REGEX.captures(line) {
                if let Some(section) = current.take() {
                    self.insert_markdown(section, &mut seen, file, diagnostics);
                }
                current = Some((InsertionPoint::parse(&captures[1]), number, Vec::new()));
                continue;
            }
            match current.as_mut() {
                Some((_, _, body)) => body.push(line),
                None => preamble |= !line.trim().is_empty(),
            }
        }
        if let Some(section) = current.take() {
            self.insert_markdown(section, &mut seen, file, diagnostics);
        }

        if preamble {
            diagnostics.add(
                Diagnostic::warning(
                    DiagnosticKind::Supplement,
                    "text before the first `<!-- node-docs: KEY -->` marker is ignored",
                )
                .in_file(file),
            );
        }
    }

    fn insert_markdown(
        &mut self,
        (point, line, body): (InsertionPoint, usize, Vec<&str>),
        seen: &mut Vec<String>,
        file: &str,
        diagnostics: &mut DiagnosticsCollector,
    ) {
        let start = body.iter().position(|l| !l.trim().is_empty());
        let end = body.iter().rposition(|l| !l.trim().is_empty());
        let content = match (start, end) {
            (Some(start), Some(end)) => body[start..=end].join("\n"),
            _ => String::new(),
        };

        let key = point.key();
        if seen.contains(&key) {
            if let Some(existing) = self.sections.iter_mut().find(|s| s.point == point) {
                match (existing.content.is_empty(), content.is_empty()) {
                    (_, true) => {}
                    (true, false) => existing.content = content,
                    (false, false) => {
                        existing.content.push_str("\n\n");
                        existing.content.push_str(&content);
                    }
                }
            }
            diagnostics.add(
                Diagnostic::warning(
                    DiagnosticKind::Supplement,
                    format!(
                        "duplicate marker `{}`, content appended to the earlier section",
                        key
                    ),
                )
                .in_file(file)
                .at_line(line),
            );
            return;
        }
        seen.push(key.clone());

        if self.insert(SupplementSection::new(point, content)) {
            diagnostics.add(
                Diagnostic::warning(
                    DiagnosticKind::Supplement,
                    format!("section `{}` overrides the one from the YAML file", key),
                )
                .in_file(file)
                .at_line(line),
            );
        }
    }

    fn set_metadata(
        &mut self,
        key: &str,
        value: &Value,
        file: &str,
        diagnostics: &mut DiagnosticsCollector,
    ) {
        let metadata = &mut self.metadata;
        match key {
            "requirements" | "keywords" => {
                let items: Vec<String> = match value {
                    Value::Sequence(items) => items.iter().filter_map(scalar).collect(),
                    Value::Null => Vec::new(),
                    other => scalar(other)
                        .map(|s| {
                            s.split([',', '\n'])
                                .map(str::trim)
                                .filter(|s| !s.is_empty())
                                .map(str::to_owned)
                                .collect()
                        })
                        .unwrap_or_default(),
                };
                if key == "requirements" {
                    metadata.requirements = items;
                } else {
                    metadata.keywords = items;
                }
            }
            _ => {
                let text = match value {
                    Value::Null => None,
                    other => match scalar(other) {
                        Some(text) => Some(text.trim().to_string()).filter(|t| !t.is_empty()),
                        None => {
                            diagnostics.add(
                                Diagnostic::warning(
                                    DiagnosticKind::Supplement,
                                    format!("`{}` must be text, ignored", key),
                                )
                                .in_file(file),
                            );
                            None
                        }
                    },
                };
                match key {
                    "repository_name" => metadata.repository_name = text,
                    "author" => metadata.author = text,
                    "license" => metadata.license = text,
                    _ => metadata.description = text,
                }
            }
        }
    }
}

fn read(path: &Path, diagnostics: &mut DiagnosticsCollector) -> Option<String> {
    match std::fs::read_to_string(path) {
        Ok(content) => Some(content),
        Err(e) => {
            diagnostics.add(
                Diagnostic::warning(DiagnosticKind::Supplement, format!("could not read: {}", e))
                    .in_file(path),
            );
            None
        }
    }
}

fn display_name(root: &Path, path: &Path) -> String {
    path.strip_prefix(root)
        .unwrap_or(path)
        .to_string_lossy()
        .into_owned()
}

/// Text of a scalar YAML value
fn scalar(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}
