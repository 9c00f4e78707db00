//! Documentation record types
//!
//! A run produces one [`NodeModule`]: the nodes, output definitions and
//! helper functions found in a repository. Records are built once during
//! introspection and only read afterwards.

use serde::Serialize;
use std::path::Path;

/// Source location for a documented item
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize)]
pub struct Location {
    /// Source filename, relative to the repository root
    pub filename: String,
    /// 1-indexed line number
    pub line: usize,
}

impl Location {
    /// Create a new location
    pub fn new(filename: impl Into<String>, line: usize) -> Self {
        Self {
            filename: filename.into(),
            line,
        }
    }

    /// Location of `path` relative to `root`, falling back to the full path
    pub fn in_repository(root: &Path, path: &Path, line: usize) -> Self {
        let relative = path.strip_prefix(root).unwrap_or(path);
        Self::new(relative.to_string_lossy().replace('\\', "/"), line)
    }
}

impl std::fmt::Display for Location {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.filename, self.line)
    }
}

/// One typed input or output slot
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldRecord {
    pub name: String,
    /// Declared type as written; `unknown` when it could not be read
    pub type_label: String,
    /// Rendered default value
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<String>,
    /// `true` iff no default is declared
    pub required: bool,
    /// Empty when the field declares none
    pub description: String,
}

impl FieldRecord {
    /// Create a field; `required` follows from `default`
    pub fn new(
        name: impl Into<String>,
        type_label: impl Into<String>,
        default: Option<String>,
    ) -> Self {
        Self {
            name: name.into(),
            type_label: type_label.into(),
            required: default.is_none(),
            default,
            description: String::new(),
        }
    }

    /// Set the description
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }
}

/// Output produced by a node's `invoke`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OutputRecord {
    /// Output class name, or the call text for outputs built through a
    /// helper (`context.images.save(...)`)
    pub type_name: String,
    pub fields: Vec<FieldRecord>,
}

/// A class decorated with `@invocation_output`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OutputDefinition {
    pub class_name: String,
    /// First argument of the decorator
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_id: Option<String>,
    /// Base class names as written
    #[serde(skip)]
    pub bases: Vec<String>,
    /// Resolved fields, inherited first
    pub fields: Vec<FieldRecord>,
    pub location: Location,
}

/// One node: a class decorated with `@invocation`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NodeRecord {
    /// Invocation id, unique within a run
    pub id: String,
    /// Display name
    pub title: String,
    pub class_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    pub tags: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    /// First docstring line
    pub description: String,
    /// Rest of the docstring
    pub long_description: String,
    pub inputs: Vec<FieldRecord>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<OutputRecord>,
    pub location: Location,
}

impl NodeRecord {
    /// Create a node with no metadata
    pub fn new(id: impl Into<String>, class_name: impl Into<String>) -> Self {
        let id = id.into();
        Self {
            title: id.clone(),
            id,
            class_name: class_name.into(),
            category: None,
            tags: Vec::new(),
            version: None,
            description: String::new(),
            long_description: String::new(),
            inputs: Vec::new(),
            output: None,
            location: Location::default(),
        }
    }

    /// Output fields, empty when the output is unknown
    pub fn output_fields(&self) -> &[FieldRecord] {
        self.output
            .as_ref()
            .map(|o| o.fields.as_slice())
            .unwrap_or_default()
    }
}

/// A top-level function
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FunctionRecord {
    pub name: String,
    /// First docstring line
    pub description: String,
    pub location: Location,
}

/// Everything documented for one repository
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct NodeModule {
    /// Repository directory name
    pub name: String,
    pub nodes: Vec<NodeRecord>,
    pub outputs: Vec<OutputDefinition>,
    pub functions: Vec<FunctionRecord>,
}

impl NodeModule {
    /// Create an empty module
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Find a node by id
    pub fn node(&self, id: &str) -> Option<&NodeRecord> {
        self.nodes.iter().find(|n| n.id == id)
    }

    /// Whether nothing was discovered
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty() && self.outputs.is_empty() && self.functions.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_required_follows_default() {
        assert!(FieldRecord::new("a", "int", None).required);
        assert!(!FieldRecord::new("b", "int", Some("0".into())).required);
    }

    #[test]
    fn test_location_relative_to_root() {
        let loc = Location::in_repository(Path::new("/repo"), Path::new("/repo/nodes/a.py"), 4);
        assert_eq!(loc.to_string(), "nodes/a.py:4");
    }

    #[test]
    fn test_node_defaults() {
        let node = NodeRecord::new("add", "AddInvocation");
        assert_eq!(node.title, "add");
        assert!(node.output_fields().is_empty());
    }
}
