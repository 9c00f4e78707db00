//! Node introspection
//!
//! Reads parsed Python sources and extracts [`NodeRecord`]s from classes
//! decorated with `@invocation(...)`, [`OutputDefinition`]s from classes
//! decorated with `@invocation_output(...)` and [`FunctionRecord`]s from
//! top-level functions.
//!
//! Introspection is best-effort: anything that cannot be read is reported
//! through the [`DiagnosticsCollector`] and replaced by a placeholder, never
//! turned into an error.

use crate::diagnostics::{Diagnostic, DiagnosticKind, DiagnosticsCollector};
use crate::node::{
    FieldRecord, FunctionRecord, Location, NodeModule, NodeRecord, OutputDefinition, OutputRecord,
};
use crate::python::ast::{self, ClassDef, Constant, Expr, Module, Stmt};
use crate::python::{default_value, type_label};
use indexmap::IndexMap;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Decorator marking a node class
const INVOCATION_DECORATOR: &str = "invocation";
/// Decorator marking an output class
const OUTPUT_DECORATOR: &str = "invocation_output";
/// Calls whose keywords describe a field
const FIELD_CONSTRUCTORS: &[&str] = &["InputField", "OutputField", "Field"];
/// Type label used when an annotation cannot be read
pub const UNKNOWN_TYPE: &str = "unknown";

/// Order of nodes in the generated documents
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NodeOrder {
    /// Case-insensitive by title, ties broken by id
    #[default]
    Title,
    /// File order, then definition order within a file
    Source,
}

impl FromStr for NodeOrder {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "title" => Ok(NodeOrder::Title),
            "source" => Ok(NodeOrder::Source),
            _ => Err(format!("unknown node order '{}'", s)),
        }
    }
}

/// A parsed source file waiting for extraction
struct SourceFile {
    /// Path relative to the repository root
    relative: PathBuf,
    module: Module,
}

/// Extracts documentation records from Python sources
pub struct Introspector {
    root: PathBuf,
    order: NodeOrder,
    sources: Vec<SourceFile>,
    diagnostics: DiagnosticsCollector,
}

impl Introspector {
    /// Create an introspector for the repository at `root`
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            order: NodeOrder::default(),
            sources: Vec::new(),
            diagnostics: DiagnosticsCollector::new(),
        }
    }

    /// Set the node order
    pub fn with_order(mut self, order: NodeOrder) -> Self {
        self.order = order;
        self
    }

    /// Read and parse a file. Unreadable or non-UTF-8 files are
    /// reported and contribute nothing.
    pub fn add_file(&mut self, path: &Path) {
        let relative = self.relative(path);
        match std::fs::read(path) {
            Ok(bytes) => match String::from_utf8(bytes) {
                Ok(src) => self.add_source(path, &src),
                Err(_) => self.diagnostics.add(
                    Diagnostic::warning(DiagnosticKind::Introspection, "file is not valid UTF-8")
                        .in_file(relative),
                ),
            },
            Err(e) => self.diagnostics.add(
                Diagnostic::warning(
                    DiagnosticKind::Introspection,
                    format!("could not read file: {}", e),
                )
                .in_file(relative),
            ),
        }
    }

    /// Parse in-memory source as if it were read from `path`
    pub fn add_source(&mut self, path: &Path, src: &str) {
        let relative = self.relative(path);
        tracing::debug!(file = %relative.display(), "introspecting");

        match crate::python::parse(src) {
            Ok(parsed) => {
                for err in parsed.errors {
                    self.diagnostics.add(
                        Diagnostic::warning(
                            DiagnosticKind::Introspection,
                            format!("syntax error, statement skipped: {}", err.message),
                        )
                        .in_file(&relative)
                        .at_line(err.line),
                    );
                }
                self.sources.push(SourceFile {
                    relative,
                    module: parsed.module,
                });
            }
            Err(err) => {
                self.diagnostics.add(
                    Diagnostic::warning(
                        DiagnosticKind::Introspection,
                        format!("file skipped, could not be parsed: {}", err.message),
                    )
                    .in_file(relative)
                    .at_line(err.line),
                );
            }
        }
    }

    /// Extract records from every added source
    pub fn finish(mut self, module_name: &str) -> (NodeModule, DiagnosticsCollector) {
        let sources = std::mem::take(&mut self.sources);

        let outputs = self.collect_outputs(&sources);

        let mut module = NodeModule::new(module_name);
        let mut seen: IndexMap<String, Location> = IndexMap::new();

        for source in &sources {
            for class in ast::classes(&source.module) {
                if class.decorator_call(INVOCATION_DECORATOR).is_none() {
                    continue;
                }
                let node = self.node(class, &source.relative, &outputs);
                if let Some(first) = seen.get(&node.id) {
                    self.diagnostics.add(
                        Diagnostic::warning(
                            DiagnosticKind::DuplicateNode,
                            format!(
                                "node id `{}` already defined at {}, dropping `{}`",
                                node.id, first, node.class_name
                            ),
                        )
                        .in_file(&source.relative)
                        .at_line(node.location.line),
                    );
                    continue;
                }
                seen.insert(node.id.clone(), node.location.clone());
                module.nodes.push(node);
            }

            module.functions.extend(self.functions(source));
        }

        if self.order == NodeOrder::Title {
            module.nodes.sort_by(|a, b| {
                a.title
                    .to_lowercase()
                    .cmp(&b.title.to_lowercase())
                    .then_with(|| a.id.cmp(&b.id))
            });
        }
        module.outputs = outputs.into_values().collect();

        tracing::info!(
            nodes = module.nodes.len(),
            outputs = module.outputs.len(),
            functions = module.functions.len(),
            "introspection complete"
        );

        (module, self.diagnostics)
    }

    fn relative(&self, path: &Path) -> PathBuf {
        path.strip_prefix(&self.root).unwrap_or(path).to_path_buf()
    }

    fn location(&self, file: &Path, line: usize) -> Location {
        Location::in_repository(&self.root, &self.root.join(file), line)
    }

    fn warn(&mut self, file: &Path, line: usize, message: String) {
        self.diagnostics.add(
            Diagnostic::warning(DiagnosticKind::Introspection, message)
                .in_file(file)
                .at_line(line),
        );
    }

    // ---- output definitions ----

    /// First pass: every `@invocation_output` class, with inherited fields
    /// resolved.
    fn collect_outputs(&mut self, sources: &[SourceFile]) -> IndexMap<String, OutputDefinition> {
        let mut outputs = IndexMap::new();
        for source in sources {
            for class in ast::classes(&source.module) {
                let Some(decorator) = class.decorator_call(OUTPUT_DECORATOR) else {
                    continue;
                };
                let output_id = first_arg(decorator).and_then(Expr::as_str).map(str::to_owned);
                let definition = OutputDefinition {
                    class_name: class.name.clone(),
                    output_id,
                    bases: class
                        .bases
                        .iter()
                        .filter_map(Expr::terminal_name)
                        .map(str::to_owned)
                        .collect(),
                    fields: self.fields(class, &source.relative),
                    location: self.location(&source.relative, class.line),
                };
                if outputs.contains_key(&class.name) {
                    tracing::debug!(class = %class.name, "output definition redefined");
                }
                outputs.insert(class.name.clone(), definition);
            }
        }

        let names: Vec<String> = outputs.keys().cloned().collect();
        let resolved: Vec<Vec<FieldRecord>> = names
            .iter()
            .map(|name| self.inherited_fields(name, &outputs, &mut Vec::new()))
            .collect();
        for (name, fields) in names.iter().zip(resolved) {
            if let Some(definition) = outputs.get_mut(name) {
                definition.fields = fields;
            }
        }
        outputs
    }

    /// Fields of `name` with those of known base outputs first; a field
    /// redeclared by a subclass keeps its inherited position.
    fn inherited_fields(
        &mut self,
        name: &str,
        outputs: &IndexMap<String, OutputDefinition>,
        stack: &mut Vec<String>,
    ) -> Vec<FieldRecord> {
        let Some(definition) = outputs.get(name) else {
            return Vec::new();
        };
        if stack.iter().any(|s| s == name) {
            let file = PathBuf::from(&definition.location.filename);
            self.warn(
                &file,
                definition.location.line,
                format!("output `{}` inherits from itself", name),
            );
            return Vec::new();
        }

        stack.push(name.to_string());
        let mut fields: Vec<FieldRecord> = Vec::new();
        for base in &definition.bases {
            for field in self.inherited_fields(base, outputs, stack) {
                merge_field(&mut fields, field);
            }
        }
        stack.pop();

        for field in &definition.fields {
            merge_field(&mut fields, field.clone());
        }
        fields
    }

    // ---- nodes ----

    fn node(
        &mut self,
        class: &ClassDef,
        file: &Path,
        outputs: &IndexMap<String, OutputDefinition>,
    ) -> NodeRecord {
        let decorator = class.decorator_call(INVOCATION_DECORATOR);
        let id = match decorator.and_then(first_arg).and_then(Expr::as_str) {
            Some(id) if !id.is_empty() => id.to_string(),
            _ => {
                self.warn(
                    file,
                    class.line,
                    format!(
                        "node `{}` has no invocation id, using the class name",
                        class.name
                    ),
                );
                class.name.clone()
            }
        };

        let mut node = NodeRecord::new(id, class.name.clone());
        node.location = self.location(file, class.line);

        if let Some(decorator) = decorator {
            if let Some(title) = decorator.keyword("title").and_then(Expr::as_str) {
                if !title.is_empty() {
                    node.title = title.to_string();
                }
            }
            node.category = decorator
                .keyword("category")
                .and_then(Expr::as_str)
                .map(str::to_owned);
            node.version = decorator.keyword("version").and_then(|v| match v {
                Expr::Constant(Constant::Str(s)) => Some(s.clone()),
                Expr::Constant(Constant::Number(n)) => Some(n.clone()),
                _ => None,
            });
            node.tags = match decorator.keyword("tags") {
                Some(Expr::List(items) | Expr::Tuple(items)) => items
                    .iter()
                    .filter_map(Expr::as_str)
                    .map(str::to_owned)
                    .collect(),
                _ => Vec::new(),
            };
        }

        if let Some(doc) = class.docstring() {
            let (description, long_description) = split_docstring(doc);
            node.description = description;
            node.long_description = long_description;
        }

        node.inputs = self.fields(class, file);
        node.output = self.output(class, &node.id, file, outputs);
        node
    }

    /// Resolve what a node's `invoke` returns
    fn output(
        &mut self,
        class: &ClassDef,
        id: &str,
        file: &Path,
        outputs: &IndexMap<String, OutputDefinition>,
    ) -> Option<OutputRecord> {
        let Some(invoke) = class.method("invoke") else {
            self.warn(
                file,
                class.line,
                format!("node `{}` has no invoke method", id),
            );
            return None;
        };

        let known = |name: &str| {
            outputs.get(name).map(|definition| OutputRecord {
                type_name: name.to_string(),
                fields: definition.fields.clone(),
            })
        };

        if let Some(record) = invoke
            .returns
            .as_ref()
            .and_then(annotation_name)
            .and_then(|name| known(name))
        {
            return Some(record);
        }

        let mut returned = None;
        ast::walk(&invoke.body, &mut |stmt| {
            if let Stmt::Return(Some(Expr::Call { func, .. })) = stmt {
                match func.as_ref() {
                    Expr::Name(name) => {
                        returned = Some(known(name).unwrap_or_else(|| OutputRecord {
                            type_name: name.clone(),
                            fields: Vec::new(),
                        }));
                    }
                    attribute @ Expr::Attribute { .. } => {
                        returned = Some(OutputRecord {
                            type_name: format!("{}(...)", type_label(attribute)),
                            fields: Vec::new(),
                        });
                    }
                    _ => {}
                }
            }
        });
        if returned.is_some() {
            return returned;
        }

        if let Some(annotation) = &invoke.returns {
            return Some(OutputRecord {
                type_name: type_label(annotation),
                fields: Vec::new(),
            });
        }

        self.warn(
            file,
            invoke.line,
            format!("output of node `{}` could not be determined", id),
        );
        None
    }

    // ---- fields ----

    /// Annotated class-level assignments, in declaration order
    fn fields(&mut self, class: &ClassDef, file: &Path) -> Vec<FieldRecord> {
        let mut fields = Vec::new();
        for stmt in &class.body {
            let Stmt::AnnAssign {
                target,
                annotation,
                value,
                line,
            } = stmt
            else {
                continue;
            };
            let Expr::Name(name) = target else {
                continue;
            };
            if annotation.as_ref().is_some_and(is_class_var) {
                continue;
            }

            let label = match annotation {
                Some(annotation) => type_label(annotation),
                None => {
                    self.warn(
                        file,
                        *line,
                        format!(
                            "type of field `{}` in `{}` could not be read",
                            name, class.name
                        ),
                    );
                    UNKNOWN_TYPE.to_string()
                }
            };

            let (default, description) = match value {
                Some(call @ Expr::Call { func, .. })
                    if func
                        .terminal_name()
                        .is_some_and(|f| FIELD_CONSTRUCTORS.contains(&f)) =>
                {
                    (field_default(call), field_description(call))
                }
                Some(value) if !is_ellipsis(value) => (Some(default_value(value)), String::new()),
                _ => (None, String::new()),
            };

            fields.push(
                FieldRecord::new(name.clone(), label, default).with_description(description),
            );
        }
        fields
    }

    // ---- functions ----

    fn functions(&self, source: &SourceFile) -> Vec<FunctionRecord> {
        source
            .module
            .body
            .iter()
            .filter_map(|stmt| match stmt {
                Stmt::FunctionDef(function) => Some(FunctionRecord {
                    name: function.name.clone(),
                    description: function
                        .docstring()
                        .map(|doc| split_docstring(doc).0)
                        .unwrap_or_default(),
                    location: self.location(&source.relative, function.line),
                }),
                _ => None,
            })
            .collect()
    }
}

/// Class name an annotation refers to, forward references included
fn annotation_name(annotation: &Expr) -> Option<&str> {
    match annotation {
        Expr::Constant(Constant::Str(name)) => name.trim().rsplit('.').next(),
        other => other.terminal_name(),
    }
}

fn first_arg(call: &Expr) -> Option<&Expr> {
    match call {
        Expr::Call { args, .. } => args.first(),
        _ => None,
    }
}

fn is_ellipsis(expr: &Expr) -> bool {
    matches!(expr, Expr::Constant(Constant::Ellipsis))
}

fn is_class_var(annotation: &Expr) -> bool {
    let base = match annotation {
        Expr::Subscript { value, .. } => value.as_ref(),
        other => other,
    };
    base.terminal_name() == Some("ClassVar")
}

/// Default declared through a field constructor: `default=`, then
/// `default_factory=`, then the first positional argument.
fn field_default(call: &Expr) -> Option<String> {
    if let Some(default) = call.keyword("default") {
        return (!is_ellipsis(default)).then(|| default_value(default));
    }
    if let Some(factory) = call.keyword("default_factory") {
        return Some(format!("{}()", default_value(factory)));
    }
    first_arg(call)
        .filter(|arg| !is_ellipsis(arg))
        .map(default_value)
}

fn field_description(call: &Expr) -> String {
    call.keyword("description")
        .and_then(Expr::as_str)
        .unwrap_or_default()
        .to_string()
}

/// Replace a same-named field in place, or append
fn merge_field(fields: &mut Vec<FieldRecord>, field: FieldRecord) {
    match fields.iter_mut().find(|f| f.name == field.name) {
        Some(existing) => *existing = field,
        None => fields.push(field),
    }
}

/// Split a docstring into its first line and the dedented remainder
pub fn split_docstring(doc: &str) -> (String, String) {
    let doc = doc.trim();
    let mut lines = doc.lines();
    let summary = lines.next().unwrap_or_default().trim().to_string();

    let rest: Vec<&str> = lines.collect();
    let indent = rest
        .iter()
        .filter(|line| !line.trim().is_empty())
        .map(|line| leading_blanks(line))
        .min()
        .unwrap_or(0);

    let dedented: Vec<&str> = rest
        .iter()
        .map(|line| {
            if line.trim().is_empty() {
                ""
            } else {
                line[indent.min(leading_blanks(line))..].trim_end()
            }
        })
        .collect();

    let start = dedented.iter().position(|l| !l.is_empty());
    let end = dedented.iter().rposition(|l| !l.is_empty());
    let body = match (start, end) {
        (Some(start), Some(end)) => dedented[start..=end].join("\n"),
        _ => String::new(),
    };
    (summary, body)
}

fn leading_blanks(line: &str) -> usize {
    line.bytes().take_while(|b| *b == b' ' || *b == b'\t').count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test::{ADD_NUMBERS_SOURCE, MATH_OUTPUTS_SOURCE};
    use pretty_assertions::assert_eq;

    fn introspect(sources: &[(&str, &str)]) -> (NodeModule, DiagnosticsCollector) {
        let mut introspector = Introspector::new("/repo");
        for (name, src) in sources {
            introspector.add_source(&Path::new("/repo").join(name), src);
        }
        introspector.finish("repo")
    }

    #[test]
    fn test_add_numbers() {
        let (module, diagnostics) = introspect(&[("math.py", ADD_NUMBERS_SOURCE)]);
        assert_eq!(diagnostics.warning_count(), 0);
        assert_eq!(module.nodes.len(), 1);

        let node = &module.nodes[0];
        assert_eq!(node.id, "add_numbers");
        assert_eq!(node.title, "AddNumbers");
        assert_eq!(node.category.as_deref(), Some("math"));
        assert_eq!(node.tags, vec!["math", "add"]);
        assert_eq!(node.version.as_deref(), Some("1.0.0"));
        assert_eq!(node.description, "Adds two numbers.");
        assert_eq!(node.location.to_string(), "math.py:26");

        assert_eq!(node.inputs.len(), 2);
        assert_eq!(node.inputs[0].name, "a");
        assert_eq!(node.inputs[0].type_label, "int");
        assert!(node.inputs[0].required);
        assert_eq!(node.inputs[0].description, "");
        assert_eq!(node.inputs[1].default.as_deref(), Some("0"));
        assert!(!node.inputs[1].required);
        assert_eq!(node.inputs[1].description, "Second addend");

        let output = node.output.as_ref().unwrap();
        assert_eq!(output.type_name, "AddNumbersOutput");
        assert_eq!(output.fields.len(), 1);
        assert_eq!(output.fields[0].name, "sum");
        assert_eq!(output.fields[0].type_label, "int");

        assert_eq!(module.outputs.len(), 1);
        assert_eq!(module.outputs[0].output_id.as_deref(), Some("add_numbers_output"));
    }

    #[test]
    fn test_outputs_from_other_files_and_inheritance() {
        let node_src = r#"
@invocation("scale")
class ScaleInvocation(BaseInvocation):
    def invoke(self, context):
        return ScaledOutput(value=1.0, factor=2.0)
"#;
        let (module, _) = introspect(&[("a_outputs.py", MATH_OUTPUTS_SOURCE), ("b_nodes.py", node_src)]);
        let output = module.nodes[0].output.as_ref().unwrap();
        assert_eq!(output.type_name, "ScaledOutput");
        let names: Vec<&str> = output.fields.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["value", "factor"]);
        assert_eq!(output.fields[0].description, "The value (inherited)");
    }

    #[test]
    fn test_inheritance_cycle_is_reported() {
        let src = r#"
@invocation_output("a")
class A(B):
    x: int = OutputField()

@invocation_output("b")
class B(A):
    y: int = OutputField()
"#;
        let (module, diagnostics) = introspect(&[("cycle.py", src)]);
        assert_eq!(module.outputs.len(), 2);
        assert!(diagnostics.count_of(DiagnosticKind::Introspection) >= 1);
    }

    #[test]
    fn test_field_defaults() {
        let src = r#"
@invocation("defaults")
class Defaults(BaseInvocation):
    positional: int = InputField(5, description="positional")
    plain: str = "hello"
    required: int = InputField(description="needed")
    ellipsis: int = InputField(default=..., description="also needed")
    factory: list[int] = InputField(default_factory=list)
    negative: float = InputField(default=-1.5)
    choice: Literal["a", "b"] = InputField(default="a")
    counter: ClassVar[int] = 0

    def invoke(self, context) -> "DefaultsOutput":
        pass
"#;
        let (module, _) = introspect(&[("d.py", src)]);
        let node = &module.nodes[0];
        let rendered: Vec<(&str, Option<&str>, bool)> = node
            .inputs
            .iter()
            .map(|f| (f.name.as_str(), f.default.as_deref(), f.required))
            .collect();
        assert_eq!(
            rendered,
            vec![
                ("positional", Some("5"), false),
                ("plain", Some("hello"), false),
                ("required", None, true),
                ("ellipsis", None, true),
                ("factory", Some("list()"), false),
                ("negative", Some("-1.5"), false),
                ("choice", Some("a"), false),
            ]
        );
        assert_eq!(node.inputs[6].type_label, "Literal[a, b]");
        // string annotation, no returns found
        assert_eq!(node.output.as_ref().unwrap().type_name, "DefaultsOutput");
    }

    #[test]
    fn test_unreadable_annotation_is_unknown() {
        let class = ClassDef {
            name: "Broken".into(),
            bases: vec![],
            decorators: vec![],
            body: vec![Stmt::AnnAssign {
                target: Expr::Name("weird".into()),
                annotation: None,
                value: Some(Expr::Call {
                    func: Box::new(Expr::Name("InputField".into())),
                    args: vec![],
                    keywords: vec![crate::python::Keyword {
                        arg: Some("default".into()),
                        value: Expr::Constant(Constant::Number("1".into())),
                    }],
                }),
                line: 4,
            }],
            line: 3,
        };
        let mut introspector = Introspector::new("/repo");
        let fields = introspector.fields(&class, Path::new("broken.py"));
        assert_eq!(fields[0].type_label, UNKNOWN_TYPE);
        assert_eq!(fields[0].default.as_deref(), Some("1"));
        assert_eq!(
            introspector.diagnostics.count_of(DiagnosticKind::Introspection),
            1
        );
    }

    #[test]
    fn test_attribute_call_return_is_named_after_the_call() {
        let src = r#"
@invocation("save")
class Save(BaseInvocation):
    def invoke(self, context):
        return context.images.save(image)
"#;
        let (module, _) = introspect(&[("save.py", src)]);
        assert_eq!(
            module.nodes[0].output.as_ref().unwrap().type_name,
            "context.images.save(...)"
        );
    }

    #[test]
    fn test_string_forward_reference_matches_known_output() {
        let src = r#"
@invocation("add_numbers")
class AddNumbersInvocation(BaseInvocation):
    def invoke(self, context) -> "AddNumbersOutput":
        return self.build(context)

@invocation_output("add_numbers_output")
class AddNumbersOutput(BaseInvocationOutput):
    sum: int = OutputField(description="The sum")
"#;
        let (module, diagnostics) = introspect(&[("fwd.py", src)]);
        assert_eq!(diagnostics.warning_count(), 0);
        let output = module.nodes[0].output.as_ref().unwrap();
        assert_eq!(output.type_name, "AddNumbersOutput");
        assert_eq!(output.fields.len(), 1);
        assert_eq!(output.fields[0].description, "The sum");

        let dotted = Expr::Constant(Constant::Str("outputs.AddNumbersOutput".into()));
        assert_eq!(annotation_name(&dotted), Some("AddNumbersOutput"));
    }

    #[test]
    fn test_missing_invoke_warns() {
        let src = "@invocation('lazy')\nclass Lazy(BaseInvocation):\n    x: int\n";
        let (module, diagnostics) = introspect(&[("lazy.py", src)]);
        assert!(module.nodes[0].output.is_none());
        assert_eq!(diagnostics.count_of(DiagnosticKind::Introspection), 1);
    }

    #[test]
    fn test_duplicate_ids_keep_first() {
        let first = "@invocation('dup', title='First')\nclass First:\n    def invoke(self): return Out()\n";
        let second = "@invocation('dup', title='Second')\nclass Second:\n    def invoke(self): return Out()\n";
        let (module, diagnostics) = introspect(&[("a.py", first), ("b.py", second)]);
        assert_eq!(module.nodes.len(), 1);
        assert_eq!(module.nodes[0].title, "First");
        assert_eq!(diagnostics.count_of(DiagnosticKind::DuplicateNode), 1);
    }

    #[test]
    fn test_title_order_and_source_order() {
        let src = r#"
@invocation("z", title="zebra")
class Z:
    def invoke(self): return O()

@invocation("a", title="Apple")
class A:
    def invoke(self): return O()

@invocation("m")
class M:
    def invoke(self): return O()
"#;
        let (module, _) = introspect(&[("n.py", src)]);
        let titles: Vec<&str> = module.nodes.iter().map(|n| n.title.as_str()).collect();
        assert_eq!(titles, vec!["Apple", "m", "zebra"]);

        let mut introspector = Introspector::new("/repo").with_order(NodeOrder::Source);
        introspector.add_source(Path::new("/repo/n.py"), src);
        let (module, _) = introspector.finish("repo");
        let ids: Vec<&str> = module.nodes.iter().map(|n| n.id.as_str()).collect();
        assert_eq!(ids, vec!["z", "a", "m"]);
    }

    #[test]
    fn test_attribute_decorator_and_nested_class() {
        let src = r#"
if True:
    @baseinvocation.invocation("nested", title="Nested")
    class Nested(BaseInvocation):
        def invoke(self): return O()
"#;
        let (module, _) = introspect(&[("n.py", src)]);
        assert_eq!(module.nodes[0].id, "nested");
    }

    #[test]
    fn test_syntax_errors_are_warnings() {
        let broken = "@invocation('ok')\nclass Ok:\n    def invoke(self): return O()\n\nx = = 1\n";
        let (module, diagnostics) = introspect(&[
            ("bad.py", broken),
            ("good.py", ADD_NUMBERS_SOURCE),
        ]);
        let ids: Vec<&str> = module.nodes.iter().map(|n| n.id.as_str()).collect();
        assert_eq!(ids, vec!["add_numbers", "ok"]);
        let syntax: Vec<&Diagnostic> = diagnostics
            .diagnostics()
            .iter()
            .filter(|d| d.message.starts_with("syntax error"))
            .collect();
        assert!(!syntax.is_empty());
        assert_eq!(syntax[0].line, Some(5));
    }

    #[test]
    fn test_functions_top_level_only() {
        let src = r#"
def helper(x):
    """Doubles x.

    More text.
    """
    def inner():
        pass
    return x * 2

class NotANode:
    def method(self):
        pass
"#;
        let (module, _) = introspect(&[("f.py", src)]);
        assert_eq!(module.functions.len(), 1);
        assert_eq!(module.functions[0].name, "helper");
        assert_eq!(module.functions[0].description, "Doubles x.");
        assert!(module.nodes.is_empty());
    }

    #[test]
    fn test_split_docstring() {
        let (summary, body) = split_docstring(
            "Resize an image.\n\n    Keeps aspect ratio.\n      - indented item\n    ",
        );
        assert_eq!(summary, "Resize an image.");
        assert_eq!(body, "Keeps aspect ratio.\n  - indented item");

        assert_eq!(split_docstring("   "), (String::new(), String::new()));
    }

    #[test]
    fn test_node_order_from_str() {
        assert_eq!("Title".parse::<NodeOrder>(), Ok(NodeOrder::Title));
        assert_eq!("source".parse::<NodeOrder>(), Ok(NodeOrder::Source));
        assert!("random".parse::<NodeOrder>().is_err());
    }
}
