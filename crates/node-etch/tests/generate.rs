//! End-to-end documentation generation over temporary node repositories

use node_etch::test::{ADD_NUMBERS_SOURCE, IMAGE_NODES_SOURCE, MATH_OUTPUTS_SOURCE};
use node_etch::{DiagnosticKind, EtchBuilder, EtchError, Etcher, Layout, OutputFormat};
use pretty_assertions::assert_eq;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Create `<tmp>/<name>` holding the given files
fn repository(tmp: &TempDir, name: &str, files: &[(&str, &str)]) -> PathBuf {
    let root = tmp.path().join(name);
    for (file, content) in files {
        let path = root.join(file);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }
    fs::create_dir_all(&root).unwrap();
    root
}

fn generate(repo: &Path, output: &Path) -> String {
    EtchBuilder::new(repo).output(output).build().unwrap();
    fs::read_to_string(output).unwrap()
}

/// Rows of the first markdown table following `heading`
fn table_rows<'a>(doc: &'a str, heading: &str) -> Vec<&'a str> {
    let start = doc.find(heading).unwrap_or_else(|| panic!("missing {heading}"));
    doc[start..]
        .lines()
        .skip_while(|line| !line.starts_with('|'))
        .take_while(|line| line.starts_with('|'))
        .skip(2)
        .collect()
}

#[test]
fn add_numbers_example() {
    let tmp = TempDir::new().unwrap();
    let repo = repository(&tmp, "math-nodes", &[("math.py", ADD_NUMBERS_SOURCE)]);
    let doc = generate(&repo, &tmp.path().join("math-nodes.md"));

    let expected = "\
# math-nodes

## Overview

### Nodes

- [AddNumbers](#addnumbers) - Adds two numbers.

<details>
<summary>

### Output Definitions

</summary>

- `AddNumbersOutput` - Output definition with 1 field

</details>

## Nodes

### AddNumbers

**ID:** `add_numbers`

**Category:** math

**Tags:** math, add

**Version:** 1.0.0

**Description:** Adds two numbers.

Both inputs are integers.
";
    assert!(doc.starts_with(expected), "unexpected head:\n{doc}");
    assert_eq!(
        table_rows(&doc, "#### Inputs"),
        vec![
            "| `a` | `int` | — | required |  |",
            "| `b` | `int` | `0` | optional | Second addend |",
        ]
    );
    assert!(doc.contains("**Type:** `AddNumbersOutput`"));
    assert_eq!(
        table_rows(&doc, "#### Output"),
        vec!["| `sum` | `int` | The sum |"]
    );
}

#[test]
fn repository_without_nodes() {
    let tmp = TempDir::new().unwrap();
    let repo = repository(&tmp, "empty", &[("helpers.py", "X = 1\n")]);
    let doc = generate(&repo, &tmp.path().join("empty.md"));

    assert!(doc.starts_with("# empty\n"));
    assert!(!doc.contains("## Nodes"));
    assert!(!doc.contains("#### Inputs"));
}

#[test]
fn row_counts_match_fields() {
    let tmp = TempDir::new().unwrap();
    let repo = repository(
        &tmp,
        "image",
        &[("blur.py", IMAGE_NODES_SOURCE), ("outputs.py", MATH_OUTPUTS_SOURCE)],
    );
    let doc = generate(&repo, &tmp.path().join("image.md"));

    let inputs = table_rows(&doc, "#### Inputs");
    assert_eq!(inputs.len(), 4);
    assert_eq!(inputs[0], "| `image` | `ImageField` | — | required | The image to blur |");
    assert_eq!(
        inputs[2],
        "| `mode` | `Literal[gaussian, box]` | `gaussian` | optional |  |"
    );
    assert_eq!(inputs[3], "| `kernel` | `Optional[list[float]]` | `None` | optional |  |");

    // `ImageOutput` is defined elsewhere, so only the type is known
    assert!(doc.contains("**Type:** `ImageOutput.build(...)`"));
    assert!(doc.contains("No output information available."));
    assert!(doc.contains("- `to_grayscale` - Convert an image to grayscale."));
}

#[test]
fn missing_description_leaves_cell_empty() {
    let source = r#"
@invocation("plain", title="Plain")
class PlainInvocation(BaseInvocation):
    x: str = InputField(default="a")

    def invoke(self, context) -> PlainOutput:
        return PlainOutput(y=self.x)


@invocation_output("plain_output")
class PlainOutput(BaseInvocationOutput):
    y: str = OutputField()
"#;
    let tmp = TempDir::new().unwrap();
    let repo = repository(&tmp, "plain", &[("plain.py", source)]);
    let doc = generate(&repo, &tmp.path().join("plain.md"));

    assert!(doc.contains("**Description:**\n"));
    assert_eq!(
        table_rows(&doc, "#### Inputs"),
        vec!["| `x` | `str` | `a` | optional |  |"]
    );
    assert_eq!(table_rows(&doc, "#### Output"), vec!["| `y` | `str` |  |"]);
}

#[test]
fn reruns_are_byte_identical() {
    let tmp = TempDir::new().unwrap();
    let repo = repository(
        &tmp,
        "nodes",
        &[
            ("math.py", ADD_NUMBERS_SOURCE),
            ("blur.py", IMAGE_NODES_SOURCE),
            ("node-docs.yaml", "intro: Hello.\nchangelog: v1\n"),
        ],
    );
    let output = tmp.path().join("nodes.md");
    let first = generate(&repo, &output);
    let second = generate(&repo, &output);
    assert_eq!(first, second);

    let site = tmp.path().join("site");
    let build = EtchBuilder::new(&repo)
        .output(&site)
        .layout(Layout::PerNode)
        .build()
        .unwrap();
    let before: Vec<String> = build
        .all_files()
        .map(|f| fs::read_to_string(f).unwrap())
        .collect();
    let rebuild = EtchBuilder::new(&repo)
        .output(&site)
        .layout(Layout::PerNode)
        .build()
        .unwrap();
    let after: Vec<String> = rebuild
        .all_files()
        .map(|f| fs::read_to_string(f).unwrap())
        .collect();
    assert_eq!(before, after);
}

#[test]
fn supplement_is_spliced() {
    let supplement = "\
<!-- node-docs: intro -->
Welcome to the math nodes.

<!-- node-docs: node:add_numbers -->
Try it with small numbers.

<!-- node-docs: outro -->
Thanks for reading.

<!-- node-docs: changelog -->
- 1.0.0 first release
";
    let tmp = TempDir::new().unwrap();
    let repo = repository(
        &tmp,
        "math",
        &[("math.py", ADD_NUMBERS_SOURCE), ("node-docs.md", supplement)],
    );
    let output = tmp.path().join("math.md");
    let mut etcher = Etcher::new({
        let mut config = node_etch::EtchConfig::new(&repo);
        config.output = Some(output.clone());
        config
    });
    etcher.run().unwrap();
    let doc = fs::read_to_string(&output).unwrap();

    let pos = |needle: &str| doc.find(needle).unwrap_or_else(|| panic!("missing {needle}"));
    assert!(pos("## Introduction\n\nWelcome to the math nodes.") < pos("## Overview"));
    assert!(pos("**Description:** Adds two numbers.") < pos("Try it with small numbers."));
    assert!(pos("Try it with small numbers.") < pos("#### Inputs"));
    assert!(pos("## Footnotes\n\nThanks for reading.") < pos("## changelog"));
    assert!(doc.ends_with("## changelog\n\n- 1.0.0 first release\n"));
    assert_eq!(
        etcher.diagnostics().count_of(DiagnosticKind::SupplementMismatch),
        1
    );
}

#[test]
fn supplement_can_be_skipped() {
    let tmp = TempDir::new().unwrap();
    let repo = repository(
        &tmp,
        "math",
        &[("math.py", ADD_NUMBERS_SOURCE), ("node-docs.yaml", "intro: Hi.\n")],
    );
    let output = tmp.path().join("math.md");
    EtchBuilder::new(&repo)
        .output(&output)
        .supplement(false)
        .build()
        .unwrap();
    assert!(!fs::read_to_string(&output).unwrap().contains("## Introduction"));
}

#[test]
fn missing_target_fails_without_output() {
    let tmp = TempDir::new().unwrap();
    let output = tmp.path().join("out.md");
    let err = EtchBuilder::new(tmp.path().join("nope"))
        .output(&output)
        .build()
        .unwrap_err();
    assert!(matches!(err, EtchError::NotFound(_)));
    assert!(err.is_configuration());
    assert!(!output.exists());
}

#[test]
fn file_target_is_rejected() {
    let tmp = TempDir::new().unwrap();
    let file = tmp.path().join("math.py");
    fs::write(&file, ADD_NUMBERS_SOURCE).unwrap();
    let err = EtchBuilder::new(&file)
        .output(tmp.path().join("out.md"))
        .build()
        .unwrap_err();
    assert!(matches!(err, EtchError::NotADirectory(_)));
}

#[test]
fn broken_file_does_not_stop_the_run() {
    let tmp = TempDir::new().unwrap();
    let repo = repository(
        &tmp,
        "mixed",
        &[
            ("math.py", ADD_NUMBERS_SOURCE),
            ("broken.py", "class Broken(:\n    x: int = \"unterminated\n"),
        ],
    );
    let output = tmp.path().join("mixed.md");
    let mut etcher = EtchBuilder::new(&repo).output(&output).etcher();
    let build = etcher.run().unwrap();

    assert_eq!(build.node_count, 1);
    assert!(build.warning_count >= 1);
    assert!(etcher.diagnostics().count_of(DiagnosticKind::Introspection) >= 1);
    assert!(fs::read_to_string(&output).unwrap().contains("### AddNumbers"));
}

#[test]
fn per_node_layout() {
    let tmp = TempDir::new().unwrap();
    let repo = repository(
        &tmp,
        "nodes",
        &[("math.py", ADD_NUMBERS_SOURCE), ("blur.py", IMAGE_NODES_SOURCE)],
    );
    let site = tmp.path().join("site");
    let build = EtchBuilder::new(&repo)
        .output(&site)
        .layout(Layout::PerNode)
        .build()
        .unwrap();

    assert_eq!(
        build.files,
        vec![
            site.join("index.md"),
            site.join("add-numbers.md"),
            site.join("image-blur-custom.md"),
        ]
    );
    let index = fs::read_to_string(site.join("index.md")).unwrap();
    assert!(index.contains("- [AddNumbers](add-numbers.md) - Adds two numbers."));
    let page = fs::read_to_string(site.join("add-numbers.md")).unwrap();
    assert!(page.starts_with("# AddNumbers\n"));
    assert!(page.contains("[Back to nodes](index.md)"));
}

#[test]
fn json_format() {
    let tmp = TempDir::new().unwrap();
    let repo = repository(&tmp, "math", &[("math.py", ADD_NUMBERS_SOURCE)]);
    let output = tmp.path().join("math.json");
    EtchBuilder::new(&repo)
        .output(&output)
        .format(OutputFormat::Json)
        .build()
        .unwrap();

    let value: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&output).unwrap()).unwrap();
    assert_eq!(value["name"], "math");
    assert_eq!(value["nodes"][0]["title"], "AddNumbers");
    assert_eq!(value["nodes"][0]["inputs"][1]["default"], "0");
    assert_eq!(value["nodes"][0]["location"]["line"], 26);
}

#[test]
fn recursive_scan() {
    let tmp = TempDir::new().unwrap();
    let repo = repository(
        &tmp,
        "nested",
        &[("nodes/math.py", ADD_NUMBERS_SOURCE), ("blur.py", IMAGE_NODES_SOURCE)],
    );

    let mut flat = EtchBuilder::new(&repo).etcher();
    assert_eq!(flat.extract().unwrap().nodes.len(), 1);

    let mut deep = EtchBuilder::new(&repo).recursive(true).etcher();
    let module = deep.extract().unwrap();
    assert_eq!(module.nodes.len(), 2);
    assert_eq!(module.node("add_numbers").unwrap().location.filename, "nodes/math.py");
}
