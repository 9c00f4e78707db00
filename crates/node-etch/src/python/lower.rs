//! Lowering from the tree-sitter Python grammar to [`super::ast`]
//!
//! tree-sitter parses the whole file and recovers from syntax errors on its
//! own. This module walks the concrete syntax tree, keeps the statements and
//! expressions that carry documentation, and turns every `ERROR` or
//! `MISSING` node into a [`ParseError`].

use super::ast::{ClassDef, Constant, Expr, FunctionDef, Keyword, Module, Stmt};
use super::ParseError;
use std::iter::Peekable;
use std::str::Chars;
use tree_sitter::{Node, Parser, Tree};

/// Statements whose bodies are `block`s or `*_clause`s holding blocks
const COMPOUND_STATEMENTS: &[&str] = &[
    "if_statement",
    "for_statement",
    "while_statement",
    "try_statement",
    "with_statement",
    "match_statement",
];

/// Operators kept structurally in [`Expr::UnaryOp`] and [`Expr::BinOp`]
const OPERATORS: &[&str] = &[
    "+", "-", "~", "*", "/", "//", "%", "**", "@", "|", "&", "^", "<<", ">>",
];

/// Parse `src` with the tree-sitter Python grammar
pub fn parse_tree(src: &str) -> Result<Tree, ParseError> {
    let mut parser = Parser::new();
    parser
        .set_language(&tree_sitter_python::LANGUAGE.into())
        .map_err(|e| ParseError::new(0, format!("cannot load the Python grammar: {}", e)))?;
    parser
        .parse(src, None)
        .ok_or_else(|| ParseError::new(0, "parser returned no syntax tree"))
}

/// Lower a parsed `module` node
pub fn lower_module(root: Node<'_>, src: &str) -> Module {
    Module {
        body: Lowering { src }.statements(root),
    }
}

/// One error per outermost `ERROR` or `MISSING` node, in source order
pub fn syntax_errors(root: Node<'_>, src: &str) -> Vec<ParseError> {
    let mut errors = Vec::new();
    collect_errors(root, src, &mut errors);
    errors
}

fn collect_errors(node: Node<'_>, src: &str, errors: &mut Vec<ParseError>) {
    if node.is_missing() {
        errors.push(ParseError::new(
            line(node),
            format!("missing `{}`", node.kind()),
        ));
        return;
    }
    if node.is_error() {
        let text = src.get(node.byte_range()).unwrap_or_default();
        let snippet: String = text
            .lines()
            .next()
            .unwrap_or_default()
            .trim()
            .chars()
            .take(40)
            .collect();
        let message = if snippet.is_empty() {
            "invalid syntax".to_string()
        } else {
            format!("invalid syntax near `{}`", snippet)
        };
        errors.push(ParseError::new(line(node), message));
        return;
    }
    if !node.has_error() {
        return;
    }
    let mut cursor = node.walk();
    let children: Vec<Node<'_>> = node.children(&mut cursor).collect();
    for child in children {
        collect_errors(child, src, errors);
    }
}

fn line(node: Node<'_>) -> usize {
    node.start_position().row + 1
}

/// Named children without comments
fn named(node: Node<'_>) -> Vec<Node<'_>> {
    let mut cursor = node.walk();
    node.named_children(&mut cursor)
        .filter(|child| child.kind() != "comment")
        .collect()
}

fn operator(text: &str) -> Option<&'static str> {
    OPERATORS.iter().copied().find(|op| *op == text)
}

struct Lowering<'s> {
    src: &'s str,
}

impl<'s> Lowering<'s> {
    fn text(&self, node: Node<'_>) -> &'s str {
        self.src.get(node.byte_range()).unwrap_or_default()
    }

    fn opaque(&self, node: Node<'_>) -> Expr {
        Expr::Opaque(self.text(node).split_whitespace().collect::<Vec<_>>().join(" "))
    }

    // ---- statements ----

    fn statements(&self, parent: Node<'_>) -> Vec<Stmt> {
        let mut body = Vec::new();
        for child in named(parent) {
            if child.is_error() {
                // complete statements inside a recovered region still count
                body.extend(self.statements(child));
            } else if let Some(stmt) = self.statement(child) {
                body.push(stmt);
            }
        }
        body
    }

    fn statement(&self, node: Node<'_>) -> Option<Stmt> {
        let stmt = match node.kind() {
            "class_definition" => Stmt::ClassDef(self.class(node, Vec::new())?),
            "function_definition" => Stmt::FunctionDef(self.function(node, Vec::new())?),
            "decorated_definition" => self.decorated(node)?,
            "expression_statement" => self.expression_statement(node),
            "return_statement" => Stmt::Return(self.expr_list(&named(node))),
            kind if COMPOUND_STATEMENTS.contains(&kind) || kind.ends_with("_clause") => {
                Stmt::Block(self.nested_blocks(node))
            }
            kind if kind.ends_with("_statement") => Stmt::Other,
            _ => return None,
        };
        Some(stmt)
    }

    fn nested_blocks(&self, node: Node<'_>) -> Vec<Stmt> {
        let mut body = Vec::new();
        for child in named(node) {
            match child.kind() {
                "block" => body.extend(self.statements(child)),
                kind if kind.ends_with("_clause") => body.extend(self.nested_blocks(child)),
                _ => {}
            }
        }
        body
    }

    fn decorated(&self, node: Node<'_>) -> Option<Stmt> {
        let decorators: Vec<Expr> = named(node)
            .into_iter()
            .filter(|child| child.kind() == "decorator")
            .filter_map(|decorator| named(decorator).first().map(|e| self.expr(*e)))
            .collect();
        let definition = node.child_by_field_name("definition")?;
        match definition.kind() {
            "class_definition" => self.class(definition, decorators).map(Stmt::ClassDef),
            "function_definition" => self
                .function(definition, decorators)
                .map(Stmt::FunctionDef),
            _ => None,
        }
    }

    fn class(&self, node: Node<'_>, decorators: Vec<Expr>) -> Option<ClassDef> {
        let name = self.text(node.child_by_field_name("name")?).to_string();
        let bases = node
            .child_by_field_name("superclasses")
            .map(|list| {
                named(list)
                    .into_iter()
                    .filter(|arg| !matches!(arg.kind(), "keyword_argument" | "dictionary_splat"))
                    .map(|arg| self.expr(arg))
                    .collect()
            })
            .unwrap_or_default();
        let body = node
            .child_by_field_name("body")
            .map(|body| self.statements(body))
            .unwrap_or_default();
        Some(ClassDef {
            name,
            bases,
            decorators,
            body,
            line: line(node),
        })
    }

    fn function(&self, node: Node<'_>, decorators: Vec<Expr>) -> Option<FunctionDef> {
        let name = self.text(node.child_by_field_name("name")?).to_string();
        let is_async = node.child(0).is_some_and(|first| first.kind() == "async");
        Some(FunctionDef {
            name,
            decorators,
            returns: node
                .child_by_field_name("return_type")
                .map(|annotation| self.expr(annotation)),
            body: node
                .child_by_field_name("body")
                .map(|body| self.statements(body))
                .unwrap_or_default(),
            is_async,
            line: line(node),
        })
    }

    fn expression_statement(&self, node: Node<'_>) -> Stmt {
        match named(node).as_slice() {
            [] => Stmt::Other,
            [single] if single.kind() == "assignment" => self.assignment(*single),
            [single] if single.kind() == "augmented_assignment" => Stmt::Other,
            [single] => Stmt::Expr(self.expr(*single)),
            many => Stmt::Expr(Expr::Tuple(many.iter().map(|n| self.expr(*n)).collect())),
        }
    }

    /// Only annotated assignments are kept
    fn assignment(&self, node: Node<'_>) -> Stmt {
        let (Some(target), Some(annotation)) = (
            node.child_by_field_name("left"),
            node.child_by_field_name("type"),
        ) else {
            return Stmt::Other;
        };
        Stmt::AnnAssign {
            target: self.expr(target),
            annotation: (!annotation.has_error()).then(|| self.expr(annotation)),
            value: node
                .child_by_field_name("right")
                .map(|value| self.expr(value)),
            line: line(node),
        }
    }

    // ---- expressions ----

    fn expr_list(&self, nodes: &[Node<'_>]) -> Option<Expr> {
        match nodes {
            [] => None,
            [single] => Some(self.expr(*single)),
            many => Some(Expr::Tuple(many.iter().map(|n| self.expr(*n)).collect())),
        }
    }

    fn exprs(&self, node: Node<'_>) -> Vec<Expr> {
        named(node).into_iter().map(|child| self.expr(child)).collect()
    }

    fn field(&self, node: Node<'_>, name: &str) -> Option<Expr> {
        node.child_by_field_name(name).map(|child| self.expr(child))
    }

    fn expr(&self, node: Node<'_>) -> Expr {
        match node.kind() {
            "identifier" => Expr::Name(self.text(node).to_string()),
            "attribute" => match (
                self.field(node, "object"),
                node.child_by_field_name("attribute"),
            ) {
                (Some(value), Some(attr)) => Expr::Attribute {
                    value: Box::new(value),
                    attr: self.text(attr).to_string(),
                },
                _ => self.opaque(node),
            },
            "call" => self.call(node),
            "subscript" => self.subscript(node),
            "string" | "concatenated_string" => {
                self.string(node).unwrap_or_else(|| self.opaque(node))
            }
            "integer" | "float" => Expr::Constant(Constant::Number(self.text(node).to_string())),
            "true" => Expr::Constant(Constant::Bool(true)),
            "false" => Expr::Constant(Constant::Bool(false)),
            "none" => Expr::Constant(Constant::None),
            "ellipsis" => Expr::Constant(Constant::Ellipsis),
            "list" => Expr::List(self.exprs(node)),
            "tuple" | "expression_list" => Expr::Tuple(self.exprs(node)),
            "set" => Expr::Set(self.exprs(node)),
            "dictionary" => Expr::Dict(
                named(node)
                    .into_iter()
                    .filter_map(|item| match item.kind() {
                        "pair" => Some((
                            Some(self.field(item, "key")?),
                            self.field(item, "value")?,
                        )),
                        "dictionary_splat" => Some((None, self.expr(*named(item).first()?))),
                        _ => None,
                    })
                    .collect(),
            ),
            "list_splat" => match named(node).as_slice() {
                [inner] => Expr::Starred(Box::new(self.expr(*inner))),
                _ => self.opaque(node),
            },
            "parenthesized_expression" | "type" => match named(node).as_slice() {
                [inner] => self.expr(*inner),
                _ => self.opaque(node),
            },
            "unary_operator" => self.unary(node),
            "binary_operator" => self.binary(node),
            "generic_type" => self.generic_type(node),
            "union_type" => match named(node).as_slice() {
                [left, right] => Expr::BinOp {
                    left: Box::new(self.expr(*left)),
                    op: "|",
                    right: Box::new(self.expr(*right)),
                },
                _ => self.opaque(node),
            },
            "member_type" => match named(node).as_slice() {
                [value, attr] => Expr::Attribute {
                    value: Box::new(self.expr(*value)),
                    attr: self.text(*attr).to_string(),
                },
                _ => self.opaque(node),
            },
            _ => self.opaque(node),
        }
    }

    fn call(&self, node: Node<'_>) -> Expr {
        let Some(func) = self.field(node, "function") else {
            return self.opaque(node);
        };
        let mut args = Vec::new();
        let mut keywords = Vec::new();
        match node.child_by_field_name("arguments") {
            Some(arguments) if arguments.kind() == "argument_list" => {
                for arg in named(arguments) {
                    match arg.kind() {
                        "keyword_argument" => {
                            if let (Some(name), Some(value)) =
                                (arg.child_by_field_name("name"), self.field(arg, "value"))
                            {
                                keywords.push(Keyword {
                                    arg: Some(self.text(name).to_string()),
                                    value,
                                });
                            }
                        }
                        "dictionary_splat" => {
                            if let Some(inner) = named(arg).first() {
                                keywords.push(Keyword {
                                    arg: None,
                                    value: self.expr(*inner),
                                });
                            }
                        }
                        _ => args.push(self.expr(arg)),
                    }
                }
            }
            // f(x for x in y)
            Some(generator) => args.push(self.opaque(generator)),
            None => {}
        }
        Expr::Call {
            func: Box::new(func),
            args,
            keywords,
        }
    }

    fn subscript(&self, node: Node<'_>) -> Expr {
        let Some(value) = self.field(node, "value") else {
            return self.opaque(node);
        };
        let mut cursor = node.walk();
        let mut slices: Vec<Expr> = node
            .children_by_field_name("subscript", &mut cursor)
            .map(|slice| self.expr(slice))
            .collect();
        let slice = if slices.len() == 1 {
            slices.remove(0)
        } else {
            Expr::Tuple(slices)
        };
        Expr::Subscript {
            value: Box::new(value),
            slice: Box::new(slice),
        }
    }

    /// `list[int]` written in annotation position
    fn generic_type(&self, node: Node<'_>) -> Expr {
        let children = named(node);
        let [name, parameters] = children.as_slice() else {
            return self.opaque(node);
        };
        let mut slices = self.exprs(*parameters);
        let slice = if slices.len() == 1 {
            slices.remove(0)
        } else {
            Expr::Tuple(slices)
        };
        Expr::Subscript {
            value: Box::new(self.expr(*name)),
            slice: Box::new(slice),
        }
    }

    fn unary(&self, node: Node<'_>) -> Expr {
        let op = node
            .child_by_field_name("operator")
            .and_then(|op| operator(self.text(op)));
        match (op, self.field(node, "argument")) {
            (Some(op), Some(operand)) => Expr::UnaryOp {
                op,
                operand: Box::new(operand),
            },
            _ => self.opaque(node),
        }
    }

    fn binary(&self, node: Node<'_>) -> Expr {
        let op = node
            .child_by_field_name("operator")
            .and_then(|op| operator(self.text(op)));
        match (op, self.field(node, "left"), self.field(node, "right")) {
            (Some(op), Some(left), Some(right)) => Expr::BinOp {
                left: Box::new(left),
                op,
                right: Box::new(right),
            },
            _ => self.opaque(node),
        }
    }

    /// Decoded string or bytes literal; `None` for f-strings
    fn string(&self, node: Node<'_>) -> Option<Expr> {
        let parts = if node.kind() == "concatenated_string" {
            named(node)
        } else {
            vec![node]
        };

        let mut value = String::new();
        let mut bytes = false;
        for part in parts {
            let mut prefix = String::new();
            let mut content = String::new();
            let mut cursor = part.walk();
            for child in part.children(&mut cursor) {
                match child.kind() {
                    "string_start" => {
                        prefix = self
                            .text(child)
                            .trim_end_matches(['"', '\''])
                            .to_ascii_lowercase();
                    }
                    "string_content" | "escape_sequence" => content.push_str(self.text(child)),
                    "interpolation" => return None,
                    _ => {}
                }
            }
            if prefix.contains('f') {
                return None;
            }
            bytes |= prefix.contains('b');
            if prefix.contains('r') {
                value.push_str(&content);
            } else {
                value.push_str(&decode_escapes(&content, prefix.contains('b')));
            }
        }

        Some(Expr::Constant(if bytes {
            Constant::Bytes(value)
        } else {
            Constant::Str(value)
        }))
    }
}

/// Decode backslash escapes in the body of a non-raw literal
pub fn decode_escapes(content: &str, bytes: bool) -> String {
    let mut value = String::with_capacity(content.len());
    let mut chars = content.chars().peekable();
    while let Some(c) = chars.next() {
        if c != '\\' {
            value.push(c);
            continue;
        }
        let Some(next) = chars.next() else {
            value.push('\\');
            break;
        };
        match next {
            // line continuation
            '\n' => {}
            'n' => value.push('\n'),
            't' => value.push('\t'),
            'r' => value.push('\r'),
            'a' => value.push('\x07'),
            'b' => value.push('\x08'),
            'f' => value.push('\x0c'),
            'v' => value.push('\x0b'),
            '\\' | '\'' | '"' => value.push(next),
            '0'..='7' => {
                let mut digits = String::from(next);
                while digits.len() < 3 {
                    match chars.peek() {
                        Some(&d @ '0'..='7') => {
                            digits.push(d);
                            chars.next();
                        }
                        _ => break,
                    }
                }
                push_code_point(&digits, 8, &mut value);
            }
            'x' => hex_escape(&mut chars, next, 2, &mut value),
            'u' if !bytes => hex_escape(&mut chars, next, 4, &mut value),
            'U' if !bytes => hex_escape(&mut chars, next, 8, &mut value),
            _ => {
                value.push('\\');
                value.push(next);
            }
        }
    }
    value
}

fn hex_escape(chars: &mut Peekable<Chars<'_>>, c: char, len: usize, value: &mut String) {
    let digits: String = chars
        .clone()
        .take(len)
        .take_while(char::is_ascii_hexdigit)
        .collect();
    if digits.len() == len {
        for _ in 0..len {
            chars.next();
        }
        push_code_point(&digits, 16, value);
    } else {
        value.push('\\');
        value.push(c);
    }
}

fn push_code_point(digits: &str, radix: u32, value: &mut String) {
    match u32::from_str_radix(digits, radix)
        .ok()
        .and_then(char::from_u32)
    {
        Some(ch) => value.push(ch),
        None => value.push(char::REPLACEMENT_CHARACTER),
    }
}
