//! Render expressions back to display text
//!
//! Two flavours: [`type_label`] for annotations and [`default_value`] for
//! declared defaults. Strings render unquoted in both, the way Python's
//! `str()` shows them.

use super::ast::{Constant, Expr, Keyword};

/// Text for a type annotation (`int`, `list[ImageField]`, `int | None`)
pub fn type_label(expr: &Expr) -> String {
    match expr {
        Expr::Name(name) => name.clone(),
        Expr::Attribute { value, attr } => format!("{}.{}", type_label(value), attr),
        Expr::Subscript { value, slice } => {
            let inner = match slice.as_ref() {
                Expr::Tuple(items) => join(items, type_label),
                other => type_label(other),
            };
            format!("{}[{}]", type_label(value), inner)
        }
        Expr::Constant(constant) => constant_text(constant),
        Expr::Tuple(items) => format!("({})", join(items, type_label)),
        Expr::List(items) => format!("[{}]", join(items, type_label)),
        Expr::Call {
            func,
            args,
            keywords,
        } => call_text(func, args, keywords, type_label),
        Expr::BinOp { left, op, right } => {
            format!("{} {} {}", type_label(left), op, type_label(right))
        }
        Expr::Opaque(text) => text.clone(),
        other => default_value(other),
    }
}

/// Text for a default value (`0`, `hello`, `[1, 2]`, `ImageField()`)
pub fn default_value(expr: &Expr) -> String {
    match expr {
        Expr::Name(name) => name.clone(),
        Expr::Attribute { value, attr } => format!("{}.{}", default_value(value), attr),
        Expr::Constant(constant) => constant_text(constant),
        Expr::List(items) => format!("[{}]", join(items, default_value)),
        Expr::Tuple(items) if items.len() == 1 => format!("({},)", default_value(&items[0])),
        Expr::Tuple(items) => format!("({})", join(items, default_value)),
        Expr::Set(items) => format!("{{{}}}", join(items, default_value)),
        Expr::Dict(entries) => {
            let entries: Vec<String> = entries
                .iter()
                .map(|(key, value)| match key {
                    Some(key) => format!("{}: {}", default_value(key), default_value(value)),
                    None => format!("**{}", default_value(value)),
                })
                .collect();
            format!("{{{}}}", entries.join(", "))
        }
        Expr::Call {
            func,
            args,
            keywords,
        } => call_text(func, args, keywords, default_value),
        Expr::Subscript { value, slice } => {
            format!("{}[{}]", default_value(value), default_value(slice))
        }
        Expr::UnaryOp { op, operand } => format!("{}{}", op, default_value(operand)),
        Expr::BinOp { left, op, right } => {
            format!("{} {} {}", default_value(left), op, default_value(right))
        }
        Expr::Starred(inner) => format!("*{}", default_value(inner)),
        Expr::Opaque(text) => text.clone(),
    }
}

fn constant_text(constant: &Constant) -> String {
    match constant {
        Constant::Str(s) => s.clone(),
        Constant::Bytes(s) => format!("b'{}'", s),
        Constant::Number(n) => n.clone(),
        Constant::Bool(true) => "True".to_string(),
        Constant::Bool(false) => "False".to_string(),
        Constant::None => "None".to_string(),
        Constant::Ellipsis => "Ellipsis".to_string(),
    }
}

fn join(items: &[Expr], render: fn(&Expr) -> String) -> String {
    items.iter().map(render).collect::<Vec<_>>().join(", ")
}

fn call_text(
    func: &Expr,
    args: &[Expr],
    keywords: &[Keyword],
    render: fn(&Expr) -> String,
) -> String {
    let mut parts: Vec<String> = args.iter().map(render).collect();
    parts.extend(keywords.iter().map(|keyword| match &keyword.arg {
        Some(arg) => format!("{}={}", arg, render(&keyword.value)),
        None => format!("**{}", render(&keyword.value)),
    }));
    format!("{}({})", render(func), parts.join(", "))
}
