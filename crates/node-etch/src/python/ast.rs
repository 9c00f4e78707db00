//! Syntax tree for the subset of Python the introspector reads
//!
//! Only the shapes that carry documentation are modelled precisely:
//! decorated classes and functions, annotated assignments, docstrings,
//! `return` statements and the expressions used in decorators, annotations
//! and field declarations. Everything else is either kept as source text
//! ([`Expr::Opaque`]) or collapsed to [`Stmt::Other`].

/// Literal constant
#[derive(Debug, Clone, PartialEq)]
pub enum Constant {
    /// String literal, adjacent literals already concatenated
    Str(String),
    /// Bytes literal
    Bytes(String),
    /// Integer, float or complex literal, as written
    Number(String),
    Bool(bool),
    None,
    Ellipsis,
}

/// Keyword argument in a call (`arg=None` for `**kwargs`)
#[derive(Debug, Clone, PartialEq)]
pub struct Keyword {
    pub arg: Option<String>,
    pub value: Expr,
}

/// Expression
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Name(String),
    Attribute {
        value: Box<Expr>,
        attr: String,
    },
    Call {
        func: Box<Expr>,
        args: Vec<Expr>,
        keywords: Vec<Keyword>,
    },
    Subscript {
        value: Box<Expr>,
        slice: Box<Expr>,
    },
    Constant(Constant),
    List(Vec<Expr>),
    Tuple(Vec<Expr>),
    Set(Vec<Expr>),
    /// Entries; a `None` key is a `**mapping` spread
    Dict(Vec<(Option<Expr>, Expr)>),
    UnaryOp {
        op: &'static str,
        operand: Box<Expr>,
    },
    BinOp {
        left: Box<Expr>,
        op: &'static str,
        right: Box<Expr>,
    },
    Starred(Box<Expr>),
    /// Construct kept verbatim (whitespace-normalized source text):
    /// comparisons, boolean operators, lambdas, comprehensions, f-strings...
    Opaque(String),
}

impl Expr {
    /// The final identifier of a name or dotted attribute
    /// (`invocation` for both `invocation` and `baseinvocation.invocation`).
    pub fn terminal_name(&self) -> Option<&str> {
        match self {
            Expr::Name(name) => Some(name),
            Expr::Attribute { attr, .. } => Some(attr),
            _ => None,
        }
    }

    /// String value of a (non-formatted) string literal
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Expr::Constant(Constant::Str(s)) => Some(s),
            _ => None,
        }
    }

    /// Keyword argument of a call by name
    pub fn keyword(&self, name: &str) -> Option<&Expr> {
        match self {
            Expr::Call { keywords, .. } => keywords
                .iter()
                .find(|k| k.arg.as_deref() == Some(name))
                .map(|k| &k.value),
            _ => None,
        }
    }
}

/// `class` statement
#[derive(Debug, Clone, PartialEq)]
pub struct ClassDef {
    pub name: String,
    pub bases: Vec<Expr>,
    pub decorators: Vec<Expr>,
    pub body: Vec<Stmt>,
    pub line: usize,
}

impl ClassDef {
    /// Docstring: the first statement when it is a string literal
    pub fn docstring(&self) -> Option<&str> {
        docstring(&self.body)
    }

    /// First decorator that is a call to a function with the given name
    pub fn decorator_call(&self, name: &str) -> Option<&Expr> {
        self.decorators.iter().find(|d| match d {
            Expr::Call { func, .. } => func.terminal_name() == Some(name),
            _ => false,
        })
    }

    /// Method defined directly in the class body
    pub fn method(&self, name: &str) -> Option<&FunctionDef> {
        self.body.iter().find_map(|stmt| match stmt {
            Stmt::FunctionDef(f) if f.name == name => Some(f),
            _ => None,
        })
    }
}

/// `def` / `async def` statement
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionDef {
    pub name: String,
    pub decorators: Vec<Expr>,
    /// Return annotation
    pub returns: Option<Expr>,
    pub body: Vec<Stmt>,
    pub is_async: bool,
    pub line: usize,
}

impl FunctionDef {
    /// Docstring: the first statement when it is a string literal
    pub fn docstring(&self) -> Option<&str> {
        docstring(&self.body)
    }
}

/// Statement
#[derive(Debug, Clone, PartialEq)]
pub enum Stmt {
    ClassDef(ClassDef),
    FunctionDef(FunctionDef),
    /// `target: annotation [= value]`; `annotation` is `None` when it could
    /// not be parsed
    AnnAssign {
        target: Expr,
        annotation: Option<Expr>,
        value: Option<Expr>,
        line: usize,
    },
    Expr(Expr),
    Return(Option<Expr>),
    /// Body of a compound statement (`if`, `for`, `with`, `try`...)
    Block(Vec<Stmt>),
    Other,
}

/// A parsed source file
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Module {
    pub body: Vec<Stmt>,
}

fn docstring(body: &[Stmt]) -> Option<&str> {
    match body.first() {
        Some(Stmt::Expr(expr)) => expr.as_str(),
        _ => None,
    }
}

/// Visit every statement in `body` and, recursively, in nested class,
/// function and block bodies, parents before children.
pub fn walk<'a>(body: &'a [Stmt], visit: &mut dyn FnMut(&'a Stmt)) {
    for stmt in body {
        visit(stmt);
        match stmt {
            Stmt::ClassDef(class) => walk(&class.body, visit),
            Stmt::FunctionDef(function) => walk(&function.body, visit),
            Stmt::Block(inner) => walk(inner, visit),
            _ => {}
        }
    }
}

/// Every class definition in the module, at any depth, in source order
pub fn classes(module: &Module) -> Vec<&ClassDef> {
    let mut found = Vec::new();
    walk(&module.body, &mut |stmt| {
        if let Stmt::ClassDef(class) = stmt {
            found.push(class);
        }
    });
    found
}
