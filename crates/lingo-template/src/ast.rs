/*
 * ast.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Template AST types.
//!
//! A compiled template is a flat list of [`Segment`]s: literal text and
//! `${...}` expression spans. Expressions form a small tree described by
//! [`Expr`]. Byte positions point into the original template source.

/// A piece of a compiled template.
#[derive(Debug, Clone, PartialEq)]
pub enum Segment {
    /// Literal text, already unescaped.
    Literal(String),

    /// An embedded expression whose value is rendered in place.
    Expression(Expr),
}

/// A constant appearing in an expression.
#[derive(Debug, Clone, PartialEq)]
pub enum Constant {
    Null,
    Bool(bool),
    Number(f64),
    String(String),
}

/// Unary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    /// Logical negation `!`
    Not,
    /// Numeric negation `-`
    Negate,
}

/// Binary operators, including the short-circuiting logical ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Subtract,
    Multiply,
    Divide,
    Remainder,
    Equal,
    NotEqual,
    Less,
    LessEqual,
    Greater,
    GreaterEqual,
    And,
    Or,
}

impl BinaryOp {
    /// The operator as written in source.
    pub fn symbol(self) -> &'static str {
        match self {
            BinaryOp::Add => "+",
            BinaryOp::Subtract => "-",
            BinaryOp::Multiply => "*",
            BinaryOp::Divide => "/",
            BinaryOp::Remainder => "%",
            BinaryOp::Equal => "==",
            BinaryOp::NotEqual => "!=",
            BinaryOp::Less => "<",
            BinaryOp::LessEqual => "<=",
            BinaryOp::Greater => ">",
            BinaryOp::GreaterEqual => ">=",
            BinaryOp::And => "&&",
            BinaryOp::Or => "||",
        }
    }
}

/// An expression node.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// A literal constant: `1`, `"text"`, `true`, `null`.
    Constant(Constant),

    /// A name resolved in the render scope.
    Identifier { name: String, position: usize },

    /// An array literal: `["apple", "apples"]`.
    Array(Vec<Expr>),

    /// Property access: `user.name`.
    Member {
        object: Box<Expr>,
        property: String,
        position: usize,
    },

    /// Computed access: `items[0]`, `user["name"]`.
    Index {
        object: Box<Expr>,
        index: Box<Expr>,
        position: usize,
    },

    /// A function call: `pluralize(count, ["a", "b"])`.
    Call {
        callee: Box<Expr>,
        args: Vec<Expr>,
        position: usize,
    },

    /// A prefix operator application.
    Unary { op: UnaryOp, operand: Box<Expr> },

    /// An infix operator application.
    Binary {
        op: BinaryOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },

    /// The conditional operator: `test ? consequent : alternate`.
    Conditional {
        test: Box<Expr>,
        consequent: Box<Expr>,
        alternate: Box<Expr>,
    },
}

impl Expr {
    /// A short description of the expression for error messages,
    /// e.g. `user.name` or `items[...]`.
    pub fn describe(&self) -> String {
        match self {
            Expr::Identifier { name, .. } => name.clone(),
            Expr::Member {
                object, property, ..
            } => format!("{}.{}", object.describe(), property),
            Expr::Index { object, .. } => format!("{}[...]", object.describe()),
            Expr::Call { callee, .. } => format!("{}(...)", callee.describe()),
            _ => "expression".to_string(),
        }
    }
}
