use crate::{
    ast::{BinOp, UnaryOp},
    value::{Datum, Value},
};

/// Abstract Syntax Tree node representing an expression.
///
/// Leaves are constants, column references and the row index; everything
/// else is an operator whose children are themselves expressions.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// Literal value, possibly missing (`absent` in JSON)
    Constant(Datum),

    /// Value of a named column in the current row
    Column(String),

    /// 0-based index of the current row
    RowIndex,

    /// Unary operation (negation, type test, conversion, datetime part)
    Unary { op: UnaryOp, arg: Box<Expr> },

    /// Binary operation (arithmetic, comparison, logical)
    Binary {
        op: BinOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },

    /// `ifElse`: evaluates exactly one branch
    IfElse {
        cond: Box<Expr>,
        then: Box<Expr>,
        otherwise: Box<Expr>,
    },
}

impl Expr {
    pub fn missing() -> Self {
        Expr::Constant(None)
    }

    pub fn logical(b: bool) -> Self {
        Expr::Constant(Some(Value::Logical(b)))
    }

    pub fn number(n: f64) -> Self {
        Expr::Constant(Some(Value::Number(n)))
    }

    pub fn text(s: impl Into<String>) -> Self {
        Expr::Constant(Some(Value::Text(s.into())))
    }

    pub fn column(name: impl Into<String>) -> Self {
        Expr::Column(name.into())
    }

    pub fn unary(op: UnaryOp, arg: Expr) -> Self {
        Expr::Unary {
            op,
            arg: Box::new(arg),
        }
    }

    pub fn binary(op: BinOp, left: Expr, right: Expr) -> Self {
        Expr::Binary {
            op,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    pub fn if_else(cond: Expr, then: Expr, otherwise: Expr) -> Self {
        Expr::IfElse {
            cond: Box::new(cond),
            then: Box::new(then),
            otherwise: Box::new(otherwise),
        }
    }

    /// Names of the columns this expression refers to, each once, in order
    /// of first reference. Branches that may never be evaluated count too.
    pub fn columns(&self) -> Vec<String> {
        let mut names = Vec::new();
        self.collect_columns(&mut names);
        names
    }

    fn collect_columns(&self, names: &mut Vec<String>) {
        match self {
            Expr::Column(name) => {
                if !names.contains(name) {
                    names.push(name.clone());
                }
            }
            Expr::Constant(_) | Expr::RowIndex => {}
            Expr::Unary { arg, .. } => arg.collect_columns(names),
            Expr::Binary { left, right, .. } => {
                left.collect_columns(names);
                right.collect_columns(names);
            }
            Expr::IfElse {
                cond,
                then,
                otherwise,
            } => {
                cond.collect_columns(names);
                then.collect_columns(names);
                otherwise.collect_columns(names);
            }
        }
    }

    /// Species name of this node as written in JSON.
    pub fn species(&self) -> &'static str {
        match self {
            Expr::Constant(None) => "absent",
            Expr::Constant(Some(v)) => v.type_name(),
            Expr::Column(_) => "column",
            Expr::RowIndex => "rowIndex",
            Expr::Unary { op, .. } => op.species(),
            Expr::Binary { op, .. } => op.species(),
            Expr::IfElse { .. } => crate::ast::operators::IF_ELSE,
        }
    }
}
