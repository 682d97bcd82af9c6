//! The restricted expression language AST.
//!
//! Untrusted chart specifications are expressions, not programs: literals,
//! object and array constructors, arithmetic, and calls into a small
//! whitelist of helpers. There is deliberately no binding, no control
//! flow, and no way to name anything outside the helper set.

use serde_json::Value;

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// A scalar literal (number, string, boolean, or null).
    Literal(Value),
    Array(Vec<Expr>),
    /// Object literals keep declaration order.
    Object(Vec<(String, Expr)>),
    Neg(Box<Expr>),
    Binary {
        op: BinOp,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
    },
    /// A dotted call such as `pattern.draw(...)`.
    Call { path: Vec<String>, args: Vec<Expr> },
    /// A bare dotted reference such as `Chart.defaults`.
    Path(Vec<String>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
}
