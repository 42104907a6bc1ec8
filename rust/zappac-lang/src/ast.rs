//! Tree form of a parsed statement.
//!
//! The frontend hands out flat node lists; the tree is rebuilt from them on
//! every execution and never leaves this crate's evaluator.

use strum::Display;

use crate::node::NodeKind;
use crate::value::{OutputFormat, Value};

#[derive(Debug, Clone, PartialEq)]
pub enum Stmt {
    Expr(Expr),
    Assign(String, Expr),
    Clear,
    Save(String),
    Load(String),
    Output(OutputFormat),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Number(Value),
    Var(String),
    Neg(Box<Expr>),
    Not(Box<Expr>),
    Abs(Box<Expr>),
    Binary(BinOp, Box<Expr>, Box<Expr>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum BinOp {
    #[strum(serialize = "+")]
    Add,
    #[strum(serialize = "-")]
    Sub,
    #[strum(serialize = "*")]
    Mul,
    #[strum(serialize = "/")]
    Div,
    #[strum(serialize = "//")]
    Fdiv,
    #[strum(serialize = "%")]
    Mod,
    #[strum(serialize = "**")]
    Exp,
    #[strum(serialize = "&")]
    And,
    #[strum(serialize = "|")]
    Or,
    #[strum(serialize = "^")]
    Xor,
    #[strum(serialize = "<<")]
    Shl,
    #[strum(serialize = ">>")]
    Shr,
}

impl BinOp {
    pub fn from_kind(kind: NodeKind) -> Option<BinOp> {
        Some(match kind {
            NodeKind::Add => BinOp::Add,
            NodeKind::Sub => BinOp::Sub,
            NodeKind::Mult => BinOp::Mul,
            NodeKind::Div => BinOp::Div,
            NodeKind::Fdiv => BinOp::Fdiv,
            NodeKind::Mod => BinOp::Mod,
            NodeKind::Exp => BinOp::Exp,
            NodeKind::And => BinOp::And,
            NodeKind::Or => BinOp::Or,
            NodeKind::Xor => BinOp::Xor,
            NodeKind::LShift => BinOp::Shl,
            NodeKind::RShift => BinOp::Shr,
            _ => return None,
        })
    }

    /// Left and right binding power. `**` binds right to left.
    pub fn binding_power(self) -> (u8, u8) {
        match self {
            BinOp::Or => (2, 3),
            BinOp::Xor => (4, 5),
            BinOp::And => (6, 7),
            BinOp::Shl | BinOp::Shr => (8, 9),
            BinOp::Add | BinOp::Sub => (10, 11),
            BinOp::Mul | BinOp::Div | BinOp::Fdiv | BinOp::Mod => (12, 13),
            BinOp::Exp => (17, 16),
        }
    }
}

/// Binding power of prefix `-`, `+` and `~`.
pub const PREFIX_BP: u8 = 14;
