//! Syntax nodes produced by the frontend.

use serde::Serialize;
use strum::{AsRefStr, Display};
use zappac_session::{NodeClass, SyntaxNode};

/// Every kind of node the language knows about.
///
/// Presentation layers key highlighting off these names, so the variant
/// order and spelling are part of the public surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Display, AsRefStr)]
pub enum NodeKind {
    Eof,
    Assign,
    LParen,
    RParen,
    Number,
    Variable,
    Add,
    Sub,
    Mult,
    Exp,
    Div,
    Fdiv,
    And,
    Or,
    Xor,
    Inv,
    Mod,
    LShift,
    RShift,
    Abs,
    SetOutput,
    Save,
    Load,
    Clear,
}

impl NodeKind {
    pub fn is_operator(self) -> bool {
        matches!(
            self,
            NodeKind::Add
                | NodeKind::Sub
                | NodeKind::Mult
                | NodeKind::Exp
                | NodeKind::Div
                | NodeKind::Fdiv
                | NodeKind::And
                | NodeKind::Or
                | NodeKind::Xor
                | NodeKind::Inv
                | NodeKind::Mod
                | NodeKind::LShift
                | NodeKind::RShift
        )
    }

    pub fn is_function(self) -> bool {
        matches!(
            self,
            NodeKind::Abs | NodeKind::SetOutput | NodeKind::Save | NodeKind::Load | NodeKind::Clear
        )
    }

    pub fn is_value(self) -> bool {
        matches!(self, NodeKind::Number | NodeKind::Variable)
    }

    /// Function keyword for an identifier, if it is one.
    pub fn keyword(ident: &str) -> Option<NodeKind> {
        match ident {
            "abs" => Some(NodeKind::Abs),
            "output" => Some(NodeKind::SetOutput),
            "save" => Some(NodeKind::Save),
            "load" => Some(NodeKind::Load),
            "clear" => Some(NodeKind::Clear),
            _ => None,
        }
    }
}

/// A lexed and grammar-checked unit of input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Node {
    pub kind: NodeKind,
    /// Byte offset of the node in the input.
    pub pos: usize,
    /// Source text covered by the node; empty for `Eof`.
    pub text: String,
}

impl Node {
    pub fn new(kind: NodeKind, pos: usize, text: impl Into<String>) -> Self {
        Self {
            kind,
            pos,
            text: text.into(),
        }
    }

    pub fn end(&self) -> usize {
        self.pos + self.text.len()
    }
}

impl SyntaxNode for Node {
    fn class(&self) -> NodeClass {
        match self.kind {
            NodeKind::Clear => NodeClass::Clear,
            NodeKind::Save => NodeClass::Save,
            _ => NodeClass::Expression,
        }
    }
}
