//! Seams to the expression-language engine.

use std::collections::BTreeMap;
use std::fmt::Display;

/// The only node classification the session acts on.
///
/// Engines usually know many more node kinds; they fold all of them that the
/// session does not care about into [`NodeClass::Expression`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeClass {
    /// Resets session history when it leads a successfully persisted program.
    Clear,
    /// Fires the registered save hook after commit.
    Save,
    Expression,
}

/// A single parsed unit of the expression language.
pub trait SyntaxNode {
    fn class(&self) -> NodeClass;
}

/// Converts raw input into an ordered sequence of syntax nodes.
pub trait Frontend {
    type Node: SyntaxNode;
    type Error: std::error::Error;

    fn parse(&self, input: &str) -> Result<Vec<Self::Node>, Self::Error>;
}

/// Holds the variable bindings and runs parsed programs against them.
pub trait Environment {
    type Node;
    type Value: Display;
    type Error: std::error::Error;

    /// Execute `nodes`, returning the display text of the result.
    ///
    /// When `persist` is false the binding must leave its variables exactly
    /// as they were before the call.
    fn execute(&mut self, nodes: &[Self::Node], persist: bool) -> Result<String, Self::Error>;

    /// Current bindings, keyed by variable name.
    fn variables(&self) -> &BTreeMap<String, Self::Value>;

    /// Opaque serialization seed that the binding can be rebuilt from.
    fn snapshot(&self) -> String;
}
