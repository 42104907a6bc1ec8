//! Zappac expression language
//!
//! A small programmer's-calculator language: integer and float arithmetic,
//! bitwise operators, hex/octal/binary literals, variables and a handful of
//! commands (`clear`, `save(name)`, `load(name)`, `output(fmt)`).
//!
//! [`Zappac`] is the frontend and [`ZappacState`] the environment binding a
//! [`zappac_session::Session`] drives.

pub mod ast;
pub mod error;
pub mod eval;
pub mod lexer;
pub mod node;
pub mod parser;
pub mod state;
pub mod value;

pub use error::{ExecError, SeedError, SyntaxError};
pub use node::{Node, NodeKind};
pub use parser::parse;
pub use state::ZappacState;
pub use value::{OutputFormat, Value};

use zappac_session::{Frontend, Session};

/// The zappac language frontend.
#[derive(Debug, Clone, Copy, Default)]
pub struct Zappac;

impl Frontend for Zappac {
    type Node = Node;
    type Error = SyntaxError;

    fn parse(&self, input: &str) -> Result<Vec<Node>, SyntaxError> {
        parser::parse(input)
    }
}

pub type ZappacSession = Session<Zappac, ZappacState>;

/// Start a session whose environment is restored from `seed`.
pub fn session(seed: &str) -> ZappacSession {
    Session::new(Zappac, ZappacState::new(seed))
}
