//! Zappac Session
//!
//! The stateful layer between a presentation layer (GUI, REPL) and an
//! expression-language engine. It turns one-shot parse/execute calls into a
//! continuous session with a result, an error line, newest-first history and
//! a snapshot of the variable bindings.
//!
//! The engine itself is a collaborator expressed through two traits:
//!
//! - [`Frontend`] turns text into an ordered sequence of [`SyntaxNode`]s.
//! - [`Environment`] executes those nodes against its variable bindings.
//!
//! [`Session`] owns one of each plus the [`SessionState`] and is the only
//! thing that ever mutates that state.

pub mod error;
pub mod session;
pub mod state;
pub mod traits;

pub use error::SessionError;
pub use session::{ExecOutcome, ParseOutcome, SaveHook, Session};
pub use state::{HistoryItem, SessionState};
pub use traits::{Environment, Frontend, NodeClass, SyntaxNode};
