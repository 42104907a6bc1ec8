//! Zappac CLI library.
//!
//! Shared pieces of the `zappac` binary: configuration, session bootstrap and
//! the interactive REPL.

pub mod colors;
pub mod config;
pub mod persist;
pub mod repl;
