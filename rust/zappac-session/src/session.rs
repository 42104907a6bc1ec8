//! The session controller.
//!
//! Every `exec` call runs to completion: parse, execute, then (only for
//! persisted successes) commit history and variables. Nothing is visible
//! between those steps, so callers see each call as atomic.

use serde::Serialize;
use tracing::debug;

use crate::error::SessionError;
use crate::state::{HistoryItem, SessionState};
use crate::traits::{Environment, Frontend, NodeClass, SyntaxNode};

/// Callback receiving the environment snapshot after a persisted `save`.
pub type SaveHook = Box<dyn FnMut(&str)>;

/// Result of [`Session::parse`]. `nodes` is empty whenever `error` is set.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParseOutcome<N> {
    pub nodes: Vec<N>,
    pub error: Option<String>,
}

impl<N> ParseOutcome<N> {
    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }
}

/// Result of [`Session::exec`], borrowing the live session state.
#[derive(Debug, Serialize)]
pub struct ExecOutcome<'a> {
    pub ok: bool,
    pub state: &'a SessionState,
}

/// Owns one environment binding and one session state.
///
/// Calls must be serialized by the owner; `exec` takes `&mut self` so the
/// borrow checker does that for single-threaded hosts.
pub struct Session<F, E> {
    frontend: F,
    environment: E,
    state: SessionState,
    save_hook: Option<SaveHook>,
}

impl<F, E> Session<F, E>
where
    F: Frontend,
    E: Environment<Node = F::Node>,
{
    pub fn new(frontend: F, environment: E) -> Self {
        Self {
            frontend,
            environment,
            state: SessionState::new(),
            save_hook: None,
        }
    }

    /// Register the callback fired after a persisted program containing a
    /// save command. Replaces any previously registered hook.
    pub fn on_save(&mut self, hook: impl FnMut(&str) + 'static) {
        self.save_hook = Some(Box::new(hook));
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn environment(&self) -> &E {
        &self.environment
    }

    /// Parse without touching the session. Syntax failures are reported in
    /// the outcome, never returned as `Err`.
    pub fn parse(&self, input: &str) -> ParseOutcome<F::Node> {
        match self.frontend.parse(input) {
            Ok(nodes) => ParseOutcome { nodes, error: None },
            Err(err) => ParseOutcome {
                nodes: Vec::new(),
                error: Some(err.to_string()),
            },
        }
    }

    /// Parse and execute `input`. With `persist` the result is committed to
    /// history and the variable snapshot; without it the call is a preview
    /// that only updates `last_result` / `last_error`.
    pub fn exec(&mut self, input: &str, persist: bool) -> ExecOutcome<'_> {
        let ok = match self.run(input, persist) {
            Ok(()) => true,
            Err(err) => {
                debug!(kind = err.kind(), error = %err, persist, "exec failed");
                self.state.last_error = Some(err.to_string());
                false
            }
        };
        ExecOutcome {
            ok,
            state: &self.state,
        }
    }

    fn run(&mut self, input: &str, persist: bool) -> Result<(), SessionError> {
        let nodes = self
            .frontend
            .parse(input)
            .map_err(|e| SessionError::Syntax(e.to_string()))?;

        let result = self
            .environment
            .execute(&nodes, persist)
            .map_err(|e| SessionError::Execution(e.to_string()))?;

        self.state.last_result = result.clone();
        self.state.last_error = None;

        if persist {
            self.commit(input, result, &nodes);
        }
        Ok(())
    }

    fn commit(&mut self, input: &str, result: String, nodes: &[F::Node]) {
        self.state.history.insert(0, HistoryItem::new(input, result));

        // A leading clear wipes history including the entry just added.
        if nodes.first().map(|n| n.class()) == Some(NodeClass::Clear) {
            self.state.history.clear();
        }

        self.state.variables = self
            .environment
            .variables()
            .iter()
            .map(|(name, value)| (name.clone(), value.to_string()))
            .collect();

        debug!(
            history = self.state.history.len(),
            variables = self.state.variables.len(),
            "committed"
        );

        if nodes.iter().any(|n| n.class() == NodeClass::Save) {
            if let Some(hook) = self.save_hook.as_mut() {
                hook(&self.environment.snapshot());
            }
        }
    }
}
