use thiserror::Error;

/// Failure of a single `exec` call.
///
/// Both kinds render as the collaborator's own message; the kind only exists
/// for logging, the session state records the text alone.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error("{0}")]
    Syntax(String),
    #[error("{0}")]
    Execution(String),
}

impl SessionError {
    pub fn kind(&self) -> &'static str {
        match self {
            SessionError::Syntax(_) => "syntax",
            SessionError::Execution(_) => "execution",
        }
    }
}
