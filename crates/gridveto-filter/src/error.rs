//! Filter error types.
//!
//! These are the exceptional outcomes of an evaluation. A host that merely
//! fails a constraint is reported with a [`Veto`](crate::Veto), never an error.

use thiserror::Error;

/// Errors that abort a constraint evaluation.
#[derive(Debug, Error)]
pub enum FilterError {
    #[error("job key must not be blank")]
    BlankJobKey,

    #[error("failed to recognize the constraint type of {0}")]
    UnrecognizedConstraint(String),

    #[error("state store error: {0}")]
    State(#[from] gridveto_state::StateError),

    #[error("collaborator error: {0}")]
    Collaborator(String),
}

pub type FilterResult<T> = Result<T, FilterError>;
