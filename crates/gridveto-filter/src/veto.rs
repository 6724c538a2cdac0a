//! Rejection reasons.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Reason prefix for a value constraint the host does not satisfy.
pub const UNSATISFIED_VALUE: &str = "Constraint not satisfied: ";

/// Reason prefix for a limit constraint the placement would exceed.
pub const UNSATISFIED_LIMIT: &str = "Constraint not satisfied: ";

/// Reason prefix for a limit constraint on an attribute the host lacks.
pub const MISSING_LIMIT: &str = "Limit constraint not present: ";

/// Why a host was rejected. Two vetoes are equal iff their reasons are.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Veto {
    reason: String,
}

impl Veto {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }

    pub fn unsatisfied_value(constraint: &str) -> Self {
        Self::new(format!("{UNSATISFIED_VALUE}{constraint}"))
    }

    pub fn unsatisfied_limit(constraint: &str) -> Self {
        Self::new(format!("{UNSATISFIED_LIMIT}{constraint}"))
    }

    pub fn missing_limit(constraint: &str) -> Self {
        Self::new(format!("{MISSING_LIMIT}{constraint}"))
    }

    pub fn reason(&self) -> &str {
        &self.reason
    }
}

impl fmt::Display for Veto {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.reason)
    }
}
