//! Non-fatal problems found while compiling conditions.

use std::fmt;

/// A warning-level problem in a condition set.
///
/// Diagnostics never stop compilation. The offending pattern or item is
/// compiled into a form that evaluates as a mismatch, and the rest of the
/// configuration keeps working.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    /// Where the problem is, e.g. `ignore[1]."name"`.
    pub location: String,
    /// What is wrong with it.
    pub message: String,
}

impl Diagnostic {
    #[must_use]
    pub fn new(location: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            location: location.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.location, self.message)
    }
}
