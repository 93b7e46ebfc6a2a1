//! Admission rules: `accept`, `ignore` and the grouping table

use crate::trace::SetTrace;
use crate::{ConditionSet, Grouping, Value};
use std::fmt;
use tracing::debug;

/// The compiled condition configuration of one inventory source.
#[derive(Debug, Clone, Default)]
pub struct Rules {
    accept: ConditionSet,
    ignore: ConditionSet,
    grouping: Grouping,
}

impl Rules {
    #[must_use]
    pub fn new(accept: ConditionSet, ignore: ConditionSet, grouping: Grouping) -> Self {
        Self {
            accept,
            ignore,
            grouping,
        }
    }

    #[must_use]
    pub fn accept(&self) -> &ConditionSet {
        &self.accept
    }

    #[must_use]
    pub fn ignore(&self) -> &ConditionSet {
        &self.ignore
    }

    #[must_use]
    pub fn grouping(&self) -> &Grouping {
        &self.grouping
    }

    /// Returns `true` if the record is accepted and not ignored.
    ///
    /// `accept` defaults to `true` when empty and `ignore` to `false`.
    /// `ignore` is only evaluated for accepted records.
    #[must_use]
    pub fn admit(&self, record: &Value) -> bool {
        debug!("evaluating accept");
        if !self.accept.evaluate(record, true) {
            return false;
        }
        debug!("evaluating ignore");
        !self.ignore.evaluate(record, false)
    }

    /// Admission with the traces of both condition sets.
    #[must_use]
    pub fn explain(&self, record: &Value) -> Admission {
        let accept = self.accept.evaluate_with_trace(record, true);
        let ignore = accept
            .matched
            .then(|| self.ignore.evaluate_with_trace(record, false));
        let admitted = accept.matched && !ignore.as_ref().is_some_and(|t| t.matched);
        Admission {
            admitted,
            accept,
            ignore,
        }
    }
}

/// Result of [`Rules::explain`].
#[derive(Debug, Clone)]
pub struct Admission {
    /// Same as [`Rules::admit`].
    pub admitted: bool,
    pub accept: SetTrace,
    /// `None` when the record was not accepted.
    pub ignore: Option<SetTrace>,
}

impl fmt::Display for Admission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "admitted: {}", self.admitted)?;
        write!(f, "accept: {}", self.accept)?;
        match &self.ignore {
            Some(ignore) => write!(f, "ignore: {ignore}"),
            None => writeln!(f, "ignore: not evaluated"),
        }
    }
}
