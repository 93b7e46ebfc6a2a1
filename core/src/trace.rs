//! Evaluation trace types for debugging condition behavior.
//!
//! Trace types mirror the runtime types ([`ConditionSet`](crate::ConditionSet),
//! [`ConditionItem`](crate::ConditionItem), [`ConditionKey`](crate::ConditionKey))
//! but capture evaluation results instead of configuration. Use
//! `evaluate_with_trace()` to see why a host was accepted, ignored or grouped.
//!
//! # INV: trace verdict == evaluate verdict
//!
//! Within one key every comparison is recorded (no short-circuit), but items
//! and keys stop at the same point plain evaluation stops, and every
//! `matched` flag equals what `evaluate()` returns.

use crate::MatchVerdict;
use std::fmt;

/// One (host value, pattern) comparison.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Comparison {
    /// The host value (display form).
    pub value: String,
    /// The pattern as written.
    pub pattern: String,
    pub verdict: MatchVerdict,
}

/// How one condition key evaluated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyVerdict {
    /// Key present and satisfied.
    Matched,
    /// Key present but not satisfied.
    Unmatched,
    /// Optional key absent from the record; counts as satisfied.
    OptionalAbsent,
    /// Required key absent from the record.
    MissingRequired,
}

impl KeyVerdict {
    /// Returns `true` if the key lets its condition item continue.
    #[must_use]
    pub fn passed(self) -> bool {
        matches!(self, Self::Matched | Self::OptionalAbsent)
    }
}

impl fmt::Display for KeyVerdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Matched => "matched",
            Self::Unmatched => "not matched",
            Self::OptionalAbsent => "absent (optional)",
            Self::MissingRequired => "absent",
        })
    }
}

/// Trace of one condition key.
#[derive(Debug, Clone)]
pub struct KeyTrace {
    /// The key path, without the optional prefix.
    pub key: String,
    pub optional: bool,
    /// Whether the key aggregated in negative mode.
    pub negative: bool,
    pub verdict: KeyVerdict,
    /// Every comparison made (empty when the key was absent).
    pub comparisons: Vec<Comparison>,
}

/// Trace of one condition item.
#[derive(Debug, Clone)]
pub struct ItemTrace {
    /// Index of the item in its condition set (0-based).
    pub index: usize,
    pub matched: bool,
    /// Keys evaluated, in order, up to and including the first failing one.
    pub keys: Vec<KeyTrace>,
    /// Why the item could not be evaluated at all, if it could not.
    pub invalid: Option<String>,
}

/// Trace of a full [`ConditionSet`](crate::ConditionSet) evaluation.
#[derive(Debug, Clone)]
pub struct SetTrace {
    /// The final verdict (identical to what `evaluate()` returns).
    pub matched: bool,
    /// The set was empty and the caller's default was returned.
    pub used_default: bool,
    /// Items evaluated, in order. Stops after the first matching item.
    pub items: Vec<ItemTrace>,
}

impl fmt::Display for SetTrace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.used_default {
            return writeln!(f, "no conditions, default {}", self.matched);
        }
        writeln!(f, "result {}", self.matched)?;
        for item in &self.items {
            writeln!(f, "  item[{}]: {}", item.index, item.matched)?;
            if let Some(reason) = &item.invalid {
                writeln!(f, "    invalid: {reason}")?;
            }
            for key in &item.keys {
                let mode = if key.negative { " (negative)" } else { "" };
                let optional = if key.optional { "optional " } else { "" };
                writeln!(f, "    {optional}key '{}'{mode}: {}", key.key, key.verdict)?;
                for c in &key.comparisons {
                    let outcome = match (c.verdict.matched, c.verdict.cancels) {
                        (true, _) => "match",
                        (false, true) => "forbidden",
                        (false, false) => "no match",
                    };
                    writeln!(f, "      {} vs {:?}: {outcome}", c.value, c.pattern)?;
                }
            }
        }
        Ok(())
    }
}
