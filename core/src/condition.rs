//! Condition items: conjunctions of key conditions over one host record
//!
//! A condition item is a mapping from key paths to patterns:
//!
//! ```yaml
//! - vcenter.guest_id: "~^win"     # required key, one pattern
//!   _ip: "!~^10\\."               # optional key, negative pattern
//! ```
//!
//! Every key must be satisfied for the item to match. Keys are checked in
//! written order and evaluation stops at the first failing key.
//!
//! # Key aggregation
//!
//! The host value at the key path is normalized to a list (a scalar becomes a
//! one-element list) and compared against every pattern of the key:
//!
//! - If any pattern is negative (`!` / `!~`), the key is in **negative mode**:
//!   it is satisfied iff no comparison cancels.
//! - Otherwise it is satisfied iff at least one comparison matches.
//!
//! # INV: absent optional → true
//!
//! A key written with the optional prefix (default `_`) whose path does not
//! resolve is satisfied without comparing anything. A required key whose path
//! does not resolve fails the item.

use crate::trace::{Comparison, ItemTrace, KeyTrace, KeyVerdict};
use crate::{KeyPath, MatchVerdict, Pattern, Value};
use tracing::{debug, warn};

/// One `path: patterns` entry of a condition item.
#[derive(Debug, Clone)]
pub struct ConditionKey {
    path: KeyPath,
    optional: bool,
    patterns: Vec<Pattern>,
    negative: bool,
}

impl ConditionKey {
    /// Create a key condition. Negative mode is derived from the patterns.
    #[must_use]
    pub fn new(path: KeyPath, optional: bool, patterns: Vec<Pattern>) -> Self {
        let negative = patterns.iter().any(Pattern::is_negative);
        Self {
            path,
            optional,
            patterns,
            negative,
        }
    }

    #[must_use]
    pub fn path(&self) -> &KeyPath {
        &self.path
    }

    #[must_use]
    pub fn is_optional(&self) -> bool {
        self.optional
    }

    /// Returns `true` if any pattern is negated.
    #[must_use]
    pub fn is_negative(&self) -> bool {
        self.negative
    }

    #[must_use]
    pub fn patterns(&self) -> &[Pattern] {
        &self.patterns
    }

    /// Evaluate this key against a record.
    #[must_use]
    pub fn evaluate(&self, record: &Value) -> KeyVerdict {
        let verdict = match self.path.resolve(record) {
            None if self.optional => KeyVerdict::OptionalAbsent,
            None => KeyVerdict::MissingRequired,
            Some(found) => {
                let values = found.as_values();
                let verdicts = self
                    .patterns
                    .iter()
                    .flat_map(|p| values.iter().map(move |v| p.compare(v)));
                self.aggregate(verdicts)
            }
        };
        debug!(key = %self.path, %verdict, "key evaluated");
        verdict
    }

    /// Evaluate with every comparison recorded.
    #[must_use]
    pub fn evaluate_with_trace(&self, record: &Value) -> KeyTrace {
        let mut comparisons = Vec::new();
        let verdict = match self.path.resolve(record) {
            None if self.optional => KeyVerdict::OptionalAbsent,
            None => KeyVerdict::MissingRequired,
            Some(found) => {
                let values = found.as_values();
                for pattern in &self.patterns {
                    for value in values {
                        comparisons.push(Comparison {
                            value: display_value(value),
                            pattern: pattern.to_string(),
                            verdict: pattern.compare(value),
                        });
                    }
                }
                self.aggregate(comparisons.iter().map(|c| c.verdict))
            }
        };
        KeyTrace {
            key: self.path.to_string(),
            optional: self.optional,
            negative: self.negative,
            verdict,
            comparisons,
        }
    }

    /// Shared by `evaluate` and `evaluate_with_trace` so both agree.
    fn aggregate(&self, verdicts: impl IntoIterator<Item = MatchVerdict>) -> KeyVerdict {
        let mut verdicts = verdicts.into_iter();
        let satisfied = if self.negative {
            verdicts.all(|v| !v.cancels)
        } else {
            verdicts.any(|v| v.matched)
        };
        if satisfied {
            KeyVerdict::Matched
        } else {
            KeyVerdict::Unmatched
        }
    }
}

fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => format!("{s:?}"),
        other => other.to_string(),
    }
}

/// A conjunction of [`ConditionKey`]s.
///
/// # Example
///
/// ```
/// use yamlist::{ConditionItem, ConditionKey, KeyPath, Pattern, Value};
///
/// let item = ConditionItem::new(vec![ConditionKey::new(
///     KeyPath::parse("vcenter.guest_id"),
///     false,
///     vec![Pattern::parse("~^win")],
/// )]);
///
/// let host: Value = serde_yaml::from_str("vcenter: {guest_id: windows8Server64Guest}").unwrap();
/// assert!(item.evaluate(&host));
/// ```
#[derive(Debug, Clone)]
pub struct ConditionItem {
    keys: Vec<ConditionKey>,
    invalid: Option<String>,
}

impl ConditionItem {
    #[must_use]
    pub fn new(keys: Vec<ConditionKey>) -> Self {
        Self {
            keys,
            invalid: None,
        }
    }

    /// An item that could not be compiled. It never matches.
    #[must_use]
    pub fn invalid(reason: impl Into<String>) -> Self {
        Self {
            keys: Vec::new(),
            invalid: Some(reason.into()),
        }
    }

    #[must_use]
    pub fn keys(&self) -> &[ConditionKey] {
        &self.keys
    }

    /// Why this item could not be compiled, if it could not.
    #[must_use]
    pub fn invalid_reason(&self) -> Option<&str> {
        self.invalid.as_deref()
    }

    /// Evaluate against a host record.
    ///
    /// Returns `false` for an invalid item, an item without keys, and a
    /// record that is not a mapping.
    #[must_use]
    pub fn evaluate(&self, record: &Value) -> bool {
        if let Err(reason) = self.precheck(record) {
            warn!(%reason, "condition item cannot match");
            return false;
        }
        self.keys.iter().all(|key| key.evaluate(record).passed())
    }

    /// Evaluate with full trace for debugging.
    ///
    /// `index` is the position of the item in its set, copied into the trace.
    #[must_use]
    pub fn evaluate_with_trace(&self, index: usize, record: &Value) -> ItemTrace {
        if let Err(reason) = self.precheck(record) {
            return ItemTrace {
                index,
                matched: false,
                keys: Vec::new(),
                invalid: Some(reason),
            };
        }

        let mut keys = Vec::with_capacity(self.keys.len());
        let mut matched = true;
        for key in &self.keys {
            let trace = key.evaluate_with_trace(record);
            let passed = trace.verdict.passed();
            keys.push(trace);
            if !passed {
                matched = false;
                break;
            }
        }
        ItemTrace {
            index,
            matched,
            keys,
            invalid: None,
        }
    }

    fn precheck(&self, record: &Value) -> Result<(), String> {
        if let Some(reason) = &self.invalid {
            return Err(reason.clone());
        }
        if record.as_map().is_none() {
            return Err(format!("record is a {}, not a mapping", record.type_name()));
        }
        if self.keys.is_empty() {
            return Err("item has no keys".to_string());
        }
        Ok(())
    }
}
