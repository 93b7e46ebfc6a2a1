//! Condition sets and their compiler
//!
//! A condition set is a YAML list of condition items. It matches a record when
//! any item matches (first match wins, later items are not evaluated). An
//! empty set returns a caller-supplied default: `accept` defaults to `true`,
//! `ignore` to `false`, grouping sets to `true`.

use crate::trace::SetTrace;
use crate::{ConditionItem, ConditionKey, Diagnostic, KeyPath, Pattern, Value};
use tracing::{debug, warn};

/// Default prefix that marks a condition key as optional.
pub const DEFAULT_OPTIONAL_KEY_PREFIX: &str = "_";

/// An ordered disjunction of [`ConditionItem`]s.
#[derive(Debug, Clone, Default)]
pub struct ConditionSet {
    items: Vec<ConditionItem>,
}

impl ConditionSet {
    #[must_use]
    pub fn new(items: Vec<ConditionItem>) -> Self {
        Self { items }
    }

    /// Compile a YAML condition list with the default optional-key prefix.
    ///
    /// Diagnostics are logged at warn level and dropped; use [`Compiler`]
    /// to collect them.
    ///
    /// # Errors
    ///
    /// Returns the YAML error if `yaml` does not parse as a list.
    pub fn from_yaml(yaml: &str) -> Result<Self, serde_yaml::Error> {
        let raw: Vec<Value> = serde_yaml::from_str(yaml)?;
        let mut compiler = Compiler::default();
        let set = compiler.condition_set("conditions", &raw);
        for diagnostic in compiler.into_diagnostics() {
            warn!(%diagnostic, "condition problem");
        }
        Ok(set)
    }

    #[must_use]
    pub fn items(&self) -> &[ConditionItem] {
        &self.items
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Evaluate against a record; `default` is returned for an empty set.
    #[must_use]
    pub fn evaluate(&self, record: &Value, default: bool) -> bool {
        if self.items.is_empty() {
            debug!(default, "empty condition set");
            return default;
        }
        let hit = self.items.iter().position(|item| item.evaluate(record));
        debug!(matched_item = ?hit, "condition set evaluated");
        hit.is_some()
    }

    /// Evaluate with full trace for debugging.
    ///
    /// The trace's `matched` always equals [`evaluate`](Self::evaluate).
    #[must_use]
    pub fn evaluate_with_trace(&self, record: &Value, default: bool) -> SetTrace {
        if self.items.is_empty() {
            return SetTrace {
                matched: default,
                used_default: true,
                items: Vec::new(),
            };
        }

        let mut items = Vec::new();
        let mut matched = false;
        for (index, item) in self.items.iter().enumerate() {
            let trace = item.evaluate_with_trace(index, record);
            let hit = trace.matched;
            items.push(trace);
            if hit {
                matched = true;
                break;
            }
        }
        SetTrace {
            matched,
            used_default: false,
            items,
        }
    }
}

/// Compiles raw YAML condition lists into [`ConditionSet`]s.
///
/// Compilation never fails. Problems become [`Diagnostic`]s, and the affected
/// item or pattern compiles into something that cannot match:
///
/// - an item that is not a mapping, or that has a mapping (or nested list)
///   as a pattern, becomes [`ConditionItem::invalid`];
/// - a regex that does not compile becomes [`Pattern::InvalidRegex`].
///
/// # Example
///
/// ```
/// use yamlist::{Compiler, Value};
///
/// let raw: Vec<Value> = serde_yaml::from_str("- name: '~[unclosed'").unwrap();
/// let mut compiler = Compiler::default();
/// let set = compiler.condition_set("accept", &raw);
///
/// assert_eq!(set.len(), 1);
/// assert_eq!(compiler.diagnostics().len(), 1);
/// assert_eq!(compiler.diagnostics()[0].location, "accept[0].\"name\"");
/// ```
#[derive(Debug, Clone)]
pub struct Compiler {
    optional_key_prefix: String,
    diagnostics: Vec<Diagnostic>,
}

impl Default for Compiler {
    fn default() -> Self {
        Self::new(DEFAULT_OPTIONAL_KEY_PREFIX)
    }
}

impl Compiler {
    /// Create a compiler. An empty prefix disables optional keys.
    #[must_use]
    pub fn new(optional_key_prefix: impl Into<String>) -> Self {
        Self {
            optional_key_prefix: optional_key_prefix.into(),
            diagnostics: Vec::new(),
        }
    }

    #[must_use]
    pub fn optional_key_prefix(&self) -> &str {
        &self.optional_key_prefix
    }

    #[must_use]
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    #[must_use]
    pub fn into_diagnostics(self) -> Vec<Diagnostic> {
        self.diagnostics
    }

    /// Compile a condition list. `location` names it in diagnostics.
    pub fn condition_set(&mut self, location: &str, raw: &[Value]) -> ConditionSet {
        let items = raw
            .iter()
            .enumerate()
            .map(|(i, item)| self.item(&format!("{location}[{i}]"), item))
            .collect();
        ConditionSet::new(items)
    }

    /// Compile one condition item.
    pub fn item(&mut self, location: &str, raw: &Value) -> ConditionItem {
        let Some(map) = raw.as_map() else {
            let reason = format!("condition item must be a mapping, found a {}", raw.type_name());
            self.diagnostics.push(Diagnostic::new(location, reason.clone()));
            return ConditionItem::invalid(reason);
        };

        let mut keys = Vec::with_capacity(map.len());
        for (name, patterns) in map {
            let key_location = format!("{location}.{name:?}");
            match self.key(&key_location, name, patterns) {
                Ok(key) => keys.push(key),
                Err(reason) => {
                    self.diagnostics.push(Diagnostic::new(key_location, reason.clone()));
                    return ConditionItem::invalid(reason);
                }
            }
        }
        if keys.is_empty() {
            self.diagnostics
                .push(Diagnostic::new(location, "condition item has no keys and never matches"));
        }
        ConditionItem::new(keys)
    }

    fn key(&mut self, location: &str, name: &str, raw: &Value) -> Result<ConditionKey, String> {
        let (path, optional) = self.strip_optional(name);

        let patterns: Vec<Pattern> = match raw {
            Value::List(values) => values
                .iter()
                .map(Pattern::from_value)
                .collect::<Result<_, _>>()?,
            single => vec![Pattern::from_value(single)?],
        };

        for pattern in &patterns {
            if let Some(error) = pattern.regex_error() {
                self.diagnostics.push(Diagnostic::new(
                    location,
                    format!("invalid regex \"{pattern}\" never matches: {error}"),
                ));
            }
        }

        Ok(ConditionKey::new(KeyPath::parse(path), optional, patterns))
    }

    fn strip_optional<'k>(&self, name: &'k str) -> (&'k str, bool) {
        if self.optional_key_prefix.is_empty() {
            return (name, false);
        }
        match name.strip_prefix(self.optional_key_prefix.as_str()) {
            Some(rest) => (rest, true),
            None => (name, false),
        }
    }
}
