//! Grouping table: declared groups and the conditions that assign them

use crate::{ConditionSet, Value};
use indexmap::IndexMap;
use tracing::debug;

/// An ordered mapping from group name to [`ConditionSet`].
///
/// A record belongs to every group whose set matches it. An empty set
/// matches every record.
#[derive(Debug, Clone, Default)]
pub struct Grouping {
    groups: IndexMap<String, ConditionSet>,
}

impl Grouping {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare a group. Re-declaring a group replaces its conditions but
    /// keeps its original position.
    pub fn insert(&mut self, group: impl Into<String>, conditions: ConditionSet) {
        self.groups.insert(group.into(), conditions);
    }

    #[must_use]
    pub fn get(&self, group: &str) -> Option<&ConditionSet> {
        self.groups.get(group)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Groups in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &ConditionSet)> {
        self.groups.iter().map(|(name, set)| (name.as_str(), set))
    }

    /// Names of the groups `record` belongs to, in declaration order.
    pub fn matching<'a>(&'a self, record: &'a Value) -> impl Iterator<Item = &'a str> + 'a {
        self.groups.iter().filter_map(move |(name, set)| {
            let hit = set.evaluate(record, true);
            debug!(group = %name, hit, "grouping evaluated");
            hit.then_some(name.as_str())
        })
    }
}

impl FromIterator<(String, ConditionSet)> for Grouping {
    fn from_iter<I: IntoIterator<Item = (String, ConditionSet)>>(iter: I) -> Self {
        Self {
            groups: iter.into_iter().collect(),
        }
    }
}
