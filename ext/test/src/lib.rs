//! yamlist-test: test helpers and conformance fixtures
//!
//! Provides a host record builder and a recording [`InventorySink`] for
//! testing condition sets and inventory builds.
//!
//! # Example
//!
//! ```
//! use yamlist_test::prelude::*;
//!
//! let host = TestHost::new("web01")
//!     .with("ip", "10.0.0.1")
//!     .with("vcenter.guest_id", "centos64Guest");
//!
//! let path = KeyPath::parse("vcenter.guest_id");
//! assert_eq!(path.resolve(host.record()), Some(&Value::from("centos64Guest")));
//! ```

use yamlist::{InventorySink, Map, Value};

#[cfg(feature = "fixtures")]
pub mod config_fixture;

/// Host record builder.
///
/// Keys given to [`with`](Self::with) are dotted paths; intermediate
/// mappings are created as needed.
#[derive(Debug, Clone)]
pub struct TestHost {
    record: Value,
}

impl TestHost {
    /// A record with only a `name`.
    #[must_use]
    pub fn new(name: &str) -> Self {
        let mut map = Map::new();
        map.insert("name".to_string(), Value::from(name));
        Self {
            record: Value::Map(map),
        }
    }

    /// A record with no keys at all.
    #[must_use]
    pub fn unnamed() -> Self {
        Self {
            record: Value::Map(Map::new()),
        }
    }

    /// Set the value at a dotted path (builder pattern).
    #[must_use]
    pub fn with(mut self, path: &str, value: impl Into<Value>) -> Self {
        let keys: Vec<&str> = path.split('.').collect();
        if let Some(map) = self.record.as_map_mut() {
            insert_path(map, &keys, value.into());
        }
        self
    }

    /// Set a list of strings at a dotted path.
    #[must_use]
    pub fn with_list(self, path: &str, items: &[&str]) -> Self {
        let list = items.iter().map(|s| Value::from(*s)).collect::<Vec<_>>();
        self.with(path, list)
    }

    #[must_use]
    pub fn record(&self) -> &Value {
        &self.record
    }

    #[must_use]
    pub fn build(self) -> Value {
        self.record
    }
}

fn insert_path(map: &mut Map, keys: &[&str], value: Value) {
    match keys {
        [] => {}
        [last] => {
            map.insert((*last).to_string(), value);
        }
        [first, rest @ ..] => {
            let child = map
                .entry((*first).to_string())
                .or_insert_with(|| Value::Map(Map::new()));
            if child.as_map().is_none() {
                *child = Value::Map(Map::new());
            }
            if let Some(inner) = child.as_map_mut() {
                insert_path(inner, rest, value);
            }
        }
    }
}

/// One call made on a [`RecordingSink`].
#[derive(Debug, Clone, PartialEq)]
pub enum SinkCall {
    AddGroup(String),
    AddHost { host: String, group: String },
    SetVariable { host: String, key: String, value: Value },
}

/// Records every sink call in order.
///
/// Host presence follows [`SinkCall::AddHost`] calls only, the same rule
/// [`yamlist::MemoryInventory`] uses.
#[derive(Debug, Clone, Default)]
pub struct RecordingSink {
    pub calls: Vec<SinkCall>,
}

impl RecordingSink {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Groups created, in order.
    #[must_use]
    pub fn groups(&self) -> Vec<&str> {
        self.calls
            .iter()
            .filter_map(|c| match c {
                SinkCall::AddGroup(g) => Some(g.as_str()),
                _ => None,
            })
            .collect()
    }

    /// `(host, group)` memberships, in order.
    #[must_use]
    pub fn memberships(&self) -> Vec<(&str, &str)> {
        self.calls
            .iter()
            .filter_map(|c| match c {
                SinkCall::AddHost { host, group } => Some((host.as_str(), group.as_str())),
                _ => None,
            })
            .collect()
    }

    /// Variables set for `host`, in order.
    #[must_use]
    pub fn variables(&self, host: &str) -> Vec<(&str, &Value)> {
        self.calls
            .iter()
            .filter_map(|c| match c {
                SinkCall::SetVariable { host: h, key, value } if h == host => {
                    Some((key.as_str(), value))
                }
                _ => None,
            })
            .collect()
    }
}

impl InventorySink for RecordingSink {
    fn add_group(&mut self, group: &str) {
        self.calls.push(SinkCall::AddGroup(group.to_string()));
    }

    fn add_host_to_group(&mut self, host: &str, group: &str) {
        self.calls.push(SinkCall::AddHost {
            host: host.to_string(),
            group: group.to_string(),
        });
    }

    fn set_variable(&mut self, host: &str, key: &str, value: Value) {
        self.calls.push(SinkCall::SetVariable {
            host: host.to_string(),
            key: key.to_string(),
            value,
        });
    }

    fn contains_host(&self, host: &str) -> bool {
        self.calls
            .iter()
            .any(|c| matches!(c, SinkCall::AddHost { host: h, .. } if h == host))
    }
}

/// Prelude for convenient imports.
pub mod prelude {
    pub use super::{RecordingSink, SinkCall, TestHost};
    pub use yamlist::prelude::*;
}

#[cfg(test)]
mod tests {
    use super::*;
    use yamlist::{HostOptions, InventoryBuilder, KeyPath, Rules};

    #[test]
    fn test_host_nested_paths() {
        let host = TestHost::new("a")
            .with("vcenter.guest_id", "centos64Guest")
            .with("vcenter.uuid", "x")
            .with_list("ansible.group", &["web", "db"]);
        let record = host.record();
        assert_eq!(
            KeyPath::parse("vcenter.uuid").resolve(record),
            Some(&Value::from("x"))
        );
        assert_eq!(
            KeyPath::parse("ansible.group").resolve(record).map(|v| v.as_values().len()),
            Some(2)
        );
    }

    #[test]
    fn test_host_overwrites_scalar_parent() {
        let host = TestHost::new("a").with("ip", "1.2.3.4").with("ip.v4", "1.2.3.4");
        assert!(host.record().get("ip").is_some_and(|v| v.as_map().is_some()));
    }

    #[test]
    fn recording_sink_order() {
        let rules = Rules::default();
        let options = HostOptions::default();
        let mut builder = InventoryBuilder::new(&rules, &options, RecordingSink::new());
        let records = vec![
            TestHost::new("a").with("ip", "1.1.1.1").build(),
            TestHost::new("b").build(),
        ];
        builder.add_records(&records);
        let sink = builder.into_sink();

        assert_eq!(sink.groups(), ["ungrouped_hosts"]);
        assert_eq!(
            sink.memberships(),
            [("a", "ungrouped_hosts"), ("b", "ungrouped_hosts")]
        );
        let vars: Vec<_> = sink.variables("a").into_iter().map(|(k, _)| k).collect();
        assert_eq!(vars, ["ansible_host", "yaml_list"]);
    }
}
