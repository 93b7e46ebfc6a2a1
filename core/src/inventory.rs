//! Inventory population: turning admitted records into hosts, groups and
//! host variables
//!
//! [`InventoryBuilder`] runs the whole pass over a record list. Per record:
//!
//! 1. admission ([`Rules::admit`]); rejected records are skipped
//! 2. records without a string `name` are skipped
//! 3. a host already present in the sink is skipped ("defined twice")
//! 4. default group `ungrouped_name`, unless `ansible.override_ungrouped`
//! 5. the record's own groups from `group_key`
//! 6. host variables, set once when the host joins its first group
//! 7. the grouping table
//!
//! Output goes through the [`InventorySink`] trait; [`MemoryInventory`] is
//! the bundled implementation and renders Ansible dynamic-inventory JSON.

use crate::{KeyPath, Map, Rules, Value};
use indexmap::{IndexMap, IndexSet};
use std::collections::HashSet;
use tracing::{debug, warn};

/// Top-level key of the dynamic inventory that holds host variables.
const RESERVED_GROUP: &str = "_meta";

// ═══════════════════════════════════════════════════════════════════════════════
// Sink
// ═══════════════════════════════════════════════════════════════════════════════

/// Receiver of inventory mutations.
pub trait InventorySink {
    /// Create a group. Called at most once per group per build.
    fn add_group(&mut self, group: &str);

    /// Add a host to a group. May be called more than once for the same pair.
    fn add_host_to_group(&mut self, host: &str, group: &str);

    /// Set (or replace) one host variable.
    fn set_variable(&mut self, host: &str, key: &str, value: Value);

    /// Returns `true` if the host has been added to any group.
    fn contains_host(&self, host: &str) -> bool;
}

/// In-memory inventory.
#[derive(Debug, Clone, Default)]
pub struct MemoryInventory {
    groups: IndexMap<String, IndexSet<String>>,
    hosts: IndexMap<String, Map>,
}

impl MemoryInventory {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Group names in creation order.
    pub fn groups(&self) -> impl Iterator<Item = &str> {
        self.groups.keys().map(String::as_str)
    }

    /// Hosts of one group in insertion order, `None` for an unknown group.
    #[must_use]
    pub fn group_hosts(&self, group: &str) -> Option<Vec<&str>> {
        self.groups
            .get(group)
            .map(|hosts| hosts.iter().map(String::as_str).collect())
    }

    /// Host names in insertion order.
    pub fn hosts(&self) -> impl Iterator<Item = &str> {
        self.hosts.keys().map(String::as_str)
    }

    #[must_use]
    pub fn host_vars(&self, host: &str) -> Option<&Map> {
        self.hosts.get(host)
    }

    /// Render as Ansible dynamic-inventory JSON (`--list` output).
    ///
    /// A group named `_meta` is not written out.
    ///
    /// ```json
    /// {
    ///   "_meta": { "hostvars": { "web01": { "ansible_host": "10.0.0.1" } } },
    ///   "all": { "children": ["ungrouped_hosts", "web"] },
    ///   "ungrouped_hosts": { "hosts": ["web01"] },
    ///   "web": { "hosts": ["web01"] }
    /// }
    /// ```
    #[must_use]
    pub fn to_ansible_json(&self) -> serde_json::Value {
        use serde_json::{json, Map as JsonMap, Value as Json};

        let hostvars: JsonMap<String, Json> = self
            .hosts
            .iter()
            .map(|(host, vars)| (host.clone(), Value::Map(vars.clone()).to_json()))
            .collect();

        let mut out = JsonMap::new();
        out.insert("_meta".into(), json!({ "hostvars": hostvars }));

        let children: Vec<&str> = self
            .groups
            .keys()
            .map(String::as_str)
            .filter(|g| *g != "all" && *g != RESERVED_GROUP)
            .collect();
        let mut all = JsonMap::new();
        all.insert("children".into(), json!(children));
        if let Some(hosts) = self.groups.get("all") {
            all.insert("hosts".into(), json!(hosts));
        }
        out.insert("all".into(), Json::Object(all));

        for (group, hosts) in self
            .groups
            .iter()
            .filter(|(g, _)| *g != "all" && *g != RESERVED_GROUP)
        {
            out.insert(group.clone(), json!({ "hosts": hosts }));
        }
        Json::Object(out)
    }
}

impl InventorySink for MemoryInventory {
    fn add_group(&mut self, group: &str) {
        self.groups.entry(group.to_string()).or_default();
    }

    fn add_host_to_group(&mut self, host: &str, group: &str) {
        self.groups
            .entry(group.to_string())
            .or_default()
            .insert(host.to_string());
        self.hosts.entry(host.to_string()).or_default();
    }

    fn set_variable(&mut self, host: &str, key: &str, value: Value) {
        self.hosts
            .entry(host.to_string())
            .or_default()
            .insert(key.to_string(), value);
    }

    fn contains_host(&self, host: &str) -> bool {
        self.hosts.contains_key(host)
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Builder
// ═══════════════════════════════════════════════════════════════════════════════

/// How admitted records become hosts.
#[derive(Debug, Clone)]
pub struct HostOptions {
    /// Path to the record's own group assignment.
    pub group_key: KeyPath,
    /// Group for every host that does not override it.
    pub ungrouped_name: String,
    /// Copy the record data (minus `ip` and `name`) into `inv_var_key`.
    pub add_inv_var: bool,
    /// Host variable that receives `vars` and the record data.
    pub inv_var_key: String,
    /// Variables merged into `inv_var_key` for every host.
    pub vars: Map,
}

impl Default for HostOptions {
    fn default() -> Self {
        Self {
            group_key: KeyPath::parse("ansible.group"),
            ungrouped_name: "ungrouped_hosts".to_string(),
            add_inv_var: true,
            inv_var_key: "yaml_list".to_string(),
            vars: Map::new(),
        }
    }
}

/// What happened to one record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordOutcome {
    /// Host added; `groups` lists every membership, grouping included.
    Added { host: String, groups: Vec<String> },
    /// Not accepted, or ignored.
    Rejected,
    /// Admitted but without a string `name`.
    Unnamed,
    /// A host of this name was already added.
    Duplicate(String),
}

/// Counts over one build.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BuildSummary {
    pub added: usize,
    pub rejected: usize,
    pub unnamed: usize,
    pub duplicates: usize,
}

/// Drives one inventory build over a sink.
///
/// The created-groups registry lives in the builder, so two builds never
/// share group state.
///
/// # Example
///
/// ```
/// use yamlist::{HostOptions, InventoryBuilder, MemoryInventory, Rules, Value};
///
/// let records: Vec<Value> = serde_yaml::from_str("
/// - name: web01
///   ip: 10.0.0.1
///   ansible: {group: web}
/// ").unwrap();
///
/// let rules = Rules::default();
/// let options = HostOptions::default();
/// let mut builder = InventoryBuilder::new(&rules, &options, MemoryInventory::new());
/// builder.add_records(&records);
///
/// let inventory = builder.into_sink();
/// assert_eq!(inventory.group_hosts("web"), Some(vec!["web01"]));
/// assert_eq!(inventory.group_hosts("ungrouped_hosts"), Some(vec!["web01"]));
/// ```
pub struct InventoryBuilder<'a, S> {
    rules: &'a Rules,
    options: &'a HostOptions,
    sink: S,
    created_groups: IndexSet<String>,
    hosts_with_vars: HashSet<String>,
}

impl<'a, S: InventorySink> InventoryBuilder<'a, S> {
    #[must_use]
    pub fn new(rules: &'a Rules, options: &'a HostOptions, sink: S) -> Self {
        Self {
            rules,
            options,
            sink,
            created_groups: IndexSet::new(),
            hosts_with_vars: HashSet::new(),
        }
    }

    #[must_use]
    pub fn sink(&self) -> &S {
        &self.sink
    }

    #[must_use]
    pub fn into_sink(self) -> S {
        self.sink
    }

    /// Groups created so far, in creation order.
    pub fn created_groups(&self) -> impl Iterator<Item = &str> {
        self.created_groups.iter().map(String::as_str)
    }

    /// Process records in order.
    pub fn add_records<'r>(
        &mut self,
        records: impl IntoIterator<Item = &'r Value>,
    ) -> BuildSummary {
        let mut summary = BuildSummary::default();
        for record in records {
            match self.add_record(record) {
                RecordOutcome::Added { .. } => summary.added += 1,
                RecordOutcome::Rejected => summary.rejected += 1,
                RecordOutcome::Unnamed => summary.unnamed += 1,
                RecordOutcome::Duplicate(_) => summary.duplicates += 1,
            }
        }
        debug!(?summary, "inventory build finished");
        summary
    }

    /// Process one record.
    pub fn add_record(&mut self, record: &Value) -> RecordOutcome {
        if !self.rules.admit(record) {
            debug!("record rejected");
            return RecordOutcome::Rejected;
        }

        let Some(host) = record.get("name").and_then(Value::as_str) else {
            warn!(
                found = record.get("name").map_or("nothing", |v| v.type_name()),
                "skipping record without a string name"
            );
            return RecordOutcome::Unnamed;
        };

        if self.sink.contains_host(host) {
            warn!(host, "host is defined twice");
            return RecordOutcome::Duplicate(host.to_string());
        }

        let mut groups = self.own_groups(record);
        groups.extend(
            self.rules
                .grouping()
                .matching(record)
                .map(str::to_string),
        );
        groups.retain(|g| {
            if g.is_empty() {
                debug!(host, "skipping empty group name");
                return false;
            }
            if g == RESERVED_GROUP {
                warn!(host, group = %g, "group name is reserved; skipping");
                return false;
            }
            true
        });

        for group in &groups {
            self.join(host, group, record);
        }

        RecordOutcome::Added {
            host: host.to_string(),
            groups,
        }
    }

    /// Default group plus the groups named under `group_key`.
    fn own_groups(&self, record: &Value) -> Vec<String> {
        let mut groups = Vec::new();
        if !overrides_ungrouped(record) {
            groups.push(self.options.ungrouped_name.clone());
        }

        match self.options.group_key.resolve(record) {
            None | Some(Value::Null) => {}
            Some(Value::List(items)) => {
                for item in items {
                    match item.scalar_text() {
                        Some(text) => groups.push(text.into_owned()),
                        None => warn!(
                            key = %self.options.group_key,
                            found = item.type_name(),
                            "group name must be a scalar"
                        ),
                    }
                }
            }
            Some(Value::String(s)) if s.contains(',') => {
                groups.extend(s.split(',').map(|g| g.trim().to_string()));
            }
            Some(Value::Map(_)) => {
                warn!(key = %self.options.group_key, "group key holds a mapping; no groups added");
            }
            Some(scalar) => {
                groups.extend(scalar.scalar_text().map(std::borrow::Cow::into_owned));
            }
        }
        groups
    }

    fn join(&mut self, host: &str, group: &str, record: &Value) {
        if !self.created_groups.contains(group) {
            self.created_groups.insert(group.to_string());
            self.sink.add_group(group);
        }
        debug!(host, group, "adding host to group");
        self.sink.add_host_to_group(host, group);

        if !self.hosts_with_vars.contains(host) {
            self.hosts_with_vars.insert(host.to_string());
            self.set_host_variables(host, record);
        }
    }

    fn set_host_variables(&mut self, host: &str, record: &Value) {
        if let Some(ip) = record.get("ip").filter(|ip| !ip.is_null()) {
            self.sink.set_variable(host, "ansible_host", ip.clone());
        }

        let mut inv_vars = self.options.vars.clone();
        if self.options.add_inv_var {
            if let Some(data) = record.as_map() {
                for (key, value) in data {
                    if key == "ip" || key == "name" {
                        continue;
                    }
                    if key == "ansible" {
                        for (ak, av) in value.as_map().into_iter().flatten() {
                            if ak.starts_with("ansible_") {
                                self.sink.set_variable(host, ak, av.clone());
                            }
                        }
                    }
                    inv_vars.insert(key.clone(), value.clone());
                }
            }
        }
        self.sink
            .set_variable(host, &self.options.inv_var_key, Value::Map(inv_vars));
    }
}

fn overrides_ungrouped(record: &Value) -> bool {
    record
        .get("ansible")
        .and_then(|a| a.get("override_ungrouped"))
        .is_some_and(Value::is_truthy_flag)
}
