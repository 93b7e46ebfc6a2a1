//! Inventory source configuration
//!
//! An inventory source is a small YAML (or JSON) file naming the records file
//! and the conditions to apply to it:
//!
//! ```yaml
//! plugin: yaml_list
//! data_file: /path/to/hosts.yaml
//! accept:
//!   - vcenter.uuid: "~.*a$"
//! ignore:
//!   - state: poweredOff
//!   - ip: null
//! grouping:
//!   windows:
//!     - vcenter.guest_id: "~^win"
//! vars:
//!   type: vm
//! ```
//!
//! [`InventoryConfig`] is the serde view of that file, and
//! [`InventoryConfig::compile`] turns it into [`Rules`] and [`HostOptions`].

use crate::condition_set::DEFAULT_OPTIONAL_KEY_PREFIX;
use crate::error::{Error, Result};
use crate::inventory::{BuildSummary, InventoryBuilder, InventorySink};
use crate::{parse_bool_flag, Compiler, Diagnostic, HostOptions, KeyPath, Map, Rules, Value};
use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize};
use std::path::{Path, PathBuf};

/// File name suffixes that mark a file as an inventory source.
pub const INVENTORY_SOURCE_SUFFIXES: [&str; 2] = [".list.yaml", ".list.yml"];

/// Returns `true` if `path` has an inventory source suffix.
#[must_use]
pub fn is_inventory_source(path: impl AsRef<Path>) -> bool {
    path.as_ref()
        .file_name()
        .and_then(|name| name.to_str())
        .is_some_and(|name| INVENTORY_SOURCE_SUFFIXES.iter().any(|s| name.ends_with(s)))
}

/// The inventory source file.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct InventoryConfig {
    /// Plugin name; accepted for compatibility and otherwise unused.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plugin: Option<String>,
    /// Path to the records file.
    pub data_file: PathBuf,
    /// Path to each record's own group assignment.
    #[serde(default = "default_group_key")]
    pub group_key: String,
    /// Add the record data as a host variable.
    #[serde(default = "default_true", deserialize_with = "deserialize_flag")]
    pub add_inv_var: bool,
    /// Name of that host variable.
    #[serde(default = "default_inv_var_key")]
    pub inv_var_key: String,
    /// Default group for every host.
    #[serde(default = "default_ungrouped_name")]
    pub ungrouped_name: String,
    /// Conditions a record must match (empty accepts all).
    #[serde(default)]
    pub accept: Vec<Value>,
    /// Conditions that drop an accepted record (empty ignores none).
    #[serde(default)]
    pub ignore: Vec<Value>,
    /// Prefix that marks a condition key as optional.
    #[serde(default = "default_optional_key_prefix")]
    pub optional_key_prefix: String,
    /// Ordered group name -> conditions.
    #[serde(default)]
    pub grouping: IndexMap<String, Vec<Value>>,
    /// Variables added to every host.
    #[serde(default)]
    pub vars: Map,
}

fn default_group_key() -> String {
    "ansible.group".to_string()
}

fn default_true() -> bool {
    true
}

fn default_inv_var_key() -> String {
    "yaml_list".to_string()
}

fn default_ungrouped_name() -> String {
    "ungrouped_hosts".to_string()
}

fn default_optional_key_prefix() -> String {
    DEFAULT_OPTIONAL_KEY_PREFIX.to_string()
}

/// Accept `true`/`false` and the `yes`/`no` spellings of older YAML.
fn deserialize_flag<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> std::result::Result<bool, D::Error> {
    match Value::deserialize(deserializer)? {
        Value::Bool(b) => Ok(b),
        Value::String(s) => parse_bool_flag(&s)
            .ok_or_else(|| serde::de::Error::custom(format!("expected a boolean, found \"{s}\""))),
        other => Err(serde::de::Error::custom(format!(
            "expected a boolean, found a {}",
            other.type_name()
        ))),
    }
}

impl InventoryConfig {
    /// Create a configuration with all defaults.
    #[must_use]
    pub fn new(data_file: impl Into<PathBuf>) -> Self {
        Self {
            plugin: None,
            data_file: data_file.into(),
            group_key: default_group_key(),
            add_inv_var: true,
            inv_var_key: default_inv_var_key(),
            ungrouped_name: default_ungrouped_name(),
            accept: Vec::new(),
            ignore: Vec::new(),
            optional_key_prefix: default_optional_key_prefix(),
            grouping: IndexMap::new(),
            vars: Map::new(),
        }
    }

    /// Load from a file. `.json` files are parsed as JSON, anything else
    /// as YAML.
    ///
    /// # Errors
    ///
    /// [`Error::Io`], [`Error::Yaml`] or [`Error::Json`].
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| Error::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let is_json = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));

        if is_json {
            serde_json::from_str(&content).map_err(|source| Error::Json {
                path: path.to_path_buf(),
                source,
            })
        } else {
            Self::from_yaml(&content).map_err(|source| Error::Yaml {
                path: path.to_path_buf(),
                source,
            })
        }
    }

    /// Parse YAML configuration text.
    ///
    /// # Errors
    ///
    /// Returns the YAML error for invalid YAML, unknown keys and values of
    /// the wrong type.
    pub fn from_yaml(content: &str) -> std::result::Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(content)
    }

    /// Compile conditions and host options.
    ///
    /// Never fails; problems are returned as diagnostics.
    #[must_use]
    pub fn compile(&self) -> CompiledConfig {
        let mut compiler = Compiler::new(self.optional_key_prefix.as_str());
        let accept = compiler.condition_set("accept", &self.accept);
        let ignore = compiler.condition_set("ignore", &self.ignore);
        let grouping = self
            .grouping
            .iter()
            .map(|(group, conditions)| {
                let set = compiler.condition_set(&format!("grouping.{group:?}"), conditions);
                (group.clone(), set)
            })
            .collect();

        CompiledConfig {
            rules: Rules::new(accept, ignore, grouping),
            options: HostOptions {
                group_key: KeyPath::parse(&self.group_key),
                ungrouped_name: self.ungrouped_name.clone(),
                add_inv_var: self.add_inv_var,
                inv_var_key: self.inv_var_key.clone(),
                vars: self.vars.clone(),
            },
            diagnostics: compiler.into_diagnostics(),
        }
    }
}

/// Output of [`InventoryConfig::compile`].
#[derive(Debug, Clone)]
pub struct CompiledConfig {
    pub rules: Rules,
    pub options: HostOptions,
    /// Warnings found while compiling conditions.
    pub diagnostics: Vec<Diagnostic>,
}

impl CompiledConfig {
    /// Run one inventory build over `records` into `sink`.
    pub fn build<S: InventorySink>(&self, records: &[Value], sink: S) -> (S, BuildSummary) {
        let mut builder = InventoryBuilder::new(&self.rules, &self.options, sink);
        let summary = builder.add_records(records);
        (builder.into_sink(), summary)
    }
}
