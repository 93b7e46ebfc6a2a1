//! Inventory fixture runner.
//!
//! Loads YAML fixtures that use the **inventory source format** (the same
//! shape as an `.list.yaml` file) together with an inline record list. This
//! tests the production pipeline: YAML → `InventoryConfig` → `compile()` →
//! `InventoryBuilder` → `MemoryInventory`.
//!
//! Unlike the [`fixture`](crate::fixture) module, which checks one record at a
//! time, these fixtures check the whole resulting inventory.

use indexmap::IndexMap;
use serde::Deserialize;
use yamlist::prelude::*;

/// An inventory test fixture.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct InventoryFixture {
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Raw inventory source; deserialized as [`InventoryConfig`] by the runner.
    pub config: serde_yaml::Value,
    /// Records, as they would appear in the data file.
    #[serde(default)]
    pub records: Vec<Value>,
    /// The config must fail to deserialize.
    #[serde(default)]
    pub expect_error: bool,
    #[serde(default)]
    pub expect: Option<Expected>,
}

/// Expected inventory contents.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Expected {
    /// Group name → hosts, in creation order. Compared exactly when present.
    #[serde(default)]
    pub groups: Option<IndexMap<String, Vec<String>>>,
    /// Host → variables that must be present with these values.
    #[serde(default)]
    pub hostvars: IndexMap<String, Map>,
    /// Hosts that must not be in the inventory.
    #[serde(default)]
    pub absent: Vec<String>,
}

impl InventoryFixture {
    /// Parse a single inventory fixture from YAML.
    pub fn from_yaml(yaml: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(yaml)
    }

    /// Parse multiple inventory fixtures from a YAML file with `---` separators.
    pub fn from_yaml_multi(yaml: &str) -> Result<Vec<Self>, serde_yaml::Error> {
        let mut fixtures = Vec::new();
        for doc in serde_yaml::Deserializer::from_str(yaml) {
            fixtures.push(Self::deserialize(doc)?);
        }
        Ok(fixtures)
    }

    /// Deserialize the config section.
    pub fn inventory_config(&self) -> Result<InventoryConfig, serde_yaml::Error> {
        serde_yaml::from_value(self.config.clone())
    }

    /// Build the inventory and panic on the first mismatch.
    pub fn run_and_assert(&self) {
        let config = self.inventory_config();
        if self.expect_error {
            assert!(
                config.is_err(),
                "Fixture '{}' expected a config error, got {:?}",
                self.name,
                config
            );
            return;
        }
        let config = config
            .unwrap_or_else(|e| panic!("Fixture '{}' has an invalid config: {e}", self.name));

        let (inventory, _) = config.compile().build(&self.records, MemoryInventory::new());
        let expect = self.expect.clone().unwrap_or_default();

        if let Some(groups) = &expect.groups {
            let actual: Vec<(String, Vec<String>)> = inventory
                .groups()
                .map(|g| {
                    let hosts = inventory
                        .group_hosts(g)
                        .unwrap_or_default()
                        .into_iter()
                        .map(str::to_string)
                        .collect();
                    (g.to_string(), hosts)
                })
                .collect();
            // IndexMap equality ignores order; creation order is part of the contract.
            let expected: Vec<(String, Vec<String>)> =
                groups.iter().map(|(g, h)| (g.clone(), h.clone())).collect();
            assert_eq!(actual, expected, "Fixture '{}': groups differ", self.name);
        }

        for (host, vars) in &expect.hostvars {
            let actual = inventory
                .host_vars(host)
                .unwrap_or_else(|| panic!("Fixture '{}': host '{host}' missing", self.name));
            for (key, value) in vars {
                assert_eq!(
                    actual.get(key),
                    Some(value),
                    "Fixture '{}': host '{host}' variable '{key}'",
                    self.name
                );
            }
        }

        for host in &expect.absent {
            assert!(
                inventory.host_vars(host).is_none(),
                "Fixture '{}': host '{host}' should be absent",
                self.name
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_and_run() {
        let fixture = InventoryFixture::from_yaml(
            "
name: basic
config:
  data_file: inline.yaml
  vars: {type: vm}
records:
  - {name: a, ip: 10.0.0.1}
expect:
  groups:
    ungrouped_hosts: [a]
  hostvars:
    a:
      ansible_host: 10.0.0.1
      yaml_list: {type: vm}
",
        )
        .unwrap();
        fixture.run_and_assert();
    }

    #[test]
    fn expect_error() {
        let fixture = InventoryFixture::from_yaml(
            "
name: unknown key
config:
  data_file: inline.yaml
  group_keys: role
expect_error: true
",
        )
        .unwrap();
        fixture.run_and_assert();
    }
}
