//! Inventory builder integration tests.
//!
//! Drive an `InventoryBuilder` over a `RecordingSink` and check the exact
//! sequence of group creations, memberships and variables.

use yamlist::{BuildSummary, HostOptions, InventoryBuilder, RecordOutcome, Rules};
use yamlist_test::prelude::*;

fn rules(accept: &str, ignore: &str, grouping: &[(&str, &str)]) -> Rules {
    Rules::new(
        ConditionSet::from_yaml(accept).unwrap(),
        ConditionSet::from_yaml(ignore).unwrap(),
        grouping
            .iter()
            .map(|(g, yaml)| ((*g).to_string(), ConditionSet::from_yaml(yaml).unwrap()))
            .collect(),
    )
}

fn build(rules: &Rules, options: &HostOptions, records: &[Value]) -> (RecordingSink, BuildSummary) {
    let mut builder = InventoryBuilder::new(rules, options, RecordingSink::new());
    let summary = builder.add_records(records);
    (builder.into_sink(), summary)
}

fn sample() -> Vec<Value> {
    vec![
        TestHost::new("dc1-prd-jenkins01")
            .with("ip", "192.168.1.102")
            .with("state", "poweredOn")
            .with_list("ansible.group", &["jenkins", "team1"])
            .with("vcenter.guest_id", "centos64Guest")
            .build(),
        TestHost::new("dc1-prd-rdp03")
            .with("ip", "192.168.1.103")
            .with("state", "poweredOn")
            .with("vcenter.guest_id", "windows8Server64Guest")
            .build(),
        TestHost::new("dc1-prd-old01")
            .with("ip", "192.168.1.104")
            .with("state", "poweredOff")
            .build(),
        TestHost::unnamed().with("ip", "192.168.1.200").build(),
    ]
}

#[test]
fn groups_are_created_before_first_use() {
    let rules = rules(
        "[]",
        "- state: poweredOff",
        &[("windows", "- vcenter.guest_id: '~^win'")],
    );
    let (sink, summary) = build(&rules, &HostOptions::default(), &sample());

    assert_eq!(
        summary,
        BuildSummary {
            added: 2,
            rejected: 1,
            unnamed: 1,
            duplicates: 0,
        }
    );
    assert_eq!(sink.groups(), ["ungrouped_hosts", "jenkins", "team1", "windows"]);
    assert_eq!(
        sink.memberships(),
        [
            ("dc1-prd-jenkins01", "ungrouped_hosts"),
            ("dc1-prd-jenkins01", "jenkins"),
            ("dc1-prd-jenkins01", "team1"),
            ("dc1-prd-rdp03", "ungrouped_hosts"),
            ("dc1-prd-rdp03", "windows"),
        ]
    );

    // Every AddGroup precedes the first AddHost into that group.
    for (i, call) in sink.calls.iter().enumerate() {
        if let SinkCall::AddHost { group, .. } = call {
            let created = sink.calls[..i]
                .iter()
                .any(|c| matches!(c, SinkCall::AddGroup(g) if g == group));
            assert!(created, "group '{group}' used before creation");
        }
    }
}

#[test]
fn variables_are_set_once_per_host() {
    let rules = rules("[]", "[]", &[("linux", "- vcenter.guest_id: '~^centos'")]);
    let (sink, _) = build(&rules, &HostOptions::default(), &sample()[..1]);

    let vars: Vec<&str> = sink
        .variables("dc1-prd-jenkins01")
        .into_iter()
        .map(|(k, _)| k)
        .collect();
    assert_eq!(vars, ["ansible_host", "yaml_list"]);

    // Variables follow the first membership, before the second one.
    let first_var = sink
        .calls
        .iter()
        .position(|c| matches!(c, SinkCall::SetVariable { .. }))
        .unwrap();
    assert!(matches!(
        &sink.calls[first_var - 1],
        SinkCall::AddHost { group, .. } if group == "ungrouped_hosts"
    ));
}

#[test]
fn inventory_variable_holds_vars_then_record() {
    let mut vars = Map::new();
    vars.insert("site".into(), Value::from("dc1"));
    let options = HostOptions {
        vars,
        ..HostOptions::default()
    };
    let records = [TestHost::new("a")
        .with("ip", "10.0.0.1")
        .with("state", "poweredOn")
        .build()];
    let (sink, _) = build(&Rules::default(), &options, &records);

    let (_, data) = sink
        .variables("a")
        .into_iter()
        .find(|(k, _)| *k == "yaml_list")
        .unwrap();
    let keys: Vec<&str> = data.as_map().unwrap().keys().map(String::as_str).collect();
    assert_eq!(keys, ["site", "state"]);
}

#[test]
fn duplicate_record_is_reported() {
    let records = [
        TestHost::new("a").with("ip", "10.0.0.1").build(),
        TestHost::new("a").with("ip", "10.0.0.2").build(),
    ];
    let rules = Rules::default();
    let options = HostOptions::default();
    let mut builder = InventoryBuilder::new(&rules, &options, RecordingSink::new());

    assert!(matches!(builder.add_record(&records[0]), RecordOutcome::Added { .. }));
    assert_eq!(
        builder.add_record(&records[1]),
        RecordOutcome::Duplicate("a".to_string())
    );

    let sink = builder.into_sink();
    let ips: Vec<&Value> = sink
        .variables("a")
        .into_iter()
        .filter(|(k, _)| *k == "ansible_host")
        .map(|(_, v)| v)
        .collect();
    assert_eq!(ips, [&Value::from("10.0.0.1")]);
}

#[test]
fn override_ungrouped_without_groups_adds_nothing() {
    let records = [TestHost::new("a")
        .with("ansible.override_ungrouped", true)
        .build()];
    let (sink, summary) = build(&Rules::default(), &HostOptions::default(), &records);

    assert_eq!(summary.added, 1);
    assert!(sink.calls.is_empty());
}

#[test]
fn empty_group_names_are_skipped() {
    let records = [TestHost::new("a").with("ansible.group", "web,,db").build()];
    let (sink, _) = build(&Rules::default(), &HostOptions::default(), &records);
    assert_eq!(sink.groups(), ["ungrouped_hosts", "web", "db"]);
}

#[test]
fn memory_inventory_renders_dynamic_inventory_json() {
    let rules = rules("[]", "- state: poweredOff", &[]);
    let options = HostOptions::default();
    let mut builder = InventoryBuilder::new(&rules, &options, MemoryInventory::new());
    builder.add_records(&sample());
    let json = builder.into_sink().to_ansible_json();

    let top: Vec<&str> = json.as_object().unwrap().keys().map(String::as_str).collect();
    assert_eq!(top, ["_meta", "all", "ungrouped_hosts", "jenkins", "team1"]);
    assert_eq!(
        json["ungrouped_hosts"]["hosts"],
        serde_json::json!(["dc1-prd-jenkins01", "dc1-prd-rdp03"])
    );
    assert_eq!(
        json["_meta"]["hostvars"]["dc1-prd-rdp03"]["yaml_list"]["vcenter"]["guest_id"],
        "windows8Server64Guest"
    );
}
