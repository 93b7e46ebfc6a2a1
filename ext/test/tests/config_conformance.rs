//! Inventory conformance tests: validates the inventory source loading path.
//!
//! These fixtures use the inventory source file format plus inline records
//! and check the resulting groups and host variables.
//!
//! Run with: cargo test -p yamlist-test --test config_conformance --features yamlist-test/fixtures

#![cfg(feature = "fixtures")]

use std::fs;
use std::path::{Path, PathBuf};
use yamlist_test::config_fixture::InventoryFixture;

/// Get the conformance directory relative to the workspace root.
fn fixtures_dir() -> PathBuf {
    let manifest_dir = env!("CARGO_MANIFEST_DIR");
    let ext_test = Path::new(manifest_dir);
    ext_test
        .parent() // ext
        .and_then(|p| p.parent()) // workspace root
        .expect("Could not find workspace root")
        .join("conformance")
}

/// Load and run all inventory fixtures in a directory.
fn run_inventory_fixtures(dir: &Path) {
    assert!(
        dir.exists(),
        "Inventory fixtures directory does not exist: {}",
        dir.display()
    );

    for entry in fs::read_dir(dir).expect("read dir") {
        let entry = entry.expect("dir entry");
        let path = entry.path();

        if !path
            .extension()
            .map_or(false, |e| e == "yaml" || e == "yml")
        {
            continue;
        }

        println!("Loading inventory fixture: {}", path.display());
        let yaml = fs::read_to_string(&path).expect("read yaml");
        let fixtures = InventoryFixture::from_yaml_multi(&yaml).unwrap_or_else(|e| {
            panic!("Failed to parse {}: {}", path.display(), e);
        });

        for fixture in fixtures {
            println!("  Running: {}", fixture.name);
            fixture.run_and_assert();
        }
    }
}

#[test]
fn test_inventory() {
    run_inventory_fixtures(&fixtures_dir().join("10_inventory"));
}

#[test]
fn test_inventory_config() {
    run_inventory_fixtures(&fixtures_dir().join("11_config"));
}
