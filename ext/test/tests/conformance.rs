//! Conformance tests that run YAML fixtures against yamlist
//!
//! Run with: cargo test -p yamlist-test --test conformance --features yamlist-test/fixtures
//!
//! Note: This test file requires the `fixtures` feature to be enabled.

#![cfg(feature = "fixtures")]

use std::fs;
use std::path::{Path, PathBuf};
use yamlist_test::fixture::Fixture;

/// Get the conformance directory relative to the workspace root
fn fixtures_dir() -> PathBuf {
    let manifest_dir = env!("CARGO_MANIFEST_DIR");
    let ext_test = Path::new(manifest_dir);

    // Go up: ext/test -> ext -> workspace root
    let root = ext_test
        .parent() // ext
        .and_then(|p| p.parent()) // workspace root
        .expect("Could not find workspace root");

    root.join("conformance")
}

/// Load and run all fixtures in a directory
fn run_fixtures_in_dir(dir: &Path) {
    if !dir.exists() {
        panic!("Fixtures directory does not exist: {}", dir.display());
    }

    for entry in fs::read_dir(dir).expect("read dir") {
        let entry = entry.expect("dir entry");
        let path = entry.path();

        if path
            .extension()
            .map_or(false, |e| e == "yaml" || e == "yml")
        {
            println!("Running fixture: {}", path.display());

            let yaml = fs::read_to_string(&path).expect("read yaml");

            // Parse potentially multiple fixtures (separated by ---)
            let fixtures = Fixture::from_yaml_multi(&yaml).unwrap_or_else(|e| {
                panic!("Failed to parse {}: {}", path.display(), e);
            });

            for fixture in fixtures {
                println!("  Running: {}", fixture.name);
                fixture.run_and_assert();
            }
        }
    }
}

#[test]
fn test_matching() {
    run_fixtures_in_dir(&fixtures_dir().join("01_matching"));
}

#[test]
fn test_paths() {
    run_fixtures_in_dir(&fixtures_dir().join("02_paths"));
}

#[test]
fn test_admission() {
    run_fixtures_in_dir(&fixtures_dir().join("03_admission"));
}

#[test]
fn test_grouping() {
    run_fixtures_in_dir(&fixtures_dir().join("04_grouping"));
}

#[test]
fn test_malformed() {
    run_fixtures_in_dir(&fixtures_dir().join("05_malformed"));
}
