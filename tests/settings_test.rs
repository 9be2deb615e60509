//! Tests for Settings loading from TOML files

use std::fs;

use tempfile::TempDir;

use reltree::{Settings, Tree, TreeError};

#[test]
fn given_no_config_file_when_load_then_returns_defaults() {
    let settings = Settings::load(None).expect("load settings");
    assert_eq!(settings, Settings::default());
}

#[test]
fn given_missing_config_file_when_load_then_returns_defaults() {
    let dir = TempDir::new().unwrap();
    let settings = Settings::load(Some(&dir.path().join("absent.toml"))).expect("load settings");
    assert_eq!(settings, Settings::default());
}

#[test]
fn given_config_file_when_load_then_overrides_specified_keys_only() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("reltree.toml");
    fs::write(&path, "initial_capacity = 1024\n").unwrap();

    let settings = Settings::load(Some(&path)).expect("load settings");

    assert_eq!(settings.initial_capacity, 1024);
    assert_eq!(settings.verify_links, Settings::default().verify_links);
}

#[test]
fn given_malformed_config_file_when_load_then_config_error_names_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("broken.toml");
    fs::write(&path, "verify_links = = true").unwrap();

    let err = Settings::load(Some(&path)).unwrap_err();

    assert!(matches!(err, TreeError::Config(_)));
    assert!(err.to_string().contains("broken.toml"), "{}", err);
}

#[test]
fn given_verifying_settings_when_mutating_then_tree_stays_consistent() {
    let settings = Settings::from_toml_str("verify_links = true\ninitial_capacity = 4").unwrap();
    let mut tree = Tree::with_settings(settings, reltree::NoHooks);
    let r = tree.insert("r");
    let a = tree.insert_with("a", Some(r), vec![]).unwrap();
    let b = tree.insert_with("b", None, vec![a]).unwrap();

    tree.set_parent(b, Some(r)).unwrap();

    assert!(tree.settings().verify_links);
    assert_eq!(tree.get(r).unwrap().descendants(), vec![b, a]);
}
