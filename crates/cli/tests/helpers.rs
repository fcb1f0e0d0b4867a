use std::fs;

use bytecode_diff::{canonicalize_or_current, load_config, parse_legacy_input};
use tempfile::tempdir;

#[test]
fn canonicalize_or_current_returns_cwd_for_dot() {
    let original = std::env::current_dir().expect("cwd");
    let tmp = tempdir().expect("tempdir");
    std::env::set_current_dir(tmp.path()).expect("chdir tmp");

    let result = canonicalize_or_current(".").expect("canonicalize").canonicalize().expect("canon");
    let expected = tmp.path().canonicalize().expect("canon tmp");
    assert_eq!(result, expected);

    std::env::set_current_dir(original).expect("restore cwd");
}

#[test]
fn canonicalize_or_current_keeps_missing_paths_relative_to_cwd() {
    let result = canonicalize_or_current("does/not/exist").expect("fallback path");
    assert!(result.is_absolute());
    assert!(result.ends_with("does/not/exist"));
}

#[test]
fn parse_legacy_input_splits_on_first_equals() {
    let input = parse_legacy_input("1.20.4=out/bytecode=v4.txt").expect("parse");
    assert_eq!(input.version, "1.20.4");
    assert_eq!(input.path, std::path::PathBuf::from("out/bytecode=v4.txt"));
}

#[test]
fn parse_legacy_input_rejects_missing_parts() {
    for arg in ["1.20.4", "=file.txt", "1.20.4=", " =file.txt"] {
        let err = parse_legacy_input(arg).unwrap_err();
        assert!(
            err.to_string().contains("Expected VERSION=PATH"),
            "unexpected error for {arg}: {err}"
        );
    }
}

#[test]
fn load_config_falls_back_to_defaults() {
    let tmp = tempdir().expect("tempdir");
    let config = load_config(tmp.path(), None).expect("defaults");
    assert_eq!(config.namespace_prefix, "net/minecraft/");
    assert_eq!(config.classes_dir, "dev/jorel/commandapi/nms");
}

#[test]
fn load_config_prefers_explicit_file() {
    let tmp = tempdir().expect("tempdir");
    fs::write(tmp.path().join("bytecode-diff.json"), r#"{"namespace_prefix": "org/bukkit/"}"#)
        .expect("write root config");
    let explicit = tmp.path().join("custom.yml");
    fs::write(&explicit, "namespace_prefix: com/mojang/\n").expect("write explicit config");

    let discovered = load_config(tmp.path(), None).expect("discovered");
    assert_eq!(discovered.namespace_prefix, "org/bukkit/");

    let explicit_path = explicit.to_string_lossy().to_string();
    let loaded = load_config(tmp.path(), Some(&explicit_path)).expect("explicit");
    assert_eq!(loaded.namespace_prefix, "com/mojang/");
}

#[test]
fn load_config_errors_on_missing_explicit_file() {
    let tmp = tempdir().expect("tempdir");
    let missing = tmp.path().join("absent.yaml").to_string_lossy().to_string();
    let err = load_config(tmp.path(), Some(&missing)).unwrap_err();
    assert!(err.to_string().contains("Failed to load config"), "unexpected error: {err}");
}
