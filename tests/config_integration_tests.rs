//! Tests for project configuration discovery and merging
use std::fs;

use clap::Parser;
use compose_language_server::config::{CheckArgs, Config, FileConfig, OutputFormat, PROJECT_CONFIG_FILE};

fn args(argv: &[&str]) -> CheckArgs {
    CheckArgs::parse_from(std::iter::once("compose-check").chain(argv.iter().copied()))
}

#[test]
fn test_project_config_found_in_ancestor() {
    let root = tempfile::tempdir().expect("tempdir");
    let nested = root.path().join("deploy").join("staging");
    fs::create_dir_all(&nested).expect("create nested dirs");
    fs::write(root.path().join(PROJECT_CONFIG_FILE), "format = \"json\"\n").expect("write config");

    let found = Config::find_project_config(&nested).expect("config found");
    assert_eq!(found, root.path().join(PROJECT_CONFIG_FILE));
}

#[test]
fn test_project_config_applied_to_check_args() {
    let root = tempfile::tempdir().expect("tempdir");
    fs::write(
        root.path().join(PROJECT_CONFIG_FILE),
        "format = \"json\"\nfail_on_warnings = true\n",
    )
    .expect("write config");

    let config = Config::from_check_args(args(&["compose.yaml"]), root.path()).expect("config");
    assert!(config.has_project_config());
    assert_eq!(config.format, OutputFormat::Json);
    assert!(config.fail_on_warnings);

    // Flags still win over the file
    let config = Config::from_check_args(args(&["--format", "text"]), root.path()).expect("config");
    assert_eq!(config.format, OutputFormat::Text);
}

#[test]
fn test_invalid_project_config_is_an_error() {
    let root = tempfile::tempdir().expect("tempdir");
    fs::write(root.path().join(PROJECT_CONFIG_FILE), "theme = \"dark\"\n").expect("write config");

    let err = Config::from_check_args(args(&[]), root.path()).unwrap_err();
    assert!(format!("{:#}", err).contains("Failed to parse config TOML"));
}

#[test]
fn test_file_config_load() {
    let root = tempfile::tempdir().expect("tempdir");
    let path = root.path().join("config.toml");
    fs::write(&path, "hide_warnings = true\n").expect("write config");

    let loaded = FileConfig::load(&path).expect("load");
    assert_eq!(loaded.hide_warnings, Some(true));
    assert_eq!(loaded.format, None);
    assert!(FileConfig::load(&root.path().join("missing.toml")).is_err());
}
