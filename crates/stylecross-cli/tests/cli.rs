// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Integration tests for the stylecross binary.

#![allow(missing_docs, clippy::unwrap_used)]

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::Value;
use tempfile::TempDir;

const STYLE: &str = r##"{
  "version": 8,
  "layers": [
    { "id": "background", "type": "background", "paint": { "background-color": "#f8f4f0" } },
    { "id": "water", "type": "fill", "source": "openmaptiles", "source-layer": "water",
      "paint": { "fill-color": "#a0c8f0" } },
    { "id": "road", "type": "line", "source": "openmaptiles", "source-layer": "transportation",
      "paint": { "line-color": "#fff", "line-width": { "base": 1.4, "stops": [[6, 0.5], [8, 2]] } } }
  ]
}"##;

const BROKEN_LAYER: &str = r#"{ "layers": [ { "id": "hills", "type": "hillshade" } ] }"#;

/// Command with an isolated config dir so stored prefs never leak between tests.
fn stylecross(config: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("stylecross").unwrap();
    cmd.env("STYLECROSS_CONFIG_DIR", config.path()).env_remove("RUST_LOG");
    cmd
}

#[test]
fn converts_stdin_to_yaml() {
    let config = TempDir::new().unwrap();
    stylecross(&config)
        .arg("convert")
        .write_stdin(STYLE)
        .assert()
        .success()
        .stdout(predicate::str::contains("background:\n    color: \"#f8f4f0\""))
        .stdout(predicate::str::contains("data: { source: openmaptiles, layer: water }"))
        .stdout(predicate::str::contains("[6, 0.5px]"));
}

#[test]
fn converts_file_to_json_file() {
    let config = TempDir::new().unwrap();
    let work = TempDir::new().unwrap();
    let input = work.path().join("style.json");
    let output = work.path().join("scene.json");
    std::fs::write(&input, STYLE).unwrap();

    stylecross(&config)
        .args(["convert", "--json", "--global-colors", "-o"])
        .arg(&output)
        .arg(&input)
        .assert()
        .success()
        .stdout(predicate::str::is_empty());

    let scene: Value = serde_json::from_str(&std::fs::read_to_string(&output).unwrap()).unwrap();
    assert_eq!(scene["global"]["color"]["water"], "#a0c8f0");
    assert_eq!(scene["layers"]["water"]["draw"]["polygons"]["color"], "global.color.water");
}

#[test]
fn diagnostics_go_to_stderr_and_strict_fails() {
    let config = TempDir::new().unwrap();
    stylecross(&config)
        .arg("convert")
        .write_stdin(BROKEN_LAYER)
        .assert()
        .success()
        .stderr(predicate::str::contains("hillshade"));

    stylecross(&config)
        .args(["convert", "--strict"])
        .write_stdin(BROKEN_LAYER)
        .assert()
        .failure()
        .stderr(predicate::str::contains("diagnostic"));
}

#[test]
fn malformed_input_fails() {
    let config = TempDir::new().unwrap();
    stylecross(&config)
        .arg("convert")
        .write_stdin("{ not json")
        .assert()
        .failure()
        .stderr(predicate::str::contains("parse style JSON"));

    stylecross(&config)
        .arg("convert")
        .write_stdin(r#"{ "version": 8 }"#)
        .assert()
        .failure()
        .stderr(predicate::str::contains("layers"));
}

#[test]
fn missing_input_file_fails_with_context() {
    let config = TempDir::new().unwrap();
    stylecross(&config)
        .args(["convert", "does-not-exist.json"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("does-not-exist.json"));
}

#[test]
fn saved_prefs_apply_to_later_runs() {
    let config = TempDir::new().unwrap();
    stylecross(&config)
        .args(["prefs", "--save", "--preset", "plain", "--default-source", "tiles"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"default_source\": \"tiles\""));
    assert!(config.path().join("prefs.json").exists());

    stylecross(&config)
        .arg("prefs")
        .assert()
        .success()
        .stdout(predicate::str::contains("\"flow_level\": 100"));

    stylecross(&config)
        .arg("convert")
        .write_stdin(r##"{ "layers": [ { "id": "land", "type": "fill", "paint": { "fill-color": "#eee" } } ] }"##)
        .assert()
        .success()
        .stdout(predicate::str::contains("source: tiles"))
        .stdout(predicate::str::contains("data:\n"));
}

#[test]
fn config_file_overrides_stored_prefs() {
    let config = TempDir::new().unwrap();
    let work = TempDir::new().unwrap();
    let file = work.path().join("layout.json");
    std::fs::write(&file, r#"{ "emit": { "quote": "'" } }"#).unwrap();

    stylecross(&config)
        .args(["convert", "--config"])
        .arg(&file)
        .write_stdin(STYLE)
        .assert()
        .success()
        .stdout(predicate::str::contains("color: '#f8f4f0'"));
}

#[test]
fn unknown_dialect_is_rejected() {
    let config = TempDir::new().unwrap();
    stylecross(&config)
        .args(["convert", "--dialect", "bogus"])
        .write_stdin(STYLE)
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown dialect"));
}
