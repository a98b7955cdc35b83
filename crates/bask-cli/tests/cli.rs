//! CLI behavior through the real binary.

use std::fs;
use std::path::Path;

use assert_cmd::Command;
use bask::testsupport::FixtureRepo;
use predicates::prelude::*;

const DECLARATIONS: &str = r#"
context = "app"

[layout]
root = "static"
public_base = "/static/site"

[[entry]]
name = "main"
sources = ["main.js"]

[[rule]]
category = "script"
test = ['\.js$']

[[rule.transform]]
name = "babel"
"#;

/// A minimal project with one committed script entry. Returns the tag the
/// build should embed.
fn write_project(root: &Path) -> String {
    fs::create_dir_all(root.join("app")).unwrap();
    fs::write(root.join("app/main.js"), "console.log(\"boot\");\n").unwrap();
    fs::write(root.join("bask.toml"), DECLARATIONS).unwrap();

    let fixture = FixtureRepo::init(root);
    fixture.commit_all("initial import")
}

fn bask() -> Command {
    Command::cargo_bin("bask").unwrap()
}

#[test]
fn build_writes_the_output_tree() {
    let dir = tempfile::tempdir().unwrap();
    let tag = write_project(dir.path());

    bask()
        .current_dir(dir.path())
        .args(["build", "--mode", "production"])
        .assert()
        .success()
        .stdout(predicate::str::contains("main"))
        .stdout(predicate::str::contains(&tag));

    assert!(dir.path().join(format!("static/bundles/main-{tag}.js")).exists());
    assert!(dir.path().join("static/manifest.json").exists());
}

#[test]
fn mode_falls_back_to_the_environment() {
    let dir = tempfile::tempdir().unwrap();
    write_project(dir.path());

    bask()
        .current_dir(dir.path())
        .env("BASK_MODE", "production")
        .arg("build")
        .assert()
        .success()
        .stdout(predicate::str::contains("production"));
}

#[test]
fn plan_leaves_the_output_tree_untouched() {
    let dir = tempfile::tempdir().unwrap();
    let tag = write_project(dir.path());

    bask()
        .current_dir(dir.path())
        .arg("plan")
        .assert()
        .success()
        .stdout(predicate::str::contains(format!("main-{tag}.js")))
        .stdout(predicate::str::contains("babel"));

    assert!(!dir.path().join("static").exists());
}

#[test]
fn plan_json_is_machine_readable() {
    let dir = tempfile::tempdir().unwrap();
    let tag = write_project(dir.path());

    let output = bask()
        .current_dir(dir.path())
        .args(["plan", "--json"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let plan: serde_json::Value = serde_json::from_slice(&output).unwrap();
    assert_eq!(plan["version"], serde_json::json!(tag));
    assert_eq!(plan["scripts"]["main"], format!("/static/site/bundles/main-{tag}.js"));
}

#[test]
fn missing_declarations_fail_with_a_diagnostic() {
    let dir = tempfile::tempdir().unwrap();

    bask()
        .current_dir(dir.path())
        .arg("build")
        .assert()
        .failure()
        .stderr(predicate::str::contains("no build declarations"));
}

#[test]
fn missing_revision_history_fails_the_build() {
    let dir = tempfile::tempdir().unwrap();
    fs::create_dir_all(dir.path().join("app")).unwrap();
    fs::write(dir.path().join("app/main.js"), "console.log(1);\n").unwrap();
    fs::write(dir.path().join("bask.toml"), DECLARATIONS).unwrap();

    bask()
        .current_dir(dir.path())
        .arg("build")
        .assert()
        .failure()
        .stderr(predicate::str::contains("version unavailable"));
}
