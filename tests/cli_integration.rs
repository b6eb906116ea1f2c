use assert_cmd::Command;
use predicates::prelude::*;
use std::path::Path;
use tempfile::TempDir;

fn hanna(home: &Path) -> Command {
    let mut cmd = Command::cargo_bin("hanna").unwrap();
    cmd.env("HANNA_HOME", home)
        .env_remove("HANNA_DB")
        .env_remove("RUST_LOG")
        .env("NO_COLOR", "1");
    cmd
}

fn installed() -> TempDir {
    let temp_dir = tempfile::tempdir().unwrap();
    hanna(temp_dir.path())
        .arg("install")
        .assert()
        .success()
        .stdout(predicate::str::contains("installed"));
    temp_dir
}

#[test]
fn test_create_list_view() {
    let temp_dir = installed();

    hanna(temp_dir.path())
        .args(["create", "greeting", "-a", "first_name=Karena", "--code", "<p>Hello</p>"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Created hanna code 1: greeting"));

    hanna(temp_dir.path())
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("greeting"))
        .stdout(predicate::str::contains("HTML"));

    hanna(temp_dir.path())
        .args(["view", "greeting"])
        .assert()
        .success()
        .stdout(predicate::str::contains("first_name=Karena"))
        .stdout(predicate::str::contains("<p>Hello</p>"))
        .stdout(predicate::str::contains("hc_attr").not());
}

#[test]
fn test_code_from_stdin() {
    let temp_dir = installed();

    hanna(temp_dir.path())
        .args(["create", "piped", "--type", "js"])
        .write_stdin("console.log(1);\n")
        .assert()
        .success();

    hanna(temp_dir.path())
        .args(["view", "1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("console.log(1);"))
        .stdout(predicate::str::contains("[JS]"));
}

#[test]
fn test_duplicate_name_is_renamed() {
    let temp_dir = installed();

    for _ in 0..2 {
        hanna(temp_dir.path())
            .args(["create", "foo", "--code", "x"])
            .assert()
            .success();
    }

    hanna(temp_dir.path())
        .args(["view", "foo-1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("foo-1"));
}

#[test]
fn test_reserved_attribute_warns() {
    let temp_dir = installed();

    hanna(temp_dir.path())
        .args(["create", "r", "-a", "name=x", "--code", "x"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Disallowed attribute name: name"));

    hanna(temp_dir.path())
        .args(["view", "r"])
        .assert()
        .success()
        .stdout(predicate::str::contains("_name=x"));
}

#[test]
fn test_update_type_keeps_flag() {
    let temp_dir = installed();

    hanna(temp_dir.path())
        .args(["create", "box", "--not-consuming", "--code", "<b>x</b>"])
        .assert()
        .success();

    hanna(temp_dir.path())
        .args(["update", "box", "--type", "PHP"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Updated hanna code"));

    hanna(temp_dir.path())
        .args(["view", "box"])
        .assert()
        .success()
        .stdout(predicate::str::contains("[PHP, not consuming]"));
}

#[test]
fn test_delete_then_view_fails() {
    let temp_dir = installed();

    hanna(temp_dir.path())
        .args(["create", "gone", "--code", "x"])
        .assert()
        .success();

    hanna(temp_dir.path())
        .args(["delete", "gone"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Deleted hanna code"));

    hanna(temp_dir.path())
        .args(["view", "gone"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not found"));
}

#[test]
fn test_prepare_merges_call_site_attrs() {
    let temp_dir = installed();

    hanna(temp_dir.path())
        .args([
            "create", "greet", "-a", "first_name=Karena", "-a", "color=red", "--code", "Hi",
        ])
        .assert()
        .success();

    hanna(temp_dir.path())
        .args(["prepare", "greet", "color=blue"])
        .assert()
        .success()
        .stdout(predicate::str::contains("first_name=Karena"))
        .stdout(predicate::str::contains("color=blue"))
        .stdout(predicate::str::contains("color=red").not());
}

#[test]
fn test_export_import_between_homes() {
    let source = installed();
    let target = installed();

    hanna(source.path())
        .args(["create", "shared", "--type", "PHP", "-a", "size=3", "--code", "echo $size;"])
        .assert()
        .success();

    let output = hanna(source.path()).arg("export").output().unwrap();
    assert!(output.status.success());
    let exported = String::from_utf8(output.stdout).unwrap();
    assert!(exported.starts_with("!HannaCode:shared:"));

    let file = target.path().join("export.txt");
    std::fs::write(&file, &exported).unwrap();

    hanna(target.path())
        .arg("import")
        .arg(&file)
        .assert()
        .success()
        .stdout(predicate::str::contains("Imported hanna code"));

    hanna(target.path())
        .args(["view", "shared"])
        .assert()
        .success()
        .stdout(predicate::str::contains("size=3"))
        .stdout(predicate::str::contains("echo $size;"))
        .stdout(predicate::str::contains("[PHP]"));

    hanna(target.path())
        .arg("import")
        .write_stdin(exported)
        .assert()
        .success()
        .stdout(predicate::str::contains("Skipped existing hanna code: shared"));
}

#[test]
fn test_config_set_and_get() {
    let temp_dir = tempfile::tempdir().unwrap();

    hanna(temp_dir.path())
        .args(["config", "default_sort", "-modified"])
        .assert()
        .success()
        .stdout(predicate::str::contains("default_sort set to -modified"));

    hanna(temp_dir.path())
        .args(["config", "default_sort"])
        .assert()
        .success()
        .stdout(predicate::str::contains("-modified"));

    assert!(temp_dir.path().join("config.json").exists());
}

#[test]
fn test_not_installed_is_an_error() {
    let temp_dir = tempfile::tempdir().unwrap();

    hanna(temp_dir.path())
        .arg("list")
        .assert()
        .failure()
        .stderr(predicate::str::contains("not installed"));
}

#[test]
fn test_hanna_db_overrides_location() {
    let temp_dir = tempfile::tempdir().unwrap();
    let db_path = temp_dir.path().join("custom").join("codes.db");

    hanna(temp_dir.path())
        .env("HANNA_DB", &db_path)
        .arg("install")
        .assert()
        .success();

    assert!(db_path.exists());
    assert!(!temp_dir.path().join("hanna.sqlite").exists());
}
