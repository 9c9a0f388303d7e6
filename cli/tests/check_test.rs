//! Integration tests for the `check` command.

mod common;

use common::{path, temp_file, vesper};
use predicates::prelude::*;

#[test]
fn check_valid_program() {
    let file = temp_file("x int = 1 + 2; print(x);");

    vesper()
        .args(["check", path(&file)])
        .assert()
        .success()
        .stdout(predicate::str::contains("OK"));
}

#[test]
fn check_multiple_valid_files() {
    let file1 = temp_file("print(1);");
    let file2 = temp_file("b bool = true && false;");
    let file3 = temp_file("a int[] = [1, 2, 3];");

    vesper()
        .args(["check", path(&file1), path(&file2), path(&file3)])
        .assert()
        .success()
        .stdout(predicate::str::contains("OK").count(3));
}

#[test]
fn check_does_not_run_the_program() {
    let file = temp_file("print(\"side effect\");");

    vesper()
        .args(["check", path(&file)])
        .assert()
        .success()
        .stdout(predicate::str::contains("side effect").not());
}

#[test]
fn check_type_error() {
    let file = temp_file("b bool = 1 + 2;");

    vesper()
        .args(["--no-color", "check", path(&file)])
        .assert()
        .failure()
        .stderr(predicate::str::contains("[E001]"));
}

#[test]
fn check_reports_every_error() {
    let file = temp_file("a int = true; b str = 1;");

    vesper()
        .args(["--no-color", "check", path(&file)])
        .assert()
        .failure()
        .stderr(predicate::str::contains("[E001]").count(2));
}

#[test]
fn check_parse_error() {
    let file = temp_file("x int = (1 + 2;");

    vesper()
        .args(["--no-color", "check", path(&file)])
        .assert()
        .failure()
        .stderr(predicate::str::contains("[P001]"));
}

#[test]
fn check_mixed_files_fails_but_checks_all() {
    let good = temp_file("print(1);");
    let bad = temp_file("print(missing);");

    vesper()
        .args(["--no-color", "check", path(&bad), path(&good)])
        .assert()
        .failure()
        .stdout(predicate::str::contains("OK").count(1))
        .stderr(predicate::str::contains("[E002]"));
}

#[test]
fn check_warnings_pass_unless_denied() {
    let file = temp_file("while (false) { print(1); }");

    vesper()
        .args(["--no-color", "check", path(&file)])
        .assert()
        .success()
        .stderr(predicate::str::contains("[W002] Warning:"));

    vesper()
        .args(["--no-color", "check", "--deny-warnings", path(&file)])
        .assert()
        .failure();
}

#[test]
fn check_quiet_mode() {
    let good = temp_file("print(1);");
    let bad = temp_file("x int = true;");

    vesper()
        .args(["check", "--quiet", path(&good)])
        .assert()
        .success()
        .stdout("");

    vesper()
        .args(["check", "-q", path(&bad)])
        .assert()
        .failure()
        .stdout("")
        .stderr("");
}

#[test]
fn check_from_stdin() {
    vesper()
        .args(["check", "-"])
        .write_stdin("x int = 5;")
        .assert()
        .success()
        .stdout(predicate::str::contains("<stdin>: OK"));
}

#[test]
fn check_missing_file() {
    vesper()
        .args(["check", "/nonexistent/file.vsp"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("error:"));
}

#[test]
fn check_requires_files() {
    vesper().arg("check").assert().failure();
}
