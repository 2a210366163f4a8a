//! CLI argument parsing tests

use assert_cmd::Command;
use predicates::prelude::*;

fn actionloop() -> Command {
    Command::new(env!("CARGO_BIN_EXE_actionloop"))
}

#[test]
fn test_help_flag() {
    actionloop()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("tag-based action protocol"))
        .stdout(predicate::str::contains("--verbose"))
        .stdout(predicate::str::contains("--version"));
}

#[test]
fn test_version_flag() {
    actionloop()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("0.1.0"));
}

#[test]
fn test_no_args_shows_usage() {
    actionloop()
        .assert()
        .failure()
        .stderr(predicate::str::contains("Usage"));
}

#[test]
fn test_subcommands_listed() {
    actionloop()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("init"))
        .stdout(predicate::str::contains("status"))
        .stdout(predicate::str::contains("run"))
        .stdout(predicate::str::contains("bsm"))
        .stdout(predicate::str::contains("cache"));
}

#[test]
fn test_run_help() {
    actionloop()
        .args(["run", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("-t, --task"))
        .stdout(predicate::str::contains("--tries"))
        .stdout(predicate::str::contains("--max-steps"))
        .stdout(predicate::str::contains("--no-cache"));
}

#[test]
fn test_run_requires_task() {
    actionloop()
        .arg("run")
        .assert()
        .failure()
        .stderr(predicate::str::contains("--task"));
}

#[test]
fn test_bsm_help_defaults() {
    actionloop()
        .args(["bsm", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("-q, --question"))
        .stdout(predicate::str::contains("--answers"))
        .stdout(predicate::str::contains("[default: 2]"))
        .stdout(predicate::str::contains("[default: 3]"))
        .stdout(predicate::str::contains("--criterion"));
}

#[test]
fn test_bsm_requires_question() {
    actionloop()
        .arg("bsm")
        .assert()
        .failure()
        .stderr(predicate::str::contains("--question"));
}

#[test]
fn test_cache_subcommand_help() {
    actionloop()
        .args(["cache", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("clear"));
}

#[test]
fn test_invalid_subcommand() {
    actionloop()
        .arg("teleport")
        .assert()
        .failure()
        .stderr(predicate::str::contains("unrecognized subcommand"));
}

#[test]
fn test_invalid_answers_value() {
    actionloop()
        .args(["bsm", "-q", "why?", "--answers", "many"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid value"));
}
