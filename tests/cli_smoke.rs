mod support;

use assert_cmd::Command;
use predicates::str::contains;

use support::TestWorkspace;

#[test]
fn relnotes_help_works() {
    Command::cargo_bin("relnotes")
        .expect("binary")
        .arg("--help")
        .assert()
        .success()
        .stdout(contains("sprint release notes"));
}

#[test]
fn subcommand_help_works() {
    let subcommands = [
        "init",
        "component",
        "sprint",
        "note",
        "publish",
        "clear",
        "export",
        "import",
        "render",
    ];

    for cmd in subcommands {
        Command::cargo_bin("relnotes")
            .expect("binary")
            .arg(cmd)
            .arg("--help")
            .assert()
            .success();
    }
}

#[test]
fn commands_require_init() {
    let ws = TestWorkspace::new();
    ws.cmd()
        .args(["sprint", "list"])
        .assert()
        .code(2)
        .stderr(contains("Not initialized"))
        .stderr(contains("relnotes init"));
}

#[test]
fn init_is_idempotent() {
    let ws = TestWorkspace::new();
    ws.cmd()
        .arg("init")
        .assert()
        .success()
        .stdout(contains("relnotes init: initialized"));
    assert!(ws.path().join(".relnotes.toml").exists());
    assert!(ws.state_dir().join("store.json").exists());

    ws.cmd()
        .arg("init")
        .assert()
        .success()
        .stdout(contains("nothing to do"));
}

#[test]
fn quiet_suppresses_human_output() {
    let ws = TestWorkspace::initialized();
    ws.cmd()
        .args(["--quiet", "sprint", "create", "v1"])
        .assert()
        .success()
        .stdout("");
}
