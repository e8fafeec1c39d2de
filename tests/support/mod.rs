#![allow(dead_code)]

use std::path::{Path, PathBuf};

use assert_cmd::Command;
use serde_json::Value;
use tempfile::TempDir;

/// A temporary directory driven through the `relnotes` binary.
pub struct TestWorkspace {
    dir: TempDir,
}

impl TestWorkspace {
    pub fn new() -> Self {
        Self {
            dir: tempfile::tempdir().expect("failed to create tempdir"),
        }
    }

    /// A workspace on which `relnotes init` has already run.
    pub fn initialized() -> Self {
        let ws = Self::new();
        ws.cmd().arg("init").assert().success();
        ws
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn state_dir(&self) -> PathBuf {
        self.dir.path().join(".relnotes")
    }

    /// `relnotes --dir <workspace>`, with logging silenced.
    pub fn cmd(&self) -> Command {
        let mut cmd = Command::cargo_bin("relnotes").expect("binary");
        cmd.env_remove("RUST_LOG");
        cmd.env_remove("RELNOTES_DIR");
        cmd.arg("--dir").arg(self.dir.path());
        cmd
    }

    /// Run with `--json` and return the `data` field of the success envelope.
    pub fn json(&self, args: &[&str]) -> Value {
        let output = self
            .cmd()
            .arg("--json")
            .args(args)
            .output()
            .expect("run relnotes");
        assert!(
            output.status.success(),
            "relnotes {:?} failed: {}{}",
            args,
            String::from_utf8_lossy(&output.stdout),
            String::from_utf8_lossy(&output.stderr)
        );
        let envelope: Value = serde_json::from_slice(&output.stdout).expect("json envelope");
        assert_eq!(envelope["status"], "success");
        envelope["data"].clone()
    }

    /// Run with `--json`, expect failure, and return the error envelope.
    pub fn json_err(&self, args: &[&str]) -> (i32, Value) {
        let output = self
            .cmd()
            .arg("--json")
            .args(args)
            .output()
            .expect("run relnotes");
        assert!(!output.status.success(), "relnotes {:?} unexpectedly succeeded", args);
        let envelope: Value = serde_json::from_slice(&output.stdout).expect("json envelope");
        assert_eq!(envelope["status"], "error");
        (output.status.code().unwrap_or(-1), envelope)
    }

    /// Add a component set and return its id.
    pub fn add_component(&self, name: &str, x: f64, y: f64) -> String {
        let data = self.json(&[
            "component",
            "add",
            name,
            "--x",
            &x.to_string(),
            "--y",
            &y.to_string(),
        ]);
        data["id"].as_str().expect("component id").to_string()
    }

    /// Create a sprint and return its id.
    pub fn create_sprint(&self, name: &str) -> String {
        let data = self.json(&["sprint", "create", name]);
        data["lastSelectedSprintId"]
            .as_str()
            .expect("sprint id")
            .to_string()
    }

    /// Add a note and return its id.
    pub fn add_note(&self, sprint: &str, component: &str, tag: &str, text: &str) -> String {
        let data = self.json(&["note", "add", sprint, "--component", component, "--tag", tag, text]);
        data["note"]["id"].as_str().expect("note id").to_string()
    }

    pub fn document(&self) -> Value {
        let content = std::fs::read_to_string(self.state_dir().join("document.json"))
            .expect("read document");
        serde_json::from_str(&content).expect("parse document")
    }
}
