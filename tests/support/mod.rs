#![allow(dead_code)]

use std::cell::Cell;
use std::fs;
use std::path::{Path, PathBuf};

use assert_cmd::Command;
use chrono::{DateTime, TimeZone, Utc};
use serde_json::Value;
use tasklist::task::{Clock, IdSource};
use tempfile::TempDir;

/// Isolated home, config and data directories for one test
pub struct TestEnv {
    dir: TempDir,
}

impl TestEnv {
    pub fn init() -> std::io::Result<Self> {
        let dir = tempfile::tempdir()?;
        fs::create_dir_all(dir.path().join("home"))?;
        Ok(Self { dir })
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn data_dir(&self) -> PathBuf {
        self.dir.path().join("data")
    }

    pub fn tasks_file(&self) -> PathBuf {
        self.data_dir().join("todos.json")
    }

    pub fn write_config(&self, contents: &str) -> std::io::Result<PathBuf> {
        let path = self.dir.path().join("tasklist.toml");
        fs::write(&path, contents)?;
        Ok(path)
    }

    pub fn read_tasks(&self) -> Result<Value, Box<dyn std::error::Error>> {
        let raw = fs::read_to_string(self.tasks_file())?;
        Ok(serde_json::from_str(&raw)?)
    }

    /// Command bound to this environment's data dir, ignoring the caller's config
    pub fn cmd(&self) -> Command {
        let home = self.dir.path().join("home");
        let mut cmd = tasklist_cmd();
        cmd.env_remove("TASKLIST_CONFIG")
            .env_remove("TASKLIST_DATA_DIR")
            .env_remove("RUST_LOG")
            .env("HOME", &home)
            .env("XDG_CONFIG_HOME", home.join(".config"))
            .env("XDG_DATA_HOME", home.join(".local/share"))
            .arg("--data-dir")
            .arg(self.data_dir());
        cmd
    }

    /// Run `args` with `--json` and parse the envelope
    pub fn json(&self, args: &[&str]) -> Result<Value, Box<dyn std::error::Error>> {
        let output = self.cmd().arg("--json").args(args).output()?;
        if !output.status.success() {
            return Err(format!(
                "command {:?} failed: {}",
                args,
                String::from_utf8_lossy(&output.stdout)
            )
            .into());
        }
        Ok(serde_json::from_slice(&output.stdout)?)
    }

    /// Add a task and return its id
    pub fn add(&self, title: &str, priority: &str) -> Result<String, Box<dyn std::error::Error>> {
        let value = self.json(&["add", title, "--priority", priority])?;
        let id = value["data"]["task"]["id"]
            .as_str()
            .ok_or("missing task id")?
            .to_string();
        Ok(id)
    }
}

pub fn tasklist_cmd() -> Command {
    Command::cargo_bin("tasklist").expect("binary")
}

/// Deterministic ids: task-1, task-2, ...
#[derive(Default)]
pub struct SequenceIds(u32);

impl IdSource for SequenceIds {
    fn next_id(&mut self) -> String {
        self.0 += 1;
        format!("task-{}", self.0)
    }
}

/// Clock that advances one second per call, starting at t=1
#[derive(Default)]
pub struct StepClock(Cell<i64>);

impl Clock for StepClock {
    fn now(&self) -> DateTime<Utc> {
        let next = self.0.get() + 1;
        self.0.set(next);
        at(next)
    }
}

pub fn at(secs: i64) -> DateTime<Utc> {
    Utc.timestamp_opt(secs, 0).single().expect("valid timestamp")
}
