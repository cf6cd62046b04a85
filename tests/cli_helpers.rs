#![allow(dead_code)]

use anyhow::{bail, Result};
use assert_cmd::cargo;
use serde_json::Value;
use std::process::{Command, Output};
use tempfile::TempDir;

pub fn base_cmd(home: &TempDir) -> Command {
    let mut cmd = Command::new(cargo::cargo_bin!("fundwatch"));
    cmd.env("HOME", home.path());
    cmd.env("FUNDWATCH_OFFLINE", "1");
    cmd.env_remove("FUNDWATCH_SERVICE_URL");
    cmd.env_remove("RUST_LOG");
    cmd.current_dir(home.path());
    cmd.arg("--no-color");
    cmd
}

pub fn run_cmd(home: &TempDir, args: &[&str]) -> Result<Output> {
    let mut cmd = base_cmd(home);
    cmd.args(args);
    let output = cmd.output()?;
    if !output.status.success() {
        bail!(
            "command failed: {:?}\nstdout: {}\nstderr: {}",
            args,
            String::from_utf8_lossy(&output.stdout),
            String::from_utf8_lossy(&output.stderr)
        );
    }
    Ok(output)
}

pub fn run_cmd_json(home: &TempDir, args: &[&str]) -> Result<Value> {
    let output = run_cmd(home, args)?;
    let stdout = String::from_utf8(output.stdout)?;
    Ok(serde_json::from_str(&stdout)?)
}

pub fn watchlist_json(home: &TempDir) -> Result<Vec<Value>> {
    let value = run_cmd_json(home, &["--json", "watchlist", "list"])?;
    Ok(value.as_array().cloned().unwrap_or_default())
}

pub fn watchlist_codes(home: &TempDir) -> Result<Vec<String>> {
    Ok(watchlist_json(home)?
        .iter()
        .filter_map(|e| e["code"].as_str().map(str::to_string))
        .collect())
}

pub fn add_codes(home: &TempDir, codes: &str) -> Result<Value> {
    run_cmd_json(home, &["--json", "watchlist", "add", codes])
}
