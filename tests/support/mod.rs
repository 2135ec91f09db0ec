#![allow(dead_code)]

use anyhow::{Context, Result, bail};
use clinic_catalog::ProductDraft;
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tempfile::TempDir;

/// Scratch directory holding one data file; removed on drop.
pub struct TempCatalog {
    _dir: TempDir,
    pub path: PathBuf,
}

impl TempCatalog {
    pub fn empty() -> Result<Self> {
        let dir = TempDir::new().context("failed to create temp dir")?;
        let path = dir.path().join("clinic_data.json");
        Ok(Self { _dir: dir, path })
    }

    pub fn with_json(value: &Value) -> Result<Self> {
        let catalog = Self::empty()?;
        fs::write(&catalog.path, serde_json::to_string_pretty(value)?)
            .with_context(|| format!("failed to write {}", catalog.path.display()))?;
        Ok(catalog)
    }

    pub fn read_json(&self) -> Result<Value> {
        let text = fs::read_to_string(&self.path)
            .with_context(|| format!("failed to read {}", self.path.display()))?;
        Ok(serde_json::from_str(&text)?)
    }
}

pub fn draft(name: &str, source: &str, price: f64) -> ProductDraft {
    ProductDraft {
        name: name.to_string(),
        source: source.to_string(),
        is_genuine: true,
        price,
        unit: "per 支".to_string(),
    }
}

pub fn admin(data: &Path) -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_clinic-admin"));
    cmd.arg("--data")
        .arg(data)
        .args(["--user", "admin", "--password", "admin123"])
        .env_remove("CLINIC_DATA_FILE")
        .env_remove("RUST_LOG");
    cmd
}

pub fn viewer(data: &Path) -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_clinic-viewer"));
    cmd.arg("--data").arg(data).env_remove("RUST_LOG");
    cmd
}

pub fn run_command(mut cmd: Command) -> Result<Output> {
    let output = cmd
        .output()
        .with_context(|| format!("failed to spawn {cmd:?}"))?;
    if !output.status.success() {
        bail!(
            "command {cmd:?} failed with {}: {}",
            output.status,
            String::from_utf8_lossy(&output.stderr)
        );
    }
    Ok(output)
}
