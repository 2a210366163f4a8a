//! Common test utilities for actionloop integration tests
#![allow(dead_code)]

use assert_cmd::Command;
use std::path::PathBuf;
use tempfile::{tempdir, TempDir};

/// Isolated home directory holding config, workspace and cache
pub struct TestEnv {
    pub temp_dir: TempDir,
    pub data_dir: PathBuf,
    pub workspace_dir: PathBuf,
    pub cache_dir: PathBuf,
}

impl TestEnv {
    pub fn new() -> anyhow::Result<Self> {
        let temp_dir = tempdir()?;
        let data_dir = temp_dir.path().join(".actionloop");
        let workspace_dir = temp_dir.path().join("workspace");
        let cache_dir = temp_dir.path().join("cache");

        Ok(Self {
            temp_dir,
            data_dir,
            workspace_dir,
            cache_dir,
        })
    }

    pub fn config_file(&self) -> PathBuf {
        self.data_dir.join("config.json")
    }

    pub fn workspace_file(&self, name: &str) -> PathBuf {
        self.workspace_dir.join(name)
    }

    /// Command running the binary with HOME pointed at the test environment
    pub fn command(&self) -> Command {
        let mut cmd = Command::new(env!("CARGO_BIN_EXE_actionloop"));
        cmd.env("HOME", self.temp_dir.path());
        cmd.env_remove("RUST_LOG");
        cmd
    }

    /// Write a config using `api_base` as completion endpoint
    pub fn create_config(&self, api_key: &str, api_base: &str) -> anyhow::Result<()> {
        std::fs::create_dir_all(&self.data_dir)?;
        let config = format!(
            r#"{{
  "provider": {{ "api_key": "{}", "api_base": "{}" }},
  "agent": {{ "model": "test-model", "workspace": "{}", "tries": 0, "max_steps": 3 }},
  "cache": {{ "enabled": true, "dir": "{}" }}
}}"#,
            api_key,
            api_base,
            self.workspace_dir.display(),
            self.cache_dir.display()
        );
        std::fs::write(self.config_file(), config)?;
        Ok(())
    }
}

impl Default for TestEnv {
    fn default() -> Self {
        Self::new().expect("Failed to create test environment")
    }
}
