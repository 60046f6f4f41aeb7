//! Common test utilities for brn integration tests.
//!
//! Provides `TestEnv` for isolated test environments that don't touch the
//! user's `~/.brn/` directory.

#![allow(dead_code)]

use assert_cmd::Command;
pub use tempfile::TempDir;

/// A test environment with an isolated config directory and home.
///
/// Each `TestEnv` creates two temporary directories:
/// - `config_dir`: holds `config.yaml` (via `BRN_CONFIG_DIR`)
/// - `home_dir`: stands in for `$HOME` so `~` paths land in the sandbox
///
/// The `brn()` method sets both per-invocation, making tests parallel-safe.
pub struct TestEnv {
    pub config_dir: TempDir,
    pub home_dir: TempDir,
}

impl TestEnv {
    /// Create a new test environment with isolated directories.
    pub fn new() -> Self {
        Self {
            config_dir: TempDir::new().unwrap(),
            home_dir: TempDir::new().unwrap(),
        }
    }

    /// Create a test environment with `config.yaml` pre-written.
    pub fn with_yaml(yaml: &str) -> Self {
        let env = Self::new();
        std::fs::write(env.config_file(), yaml).unwrap();
        env
    }

    /// Get a Command for the brn binary with isolated config and home.
    pub fn brn(&self) -> Command {
        let mut cmd = Command::new(env!("CARGO_BIN_EXE_brn"));
        cmd.current_dir(self.home_dir.path());
        cmd.env("BRN_CONFIG_DIR", self.config_dir.path());
        cmd.env("HOME", self.home_dir.path());
        cmd.env_remove("BRN_LOG");
        cmd
    }

    /// Path of the config file inside the sandbox.
    pub fn config_file(&self) -> std::path::PathBuf {
        self.config_dir.path().join("config.yaml")
    }

    /// Raw text of the config file.
    pub fn config_text(&self) -> String {
        std::fs::read_to_string(self.config_file()).unwrap()
    }

    pub fn home(&self) -> &std::path::Path {
        self.home_dir.path()
    }
}

impl Default for TestEnv {
    fn default() -> Self {
        Self::new()
    }
}

/// Parse a command's stdout as JSON.
pub fn parse_json(output: &[u8]) -> serde_json::Value {
    serde_json::from_slice(output).unwrap()
}
