//! Common test utilities for integration tests
//!
//! Each test gets its own temporary data directory so runs never share state.

#![allow(dead_code)]

use clap::Parser;
use macro_monitor_cli::{
    cli::Cli,
    commands,
    config::AppConfig,
    error::CliResult,
    storage::FileProfileRepository,
};
use serde_json::Value;
use tempfile::TempDir;

/// Test application wrapper
pub struct TestApp {
    pub dir: TempDir,
    pub config: AppConfig,
}

impl TestApp {
    pub fn new() -> Self {
        Self {
            dir: tempfile::tempdir().expect("Failed to create temp dir"),
            config: AppConfig::default(),
        }
    }

    /// Run one command and parse its JSON output
    pub fn run(&self, args: &[&str]) -> CliResult<Value> {
        let data_dir = self.dir.path().to_string_lossy().to_string();
        let mut argv = vec!["macro-monitor", "--data-dir", data_dir.as_str()];
        argv.extend_from_slice(args);

        let cli = Cli::try_parse_from(argv).expect("Arguments should parse");
        let output = commands::execute(cli, &self.config)?;
        Ok(serde_json::from_str(&output).expect("Output should be JSON"))
    }

    pub fn repository(&self) -> FileProfileRepository {
        FileProfileRepository::new(
            self.dir.path(),
            &self.config.storage.profiles_file,
            &self.config.storage.current_file,
        )
    }

    /// Create the reference profile: male, 30, 180 cm, activity 1.55
    pub fn create_sam(&self) -> String {
        let body = self
            .run(&[
                "profile", "create", "--name", "Sam", "--sex", "male", "--age", "30",
                "--height-cm", "180", "--activity", "1.55",
            ])
            .expect("Profile create should succeed");
        body["id"].as_str().expect("id should be a string").to_string()
    }
}
