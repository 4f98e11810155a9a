//! Shared test helpers for CLI integration tests.

use std::path::PathBuf;

use assert_cmd::Command;
use assert_cmd::cargo::cargo_bin_cmd;
use tempfile::TempDir;

pub const PACKAGE_JSON: &str = r#"{
  "name": "@acme/walker",
  "version": "1.4.0",
  "description": "Fast repository walker",
  "repository": "https://github.com/acme/walker",
  "license": "MIT",
  "scripts": { "build": "distmatrix" }
}"#;

/// Isolated project directory.
///
/// Each test gets its own temporary project with a `package.json`, and a
/// private `bin` directory that replaces `PATH` for the spawned binary.
pub struct TestEnv {
  pub temp: TempDir,
}

impl TestEnv {
  /// Create a project with the default manifest.
  pub fn new() -> Self {
    let env = Self::empty();
    env.write_file("package.json", PACKAGE_JSON);
    env
  }

  /// Create a project without any files.
  pub fn empty() -> Self {
    let temp = TempDir::new().unwrap();
    std::fs::create_dir_all(temp.path().join("bin")).unwrap();
    Self { temp }
  }

  pub fn project_dir(&self) -> PathBuf {
    dunce::canonicalize(self.temp.path()).unwrap()
  }

  pub fn path(&self, relative_path: &str) -> PathBuf {
    self.project_dir().join(relative_path)
  }

  /// Write a file relative to the project directory.
  pub fn write_file(&self, relative_path: &str, content: &str) {
    let path = self.temp.path().join(relative_path);
    if let Some(parent) = path.parent() {
      std::fs::create_dir_all(parent).unwrap();
    }
    std::fs::write(&path, content).unwrap();
  }

  /// Read a file relative to the project directory.
  pub fn read_file(&self, relative_path: &str) -> String {
    std::fs::read_to_string(self.temp.path().join(relative_path))
      .unwrap_or_else(|e| panic!("Failed to read {}: {}", relative_path, e))
  }

  /// Install an executable shell script as `bin/<name>`.
  #[cfg(unix)]
  pub fn fake_tool(&self, name: &str, script: &str) {
    use std::os::unix::fs::PermissionsExt;

    let path = self.temp.path().join("bin").join(name);
    std::fs::write(&path, format!("#!/bin/sh\n{script}\n")).unwrap();
    std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
  }

  fn bin_dir(&self) -> PathBuf {
    self.temp.path().join("bin")
  }

  /// Get a Command for the distmatrix binary, pointed at this project.
  ///
  /// `PATH` only contains the private `bin` directory, so the real `rustup`
  /// and `napi` are never reached.
  pub fn distmatrix_cmd(&self) -> Command {
    let mut cmd: Command = cargo_bin_cmd!("distmatrix");
    cmd.env("PATH", self.bin_dir());
    cmd.env_remove("RUST_LOG");
    cmd.arg("--project-dir").arg(self.temp.path());
    cmd
  }
}
