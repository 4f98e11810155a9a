//! install-rust-targets, build-node-binaries and full pipeline integration tests.
//!
//! `rustup` and `napi` are replaced by shell scripts on a private `PATH`.

use predicates::prelude::*;

use super::common::TestEnv;

#[test]
fn install_adds_each_triple() {
  let env = TestEnv::new();
  env.fake_tool("rustup", "echo \"rustup $*\"");

  env
    .distmatrix_cmd()
    .args(["install-rust-targets", "--platform", "linux"])
    .assert()
    .success()
    .stdout(predicate::str::contains("  linux-x64 rustup target add x86_64-unknown-linux-gnu"))
    .stdout(predicate::str::contains("linux-arm64 rustup target add aarch64-unknown-linux-gnu"))
    .stdout(predicate::str::contains("  linux-x86 rustup target add i686-unknown-linux-gnu"));
}

#[test]
fn build_passes_triple_and_directories() {
  let env = TestEnv::new();
  env.fake_tool("napi", "echo \"napi $*\"");
  let project = env.project_dir();

  env
    .distmatrix_cmd()
    .args(["build-node-binaries", "macos-x64"])
    .assert()
    .success()
    .stdout(predicate::str::contains(format!(
      "    macos-x64 napi build --platform --release --strip --cross-compile --target x86_64-apple-darwin \
       --target-dir {} --output-dir {}",
      project.join("target").join("macos-x64").display(),
      project.join("npm").join("macos-x64").display(),
    )));
}

#[test]
fn child_stderr_stays_on_stderr() {
  let env = TestEnv::new();
  env.fake_tool("napi", "echo compiling; echo warning: unused 1>&2");

  env
    .distmatrix_cmd()
    .args(["build-node-binaries", "linux-x64"])
    .assert()
    .success()
    .stdout(predicate::str::contains("    linux-x64 compiling"))
    .stderr(predicate::str::contains("    linux-x64 warning: unused"));
}

#[test]
fn failed_targets_are_reported_after_the_others_finish() {
  let env = TestEnv::new();
  env.fake_tool(
    "napi",
    "case \"$*\" in *aarch64-apple-darwin*) exit 7;; esac; echo finished",
  );

  env
    .distmatrix_cmd()
    .arg("build-node-binaries")
    .assert()
    .failure()
    .code(1)
    .stdout(predicate::str::contains("windows-arm64 finished"))
    .stdout(predicate::str::contains("    linux-x86 finished"))
    .stderr(predicate::str::contains("macos-arm64: 'napi"))
    .stderr(predicate::str::contains("exit code 7"))
    .stderr(predicate::str::contains("1 target(s) failed: macos-arm64"));
}

#[test]
fn missing_tool_fails_with_spawn_error() {
  let env = TestEnv::new();

  env
    .distmatrix_cmd()
    .args(["build-node-binaries", "windows-x64"])
    .assert()
    .failure()
    .stderr(predicate::str::contains("windows-x64: failed to spawn 'napi"));
}

#[test]
fn no_command_runs_the_whole_pipeline() {
  let env = TestEnv::new();
  env.fake_tool("rustup", "echo installed");
  // Fails unless the dist folder was staged first
  env.fake_tool(
    "napi",
    "while [ $# -gt 0 ]; do if [ \"$1\" = --output-dir ]; then test -f \"$2/package.json\" || exit 9; fi; shift; done; echo built",
  );

  env
    .distmatrix_cmd()
    .args(["--arch", "x64"])
    .assert()
    .success()
    .stdout(predicate::str::contains("Building all targets for 3 target(s)"))
    .stdout(predicate::str::contains("windows-x64 installed"))
    .stdout(predicate::str::contains("windows-x64 built"))
    .stdout(predicate::str::contains("✓ Done in"));

  assert!(env.path("npm/macos-x64/package.json").is_file());
  assert!(!env.path("npm/macos-arm64").exists());
}

#[test]
fn failed_install_stops_the_pipeline() {
  let env = TestEnv::new();
  env.fake_tool("rustup", "exit 1");
  env.fake_tool("napi", "echo built");

  env
    .distmatrix_cmd()
    .assert()
    .failure()
    .stdout(predicate::str::contains("built").not());

  assert!(!env.path("npm").exists());
}
