//! create-dist-folders integration tests.

use predicates::prelude::*;

use super::common::TestEnv;

#[test]
fn creates_every_dist_folder() {
  let env = TestEnv::new();

  env
    .distmatrix_cmd()
    .arg("create-dist-folders")
    .assert()
    .success()
    .stdout(predicate::str::contains("Creating dist folders for 9 target(s)"));

  for suffix in [
    "linux-x64",
    "linux-arm64",
    "linux-x86",
    "macos-x64",
    "macos-arm64",
    "macos-x86",
    "windows-x64",
    "windows-arm64",
    "windows-x86",
  ] {
    assert!(env.path(&format!("npm/{suffix}/package.json")).is_file(), "{suffix}");
    assert!(env.path(&format!("npm/{suffix}/README.md")).is_file(), "{suffix}");
  }
}

#[test]
fn rendered_package_json_targets_the_runtime_names() {
  let env = TestEnv::new();

  env
    .distmatrix_cmd()
    .args(["create-dist-folders", "windows-x86"])
    .assert()
    .success();

  let package: serde_json::Value = serde_json::from_str(&env.read_file("npm/windows-x86/package.json")).unwrap();
  assert_eq!(package["name"], "@acme/walker-windows-x86");
  assert_eq!(package["version"], "1.4.0");
  assert_eq!(package["license"], "MIT");
  assert_eq!(package["os"][0], "win32");
  assert_eq!(package["cpu"][0], "ia32");

  // Only the named target is staged
  assert!(!env.path("npm/linux-x64").exists());
}

#[test]
fn staging_is_idempotent() {
  let env = TestEnv::new();

  env.distmatrix_cmd().args(["create-dist-folders", "linux-arm64"]).assert().success();
  let first = env.read_file("npm/linux-arm64/README.md");

  env.distmatrix_cmd().args(["create-dist-folders", "linux-arm64"]).assert().success();
  assert_eq!(env.read_file("npm/linux-arm64/README.md"), first);
}

#[test]
fn custom_dist_dir_and_templates() {
  let env = TestEnv::new();
  env.write_file("templates/README.md", "# {{ name }} for {{ toolchainTriple }}\n");
  env.write_file("templates/package.json", "{\"name\": \"{{ name }}-{{ targetSuffix }}\"}\n");

  env
    .distmatrix_cmd()
    .args(["create-dist-folders", "macos-arm64", "--dist-dir", "out", "--templates"])
    .arg(env.path("templates"))
    .assert()
    .success();

  assert_eq!(
    env.read_file("out/macos-arm64/README.md"),
    "# @acme/walker for aarch64-apple-darwin\n"
  );
  assert_eq!(
    env.read_file("out/macos-arm64/package.json"),
    "{\"name\": \"@acme/walker-macos-arm64\"}\n"
  );
}

#[test]
fn relative_templates_dir_is_under_the_project() {
  let env = TestEnv::new();
  env.write_file("tmpl/README.md", "{{ targetSuffix }}\n");
  env.write_file("tmpl/package.json", "{}\n");

  env
    .distmatrix_cmd()
    .args(["create-dist-folders", "linux-x64", "--templates", "tmpl"])
    .assert()
    .success();

  assert_eq!(env.read_file("npm/linux-x64/README.md"), "linux-x64\n");
}

#[test]
fn unresolved_placeholder_fails() {
  let env = TestEnv::new();
  env.write_file("templates/README.md", "{{ author }}\n");
  env.write_file("templates/package.json", "{}\n");

  env
    .distmatrix_cmd()
    .args(["create-dist-folders", "linux-x64", "--templates"])
    .arg(env.path("templates"))
    .assert()
    .failure()
    .code(1)
    .stderr(predicate::str::contains("linux-x64: unresolved placeholder 'author'"));
}

#[test]
fn unknown_target_lists_valid_targets() {
  let env = TestEnv::new();

  env
    .distmatrix_cmd()
    .args(["create-dist-folders", "linux-sparc"])
    .assert()
    .failure()
    .code(1)
    .stderr(predicate::str::contains("unknown target 'linux-sparc'"))
    .stderr(predicate::str::contains("windows-arm64"));

  assert!(!env.path("npm").exists());
}

#[test]
fn target_outside_the_selected_platforms_is_unknown() {
  let env = TestEnv::new();

  env
    .distmatrix_cmd()
    .args(["create-dist-folders", "windows-x64", "--platform", "linux"])
    .assert()
    .failure()
    .stderr(predicate::str::contains("unknown target 'windows-x64'"));
}

#[test]
fn missing_manifest_fails() {
  let env = TestEnv::empty();

  env
    .distmatrix_cmd()
    .arg("create-dist-folders")
    .assert()
    .failure()
    .stderr(predicate::str::contains("Failed to load project manifest"));
}

#[test]
fn incomplete_manifest_fails() {
  let env = TestEnv::empty();
  env.write_file("package.json", r#"{ "name": "walker", "version": "1.0.0" }"#);

  env
    .distmatrix_cmd()
    .arg("create-dist-folders")
    .assert()
    .failure()
    .stderr(predicate::str::contains("missing field"));

  assert!(!env.path("npm").exists());
}
