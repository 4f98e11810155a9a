//! Catalog, naming and pipeline behaviour across the whole matrix.

use std::collections::HashSet;
use std::sync::Arc;

use distmatrix_lib::catalog::{CatalogConfig, TargetCatalog};
use distmatrix_lib::platform::naming;

#[test]
fn catalog_entries_agree_with_the_naming_tables() {
  let catalog = TargetCatalog::build(&CatalogConfig::default()).unwrap();

  for target in catalog.targets() {
    assert_eq!(naming::runtime_to_package_os(target.runtime_platform).unwrap(), target.package_os);
    assert_eq!(naming::runtime_to_package_arch(target.runtime_arch).unwrap(), target.package_arch);
    assert_eq!(naming::package_to_runtime_os(target.package_os).unwrap(), target.runtime_platform);
    assert_eq!(naming::package_to_runtime_arch(target.package_arch).unwrap(), target.runtime_arch);
    assert_eq!(
      naming::toolchain_triple(target.package_os, target.package_arch).unwrap(),
      target.toolchain_triple
    );
    assert_eq!(target.suffix, format!("{}-{}", target.package_os, target.package_arch));
  }
}

#[test]
fn every_target_owns_its_directories() {
  let catalog = TargetCatalog::build(&CatalogConfig::default()).unwrap();

  let outputs: HashSet<_> = catalog.targets().iter().map(|t| &t.output_dir).collect();
  let builds: HashSet<_> = catalog.targets().iter().map(|t| &t.build_dir).collect();
  assert_eq!(outputs.len(), catalog.len());
  assert_eq!(builds.len(), catalog.len());
}

#[test]
fn prefixes_share_one_width() {
  let catalog = TargetCatalog::build(&CatalogConfig::default()).unwrap();
  let widest = catalog.targets().iter().map(|t| t.suffix.len()).max().unwrap();

  for target in catalog.targets() {
    assert_eq!(target.display_prefix.len(), widest + 1);
    assert_eq!(target.display_prefix.trim(), target.suffix);
  }
}

#[cfg(unix)]
mod pipeline {
  use super::*;

  use distmatrix_lib::cancel::CancellationRegistry;
  use distmatrix_lib::manifest::RootManifest;
  use distmatrix_lib::pipeline::{CommandSpec, Pipeline, PipelineConfig};
  use distmatrix_lib::platform::{Arch, Os};
  use distmatrix_lib::process::{CaptureSink, ProcessRunner, Stream};
  use distmatrix_lib::stage::DistStager;
  use distmatrix_lib::template::TemplateRenderer;
  use tempfile::TempDir;

  const MANIFEST: &str = r#"{
    "name": "walker",
    "version": "3.0.0",
    "description": "Walks trees",
    "repository": "https://example.com/walker",
    "license": "MIT"
  }"#;

  #[tokio::test]
  async fn run_all_over_a_reduced_matrix() {
    let temp = TempDir::new().unwrap();
    std::fs::write(temp.path().join("package.json"), MANIFEST).unwrap();

    let catalog = TargetCatalog::build(&CatalogConfig {
      platforms: vec![Os::Linux, Os::Windows],
      archs: vec![Arch::Arm64],
      dist_dir: temp.path().join("npm"),
      build_dir: temp.path().join("target"),
    })
    .unwrap();
    let manifest = RootManifest::load(temp.path()).unwrap();
    let sink = Arc::new(CaptureSink::new());
    let pipeline = Pipeline::new(
      catalog,
      DistStager::new(Arc::new(TemplateRenderer::default()), manifest),
      ProcessRunner::new(CancellationRegistry::new(), sink.clone()).with_cwd(temp.path()),
      PipelineConfig {
        toolchain: CommandSpec::new("sh", ["-c", "echo added $1", "sh"]),
        compile: CommandSpec::new("sh", ["-c", "echo compiled", "sh"]),
        jobs: 2,
      },
    );

    pipeline.run_all().await.unwrap();

    let lines = sink.rendered(Stream::Stdout);
    assert_eq!(lines.len(), 4);
    assert_eq!(
      lines[..2],
      [
        "  linux-arm64 added aarch64-unknown-linux-gnu",
        "windows-arm64 added aarch64-pc-windows-msvc",
      ]
    );

    // Compile order between the two pools is not fixed
    let compiled: HashSet<&str> = lines[2..].iter().map(String::as_str).collect();
    assert_eq!(
      compiled,
      HashSet::from(["  linux-arm64 compiled", "windows-arm64 compiled"])
    );
    assert!(temp.path().join("npm/linux-arm64/package.json").is_file());
    assert!(temp.path().join("npm/windows-arm64/README.md").is_file());
  }
}
