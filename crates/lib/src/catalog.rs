//! The target matrix.
//!
//! [`TargetCatalog`] is the single source of truth for which targets exist.
//! It is built once from a [`CatalogConfig`], shared behind an `Arc`, and never
//! mutated afterwards; every other component looks targets up here instead of
//! re-deriving the matrix.

use std::path::PathBuf;
use std::sync::Arc;

use thiserror::Error;
use tracing::debug;

use crate::platform::naming::{self, NamingError};
use crate::platform::{Arch, Os};

#[derive(Debug, Error)]
pub enum CatalogError {
  #[error("unknown target '{suffix}' (valid targets: {})", .valid.join(", "))]
  UnknownTarget { suffix: String, valid: Vec<String> },

  #[error("target matrix is empty: at least one platform and one architecture are required")]
  Empty,

  #[error(transparent)]
  Naming(#[from] NamingError),
}

/// Inputs for building a [`TargetCatalog`].
#[derive(Debug, Clone)]
pub struct CatalogConfig {
  /// Operating systems to build for.
  pub platforms: Vec<Os>,
  /// Architectures to build for.
  pub archs: Vec<Arch>,
  /// Root under which each target gets its distributable folder.
  pub dist_dir: PathBuf,
  /// Root under which each target gets its intermediate compiler directory.
  pub build_dir: PathBuf,
}

impl Default for CatalogConfig {
  fn default() -> Self {
    Self {
      platforms: Os::ALL.to_vec(),
      archs: Arch::ALL.to_vec(),
      dist_dir: PathBuf::from("npm"),
      build_dir: PathBuf::from("target"),
    }
  }
}

/// Everything the pipeline needs to know about one target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
  pub os: Os,
  pub arch: Arch,
  /// `process.platform` value, e.g. `win32`.
  pub runtime_platform: &'static str,
  /// `process.arch` value, e.g. `ia32`.
  pub runtime_arch: &'static str,
  pub package_os: &'static str,
  pub package_arch: &'static str,
  /// Rust target triple, e.g. `x86_64-unknown-linux-gnu`.
  pub toolchain_triple: String,
  /// `{package_os}-{package_arch}`, unique within a catalog.
  pub suffix: String,
  /// Distributable folder for this target; never shared.
  pub output_dir: PathBuf,
  /// Intermediate compiler directory for this target; never shared.
  pub build_dir: PathBuf,
  /// Suffix right-aligned to the widest suffix in the catalog, plus a space.
  pub display_prefix: String,
}

/// Immutable set of targets, in platform-major order.
#[derive(Debug)]
pub struct TargetCatalog {
  targets: Vec<Target>,
}

impl TargetCatalog {
  /// Build the catalog for the cartesian product of the configured platforms
  /// and architectures.
  ///
  /// Construction runs in two passes: every entry is generated first, then the
  /// display prefixes are padded against the widest suffix of the whole set.
  pub fn build(config: &CatalogConfig) -> Result<Arc<Self>, CatalogError> {
    let platforms = dedup(&config.platforms);
    let archs = dedup(&config.archs);
    if platforms.is_empty() || archs.is_empty() {
      return Err(CatalogError::Empty);
    }

    let mut targets = Vec::with_capacity(platforms.len() * archs.len());
    for &os in &platforms {
      for &arch in &archs {
        targets.push(describe(os, arch, config)?);
      }
    }

    let width = targets.iter().map(|t| t.suffix.len()).max().unwrap_or(0);
    for target in &mut targets {
      target.display_prefix = format!("{:>width$} ", target.suffix);
    }

    debug!(count = targets.len(), width, "built target catalog");
    Ok(Arc::new(Self { targets }))
  }

  pub fn targets(&self) -> &[Target] {
    &self.targets
  }

  pub fn len(&self) -> usize {
    self.targets.len()
  }

  pub fn is_empty(&self) -> bool {
    self.targets.is_empty()
  }

  pub fn suffixes(&self) -> Vec<String> {
    self.targets.iter().map(|t| t.suffix.clone()).collect()
  }

  /// Look a target up by its suffix.
  pub fn get(&self, suffix: &str) -> Result<&Target, CatalogError> {
    self
      .targets
      .iter()
      .find(|t| t.suffix == suffix)
      .ok_or_else(|| CatalogError::UnknownTarget {
        suffix: suffix.to_string(),
        valid: self.suffixes(),
      })
  }

  /// Split targets into those that must be compiled one at a time and those
  /// that may be compiled concurrently, preserving catalog order in each.
  pub fn partition_by_concurrency(&self) -> (Vec<&Target>, Vec<&Target>) {
    self.targets.iter().partition(|t| !t.os.supports_concurrent_builds())
  }
}

fn dedup<T: Copy + PartialEq>(values: &[T]) -> Vec<T> {
  let mut out: Vec<T> = Vec::with_capacity(values.len());
  for value in values {
    if !out.contains(value) {
      out.push(*value);
    }
  }
  out
}

fn describe(os: Os, arch: Arch, config: &CatalogConfig) -> Result<Target, CatalogError> {
  let runtime_platform = os.runtime_name();
  let runtime_arch = arch.runtime_name();
  let package_os = naming::runtime_to_package_os(runtime_platform)?;
  let package_arch = naming::runtime_to_package_arch(runtime_arch)?;
  let toolchain_triple = naming::toolchain_triple(package_os, package_arch)?;
  let suffix = format!("{package_os}-{package_arch}");

  Ok(Target {
    os,
    arch,
    runtime_platform,
    runtime_arch,
    package_os,
    package_arch,
    toolchain_triple,
    output_dir: config.dist_dir.join(&suffix),
    build_dir: config.build_dir.join(&suffix),
    display_prefix: String::new(),
    suffix,
  })
}
