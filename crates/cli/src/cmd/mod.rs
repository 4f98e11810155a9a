//! Command implementations and the project options they share.

mod list;
mod run;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Args;

use distmatrix_lib::catalog::{CatalogConfig, TargetCatalog};
use distmatrix_lib::platform::{Arch, Os};

pub use list::cmd_list_targets;
pub use run::{Phase, cmd_run};

/// Options locating the project and shaping the target matrix.
#[derive(Debug, Clone, Args)]
pub struct ProjectArgs {
  /// Project directory containing package.json
  #[arg(long, global = true, default_value = ".")]
  pub project_dir: PathBuf,

  /// Root of the per-target distributable folders (default: <project>/npm)
  #[arg(long, global = true)]
  pub dist_dir: Option<PathBuf>,

  /// Root of the per-target compiler directories (default: <project>/target)
  #[arg(long, global = true)]
  pub build_dir: Option<PathBuf>,

  /// Directory with README.md and package.json templates (default: built-in)
  #[arg(long, global = true)]
  pub templates: Option<PathBuf>,

  /// Runtime platform to build for, e.g. linux, darwin, win32 (repeatable; default: all)
  #[arg(long = "platform", value_name = "PLATFORM", global = true)]
  pub platforms: Vec<String>,

  /// Runtime architecture to build for, e.g. x64, arm64, ia32 (repeatable; default: all)
  #[arg(long = "arch", value_name = "ARCH", global = true)]
  pub archs: Vec<String>,

  /// Concurrent compile jobs for targets that allow it (default: CPU count)
  #[arg(short, long, global = true)]
  pub jobs: Option<usize>,
}

impl ProjectArgs {
  /// Absolute project directory.
  pub fn project_dir(&self) -> Result<PathBuf> {
    dunce::canonicalize(&self.project_dir)
      .with_context(|| format!("Project directory not found: {}", self.project_dir.display()))
  }

  /// Translate the selection into catalog inputs rooted at `project_dir`.
  pub fn catalog_config(&self, project_dir: &Path) -> Result<CatalogConfig> {
    let platforms = if self.platforms.is_empty() {
      Os::ALL.to_vec()
    } else {
      self
        .platforms
        .iter()
        .map(|name| Os::from_runtime(name))
        .collect::<Result<Vec<_>, _>>()?
    };
    let archs = if self.archs.is_empty() {
      Arch::ALL.to_vec()
    } else {
      self
        .archs
        .iter()
        .map(|name| Arch::from_runtime(name))
        .collect::<Result<Vec<_>, _>>()?
    };

    Ok(CatalogConfig {
      platforms,
      archs,
      dist_dir: resolve(project_dir, self.dist_dir.as_deref(), "npm"),
      build_dir: resolve(project_dir, self.build_dir.as_deref(), "target"),
    })
  }

  /// Template directory, relative paths taken from `project_dir`.
  pub fn templates_dir(&self, project_dir: &Path) -> Option<PathBuf> {
    self
      .templates
      .as_deref()
      .map(|dir| resolve(project_dir, Some(dir), ""))
  }

  pub fn catalog(&self, project_dir: &Path) -> Result<Arc<TargetCatalog>> {
    let config = self.catalog_config(project_dir)?;
    Ok(TargetCatalog::build(&config)?)
  }
}

fn resolve(project_dir: &Path, explicit: Option<&Path>, default: &str) -> PathBuf {
  match explicit {
    Some(path) if path.is_absolute() => path.to_path_buf(),
    Some(path) => project_dir.join(path),
    None => project_dir.join(default),
  }
}
