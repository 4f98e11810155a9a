//! Root project manifest loading.

mod types;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use thiserror::Error;
use tracing::debug;

pub use types::RootManifest;

/// File name of the project manifest inside the project directory.
pub const MANIFEST_FILE: &str = "package.json";

#[derive(Debug, Error)]
pub enum ManifestError {
  #[error("failed to read manifest {}: {source}", path.display())]
  Read { path: PathBuf, source: std::io::Error },

  #[error("invalid manifest {}: {source}", path.display())]
  Invalid { path: PathBuf, source: serde_json::Error },
}

impl RootManifest {
  /// Load the manifest from `MANIFEST_FILE` in the given project directory.
  pub fn load(project_dir: &Path) -> Result<Arc<Self>, ManifestError> {
    Self::load_file(&project_dir.join(MANIFEST_FILE))
  }

  /// Load the manifest from an explicit file path.
  pub fn load_file(path: &Path) -> Result<Arc<Self>, ManifestError> {
    let content = std::fs::read_to_string(path).map_err(|source| ManifestError::Read {
      path: path.to_path_buf(),
      source,
    })?;
    let manifest = Self::parse(&content).map_err(|source| ManifestError::Invalid {
      path: path.to_path_buf(),
      source,
    })?;
    debug!(name = %manifest.name, version = %manifest.version, "loaded root manifest");
    Ok(Arc::new(manifest))
  }

  pub fn parse(content: &str) -> Result<Self, serde_json::Error> {
    serde_json::from_str(content)
  }
}
