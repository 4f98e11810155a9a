//! Per-target distributable folders.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, info};

use crate::catalog::Target;
use crate::manifest::RootManifest;
use crate::template::{self, RenderContext, TemplateError, TemplateRenderer};

/// Files rendered into every target folder, by template name.
pub const STAGED_FILES: [&str; 2] = [template::README, template::PACKAGE_JSON];

#[derive(Debug, Error)]
pub enum StageError {
  #[error("failed to create directory {}: {source}", path.display())]
  CreateDir { path: PathBuf, source: std::io::Error },

  #[error("failed to write {}: {source}", path.display())]
  WriteFile { path: PathBuf, source: std::io::Error },

  #[error(transparent)]
  Template(#[from] TemplateError),
}

/// Creates and fills the distributable folder of a target.
#[derive(Debug, Clone)]
pub struct DistStager {
  renderer: Arc<TemplateRenderer>,
  manifest: Arc<RootManifest>,
}

impl DistStager {
  pub fn new(renderer: Arc<TemplateRenderer>, manifest: Arc<RootManifest>) -> Self {
    Self { renderer, manifest }
  }

  pub fn manifest(&self) -> &RootManifest {
    &self.manifest
  }

  /// Render every staged file for `target` into its output folder.
  ///
  /// Safe to repeat: the folder is created if missing and files are
  /// overwritten. Returns the written paths.
  pub async fn stage(&self, target: &Target) -> Result<Vec<PathBuf>, StageError> {
    let dir = &target.output_dir;
    tokio::fs::create_dir_all(dir).await.map_err(|source| StageError::CreateDir {
      path: dir.clone(),
      source,
    })?;

    let context = RenderContext::for_target(&self.manifest, target);
    let mut written = Vec::with_capacity(STAGED_FILES.len());
    for name in STAGED_FILES {
      let content = self.renderer.render(name, &context)?;
      let path = dir.join(name);
      write_file(&path, &content).await?;
      debug!(suffix = %target.suffix, path = %path.display(), "wrote staged file");
      written.push(path);
    }

    info!(suffix = %target.suffix, dir = %dir.display(), "staged distributable folder");
    Ok(written)
  }
}

async fn write_file(path: &Path, content: &str) -> Result<(), StageError> {
  tokio::fs::write(path, content)
    .await
    .map_err(|source| StageError::WriteFile {
      path: path.to_path_buf(),
      source,
    })
}
