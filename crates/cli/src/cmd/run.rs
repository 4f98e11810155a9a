//! Implementation of the pipeline commands: `install-rust-targets`,
//! `create-dist-folders`, `build-node-binaries`, and the full pipeline when no
//! command is given.

use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result};
use tracing::debug;

use distmatrix_lib::cancel::{CancellationRegistry, spawn_interrupt_listener};
use distmatrix_lib::manifest::RootManifest;
use distmatrix_lib::pipeline::{Pipeline, PipelineConfig, default_jobs};
use distmatrix_lib::process::{ProcessRunner, TerminalSink};
use distmatrix_lib::stage::DistStager;
use distmatrix_lib::template::{TemplateRenderer, TemplateSource};

use super::ProjectArgs;
use crate::output::{format_elapsed, print_info, print_success};

/// Which part of the pipeline to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
  InstallToolchain,
  Stage,
  Compile,
  All,
}

impl Phase {
  fn describe(self) -> &'static str {
    match self {
      Phase::InstallToolchain => "Installing Rust targets",
      Phase::Stage => "Creating dist folders",
      Phase::Compile => "Building native binaries",
      Phase::All => "Building all targets",
    }
  }
}

/// Run one phase for `target`, or for every selected target.
pub fn cmd_run(phase: Phase, target: Option<&str>, args: &ProjectArgs) -> Result<()> {
  let start = Instant::now();

  let project_dir = args.project_dir()?;
  let catalog = args.catalog(&project_dir)?;
  let count = match target {
    Some(suffix) => {
      catalog.get(suffix)?;
      1
    }
    None => catalog.len(),
  };

  let manifest = RootManifest::load(&project_dir).context("Failed to load project manifest")?;
  let source = match args.templates_dir(&project_dir) {
    Some(dir) => TemplateSource::Dir(
      dunce::canonicalize(&dir).with_context(|| format!("Template directory not found: {}", dir.display()))?,
    ),
    None => TemplateSource::Builtin,
  };
  debug!(project = %project_dir.display(), templates = ?source, "resolved project");

  let registry = CancellationRegistry::new();
  let pipeline = Pipeline::new(
    catalog,
    DistStager::new(Arc::new(TemplateRenderer::new(source)), manifest),
    ProcessRunner::new(Arc::clone(&registry), Arc::new(TerminalSink)).with_cwd(&project_dir),
    PipelineConfig {
      jobs: args.jobs.unwrap_or_else(default_jobs),
      ..PipelineConfig::default()
    },
  );

  print_info(&format!("{} for {} target(s)", phase.describe(), count));

  let rt = tokio::runtime::Runtime::new().context("Failed to create async runtime")?;
  rt.block_on(async {
    let _listener = spawn_interrupt_listener(registry);
    match phase {
      Phase::InstallToolchain => pipeline.install_toolchain(target).await,
      Phase::Stage => pipeline.stage(target).await,
      Phase::Compile => pipeline.compile(target).await,
      Phase::All => pipeline.run_all().await,
    }
  })?;

  print_success(&format!("Done in {}", format_elapsed(start.elapsed())));
  Ok(())
}
