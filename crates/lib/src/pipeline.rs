//! Build pipeline across the target matrix.
//!
//! The pipeline has three phases, each available on its own or for the whole
//! catalog:
//!
//! 1. **Toolchain install**: add the compiler target for each triple, one
//!    target at a time.
//! 2. **Staging**: render the distributable folder of every target,
//!    concurrently.
//! 3. **Compile**: build the native module for every target. Targets whose
//!    cross toolchain cannot run concurrently share a pool with one permit;
//!    all others share a pool sized by [`PipelineConfig::jobs`]. Both pools
//!    run at the same time, and within a pool targets start in catalog order.
//!
//! A failing target never stops its siblings. Once every target of a phase
//! has finished, the phase reports all failures together as
//! [`PipelineError::TargetsFailed`].

use std::sync::Arc;

use thiserror::Error;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{error, info};

use crate::catalog::{CatalogError, Target, TargetCatalog};
use crate::process::{ProcessError, ProcessRunner};
use crate::stage::{DistStager, StageError};

#[derive(Debug, Error)]
pub enum PipelineError {
  #[error(transparent)]
  Catalog(#[from] CatalogError),

  #[error(transparent)]
  Stage(#[from] StageError),

  #[error(transparent)]
  Process(#[from] ProcessError),

  #[error("target task panicked: {0}")]
  TaskPanicked(String),

  #[error("{} target(s) failed: {}", .0.len(), failed_suffixes(.0))]
  TargetsFailed(Vec<TargetFailure>),
}

fn failed_suffixes(failures: &[TargetFailure]) -> String {
  failures.iter().map(|f| f.suffix.as_str()).collect::<Vec<_>>().join(", ")
}

/// A target that failed during a phase.
#[derive(Debug)]
pub struct TargetFailure {
  pub suffix: String,
  pub error: PipelineError,
}

/// An external command; per-target arguments are appended to `args`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
  pub program: String,
  pub args: Vec<String>,
}

impl CommandSpec {
  pub fn new(program: impl Into<String>, args: impl IntoIterator<Item = impl Into<String>>) -> Self {
    Self {
      program: program.into(),
      args: args.into_iter().map(Into::into).collect(),
    }
  }

  /// `rustup target add`
  pub fn rustup_target_add() -> Self {
    Self::new("rustup", ["target", "add"])
  }

  /// `napi build`
  pub fn napi_build() -> Self {
    Self::new("napi", ["build"])
  }
}

#[derive(Debug, Clone)]
pub struct PipelineConfig {
  /// Installs the compiler target; receives the triple.
  pub toolchain: CommandSpec,
  /// Compiles one target; receives the triple and the target's directories.
  pub compile: CommandSpec,
  /// Permits of the concurrent compile pool.
  pub jobs: usize,
}

impl Default for PipelineConfig {
  fn default() -> Self {
    Self {
      toolchain: CommandSpec::rustup_target_add(),
      compile: CommandSpec::napi_build(),
      jobs: default_jobs(),
    }
  }
}

/// Number of logical CPUs, or 1 if it cannot be determined.
pub fn default_jobs() -> usize {
  std::thread::available_parallelism().map(|n| n.get()).unwrap_or(1)
}

/// Drives the three phases over a shared catalog.
#[derive(Debug)]
pub struct Pipeline {
  catalog: Arc<TargetCatalog>,
  stager: DistStager,
  runner: ProcessRunner,
  config: PipelineConfig,
}

impl Pipeline {
  pub fn new(catalog: Arc<TargetCatalog>, stager: DistStager, runner: ProcessRunner, config: PipelineConfig) -> Self {
    Self {
      catalog,
      stager,
      runner,
      config,
    }
  }

  pub fn catalog(&self) -> &Arc<TargetCatalog> {
    &self.catalog
  }

  pub fn config(&self) -> &PipelineConfig {
    &self.config
  }

  /// Resolve the selected target, or every target when none is named.
  fn select(&self, suffix: Option<&str>) -> Result<Vec<Target>, PipelineError> {
    match suffix {
      Some(suffix) => Ok(vec![self.catalog.get(suffix)?.clone()]),
      None => Ok(self.catalog.targets().to_vec()),
    }
  }

  /// Install the compiler target for one target or, sequentially, for all.
  pub async fn install_toolchain(&self, suffix: Option<&str>) -> Result<(), PipelineError> {
    let targets = self.select(suffix)?;
    let mut failures = Vec::new();

    for target in &targets {
      info!(suffix = %target.suffix, triple = %target.toolchain_triple, "installing toolchain target");
      let args = toolchain_args(&self.config.toolchain, target);
      if let Err(e) = self
        .runner
        .run(&self.config.toolchain.program, &args, &target.display_prefix)
        .await
      {
        error!(suffix = %target.suffix, error = %e, "toolchain install failed");
        failures.push(TargetFailure {
          suffix: target.suffix.clone(),
          error: e.into(),
        });
      }
    }

    finish("toolchain install", failures)
  }

  /// Stage the distributable folder of one target or, concurrently, of all.
  pub async fn stage(&self, suffix: Option<&str>) -> Result<(), PipelineError> {
    let targets = self.select(suffix)?;
    let mut join_set = JoinSet::new();

    for target in &targets {
      let stager = self.stager.clone();
      let target = target.clone();
      join_set.spawn(async move {
        let result = stager.stage(&target).await.map(drop).map_err(PipelineError::from);
        (target.suffix, result)
      });
    }

    let failures = collect(join_set, &targets, "staging").await;
    finish("staging", failures)
  }

  /// Compile one target or every target, through the two pools.
  pub async fn compile(&self, suffix: Option<&str>) -> Result<(), PipelineError> {
    let targets = self.select(suffix)?;
    let (serialized, concurrent): (Vec<Target>, Vec<Target>) = targets
      .iter()
      .cloned()
      .partition(|t| !t.os.supports_concurrent_builds());
    let serial = Arc::new(Semaphore::new(1));
    let parallel = Arc::new(Semaphore::new(self.config.jobs.max(1)));

    let (serial_set, parallel_set) = tokio::join!(
      self.feed(serial, &serialized),
      self.feed(parallel, &concurrent)
    );

    let mut failures = collect(serial_set, &serialized, "compile").await;
    failures.extend(collect(parallel_set, &concurrent, "compile").await);
    failures.sort_by_key(|f| targets.iter().position(|t| t.suffix == f.suffix));
    finish("compile", failures)
  }

  /// Start compile tasks for `targets` in order, each once it holds a permit.
  ///
  /// Returns when the last task has been started.
  async fn feed(&self, pool: Arc<Semaphore>, targets: &[Target]) -> JoinSet<(String, Result<(), PipelineError>)> {
    let mut join_set = JoinSet::new();

    for target in targets {
      // The pools are never closed
      let permit = pool.clone().acquire_owned().await.ok();
      let runner = self.runner.clone();
      let program = self.config.compile.program.clone();
      let args = compile_args(&self.config.compile, target);
      let target = target.clone();

      join_set.spawn(async move {
        let _permit = permit;
        info!(suffix = %target.suffix, triple = %target.toolchain_triple, "compiling");
        let result = runner
          .run(&program, &args, &target.display_prefix)
          .await
          .map_err(PipelineError::from);
        (target.suffix, result)
      });
    }

    join_set
  }

  /// Install, stage, then compile every target, stopping after the first
  /// phase that reports failures.
  pub async fn run_all(&self) -> Result<(), PipelineError> {
    self.install_toolchain(None).await?;
    self.stage(None).await?;
    self.compile(None).await
  }
}

fn toolchain_args(spec: &CommandSpec, target: &Target) -> Vec<String> {
  let mut args = spec.args.clone();
  args.push(target.toolchain_triple.clone());
  args
}

fn compile_args(spec: &CommandSpec, target: &Target) -> Vec<String> {
  let mut args = spec.args.clone();
  args.extend(
    ["--platform", "--release", "--strip", "--cross-compile", "--target"]
      .into_iter()
      .map(String::from),
  );
  args.push(target.toolchain_triple.clone());
  args.push("--target-dir".to_string());
  args.push(target.build_dir.to_string_lossy().into_owned());
  args.push("--output-dir".to_string());
  args.push(target.output_dir.to_string_lossy().into_owned());
  args
}

/// Wait for every task and gather failures in catalog order.
async fn collect(
  mut join_set: JoinSet<(String, Result<(), PipelineError>)>,
  targets: &[Target],
  phase: &str,
) -> Vec<TargetFailure> {
  let mut failures = Vec::new();
  let mut unreported: Vec<String> = targets.iter().map(|t| t.suffix.clone()).collect();
  let mut panics = Vec::new();

  while let Some(joined) = join_set.join_next().await {
    match joined {
      Ok((suffix, result)) => {
        unreported.retain(|s| s != &suffix);
        if let Err(e) = result {
          error!(suffix = %suffix, error = %e, "{phase} failed");
          failures.push(TargetFailure { suffix, error: e });
        }
      }
      Err(e) => {
        error!(error = %e, "{phase} task panicked");
        panics.push(e.to_string());
      }
    }
  }

  // A panicked task never reports its suffix
  for (suffix, message) in unreported.into_iter().zip(panics) {
    failures.push(TargetFailure {
      suffix,
      error: PipelineError::TaskPanicked(message),
    });
  }

  failures.sort_by_key(|f| targets.iter().position(|t| t.suffix == f.suffix));
  failures
}

fn finish(phase: &str, failures: Vec<TargetFailure>) -> Result<(), PipelineError> {
  if failures.is_empty() {
    info!("{phase} finished");
    Ok(())
  } else {
    Err(PipelineError::TargetsFailed(failures))
  }
}
