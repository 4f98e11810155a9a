mod cmd;
mod output;

use std::process::ExitCode;

use anyhow::Result;
use clap::{ArgAction, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use distmatrix_lib::pipeline::PipelineError;

use cmd::{Phase, ProjectArgs, cmd_list_targets, cmd_run};
use output::{OutputFormat, print_error};

/// distmatrix - Build native Node-API modules for every platform and architecture
///
/// Without a command, installs the Rust targets, creates the dist folders and
/// builds the binaries for the whole matrix.
#[derive(Parser)]
#[command(name = "distmatrix")]
#[command(author, version, about, long_about = None)]
struct Cli {
  /// More log output (-v for info, -vv for debug); RUST_LOG overrides
  #[arg(short, long, action = ArgAction::Count, global = true)]
  verbose: u8,

  #[command(flatten)]
  project: ProjectArgs,

  #[command(subcommand)]
  command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
  /// Add the Rust compiler target of every selected target
  InstallRustTargets {
    /// Only this target, e.g. linux-x64
    target: Option<String>,
  },

  /// Render README.md and package.json into each target's dist folder
  CreateDistFolders {
    /// Only this target, e.g. linux-x64
    target: Option<String>,
  },

  /// Compile the native module for every selected target
  BuildNodeBinaries {
    /// Only this target, e.g. linux-x64
    target: Option<String>,
  },

  /// Show the target matrix
  ListTargets {
    /// Output format
    #[arg(short, long, value_enum, default_value_t)]
    output: OutputFormat,
  },
}

fn main() -> ExitCode {
  let cli = Cli::parse();
  init_tracing(cli.verbose);

  match run(&cli) {
    Ok(()) => ExitCode::SUCCESS,
    Err(e) => {
      report(&e);
      ExitCode::FAILURE
    }
  }
}

fn init_tracing(verbose: u8) {
  let default = match verbose {
    0 => "warn",
    1 => "info",
    _ => "debug",
  };
  let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
  tracing_subscriber::fmt()
    .with_env_filter(filter)
    .with_writer(std::io::stderr)
    .without_time()
    .init();
}

fn run(cli: &Cli) -> Result<()> {
  let project = &cli.project;
  match &cli.command {
    None => cmd_run(Phase::All, None, project),
    Some(Commands::InstallRustTargets { target }) => cmd_run(Phase::InstallToolchain, target.as_deref(), project),
    Some(Commands::CreateDistFolders { target }) => cmd_run(Phase::Stage, target.as_deref(), project),
    Some(Commands::BuildNodeBinaries { target }) => cmd_run(Phase::Compile, target.as_deref(), project),
    Some(Commands::ListTargets { output }) => cmd_list_targets(project, *output),
  }
}

fn report(error: &anyhow::Error) {
  if let Some(PipelineError::TargetsFailed(failures)) = error.downcast_ref::<PipelineError>() {
    for failure in failures {
      print_error(&format!("{}: {}", failure.suffix, failure.error));
    }
  }
  print_error(&format!("{:#}", error));
}
