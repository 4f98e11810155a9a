//! Child process execution with prefixed, line-buffered output.
//!
//! A [`ProcessRunner`] spawns one external command, streams its stdout and
//! stderr through an [`OutputSink`] one whole line at a time, and keeps the
//! child registered with the [`CancellationRegistry`] while it runs. On
//! interrupt the child is asked to stop (SIGINT on unix, kill elsewhere) and
//! its exit status is reported like any other.

mod lines;
mod sink;

use std::path::PathBuf;
use std::process::{ExitStatus, Stdio};
use std::sync::Arc;

use thiserror::Error;
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::{Child, Command};
use tracing::{debug, warn};

use crate::cancel::CancellationRegistry;

pub use lines::LineBuffer;
pub use sink::{CaptureSink, CapturedLine, OutputSink, Stream, TerminalSink};

const READ_CHUNK: usize = 8 * 1024;

#[derive(Debug, Error)]
pub enum ProcessError {
  #[error("failed to spawn '{command}': {source}")]
  SpawnFailed { command: String, source: std::io::Error },

  #[error("'{command}' exited with {}", describe_exit(.code))]
  CommandFailed { command: String, code: Option<i32> },

  #[error("I/O error while running '{command}': {source}")]
  Io { command: String, source: std::io::Error },

  #[error("'{command}' not started: interrupted")]
  Cancelled { command: String },
}

impl ProcessError {
  /// Exit code of the child, if it ran to a normal exit.
  pub fn exit_code(&self) -> Option<i32> {
    match self {
      ProcessError::CommandFailed { code, .. } => *code,
      _ => None,
    }
  }
}

fn describe_exit(code: &Option<i32>) -> String {
  match code {
    Some(code) => format!("exit code {code}"),
    None => "no exit code (terminated by signal)".to_string(),
  }
}

/// Runs external commands on behalf of build targets.
#[derive(Clone)]
pub struct ProcessRunner {
  registry: Arc<CancellationRegistry>,
  sink: Arc<dyn OutputSink>,
  cwd: Option<PathBuf>,
}

impl std::fmt::Debug for ProcessRunner {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("ProcessRunner")
      .field("registry", &self.registry)
      .field("cwd", &self.cwd)
      .finish_non_exhaustive()
  }
}

impl ProcessRunner {
  pub fn new(registry: Arc<CancellationRegistry>, sink: Arc<dyn OutputSink>) -> Self {
    Self {
      registry,
      sink,
      cwd: None,
    }
  }

  /// Run children in `dir` instead of the current directory.
  pub fn with_cwd(mut self, dir: impl Into<PathBuf>) -> Self {
    self.cwd = Some(dir.into());
    self
  }

  pub fn registry(&self) -> &Arc<CancellationRegistry> {
    &self.registry
  }

  /// Run `program` with `args` to completion.
  ///
  /// Every output line is handed to the sink with `prefix`. Resolves once the
  /// child has exited and both of its output streams are drained.
  pub async fn run(&self, program: &str, args: &[String], prefix: &str) -> Result<(), ProcessError> {
    let command_line = display_command(program, args);

    if self.registry.is_interrupted() {
      return Err(ProcessError::Cancelled { command: command_line });
    }

    let mut command = Command::new(program);
    command
      .args(args)
      .stdin(Stdio::inherit())
      .stdout(Stdio::piped())
      .stderr(Stdio::piped());
    if let Some(dir) = &self.cwd {
      command.current_dir(dir);
    }

    debug!(cmd = %command_line, "spawning process");
    let mut child = command.spawn().map_err(|source| ProcessError::SpawnFailed {
      command: command_line.clone(),
      source,
    })?;
    let mut registration = self.registry.register();

    let stdout = child.stdout.take();
    let stderr = child.stderr.take();
    let sink = self.sink.as_ref();

    let wait = async {
      tokio::select! {
        status = child.wait() => status,
        () = registration.interrupted() => {
          debug!(cmd = %command_line, "forwarding interrupt to child");
          request_stop(&mut child);
          child.wait().await
        }
      }
    };

    let (status, out, err) = tokio::join!(
      wait,
      pump(stdout, Stream::Stdout, prefix, sink),
      pump(stderr, Stream::Stderr, prefix, sink),
    );
    drop(registration);

    let status = status.map_err(|source| ProcessError::Io {
      command: command_line.clone(),
      source,
    })?;
    check_status(&command_line, status)?;
    out.and(err).map_err(|source| ProcessError::Io {
      command: command_line,
      source,
    })
  }
}

fn check_status(command_line: &str, status: ExitStatus) -> Result<(), ProcessError> {
  if status.success() {
    debug!(cmd = %command_line, "process finished");
    return Ok(());
  }
  debug!(cmd = %command_line, code = ?status.code(), "process failed");
  Err(ProcessError::CommandFailed {
    command: command_line.to_string(),
    code: status.code(),
  })
}

async fn pump<R>(reader: Option<R>, stream: Stream, prefix: &str, sink: &dyn OutputSink) -> std::io::Result<()>
where
  R: AsyncRead + Unpin,
{
  let Some(mut reader) = reader else {
    return Ok(());
  };

  let mut buffer = LineBuffer::new();
  let mut chunk = vec![0u8; READ_CHUNK];
  loop {
    let n = reader.read(&mut chunk).await?;
    if n == 0 {
      break;
    }
    for line in buffer.push(&chunk[..n]) {
      sink.line(stream, prefix, &line);
    }
  }
  if let Some(line) = buffer.finish() {
    sink.line(stream, prefix, &line);
  }
  Ok(())
}

fn request_stop(child: &mut Child) {
  if send_interrupt(child) {
    return;
  }
  if let Err(e) = child.start_kill() {
    warn!(error = %e, "failed to stop child process");
  }
}

#[cfg(unix)]
fn send_interrupt(child: &Child) -> bool {
  use nix::sys::signal::{Signal, kill};
  use nix::unistd::Pid;

  let Some(pid) = child.id().and_then(|id| i32::try_from(id).ok()) else {
    return false;
  };
  kill(Pid::from_raw(pid), Signal::SIGINT).is_ok()
}

#[cfg(not(unix))]
fn send_interrupt(_child: &Child) -> bool {
  false
}

fn display_command(program: &str, args: &[String]) -> String {
  if args.is_empty() {
    program.to_string()
  } else {
    format!("{} {}", program, args.join(" "))
  }
}
