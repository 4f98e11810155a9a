//! Destinations for prefixed child output lines.

use std::io::Write;
use std::sync::{Mutex, PoisonError};

use tracing::debug;

/// Which child stream a line was read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stream {
  Stdout,
  Stderr,
}

/// Receives whole lines of child output.
///
/// Implementations must write each line atomically: lines from concurrent
/// children may interleave with each other, but never mid-line.
pub trait OutputSink: Send + Sync {
  fn line(&self, stream: Stream, prefix: &str, line: &str);
}

/// Writes child stdout lines to our stdout and child stderr lines to our
/// stderr, each preceded by the target's display prefix.
#[derive(Debug, Default, Clone, Copy)]
pub struct TerminalSink;

impl OutputSink for TerminalSink {
  fn line(&self, stream: Stream, prefix: &str, line: &str) {
    let text = format!("{prefix}{line}\n");
    match stream {
      Stream::Stdout => write_line(&mut std::io::stdout().lock(), stream, &text),
      Stream::Stderr => write_line(&mut std::io::stderr().lock(), stream, &text),
    }
  }
}

fn write_line(out: &mut impl Write, stream: Stream, text: &str) {
  if let Err(e) = out.write_all(text.as_bytes()).and_then(|()| out.flush()) {
    debug!(?stream, error = %e, "dropped child output line");
  }
}

/// One line recorded by a [`CaptureSink`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapturedLine {
  pub stream: Stream,
  pub prefix: String,
  pub line: String,
}

/// Keeps every line in memory, in arrival order.
#[derive(Debug, Default)]
pub struct CaptureSink {
  lines: Mutex<Vec<CapturedLine>>,
}

impl CaptureSink {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn lines(&self) -> Vec<CapturedLine> {
    self.lines.lock().unwrap_or_else(PoisonError::into_inner).clone()
  }

  /// Formatted `prefix + line` values for one stream.
  pub fn rendered(&self, stream: Stream) -> Vec<String> {
    self
      .lines()
      .into_iter()
      .filter(|l| l.stream == stream)
      .map(|l| format!("{}{}", l.prefix, l.line))
      .collect()
  }
}

impl OutputSink for CaptureSink {
  fn line(&self, stream: Stream, prefix: &str, line: &str) {
    self
      .lines
      .lock()
      .unwrap_or_else(PoisonError::into_inner)
      .push(CapturedLine {
        stream,
        prefix: prefix.to_string(),
        line: line.to_string(),
      });
  }
}
