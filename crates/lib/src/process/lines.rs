//! Chunk-to-line reassembly for child process output.

/// Carry-over buffer that turns arbitrary output chunks into whole lines.
///
/// Complete lines are returned as soon as their terminator arrives; the
/// trailing fragment is held back until more data comes in or the stream is
/// finished. Lines are decoded lossily and returned without `\n` or `\r\n`.
#[derive(Debug, Default)]
pub struct LineBuffer {
  pending: Vec<u8>,
}

impl LineBuffer {
  pub fn new() -> Self {
    Self::default()
  }

  /// Append a chunk and return every line it completed, in order.
  pub fn push(&mut self, chunk: &[u8]) -> Vec<String> {
    self.pending.extend_from_slice(chunk);

    let Some(last_newline) = self.pending.iter().rposition(|&b| b == b'\n') else {
      return Vec::new();
    };

    let rest = self.pending.split_off(last_newline + 1);
    let complete = std::mem::replace(&mut self.pending, rest);

    complete[..complete.len() - 1]
      .split(|&b| b == b'\n')
      .map(decode_line)
      .collect()
  }

  /// Flush the held-back fragment once the stream has closed.
  ///
  /// Output that does not end with a newline is still emitted as a final line.
  pub fn finish(&mut self) -> Option<String> {
    if self.pending.is_empty() {
      return None;
    }
    let fragment = std::mem::take(&mut self.pending);
    Some(decode_line(&fragment))
  }

  /// Bytes currently held back.
  pub fn pending(&self) -> &[u8] {
    &self.pending
  }
}

fn decode_line(bytes: &[u8]) -> String {
  let bytes = bytes.strip_suffix(b"\r").unwrap_or(bytes);
  String::from_utf8_lossy(bytes).into_owned()
}
