//! Template compilation.
//!
//! A template is plain text with `{{ field }}` placeholders. Whitespace inside
//! the braces is ignored. A backslash before the opening braces (`\{{`)
//! produces a literal `{{`; any other backslash is kept as is.
//!
//! A placeholder may end in a `| json` filter, which substitutes the value as
//! a quoted, escaped JSON string.
//!
//! ```
//! use distmatrix_lib::template::{compile, Segment};
//!
//! let segments = compile("os: {{ packageOs }}!").unwrap();
//! assert_eq!(segments, vec![
//!     Segment::Literal("os: ".to_string()),
//!     Segment::Field("packageOs".to_string()),
//!     Segment::Literal("!".to_string()),
//! ]);
//! ```

use thiserror::Error;

/// A segment of compiled template text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
  /// Literal text, copied as is.
  Literal(String),
  /// Named field, substituted at render time.
  Field(String),
  /// Named field, substituted as a JSON string literal.
  Json(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SyntaxError {
  #[error("unclosed placeholder at byte {0}")]
  Unclosed(usize),

  #[error("empty placeholder at byte {0}")]
  Empty(usize),

  #[error("invalid placeholder name '{name}' at byte {pos}")]
  InvalidName { name: String, pos: usize },

  #[error("unknown filter '{filter}' at byte {pos}")]
  UnknownFilter { filter: String, pos: usize },
}

/// Compile template text into segments.
pub fn compile(input: &str) -> Result<Vec<Segment>, SyntaxError> {
  let mut segments = Vec::new();
  let mut literal = String::new();
  let mut rest = input;
  let mut offset = 0;

  while let Some(open) = rest.find("{{") {
    if rest[..open].ends_with('\\') {
      // Escaped: drop the backslash, keep the braces
      literal.push_str(&rest[..open - 1]);
      literal.push_str("{{");
      offset += open + 2;
      rest = &rest[open + 2..];
      continue;
    }

    literal.push_str(&rest[..open]);
    let pos = offset + open;
    let after = &rest[open + 2..];
    let close = after.find("}}").ok_or(SyntaxError::Unclosed(pos))?;
    let (name, filter) = match after[..close].split_once('|') {
      Some((name, filter)) => (name.trim(), Some(filter.trim())),
      None => (after[..close].trim(), None),
    };

    if name.is_empty() {
      return Err(SyntaxError::Empty(pos));
    }
    if !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '.') {
      return Err(SyntaxError::InvalidName {
        name: name.to_string(),
        pos,
      });
    }

    if !literal.is_empty() {
      segments.push(Segment::Literal(std::mem::take(&mut literal)));
    }
    segments.push(match filter {
      None => Segment::Field(name.to_string()),
      Some("json") => Segment::Json(name.to_string()),
      Some(other) => {
        return Err(SyntaxError::UnknownFilter {
          filter: other.to_string(),
          pos,
        });
      }
    });

    let consumed = open + 2 + close + 2;
    offset += consumed;
    rest = &rest[consumed..];
  }

  literal.push_str(rest);
  if !literal.is_empty() {
    segments.push(Segment::Literal(literal));
  }

  Ok(segments)
}
