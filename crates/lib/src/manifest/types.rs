//! Project metadata shared by every target.
//!
//! The root manifest is the project's own `package.json`. Only the fields the
//! per-target packages inherit are read; everything else in the file is
//! ignored.
//!
//! # Example
//!
//! ```json
//! {
//!   "name": "@acme/walker",
//!   "version": "1.4.0",
//!   "description": "Fast repository walker",
//!   "repository": "https://github.com/acme/walker",
//!   "license": "MIT"
//! }
//! ```

use serde::{Deserialize, Serialize};

/// Metadata read once from the project manifest.
///
/// Every field is required and must be a string. Deserialization fails on the
/// first missing or mistyped field, so a broken manifest stops the pipeline
/// before anything is staged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RootManifest {
  pub name: String,
  pub version: String,
  pub description: String,
  pub repository: String,
  pub license: String,
}
