//! distmatrix-lib: Build orchestration for platform-specific native module packages
//!
//! This crate provides the engine behind the `distmatrix` CLI:
//! - `platform`: the runtime, package and toolchain naming vocabularies
//! - `catalog`: the immutable platform/architecture target matrix
//! - `manifest`: the project's root `package.json`
//! - `template`: cached template compilation and rendering
//! - `stage`: per-target distributable folders
//! - `process`: child processes with prefixed, line-buffered output
//! - `cancel`: interrupt relay to in-flight children
//! - `pipeline`: toolchain install, staging and compile across the matrix

pub mod cancel;
pub mod catalog;
pub mod manifest;
pub mod pipeline;
pub mod platform;
pub mod process;
pub mod stage;
pub mod template;
