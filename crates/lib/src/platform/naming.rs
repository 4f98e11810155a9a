//! Translation between the three naming vocabularies.
//!
//! A target is named differently depending on who is asking:
//!
//! | vocabulary | OS examples                          | arch examples            |
//! |------------|--------------------------------------|--------------------------|
//! | runtime    | `linux`, `darwin`, `win32`           | `x64`, `arm64`, `ia32`   |
//! | package    | `linux`, `macos`, `windows`          | `x64`, `arm64`, `x86`    |
//! | toolchain  | `unknown-linux-gnu`, `apple-darwin`  | `x86_64`, `aarch64`      |
//!
//! Each axis is a bijection over the variants of [`Os`] and [`Arch`]. Names
//! outside the domain are rejected with [`NamingError::UnknownIdentifier`];
//! nothing here ever falls back to a default.

use std::fmt;

use thiserror::Error;

use super::arch::Arch;
use super::os::Os;

/// Which translation axis a name belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
  Os,
  Arch,
}

impl fmt::Display for Axis {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Axis::Os => write!(f, "platform"),
      Axis::Arch => write!(f, "architecture"),
    }
  }
}

/// Which vocabulary a name was looked up in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Vocabulary {
  Runtime,
  Package,
}

impl fmt::Display for Vocabulary {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Vocabulary::Runtime => write!(f, "runtime"),
      Vocabulary::Package => write!(f, "package"),
    }
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NamingError {
  #[error("unknown {vocabulary} {axis} identifier '{value}' (expected one of: {})", .expected.join(", "))]
  UnknownIdentifier {
    axis: Axis,
    vocabulary: Vocabulary,
    value: String,
    expected: Vec<&'static str>,
  },
}

impl NamingError {
  pub(crate) fn unknown(axis: Axis, vocabulary: Vocabulary, value: &str) -> Self {
    let expected = match (axis, vocabulary) {
      (Axis::Os, Vocabulary::Runtime) => Os::ALL.iter().map(|os| os.runtime_name()).collect(),
      (Axis::Os, Vocabulary::Package) => Os::ALL.iter().map(|os| os.package_name()).collect(),
      (Axis::Arch, Vocabulary::Runtime) => Arch::ALL.iter().map(|arch| arch.runtime_name()).collect(),
      (Axis::Arch, Vocabulary::Package) => Arch::ALL.iter().map(|arch| arch.package_name()).collect(),
    };
    NamingError::UnknownIdentifier {
      axis,
      vocabulary,
      value: value.to_string(),
      expected,
    }
  }
}

pub fn runtime_to_package_os(runtime: &str) -> Result<&'static str, NamingError> {
  Os::from_runtime(runtime).map(Os::package_name)
}

pub fn package_to_runtime_os(package: &str) -> Result<&'static str, NamingError> {
  Os::from_package(package).map(Os::runtime_name)
}

pub fn runtime_to_package_arch(runtime: &str) -> Result<&'static str, NamingError> {
  Arch::from_runtime(runtime).map(Arch::package_name)
}

pub fn package_to_runtime_arch(package: &str) -> Result<&'static str, NamingError> {
  Arch::from_package(package).map(Arch::runtime_name)
}

/// Toolchain OS component for a package OS name.
pub fn toolchain_os(package_os: &str) -> Result<&'static str, NamingError> {
  Os::from_package(package_os).map(Os::toolchain_component)
}

/// Toolchain arch component for a package arch name.
pub fn toolchain_arch(package_arch: &str) -> Result<&'static str, NamingError> {
  Arch::from_package(package_arch).map(Arch::toolchain_component)
}

/// Compose the Rust target triple for a package OS/arch pair: `{arch}-{os}`.
pub fn toolchain_triple(package_os: &str, package_arch: &str) -> Result<String, NamingError> {
  Ok(format!(
    "{}-{}",
    toolchain_arch(package_arch)?,
    toolchain_os(package_os)?
  ))
}
