use std::fmt;

use super::naming::{Axis, NamingError, Vocabulary};

/// CPU architectures a native module can be built for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Arch {
  X64,
  Arm64,
  X86,
}

impl Arch {
  /// Every supported architecture, in catalog order.
  pub const ALL: [Arch; 3] = [Arch::X64, Arch::Arm64, Arch::X86];

  /// Name used by the Node.js runtime (`process.arch`).
  pub fn runtime_name(self) -> &'static str {
    match self {
      Self::X64 => "x64",
      Self::Arm64 => "arm64",
      Self::X86 => "ia32",
    }
  }

  /// Name used in published package names and dist folders.
  pub fn package_name(self) -> &'static str {
    match self {
      Self::X64 => "x64",
      Self::Arm64 => "arm64",
      Self::X86 => "x86",
    }
  }

  /// Leading CPU part of the Rust target triple.
  pub fn toolchain_component(self) -> &'static str {
    match self {
      Self::X64 => "x86_64",
      Self::Arm64 => "aarch64",
      Self::X86 => "i686",
    }
  }

  pub fn from_runtime(name: &str) -> Result<Self, NamingError> {
    Self::ALL
      .into_iter()
      .find(|arch| arch.runtime_name() == name)
      .ok_or_else(|| NamingError::unknown(Axis::Arch, Vocabulary::Runtime, name))
  }

  pub fn from_package(name: &str) -> Result<Self, NamingError> {
    Self::ALL
      .into_iter()
      .find(|arch| arch.package_name() == name)
      .ok_or_else(|| NamingError::unknown(Axis::Arch, Vocabulary::Package, name))
  }
}

impl fmt::Display for Arch {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.package_name())
  }
}
