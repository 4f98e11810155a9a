use std::fmt;

use super::naming::{Axis, NamingError, Vocabulary};

/// Operating systems a native module can be built for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Os {
  Linux,
  MacOs,
  Windows,
}

impl Os {
  /// Every supported OS, in catalog order.
  pub const ALL: [Os; 3] = [Os::Linux, Os::MacOs, Os::Windows];

  /// Name used by the Node.js runtime (`process.platform`).
  pub fn runtime_name(self) -> &'static str {
    match self {
      Self::Linux => "linux",
      Self::MacOs => "darwin",
      Self::Windows => "win32",
    }
  }

  /// Name used in published package names and dist folders.
  pub fn package_name(self) -> &'static str {
    match self {
      Self::Linux => "linux",
      Self::MacOs => "macos",
      Self::Windows => "windows",
    }
  }

  /// Vendor/system/abi part of the Rust target triple.
  pub fn toolchain_component(self) -> &'static str {
    match self {
      Self::Linux => "unknown-linux-gnu",
      Self::MacOs => "apple-darwin",
      Self::Windows => "pc-windows-msvc",
    }
  }

  /// Whether several compiler invocations for this OS may run at once.
  ///
  /// The MSVC cross toolchain shares a single SDK cache between invocations,
  /// so Windows targets are built one at a time.
  pub fn supports_concurrent_builds(self) -> bool {
    !matches!(self, Self::Windows)
  }

  pub fn from_runtime(name: &str) -> Result<Self, NamingError> {
    Self::ALL
      .into_iter()
      .find(|os| os.runtime_name() == name)
      .ok_or_else(|| NamingError::unknown(Axis::Os, Vocabulary::Runtime, name))
  }

  pub fn from_package(name: &str) -> Result<Self, NamingError> {
    Self::ALL
      .into_iter()
      .find(|os| os.package_name() == name)
      .ok_or_else(|| NamingError::unknown(Axis::Os, Vocabulary::Package, name))
  }
}

impl fmt::Display for Os {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.package_name())
  }
}
