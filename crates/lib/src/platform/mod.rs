pub mod arch;
pub mod naming;
pub mod os;

pub use arch::Arch;
pub use naming::NamingError;
pub use os::Os;
