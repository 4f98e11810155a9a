//! CLI integration tests against temporary projects.

mod common;
mod dist_tests;

#[cfg(unix)]
mod build_tests;
