//! Library integration tests through the public API.

mod matrix_tests;
