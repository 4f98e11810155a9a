//! Built-in templates, used when no template directory is configured.

/// Template name of the per-target README.
pub const README: &str = "README.md";

/// Template name of the per-target package manifest.
pub const PACKAGE_JSON: &str = "package.json";

const README_TEMPLATE: &str = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/templates/README.md"));

const PACKAGE_JSON_TEMPLATE: &str = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/templates/package.json"));

/// Look up a built-in template by name.
pub fn builtin(name: &str) -> Option<&'static str> {
  match name {
    README => Some(README_TEMPLATE),
    PACKAGE_JSON => Some(PACKAGE_JSON_TEMPLATE),
    _ => None,
  }
}
