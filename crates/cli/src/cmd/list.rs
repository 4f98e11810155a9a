//! Implementation of the `distmatrix list-targets` command.

use anyhow::Result;
use serde::Serialize;

use distmatrix_lib::catalog::Target;

use super::ProjectArgs;
use crate::output::{OutputFormat, print_json};

#[derive(Debug, Serialize)]
struct TargetEntry<'a> {
  suffix: &'a str,
  platform: &'static str,
  arch: &'static str,
  triple: &'a str,
  output_dir: String,
  build_dir: String,
}

impl<'a> From<&'a Target> for TargetEntry<'a> {
  fn from(target: &'a Target) -> Self {
    Self {
      suffix: &target.suffix,
      platform: target.runtime_platform,
      arch: target.runtime_arch,
      triple: &target.toolchain_triple,
      output_dir: target.output_dir.display().to_string(),
      build_dir: target.build_dir.display().to_string(),
    }
  }
}

/// Print every target of the selected matrix.
pub fn cmd_list_targets(args: &ProjectArgs, output: OutputFormat) -> Result<()> {
  let project_dir = args.project_dir()?;
  let catalog = args.catalog(&project_dir)?;

  if output.is_json() {
    let entries: Vec<TargetEntry<'_>> = catalog.targets().iter().map(TargetEntry::from).collect();
    return print_json(&entries);
  }

  let pairs: Vec<String> = catalog
    .targets()
    .iter()
    .map(|t| format!("{}/{}", t.runtime_platform, t.runtime_arch))
    .collect();
  let width = pairs.iter().map(String::len).max().unwrap_or(0);
  for (target, pair) in catalog.targets().iter().zip(&pairs) {
    println!("{}{:<width$}  {}", target.display_prefix, pair, target.toolchain_triple);
  }

  Ok(())
}
