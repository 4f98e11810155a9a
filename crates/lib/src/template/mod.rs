//! Template rendering for staged package files.
//!
//! Templates are compiled lazily, once per name, and kept for the lifetime of
//! the [`TemplateRenderer`]. Rendered output is never cached. Every placeholder
//! must resolve against the [`RenderContext`]; a missing field is an error
//! rather than an empty string, since a blank field in a published package
//! manifest is worse than a failed build.

mod defaults;
mod parse;

use std::collections::{BTreeMap, HashMap};
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use thiserror::Error;
use tracing::debug;

use crate::catalog::Target;
use crate::manifest::RootManifest;

pub use defaults::{PACKAGE_JSON, README};
pub use parse::{Segment, SyntaxError, compile};

#[derive(Debug, Error)]
pub enum TemplateError {
  #[error("template not found: {0}")]
  NotFound(String),

  #[error("failed to read template {}: {source}", path.display())]
  Read { path: PathBuf, source: std::io::Error },

  #[error("syntax error in template {template}: {source}")]
  Syntax { template: String, source: SyntaxError },

  #[error("unresolved placeholder '{placeholder}' in template {template}")]
  Unresolved { template: String, placeholder: String },
}

/// Where template text comes from.
#[derive(Debug, Clone, Default)]
pub enum TemplateSource {
  /// Templates embedded in the binary.
  #[default]
  Builtin,
  /// A directory holding one file per template, named after the template.
  Dir(PathBuf),
}

impl TemplateSource {
  fn load(&self, name: &str) -> Result<String, TemplateError> {
    match self {
      TemplateSource::Builtin => defaults::builtin(name)
        .map(str::to_string)
        .ok_or_else(|| TemplateError::NotFound(name.to_string())),
      TemplateSource::Dir(dir) => {
        let path = dir.join(name);
        if !path.is_file() {
          return Err(TemplateError::NotFound(path.display().to_string()));
        }
        std::fs::read_to_string(&path).map_err(|source| TemplateError::Read { path, source })
      }
    }
  }
}

/// A template compiled into segments.
#[derive(Debug)]
pub struct CompiledTemplate {
  name: String,
  segments: Vec<Segment>,
}

impl CompiledTemplate {
  pub fn name(&self) -> &str {
    &self.name
  }

  pub fn segments(&self) -> &[Segment] {
    &self.segments
  }

  /// Substitute every field from the context.
  pub fn render(&self, context: &RenderContext) -> Result<String, TemplateError> {
    let mut out = String::new();
    for segment in &self.segments {
      match segment {
        Segment::Literal(text) => out.push_str(text),
        Segment::Field(field) => out.push_str(self.lookup(context, field)?),
        Segment::Json(field) => {
          let value = self.lookup(context, field)?;
          out.push_str(&serde_json::Value::from(value).to_string());
        }
      }
    }
    Ok(out)
  }

  fn lookup<'a>(&self, context: &'a RenderContext, field: &str) -> Result<&'a str, TemplateError> {
    context.get(field).ok_or_else(|| TemplateError::Unresolved {
      template: self.name.clone(),
      placeholder: field.to_string(),
    })
  }
}

/// Field values available to templates.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RenderContext {
  fields: BTreeMap<String, String>,
}

impl RenderContext {
  /// Context for one target: the manifest fields plus the target's names.
  pub fn for_target(manifest: &RootManifest, target: &Target) -> Self {
    let mut context = Self::default();
    context
      .insert("name", &manifest.name)
      .insert("version", &manifest.version)
      .insert("description", &manifest.description)
      .insert("repository", &manifest.repository)
      .insert("license", &manifest.license)
      .insert("runtimePlatform", target.runtime_platform)
      .insert("runtimeArch", target.runtime_arch)
      .insert("packageOs", target.package_os)
      .insert("packageArch", target.package_arch)
      .insert("toolchainTriple", &target.toolchain_triple)
      .insert("targetSuffix", &target.suffix);
    context
  }

  pub fn insert(&mut self, key: &str, value: &str) -> &mut Self {
    self.fields.insert(key.to_string(), value.to_string());
    self
  }

  pub fn get(&self, key: &str) -> Option<&str> {
    self.fields.get(key).map(String::as_str)
  }
}

/// Process-wide cache of compiled templates.
///
/// Compilation happens while the cache lock is held, so two tasks asking for
/// the same template at once never compile it twice.
#[derive(Debug, Default)]
pub struct TemplateRenderer {
  source: TemplateSource,
  cache: Mutex<HashMap<String, Arc<CompiledTemplate>>>,
  compilations: AtomicUsize,
}

impl TemplateRenderer {
  pub fn new(source: TemplateSource) -> Self {
    Self {
      source,
      cache: Mutex::new(HashMap::new()),
      compilations: AtomicUsize::new(0),
    }
  }

  pub fn source(&self) -> &TemplateSource {
    &self.source
  }

  /// Get a compiled template, compiling it on first use.
  pub fn template(&self, name: &str) -> Result<Arc<CompiledTemplate>, TemplateError> {
    // A panic while holding the lock cannot leave a half-inserted entry
    let mut cache = self.cache.lock().unwrap_or_else(PoisonError::into_inner);
    if let Some(compiled) = cache.get(name) {
      return Ok(Arc::clone(compiled));
    }

    let text = self.source.load(name)?;
    let segments = compile(&text).map_err(|source| TemplateError::Syntax {
      template: name.to_string(),
      source,
    })?;
    self.compilations.fetch_add(1, Ordering::Relaxed);
    debug!(template = %name, segments = segments.len(), "compiled template");

    let compiled = Arc::new(CompiledTemplate {
      name: name.to_string(),
      segments,
    });
    cache.insert(name.to_string(), Arc::clone(&compiled));
    Ok(compiled)
  }

  /// Render a template against a context.
  pub fn render(&self, name: &str, context: &RenderContext) -> Result<String, TemplateError> {
    self.template(name)?.render(context)
  }

  /// Number of templates compiled so far.
  pub fn compilations(&self) -> usize {
    self.compilations.load(Ordering::Relaxed)
  }
}
