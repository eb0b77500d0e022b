//! Compile-time atomic CSS.
//!
//! Style declarations extracted by a front end are normalized into atomic
//! rules with content-addressed class names, call sites that combine style
//! namespaces are folded into constant class strings or dispatch tables, and
//! the rules of a whole build are assembled into one ordered stylesheet.

use indexmap::IndexMap;
use rayon::prelude::*;
use serde::Serialize;

pub mod assembler;
pub mod compile;
pub mod config;
pub mod context;
pub mod errors;
pub mod input;
pub mod js;
pub mod keyframes;
pub mod logical;
pub mod merge;
pub mod normalize;
pub mod priority;
pub mod properties;
pub mod rule;
pub mod runtime;
pub mod shorthand;
pub mod symbols;
pub mod theming;
pub mod validator;

pub use assembler::{process_rules, StyleSheetBuilder};
pub use compile::{compile_file, BindingOutput, FileOutput};
pub use config::{AtomicCssConfig, StyleResolution};
pub use errors::{CompileResult, SourceLocation, StyleError, StyleErrorKind};
pub use input::FileInput;
pub use merge::{BailOut, Replacement};
pub use rule::{InjectableRule, InjectableStyle};
pub use runtime::merge_runtime;
pub use symbols::ExportedValue;
pub use validator::{LightningCssValidator, PermissiveValidator, ValueValidator};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildOutput {
  /// Per file result, in input order. A failed file doesn't affect the others.
  pub files: IndexMap<String, CompileResult<FileOutput>>,
  pub stylesheet: String,
}

impl BuildOutput {
  pub fn errors(&self) -> impl Iterator<Item = &StyleError> {
    self.files.values().filter_map(|result| result.as_ref().err())
  }
}

/// Compile every file of a build in parallel and assemble the stylesheet from
/// the files that compiled. Imports must already carry the exports of the
/// files they come from.
pub fn compile_build(
  inputs: &[FileInput],
  config: &AtomicCssConfig,
  validator: &dyn ValueValidator,
) -> BuildOutput {
  let _span = tracing::info_span!("compile_build", files = inputs.len()).entered();

  let results: Vec<(String, CompileResult<FileOutput>)> = inputs
    .par_iter()
    .map(|input| (input.file.clone(), compile_file(input, config, validator)))
    .collect();

  let mut builder = StyleSheetBuilder::new();
  for (file, result) in &results {
    match result {
      Ok(output) => builder.extend(output.metadata.iter().cloned()),
      Err(error) => tracing::debug!(%file, %error, "file failed to compile"),
    }
  }

  BuildOutput {
    stylesheet: builder.build(config.use_native_layers()),
    files: results.into_iter().collect(),
  }
}
