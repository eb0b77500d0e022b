use std::path::Path;

use indexmap::IndexMap;
use indexmap::IndexSet;
use serde::Deserialize;
use serde::Serialize;

use crate::config::AtomicCssConfig;
use crate::errors::{CompileResult, StyleError, StyleErrorKind};
use crate::input::{CallSite, Declaration, FileInput, StyleExpr, StyleValue};
use crate::js;
use crate::keyframes::define_keyframes;
use crate::merge::{CallSiteOutput, MergeEvaluator};
use crate::normalize::Normalizer;
use crate::rule::{HashCache, InjectableRule};
use crate::symbols::{ExportedValue, Namespace, SymbolTable};
use crate::theming::{create_theme, define_consts, define_vars};
use crate::validator::ValueValidator;

/// JS initializer of a binding that survives compilation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BindingOutput {
  pub name: String,
  pub code: String,
  pub exported: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileOutput {
  pub file: String,
  pub bindings: Vec<BindingOutput>,
  /// Bindings dropped because every use of them was folded away.
  pub removed_bindings: Vec<String>,
  pub call_sites: Vec<CallSiteOutput>,
  pub metadata: Vec<InjectableRule>,
  /// Compiled exported bindings, for the files importing them.
  pub exports: IndexMap<String, ExportedValue>,
}

struct FileCompiler<'a> {
  input: &'a FileInput,
  config: &'a AtomicCssConfig,
  validator: &'a dyn ValueValidator,
  symbols: SymbolTable,
  hashes: HashCache,
  metadata: Vec<InjectableRule>,
}

impl<'a> FileCompiler<'a> {
  fn compile_declaration(&mut self, declaration: &Declaration) -> CompileResult<ExportedValue> {
    let normalizer = Normalizer::new(self.config, self.validator, &self.symbols);
    let file = self.input.file.as_str();

    let value = match declaration {
      Declaration::Create(create) => {
        let mut namespaces = IndexMap::new();
        for (raw_name, style) in &create.namespaces {
          let name = normalizer.resolve_key(raw_name)?;
          let StyleValue::Object(style) = style else {
            return Err(StyleError::invalid_shape(format!(
              "Namespace \"{name}\" must be an object of styles"
            )));
          };

          let rules = normalizer.normalize(style, &mut self.hashes)?;
          let mut namespace = Namespace::default();
          for rule in &rules {
            namespace.entries.insert(rule.key.clone(), rule.class_name.clone());
            self.metadata.extend(rule.to_injectable());
          }
          if self.config.debug() {
            namespace.debug_name = Some(format!("{}__{name}", file_stem(file)));
            namespace.source = create.loc.as_ref().map(|loc| format!("{}:{}", loc.file, loc.line));
          }
          namespaces.insert(name, namespace);
        }
        ExportedValue::Namespaces { namespaces }
      }
      Declaration::DefineVars(vars) => {
        let defined = define_vars(&normalizer, &mut self.hashes, file, &vars.name, &vars.vars)?;
        self.metadata.extend(defined.rules);
        ExportedValue::Theme(defined.theme)
      }
      Declaration::CreateTheme(theme) => {
        let Some(definition) = self.symbols.theme(&theme.theme) else {
          return Err(StyleError::new(
            StyleErrorKind::UnresolvedReference,
            format!("\"{}\" is not a defineVars binding", theme.theme),
          ));
        };
        let created = create_theme(&normalizer, &mut self.hashes, definition, &theme.overrides)?;
        self.metadata.extend(created.rules);
        ExportedValue::ThemeOverride(created.theme_override)
      }
      Declaration::DefineConsts(consts) => {
        let defined = define_consts(&normalizer, &mut self.hashes, file, &consts.name, &consts.consts)?;
        self.metadata.extend(defined.rules);
        ExportedValue::Consts(defined.consts)
      }
      Declaration::Keyframes(keyframes) => {
        let defined = define_keyframes(&normalizer, &mut self.hashes, &keyframes.frames)?;
        self.metadata.push(defined.rule);
        ExportedValue::Keyframes(defined.keyframes)
      }
    };

    Ok(value)
  }
}

fn file_stem(file: &str) -> &str {
  Path::new(file)
    .file_stem()
    .and_then(|stem| stem.to_str())
    .unwrap_or(file)
}

fn binding_code(value: &ExportedValue) -> String {
  match value {
    ExportedValue::Namespaces { namespaces } => js::namespaces_object(namespaces),
    ExportedValue::Theme(theme) => js::theme_object(theme),
    ExportedValue::ThemeOverride(theme_override) => js::theme_override_object(theme_override),
    ExportedValue::Consts(consts) => js::consts_object(consts),
    ExportedValue::Keyframes(keyframes) => js::string_literal(&keyframes.name),
  }
}

fn collect_bindings<'e>(expr: &'e StyleExpr, out: &mut IndexSet<&'e str>) {
  match expr {
    StyleExpr::Ref { binding, .. } => {
      out.insert(binding);
    }
    StyleExpr::Conditional {
      consequent,
      alternate,
      ..
    } => {
      collect_bindings(consequent, out);
      collect_bindings(alternate, out);
    }
    StyleExpr::And { right, .. } => collect_bindings(right, out),
    StyleExpr::Array { items } => {
      for item in items {
        collect_bindings(item, out);
      }
    }
    StyleExpr::Null | StyleExpr::Unresolvable { .. } => {}
  }
}

/// Bindings still needed at runtime by call sites that weren't folded.
fn runtime_bindings<'e>(call_sites: &'e [CallSite], outputs: &[CallSiteOutput]) -> IndexSet<&'e str> {
  let mut bindings = IndexSet::new();
  for (call, output) in call_sites.iter().zip(outputs) {
    if !output.is_folded() {
      for arg in &call.args {
        collect_bindings(arg, &mut bindings);
      }
    }
  }
  bindings
}

/// Compile one file. Pure: the result only depends on the input and config.
pub fn compile_file(
  input: &FileInput,
  config: &AtomicCssConfig,
  validator: &dyn ValueValidator,
) -> CompileResult<FileOutput> {
  let _span = tracing::debug_span!("compile_file", file = %input.file).entered();

  let mut compiler = FileCompiler {
    input,
    config,
    validator,
    symbols: SymbolTable::from_imports(&input.imports),
    hashes: HashCache::new(config.class_name_prefix()),
    metadata: Vec::new(),
  };

  let mut compiled = Vec::with_capacity(input.declarations.len());
  for declaration in &input.declarations {
    let value = compiler
      .compile_declaration(declaration)
      .map_err(|err| err.at(declaration.loc()))?;
    compiler.symbols.insert(declaration.name(), value.clone());
    compiled.push((declaration, value));
  }

  let evaluator = MergeEvaluator::new(config, &compiler.symbols);
  let call_sites: Vec<CallSiteOutput> = input
    .call_sites
    .iter()
    .map(|call| evaluator.fold(call))
    .collect();
  let still_used = runtime_bindings(&input.call_sites, &call_sites);

  let mut output = FileOutput {
    file: input.file.clone(),
    call_sites,
    ..Default::default()
  };

  for (declaration, value) in compiled {
    let name = declaration.name();
    let removable = config.dead_code_elimination()
      && matches!(declaration, Declaration::Create(_))
      && !declaration.exported()
      && !still_used.contains(name)
      && input.references.get(name).copied().unwrap_or(0) == 0;

    if removable {
      tracing::debug!(binding = name, "removing binding only used by folded call sites");
      output.removed_bindings.push(name.to_string());
    } else {
      output.bindings.push(BindingOutput {
        name: name.to_string(),
        code: binding_code(&value),
        exported: declaration.exported(),
      });
    }

    if declaration.exported() {
      output.exports.insert(name.to_string(), value);
    }
  }

  output.metadata = compiler.metadata;
  Ok(output)
}

#[cfg(test)]
mod tests {
  use pretty_assertions::assert_eq;
  use serde_json::json;

  use super::*;
  use crate::merge::Replacement;
  use crate::validator::PermissiveValidator;

  fn compile(input: serde_json::Value, config: &AtomicCssConfig) -> CompileResult<FileOutput> {
    let input: FileInput = serde_json::from_value(input).unwrap();
    compile_file(&input, config, &PermissiveValidator)
  }

  fn button() -> serde_json::Value {
    json!({
      "file": "src/button.js",
      "declarations": [{
        "kind": "create",
        "name": "styles",
        "loc": {"file": "src/button.js", "line": 3, "column": 15},
        "namespaces": {
          "root": {"color": "black", "padding": 4},
          "active": {"color": "blue"}
        }
      }],
      "callSites": [{
        "id": "c0",
        "form": "className",
        "args": [
          {"type": "ref", "binding": "styles", "key": "root"},
          {"type": "and", "test": "isActive", "right": {"type": "ref", "binding": "styles", "key": "active"}}
        ]
      }]
    })
  }

  #[test]
  fn folds_call_sites_and_drops_the_binding() {
    let output = compile(button(), &AtomicCssConfig::default()).unwrap();

    assert_eq!(output.removed_bindings, vec!["styles"]);
    assert!(output.bindings.is_empty());
    assert_eq!(output.metadata.len(), 3);
    assert!(matches!(
      output.call_sites[0].replacement,
      Replacement::Dispatch { .. }
    ));
  }

  #[test]
  fn keeps_bindings_with_other_references() {
    let mut input = button();
    input["references"] = json!({"styles": 1});
    let output = compile(input, &AtomicCssConfig::default()).unwrap();

    assert!(output.removed_bindings.is_empty());
    assert_eq!(output.bindings[0].name, "styles");
    assert!(output.bindings[0].code.contains("\"$$css\":true"));
  }

  #[test]
  fn keeps_bindings_used_at_runtime() {
    let config = AtomicCssConfig {
      fold_conditional_merges: Some(false),
      ..Default::default()
    };
    let output = compile(button(), &config).unwrap();
    assert_eq!(output.bindings.len(), 1);
  }

  #[test]
  fn debug_adds_names_and_sources() {
    let config = AtomicCssConfig {
      debug: Some(true),
      ..Default::default()
    };
    let mut input = button();
    input["callSites"][0]["form"] = json!("props");
    input["callSites"][0]["args"] = json!([{"type": "ref", "binding": "styles", "key": "root"}]);

    let output = compile(input, &config).unwrap();
    let Replacement::Literal { code } = &output.call_sites[0].replacement else {
      panic!("expected a literal");
    };
    assert!(code.starts_with(r#"{"className":"button__root x"#));
    assert!(code.ends_with(r#""data-style-src":"src/button.js:3"}"#));
  }

  #[test]
  fn errors_carry_the_declaration_location() {
    let mut input = button();
    input["declarations"][0]["namespaces"]["root"] = json!({"colr": "red"});

    let error = compile(input, &AtomicCssConfig::default()).unwrap_err();
    assert_eq!(error.kind, StyleErrorKind::UnknownProperty);
    assert_eq!(error.loc.map(|loc| loc.line), Some(3));
  }

  #[test]
  fn local_themes_resolve_in_the_same_file() {
    let output = compile(
      json!({
        "file": "src/theme.js",
        "declarations": [
          {"kind": "defineVars", "name": "colors", "exported": true, "vars": {"primary": "blue"}},
          {"kind": "createTheme", "name": "dark", "exported": true, "theme": "colors", "overrides": {"primary": "navy"}},
          {"kind": "create", "name": "styles", "namespaces": {"root": {"color": {"$ref": "colors.primary"}}}}
        ],
        "references": {"styles": 1}
      }),
      &AtomicCssConfig::default(),
    )
    .unwrap();

    assert_eq!(output.exports.len(), 2);
    let ExportedValue::Theme(theme) = &output.exports["colors"] else {
      panic!("expected a theme");
    };
    let variable = &theme.variables["primary"];
    let color_rule = output
      .metadata
      .iter()
      .find(|rule| rule.priority() == 3000)
      .unwrap();
    assert!(color_rule.style().ltr.ends_with(&format!("{{color:var({variable})}}")));
    assert!(output
      .metadata
      .iter()
      .any(|rule| rule.priority() == 500));
  }
}
