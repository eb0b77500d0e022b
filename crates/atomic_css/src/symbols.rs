use indexmap::IndexMap;
use serde::Deserialize;
use serde::Serialize;

use crate::errors::{CompileResult, StyleError, StyleErrorKind};

/// Key of the theme name inside a `defineVars` result.
pub const THEME_NAME_KEY: &str = "__themeName__";

/// Compiled form of one style namespace: merge key to class name, in
/// declaration order. A `None` class is an explicit unset.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Namespace {
  pub entries: IndexMap<String, Option<String>>,
  /// `{file stem}__{namespace}`, only used by debug output.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub debug_name: Option<String>,
  /// `file:line` of the namespace definition, only used by debug output.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub source: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThemeDefinition {
  pub theme_name: String,
  /// Variable key to custom property name (`--x1abc`).
  pub variables: IndexMap<String, String>,
}

impl ThemeDefinition {
  pub fn var_reference(&self, key: &str) -> Option<String> {
    if key == THEME_NAME_KEY {
      return Some(self.theme_name.clone());
    }
    self
      .variables
      .get(key)
      .map(|variable| format!("var({variable})"))
  }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThemeOverride {
  pub theme_name: String,
  pub selector: String,
}

impl ThemeOverride {
  /// Applying two overrides of the same theme keeps only the last one.
  pub fn as_namespace(&self) -> Namespace {
    Namespace {
      entries: IndexMap::from([(self.theme_name.clone(), Some(self.selector.clone()))]),
      debug_name: None,
      source: None,
    }
  }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConstGroup {
  pub const_name: String,
  pub entries: IndexMap<String, String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeyframesDefinition {
  pub name: String,
  pub ltr: String,
  #[serde(default)]
  pub rtl: Option<String>,
}

/// A compiled binding, as seen by the files importing it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum ExportedValue {
  Namespaces {
    namespaces: IndexMap<String, Namespace>,
  },
  Theme(ThemeDefinition),
  ThemeOverride(ThemeOverride),
  Consts(ConstGroup),
  Keyframes(KeyframesDefinition),
}

/// Bindings visible in the file being compiled: its imports followed by its
/// own declarations as they are compiled.
#[derive(Debug, Clone, Default)]
pub struct SymbolTable {
  bindings: IndexMap<String, ExportedValue>,
}

impl SymbolTable {
  pub fn from_imports(imports: &IndexMap<String, ExportedValue>) -> Self {
    Self {
      bindings: imports.clone(),
    }
  }

  pub fn insert(&mut self, binding: impl Into<String>, value: ExportedValue) {
    self.bindings.insert(binding.into(), value);
  }

  pub fn get(&self, binding: &str) -> Option<&ExportedValue> {
    self.bindings.get(binding)
  }

  pub fn theme(&self, binding: &str) -> Option<&ThemeDefinition> {
    match self.bindings.get(binding)? {
      ExportedValue::Theme(theme) => Some(theme),
      _ => None,
    }
  }

  /// Resolve `binding.key` (or a bare `binding` for keyframes) to the literal
  /// text it stands for.
  pub fn resolve_value(&self, reference: &str) -> CompileResult<String> {
    let (binding, key) = match reference.split_once('.') {
      Some((binding, key)) => (binding, Some(key)),
      None => (reference, None),
    };

    let resolved = match (self.bindings.get(binding), key) {
      (Some(ExportedValue::Theme(theme)), Some(key)) => theme.var_reference(key),
      (Some(ExportedValue::Consts(consts)), Some(key)) => consts.entries.get(key).cloned(),
      (Some(ExportedValue::Keyframes(keyframes)), None) => Some(keyframes.name.clone()),
      _ => None,
    };

    resolved.ok_or_else(|| {
      StyleError::new(
        StyleErrorKind::UnresolvedReference,
        format!("Can't resolve \"{reference}\" to a static value"),
      )
      .with_hints(vec![
        "Only defineVars, defineConsts and keyframes bindings can be used as values".into(),
      ])
    })
  }

  /// The namespace a call site argument refers to.
  pub fn namespace(&self, binding: &str, key: Option<&str>) -> Option<Namespace> {
    match (self.bindings.get(binding)?, key) {
      (ExportedValue::Namespaces { namespaces }, Some(key)) => namespaces.get(key).cloned(),
      (ExportedValue::ThemeOverride(theme_override), None) => Some(theme_override.as_namespace()),
      _ => None,
    }
  }
}
