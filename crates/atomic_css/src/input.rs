use indexmap::IndexMap;
use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;

use crate::errors::SourceLocation;
use crate::symbols::ExportedValue;

const DYNAMIC_MARKER: &str = "$dynamic";
const REFERENCE_MARKER: &str = "$ref";

/// Prefix of object keys the front end could not evaluate.
pub const DYNAMIC_KEY_PREFIX: &str = "$dynamic:";
/// Prefix of object keys that are a reference to a const, e.g. a breakpoint.
pub const REFERENCE_KEY_PREFIX: &str = "$ref:";

pub type StyleObject = IndexMap<String, StyleValue>;

/// A style value as evaluated by the front end.
///
/// Objects tagged `{"$ref": "binding.key"}` refer to an imported or local
/// theme variable, const or keyframes name, and `{"$dynamic": "<source>"}`
/// marks an expression that could not be evaluated statically.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "Value", into = "Value")]
pub enum StyleValue {
  Null,
  String(String),
  Number(f64),
  Fallback(Vec<StyleValue>),
  Object(StyleObject),
  Reference(String),
  Dynamic(String),
}

impl From<Value> for StyleValue {
  fn from(value: Value) -> Self {
    match value {
      Value::Null => StyleValue::Null,
      Value::Bool(b) => StyleValue::String(b.to_string()),
      Value::Number(n) => StyleValue::Number(n.as_f64().unwrap_or_default()),
      Value::String(s) => StyleValue::String(s),
      Value::Array(items) => StyleValue::Fallback(items.into_iter().map(StyleValue::from).collect()),
      Value::Object(mut map) => {
        if map.len() == 1 {
          if let Some(Value::String(reference)) = map.get(REFERENCE_MARKER) {
            return StyleValue::Reference(reference.clone());
          }
          if let Some(source) = map.remove(DYNAMIC_MARKER) {
            return StyleValue::Dynamic(match source {
              Value::String(source) => source,
              other => other.to_string(),
            });
          }
        }
        StyleValue::Object(
          map
            .into_iter()
            .map(|(key, value)| (key, StyleValue::from(value)))
            .collect(),
        )
      }
    }
  }
}

impl From<StyleValue> for Value {
  fn from(value: StyleValue) -> Self {
    match value {
      StyleValue::Null => Value::Null,
      StyleValue::String(s) => Value::String(s),
      StyleValue::Number(n) => serde_json::Number::from_f64(n)
        .map(Value::Number)
        .unwrap_or(Value::Null),
      StyleValue::Fallback(items) => Value::Array(items.into_iter().map(Value::from).collect()),
      StyleValue::Object(map) => Value::Object(
        map
          .into_iter()
          .map(|(key, value)| (key, Value::from(value)))
          .collect(),
      ),
      StyleValue::Reference(reference) => tagged(REFERENCE_MARKER, reference),
      StyleValue::Dynamic(source) => tagged(DYNAMIC_MARKER, source),
    }
  }
}

fn tagged(marker: &str, text: String) -> Value {
  let mut map = serde_json::Map::new();
  map.insert(marker.to_string(), Value::String(text));
  Value::Object(map)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateDeclaration {
  pub name: String,
  #[serde(default)]
  pub exported: bool,
  #[serde(default)]
  pub loc: Option<SourceLocation>,
  pub namespaces: IndexMap<String, StyleValue>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DefineVarsDeclaration {
  pub name: String,
  #[serde(default)]
  pub exported: bool,
  #[serde(default)]
  pub loc: Option<SourceLocation>,
  pub vars: StyleObject,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateThemeDeclaration {
  pub name: String,
  #[serde(default)]
  pub exported: bool,
  #[serde(default)]
  pub loc: Option<SourceLocation>,
  /// Binding of the `defineVars` group being overridden.
  pub theme: String,
  pub overrides: StyleObject,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DefineConstsDeclaration {
  pub name: String,
  #[serde(default)]
  pub exported: bool,
  #[serde(default)]
  pub loc: Option<SourceLocation>,
  pub consts: StyleObject,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeyframesDeclaration {
  pub name: String,
  #[serde(default)]
  pub exported: bool,
  #[serde(default)]
  pub loc: Option<SourceLocation>,
  pub frames: StyleObject,
}

/// A top-level style declaration found in a file, in source order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Declaration {
  Create(CreateDeclaration),
  DefineVars(DefineVarsDeclaration),
  CreateTheme(CreateThemeDeclaration),
  DefineConsts(DefineConstsDeclaration),
  Keyframes(KeyframesDeclaration),
}

impl Declaration {
  pub fn name(&self) -> &str {
    match self {
      Declaration::Create(d) => &d.name,
      Declaration::DefineVars(d) => &d.name,
      Declaration::CreateTheme(d) => &d.name,
      Declaration::DefineConsts(d) => &d.name,
      Declaration::Keyframes(d) => &d.name,
    }
  }

  pub fn exported(&self) -> bool {
    match self {
      Declaration::Create(d) => d.exported,
      Declaration::DefineVars(d) => d.exported,
      Declaration::CreateTheme(d) => d.exported,
      Declaration::DefineConsts(d) => d.exported,
      Declaration::Keyframes(d) => d.exported,
    }
  }

  pub fn loc(&self) -> Option<&SourceLocation> {
    match self {
      Declaration::Create(d) => d.loc.as_ref(),
      Declaration::DefineVars(d) => d.loc.as_ref(),
      Declaration::CreateTheme(d) => d.loc.as_ref(),
      Declaration::DefineConsts(d) => d.loc.as_ref(),
      Declaration::Keyframes(d) => d.loc.as_ref(),
    }
  }
}

/// A call site argument, resolved by the front end as far as it could.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum StyleExpr {
  /// `styles.button`, or a whole binding when `key` is absent.
  Ref {
    binding: String,
    #[serde(default)]
    key: Option<String>,
  },
  Null,
  Conditional {
    test: String,
    consequent: Box<StyleExpr>,
    alternate: Box<StyleExpr>,
  },
  /// `test && right`
  And { test: String, right: Box<StyleExpr> },
  Array { items: Vec<StyleExpr> },
  Unresolvable { source: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CallForm {
  /// Evaluates to a class name string.
  ClassName,
  /// Evaluates to an attribute object `{className, ...}`.
  Props,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CallSite {
  pub id: String,
  pub form: CallForm,
  pub args: Vec<StyleExpr>,
  #[serde(default)]
  pub loc: Option<SourceLocation>,
}

/// Everything the front end extracted from one source file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileInput {
  pub file: String,
  #[serde(default)]
  pub declarations: Vec<Declaration>,
  /// Imported bindings, as exported by the files that define them.
  #[serde(default)]
  pub imports: IndexMap<String, ExportedValue>,
  #[serde(default)]
  pub call_sites: Vec<CallSite>,
  /// References to local bindings outside of call sites.
  #[serde(default)]
  pub references: IndexMap<String, u32>,
}

impl FileInput {
  pub fn from_json(json: &str) -> serde_json::Result<Self> {
    serde_json::from_str(json)
  }
}

#[cfg(test)]
mod tests {
  use pretty_assertions::assert_eq;
  use serde_json::json;

  use super::*;

  #[test]
  fn style_values_from_json() {
    let value = StyleValue::from(json!({
      "color": "red",
      "padding": 4,
      "position": ["sticky", "fixed"],
      "margin": null,
      "width": {"$dynamic": "props.width"},
      "height": {"$ref": "sizes.large"},
    }));

    let StyleValue::Object(map) = value else {
      panic!("expected an object");
    };
    assert_eq!(map["color"], StyleValue::String("red".into()));
    assert_eq!(map["padding"], StyleValue::Number(4.0));
    assert_eq!(
      map["position"],
      StyleValue::Fallback(vec![
        StyleValue::String("sticky".into()),
        StyleValue::String("fixed".into())
      ])
    );
    assert_eq!(map["margin"], StyleValue::Null);
    assert_eq!(map["width"], StyleValue::Dynamic("props.width".into()));
    assert_eq!(map["height"], StyleValue::Reference("sizes.large".into()));
    assert_eq!(
      map.keys().collect::<Vec<_>>(),
      vec!["color", "padding", "position", "margin", "width", "height"]
    );
  }

  #[test]
  fn file_input_from_json() {
    let input: FileInput = serde_json::from_value(json!({
      "file": "src/button.js",
      "declarations": [
        {
          "kind": "create",
          "name": "styles",
          "loc": {"file": "src/button.js", "line": 3, "column": 15},
          "namespaces": {"root": {"color": "red"}}
        },
        {"kind": "defineVars", "name": "colors", "exported": true, "vars": {"primary": "blue"}}
      ],
      "callSites": [
        {
          "id": "c0",
          "form": "className",
          "args": [
            {"type": "ref", "binding": "styles", "key": "root"},
            {"type": "and", "test": "isActive", "right": {"type": "null"}}
          ]
        }
      ],
      "references": {"styles": 0}
    }))
    .unwrap();

    assert_eq!(input.declarations.len(), 2);
    assert_eq!(input.declarations[0].name(), "styles");
    assert!(!input.declarations[0].exported());
    assert_eq!(input.declarations[0].loc().map(|l| l.line), Some(3));
    assert!(input.declarations[1].exported());
    assert_eq!(input.call_sites[0].form, CallForm::ClassName);
    assert_eq!(
      input.call_sites[0].args[1],
      StyleExpr::And {
        test: "isActive".into(),
        right: Box::new(StyleExpr::Null)
      }
    );
    assert!(input.imports.is_empty());
  }
}
