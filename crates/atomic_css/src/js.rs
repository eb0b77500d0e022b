use indexmap::IndexMap;
use serde_json::Map;
use serde_json::Value;

use crate::symbols::{ConstGroup, Namespace, ThemeDefinition, ThemeOverride, THEME_NAME_KEY};

/// Marker property that tells the runtime merge an object is a compiled
/// namespace. In debug builds it carries the source location instead of `true`.
pub const NAMESPACE_MARKER: &str = "$$css";
pub const STYLE_SRC_ATTRIBUTE: &str = "data-style-src";

pub fn string_literal(text: &str) -> String {
  Value::String(text.to_string()).to_string()
}

/// `{className: "..."}` plus the source attribute in debug builds.
pub fn props_object(class_name: &str, style_src: Option<&str>) -> String {
  let mut props = Map::new();
  if !class_name.is_empty() {
    props.insert("className".into(), Value::String(class_name.to_string()));
  }
  if let Some(style_src) = style_src {
    props.insert(STYLE_SRC_ATTRIBUTE.into(), Value::String(style_src.to_string()));
  }
  Value::Object(props).to_string()
}

/// `[a, b, c, d][(!!(t0) << 1) | (!!(t1) << 0)]`
pub fn dispatch(table: &[String], tests: &[String]) -> String {
  let count = tests.len();
  let index = tests
    .iter()
    .enumerate()
    .map(|(i, test)| format!("(!!({test}) << {})", count - 1 - i))
    .collect::<Vec<_>>()
    .join(" | ");
  format!("[{}][{index}]", table.join(", "))
}

fn namespace_value(namespace: &Namespace) -> Value {
  let mut object = Map::new();
  for (key, class_name) in &namespace.entries {
    let value = match class_name {
      Some(class_name) => Value::String(class_name.clone()),
      None => Value::Null,
    };
    object.insert(key.clone(), value);
  }
  let marker = match &namespace.source {
    Some(source) => Value::String(source.clone()),
    None => Value::Bool(true),
  };
  object.insert(NAMESPACE_MARKER.into(), marker);
  Value::Object(object)
}

/// Runtime form of a `create` binding, used by call sites that weren't folded.
pub fn namespaces_object(namespaces: &IndexMap<String, Namespace>) -> String {
  let object: Map<String, Value> = namespaces
    .iter()
    .map(|(name, namespace)| (name.clone(), namespace_value(namespace)))
    .collect();
  Value::Object(object).to_string()
}

pub fn theme_object(theme: &ThemeDefinition) -> String {
  let mut object = Map::new();
  for key in theme.variables.keys() {
    if let Some(reference) = theme.var_reference(key) {
      object.insert(key.clone(), Value::String(reference));
    }
  }
  object.insert(THEME_NAME_KEY.into(), Value::String(theme.theme_name.clone()));
  Value::Object(object).to_string()
}

pub fn theme_override_object(theme_override: &ThemeOverride) -> String {
  namespace_value(&theme_override.as_namespace()).to_string()
}

pub fn consts_object(consts: &ConstGroup) -> String {
  let object: Map<String, Value> = consts
    .entries
    .iter()
    .map(|(key, value)| (key.clone(), Value::String(value.clone())))
    .collect();
  Value::Object(object).to_string()
}
