use std::collections::HashMap;

use atomic_css_hash::hash;
use serde::Deserialize;
use serde::Serialize;

use crate::context::SelectorContext;

/// Printed CSS of a rule. `rtl` is only present when it differs from `ltr`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct InjectableStyle {
  pub ltr: String,
  pub rtl: Option<String>,
}

/// Metadata of one generated rule, serialized as
/// `[className, {ltr, rtl}, priority]`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct InjectableRule(pub String, pub InjectableStyle, pub u32);

impl InjectableRule {
  pub fn new(class_name: impl Into<String>, style: InjectableStyle, priority: u32) -> Self {
    Self(class_name.into(), style, priority)
  }

  pub fn class_name(&self) -> &str {
    &self.0
  }

  pub fn style(&self) -> &InjectableStyle {
    &self.1
  }

  pub fn priority(&self) -> u32 {
    self.2
  }
}

/// One atomic declaration after normalization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StyleRule {
  /// Namespace key, see [`SelectorContext::merge_key`].
  pub key: String,
  pub context: SelectorContext,
  /// Identity property (logical properties keep their logical name).
  pub property: String,
  /// `None` is an explicit unset.
  pub value: Option<String>,
  pub class_name: Option<String>,
  pub priority: u32,
  pub ltr: String,
  pub rtl: Option<String>,
}

impl StyleRule {
  pub fn to_injectable(&self) -> Option<InjectableRule> {
    let class_name = self.class_name.as_ref()?;
    Some(InjectableRule::new(
      class_name.clone(),
      InjectableStyle {
        ltr: self.ltr.clone(),
        rtl: self.rtl.clone(),
      },
      self.priority,
    ))
  }
}

/// Memoized class name hashing for one compilation unit.
#[derive(Debug)]
pub struct HashCache {
  prefix: String,
  cache: HashMap<String, String>,
}

impl HashCache {
  pub fn new(prefix: impl Into<String>) -> Self {
    Self {
      prefix: prefix.into(),
      cache: HashMap::new(),
    }
  }

  pub fn prefix(&self) -> &str {
    &self.prefix
  }

  /// `prefix + hash(input)`
  pub fn name(&mut self, input: &str) -> String {
    if let Some(name) = self.cache.get(input) {
      return name.clone();
    }
    let name = format!("{}{}", self.prefix, hash(input));
    self.cache.insert(input.to_string(), name.clone());
    name
  }

  /// Class name of an atomic declaration. The file it was declared in is not
  /// part of the input, so identical declarations share a class across a build.
  pub fn atomic_class(&mut self, context: &SelectorContext, property: &str, value: &str) -> String {
    self.name(&format!("<>{}", context.prefixed(&format!("{property}:{value}"))))
  }
}

pub fn print_declarations(declarations: &[(String, String)]) -> String {
  declarations
    .iter()
    .map(|(property, value)| format!("{property}:{value}"))
    .collect::<Vec<_>>()
    .join(";")
}

/// `@media ...{.x1:hover{color:red}}`
pub fn print_rule(context: &SelectorContext, class_name: &str, declarations: &[(String, String)]) -> String {
  context.wrap(format!(
    "{}{{{}}}",
    context.selector(class_name),
    print_declarations(declarations)
  ))
}
