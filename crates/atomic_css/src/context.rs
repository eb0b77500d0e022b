use serde::Deserialize;
use serde::Serialize;

use crate::errors::{CompileResult, StyleError, StyleErrorKind};

const SUPPORTED_AT_RULES: &[&str] = &["@media", "@supports", "@container"];

// Pseudo-elements that CSS2 allowed with a single colon.
const LEGACY_PSEUDO_ELEMENTS: &[&str] = &[":before", ":after", ":first-line", ":first-letter"];

/// Separates the segments of a context key and a merge key. It can't appear
/// in a property name or in any condition the front end extracts.
pub const KEY_SEPARATOR: &str = "\u{1}";

/// A nesting key of a style object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Condition {
  AtRule(String),
  PseudoClass(String),
  PseudoElement(String),
}

impl Condition {
  /// Classify a style object key. Returns `Ok(None)` for keys that are not
  /// conditions (property names and `default`).
  pub fn parse(key: &str) -> CompileResult<Option<Condition>> {
    let key = key.trim();

    if key.starts_with('@') {
      let at_rule = collapse_whitespace(key);
      let name = at_rule.split([' ', '(']).next().unwrap_or_default();
      if !SUPPORTED_AT_RULES.contains(&name) {
        return Err(StyleError::new(
          StyleErrorKind::UnknownAtRule,
          format!("Unsupported at-rule \"{at_rule}\""),
        )
        .with_hints(vec![format!(
          "Supported at-rules are {}",
          SUPPORTED_AT_RULES.join(", ")
        )]));
      }
      return Ok(Some(Condition::AtRule(at_rule)));
    }

    if key.starts_with(':') {
      return Ok(Some(Condition::pseudo(key)));
    }

    Ok(None)
  }

  fn pseudo(selector: &str) -> Condition {
    if selector.starts_with("::") {
      Condition::PseudoElement(selector.to_string())
    } else if LEGACY_PSEUDO_ELEMENTS.contains(&selector) {
      Condition::PseudoElement(format!(":{selector}"))
    } else {
      Condition::PseudoClass(selector.to_string())
    }
  }
}

/// Split a compound pseudo selector (`:focus:hover`, `:hover::before`) into
/// its simple selectors. Colons inside parentheses don't split.
fn split_pseudo_selector(selector: &str) -> Vec<&str> {
  let mut parts = Vec::new();
  let mut start = 0;
  let mut depth = 0usize;

  for (index, c) in selector.char_indices() {
    match c {
      '(' => depth += 1,
      ')' => depth = depth.saturating_sub(1),
      // `index == start + 1` is the second colon of `::`
      ':' if depth == 0 && index > start + 1 => {
        parts.push(&selector[start..index]);
        start = index;
      }
      _ => {}
    }
  }
  parts.push(&selector[start..]);
  parts
}

/// The conditions a declaration applies under, in canonical form: at-rules
/// and pseudo-classes sorted and deduplicated, at most one pseudo-element.
/// Two contexts that select the same elements compare equal.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectorContext {
  pub at_rules: Vec<String>,
  pub pseudo_classes: Vec<String>,
  pub pseudo_element: Option<String>,
}

impl SelectorContext {
  pub fn with(&self, condition: &Condition) -> CompileResult<Self> {
    if let Condition::PseudoClass(selector) | Condition::PseudoElement(selector) = condition {
      let parts = split_pseudo_selector(selector);
      if parts.len() > 1 {
        return parts
          .into_iter()
          .try_fold(self.clone(), |context, part| context.with(&Condition::pseudo(part)));
      }
    }

    let mut next = self.clone();
    match condition {
      Condition::AtRule(at_rule) => insert_sorted(&mut next.at_rules, at_rule),
      Condition::PseudoClass(pseudo) => {
        if self.pseudo_element.is_some() {
          return Err(StyleError::invalid_shape(format!(
            "Pseudo-class \"{pseudo}\" can't be nested inside a pseudo-element"
          )));
        }
        insert_sorted(&mut next.pseudo_classes, pseudo)
      }
      Condition::PseudoElement(element) => match &self.pseudo_element {
        Some(existing) if existing != element => {
          return Err(StyleError::invalid_shape(format!(
            "Pseudo-element \"{element}\" can't be nested inside \"{existing}\""
          )));
        }
        _ => next.pseudo_element = Some(element.clone()),
      },
    }
    Ok(next)
  }

  pub fn is_empty(&self) -> bool {
    self.at_rules.is_empty() && self.pseudo_classes.is_empty() && self.pseudo_element.is_none()
  }

  /// Canonical text of the context, used in hash inputs and merge keys.
  pub fn key(&self) -> String {
    let segments: Vec<&str> = self
      .at_rules
      .iter()
      .chain(&self.pseudo_classes)
      .chain(&self.pseudo_element)
      .map(String::as_str)
      .collect();
    segments.join(KEY_SEPARATOR)
  }

  /// The key a namespace stores this declaration under. Later entries with the
  /// same key replace earlier ones when namespaces merge.
  pub fn merge_key(&self, property: &str) -> String {
    if self.is_empty() {
      property.to_string()
    } else {
      format!("{property}{KEY_SEPARATOR}{}", self.key())
    }
  }

  /// `text` preceded by the context key, or `text` alone without conditions.
  pub fn prefixed(&self, text: &str) -> String {
    if self.is_empty() {
      text.to_string()
    } else {
      format!("{}{KEY_SEPARATOR}{text}", self.key())
    }
  }

  pub fn selector(&self, class_name: &str) -> String {
    let mut selector = format!(".{class_name}{}", self.pseudo_classes.concat());
    if let Some(element) = &self.pseudo_element {
      selector.push_str(element);
    }
    selector
  }

  /// Nest `rule` inside the context's at-rules, outermost first.
  pub fn wrap(&self, rule: String) -> String {
    self
      .at_rules
      .iter()
      .rev()
      .fold(rule, |inner, at_rule| format!("{at_rule}{{{inner}}}"))
  }
}

/// Property a merge key was built from.
pub fn merge_key_property(merge_key: &str) -> &str {
  merge_key
    .split_once(KEY_SEPARATOR)
    .map_or(merge_key, |(property, _)| property)
}

fn insert_sorted(list: &mut Vec<String>, value: &str) {
  if let Err(index) = list.binary_search_by(|existing| existing.as_str().cmp(value)) {
    list.insert(index, value.to_string());
  }
}

pub fn collapse_whitespace(value: &str) -> String {
  value.split_whitespace().collect::<Vec<_>>().join(" ")
}
