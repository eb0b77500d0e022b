use std::fmt::Display;
use std::fmt::Formatter;

use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

/// Position of a declaration in the original source file, as reported by the
/// front end that parsed it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceLocation {
  pub file: String,
  pub line: u32,
  pub column: u32,
}

impl Display for SourceLocation {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    write!(f, "{}:{}:{}", self.file, self.line, self.column)
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StyleErrorKind {
  /// A key or value the front end could not evaluate statically.
  NonStaticValue,
  UnknownProperty,
  UnknownAtRule,
  /// The value was rejected by the value grammar validator.
  InvalidValue,
  /// The shape of a style object is not allowed (property nested inside a
  /// property, nested objects inside fallback arrays, ...).
  InvalidShape,
  /// createTheme overrides do not match the keys of the theme definition.
  ThemeShapeMismatch,
  UnresolvedReference,
  InvalidConfig,
}

/// A structural validation error. It aborts compilation of the file that
/// produced it and is reported to the user with the offending location.
#[derive(Error, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StyleError {
  pub kind: StyleErrorKind,
  pub message: String,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub loc: Option<SourceLocation>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub hints: Option<Vec<String>>,
}

impl Display for StyleError {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    match &self.loc {
      Some(loc) => write!(f, "{} ({})", self.message, loc),
      None => f.write_str(&self.message),
    }
  }
}

impl StyleError {
  pub fn new(kind: StyleErrorKind, message: impl Into<String>) -> Self {
    Self {
      kind,
      message: message.into(),
      loc: None,
      hints: None,
    }
  }

  pub fn with_hints(mut self, hints: Vec<String>) -> Self {
    self.hints = Some(hints);
    self
  }

  /// Attach a location unless a more precise one was already recorded.
  pub fn at(mut self, loc: Option<&SourceLocation>) -> Self {
    if self.loc.is_none() {
      self.loc = loc.cloned();
    }
    self
  }

  pub fn non_static(what: impl Display) -> Self {
    Self::new(
      StyleErrorKind::NonStaticValue,
      format!("{what} must be statically resolvable at compile time"),
    )
    .with_hints(vec![
      "Move dynamic values into a CSS variable and set it through an inline style".into(),
    ])
  }

  pub fn unknown_property(property: &str) -> Self {
    Self::new(
      StyleErrorKind::UnknownProperty,
      format!("Unknown CSS property \"{property}\""),
    )
  }

  pub fn invalid_value(property: &str, value: &str, reason: impl Display) -> Self {
    Self::new(
      StyleErrorKind::InvalidValue,
      format!("Invalid value \"{value}\" for \"{property}\": {reason}"),
    )
  }

  pub fn invalid_shape(message: impl Into<String>) -> Self {
    Self::new(StyleErrorKind::InvalidShape, message)
  }
}

pub type CompileResult<T> = Result<T, StyleError>;
