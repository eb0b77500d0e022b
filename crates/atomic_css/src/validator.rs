use lightningcss::properties::Property;
use lightningcss::stylesheet::ParserOptions;
use lightningcss::stylesheet::StyleAttribute;

use crate::context::collapse_whitespace;
use crate::properties::is_known_property;

const CSS_WIDE_KEYWORDS: &[&str] = &["inherit", "initial", "unset", "revert", "revert-layer"];

/// Validates a single `property: value` pair and returns the value in the
/// form that is hashed and printed.
pub trait ValueValidator: Send + Sync {
  fn validate(&self, property: &str, value: &str) -> Result<String, String>;
}

fn check_structure(value: &str) -> Result<String, String> {
  let value = collapse_whitespace(value);
  if value.is_empty() {
    return Err("value is empty".into());
  }
  if let Some(c) = value.chars().find(|c| matches!(c, '{' | '}' | ';')) {
    return Err(format!("unexpected \"{c}\""));
  }
  Ok(value)
}

/// Checks values against the CSS grammar with lightningcss. The value is never
/// reprinted by lightningcss so class names don't change across its versions.
///
/// lightningcss keeps values it can't parse as unparsed token lists, so those
/// are the rejections. Properties it doesn't know at all are only checked
/// against the known property table.
#[derive(Debug, Default, Clone, Copy)]
pub struct LightningCssValidator;

impl ValueValidator for LightningCssValidator {
  fn validate(&self, property: &str, value: &str) -> Result<String, String> {
    let value = check_structure(value)?;

    // Neither custom properties nor var() substitutions can be checked statically
    if property.starts_with("--") || value.contains("var(") || value.contains("env(") {
      return Ok(value);
    }
    if CSS_WIDE_KEYWORDS.contains(&value.as_str()) {
      return Ok(value);
    }

    let source = format!("{property}:{value}");
    let options = ParserOptions {
      filename: String::from("style.css"),
      error_recovery: false,
      ..ParserOptions::default()
    };
    let attribute = StyleAttribute::parse(&source, options).map_err(|err| err.to_string())?;

    let block = &attribute.declarations;
    let mut parsed = block
      .declarations
      .iter()
      .chain(&block.important_declarations)
      .peekable();
    if parsed.peek().is_none() {
      return Err(format!("\"{value}\" is not a valid {property} value"));
    }

    for declaration in parsed {
      match declaration {
        Property::Unparsed(_) => {
          return Err(format!("\"{value}\" is not a valid {property} value"));
        }
        Property::Custom(_) if !is_known_property(property) => {
          return Err(format!("\"{property}\" is not a known property"));
        }
        _ => {}
      }
    }

    Ok(value)
  }
}

/// Accepts any value that is structurally safe to print inside a rule.
#[derive(Debug, Default, Clone, Copy)]
pub struct PermissiveValidator;

impl ValueValidator for PermissiveValidator {
  fn validate(&self, _property: &str, value: &str) -> Result<String, String> {
    check_structure(value)
  }
}
