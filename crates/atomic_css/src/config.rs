use serde::Deserialize;
use serde::Serialize;

use crate::errors::{CompileResult, StyleError, StyleErrorKind};

/// How shorthand properties interact with their longhands.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StyleResolution {
  /// Shorthands stay whole and the priority tiers decide which declaration
  /// wins in the cascade.
  #[default]
  PropertySpecificity,
  /// Shorthands expand into longhands so the last applied declaration wins.
  ApplicationOrder,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AtomicCssConfig {
  ///
  /// Prefix of every generated class name, theme selector and variable name.
  /// Must be a valid CSS identifier.
  ///
  /// Defaults to `"x"`
  ///
  pub class_name_prefix: Option<String>,
  ///
  /// Whether shorthands are kept whole or expanded into longhands.
  ///
  /// Defaults to `property-specificity`
  ///
  pub style_resolution: Option<StyleResolution>,
  ///
  /// Fold call sites with conditional arguments into dispatch tables.
  /// When disabled those call sites fall back to the runtime merge.
  ///
  /// Defaults to `true`
  ///
  pub fold_conditional_merges: Option<bool>,
  ///
  /// Upper bound for the number of distinct conditions folded at one call
  /// site. A call site with `k` conditions produces a table of `2^k` entries.
  ///
  /// Defaults to `6`
  ///
  pub max_dispatch_conditions: Option<u32>,
  ///
  /// Drop namespace bindings that are only used by folded call sites.
  ///
  /// Defaults to `true`
  ///
  pub dead_code_elimination: Option<bool>,
  ///
  /// Add debug class names and source attributes to folded call sites.
  /// Never changes generated class names or the stylesheet.
  ///
  /// Defaults to `false`
  ///
  pub debug: Option<bool>,
  ///
  /// Emit `@layer` blocks instead of the specificity polyfill.
  ///
  /// Defaults to `false`
  ///
  pub use_native_layers: Option<bool>,
  ///
  /// Print inline logical properties as physical left/right declarations with
  /// a mirrored right-to-left variant. When disabled they are printed as-is.
  ///
  /// Defaults to `true`
  ///
  pub enable_logical_styles_polyfill: Option<bool>,
}

/// Hard ceiling for `maxDispatchConditions`, a 4096 entry table.
pub const MAX_DISPATCH_CONDITIONS_LIMIT: u32 = 12;

impl AtomicCssConfig {
  pub fn from_json(json: &str) -> CompileResult<Self> {
    let config: Self = serde_json::from_str(json).map_err(|err| {
      StyleError::new(
        StyleErrorKind::InvalidConfig,
        format!("Invalid atomic css config: {err}"),
      )
    })?;
    config.validate()?;
    Ok(config)
  }

  pub fn validate(&self) -> CompileResult<()> {
    let prefix = self.class_name_prefix();
    if !is_css_identifier_valid(prefix) {
      return Err(StyleError::new(
        StyleErrorKind::InvalidConfig,
        format!(
          "{prefix} isn't a valid CSS identifier. Accepted characters are ^[a-zA-Z\\-_]+[a-zA-Z\\-_0-9]*$"
        ),
      ));
    }

    if let Some(max) = self.max_dispatch_conditions {
      if max > MAX_DISPATCH_CONDITIONS_LIMIT {
        return Err(StyleError::new(
          StyleErrorKind::InvalidConfig,
          format!("maxDispatchConditions must be at most {MAX_DISPATCH_CONDITIONS_LIMIT}, got {max}"),
        ));
      }
    }

    Ok(())
  }

  pub fn class_name_prefix(&self) -> &str {
    self.class_name_prefix.as_deref().unwrap_or("x")
  }

  pub fn style_resolution(&self) -> StyleResolution {
    self.style_resolution.unwrap_or_default()
  }

  pub fn fold_conditional_merges(&self) -> bool {
    self.fold_conditional_merges.unwrap_or(true)
  }

  pub fn max_dispatch_conditions(&self) -> u32 {
    self
      .max_dispatch_conditions
      .unwrap_or(6)
      .min(MAX_DISPATCH_CONDITIONS_LIMIT)
  }

  pub fn dead_code_elimination(&self) -> bool {
    self.dead_code_elimination.unwrap_or(true)
  }

  pub fn debug(&self) -> bool {
    self.debug.unwrap_or(false)
  }

  pub fn use_native_layers(&self) -> bool {
    self.use_native_layers.unwrap_or(false)
  }

  pub fn enable_logical_styles_polyfill(&self) -> bool {
    self.enable_logical_styles_polyfill.unwrap_or(true)
  }
}

fn is_css_identifier_valid(value: &str) -> bool {
  let mut chars = value.chars();
  match chars.next() {
    Some(first) if first.is_ascii_alphabetic() || first == '-' || first == '_' => {}
    _ => return false,
  }
  chars.all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}
