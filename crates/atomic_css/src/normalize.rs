use crate::config::{AtomicCssConfig, StyleResolution};
use crate::context::{Condition, SelectorContext};
use crate::errors::{CompileResult, StyleError};
use crate::input::{StyleObject, StyleValue, DYNAMIC_KEY_PREFIX, REFERENCE_KEY_PREFIX};
use crate::logical;
use crate::priority::rule_priority;
use crate::properties::{css_property_name, format_number, is_known_property};
use crate::rule::{print_rule, HashCache, StyleRule};
use crate::shorthand::try_expand_shorthand;
use crate::symbols::SymbolTable;
use crate::validator::ValueValidator;

type Declarations = Vec<(String, String)>;

/// A style object entry flattened to the conditions it applies under.
#[derive(Debug, Clone, PartialEq)]
pub struct FlatDeclaration {
  pub context: SelectorContext,
  pub property: String,
  /// `None` is an explicit unset, several values are a fallback list.
  pub values: Option<Vec<String>>,
}

/// Turns authored style objects into atomic rules.
pub struct Normalizer<'a> {
  config: &'a AtomicCssConfig,
  validator: &'a dyn ValueValidator,
  symbols: &'a SymbolTable,
}

impl<'a> Normalizer<'a> {
  pub fn new(
    config: &'a AtomicCssConfig,
    validator: &'a dyn ValueValidator,
    symbols: &'a SymbolTable,
  ) -> Self {
    Self {
      config,
      validator,
      symbols,
    }
  }

  /// Normalize one namespace into its rules, in declaration order.
  pub fn normalize(&self, style: &StyleObject, hashes: &mut HashCache) -> CompileResult<Vec<StyleRule>> {
    let mut rules = Vec::new();
    for declaration in self.flatten(style)? {
      self.push_rules(declaration, hashes, &mut rules)?;
    }
    Ok(rules)
  }

  pub fn flatten(&self, style: &StyleObject) -> CompileResult<Vec<FlatDeclaration>> {
    let mut out = Vec::new();
    self.flatten_object(style, &SelectorContext::default(), None, &mut out)?;
    Ok(out)
  }

  /// Resolve a key that may be a const reference or a non-static expression.
  pub fn resolve_key(&self, key: &str) -> CompileResult<String> {
    if let Some(source) = key.strip_prefix(DYNAMIC_KEY_PREFIX) {
      return Err(StyleError::non_static(format!("Key \"[{source}]\"")));
    }
    if let Some(reference) = key.strip_prefix(REFERENCE_KEY_PREFIX) {
      return self.symbols.resolve_value(reference);
    }
    Ok(key.to_string())
  }

  fn flatten_object(
    &self,
    style: &StyleObject,
    context: &SelectorContext,
    property: Option<&str>,
    out: &mut Vec<FlatDeclaration>,
  ) -> CompileResult<()> {
    for (raw_key, value) in style {
      let key = self.resolve_key(raw_key)?;

      if key == "default" {
        match property {
          Some(property) => self.flatten_value(property, value, context, out)?,
          None => {
            return Err(StyleError::invalid_shape(
              "\"default\" is only allowed inside the value of a property",
            ))
          }
        }
        continue;
      }

      match Condition::parse(&key)? {
        Some(condition) => {
          let context = context.with(&condition)?;
          match (property, value) {
            (Some(property), value) => self.flatten_value(property, value, &context, out)?,
            (None, StyleValue::Object(nested)) => self.flatten_object(nested, &context, None, out)?,
            (None, StyleValue::Dynamic(_)) => {
              return Err(StyleError::non_static(format!("Value of \"{key}\"")))
            }
            (None, _) => {
              return Err(StyleError::invalid_shape(format!(
                "\"{key}\" must map to an object of properties"
              )))
            }
          }
        }
        None => {
          if let Some(outer) = property {
            return Err(StyleError::invalid_shape(format!(
              "Property \"{key}\" can't be nested inside the value of \"{outer}\""
            )));
          }
          let property = property_name(&key)?;
          self.flatten_value(&property, value, context, out)?;
        }
      }
    }
    Ok(())
  }

  fn flatten_value(
    &self,
    property: &str,
    value: &StyleValue,
    context: &SelectorContext,
    out: &mut Vec<FlatDeclaration>,
  ) -> CompileResult<()> {
    let values = match value {
      StyleValue::Object(nested) => return self.flatten_object(nested, context, Some(property), out),
      StyleValue::Null => None,
      StyleValue::Fallback(items) => {
        if items.is_empty() {
          return Err(StyleError::invalid_shape(format!(
            "Fallback values of \"{property}\" can't be empty"
          )));
        }
        let values = items
          .iter()
          .map(|item| match item {
            StyleValue::Null | StyleValue::Object(_) | StyleValue::Fallback(_) => {
              Err(StyleError::invalid_shape(format!(
                "Fallback values of \"{property}\" must be strings or numbers"
              )))
            }
            item => self.literal(property, item),
          })
          .collect::<CompileResult<Vec<_>>>()?;
        Some(values)
      }
      value => Some(vec![self.literal(property, value)?]),
    };

    out.push(FlatDeclaration {
      context: context.clone(),
      property: property.to_string(),
      values,
    });
    Ok(())
  }

  /// Static text of a leaf value.
  pub fn literal(&self, property: &str, value: &StyleValue) -> CompileResult<String> {
    match value {
      StyleValue::String(text) => Ok(text.clone()),
      StyleValue::Number(number) => Ok(format_number(property, *number)),
      StyleValue::Reference(reference) => self.symbols.resolve_value(reference),
      StyleValue::Dynamic(_) => Err(StyleError::non_static(format!("Value of \"{property}\""))),
      StyleValue::Null | StyleValue::Object(_) | StyleValue::Fallback(_) => Err(
        StyleError::invalid_shape(format!("Value of \"{property}\" must be a string or number")),
      ),
    }
  }

  pub fn validate_value(&self, property: &str, value: &str) -> CompileResult<String> {
    self
      .validator
      .validate(property, value)
      .map_err(|reason| StyleError::invalid_value(property, value, reason))
  }

  fn validate(&self, property: &str, values: &[String]) -> CompileResult<Vec<String>> {
    values
      .iter()
      .map(|value| self.validate_value(property, value))
      .collect()
  }

  fn push_rules(
    &self,
    declaration: FlatDeclaration,
    hashes: &mut HashCache,
    out: &mut Vec<StyleRule>,
  ) -> CompileResult<()> {
    let FlatDeclaration {
      context,
      property,
      values,
    } = declaration;

    if self.config.style_resolution() == StyleResolution::ApplicationOrder {
      let single = match values.as_deref() {
        None => Some(None),
        Some([value]) => Some(Some(value.as_str())),
        Some(_) => None,
      };
      if let Some(longhands) = single.and_then(|value| try_expand_shorthand(&property, value)) {
        for (longhand, value) in longhands {
          out.push(self.rule(&context, &longhand, value.map(|v| vec![v]), hashes)?);
        }
        return Ok(());
      }
    }

    out.push(self.rule(&context, &property, values, hashes)?);
    Ok(())
  }

  fn rule(
    &self,
    context: &SelectorContext,
    property: &str,
    values: Option<Vec<String>>,
    hashes: &mut HashCache,
  ) -> CompileResult<StyleRule> {
    let key = context.merge_key(property);
    let priority = rule_priority(property, context);

    let Some(values) = values else {
      return Ok(StyleRule {
        key,
        context: context.clone(),
        property: property.to_string(),
        value: None,
        class_name: None,
        priority,
        ltr: String::new(),
        rtl: None,
      });
    };

    let values = self.validate(property, &values)?;
    let value = values.join(", ");
    let class_name = hashes.atomic_class(context, property, &value);
    let (ltr, rtl) = self.declarations(property, &values);

    Ok(StyleRule {
      key,
      context: context.clone(),
      property: property.to_string(),
      value: Some(value),
      priority,
      ltr: print_rule(context, &class_name, &ltr),
      rtl: rtl.map(|rtl| print_rule(context, &class_name, &rtl)),
      class_name: Some(class_name),
    })
  }

  /// Printed declarations of a validated property value, as a left-to-right
  /// list and, when it differs, its right-to-left mirror.
  pub fn declarations(&self, property: &str, values: &[String]) -> (Declarations, Option<Declarations>) {
    let polyfill = self.config.enable_logical_styles_polyfill();
    let mut ltr = Vec::new();
    let mut rtl = Vec::new();

    for value in values {
      if let Some((left, right)) = logical::flip_directional_value(property, value) {
        ltr.push((property.to_string(), left));
        rtl.push((property.to_string(), right));
        continue;
      }

      match polyfill
        .then(|| logical::physical_declarations(property, value))
        .flatten()
      {
        Some((physical_ltr, physical_rtl)) => {
          ltr.extend(physical_ltr);
          rtl.extend(physical_rtl);
        }
        None => {
          ltr.push((property.to_string(), value.clone()));
          rtl.push((property.to_string(), value.clone()));
        }
      }
    }

    let rtl = (rtl != ltr).then_some(rtl);
    (ltr, rtl)
  }

  /// Validate and print a flat declaration without hashing it.
  pub fn print(&self, declaration: &FlatDeclaration) -> CompileResult<(Declarations, Option<Declarations>)> {
    match &declaration.values {
      Some(values) => {
        let values = self.validate(&declaration.property, values)?;
        Ok(self.declarations(&declaration.property, &values))
      }
      None => Ok((Vec::new(), None)),
    }
  }
}

/// Kebab-cased standard name of an authored property key.
pub fn property_name(key: &str) -> CompileResult<String> {
  let property = css_property_name(key);
  let property = logical::canonical_property(&property).to_string();
  if !is_known_property(&property) {
    return Err(StyleError::unknown_property(key));
  }
  Ok(property)
}
