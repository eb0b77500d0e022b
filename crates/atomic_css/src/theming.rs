use std::collections::BTreeMap;
use std::collections::BTreeSet;

use atomic_css_hash::hash;

use crate::context::{Condition, SelectorContext};
use crate::errors::{CompileResult, StyleError, StyleErrorKind};
use crate::input::{StyleObject, StyleValue};
use crate::normalize::Normalizer;
use crate::priority::{theme_rule_priority, THEME_OVERRIDE_PRIORITY, THEME_VARS_PRIORITY};
use crate::properties::format_css_number;
use crate::rule::{print_declarations, HashCache, InjectableRule, InjectableStyle};
use crate::symbols::{ConstGroup, ThemeDefinition, ThemeOverride};

/// Declarations grouped by the at-rules they apply under, sorted so the
/// output never depends on the order keys were written in.
type ConditionalDeclarations = BTreeMap<String, (SelectorContext, Vec<(String, String)>)>;

pub struct DefinedVars {
  pub theme: ThemeDefinition,
  pub rules: Vec<InjectableRule>,
}

pub struct CreatedTheme {
  pub theme_override: ThemeOverride,
  pub rules: Vec<InjectableRule>,
}

pub struct DefinedConsts {
  pub consts: ConstGroup,
  pub rules: Vec<InjectableRule>,
}

/// Theme names and const names include the defining file so two files
/// exporting the same name never collide.
fn group_name(hashes: &mut HashCache, file: &str, export: &str) -> String {
  hashes.name(&format!("{file}//{export}"))
}

/// Collect the values of one variable, keyed by `default` and at-rules.
fn collect_values(
  normalizer: &Normalizer<'_>,
  variable: &str,
  value: &StyleValue,
  context: &SelectorContext,
  out: &mut Vec<(SelectorContext, String)>,
) -> CompileResult<()> {
  let StyleValue::Object(conditions) = value else {
    let literal = normalizer.literal(variable, value)?;
    out.push((context.clone(), normalizer.validate_value(variable, &literal)?));
    return Ok(());
  };

  for (raw_key, nested) in conditions {
    let key = normalizer.resolve_key(raw_key)?;
    if key == "default" {
      collect_values(normalizer, variable, nested, context, out)?;
      continue;
    }

    match Condition::parse(&key)? {
      Some(condition @ Condition::AtRule(_)) => {
        let context = context.with(&condition)?;
        collect_values(normalizer, variable, nested, &context, out)?;
      }
      _ => {
        return Err(StyleError::invalid_shape(format!(
          "Theme variable values can only be conditioned on at-rules, found \"{key}\""
        )))
      }
    }
  }
  Ok(())
}

fn group_by_context(assignments: Vec<(String, SelectorContext, String)>) -> ConditionalDeclarations {
  let mut groups = ConditionalDeclarations::new();
  for (variable, context, value) in assignments {
    groups
      .entry(context.key())
      .or_insert_with(|| (context, Vec::new()))
      .1
      .push((variable, value));
  }
  for (_, declarations) in groups.values_mut() {
    declarations.sort();
  }
  groups
}

fn theme_rules(
  groups: &ConditionalDeclarations,
  class_name: &str,
  selector: &str,
  base_priority: u32,
) -> Vec<InjectableRule> {
  groups
    .iter()
    .map(|(key, (context, declarations))| {
      let ltr = context.wrap(format!(
        "{selector}{{{}}}",
        print_declarations(declarations)
      ));
      let rule_class = if context.is_empty() {
        class_name.to_string()
      } else {
        format!("{class_name}-{}", hash(key))
      };
      InjectableRule::new(
        rule_class,
        InjectableStyle { ltr, rtl: None },
        theme_rule_priority(base_priority, context),
      )
    })
    .collect()
}

fn variable_name(hashes: &mut HashCache, theme_name: &str, key: &str) -> String {
  if key.starts_with("--") {
    key.to_string()
  } else {
    format!("--{}", hashes.name(&format!("{theme_name}.{key}")))
  }
}

pub fn define_vars(
  normalizer: &Normalizer<'_>,
  hashes: &mut HashCache,
  file: &str,
  export: &str,
  vars: &StyleObject,
) -> CompileResult<DefinedVars> {
  let theme_name = group_name(hashes, file, export);

  let mut variables = indexmap::IndexMap::new();
  let mut assignments = Vec::new();
  for (raw_key, value) in vars {
    let key = normalizer.resolve_key(raw_key)?;
    let variable = variable_name(hashes, &theme_name, &key);

    let mut values = Vec::new();
    collect_values(normalizer, &variable, value, &SelectorContext::default(), &mut values)?;
    assignments.extend(
      values
        .into_iter()
        .map(|(context, value)| (variable.clone(), context, value)),
    );
    variables.insert(key, variable);
  }

  let groups = group_by_context(assignments);
  let rules = theme_rules(
    &groups,
    &theme_name,
    &format!(":root, .{theme_name}"),
    THEME_VARS_PRIORITY,
  );

  Ok(DefinedVars {
    theme: ThemeDefinition {
      theme_name,
      variables,
    },
    rules,
  })
}

pub fn create_theme(
  normalizer: &Normalizer<'_>,
  hashes: &mut HashCache,
  theme: &ThemeDefinition,
  overrides: &StyleObject,
) -> CompileResult<CreatedTheme> {
  let mut keys = BTreeSet::new();
  let mut assignments = Vec::new();

  for (raw_key, value) in overrides {
    let key = normalizer.resolve_key(raw_key)?;
    let Some(variable) = theme.variables.get(&key) else {
      return Err(StyleError::new(
        StyleErrorKind::ThemeShapeMismatch,
        format!("\"{key}\" is not a variable of the theme being overridden"),
      ));
    };

    let mut values = Vec::new();
    collect_values(normalizer, variable, value, &SelectorContext::default(), &mut values)?;
    assignments.extend(
      values
        .into_iter()
        .map(|(context, value)| (variable.clone(), context, value)),
    );
    keys.insert(key);
  }

  let missing: Vec<&str> = theme
    .variables
    .keys()
    .filter(|key| !keys.contains(*key))
    .map(String::as_str)
    .collect();
  if !missing.is_empty() {
    return Err(
      StyleError::new(
        StyleErrorKind::ThemeShapeMismatch,
        format!("Theme overrides are missing {}", missing.join(", ")),
      )
      .with_hints(vec![
        "Every variable of the theme must be given a value".into(),
      ]),
    );
  }

  let mut canonical: Vec<String> = assignments
    .iter()
    .map(|(variable, context, value)| context.prefixed(&format!("{variable}:{value}")))
    .collect();
  canonical.sort();
  let selector = hashes.name(&format!("{}{}", theme.theme_name, canonical.join(";")));

  let groups = group_by_context(assignments);
  let rules = theme_rules(
    &groups,
    &selector,
    &format!(".{selector}, .{selector}:root"),
    THEME_OVERRIDE_PRIORITY,
  );

  Ok(CreatedTheme {
    theme_override: ThemeOverride {
      theme_name: theme.theme_name.clone(),
      selector,
    },
    rules,
  })
}

pub fn define_consts(
  normalizer: &Normalizer<'_>,
  hashes: &mut HashCache,
  file: &str,
  export: &str,
  consts: &StyleObject,
) -> CompileResult<DefinedConsts> {
  let const_name = group_name(hashes, file, export);

  let mut entries = indexmap::IndexMap::new();
  let mut rules = Vec::new();
  for (raw_key, value) in consts {
    let key = normalizer.resolve_key(raw_key)?;
    let literal = match value {
      StyleValue::Number(number) => format_css_number(*number),
      value => normalizer.literal(&key, value)?,
    };

    rules.push(InjectableRule::new(
      hashes.name(&format!("{file}//{export}.{key}")),
      InjectableStyle::default(),
      THEME_VARS_PRIORITY,
    ));
    entries.insert(key, literal);
  }

  Ok(DefinedConsts {
    consts: ConstGroup {
      const_name,
      entries,
    },
    rules,
  })
}

#[cfg(test)]
mod tests {
  use pretty_assertions::assert_eq;
  use serde_json::json;

  use super::*;
  use crate::config::AtomicCssConfig;
  use crate::symbols::SymbolTable;
  use crate::validator::PermissiveValidator;

  fn object(value: serde_json::Value) -> StyleObject {
    match StyleValue::from(value) {
      StyleValue::Object(map) => map,
      other => panic!("expected an object, got {other:?}"),
    }
  }

  fn with_normalizer<T>(f: impl FnOnce(&Normalizer<'_>, &mut HashCache) -> T) -> T {
    let config = AtomicCssConfig::default();
    let symbols = SymbolTable::default();
    let normalizer = Normalizer::new(&config, &PermissiveValidator, &symbols);
    f(&normalizer, &mut HashCache::new("x"))
  }

  fn colors(normalizer: &Normalizer<'_>, hashes: &mut HashCache) -> DefinedVars {
    define_vars(
      normalizer,
      hashes,
      "src/tokens.js",
      "colors",
      &object(json!({
        "primary": "blue",
        "accent": {"default": "red", "@media (prefers-color-scheme: dark)": "pink"},
        "--raw": "1px"
      })),
    )
    .unwrap()
  }

  #[test]
  fn define_vars_hashes_names_from_file_and_export() {
    with_normalizer(|normalizer, hashes| {
      let vars = colors(normalizer, hashes);
      let theme_name = format!("x{}", hash("src/tokens.js//colors"));
      let primary = format!("--x{}", hash(&format!("{theme_name}.primary")));

      assert_eq!(vars.theme.theme_name, theme_name);
      assert_eq!(vars.theme.variables["primary"], primary);
      assert_eq!(vars.theme.variables["--raw"], "--raw");
      assert_eq!(vars.rules.len(), 2);
      assert_eq!(vars.rules[0].priority(), 0);
      assert!(vars.rules[0]
        .style()
        .ltr
        .starts_with(&format!(":root, .{theme_name}{{")));
      assert_eq!(vars.rules[1].priority(), 200);
      assert!(vars.rules[1].style().ltr.starts_with("@media (prefers-color-scheme: dark){"));
    });
  }

  #[test]
  fn define_vars_output_ignores_key_order() {
    let a = with_normalizer(|n, h| {
      define_vars(n, h, "a.js", "v", &object(json!({"a": "1px", "b": "2px"}))).unwrap()
    });
    let b = with_normalizer(|n, h| {
      define_vars(n, h, "a.js", "v", &object(json!({"b": "2px", "a": "1px"}))).unwrap()
    });
    assert_eq!(a.rules, b.rules);
  }

  #[test]
  fn create_theme_selector_ignores_key_order() {
    with_normalizer(|normalizer, hashes| {
      let vars = colors(normalizer, hashes);
      let one = create_theme(
        normalizer,
        hashes,
        &vars.theme,
        &object(json!({"primary": "green", "accent": "white", "--raw": "2px"})),
      )
      .unwrap();
      let two = create_theme(
        normalizer,
        hashes,
        &vars.theme,
        &object(json!({"--raw": "2px", "accent": "white", "primary": "green"})),
      )
      .unwrap();
      let other = create_theme(
        normalizer,
        hashes,
        &vars.theme,
        &object(json!({"primary": "black", "accent": "white", "--raw": "2px"})),
      )
      .unwrap();

      assert_eq!(one.theme_override.selector, two.theme_override.selector);
      assert_eq!(one.rules, two.rules);
      assert_ne!(one.theme_override.selector, other.theme_override.selector);
      assert_eq!(one.rules[0].priority(), 500);
      let selector = &one.theme_override.selector;
      assert!(one.rules[0]
        .style()
        .ltr
        .starts_with(&format!(".{selector}, .{selector}:root{{")));
    });
  }

  #[test]
  fn nested_at_rules_keep_overrides_below_the_shorthand_tier() {
    with_normalizer(|normalizer, hashes| {
      let vars = colors(normalizer, hashes);
      let created = create_theme(
        normalizer,
        hashes,
        &vars.theme,
        &object(json!({
          "primary": {
            "default": "green",
            "@media (min-width: 30rem)": {"default": "olive", "@container (width > 20rem)": "lime"}
          },
          "accent": "white",
          "--raw": "2px"
        })),
      )
      .unwrap();

      let priorities: Vec<u32> = created.rules.iter().map(|rule| rule.priority()).collect();
      assert_eq!(priorities, vec![500, 999, 700]);
    });
  }

  #[test]
  fn create_theme_requires_matching_keys() {
    with_normalizer(|normalizer, hashes| {
      let vars = colors(normalizer, hashes);

      let extra = create_theme(
        normalizer,
        hashes,
        &vars.theme,
        &object(json!({"primary": "a", "accent": "b", "--raw": "c", "other": "d"})),
      )
      .err()
      .unwrap();
      assert_eq!(extra.kind, StyleErrorKind::ThemeShapeMismatch);

      let missing = create_theme(normalizer, hashes, &vars.theme, &object(json!({"primary": "a"})))
        .err()
        .unwrap();
      assert_eq!(missing.kind, StyleErrorKind::ThemeShapeMismatch);
      assert!(missing.message.contains("accent"));
    });
  }

  #[test]
  fn theme_values_only_accept_at_rules() {
    with_normalizer(|normalizer, hashes| {
      let error = define_vars(
        normalizer,
        hashes,
        "a.js",
        "v",
        &object(json!({"a": {"default": "1px", ":hover": "2px"}})),
      )
      .err()
      .unwrap();
      assert_eq!(error.kind, StyleErrorKind::InvalidShape);
    });
  }

  #[test]
  fn consts_emit_placeholders() {
    with_normalizer(|normalizer, hashes| {
      let defined = define_consts(
        normalizer,
        hashes,
        "src/consts.js",
        "breakpoints",
        &object(json!({"small": "@media (max-width: 600px)", "columns": 12})),
      )
      .unwrap();

      assert_eq!(defined.consts.entries["columns"], "12");
      assert_eq!(defined.rules.len(), 2);
      assert_eq!(defined.rules[0].style().ltr, "");
      assert_eq!(defined.rules[0].priority(), 0);
      assert_eq!(
        defined.rules[0].class_name(),
        format!("x{}", hash("src/consts.js//breakpoints.small"))
      );
    });
  }
}
