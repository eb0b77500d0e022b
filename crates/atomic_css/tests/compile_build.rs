use atomic_css::{
  compile_build, compile_file, process_rules, AtomicCssConfig, FileInput, InjectableRule,
  LightningCssValidator, PermissiveValidator, Replacement, StyleErrorKind,
};
use pretty_assertions::assert_eq;
use serde_json::json;

fn file(value: serde_json::Value) -> FileInput {
  serde_json::from_value(value).unwrap()
}

fn styles_file(name: &str, namespaces: serde_json::Value) -> FileInput {
  file(json!({
    "file": name,
    "declarations": [{"kind": "create", "name": "styles", "exported": true, "namespaces": namespaces}]
  }))
}

fn class_of(rules: &[InjectableRule], needle: &str) -> String {
  rules
    .iter()
    .find(|rule| rule.style().ltr.contains(needle))
    .map(|rule| rule.class_name().to_string())
    .unwrap_or_else(|| panic!("no rule contains {needle}"))
}

#[test]
fn padding_and_padding_start_cascade_by_priority() {
  let input = styles_file("src/card.js", json!({"root": {"padding": 5, "paddingStart": 10}}));
  let output = compile_file(&input, &AtomicCssConfig::default(), &PermissiveValidator).unwrap();

  assert_eq!(output.metadata.len(), 2);
  let padding = &output.metadata[0];
  let start = &output.metadata[1];
  assert_eq!(padding.priority(), 1000);
  assert_eq!(start.priority(), 3000);

  let css = process_rules(&output.metadata, false);
  assert_eq!(
    css,
    [
      format!(".{}{{padding:5px}}", padding.class_name()),
      format!(
        "html:not([dir='rtl']) .{}:not(#\\#){{padding-left:10px}}",
        start.class_name()
      ),
      format!(
        "html[dir='rtl'] .{}:not(#\\#){{padding-right:10px}}",
        start.class_name()
      ),
    ]
    .join("\n")
  );
}

#[test]
fn merging_separate_namespaces_keeps_shorthand_and_longhand() {
  let input = file(json!({
    "file": "src/card.js",
    "declarations": [
      {"kind": "create", "name": "foo", "namespaces": {"root": {"padding": 5}}},
      {"kind": "create", "name": "bar", "namespaces": {"root": {"paddingStart": 10}}}
    ],
    "callSites": [{"id": "c0", "form": "className", "args": [
      {"type": "ref", "binding": "foo", "key": "root"},
      {"type": "ref", "binding": "bar", "key": "root"}
    ]}]
  }));
  let output = compile_file(&input, &AtomicCssConfig::default(), &PermissiveValidator).unwrap();

  let padding = class_of(&output.metadata, "{padding:5px}");
  let start = class_of(&output.metadata, "{padding-left:10px}");
  let Replacement::Literal { code } = &output.call_sites[0].replacement else {
    panic!("expected a literal");
  };
  assert_eq!(code, &format!("\"{padding} {start}\""));
  assert_eq!(output.removed_bindings, vec!["foo", "bar"]);
}

#[test]
fn null_cancels_conditional_values_of_the_property() {
  let input = file(json!({
    "file": "src/link.js",
    "declarations": [{
      "kind": "create",
      "name": "styles",
      "namespaces": {
        "link": {
          "color": {"default": "red", ":hover": "blue", "@media print": "black"},
          "padding": 4
        },
        "plain": {"color": null},
        "green": {"color": "green"}
      }
    }],
    "callSites": [
      {"id": "a", "form": "className", "args": [
        {"type": "ref", "binding": "styles", "key": "link"},
        {"type": "ref", "binding": "styles", "key": "plain"}
      ]},
      {"id": "b", "form": "className", "args": [
        {"type": "ref", "binding": "styles", "key": "link"},
        {"type": "and", "test": "isPlain", "right": {"type": "ref", "binding": "styles", "key": "plain"}},
        {"type": "ref", "binding": "styles", "key": "green"}
      ]}
    ]
  }));
  let output = compile_file(&input, &AtomicCssConfig::default(), &PermissiveValidator).unwrap();

  let padding = class_of(&output.metadata, "padding:4px");
  let hover = class_of(&output.metadata, ":hover{color:blue}");
  let print = class_of(&output.metadata, "color:black");
  let green = class_of(&output.metadata, "color:green");

  let Replacement::Literal { code } = &output.call_sites[0].replacement else {
    panic!("expected a literal");
  };
  assert_eq!(code, &format!("\"{padding}\""));

  let Replacement::Dispatch { table, .. } = &output.call_sites[1].replacement else {
    panic!("expected a dispatch table");
  };
  assert_eq!(
    table,
    &vec![
      format!("\"{green} {hover} {print} {padding}\""),
      format!("\"{green} {padding}\""),
    ]
  );
}

#[test]
fn compound_and_nested_pseudo_classes_share_one_rule() {
  let inputs = vec![
    styles_file("src/a.js", json!({"root": {"color": {":focus:hover": "red"}}})),
    styles_file("src/b.js", json!({"root": {":focus": {":hover": {"color": "red"}}}})),
  ];
  let build = compile_build(&inputs, &AtomicCssConfig::default(), &PermissiveValidator);

  let a = build.files["src/a.js"].as_ref().unwrap();
  let b = build.files["src/b.js"].as_ref().unwrap();
  assert_eq!(a.metadata, b.metadata);
  assert_eq!(a.metadata[0].priority(), 3280);
}

#[test]
fn polyfill_gives_longhands_one_more_repetition() {
  let input = styles_file("src/a.js", json!({"root": {"margin": 0, "color": "red"}}));
  let output = compile_file(&input, &AtomicCssConfig::default(), &PermissiveValidator).unwrap();
  let css = process_rules(&output.metadata, false);

  let margin = class_of(&output.metadata, "margin:0");
  let color = class_of(&output.metadata, "color:red");
  assert!(css.contains(&format!(".{margin}{{margin:0}}")));
  assert!(css.contains(&format!(".{color}:not(#\\#){{color:red}}")));
}

#[test]
fn identical_declarations_share_classes_across_files() {
  let inputs = vec![
    styles_file("src/a.js", json!({"root": {"color": "red"}})),
    styles_file("src/b.js", json!({"other": {"color": "red"}})),
  ];
  let build = compile_build(&inputs, &AtomicCssConfig::default(), &PermissiveValidator);

  let a = build.files["src/a.js"].as_ref().unwrap();
  let b = build.files["src/b.js"].as_ref().unwrap();
  assert_eq!(a.metadata, b.metadata);
  assert_eq!(build.stylesheet.lines().count(), 1);
}

#[test]
fn builds_are_idempotent_and_order_independent() {
  let inputs = vec![
    styles_file(
      "src/a.js",
      json!({"root": {"color": {"default": "red", ":hover": "blue"}, "marginEnd": 4}}),
    ),
    styles_file(
      "src/b.js",
      json!({"root": {"@media (min-width: 30rem)": {"padding": 8}, "position": ["sticky", "fixed"]}}),
    ),
    file(json!({
      "file": "src/tokens.js",
      "declarations": [{"kind": "defineVars", "name": "colors", "exported": true, "vars": {"primary": "blue"}}]
    })),
  ];
  let config = AtomicCssConfig::default();

  let first = compile_build(&inputs, &config, &PermissiveValidator);
  let second = compile_build(&inputs, &config, &PermissiveValidator);
  let mut reversed_inputs = inputs.clone();
  reversed_inputs.reverse();
  let reversed = compile_build(&reversed_inputs, &config, &PermissiveValidator);

  assert_eq!(first.stylesheet, second.stylesheet);
  assert_eq!(first.stylesheet, reversed.stylesheet);
  assert_eq!(first.errors().count(), 0);
}

#[test]
fn create_theme_ignores_override_key_order() {
  let tokens = file(json!({
    "file": "src/tokens.js",
    "declarations": [{
      "kind": "defineVars",
      "name": "colors",
      "exported": true,
      "vars": {"primary": "blue", "secondary": "gray"}
    }]
  }));
  let config = AtomicCssConfig::default();
  let tokens_output = compile_file(&tokens, &config, &PermissiveValidator).unwrap();

  let theme_file = |overrides: serde_json::Value| {
    let mut input = file(json!({
      "file": "src/dark.js",
      "declarations": [{
        "kind": "createTheme",
        "name": "dark",
        "exported": true,
        "theme": "colors",
        "overrides": overrides
      }]
    }));
    input.imports = tokens_output.exports.clone();
    compile_file(&input, &config, &PermissiveValidator).unwrap()
  };

  let one = theme_file(json!({"primary": "navy", "secondary": "black"}));
  let two = theme_file(json!({"secondary": "black", "primary": "navy"}));
  assert_eq!(one.exports, two.exports);
  assert_eq!(one.metadata, two.metadata);
  assert_eq!(one.metadata[0].priority(), 500);
}

#[test]
fn merge_order_decides_the_winner() {
  let input = file(json!({
    "file": "src/button.js",
    "declarations": [{
      "kind": "create",
      "name": "styles",
      "namespaces": {"red": {"color": "red"}, "blue": {"color": "blue"}, "reset": {"color": null}}
    }],
    "callSites": [
      {"id": "a", "form": "className", "args": [
        {"type": "ref", "binding": "styles", "key": "red"},
        {"type": "ref", "binding": "styles", "key": "blue"}
      ]},
      {"id": "b", "form": "className", "args": [
        {"type": "ref", "binding": "styles", "key": "blue"},
        {"type": "ref", "binding": "styles", "key": "red"}
      ]},
      {"id": "c", "form": "className", "args": [
        {"type": "ref", "binding": "styles", "key": "red"},
        {"type": "ref", "binding": "styles", "key": "reset"}
      ]}
    ]
  }));
  let output = compile_file(&input, &AtomicCssConfig::default(), &PermissiveValidator).unwrap();

  let red = class_of(&output.metadata, "color:red");
  let blue = class_of(&output.metadata, "color:blue");
  let literal = |index: usize| match &output.call_sites[index].replacement {
    Replacement::Literal { code } => code.clone(),
    other => panic!("expected a literal, got {other:?}"),
  };

  assert_eq!(literal(0), format!("\"{blue}\""));
  assert_eq!(literal(1), format!("\"{red}\""));
  assert_eq!(literal(2), "\"\"");
}

#[test]
fn dispatch_tables_cover_every_assignment() {
  let input = file(json!({
    "file": "src/button.js",
    "declarations": [{
      "kind": "create",
      "name": "styles",
      "namespaces": {
        "base": {"color": "black"},
        "a": {"color": "red"},
        "b": {"padding": 4},
        "c": {"margin": 2}
      }
    }],
    "callSites": [{"id": "c0", "form": "className", "args": [
      {"type": "ref", "binding": "styles", "key": "base"},
      {"type": "and", "test": "x", "right": {"type": "ref", "binding": "styles", "key": "a"}},
      {"type": "and", "test": "y", "right": {"type": "ref", "binding": "styles", "key": "b"}},
      {"type": "and", "test": "z", "right": {"type": "ref", "binding": "styles", "key": "c"}}
    ]}]
  }));
  let output = compile_file(&input, &AtomicCssConfig::default(), &PermissiveValidator).unwrap();

  let Replacement::Dispatch {
    conditions, table, ..
  } = &output.call_sites[0].replacement
  else {
    panic!("expected a dispatch table");
  };
  assert_eq!(conditions, &vec!["x", "y", "z"]);
  assert_eq!(table.len(), 8);

  let red = class_of(&output.metadata, "color:red");
  let black = class_of(&output.metadata, "color:black");
  let padding = class_of(&output.metadata, "padding:4px");
  let margin = class_of(&output.metadata, "margin:2px");
  for (index, entry) in table.iter().enumerate() {
    let mut expected = vec![if index & 0b100 != 0 { red.clone() } else { black.clone() }];
    if index & 0b010 != 0 {
      expected.push(padding.clone());
    }
    if index & 0b001 != 0 {
      expected.push(margin.clone());
    }
    assert_eq!(entry, &format!("\"{}\"", expected.join(" ")), "entry {index:03b}");
  }
}

#[test]
fn failed_files_do_not_affect_others() {
  let inputs = vec![
    styles_file("src/bad.js", json!({"root": {"colr": "red"}})),
    styles_file("src/good.js", json!({"root": {"color": "red"}})),
  ];
  let build = compile_build(&inputs, &AtomicCssConfig::default(), &PermissiveValidator);

  let error = build.files["src/bad.js"].as_ref().unwrap_err();
  assert_eq!(error.kind, StyleErrorKind::UnknownProperty);
  assert!(build.files["src/good.js"].is_ok());
  assert!(build.stylesheet.contains("{color:red}"));
}

#[test]
fn lightningcss_validator_accepts_common_values() {
  let input = styles_file(
    "src/a.js",
    json!({"root": {"color": "red", "padding": 4, "display": "flex", "--gap": "2px"}}),
  );
  let output = compile_file(&input, &AtomicCssConfig::default(), &LightningCssValidator).unwrap();
  assert_eq!(output.metadata.len(), 4);
}

#[test]
fn lightningcss_validator_rejects_invalid_values() {
  let input = styles_file("src/a.js", json!({"root": {"width": "red"}}));
  let error = compile_file(&input, &AtomicCssConfig::default(), &LightningCssValidator).unwrap_err();
  assert_eq!(error.kind, StyleErrorKind::InvalidValue);
}

#[test]
fn native_layers_declare_every_bucket() {
  let config = AtomicCssConfig {
    use_native_layers: Some(true),
    ..Default::default()
  };
  let inputs = vec![styles_file(
    "src/a.js",
    json!({"root": {"margin": 0, "color": "red", "width": 10}}),
  )];
  let build = compile_build(&inputs, &config, &PermissiveValidator);

  assert!(build
    .stylesheet
    .starts_with("@layer priority1, priority2, priority3;\n"));
  assert!(!build.stylesheet.contains(":not(#\\#)"));
}
