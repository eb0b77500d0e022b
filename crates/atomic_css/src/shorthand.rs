// Minimal keyword set for border/outline styles
const BORDER_STYLES: &[&str] = &[
  "none", "hidden", "dotted", "dashed", "solid", "double", "groove", "ridge", "inset", "outset",
];

const FLEX_WRAP_VALUES: &[&str] = &["nowrap", "wrap", "wrap-reverse"];

/// A shorthand that is expanded with `null` unsets every longhand it covers.
const NULL_PLACEHOLDER: &str = "initial";

pub type Longhands = Vec<(String, Option<String>)>;

/// Split a CSS value on top-level whitespace, keeping function arguments and
/// quoted strings intact.
pub fn split_values(value: &str) -> Vec<String> {
  let mut parts = Vec::new();
  let mut current = String::new();
  let mut depth = 0usize;
  let mut quote: Option<char> = None;

  for c in value.chars() {
    match quote {
      Some(q) => {
        current.push(c);
        if c == q {
          quote = None;
        }
        continue;
      }
      None if c == '"' || c == '\'' => {
        quote = Some(c);
        current.push(c);
        continue;
      }
      None => {}
    }

    match c {
      '(' => {
        depth += 1;
        current.push(c);
      }
      ')' => {
        depth = depth.saturating_sub(1);
        current.push(c);
      }
      c if c.is_whitespace() && depth == 0 => {
        if !current.is_empty() {
          parts.push(std::mem::take(&mut current));
        }
      }
      c => current.push(c),
    }
  }

  if !current.is_empty() {
    parts.push(current);
  }
  parts
}

fn is_border_style(token: &str) -> bool {
  let lower = token.to_ascii_lowercase();
  BORDER_STYLES.contains(&lower.as_str())
}

fn is_length_token(token: &str) -> bool {
  if token == "0" {
    return true;
  }
  if ["thin", "medium", "thick"].contains(&token) {
    return true;
  }
  let lower = token.to_ascii_lowercase();
  if lower.starts_with("calc(") || lower.starts_with("min(") || lower.starts_with("max(") || lower.starts_with("clamp(") {
    return true;
  }

  let bytes = token.as_bytes();
  let mut i = 0usize;
  if i < bytes.len() && (bytes[i] == b'+' || bytes[i] == b'-') {
    i += 1;
  }
  let mut has_digit = false;
  while i < bytes.len() && bytes[i].is_ascii_digit() {
    has_digit = true;
    i += 1;
  }
  if i < bytes.len() && bytes[i] == b'.' {
    i += 1;
    while i < bytes.len() && bytes[i].is_ascii_digit() {
      has_digit = true;
      i += 1;
    }
  }
  if !has_digit || i >= bytes.len() {
    return false;
  }
  let suffix = &token[i..];
  suffix == "%" || suffix.chars().all(|c| c.is_ascii_alphabetic())
}

/// Returns (width, style, color), with initial values for missing parts.
fn parse_border_tokens(value: &str) -> Option<(String, String, String)> {
  let mut width: Option<String> = None;
  let mut style: Option<String> = None;
  let mut color: Option<String> = None;

  for token in split_values(value) {
    if width.is_none() && is_length_token(&token) {
      width = Some(token);
    } else if style.is_none() && is_border_style(&token) {
      style = Some(token);
    } else if color.is_none() {
      color = Some(token);
    } else {
      return None;
    }
  }

  Some((
    width.unwrap_or_else(|| "medium".into()),
    style.unwrap_or_else(|| "none".into()),
    color.unwrap_or_else(|| "currentcolor".into()),
  ))
}

fn expand_1_to_4(parts: &[String]) -> Option<[String; 4]> {
  match parts {
    [all] => Some([all.clone(), all.clone(), all.clone(), all.clone()]),
    [tb, lr] => Some([tb.clone(), lr.clone(), tb.clone(), lr.clone()]),
    [t, lr, b] => Some([t.clone(), lr.clone(), b.clone(), lr.clone()]),
    [t, r, b, l] => Some([t.clone(), r.clone(), b.clone(), l.clone()]),
    _ => None,
  }
}

fn expand_1_to_2(parts: &[String]) -> Option<[String; 2]> {
  match parts {
    [both] => Some([both.clone(), both.clone()]),
    [first, second] => Some([first.clone(), second.clone()]),
    _ => None,
  }
}

fn set(property: &str, value: impl Into<String>) -> (String, Option<String>) {
  (property.to_string(), Some(value.into()))
}

fn unset(property: &str) -> (String, Option<String>) {
  (property.to_string(), None)
}

/// Box shorthands expand to top/bottom plus inline logical sides, and unset the
/// physical left/right longhands so an earlier `paddingLeft` can't outlive a
/// later `padding`.
fn expand_box(prefix: &str, suffix: &str, parts: &[String]) -> Option<Longhands> {
  let [top, end, bottom, start] = expand_1_to_4(parts)?;
  let name = |side: &str| {
    if prefix.is_empty() {
      format!("{side}{suffix}")
    } else {
      format!("{prefix}-{side}{suffix}")
    }
  };

  Some(vec![
    set(&name("top"), top),
    set(&name("inline-end"), end),
    set(&name("bottom"), bottom),
    set(&name("inline-start"), start),
    unset(&name("left")),
    unset(&name("right")),
  ])
}

fn expand_inline(prefix: &str, parts: &[String]) -> Option<Longhands> {
  let [start, end] = expand_1_to_2(parts)?;
  Some(vec![
    set(&format!("{prefix}-inline-start"), start),
    set(&format!("{prefix}-inline-end"), end),
    unset(&format!("{prefix}-left")),
    unset(&format!("{prefix}-right")),
  ])
}

fn expand_block(prefix: &str, parts: &[String]) -> Option<Longhands> {
  let [start, end] = expand_1_to_2(parts)?;
  Some(vec![
    set(&format!("{prefix}-top"), start),
    set(&format!("{prefix}-bottom"), end),
  ])
}

fn expand_pair(first: &str, second: &str, parts: &[String]) -> Option<Longhands> {
  let [a, b] = expand_1_to_2(parts)?;
  Some(vec![set(first, a), set(second, b)])
}

/// Expand one level of a shorthand into the longhands it sets. Returns `None`
/// when the property is not a supported shorthand or the value can't be split
/// reliably, in which case the shorthand is kept whole.
fn expand_once(property: &str, value: &str) -> Option<Longhands> {
  // var() may stand for any number of components
  if value.contains("var(") {
    return None;
  }
  let parts = split_values(value);
  if parts.is_empty() {
    return None;
  }

  match property {
    "padding" | "margin" | "scroll-margin" | "scroll-padding" => expand_box(property, "", &parts),
    "inset" => {
      let [top, end, bottom, start] = expand_1_to_4(&parts)?;
      Some(vec![
        set("top", top),
        set("inset-inline-end", end),
        set("bottom", bottom),
        set("inset-inline-start", start),
        unset("left"),
        unset("right"),
      ])
    }
    "padding-inline" | "margin-inline" | "scroll-margin-inline" | "scroll-padding-inline" => {
      expand_inline(property.trim_end_matches("-inline"), &parts)
    }
    "padding-block" | "margin-block" | "scroll-margin-block" | "scroll-padding-block" => {
      expand_block(property.trim_end_matches("-block"), &parts)
    }
    "inset-inline" => {
      let [start, end] = expand_1_to_2(&parts)?;
      Some(vec![
        set("inset-inline-start", start),
        set("inset-inline-end", end),
        unset("left"),
        unset("right"),
      ])
    }
    "inset-block" => expand_pair("top", "bottom", &parts),
    "gap" => expand_pair("row-gap", "column-gap", &parts),
    "overflow" => expand_pair("overflow-x", "overflow-y", &parts),
    "overscroll-behavior" => expand_pair("overscroll-behavior-x", "overscroll-behavior-y", &parts),
    "place-content" => expand_pair("align-content", "justify-content", &parts),
    "place-items" => expand_pair("align-items", "justify-items", &parts),
    "place-self" => expand_pair("align-self", "justify-self", &parts),
    p @ ("border-color" | "border-style" | "border-width") => {
      let suffix = p.trim_start_matches("border");
      expand_box("border", suffix, &parts)
    }
    "border-radius" => {
      if value.contains('/') {
        return None;
      }
      let [top_left, top_right, bottom_right, bottom_left] = expand_1_to_4(&parts)?;
      Some(vec![
        set("border-start-start-radius", top_left),
        set("border-start-end-radius", top_right),
        set("border-end-end-radius", bottom_right),
        set("border-end-start-radius", bottom_left),
        unset("border-top-left-radius"),
        unset("border-top-right-radius"),
        unset("border-bottom-right-radius"),
        unset("border-bottom-left-radius"),
      ])
    }
    "border" => {
      let (width, style, color) = parse_border_tokens(value)?;
      Some(vec![
        set("border-width", width),
        set("border-style", style),
        set("border-color", color),
      ])
    }
    p @ ("border-top" | "border-right" | "border-bottom" | "border-left" | "border-inline-start"
    | "border-inline-end" | "outline") => {
      let (width, style, color) = parse_border_tokens(value)?;
      Some(vec![
        set(&format!("{p}-width"), width),
        set(&format!("{p}-style"), style),
        set(&format!("{p}-color"), color),
      ])
    }
    "flex-flow" => {
      let mut direction = None;
      let mut wrap = None;
      for part in &parts {
        if wrap.is_none() && FLEX_WRAP_VALUES.contains(&part.as_str()) {
          wrap = Some(part.clone());
        } else if direction.is_none() {
          direction = Some(part.clone());
        } else {
          return None;
        }
      }
      Some(vec![
        set("flex-direction", direction.unwrap_or_else(|| "row".into())),
        set("flex-wrap", wrap.unwrap_or_else(|| "nowrap".into())),
      ])
    }
    _ => None,
  }
}

/// Fully expand a shorthand into the longhands it sets, recursing through
/// shorthands of shorthands. `None` as value unsets every longhand.
pub fn try_expand_shorthand(property: &str, value: Option<&str>) -> Option<Longhands> {
  let expanded = expand_once(property, value.unwrap_or(NULL_PLACEHOLDER))?;

  let mut out = Vec::with_capacity(expanded.len());
  for (longhand, longhand_value) in expanded {
    let longhand_value = value.and(longhand_value);
    match try_expand_shorthand(&longhand, longhand_value.as_deref()) {
      Some(nested) => out.extend(nested),
      None => out.push((longhand, longhand_value)),
    }
  }
  Some(out)
}

#[cfg(test)]
mod tests {
  use pretty_assertions::assert_eq;

  use super::*;

  fn longhands(list: &[(&str, Option<&str>)]) -> Longhands {
    list
      .iter()
      .map(|(p, v)| (p.to_string(), v.map(|v| v.to_string())))
      .collect()
  }

  #[test]
  fn splits_values_outside_functions() {
    assert_eq!(
      split_values("calc(1px + 2px)  rgb(0, 0, 0) 'a b'"),
      vec!["calc(1px + 2px)", "rgb(0, 0, 0)", "'a b'"]
    );
  }

  #[test]
  fn expands_padding_to_logical_sides() {
    assert_eq!(
      try_expand_shorthand("padding", Some("1px 2px 3px")),
      Some(longhands(&[
        ("padding-top", Some("1px")),
        ("padding-inline-end", Some("2px")),
        ("padding-bottom", Some("3px")),
        ("padding-inline-start", Some("2px")),
        ("padding-left", None),
        ("padding-right", None),
      ]))
    );
  }

  #[test]
  fn expands_border_recursively() {
    let expanded = try_expand_shorthand("border", Some("1px solid red")).unwrap();

    assert_eq!(expanded.len(), 18);
    assert_eq!(expanded[0], ("border-top-width".into(), Some("1px".into())));
    assert!(expanded.contains(&("border-inline-start-style".into(), Some("solid".into()))));
    assert!(expanded.contains(&("border-bottom-color".into(), Some("red".into()))));
  }

  #[test]
  fn missing_border_parts_reset_to_initial() {
    assert_eq!(
      try_expand_shorthand("outline", Some("none")),
      Some(longhands(&[
        ("outline-width", Some("medium")),
        ("outline-style", Some("none")),
        ("outline-color", Some("currentcolor")),
      ]))
    );
  }

  #[test]
  fn null_unsets_every_longhand() {
    let expanded = try_expand_shorthand("gap", None).unwrap();
    assert_eq!(expanded, longhands(&[("row-gap", None), ("column-gap", None)]));
  }

  #[test]
  fn keeps_unsplittable_values_whole() {
    assert_eq!(try_expand_shorthand("padding", Some("var(--space)")), None);
    assert_eq!(try_expand_shorthand("border-radius", Some("10px / 20px")), None);
    assert_eq!(try_expand_shorthand("margin", Some("1px 2px 3px 4px 5px")), None);
    assert_eq!(try_expand_shorthand("color", Some("red")), None);
  }

  #[test]
  fn flex_flow_accepts_either_order() {
    assert_eq!(
      try_expand_shorthand("flex-flow", Some("wrap column")),
      Some(longhands(&[
        ("flex-direction", Some("column")),
        ("flex-wrap", Some("wrap")),
      ]))
    );
  }
}
