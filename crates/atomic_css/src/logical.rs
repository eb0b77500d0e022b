use crate::shorthand::split_values;

/// Legacy spellings accepted as aliases of standard logical properties.
pub const LEGACY_ALIASES: &[(&str, &str)] = &[
  ("padding-start", "padding-inline-start"),
  ("padding-end", "padding-inline-end"),
  ("padding-horizontal", "padding-inline"),
  ("padding-vertical", "padding-block"),
  ("margin-start", "margin-inline-start"),
  ("margin-end", "margin-inline-end"),
  ("margin-horizontal", "margin-inline"),
  ("margin-vertical", "margin-block"),
  ("start", "inset-inline-start"),
  ("end", "inset-inline-end"),
  ("border-start", "border-inline-start"),
  ("border-end", "border-inline-end"),
  ("border-start-color", "border-inline-start-color"),
  ("border-start-style", "border-inline-start-style"),
  ("border-start-width", "border-inline-start-width"),
  ("border-end-color", "border-inline-end-color"),
  ("border-end-style", "border-inline-end-style"),
  ("border-end-width", "border-inline-end-width"),
  ("border-top-start-radius", "border-start-start-radius"),
  ("border-top-end-radius", "border-start-end-radius"),
  ("border-bottom-start-radius", "border-end-start-radius"),
  ("border-bottom-end-radius", "border-end-end-radius"),
];

// (logical, left-to-right, right-to-left)
const INLINE_LONGHANDS: &[(&str, &str, &str)] = &[
  ("padding-inline-start", "padding-left", "padding-right"),
  ("padding-inline-end", "padding-right", "padding-left"),
  ("margin-inline-start", "margin-left", "margin-right"),
  ("margin-inline-end", "margin-right", "margin-left"),
  ("inset-inline-start", "left", "right"),
  ("inset-inline-end", "right", "left"),
  ("border-inline-start", "border-left", "border-right"),
  ("border-inline-end", "border-right", "border-left"),
  ("border-inline-start-color", "border-left-color", "border-right-color"),
  ("border-inline-start-style", "border-left-style", "border-right-style"),
  ("border-inline-start-width", "border-left-width", "border-right-width"),
  ("border-inline-end-color", "border-right-color", "border-left-color"),
  ("border-inline-end-style", "border-right-style", "border-left-style"),
  ("border-inline-end-width", "border-right-width", "border-left-width"),
  ("border-start-start-radius", "border-top-left-radius", "border-top-right-radius"),
  ("border-start-end-radius", "border-top-right-radius", "border-top-left-radius"),
  ("border-end-start-radius", "border-bottom-left-radius", "border-bottom-right-radius"),
  ("border-end-end-radius", "border-bottom-right-radius", "border-bottom-left-radius"),
  ("scroll-margin-inline-start", "scroll-margin-left", "scroll-margin-right"),
  ("scroll-margin-inline-end", "scroll-margin-right", "scroll-margin-left"),
  ("scroll-padding-inline-start", "scroll-padding-left", "scroll-padding-right"),
  ("scroll-padding-inline-end", "scroll-padding-right", "scroll-padding-left"),
];

// (logical, left side, right side, accepts a separate value per side)
const INLINE_PAIRS: &[(&str, &str, &str, bool)] = &[
  ("padding-inline", "padding-left", "padding-right", true),
  ("margin-inline", "margin-left", "margin-right", true),
  ("inset-inline", "left", "right", true),
  ("scroll-margin-inline", "scroll-margin-left", "scroll-margin-right", true),
  ("scroll-padding-inline", "scroll-padding-left", "scroll-padding-right", true),
  ("border-inline-color", "border-left-color", "border-right-color", true),
  ("border-inline-style", "border-left-style", "border-right-style", true),
  ("border-inline-width", "border-left-width", "border-right-width", true),
  ("border-inline", "border-left", "border-right", false),
];

pub type Declarations = Vec<(String, String)>;

/// Resolve a legacy alias to the standard logical property it stands for.
pub fn canonical_property(property: &str) -> &str {
  LEGACY_ALIASES
    .iter()
    .find(|(alias, _)| *alias == property)
    .map(|(_, standard)| *standard)
    .unwrap_or(property)
}

pub fn is_inline_logical(property: &str) -> bool {
  INLINE_LONGHANDS.iter().any(|(logical, ..)| *logical == property)
    || INLINE_PAIRS.iter().any(|(logical, ..)| *logical == property)
}

/// Physical declarations for an inline-direction logical property, as a
/// left-to-right list and its right-to-left mirror. Returns `None` for
/// properties that are not inline-direction logical.
pub fn physical_declarations(property: &str, value: &str) -> Option<(Declarations, Declarations)> {
  if let Some((_, ltr, rtl)) = INLINE_LONGHANDS
    .iter()
    .find(|(logical, ..)| *logical == property)
  {
    return Some((
      vec![(ltr.to_string(), value.to_string())],
      vec![(rtl.to_string(), value.to_string())],
    ));
  }

  let (_, left, right, per_side) = INLINE_PAIRS
    .iter()
    .find(|(logical, ..)| *logical == property)?;

  let (start, end) = if *per_side {
    let parts = split_values(value);
    match parts.as_slice() {
      [start, end] => (start.clone(), end.clone()),
      _ => (value.to_string(), value.to_string()),
    }
  } else {
    (value.to_string(), value.to_string())
  };

  Some((
    vec![
      (left.to_string(), start.clone()),
      (right.to_string(), end.clone()),
    ],
    vec![(right.to_string(), start), (left.to_string(), end)],
  ))
}

/// `float` and `clear` accept direction-relative keywords that need a physical
/// side per direction.
pub fn flip_directional_value(property: &str, value: &str) -> Option<(String, String)> {
  if property != "float" && property != "clear" {
    return None;
  }

  match value {
    "start" | "inline-start" => Some(("left".into(), "right".into())),
    "end" | "inline-end" => Some(("right".into(), "left".into())),
    _ => None,
  }
}

#[cfg(test)]
mod tests {
  use pretty_assertions::assert_eq;

  use super::*;

  fn decls(list: &[(&str, &str)]) -> Declarations {
    list
      .iter()
      .map(|(p, v)| (p.to_string(), v.to_string()))
      .collect()
  }

  #[test]
  fn aliases_resolve_to_standard_names() {
    assert_eq!(canonical_property("padding-start"), "padding-inline-start");
    assert_eq!(canonical_property("end"), "inset-inline-end");
    assert_eq!(canonical_property("color"), "color");
  }

  #[test]
  fn longhands_mirror_for_rtl() {
    assert_eq!(
      physical_declarations("margin-inline-end", "4px"),
      Some((
        decls(&[("margin-right", "4px")]),
        decls(&[("margin-left", "4px")])
      ))
    );
  }

  #[test]
  fn pairs_swap_sides_for_rtl() {
    assert_eq!(
      physical_declarations("padding-inline", "1px 2px"),
      Some((
        decls(&[("padding-left", "1px"), ("padding-right", "2px")]),
        decls(&[("padding-right", "1px"), ("padding-left", "2px")])
      ))
    );
  }

  #[test]
  fn border_inline_applies_the_whole_value_to_both_sides() {
    let (ltr, _) = physical_declarations("border-inline", "1px solid red").unwrap();
    assert_eq!(
      ltr,
      decls(&[
        ("border-left", "1px solid red"),
        ("border-right", "1px solid red")
      ])
    );
  }

  #[test]
  fn block_properties_are_left_alone() {
    assert_eq!(physical_declarations("padding-block-start", "1px"), None);
    assert!(!is_inline_logical("margin-block"));
  }

  #[test]
  fn float_keywords_flip() {
    assert_eq!(
      flip_directional_value("float", "start"),
      Some(("left".into(), "right".into()))
    );
    assert_eq!(flip_directional_value("float", "left"), None);
    assert_eq!(flip_directional_value("text-align", "start"), None);
  }
}
