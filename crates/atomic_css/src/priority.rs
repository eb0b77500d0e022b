use once_cell::sync::Lazy;
use std::collections::HashMap;

use crate::context::SelectorContext;
use crate::properties::property_priority;

pub const THEME_VARS_PRIORITY: u32 = 0;
pub const THEME_OVERRIDE_PRIORITY: u32 = 500;

pub const SUPPORTS_OFFSET: u32 = 30;
pub const MEDIA_OFFSET: u32 = 200;
pub const CONTAINER_OFFSET: u32 = 300;
pub const UNKNOWN_PSEUDO_CLASS_OFFSET: u32 = 40;
pub const PSEUDO_ELEMENT_OFFSET: u32 = 5000;

/// Width of a priority tier; the assembler buckets rules by `priority / 1000`.
pub const PRIORITY_TIER_WIDTH: u32 = 1000;
/// Context offsets never reach the next property tier.
const MAX_CONTEXT_OFFSET: u32 = PRIORITY_TIER_WIDTH - 1;

static PSEUDO_CLASS_PRIORITIES: Lazy<HashMap<&'static str, u32>> = Lazy::new(|| {
  HashMap::from([
    (":is", 40),
    (":where", 40),
    (":not", 40),
    (":has", 45),
    (":dir", 50),
    (":lang", 51),
    (":first-child", 52),
    (":first-of-type", 53),
    (":last-child", 54),
    (":last-of-type", 55),
    (":only-child", 56),
    (":only-of-type", 57),
    (":nth-child", 60),
    (":nth-last-child", 61),
    (":nth-of-type", 62),
    (":nth-last-of-type", 63),
    (":empty", 70),
    (":link", 80),
    (":any-link", 81),
    (":local-link", 82),
    (":target-within", 83),
    (":target", 84),
    (":visited", 85),
    (":enabled", 91),
    (":disabled", 92),
    (":required", 93),
    (":optional", 94),
    (":read-only", 95),
    (":read-write", 96),
    (":placeholder-shown", 97),
    (":in-range", 98),
    (":out-of-range", 99),
    (":default", 100),
    (":checked", 101),
    (":indeterminate", 101),
    (":blank", 102),
    (":valid", 103),
    (":invalid", 104),
    (":user-invalid", 105),
    (":autofill", 110),
    (":picture-in-picture", 120),
    (":modal", 121),
    (":fullscreen", 122),
    (":paused", 123),
    (":playing", 124),
    (":current", 125),
    (":past", 126),
    (":future", 127),
    (":hover", 130),
    (":focus-within", 140),
    (":focus", 150),
    (":focus-visible", 160),
    (":active", 170),
  ])
});

pub fn pseudo_class_offset(pseudo: &str) -> u32 {
  let name = pseudo.split('(').next().unwrap_or(pseudo);
  PSEUDO_CLASS_PRIORITIES
    .get(name)
    .copied()
    .unwrap_or(UNKNOWN_PSEUDO_CLASS_OFFSET)
}

pub fn at_rule_offset(at_rule: &str) -> u32 {
  if at_rule.starts_with("@container") {
    CONTAINER_OFFSET
  } else if at_rule.starts_with("@media") {
    MEDIA_OFFSET
  } else if at_rule.starts_with("@supports") {
    SUPPORTS_OFFSET
  } else {
    0
  }
}

/// Offset a context adds to whatever base priority a rule has.
pub fn context_offset(context: &SelectorContext) -> u32 {
  let conditions: u32 = context
    .at_rules
    .iter()
    .map(|at_rule| at_rule_offset(at_rule))
    .chain(context.pseudo_classes.iter().map(|p| pseudo_class_offset(p)))
    .sum();

  let pseudo_element = if context.pseudo_element.is_some() {
    PSEUDO_ELEMENT_OFFSET
  } else {
    0
  };

  conditions.min(MAX_CONTEXT_OFFSET) + pseudo_element
}

/// Cascade priority of an atomic rule. Priorities are comparable across every
/// file of a build.
pub fn rule_priority(property: &str, context: &SelectorContext) -> u32 {
  property_priority(property) + context_offset(context)
}

/// Priority of a theme variable or override rule. It stays in the tier of
/// `base` however many at-rules the values are nested in.
pub fn theme_rule_priority(base: u32, context: &SelectorContext) -> u32 {
  let tier_end = (base / PRIORITY_TIER_WIDTH + 1) * PRIORITY_TIER_WIDTH - 1;
  (base + context_offset(context)).min(tier_end)
}
