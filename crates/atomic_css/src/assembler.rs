use std::cmp::Ordering;

use indexmap::IndexMap;

use crate::priority::PRIORITY_TIER_WIDTH;
use crate::rule::InjectableRule;

const SPECIFICITY_BUMP: &str = ":not(#\\#)";
const LTR_ANCESTOR: &str = "html:not([dir='rtl']) ";
const RTL_ANCESTOR: &str = "html[dir='rtl'] ";

/// Collects rule metadata from every file of a build and prints the final
/// stylesheet. Rules may arrive in any order and more than once.
#[derive(Debug, Default, Clone)]
pub struct StyleSheetBuilder {
  rules: IndexMap<String, InjectableRule>,
}

impl StyleSheetBuilder {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn add(&mut self, rule: InjectableRule) {
    let class_name = rule.class_name().to_string();
    if let Some(previous) = self.rules.get(&class_name) {
      if previous != &rule {
        tracing::trace!(class_name = %class_name, "replacing rule");
      }
    }
    self.rules.insert(class_name, rule);
  }

  pub fn extend(&mut self, rules: impl IntoIterator<Item = InjectableRule>) {
    for rule in rules {
      self.add(rule);
    }
  }

  pub fn len(&self) -> usize {
    self.rules.len()
  }

  pub fn is_empty(&self) -> bool {
    self.rules.is_empty()
  }

  pub fn build(&self, use_native_layers: bool) -> String {
    let _span = tracing::trace_span!("process_rules", rules = self.rules.len()).entered();

    let mut rules: Vec<&InjectableRule> = self
      .rules
      .values()
      .filter(|rule| !rule.style().ltr.is_empty())
      .collect();
    rules.sort_by(|a, b| compare_rules(a, b));

    let buckets = bucket_by_priority(&rules);
    let mut out = Vec::new();

    if use_native_layers && !buckets.is_empty() {
      let names: Vec<String> = (1..=buckets.len()).map(layer_name).collect();
      out.push(format!("@layer {};", names.join(", ")));
    }

    for (index, bucket) in buckets.iter().enumerate() {
      let bump = if use_native_layers { 0 } else { index };
      let printed: Vec<String> = bucket.iter().flat_map(|rule| print_rule(rule, bump)).collect();

      if use_native_layers {
        out.push(format!("@layer {}{{", layer_name(index + 1)));
        out.extend(printed);
        out.push("}".into());
      } else {
        out.extend(printed);
      }
    }

    out.join("\n")
  }
}

/// Order, bucket and print a complete set of rules. No other input affects
/// the output.
pub fn process_rules(rules: &[InjectableRule], use_native_layers: bool) -> String {
  let mut builder = StyleSheetBuilder::new();
  builder.extend(rules.iter().cloned());
  builder.build(use_native_layers)
}

fn layer_name(index: usize) -> String {
  format!("priority{index}")
}

/// The at-rule preludes a rule is wrapped in, e.g. `@media (min-width: 30rem)`.
fn query(css: &str) -> Option<&str> {
  if !css.starts_with('@') {
    return None;
  }
  css.find('{').map(|end| &css[..end])
}

fn declaration_text(css: &str) -> &str {
  css.rfind('{').map(|start| &css[start..]).unwrap_or(css)
}

fn compare_rules(a: &InjectableRule, b: &InjectableRule) -> Ordering {
  let (a_css, b_css) = (&a.style().ltr, &b.style().ltr);

  a.priority()
    .cmp(&b.priority())
    .then_with(|| match (query(a_css), query(b_css)) {
      (Some(a_query), Some(b_query)) if a_query != b_query => a_query.cmp(b_query),
      _ => Ordering::Equal,
    })
    .then_with(|| declaration_text(a_css).cmp(declaration_text(b_css)))
    .then_with(|| a_css.cmp(b_css))
    .then_with(|| a.class_name().cmp(b.class_name()))
}

/// Contiguous runs of sorted rules that share `priority / 1000`.
fn bucket_by_priority<'a>(rules: &[&'a InjectableRule]) -> Vec<Vec<&'a InjectableRule>> {
  let mut buckets: Vec<Vec<&InjectableRule>> = Vec::new();
  let mut current_tier = None;

  for rule in rules {
    let tier = rule.priority() / PRIORITY_TIER_WIDTH;
    if current_tier != Some(tier) {
      buckets.push(Vec::new());
      current_tier = Some(tier);
    }
    if let Some(bucket) = buckets.last_mut() {
      bucket.push(*rule);
    }
  }
  buckets
}

fn print_rule(rule: &InjectableRule, bump: usize) -> Vec<String> {
  let style = rule.style();

  if style.ltr.starts_with("@keyframes") {
    return std::iter::once(style.ltr.clone())
      .chain(style.rtl.clone())
      .collect();
  }

  let ltr = increase_specificity(&style.ltr, bump);
  match &style.rtl {
    Some(rtl) => vec![
      add_ancestor(&ltr, LTR_ANCESTOR),
      add_ancestor(&increase_specificity(rtl, bump), RTL_ANCESTOR),
    ],
    None => vec![ltr],
  }
}

/// Byte offset where the selector starts, after any at-rule preludes.
fn selector_start(css: &str) -> usize {
  let mut start = 0;
  while css[start..].starts_with('@') {
    match css[start..].find('{') {
      Some(open) => start += open + 1,
      None => break,
    }
  }
  start
}

fn selector_end(css: &str, start: usize) -> usize {
  css[start..].find('{').map(|end| start + end).unwrap_or(css.len())
}

/// Nest the selector under an ancestor, inside any at-rules.
fn add_ancestor(css: &str, ancestor: &str) -> String {
  let start = selector_start(css);
  format!("{}{ancestor}{}", &css[..start], &css[start..])
}

/// Append `:not(#\#)` to every class selector `times` times, raising its
/// specificity above every rule of a lower bucket.
fn increase_specificity(css: &str, times: usize) -> String {
  if times == 0 {
    return css.to_string();
  }

  let start = selector_start(css);
  let end = selector_end(css, start);
  let bump = SPECIFICITY_BUMP.repeat(times);

  let mut selector = String::with_capacity(end - start + bump.len());
  let mut chars = css[start..end].chars().peekable();
  while let Some(c) = chars.next() {
    selector.push(c);
    if c != '.' {
      continue;
    }
    while let Some(&next) = chars.peek() {
      if next.is_ascii_alphanumeric() || next == '-' || next == '_' {
        selector.push(next);
        chars.next();
      } else {
        break;
      }
    }
    selector.push_str(&bump);
  }

  format!("{}{selector}{}", &css[..start], &css[end..])
}
