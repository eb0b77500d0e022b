use indexmap::IndexMap;
use indexmap::IndexSet;

use crate::context::merge_key_property;
use crate::symbols::Namespace;

/// Result of merging namespaces in argument order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MergedStyle {
  /// Atomic classes, ordered by where each merge key first appeared.
  pub classes: Vec<String>,
  pub debug_classes: Vec<String>,
  pub sources: Vec<String>,
}

impl MergedStyle {
  pub fn class_name(&self, debug: bool) -> String {
    let mut names: Vec<&str> = Vec::new();
    if debug {
      names.extend(self.debug_classes.iter().map(String::as_str));
    }
    names.extend(self.classes.iter().map(String::as_str));
    names.join(" ")
  }

  pub fn style_src(&self) -> Option<String> {
    (!self.sources.is_empty()).then(|| self.sources.join("; "))
  }
}

/// Merge namespaces so that a later entry for the same property and context
/// replaces an earlier one. An unconditional `null` removes every earlier
/// value of the property, a conditional one only that condition.
pub fn merge_namespaces<'a>(namespaces: impl IntoIterator<Item = &'a Namespace>) -> MergedStyle {
  let mut entries: IndexMap<&str, Option<&str>> = IndexMap::new();
  let mut debug_classes = IndexSet::new();
  let mut sources = IndexSet::new();

  for namespace in namespaces {
    for (key, class_name) in &namespace.entries {
      let key = key.as_str();
      if class_name.is_none() && merge_key_property(key) == key {
        entries.retain(|existing, _| *existing == key || merge_key_property(existing) != key);
      }
      entries.insert(key, class_name.as_deref());
    }
    if let Some(debug_name) = &namespace.debug_name {
      debug_classes.insert(debug_name.clone());
    }
    if let Some(source) = &namespace.source {
      sources.insert(source.clone());
    }
  }

  MergedStyle {
    classes: entries
      .into_values()
      .flatten()
      .map(str::to_string)
      .collect(),
    debug_classes: debug_classes.into_iter().collect(),
    sources: sources.into_iter().collect(),
  }
}

/// The merge performed at runtime for call sites that could not be folded.
/// Falsy arguments are passed as `None`.
pub fn merge_runtime(args: &[Option<&Namespace>]) -> String {
  merge_namespaces(args.iter().flatten().copied()).class_name(false)
}
