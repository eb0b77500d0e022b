use indexmap::IndexSet;
use serde::Deserialize;
use serde::Serialize;

use crate::config::AtomicCssConfig;
use crate::input::{CallForm, CallSite, StyleExpr};
use crate::js;
use crate::runtime::{merge_namespaces, MergedStyle};
use crate::symbols::{Namespace, SymbolTable};

/// A call site argument with every reference resolved to a compiled namespace.
#[derive(Debug, Clone, PartialEq)]
pub enum ResolvedStyle {
  Literal(Namespace),
  Null,
  /// `test` indexes the call site's distinct conditions.
  Conditional {
    test: usize,
    consequent: Box<ResolvedStyle>,
    alternate: Box<ResolvedStyle>,
  },
  Sequence(Vec<ResolvedStyle>),
}

/// Why a call site is left to the runtime merge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "reason", rename_all = "camelCase")]
pub enum BailOut {
  Unresolvable { source: String },
  FoldingDisabled,
  TooManyConditions { count: usize, max: u32 },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Replacement {
  /// The whole call is a constant.
  Literal { code: String },
  /// A lookup table indexed by the call site's conditions.
  Dispatch {
    code: String,
    conditions: Vec<String>,
    table: Vec<String>,
  },
  /// The call stays and is evaluated by the runtime merge.
  Runtime {
    #[serde(flatten)]
    reason: BailOut,
  },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CallSiteOutput {
  pub id: String,
  pub replacement: Replacement,
}

impl CallSiteOutput {
  pub fn is_folded(&self) -> bool {
    !matches!(self.replacement, Replacement::Runtime { .. })
  }
}

/// Evaluates call sites that combine namespaces.
pub struct MergeEvaluator<'a> {
  config: &'a AtomicCssConfig,
  symbols: &'a SymbolTable,
}

impl<'a> MergeEvaluator<'a> {
  pub fn new(config: &'a AtomicCssConfig, symbols: &'a SymbolTable) -> Self {
    Self { config, symbols }
  }

  /// Resolve a call site argument. Conditions are interned into `tests` by
  /// their source text, in order of first appearance.
  pub fn resolve(&self, expr: &StyleExpr, tests: &mut IndexSet<String>) -> Result<ResolvedStyle, BailOut> {
    match expr {
      StyleExpr::Ref { binding, key } => self
        .symbols
        .namespace(binding, key.as_deref())
        .map(ResolvedStyle::Literal)
        .ok_or_else(|| BailOut::Unresolvable {
          source: match key {
            Some(key) => format!("{binding}.{key}"),
            None => binding.clone(),
          },
        }),
      StyleExpr::Null => Ok(ResolvedStyle::Null),
      StyleExpr::Conditional {
        test,
        consequent,
        alternate,
      } => {
        let (test, _) = tests.insert_full(test.clone());
        Ok(ResolvedStyle::Conditional {
          test,
          consequent: Box::new(self.resolve(consequent, tests)?),
          alternate: Box::new(self.resolve(alternate, tests)?),
        })
      }
      StyleExpr::And { test, right } => {
        let (test, _) = tests.insert_full(test.clone());
        Ok(ResolvedStyle::Conditional {
          test,
          consequent: Box::new(self.resolve(right, tests)?),
          alternate: Box::new(ResolvedStyle::Null),
        })
      }
      StyleExpr::Array { items } => items
        .iter()
        .map(|item| self.resolve(item, tests))
        .collect::<Result<Vec<_>, _>>()
        .map(ResolvedStyle::Sequence),
      StyleExpr::Unresolvable { source } => Err(BailOut::Unresolvable {
        source: source.clone(),
      }),
    }
  }

  pub fn fold(&self, call: &CallSite) -> CallSiteOutput {
    let replacement = match self.try_fold(call) {
      Ok(replacement) => replacement,
      Err(reason) => {
        tracing::debug!(call_site = %call.id, ?reason, "leaving call site to the runtime merge");
        Replacement::Runtime { reason }
      }
    };

    CallSiteOutput {
      id: call.id.clone(),
      replacement,
    }
  }

  fn try_fold(&self, call: &CallSite) -> Result<Replacement, BailOut> {
    let mut tests = IndexSet::new();
    let args = call
      .args
      .iter()
      .map(|arg| self.resolve(arg, &mut tests))
      .collect::<Result<Vec<_>, _>>()?;
    let args = ResolvedStyle::Sequence(args);

    if tests.is_empty() {
      let merged = evaluate(&args, 0, 0);
      return Ok(Replacement::Literal {
        code: self.print(call.form, &merged),
      });
    }

    if !self.config.fold_conditional_merges() {
      return Err(BailOut::FoldingDisabled);
    }

    let max = self.config.max_dispatch_conditions();
    if tests.len() > max as usize {
      return Err(BailOut::TooManyConditions {
        count: tests.len(),
        max,
      });
    }

    let table = dispatch_table(&args, tests.len())
      .iter()
      .map(|merged| self.print(call.form, merged))
      .collect::<Vec<_>>();
    let conditions: Vec<String> = tests.into_iter().collect();

    Ok(Replacement::Dispatch {
      code: js::dispatch(&table, &conditions),
      conditions,
      table,
    })
  }

  fn print(&self, form: CallForm, merged: &MergedStyle) -> String {
    let debug = self.config.debug();
    let class_name = merged.class_name(debug);
    match form {
      CallForm::ClassName => js::string_literal(&class_name),
      CallForm::Props => {
        let style_src = if debug { merged.style_src() } else { None };
        js::props_object(&class_name, style_src.as_deref())
      }
    }
  }
}

fn is_live(assignment: usize, test: usize, count: usize) -> bool {
  (assignment >> (count - 1 - test)) & 1 == 1
}

fn collect<'a>(style: &'a ResolvedStyle, assignment: usize, count: usize, out: &mut Vec<&'a Namespace>) {
  match style {
    ResolvedStyle::Literal(namespace) => out.push(namespace),
    ResolvedStyle::Null => {}
    ResolvedStyle::Conditional {
      test,
      consequent,
      alternate,
    } => {
      let branch = if is_live(assignment, *test, count) {
        consequent
      } else {
        alternate
      };
      collect(branch, assignment, count, out);
    }
    ResolvedStyle::Sequence(items) => {
      for item in items {
        collect(item, assignment, count, out);
      }
    }
  }
}

/// Merge the namespaces selected by one assignment of the conditions. Bit
/// `count - 1 - i` of `assignment` is the value of condition `i`.
pub fn evaluate(style: &ResolvedStyle, assignment: usize, count: usize) -> MergedStyle {
  let mut namespaces = Vec::new();
  collect(style, assignment, count, &mut namespaces);
  merge_namespaces(namespaces)
}

/// Merged result for each of the `2^count` assignments, indexed by assignment.
pub fn dispatch_table(style: &ResolvedStyle, count: usize) -> Vec<MergedStyle> {
  (0..1usize << count)
    .map(|assignment| evaluate(style, assignment, count))
    .collect()
}
