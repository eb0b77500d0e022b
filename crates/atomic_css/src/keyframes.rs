use crate::errors::{CompileResult, StyleError};
use crate::input::{StyleObject, StyleValue};
use crate::normalize::Normalizer;
use crate::priority::THEME_VARS_PRIORITY;
use crate::rule::{print_declarations, HashCache, InjectableRule, InjectableStyle};
use crate::symbols::KeyframesDefinition;

pub struct DefinedKeyframes {
  pub keyframes: KeyframesDefinition,
  pub rule: InjectableRule,
}

/// Compile a frames object (`from`, `to`, `50%`, ...) into an `@keyframes`
/// rule. The name is derived from the printed frames, so identical animations
/// share one rule across a build.
pub fn define_keyframes(
  normalizer: &Normalizer<'_>,
  hashes: &mut HashCache,
  frames: &StyleObject,
) -> CompileResult<DefinedKeyframes> {
  let mut ltr_body = String::new();
  let mut rtl_body = String::new();
  let mut has_rtl = false;

  for (raw_key, frame) in frames {
    let selector = normalizer.resolve_key(raw_key)?;
    let StyleValue::Object(frame) = frame else {
      return Err(StyleError::invalid_shape(format!(
        "Keyframe \"{selector}\" must map to an object of properties"
      )));
    };

    let mut ltr = Vec::new();
    let mut rtl = Vec::new();
    for declaration in normalizer.flatten(frame)? {
      if !declaration.context.is_empty() {
        return Err(StyleError::invalid_shape(format!(
          "Keyframe \"{selector}\" can't contain pseudo-classes or at-rules"
        )));
      }
      let (frame_ltr, frame_rtl) = normalizer.print(&declaration)?;
      has_rtl |= frame_rtl.is_some();
      rtl.extend(frame_rtl.unwrap_or_else(|| frame_ltr.clone()));
      ltr.extend(frame_ltr);
    }

    ltr_body.push_str(&format!("{selector}{{{}}}", print_declarations(&ltr)));
    rtl_body.push_str(&format!("{selector}{{{}}}", print_declarations(&rtl)));
  }

  let name = format!("{}-B", hashes.name(&format!("<>{ltr_body}")));
  let ltr = format!("@keyframes {name}{{{ltr_body}}}");
  let rtl = has_rtl.then(|| format!("@keyframes {name}{{{rtl_body}}}"));

  Ok(DefinedKeyframes {
    rule: InjectableRule::new(
      name.clone(),
      InjectableStyle {
        ltr: ltr.clone(),
        rtl: rtl.clone(),
      },
      THEME_VARS_PRIORITY,
    ),
    keyframes: KeyframesDefinition { name, ltr, rtl },
  })
}
