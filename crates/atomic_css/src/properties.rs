use std::collections::HashSet;

use inflector::cases::kebabcase::to_kebab_case;
use once_cell::sync::Lazy;

/// Priority of custom properties used directly as style keys.
pub const CUSTOM_PROPERTY_PRIORITY: u32 = 1;
pub const SHORTHANDS_OF_SHORTHANDS_PRIORITY: u32 = 1000;
pub const SHORTHANDS_OF_LONGHANDS_PRIORITY: u32 = 2000;
pub const LONGHAND_PRIORITY: u32 = 3000;
pub const PHYSICAL_LONGHAND_PRIORITY: u32 = 4000;

static SHORTHANDS_OF_SHORTHANDS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
  HashSet::from([
    "all",
    "animation",
    "background",
    "border",
    "border-block",
    "border-inline",
    "font",
    "grid",
    "inset",
    "margin",
    "mask",
    "padding",
    "scroll-margin",
    "scroll-padding",
    "transition",
  ])
});

static SHORTHANDS_OF_LONGHANDS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
  HashSet::from([
    "animation-range",
    "background-position",
    "border-block-color",
    "border-block-end",
    "border-block-start",
    "border-block-style",
    "border-block-width",
    "border-bottom",
    "border-color",
    "border-image",
    "border-inline-color",
    "border-inline-end",
    "border-inline-start",
    "border-inline-style",
    "border-inline-width",
    "border-left",
    "border-radius",
    "border-right",
    "border-style",
    "border-top",
    "border-width",
    "column-rule",
    "columns",
    "contain-intrinsic-size",
    "container",
    "flex",
    "flex-flow",
    "font-variant",
    "gap",
    "grid-area",
    "grid-column",
    "grid-row",
    "grid-template",
    "inset-block",
    "inset-inline",
    "list-style",
    "margin-block",
    "margin-inline",
    "mask-border",
    "offset",
    "outline",
    "overflow",
    "overscroll-behavior",
    "padding-block",
    "padding-inline",
    "place-content",
    "place-items",
    "place-self",
    "scroll-margin-block",
    "scroll-margin-inline",
    "scroll-padding-block",
    "scroll-padding-inline",
    "text-decoration",
    "text-emphasis",
    "text-wrap",
  ])
});

static PHYSICAL_LONGHANDS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
  HashSet::from([
    "top",
    "right",
    "bottom",
    "left",
    "width",
    "height",
    "min-width",
    "min-height",
    "max-width",
    "max-height",
    "overflow-x",
    "overflow-y",
    "overscroll-behavior-x",
    "overscroll-behavior-y",
    "background-position-x",
    "background-position-y",
  ])
});

static UNITLESS_PROPERTIES: Lazy<HashSet<&'static str>> = Lazy::new(|| {
  HashSet::from([
    "animation-iteration-count",
    "aspect-ratio",
    "border-image-outset",
    "border-image-slice",
    "border-image-width",
    "column-count",
    "fill-opacity",
    "flex",
    "flex-grow",
    "flex-shrink",
    "flood-opacity",
    "font-size-adjust",
    "font-weight",
    "grid-area",
    "grid-column",
    "grid-column-end",
    "grid-column-start",
    "grid-row",
    "grid-row-end",
    "grid-row-start",
    "line-clamp",
    "line-height",
    "opacity",
    "order",
    "orphans",
    "stop-opacity",
    "stroke-dasharray",
    "stroke-dashoffset",
    "stroke-miterlimit",
    "stroke-opacity",
    "stroke-width",
    "tab-size",
    "-webkit-line-clamp",
    "widows",
    "z-index",
    "zoom",
  ])
});

static KNOWN_PROPERTIES: Lazy<HashSet<&'static str>> = Lazy::new(|| {
  let mut known = HashSet::from([
    "accent-color",
    "align-content",
    "align-items",
    "align-self",
    "all",
    "anchor-name",
    "animation",
    "animation-composition",
    "animation-delay",
    "animation-direction",
    "animation-duration",
    "animation-fill-mode",
    "animation-iteration-count",
    "animation-name",
    "animation-play-state",
    "animation-range",
    "animation-range-end",
    "animation-range-start",
    "animation-timeline",
    "animation-timing-function",
    "appearance",
    "aspect-ratio",
    "backdrop-filter",
    "backface-visibility",
    "background",
    "background-attachment",
    "background-blend-mode",
    "background-clip",
    "background-color",
    "background-image",
    "background-origin",
    "background-position",
    "background-position-x",
    "background-position-y",
    "background-repeat",
    "background-size",
    "block-size",
    "border",
    "border-block",
    "border-block-color",
    "border-block-end",
    "border-block-end-color",
    "border-block-end-style",
    "border-block-end-width",
    "border-block-start",
    "border-block-start-color",
    "border-block-start-style",
    "border-block-start-width",
    "border-block-style",
    "border-block-width",
    "border-bottom",
    "border-bottom-color",
    "border-bottom-left-radius",
    "border-bottom-right-radius",
    "border-bottom-style",
    "border-bottom-width",
    "border-collapse",
    "border-color",
    "border-end-end-radius",
    "border-end-start-radius",
    "border-image",
    "border-image-outset",
    "border-image-repeat",
    "border-image-slice",
    "border-image-source",
    "border-image-width",
    "border-inline",
    "border-inline-color",
    "border-inline-end",
    "border-inline-end-color",
    "border-inline-end-style",
    "border-inline-end-width",
    "border-inline-start",
    "border-inline-start-color",
    "border-inline-start-style",
    "border-inline-start-width",
    "border-inline-style",
    "border-inline-width",
    "border-left",
    "border-left-color",
    "border-left-style",
    "border-left-width",
    "border-radius",
    "border-right",
    "border-right-color",
    "border-right-style",
    "border-right-width",
    "border-spacing",
    "border-start-end-radius",
    "border-start-start-radius",
    "border-style",
    "border-top",
    "border-top-color",
    "border-top-left-radius",
    "border-top-right-radius",
    "border-top-style",
    "border-top-width",
    "border-width",
    "bottom",
    "box-decoration-break",
    "box-shadow",
    "box-sizing",
    "break-after",
    "break-before",
    "break-inside",
    "caption-side",
    "caret-color",
    "clear",
    "clip",
    "clip-path",
    "color",
    "color-scheme",
    "column-count",
    "column-fill",
    "column-gap",
    "column-rule",
    "column-rule-color",
    "column-rule-style",
    "column-rule-width",
    "column-span",
    "column-width",
    "columns",
    "contain",
    "contain-intrinsic-block-size",
    "contain-intrinsic-height",
    "contain-intrinsic-inline-size",
    "contain-intrinsic-size",
    "contain-intrinsic-width",
    "container",
    "container-name",
    "container-type",
    "content",
    "content-visibility",
    "counter-increment",
    "counter-reset",
    "counter-set",
    "cursor",
    "direction",
    "display",
    "empty-cells",
    "fill",
    "fill-opacity",
    "fill-rule",
    "filter",
    "flex",
    "flex-basis",
    "flex-direction",
    "flex-flow",
    "flex-grow",
    "flex-shrink",
    "flex-wrap",
    "float",
    "flood-color",
    "flood-opacity",
    "font",
    "font-family",
    "font-feature-settings",
    "font-kerning",
    "font-optical-sizing",
    "font-size",
    "font-size-adjust",
    "font-stretch",
    "font-style",
    "font-synthesis",
    "font-variant",
    "font-variant-caps",
    "font-variant-east-asian",
    "font-variant-ligatures",
    "font-variant-numeric",
    "font-variation-settings",
    "font-weight",
    "forced-color-adjust",
    "gap",
    "grid",
    "grid-area",
    "grid-auto-columns",
    "grid-auto-flow",
    "grid-auto-rows",
    "grid-column",
    "grid-column-end",
    "grid-column-start",
    "grid-row",
    "grid-row-end",
    "grid-row-start",
    "grid-template",
    "grid-template-areas",
    "grid-template-columns",
    "grid-template-rows",
    "height",
    "hyphens",
    "image-rendering",
    "inline-size",
    "inset",
    "inset-block",
    "inset-block-end",
    "inset-block-start",
    "inset-inline",
    "inset-inline-end",
    "inset-inline-start",
    "isolation",
    "justify-content",
    "justify-items",
    "justify-self",
    "left",
    "letter-spacing",
    "line-break",
    "line-clamp",
    "line-height",
    "list-style",
    "list-style-image",
    "list-style-position",
    "list-style-type",
    "margin",
    "margin-block",
    "margin-block-end",
    "margin-block-start",
    "margin-bottom",
    "margin-inline",
    "margin-inline-end",
    "margin-inline-start",
    "margin-left",
    "margin-right",
    "margin-top",
    "mask",
    "mask-border",
    "mask-clip",
    "mask-composite",
    "mask-image",
    "mask-mode",
    "mask-origin",
    "mask-position",
    "mask-repeat",
    "mask-size",
    "mask-type",
    "max-block-size",
    "max-height",
    "max-inline-size",
    "max-width",
    "min-block-size",
    "min-height",
    "min-inline-size",
    "min-width",
    "mix-blend-mode",
    "object-fit",
    "object-position",
    "offset",
    "offset-anchor",
    "offset-distance",
    "offset-path",
    "offset-rotate",
    "opacity",
    "order",
    "orphans",
    "outline",
    "outline-color",
    "outline-offset",
    "outline-style",
    "outline-width",
    "overflow",
    "overflow-anchor",
    "overflow-block",
    "overflow-clip-margin",
    "overflow-inline",
    "overflow-wrap",
    "overflow-x",
    "overflow-y",
    "overscroll-behavior",
    "overscroll-behavior-block",
    "overscroll-behavior-inline",
    "overscroll-behavior-x",
    "overscroll-behavior-y",
    "padding",
    "padding-block",
    "padding-block-end",
    "padding-block-start",
    "padding-bottom",
    "padding-inline",
    "padding-inline-end",
    "padding-inline-start",
    "padding-left",
    "padding-right",
    "padding-top",
    "page-break-after",
    "page-break-before",
    "page-break-inside",
    "paint-order",
    "perspective",
    "perspective-origin",
    "place-content",
    "place-items",
    "place-self",
    "pointer-events",
    "position",
    "position-anchor",
    "position-try",
    "position-try-fallbacks",
    "print-color-adjust",
    "quotes",
    "resize",
    "right",
    "rotate",
    "row-gap",
    "scale",
    "scroll-behavior",
    "scroll-margin",
    "scroll-margin-block",
    "scroll-margin-block-end",
    "scroll-margin-block-start",
    "scroll-margin-bottom",
    "scroll-margin-inline",
    "scroll-margin-inline-end",
    "scroll-margin-inline-start",
    "scroll-margin-left",
    "scroll-margin-right",
    "scroll-margin-top",
    "scroll-padding",
    "scroll-padding-block",
    "scroll-padding-block-end",
    "scroll-padding-block-start",
    "scroll-padding-bottom",
    "scroll-padding-inline",
    "scroll-padding-inline-end",
    "scroll-padding-inline-start",
    "scroll-padding-left",
    "scroll-padding-right",
    "scroll-padding-top",
    "scroll-snap-align",
    "scroll-snap-stop",
    "scroll-snap-type",
    "scroll-timeline",
    "scroll-timeline-axis",
    "scroll-timeline-name",
    "scrollbar-color",
    "scrollbar-gutter",
    "scrollbar-width",
    "shape-image-threshold",
    "shape-margin",
    "shape-outside",
    "stop-color",
    "stop-opacity",
    "stroke",
    "stroke-dasharray",
    "stroke-dashoffset",
    "stroke-linecap",
    "stroke-linejoin",
    "stroke-miterlimit",
    "stroke-opacity",
    "stroke-width",
    "tab-size",
    "table-layout",
    "text-align",
    "text-align-last",
    "text-anchor",
    "text-combine-upright",
    "text-decoration",
    "text-decoration-color",
    "text-decoration-line",
    "text-decoration-skip-ink",
    "text-decoration-style",
    "text-decoration-thickness",
    "text-emphasis",
    "text-emphasis-color",
    "text-emphasis-position",
    "text-emphasis-style",
    "text-indent",
    "text-orientation",
    "text-overflow",
    "text-rendering",
    "text-shadow",
    "text-transform",
    "text-underline-offset",
    "text-underline-position",
    "text-wrap",
    "text-wrap-mode",
    "text-wrap-style",
    "top",
    "touch-action",
    "transform",
    "transform-box",
    "transform-origin",
    "transform-style",
    "transition",
    "transition-behavior",
    "transition-delay",
    "transition-duration",
    "transition-property",
    "transition-timing-function",
    "translate",
    "unicode-bidi",
    "user-select",
    "vector-effect",
    "vertical-align",
    "view-timeline",
    "view-timeline-axis",
    "view-timeline-inset",
    "view-timeline-name",
    "view-transition-name",
    "visibility",
    "white-space",
    "white-space-collapse",
    "widows",
    "width",
    "will-change",
    "word-break",
    "word-spacing",
    "word-wrap",
    "writing-mode",
    "z-index",
    "zoom",
  ]);
  known.extend(crate::logical::LEGACY_ALIASES.iter().map(|(alias, _)| *alias));
  known
});

/// Convert an authored property name (`paddingInlineStart`, `WebkitAppearance`,
/// `padding-inline-start`, `--brand`) into its kebab-case CSS name.
pub fn css_property_name(name: &str) -> String {
  if name.starts_with("--") || name.starts_with('-') {
    return name.to_string();
  }

  let kebab = to_kebab_case(name);
  let starts_with_vendor = ["Webkit", "Moz", "ms", "O"]
    .iter()
    .any(|prefix| name.starts_with(prefix) && has_uppercase_after(name, prefix.len()));

  if starts_with_vendor {
    format!("-{kebab}")
  } else {
    kebab
  }
}

fn has_uppercase_after(name: &str, index: usize) -> bool {
  name[index..]
    .chars()
    .next()
    .is_some_and(|c| c.is_ascii_uppercase())
}

pub fn is_custom_property(property: &str) -> bool {
  property.starts_with("--")
}

pub fn is_vendor_prefixed(property: &str) -> bool {
  ["-webkit-", "-moz-", "-ms-", "-o-"]
    .iter()
    .any(|prefix| property.starts_with(prefix))
}

pub fn is_known_property(property: &str) -> bool {
  is_custom_property(property)
    || is_vendor_prefixed(property)
    || KNOWN_PROPERTIES.contains(property)
}

pub fn is_unitless(property: &str) -> bool {
  is_custom_property(property) || UNITLESS_PROPERTIES.contains(property)
}

/// Base cascade tier of a property. Broader shorthands sort first so the
/// longhands they cover always win regardless of merge order.
pub fn property_priority(property: &str) -> u32 {
  if is_custom_property(property) {
    return CUSTOM_PROPERTY_PRIORITY;
  }
  if SHORTHANDS_OF_SHORTHANDS.contains(property) {
    return SHORTHANDS_OF_SHORTHANDS_PRIORITY;
  }
  if SHORTHANDS_OF_LONGHANDS.contains(property) {
    return SHORTHANDS_OF_LONGHANDS_PRIORITY;
  }
  if is_physical_longhand(property) {
    return PHYSICAL_LONGHAND_PRIORITY;
  }
  LONGHAND_PRIORITY
}

fn is_physical_longhand(property: &str) -> bool {
  if PHYSICAL_LONGHANDS.contains(property) {
    return true;
  }

  let unprefixed = property.trim_start_matches("-webkit-");
  ["-top", "-right", "-bottom", "-left"]
    .iter()
    .any(|side| unprefixed.contains(side))
}

/// Format a numeric style value, adding `px` where the property takes a length.
pub fn format_number(property: &str, number: f64) -> String {
  let text = format_css_number(number);
  if number == 0.0 || is_unitless(property) {
    text
  } else {
    format!("{text}px")
  }
}

pub fn format_css_number(number: f64) -> String {
  let number = if number == 0.0 { 0.0 } else { number };
  let mut text = number.to_string();
  if text.ends_with(".0") {
    text.truncate(text.len() - 2);
  }
  text
}
