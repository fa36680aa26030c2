//! Shared helpers for the rendering pipeline.
use std::sync::LazyLock;

use log::error;
use regex::Regex;

/// Compile a pattern, logging and degrading to [`never_matching_regex`] if it
/// is invalid.
///
/// Every pattern in this crate is a literal, so the fallback only exists to
/// keep the pipeline total if one of them is ever edited into something
/// invalid.
#[must_use]
pub fn compile_or_never(name: &str, pattern: &str) -> Regex {
  Regex::new(pattern).unwrap_or_else(|e| {
    error!("Failed to compile {name} regex: {e}");
    never_matching_regex()
  })
}

/// Create a regex that never matches anything.
///
/// Used as the fallback when a pattern fails to compile. It asserts a
/// character that is neither whitespace nor non-whitespace, which is safer
/// than something like `^$` that would still match empty input.
#[must_use]
#[allow(
  clippy::expect_used,
  reason = "Constant pattern, checked by the test suite"
)]
pub fn never_matching_regex() -> Regex {
  Regex::new(r"[^\s\S]").expect("never-matching pattern is a valid regex")
}

/// Check that every tag opened in `html` is closed again, in order.
///
/// Only the tags emitted by the inline formatter can appear at this point
/// (raw angle brackets were escaped earlier), so a simple stack over
/// `<name ...>` / `</name>` pairs is enough.
#[must_use]
pub fn tags_balanced(html: &str) -> bool {
  static TAG_RE: LazyLock<Regex> =
    LazyLock::new(|| compile_or_never("TAG_RE", r"<(/?)([a-z][a-z0-9]*)[^>]*>"));

  let mut open: Vec<&str> = Vec::new();
  for caps in TAG_RE.captures_iter(html) {
    let name = caps.get(2).map_or("", |m| m.as_str());
    if caps.get(1).is_some_and(|m| !m.as_str().is_empty()) {
      if open.pop() != Some(name) {
        return false;
      }
    } else {
      open.push(name);
    }
  }
  open.is_empty()
}
