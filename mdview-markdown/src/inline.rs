//! Inline span formatting.
//!
//! Inline formatting runs on text that has already been escaped, as an
//! ordered list of independent passes. Each pass is a single global,
//! leftmost-first, non-overlapping substitution over the whole string and
//! never rescans its own output; later passes do see what earlier ones
//! produced.
//!
//! # Markup from earlier passes
//!
//! Tags written by an earlier pass are opaque to later ones: each tag is
//! swapped for a single placeholder character before matching and restored
//! afterwards, so delimiters inside an `href` are never seen. A span is only
//! rewritten if its content is tag-balanced. A candidate such as the italic in
//! `*a <strong>b* c</strong>` (the bold pass having already claimed `**b* c**`)
//! would straddle a tag boundary, so it is left as literal text and the scan
//! retries from the next character. The result is always well-nested HTML.
use std::{ops::Range, sync::LazyLock};

use regex::{Captures, Regex};

use crate::utils::{compile_or_never, tags_balanced};

/// A single inline rewrite rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InlinePass {
  /// `[text](url)` to `<a href="url">text</a>`.
  Link,
  /// `**text**` or `__text__` to `<strong>text</strong>`.
  Bold,
  /// `*text*` or `_text_` to `<em>text</em>`.
  Italic,
  /// `` `text` `` to `<code>text</code>`.
  Code,
}

/// Inline passes in the order [`format_inline`] applies them.
///
/// Bold must run before italic so that doubled delimiters are consumed before
/// the single-delimiter rule can split them.
pub const INLINE_PASSES: [InlinePass; 4] = [
  InlinePass::Link,
  InlinePass::Bold,
  InlinePass::Italic,
  InlinePass::Code,
];

static LINK_RE: LazyLock<Regex> =
  LazyLock::new(|| compile_or_never("LINK_RE", r"\[([^\]]+)\]\(([^)]+)\)"));

// The regex crate has no backreferences, so "closing delimiter equals the
// opening one" is spelled out as one alternative per delimiter.
static BOLD_RE: LazyLock<Regex> = LazyLock::new(|| {
  compile_or_never("BOLD_RE", r"\*\*(.+?)\*\*|__(.+?)__")
});

static ITALIC_RE: LazyLock<Regex> =
  LazyLock::new(|| compile_or_never("ITALIC_RE", r"\*(.+?)\*|_(.+?)_"));

static CODE_RE: LazyLock<Regex> =
  LazyLock::new(|| compile_or_never("CODE_RE", r"`([^`]+)`"));

static TAG_RE: LazyLock<Regex> =
  LazyLock::new(|| compile_or_never("TAG_RE", r"<[^>]*>"));

/// Stands in for one tag while a pass matches.
const PLACEHOLDER: char = '\u{FFFC}';

/// Text with every tag replaced by [`PLACEHOLDER`].
struct Masked<'a> {
  text: String,
  /// Offset of each placeholder in `text`, with the tag it hides.
  tags: Vec<(usize, &'a str)>,
}

impl<'a> Masked<'a> {
  fn new(html: &'a str) -> Self {
    let mut text = String::with_capacity(html.len());
    let mut tags = Vec::new();
    let mut last = 0;

    for tag in TAG_RE.find_iter(html) {
      text.push_str(&html[last..tag.start()]);
      tags.push((text.len(), tag.as_str()));
      text.push(PLACEHOLDER);
      last = tag.end();
    }
    text.push_str(&html[last..]);

    Self { text, tags }
  }

  /// Slice of the masked text with its tags put back.
  fn unmask(&self, range: Range<usize>) -> String {
    let first = self.tags.partition_point(|&(pos, _)| pos < range.start);
    let mut out = String::with_capacity(range.len());
    let mut cursor = range.start;

    for &(pos, tag) in self.tags[first..]
      .iter()
      .take_while(|&&(pos, _)| pos < range.end)
    {
      out.push_str(&self.text[cursor..pos]);
      out.push_str(tag);
      cursor = pos + PLACEHOLDER.len_utf8();
    }
    out.push_str(&self.text[cursor..range.end]);
    out
  }
}

impl InlinePass {
  /// Short name of the pass, for logs and diagnostics.
  #[must_use]
  pub const fn name(self) -> &'static str {
    match self {
      Self::Link => "link",
      Self::Bold => "bold",
      Self::Italic => "italic",
      Self::Code => "code",
    }
  }

  /// Element the pass wraps its match in.
  const fn tag(self) -> &'static str {
    match self {
      Self::Link => "a",
      Self::Bold => "strong",
      Self::Italic => "em",
      Self::Code => "code",
    }
  }

  fn regex(self) -> &'static Regex {
    match self {
      Self::Link => &LINK_RE,
      Self::Bold => &BOLD_RE,
      Self::Italic => &ITALIC_RE,
      Self::Code => &CODE_RE,
    }
  }

  /// Build the replacement for one match, or `None` to keep it literal.
  fn replacement(self, caps: &Captures, masked: &Masked<'_>) -> Option<String> {
    let group = |i: usize| caps.get(i).map(|m| masked.unmask(m.range()));
    let tag = self.tag();

    match self {
      Self::Link => {
        let text = group(1)?;
        let url = group(2)?;
        (tags_balanced(&text) && tags_balanced(&url))
          .then(|| format!(r#"<{tag} href="{url}">{text}</{tag}>"#))
      },
      Self::Bold | Self::Italic | Self::Code => {
        let inner = group(1).or_else(|| group(2))?;
        tags_balanced(&inner).then(|| format!("<{tag}>{inner}</{tag}>"))
      },
    }
  }

  /// Apply this pass alone to `text`.
  ///
  /// Matches are leftmost-first and never overlap. A rejected match is left
  /// as is and the search resumes one character past its start.
  #[must_use]
  pub fn apply(self, text: &str) -> String {
    let masked = Masked::new(text);
    let haystack = masked.text.as_str();
    let mut out = String::with_capacity(text.len());
    let mut copied = 0;
    let mut from = 0;

    while let Some(caps) = self.regex().captures_at(haystack, from) {
      let Some(whole) = caps.get(0) else { break };

      if let Some(html) = self.replacement(&caps, &masked) {
        out.push_str(&masked.unmask(copied..whole.start()));
        out.push_str(&html);
        copied = whole.end();
        from = whole.end();
      } else {
        from = whole.start()
          + haystack[whole.start()..]
            .chars()
            .next()
            .map_or(1, char::len_utf8);
      }
    }

    out.push_str(&masked.unmask(copied..haystack.len()));
    out
  }
}

/// Apply every pass in [`INLINE_PASSES`] to already-escaped `text`.
#[must_use]
pub fn format_inline(text: &str) -> String {
  INLINE_PASSES
    .iter()
    .fold(text.to_owned(), |acc, pass| pass.apply(&acc))
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_link_pass() {
    assert_eq!(
      InlinePass::Link.apply("see [Click](https://example.com) now"),
      r#"see <a href="https://example.com">Click</a> now"#
    );
  }

  #[test]
  fn test_link_requires_both_parts() {
    assert_eq!(InlinePass::Link.apply("[]()"), "[]()");
    assert_eq!(InlinePass::Link.apply("[text] (url)"), "[text] (url)");
  }

  #[test]
  fn test_bold_pass_both_delimiters() {
    assert_eq!(
      InlinePass::Bold.apply("**a** and __b__"),
      "<strong>a</strong> and <strong>b</strong>"
    );
  }

  #[test]
  fn test_bold_delimiters_must_match() {
    assert_eq!(InlinePass::Bold.apply("**a__"), "**a__");
  }

  #[test]
  fn test_bold_is_non_greedy() {
    assert_eq!(
      InlinePass::Bold.apply("**a** b **c**"),
      "<strong>a</strong> b <strong>c</strong>"
    );
  }

  #[test]
  fn test_italic_pass_both_delimiters() {
    assert_eq!(
      InlinePass::Italic.apply("*a* and _b_"),
      "<em>a</em> and <em>b</em>"
    );
  }

  #[test]
  fn test_code_pass() {
    assert_eq!(
      InlinePass::Code.apply("run `ls -la` here"),
      "run <code>ls -la</code> here"
    );
  }

  #[test]
  fn test_pass_order_is_link_bold_italic_code() {
    assert_eq!(INLINE_PASSES, [
      InlinePass::Link,
      InlinePass::Bold,
      InlinePass::Italic,
      InlinePass::Code,
    ]);
    let names: Vec<_> = INLINE_PASSES.iter().map(|p| p.name()).collect();
    assert_eq!(names, ["link", "bold", "italic", "code"]);
  }

  #[test]
  fn test_bold_before_italic() {
    assert_eq!(
      format_inline("**bold** and *italic*"),
      "<strong>bold</strong> and <em>italic</em>"
    );
  }

  #[test]
  fn test_bold_inside_link_text() {
    assert_eq!(
      format_inline("[**Ward** rounds](https://example.com/ward)"),
      r#"<a href="https://example.com/ward"><strong>Ward</strong> rounds</a>"#
    );
  }

  #[test]
  fn test_code_runs_last() {
    // Emphasis inside backticks has already been rewritten by the time the
    // code pass sees it
    assert_eq!(
      format_inline("`**x**`"),
      "<code><strong>x</strong></code>"
    );
  }

  #[test]
  fn test_overlapping_emphasis_stays_well_nested() {
    let out = format_inline("*a **b* c**");
    assert_eq!(out, "*a <strong>b* c</strong>");
    assert!(tags_balanced(&out));
  }

  #[test]
  fn test_underscores_in_url_are_kept() {
    let out = format_inline("[notes](https://x.example/ward_7_notes)");
    assert_eq!(
      out,
      r#"<a href="https://x.example/ward_7_notes">notes</a>"#
    );
    assert!(tags_balanced(&out));
  }

  #[test]
  fn test_stars_in_url_are_kept() {
    let out = format_inline("**see [x](a**b)**");
    assert_eq!(out, r#"<strong>see <a href="a**b">x</a></strong>"#);
    assert!(tags_balanced(&out));
  }

  #[test]
  fn test_marker_in_url_does_not_hide_later_emphasis() {
    assert_eq!(
      format_inline("[a](u*) then *b*"),
      r#"<a href="u*">a</a> then <em>b</em>"#
    );
    assert_eq!(
      format_inline("[a](x_y) and _z_"),
      r#"<a href="x_y">a</a> and <em>z</em>"#
    );
  }

  #[test]
  fn test_emphasis_around_link() {
    assert_eq!(
      format_inline("*[a](https://x.example/b_c)*"),
      r#"<em><a href="https://x.example/b_c">a</a></em>"#
    );
  }

  #[test]
  fn test_rejected_match_retries_next_character() {
    // Both earlier candidates straddle the anchor
    assert_eq!(
      InlinePass::Italic.apply("*x <a>y*</a> *z*"),
      "*x <a>y*</a> <em>z</em>"
    );
  }

  #[test]
  fn test_placeholder_character_in_text_survives() {
    assert_eq!(
      format_inline("keep \u{FFFC} and **this**"),
      "keep \u{FFFC} and <strong>this</strong>"
    );
  }

  #[test]
  fn test_escaped_text_passes_through() {
    assert_eq!(
      format_inline("a &lt; b &amp;&amp; c &gt; d"),
      "a &lt; b &amp;&amp; c &gt; d"
    );
  }

  #[test]
  fn test_unterminated_markers_are_literal() {
    assert_eq!(format_inline("2 * 3 = 6"), "2 * 3 = 6");
    assert_eq!(format_inline("`open"), "`open");
    assert_eq!(format_inline("**half"), "**half");
  }
}
