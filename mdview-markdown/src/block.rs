//! Line-oriented block parser.
//!
//! Parsing is a single forward pass. Every line is first classified into a
//! [`LineKind`]; the parser loop then dispatches on that classification and
//! lets the matching rule consume as many following lines as it needs before
//! control returns to the top of the loop. The rules are tried in the fixed
//! order blank, fence, heading, unordered list, ordered list, paragraph.
//!
//! # Examples
//!
//! ```
//! use mdview_markdown::render_html;
//!
//! let html = render_html("# Notes\n\n- one\n- two");
//! assert_eq!(html, "<h1>Notes</h1>\n\n<ul><li>one</li><li>two</li></ul>");
//! ```
use std::{ops::Range, sync::LazyLock};

use log::{trace, warn};
use regex::Regex;

use crate::{escape::escape_html, inline::format_inline, utils::compile_or_never};

/// Marker that opens and closes a fenced code block.
pub const FENCE: &str = "```";

static HEADING_RE: LazyLock<Regex> =
  LazyLock::new(|| compile_or_never("HEADING_RE", r"^(#{1,6})\s+(.*)$"));

static UNORDERED_RE: LazyLock<Regex> =
  LazyLock::new(|| compile_or_never("UNORDERED_RE", r"^[-*]\s+(.*)$"));

static ORDERED_RE: LazyLock<Regex> =
  LazyLock::new(|| compile_or_never("ORDERED_RE", r"^[0-9]+\.\s+(.*)$"));

/// Classification of a single source line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind<'a> {
  /// Empty, or whitespace only.
  Blank,
  /// Starts with three backticks.
  FenceStart,
  /// One to six `#`, whitespace, then the heading text.
  Heading { level: u8, text: &'a str },
  /// `-` or `*`, whitespace, then the item text.
  UnorderedItem(&'a str),
  /// Digits, `.`, whitespace, then the item text.
  OrderedItem(&'a str),
  /// Anything else.
  ParagraphLine,
}

/// Classify one line. Rules are checked in precedence order and the first
/// match wins.
#[must_use]
pub fn classify_line(line: &str) -> LineKind<'_> {
  if line.trim().is_empty() {
    return LineKind::Blank;
  }

  if line.starts_with(FENCE) {
    return LineKind::FenceStart;
  }

  if let Some(caps) = HEADING_RE.captures(line) {
    let level = caps.get(1).map_or(1, |m| m.len());
    let text = caps.get(2).map_or("", |m| m.as_str());
    return LineKind::Heading {
      level: u8::try_from(level).unwrap_or(6),
      text:  text.trim(),
    };
  }

  if let Some(text) = capture_remainder(&UNORDERED_RE, line) {
    return LineKind::UnorderedItem(text);
  }

  if let Some(text) = capture_remainder(&ORDERED_RE, line) {
    return LineKind::OrderedItem(text);
  }

  LineKind::ParagraphLine
}

fn capture_remainder<'a>(re: &Regex, line: &'a str) -> Option<&'a str> {
  re.captures(line)
    .and_then(|caps| caps.get(1))
    .map(|m| m.as_str().trim())
}

/// Kind of block element emitted for a run of lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockKind {
  Blank,
  CodeFence,
  Heading(u8),
  UnorderedList,
  OrderedList,
  Paragraph,
}

/// One emitted block element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Block {
  /// What kind of element this is.
  pub kind:  BlockKind,
  /// Zero-based source lines this block consumed.
  pub lines: Range<usize>,
  /// Rendered HTML for the block. Empty for [`BlockKind::Blank`].
  pub html:  String,
}

/// Parse `source` into its block elements, in document order.
#[must_use]
pub fn parse_blocks(source: &str) -> Vec<Block> {
  let lines: Vec<&str> = source.lines().collect();
  let mut blocks = Vec::new();
  let mut cursor = 0;

  while cursor < lines.len() {
    let start = cursor;
    let (kind, html) = match classify_line(lines[cursor]) {
      LineKind::Blank => {
        cursor += 1;
        (BlockKind::Blank, String::new())
      },
      LineKind::FenceStart => {
        let (html, next) = consume_fence(&lines, cursor);
        cursor = next;
        (BlockKind::CodeFence, html)
      },
      LineKind::Heading { level, text } => {
        cursor += 1;
        (
          BlockKind::Heading(level),
          format!("<h{level}>{}</h{level}>", format_inline(&escape_html(text))),
        )
      },
      LineKind::UnorderedItem(_) => {
        let (items, next) = consume_list(&lines, cursor, ListStyle::Unordered);
        cursor = next;
        (BlockKind::UnorderedList, wrap_list("ul", &items))
      },
      LineKind::OrderedItem(_) => {
        let (items, next) = consume_list(&lines, cursor, ListStyle::Ordered);
        cursor = next;
        (BlockKind::OrderedList, wrap_list("ol", &items))
      },
      LineKind::ParagraphLine => {
        let (text, next) = consume_paragraph(&lines, cursor);
        cursor = next;
        (
          BlockKind::Paragraph,
          format!("<p>{}</p>", format_inline(&escape_html(&text))),
        )
      },
    };

    trace!("Block {kind:?} consumed lines {start}..{cursor}");
    blocks.push(Block {
      kind,
      lines: start..cursor,
      html,
    });
  }

  blocks
}

/// Render `source` to an HTML fragment, one block per entry joined by
/// newlines.
#[must_use]
pub fn render_html(source: &str) -> String {
  parse_blocks(source)
    .into_iter()
    .map(|block| block.html)
    .collect::<Vec<_>>()
    .join("\n")
}

/// Consume a fenced block starting at `start`. Returns the HTML and the index
/// of the first line after the block.
fn consume_fence(lines: &[&str], start: usize) -> (String, usize) {
  let mut body = Vec::new();
  let mut cursor = start + 1;

  while cursor < lines.len() {
    let line = lines[cursor];
    cursor += 1;
    if line.starts_with(FENCE) {
      return (fence_html(&body), cursor);
    }
    body.push(escape_html(line));
  }

  warn!(
    "Unterminated code fence opened on line {}, consuming to end of input",
    start + 1
  );
  (fence_html(&body), cursor)
}

fn fence_html(body: &[String]) -> String {
  format!("<pre><code>{}</code></pre>", body.join("\n"))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ListStyle {
  Unordered,
  Ordered,
}

impl ListStyle {
  fn item<'a>(self, line: &'a str) -> Option<&'a str> {
    match (self, classify_line(line)) {
      (Self::Unordered, LineKind::UnorderedItem(text))
      | (Self::Ordered, LineKind::OrderedItem(text)) => Some(text),
      _ => None,
    }
  }
}

/// Consume the contiguous run of list items of one style.
fn consume_list(
  lines: &[&str],
  start: usize,
  style: ListStyle,
) -> (Vec<String>, usize) {
  let mut items = Vec::new();
  let mut cursor = start;

  while let Some(text) = lines.get(cursor).and_then(|line| style.item(line)) {
    items.push(format_inline(&escape_html(text)));
    cursor += 1;
  }

  (items, cursor)
}

fn wrap_list(tag: &str, items: &[String]) -> String {
  let body: String = items
    .iter()
    .map(|item| format!("<li>{item}</li>"))
    .collect();
  format!("<{tag}>{body}</{tag}>")
}

/// Consume a paragraph: the current line plus every following line that is
/// neither blank nor the start of another block.
fn consume_paragraph(lines: &[&str], start: usize) -> (String, usize) {
  let mut parts = vec![lines[start].trim()];
  let mut cursor = start + 1;

  while let Some(line) = lines.get(cursor) {
    if classify_line(line) != LineKind::ParagraphLine {
      break;
    }
    parts.push(line.trim());
    cursor += 1;
  }

  (parts.join(" "), cursor)
}
