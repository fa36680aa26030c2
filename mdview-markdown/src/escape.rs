//! HTML escaping for raw document text.

/// Characters replaced by [`escape_html`], in substitution order.
///
/// `&` must stay first so the entities produced by the later entries are not
/// escaped a second time.
pub const HTML_ESCAPES: [(char, &str); 5] = [
  ('&', "&amp;"),
  ('<', "&lt;"),
  ('>', "&gt;"),
  ('"', "&quot;"),
  ('\'', "&#39;"),
];

/// Escape the five HTML-significant characters in `text`.
///
/// The result is safe to place in element content and in double-quoted
/// attribute values.
#[must_use]
pub fn escape_html(text: &str) -> String {
  HTML_ESCAPES
    .iter()
    .fold(text.to_owned(), |acc, (needle, entity)| {
      if acc.contains(*needle) {
        acc.replace(*needle, entity)
      } else {
        acc
      }
    })
}
