//! Plain-text projection of rendered fragments.
//!
//! Projection renders a document through the full block and inline pipeline
//! and then discards all markup, keeping only the visible text. Two
//! implementations sit behind [`TextProjector`], and the host picks one:
//!
//! - [`DomProjector`] parses the fragment into an HTML5 DOM and reads its
//!   text content, decoding entities exactly as a browser would.
//! - [`TagStripProjector`] is for headless contexts: it strips tags with a
//!   regex and then decodes entities.
use std::{fmt, str::FromStr, sync::LazyLock};

use regex::Regex;
use serde::{Deserialize, Serialize};
use tendril::TendrilSink;

use crate::{
  block::render_html,
  error::ViewError,
  utils::compile_or_never,
};

/// Strategy for turning an HTML fragment back into text.
pub trait TextProjector {
  /// Project an already-rendered HTML fragment to text.
  fn project_html(&self, html: &str) -> String;

  /// Render `source` and project the resulting fragment to text.
  fn project(&self, source: &str) -> String {
    self.project_html(&render_html(source))
  }
}

/// Precise projector backed by an HTML5 DOM.
#[derive(Debug, Clone, Copy, Default)]
pub struct DomProjector;

impl TextProjector for DomProjector {
  fn project_html(&self, html: &str) -> String {
    if html.is_empty() {
      return String::new();
    }
    kuchikikiki::parse_html().one(html).text_contents()
  }
}

/// Best-effort projector for hosts without a DOM.
#[derive(Debug, Clone, Copy, Default)]
pub struct TagStripProjector;

static TAG_RE: LazyLock<Regex> =
  LazyLock::new(|| compile_or_never("TAG_RE", r"<[^>]*>"));

impl TextProjector for TagStripProjector {
  fn project_html(&self, html: &str) -> String {
    let stripped = TAG_RE.replace_all(html, "");
    html_escape::decode_html_entities(&stripped).into_owned()
  }
}

/// Which [`TextProjector`] a host has chosen.
#[derive(
  Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "kebab-case")]
pub enum ProjectorKind {
  /// [`DomProjector`].
  #[default]
  Dom,
  /// [`TagStripProjector`].
  TagStrip,
}

impl ProjectorKind {
  /// Get the projector for this kind.
  #[must_use]
  pub fn projector(self) -> &'static dyn TextProjector {
    match self {
      Self::Dom => &DomProjector,
      Self::TagStrip => &TagStripProjector,
    }
  }

  /// Name used in configuration files and on the command line.
  #[must_use]
  pub const fn as_str(self) -> &'static str {
    match self {
      Self::Dom => "dom",
      Self::TagStrip => "tag-strip",
    }
  }
}

impl fmt::Display for ProjectorKind {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

impl FromStr for ProjectorKind {
  type Err = ViewError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s.trim().to_lowercase().as_str() {
      "dom" => Ok(Self::Dom),
      "tag-strip" | "tagstrip" | "strip" => Ok(Self::TagStrip),
      other => {
        Err(ViewError::InvalidOption(format!(
          "unknown projector '{other}', expected 'dom' or 'tag-strip'"
        )))
      },
    }
  }
}
