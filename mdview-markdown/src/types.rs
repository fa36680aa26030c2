//! Types for the mdview-markdown public API.
use serde::{Deserialize, Serialize};

use crate::projector::ProjectorKind;

/// Options for configuring a [`MarkdownView`](crate::MarkdownView).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewOptions {
  /// Render plain text instead of an HTML fragment.
  pub as_plain_text: bool,

  /// Projector used for plain-text output and title extraction.
  pub projector: ProjectorKind,
}

/// What kind of content a [`RenderOutput`] carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OutputFormat {
  /// Trusted HTML fragment built from the renderer's fixed tag vocabulary.
  Html,
  /// Markup-free text, meant for a whitespace-preserving container.
  PlainText,
}

/// Result of rendering one document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderOutput {
  /// Rendered HTML fragment or plain text, according to `format`.
  pub content: String,

  /// Format of `content`.
  pub format: OutputFormat,

  /// Text of the first heading in the document, if there is one.
  pub title: Option<String>,
}
