//! # mdview-markdown - Markdown rendering for letter and message bodies
//!
//! A deliberately small Markdown dialect rendered to a trusted HTML fragment,
//! with a plain-text projection for copy-safe display and a link-click
//! interception boundary for hosts that attach the fragment to a DOM.
//!
//! ## Quick Start
//!
//! ```rust
//! use mdview_markdown::{MarkdownView, ViewOptions};
//!
//! let view = MarkdownView::new(ViewOptions::default());
//! let result = view.render("# Hello World\n\nThis is **bold** text.");
//!
//! assert!(result.content.contains("<h1>Hello World</h1>"));
//! assert_eq!(result.title.as_deref(), Some("Hello World"));
//! ```
//!
//! ## Pipeline
//!
//! 1. [`escape`] turns raw text into an entity-safe string.
//! 2. [`inline`] rewrites links, bold, italic and code spans in escaped text.
//! 3. [`block`] walks the document line by line and emits block elements.
//! 4. [`projector`] optionally strips the fragment back down to text.
//!
//! Every stage is total: any input, including the empty string, produces some
//! output and nothing returns an error.
//!
//! ## Plain text
//!
//! ```rust
//! use mdview_markdown::{MarkdownView, ProjectorKind, ViewOptions};
//!
//! let view = MarkdownView::new(ViewOptions {
//!   as_plain_text: true,
//!   projector:     ProjectorKind::TagStrip,
//! });
//! let result = view.render("**bold** and *italic*");
//! assert_eq!(result.content, "bold and italic");
//! ```

pub mod block;
mod error;
pub mod escape;
pub mod inline;
pub mod projector;
mod types;
pub mod utils;
pub mod view;

pub use crate::{
  block::{Block, BlockKind, LineKind, classify_line, parse_blocks, render_html},
  error::{ViewError, ViewResult},
  escape::escape_html,
  inline::{INLINE_PASSES, InlinePass, format_inline},
  projector::{DomProjector, ProjectorKind, TagStripProjector, TextProjector},
  types::{OutputFormat, RenderOutput, ViewOptions},
  view::{
    ClickOutcome,
    LinkHandler,
    MarkdownView,
    Surface,
    render,
    render_with_recovery,
  },
};
