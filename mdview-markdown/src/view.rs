//! The `MarkdownView` component.
//!
//! A [`MarkdownView`] renders documents according to its [`ViewOptions`] and,
//! when mounted onto a [`Surface`], intercepts clicks on links so the host can
//! route them itself instead of navigating.
use std::{fmt, fs, path::Path, sync::Arc};

use kuchikikiki::NodeRef;
use log::{debug, error};
use markup5ever::local_name;
use tendril::TendrilSink;

use crate::{
  block::{BlockKind, parse_blocks},
  error::ViewResult,
  escape::escape_html,
  types::{OutputFormat, RenderOutput, ViewOptions},
};

/// Callback receiving the `href` of a clicked link.
pub type LinkHandler = Arc<dyn Fn(&str) + Send + Sync>;

/// Markdown renderer with optional link-click interception.
///
/// Cheap to clone; the link handler is shared.
#[derive(Clone, Default)]
pub struct MarkdownView {
  options:       ViewOptions,
  on_link_click: Option<LinkHandler>,
}

impl fmt::Debug for MarkdownView {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("MarkdownView")
      .field("options", &self.options)
      .field("on_link_click", &self.on_link_click.is_some())
      .finish()
  }
}

impl MarkdownView {
  /// Create a new view with the given options.
  #[must_use]
  pub const fn new(options: ViewOptions) -> Self {
    Self {
      options,
      on_link_click: None,
    }
  }

  /// Install a link-click callback. Surfaces mounted afterwards suppress
  /// default navigation for links and report the `href` here instead.
  #[must_use]
  pub fn with_link_handler<F>(mut self, handler: F) -> Self
  where
    F: Fn(&str) + Send + Sync + 'static,
  {
    self.on_link_click = Some(Arc::new(handler));
    self
  }

  /// Access view options.
  #[must_use]
  pub const fn options(&self) -> &ViewOptions {
    &self.options
  }

  /// Render `source` to an HTML fragment, or to plain text if the view was
  /// configured with `as_plain_text`.
  #[must_use]
  pub fn render(&self, source: &str) -> RenderOutput {
    let blocks = parse_blocks(source);
    let projector = self.options.projector.projector();

    let title = blocks
      .iter()
      .find(|block| matches!(block.kind, BlockKind::Heading(_)))
      .map(|block| projector.project_html(&block.html).trim().to_owned())
      .filter(|title| !title.is_empty());

    let html = blocks
      .iter()
      .map(|block| block.html.as_str())
      .collect::<Vec<_>>()
      .join("\n");

    let (content, format) = if self.options.as_plain_text {
      (projector.project_html(&html), OutputFormat::PlainText)
    } else {
      (html, OutputFormat::Html)
    };

    debug!(
      "Rendered {} blocks to {} bytes of {format:?}",
      blocks.len(),
      content.len()
    );

    RenderOutput {
      content,
      format,
      title,
    }
  }

  /// Read and render a Markdown file.
  ///
  /// # Errors
  ///
  /// Returns an error if the file cannot be read as UTF-8 text.
  pub fn render_file<P: AsRef<Path>>(&self, path: P) -> ViewResult<RenderOutput> {
    let path = path.as_ref();
    debug!("Rendering {}", path.display());
    let content = fs::read_to_string(path)?;
    Ok(self.render(&content))
  }

  /// Render `source` and attach the result to a fresh display surface.
  ///
  /// Plain-text output is placed in a `<pre>` container so whitespace
  /// survives.
  #[must_use]
  pub fn mount(&self, source: &str) -> Surface {
    let output = self.render(source);
    let markup = match output.format {
      OutputFormat::Html => output.content.clone(),
      OutputFormat::PlainText => {
        format!("<pre>{}</pre>", escape_html(&output.content))
      },
    };

    Surface {
      document: kuchikikiki::parse_html().one(markup.as_str()),
      output,
      on_link_click: self.on_link_click.clone(),
    }
  }
}

/// What happened to a click delivered to a [`Surface`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClickOutcome {
  /// Not intercepted; the host should apply its default behavior.
  Default,
  /// Default navigation was suppressed and the link handler was called.
  Intercepted { href: String },
}

/// A rendered document attached to a DOM.
pub struct Surface {
  document:      NodeRef,
  output:        RenderOutput,
  on_link_click: Option<LinkHandler>,
}

impl fmt::Debug for Surface {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("Surface")
      .field("output", &self.output)
      .field("on_link_click", &self.on_link_click.is_some())
      .finish_non_exhaustive()
  }
}

impl Surface {
  /// The render result this surface displays.
  #[must_use]
  pub const fn output(&self) -> &RenderOutput {
    &self.output
  }

  /// Root of the surface's DOM.
  #[must_use]
  pub const fn document(&self) -> &NodeRef {
    &self.document
  }

  /// Visible text of the surface.
  #[must_use]
  pub fn text(&self) -> String {
    self.document.text_contents()
  }

  /// Every anchor element on the surface, in document order.
  #[must_use]
  pub fn anchors(&self) -> Vec<NodeRef> {
    self
      .document
      .select("a")
      .map(|matches| matches.map(|el| el.as_node().clone()).collect())
      .unwrap_or_default()
  }

  /// Deliver a click on `target`.
  ///
  /// Clicks that land on an anchor, or on anything inside one, are
  /// intercepted when a link handler is installed; the handler receives the
  /// anchor's `href`, or an empty string if it has none.
  pub fn click(&self, target: &NodeRef) -> ClickOutcome {
    let Some(handler) = &self.on_link_click else {
      return ClickOutcome::Default;
    };

    let Some(anchor) = target.inclusive_ancestors().find(|node| {
      node
        .as_element()
        .is_some_and(|element| element.name.local == local_name!("a"))
    }) else {
      return ClickOutcome::Default;
    };

    let href = anchor
      .as_element()
      .and_then(|element| {
        element
          .attributes
          .borrow()
          .get(local_name!("href"))
          .map(ToOwned::to_owned)
      })
      .unwrap_or_default();

    debug!("Intercepted link click: {href}");
    handler(&href);
    ClickOutcome::Intercepted { href }
  }
}

/// Render `source` with a one-off view built from `options`.
#[must_use]
pub fn render(source: &str, options: &ViewOptions) -> RenderOutput {
  MarkdownView::new(*options).render(source)
}

/// Render with panic recovery.
///
/// Rendering is total, so this only matters if a bug slips through; in that
/// case the failure is logged and the escaped source is returned verbatim.
///
/// Recovery needs unwinding. Under `panic = "abort"`, as in the workspace
/// release profile, a panic still terminates the process.
#[must_use]
pub fn render_with_recovery(view: &MarkdownView, source: &str) -> RenderOutput {
  match std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
    view.render(source)
  })) {
    Ok(result) => result,
    Err(panic_err) => {
      error!("Panic during markdown rendering: {panic_err:?}");
      let (content, format) = if view.options().as_plain_text {
        (source.to_owned(), OutputFormat::PlainText)
      } else {
        (
          format!("<pre><code>{}</code></pre>", escape_html(source)),
          OutputFormat::Html,
        )
      };
      RenderOutput {
        content,
        format,
        title: None,
      }
    },
  }
}
