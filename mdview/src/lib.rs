//! Expose mdview's command line plumbing for use in tests. The renderer itself
//! lives in `mdview-markdown`; prefer that crate when embedding.
use std::{
  fs,
  io::{self, Read, Write},
  path::Path,
};

use color_eyre::eyre::{Context, Result};
use log::info;
use mdview_config::Config;
use mdview_markdown::{MarkdownView, render_with_recovery};

pub mod cli;

use cli::Cli;

/// Load configuration, render the requested input and write the result.
///
/// # Errors
///
/// Returns an error if configuration is invalid or the input or output file
/// cannot be accessed.
pub fn run(cli: &Cli) -> Result<()> {
  let mut config = Config::load(&cli.config_files, &cli.config_overrides)
    .wrap_err("Failed to load configuration")?;
  cli
    .merge_into(&mut config)
    .wrap_err("Invalid command line options")?;

  let source = read_input(cli.input.as_deref())?;
  let view = MarkdownView::new(config.view_options());
  let output = render_with_recovery(&view, &source);

  if let Some(title) = &output.title {
    info!("Rendered \"{title}\" as {:?}", output.format);
  }

  write_output(config.output.as_deref(), &output.content)
}

/// Read the document from `path`, or from standard input when `path` is
/// `None` or `-`.
///
/// # Errors
///
/// Returns an error if the input cannot be read as UTF-8 text.
pub fn read_input(path: Option<&Path>) -> Result<String> {
  match path {
    Some(path) if path != Path::new("-") => {
      fs::read_to_string(path)
        .wrap_err_with(|| format!("Failed to read input: {}", path.display()))
    },
    _ => {
      let mut source = String::new();
      io::stdin()
        .read_to_string(&mut source)
        .wrap_err("Failed to read standard input")?;
      Ok(source)
    },
  }
}

/// Write `content` to `path`, or to standard output when `path` is `None`.
///
/// # Errors
///
/// Returns an error if the output cannot be written.
pub fn write_output(path: Option<&Path>, content: &str) -> Result<()> {
  let mut content = content.to_owned();
  if !content.ends_with('\n') {
    content.push('\n');
  }

  if let Some(path) = path {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
      fs::create_dir_all(parent).wrap_err_with(|| {
        format!("Failed to create directory: {}", parent.display())
      })?;
    }
    fs::write(path, content)
      .wrap_err_with(|| format!("Failed to write output: {}", path.display()))?;
    info!("Wrote {}", path.display());
  } else {
    io::stdout()
      .lock()
      .write_all(content.as_bytes())
      .wrap_err("Failed to write standard output")?;
  }

  Ok(())
}
