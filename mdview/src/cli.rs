use std::path::PathBuf;

use clap::Parser;
use mdview_config::{Config, ConfigError};

/// Command line interface for mdview
#[derive(Parser, Debug)]
#[command(
  author,
  version,
  about = "mdview: render letter Markdown to HTML or plain text"
)]
pub struct Cli {
  /// Markdown file to render. Reads standard input when omitted or `-`.
  pub input: Option<PathBuf>,

  /// Enable verbose debug logging
  #[arg(short, long)]
  pub verbose: bool,

  /// Path to configuration file(s) (TOML or JSON, can be specified multiple
  /// times). Multiple files are merged in order, with later files overriding
  /// earlier ones
  #[arg(short = 'c', long = "config-file", action = clap::ArgAction::Append)]
  pub config_files: Vec<PathBuf>,

  /// Override configuration values (KEY=VALUE format, can be used multiple
  /// times)
  #[arg(long = "config", action = clap::ArgAction::Append)]
  pub config_overrides: Vec<String>,

  /// Emit plain text instead of an HTML fragment.
  #[arg(short, long)]
  pub plain: bool,

  /// Projector used for plain text.
  #[arg(long, value_parser = ["dom", "tag-strip"])]
  pub projector: Option<String>,

  /// Write output to this file instead of standard output.
  #[arg(short, long)]
  pub output: Option<PathBuf>,
}

impl Cli {
  /// Parse command line arguments into a [`Cli`] struct.
  #[must_use]
  pub fn parse_args() -> Self {
    Self::parse()
  }

  /// Apply command line flags on top of a loaded configuration. Flags win
  /// over config files and `--config` overrides.
  ///
  /// # Errors
  ///
  /// Returns an error if the projector name is not recognised.
  pub fn merge_into(&self, config: &mut Config) -> Result<(), ConfigError> {
    if self.plain {
      config.plain_text = true;
    }

    if let Some(projector) = &self.projector {
      config.projector = projector
        .parse()
        .map_err(|e| ConfigError::Config(format!("--projector: {e}")))?;
    }

    if let Some(output) = &self.output {
      config.output = Some(output.clone());
    }

    Ok(())
  }
}
