use std::{
  fs,
  path::{Path, PathBuf},
  sync::OnceLock,
};

use mdview_markdown::{ProjectorKind, ViewOptions};
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Configuration for the mdview renderer.
///
/// [`Config`] holds the host-side choices the renderer itself leaves open:
/// whether to emit plain text, which plain-text projector to use, and where
/// the output goes. Fields are typically loaded from a TOML or JSON config
/// file, but can also be set via CLI arguments.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
  /// Render plain text instead of an HTML fragment.
  pub plain_text: bool,

  /// Projector used for plain text: `dom` or `tag-strip`.
  pub projector: ProjectorKind,

  /// Output file. Standard output when unset.
  pub output: Option<PathBuf>,
}

impl Config {
  /// Load configuration from a file (TOML or JSON).
  ///
  /// # Arguments
  ///
  /// * `path` - Path to the configuration file.
  ///
  /// # Errors
  ///
  /// Returns [`ConfigError::Io`] if the file cannot be read, a parse error
  /// for malformed contents, and [`ConfigError::Config`] if the format is
  /// unsupported.
  pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
    let path = path.as_ref();
    let content = fs::read_to_string(path)?;

    match path.extension().and_then(|ext| ext.to_str()) {
      Some(ext) => {
        match ext.to_lowercase().as_str() {
          "json" => serde_json::from_str(&content).map_err(ConfigError::from),
          "toml" => toml::from_str(&content).map_err(ConfigError::from),
          _ => {
            Err(ConfigError::Config(format!(
              "Unsupported config file format: {}",
              path.display()
            )))
          },
        }
      },
      None => {
        Err(ConfigError::Config(format!(
          "Config file has no extension: {}",
          path.display()
        )))
      },
    }
  }

  /// Load configuration from files and `KEY=VALUE` overrides.
  ///
  /// Explicit config files are merged in order, later ones taking precedence.
  /// Without any, a config file in a standard location is used if one exists.
  /// Overrides are applied last.
  ///
  /// # Errors
  ///
  /// Returns an error if a config file cannot be loaded or an override is
  /// invalid.
  pub fn load(
    config_files: &[PathBuf],
    config_overrides: &[String],
  ) -> Result<Self, ConfigError> {
    let mut config = if let Some((first, rest)) = config_files.split_first() {
      let mut merged_config = Self::from_file(first)?;

      for config_path in rest {
        merged_config.merge(Self::from_file(config_path)?);
      }

      if config_files.len() > 1 {
        log::info!("Loaded and merged {} config files", config_files.len());
      }

      merged_config
    } else if let Some(discovered_config) = Self::find_config_file() {
      log::info!(
        "Using discovered config file: {}",
        discovered_config.display()
      );
      Self::from_file(&discovered_config)?
    } else {
      Self::default()
    };

    if !config_overrides.is_empty() {
      config.apply_overrides(config_overrides)?;
    }

    Ok(config)
  }

  /// Merge another config into this one, with the other config's values taking
  /// precedence.
  ///
  /// # Merge Rules
  ///
  /// - [`Option<T>`] fields: Other's [`Some`] value replaces this config's
  ///   value
  /// - Plain fields (bool, enums): Other's value always replaces
  pub fn merge(&mut self, other: Self) {
    self.plain_text = other.plain_text;
    self.projector = other.projector;
    if other.output.is_some() {
      self.output = other.output;
    }
  }

  /// Apply configuration overrides from KEY=VALUE strings.
  ///
  /// # Errors
  ///
  /// Returns an error if:
  ///
  /// - An override string is not in KEY=VALUE format
  /// - A key is not recognized
  /// - A value cannot be parsed as the expected type
  ///
  /// # Example
  ///
  /// ```rust
  /// use mdview_config::Config;
  ///
  /// let mut config = Config::default();
  /// config
  ///   .apply_overrides(&[
  ///     "plain_text=true".to_string(),
  ///     "projector=tag-strip".to_string(),
  ///   ])
  ///   .unwrap();
  /// assert!(config.plain_text);
  /// ```
  pub fn apply_overrides(
    &mut self,
    overrides: &[String],
  ) -> Result<(), ConfigError> {
    for override_str in overrides {
      let (key, value) = override_str.split_once('=').ok_or_else(|| {
        ConfigError::Config(format!(
          "Invalid config override format: '{override_str}'. Expected \
           KEY=VALUE"
        ))
      })?;

      self.apply_override(key.trim(), value.trim())?;
    }

    Ok(())
  }

  fn apply_override(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
    match key {
      "plain_text" => {
        self.plain_text = value.parse().map_err(|_| {
          ConfigError::Config(format!(
            "Invalid boolean value for '{key}': '{value}'"
          ))
        })?;
      },
      "projector" => {
        self.projector = value
          .parse()
          .map_err(|e| ConfigError::Config(format!("{key}: {e}")))?;
      },
      "output" => {
        self.output = (!value.is_empty()).then(|| PathBuf::from(value));
      },
      _ => {
        return Err(ConfigError::Config(format!(
          "Unknown configuration key: '{key}'"
        )));
      },
    }

    log::debug!("Applied config override {key}={value}");
    Ok(())
  }

  /// Search for config files in common locations
  #[must_use]
  pub fn find_config_file() -> Option<PathBuf> {
    static RESULT: OnceLock<Option<PathBuf>> = OnceLock::new();
    RESULT
      .get_or_init(|| {
        let config_filenames = [
          "mdview.toml",
          "mdview.json",
          ".mdview.toml",
          ".mdview.json",
          ".config/mdview.toml",
          ".config/mdview.json",
        ];

        let current_dir = std::env::current_dir().ok()?;
        for filename in &config_filenames {
          let config_path = current_dir.join(filename);
          if config_path.exists() {
            return Some(config_path);
          }
        }

        let config_home = std::env::var("XDG_CONFIG_HOME")
          .map(PathBuf::from)
          .or_else(|_| {
            std::env::var("HOME")
              .map(|home| PathBuf::from(home).join(".config"))
          })
          .ok()?;

        ["config.toml", "config.json"]
          .iter()
          .map(|filename| config_home.join("mdview").join(filename))
          .find(|path| path.exists())
      })
      .clone()
  }

  /// Options for the renderer.
  #[must_use]
  pub const fn view_options(&self) -> ViewOptions {
    ViewOptions {
      as_plain_text: self.plain_text,
      projector:     self.projector,
    }
  }
}

#[cfg(test)]
mod tests {
  #![allow(
    clippy::unwrap_used,
    clippy::field_reassign_with_default,
    reason = "Fine in tests"
  )]

  use super::*;

  fn write(dir: &Path, name: &str, content: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, content).unwrap();
    path
  }

  #[test]
  fn test_from_file_toml() {
    let dir = tempfile::tempdir().unwrap();
    let path = write(
      dir.path(),
      "mdview.toml",
      "plain_text = true\nprojector = \"tag-strip\"\noutput = \"out.txt\"\n",
    );

    let config = Config::from_file(&path).unwrap();
    assert!(config.plain_text);
    assert_eq!(config.projector, ProjectorKind::TagStrip);
    assert_eq!(config.output, Some(PathBuf::from("out.txt")));
  }

  #[test]
  fn test_from_file_json() {
    let dir = tempfile::tempdir().unwrap();
    let path = write(dir.path(), "mdview.json", r#"{"projector": "dom"}"#);

    let config = Config::from_file(&path).unwrap();
    assert!(!config.plain_text);
    assert_eq!(config.projector, ProjectorKind::Dom);
    assert_eq!(config.output, None);
  }

  #[test]
  fn test_from_file_unsupported_extension() {
    let dir = tempfile::tempdir().unwrap();
    let path = write(dir.path(), "mdview.yaml", "plain_text: true");
    let err = Config::from_file(&path).unwrap_err();
    assert!(err.to_string().contains("Unsupported config file format"));
  }

  #[test]
  fn test_from_file_no_extension() {
    let dir = tempfile::tempdir().unwrap();
    let path = write(dir.path(), "mdview", "plain_text = true");
    let err = Config::from_file(&path).unwrap_err();
    assert!(err.to_string().contains("has no extension"));
  }

  #[test]
  fn test_from_file_invalid_projector() {
    let dir = tempfile::tempdir().unwrap();
    let path = write(dir.path(), "mdview.toml", "projector = \"browser\"\n");
    assert!(matches!(Config::from_file(&path), Err(ConfigError::Toml(_))));

    let path = write(dir.path(), "mdview.json", r#"{"projector": 1}"#);
    assert!(matches!(Config::from_file(&path), Err(ConfigError::Serde(_))));
  }

  #[test]
  fn test_from_file_missing() {
    let err = Config::from_file("/nonexistent/mdview.toml").unwrap_err();
    assert!(matches!(err, ConfigError::Io(_)));
  }

  #[test]
  fn test_load_merges_in_order() {
    let dir = tempfile::tempdir().unwrap();
    let first = write(
      dir.path(),
      "a.toml",
      "plain_text = true\noutput = \"first.txt\"\n",
    );
    let second = write(
      dir.path(),
      "b.json",
      r#"{"plain_text": true, "projector": "tag-strip"}"#,
    );

    let config = Config::load(&[first, second], &[]).unwrap();
    assert!(config.plain_text);
    assert_eq!(config.projector, ProjectorKind::TagStrip);
    // The second file has no output, so the first one's survives
    assert_eq!(config.output, Some(PathBuf::from("first.txt")));
  }

  #[test]
  fn test_load_applies_overrides_last() {
    let dir = tempfile::tempdir().unwrap();
    let path = write(dir.path(), "a.toml", "plain_text = true\n");

    let config =
      Config::load(&[path], &["plain_text=false".to_string()]).unwrap();
    assert!(!config.plain_text);
  }

  #[test]
  fn test_merge_option_fields() {
    let mut base = Config::default();
    base.output = Some(PathBuf::from("base.html"));

    base.merge(Config::default());
    assert_eq!(base.output, Some(PathBuf::from("base.html")));

    let mut other = Config::default();
    other.output = Some(PathBuf::from("other.html"));
    base.merge(other);
    assert_eq!(base.output, Some(PathBuf::from("other.html")));
  }

  #[test]
  fn test_merge_plain_fields() {
    let mut base = Config::default();
    let mut other = Config::default();
    other.plain_text = true;
    other.projector = ProjectorKind::TagStrip;

    base.merge(other);
    assert!(base.plain_text);
    assert_eq!(base.projector, ProjectorKind::TagStrip);
  }

  #[test]
  fn test_apply_overrides() {
    let mut config = Config::default();
    config
      .apply_overrides(&[
        "plain_text = true".to_string(),
        "projector=tag-strip".to_string(),
        "output=letter.html".to_string(),
      ])
      .unwrap();

    assert!(config.plain_text);
    assert_eq!(config.projector, ProjectorKind::TagStrip);
    assert_eq!(config.output, Some(PathBuf::from("letter.html")));
  }

  #[test]
  fn test_apply_override_empty_output_clears() {
    let mut config = Config::default();
    config.output = Some(PathBuf::from("x"));
    config.apply_overrides(&["output=".to_string()]).unwrap();
    assert_eq!(config.output, None);
  }

  #[test]
  fn test_apply_overrides_invalid_format() {
    let mut config = Config::default();
    let err = config.apply_overrides(&["plain_text".to_string()]).unwrap_err();
    assert!(err.to_string().contains("Expected KEY=VALUE"));
  }

  #[test]
  fn test_apply_overrides_unknown_key() {
    let mut config = Config::default();
    let err = config.apply_overrides(&["colour=red".to_string()]).unwrap_err();
    assert!(err.to_string().contains("Unknown configuration key"));
  }

  #[test]
  fn test_apply_overrides_invalid_boolean() {
    let mut config = Config::default();
    assert!(config.apply_overrides(&["plain_text=maybe".to_string()]).is_err());
  }

  #[test]
  fn test_apply_overrides_invalid_projector() {
    let mut config = Config::default();
    let err = config
      .apply_overrides(&["projector=browser".to_string()])
      .unwrap_err();
    assert!(err.to_string().contains("unknown projector"));
  }

  #[test]
  fn test_view_options() {
    let config = Config {
      plain_text: true,
      projector:  ProjectorKind::TagStrip,
      output:     None,
    };
    assert_eq!(config.view_options(), ViewOptions {
      as_plain_text: true,
      projector:     ProjectorKind::TagStrip,
    });
  }
}
