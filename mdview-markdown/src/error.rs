use std::io;

use thiserror::Error;

/// Error type for the fallible edges of the renderer.
///
/// Rendering itself never fails; these only surface when reading a document
/// from disk or parsing an option value supplied as text.
#[derive(Debug, Error)]
pub enum ViewError {
  #[error("I/O error: {0}")]
  Io(#[from] io::Error),

  #[error("Invalid option value: {0}")]
  InvalidOption(String),
}

/// Result type for view operations.
pub type ViewResult<T> = Result<T, ViewError>;
