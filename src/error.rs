//! Error types for loading, validating and exporting scores.
//!
//! Layout, beaming, slurs and scheduling never fail; errors only come from
//! the document boundary (files, JSON, archives) and from note mutators that
//! reject invalid user input.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ScoreError {
    /// Reading or writing a project file failed.
    #[error("Failed to access '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// The project document is not valid JSON or has the wrong shape.
    #[error("Invalid project JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// A zipped project bundle could not be opened or has no document.
    #[error("Invalid project archive: {0}")]
    Archive(String),

    /// Project bytes are not UTF-8.
    #[error("Project document is not valid UTF-8: {0}")]
    Utf8(#[from] std::str::Utf8Error),

    /// A note in the document cannot be represented.
    ///
    /// ```
    /// # use cipherscore::ScoreError;
    /// let err = ScoreError::InvalidNote {
    ///     track: 1,
    ///     index: 4,
    ///     message: "pitch 9 is not a scale degree".to_string(),
    /// };
    /// assert_eq!(err.to_string(), "Invalid note 4 in track 1: pitch 9 is not a scale degree");
    /// ```
    #[error("Invalid note {index} in track {track}: {message}")]
    InvalidNote {
        track: usize,
        index: usize,
        message: String,
    },

    /// Grace note input must be a single digit 1–7.
    #[error("Grace note must be a single digit 1-7, got '{0}'")]
    InvalidGraceNote(String),
}

impl From<zip::result::ZipError> for ScoreError {
    fn from(e: zip::result::ZipError) -> Self {
        ScoreError::Archive(e.to_string())
    }
}
