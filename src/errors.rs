/*!
 * Error types for the subcondense library.
 *
 * This module contains custom error types for different parts of the library,
 * using the thiserror crate for ergonomic error definitions.
 */

use thiserror::Error;

/// Errors that can occur while parsing subtitles or deriving periods from them
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SubtitleError {
    /// A single timestamp does not match the shape of its dialect
    #[error("Invalid {format} timestamp: '{value}'")]
    Format {
        /// Name of the dialect the timestamp was parsed as
        format: String,
        /// The offending timestamp text
        value: String,
    },

    /// The whole file produced no usable entries
    #[error("Failed to parse subtitles: {0}")]
    Parse(String),

    /// Filtering and merging left nothing to work with
    #[error("Validation failed: {0}")]
    Validation(String),
}

/// Errors raised at the boundary with the audio transcoder
#[derive(Error, Debug)]
pub enum AudioError {
    /// The media could not be decoded
    #[error("Failed to decode audio: {0}")]
    Decode(String),

    /// The decoded audio could not be encoded
    #[error("Failed to encode audio: {0}")]
    Encode(String),

    /// The external transcoder process could not be run
    #[error("Transcoder process error: {0}")]
    Process(String),
}

/// Main application error type that wraps all other errors
#[derive(Error, Debug)]
pub enum AppError {
    /// Error from a file operation
    #[error("File error: {0}")]
    File(String),

    /// Error from subtitle processing
    #[error("Subtitle error: {0}")]
    Subtitle(#[from] SubtitleError),

    /// Error from the audio transcoder
    #[error("Audio error: {0}")]
    Audio(#[from] AudioError),

    /// Any other error
    #[error("Unknown error: {0}")]
    Unknown(String),
}

impl From<anyhow::Error> for AppError {
    fn from(error: anyhow::Error) -> Self {
        Self::Unknown(error.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(error: std::io::Error) -> Self {
        Self::File(error.to_string())
    }
}
