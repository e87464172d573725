//! # Error Types
//!
//! The watch face has almost no user-visible failure surface: a broken
//! companion link or a half-filled weather payload just means a visual element
//! is left out. The errors that do exist are the ones a caller can act on,
//! namely configuration files and malformed companion-link input.

use std::io;
use thiserror::Error;

/// Errors surfaced by configuration loading and companion-link parsing.
#[derive(Error, Debug)]
pub enum FaceError {
    /// Reading or writing the configuration file failed
    #[error("config IO: {0}")]
    Io(#[from] io::Error),

    /// Configuration file is not valid TOML for [`crate::config::Config`]
    #[error("config parse: {0}")]
    ConfigParse(#[from] toml::de::Error),

    /// Configuration could not be serialized back to TOML
    #[error("config serialize: {0}")]
    ConfigSerialize(#[from] toml::ser::Error),

    /// A companion-link line was not a valid host event
    #[error("malformed link message: {0}")]
    Link(#[from] serde_json::Error),
}
