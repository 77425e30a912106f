//! Error Types
//!
//! This module defines the error type used throughout the engine.
//!
//! All public APIs return [`Result<T>`], an alias for
//! `std::result::Result<T, Error>`. The variants follow the engine's error
//! taxonomy: caller mistakes surface as [`Error::BadArgument`], structural
//! problems in binary streams as [`Error::InvalidFormat`], missing assets as
//! [`Error::NotFound`], and backend rejections as
//! [`Error::ResourceCreation`].

use thiserror::Error;

/// The main error type for the engine.
#[derive(Error, Debug)]
pub enum Error {
    // ========================================================================
    // Caller errors
    // ========================================================================
    /// A caller passed an invalid or foreign resource (e.g. a mesh whose
    /// material was produced by a different renderer).
    #[error("bad argument: {0}")]
    BadArgument(String),

    // ========================================================================
    // Asset & I/O errors
    // ========================================================================
    /// A binary stream failed a structural check (wrong magic, wrong
    /// version, missing required chunk).
    #[error("invalid format: {0}")]
    InvalidFormat(String),

    /// A requested asset is absent.
    #[error("not found: {0}")]
    NotFound(String),

    /// A stream read/write/seek failed at the OS level.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    // ========================================================================
    // Backend errors
    // ========================================================================
    /// The graphics backend rejected a shader, pipeline, buffer, or texture.
    #[error("resource creation failed: {0}")]
    ResourceCreation(String),

    // ========================================================================
    // Descriptor errors
    // ========================================================================
    /// An XML or text value could not be parsed into the expected type.
    #[error("parse error: {0}")]
    Parse(String),
}

impl Error {
    /// True for the error kinds that asset-cache loaders absorb into an
    /// absence instead of propagating.
    #[must_use]
    pub fn is_absence(&self) -> bool {
        matches!(
            self,
            Error::NotFound(_) | Error::InvalidFormat(_) | Error::Io(_)
        )
    }
}

/// Alias for `Result<T, Error>`.
pub type Result<T> = std::result::Result<T, Error>;
