//! Error Types
//!
//! This module defines the error types used throughout the viewer.
//!
//! # Overview
//!
//! Errors are split by subsystem and folded into the umbrella [`Error`]:
//!
//! - [`AssetError`]: model fetch and decode failures (terminal for a load attempt)
//! - [`AnimationError`]: playback contract violations
//!
//! # Usage
//!
//! All public APIs return [`Result<T>`] which is an alias for `std::result::Result<T, Error>`.
//!
//! ```rust,ignore
//! use fawn_core::errors::{AnimationError, Result};
//!
//! fn activate(len: usize, index: usize) -> Result<()> {
//!     if index >= len {
//!         return Err(AnimationError::IndexOutOfRange { index, len }.into());
//!     }
//!     Ok(())
//! }
//! ```

use thiserror::Error;

/// The main error type for the viewer.
#[derive(Error, Debug)]
pub enum Error {
    /// The model could not be fetched or decoded.
    #[error(transparent)]
    Asset(#[from] AssetError),

    /// An animation call broke the controller contract.
    #[error(transparent)]
    Animation(#[from] AnimationError),

    /// File I/O error outside of asset loading (e.g. settings files).
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON parsing error (settings files).
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    /// Windowing / event loop error reported by the host platform.
    #[error("Platform error: {0}")]
    Platform(String),
}

/// Failures of a single model load attempt.
///
/// Every variant is terminal: the viewer stays not-ready and no retry happens.
#[derive(Error, Debug)]
pub enum AssetError {
    /// The requested asset does not exist in the backing store.
    #[error("Asset not found: {0}")]
    NotFound(String),

    /// Reading the asset bytes failed.
    #[error("Failed to read asset '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// The bytes were read but could not be decoded.
    #[error("Invalid asset data: {0}")]
    Format(String),

    /// No decoder is registered (or compiled in) for this file type.
    #[error("Unsupported asset format: {0}")]
    UnsupportedFormat(String),

    /// The load was cancelled before it reached a terminal state.
    #[error("Asset load cancelled: {0}")]
    Cancelled(String),

    /// The background task driving the load died.
    #[error("Task join error: {0}")]
    TaskJoin(String),
}

/// Violations of the animation controller contract.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AnimationError {
    /// `play` or `update` arrived before the clip table was built.
    #[error("Animation controller is not ready: clips have not been built yet")]
    NotReady,

    /// Activation requested for an index outside the built clip table.
    #[error("Animation index {index} out of range (clip count: {len})")]
    IndexOutOfRange { index: usize, len: usize },

    /// Time deltas must be finite and non-negative.
    #[error("Invalid time delta: {0}")]
    InvalidDelta(f32),

    /// The clip table can only be built once per controller.
    #[error("Animation controller has already been built")]
    AlreadyBuilt,

    /// No clip with this name exists in the built table.
    #[error("Unknown animation clip: {0}")]
    UnknownClip(String),

    /// A trigger was pressed by a name no control in the binding carries.
    #[error("Unknown trigger control: {0}")]
    UnknownControl(String),
}

/// Alias for `Result<T, Error>`.
pub type Result<T> = std::result::Result<T, Error>;
