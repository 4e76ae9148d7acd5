//! Foundational types shared by every Fawn crate.
//!
//! - [`errors`]: the error taxonomy and the crate-wide [`Result`] alias
//! - [`time`]: frame timing ([`FrameClock`]) over a pluggable [`TimeSource`]

pub mod errors;
pub mod time;

pub use errors::{AnimationError, AssetError, Error, Result};
pub use time::{FrameClock, ManualTimeSource, SystemTimeSource, TimeSource};
