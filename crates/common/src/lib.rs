//! SlideKit Common Utilities
//!
//! Shared infrastructure for all SlideKit crates:
//! - Error types and result aliases
//! - Repaint pacing (debounce) for the live preview
//! - Tracing/logging initialization
//! - Configuration loading

pub mod clock;
pub mod config;
pub mod error;
pub mod logging;

pub use clock::*;
pub use config::*;
pub use error::*;
