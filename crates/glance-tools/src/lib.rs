//! # Glance Tools
//!
//! Development tools for Project Glance.
//!
//! This crate provides:
//! - Interaction debug overlay (text, trace primitives, egui panel)

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(clippy::unwrap_used)]

pub mod interaction_debug;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::interaction_debug::*;
}

pub use prelude::*;
