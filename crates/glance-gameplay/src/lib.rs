//! # Glance Gameplay
//!
//! Gameplay systems for Project Glance.
//!
//! This crate provides the look-at interaction layer:
//! - Keyrings and key requirements
//! - Interaction data assets (states, prompts, press/hold input)
//! - Interactable actors with cached state and state transitions
//! - NPCs with speech-bubble dialogue lines
//! - Focus scanning and the press/hold interaction component
//! - Pull-based timers and subscriber events
//! - Asset validation
//! - Debug snapshots for overlays

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(clippy::unwrap_used)]

pub mod actor;
pub mod data_asset;
pub mod debug;
pub mod events;
pub mod interactable;
pub mod interaction;
pub mod keyring;
pub mod npc;
pub mod query;
pub mod requirements;
pub mod scene;
pub mod timers;
pub mod validation;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::actor::*;
    pub use crate::data_asset::*;
    pub use crate::debug::*;
    pub use crate::events::*;
    pub use crate::interactable::*;
    pub use crate::interaction::*;
    pub use crate::keyring::*;
    pub use crate::npc::*;
    pub use crate::query::*;
    pub use crate::requirements::*;
    pub use crate::scene::*;
    pub use crate::timers::*;
    pub use crate::validation::*;
}

pub use prelude::*;
