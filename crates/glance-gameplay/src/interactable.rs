//! The interactable capability.
//!
//! World objects opt in by implementing [`Interactable`] and exposing it via
//! [`crate::scene::Actor::as_interactable`]. The interaction component only
//! ever talks to targets through this trait.

use glance_common::EntityId;

use crate::keyring::Keyring;
use crate::query::QueryResult;

/// The actor performing an interaction, as seen by the target.
#[derive(Debug, Clone, Copy)]
pub struct Interactor<'a> {
    /// Interacting actor
    pub id: EntityId,
    /// Display name of the interacting actor
    pub name: &'a str,
    /// Keys the interactor owns. `None` owns nothing.
    pub keyring: Option<&'a Keyring>,
    /// Simulated time of the call in seconds
    pub time: f64,
}

impl<'a> Interactor<'a> {
    /// Creates an interactor without a keyring.
    #[must_use]
    pub fn new(id: EntityId, name: &'a str) -> Self {
        Self {
            id,
            name,
            keyring: None,
            time: 0.0,
        }
    }

    /// Attaches a keyring.
    #[must_use]
    pub fn with_keyring(mut self, keyring: &'a Keyring) -> Self {
        self.keyring = Some(keyring);
        self
    }

    /// Sets the call time.
    #[must_use]
    pub fn at(mut self, time: f64) -> Self {
        self.time = time;
        self
    }
}

/// Advisory result of an interaction attempt.
///
/// Interactions are always attempted; this only tells presentation which
/// hook ran.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InteractionOutcome {
    /// Every requirement was met
    Available,
    /// Requirements were unmet, with their messages in authoring order
    Unavailable(Vec<String>),
    /// The target had nothing to execute (no data or no valid state)
    Ignored,
}

impl InteractionOutcome {
    /// True if the "available" path ran.
    #[must_use]
    pub fn is_available(&self) -> bool {
        matches!(self, Self::Available)
    }
}

/// Capability exposed by interactable world objects.
pub trait Interactable {
    /// Presentation data for the current state.
    fn query(&self, interactor: &Interactor<'_>) -> QueryResult;

    /// Attempts the interaction.
    fn interact(&mut self, interactor: &Interactor<'_>) -> InteractionOutcome;

    /// Called when the target gains focus. Cosmetic only.
    fn on_focus_start(&mut self, _interactor: &Interactor<'_>) {}

    /// Called when the target loses focus. Cosmetic only.
    fn on_focus_end(&mut self, _interactor: &Interactor<'_>) {}
}
