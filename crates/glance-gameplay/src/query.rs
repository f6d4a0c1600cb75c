//! Query results: the UI-facing projection of an interactable's state.

use serde::{Deserialize, Serialize};

use crate::data_asset::InputMode;

/// High-level availability of an interaction target.
///
/// An unavailable interaction may still be attempted; this is for presentation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Availability {
    /// All requirements are met
    #[default]
    Available,
    /// At least one requirement is unmet
    Unavailable,
}

/// Result of querying an interactable's current interaction state.
///
/// Recomputed on every query from the interactable's current state and the
/// interactor's keyring. Never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryResult {
    /// Whether the prompt should be shown at all
    pub show_prompt: bool,
    /// Prompt text ("Open", "Unlock", "Talk")
    pub prompt_text: String,
    /// How the interaction is triggered
    pub input_mode: InputMode,
    /// Seconds the input must be held (hold mode only)
    pub hold_duration: f32,
    /// Whether requirements are met
    pub availability: Availability,
    /// Unmet requirement messages in authoring order. Empty when available.
    pub unmet_requirement_messages: Vec<String>,
    /// Number of unmet requirements
    pub unmet_requirement_count: usize,
}

impl Default for QueryResult {
    fn default() -> Self {
        Self::hidden()
    }
}

impl QueryResult {
    /// The "nothing to show" result used when nothing is focused.
    #[must_use]
    pub fn hidden() -> Self {
        Self {
            show_prompt: false,
            prompt_text: String::new(),
            input_mode: InputMode::Press,
            hold_duration: 0.0,
            availability: Availability::Available,
            unmet_requirement_messages: Vec::new(),
            unmet_requirement_count: 0,
        }
    }

    /// Builds a visible result. Unmet messages make it unavailable.
    #[must_use]
    pub fn new(
        show_prompt: bool,
        prompt_text: impl Into<String>,
        input_mode: InputMode,
        hold_duration: f32,
        unmet_requirement_messages: Vec<String>,
    ) -> Self {
        let availability = if unmet_requirement_messages.is_empty() {
            Availability::Available
        } else {
            Availability::Unavailable
        };

        Self {
            show_prompt,
            prompt_text: prompt_text.into(),
            input_mode,
            hold_duration,
            availability,
            unmet_requirement_count: unmet_requirement_messages.len(),
            unmet_requirement_messages,
        }
    }

    /// True if every requirement is met.
    #[must_use]
    pub fn is_available(&self) -> bool {
        self.availability == Availability::Available
    }

    /// True for hold interactions with a positive duration.
    #[must_use]
    pub fn is_hold(&self) -> bool {
        self.input_mode == InputMode::Hold && self.hold_duration > 0.0
    }
}
