//! Designer-authored interaction data.
//!
//! An [`InteractionDataAsset`] is a read-only table of named states. Each state
//! describes how the interaction is presented (prompt, press/hold) and which
//! keys it requires. The owning actor decides which state is current.

use glance_common::Name;
use serde::{Deserialize, Serialize};

use crate::requirements::KeyRequirement;

/// How an interaction is triggered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InputMode {
    /// Executes as soon as the input is pressed
    #[default]
    Press,
    /// Executes after the input is held for the state's hold duration
    Hold,
}

/// Prompt visibility policy applied across all states of an asset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PromptOverride {
    /// Each state decides
    #[default]
    UsePerState,
    /// Always show the prompt
    ForceShow,
    /// Never show the prompt
    ForceHide,
}

/// A single interaction state ("Closed", "Open", "Locked").
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StateDefinition {
    /// Unique id within the owning asset
    pub state_id: Name,
    /// What the prompt says in this state (e.g. Open, Close, Unlock)
    pub prompt_text: String,
    /// Press or hold
    pub input_mode: InputMode,
    /// Seconds to hold (hold mode only)
    pub hold_duration: f32,
    /// Requirements for this state (AND logic)
    pub required_keys: Vec<KeyRequirement>,
    /// Per-state prompt visibility (see [`PromptOverride::UsePerState`])
    pub show_prompt: bool,
    /// Whether UI may list unmet requirements
    pub show_requirements: bool,
}

impl Default for StateDefinition {
    fn default() -> Self {
        Self {
            state_id: Name::NONE,
            prompt_text: String::new(),
            input_mode: InputMode::Press,
            hold_duration: 0.0,
            required_keys: Vec::new(),
            show_prompt: true,
            show_requirements: true,
        }
    }
}

impl StateDefinition {
    /// Creates a press state with a prompt and no requirements.
    #[must_use]
    pub fn new(state_id: impl Into<Name>, prompt_text: impl Into<String>) -> Self {
        Self {
            state_id: state_id.into(),
            prompt_text: prompt_text.into(),
            ..Self::default()
        }
    }

    /// Switches the state to hold mode with the given duration.
    #[must_use]
    pub fn with_hold(mut self, duration: f32) -> Self {
        self.input_mode = InputMode::Hold;
        self.hold_duration = duration;
        self
    }

    /// Appends a requirement.
    #[must_use]
    pub fn with_requirement(mut self, requirement: KeyRequirement) -> Self {
        self.required_keys.push(requirement);
        self
    }

    /// Sets the per-state prompt flag.
    #[must_use]
    pub fn with_show_prompt(mut self, show_prompt: bool) -> Self {
        self.show_prompt = show_prompt;
        self
    }

    /// A state is valid if it has a non-NONE id.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        !self.state_id.is_none()
    }

    /// True if the state is configured as hold.
    #[must_use]
    pub fn is_hold(&self) -> bool {
        self.input_mode == InputMode::Hold
    }
}

/// Static definition of an interactable type (Door, Chest, Valve...).
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct InteractionDataAsset {
    /// Name of the interactable object
    pub display_name: String,
    /// How prompts are shown across all states
    pub prompt_override: PromptOverride,
    /// State used when the actor has none set. NONE means "first state".
    pub default_state_id: Name,
    /// All states of this interactable type
    pub states: Vec<StateDefinition>,
}

impl InteractionDataAsset {
    /// Creates an empty asset.
    #[must_use]
    pub fn new(display_name: impl Into<String>) -> Self {
        Self {
            display_name: display_name.into(),
            ..Self::default()
        }
    }

    /// Appends a state.
    #[must_use]
    pub fn with_state(mut self, state: StateDefinition) -> Self {
        self.states.push(state);
        self
    }

    /// Sets the explicit default state id.
    #[must_use]
    pub fn with_default_state(mut self, state_id: impl Into<Name>) -> Self {
        self.default_state_id = state_id.into();
        self
    }

    /// Sets the prompt override policy.
    #[must_use]
    pub fn with_prompt_override(mut self, policy: PromptOverride) -> Self {
        self.prompt_override = policy;
        self
    }

    /// Finds a state by id. NONE never matches.
    #[must_use]
    pub fn find_state(&self, state_id: Name) -> Option<&StateDefinition> {
        if state_id.is_none() {
            return None;
        }
        self.states.iter().find(|state| state.state_id == state_id)
    }

    /// Resolves the state a fresh actor starts in.
    ///
    /// The explicit default wins if it exists, otherwise the first state's id,
    /// otherwise NONE.
    #[must_use]
    pub fn default_state_id(&self) -> Name {
        if let Some(found) = self.find_state(self.default_state_id) {
            return found.state_id;
        }
        self.states
            .first()
            .map_or(Name::NONE, |state| state.state_id)
    }

    /// Applies the prompt override policy to a state.
    #[must_use]
    pub fn should_show_prompt(&self, state: &StateDefinition) -> bool {
        match self.prompt_override {
            PromptOverride::ForceShow => true,
            PromptOverride::ForceHide => false,
            PromptOverride::UsePerState => state.show_prompt,
        }
    }

    /// Repairs a NONE or dangling default id by pointing it at the first
    /// valid state. Returns true if the id changed.
    pub fn correct_default_state_id(&mut self) -> bool {
        if self.find_state(self.default_state_id).is_some() {
            return false;
        }

        let Some(first_valid) = self.states.iter().find(|state| state.is_valid()) else {
            return false;
        };

        let corrected = first_valid.state_id;
        let changed = corrected != self.default_state_id;
        self.default_state_id = corrected;
        changed
    }
}
