//! NPC talk interactions.
//!
//! A deliberately small dialogue model: each state carries one line for "the
//! interactor owns the required keys" and one for "they don't". Talking shows
//! the matching line in a speech bubble for a while.

use std::sync::Arc;

use crossbeam_channel::Receiver;
use glam::Vec3;
use glance_common::{EntityId, Name};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::actor::{ActorSignal, StateCache, StateTable};
use crate::data_asset::InputMode;
use crate::events::EventBroadcaster;
use crate::interactable::{Interactable, InteractionOutcome, Interactor};
use crate::query::QueryResult;
use crate::requirements::{evaluate_requirements, KeyRequirement};
use crate::scene::Actor;

/// Prompt used when the asset leaves it empty.
pub const DEFAULT_TALK_PROMPT: &str = "Talk";

/// One dialogue step of an NPC.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct NpcDialogueState {
    /// Unique id within the owning asset
    pub state_id: Name,
    /// Line spoken while requirements are unmet
    pub line_if_missing: String,
    /// Line spoken once requirements are met
    pub line_if_met: String,
    /// Keys required for the "met" line (AND logic)
    pub required_keys: Vec<KeyRequirement>,
    /// Seconds the speech bubble stays up. Non-positive keeps it until replaced.
    pub speech_visible_time: f32,
}

impl NpcDialogueState {
    /// Creates a state with both lines.
    #[must_use]
    pub fn new(
        state_id: impl Into<Name>,
        line_if_missing: impl Into<String>,
        line_if_met: impl Into<String>,
    ) -> Self {
        Self {
            state_id: state_id.into(),
            line_if_missing: line_if_missing.into(),
            line_if_met: line_if_met.into(),
            ..Self::default()
        }
    }

    /// Appends a requirement.
    #[must_use]
    pub fn with_requirement(mut self, requirement: KeyRequirement) -> Self {
        self.required_keys.push(requirement);
        self
    }

    /// Sets how long the bubble stays up.
    #[must_use]
    pub fn with_visible_time(mut self, seconds: f32) -> Self {
        self.speech_visible_time = seconds;
        self
    }

    /// A state is valid if it has a non-NONE id.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        !self.state_id.is_none()
    }
}

/// Designer-authored NPC talk definition.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct NpcInteractionDataAsset {
    /// Prompt text. Empty falls back to [`DEFAULT_TALK_PROMPT`].
    pub prompt_text: String,
    /// Starting state id
    pub default_state_id: Name,
    /// Dialogue states
    pub states: Vec<NpcDialogueState>,
}

impl NpcInteractionDataAsset {
    /// Creates an empty asset with a prompt.
    #[must_use]
    pub fn new(prompt_text: impl Into<String>) -> Self {
        Self {
            prompt_text: prompt_text.into(),
            ..Self::default()
        }
    }

    /// Appends a state.
    #[must_use]
    pub fn with_state(mut self, state: NpcDialogueState) -> Self {
        self.states.push(state);
        self
    }

    /// Sets the default state id.
    #[must_use]
    pub fn with_default_state(mut self, state_id: impl Into<Name>) -> Self {
        self.default_state_id = state_id.into();
        self
    }

    /// Finds a state by id. NONE never matches.
    #[must_use]
    pub fn find_state(&self, state_id: Name) -> Option<&NpcDialogueState> {
        if state_id.is_none() {
            return None;
        }
        self.states.iter().find(|state| state.state_id == state_id)
    }

    /// Explicit default if it resolves, else the first state, else NONE.
    #[must_use]
    pub fn default_state_id(&self) -> Name {
        self.find_state(self.default_state_id)
            .or_else(|| self.states.first())
            .map_or(Name::NONE, |state| state.state_id)
    }

    /// Prompt shown by the talk interaction.
    #[must_use]
    pub fn resolved_prompt(&self) -> &str {
        if self.prompt_text.is_empty() {
            DEFAULT_TALK_PROMPT
        } else {
            &self.prompt_text
        }
    }

    /// Points a NONE or dangling default id at the first valid state.
    pub fn correct_default_state_id(&mut self) -> bool {
        if self.find_state(self.default_state_id).is_some() {
            return false;
        }
        let Some(first) = self.states.iter().find(|state| state.is_valid()) else {
            return false;
        };
        let changed = first.state_id != self.default_state_id;
        self.default_state_id = first.state_id;
        changed
    }
}

impl StateTable for NpcInteractionDataAsset {
    type State = NpcDialogueState;

    fn find_state(&self, state_id: Name) -> Option<&NpcDialogueState> {
        NpcInteractionDataAsset::find_state(self, state_id)
    }

    fn default_state_id(&self) -> Name {
        NpcInteractionDataAsset::default_state_id(self)
    }
}

/// A line shown above an NPC.
#[derive(Debug, Clone, PartialEq)]
pub struct SpeechBubble {
    /// Spoken line
    pub line: String,
    /// Time the bubble hides, `None` if it stays up
    pub hide_at: Option<f64>,
}

impl SpeechBubble {
    /// Returns true while the bubble should be drawn.
    #[must_use]
    pub fn is_visible_at(&self, now: f64) -> bool {
        self.hide_at.map_or(true, |hide_at| now < hide_at)
    }
}

/// An NPC that talks when interacted with.
pub struct InteractableNpc {
    id: EntityId,
    name: String,
    location: Vec3,
    state: StateCache<NpcInteractionDataAsset>,
    bubble: Option<SpeechBubble>,
    signals: EventBroadcaster<ActorSignal>,
}

impl InteractableNpc {
    /// Creates an NPC. Call [`Self::begin_play`] to resolve its state.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        location: Vec3,
        data: Option<Arc<NpcInteractionDataAsset>>,
    ) -> Self {
        Self {
            id: EntityId::new(),
            name: name.into(),
            location,
            state: StateCache::new(data),
            bubble: None,
            signals: EventBroadcaster::new(),
        }
    }

    /// Presets the state tried first by [`Self::begin_play`].
    #[must_use]
    pub fn with_initial_state(mut self, state_id: impl Into<Name>) -> Self {
        self.state = self.state.with_state_id(state_id);
        self
    }

    /// Resolves the starting state.
    pub fn begin_play(&mut self) -> bool {
        self.state.initialize()
    }

    /// Switches dialogue state, raising [`ActorSignal::StateChanged`] on change.
    pub fn set_state(&mut self, state_id: impl Into<Name>) -> bool {
        let previous = self.state.current_state_id();
        let ok = self.state.set_state(state_id.into());
        let new = self.state.current_state_id();
        if new != previous {
            self.signals.emit(&ActorSignal::StateChanged { new, previous });
        }
        ok
    }

    /// Current dialogue state id.
    #[must_use]
    pub fn current_state_id(&self) -> Name {
        self.state.current_state_id()
    }

    /// Line currently shown at `now`, if any.
    #[must_use]
    pub fn visible_line(&self, now: f64) -> Option<&str> {
        self.bubble
            .as_ref()
            .filter(|bubble| bubble.is_visible_at(now))
            .map(|bubble| bubble.line.as_str())
    }

    /// Hides an expired bubble.
    pub fn update(&mut self, now: f64) {
        if self.bubble.as_ref().is_some_and(|bubble| !bubble.is_visible_at(now)) {
            debug!("{} speech bubble hidden", self.name);
            self.bubble = None;
        }
    }

    /// Subscribes to talk signals.
    #[must_use]
    pub fn subscribe(&mut self) -> Receiver<ActorSignal> {
        self.signals.subscribe()
    }

    fn show_bubble(&mut self, line: &str, duration: f32, now: f64) {
        let hide_at = (duration > 0.0).then(|| now + f64::from(duration));
        debug!("{} says \"{}\"", self.name, line);
        self.bubble = Some(SpeechBubble {
            line: line.to_string(),
            hide_at,
        });
    }
}

impl Actor for InteractableNpc {
    fn id(&self) -> EntityId {
        self.id
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn location(&self) -> Vec3 {
        self.location
    }

    fn as_interactable(&self) -> Option<&dyn Interactable> {
        Some(self)
    }

    fn as_interactable_mut(&mut self) -> Option<&mut dyn Interactable> {
        Some(self)
    }
}

impl Interactable for InteractableNpc {
    fn query(&self, _interactor: &Interactor<'_>) -> QueryResult {
        let prompt = self
            .state
            .data()
            .map_or(DEFAULT_TALK_PROMPT, |data| data.resolved_prompt());
        QueryResult::new(true, prompt, InputMode::Press, 0.0, Vec::new())
    }

    fn interact(&mut self, interactor: &Interactor<'_>) -> InteractionOutcome {
        let Some(state) = self.state.current_state().cloned() else {
            return InteractionOutcome::Ignored;
        };

        let missing = evaluate_requirements(&state.required_keys, interactor.keyring);
        let met = !missing.has_missing();
        let line = if met {
            &state.line_if_met
        } else {
            &state.line_if_missing
        };

        if !line.is_empty() {
            self.show_bubble(line, state.speech_visible_time, interactor.time);
        }

        if met {
            self.signals.emit(&ActorSignal::InteractAvailable {
                interactor: interactor.id,
            });
            InteractionOutcome::Available
        } else {
            let messages = missing.into_messages();
            self.signals.emit(&ActorSignal::InteractUnavailable {
                interactor: interactor.id,
                messages: messages.clone(),
            });
            InteractionOutcome::Unavailable(messages)
        }
    }
}
