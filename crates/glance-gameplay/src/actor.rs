//! Data-driven interactable actors.
//!
//! An actor points at a shared, read-only state table and keeps a by-value
//! copy of its current state. The copy is taken when the state is set, so a
//! hot-reloaded asset is only observed after [`StateCache::set_state`] or
//! [`StateCache::refresh_from_asset`].

use std::sync::Arc;

use ahash::AHashMap;
use crossbeam_channel::Receiver;
use glam::Vec3;
use glance_common::{EntityId, Name};
use tracing::{debug, error, warn};

use crate::data_asset::{InteractionDataAsset, StateDefinition};
use crate::events::EventBroadcaster;
use crate::interactable::{Interactable, InteractionOutcome, Interactor};
use crate::keyring::Keyring;
use crate::query::QueryResult;
use crate::requirements::{evaluate_requirements, MissingRequirements};
use crate::scene::Actor;

/// A table of named states an actor can be in.
pub trait StateTable {
    /// Row type cached by the actor.
    type State: Clone;

    /// Looks up a state. NONE never matches.
    fn find_state(&self, state_id: Name) -> Option<&Self::State>;

    /// State a fresh actor starts in.
    fn default_state_id(&self) -> Name;
}

impl StateTable for InteractionDataAsset {
    type State = StateDefinition;

    fn find_state(&self, state_id: Name) -> Option<&StateDefinition> {
        InteractionDataAsset::find_state(self, state_id)
    }

    fn default_state_id(&self) -> Name {
        InteractionDataAsset::default_state_id(self)
    }
}

/// Current state id plus a cached copy of its definition.
#[derive(Debug, Clone)]
pub struct StateCache<T: StateTable> {
    data: Option<Arc<T>>,
    current_state_id: Name,
    current: Option<T::State>,
}

impl<T: StateTable> StateCache<T> {
    /// Creates a cache over `data` with no state resolved yet.
    #[must_use]
    pub fn new(data: Option<Arc<T>>) -> Self {
        Self {
            data,
            current_state_id: Name::NONE,
            current: None,
        }
    }

    /// Presets the state id that [`Self::initialize`] tries first.
    #[must_use]
    pub fn with_state_id(mut self, state_id: impl Into<Name>) -> Self {
        self.current_state_id = state_id.into();
        self
    }

    /// The backing table.
    #[must_use]
    pub fn data(&self) -> Option<&Arc<T>> {
        self.data.as_ref()
    }

    /// Current state id (may be unresolved).
    #[must_use]
    pub fn current_state_id(&self) -> Name {
        self.current_state_id
    }

    /// Cached definition of the current state.
    #[must_use]
    pub fn current_state(&self) -> Option<&T::State> {
        self.current.as_ref()
    }

    /// Returns true if a state is cached.
    #[must_use]
    pub fn has_valid_state(&self) -> bool {
        self.data.is_some() && self.current.is_some()
    }

    /// Switches to `state_id`.
    ///
    /// Setting the current state again is a successful no-op. An unknown id,
    /// NONE or a missing table fails and leaves the previous state intact.
    pub fn set_state(&mut self, state_id: Name) -> bool {
        let Some(data) = &self.data else {
            return false;
        };
        if state_id.is_none() {
            return false;
        }
        if state_id == self.current_state_id && self.current.is_some() {
            return true;
        }

        match data.find_state(state_id) {
            Some(found) => {
                self.current = Some(found.clone());
                self.current_state_id = state_id;
                true
            }
            None => {
                debug!("State {} not found, keeping {}", state_id, self.current_state_id);
                false
            }
        }
    }

    /// Resolves the starting state: the preset id, else the table default.
    pub fn initialize(&mut self) -> bool {
        let Some(data) = &self.data else {
            return false;
        };
        let default_id = data.default_state_id();

        if self.set_state(self.current_state_id) || self.set_state(default_id) {
            return true;
        }

        error!(
            "No interaction state could be resolved (preset {}, default {})",
            self.current_state_id, default_id
        );
        false
    }

    /// Swaps in a new table and re-caches the current state from it.
    ///
    /// Falls back to [`Self::initialize`] if the current id no longer exists.
    pub fn refresh_from_asset(&mut self, data: Arc<T>) -> bool {
        self.data = Some(data);
        self.current = None;
        if self.set_state(self.current_state_id) {
            return true;
        }
        warn!(
            "State {} vanished after asset refresh, falling back to default",
            self.current_state_id
        );
        self.initialize()
    }
}

impl StateCache<InteractionDataAsset> {
    /// Builds the query result for the cached state.
    ///
    /// Without a table or a cached state nothing is shown.
    #[must_use]
    pub fn query(&self, keyring: Option<&Keyring>) -> QueryResult {
        let (Some(data), Some(state)) = (&self.data, &self.current) else {
            return QueryResult::hidden();
        };

        let unmet = if state.required_keys.is_empty() {
            Vec::new()
        } else {
            evaluate_requirements(&state.required_keys, keyring).into_messages()
        };

        QueryResult::new(
            data.should_show_prompt(state),
            state.prompt_text.clone(),
            state.input_mode,
            state.hold_duration,
            unmet,
        )
    }

    /// Unmet requirements of the cached state.
    #[must_use]
    pub fn missing_requirements(&self, keyring: Option<&Keyring>) -> MissingRequirements {
        self.current
            .as_ref()
            .map(|state| evaluate_requirements(&state.required_keys, keyring))
            .unwrap_or_default()
    }
}

/// Cache type used by generic interactable actors.
pub type InteractionStateCache = StateCache<InteractionDataAsset>;

/// Notifications raised by an interactable actor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActorSignal {
    /// An interaction ran with every requirement met
    InteractAvailable {
        /// Who interacted
        interactor: EntityId,
    },
    /// An interaction ran with unmet requirements
    InteractUnavailable {
        /// Who interacted
        interactor: EntityId,
        /// Unmet requirement messages
        messages: Vec<String>,
    },
    /// The current state id changed
    StateChanged {
        /// New state id
        new: Name,
        /// Previous state id
        previous: Name,
    },
}

/// Per-actor gameplay hooks.
///
/// Hooks get the state cache so they can move the actor to another state.
pub trait InteractBehavior {
    /// Interaction ran with every requirement met.
    fn on_interact_available(&mut self, _state: &mut InteractionStateCache, _interactor: &Interactor<'_>) {}

    /// Interaction ran with unmet requirements.
    fn on_interact_unavailable(
        &mut self,
        _state: &mut InteractionStateCache,
        _interactor: &Interactor<'_>,
        _messages: &[String],
    ) {
    }

    /// Actor gained focus.
    fn on_focus_start(&mut self, _state: &mut InteractionStateCache, _interactor: &Interactor<'_>) {}

    /// Actor lost focus.
    fn on_focus_end(&mut self, _state: &mut InteractionStateCache, _interactor: &Interactor<'_>) {}
}

/// No gameplay reaction.
impl InteractBehavior for () {}

/// Moves to a follow-up state after a successful interaction.
///
/// A door maps `Closed -> Open` and `Open -> Closed`; a valve maps
/// `Shut -> Opened` and stays there.
#[derive(Debug, Clone, Default)]
pub struct StateTransitions {
    next: AHashMap<Name, Name>,
}

impl StateTransitions {
    /// Creates an empty transition table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `from -> to`.
    #[must_use]
    pub fn with(mut self, from: impl Into<Name>, to: impl Into<Name>) -> Self {
        self.next.insert(from.into(), to.into());
        self
    }

    /// Two states flipping into each other.
    #[must_use]
    pub fn toggle(a: impl Into<Name>, b: impl Into<Name>) -> Self {
        let (a, b) = (a.into(), b.into());
        Self::new().with(a, b).with(b, a)
    }

    /// Follow-up of `from`, if any.
    #[must_use]
    pub fn next(&self, from: Name) -> Option<Name> {
        self.next.get(&from).copied()
    }
}

impl InteractBehavior for StateTransitions {
    fn on_interact_available(&mut self, state: &mut InteractionStateCache, interactor: &Interactor<'_>) {
        let Some(next) = self.next(state.current_state_id()) else {
            return;
        };
        if !state.set_state(next) {
            warn!("{} could not move interaction to state {}", interactor.name, next);
        }
    }
}

/// A generic data-driven interactable (doors, chests, valves, switches).
pub struct InteractableActor<B: InteractBehavior = ()> {
    id: EntityId,
    name: String,
    location: Vec3,
    state: InteractionStateCache,
    behavior: B,
    highlighted: bool,
    signals: EventBroadcaster<ActorSignal>,
}

impl<B: InteractBehavior> InteractableActor<B> {
    /// Creates an actor. Call [`Self::begin_play`] to resolve its state.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        location: Vec3,
        data: Option<Arc<InteractionDataAsset>>,
        behavior: B,
    ) -> Self {
        Self {
            id: EntityId::new(),
            name: name.into(),
            location,
            state: StateCache::new(data),
            behavior,
            highlighted: false,
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

    /// Switches state, raising [`ActorSignal::StateChanged`] on change.
    pub fn set_state(&mut self, state_id: impl Into<Name>) -> bool {
        let previous = self.state.current_state_id();
        let changed = self.state.set_state(state_id.into());
        self.notify_state_change(previous);
        changed
    }

    /// Re-caches the current state from a reloaded asset.
    pub fn refresh_from_asset(&mut self, data: Arc<InteractionDataAsset>) -> bool {
        let previous = self.state.current_state_id();
        let ok = self.state.refresh_from_asset(data);
        self.notify_state_change(previous);
        ok
    }

    /// Current state id.
    #[must_use]
    pub fn current_state_id(&self) -> Name {
        self.state.current_state_id()
    }

    /// Cached state definition.
    #[must_use]
    pub fn current_state(&self) -> Option<&StateDefinition> {
        self.state.current_state()
    }

    /// The actor's state cache.
    #[must_use]
    pub fn state(&self) -> &InteractionStateCache {
        &self.state
    }

    /// Gameplay behaviour.
    #[must_use]
    pub fn behavior(&self) -> &B {
        &self.behavior
    }

    /// Returns true while focused.
    #[must_use]
    pub fn is_highlighted(&self) -> bool {
        self.highlighted
    }

    /// Subscribes to actor signals.
    #[must_use]
    pub fn subscribe(&mut self) -> Receiver<ActorSignal> {
        self.signals.subscribe()
    }

    fn notify_state_change(&mut self, previous: Name) {
        let new = self.state.current_state_id();
        if new != previous {
            debug!("{} state {} -> {}", self.name, previous, new);
            self.signals.emit(&ActorSignal::StateChanged { new, previous });
        }
    }
}

impl<B: InteractBehavior> Actor for InteractableActor<B> {
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

impl<B: InteractBehavior> Interactable for InteractableActor<B> {
    fn query(&self, interactor: &Interactor<'_>) -> QueryResult {
        self.state.query(interactor.keyring)
    }

    fn interact(&mut self, interactor: &Interactor<'_>) -> InteractionOutcome {
        if !self.state.has_valid_state() {
            error!("{} has no cached interaction state", self.name);
            return InteractionOutcome::Ignored;
        }

        let previous = self.state.current_state_id();
        let missing = self.state.missing_requirements(interactor.keyring);

        let outcome = if missing.has_missing() {
            let messages = missing.into_messages();
            self.signals.emit(&ActorSignal::InteractUnavailable {
                interactor: interactor.id,
                messages: messages.clone(),
            });
            self.behavior
                .on_interact_unavailable(&mut self.state, interactor, &messages);
            InteractionOutcome::Unavailable(messages)
        } else {
            self.signals.emit(&ActorSignal::InteractAvailable {
                interactor: interactor.id,
            });
            self.behavior.on_interact_available(&mut self.state, interactor);
            InteractionOutcome::Available
        };

        self.notify_state_change(previous);
        outcome
    }

    fn on_focus_start(&mut self, interactor: &Interactor<'_>) {
        self.highlighted = true;
        let previous = self.state.current_state_id();
        self.behavior.on_focus_start(&mut self.state, interactor);
        self.notify_state_change(previous);
    }

    fn on_focus_end(&mut self, interactor: &Interactor<'_>) {
        self.highlighted = false;
        let previous = self.state.current_state_id();
        self.behavior.on_focus_end(&mut self.state, interactor);
        self.notify_state_change(previous);
    }
}
