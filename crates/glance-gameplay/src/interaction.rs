//! Focus scanning and the press/hold interaction state machine.
//!
//! The [`InteractionComponent`] periodically traces along its owner's view,
//! tracks which interactable is in focus, and turns begin/end interact input
//! into press or hold executions. It is driven entirely by the host:
//!
//! 1. the host advances a [`TimerManager`] and forwards every due handle to
//!    [`InteractionComponent::handle_timer`];
//! 2. input calls [`InteractionComponent::begin_interact`] and
//!    [`InteractionComponent::end_interact`];
//! 3. UI reads [`InteractionComponent::cached_query`] or subscribes to
//!    [`InteractionEvent`]s.
//!
//! Within a focus change the old target's focus-end hook runs before the new
//! target's focus-start hook, the query cache is written next, and only then
//! are [`InteractionEvent::FocusChanged`] and [`InteractionEvent::QueryUpdated`]
//! emitted. Cancelling a hold clears its timer before returning, so no hold
//! tick can run after a cancel.

use std::rc::{Rc, Weak};

use crossbeam_channel::Receiver;
use glance_common::{EntityId, ViewPoint};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, trace, warn};

use crate::data_asset::InputMode;
use crate::debug::{ActorLabel, InteractionDebugSnapshot, TraceDebugInfo};
use crate::events::{EventBroadcaster, InteractionEvent};
use crate::interactable::{Interactable, InteractionOutcome, Interactor};
use crate::keyring::Keyring;
use crate::query::QueryResult;
use crate::scene::{implements_interactable, ActorRef, SceneQuery, TraceRequest, WeakActorRef};
use crate::timers::{TimerHandle, TimerManager};

/// Slack applied when comparing accumulated hold time against the duration.
const HOLD_EPSILON: f32 = 1e-4;

/// Configuration for focus scanning and hold input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InteractionConfig {
    /// Seconds between focus scans
    pub scan_interval: f32,
    /// Length of the focus trace
    pub trace_distance: f32,
    /// Sphere sweep radius. Zero or less uses a line trace.
    pub trace_radius: f32,
    /// Exclude the owner from focus traces
    pub ignore_owner: bool,
    /// Seconds between hold progress ticks
    pub hold_tick_interval: f32,
    /// Whether scanning starts enabled
    pub start_enabled: bool,
}

impl Default for InteractionConfig {
    fn default() -> Self {
        Self {
            scan_interval: 0.05,
            trace_distance: 500.0,
            trace_radius: 0.0,
            ignore_owner: true,
            hold_tick_interval: 0.02,
            start_enabled: true,
        }
    }
}

/// Progress of an in-flight hold.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct HoldState {
    /// A hold is in progress
    pub holding: bool,
    /// Seconds accumulated so far
    pub elapsed: f32,
    /// Seconds required
    pub duration: f32,
    /// Seconds added per tick, fixed when the hold starts
    pub tick_interval: f32,
}

impl HoldState {
    /// Normalized progress, zero when not holding.
    #[must_use]
    pub fn progress(&self) -> f32 {
        if !self.holding || self.duration <= 0.0 {
            return 0.0;
        }
        (self.elapsed / self.duration).clamp(0.0, 1.0)
    }

    fn is_complete(&self) -> bool {
        self.elapsed + HOLD_EPSILON >= self.duration
    }
}

/// The scanning actor as seen by the component for one callback.
#[derive(Debug, Clone, Copy)]
pub struct OwnerView<'a> {
    /// Owner id (excluded from traces when configured)
    pub id: EntityId,
    /// Owner display name
    pub name: &'a str,
    /// The owner is possessed by a controller
    pub is_controlled: bool,
    /// Controller camera view point
    pub controller_view: Option<ViewPoint>,
    /// The owner's own eyes
    pub eyes_view: Option<ViewPoint>,
    /// Keys the owner carries
    pub keyring: Option<&'a Keyring>,
}

impl<'a> OwnerView<'a> {
    /// Uncontrolled owner with no view point.
    #[must_use]
    pub fn new(id: EntityId, name: &'a str) -> Self {
        Self {
            id,
            name,
            is_controlled: false,
            controller_view: None,
            eyes_view: None,
            keyring: None,
        }
    }

    /// Controlled owner seeing through its controller.
    #[must_use]
    pub fn controlled(id: EntityId, name: &'a str, view: ViewPoint) -> Self {
        Self {
            is_controlled: true,
            controller_view: Some(view),
            ..Self::new(id, name)
        }
    }

    /// Sets the eyes view point.
    #[must_use]
    pub fn with_eyes(mut self, view: ViewPoint) -> Self {
        self.eyes_view = Some(view);
        self
    }

    /// Attaches a keyring.
    #[must_use]
    pub fn with_keyring(mut self, keyring: &'a Keyring) -> Self {
        self.keyring = Some(keyring);
        self
    }

    /// Controller view if controlled, otherwise the eyes.
    #[must_use]
    pub fn view_point(&self) -> Option<ViewPoint> {
        if self.is_controlled {
            if let Some(view) = self.controller_view {
                return Some(view);
            }
        }
        self.eyes_view
    }

    /// The owner as an interactor.
    #[must_use]
    pub fn interactor(&self, time: f64) -> Interactor<'a> {
        Interactor {
            id: self.id,
            name: self.name,
            keyring: self.keyring,
            time,
        }
    }
}

/// Collaborators available to a component callback.
pub struct InteractionContext<'a> {
    /// Scheduler driving scan and hold ticks
    pub timers: &'a mut TimerManager,
    /// Scene to trace against
    pub scene: Option<&'a dyn SceneQuery>,
    /// The scanning actor
    pub owner: Option<OwnerView<'a>>,
}

impl<'a> InteractionContext<'a> {
    /// Creates a context.
    #[must_use]
    pub fn new(
        timers: &'a mut TimerManager,
        scene: Option<&'a dyn SceneQuery>,
        owner: Option<OwnerView<'a>>,
    ) -> Self {
        Self {
            timers,
            scene,
            owner,
        }
    }

    fn interactor(&self) -> Interactor<'a> {
        let time = self.timers.now();
        self.owner.map_or_else(
            || Interactor::new(EntityId::NULL, "").at(time),
            |owner| owner.interactor(time),
        )
    }
}

/// Focus scanner plus press/hold state machine.
pub struct InteractionComponent {
    config: InteractionConfig,
    enabled: bool,
    debug_overlay_enabled: bool,
    scan_timer: TimerHandle,
    hold_timer: TimerHandle,
    focused: Option<WeakActorRef>,
    focused_label: Option<ActorLabel>,
    cached_query: QueryResult,
    hold: HoldState,
    last_trace: TraceDebugInfo,
    events: EventBroadcaster<InteractionEvent>,
}

impl Default for InteractionComponent {
    fn default() -> Self {
        Self::new()
    }
}

impl InteractionComponent {
    /// Creates a component with the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(InteractionConfig::default())
    }

    /// Creates a component with a custom configuration.
    #[must_use]
    pub fn with_config(config: InteractionConfig) -> Self {
        Self {
            enabled: config.start_enabled,
            config,
            debug_overlay_enabled: false,
            scan_timer: TimerHandle::INVALID,
            hold_timer: TimerHandle::INVALID,
            focused: None,
            focused_label: None,
            cached_query: QueryResult::hidden(),
            hold: HoldState::default(),
            last_trace: TraceDebugInfo::default(),
            events: EventBroadcaster::new(),
        }
    }

    /// Current configuration.
    #[must_use]
    pub fn config(&self) -> &InteractionConfig {
        &self.config
    }

    /// Subscribes to interaction notifications.
    #[must_use]
    pub fn subscribe(&mut self) -> Receiver<InteractionEvent> {
        self.events.subscribe()
    }

    // ---- lifecycle ---------------------------------------------------------

    /// Starts scanning if enabled.
    pub fn begin_play(&mut self, ctx: &mut InteractionContext<'_>) {
        if self.enabled {
            self.start_focus_scan(ctx);
        }
    }

    /// Stops scanning, cancels any hold and clears focus.
    pub fn end_play(&mut self, ctx: &mut InteractionContext<'_>) {
        self.stop_focus_scan(ctx);
        self.reset_hold(ctx);
        self.clear_focus(ctx);
    }

    /// Dispatches a due timer. Returns false if the handle is not ours.
    pub fn handle_timer(&mut self, handle: TimerHandle, ctx: &mut InteractionContext<'_>) -> bool {
        if handle == self.scan_timer && handle.is_valid() {
            self.scan_now(ctx);
            true
        } else if handle == self.hold_timer && handle.is_valid() {
            self.tick_hold(ctx);
            true
        } else {
            false
        }
    }

    // ---- commands ----------------------------------------------------------

    /// Starts interacting with the focused target.
    ///
    /// Press interactions execute immediately. Hold interactions start a hold
    /// that completes after the cached hold duration. Ignored while disabled,
    /// without focus, or while a hold is already running.
    pub fn begin_interact(&mut self, ctx: &mut InteractionContext<'_>) {
        if !self.enabled || self.hold.holding {
            return;
        }
        if self.live_focus().is_none() {
            return;
        }

        match self.cached_query.input_mode {
            InputMode::Press => {
                self.execute_press(ctx);
            }
            InputMode::Hold => self.begin_hold(self.cached_query.hold_duration, ctx),
        }
    }

    /// Releases the interact input, cancelling any hold.
    pub fn end_interact(&mut self, ctx: &mut InteractionContext<'_>) {
        if !self.enabled {
            return;
        }
        self.reset_hold(ctx);
    }

    /// Enables scanning and scans once immediately.
    pub fn enable(&mut self, ctx: &mut InteractionContext<'_>) {
        if self.enabled {
            return;
        }
        debug!("Interaction enabled");
        self.enabled = true;
        self.start_focus_scan(ctx);
        self.scan_now(ctx);
    }

    /// Disables scanning, cancels any hold and clears focus.
    pub fn disable(&mut self, ctx: &mut InteractionContext<'_>) {
        if !self.enabled {
            return;
        }
        debug!("Interaction disabled");
        self.enabled = false;
        self.stop_focus_scan(ctx);
        self.reset_hold(ctx);
        self.clear_focus(ctx);
    }

    /// Flips between enabled and disabled.
    pub fn toggle(&mut self, ctx: &mut InteractionContext<'_>) {
        if self.enabled {
            self.disable(ctx);
        } else {
            self.enable(ctx);
        }
    }

    /// Flips the debug overlay flag and returns the new value.
    pub fn toggle_debug_overlay(&mut self) -> bool {
        self.debug_overlay_enabled = !self.debug_overlay_enabled;
        self.debug_overlay_enabled
    }

    /// Changes the scan interval. While enabled the scan timer is restarted
    /// with the new interval, which also resumes a paused scan.
    pub fn set_scan_interval(&mut self, interval: f32, ctx: &mut InteractionContext<'_>) {
        self.config.scan_interval = interval;
        if self.enabled {
            self.start_focus_scan(ctx);
        }
    }

    /// Changes the trace distance used by later scans.
    pub fn set_trace_distance(&mut self, distance: f32) {
        self.config.trace_distance = distance;
    }

    /// Changes the sweep radius used by later scans.
    pub fn set_trace_radius(&mut self, radius: f32) {
        self.config.trace_radius = radius;
    }

    /// Changes whether the owner is excluded from traces.
    pub fn set_ignore_owner(&mut self, ignore_owner: bool) {
        self.config.ignore_owner = ignore_owner;
    }

    /// Changes the hold tick interval used by later holds. A running hold
    /// keeps ticking at the interval it started with.
    pub fn set_hold_tick_interval(&mut self, interval: f32) {
        self.config.hold_tick_interval = interval;
    }

    // ---- accessors ---------------------------------------------------------

    /// Returns true while scanning is enabled.
    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Returns true if the debug overlay is requested.
    #[must_use]
    pub fn is_debug_overlay_enabled(&self) -> bool {
        self.debug_overlay_enabled
    }

    /// The focused actor, if it is still alive.
    #[must_use]
    pub fn focused_actor(&self) -> Option<ActorRef> {
        self.live_focus()
    }

    /// Id of the focused actor (even if it was destroyed since the last scan).
    #[must_use]
    pub fn focused_id(&self) -> Option<EntityId> {
        self.focused_label.as_ref().map(|label| label.id)
    }

    /// Last query result.
    #[must_use]
    pub fn cached_query(&self) -> &QueryResult {
        &self.cached_query
    }

    /// Returns true while a hold is in progress.
    #[must_use]
    pub fn is_holding(&self) -> bool {
        self.hold.holding
    }

    /// Normalized hold progress, zero when not holding.
    #[must_use]
    pub fn hold_progress(&self) -> f32 {
        self.hold.progress()
    }

    /// Current hold state.
    #[must_use]
    pub fn hold_state(&self) -> HoldState {
        self.hold
    }

    /// Copies the internals the debug presenter shows.
    #[must_use]
    pub fn debug_snapshot(&self, owner: Option<&OwnerView<'_>>) -> InteractionDebugSnapshot {
        InteractionDebugSnapshot {
            owner: owner.map(|owner| ActorLabel::new(owner.id, owner.name)),
            focused: self.live_focus().and(self.focused_label.clone()),
            trace: self.last_trace.clone(),
            query: self.cached_query.clone(),
            enabled: self.enabled,
            holding: self.hold.holding,
            hold_progress: self.hold.progress(),
            scan_interval: self.config.scan_interval,
            trace_distance: self.config.trace_distance,
            trace_radius: self.config.trace_radius,
        }
    }

    // ---- scanning ----------------------------------------------------------

    /// Runs one focus scan now.
    pub fn scan_now(&mut self, ctx: &mut InteractionContext<'_>) {
        if !self.enabled {
            return;
        }

        let Some(candidate) = self.find_interactable_in_view(ctx) else {
            if self.focused.is_some() {
                self.clear_focus(ctx);
            }
            return;
        };

        let same_target = self
            .live_focus()
            .is_some_and(|current| same_actor(&current, &candidate));

        if same_target {
            self.refresh_query(ctx);
        } else {
            self.set_focused(&candidate, ctx);
        }
    }

    fn start_focus_scan(&mut self, ctx: &mut InteractionContext<'_>) {
        ctx.timers.clear_timer(&mut self.scan_timer);
        self.scan_timer = ctx.timers.set_timer(self.config.scan_interval, true);
        if !self.scan_timer.is_valid() {
            warn!(
                "Scan interval {} is not positive, focus scanning is paused",
                self.config.scan_interval
            );
        }
    }

    fn stop_focus_scan(&mut self, ctx: &mut InteractionContext<'_>) {
        ctx.timers.clear_timer(&mut self.scan_timer);
    }

    fn find_interactable_in_view(&mut self, ctx: &InteractionContext<'_>) -> Option<ActorRef> {
        self.last_trace = TraceDebugInfo::default();

        let Some(scene) = ctx.scene else {
            trace!("No scene to trace against");
            return None;
        };
        let owner = ctx.owner?;
        let Some(view) = owner.view_point() else {
            trace!("Owner {} has no view point", owner.name);
            return None;
        };

        let request = TraceRequest {
            start: view.location,
            end: view.point_at(self.config.trace_distance),
            radius: self.config.trace_radius.max(0.0),
            ignored: if self.config.ignore_owner {
                vec![owner.id]
            } else {
                Vec::new()
            },
        };

        self.last_trace.cast = true;
        self.last_trace.start = request.start;
        self.last_trace.end = request.end;
        self.last_trace.radius = request.radius;

        let hit = scene.trace(&request)?;
        let interactable = implements_interactable(&hit.actor);

        self.last_trace.hit = true;
        self.last_trace.impact_point = hit.impact_point;
        self.last_trace.impact_normal = hit.impact_normal;
        self.last_trace.hit_actor = label_of(&hit.actor);
        self.last_trace.hit_was_interactable = interactable;

        interactable.then_some(hit.actor)
    }

    // ---- focus -------------------------------------------------------------

    fn live_focus(&self) -> Option<ActorRef> {
        self.focused.as_ref().and_then(Weak::upgrade)
    }

    fn set_focused(&mut self, target: &ActorRef, ctx: &mut InteractionContext<'_>) {
        self.reset_hold(ctx);

        let interactor = ctx.interactor();
        let previous = self.live_focus();
        let previous_id = self.focused_id();

        if let Some(previous) = previous {
            with_interactable(&previous, |target| target.on_focus_end(&interactor));
        }

        with_interactable(target, |target| target.on_focus_start(&interactor));

        let label = label_of(target);
        let new_id = label.as_ref().map(|label| label.id);
        debug!(
            "Focus {:?} -> {:?}",
            previous_id,
            label.as_ref().map(|label| label.name.as_str())
        );

        self.focused = Some(Rc::downgrade(target));
        self.focused_label = label;
        self.cached_query = query_target(target, &interactor);

        self.events.emit(&InteractionEvent::FocusChanged {
            new: new_id,
            previous: previous_id,
        });
        self.events
            .emit(&InteractionEvent::QueryUpdated(self.cached_query.clone()));
    }

    fn clear_focus(&mut self, ctx: &mut InteractionContext<'_>) {
        self.reset_hold(ctx);

        let previous = self.live_focus();
        let previous_id = self.focused_id();
        let had_focus = self.focused.is_some();

        if let Some(previous) = previous {
            let interactor = ctx.interactor();
            with_interactable(&previous, |target| target.on_focus_end(&interactor));
        } else if had_focus {
            debug!("Focused actor {:?} was destroyed", previous_id);
        }

        self.focused = None;
        self.focused_label = None;
        self.cached_query = QueryResult::hidden();

        if had_focus {
            self.events.emit(&InteractionEvent::FocusChanged {
                new: None,
                previous: previous_id,
            });
            self.events
                .emit(&InteractionEvent::QueryUpdated(self.cached_query.clone()));
        }
    }

    fn refresh_query(&mut self, ctx: &mut InteractionContext<'_>) {
        let Some(target) = self.live_focus() else {
            if self.focused.is_some() {
                self.clear_focus(ctx);
            } else {
                self.cached_query = QueryResult::hidden();
                self.events
                    .emit(&InteractionEvent::QueryUpdated(self.cached_query.clone()));
            }
            return;
        };

        if ctx.owner.is_none() {
            self.clear_focus(ctx);
            return;
        }

        self.cached_query = query_target(&target, &ctx.interactor());
        self.events
            .emit(&InteractionEvent::QueryUpdated(self.cached_query.clone()));
    }

    // ---- press / hold ------------------------------------------------------

    fn execute_press(&mut self, ctx: &mut InteractionContext<'_>) -> Option<InteractionOutcome> {
        let target = self.live_focus()?;
        if ctx.owner.is_none() {
            return None;
        }

        let interactor = ctx.interactor();
        let outcome = with_interactable(&target, |target| target.interact(&interactor));
        match &outcome {
            Some(InteractionOutcome::Unavailable(messages)) => {
                debug!("Interaction unavailable: {}", messages.join(", "));
            }
            Some(outcome) => debug!("Interaction executed: {:?}", outcome),
            None => warn!("Focused actor could not be interacted with"),
        }

        self.refresh_query(ctx);
        outcome
    }

    fn begin_hold(&mut self, duration: f32, ctx: &mut InteractionContext<'_>) {
        if duration <= 0.0 {
            self.execute_press(ctx);
            return;
        }

        let timer = ctx.timers.set_timer(self.config.hold_tick_interval, true);
        if !timer.is_valid() {
            warn!(
                "Hold tick interval {} is not positive, executing immediately",
                self.config.hold_tick_interval
            );
            self.execute_press(ctx);
            return;
        }

        self.hold_timer = timer;
        self.hold = HoldState {
            holding: true,
            elapsed: 0.0,
            duration,
            tick_interval: self.config.hold_tick_interval,
        };
        debug!("Hold started ({duration}s)");
        self.events.emit(&InteractionEvent::HoldProgress(0.0));
    }

    fn tick_hold(&mut self, ctx: &mut InteractionContext<'_>) {
        if !self.hold.holding {
            return;
        }

        if self.live_focus().is_none() {
            self.reset_hold(ctx);
            return;
        }

        self.hold.elapsed += self.hold.tick_interval;

        if self.hold.is_complete() {
            self.events.emit(&InteractionEvent::HoldProgress(1.0));
            self.complete_hold(ctx);
        } else {
            self.events
                .emit(&InteractionEvent::HoldProgress(self.hold.progress()));
        }
    }

    fn complete_hold(&mut self, ctx: &mut InteractionContext<'_>) {
        if !self.hold.holding {
            return;
        }

        debug!("Hold completed");
        self.stop_hold(ctx);
        self.events.emit(&InteractionEvent::HoldCompleted);
        self.execute_press(ctx);
    }

    /// Cancels an in-flight hold without executing.
    fn reset_hold(&mut self, ctx: &mut InteractionContext<'_>) {
        if !self.hold.holding {
            return;
        }

        debug!("Hold cancelled at {:.2}", self.hold.progress());
        self.stop_hold(ctx);
        self.events.emit(&InteractionEvent::HoldReset);
    }

    fn stop_hold(&mut self, ctx: &mut InteractionContext<'_>) {
        self.hold = HoldState::default();
        ctx.timers.clear_timer(&mut self.hold_timer);
        self.events.emit(&InteractionEvent::HoldProgress(0.0));
    }
}

fn same_actor(a: &ActorRef, b: &ActorRef) -> bool {
    Rc::as_ptr(a).cast::<()>() == Rc::as_ptr(b).cast::<()>()
}

fn label_of(actor: &ActorRef) -> Option<ActorLabel> {
    let actor = actor.try_borrow().ok()?;
    Some(ActorLabel::new(actor.id(), actor.name()))
}

fn with_interactable<R>(actor: &ActorRef, f: impl FnOnce(&mut dyn Interactable) -> R) -> Option<R> {
    let mut actor = actor.try_borrow_mut().ok()?;
    actor.as_interactable_mut().map(f)
}

fn query_target(actor: &ActorRef, interactor: &Interactor<'_>) -> QueryResult {
    let result = actor
        .try_borrow()
        .ok()
        .and_then(|actor| actor.as_interactable().map(|target| target.query(interactor)));

    result.unwrap_or_else(|| {
        error!("Focused actor stopped exposing the interactable capability");
        QueryResult::hidden()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::sync::Arc;

    use glam::Vec3;
    use glance_common::{Name, Rotator};

    use crate::actor::{InteractableActor, StateTransitions};
    use crate::data_asset::{InteractionDataAsset, StateDefinition};
    use crate::events::drain;
    use crate::scene::{share, Actor, Collider, CollisionScene, StaticActor};

    type Log = Rc<RefCell<Vec<String>>>;

    /// Interactable that records every call.
    struct Recorder {
        id: EntityId,
        name: String,
        log: Log,
        query: QueryResult,
    }

    impl Recorder {
        fn new(name: &str, log: &Log) -> Self {
            Self {
                id: EntityId::new(),
                name: name.to_string(),
                log: Rc::clone(log),
                query: QueryResult::new(true, "Use", InputMode::Press, 0.0, Vec::new()),
            }
        }
    }

    impl Actor for Recorder {
        fn id(&self) -> EntityId {
            self.id
        }
        fn name(&self) -> &str {
            &self.name
        }
        fn location(&self) -> Vec3 {
            Vec3::ZERO
        }
        fn as_interactable(&self) -> Option<&dyn Interactable> {
            Some(self)
        }
        fn as_interactable_mut(&mut self) -> Option<&mut dyn Interactable> {
            Some(self)
        }
    }

    impl Interactable for Recorder {
        fn query(&self, _interactor: &Interactor<'_>) -> QueryResult {
            self.query.clone()
        }
        fn interact(&mut self, _interactor: &Interactor<'_>) -> InteractionOutcome {
            self.log.borrow_mut().push(format!("interact:{}", self.name));
            InteractionOutcome::Available
        }
        fn on_focus_start(&mut self, _interactor: &Interactor<'_>) {
            self.log.borrow_mut().push(format!("enter:{}", self.name));
        }
        fn on_focus_end(&mut self, _interactor: &Interactor<'_>) {
            self.log.borrow_mut().push(format!("exit:{}", self.name));
        }
    }

    const NORTH: f32 = 0.0;
    const EAST: f32 = 90.0;
    const SOUTH: f32 = 180.0;

    struct Harness {
        timers: TimerManager,
        scene: CollisionScene,
        keyring: Keyring,
        owner_id: EntityId,
        yaw: f32,
        component: InteractionComponent,
        events: Receiver<InteractionEvent>,
    }

    impl Harness {
        fn new(config: InteractionConfig) -> Self {
            let mut scene = CollisionScene::new();
            let owner = share(StaticActor::new("Player", Vec3::ZERO));
            let owner_id = scene.add(
                owner,
                Collider::Sphere {
                    center: Vec3::ZERO,
                    radius: 20.0,
                },
            );

            let mut component = InteractionComponent::with_config(config);
            let events = component.subscribe();
            let mut harness = Self {
                timers: TimerManager::new(),
                scene,
                keyring: Keyring::new(),
                owner_id,
                yaw: NORTH,
                component,
                events,
            };
            harness.with(|component, ctx| component.begin_play(ctx));
            harness
        }

        fn with<R>(&mut self, f: impl FnOnce(&mut InteractionComponent, &mut InteractionContext<'_>) -> R) -> R {
            let Self {
                timers,
                scene,
                keyring,
                owner_id,
                yaw,
                component,
                ..
            } = self;
            let view = ViewPoint::new(Vec3::ZERO, Rotator::new(0.0, *yaw, 0.0));
            let owner = OwnerView::controlled(*owner_id, "Player", view).with_keyring(keyring);
            let mut ctx = InteractionContext::new(timers, Some(&*scene), Some(owner));
            f(component, &mut ctx)
        }

        /// Runs `f` against a context with the scene optionally removed and
        /// the owner replaced.
        fn with_partial<R>(
            &mut self,
            keep_scene: bool,
            owner: Option<OwnerView<'static>>,
            f: impl FnOnce(&mut InteractionComponent, &mut InteractionContext<'_>) -> R,
        ) -> R {
            let Self {
                timers,
                scene,
                component,
                ..
            } = self;
            let scene: Option<&dyn SceneQuery> = if keep_scene { Some(&*scene) } else { None };
            let mut ctx = InteractionContext::new(timers, scene, owner);
            f(component, &mut ctx)
        }

        fn advance(&mut self, dt: f32) {
            self.timers.advance(dt);
            while let Some(handle) = self.timers.next_due() {
                self.with(|component, ctx| component.handle_timer(handle, ctx));
            }
        }

        fn look(&mut self, yaw: f32) {
            self.yaw = yaw;
            self.with(|component, ctx| component.scan_now(ctx));
        }

        fn place(&mut self, actor: ActorRef, at: Vec3) -> EntityId {
            self.scene.add(actor, Collider::cuboid(at, Vec3::splat(10.0)))
        }

        fn events(&self) -> Vec<InteractionEvent> {
            drain(&self.events)
        }
    }

    fn quiet_config() -> InteractionConfig {
        InteractionConfig {
            scan_interval: 100.0,
            ..InteractionConfig::default()
        }
    }

    fn focus_changes(events: &[InteractionEvent]) -> Vec<(Option<EntityId>, Option<EntityId>)> {
        events
            .iter()
            .filter_map(|event| match event {
                InteractionEvent::FocusChanged { new, previous } => Some((*new, *previous)),
                _ => None,
            })
            .collect()
    }

    fn query_updates(events: &[InteractionEvent]) -> usize {
        events
            .iter()
            .filter(|event| matches!(event, InteractionEvent::QueryUpdated(_)))
            .count()
    }

    fn hold_events(events: &[InteractionEvent]) -> Vec<InteractionEvent> {
        events
            .iter()
            .filter(|event| !matches!(event, InteractionEvent::QueryUpdated(_)))
            .cloned()
            .collect()
    }

    fn valve_asset(duration: f32) -> Arc<InteractionDataAsset> {
        Arc::new(
            InteractionDataAsset::new("Valve")
                .with_state(StateDefinition::new("Shut", "Turn").with_hold(duration))
                .with_state(StateDefinition::new("Opened", "Turn back").with_hold(duration)),
        )
    }

    #[test]
    fn test_config_defaults() {
        let config = InteractionConfig::default();
        assert!((config.scan_interval - 0.05).abs() < f32::EPSILON);
        assert!((config.trace_distance - 500.0).abs() < f32::EPSILON);
        assert!(config.trace_radius <= 0.0);
        assert!(config.ignore_owner);
        assert!((config.hold_tick_interval - 0.02).abs() < f32::EPSILON);
    }

    #[test]
    fn test_owner_view_preference() {
        let controller = ViewPoint::new(Vec3::new(0.0, 0.0, 160.0), Rotator::default());
        let eyes = ViewPoint::new(Vec3::new(0.0, 0.0, 150.0), Rotator::new(0.0, 90.0, 0.0));
        let id = EntityId::from_raw(1);

        let controlled = OwnerView::controlled(id, "Pawn", controller).with_eyes(eyes);
        assert_eq!(controlled.view_point(), Some(controller));

        let mut uncontrolled = OwnerView::new(id, "Turret").with_eyes(eyes);
        uncontrolled.controller_view = Some(controller);
        assert_eq!(uncontrolled.view_point(), Some(eyes));

        assert_eq!(OwnerView::new(id, "Ghost").view_point(), None);
    }

    #[test]
    fn test_focus_transition_sequence() {
        let log: Log = Rc::default();
        let mut harness = Harness::new(quiet_config());
        let a = harness.place(share(Recorder::new("A", &log)), Vec3::new(100.0, 0.0, 0.0));
        let b = harness.place(share(Recorder::new("B", &log)), Vec3::new(0.0, 100.0, 0.0));

        for yaw in [NORTH, NORTH, EAST, SOUTH, EAST] {
            harness.look(yaw);
        }

        assert_eq!(
            *log.borrow(),
            vec!["enter:A", "exit:A", "enter:B", "exit:B", "enter:B"]
        );

        let events = harness.events();
        assert_eq!(
            focus_changes(&events),
            vec![
                (Some(a), None),
                (Some(b), Some(a)),
                (None, Some(b)),
                (Some(b), None),
            ]
        );
        // One cache update per transition plus the same-target refresh
        assert_eq!(query_updates(&events), 5);
    }

    #[test]
    fn test_focus_changed_precedes_query_updated() {
        let log: Log = Rc::default();
        let mut harness = Harness::new(quiet_config());
        harness.place(share(Recorder::new("A", &log)), Vec3::new(100.0, 0.0, 0.0));

        harness.look(NORTH);
        let events = harness.events();
        assert!(matches!(events[0], InteractionEvent::FocusChanged { .. }));
        assert!(matches!(&events[1], InteractionEvent::QueryUpdated(query) if query.show_prompt));
        assert_eq!(harness.component.cached_query().prompt_text, "Use");
    }

    #[test]
    fn test_scan_timer_drives_focus() {
        let log: Log = Rc::default();
        let mut harness = Harness::new(InteractionConfig::default());
        harness.place(share(Recorder::new("A", &log)), Vec3::new(100.0, 0.0, 0.0));

        assert!(harness.component.focused_actor().is_none());
        harness.advance(0.05);
        assert!(harness.component.focused_actor().is_some());

        harness.yaw = SOUTH;
        harness.advance(0.05);
        assert!(harness.component.focused_actor().is_none());
        assert!(!harness.component.cached_query().show_prompt);
    }

    #[test]
    fn test_nearer_blocker_occludes() {
        let log: Log = Rc::default();
        let mut harness = Harness::new(quiet_config());
        harness.place(share(StaticActor::new("Wall", Vec3::new(50.0, 0.0, 0.0))), Vec3::new(50.0, 0.0, 0.0));
        harness.place(share(Recorder::new("A", &log)), Vec3::new(200.0, 0.0, 0.0));

        harness.look(NORTH);
        assert!(harness.component.focused_actor().is_none());
        assert!(log.borrow().is_empty());

        let snapshot = harness.component.debug_snapshot(None);
        assert!(snapshot.trace.hit);
        assert!(!snapshot.trace.hit_was_interactable);
        assert_eq!(snapshot.trace.hit_actor.map(|label| label.name), Some("Wall".to_string()));
    }

    #[test]
    fn test_owner_is_ignored_only_when_configured() {
        let log: Log = Rc::default();
        let mut harness = Harness::new(quiet_config());
        harness.place(share(Recorder::new("A", &log)), Vec3::new(100.0, 0.0, 0.0));

        harness.look(NORTH);
        assert!(harness.component.focused_actor().is_some());

        harness.component.set_ignore_owner(false);
        harness.look(NORTH);
        assert!(harness.component.focused_actor().is_none());
    }

    #[test]
    fn test_out_of_range_target() {
        let log: Log = Rc::default();
        let mut harness = Harness::new(quiet_config());
        harness.place(share(Recorder::new("Far", &log)), Vec3::new(800.0, 0.0, 0.0));

        harness.look(NORTH);
        assert!(harness.component.focused_actor().is_none());

        harness.component.set_trace_distance(1000.0);
        harness.look(NORTH);
        assert!(harness.component.focused_actor().is_some());
    }

    #[test]
    fn test_press_executes_and_refreshes() {
        let asset = Arc::new(
            InteractionDataAsset::new("Door")
                .with_state(StateDefinition::new("Closed", "Open"))
                .with_state(StateDefinition::new("Open", "Close")),
        );
        let mut door = InteractableActor::new(
            "Door",
            Vec3::new(100.0, 0.0, 0.0),
            Some(asset),
            StateTransitions::toggle("Closed", "Open"),
        );
        door.begin_play();
        let door = Rc::new(RefCell::new(door));

        let mut harness = Harness::new(quiet_config());
        harness.place(door.clone(), Vec3::new(100.0, 0.0, 0.0));
        harness.look(NORTH);
        harness.events();

        harness.with(|component, ctx| component.begin_interact(ctx));

        assert_eq!(door.borrow().current_state_id(), Name::new("Open"));
        assert_eq!(harness.component.cached_query().prompt_text, "Close");
        let events = harness.events();
        assert_eq!(events.len(), 1);
        assert!(matches!(&events[0], InteractionEvent::QueryUpdated(query) if query.prompt_text == "Close"));
    }

    #[test]
    fn test_hold_completes_after_duration() {
        let valve = Rc::new(RefCell::new(InteractableActor::new(
            "Valve",
            Vec3::new(100.0, 0.0, 0.0),
            Some(valve_asset(2.0)),
            StateTransitions::new().with("Shut", "Opened"),
        )));
        valve.borrow_mut().begin_play();

        let mut harness = Harness::new(InteractionConfig {
            hold_tick_interval: 0.5,
            ..quiet_config()
        });
        harness.place(valve.clone(), Vec3::new(100.0, 0.0, 0.0));
        harness.look(NORTH);
        harness.events();

        harness.with(|component, ctx| component.begin_interact(ctx));
        assert!(harness.component.is_holding());

        for _ in 0..3 {
            harness.advance(0.5);
        }
        assert!((harness.component.hold_progress() - 0.75).abs() < 1e-5);
        assert_eq!(valve.borrow().current_state_id(), Name::new("Shut"));

        harness.advance(0.5);
        assert!(!harness.component.is_holding());
        assert_eq!(harness.component.hold_progress(), 0.0);
        assert_eq!(valve.borrow().current_state_id(), Name::new("Opened"));

        let events = harness.events();
        assert_eq!(
            hold_events(&events),
            vec![
                InteractionEvent::HoldProgress(0.0),
                InteractionEvent::HoldProgress(0.25),
                InteractionEvent::HoldProgress(0.5),
                InteractionEvent::HoldProgress(0.75),
                InteractionEvent::HoldProgress(1.0),
                InteractionEvent::HoldProgress(0.0),
                InteractionEvent::HoldCompleted,
            ]
        );
        assert!(matches!(events.last(), Some(InteractionEvent::QueryUpdated(query)) if query.prompt_text == "Turn back"));

        // The hold timer is gone
        harness.advance(2.0);
        assert!(hold_events(&harness.events()).is_empty());
    }

    #[test]
    fn test_release_cancels_hold() {
        let mut valve = InteractableActor::new("Valve", Vec3::new(100.0, 0.0, 0.0), Some(valve_asset(1.0)), ());
        valve.begin_play();
        let valve = share(valve);

        let mut harness = Harness::new(InteractionConfig {
            hold_tick_interval: 0.25,
            ..quiet_config()
        });
        harness.place(valve, Vec3::new(100.0, 0.0, 0.0));
        harness.look(NORTH);
        harness.events();

        harness.with(|component, ctx| component.begin_interact(ctx));
        harness.advance(0.25);
        harness.with(|component, ctx| component.end_interact(ctx));
        harness.advance(2.0);

        assert_eq!(
            hold_events(&harness.events()),
            vec![
                InteractionEvent::HoldProgress(0.0),
                InteractionEvent::HoldProgress(0.25),
                InteractionEvent::HoldProgress(0.0),
                InteractionEvent::HoldReset,
            ]
        );
        assert!(!harness.component.is_holding());
    }

    #[test]
    fn test_focus_loss_cancels_hold() {
        let log: Log = Rc::default();
        let mut crank = Recorder::new("Crank", &log);
        crank.query = QueryResult::new(true, "Crank", InputMode::Hold, 1.0, Vec::new());

        let mut harness = Harness::new(InteractionConfig {
            hold_tick_interval: 0.25,
            ..quiet_config()
        });
        let crank = harness.place(share(crank), Vec3::new(100.0, 0.0, 0.0));
        harness.look(NORTH);
        harness.with(|component, ctx| component.begin_interact(ctx));
        harness.advance(0.25);
        harness.events();

        harness.look(SOUTH);
        harness.advance(2.0);

        let events = harness.events();
        assert_eq!(
            &events[..3],
            &[
                InteractionEvent::HoldProgress(0.0),
                InteractionEvent::HoldReset,
                InteractionEvent::FocusChanged {
                    new: None,
                    previous: Some(crank),
                },
            ]
        );
        assert_eq!(
            events
                .iter()
                .filter(|event| matches!(event, InteractionEvent::HoldProgress(_)))
                .count(),
            1
        );
        assert!(!log.borrow().iter().any(|entry| entry.starts_with("interact")));
    }

    #[test]
    fn test_destroyed_target_cancels_hold_and_clears_focus() {
        let log: Log = Rc::default();
        let mut crank = Recorder::new("Crank", &log);
        crank.query = QueryResult::new(true, "Crank", InputMode::Hold, 1.0, Vec::new());

        let mut harness = Harness::new(InteractionConfig {
            hold_tick_interval: 0.25,
            ..quiet_config()
        });
        let id = harness.place(share(crank), Vec3::new(100.0, 0.0, 0.0));
        harness.look(NORTH);
        harness.with(|component, ctx| component.begin_interact(ctx));
        harness.events();

        drop(harness.scene.remove(id));
        harness.advance(0.25);
        assert!(!harness.component.is_holding());
        assert_eq!(
            harness.events(),
            vec![InteractionEvent::HoldProgress(0.0), InteractionEvent::HoldReset]
        );

        harness.look(NORTH);
        assert_eq!(
            focus_changes(&harness.events()),
            vec![(None, Some(id))]
        );
        assert!(harness.component.focused_id().is_none());
    }

    #[test]
    fn test_zero_duration_hold_executes_immediately() {
        let log: Log = Rc::default();
        let mut lever = Recorder::new("Lever", &log);
        lever.query = QueryResult::new(true, "Pull", InputMode::Hold, 0.0, Vec::new());

        let mut harness = Harness::new(quiet_config());
        harness.place(share(lever), Vec3::new(100.0, 0.0, 0.0));
        harness.look(NORTH);
        harness.with(|component, ctx| component.begin_interact(ctx));

        assert!(!harness.component.is_holding());
        assert_eq!(log.borrow().last().map(String::as_str), Some("interact:Lever"));
    }

    #[test]
    fn test_begin_interact_ignored_without_focus_or_while_holding() {
        let log: Log = Rc::default();
        let mut crank = Recorder::new("Crank", &log);
        crank.query = QueryResult::new(true, "Crank", InputMode::Hold, 1.0, Vec::new());

        let mut harness = Harness::new(quiet_config());
        harness.with(|component, ctx| component.begin_interact(ctx));
        assert!(harness.events().is_empty());

        harness.place(share(crank), Vec3::new(100.0, 0.0, 0.0));
        harness.look(NORTH);
        harness.with(|component, ctx| component.begin_interact(ctx));
        harness.events();
        harness.with(|component, ctx| component.begin_interact(ctx));
        assert!(harness.events().is_empty());
        assert!(harness.component.is_holding());
    }

    #[test]
    fn test_disable_and_enable() {
        let log: Log = Rc::default();
        let mut harness = Harness::new(InteractionConfig::default());
        let a = harness.place(share(Recorder::new("A", &log)), Vec3::new(100.0, 0.0, 0.0));
        harness.advance(0.05);
        harness.events();

        harness.with(|component, ctx| component.disable(ctx));
        assert!(!harness.component.is_enabled());
        assert_eq!(focus_changes(&harness.events()), vec![(None, Some(a))]);

        // No scans while disabled
        harness.advance(1.0);
        assert!(harness.events().is_empty());
        harness.with(|component, ctx| component.begin_interact(ctx));
        assert!(!log.borrow().iter().any(|entry| entry.starts_with("interact")));

        // Enabling scans immediately
        harness.with(|component, ctx| component.toggle(ctx));
        assert!(harness.component.is_enabled());
        assert_eq!(focus_changes(&harness.events()), vec![(Some(a), None)]);
        assert_eq!(*log.borrow(), vec!["enter:A", "exit:A", "enter:A"]);
    }

    #[test]
    fn test_end_play_tears_down_even_when_disabled() {
        let log: Log = Rc::default();
        let mut harness = Harness::new(quiet_config());
        harness.place(share(Recorder::new("A", &log)), Vec3::new(100.0, 0.0, 0.0));
        harness.look(NORTH);

        harness.with(|component, ctx| component.end_play(ctx));
        assert!(harness.component.focused_actor().is_none());
        assert_eq!(harness.timers.active_count(), 0);
        assert_eq!(log.borrow().last().map(String::as_str), Some("exit:A"));
    }

    #[test]
    fn test_set_scan_interval_restarts_timer() {
        let log: Log = Rc::default();
        let mut harness = Harness::new(quiet_config());
        harness.place(share(Recorder::new("A", &log)), Vec3::new(100.0, 0.0, 0.0));

        harness.advance(1.0);
        assert!(harness.component.focused_actor().is_none());

        harness.with(|component, ctx| component.set_scan_interval(0.1, ctx));
        harness.advance(0.1);
        assert!(harness.component.focused_actor().is_some());
    }

    #[test]
    fn test_scan_interval_resumes_after_pause() {
        let log: Log = Rc::default();
        let mut harness = Harness::new(quiet_config());
        harness.place(share(Recorder::new("A", &log)), Vec3::new(100.0, 0.0, 0.0));

        harness.with(|component, ctx| component.set_scan_interval(0.0, ctx));
        harness.advance(1.0);
        assert!(harness.component.focused_actor().is_none());

        harness.with(|component, ctx| component.set_scan_interval(0.1, ctx));
        harness.advance(0.1);
        assert!(harness.component.focused_actor().is_some());
        assert!(harness.component.is_enabled());
    }

    #[test]
    fn test_paused_begin_play_resumes_on_interval_change() {
        let log: Log = Rc::default();
        let mut harness = Harness::new(InteractionConfig {
            scan_interval: 0.0,
            ..InteractionConfig::default()
        });
        harness.place(share(Recorder::new("A", &log)), Vec3::new(100.0, 0.0, 0.0));

        harness.advance(1.0);
        assert!(harness.component.focused_actor().is_none());

        harness.with(|component, ctx| component.set_scan_interval(0.05, ctx));
        harness.advance(0.05);
        assert!(harness.component.focused_actor().is_some());
    }

    #[test]
    fn test_scan_interval_change_while_disabled_does_not_scan() {
        let log: Log = Rc::default();
        let mut harness = Harness::new(quiet_config());
        harness.place(share(Recorder::new("A", &log)), Vec3::new(100.0, 0.0, 0.0));

        harness.with(|component, ctx| component.disable(ctx));
        harness.with(|component, ctx| component.set_scan_interval(0.1, ctx));
        harness.advance(1.0);
        assert!(harness.component.focused_actor().is_none());
        assert!(log.borrow().is_empty());
    }

    #[test]
    fn test_hold_keeps_its_tick_interval() {
        let log: Log = Rc::default();
        let mut crank = Recorder::new("Crank", &log);
        crank.query = QueryResult::new(true, "Crank", InputMode::Hold, 1.0, Vec::new());

        let mut harness = Harness::new(InteractionConfig {
            hold_tick_interval: 0.25,
            ..quiet_config()
        });
        harness.place(share(crank), Vec3::new(100.0, 0.0, 0.0));
        harness.look(NORTH);
        harness.with(|component, ctx| component.begin_interact(ctx));
        harness.advance(0.25);

        harness.component.set_hold_tick_interval(0.5);
        harness.advance(0.5);
        assert!(harness.component.is_holding());
        assert!((harness.component.hold_state().elapsed - 0.75).abs() < 1e-5);
        assert!(!log.borrow().iter().any(|entry| entry == "interact:Crank"));

        harness.advance(0.25);
        assert!(!harness.component.is_holding());
        assert_eq!(log.borrow().last().map(String::as_str), Some("interact:Crank"));

        // The next hold picks up the new interval
        harness.with(|component, ctx| component.begin_interact(ctx));
        assert!((harness.component.hold_state().tick_interval - 0.5).abs() < f32::EPSILON);
    }

    fn assert_degraded_to_nothing(harness: &Harness, log: &Log, a: EntityId) {
        let events = harness.events();
        assert_eq!(focus_changes(&events), vec![(None, Some(a))]);
        assert_eq!(log.borrow().last().map(String::as_str), Some("exit:A"));
        assert!(harness.component.focused_actor().is_none());
        assert_eq!(*harness.component.cached_query(), QueryResult::hidden());
    }

    #[test]
    fn test_missing_scene_clears_focus() {
        let log: Log = Rc::default();
        let mut harness = Harness::new(quiet_config());
        let a = harness.place(share(Recorder::new("A", &log)), Vec3::new(100.0, 0.0, 0.0));
        harness.look(NORTH);
        harness.events();

        let owner_id = harness.owner_id;
        let view = ViewPoint::new(Vec3::ZERO, Rotator::new(0.0, NORTH, 0.0));
        harness.with_partial(false, Some(OwnerView::controlled(owner_id, "Player", view)), |component, ctx| {
            component.scan_now(ctx);
        });

        assert_degraded_to_nothing(&harness, &log, a);
    }

    #[test]
    fn test_missing_owner_clears_focus() {
        let log: Log = Rc::default();
        let mut harness = Harness::new(quiet_config());
        let a = harness.place(share(Recorder::new("A", &log)), Vec3::new(100.0, 0.0, 0.0));
        harness.look(NORTH);
        harness.events();

        harness.with_partial(true, None, |component, ctx| component.scan_now(ctx));

        assert_degraded_to_nothing(&harness, &log, a);
    }

    #[test]
    fn test_owner_without_view_point_clears_focus() {
        let log: Log = Rc::default();
        let mut harness = Harness::new(quiet_config());
        let a = harness.place(share(Recorder::new("A", &log)), Vec3::new(100.0, 0.0, 0.0));
        harness.look(NORTH);
        harness.events();

        let owner_id = harness.owner_id;
        harness.with_partial(true, Some(OwnerView::new(owner_id, "Player")), |component, ctx| {
            component.scan_now(ctx);
        });

        assert_degraded_to_nothing(&harness, &log, a);
    }

    #[test]
    fn test_press_without_owner_does_nothing() {
        let log: Log = Rc::default();
        let mut harness = Harness::new(quiet_config());
        harness.place(share(Recorder::new("A", &log)), Vec3::new(100.0, 0.0, 0.0));
        harness.look(NORTH);
        harness.events();

        harness.with_partial(true, None, |component, ctx| component.begin_interact(ctx));

        assert!(!log.borrow().iter().any(|entry| entry == "interact:A"));
        assert!(harness.component.focused_actor().is_some());
    }

    #[test]
    fn test_keyed_door_through_component() {
        let asset = Arc::new(
            InteractionDataAsset::new("Door")
                .with_state(
                    StateDefinition::new("Closed", "Open").with_requirement(
                        crate::requirements::KeyRequirement::new("RedKey", "Red Key", "Need red key"),
                    ),
                )
                .with_state(StateDefinition::new("Open", "Close"))
                .with_default_state("Closed"),
        );
        let door = Rc::new(RefCell::new(InteractableActor::new(
            "Door",
            Vec3::new(100.0, 0.0, 0.0),
            Some(asset),
            StateTransitions::toggle("Closed", "Open"),
        )));
        door.borrow_mut().begin_play();

        let mut harness = Harness::new(quiet_config());
        harness.place(door.clone(), Vec3::new(100.0, 0.0, 0.0));
        harness.look(NORTH);

        let query = harness.component.cached_query().clone();
        assert!(!query.is_available());
        assert_eq!(query.unmet_requirement_messages, vec!["Need red key".to_string()]);

        harness.with(|component, ctx| component.begin_interact(ctx));
        assert_eq!(door.borrow().current_state_id(), Name::new("Closed"));

        harness.keyring.add_key(Name::new("RedKey"));
        harness.look(NORTH);
        assert!(harness.component.cached_query().is_available());
        harness.with(|component, ctx| component.begin_interact(ctx));
        assert_eq!(door.borrow().current_state_id(), Name::new("Open"));
    }

    #[test]
    fn test_debug_overlay_toggle_and_snapshot() {
        let log: Log = Rc::default();
        let mut harness = Harness::new(quiet_config());
        harness.place(share(Recorder::new("A", &log)), Vec3::new(100.0, 0.0, 0.0));
        harness.look(NORTH);

        assert!(harness.component.toggle_debug_overlay());
        assert!(harness.component.is_debug_overlay_enabled());

        let owner = OwnerView::new(harness.owner_id, "Player");
        let snapshot = harness.component.debug_snapshot(Some(&owner));
        assert_eq!(snapshot.owner.map(|label| label.name), Some("Player".to_string()));
        assert_eq!(snapshot.focused.map(|label| label.name), Some("A".to_string()));
        assert!(snapshot.trace.cast && snapshot.trace.hit_was_interactable);
        assert!((snapshot.trace.end.x - 500.0).abs() < 1e-3);

        assert!(!harness.component.toggle_debug_overlay());
    }
}
