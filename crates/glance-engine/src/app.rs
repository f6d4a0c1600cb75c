//! Application lifecycle management.
//!
//! Builds the demo level, drives it with an input script on a fixed-step
//! clock, and reports what happened.
//!
//! The level, seen from the player at the origin:
//! - yaw 0: a door locked by the red key
//! - yaw 90: a valve that must be held
//! - yaw 180: a guard NPC
//! - yaw 270: a wall hiding a chest

use std::cell::RefCell;
use std::collections::{BTreeMap, HashMap};
use std::rc::{Rc, Weak};

use anyhow::{Context as _, Result};
use crossbeam_channel::Receiver;
use glam::Vec3;
use serde::Serialize;
use tracing::{debug, info, trace, warn};

use glance_common::{EntityId, Rotator, ViewPoint};
use glance_gameplay::{
    drain, share, ActorRef, ActorSignal, Collider, CollisionScene, InteractableActor,
    InteractableNpc, InteractionComponent, InteractionContext, InteractionEvent, Keyring, OwnerView,
    StateTransitions, StaticActor, TimerManager,
};
use glance_tools::InteractionDebugPresenter;

use crate::asset_loader::AssetLoader;
use crate::config::GlanceConfig;
use crate::script::{InputAction, InputScript};
use crate::timing::SimulationClock;

/// Display name of the player.
const PLAYER_NAME: &str = "Player";

/// Radius of the player's collision sphere.
const PLAYER_RADIUS: f32 = 40.0;

/// What a demo run observed.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DemoSummary {
    /// Simulated seconds
    pub simulated_seconds: f64,
    /// Fixed steps performed
    pub steps: u64,
    /// Focus changes observed
    pub focus_changes: usize,
    /// Query cache updates observed
    pub query_updates: usize,
    /// Holds that completed
    pub holds_completed: usize,
    /// Holds that were cancelled
    pub holds_reset: usize,
    /// Interactions executed with requirements met
    pub interactions_available: usize,
    /// Interactions executed with unmet requirements
    pub interactions_unavailable: usize,
    /// Lines spoken by NPCs, in order
    pub npc_lines: Vec<String>,
    /// State of every surviving interactable, by actor name
    pub final_states: BTreeMap<String, String>,
}

/// The player pawn.
#[derive(Debug)]
struct Player {
    id: EntityId,
    location: Vec3,
    rotation: Rotator,
    keyring: Keyring,
}

impl Player {
    fn view(&self) -> ViewPoint {
        ViewPoint::new(self.location, self.rotation)
    }
}

/// A generic interactable the level keeps an eye on.
struct TrackedActor {
    name: String,
    asset: String,
    actor: Weak<RefCell<InteractableActor<StateTransitions>>>,
}

/// Where actor signals come from.
struct SignalSource {
    name: String,
    receiver: Receiver<ActorSignal>,
    npc: Option<Weak<RefCell<InteractableNpc>>>,
}

/// The demo level and everything driving it.
pub struct DemoLevel {
    config: GlanceConfig,
    loader: AssetLoader,
    scene: CollisionScene,
    timers: TimerManager,
    player: Player,
    component: InteractionComponent,
    presenter: InteractionDebugPresenter,
    events: Receiver<InteractionEvent>,
    actors: HashMap<String, EntityId>,
    names: HashMap<EntityId, String>,
    tracked: Vec<TrackedActor>,
    npcs: Vec<Weak<RefCell<InteractableNpc>>>,
    signals: Vec<SignalSource>,
    summary: DemoSummary,
}

impl DemoLevel {
    /// Loads assets and builds the level.
    pub fn new(config: GlanceConfig) -> Result<Self> {
        let mut loader = AssetLoader::new(&config.asset_dir);
        loader.set_hot_reload(config.hot_reload);
        loader
            .load_all()
            .with_context(|| format!("loading assets from {}", config.asset_dir.display()))?;
        if loader.registry().is_empty() {
            warn!("No interaction assets in {}, actors will be inert", config.asset_dir.display());
        } else {
            info!("Interaction assets: {}", loader.registry().names().join(", "));
        }

        let mut component = InteractionComponent::with_config(config.interaction.clone());
        let events = component.subscribe();

        let mut level = Self {
            presenter: InteractionDebugPresenter::with_config(config.debug.clone()),
            config,
            loader,
            scene: CollisionScene::new(),
            timers: TimerManager::new(),
            player: Player {
                id: EntityId::NULL,
                location: Vec3::ZERO,
                rotation: Rotator::default(),
                keyring: Keyring::new(),
            },
            component,
            events,
            actors: HashMap::new(),
            names: HashMap::new(),
            tracked: Vec::new(),
            npcs: Vec::new(),
            signals: Vec::new(),
            summary: DemoSummary::default(),
        };
        level.populate();
        Ok(level)
    }

    fn populate(&mut self) {
        let player = share(StaticActor::new(PLAYER_NAME, Vec3::ZERO));
        self.player.id = self.register(
            PLAYER_NAME,
            player,
            Collider::Sphere {
                center: Vec3::ZERO,
                radius: PLAYER_RADIUS,
            },
        );

        self.spawn_interactable(
            "Door",
            "door",
            Collider::cuboid(Vec3::new(300.0, 0.0, 0.0), Vec3::new(10.0, 60.0, 100.0)),
            StateTransitions::toggle("Closed", "Open"),
        );
        self.spawn_interactable(
            "Valve",
            "valve",
            Collider::Sphere {
                center: Vec3::new(0.0, 300.0, 0.0),
                radius: 20.0,
            },
            StateTransitions::toggle("Shut", "Opened"),
        );
        self.spawn_npc(
            "Guard",
            "guard",
            Collider::Sphere {
                center: Vec3::new(-300.0, 0.0, 0.0),
                radius: 40.0,
            },
        );

        let wall_at = Vec3::new(0.0, -200.0, 0.0);
        self.register(
            "Wall",
            share(StaticActor::new("Wall", wall_at)),
            Collider::cuboid(wall_at, Vec3::new(150.0, 10.0, 150.0)),
        );
        self.spawn_interactable(
            "Chest",
            "chest",
            Collider::cuboid(Vec3::new(0.0, -400.0, 0.0), Vec3::new(30.0, 20.0, 20.0)),
            StateTransitions::toggle("Closed", "Open"),
        );

        info!("Demo level has {} actors", self.scene.len());
    }

    fn register(&mut self, name: &str, actor: ActorRef, collider: Collider) -> EntityId {
        let id = self.scene.add(actor, collider);
        self.actors.insert(name.to_string(), id);
        self.names.insert(id, name.to_string());
        id
    }

    fn spawn_interactable(
        &mut self,
        name: &str,
        asset: &str,
        collider: Collider,
        transitions: StateTransitions,
    ) {
        let data = self.loader.registry().interaction(asset);
        if data.is_none() {
            warn!("Asset '{}' is not loaded, {} has no interaction data", asset, name);
        }

        let mut actor = InteractableActor::new(name, collider_center(&collider), data, transitions);
        actor.begin_play();
        let receiver = actor.subscribe();

        let actor = Rc::new(RefCell::new(actor));
        self.tracked.push(TrackedActor {
            name: name.to_string(),
            asset: asset.to_string(),
            actor: Rc::downgrade(&actor),
        });
        self.signals.push(SignalSource {
            name: name.to_string(),
            receiver,
            npc: None,
        });
        self.register(name, actor, collider);
    }

    fn spawn_npc(&mut self, name: &str, asset: &str, collider: Collider) {
        let data = self.loader.registry().npc(asset);
        if data.is_none() {
            warn!("Asset '{}' is not loaded, {} has nothing to say", asset, name);
        }

        let mut npc = InteractableNpc::new(name, collider_center(&collider), data);
        npc.begin_play();
        let receiver = npc.subscribe();

        let npc = Rc::new(RefCell::new(npc));
        self.npcs.push(Rc::downgrade(&npc));
        self.signals.push(SignalSource {
            name: name.to_string(),
            receiver,
            npc: Some(Rc::downgrade(&npc)),
        });
        self.register(name, npc, collider);
    }

    fn with_component<R>(
        &mut self,
        f: impl FnOnce(&mut InteractionComponent, &mut InteractionContext<'_>) -> R,
    ) -> R {
        let Self {
            timers,
            scene,
            player,
            component,
            ..
        } = self;
        let owner = OwnerView::controlled(player.id, PLAYER_NAME, player.view()).with_keyring(&player.keyring);
        let mut ctx = InteractionContext::new(timers, Some(&*scene), Some(owner));
        f(component, &mut ctx)
    }

    /// Runs the level until the configured duration has been simulated.
    pub fn run(&mut self, script: InputScript) -> DemoSummary {
        let mut clock = SimulationClock::new(self.config.fixed_dt).with_realtime(self.config.realtime);
        let mut cursor = script.cursor();
        let duration = f64::from(self.config.demo_duration);
        let reload_interval = f64::from(self.config.hot_reload_interval);
        let mut next_reload_check = reload_interval;

        if self.config.show_debug_overlay {
            self.toggle_debug();
        }
        self.with_component(|component, ctx| component.begin_play(ctx));
        info!("Running demo for {:.1}s", duration);
        clock.reset();

        while self.timers.now() + 1e-9 < duration {
            for action in cursor.due(self.timers.now()) {
                self.apply(action);
            }

            let dt = clock.frame_delta();
            for _ in 0..clock.accumulate(dt) {
                self.step(clock.fixed_dt());
            }

            if self.config.hot_reload && self.timers.now() >= next_reload_check {
                next_reload_check = self.timers.now() + reload_interval;
                self.check_hot_reload();
            }

            clock.pace();
        }

        if !cursor.is_finished() {
            warn!("{} scripted inputs were after the end of the demo", cursor.remaining());
        }

        self.with_component(|component, ctx| component.end_play(ctx));
        self.drain_notifications();

        let owner = OwnerView::controlled(self.player.id, PLAYER_NAME, self.player.view());
        match serde_json::to_string(&self.component.debug_snapshot(Some(&owner))) {
            Ok(json) => debug!("Final interaction snapshot: {json}"),
            Err(e) => warn!("Failed to serialize interaction snapshot: {e}"),
        }

        self.summary.simulated_seconds = clock.elapsed();
        self.summary.steps = clock.steps();
        self.summary.final_states = self
            .tracked
            .iter()
            .filter_map(|tracked| {
                let actor = tracked.actor.upgrade()?;
                let state = actor.borrow().current_state_id().to_string();
                Some((tracked.name.clone(), state))
            })
            .collect();
        self.summary.clone()
    }

    fn step(&mut self, dt: f32) {
        self.timers.advance(dt);
        while let Some(handle) = self.timers.next_due() {
            self.with_component(|component, ctx| component.handle_timer(handle, ctx));
        }

        let now = self.timers.now();
        for npc in self.npcs.iter().filter_map(Weak::upgrade) {
            npc.borrow_mut().update(now);
        }

        self.drain_notifications();
        self.update_overlay(now);
    }

    fn apply(&mut self, action: InputAction) {
        debug!("Input at {:.2}s: {:?}", self.timers.now(), action);

        match action {
            InputAction::BeginInteract => {
                self.with_component(|component, ctx| component.begin_interact(ctx));
            },
            InputAction::EndInteract => {
                self.with_component(|component, ctx| component.end_interact(ctx));
            },
            InputAction::ToggleInteraction => {
                self.with_component(|component, ctx| component.toggle(ctx));
                info!(
                    "Interaction {}",
                    if self.component.is_enabled() { "enabled" } else { "disabled" }
                );
            },
            InputAction::ToggleDebug => self.toggle_debug(),
            InputAction::Look { yaw, pitch } => {
                self.player.rotation = Rotator::new(pitch, yaw, 0.0);
            },
            InputAction::Move { x, y, z } => {
                self.player.location = Vec3::new(x, y, z);
                self.scene.set_collider(
                    self.player.id,
                    Collider::Sphere {
                        center: self.player.location,
                        radius: PLAYER_RADIUS,
                    },
                );
            },
            InputAction::AddKey { key } => {
                if self.player.keyring.add_key(key) {
                    info!("Picked up {}", key);
                }
            },
            InputAction::RemoveKey { key } => {
                if self.player.keyring.remove_key(key) {
                    info!("Lost {}", key);
                }
            },
            InputAction::DestroyActor { actor } => match self.actors.remove(&actor) {
                Some(id) => {
                    drop(self.scene.remove(id));
                    info!("Destroyed {}", actor);
                },
                None => warn!("No actor named '{}' to destroy", actor),
            },
        }

        self.drain_notifications();
    }

    fn toggle_debug(&mut self) {
        let enabled = self.component.toggle_debug_overlay();
        self.presenter.set_enabled(enabled);
    }

    fn update_overlay(&mut self, now: f64) {
        if !self.presenter.is_enabled() {
            return;
        }

        let owner = OwnerView::controlled(self.player.id, PLAYER_NAME, self.player.view());
        let snapshot = self.component.debug_snapshot(Some(&owner));
        let previous = self.presenter.text().to_string();

        for primitive in self.presenter.update(&snapshot, now) {
            trace!("Draw {:?}", primitive);
        }
        if self.presenter.text() != previous {
            debug!("\n{}", self.presenter.text());
        }
    }

    fn actor_name(&self, id: Option<EntityId>) -> &str {
        id.and_then(|id| self.names.get(&id))
            .map_or("None", String::as_str)
    }

    fn drain_notifications(&mut self) {
        for event in drain(&self.events) {
            match event {
                InteractionEvent::FocusChanged { new, previous } => {
                    self.summary.focus_changes += 1;
                    info!(
                        "Focus: {} -> {}",
                        self.actor_name(previous),
                        self.actor_name(new)
                    );
                },
                InteractionEvent::QueryUpdated(query) => {
                    self.summary.query_updates += 1;
                    if query.show_prompt {
                        debug!(
                            "Prompt '{}' ({:?}, available: {})",
                            query.prompt_text,
                            query.input_mode,
                            query.is_available()
                        );
                    }
                },
                InteractionEvent::HoldProgress(progress) => trace!("Hold progress {:.2}", progress),
                InteractionEvent::HoldReset => {
                    self.summary.holds_reset += 1;
                    info!("Hold cancelled");
                },
                InteractionEvent::HoldCompleted => {
                    self.summary.holds_completed += 1;
                    info!("Hold completed");
                },
            }
        }

        let now = self.timers.now();
        for source in &self.signals {
            for signal in drain(&source.receiver) {
                match signal {
                    ActorSignal::InteractAvailable { .. } => {
                        self.summary.interactions_available += 1;
                        info!("{}: interaction available", source.name);
                    },
                    ActorSignal::InteractUnavailable { messages, .. } => {
                        self.summary.interactions_unavailable += 1;
                        info!("{}: unavailable ({})", source.name, messages.join(", "));
                    },
                    ActorSignal::StateChanged { new, previous } => {
                        info!("{}: {} -> {}", source.name, previous, new);
                    },
                }

                let Some(npc) = source.npc.as_ref().and_then(Weak::upgrade) else {
                    continue;
                };
                let line = npc.borrow().visible_line(now).map(str::to_string);
                if let Some(line) = line {
                    info!("{} says \"{}\"", source.name, line);
                    self.summary.npc_lines.push(line);
                }
            }
        }
    }

    fn check_hot_reload(&mut self) {
        match self.loader.check_hot_reload() {
            Ok(true) => {
                for tracked in &self.tracked {
                    let Some(actor) = tracked.actor.upgrade() else {
                        continue;
                    };
                    match self.loader.registry().interaction(&tracked.asset) {
                        Some(data) => {
                            actor.borrow_mut().refresh_from_asset(data);
                            info!("{} refreshed from '{}'", tracked.name, tracked.asset);
                        },
                        None => warn!("Asset '{}' vanished, {} keeps its old data", tracked.asset, tracked.name),
                    }
                }
            },
            Ok(false) => {},
            Err(e) => warn!("Hot reload failed: {e}"),
        }
    }
}

fn collider_center(collider: &Collider) -> Vec3 {
    match *collider {
        Collider::Sphere { center, .. } => center,
        Collider::Aabb { min, max } => (min + max) * 0.5,
    }
}

/// Loads the input script and runs the demo level.
pub fn run(config: GlanceConfig) -> Result<DemoSummary> {
    let script = match &config.input_script {
        Some(path) => InputScript::load(path)
            .with_context(|| format!("loading input script {}", path.display()))?,
        None => InputScript::demo(),
    };

    let mut level = DemoLevel::new(config)?;
    Ok(level.run(script))
}
