//! Scene actors and the trace primitive used for focus detection.
//!
//! Actors are shared as `Rc<RefCell<dyn Actor>>`. The interaction component
//! keeps only a [`WeakActorRef`] to its focus so that destroying an actor
//! (dropping the last strong reference) is observed as lost focus.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use glam::Vec3;
use glance_common::EntityId;
use tracing::debug;

use crate::interactable::Interactable;

/// Anything that can be placed in a scene.
pub trait Actor {
    /// Stable id.
    fn id(&self) -> EntityId;

    /// Display name.
    fn name(&self) -> &str;

    /// World location.
    fn location(&self) -> Vec3;

    /// The interactable capability, if the actor has one.
    fn as_interactable(&self) -> Option<&dyn Interactable> {
        None
    }

    /// Mutable access to the interactable capability.
    fn as_interactable_mut(&mut self) -> Option<&mut dyn Interactable> {
        None
    }
}

/// Shared handle to a scene actor.
pub type ActorRef = Rc<RefCell<dyn Actor>>;

/// Non-owning handle to a scene actor.
pub type WeakActorRef = Weak<RefCell<dyn Actor>>;

/// Wraps an actor into a shared handle.
pub fn share<A: Actor + 'static>(actor: A) -> ActorRef {
    Rc::new(RefCell::new(actor))
}

/// Capability check: does the actor expose [`Interactable`]?
///
/// An actor that is currently mutably borrowed is reported as not
/// interactable.
#[must_use]
pub fn implements_interactable(actor: &ActorRef) -> bool {
    actor
        .try_borrow()
        .is_ok_and(|actor| actor.as_interactable().is_some())
}

/// A plain blocking actor with no capabilities (walls, crates, props).
#[derive(Debug, Clone)]
pub struct StaticActor {
    id: EntityId,
    name: String,
    location: Vec3,
}

impl StaticActor {
    /// Creates a static actor.
    #[must_use]
    pub fn new(name: impl Into<String>, location: Vec3) -> Self {
        Self {
            id: EntityId::new(),
            name: name.into(),
            location,
        }
    }
}

impl Actor for StaticActor {
    fn id(&self) -> EntityId {
        self.id
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn location(&self) -> Vec3 {
        self.location
    }
}

/// Parameters of a single trace.
#[derive(Debug, Clone, Default)]
pub struct TraceRequest {
    /// Trace start
    pub start: Vec3,
    /// Trace end
    pub end: Vec3,
    /// Sweep radius. Zero or less means a line trace.
    pub radius: f32,
    /// Actors the trace passes through
    pub ignored: Vec<EntityId>,
}

impl TraceRequest {
    /// Returns true when the request describes a sphere sweep.
    #[must_use]
    pub fn is_sweep(&self) -> bool {
        self.radius > 0.0
    }
}

/// The nearest blocking hit of a trace.
#[derive(Clone)]
pub struct TraceHit {
    /// Trace shape center at the moment of impact
    pub location: Vec3,
    /// Contact point on the hit collider
    pub impact_point: Vec3,
    /// Surface normal at the contact point
    pub impact_normal: Vec3,
    /// Distance from the trace start to `location`
    pub distance: f32,
    /// Actor owning the hit collider
    pub actor: ActorRef,
}

impl TraceHit {
    /// Id of the hit actor, or [`EntityId::NULL`] if it is borrowed elsewhere.
    #[must_use]
    pub fn actor_id(&self) -> EntityId {
        self.actor
            .try_borrow()
            .map_or(EntityId::NULL, |actor| actor.id())
    }
}

impl std::fmt::Debug for TraceHit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let actor = self.actor_id();
        f.debug_struct("TraceHit")
            .field("location", &self.location)
            .field("impact_point", &self.impact_point)
            .field("impact_normal", &self.impact_normal)
            .field("distance", &self.distance)
            .field("actor", &actor)
            .finish()
    }
}

/// The raycast primitive.
pub trait SceneQuery {
    /// Casts from `start` to `end` and returns the single nearest blocking hit.
    fn trace(&self, request: &TraceRequest) -> Option<TraceHit>;
}

/// Collision shape of a scene body.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Collider {
    /// Sphere
    Sphere {
        /// Center
        center: Vec3,
        /// Radius
        radius: f32,
    },
    /// Axis-aligned box
    Aabb {
        /// Minimum corner
        min: Vec3,
        /// Maximum corner
        max: Vec3,
    },
}

impl Collider {
    /// Box centered on `center` with the given half extents.
    #[must_use]
    pub fn cuboid(center: Vec3, half_extents: Vec3) -> Self {
        Self::Aabb {
            min: center - half_extents,
            max: center + half_extents,
        }
    }

    /// Intersects a segment with the collider grown by `inflate`.
    ///
    /// Returns the entry distance along `dir` and the entry normal. A start
    /// point already inside yields distance zero and a normal facing back
    /// along the ray.
    fn raycast(&self, origin: Vec3, dir: Vec3, max_distance: f32, inflate: f32) -> Option<(f32, Vec3)> {
        match *self {
            Self::Sphere { center, radius } => {
                let radius = radius + inflate;
                let m = origin - center;
                let b = m.dot(dir);
                let c = m.length_squared() - radius * radius;
                if c > 0.0 && b > 0.0 {
                    return None;
                }
                let discriminant = b * b - c;
                if discriminant < 0.0 {
                    return None;
                }

                let t = -b - discriminant.sqrt();
                if t > max_distance {
                    return None;
                }
                if t <= 0.0 {
                    return Some((0.0, -dir));
                }
                let normal = (origin + dir * t - center).normalize_or_zero();
                Some((t, normal))
            }
            Self::Aabb { min, max } => {
                // Growing the box by the radius is conservative at the corners.
                let min = min - Vec3::splat(inflate);
                let max = max + Vec3::splat(inflate);

                let mut t_min = 0.0_f32;
                let mut t_max = max_distance;
                let mut normal = -dir;

                for axis in 0..3 {
                    let o = origin[axis];
                    let d = dir[axis];
                    if d.abs() < 1e-8 {
                        if o < min[axis] || o > max[axis] {
                            return None;
                        }
                        continue;
                    }

                    let inv = 1.0 / d;
                    let mut near = (min[axis] - o) * inv;
                    let mut far = (max[axis] - o) * inv;
                    let mut sign = -1.0;
                    if near > far {
                        std::mem::swap(&mut near, &mut far);
                        sign = 1.0;
                    }

                    if near > t_min {
                        t_min = near;
                        normal = Vec3::ZERO;
                        normal[axis] = sign;
                    }
                    t_max = t_max.min(far);
                    if t_min > t_max {
                        return None;
                    }
                }

                Some((t_min, normal))
            }
        }
    }
}

struct SceneBody {
    id: EntityId,
    actor: ActorRef,
    collider: Collider,
    blocking: bool,
}

/// Reference scene: a flat list of collider bodies.
#[derive(Default)]
pub struct CollisionScene {
    bodies: Vec<SceneBody>,
}

impl CollisionScene {
    /// Creates an empty scene.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a blocking body.
    pub fn add(&mut self, actor: ActorRef, collider: Collider) -> EntityId {
        self.insert(actor, collider, true)
    }

    /// Adds a body that traces pass through.
    pub fn add_overlap_only(&mut self, actor: ActorRef, collider: Collider) -> EntityId {
        self.insert(actor, collider, false)
    }

    fn insert(&mut self, actor: ActorRef, collider: Collider, blocking: bool) -> EntityId {
        let id = actor.borrow().id();
        self.bodies.push(SceneBody {
            id,
            actor,
            collider,
            blocking,
        });
        id
    }

    /// Removes every body owned by `id` and returns the actor handle.
    ///
    /// If the caller drops the returned handle and holds no other strong
    /// reference, the actor is destroyed.
    pub fn remove(&mut self, id: EntityId) -> Option<ActorRef> {
        let mut removed = None;
        self.bodies.retain(|body| {
            if body.id == id {
                removed = Some(Rc::clone(&body.actor));
                false
            } else {
                true
            }
        });
        if removed.is_some() {
            debug!("Removed actor {} from scene", id);
        }
        removed
    }

    /// Replaces the collider of every body owned by `id`.
    pub fn set_collider(&mut self, id: EntityId, collider: Collider) -> bool {
        let mut found = false;
        for body in self.bodies.iter_mut().filter(|body| body.id == id) {
            body.collider = collider;
            found = true;
        }
        found
    }

    /// Finds an actor by id.
    #[must_use]
    pub fn find(&self, id: EntityId) -> Option<ActorRef> {
        self.bodies
            .iter()
            .find(|body| body.id == id)
            .map(|body| Rc::clone(&body.actor))
    }

    /// Number of bodies.
    #[must_use]
    pub fn len(&self) -> usize {
        self.bodies.len()
    }

    /// Returns true if the scene has no bodies.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bodies.is_empty()
    }
}

impl SceneQuery for CollisionScene {
    fn trace(&self, request: &TraceRequest) -> Option<TraceHit> {
        let delta = request.end - request.start;
        let length = delta.length();
        if length <= f32::EPSILON {
            return None;
        }
        let dir = delta / length;
        let radius = request.radius.max(0.0);

        let (body, distance, normal) = self
            .bodies
            .iter()
            .filter(|body| body.blocking && !request.ignored.contains(&body.id))
            .filter_map(|body| {
                body.collider
                    .raycast(request.start, dir, length, radius)
                    .map(|(distance, normal)| (body, distance, normal))
            })
            .min_by(|a, b| a.1.total_cmp(&b.1))?;

        let location = request.start + dir * distance;
        Some(TraceHit {
            location,
            impact_point: location - normal * radius,
            impact_normal: normal,
            distance,
            actor: Rc::clone(&body.actor),
        })
    }
}
