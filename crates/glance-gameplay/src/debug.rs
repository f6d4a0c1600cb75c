//! Point-in-time copies of interaction internals for diagnostics.

use glam::Vec3;
use glance_common::EntityId;
use serde::{Deserialize, Serialize};

use crate::query::QueryResult;

/// An actor as it appears in diagnostics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActorLabel {
    /// Actor id
    pub id: EntityId,
    /// Actor display name
    pub name: String,
}

impl ActorLabel {
    /// Creates a label.
    #[must_use]
    pub fn new(id: EntityId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }
}

/// Geometry and outcome of the most recent focus trace.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TraceDebugInfo {
    /// A trace was actually cast (a view point and scene were available)
    pub cast: bool,
    /// Trace start
    pub start: Vec3,
    /// Trace end
    pub end: Vec3,
    /// Sweep radius (zero for line traces)
    pub radius: f32,
    /// The trace hit something blocking
    pub hit: bool,
    /// The blocking actor that was hit
    pub hit_actor: Option<ActorLabel>,
    /// Contact point of the hit
    pub impact_point: Vec3,
    /// Surface normal of the hit
    pub impact_normal: Vec3,
    /// The hit actor exposes the interactable capability
    pub hit_was_interactable: bool,
}

/// Everything the debug presenter needs, copied out of the component.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InteractionDebugSnapshot {
    /// The scanning actor
    pub owner: Option<ActorLabel>,
    /// Currently focused actor
    pub focused: Option<ActorLabel>,
    /// Last trace
    pub trace: TraceDebugInfo,
    /// Cached query result
    pub query: QueryResult,
    /// Scanning enabled
    pub enabled: bool,
    /// A hold is in progress
    pub holding: bool,
    /// Normalized hold progress
    pub hold_progress: f32,
    /// Scan interval in seconds
    pub scan_interval: f32,
    /// Trace distance
    pub trace_distance: f32,
    /// Trace radius
    pub trace_radius: f32,
}
