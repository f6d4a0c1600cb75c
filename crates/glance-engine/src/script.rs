//! Timed input scripts driving the headless demo.
//!
//! A script is a list of actions stamped with the simulated time they fire
//! at. Scripts are authored in TOML:
//!
//! ```toml
//! version = "1.0.0"
//!
//! [[events]]
//! at = 0.5
//! action = "add_key"
//! key = "RedKey"
//!
//! [[events]]
//! at = 1.0
//! action = "look"
//! yaw = 90.0
//! pitch = 0.0
//! ```

use std::fs;
use std::path::Path;

use glance_common::{Name, SchemaVersion};
use serde::{Deserialize, Serialize};

use crate::asset_loader::{AssetError, AssetResult};

/// One player input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum InputAction {
    /// Press the interact input
    BeginInteract,
    /// Release the interact input
    EndInteract,
    /// Enable or disable focus scanning
    ToggleInteraction,
    /// Show or hide the interaction debug overlay
    ToggleDebug,
    /// Set the view rotation in degrees
    Look {
        /// Yaw in degrees
        yaw: f32,
        /// Pitch in degrees
        #[serde(default)]
        pitch: f32,
    },
    /// Teleport the player
    Move {
        /// X coordinate
        x: f32,
        /// Y coordinate
        y: f32,
        /// Z coordinate
        #[serde(default)]
        z: f32,
    },
    /// Give the player a key
    AddKey {
        /// Key id
        key: Name,
    },
    /// Take a key away from the player
    RemoveKey {
        /// Key id
        key: Name,
    },
    /// Remove an actor from the level
    DestroyActor {
        /// Actor display name
        actor: String,
    },
}

/// An action with its firing time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScriptedInput {
    /// Simulated seconds at which the action fires
    pub at: f64,
    /// The action
    #[serde(flatten)]
    pub action: InputAction,
}

impl ScriptedInput {
    /// Creates a scripted input.
    #[must_use]
    pub fn new(at: f64, action: InputAction) -> Self {
        Self { at, action }
    }
}

/// A timed list of inputs.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InputScript {
    /// File format version.
    #[serde(default = "default_version")]
    pub version: String,
    /// Inputs, fired in time order
    #[serde(default)]
    pub events: Vec<ScriptedInput>,
}

fn default_version() -> String {
    SchemaVersion::INPUT_SCRIPT.to_string()
}

impl InputScript {
    /// Parses a script from TOML text.
    pub fn parse(content: &str) -> AssetResult<Self> {
        let script: Self = toml::from_str(content)?;
        let version: SchemaVersion = script.version.parse()?;
        SchemaVersion::INPUT_SCRIPT.check_readable(&version)?;
        Ok(script)
    }

    /// Loads a script file.
    pub fn load(path: &Path) -> AssetResult<Self> {
        if !path.exists() {
            return Err(AssetError::NotFound(path.to_path_buf()));
        }
        Self::parse(&fs::read_to_string(path)?)
    }

    /// The built-in tour of the demo level.
    ///
    /// Tries the locked door, picks up the red key and opens it, cancels
    /// and then completes the valve hold, talks to the guard, finds the chest
    /// hidden behind the wall, disables interaction and destroys the guard.
    #[must_use]
    pub fn demo() -> Self {
        use InputAction::{AddKey, BeginInteract, DestroyActor, EndInteract, Look, Move, ToggleDebug, ToggleInteraction};

        let events = vec![
            ScriptedInput::new(0.0, ToggleDebug),
            // Locked door
            ScriptedInput::new(0.2, BeginInteract),
            ScriptedInput::new(0.3, EndInteract),
            ScriptedInput::new(0.5, AddKey { key: Name::new("RedKey") }),
            ScriptedInput::new(0.7, BeginInteract),
            ScriptedInput::new(0.8, EndInteract),
            // Valve: released early, then held to completion
            ScriptedInput::new(1.0, Look { yaw: 90.0, pitch: 0.0 }),
            ScriptedInput::new(1.2, BeginInteract),
            ScriptedInput::new(1.6, EndInteract),
            ScriptedInput::new(1.8, BeginInteract),
            ScriptedInput::new(4.2, EndInteract),
            // Guard
            ScriptedInput::new(4.5, Look { yaw: 180.0, pitch: 0.0 }),
            ScriptedInput::new(4.7, BeginInteract),
            ScriptedInput::new(4.8, EndInteract),
            // Chest behind the wall
            ScriptedInput::new(5.0, Look { yaw: 270.0, pitch: 0.0 }),
            ScriptedInput::new(5.2, BeginInteract),
            ScriptedInput::new(5.3, EndInteract),
            ScriptedInput::new(5.5, Move { x: 0.0, y: -250.0, z: 0.0 }),
            ScriptedInput::new(5.8, BeginInteract),
            ScriptedInput::new(5.9, EndInteract),
            // Wind down
            ScriptedInput::new(6.2, ToggleInteraction),
            ScriptedInput::new(6.5, DestroyActor { actor: "Guard".to_string() }),
            ScriptedInput::new(7.0, ToggleDebug),
        ];

        Self {
            version: default_version(),
            events,
        }
    }

    /// Cursor over the events in time order.
    #[must_use]
    pub fn cursor(mut self) -> ScriptCursor {
        self.events.sort_by(|a, b| a.at.total_cmp(&b.at));
        ScriptCursor {
            events: self.events,
            next: 0,
        }
    }
}

/// Yields scripted inputs as simulated time passes.
#[derive(Debug, Clone)]
pub struct ScriptCursor {
    events: Vec<ScriptedInput>,
    next: usize,
}

impl ScriptCursor {
    /// Actions due at or before `now`, in order. Each action is returned once.
    pub fn due(&mut self, now: f64) -> Vec<InputAction> {
        let start = self.next;
        while self.next < self.events.len() && self.events[self.next].at <= now + 1e-9 {
            self.next += 1;
        }
        self.events[start..self.next]
            .iter()
            .map(|event| event.action.clone())
            .collect()
    }

    /// Returns true once every action has fired.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.next >= self.events.len()
    }

    /// Number of actions not yet fired.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.events.len() - self.next
    }
}
