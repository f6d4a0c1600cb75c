//! Engine configuration.
//!
//! Provides interaction, debug overlay, asset and simulation settings.
//! Configuration can be loaded from and saved to a TOML file.

use serde::{Deserialize, Serialize};
use std::fs;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use glance_gameplay::InteractionConfig;
use glance_tools::InteractionDebugConfig;

use crate::asset_loader::DEFAULT_ASSET_PATH;

/// Configuration file name.
pub const CONFIG_FILE: &str = "glance.toml";

/// Engine configuration parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GlanceConfig {
    // === Interaction ===
    /// Focus scanning and hold input settings
    pub interaction: InteractionConfig,

    // === Debug ===
    /// Debug overlay settings
    pub debug: InteractionDebugConfig,
    /// Start with the interaction debug overlay on
    pub show_debug_overlay: bool,

    // === Assets ===
    /// Directory holding interaction asset files
    pub asset_dir: PathBuf,
    /// Reload asset files when they change on disk
    pub hot_reload: bool,
    /// Seconds between hot-reload checks
    pub hot_reload_interval: f32,
    /// Input script to drive the demo (None = built-in script)
    pub input_script: Option<PathBuf>,

    // === Simulation ===
    /// Fixed simulation step in seconds
    pub fixed_dt: f32,
    /// Seconds of simulated time to run
    pub demo_duration: f32,
    /// Pace the simulation against the wall clock
    pub realtime: bool,
}

impl Default for GlanceConfig {
    fn default() -> Self {
        Self {
            interaction: InteractionConfig::default(),

            debug: InteractionDebugConfig::default(),
            show_debug_overlay: false,

            asset_dir: PathBuf::from(DEFAULT_ASSET_PATH),
            hot_reload: false,
            hot_reload_interval: 1.0,
            input_script: None,

            fixed_dt: 1.0 / 60.0,
            demo_duration: 7.5,
            realtime: false,
        }
    }
}

impl GlanceConfig {
    /// Load configuration from the default file location.
    /// Returns default config if file doesn't exist.
    pub fn load() -> Self {
        Self::load_from(CONFIG_FILE)
    }

    /// Load configuration from a specific path.
    /// Returns default config if file doesn't exist or is invalid.
    pub fn load_from<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref();

        if !path.exists() {
            info!("Config file not found, using defaults");
            return Self::default();
        }

        match fs::File::open(path) {
            Ok(mut file) => {
                let mut contents = String::new();
                if let Err(e) = file.read_to_string(&mut contents) {
                    warn!("Failed to read config file: {e}");
                    return Self::default();
                }

                match toml::from_str::<Self>(&contents) {
                    Ok(mut config) => {
                        info!("Loaded config from {}", path.display());
                        config.validate();
                        config
                    },
                    Err(e) => {
                        warn!("Failed to parse config file: {e}");
                        Self::default()
                    },
                }
            },
            Err(e) => {
                warn!("Failed to open config file: {e}");
                Self::default()
            },
        }
    }

    /// Save configuration to a specific path.
    pub fn save_to<P: AsRef<Path>>(&self, path: P) -> io::Result<()> {
        let path = path.as_ref();

        // Create parent directories if needed
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;

        let mut file = fs::File::create(path)?;
        file.write_all(contents.as_bytes())?;

        info!("Saved config to {}", path.display());
        Ok(())
    }

    /// Clamp simulation values to sensible ranges.
    ///
    /// Interaction intervals are left alone: a non-positive scan interval
    /// pauses scanning and a non-positive hold tick makes holds execute
    /// immediately, both of which are logged at runtime.
    pub fn validate(&mut self) {
        self.fixed_dt = self.fixed_dt.clamp(0.001, 0.25);
        self.demo_duration = self.demo_duration.max(0.0);
        self.hot_reload_interval = self.hot_reload_interval.max(0.1);
        self.interaction.trace_distance = self.interaction.trace_distance.max(0.0);
        self.debug.print_interval = self.debug.print_interval.max(0.0);
    }
}
