//! Interaction asset loading and management.
//!
//! This module provides:
//! - Loading interaction and NPC assets from assets/interactions/*.toml
//! - Schema version checks and validation on load
//! - Hot-reload support for development
//! - An asset registry keyed by asset name (the file stem)

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::SystemTime;

use glance_common::{GlanceError, SchemaVersion};
use glance_gameplay::{InteractionDataAsset, NpcInteractionDataAsset, Validate, ValidationReport};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};

/// Default asset path for interaction assets.
pub const DEFAULT_ASSET_PATH: &str = "assets/interactions";

/// Errors that can occur during asset loading.
#[derive(Debug, Error)]
pub enum AssetError {
    /// File not found.
    #[error("Asset file not found: {0}")]
    NotFound(PathBuf),

    /// Failed to read file.
    #[error("Failed to read asset file: {0}")]
    Read(#[from] std::io::Error),

    /// Failed to parse TOML.
    #[error("Failed to parse asset TOML: {0}")]
    Parse(#[from] toml::de::Error),

    /// Version string missing, malformed or incompatible.
    #[error("Asset version error: {0}")]
    Version(#[from] GlanceError),

    /// A file must hold exactly one of `[interaction]` or `[npc]`.
    #[error("Asset '{0}' must define exactly one of [interaction] or [npc]")]
    Shape(String),

    /// Validation found hard errors.
    #[error("Asset '{name}' is invalid: {issues}")]
    Invalid {
        /// Asset name
        name: String,
        /// Validation errors, joined
        issues: String,
    },

    /// Another asset already uses this name.
    #[error("Duplicate asset name: {0}")]
    DuplicateName(String),
}

/// Result type for asset loading operations.
pub type AssetResult<T> = Result<T, AssetError>;

/// Which table an asset file carried.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssetKind {
    /// Generic interactable data
    Interaction,
    /// NPC talk data
    Npc,
}

/// On-disk layout of one asset file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AssetFile {
    /// File format version.
    #[serde(default = "default_version")]
    pub version: String,
    /// Generic interactable data.
    #[serde(default)]
    pub interaction: Option<InteractionDataAsset>,
    /// NPC talk data.
    #[serde(default)]
    pub npc: Option<NpcInteractionDataAsset>,
}

fn default_version() -> String {
    SchemaVersion::INTERACTION_ASSET.to_string()
}

/// Rejects reports with errors and logs their warnings.
fn accept_report(name: &str, report: &ValidationReport) -> AssetResult<()> {
    for warning in &report.warnings {
        warn!("Asset '{}': {}", name, warning);
    }

    if report.is_valid() {
        return Ok(());
    }

    let issues = report
        .errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ");
    Err(AssetError::Invalid {
        name: name.to_string(),
        issues,
    })
}

/// Interaction assets by name.
#[derive(Debug, Default)]
pub struct AssetRegistry {
    /// Generic assets by name.
    interactions: HashMap<String, Arc<InteractionDataAsset>>,
    /// NPC assets by name.
    npcs: HashMap<String, Arc<NpcInteractionDataAsset>>,
}

impl AssetRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Total number of assets.
    #[must_use]
    pub fn len(&self) -> usize {
        self.interactions.len() + self.npcs.len()
    }

    /// Returns true if the registry holds nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn check_free(&self, name: &str) -> AssetResult<()> {
        if self.interactions.contains_key(name) || self.npcs.contains_key(name) {
            return Err(AssetError::DuplicateName(name.to_string()));
        }
        Ok(())
    }

    /// Validates and registers a generic asset.
    pub fn register_interaction(
        &mut self,
        name: impl Into<String>,
        asset: InteractionDataAsset,
    ) -> AssetResult<()> {
        let name = name.into();
        self.check_free(&name)?;
        accept_report(&name, &asset.validate())?;

        debug!("Registered interaction asset '{}' ({} states)", name, asset.states.len());
        self.interactions.insert(name, Arc::new(asset));
        Ok(())
    }

    /// Validates and registers an NPC asset.
    pub fn register_npc(
        &mut self,
        name: impl Into<String>,
        asset: NpcInteractionDataAsset,
    ) -> AssetResult<()> {
        let name = name.into();
        self.check_free(&name)?;
        accept_report(&name, &asset.validate())?;

        debug!("Registered NPC asset '{}' ({} states)", name, asset.states.len());
        self.npcs.insert(name, Arc::new(asset));
        Ok(())
    }

    /// Gets a generic asset by name.
    #[must_use]
    pub fn interaction(&self, name: &str) -> Option<Arc<InteractionDataAsset>> {
        self.interactions.get(name).cloned()
    }

    /// Gets an NPC asset by name.
    #[must_use]
    pub fn npc(&self, name: &str) -> Option<Arc<NpcInteractionDataAsset>> {
        self.npcs.get(name).cloned()
    }

    /// All asset names, sorted.
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self
            .interactions
            .keys()
            .chain(self.npcs.keys())
            .map(String::as_str)
            .collect();
        names.sort_unstable();
        names
    }

    /// Clears all assets.
    pub fn clear(&mut self) {
        self.interactions.clear();
        self.npcs.clear();
    }
}

/// Asset loader with hot-reload support.
pub struct AssetLoader {
    /// Base path for asset files.
    base_path: PathBuf,
    /// Asset registry.
    registry: AssetRegistry,
    /// File modification times for hot-reload.
    file_times: HashMap<PathBuf, SystemTime>,
    /// Whether hot-reload is enabled.
    hot_reload_enabled: bool,
}

impl AssetLoader {
    /// Creates a new asset loader.
    #[must_use]
    pub fn new(base_path: impl AsRef<Path>) -> Self {
        Self {
            base_path: base_path.as_ref().to_path_buf(),
            registry: AssetRegistry::new(),
            file_times: HashMap::new(),
            hot_reload_enabled: true,
        }
    }

    /// Returns a reference to the asset registry.
    #[must_use]
    pub fn registry(&self) -> &AssetRegistry {
        &self.registry
    }

    /// Enables or disables hot-reload.
    pub fn set_hot_reload(&mut self, enabled: bool) {
        self.hot_reload_enabled = enabled;
    }

    /// Loads all assets from the base path.
    ///
    /// Files that fail to load are logged and skipped. Files are visited in
    /// name order so duplicate detection is deterministic.
    pub fn load_all(&mut self) -> AssetResult<usize> {
        let path = &self.base_path;
        if !path.exists() {
            warn!("Asset path does not exist: {}", path.display());
            return Ok(0);
        }

        let mut files = Vec::new();
        for entry in fs::read_dir(path)? {
            let file_path = entry?.path();
            if file_path.extension().is_some_and(|ext| ext == "toml") {
                files.push(file_path);
            }
        }
        files.sort();

        let mut count = 0;
        for file_path in files {
            match self.load_file(&file_path) {
                Ok(kind) => {
                    count += 1;
                    debug!("Loaded {:?} asset from {}", kind, file_path.display());
                },
                Err(e) => {
                    warn!("Rejected asset file {}: {}", file_path.display(), e);
                },
            }
        }

        info!("Loaded {} interaction assets", count);
        Ok(count)
    }

    /// Loads one asset file, registering it under its file stem.
    pub fn load_file(&mut self, path: &Path) -> AssetResult<AssetKind> {
        if !path.exists() {
            return Err(AssetError::NotFound(path.to_path_buf()));
        }

        let content = fs::read_to_string(path)?;

        // Track file modification time even for rejected files so fixing
        // them triggers a reload.
        if let Ok(metadata) = fs::metadata(path) {
            if let Ok(modified) = metadata.modified() {
                self.file_times.insert(path.to_path_buf(), modified);
            }
        }

        let file: AssetFile = toml::from_str(&content)?;
        let name = path
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_default();
        let version: SchemaVersion = file.version.parse()?;

        match (file.interaction, file.npc) {
            (Some(asset), None) => {
                SchemaVersion::INTERACTION_ASSET.check_readable(&version)?;
                self.registry.register_interaction(name, asset)?;
                Ok(AssetKind::Interaction)
            },
            (None, Some(asset)) => {
                SchemaVersion::NPC_ASSET.check_readable(&version)?;
                self.registry.register_npc(name, asset)?;
                Ok(AssetKind::Npc)
            },
            _ => Err(AssetError::Shape(name)),
        }
    }

    /// Checks for file changes and reloads if necessary.
    pub fn check_hot_reload(&mut self) -> AssetResult<bool> {
        if !self.hot_reload_enabled {
            return Ok(false);
        }

        let mut needs_reload = false;

        for (path, last_time) in &self.file_times {
            match fs::metadata(path).and_then(|metadata| metadata.modified()) {
                Ok(modified) if modified > *last_time => {
                    needs_reload = true;
                    break;
                },
                Ok(_) => {},
                // Deleted files drop their asset on reload
                Err(_) => {
                    needs_reload = true;
                    break;
                },
            }
        }

        if needs_reload {
            info!("Asset files changed, reloading...");
            self.reload()?;
            return Ok(true);
        }

        Ok(false)
    }

    /// Reloads all assets.
    pub fn reload(&mut self) -> AssetResult<usize> {
        self.registry.clear();
        self.file_times.clear();
        self.load_all()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glance_common::Name;
    use glance_gameplay::{InputMode, StateDefinition, ValidationIssue};
    use tempfile::TempDir;

    const DOOR: &str = r#"
version = "1.0.0"

[interaction]
display_name = "Door"
default_state_id = "Closed"

[[interaction.states]]
state_id = "Closed"
prompt_text = "Open"

[[interaction.states.required_keys]]
key_id = "RedKey"
display_text = "Red Key"
missing_message = "Need red key"

[[interaction.states]]
state_id = "Open"
prompt_text = "Close"
"#;

    const GUARD: &str = r#"
version = "1.0.0"

[npc]
prompt_text = "Talk"
default_state_id = "Gate"

[[npc.states]]
state_id = "Gate"
line_if_missing = "No key, no entry."
line_if_met = "Go on through."
speech_visible_time = 2.0

[[npc.states.required_keys]]
key_id = "RedKey"
missing_message = "Need red key"
"#;

    const DUPLICATE: &str = r#"
version = "1.0.0"

[interaction]
display_name = "Broken"

[[interaction.states]]
state_id = "Dup"
prompt_text = "A"

[[interaction.states]]
state_id = "Dup"
prompt_text = "B"
"#;

    fn write(dir: &TempDir, name: &str, content: &str) -> PathBuf {
        let path = dir.path().join(name);
        fs::write(&path, content).expect("write asset");
        path
    }

    #[test]
    fn test_load_interaction_file() {
        let dir = TempDir::new().expect("temp dir");
        let path = write(&dir, "door.toml", DOOR);

        let mut loader = AssetLoader::new(dir.path());
        assert_eq!(loader.load_file(&path).expect("load door"), AssetKind::Interaction);

        let door = loader.registry().interaction("door").expect("door registered");
        assert_eq!(door.default_state_id(), Name::new("Closed"));
        let closed = door.find_state(Name::new("Closed")).expect("closed state");
        assert_eq!(closed.input_mode, InputMode::Press);
        assert_eq!(closed.required_keys[0].missing_message, "Need red key");
    }

    #[test]
    fn test_load_npc_file() {
        let dir = TempDir::new().expect("temp dir");
        let path = write(&dir, "guard.toml", GUARD);

        let mut loader = AssetLoader::new(dir.path());
        assert_eq!(loader.load_file(&path).expect("load guard"), AssetKind::Npc);

        let guard = loader.registry().npc("guard").expect("guard registered");
        assert_eq!(guard.states.len(), 1);
        assert!((guard.states[0].speech_visible_time - 2.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_invalid_asset_rejected() {
        let dir = TempDir::new().expect("temp dir");
        let path = write(&dir, "broken.toml", DUPLICATE);

        let mut loader = AssetLoader::new(dir.path());
        let err = loader.load_file(&path).expect_err("duplicate ids rejected");
        match err {
            AssetError::Invalid { name, issues } => {
                assert_eq!(name, "broken");
                assert!(issues.contains("Dup"));
            },
            other => panic!("unexpected error: {other}"),
        }
        assert!(loader.registry().is_empty());
    }

    #[test]
    fn test_incompatible_version_rejected() {
        let dir = TempDir::new().expect("temp dir");
        let path = write(&dir, "door.toml", &DOOR.replace("1.0.0", "2.0.0"));

        let mut loader = AssetLoader::new(dir.path());
        assert!(matches!(loader.load_file(&path), Err(AssetError::Version(_))));
    }

    #[test]
    fn test_file_needs_exactly_one_table() {
        let dir = TempDir::new().expect("temp dir");
        let path = write(&dir, "empty.toml", "version = \"1.0.0\"\n");

        let mut loader = AssetLoader::new(dir.path());
        assert!(matches!(loader.load_file(&path), Err(AssetError::Shape(_))));
    }

    #[test]
    fn test_missing_file() {
        let mut loader = AssetLoader::new("/nonexistent");
        assert!(matches!(
            loader.load_file(Path::new("/nonexistent/door.toml")),
            Err(AssetError::NotFound(_))
        ));
    }

    #[test]
    fn test_load_all_skips_bad_files() {
        let dir = TempDir::new().expect("temp dir");
        write(&dir, "door.toml", DOOR);
        write(&dir, "guard.toml", GUARD);
        write(&dir, "broken.toml", DUPLICATE);
        write(&dir, "notes.txt", "not an asset");

        let mut loader = AssetLoader::new(dir.path());
        assert_eq!(loader.load_all().expect("load all"), 2);
        assert_eq!(loader.registry().names(), vec!["door", "guard"]);
    }

    #[test]
    fn test_missing_dir_loads_nothing() {
        let mut loader = AssetLoader::new("/nonexistent/assets");
        assert_eq!(loader.load_all().expect("load all"), 0);
    }

    #[test]
    fn test_registry_duplicate_name() {
        let mut registry = AssetRegistry::new();
        let asset = InteractionDataAsset::new("Lamp").with_state(StateDefinition::new("Off", "Switch on"));
        registry
            .register_interaction("lamp", asset.clone())
            .expect("first register");
        assert!(matches!(
            registry.register_interaction("lamp", asset),
            Err(AssetError::DuplicateName(_))
        ));
    }

    #[test]
    fn test_registry_rejects_errors() {
        let mut registry = AssetRegistry::new();
        let err = registry
            .register_interaction("empty", InteractionDataAsset::new("Empty"))
            .expect_err("no states");
        assert!(err.to_string().contains(&ValidationIssue::EmptyStates.to_string()));
    }

    #[test]
    fn test_reload_picks_up_changes() {
        let dir = TempDir::new().expect("temp dir");
        write(&dir, "door.toml", DOOR);

        let mut loader = AssetLoader::new(dir.path());
        loader.load_all().expect("load all");
        assert_eq!(loader.registry().len(), 1);

        write(&dir, "guard.toml", GUARD);
        assert_eq!(loader.reload().expect("reload"), 2);
        assert!(loader.registry().npc("guard").is_some());
    }

    #[test]
    fn test_hot_reload_disabled() {
        let dir = TempDir::new().expect("temp dir");
        write(&dir, "door.toml", DOOR);

        let mut loader = AssetLoader::new(dir.path());
        loader.set_hot_reload(false);
        loader.load_all().expect("load all");
        fs::remove_file(dir.path().join("door.toml")).expect("remove");

        assert!(!loader.check_hot_reload().expect("check"));
        loader.set_hot_reload(true);
        assert!(loader.check_hot_reload().expect("check"));
        assert!(loader.registry().is_empty());
    }

    #[test]
    fn test_shipped_assets_load() {
        let dir = Path::new(env!("CARGO_MANIFEST_DIR")).join("../../assets/interactions");
        let mut loader = AssetLoader::new(dir);
        let count = loader.load_all().expect("load shipped assets");
        assert_eq!(count, loader.registry().len());
        for name in ["door", "valve", "chest"] {
            assert!(loader.registry().interaction(name).is_some(), "missing {name}");
        }
        assert!(loader.registry().npc("guard").is_some());
    }
}
