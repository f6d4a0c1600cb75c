//! ID types for entities and designer-authored identifiers.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, OnceLock};

use ahash::AHashMap;
use parking_lot::RwLock;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Global counter for entity IDs.
static ENTITY_COUNTER: AtomicU64 = AtomicU64::new(1);

/// Unique identifier for an entity in the game world.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EntityId(u64);

impl EntityId {
    /// Creates a new unique entity ID.
    #[must_use]
    #[allow(clippy::new_without_default)]
    pub fn new() -> Self {
        Self(ENTITY_COUNTER.fetch_add(1, Ordering::Relaxed))
    }

    /// Creates an entity ID from a raw value (for deserialization).
    #[must_use]
    pub const fn from_raw(value: u64) -> Self {
        Self(value)
    }

    /// Returns the raw ID value.
    #[must_use]
    pub const fn raw(self) -> u64 {
        self.0
    }

    /// Null/invalid entity ID.
    pub const NULL: Self = Self(0);

    /// Checks if this is a valid (non-null) entity ID.
    #[must_use]
    pub const fn is_valid(self) -> bool {
        self.0 != 0
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Text of the distinguished absent name.
const NONE_TEXT: &str = "None";

/// Interned name storage shared by every [`Name`].
struct NameTable {
    lookup: AHashMap<Arc<str>, u32>,
    entries: Vec<Arc<str>>,
}

impl NameTable {
    fn new() -> Self {
        // Slot 0 is reserved for `Name::NONE`.
        Self {
            lookup: AHashMap::new(),
            entries: vec![Arc::from(NONE_TEXT)],
        }
    }
}

static NAME_TABLE: OnceLock<RwLock<NameTable>> = OnceLock::new();

fn name_table() -> &'static RwLock<NameTable> {
    NAME_TABLE.get_or_init(|| RwLock::new(NameTable::new()))
}

/// Interned, opaque identifier for keys and interaction states.
///
/// Comparison and hashing are O(1). [`Name::NONE`] marks an absent value and is
/// never a valid key or state id. Empty text and `"None"` (any ASCII case)
/// both intern to `NONE`.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Name(u32);

impl Name {
    /// The absent/invalid name.
    pub const NONE: Self = Self(0);

    /// Interns `text` and returns its name.
    #[must_use]
    pub fn new(text: &str) -> Self {
        if text.is_empty() || text.eq_ignore_ascii_case(NONE_TEXT) {
            return Self::NONE;
        }

        if let Some(&index) = name_table().read().lookup.get(text) {
            return Self(index);
        }

        let mut table = name_table().write();
        // Another writer may have interned it between the two locks.
        if let Some(&index) = table.lookup.get(text) {
            return Self(index);
        }

        let index = table.entries.len() as u32;
        let entry: Arc<str> = Arc::from(text);
        table.entries.push(Arc::clone(&entry));
        table.lookup.insert(entry, index);
        Self(index)
    }

    /// Returns true for the absent name.
    #[must_use]
    pub const fn is_none(self) -> bool {
        self.0 == 0
    }

    /// Returns the interned text.
    #[must_use]
    pub fn as_str(self) -> Arc<str> {
        name_table()
            .read()
            .entries
            .get(self.0 as usize)
            .cloned()
            .unwrap_or_else(|| Arc::from(NONE_TEXT))
    }
}

impl fmt::Display for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.as_str())
    }
}

impl fmt::Debug for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Name({:?})", &*self.as_str())
    }
}

impl From<&str> for Name {
    fn from(text: &str) -> Self {
        Self::new(text)
    }
}

impl From<String> for Name {
    fn from(text: String) -> Self {
        Self::new(&text)
    }
}

impl Serialize for Name {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.as_str())
    }
}

impl<'de> Deserialize<'de> for Name {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        Ok(Self::new(&text))
    }
}
