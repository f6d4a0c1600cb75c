//! Keyring: the set of key identifiers an actor owns.
//!
//! Keys are opaque [`Name`]s. A key can stand for anything the designers want
//! to gate on: a physical key, a finished quest, a collectible, a milestone.

use ahash::AHashSet;
use glance_common::Name;

/// Set of key identifiers owned by an actor.
///
/// [`Name::NONE`] is never stored and never reported as owned.
#[derive(Debug, Clone, Default)]
pub struct Keyring {
    /// Owned keys
    keys: AHashSet<Name>,
}

impl Keyring {
    /// Creates an empty keyring.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a keyring that already owns `keys`. NONE entries are dropped.
    #[must_use]
    pub fn with_keys<I>(keys: I) -> Self
    where
        I: IntoIterator<Item = Name>,
    {
        let mut keyring = Self::new();
        for key in keys {
            keyring.add_key(key);
        }
        keyring
    }

    /// Checks if the key is owned.
    #[must_use]
    pub fn has_key(&self, key: Name) -> bool {
        !key.is_none() && self.keys.contains(&key)
    }

    /// Adds a key. Returns true if the keyring changed.
    pub fn add_key(&mut self, key: Name) -> bool {
        if key.is_none() {
            return false;
        }
        self.keys.insert(key)
    }

    /// Removes a key. Returns true if the key was owned.
    pub fn remove_key(&mut self, key: Name) -> bool {
        if key.is_none() {
            return false;
        }
        self.keys.remove(&key)
    }

    /// Checks that every listed key is owned. NONE entries are skipped.
    #[must_use]
    pub fn has_all_keys(&self, required: &[Name]) -> bool {
        required
            .iter()
            .filter(|key| !key.is_none())
            .all(|key| self.keys.contains(key))
    }

    /// Returns the number of owned keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    /// Returns true if no keys are owned.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Returns an iterator over owned keys (unordered).
    pub fn keys(&self) -> impl Iterator<Item = Name> + '_ {
        self.keys.iter().copied()
    }
}
