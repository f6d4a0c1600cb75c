//! Key requirement evaluation.
//!
//! Requirements use AND logic: every listed key must be owned. List order is
//! only kept for presentation, so unmet messages come back in authoring order.

use glance_common::Name;
use serde::{Deserialize, Serialize};

use crate::keyring::Keyring;

/// A single key requirement entry.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct KeyRequirement {
    /// Key identifier that must be owned
    pub key_id: Name,
    /// Display label for UI (e.g. "Red Keycard")
    pub display_text: String,
    /// Message shown while the key is missing (e.g. "Requires Red Keycard")
    pub missing_message: String,
}

impl KeyRequirement {
    /// Creates a requirement.
    #[must_use]
    pub fn new(
        key_id: impl Into<Name>,
        display_text: impl Into<String>,
        missing_message: impl Into<String>,
    ) -> Self {
        Self {
            key_id: key_id.into(),
            display_text: display_text.into(),
            missing_message: missing_message.into(),
        }
    }

    /// A requirement with a NONE key is treated as always satisfied.
    #[must_use]
    pub fn is_satisfied_by(&self, has_key: impl Fn(Name) -> bool) -> bool {
        self.key_id.is_none() || has_key(self.key_id)
    }
}

/// Outcome of checking a requirement list.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MissingRequirements {
    /// Missing messages of unmet requirements, in authoring order
    pub messages: Vec<String>,
}

impl MissingRequirements {
    /// True if at least one requirement is unmet.
    #[must_use]
    pub fn has_missing(&self) -> bool {
        !self.messages.is_empty()
    }

    /// Number of unmet requirements.
    #[must_use]
    pub fn count(&self) -> usize {
        self.messages.len()
    }

    /// Consumes the outcome and returns the messages.
    #[must_use]
    pub fn into_messages(self) -> Vec<String> {
        self.messages
    }
}

/// Collects the missing messages of every unmet requirement.
pub fn build_missing_messages<F>(requirements: &[KeyRequirement], has_key: F) -> MissingRequirements
where
    F: Fn(Name) -> bool,
{
    let messages = requirements
        .iter()
        .filter(|req| !req.is_satisfied_by(&has_key))
        .map(|req| req.missing_message.clone())
        .collect();

    MissingRequirements { messages }
}

/// Checks requirements without building messages.
pub fn are_requirements_met<F>(requirements: &[KeyRequirement], has_key: F) -> bool
where
    F: Fn(Name) -> bool,
{
    requirements.iter().all(|req| req.is_satisfied_by(&has_key))
}

/// [`build_missing_messages`] against an optional keyring.
///
/// A missing keyring owns nothing, so every keyed requirement is unmet.
#[must_use]
pub fn evaluate_requirements(
    requirements: &[KeyRequirement],
    keyring: Option<&Keyring>,
) -> MissingRequirements {
    build_missing_messages(requirements, |key| {
        keyring.is_some_and(|keyring| keyring.has_key(key))
    })
}

/// [`are_requirements_met`] against an optional keyring.
#[must_use]
pub fn keyring_meets(requirements: &[KeyRequirement], keyring: Option<&Keyring>) -> bool {
    are_requirements_met(requirements, |key| {
        keyring.is_some_and(|keyring| keyring.has_key(key))
    })
}
