//! # Glance Common
//!
//! Common types, utilities, and shared abstractions for Project Glance.
//!
//! This crate provides foundational types used across all Glance subsystems:
//! - Interned identifiers (`Name`) and entity ids
//! - View point geometry for focus traces
//! - Version information for asset schemas
//! - Common error types
//! - Prelude for convenient imports

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(clippy::unwrap_used)]

pub mod error;
pub mod ids;
pub mod spatial;
pub mod version;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::error::*;
    pub use crate::ids::*;
    pub use crate::spatial::*;
    pub use crate::version::*;
}

pub use prelude::*;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_name_interning() {
        let a = Name::new("RedKey");
        let b = Name::new("RedKey");
        let c = Name::new("BlueKey");

        assert_eq!(a, b);
        assert_ne!(a, c);
        assert!(!a.is_none());
        assert_eq!(a.to_string(), "RedKey");
    }

    #[test]
    fn test_entity_id_generation() {
        let id1 = EntityId::new();
        let id2 = EntityId::new();
        assert_ne!(id1, id2);
        assert!(id1.is_valid());
    }

    #[test]
    fn test_version_compatibility() {
        let v1 = SchemaVersion::new(1, 0, 0);
        let v2 = SchemaVersion::new(1, 1, 0);
        let v3 = SchemaVersion::new(2, 0, 0);

        // v2 can read v1 data (newer version reading older data)
        assert!(v2.is_compatible_with(&v1));
        // Different major versions are incompatible
        assert!(!v1.is_compatible_with(&v3));
    }
}
