//! Entity type resolution for the catalog.
//!
//! An [`EntityType`] is the symbolic tag used to pick index and query handles.
//! It can be resolved from a plain tag, from a marker type implementing
//! [`EntityKind`], or from a live value implementing [`DomainEntity`]. All three
//! paths normalize the same way: surrounding whitespace trimmed, lowercased.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Normalized entity type tag (e.g. `"package"`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityType(String);

impl EntityType {
    /// Resolve a type from a raw tag such as `" Package "`.
    pub fn new(tag: impl AsRef<str>) -> Self {
        Self(tag.as_ref().trim().to_lowercase())
    }

    /// Resolve a type from a marker type.
    pub fn of<K: EntityKind>() -> Self {
        Self::new(K::TYPE_NAME)
    }

    /// Resolve a type from a live entity.
    pub fn of_entity(entity: &dyn DomainEntity) -> Self {
        entity.entity_type()
    }

    /// The primary catalog entity (datasets).
    pub fn package() -> Self {
        Self::of::<Package>()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EntityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for EntityType {
    fn from(tag: &str) -> Self {
        Self::new(tag)
    }
}

impl From<String> for EntityType {
    fn from(tag: String) -> Self {
        Self::new(tag)
    }
}

/// Marker for a kind of domain object, named the way the store of record names it.
pub trait EntityKind {
    const TYPE_NAME: &'static str;
}

/// A live domain object as seen by the storage layer's commit lifecycle.
pub trait DomainEntity: Send + Sync {
    /// Stable identifier in the store of record.
    fn id(&self) -> &str;

    /// The entity's type tag.
    fn entity_type(&self) -> EntityType;
}

/// Lifecycle state of a catalog record in the store of record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityState {
    Active,
    Draft,
    Deleted,
}

impl EntityState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Draft => "draft",
            Self::Deleted => "deleted",
        }
    }
}

/// Handle on a dataset row: the only entity type that is indexed automatically.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Package {
    pub id: String,
    pub name: String,
    pub state: EntityState,
}

impl Package {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            state: EntityState::Active,
        }
    }
}

impl EntityKind for Package {
    const TYPE_NAME: &'static str = "Package";
}

impl DomainEntity for Package {
    fn id(&self) -> &str {
        &self.id
    }

    fn entity_type(&self) -> EntityType {
        EntityType::of::<Self>()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Resource {
        id: String,
    }

    impl EntityKind for Resource {
        const TYPE_NAME: &'static str = "Resource";
    }

    impl DomainEntity for Resource {
        fn id(&self) -> &str {
            &self.id
        }

        fn entity_type(&self) -> EntityType {
            EntityType::of::<Self>()
        }
    }

    #[test]
    fn test_tag_is_trimmed_and_lowercased() {
        assert_eq!(EntityType::new("  Package\n").as_str(), "package");
        assert_eq!(EntityType::from("TAG").as_str(), "tag");
    }

    #[test]
    fn test_all_resolution_paths_agree() {
        let package = Package::new("abc", "my-dataset");
        assert_eq!(EntityType::of::<Package>(), EntityType::new("package"));
        assert_eq!(EntityType::of_entity(&package), EntityType::package());
    }

    #[test]
    fn test_other_kinds_resolve_to_their_own_tag() {
        let resource = Resource {
            id: "r1".to_string(),
        };
        assert_eq!(EntityType::of_entity(&resource).as_str(), "resource");
        assert_ne!(EntityType::of_entity(&resource), EntityType::package());
    }

    #[test]
    fn test_entity_state_serialization() {
        let json = serde_json::to_string(&EntityState::Deleted).unwrap();
        assert_eq!(json, "\"deleted\"");
        assert_eq!(EntityState::Active.as_str(), "active");
    }
}
