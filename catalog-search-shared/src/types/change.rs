//! Change notifications produced by the store of record on commit.

use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::types::entity::{DomainEntity, EntityType};

/// Kind of committed mutation on a tracked entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeOperation {
    Created,
    Changed,
    Deleted,
}

impl ChangeOperation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Created => "created",
            Self::Changed => "changed",
            Self::Deleted => "deleted",
        }
    }
}

impl fmt::Display for ChangeOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What an update touched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeScope {
    /// At least one column of the row itself changed.
    Attributes,
    /// Only membership of a related collection changed; not a change of the row.
    CollectionOnly,
}

type Identity = (EntityType, String);

/// Mutations collected over one transaction, deduplicated by identity.
///
/// Deleted wins over any other operation on the same entity, and Created
/// absorbs later Changed records, so each entity appears at most once.
#[derive(Default)]
pub struct ChangeSet {
    created: Vec<Arc<dyn DomainEntity>>,
    changed: Vec<Arc<dyn DomainEntity>>,
    deleted: Vec<Arc<dyn DomainEntity>>,
    seen: HashSet<Identity>,
}

impl ChangeSet {
    pub fn new() -> Self {
        Self::default()
    }

    fn identity(entity: &dyn DomainEntity) -> Identity {
        (entity.entity_type(), entity.id().to_string())
    }

    fn contains(list: &[Arc<dyn DomainEntity>], identity: &Identity) -> bool {
        list.iter().any(|e| &Self::identity(e.as_ref()) == identity)
    }

    fn remove(list: &mut Vec<Arc<dyn DomainEntity>>, identity: &Identity) {
        list.retain(|e| &Self::identity(e.as_ref()) != identity);
    }

    pub fn created(&mut self, entity: Arc<dyn DomainEntity>) {
        let identity = Self::identity(entity.as_ref());
        if self.seen.insert(identity) {
            self.created.push(entity);
        }
    }

    pub fn changed(&mut self, entity: Arc<dyn DomainEntity>, scope: ChangeScope) {
        if scope == ChangeScope::CollectionOnly {
            return;
        }
        let identity = Self::identity(entity.as_ref());
        if self.seen.insert(identity) {
            self.changed.push(entity);
        }
    }

    pub fn deleted(&mut self, entity: Arc<dyn DomainEntity>) {
        let identity = Self::identity(entity.as_ref());
        if Self::contains(&self.deleted, &identity) {
            return;
        }
        Self::remove(&mut self.created, &identity);
        Self::remove(&mut self.changed, &identity);
        self.seen.insert(identity);
        self.deleted.push(entity);
    }

    pub fn is_empty(&self) -> bool {
        self.created.is_empty() && self.changed.is_empty() && self.deleted.is_empty()
    }

    pub fn len(&self) -> usize {
        self.created.len() + self.changed.len() + self.deleted.len()
    }

    /// All entries, created first, then changed, then deleted, each in recording order.
    pub fn entries(&self) -> impl Iterator<Item = (&Arc<dyn DomainEntity>, ChangeOperation)> {
        self.created
            .iter()
            .map(|e| (e, ChangeOperation::Created))
            .chain(self.changed.iter().map(|e| (e, ChangeOperation::Changed)))
            .chain(self.deleted.iter().map(|e| (e, ChangeOperation::Deleted)))
    }
}

impl fmt::Debug for ChangeSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChangeSet")
            .field("created", &self.created.len())
            .field("changed", &self.changed.len())
            .field("deleted", &self.deleted.len())
            .finish()
    }
}
