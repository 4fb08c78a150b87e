//! Entity handles and id allocation.
//!
//! An [`Entity`] is nothing but a `u64`. Ids come from an [`EntityAllocator`]
//! owned by the database; the allocator hands them out in increasing order and
//! never reuses one, so handles to removed entities can never alias a newer
//! entity.

use std::fmt;

use crate::engine::error::{CapacityError, ECSError, ECSResult};
use crate::engine::types::EntityID;


/// Opaque handle identifying one entity.
///
/// Equality, ordering and hashing are by [`Entity::unique_id`].
#[repr(transparent)]
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct Entity(pub EntityID);

impl Entity {
    /// Returns the id assigned at creation.
    #[inline]
    pub fn unique_id(self) -> EntityID {
        self.0
    }
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Entity({})", self.0)
    }
}

/// Monotonic id source.
///
/// `last_unique_id` is the id the next allocation will receive. It only ever
/// grows, including across removals.
#[derive(Debug, Default)]
pub struct EntityAllocator {
    last_unique_id: EntityID,
}

impl EntityAllocator {
    /// Creates an allocator starting at id `0`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Hands out the next id.
    pub fn allocate(&mut self) -> ECSResult<Entity> {
        let unique_id = self.last_unique_id;
        self.last_unique_id = unique_id.checked_add(1).ok_or(ECSError::EntityCapacity(
            CapacityError { needed: u64::MAX, capacity: EntityID::MAX },
        ))?;
        Ok(Entity(unique_id))
    }

    /// Id the next allocation will receive.
    #[inline]
    pub fn last_unique_id(&self) -> EntityID {
        self.last_unique_id
    }
}
