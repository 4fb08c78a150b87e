//! Error types for the entity-component database and the round scheduler.
//!
//! Small, focused error structs model a single failure each and convert into
//! the aggregate [`ECSError`] via `From`, so primitives can use `?` while
//! callers still get one type to match on.
//!
//! ## Taxonomy
//! * **Not found** — removing an absent entity, reading an absent
//!   `(entity, type)` pair, attaching a component to a dead entity.
//! * **Invalid argument** — registering a system with a negative priority.
//! * **Registry** — resolving a new component type after the registry was
//!   frozen, or exceeding [`COMPONENT_CAP`](crate::engine::types::COMPONENT_CAP).
//!
//! Removing an absent component is *not* an error; it is a no-op.
//!
//! Round-level failures are reported as [`ExecutionError`], which records
//! where in the round the failing action sat.
//!
//! ## Display vs. Debug
//! * [`fmt::Display`] is short and suitable for logs.
//! * [`fmt::Debug`] (derived) keeps the full structure.

use std::fmt;

use crate::engine::entity::Entity;
use crate::engine::types::{SystemPriority, TypeKey};


/// Returned when an operation targets an entity that is not live.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EntityNotFoundError {
    /// The entity that was addressed.
    pub entity: Entity,
}

impl fmt::Display for EntityNotFoundError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} is not in the database", self.entity)
    }
}

impl std::error::Error for EntityNotFoundError {}

/// Returned when an `(entity, type)` pair has no component attached.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ComponentNotFoundError {
    /// Entity that was addressed.
    pub entity: Entity,

    /// Component type that was requested.
    pub key: TypeKey,
}

impl fmt::Display for ComponentNotFoundError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} has no component of type {}", self.entity, self.key)
    }
}

impl std::error::Error for ComponentNotFoundError {}

/// Returned when a system is registered with a negative priority.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidPriorityError {
    /// Offending priority.
    pub priority: SystemPriority,
}

impl fmt::Display for InvalidPriorityError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "priority must be non-negative, got {}", self.priority)
    }
}

impl std::error::Error for InvalidPriorityError {}

/// Returned when a bounded id space is exhausted.
///
/// ### Fields
/// * `needed` — Size the operation required.
/// * `capacity` — The bound that prevented it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CapacityError {
    /// Total slots the operation attempted to use.
    pub needed: u64,

    /// Upper bound that prevented the operation.
    pub capacity: u64,
}

impl fmt::Display for CapacityError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "limit reached ({} needed; capacity {})", self.needed, self.capacity)
    }
}

impl std::error::Error for CapacityError {}

/// Aggregate error for database, registry and systems-registry operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ECSError {
    /// The addressed entity is not live.
    EntityNotFound(EntityNotFoundError),

    /// The addressed `(entity, type)` pair holds no component.
    ComponentNotFound(ComponentNotFoundError),

    /// A system priority was negative.
    InvalidPriority(InvalidPriorityError),

    /// More distinct component types than the registry can key.
    ComponentCapacity(CapacityError),

    /// The entity id space is exhausted.
    EntityCapacity(CapacityError),

    /// A new component type was resolved after the registry was frozen.
    RegistryFrozen {
        /// Rust type name of the rejected component type.
        name: &'static str,
    },

    /// A typed lookup named a component type the registry has never seen.
    UnregisteredType {
        /// Rust type name of the unknown component type.
        name: &'static str,
    },

    /// A component stored under a key did not hold the requested shape.
    TypeMismatch {
        /// Key the component was read through.
        key: TypeKey,

        /// Rust type name the caller asked for.
        expected: &'static str,
    },
}

impl fmt::Display for ECSError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ECSError::EntityNotFound(e) => write!(f, "{e}"),
            ECSError::ComponentNotFound(e) => write!(f, "{e}"),
            ECSError::InvalidPriority(e) => write!(f, "{e}"),
            ECSError::ComponentCapacity(e) => write!(f, "component type {e}"),
            ECSError::EntityCapacity(e) => write!(f, "entity id {e}"),
            ECSError::RegistryFrozen { name } => {
                write!(f, "type registry is frozen; cannot register {name}")
            }
            ECSError::UnregisteredType { name } => {
                write!(f, "component type {name} is not registered")
            }
            ECSError::TypeMismatch { key, expected } => {
                write!(f, "component under {key} is not a {expected}")
            }
        }
    }
}

impl std::error::Error for ECSError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ECSError::EntityNotFound(e) => Some(e),
            ECSError::ComponentNotFound(e) => Some(e),
            ECSError::InvalidPriority(e) => Some(e),
            ECSError::ComponentCapacity(e) | ECSError::EntityCapacity(e) => Some(e),
            _ => None,
        }
    }
}

impl ECSError {
    /// Returns `true` for the not-found family of failures.
    pub fn is_not_found(&self) -> bool {
        matches!(self, ECSError::EntityNotFound(_) | ECSError::ComponentNotFound(_))
    }
}

impl From<EntityNotFoundError> for ECSError {
    fn from(e: EntityNotFoundError) -> Self { ECSError::EntityNotFound(e) }
}

impl From<ComponentNotFoundError> for ECSError {
    fn from(e: ComponentNotFoundError) -> Self { ECSError::ComponentNotFound(e) }
}

impl From<InvalidPriorityError> for ECSError {
    fn from(e: InvalidPriorityError) -> Self { ECSError::InvalidPriority(e) }
}

/// Result alias used throughout the engine.
pub type ECSResult<T> = Result<T, ECSError>;

/// Failure raised while driving a round.
///
/// Actions that were applied before the failure stay applied; a round is not
/// atomic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExecutionError {
    /// An action's underlying primitive failed under
    /// [`FailurePolicy::Abort`](crate::engine::scheduler::FailurePolicy::Abort).
    ActionFailed {
        /// Priority of the tier that produced the action.
        priority: SystemPriority,

        /// Position of the action within its tier's action list.
        index: usize,

        /// Error returned by the primitive.
        source: ECSError,
    },
}

impl fmt::Display for ExecutionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExecutionError::ActionFailed { priority, index, source } => write!(
                f,
                "action {index} of tier {priority} failed: {source}"
            ),
        }
    }
}

impl std::error::Error for ExecutionError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ExecutionError::ActionFailed { source, .. } => Some(source),
        }
    }
}

impl ExecutionError {
    /// Returns the primitive error that stopped the round.
    pub fn action_error(&self) -> &ECSError {
        match self {
            ExecutionError::ActionFailed { source, .. } => source,
        }
    }
}
