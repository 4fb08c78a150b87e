//! Consume-and-return API.
//!
//! Free functions over the same primitives as [`EntityComponentDatabase`]'s
//! methods, written so that every mutation takes the database by value and
//! hands the next database back. The old value is gone after the call, which
//! makes "one live owner" visible in the signatures:
//!
//! ```
//! use ecdb::engine::linear;
//!
//! #[derive(Clone, Copy, Debug, PartialEq)]
//! pub struct Position { pub x: i32, pub y: i32 }
//!
//! ecdb::component_union! {
//!     #[derive(Clone, Debug, PartialEq)]
//!     pub enum Shape {
//!         Position(Position),
//!     }
//! }
//!
//! let db = linear::create_ecdb::<Shape>();
//! let (db, entity) = linear::add_entity(db, [Shape::Position(Position { x: 0, y: 0 })]).unwrap();
//! let key = db.key_of::<Position>().unwrap();
//!
//! let db = linear::remove_component(db, entity, key);
//! assert!(linear::get_component(&db, entity, key).is_err());
//!
//! let rejected = linear::remove_entity(linear::remove_entity(db, entity).unwrap(), entity).unwrap_err();
//! assert_eq!(linear::size(&rejected.database), 0);
//! ```
//!
//! A failing call returns [`Rejected`], which carries the database back
//! together with the error, so a caller never loses it. Single primitives
//! leave it unchanged on failure; a failed round keeps what it applied.

use std::fmt;

use crate::engine::component::Component;
use crate::engine::database::EntityComponentDatabase;
use crate::engine::entity::Entity;
use crate::engine::error::{ECSError, ECSResult, ExecutionError};
use crate::engine::scheduler::Scheduler;
use crate::engine::systems::SystemRegistry;
use crate::engine::types::{SystemPriority, TypeKey};


/// A value handed back by a failed operation, with the reason.
#[derive(Debug)]
pub struct Rejected<D, E = ECSError> {
    /// The value the operation consumed, returned to the caller.
    pub database: D,

    /// Why the operation failed.
    pub error: E,
}

impl<D, E> Rejected<D, E> {
    /// Splits into the returned value and the error.
    pub fn into_parts(self) -> (D, E) {
        (self.database, self.error)
    }
}

impl<D, E: fmt::Display> fmt::Display for Rejected<D, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "operation rejected: {}", self.error)
    }
}

impl<D: fmt::Debug, E: std::error::Error + 'static> std::error::Error for Rejected<D, E> {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.error)
    }
}

fn settle<D, T, E>(database: D, result: Result<T, E>) -> Result<(D, T), Rejected<D, E>> {
    match result {
        Ok(value) => Ok((database, value)),
        Err(error) => Err(Rejected { database, error }),
    }
}

/// Creates an empty database.
pub fn create_ecdb<C: Component>() -> EntityComponentDatabase<C> {
    EntityComponentDatabase::new()
}

/// Adds an entity carrying `components`; see [`EntityComponentDatabase::add_entity`].
pub fn add_entity<C, I>(
    mut database: EntityComponentDatabase<C>,
    components: I,
) -> Result<(EntityComponentDatabase<C>, Entity), Rejected<EntityComponentDatabase<C>>>
where
    C: Component,
    I: IntoIterator<Item = C>,
{
    let result = database.add_entity(components);
    settle(database, result)
}

/// Removes `entity`; see [`EntityComponentDatabase::remove_entity`].
pub fn remove_entity<C: Component>(
    mut database: EntityComponentDatabase<C>,
    entity: Entity,
) -> Result<EntityComponentDatabase<C>, Rejected<EntityComponentDatabase<C>>> {
    let result = database.remove_entity(entity);
    settle(database, result).map(|(database, ())| database)
}

/// Attaches `component` to `entity`; see [`EntityComponentDatabase::add_component`].
pub fn add_component<C: Component>(
    mut database: EntityComponentDatabase<C>,
    entity: Entity,
    component: impl Into<C>,
) -> Result<EntityComponentDatabase<C>, Rejected<EntityComponentDatabase<C>>> {
    let result = database.add_component(entity, component);
    settle(database, result).map(|(database, ())| database)
}

/// Detaches the component of type `key` from `entity`. Never fails.
pub fn remove_component<C: Component>(
    mut database: EntityComponentDatabase<C>,
    entity: Entity,
    key: TypeKey,
) -> EntityComponentDatabase<C> {
    database.remove_component(entity, key);
    database
}

/// Borrows the component of type `key` attached to `entity`.
pub fn get_component<C: Component>(
    database: &EntityComponentDatabase<C>,
    entity: Entity,
    key: TypeKey,
) -> ECSResult<&C> {
    database.get_component(entity, key)
}

/// Number of live entities.
pub fn size<C: Component>(database: &EntityComponentDatabase<C>) -> usize {
    database.size()
}

/// Creates an empty systems registry.
pub fn create_systems<S>() -> SystemRegistry<S> {
    SystemRegistry::new()
}

/// Adds `system` at `priority`; see [`SystemRegistry::add_system`].
pub fn add_system<S>(
    mut registry: SystemRegistry<S>,
    system: S,
    priority: SystemPriority,
) -> Result<SystemRegistry<S>, Rejected<SystemRegistry<S>>> {
    let result = registry.add_system(system, priority);
    settle(registry, result).map(|(registry, ())| registry)
}

/// Runs one round with the default [`Scheduler`] and returns the database.
///
/// On failure the returned database holds every change applied before the
/// failing action.
pub fn process_systems<C, S, A, R, P>(
    mut database: EntityComponentDatabase<C>,
    registry: &SystemRegistry<S>,
    run_system: R,
    apply_action: P,
) -> Result<EntityComponentDatabase<C>, Rejected<EntityComponentDatabase<C>, ExecutionError>>
where
    C: Component,
    R: FnMut(&EntityComponentDatabase<C>, &S) -> Vec<A>,
    P: FnMut(&mut EntityComponentDatabase<C>, A) -> ECSResult<()>,
{
    let result = Scheduler::default().process_round(&mut database, registry, run_system, apply_action);
    settle(database, result).map(|(database, _report)| database)
}
