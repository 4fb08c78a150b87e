//! # Actions
//!
//! Deferred mutations produced by systems and applied by the scheduler.
//!
//! ## Purpose
//! Systems observe the database through a shared reference and cannot change
//! it. Instead they return a list of actions, which the scheduler applies in
//! order once every system of the tier has run. An action is plain data
//! describing *what* should change; [`Action::apply`] maps it onto the
//! database primitives.
//!
//! Applications with their own action vocabulary implement [`Action`] for
//! their own enum. [`Command`] covers the four structural primitives and is
//! enough for many models.
//!
//! ## Invariants
//! - Actions of a tier are applied in the order their systems returned them.
//! - Target entities must be live at application time unless being spawned.
//! - Each action sees the effects of the ones applied before it.

use crate::engine::component::Component;
use crate::engine::database::EntityComponentDatabase;
use crate::engine::entity::Entity;
use crate::engine::error::ECSResult;
use crate::engine::types::TypeKey;


/// A deferred mutation of an [`EntityComponentDatabase`].
pub trait Action<C: Component> {
    /// Applies the mutation.
    ///
    /// ## Errors
    /// Whatever the underlying primitive returns. The scheduler's
    /// [`FailurePolicy`](crate::engine::scheduler::FailurePolicy) decides what
    /// happens next.
    fn apply(self, database: &mut EntityComponentDatabase<C>) -> ECSResult<()>;
}

/// The stock structural actions.
#[derive(Debug, Clone, PartialEq)]
pub enum Command<C> {
    /// Creates an entity carrying `components`.
    Spawn {
        /// Components of the new entity, attached in order.
        components: Vec<C>,
    },

    /// Removes an entity and everything attached to it.
    ///
    /// Fails with `EntityNotFound` if the entity is already gone.
    Despawn {
        /// Entity to remove.
        entity: Entity,
    },

    /// Attaches a component, replacing any of the same type.
    Add {
        /// Target entity.
        entity: Entity,

        /// Component value to attach.
        component: C,
    },

    /// Detaches the component of type `key`. A missing component is a no-op.
    Remove {
        /// Target entity.
        entity: Entity,

        /// Component type to remove.
        key: TypeKey,
    },
}

impl<C: Component> Action<C> for Command<C> {
    fn apply(self, database: &mut EntityComponentDatabase<C>) -> ECSResult<()> {
        match self {
            Command::Spawn { components } => database.add_entity(components).map(|_| ()),
            Command::Despawn { entity } => database.remove_entity(entity),
            Command::Add { entity, component } => database.add_component(entity, component),
            Command::Remove { entity, key } => {
                database.remove_component(entity, key);
                Ok(())
            }
        }
    }
}
