//! The entity-component database.
//!
//! [`EntityComponentDatabase`] owns every entity and every component. It is
//! organised column-wise:
//!
//! * an entity index `Entity -> Signature` records which component types each
//!   live entity carries, in ascending `unique_id` order;
//! * one [`ComponentTable`](crate::engine::storage::ComponentTable) per type
//!   key holds the component values, keyed by entity;
//! * a [`TypeRegistry`] maps component shapes to keys.
//!
//! ## Invariants
//! * Every live entity has a (possibly empty) signature.
//! * A table holds a row for `(key, entity)` iff `entity` is live and its
//!   signature has `key`.
//! * `last_unique_id` never decreases.
//!
//! ## Ownership
//! The database is neither `Clone` nor `Copy`. Every mutation goes through
//! `&mut self`, so at most one writer can exist and systems, which only ever
//! receive `&EntityComponentDatabase`, cannot mutate it. The consume-and-return
//! flavour of the same primitives lives in [`crate::engine::linear`].

use std::any::type_name;
use std::collections::BTreeMap;

use crate::engine::component::{Component, TypeRegistry, Variant};
use crate::engine::entity::{Entity, EntityAllocator};
use crate::engine::error::{
    ComponentNotFoundError, ECSError, ECSResult, EntityNotFoundError,
};
use crate::engine::storage::ComponentTables;
use crate::engine::types::{EntityID, Signature, TypeKey};


/// In-memory store of entities and their components.
#[derive(Debug)]
pub struct EntityComponentDatabase<C> {
    registry: TypeRegistry,
    allocator: EntityAllocator,
    entities: BTreeMap<Entity, Signature>,
    tables: ComponentTables<C>,
}

impl<C: Component> Default for EntityComponentDatabase<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: Component> EntityComponentDatabase<C> {
    /// Creates an empty database with its own, unfrozen registry.
    pub fn new() -> Self {
        Self::with_registry(TypeRegistry::new())
    }

    /// Creates an empty database that resolves keys through `registry`.
    ///
    /// Use this to share a key layout between databases, or to hand in a
    /// frozen registry so that unknown component types are rejected.
    pub fn with_registry(registry: TypeRegistry) -> Self {
        Self {
            registry,
            allocator: EntityAllocator::new(),
            entities: BTreeMap::new(),
            tables: ComponentTables::default(),
        }
    }

    /// Creates an entity and attaches `components` in order.
    ///
    /// Later components overwrite earlier ones of the same type. If a
    /// component's type cannot be resolved the entity is discarded again and
    /// the error returned; its id stays consumed.
    pub fn add_entity<I>(&mut self, components: I) -> ECSResult<Entity>
    where
        I: IntoIterator<Item = C>,
    {
        let entity = self.allocator.allocate()?;
        self.entities.insert(entity, Signature::default());

        for component in components {
            if let Err(error) = self.add_component(entity, component) {
                self.discard(entity);
                return Err(error);
            }
        }

        log::trace!("added {entity}");
        Ok(entity)
    }

    /// Removes `entity` and all of its components.
    ///
    /// ## Errors
    /// [`ECSError::EntityNotFound`] if `entity` is not live; nothing changes.
    pub fn remove_entity(&mut self, entity: Entity) -> ECSResult<()> {
        self.take_entity(entity).map(|_| ())
    }

    /// Removes `entity` and returns its components in ascending key order.
    pub fn take_entity(&mut self, entity: Entity) -> ECSResult<Vec<C>> {
        let signature = self
            .entities
            .remove(&entity)
            .ok_or(EntityNotFoundError { entity })?;

        let components = signature
            .iter()
            .filter_map(|key| self.tables.remove(key, entity))
            .collect();

        log::trace!("removed {entity}");
        Ok(components)
    }

    /// Attaches `component` to `entity`, replacing any component of the same type.
    ///
    /// ## Errors
    /// * [`ECSError::EntityNotFound`] if `entity` is not live.
    /// * Registry errors if the component's type cannot be keyed.
    pub fn add_component(&mut self, entity: Entity, component: impl Into<C>) -> ECSResult<()> {
        let component = component.into();
        let Some(signature) = self.entities.get_mut(&entity) else {
            return Err(EntityNotFoundError { entity }.into());
        };
        let key = self.registry.resolve(&component)?;

        signature.set(key);
        self.tables.insert(key, entity, component);
        Ok(())
    }

    /// Detaches the component of type `key` from `entity` and returns it.
    ///
    /// Absence of the entity or of the component is a no-op.
    pub fn remove_component(&mut self, entity: Entity, key: TypeKey) -> Option<C> {
        let signature = self.entities.get_mut(&entity)?;
        if !signature.has(key) {
            return None;
        }
        signature.clear(key);
        self.tables.remove(key, entity)
    }

    /// Typed form of [`EntityComponentDatabase::remove_component`].
    pub fn remove<T: Variant<C>>(&mut self, entity: Entity) -> Option<T> {
        let key = self.registry.key_of::<T>()?;
        self.remove_component(entity, key)
            .and_then(|component| T::into_variant(component).ok())
    }

    /// Borrows the component of type `key` attached to `entity`.
    ///
    /// ## Errors
    /// [`ECSError::ComponentNotFound`] if the pair is absent.
    pub fn get_component(&self, entity: Entity, key: TypeKey) -> ECSResult<&C> {
        self.component(entity, key)
            .ok_or_else(|| ComponentNotFoundError { entity, key }.into())
    }

    /// Typed form of [`EntityComponentDatabase::get_component`].
    pub fn get<T: Variant<C>>(&self, entity: Entity) -> ECSResult<&T> {
        let key = self
            .registry
            .key_of::<T>()
            .ok_or(ECSError::UnregisteredType { name: type_name::<T>() })?;
        let component = self.get_component(entity, key)?;
        T::extract(component).ok_or(ECSError::TypeMismatch { key, expected: type_name::<T>() })
    }

    /// Borrows the component under `(key, entity)`, if any.
    #[inline]
    pub fn component(&self, entity: Entity, key: TypeKey) -> Option<&C> {
        self.tables.get(key, entity)
    }

    /// Number of live entities.
    #[inline]
    pub fn size(&self) -> usize {
        self.entities.len()
    }

    /// Returns `true` if there are no live entities.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Returns `true` if `entity` is live.
    #[inline]
    pub fn contains(&self, entity: Entity) -> bool {
        self.entities.contains_key(&entity)
    }

    /// Returns `true` if `entity` has a component of type `key`.
    #[inline]
    pub fn has_component(&self, entity: Entity, key: TypeKey) -> bool {
        self.entities.get(&entity).is_some_and(|signature| signature.has(key))
    }

    /// The set of component types attached to `entity`.
    #[inline]
    pub fn signature(&self, entity: Entity) -> Option<&Signature> {
        self.entities.get(&entity)
    }

    /// Live entities in ascending `unique_id` order.
    pub fn entities(&self) -> impl Iterator<Item = Entity> + '_ {
        self.entities.keys().copied()
    }

    /// Id the next [`EntityComponentDatabase::add_entity`] will assign.
    #[inline]
    pub fn last_unique_id(&self) -> EntityID {
        self.allocator.last_unique_id()
    }

    /// The registry this database resolves keys through.
    #[inline]
    pub fn registry(&self) -> &TypeRegistry {
        &self.registry
    }

    /// Mutable access to the registry, e.g. to pre-register or freeze it.
    #[inline]
    pub fn registry_mut(&mut self) -> &mut TypeRegistry {
        &mut self.registry
    }

    /// Key of component shape `T`, if registered.
    #[inline]
    pub fn key_of<T: 'static>(&self) -> Option<TypeKey> {
        self.registry.key_of::<T>()
    }

    /// Checks that tables and entity index agree.
    pub fn is_consistent(&self) -> bool {
        let indexed: usize = self.entities.values().map(Signature::count).sum();
        indexed == self.tables.row_count()
            && self.entities.iter().all(|(&entity, signature)| {
                signature.iter().all(|key| self.tables.get(key, entity).is_some())
            })
    }

    /// Entity index in ascending order, for the query engine.
    pub(crate) fn rows(&self) -> impl Iterator<Item = (Entity, &Signature)> + '_ {
        self.entities.iter().map(|(&entity, signature)| (entity, signature))
    }

    fn discard(&mut self, entity: Entity) {
        if let Some(signature) = self.entities.remove(&entity) {
            for key in signature.iter() {
                self.tables.remove(key, entity);
            }
        }
    }
}
