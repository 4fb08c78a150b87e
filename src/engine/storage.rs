//! Columnar component storage.
//!
//! Components live in one [`ComponentTable`] per component type, keyed by
//! entity. [`ComponentTables`] indexes the tables by [`TypeKey`] and creates
//! them lazily the first time a key receives a row.
//!
//! The tables know nothing about entity liveness; keeping them consistent with
//! the entity index is the database's job.

use std::collections::HashMap;

use crate::engine::entity::Entity;
use crate::engine::types::TypeKey;


/// All components of a single type, keyed by entity.
#[derive(Debug)]
pub struct ComponentTable<C> {
    rows: HashMap<Entity, C>,
}

impl<C> Default for ComponentTable<C> {
    fn default() -> Self {
        Self { rows: HashMap::new() }
    }
}

impl<C> ComponentTable<C> {
    /// Stores `component` for `entity`, returning the value it replaced.
    #[inline]
    pub fn insert(&mut self, entity: Entity, component: C) -> Option<C> {
        self.rows.insert(entity, component)
    }

    /// Removes and returns the row for `entity`.
    #[inline]
    pub fn remove(&mut self, entity: Entity) -> Option<C> {
        self.rows.remove(&entity)
    }

    /// Borrows the row for `entity`.
    #[inline]
    pub fn get(&self, entity: Entity) -> Option<&C> {
        self.rows.get(&entity)
    }

    /// Returns `true` if `entity` has a row.
    #[inline]
    pub fn contains(&self, entity: Entity) -> bool {
        self.rows.contains_key(&entity)
    }

    /// Number of rows.
    #[inline]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Returns `true` if the table has no rows.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// One [`ComponentTable`] per type key.
#[derive(Debug)]
pub struct ComponentTables<C> {
    tables: Vec<ComponentTable<C>>,
}

impl<C> Default for ComponentTables<C> {
    fn default() -> Self {
        Self { tables: Vec::new() }
    }
}

impl<C> ComponentTables<C> {
    /// Borrows the table for `key`, if one was ever created.
    #[inline]
    pub fn table(&self, key: TypeKey) -> Option<&ComponentTable<C>> {
        self.tables.get(key.index())
    }

    /// Borrows the table for `key`, creating it (and any lower ones) on demand.
    pub fn table_mut(&mut self, key: TypeKey) -> &mut ComponentTable<C> {
        if self.tables.len() <= key.index() {
            self.tables.resize_with(key.index() + 1, ComponentTable::default);
        }
        &mut self.tables[key.index()]
    }

    /// Borrows the component stored under `(key, entity)`.
    #[inline]
    pub fn get(&self, key: TypeKey, entity: Entity) -> Option<&C> {
        self.table(key).and_then(|table| table.get(entity))
    }

    /// Stores a component under `(key, entity)`, returning the replaced value.
    #[inline]
    pub fn insert(&mut self, key: TypeKey, entity: Entity, component: C) -> Option<C> {
        self.table_mut(key).insert(entity, component)
    }

    /// Removes the component under `(key, entity)`.
    #[inline]
    pub fn remove(&mut self, key: TypeKey, entity: Entity) -> Option<C> {
        self.tables.get_mut(key.index()).and_then(|table| table.remove(entity))
    }

    /// Total number of rows across all tables.
    pub fn row_count(&self) -> usize {
        self.tables.iter().map(ComponentTable::len).sum()
    }
}
