//! Read-only queries over an [`EntityComponentDatabase`].
//!
//! Two flavours share one matching rule: an entity matches iff it carries a
//! component for *every* requested type. Entities missing even one type are
//! left out entirely; there is no left-join behaviour.
//!
//! * **Dynamic** — [`EntityComponentDatabase::query`] and [`QueryBuilder`]
//!   take a runtime list of [`TypeKey`]s and return [`QueryRow`]s holding the
//!   requested components in request order. An empty request returns every
//!   entity with all of its components. An optional filter over the entity's
//!   full [`ComponentSet`] can exclude further entities.
//! * **Static** — [`EntityComponentDatabase::query_static`] takes a tuple of
//!   shape types and returns `(Entity, (&T1, .., &Tn))` rows, so callers with a
//!   known shape never dispatch on the union.
//!
//! ## Determinism
//! Rows come out in ascending `unique_id` order. Queries borrow the database
//! immutably and never change it, so running one twice on the same state
//! yields the same rows.
//!
//! ## Example
//! ```
//! use ecdb::prelude::*;
//!
//! #[derive(Clone, Copy, Debug, PartialEq)]
//! pub struct Position { pub x: i32, pub y: i32 }
//!
//! #[derive(Clone, Copy, Debug, PartialEq)]
//! pub struct Velocity { pub x: i32, pub y: i32 }
//!
//! ecdb::component_union! {
//!     #[derive(Clone, Debug, PartialEq)]
//!     pub enum Kinematics {
//!         Position(Position),
//!         Velocity(Velocity),
//!     }
//! }
//!
//! let mut db = EntityComponentDatabase::<Kinematics>::new();
//! db.add_entity([
//!     Kinematics::Position(Position { x: 0, y: 0 }),
//!     Kinematics::Velocity(Velocity { x: 1, y: 2 }),
//! ])
//! .unwrap();
//! db.add_entity([Kinematics::Position(Position { x: 5, y: 5 })]).unwrap();
//!
//! let mut actions: Vec<Command<Kinematics>> = Vec::new();
//! for (entity, (p, v)) in db.query_static::<(Position, Velocity)>(128) {
//!     actions.push(Command::Add { entity, component: Position { x: p.x + v.x, y: p.y + v.y }.into() });
//! }
//! assert_eq!(actions.len(), 1);
//! ```

use std::any::TypeId;

use crate::engine::component::{Component, TypeRegistry, Variant};
use crate::engine::database::EntityComponentDatabase;
use crate::engine::entity::Entity;
use crate::engine::types::{build_signature, Signature, TypeKey};


/// One matching entity of a dynamic query.
#[derive(Debug)]
pub struct QueryRow<'a, C> {
    /// The matching entity.
    pub entity: Entity,

    /// Requested components, in request order (or key order for an empty request).
    pub components: Vec<&'a C>,
}

/// Read-only view of everything attached to one entity, handed to query filters.
pub struct ComponentSet<'a, C> {
    entity: Entity,
    signature: &'a Signature,
    database: &'a EntityComponentDatabase<C>,
}

impl<'a, C: Component> ComponentSet<'a, C> {
    /// The entity this set belongs to.
    #[inline]
    pub fn entity(&self) -> Entity {
        self.entity
    }

    /// Component of type `key`, if attached.
    #[inline]
    pub fn get(&self, key: TypeKey) -> Option<&'a C> {
        if !self.signature.has(key) {
            return None;
        }
        self.database.component(self.entity, key)
    }

    /// Typed component lookup.
    pub fn get_as<T: Variant<C>>(&self) -> Option<&'a T> {
        let key = self.database.key_of::<T>()?;
        self.get(key).and_then(T::extract)
    }

    /// Returns `true` if a component of type `key` is attached.
    #[inline]
    pub fn has(&self, key: TypeKey) -> bool {
        self.signature.has(key)
    }

    /// Attached types in ascending key order.
    pub fn keys(&self) -> impl Iterator<Item = TypeKey> + 'a {
        let signature: &'a Signature = self.signature;
        signature.iter()
    }

    /// Attached `(key, component)` pairs in ascending key order.
    pub fn iter(&self) -> impl Iterator<Item = (TypeKey, &'a C)> + 'a {
        let entity = self.entity;
        let database = self.database;
        let signature: &'a Signature = self.signature;
        signature
            .iter()
            .filter_map(move |key| database.component(entity, key).map(|c| (key, c)))
    }

    /// Number of attached components.
    #[inline]
    pub fn len(&self) -> usize {
        self.signature.count()
    }

    /// Returns `true` if nothing is attached.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.signature.is_empty()
    }
}

/// A requested component type, by key or by Rust type.
#[derive(Clone, Copy, Debug)]
enum Requested {
    Key(TypeKey),
    Type(TypeId),
}

type FilterFn<'f, C> = Box<dyn Fn(&ComponentSet<'_, C>) -> bool + 'f>;

/// Builder for dynamic queries.
///
/// Requested types may be given as keys or as Rust types; the latter are
/// resolved against the database's registry when the query runs, and a type
/// the registry has never seen simply matches nothing.
///
/// ```
/// use ecdb::prelude::*;
///
/// #[derive(Clone, Copy, Debug, PartialEq)]
/// pub struct Position { pub x: i32, pub y: i32 }
///
/// #[derive(Clone, Copy, Debug, PartialEq)]
/// pub struct Health(pub i32);
///
/// ecdb::component_union! {
///     #[derive(Clone, Debug, PartialEq)]
///     pub enum Agent {
///         Position(Position),
///         Health(Health),
///     }
/// }
///
/// let mut db = EntityComponentDatabase::<Agent>::new();
/// db.add_entity([Agent::Position(Position { x: 0, y: 0 }), Agent::Health(Health(3))]).unwrap();
/// db.add_entity([Agent::Position(Position { x: 1, y: 1 }), Agent::Health(Health(0))]).unwrap();
/// let health_key = db.key_of::<Health>().unwrap();
///
/// let rows = QueryBuilder::<Agent>::new()
///     .with::<Position>()
///     .with_key(health_key)
///     .filter(|set| set.get_as::<Health>().is_some_and(|h| h.0 > 0))
///     .collect(&db);
/// assert_eq!(rows.len(), 1);
/// assert_eq!(rows[0].entity, Entity(0));
/// ```
pub struct QueryBuilder<'f, C> {
    requested: Vec<Requested>,
    filter: Option<FilterFn<'f, C>>,
    reserve: usize,
}

impl<'f, C: Component> Default for QueryBuilder<'f, C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'f, C: Component> QueryBuilder<'f, C> {
    /// Creates a query that, until narrowed, matches every entity.
    pub fn new() -> Self {
        Self { requested: Vec::new(), filter: None, reserve: 0 }
    }

    /// Requires a component of type `key`.
    pub fn with_key(mut self, key: TypeKey) -> Self {
        self.requested.push(Requested::Key(key));
        self
    }

    /// Requires components of every type in `keys`, in order.
    pub fn with_keys(mut self, keys: impl IntoIterator<Item = TypeKey>) -> Self {
        self.requested.extend(keys.into_iter().map(Requested::Key));
        self
    }

    /// Requires a component of shape `T`.
    pub fn with<T: 'static>(mut self) -> Self {
        self.requested.push(Requested::Type(TypeId::of::<T>()));
        self
    }

    /// Keeps only entities whose full component set satisfies `predicate`.
    pub fn filter<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&ComponentSet<'_, C>) -> bool + 'f,
    {
        self.filter = Some(Box::new(predicate));
        self
    }

    /// Preallocates room for `rows` results. Has no effect on what matches.
    pub fn reserve(mut self, rows: usize) -> Self {
        self.reserve = rows;
        self
    }

    /// Runs the query.
    pub fn collect<'a>(&self, database: &'a EntityComponentDatabase<C>) -> Vec<QueryRow<'a, C>> {
        let mut rows = Vec::with_capacity(self.reserve);
        let Some(keys) = self.resolve(database.registry()) else {
            return rows;
        };
        let filter = |set: &ComponentSet<'_, C>| self.filter.as_ref().map_or(true, |f| f(set));
        run_dynamic(database, &keys, filter, &mut rows);
        rows
    }

    /// Number of entities the query matches. Components are not gathered.
    pub fn count(&self, database: &EntityComponentDatabase<C>) -> usize {
        let Some(keys) = self.resolve(database.registry()) else {
            return 0;
        };
        let filter = |set: &ComponentSet<'_, C>| self.filter.as_ref().map_or(true, |f| f(set));
        let mut matched = 0;
        for_each_match(database, &keys, filter, |_| matched += 1);
        matched
    }

    fn resolve(&self, registry: &TypeRegistry) -> Option<Vec<TypeKey>> {
        self.requested
            .iter()
            .map(|requested| match *requested {
                Requested::Key(key) => Some(key),
                Requested::Type(type_id) => registry.key_of_type_id(type_id),
            })
            .collect()
    }
}

fn run_dynamic<'a, C, F>(
    database: &'a EntityComponentDatabase<C>,
    keys: &[TypeKey],
    filter: F,
    rows: &mut Vec<QueryRow<'a, C>>,
) where
    C: Component,
    F: Fn(&ComponentSet<'a, C>) -> bool,
{
    for_each_match(database, keys, filter, |set| {
        let entity = set.entity;
        let components: Vec<&'a C> = if keys.is_empty() {
            set.iter().map(|(_, component)| component).collect()
        } else {
            keys.iter().filter_map(|&key| database.component(entity, key)).collect()
        };
        rows.push(QueryRow { entity, components });
    });
}

/// Visits the component set of every entity carrying all of `keys` and
/// passing `filter`, in ascending id order.
fn for_each_match<'a, C, F, V>(
    database: &'a EntityComponentDatabase<C>,
    keys: &[TypeKey],
    filter: F,
    mut visit: V,
) where
    C: Component,
    F: Fn(&ComponentSet<'a, C>) -> bool,
    V: FnMut(ComponentSet<'a, C>),
{
    let Some(required) = build_signature(keys) else {
        return;
    };

    for (entity, signature) in database.rows() {
        if !signature.contains_all(&required) {
            continue;
        }

        let set = ComponentSet { entity, signature, database };
        if filter(&set) {
            visit(set);
        }
    }
}

/// A fixed tuple of component shapes usable with
/// [`EntityComponentDatabase::query_static`].
///
/// Implemented for tuples of one to eight [`Variant`] types.
pub trait QueryTuple<C: Component> {
    /// Row payload: one reference per shape, in tuple order.
    type Item<'a>
    where
        C: 'a;

    /// Keys of the shapes in tuple order, or `None` if any is unregistered.
    fn keys(registry: &TypeRegistry) -> Option<Vec<TypeKey>>;

    /// Borrows every shape for `entity`, or `None` if one is missing.
    fn fetch<'a>(
        database: &'a EntityComponentDatabase<C>,
        entity: Entity,
        keys: &[TypeKey],
    ) -> Option<Self::Item<'a>>;
}

macro_rules! impl_query_tuple {
    ($($T:ident),+) => {
        impl<C: Component, $($T: Variant<C>),+> QueryTuple<C> for ($($T,)+) {
            type Item<'a> = ($(&'a $T,)+)
            where
                C: 'a;

            fn keys(registry: &TypeRegistry) -> Option<Vec<TypeKey>> {
                Some(vec![$(registry.key_of::<$T>()?),+])
            }

            fn fetch<'a>(
                database: &'a EntityComponentDatabase<C>,
                entity: Entity,
                keys: &[TypeKey],
            ) -> Option<Self::Item<'a>> {
                let mut keys = keys.iter();
                Some(($(
                    <$T as Variant<C>>::extract(database.component(entity, *keys.next()?)?)?,
                )+))
            }
        }
    };
}

impl_query_tuple!(A);
impl_query_tuple!(A, B);
impl_query_tuple!(A, B, D);
impl_query_tuple!(A, B, D, E);
impl_query_tuple!(A, B, D, E, F);
impl_query_tuple!(A, B, D, E, F, G);
impl_query_tuple!(A, B, D, E, F, G, H);
impl_query_tuple!(A, B, D, E, F, G, H, I);

impl<C: Component> EntityComponentDatabase<C> {
    /// Dynamic query over `keys`.
    ///
    /// An empty `keys` returns every entity with all of its components.
    pub fn query(&self, keys: &[TypeKey]) -> Vec<QueryRow<'_, C>> {
        let mut rows = Vec::new();
        run_dynamic(self, keys, |_| true, &mut rows);
        rows
    }

    /// Dynamic query over `keys`, additionally keeping only entities whose
    /// full component set satisfies `filter`.
    pub fn query_filtered<F>(&self, keys: &[TypeKey], filter: F) -> Vec<QueryRow<'_, C>>
    where
        F: Fn(&ComponentSet<'_, C>) -> bool,
    {
        let mut rows = Vec::new();
        run_dynamic(self, keys, filter, &mut rows);
        rows
    }

    /// Static query over the shapes in `Q`.
    ///
    /// `reserve_hint` only preallocates the result vector.
    pub fn query_static<Q: QueryTuple<C>>(&self, reserve_hint: usize) -> Vec<(Entity, Q::Item<'_>)> {
        let mut rows = Vec::with_capacity(reserve_hint);
        let Some(keys) = Q::keys(self.registry()) else {
            return rows;
        };
        let Some(required) = build_signature(&keys) else {
            return rows;
        };

        for (entity, signature) in self.rows() {
            if !signature.contains_all(&required) {
                continue;
            }
            if let Some(item) = Q::fetch(self, entity, &keys) {
                rows.push((entity, item));
            }
        }
        rows
    }
}
