//! # Type Key Resolver
//!
//! Components are application-defined values that are polymorphic over an
//! open set of concrete shapes. The engine needs exactly one thing from them:
//! a stable key for the concrete shape a value holds. This module provides
//! that mapping.
//!
//! ## Design
//! - A component union implements [`Component`], reporting the `TypeId` and
//!   name of the shape it currently holds.
//! - Each concrete shape `T` implements [`Variant<C>`] so typed code can pull
//!   a `&T` back out of a `&C`.
//! - A [`TypeRegistry`] turns `TypeId`s into dense [`TypeKey`]s in
//!   registration order. It is an ordinary value, constructed by the
//!   application and owned by a database. There is no process-wide table, so
//!   keys are deterministic for a given registration order.
//! - The registry can be frozen once setup is done; afterwards, resolving an
//!   unseen type fails instead of silently growing the key space.
//!
//! [`component_union!`](crate::component_union) writes the boilerplate for the
//! common case of an enum with one tuple variant per shape.
//!
//! ## Invariants
//! - Keys are unique per registry and stable for its lifetime.
//! - `by_key[key]` describes the type that `by_type` maps to `key`.
//! - At most [`COMPONENT_CAP`] keys exist.

use std::any::{type_name, TypeId};
use std::collections::HashMap;
use std::fmt;

use crate::engine::error::{CapacityError, ECSError, ECSResult};
use crate::engine::types::{KeyIndex, TypeKey, COMPONENT_CAP};


/// A value the database can store.
///
/// Implementors are usually enums with one variant per concrete shape; the
/// methods report the shape currently held.
pub trait Component: 'static {
    /// `TypeId` of the concrete shape held by this value.
    fn variant_type_id(&self) -> TypeId;

    /// Rust type name of the concrete shape, for diagnostics.
    fn variant_name(&self) -> &'static str;
}

/// A concrete shape of the component union `C`.
pub trait Variant<C>: Sized + 'static {
    /// Borrows the shape out of `component` if it holds one.
    fn extract(component: &C) -> Option<&Self>;

    /// Moves the shape out of `component`, handing the value back on mismatch.
    fn into_variant(component: C) -> Result<Self, C>;
}

/// Describes a registered component type.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct ComponentDesc {
    /// Key assigned by the registry.
    pub key: TypeKey,

    /// Rust type name.
    pub name: &'static str,

    /// Runtime `TypeId`.
    pub type_id: TypeId,
}

impl fmt::Display for ComponentDesc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ComponentDesc {{ key: {}, name: {} }}", self.key.0, self.name)
    }
}

/// Mapping between Rust types and dense [`TypeKey`]s.
#[derive(Clone, Debug, Default)]
pub struct TypeRegistry {
    by_type: HashMap<TypeId, TypeKey>,
    by_key: Vec<ComponentDesc>,
    frozen: bool,
}

impl TypeRegistry {
    /// Creates an empty, unfrozen registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `T` and returns its key. Registering twice returns the same key.
    ///
    /// ## Errors
    /// * [`ECSError::RegistryFrozen`] if `T` is new and the registry is frozen.
    /// * [`ECSError::ComponentCapacity`] past [`COMPONENT_CAP`] types.
    pub fn register<T: 'static>(&mut self) -> ECSResult<TypeKey> {
        self.register_type_id(TypeId::of::<T>(), type_name::<T>())
    }

    /// Registers a type by `TypeId`. See [`TypeRegistry::register`].
    pub fn register_type_id(&mut self, type_id: TypeId, name: &'static str) -> ECSResult<TypeKey> {
        if let Some(&existing) = self.by_type.get(&type_id) {
            return Ok(existing);
        }
        if self.frozen {
            return Err(ECSError::RegistryFrozen { name });
        }
        if self.by_key.len() >= COMPONENT_CAP {
            return Err(ECSError::ComponentCapacity(CapacityError {
                needed: self.by_key.len() as u64 + 1,
                capacity: COMPONENT_CAP as u64,
            }));
        }

        let key = TypeKey(self.by_key.len() as KeyIndex);
        self.by_type.insert(type_id, key);
        self.by_key.push(ComponentDesc { key, name, type_id });
        log::trace!("registered component type {name} as {key}");
        Ok(key)
    }

    /// Resolves the key of the shape held by `component`, registering it if
    /// it is new and the registry is not frozen.
    pub fn resolve<C: Component>(&mut self, component: &C) -> ECSResult<TypeKey> {
        self.register_type_id(component.variant_type_id(), component.variant_name())
    }

    /// Looks up the key of the shape held by `component` without registering.
    pub fn key_of_component<C: Component>(&self, component: &C) -> Option<TypeKey> {
        self.key_of_type_id(component.variant_type_id())
    }

    /// Returns the key of `T`, if registered.
    pub fn key_of<T: 'static>(&self) -> Option<TypeKey> {
        self.key_of_type_id(TypeId::of::<T>())
    }

    /// Returns the key for a `TypeId`, if registered.
    pub fn key_of_type_id(&self, type_id: TypeId) -> Option<TypeKey> {
        self.by_type.get(&type_id).copied()
    }

    /// Returns the descriptor for `key`, if registered.
    pub fn description(&self, key: TypeKey) -> Option<&ComponentDesc> {
        self.by_key.get(key.index())
    }

    /// Iterates over all descriptors in key order.
    pub fn iter(&self) -> impl Iterator<Item = &ComponentDesc> {
        self.by_key.iter()
    }

    /// Prevents further registrations.
    pub fn freeze(&mut self) {
        self.frozen = true;
    }

    /// Returns `true` once [`TypeRegistry::freeze`] was called.
    pub fn is_frozen(&self) -> bool {
        self.frozen
    }

    /// Number of registered types.
    pub fn len(&self) -> usize {
        self.by_key.len()
    }

    /// Returns `true` if nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.by_key.is_empty()
    }
}

/// Declares a component union.
///
/// Expands to the enum itself plus, for each variant, a `From<Shape>` impl and
/// a [`Variant`] impl, and a [`Component`] impl for the enum. Each shape type
/// may appear in one variant only.
///
/// ```
/// use ecdb::component_union;
///
/// #[derive(Clone, Debug, PartialEq)]
/// pub struct Position { pub x: i32, pub y: i32 }
///
/// #[derive(Clone, Debug, PartialEq)]
/// pub struct Velocity { pub x: i32, pub y: i32 }
///
/// component_union! {
///     #[derive(Clone, Debug, PartialEq)]
///     pub enum Kinematics {
///         Position(Position),
///         Velocity(Velocity),
///     }
/// }
///
/// let c: Kinematics = Position { x: 1, y: 2 }.into();
/// assert!(matches!(c, Kinematics::Position(_)));
/// ```
#[macro_export]
macro_rules! component_union {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident {
            $($variant:ident($shape:ty)),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        $vis enum $name {
            $($variant($shape)),+
        }

        impl $crate::engine::component::Component for $name {
            fn variant_type_id(&self) -> ::std::any::TypeId {
                match self {
                    $($name::$variant(_) => ::std::any::TypeId::of::<$shape>()),+
                }
            }

            fn variant_name(&self) -> &'static str {
                match self {
                    $($name::$variant(_) => ::std::any::type_name::<$shape>()),+
                }
            }
        }

        $(
            impl ::std::convert::From<$shape> for $name {
                fn from(value: $shape) -> Self {
                    $name::$variant(value)
                }
            }

            impl $crate::engine::component::Variant<$name> for $shape {
                fn extract(component: &$name) -> ::std::option::Option<&Self> {
                    match component {
                        $name::$variant(value) => ::std::option::Option::Some(value),
                        #[allow(unreachable_patterns)]
                        _ => ::std::option::Option::None,
                    }
                }

                fn into_variant(component: $name) -> ::std::result::Result<Self, $name> {
                    match component {
                        $name::$variant(value) => ::std::result::Result::Ok(value),
                        #[allow(unreachable_patterns)]
                        other => ::std::result::Result::Err(other),
                    }
                }
            }
        )+
    };
}
