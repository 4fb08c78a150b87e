//! Core identifiers and bit-level layouts.
//!
//! This module defines the small, copyable identifiers shared by every other
//! part of the engine: entity ids, component type keys, system priorities and
//! the [`Signature`] bitset used to record which component types an entity
//! carries.
//!
//! ## Signatures
//!
//! Every live entity owns a [`Signature`]: a fixed-size bit array with one bit
//! per registered component type. Signatures make three hot operations cheap:
//!
//! - checking whether an entity has every type a query asks for,
//! - enumerating the tables an entity has rows in when it is removed,
//! - iterating an entity's component types in ascending key order.
//!
//! The number of distinct component types is bounded by [`COMPONENT_CAP`].

use std::fmt;


/// Unique entity identifier. Assigned monotonically, never reused.
pub type EntityID = u64;

/// Raw index backing a [`TypeKey`].
pub type KeyIndex = u16;

/// Priority of a system. Negative values are rejected at registration.
pub type SystemPriority = i32;

/// Maximum number of distinct component types per registry.
pub const COMPONENT_CAP: usize = 256;

/// Number of `u64` words required to represent a full signature.
pub const SIGNATURE_SIZE: usize = (COMPONENT_CAP + 63) / 64;

const _: [(); 1] = [(); (COMPONENT_CAP <= KeyIndex::MAX as usize + 1) as usize];

/// Stable, hashable identifier of a concrete component shape.
///
/// Keys are dense indices handed out by a
/// [`TypeRegistry`](crate::engine::component::TypeRegistry) in registration
/// order, so two registries fed the same registration sequence agree on every
/// key.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct TypeKey(pub KeyIndex);

impl TypeKey {
    /// Returns the key as a table index.
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for TypeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TypeKey({})", self.0)
    }
}

/// Bitset representing a set of component types.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct Signature {
    /// Packed component bitset.
    pub components: [u64; SIGNATURE_SIZE],
}

impl Default for Signature {
    fn default() -> Self {
        Self {
            components: [0u64; SIGNATURE_SIZE],
        }
    }
}

impl Signature {
    /// Sets the bit for `key`.
    #[inline]
    pub fn set(&mut self, key: TypeKey) {
        let (word, bit) = Self::slot(key);
        self.components[word] |= 1u64 << bit;
    }

    /// Clears the bit for `key`.
    #[inline]
    pub fn clear(&mut self, key: TypeKey) {
        let (word, bit) = Self::slot(key);
        self.components[word] &= !(1u64 << bit);
    }

    /// Returns `true` if `key` is present.
    #[inline]
    pub fn has(&self, key: TypeKey) -> bool {
        if key.index() >= COMPONENT_CAP {
            return false;
        }
        let (word, bit) = Self::slot(key);
        (self.components[word] >> bit) & 1 == 1
    }

    /// Returns `true` if every key in `other` is also present here.
    #[inline]
    pub fn contains_all(&self, other: &Signature) -> bool {
        self.components
            .iter()
            .zip(other.components.iter())
            .all(|(mine, theirs)| (mine & theirs) == *theirs)
    }

    /// Returns `true` if no key is set.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.components.iter().all(|&word| word == 0)
    }

    /// Number of keys set.
    #[inline]
    pub fn count(&self) -> usize {
        self.components.iter().map(|word| word.count_ones() as usize).sum()
    }

    /// Iterates over the keys set, in ascending order.
    pub fn iter(&self) -> impl Iterator<Item = TypeKey> + '_ {
        self.components
            .iter()
            .enumerate()
            .flat_map(|(word_index, &word)| {
                let base = word_index * 64;
                let mut bits = word;
                std::iter::from_fn(move || {
                    if bits == 0 {
                        return None;
                    }
                    let tz = bits.trailing_zeros() as usize;
                    bits &= bits - 1;
                    Some(TypeKey((base + tz) as KeyIndex))
                })
            })
    }

    #[inline]
    fn slot(key: TypeKey) -> (usize, usize) {
        debug_assert!(key.index() < COMPONENT_CAP, "type key {key} exceeds COMPONENT_CAP");
        (key.index() / 64, key.index() % 64)
    }
}

/// Builds a signature from a list of keys.
///
/// Returns `None` if any key lies outside [`COMPONENT_CAP`]; such a key can
/// never be attached to an entity.
pub fn build_signature(keys: &[TypeKey]) -> Option<Signature> {
    let mut signature = Signature::default();
    for &key in keys {
        if key.index() >= COMPONENT_CAP {
            return None;
        }
        signature.set(key);
    }
    Some(signature)
}
