//! Systems and the systems registry.
//!
//! A **system** is a unit of logic that observes the database and answers
//! with the actions it wants applied. Systems:
//! - receive the database through a shared reference and cannot mutate it,
//! - return an ordered list of actions,
//! - are grouped into **tiers** by a non-negative [`SystemPriority`].
//!
//! ## Tiers
//! [`SystemRegistry`] keeps systems in a `BTreeMap` keyed by priority, so
//! tiers are always visited in ascending priority. Within a tier, systems keep
//! the order in which they were added. Both orders are what the scheduler
//! relies on for determinism.
//!
//! ## Function-backed Systems
//! Any `Fn(&EntityComponentDatabase<C>) -> Vec<A>` is a [`System`]. [`FnSystem`]
//! wraps such a closure together with a human-readable name, which shows up
//! in logs and profiler traces.
//!
//! The registry itself is generic over the stored system type `S`, so it can
//! hold an application enum, a concrete struct, or `Box<dyn System<C, A>>`.

use std::collections::BTreeMap;
use std::fmt;

use crate::engine::component::Component;
use crate::engine::database::EntityComponentDatabase;
use crate::engine::error::{ECSResult, InvalidPriorityError};
use crate::engine::types::SystemPriority;


/// A unit of logic run once per round.
///
/// Implementations must not rely on side effects outside the returned
/// actions; the scheduler only applies what `run` returns.
pub trait System<C: Component, A> {
    /// Observes `database` and returns the actions to apply, in order.
    fn run(&self, database: &EntityComponentDatabase<C>) -> Vec<A>;

    /// Human-readable name, used in logs and traces.
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }
}

impl<C, A, F> System<C, A> for F
where
    C: Component,
    F: Fn(&EntityComponentDatabase<C>) -> Vec<A>,
{
    fn run(&self, database: &EntityComponentDatabase<C>) -> Vec<A> {
        self(database)
    }
}

impl<C: Component, A> System<C, A> for Box<dyn System<C, A>> {
    fn run(&self, database: &EntityComponentDatabase<C>) -> Vec<A> {
        (**self).run(database)
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}

#[cfg(feature = "parallel")]
impl<C: Component, A> System<C, A> for Box<dyn System<C, A> + Send + Sync> {
    fn run(&self, database: &EntityComponentDatabase<C>) -> Vec<A> {
        (**self).run(database)
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}

/// A named [`System`] backed by a function or closure.
pub struct FnSystem<F> {
    name: &'static str,
    f: F,
}

impl<F> FnSystem<F> {
    /// Creates a new function-backed system.
    ///
    /// # Parameters
    /// - `name`: Human-readable name, useful for debugging and profiling.
    /// - `f`: The function or closure executed when the system runs.
    pub fn new(name: &'static str, f: F) -> Self {
        Self { name, f }
    }
}

impl<F> fmt::Debug for FnSystem<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnSystem").field("name", &self.name).finish_non_exhaustive()
    }
}

impl<C, A, F> System<C, A> for FnSystem<F>
where
    C: Component,
    F: Fn(&EntityComponentDatabase<C>) -> Vec<A>,
{
    fn run(&self, database: &EntityComponentDatabase<C>) -> Vec<A> {
        (self.f)(database)
    }

    fn name(&self) -> &str {
        self.name
    }
}

/// Systems grouped into priority tiers.
///
/// ## Invariants
/// - Every stored priority is non-negative.
/// - Tiers iterate in ascending priority; systems within a tier in insertion order.
/// - No tier is ever empty.
#[derive(Debug, Clone)]
pub struct SystemRegistry<S> {
    tiers: BTreeMap<SystemPriority, Vec<S>>,
}

impl<S> Default for SystemRegistry<S> {
    fn default() -> Self {
        Self { tiers: BTreeMap::new() }
    }
}

impl<S> SystemRegistry<S> {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `system` to the tier for `priority`.
    ///
    /// ## Errors
    /// [`ECSError::InvalidPriority`](crate::engine::error::ECSError::InvalidPriority)
    /// if `priority` is negative; the registry is left unchanged.
    pub fn add_system(&mut self, system: S, priority: SystemPriority) -> ECSResult<()> {
        if priority < 0 {
            return Err(InvalidPriorityError { priority }.into());
        }
        self.tiers.entry(priority).or_default().push(system);
        Ok(())
    }

    /// Total number of registered systems.
    pub fn len(&self) -> usize {
        self.tiers.values().map(Vec::len).sum()
    }

    /// Returns `true` if no system is registered.
    pub fn is_empty(&self) -> bool {
        self.tiers.is_empty()
    }

    /// Tiers in ascending priority.
    pub fn tiers(&self) -> impl Iterator<Item = (SystemPriority, &[S])> + '_ {
        self.tiers.iter().map(|(&priority, systems)| (priority, systems.as_slice()))
    }

    /// Occupied priorities in ascending order.
    pub fn priorities(&self) -> impl Iterator<Item = SystemPriority> + '_ {
        self.tiers.keys().copied()
    }

    /// Number of systems in the tier for `priority`.
    pub fn system_count(&self, priority: SystemPriority) -> usize {
        self.tiers.get(&priority).map_or(0, Vec::len)
    }
}
