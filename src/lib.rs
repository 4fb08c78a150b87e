//! # ecdb
//!
//! In-memory entity-component database with a deterministic,
//! priority-tiered round scheduler.
//!
//! ## Design Goals
//! - Column-wise storage keyed by component type
//! - All-or-nothing queries, dynamic and statically typed
//! - Deterministic rounds: tiers in ascending priority, systems in insertion
//!   order, actions in emission order
//! - Single-owner mutation enforced by the borrow checker
//!
//! ## Quick tour
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
//! let entity = db
//!     .add_entity([
//!         Kinematics::Position(Position { x: 0, y: 0 }),
//!         Kinematics::Velocity(Velocity { x: 1, y: 1 }),
//!     ])
//!     .unwrap();
//!
//! let movement = FnSystem::new("movement", |db: &EntityComponentDatabase<Kinematics>| {
//!     db.query_static::<(Position, Velocity)>(16)
//!         .into_iter()
//!         .map(|(entity, (p, v))| Command::Add {
//!             entity,
//!             component: Position { x: p.x + v.x, y: p.y + v.y }.into(),
//!         })
//!         .collect::<Vec<Command<Kinematics>>>()
//! });
//!
//! let mut systems = SystemRegistry::new();
//! systems.add_system(movement, 0).unwrap();
//!
//! Scheduler::default().run(&mut db, &systems).unwrap();
//! assert_eq!(db.get::<Position>(entity).unwrap(), &Position { x: 1, y: 1 });
//! ```

#![forbid(unsafe_op_in_unsafe_fn)]
#![warn(missing_docs)]
#![allow(clippy::module_inception)]
#![deny(dead_code)]

pub mod engine;
pub mod profiling;

// ─────────────────────────────────────────────────────────────────────────────
// Re-exports (Public API)
// ─────────────────────────────────────────────────────────────────────────────

pub use engine::database::EntityComponentDatabase;

pub use engine::entity::Entity;

pub use engine::component::{
    Component,
    ComponentDesc,
    TypeRegistry,
    Variant,
};

pub use engine::query::{
    ComponentSet,
    QueryBuilder,
    QueryRow,
    QueryTuple,
};

pub use engine::commands::{Action, Command};

pub use engine::systems::{FnSystem, System, SystemRegistry};

pub use engine::scheduler::{
    FailurePolicy,
    RoundReport,
    Scheduler,
    SchedulerConfig,
};

pub use engine::linear::Rejected;

pub use engine::error::{
    ECSResult,
    ECSError,
    ExecutionError,
    CapacityError,
    EntityNotFoundError,
    ComponentNotFoundError,
    InvalidPriorityError,
};

pub use engine::types::{
    EntityID,
    KeyIndex,
    Signature,
    SystemPriority,
    TypeKey,
    COMPONENT_CAP,
};

pub use profiling::profiler;

// ─────────────────────────────────────────────────────────────────────────────
// Prelude
// ─────────────────────────────────────────────────────────────────────────────

/// Commonly used types.
///
/// Import with:
/// ```rust
/// use ecdb::prelude::*;
/// ```
pub mod prelude {
    pub use crate::{
        Action,
        Command,
        Component,
        EntityComponentDatabase,
        Entity,
        FailurePolicy,
        FnSystem,
        QueryBuilder,
        Scheduler,
        SchedulerConfig,
        System,
        SystemRegistry,
        TypeKey,
        TypeRegistry,
        Variant,
    };
}
