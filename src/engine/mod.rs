//! # Engine Module
//!
//! Core building blocks of the entity-component database:
//! - Type keys and component registration
//! - Entity allocation and columnar component storage
//! - The database and its query engine
//! - Actions, systems, and the round scheduler
//!
//! Public API exposure is controlled by `lib.rs`.

pub mod types;
pub mod error;
pub mod component;
pub mod entity;
pub mod storage;
pub mod database;
pub mod query;
pub mod commands;
pub mod systems;
pub mod scheduler;
pub mod linear;
