//! Persistence layer for the property management backend.
//!
//! This crate contains:
//! - Database connection management
//! - Entity definitions (database row mappings)
//! - Executor-generic query functions
//! - The PostgreSQL implementation of the invitation ports

pub mod db;
pub mod entities;
pub mod metrics;
pub mod repositories;
pub mod store;

pub use store::{PgInvitationStore, PgUnitOfWork};
