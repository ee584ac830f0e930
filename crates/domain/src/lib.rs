//! Domain layer for the property management backend.
//!
//! This crate contains:
//! - Domain models (invitations, users, companies, memberships, roles)
//! - Repository ports and the unit-of-work abstraction
//! - The invitation acceptance workflow and related invitation services

pub mod models;
pub mod ports;
pub mod services;
