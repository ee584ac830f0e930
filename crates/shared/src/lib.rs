//! Shared utilities for the property management backend.
//!
//! This crate provides common functionality used across all other crates:
//! - Token hashing for invitation lookups
//! - Log-safe token redaction

pub mod crypto;
