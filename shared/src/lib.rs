//! Shared domain types for the studio booking system
//!
//! This crate holds everything that is meaningful outside the server
//! process: the persistent entities (tenant, member, session, reservation,
//! measurement), their create/update payloads, the reservation status
//! machine, and small utilities (timestamps, snowflake IDs, name
//! canonicalization).
//!
//! Enable the `db` feature to get `sqlx::FromRow` / `sqlx::Type` derives on
//! the entities.

pub mod models;
pub mod util;
