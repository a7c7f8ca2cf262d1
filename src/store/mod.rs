//! Persistence layer.
//!
//! The [`repository::ShareItStore`] trait defines the interface;
//! [`sqlite::SqliteStore`] is the default implementation.

pub mod repository;
pub mod sqlite;
