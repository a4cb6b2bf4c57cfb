//! PostgreSQL persistence adapters using Diesel ORM.
//!
//! This module provides concrete implementations of the driven repository
//! ports backed by PostgreSQL via Diesel with async support through
//! `diesel-async` and `bb8` connection pooling.
//!
//! # Architecture
//!
//! - **Thin adapters**: Repository implementations only translate between
//!   Diesel rows and domain types. No business logic resides here.
//! - **Internal models**: Diesel row structs (`models.rs`) and schema
//!   definitions (`schema.rs`) never leave this module.
//! - **Constraints decide races**: unique keys and compare-and-set updates,
//!   not prior lookups, settle concurrent writers.
//! - **Strongly typed errors**: All database errors are mapped to the
//!   port's persistence error type.
//!
//! # Example
//!
//! ```rust,no_run
//! use kpa_backend::outbound::persistence::{DbPool, DieselUserRepository, PoolConfig};
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let pool = DbPool::new(PoolConfig::new("postgres://localhost/kpa")).await?;
//! let users = DieselUserRepository::new(pool.clone());
//! # let _ = users;
//! # Ok(())
//! # }
//! ```

mod diesel_basic_error_mapping;
mod diesel_form_repository;
mod diesel_maintenance_repositories;
mod diesel_refresh_token_repository;
mod diesel_submission_repository;
mod diesel_user_repository;
mod json_serializers;
mod migrations;
mod models;
mod pool;
mod schema;

pub use diesel_form_repository::DieselFormRepository;
pub use diesel_maintenance_repositories::{
    DieselBogieChecksheetRepository, DieselWheelSpecificationRepository,
};
pub use diesel_refresh_token_repository::DieselRefreshTokenRepository;
pub use diesel_submission_repository::DieselSubmissionRepository;
pub use diesel_user_repository::DieselUserRepository;
pub use migrations::{MigrationError, run_pending_migrations};
pub use pool::{DbPool, PoolConfig, PoolError};
