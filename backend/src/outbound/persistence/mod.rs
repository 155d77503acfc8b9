//! PostgreSQL persistence adapters using Diesel ORM.
//!
//! Concrete implementation of the application repository port backed by
//! PostgreSQL via Diesel, with async support through `diesel-async` and
//! `bb8` connection pooling.
//!
//! # Architecture
//!
//! - **Thin adapter**: the repository only translates between Diesel rows and
//!   domain types. Validation and conflict policy live in the domain.
//! - **Internal models**: row structs (`models.rs`) and the table definition
//!   (`schema.rs`) never leave this module.
//! - **Lazy pooling**: the pool is built on first use through
//!   [`LazyDbPool`], so a missing database surfaces as a per-request
//!   `StoreUnavailable` rather than a startup crash.
//!
//! # Example
//!
//! ```no_run
//! use intake_backend::outbound::persistence::{
//!     DieselApplicationRepository, LazyDbPool, PoolConfig,
//! };
//!
//! let pool = LazyDbPool::new(PoolConfig::new("postgres://localhost/club"));
//! let repo = DieselApplicationRepository::new(pool, None);
//! # let _ = repo;
//! ```

mod diesel_application_repository;
mod migrations;
mod models;
mod pool;
mod schema;

pub use diesel_application_repository::{
    APPLICATIONS_TABLE, DieselApplicationRepository, database_name_from_url,
};
pub use migrations::{MIGRATIONS, MigrationError, run_pending_migrations};
pub use pool::{LazyDbPool, PoolConfig, PoolError};
