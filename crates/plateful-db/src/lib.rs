//! # plateful-db: Order Storage for Plateful
//!
//! SQLite storage for priced orders, using sqlx for async access.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Plateful Data Flow                               │
//! │                                                                         │
//! │  OrderService::submit_with_checkout                                    │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                  plateful-db (THIS CRATE)                       │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌───────────────┐    ┌──────────────┐  │   │
//! │  │   │   Database    │    │  Repository   │    │  Migrations  │  │   │
//! │  │   │   (pool.rs)   │◄───│  (order.rs)   │    │  (embedded)  │  │   │
//! │  │   │  SqlitePool   │    │ OrderRepo     │    │ 001_orders   │  │   │
//! │  │   └───────────────┘    └───────────────┘    └──────────────┘  │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SQLite file (PLATEFUL_DB_PATH, default ./plateful.db)                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database error types
//! - [`repository`] - Order repository
//!
//! ## Usage
//!
//! ```rust,ignore
//! use plateful_db::{Database, DbConfig};
//!
//! let db = Database::new(DbConfig::new("plateful.db")).await?;
//! let recent = db.orders().list_recent(50, false).await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};
pub use repository::order::{NewOrder, OrderRepository};
