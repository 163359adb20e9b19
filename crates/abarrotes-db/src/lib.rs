//! # abarrotes-db: Catalog Store and Sales Ledger
//!
//! Durable storage for Abarrotes POS on a local SQLite file, using sqlx for
//! async access.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Abarrotes POS Data Flow                          │
//! │                                                                         │
//! │  Presentation layer (inventory, product form, POS, reports)            │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                  abarrotes-db (THIS CRATE)                      │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌───────────────┐    ┌──────────────┐   │   │
//! │  │   │   Database    │    │  Repositories │    │  Migrations  │   │   │
//! │  │   │   (pool.rs)   │    │               │    │  (embedded)  │   │   │
//! │  │   │               │    │ ProductRepo   │    │              │   │   │
//! │  │   │ SqlitePool    │◄───│ SaleRepo      │    │ 0001_initial │   │   │
//! │  │   │ DbConfig      │    │               │    │              │   │   │
//! │  │   └───────────────┘    └───────────────┘    └──────────────┘   │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     SQLite Database                             │   │
//! │  │   ~/.local/share/pos/abarrotes.db  (or ABARROTES_DB_PATH)      │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Store configuration and connection pool
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database error types and their classification
//! - [`repository`] - Catalog Store and Sales Ledger
//!
//! ## Usage
//!
//! ```rust,ignore
//! use abarrotes_core::{Cart, NewProduct};
//! use abarrotes_db::{Database, DbConfig};
//!
//! let db = Database::new(DbConfig::from_env()?).await?;
//!
//! let id = db.products().create(NewProduct::new("Coca-Cola 600ml", 1500, 2200)).await?;
//!
//! let mut cart = Cart::new();
//! cart.add(&db.products().get(id).await?)?;
//! cart.add(&db.products().get(id).await?)?;
//!
//! let sale = db.sales().commit(&cart).await?;
//! cart.clear();
//! assert_eq!(sale.total_cents, 4400);
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

pub use error::{DbError, DbResult, ErrorKind};
pub use pool::{Database, DbConfig};

pub use repository::product::ProductRepository;
pub use repository::sale::SaleRepository;
