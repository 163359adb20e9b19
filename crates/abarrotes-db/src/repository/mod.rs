//! # Repository Module
//!
//! Database repositories for Abarrotes POS.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Repository Layout                                    │
//! │                                                                         │
//! │  Presentation layer                                                    │
//! │       │                                                                 │
//! │       │  db.products().scan("7501055300075")                           │
//! │       ▼                                                                 │
//! │  ProductRepository (Catalog Store)   SaleRepository (Sales Ledger)     │
//! │  ├── list / search / count           ├── commit(&cart)                 │
//! │  ├── get / get_by_barcode / scan     ├── list / get / count            │
//! │  └── create / update / delete        └── items / line_items            │
//! │       │                                      │                          │
//! │       └──────────────┬───────────────────────┘                          │
//! │                      ▼                                                  │
//! │                SQLite Database                                          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`ProductRepository`](product::ProductRepository) - Product CRUD and barcode lookup
//! - [`SaleRepository`](sale::SaleRepository) - Sale commits and history

pub mod product;
pub mod sale;
