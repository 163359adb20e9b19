//! # abarrotes-core: Pure Business Logic for Abarrotes POS
//!
//! All business logic of the point of sale lives here as pure functions with
//! zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Abarrotes POS Architecture                         │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                   Presentation layer (external)                 │   │
//! │  │   Inventory ──► Product form ──► POS / scan ──► Reports         │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │             ★ abarrotes-core (THIS CRATE) ★                     │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐   │   │
//! │  │   │   types   │  │   money   │  │   cart    │  │ validation│   │   │
//! │  │   │  Product  │  │   Money   │  │   Cart    │  │ ProductForm│  │   │
//! │  │   │   Sale    │  │  parsing  │  │ CartEntry │  │   rules   │   │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘   │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               abarrotes-db (Catalog Store + Sales Ledger)       │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Product, Sale, SaleItem, ...)
//! - [`money`] - Money type with integer arithmetic
//! - [`cart`] - In-memory cart accumulated before a sale is committed
//! - [`error`] - Domain error types
//! - [`validation`] - Business rule validation and form parsing
//!
//! ## Example Usage
//!
//! ```rust
//! use abarrotes_core::money::Money;
//!
//! let price = Money::parse("18.50").unwrap();
//! assert_eq!(price.cents(), 1850);
//! assert_eq!((price * 2).to_string(), "$37.00");
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod cart;
pub mod error;
pub mod money;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use cart::{Cart, CartEntry, SaleDraft, SaleDraftLine};
pub use error::{CoreError, CoreResult, ValidationError};
pub use money::Money;
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Maximum length of a product name.
pub const MAX_NAME_LEN: usize = 200;

/// Maximum length of a barcode.
///
/// Generous enough for QR payloads while keeping rows small.
pub const MAX_BARCODE_LEN: usize = 128;

/// Maximum number of distinct products in one cart.
pub const MAX_CART_ITEMS: usize = 100;

/// Maximum quantity of a single cart entry or sale item.
///
/// Catches slips like typing 1000 instead of 10 at the register.
pub const MAX_ITEM_QUANTITY: i64 = 999;

/// Maximum unit price, in cents ($1,000,000.00).
///
/// Together with the two limits above this keeps every cart and sale total
/// far inside `i64`.
pub const MAX_PRICE_CENTS: i64 = 100_000_000;
