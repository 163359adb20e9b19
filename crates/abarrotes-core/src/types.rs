//! # Domain Types
//!
//! Core domain types used throughout Abarrotes POS.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────────┐   ┌─────────────────┐   ┌─────────────────┐   │
//! │  │      Product        │   │      Sale       │   │    SaleItem     │   │
//! │  │  ─────────────────  │   │  ─────────────  │   │  ─────────────  │   │
//! │  │  id (i64)           │   │  id (i64)       │   │  sale_id (FK)   │   │
//! │  │  name               │   │  date           │   │  product_id     │   │
//! │  │  purchase_price     │   │  total_cents    │   │  (weak ref)     │   │
//! │  │  sale_price         │   └─────────────────┘   │  quantity       │   │
//! │  │  stock, barcode     │                         │  price (frozen) │   │
//! │  └─────────────────────┘                         └─────────────────┘   │
//! │                                                                         │
//! │  Inputs:  NewProduct (create)   ProductPatch (partial update)           │
//! │  Reads:   SaleLine (item + resolved name)   ScanOutcome (barcode scan)  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Weak References
//! `SaleItem.product_id` records which product was sold but does not keep it
//! alive: the product may later be repriced or deleted without touching the
//! sale history. Quantity and price are self-contained on the item.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use ts_rs::TS;

use crate::money::Money;
use crate::validation::{
    normalize_barcode, validate_barcode, validate_price_cents, validate_product_name,
    validate_stock, ValidationResult,
};

// =============================================================================
// Product
// =============================================================================

/// A product in the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Product {
    /// Unique identifier, assigned by the store.
    pub id: i64,

    /// Display name shown in inventory, POS search and reports.
    pub name: String,

    /// Cost basis in cents.
    pub purchase_price_cents: i64,

    /// Price charged to the customer, in cents.
    pub sale_price_cents: i64,

    /// Quantity on hand. `None` for legacy records with unknown stock.
    pub stock: Option<i64>,

    /// Barcode (EAN-13, UPC-A, QR payload, ...). Unique when present.
    pub barcode: Option<String>,

    /// When the product was created.
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,

    /// When the product was last updated.
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// Returns the sale price as Money.
    #[inline]
    pub fn sale_price(&self) -> Money {
        Money::from_cents(self.sale_price_cents)
    }

    /// Returns the purchase price as Money.
    #[inline]
    pub fn purchase_price(&self) -> Money {
        Money::from_cents(self.purchase_price_cents)
    }

    /// Profit per unit (sale price minus purchase price). May be negative.
    pub fn margin(&self) -> Money {
        self.sale_price() - self.purchase_price()
    }

    /// Applies a partial update in place (read-modify-write).
    ///
    /// ## Semantics
    /// ```text
    /// patch field   │ effect
    /// ──────────────┼────────────────────────────────────
    /// None          │ keep current value
    /// Some(v)       │ replace with v
    /// barcode:      │ Some(None) clears, Some(Some(c)) sets
    /// ```
    ///
    /// Omitted fields are NEVER nulled out. The result is not validated here;
    /// call [`Product::validate`] afterwards.
    pub fn apply_patch(&mut self, patch: ProductPatch) {
        if let Some(name) = patch.name {
            self.name = name.trim().to_string();
        }
        if let Some(cents) = patch.purchase_price_cents {
            self.purchase_price_cents = cents;
        }
        if let Some(cents) = patch.sale_price_cents {
            self.sale_price_cents = cents;
        }
        if let Some(stock) = patch.stock {
            self.stock = Some(stock);
        }
        if let Some(barcode) = patch.barcode {
            self.barcode = normalize_barcode(barcode);
        }
    }

    /// Checks every field invariant of a stored product.
    pub fn validate(&self) -> ValidationResult<()> {
        validate_product_name(&self.name)?;
        validate_price_cents("purchasePrice", self.purchase_price_cents)?;
        validate_price_cents("salePrice", self.sale_price_cents)?;
        if let Some(stock) = self.stock {
            validate_stock(stock)?;
        }
        if let Some(barcode) = &self.barcode {
            validate_barcode(barcode)?;
        }
        Ok(())
    }
}

/// Filters products by a case-insensitive substring of their name.
///
/// A blank query keeps every product. Order is preserved.
pub fn filter_by_name(products: Vec<Product>, query: &str) -> Vec<Product> {
    let query = query.trim().to_lowercase();
    if query.is_empty() {
        return products;
    }

    products
        .into_iter()
        .filter(|p| p.name.to_lowercase().contains(&query))
        .collect()
}

// =============================================================================
// Product Inputs
// =============================================================================

/// Input for creating a product.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct NewProduct {
    pub name: String,
    pub purchase_price_cents: i64,
    pub sale_price_cents: i64,
    /// Defaults to 0 when omitted.
    #[serde(default)]
    pub stock: Option<i64>,
    #[serde(default)]
    pub barcode: Option<String>,
}

impl NewProduct {
    /// Creates an input with the required fields; stock and barcode unset.
    pub fn new(name: impl Into<String>, purchase_price_cents: i64, sale_price_cents: i64) -> Self {
        NewProduct {
            name: name.into(),
            purchase_price_cents,
            sale_price_cents,
            stock: None,
            barcode: None,
        }
    }

    /// Sets the stock on hand.
    pub fn with_stock(mut self, stock: i64) -> Self {
        self.stock = Some(stock);
        self
    }

    /// Sets the barcode.
    pub fn with_barcode(mut self, barcode: impl Into<String>) -> Self {
        self.barcode = Some(barcode.into());
        self
    }

    /// Validates the input and returns its normalised form.
    ///
    /// ## Normalisation
    /// - name is trimmed
    /// - missing stock becomes 0
    /// - blank barcode becomes `None`
    pub fn normalized(self) -> ValidationResult<NewProduct> {
        let name = self.name.trim().to_string();
        validate_product_name(&name)?;
        validate_price_cents("purchasePrice", self.purchase_price_cents)?;
        validate_price_cents("salePrice", self.sale_price_cents)?;

        let stock = self.stock.unwrap_or(0);
        validate_stock(stock)?;

        let barcode = normalize_barcode(self.barcode);
        if let Some(code) = &barcode {
            validate_barcode(code)?;
        }

        Ok(NewProduct {
            name,
            purchase_price_cents: self.purchase_price_cents,
            sale_price_cents: self.sale_price_cents,
            stock: Some(stock),
            barcode,
        })
    }
}

/// Partial update of a product. `None` means "leave unchanged".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct ProductPatch {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub purchase_price_cents: Option<i64>,
    #[serde(default)]
    pub sale_price_cents: Option<i64>,
    #[serde(default)]
    pub stock: Option<i64>,
    /// `None`: unchanged. `Some(None)`: clear. `Some(Some(code))`: set.
    ///
    /// In JSON, a missing key leaves the barcode alone while an explicit
    /// `null` clears it.
    #[serde(default, deserialize_with = "explicit_null")]
    pub barcode: Option<Option<String>>,
}

impl ProductPatch {
    /// Returns true when the patch changes nothing.
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.purchase_price_cents.is_none()
            && self.sale_price_cents.is_none()
            && self.stock.is_none()
            && self.barcode.is_none()
    }
}

/// Distinguishes an explicit `null` from a missing key.
fn explicit_null<'de, D>(deserializer: D) -> Result<Option<Option<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<String>::deserialize(deserializer).map(Some)
}

/// Result of looking up a scanned barcode.
///
/// ```text
/// scan "7501055300075"
///      │
///      ├── Known(product)  → add to cart
///      └── Unknown(code)   → offer to create a product with this barcode
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, TS)]
#[serde(tag = "kind", content = "value", rename_all = "camelCase")]
#[ts(export)]
pub enum ScanOutcome {
    Known(Product),
    Unknown(String),
}

// =============================================================================
// Sale
// =============================================================================

/// A committed sale. Immutable once written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Sale {
    pub id: i64,
    /// Commit timestamp.
    #[ts(as = "String")]
    pub date: DateTime<Utc>,
    /// Σ quantity × price over the sale's items, in cents.
    pub total_cents: i64,
}

impl Sale {
    /// Returns the total as Money.
    #[inline]
    pub fn total(&self) -> Money {
        Money::from_cents(self.total_cents)
    }
}

// =============================================================================
// Sale Item
// =============================================================================

/// A stored line item of a sale.
/// Uses the snapshot pattern to freeze price and name at commit time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct SaleItem {
    pub id: i64,
    pub sale_id: i64,
    /// Weak reference: the product may no longer exist.
    pub product_id: i64,
    pub quantity: i64,
    /// Unit sale price at commit time (frozen).
    pub price_cents: i64,
    /// Product name at commit time (frozen).
    pub name_snapshot: String,
}

impl SaleItem {
    /// quantity × price.
    #[inline]
    pub fn line_total(&self) -> Money {
        Money::from_cents(self.price_cents).multiply_quantity(self.quantity)
    }
}

/// A sale line ready for display in the sale detail view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct SaleLine {
    pub product_id: i64,
    /// Current product name, or the commit-time snapshot once the product
    /// has been deleted.
    pub name: String,
    pub quantity: i64,
    pub price_cents: i64,
    /// False when the referenced product has been deleted since the sale.
    pub product_exists: bool,
}

impl SaleLine {
    /// Unit price as Money.
    #[inline]
    pub fn price(&self) -> Money {
        Money::from_cents(self.price_cents)
    }

    /// quantity × price.
    #[inline]
    pub fn line_total(&self) -> Money {
        self.price().multiply_quantity(self.quantity)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
