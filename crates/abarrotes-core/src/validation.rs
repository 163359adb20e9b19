//! # Validation Module
//!
//! Input validation and form parsing for Abarrotes POS.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Presentation layer                                           │
//! │  └── Collects raw strings from the product form                        │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: THIS MODULE                                                  │
//! │  ├── ProductForm: strings → NewProduct / ProductPatch                  │
//! │  └── Field rules (name, prices, stock, barcode, quantity)              │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Database (SQLite)                                            │
//! │  ├── NOT NULL / CHECK constraints                                      │
//! │  └── Partial UNIQUE index on barcode                                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use abarrotes_core::validation::ProductForm;
//!
//! let form = ProductForm {
//!     name: "Coca-Cola 600ml".into(),
//!     purchase_price: "15".into(),
//!     sale_price: "22.00".into(),
//!     stock: "".into(),
//!     barcode: "7501055300075".into(),
//! };
//! let product = form.to_new_product().unwrap();
//! assert_eq!(product.sale_price_cents, 2200);
//! assert_eq!(product.stock, Some(0));
//! ```

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::ValidationError;
use crate::money::parse_amount;
use crate::types::{NewProduct, ProductPatch};
use crate::{MAX_BARCODE_LEN, MAX_ITEM_QUANTITY, MAX_NAME_LEN, MAX_PRICE_CENTS};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// String Validators
// =============================================================================

/// Validates a product name.
///
/// ## Rules
/// - Must not be empty (after trimming)
/// - At most 200 characters
pub fn validate_product_name(name: &str) -> ValidationResult<()> {
    let name = name.trim();

    if name.is_empty() {
        return Err(ValidationError::required("name"));
    }

    if name.chars().count() > MAX_NAME_LEN {
        return Err(ValidationError::TooLong {
            field: "name".to_string(),
            max: MAX_NAME_LEN,
        });
    }

    Ok(())
}

/// Validates a (normalised) barcode.
///
/// Any printable payload is accepted: scanners yield EAN/UPC digits as well
/// as Code 39/128 and QR text.
pub fn validate_barcode(barcode: &str) -> ValidationResult<()> {
    if barcode.trim().is_empty() {
        return Err(ValidationError::required("barcode"));
    }

    if barcode.chars().count() > MAX_BARCODE_LEN {
        return Err(ValidationError::TooLong {
            field: "barcode".to_string(),
            max: MAX_BARCODE_LEN,
        });
    }

    if barcode.chars().any(char::is_control) {
        return Err(ValidationError::invalid_format(
            "barcode",
            "must not contain control characters",
        ));
    }

    Ok(())
}

/// Trims a barcode and turns blank values into `None`.
pub fn normalize_barcode(barcode: Option<String>) -> Option<String> {
    barcode
        .map(|code| code.trim().to_string())
        .filter(|code| !code.is_empty())
}

/// Validates a search query and returns it trimmed.
///
/// Empty is fine (shows every product); at most 100 characters.
pub fn validate_search_query(query: &str) -> ValidationResult<String> {
    let query = query.trim();

    if query.chars().count() > 100 {
        return Err(ValidationError::TooLong {
            field: "query".to_string(),
            max: 100,
        });
    }

    Ok(query.to_string())
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a price in cents: 0 (free items) up to [`MAX_PRICE_CENTS`].
///
/// ```rust
/// use abarrotes_core::validation::validate_price_cents;
///
/// assert!(validate_price_cents("salePrice", 1099).is_ok());
/// assert!(validate_price_cents("salePrice", 0).is_ok());
/// assert!(validate_price_cents("salePrice", -100).is_err());
/// assert!(validate_price_cents("salePrice", i64::MAX).is_err());
/// ```
pub fn validate_price_cents(field: &str, cents: i64) -> ValidationResult<()> {
    if !(0..=MAX_PRICE_CENTS).contains(&cents) {
        return Err(ValidationError::OutOfRange {
            field: field.to_string(),
            min: 0,
            max: MAX_PRICE_CENTS,
        });
    }

    Ok(())
}

/// Validates a stock level (non-negative).
pub fn validate_stock(stock: i64) -> ValidationResult<()> {
    if stock < 0 {
        return Err(ValidationError::OutOfRange {
            field: "stock".to_string(),
            min: 0,
            max: i64::MAX,
        });
    }

    Ok(())
}

/// Validates a line item quantity: positive, at most [`MAX_ITEM_QUANTITY`].
pub fn validate_quantity(qty: i64) -> ValidationResult<()> {
    if qty <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        });
    }

    if qty > MAX_ITEM_QUANTITY {
        return Err(ValidationError::OutOfRange {
            field: "quantity".to_string(),
            min: 1,
            max: MAX_ITEM_QUANTITY,
        });
    }

    Ok(())
}

// =============================================================================
// Field Parsers
// =============================================================================

/// Parses a required price field typed as a decimal string.
pub fn parse_price(field: &str, input: &str) -> ValidationResult<i64> {
    if input.trim().is_empty() {
        return Err(ValidationError::required(field));
    }

    let cents = parse_amount(field, input)?.cents();
    validate_price_cents(field, cents)?;
    Ok(cents)
}

/// Parses an optional stock field. Blank yields `None`.
pub fn parse_stock(input: &str) -> ValidationResult<Option<i64>> {
    let input = input.trim();
    if input.is_empty() {
        return Ok(None);
    }

    let stock: i64 = input
        .parse()
        .map_err(|_| ValidationError::invalid_format("stock", "expected a whole number"))?;
    validate_stock(stock)?;
    Ok(Some(stock))
}

// =============================================================================
// Product Form
// =============================================================================

/// Raw strings collected by the product form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase", default)]
#[ts(export)]
pub struct ProductForm {
    pub name: String,
    pub purchase_price: String,
    pub sale_price: String,
    pub stock: String,
    pub barcode: String,
}

impl ProductForm {
    /// Converts the form into a validated creation input.
    ///
    /// ## Rules
    /// ```text
    /// name, purchasePrice, salePrice   required
    /// prices                           decimal, 0 to 1,000,000, at most 2 decimals
    /// stock                            blank → 0, else whole number ≥ 0
    /// barcode                          blank → none
    /// ```
    pub fn to_new_product(&self) -> ValidationResult<NewProduct> {
        validate_product_name(&self.name)?;

        NewProduct {
            name: self.name.clone(),
            purchase_price_cents: parse_price("purchasePrice", &self.purchase_price)?,
            sale_price_cents: parse_price("salePrice", &self.sale_price)?,
            stock: parse_stock(&self.stock)?,
            barcode: Some(self.barcode.clone()),
        }
        .normalized()
    }

    /// Converts the form of an edit screen into a patch.
    ///
    /// The edit screen always submits every field, so the patch sets them all;
    /// a blank stock leaves the stored stock untouched and a blank barcode
    /// clears it.
    pub fn to_patch(&self) -> ValidationResult<ProductPatch> {
        validate_product_name(&self.name)?;

        Ok(ProductPatch {
            name: Some(self.name.trim().to_string()),
            purchase_price_cents: Some(parse_price("purchasePrice", &self.purchase_price)?),
            sale_price_cents: Some(parse_price("salePrice", &self.sale_price)?),
            stock: parse_stock(&self.stock)?,
            barcode: Some(normalize_barcode(Some(self.barcode.clone()))),
        })
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn form() -> ProductForm {
        ProductForm {
            name: "Coca-Cola 600ml".to_string(),
            purchase_price: "15.50".to_string(),
            sale_price: "22".to_string(),
            stock: "12".to_string(),
            barcode: " 7501055300075 ".to_string(),
        }
    }

    #[test]
    fn test_validate_product_name() {
        assert!(validate_product_name("Coca-Cola 600ml").is_ok());
        assert!(validate_product_name("").is_err());
        assert!(validate_product_name("   ").is_err());
        assert!(validate_product_name(&"A".repeat(300)).is_err());
    }

    #[test]
    fn test_validate_barcode() {
        assert!(validate_barcode("7501055300075").is_ok());
        assert!(validate_barcode("https://example.com/p/1").is_ok());
        assert!(validate_barcode("").is_err());
        assert!(validate_barcode("12\n34").is_err());
        assert!(validate_barcode(&"9".repeat(200)).is_err());
    }

    #[test]
    fn test_normalize_barcode() {
        assert_eq!(normalize_barcode(None), None);
        assert_eq!(normalize_barcode(Some("  ".to_string())), None);
        assert_eq!(
            normalize_barcode(Some(" 123 ".to_string())),
            Some("123".to_string())
        );
    }

    #[test]
    fn test_validate_numbers() {
        assert!(validate_price_cents("salePrice", 0).is_ok());
        assert!(validate_price_cents("salePrice", -1).is_err());
        assert!(validate_stock(0).is_ok());
        assert!(validate_stock(-1).is_err());
        assert!(validate_quantity(1).is_ok());
        assert!(validate_quantity(0).is_err());
        assert!(validate_quantity(-4).is_err());
    }

    #[test]
    fn test_numbers_have_upper_bounds() {
        assert!(validate_price_cents("salePrice", MAX_PRICE_CENTS).is_ok());
        assert_eq!(
            validate_price_cents("salePrice", MAX_PRICE_CENTS + 1),
            Err(ValidationError::OutOfRange {
                field: "salePrice".to_string(),
                min: 0,
                max: MAX_PRICE_CENTS,
            })
        );
        assert!(validate_price_cents("salePrice", i64::MAX).is_err());

        assert!(validate_quantity(MAX_ITEM_QUANTITY).is_ok());
        assert!(matches!(
            validate_quantity(MAX_ITEM_QUANTITY + 1),
            Err(ValidationError::OutOfRange { .. })
        ));
        assert!(validate_quantity(i64::MAX).is_err());

        let mut f = form();
        f.sale_price = "1000000.01".to_string();
        assert!(matches!(
            f.to_new_product().unwrap_err(),
            ValidationError::OutOfRange { field, .. } if field == "salePrice"
        ));
    }

    #[test]
    fn test_validate_search_query() {
        assert_eq!(validate_search_query("  cola ").unwrap(), "cola");
        assert_eq!(validate_search_query("").unwrap(), "");
        assert!(validate_search_query(&"x".repeat(101)).is_err());
    }

    #[test]
    fn test_form_to_new_product() {
        let product = form().to_new_product().unwrap();

        assert_eq!(product.name, "Coca-Cola 600ml");
        assert_eq!(product.purchase_price_cents, 1550);
        assert_eq!(product.sale_price_cents, 2200);
        assert_eq!(product.stock, Some(12));
        assert_eq!(product.barcode.as_deref(), Some("7501055300075"));
    }

    #[test]
    fn test_form_defaults() {
        let mut f = form();
        f.stock = String::new();
        f.barcode = "  ".to_string();

        let product = f.to_new_product().unwrap();
        assert_eq!(product.stock, Some(0));
        assert_eq!(product.barcode, None);
    }

    #[test]
    fn test_form_missing_required_fields() {
        let mut f = form();
        f.name = " ".to_string();
        assert_eq!(f.to_new_product().unwrap_err(), ValidationError::required("name"));

        let mut f = form();
        f.sale_price = String::new();
        assert_eq!(
            f.to_new_product().unwrap_err(),
            ValidationError::required("salePrice")
        );

        let mut f = form();
        f.purchase_price = "  ".to_string();
        assert_eq!(
            f.to_new_product().unwrap_err(),
            ValidationError::required("purchasePrice")
        );
    }

    #[test]
    fn test_form_non_numeric_fields() {
        let mut f = form();
        f.sale_price = "veinte".to_string();
        assert!(matches!(
            f.to_new_product().unwrap_err(),
            ValidationError::InvalidFormat { field, .. } if field == "salePrice"
        ));

        let mut f = form();
        f.stock = "1.5".to_string();
        assert!(matches!(
            f.to_new_product().unwrap_err(),
            ValidationError::InvalidFormat { field, .. } if field == "stock"
        ));

        let mut f = form();
        f.purchase_price = "-3".to_string();
        assert!(matches!(
            f.to_new_product().unwrap_err(),
            ValidationError::OutOfRange { field, .. } if field == "purchasePrice"
        ));
    }

    #[test]
    fn test_form_to_patch() {
        let patch = form().to_patch().unwrap();
        assert_eq!(patch.name.as_deref(), Some("Coca-Cola 600ml"));
        assert_eq!(patch.purchase_price_cents, Some(1550));
        assert_eq!(patch.sale_price_cents, Some(2200));
        assert_eq!(patch.stock, Some(12));
        assert_eq!(patch.barcode, Some(Some("7501055300075".to_string())));

        let mut f = form();
        f.stock = String::new();
        f.barcode = String::new();
        let patch = f.to_patch().unwrap();
        assert_eq!(patch.stock, None);
        assert_eq!(patch.barcode, Some(None));
    }
}
