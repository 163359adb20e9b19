//! # Cart
//!
//! The in-progress sale: a list of product snapshots with quantities.
//! Pure state, no I/O. Nothing here is persisted until the Sales Ledger
//! commits it.
//!
//! ## Cart Operations Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Cart Operations                                      │
//! │                                                                         │
//! │  User Action              Cart Method               Effect              │
//! │  ───────────              ───────────               ──────              │
//! │                                                                         │
//! │  Tap / scan product ────► add(&product) ──────────► qty += 1 or push    │
//! │                                                                         │
//! │  ➕ / ➖ ────────────────► set_quantity(id, ±1) ───► qty = max(1, q+Δ)  │
//! │                                                                         │
//! │  Remove line ───────────► remove(id) ─────────────► entry dropped       │
//! │                                                                         │
//! │  Finish sale ───────────► checkout() ─────────────► SaleDraft           │
//! │                                                                         │
//! │  After commit ──────────► clear()                                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Invariants
//! - One entry per product id (adding again increments the quantity)
//! - Every entry has quantity between 1 and [`MAX_ITEM_QUANTITY`]; an entry
//!   is removed, never left at 0
//! - Every sale price lies within `0..=MAX_PRICE_CENTS`
//! - At most [`MAX_CART_ITEMS`] entries
//!
//! A cart deserialized from JSON goes through the same checks.
//!
//! [`MAX_PRICE_CENTS`]: crate::MAX_PRICE_CENTS

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use ts_rs::TS;

use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::types::Product;
use crate::validation::{validate_price_cents, validate_quantity};
use crate::{MAX_CART_ITEMS, MAX_ITEM_QUANTITY};

// =============================================================================
// Cart Entry
// =============================================================================

/// A line of the cart.
///
/// The product fields are a snapshot taken when the product was first added:
/// the cart keeps charging that price even if the catalog changes meanwhile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct CartEntry {
    pub product_id: i64,
    pub name: String,
    pub sale_price_cents: i64,
    pub purchase_price_cents: i64,
    pub stock: Option<i64>,
    pub barcode: Option<String>,
    /// Always ≥ 1.
    pub quantity: i64,
}

impl CartEntry {
    /// Snapshots a product with quantity 1.
    pub fn from_product(product: &Product) -> Self {
        CartEntry {
            product_id: product.id,
            name: product.name.clone(),
            sale_price_cents: product.sale_price_cents,
            purchase_price_cents: product.purchase_price_cents,
            stock: product.stock,
            barcode: product.barcode.clone(),
            quantity: 1,
        }
    }

    /// Unit sale price as Money.
    #[inline]
    pub fn sale_price(&self) -> Money {
        Money::from_cents(self.sale_price_cents)
    }

    /// sale price × quantity.
    #[inline]
    pub fn line_total(&self) -> Money {
        self.sale_price().multiply_quantity(self.quantity)
    }

    fn validate(&self) -> CoreResult<()> {
        validate_quantity(self.quantity)?;
        validate_price_cents("salePrice", self.sale_price_cents)?;
        validate_price_cents("purchasePrice", self.purchase_price_cents)?;
        Ok(())
    }
}

// =============================================================================
// Cart
// =============================================================================

/// The shopping cart.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[serde(try_from = "CartSnapshot")]
#[ts(export)]
pub struct Cart {
    entries: Vec<CartEntry>,
}

/// Incoming cart JSON, before the invariants are checked.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CartSnapshot {
    entries: Vec<CartEntry>,
}

impl TryFrom<CartSnapshot> for Cart {
    type Error = CoreError;

    fn try_from(snapshot: CartSnapshot) -> CoreResult<Self> {
        if snapshot.entries.len() > MAX_CART_ITEMS {
            return Err(CoreError::CartFull {
                max: MAX_CART_ITEMS,
            });
        }

        let mut seen = HashSet::with_capacity(snapshot.entries.len());
        for entry in &snapshot.entries {
            entry.validate()?;
            if !seen.insert(entry.product_id) {
                return Err(CoreError::DuplicateEntry(entry.product_id));
            }
        }

        Ok(Cart {
            entries: snapshot.entries,
        })
    }
}

impl Cart {
    /// Creates an empty cart.
    pub fn new() -> Self {
        Cart::default()
    }

    /// Adds one unit of a product.
    ///
    /// If the product is already in the cart its quantity goes up by one and
    /// the first price snapshot is kept; otherwise a new entry with
    /// quantity 1 is appended.
    ///
    /// ## Errors
    /// * `CoreError::QuantityLimit` - The entry is already at [`MAX_ITEM_QUANTITY`]
    /// * `CoreError::CartFull` - A new entry would exceed [`MAX_CART_ITEMS`]
    /// * `CoreError::Validation` - The product's prices are out of range
    ///
    /// The cart is unchanged on error.
    pub fn add(&mut self, product: &Product) -> CoreResult<()> {
        if let Some(entry) = self.entry_mut(product.id) {
            if entry.quantity >= MAX_ITEM_QUANTITY {
                return Err(CoreError::QuantityLimit {
                    product_id: product.id,
                    max: MAX_ITEM_QUANTITY,
                });
            }
            entry.quantity += 1;
            return Ok(());
        }

        if self.entries.len() >= MAX_CART_ITEMS {
            return Err(CoreError::CartFull {
                max: MAX_CART_ITEMS,
            });
        }

        let entry = CartEntry::from_product(product);
        entry.validate()?;
        self.entries.push(entry);
        Ok(())
    }

    /// Adjusts the quantity of an entry by `delta`, clamped to
    /// `1..=MAX_ITEM_QUANTITY`.
    ///
    /// ```text
    ///   qty 3, delta +2      → 5
    ///   qty 3, delta -10     → 1     (use remove() to drop the line)
    ///   qty 3, delta +5000   → 999
    /// ```
    pub fn set_quantity(&mut self, product_id: i64, delta: i64) -> CoreResult<()> {
        let entry = self
            .entry_mut(product_id)
            .ok_or(CoreError::NotInCart(product_id))?;

        entry.quantity = entry
            .quantity
            .saturating_add(delta)
            .clamp(1, MAX_ITEM_QUANTITY);
        Ok(())
    }

    /// Removes an entry entirely.
    pub fn remove(&mut self, product_id: i64) -> CoreResult<CartEntry> {
        let index = self
            .entries
            .iter()
            .position(|e| e.product_id == product_id)
            .ok_or(CoreError::NotInCart(product_id))?;

        Ok(self.entries.remove(index))
    }

    /// Σ sale price × quantity over the current entries.
    ///
    /// Computed on every call, never cached. The entry limits bound it to
    /// about 10^13 cents, so the sum is exact.
    pub fn total(&self) -> Money {
        self.entries.iter().map(CartEntry::line_total).sum()
    }

    /// Empties the cart.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Entries in insertion order.
    pub fn entries(&self) -> &[CartEntry] {
        &self.entries
    }

    /// Looks up the entry for a product.
    pub fn get(&self, product_id: i64) -> Option<&CartEntry> {
        self.entries.iter().find(|e| e.product_id == product_id)
    }

    /// Number of distinct products.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Total number of units across entries.
    pub fn total_quantity(&self) -> i64 {
        self.entries.iter().map(|e| e.quantity).sum()
    }

    /// Freezes the cart into the rows a sale commit writes.
    ///
    /// Fails with [`CoreError::EmptyCart`] when there is nothing to sell.
    pub fn checkout(&self) -> CoreResult<SaleDraft> {
        if self.is_empty() {
            return Err(CoreError::EmptyCart);
        }

        let lines = self
            .entries
            .iter()
            .map(|e| SaleDraftLine {
                product_id: e.product_id,
                name: e.name.clone(),
                quantity: e.quantity,
                price_cents: e.sale_price_cents,
            })
            .collect();

        Ok(SaleDraft { lines })
    }

    fn entry_mut(&mut self, product_id: i64) -> Option<&mut CartEntry> {
        self.entries.iter_mut().find(|e| e.product_id == product_id)
    }
}

// =============================================================================
// Sale Draft
// =============================================================================

/// The rows of a sale about to be committed: one line per cart entry, with
/// the snapshotted price.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaleDraft {
    pub lines: Vec<SaleDraftLine>,
}

/// A sale item before it has an id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaleDraftLine {
    pub product_id: i64,
    pub name: String,
    pub quantity: i64,
    pub price_cents: i64,
}

impl SaleDraft {
    /// Σ quantity × price. Equals the cart total the draft was built from.
    pub fn total(&self) -> Money {
        self.lines
            .iter()
            .map(|l| Money::from_cents(l.price_cents).multiply_quantity(l.quantity))
            .sum()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ValidationError;
    use crate::MAX_PRICE_CENTS;
    use chrono::Utc;
    use proptest::prelude::*;
    use proptest::test_runner::Config;

    fn product(id: i64, sale_price_cents: i64) -> Product {
        Product {
            id,
            name: format!("Product {}", id),
            purchase_price_cents: sale_price_cents / 2,
            sale_price_cents,
            stock: Some(10),
            barcode: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_add_new_product() {
        let mut cart = Cart::new();
        cart.add(&product(1, 2200)).unwrap();

        assert_eq!(cart.len(), 1);
        assert_eq!(cart.get(1).unwrap().quantity, 1);
        assert_eq!(cart.total().cents(), 2200);
    }

    #[test]
    fn test_add_same_product_increments_quantity() {
        let mut cart = Cart::new();
        let p = product(1, 2200);

        cart.add(&p).unwrap();
        cart.add(&p).unwrap();
        cart.add(&p).unwrap();

        assert_eq!(cart.len(), 1);
        assert_eq!(cart.total_quantity(), 3);
        assert_eq!(cart.total().cents(), 6600);
    }

    #[test]
    fn test_add_keeps_first_price_snapshot() {
        let mut cart = Cart::new();
        let mut p = product(1, 2200);
        cart.add(&p).unwrap();

        p.sale_price_cents = 9900;
        cart.add(&p).unwrap();

        assert_eq!(cart.get(1).unwrap().sale_price_cents, 2200);
        assert_eq!(cart.total().cents(), 4400);
    }

    #[test]
    fn test_set_quantity_clamps_to_one() {
        let mut cart = Cart::new();
        cart.add(&product(1, 1000)).unwrap();

        cart.set_quantity(1, 2).unwrap();
        assert_eq!(cart.get(1).unwrap().quantity, 3);

        cart.set_quantity(1, -1).unwrap();
        assert_eq!(cart.get(1).unwrap().quantity, 2);

        cart.set_quantity(1, -10).unwrap();
        assert_eq!(cart.get(1).unwrap().quantity, 1);
        assert_eq!(cart.len(), 1);
    }

    #[test]
    fn test_set_quantity_unknown_product() {
        let mut cart = Cart::new();
        assert_eq!(cart.set_quantity(9, 1), Err(CoreError::NotInCart(9)));
    }

    #[test]
    fn test_remove() {
        let mut cart = Cart::new();
        cart.add(&product(1, 1000)).unwrap();
        cart.add(&product(2, 500)).unwrap();

        let removed = cart.remove(1).unwrap();
        assert_eq!(removed.product_id, 1);
        assert_eq!(cart.len(), 1);
        assert_eq!(cart.total().cents(), 500);

        assert_eq!(cart.remove(1), Err(CoreError::NotInCart(1)));
    }

    #[test]
    fn test_clear() {
        let mut cart = Cart::new();
        cart.add(&product(1, 1000)).unwrap();
        assert!(!cart.is_empty());

        cart.clear();
        assert!(cart.is_empty());
        assert!(cart.total().is_zero());
    }

    #[test]
    fn test_total_of_mixed_cart() {
        let mut cart = Cart::new();
        let coke = product(1, 2200);
        let chips = product(2, 1850);

        cart.add(&coke).unwrap();
        cart.add(&coke).unwrap();
        cart.add(&chips).unwrap();

        assert_eq!(cart.total().cents(), 6250);
        assert_eq!(cart.total().to_string(), "$62.50");
    }

    #[test]
    fn test_quantity_is_capped() {
        let mut cart = Cart::new();
        cart.add(&product(1, 2200)).unwrap();

        cart.set_quantity(1, i64::MAX).unwrap();
        assert_eq!(cart.get(1).unwrap().quantity, MAX_ITEM_QUANTITY);
        assert_eq!(cart.total().cents(), 2200 * MAX_ITEM_QUANTITY);

        assert_eq!(
            cart.add(&product(1, 2200)),
            Err(CoreError::QuantityLimit {
                product_id: 1,
                max: MAX_ITEM_QUANTITY
            })
        );
        assert_eq!(cart.get(1).unwrap().quantity, MAX_ITEM_QUANTITY);

        cart.set_quantity(1, i64::MIN).unwrap();
        assert_eq!(cart.get(1).unwrap().quantity, 1);
    }

    #[test]
    fn test_add_rejects_out_of_range_price() {
        let mut cart = Cart::new();

        let err = cart.add(&product(1, i64::MAX)).unwrap_err();
        let CoreError::Validation(ValidationError::OutOfRange { field, .. }) = &err else {
            panic!("expected an out-of-range price, got {err:?}");
        };
        assert_eq!(field, "salePrice");
        assert!(cart.is_empty());

        cart.add(&product(2, MAX_PRICE_CENTS)).unwrap();
        cart.set_quantity(2, i64::MAX).unwrap();
        assert_eq!(cart.total().cents(), MAX_PRICE_CENTS * MAX_ITEM_QUANTITY);
    }

    #[test]
    fn test_cart_full() {
        let mut cart = Cart::new();
        for id in 1..=MAX_CART_ITEMS as i64 {
            cart.add(&product(id, 100)).unwrap();
        }

        assert_eq!(
            cart.add(&product(1000, 100)),
            Err(CoreError::CartFull {
                max: MAX_CART_ITEMS
            })
        );
        // Existing entries can still grow.
        cart.add(&product(1, 100)).unwrap();
        assert_eq!(cart.len(), MAX_CART_ITEMS);
    }

    #[test]
    fn test_checkout_empty_cart() {
        assert_eq!(Cart::new().checkout(), Err(CoreError::EmptyCart));
    }

    #[test]
    fn test_checkout_snapshots_lines() {
        let mut cart = Cart::new();
        cart.add(&product(1, 2200)).unwrap();
        cart.set_quantity(1, 1).unwrap();
        cart.add(&product(2, 1850)).unwrap();

        let draft = cart.checkout().unwrap();

        assert_eq!(draft.lines.len(), 2);
        assert_eq!(draft.lines[0].quantity, 2);
        assert_eq!(draft.lines[0].price_cents, 2200);
        assert_eq!(draft.lines[1].quantity, 1);
        assert_eq!(draft.total(), cart.total());
        assert_eq!(draft.total().cents(), 6250);
    }

    #[test]
    fn test_cart_serializes_for_presentation() {
        let mut cart = Cart::new();
        cart.add(&product(3, 1200)).unwrap();

        let json = serde_json::to_value(&cart).unwrap();
        assert_eq!(json["entries"][0]["productId"], 3);
        assert_eq!(json["entries"][0]["salePriceCents"], 1200);
        assert_eq!(json["entries"][0]["quantity"], 1);
    }

    #[test]
    fn test_cart_deserializes_valid_json() {
        let mut cart = Cart::new();
        cart.add(&product(1, 2200)).unwrap();
        cart.add(&product(1, 2200)).unwrap();
        cart.add(&product(2, 1850)).unwrap();

        let json = serde_json::to_string(&cart).unwrap();
        let restored: Cart = serde_json::from_str(&json).unwrap();

        assert_eq!(restored, cart);
        assert_eq!(restored.total().cents(), 6250);
    }

    fn entry_json(product_id: i64, quantity: i64, sale_price_cents: i64) -> serde_json::Value {
        serde_json::json!({
            "productId": product_id,
            "name": format!("Product {}", product_id),
            "salePriceCents": sale_price_cents,
            "purchasePriceCents": 0,
            "stock": null,
            "barcode": null,
            "quantity": quantity,
        })
    }

    #[test]
    fn test_cart_json_with_broken_invariants_is_rejected() {
        let zero_quantity = serde_json::json!({ "entries": [entry_json(1, 0, 2200)] });
        let err = serde_json::from_value::<Cart>(zero_quantity).unwrap_err();
        assert!(err.to_string().contains("quantity"), "{err}");

        let duplicated = serde_json::json!({
            "entries": [entry_json(1, 1, 2200), entry_json(1, 3, 2200)]
        });
        let err = serde_json::from_value::<Cart>(duplicated).unwrap_err();
        assert!(err.to_string().contains("more than once"), "{err}");

        let huge_quantity = serde_json::json!({ "entries": [entry_json(1, i64::MAX, 2200)] });
        assert!(serde_json::from_value::<Cart>(huge_quantity).is_err());

        let huge_price = serde_json::json!({ "entries": [entry_json(1, 1, i64::MAX)] });
        assert!(serde_json::from_value::<Cart>(huge_price).is_err());

        let too_many: Vec<_> = (1..=MAX_CART_ITEMS as i64 + 1)
            .map(|id| entry_json(id, 1, 100))
            .collect();
        let err = serde_json::from_value::<Cart>(serde_json::json!({ "entries": too_many }))
            .unwrap_err();
        assert!(err.to_string().contains("more than"), "{err}");
    }

    // =========================================================================
    // Property Tests
    // =========================================================================

    const CATALOG_LEN: usize = 6;

    #[derive(Debug, Clone)]
    enum Op {
        Add { index: usize, times: usize },
        SetQuantity { index: usize, delta: i64 },
        Remove { index: usize },
    }

    fn op() -> impl Strategy<Value = Op> {
        let index = 0..CATALOG_LEN;
        prop_oneof![
            4 => (index.clone(), prop_oneof![1usize..=3, 900usize..=1_100])
                .prop_map(|(index, times)| Op::Add { index, times }),
            2 => (index.clone(), -5i64..=5)
                .prop_map(|(index, delta)| Op::SetQuantity { index, delta }),
            2 => (index.clone(), any::<i64>())
                .prop_map(|(index, delta)| Op::SetQuantity { index, delta }),
            1 => index.prop_map(|index| Op::Remove { index }),
        ]
    }

    fn price() -> impl Strategy<Value = i64> {
        prop_oneof![
            4 => 0..=MAX_PRICE_CENTS,
            1 => Just(MAX_PRICE_CENTS),
            1 => any::<i64>(),
        ]
    }

    proptest! {
        #![proptest_config(Config::with_cases(128))]
        #[test]
        fn cart_operations_keep_invariants(
            prices in prop::collection::vec(price(), CATALOG_LEN),
            ops in prop::collection::vec(op(), 0..60)
        ) {
            let catalog: Vec<Product> = prices
                .iter()
                .enumerate()
                .map(|(i, &cents)| product(i as i64 + 1, cents))
                .collect();
            let mut cart = Cart::new();

            for op in ops {
                match op {
                    Op::Add { index, times } => {
                        let id = catalog[index].id;
                        for _ in 0..times {
                            let snapshot = |c: &Cart| (c.len(), c.get(id).map(|e| e.quantity));
                            let before = snapshot(&cart);
                            if cart.add(&catalog[index]).is_err() {
                                prop_assert_eq!(snapshot(&cart), before);
                            }
                        }
                    }
                    Op::SetQuantity { index, delta } => {
                        let result = cart.set_quantity(catalog[index].id, delta);
                        prop_assert_eq!(result.is_ok(), cart.get(catalog[index].id).is_some());
                    }
                    Op::Remove { index } => {
                        let _ = cart.remove(catalog[index].id);
                    }
                }

                prop_assert!(cart
                    .entries()
                    .iter()
                    .all(|e| (1..=MAX_ITEM_QUANTITY).contains(&e.quantity)));

                let expected: i128 = cart
                    .entries()
                    .iter()
                    .map(|e| i128::from(e.sale_price_cents) * i128::from(e.quantity))
                    .sum();
                prop_assert_eq!(i128::from(cart.total().cents()), expected);

                let ids: HashSet<i64> = cart.entries().iter().map(|e| e.product_id).collect();
                prop_assert_eq!(ids.len(), cart.len());
            }
        }
    }
}
