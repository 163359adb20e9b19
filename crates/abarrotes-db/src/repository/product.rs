//! # Product Repository
//!
//! The Catalog Store: persistent product CRUD and barcode lookup.
//!
//! ## Key Operations
//! - Listing and name search for the inventory and POS screens
//! - Barcode lookup for the scan flow
//! - Create / partial update / delete
//!
//! ## Barcode Uniqueness
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Two Layers of Uniqueness                             │
//! │                                                                         │
//! │  create / update                                                        │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  BEGIN                                                                  │
//! │  SELECT id FROM products WHERE barcode = ? AND id != ?                  │
//! │       │                                                                 │
//! │       ├── row found ──► UniqueViolation { barcode, code }  (ROLLBACK)   │
//! │       ▼                                                                 │
//! │  INSERT / UPDATE                                                        │
//! │       │                                                                 │
//! │       └── idx_products_barcode (partial UNIQUE index) still rejects     │
//! │           any duplicate that slips past the check                       │
//! │  COMMIT                                                                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Products without a barcode never collide: the index only covers
//! non-NULL values and blank input is stored as NULL.

use abarrotes_core::validation::validate_search_query;
use abarrotes_core::{
    filter_by_name, NewProduct, Product, ProductPatch, ScanOutcome, ValidationError,
};
use chrono::Utc;
use sqlx::{SqliteConnection, SqlitePool};
use tracing::{debug, info};

use crate::error::{DbError, DbResult};

/// Repository for product database operations.
///
/// ## Usage
/// ```rust,ignore
/// let repo = db.products();
///
/// let id = repo.create(NewProduct::new("Sabritas 45g", 1200, 1850)).await?;
/// repo.update(id, ProductPatch { stock: Some(24), ..Default::default() }).await?;
///
/// match repo.scan("7501011115088").await? {
///     ScanOutcome::Known(product) => cart.add(&product)?,
///     ScanOutcome::Unknown(code) => prompt_create(code),
/// }
/// ```
#[derive(Debug, Clone)]
pub struct ProductRepository {
    pool: SqlitePool,
}

impl ProductRepository {
    /// Creates a new ProductRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ProductRepository { pool }
    }

    /// Lists every product, ordered by name then id.
    pub async fn list(&self) -> DbResult<Vec<Product>> {
        let products = sqlx::query_as::<_, Product>(
            r#"
            SELECT
                id,
                name,
                purchase_price_cents,
                sale_price_cents,
                stock,
                barcode,
                created_at,
                updated_at
            FROM products
            ORDER BY name, id
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        debug!(count = products.len(), "Listed products");
        Ok(products)
    }

    /// Case-insensitive substring search on product names.
    ///
    /// A blank query returns the full list.
    pub async fn search(&self, query: &str) -> DbResult<Vec<Product>> {
        let query = validate_search_query(query)?;

        debug!(query = %query, "Searching products");

        let products = filter_by_name(self.list().await?, &query);

        debug!(count = products.len(), "Search returned products");
        Ok(products)
    }

    /// Gets a product by id.
    ///
    /// ## Returns
    /// * `Ok(Product)` - Product found
    /// * `Err(DbError::NotFound)` - No such id
    pub async fn get(&self, id: i64) -> DbResult<Product> {
        let mut conn = self.pool.acquire().await?;
        fetch_product(&mut *conn, id)
            .await?
            .ok_or_else(|| DbError::not_found("Product", id))
    }

    /// Gets a product by barcode.
    ///
    /// The code is trimmed first. A blank code, or one no product carries,
    /// yields `Ok(None)`: an unknown barcode is an expected outcome of
    /// scanning, not an error.
    pub async fn get_by_barcode(&self, code: &str) -> DbResult<Option<Product>> {
        let code = code.trim();
        if code.is_empty() {
            return Ok(None);
        }

        debug!(barcode = %code, "Looking up barcode");

        let product = sqlx::query_as::<_, Product>(
            r#"
            SELECT
                id,
                name,
                purchase_price_cents,
                sale_price_cents,
                stock,
                barcode,
                created_at,
                updated_at
            FROM products
            WHERE barcode = ?1
            "#,
        )
        .bind(code)
        .fetch_optional(&self.pool)
        .await?;

        Ok(product)
    }

    /// Resolves a scanned code into either a catalog product or an
    /// unknown code the caller may offer to register.
    ///
    /// ## Errors
    /// * `DbError::Validation` - The code is blank, so there is nothing to
    ///   look up or register
    pub async fn scan(&self, code: &str) -> DbResult<ScanOutcome> {
        let code = code.trim();
        if code.is_empty() {
            return Err(ValidationError::required("barcode").into());
        }

        Ok(match self.get_by_barcode(code).await? {
            Some(product) => ScanOutcome::Known(product),
            None => ScanOutcome::Unknown(code.to_string()),
        })
    }

    /// Creates a product and returns its id.
    ///
    /// ## Errors
    /// * `DbError::Validation` - Empty name, negative price or stock
    /// * `DbError::UniqueViolation` - Barcode already used by another product
    pub async fn create(&self, input: NewProduct) -> DbResult<i64> {
        let input = input.normalized()?;

        debug!(name = %input.name, barcode = ?input.barcode, "Creating product");

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        if let Some(code) = &input.barcode {
            ensure_barcode_free(&mut *tx, code, None).await?;
        }

        let now = Utc::now();
        let result = sqlx::query(
            r#"
            INSERT INTO products (
                name, purchase_price_cents, sale_price_cents,
                stock, barcode, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
        )
        .bind(&input.name)
        .bind(input.purchase_price_cents)
        .bind(input.sale_price_cents)
        .bind(input.stock)
        .bind(&input.barcode)
        .bind(now)
        .bind(now)
        .execute(&mut *tx)
        .await
        .map_err(|e| with_barcode(e.into(), input.barcode.as_deref()))?;

        tx.commit()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        let id = result.last_insert_rowid();
        info!(id, name = %input.name, "Product created");
        Ok(id)
    }

    /// Applies a partial update.
    ///
    /// Read-modify-write inside one transaction: fields the patch leaves as
    /// `None` keep their stored values.
    ///
    /// ## Errors
    /// * `DbError::NotFound` - No such id
    /// * `DbError::Validation` - The merged product is invalid
    /// * `DbError::UniqueViolation` - The new barcode belongs to another product
    pub async fn update(&self, id: i64, patch: ProductPatch) -> DbResult<()> {
        debug!(id, "Updating product");

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        let mut product = fetch_product(&mut *tx, id)
            .await?
            .ok_or_else(|| DbError::not_found("Product", id))?;

        if patch.is_empty() {
            return Ok(());
        }

        product.apply_patch(patch);
        product.validate()?;

        if let Some(code) = &product.barcode {
            ensure_barcode_free(&mut *tx, code, Some(id)).await?;
        }

        let result = sqlx::query(
            r#"
            UPDATE products SET
                name = ?2,
                purchase_price_cents = ?3,
                sale_price_cents = ?4,
                stock = ?5,
                barcode = ?6,
                updated_at = ?7
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .bind(&product.name)
        .bind(product.purchase_price_cents)
        .bind(product.sale_price_cents)
        .bind(product.stock)
        .bind(&product.barcode)
        .bind(Utc::now())
        .execute(&mut *tx)
        .await
        .map_err(|e| with_barcode(e.into(), product.barcode.as_deref()))?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", id));
        }

        tx.commit()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        info!(id, "Product updated");
        Ok(())
    }

    /// Deletes a product.
    ///
    /// Sale items that reference it are kept; they fall back to their
    /// name snapshot.
    pub async fn delete(&self, id: i64) -> DbResult<()> {
        debug!(id, "Deleting product");

        let result = sqlx::query("DELETE FROM products WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", id));
        }

        info!(id, "Product deleted");
        Ok(())
    }

    /// Counts products (for diagnostics).
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

async fn fetch_product(conn: &mut SqliteConnection, id: i64) -> DbResult<Option<Product>> {
    let product = sqlx::query_as::<_, Product>(
        r#"
        SELECT
            id,
            name,
            purchase_price_cents,
            sale_price_cents,
            stock,
            barcode,
            created_at,
            updated_at
        FROM products
        WHERE id = ?1
        "#,
    )
    .bind(id)
    .fetch_optional(&mut *conn)
    .await?;

    Ok(product)
}

/// Fails with `UniqueViolation` if a product other than `except` has `code`.
async fn ensure_barcode_free(
    conn: &mut SqliteConnection,
    code: &str,
    except: Option<i64>,
) -> DbResult<()> {
    let owner: Option<i64> =
        sqlx::query_scalar("SELECT id FROM products WHERE barcode = ?1 AND id != ?2")
            .bind(code)
            .bind(except.unwrap_or(0))
            .fetch_optional(&mut *conn)
            .await?;

    match owner {
        Some(owner) => {
            debug!(barcode = %code, owner, "Barcode already in use");
            Err(DbError::duplicate("barcode", code))
        }
        None => Ok(()),
    }
}

/// Fills in the offending value of a barcode index violation.
fn with_barcode(err: DbError, barcode: Option<&str>) -> DbError {
    match (err, barcode) {
        (DbError::UniqueViolation { field, .. }, Some(code)) if field == "barcode" => {
            DbError::duplicate(field, code)
        }
        (err, _) => err,
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
