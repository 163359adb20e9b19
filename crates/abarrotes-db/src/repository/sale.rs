//! # Sale Repository
//!
//! The Sales Ledger: append-only history of committed sales.
//!
//! ## Commit
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Sale Commit                                       │
//! │                                                                         │
//! │  Cart ── checkout() ──► SaleDraft (pure, abarrotes-core)                │
//! │                            │  empty cart → ValidationError, no write    │
//! │                            ▼                                            │
//! │  BEGIN                                                                  │
//! │   ├── INSERT sales (date = now, total_cents = Σ qty × price)            │
//! │   ├── INSERT sale_items  line 1                                         │
//! │   ├── INSERT sale_items  line 2                                         │
//! │   └── ...                                                               │
//! │  COMMIT ──► Sale                                                        │
//! │                                                                         │
//! │  Any failure before COMMIT drops the transaction: ROLLBACK, nothing     │
//! │  of the sale is visible.                                                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Sales are never updated or deleted.

use abarrotes_core::validation::{validate_price_cents, validate_quantity};
use abarrotes_core::{Cart, Sale, SaleDraft, SaleItem, SaleLine};
use chrono::Utc;
use sqlx::SqlitePool;
use tracing::{debug, info};

use crate::error::{DbError, DbResult};

/// Repository for sale database operations.
#[derive(Debug, Clone)]
pub struct SaleRepository {
    pool: SqlitePool,
}

impl SaleRepository {
    /// Creates a new SaleRepository.
    pub fn new(pool: SqlitePool) -> Self {
        SaleRepository { pool }
    }

    /// Records the cart as a sale.
    ///
    /// The cart itself is left untouched; callers clear it after a
    /// successful commit.
    ///
    /// ## Errors
    /// * `DbError::Core(CoreError::EmptyCart)` - Nothing to sell (kind `Validation`)
    /// * Storage errors - the whole sale was rolled back
    pub async fn commit(&self, cart: &Cart) -> DbResult<Sale> {
        let draft = cart.checkout()?;

        for line in &draft.lines {
            validate_quantity(line.quantity)?;
            validate_price_cents("price", line.price_cents)?;
        }

        self.insert_draft(&draft).await
    }

    /// Writes a sale and all its items in one transaction.
    async fn insert_draft(&self, draft: &SaleDraft) -> DbResult<Sale> {
        let date = Utc::now();
        let total_cents = draft.total().cents();

        debug!(lines = draft.lines.len(), total_cents, "Committing sale");

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        let sale_id = sqlx::query("INSERT INTO sales (date, total_cents) VALUES (?1, ?2)")
            .bind(date)
            .bind(total_cents)
            .execute(&mut *tx)
            .await?
            .last_insert_rowid();

        for line in &draft.lines {
            sqlx::query(
                r#"
                INSERT INTO sale_items (
                    sale_id, product_id, quantity, price_cents, name_snapshot
                ) VALUES (?1, ?2, ?3, ?4, ?5)
                "#,
            )
            .bind(sale_id)
            .bind(line.product_id)
            .bind(line.quantity)
            .bind(line.price_cents)
            .bind(&line.name)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        info!(
            sale_id,
            total = %draft.total(),
            items = draft.lines.len(),
            "Sale committed"
        );

        Ok(Sale {
            id: sale_id,
            date,
            total_cents,
        })
    }

    /// Lists all sales, newest first.
    pub async fn list(&self) -> DbResult<Vec<Sale>> {
        let sales = sqlx::query_as::<_, Sale>(
            r#"
            SELECT id, date, total_cents
            FROM sales
            ORDER BY date DESC, id DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        debug!(count = sales.len(), "Listed sales");
        Ok(sales)
    }

    /// Gets a sale by id.
    pub async fn get(&self, id: i64) -> DbResult<Sale> {
        sqlx::query_as::<_, Sale>("SELECT id, date, total_cents FROM sales WHERE id = ?1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| DbError::not_found("Sale", id))
    }

    /// Lines of a sale for display, in commit order.
    ///
    /// ## Name Resolution
    /// ```text
    /// product still exists   → current product name
    /// product deleted        → name captured at commit time
    /// ```
    /// Quantity and price always come from the sale item itself.
    pub async fn items(&self, sale_id: i64) -> DbResult<Vec<SaleLine>> {
        self.ensure_exists(sale_id).await?;

        let lines = sqlx::query_as::<_, SaleLine>(
            r#"
            SELECT
                si.product_id,
                COALESCE(p.name, si.name_snapshot) AS name,
                si.quantity,
                si.price_cents,
                p.id IS NOT NULL AS product_exists
            FROM sale_items si
            LEFT JOIN products p ON p.id = si.product_id
            WHERE si.sale_id = ?1
            ORDER BY si.id
            "#,
        )
        .bind(sale_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(lines)
    }

    /// Stored item rows of a sale, exactly as committed.
    pub async fn line_items(&self, sale_id: i64) -> DbResult<Vec<SaleItem>> {
        self.ensure_exists(sale_id).await?;

        let items = sqlx::query_as::<_, SaleItem>(
            r#"
            SELECT id, sale_id, product_id, quantity, price_cents, name_snapshot
            FROM sale_items
            WHERE sale_id = ?1
            ORDER BY id
            "#,
        )
        .bind(sale_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(items)
    }

    /// Counts sales (for diagnostics).
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM sales")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }

    async fn ensure_exists(&self, sale_id: i64) -> DbResult<()> {
        let found: Option<i64> = sqlx::query_scalar("SELECT id FROM sales WHERE id = ?1")
            .bind(sale_id)
            .fetch_optional(&self.pool)
            .await?;

        found
            .map(|_| ())
            .ok_or_else(|| DbError::not_found("Sale", sale_id))
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
