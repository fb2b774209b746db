//! # Sale Repository
//!
//! Sale commits, credit payments and report queries.
//!
//! ## Two Commit Paths
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  commit()  (POST /api/sales)                                           │
//! │  ───────────────────────────                                            │
//! │  Stock was already written line by line from the cart. One transaction │
//! │  inserts the header, sets the invoice number, inserts the lines and    │
//! │  the initial payment. Products are not touched. If this fails, the     │
//! │  earlier stock writes stay as they are.                                │
//! │                                                                         │
//! │  reserve_and_commit()  (POST /api/sales/checkout)                      │
//! │  ─────────────────────────────────────────────                         │
//! │  BEGIN                                                                  │
//! │    UPDATE products SET stock = stock - qty                              │
//! │      WHERE id = ? AND stock >= qty        ← per line, 0 rows = abort   │
//! │    INSERT sales / sale_items / sale_payments                            │
//! │  COMMIT                                                                 │
//! │  Stock and sale succeed or fail together.                              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, NaiveDate, Utc};
use sqlx::{SqliteConnection, SqlitePool};
use tracing::{debug, info, warn};

use crate::error::{DbError, DbResult};
use shopfront_core::requests::{SaleCommitted, ValidatedSale};
use shopfront_core::{
    CoreError, PaidStatus, PaymentMethod, Sale, SaleDetail, SaleItem, SalePayment,
};

const SALE_COLUMNS: &str = r#"
    id, invoice_number, sale_date, customer_id, user_id,
    subtotal, tax_amount, discount_amount, total_amount, amount_paid,
    paid_status, payment_method, notes, created_at
"#;

/// Repository for sale operations.
#[derive(Debug, Clone)]
pub struct SaleRepository {
    pool: SqlitePool,
}

impl SaleRepository {
    pub fn new(pool: SqlitePool) -> Self {
        SaleRepository { pool }
    }

    /// Stores a validated sale without touching product stock.
    ///
    /// Submitting the same payload twice creates two sales.
    pub async fn commit(
        &self,
        sale: &ValidatedSale,
        user_id: i64,
        sale_date: NaiveDate,
    ) -> DbResult<SaleCommitted> {
        let mut tx = self.pool.begin().await?;
        let committed = insert_sale(&mut tx, sale, user_id, sale_date).await?;
        tx.commit().await?;

        info!(
            sale_id = committed.sale_id,
            invoice = %committed.invoice_number,
            total = sale.total_amount,
            "Sale committed"
        );
        Ok(committed)
    }

    /// Decrements stock for every line and stores the sale atomically.
    ///
    /// ## Errors
    /// * `DbError::Rule(CoreError::InsufficientStock)` - a guard matched no
    ///   row; nothing was written
    /// * `DbError::Rule(CoreError::ProductNotFound)` - unknown product id
    pub async fn reserve_and_commit(
        &self,
        sale: &ValidatedSale,
        user_id: i64,
        sale_date: NaiveDate,
    ) -> DbResult<SaleCommitted> {
        let mut tx = self.pool.begin().await?;
        let now = Utc::now();

        for line in &sale.lines {
            let reserved = sqlx::query(
                r#"
                UPDATE products
                SET stock = stock - ?2, updated_at = ?3
                WHERE id = ?1 AND is_active = 1 AND stock >= ?2
                "#,
            )
            .bind(line.product_id)
            .bind(line.quantity)
            .bind(now)
            .execute(&mut *tx)
            .await?;

            if reserved.rows_affected() == 0 {
                let available: Option<i64> =
                    sqlx::query_scalar("SELECT stock FROM products WHERE id = ?1 AND is_active = 1")
                        .bind(line.product_id)
                        .fetch_optional(&mut *tx)
                        .await?;

                // Dropping `tx` rolls back the reservations made so far
                let err = match available {
                    None => CoreError::ProductNotFound(line.product_id),
                    Some(available) => CoreError::InsufficientStock {
                        product_id: line.product_id,
                        available,
                        requested: line.quantity,
                    },
                };
                warn!(product_id = line.product_id, error = %err, "Checkout reservation failed");
                return Err(err.into());
            }
        }

        let committed = insert_sale(&mut tx, sale, user_id, sale_date).await?;
        tx.commit().await?;

        info!(
            sale_id = committed.sale_id,
            invoice = %committed.invoice_number,
            lines = sale.lines.len(),
            "Checkout committed with stock reservation"
        );
        Ok(committed)
    }

    pub async fn get_by_id(&self, id: i64) -> DbResult<Option<Sale>> {
        let sql = format!("SELECT {SALE_COLUMNS} FROM sales WHERE id = ?1");
        let sale = sqlx::query_as::<_, Sale>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(sale)
    }

    pub async fn get_items(&self, sale_id: i64) -> DbResult<Vec<SaleItem>> {
        let items = sqlx::query_as::<_, SaleItem>(
            r#"
            SELECT id, sale_id, product_id, quantity, unit_price,
                   tax_amount, discount_amount, subtotal
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

    pub async fn get_payments(&self, sale_id: i64) -> DbResult<Vec<SalePayment>> {
        let payments = sqlx::query_as::<_, SalePayment>(
            r#"
            SELECT id, sale_id, amount, method, user_id, created_at
            FROM sale_payments
            WHERE sale_id = ?1
            ORDER BY id
            "#,
        )
        .bind(sale_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(payments)
    }

    /// Header, lines and payments of one sale.
    pub async fn get_detail(&self, id: i64) -> DbResult<SaleDetail> {
        let sale = self
            .get_by_id(id)
            .await?
            .ok_or(CoreError::SaleNotFound(id))?;

        Ok(SaleDetail {
            items: self.get_items(id).await?,
            payments: self.get_payments(id).await?,
            sale,
        })
    }

    /// Sales whose `sale_date` falls within `from ..= to`, oldest first.
    pub async fn list_between(&self, from: NaiveDate, to: NaiveDate) -> DbResult<Vec<Sale>> {
        let sql = format!(
            "SELECT {SALE_COLUMNS} FROM sales WHERE sale_date BETWEEN ?1 AND ?2 ORDER BY id"
        );
        let sales = sqlx::query_as::<_, Sale>(&sql)
            .bind(from)
            .bind(to)
            .fetch_all(&self.pool)
            .await?;

        debug!(%from, %to, count = sales.len(), "Listed sales");
        Ok(sales)
    }

    /// Units sold within `from ..= to`.
    pub async fn units_sold_between(&self, from: NaiveDate, to: NaiveDate) -> DbResult<i64> {
        let units: i64 = sqlx::query_scalar(
            r#"
            SELECT COALESCE(SUM(si.quantity), 0)
            FROM sale_items si
            JOIN sales s ON s.id = si.sale_id
            WHERE s.sale_date BETWEEN ?1 AND ?2
            "#,
        )
        .bind(from)
        .bind(to)
        .fetch_one(&self.pool)
        .await?;
        Ok(units)
    }

    /// Sales that still have a balance, oldest first.
    pub async fn list_outstanding(&self) -> DbResult<Vec<Sale>> {
        let sql = format!(
            "SELECT {SALE_COLUMNS} FROM sales WHERE paid_status != 'paid' ORDER BY sale_date, id"
        );
        let sales = sqlx::query_as::<_, Sale>(&sql)
            .fetch_all(&self.pool)
            .await?;
        Ok(sales)
    }

    /// Records a payment against a credit sale and updates its status.
    ///
    /// ## Errors
    /// * `CoreError::SaleNotFound` - unknown sale
    /// * `CoreError::AlreadyPaid` - nothing is owed
    /// * `CoreError::Overpayment` - amount exceeds the balance
    pub async fn record_payment(
        &self,
        sale_id: i64,
        amount: i64,
        method: PaymentMethod,
        user_id: i64,
    ) -> DbResult<Sale> {
        let mut tx = self.pool.begin().await?;

        let sql = format!("SELECT {SALE_COLUMNS} FROM sales WHERE id = ?1");
        let sale = sqlx::query_as::<_, Sale>(&sql)
            .bind(sale_id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or(CoreError::SaleNotFound(sale_id))?;

        let outstanding = sale.outstanding();
        if outstanding == 0 {
            return Err(CoreError::AlreadyPaid(sale_id).into());
        }
        if amount > outstanding {
            return Err(CoreError::Overpayment {
                amount,
                outstanding,
            }
            .into());
        }

        insert_payment(&mut tx, sale_id, amount, method, user_id).await?;

        let amount_paid = sale.amount_paid + amount;
        let status = PaidStatus::from_amounts(sale.total_amount, amount_paid);

        sqlx::query("UPDATE sales SET amount_paid = ?2, paid_status = ?3 WHERE id = ?1")
            .bind(sale_id)
            .bind(amount_paid)
            .bind(status)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        info!(sale_id, amount, status = status.as_str(), "Payment recorded");

        self.get_by_id(sale_id)
            .await?
            .ok_or_else(|| DbError::not_found("Sale", sale_id))
    }

    /// Cash a cashier has taken since `since`, across sales and repayments.
    pub async fn cash_taken_since(&self, user_id: i64, since: DateTime<Utc>) -> DbResult<i64> {
        let total: i64 = sqlx::query_scalar(
            r#"
            SELECT COALESCE(SUM(amount), 0)
            FROM sale_payments
            WHERE user_id = ?1 AND method = 'cash' AND created_at >= ?2
            "#,
        )
        .bind(user_id)
        .bind(since)
        .fetch_one(&self.pool)
        .await?;
        Ok(total)
    }
}

// =============================================================================
// Transaction Helpers
// =============================================================================

/// Inserts header, invoice number, lines and the initial payment.
async fn insert_sale(
    conn: &mut SqliteConnection,
    sale: &ValidatedSale,
    user_id: i64,
    sale_date: NaiveDate,
) -> DbResult<SaleCommitted> {
    let header = sqlx::query(
        r#"
        INSERT INTO sales (
            sale_date, customer_id, user_id,
            subtotal, tax_amount, discount_amount, total_amount, amount_paid,
            paid_status, payment_method, notes, created_at
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)
        "#,
    )
    .bind(sale_date)
    .bind(sale.customer_id)
    .bind(user_id)
    .bind(sale.subtotal)
    .bind(sale.tax_amount)
    .bind(sale.discount_amount)
    .bind(sale.total_amount)
    .bind(sale.amount_paid)
    .bind(sale.paid_status)
    .bind(sale.payment_method)
    .bind(&sale.notes)
    .bind(Utc::now())
    .execute(&mut *conn)
    .await?;

    let sale_id = header.last_insert_rowid();
    let invoice_number = invoice_number(sale_date, sale_id);

    sqlx::query("UPDATE sales SET invoice_number = ?2 WHERE id = ?1")
        .bind(sale_id)
        .bind(&invoice_number)
        .execute(&mut *conn)
        .await?;

    for line in &sale.lines {
        sqlx::query(
            r#"
            INSERT INTO sale_items (
                sale_id, product_id, quantity, unit_price,
                tax_amount, discount_amount, subtotal
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
        )
        .bind(sale_id)
        .bind(line.product_id)
        .bind(line.quantity)
        .bind(line.unit_price)
        .bind(line.tax_amount)
        .bind(line.discount_amount)
        .bind(line.subtotal)
        .execute(&mut *conn)
        .await?;
    }

    if sale.amount_paid > 0 {
        insert_payment(conn, sale_id, sale.amount_paid, sale.payment_method, user_id).await?;
    }

    debug!(sale_id, lines = sale.lines.len(), "Inserted sale rows");

    Ok(SaleCommitted {
        sale_id,
        invoice_number,
    })
}

async fn insert_payment(
    conn: &mut SqliteConnection,
    sale_id: i64,
    amount: i64,
    method: PaymentMethod,
    user_id: i64,
) -> DbResult<()> {
    sqlx::query(
        r#"
        INSERT INTO sale_payments (sale_id, amount, method, user_id, created_at)
        VALUES (?1, ?2, ?3, ?4, ?5)
        "#,
    )
    .bind(sale_id)
    .bind(amount)
    .bind(method)
    .bind(user_id)
    .bind(Utc::now())
    .execute(&mut *conn)
    .await?;
    Ok(())
}

/// `INV-YYYYMMDD-NNNNNN`, unique because the suffix is the row id.
pub fn invoice_number(sale_date: NaiveDate, sale_id: i64) -> String {
    format!("INV-{}-{:06}", sale_date.format("%Y%m%d"), sale_id)
}

// =============================================================================
// Unit Tests
// =============================================================================
