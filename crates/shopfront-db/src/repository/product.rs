//! # Product Repository
//!
//! Catalog lookups and the stock overwrite used by the sales screen.
//!
//! ## Lookup
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Cashier types: "cola"                                                 │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  pattern = %cola%   (%, _ and \ in the input are escaped)              │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  products p LEFT JOIN categories c                                     │
//! │  WHERE p.is_active AND (code LIKE | barcode LIKE | name LIKE)          │
//! │  ORDER BY p.name LIMIT 10                                              │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  BEV-COC-001 | Coca-Cola 330ml | Beverages | stock 24                  │
//! │  BEV-COC-002 | Coca-Cola 1.5L  | Beverages | stock 0                   │
//! │                                                                         │
//! │  SQLite LIKE is case-insensitive for ASCII.                            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};
use shopfront_core::validation::validate_product_code;
use shopfront_core::{Category, NewProduct, Product, SEARCH_RESULT_LIMIT};

const PRODUCT_SELECT: &str = r#"
    SELECT
        p.id, p.code, p.barcode, p.name, p.price, p.category_id,
        c.name AS category_name,
        p.stock, p.reorder_level, p.is_active, p.created_at, p.updated_at
    FROM products p
    LEFT JOIN categories c ON c.id = p.category_id
"#;

/// Result of an absolute stock overwrite.
#[derive(Debug, Clone)]
pub struct StockChange {
    pub product: Product,
    pub previous_stock: i64,
}

/// Repository for product and category operations.
#[derive(Debug, Clone)]
pub struct ProductRepository {
    pool: SqlitePool,
}

impl ProductRepository {
    pub fn new(pool: SqlitePool) -> Self {
        ProductRepository { pool }
    }

    /// Substring lookup over code, barcode and name.
    ///
    /// The caller has already rejected blank queries. At most
    /// [`SEARCH_RESULT_LIMIT`] active products come back, ordered by name.
    pub async fn search(&self, query: &str) -> DbResult<Vec<Product>> {
        let pattern = like_pattern(query.trim());

        debug!(query = %query, "Searching products");

        let sql = format!(
            r#"{PRODUCT_SELECT}
            WHERE p.is_active = 1
              AND (p.code LIKE ?1 ESCAPE '\'
                   OR p.barcode LIKE ?1 ESCAPE '\'
                   OR p.name LIKE ?1 ESCAPE '\')
            ORDER BY p.name
            LIMIT ?2"#
        );

        let products = sqlx::query_as::<_, Product>(&sql)
            .bind(&pattern)
            .bind(SEARCH_RESULT_LIMIT)
            .fetch_all(&self.pool)
            .await?;

        debug!(count = products.len(), "Search returned products");
        Ok(products)
    }

    pub async fn get_by_id(&self, id: i64) -> DbResult<Option<Product>> {
        let sql = format!("{PRODUCT_SELECT} WHERE p.id = ?1");

        let product = sqlx::query_as::<_, Product>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(product)
    }

    /// Overwrites a product's stock with an absolute value.
    ///
    /// No negativity check and no version check: two tills writing the same
    /// product end with whichever write lands last.
    ///
    /// ## Returns
    /// * `Err(DbError::NotFound)` - unknown id, nothing written
    pub async fn set_stock(&self, id: i64, stock: i64) -> DbResult<StockChange> {
        let mut tx = self.pool.begin().await?;

        let previous_stock: Option<i64> =
            sqlx::query_scalar("SELECT stock FROM products WHERE id = ?1")
                .bind(id)
                .fetch_optional(&mut *tx)
                .await?;

        let Some(previous_stock) = previous_stock else {
            return Err(DbError::not_found("Product", id));
        };

        sqlx::query("UPDATE products SET stock = ?2, updated_at = ?3 WHERE id = ?1")
            .bind(id)
            .bind(stock)
            .bind(Utc::now())
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        debug!(product_id = id, previous_stock, new_stock = stock, "Stock overwritten");

        let product = self
            .get_by_id(id)
            .await?
            .ok_or_else(|| DbError::not_found("Product", id))?;

        Ok(StockChange {
            product,
            previous_stock,
        })
    }

    /// Inserts a product and returns it with its new id.
    pub async fn insert(&self, product: &NewProduct) -> DbResult<Product> {
        validate_product_code(&product.code).map_err(|e| DbError::Rule(e.into()))?;
        let now = Utc::now();

        let result = sqlx::query(
            r#"
            INSERT INTO products (
                code, barcode, name, price, category_id,
                stock, reorder_level, is_active, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, 1, ?8, ?8)
            "#,
        )
        .bind(&product.code)
        .bind(&product.barcode)
        .bind(&product.name)
        .bind(product.price)
        .bind(product.category_id)
        .bind(product.stock)
        .bind(product.reorder_level)
        .bind(now)
        .execute(&self.pool)
        .await?;

        let id = result.last_insert_rowid();
        debug!(id, code = %product.code, "Inserted product");

        self.get_by_id(id)
            .await?
            .ok_or_else(|| DbError::not_found("Product", id))
    }

    /// Active products at or below their reorder level.
    pub async fn low_stock(&self) -> DbResult<Vec<Product>> {
        let sql = format!(
            "{PRODUCT_SELECT} WHERE p.is_active = 1 AND p.stock <= p.reorder_level ORDER BY p.stock, p.name"
        );

        let products = sqlx::query_as::<_, Product>(&sql)
            .fetch_all(&self.pool)
            .await?;

        Ok(products)
    }

    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    // -------------------------------------------------------------------------
    // Categories
    // -------------------------------------------------------------------------

    /// Returns the category with this name, creating it if needed.
    pub async fn ensure_category(&self, name: &str) -> DbResult<Category> {
        sqlx::query("INSERT INTO categories (name) VALUES (?1) ON CONFLICT(name) DO NOTHING")
            .bind(name)
            .execute(&self.pool)
            .await?;

        let category = sqlx::query_as::<_, Category>("SELECT id, name FROM categories WHERE name = ?1")
            .bind(name)
            .fetch_one(&self.pool)
            .await?;

        Ok(category)
    }

    pub async fn categories(&self) -> DbResult<Vec<Category>> {
        let categories =
            sqlx::query_as::<_, Category>("SELECT id, name FROM categories ORDER BY name")
                .fetch_all(&self.pool)
                .await?;
        Ok(categories)
    }
}

/// Wraps a query in `%...%`, escaping LIKE metacharacters with `\`.
fn like_pattern(query: &str) -> String {
    let mut pattern = String::with_capacity(query.len() + 2);
    pattern.push('%');
    for c in query.chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

// =============================================================================
// Unit Tests
// =============================================================================
