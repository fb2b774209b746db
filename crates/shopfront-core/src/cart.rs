//! # Sales Screen Cart
//!
//! The cart lives in the browser. This module is the reference model of that
//! script: it owns the line bookkeeping and tells the caller which stock
//! adjustment to post after every change.
//!
//! ## Line State Machine
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │   absent ── add ──► qty=1 ── increment ──► qty=n+1                      │
//! │                       ▲  ◄── decrement ──     │                         │
//! │                       │                       │                         │
//! │                       └──── decrement at 1 ───┴── remove ──► absent     │
//! │                                                                         │
//! │  Every transition yields StockAdjustment { product_id, new_stock }     │
//! │  with new_stock = baseline_stock - quantity (baseline on removal).     │
//! │                                                                         │
//! │  baseline_stock is the stock seen in the lookup result. It is never    │
//! │  refreshed, so two tills editing the same product overwrite each       │
//! │  other. POST /api/sales/checkout avoids this by reserving at commit.   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::requests::{SaleCommitRequest, SaleLineInput};
use crate::types::{PaymentMethod, Product, TaxRate};
use crate::validation::validate_cart_size;
use crate::MAX_ITEM_QUANTITY;

/// The absolute stock level the screen posts to `/api/products/stock`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct StockAdjustment {
    pub product_id: i64,
    pub new_stock: i64,
}

/// A cart line with price and stock frozen at lookup time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CartLine {
    pub product_id: i64,
    pub code: String,
    pub name: String,
    pub unit_price: i64,
    pub quantity: i64,
    pub baseline_stock: i64,
}

impl CartLine {
    fn from_product(product: &Product) -> Self {
        CartLine {
            product_id: product.id,
            code: product.code.clone(),
            name: product.name.clone(),
            unit_price: product.price,
            quantity: 1,
            baseline_stock: product.stock,
        }
    }

    /// Stock shown next to the line.
    pub fn displayed_stock(&self) -> i64 {
        self.baseline_stock - self.quantity
    }

    pub fn gross(&self) -> Money {
        Money::from_cents(self.unit_price).multiply_quantity(self.quantity)
    }

    fn adjustment(&self) -> StockAdjustment {
        StockAdjustment {
            product_id: self.product_id,
            new_stock: self.displayed_stock(),
        }
    }
}

/// Cart totals shown under the table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CartTotals {
    pub item_count: usize,
    pub total_quantity: i64,
    pub subtotal: i64,
    pub tax_amount: i64,
    pub total_amount: i64,
}

/// The open cart of one sales screen.
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Cart {
    lines: Vec<CartLine>,
    tax_rate: TaxRate,
}

impl Cart {
    pub fn new(tax_rate: TaxRate) -> Self {
        Cart {
            lines: Vec::new(),
            tax_rate,
        }
    }

    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    pub fn line(&self, product_id: i64) -> Option<&CartLine> {
        self.lines.iter().find(|l| l.product_id == product_id)
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Adds a lookup result. A product already in the cart is incremented.
    ///
    /// ## Errors
    /// - `OutOfStock` when the product shows no stock; nothing changes
    /// - `CartTooLarge` when the cart already holds the maximum lines
    pub fn add(&mut self, product: &Product) -> CoreResult<StockAdjustment> {
        if self.line(product.id).is_some() {
            return self.increment(product.id);
        }

        if product.stock <= 0 {
            return Err(CoreError::OutOfStock {
                code: product.code.clone(),
            });
        }

        validate_cart_size(self.lines.len()).map_err(|_| CoreError::CartTooLarge {
            max: crate::MAX_CART_ITEMS,
        })?;

        let line = CartLine::from_product(product);
        let adjustment = line.adjustment();
        self.lines.push(line);
        Ok(adjustment)
    }

    /// Raises a line by one unit, refusing when displayed stock is exhausted.
    pub fn increment(&mut self, product_id: i64) -> CoreResult<StockAdjustment> {
        let line = self.line_mut(product_id)?;

        if line.displayed_stock() <= 0 {
            return Err(CoreError::OutOfStock {
                code: line.code.clone(),
            });
        }

        if line.quantity >= MAX_ITEM_QUANTITY {
            return Err(CoreError::QuantityTooLarge {
                requested: line.quantity + 1,
                max: MAX_ITEM_QUANTITY,
            });
        }

        line.quantity += 1;
        Ok(line.adjustment())
    }

    /// Lowers a line by one unit; at zero the line is removed.
    pub fn decrement(&mut self, product_id: i64) -> CoreResult<StockAdjustment> {
        if self.line_mut(product_id)?.quantity <= 1 {
            return self.remove(product_id);
        }

        let line = self.line_mut(product_id)?;
        line.quantity -= 1;
        Ok(line.adjustment())
    }

    /// Drops a line and restores its baseline stock.
    pub fn remove(&mut self, product_id: i64) -> CoreResult<StockAdjustment> {
        let index = self
            .lines
            .iter()
            .position(|l| l.product_id == product_id)
            .ok_or(CoreError::NotInCart(product_id))?;

        let line = self.lines.remove(index);
        Ok(StockAdjustment {
            product_id,
            new_stock: line.baseline_stock,
        })
    }

    /// Empties the cart after a successful commit.
    ///
    /// No adjustments are produced: the sold stock stays decremented.
    pub fn clear(&mut self) {
        self.lines.clear();
    }

    fn line_mut(&mut self, product_id: i64) -> CoreResult<&mut CartLine> {
        self.lines
            .iter_mut()
            .find(|l| l.product_id == product_id)
            .ok_or(CoreError::NotInCart(product_id))
    }

    fn line_tax(&self, line: &CartLine) -> Money {
        line.gross().calculate_tax(self.tax_rate)
    }

    pub fn totals(&self) -> CartTotals {
        let subtotal: Money = self.lines.iter().map(CartLine::gross).sum();
        let tax: Money = self.lines.iter().map(|l| self.line_tax(l)).sum();

        CartTotals {
            item_count: self.lines.len(),
            total_quantity: self.lines.iter().map(|l| l.quantity).sum(),
            subtotal: subtotal.cents(),
            tax_amount: tax.cents(),
            total_amount: (subtotal + tax).cents(),
        }
    }

    /// Builds the commit payload for the pay button.
    pub fn to_commit_request(
        &self,
        payment_type: PaymentMethod,
        customer_id: Option<i64>,
        amount_paid: Option<i64>,
    ) -> SaleCommitRequest {
        let items: Vec<SaleLineInput> = self
            .lines
            .iter()
            .map(|line| {
                let tax = self.line_tax(line).cents();
                SaleLineInput {
                    product_id: line.product_id,
                    quantity: line.quantity,
                    unit_price: line.unit_price,
                    tax_amount: tax,
                    discount_amount: 0,
                    subtotal: line.gross().cents() + tax,
                }
            })
            .collect();

        let totals = self.totals();

        SaleCommitRequest {
            customer_id,
            user_id: None,
            items,
            payment_type,
            total_amount: totals.total_amount,
            tax_amount: totals.tax_amount,
            discount_amount: 0,
            amount_paid,
            notes: None,
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::PaidStatus;
    use chrono::Utc;

    fn product(id: i64, price: i64, stock: i64) -> Product {
        Product {
            id,
            code: format!("P-{}", id),
            barcode: None,
            name: format!("Product {}", id),
            price,
            category_id: None,
            category_name: None,
            stock,
            reorder_level: 5,
            is_active: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_add_new_line_decrements_displayed_stock() {
        let mut cart = Cart::new(TaxRate::zero());
        let adj = cart.add(&product(1, 1000, 10)).unwrap();

        assert_eq!(adj, StockAdjustment { product_id: 1, new_stock: 9 });
        assert_eq!(cart.line(1).unwrap().quantity, 1);
    }

    #[test]
    fn test_add_out_of_stock_rejected_without_adjustment() {
        let mut cart = Cart::new(TaxRate::zero());
        let err = cart.add(&product(1, 1000, 0)).unwrap_err();

        assert!(matches!(err, CoreError::OutOfStock { .. }));
        assert!(cart.is_empty());
    }

    #[test]
    fn test_add_existing_line_increments() {
        let mut cart = Cart::new(TaxRate::zero());
        let p = product(1, 1000, 10);
        cart.add(&p).unwrap();
        let adj = cart.add(&p).unwrap();

        assert_eq!(adj.new_stock, 8);
        assert_eq!(cart.lines().len(), 1);
        assert_eq!(cart.line(1).unwrap().quantity, 2);
    }

    #[test]
    fn test_increment_stops_at_displayed_stock() {
        let mut cart = Cart::new(TaxRate::zero());
        cart.add(&product(1, 1000, 2)).unwrap();
        assert_eq!(cart.increment(1).unwrap().new_stock, 0);

        let err = cart.increment(1).unwrap_err();
        assert!(matches!(err, CoreError::OutOfStock { .. }));
        assert_eq!(cart.line(1).unwrap().quantity, 2);
    }

    #[test]
    fn test_decrement_to_zero_removes_line() {
        let mut cart = Cart::new(TaxRate::zero());
        cart.add(&product(1, 1000, 4)).unwrap();
        cart.increment(1).unwrap();

        assert_eq!(cart.decrement(1).unwrap().new_stock, 3);
        assert_eq!(cart.decrement(1).unwrap().new_stock, 4);
        assert!(cart.is_empty());
    }

    #[test]
    fn test_remove_restores_removed_quantity() {
        let mut cart = Cart::new(TaxRate::zero());
        cart.add(&product(1, 1000, 10)).unwrap();
        cart.increment(1).unwrap();
        cart.increment(1).unwrap();
        assert_eq!(cart.line(1).unwrap().displayed_stock(), 7);

        let adj = cart.remove(1).unwrap();
        assert_eq!(adj.new_stock, 10);
        assert!(cart.line(1).is_none());
        assert!(matches!(cart.remove(1), Err(CoreError::NotInCart(1))));
    }

    #[test]
    fn test_commit_request_for_two_units() {
        let mut cart = Cart::new(TaxRate::from_bps(800));
        let p = product(1, 1000, 5);
        cart.add(&p).unwrap();
        cart.add(&p).unwrap();

        let req = cart.to_commit_request(PaymentMethod::Cash, None, None);
        assert_eq!(req.items.len(), 1);
        assert_eq!(req.items[0].quantity, 2);
        assert_eq!(req.items[0].tax_amount, 160);
        assert_eq!(req.total_amount, 2160);

        let sale = req.validate().unwrap();
        assert_eq!(sale.subtotal, 2000);
        assert_eq!(sale.paid_status, PaidStatus::Paid);
    }

    #[test]
    fn test_totals_across_lines() {
        let mut cart = Cart::new(TaxRate::from_bps(1000));
        cart.add(&product(1, 1000, 5)).unwrap();
        cart.add(&product(2, 250, 5)).unwrap();

        let totals = cart.totals();
        assert_eq!(totals.item_count, 2);
        assert_eq!(totals.subtotal, 1250);
        assert_eq!(totals.tax_amount, 125);
        assert_eq!(totals.total_amount, 1375);

        cart.clear();
        assert_eq!(cart.totals().total_amount, 0);
    }
}
