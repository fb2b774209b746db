//! # Sales Reports
//!
//! Aggregates committed sales for the end-of-day and history pages. The
//! repository fetches the rows; this module only does arithmetic.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use ts_rs::TS;

use crate::types::Sale;

/// Count and amount for one bucket of sales.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Breakdown {
    pub key: String,
    pub count: i64,
    pub total: i64,
}

/// Totals over a set of sales.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SalesSummary {
    pub sale_count: i64,
    pub item_count: i64,
    pub gross_total: i64,
    pub tax_total: i64,
    pub discount_total: i64,
    pub paid_total: i64,
    pub outstanding_total: i64,
    pub by_status: Vec<Breakdown>,
    pub by_payment_method: Vec<Breakdown>,
}

impl SalesSummary {
    /// Builds the summary. `item_count` is the number of units sold and is
    /// supplied by the caller since sale headers do not carry it.
    pub fn from_sales(sales: &[Sale], item_count: i64) -> Self {
        let mut by_status: BTreeMap<&'static str, (i64, i64)> = BTreeMap::new();
        let mut by_method: BTreeMap<&'static str, (i64, i64)> = BTreeMap::new();
        let mut summary = SalesSummary {
            item_count,
            ..Default::default()
        };

        for sale in sales {
            summary.sale_count += 1;
            summary.gross_total += sale.total_amount;
            summary.tax_total += sale.tax_amount;
            summary.discount_total += sale.discount_amount;
            summary.paid_total += sale.amount_paid;
            summary.outstanding_total += sale.outstanding();

            bump(&mut by_status, sale.paid_status.as_str(), sale.total_amount);
            bump(&mut by_method, sale.payment_method.as_str(), sale.total_amount);
        }

        summary.by_status = into_breakdown(by_status);
        summary.by_payment_method = into_breakdown(by_method);
        summary
    }
}

fn bump(map: &mut BTreeMap<&'static str, (i64, i64)>, key: &'static str, amount: i64) {
    let entry = map.entry(key).or_insert((0, 0));
    entry.0 += 1;
    entry.1 += amount;
}

fn into_breakdown(map: BTreeMap<&'static str, (i64, i64)>) -> Vec<Breakdown> {
    map.into_iter()
        .map(|(key, (count, total))| Breakdown {
            key: key.to_string(),
            count,
            total,
        })
        .collect()
}

/// A report page payload.
///
/// On a storage failure the page still renders: collections are empty,
/// the summary is zero, and `error` carries the message.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SalesReport {
    #[ts(as = "String")]
    pub from: NaiveDate,
    #[ts(as = "String")]
    pub to: NaiveDate,
    pub summary: SalesSummary,
    pub sales: Vec<Sale>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl SalesReport {
    pub fn new(from: NaiveDate, to: NaiveDate, sales: Vec<Sale>, item_count: i64) -> Self {
        SalesReport {
            from,
            to,
            summary: SalesSummary::from_sales(&sales, item_count),
            sales,
            error: None,
        }
    }

    pub fn failed(from: NaiveDate, to: NaiveDate, message: impl Into<String>) -> Self {
        SalesReport {
            from,
            to,
            summary: SalesSummary::default(),
            sales: Vec::new(),
            error: Some(message.into()),
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
