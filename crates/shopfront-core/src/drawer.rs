//! # Cash Drawer Reconciliation
//!
//! ```text
//! expected = opening_float + cash_sales + cash_in - cash_out
//! variance = counted - expected        (negative = drawer is short)
//! ```

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::types::{CashMovement, DrawerSession, MovementKind};

/// Figures shown on the close-drawer screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct DrawerReconciliation {
    pub opening_float: i64,
    pub cash_sales: i64,
    pub cash_in: i64,
    pub cash_out: i64,
    pub expected: i64,
    /// `None` until the cashier counts the drawer.
    pub counted: Option<i64>,
    pub variance: Option<i64>,
}

impl DrawerReconciliation {
    /// `cash_sales` is the sum of cash payments the cashier took during the
    /// session, including later credit repayments.
    pub fn compute(
        session: &DrawerSession,
        movements: &[CashMovement],
        cash_sales: i64,
        counted: Option<i64>,
    ) -> Self {
        let (cash_in, cash_out) =
            movements
                .iter()
                .fold((0, 0), |(cash_in, cash_out), m| match m.kind {
                    MovementKind::CashIn => (cash_in + m.amount, cash_out),
                    MovementKind::CashOut => (cash_in, cash_out + m.amount),
                });

        let expected = session.opening_float + cash_sales + cash_in - cash_out;

        DrawerReconciliation {
            opening_float: session.opening_float,
            cash_sales,
            cash_in,
            cash_out,
            expected,
            counted,
            variance: counted.map(|c| c - expected),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::DrawerStatus;
    use chrono::Utc;

    fn movement(kind: MovementKind, amount: i64) -> CashMovement {
        CashMovement {
            id: 0,
            session_id: 1,
            kind,
            amount,
            reason: None,
            user_id: 1,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_reconciliation_with_short_drawer() {
        let session = DrawerSession {
            id: 1,
            user_id: 1,
            opening_float: 10_000,
            status: DrawerStatus::Open,
            opened_at: Utc::now(),
            closed_at: None,
            expected_cash: None,
            counted_cash: None,
        };
        let movements = vec![
            movement(MovementKind::CashIn, 2_000),
            movement(MovementKind::CashOut, 500),
        ];

        let open = DrawerReconciliation::compute(&session, &movements, 7_500, None);
        assert_eq!(open.expected, 19_000);
        assert_eq!(open.variance, None);

        let closed = DrawerReconciliation::compute(&session, &movements, 7_500, Some(18_900));
        assert_eq!(closed.variance, Some(-100));
    }
}
