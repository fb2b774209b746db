//! End-to-end flow through the database layer: build a cart from catalog
//! rows, commit it with stock reservation, then reconcile the drawer and
//! summarise the day.

use chrono::{Duration, Utc};
use shopfront_core::cart::Cart;
use shopfront_core::drawer::DrawerReconciliation;
use shopfront_core::report::SalesReport;
use shopfront_core::{CoreError, MovementKind, NewProduct, PaidStatus, PaymentMethod, TaxRate, UserRole};
use shopfront_db::{Database, DbConfig, DbError};

async fn setup() -> (Database, i64) {
    let db = Database::new(DbConfig::in_memory()).await.unwrap();
    let user = db
        .users()
        .create("till", "not-a-real-hash", "Till One", UserRole::Cashier)
        .await
        .unwrap();
    (db, user.id)
}

fn product(code: &str, name: &str, price: i64, stock: i64) -> NewProduct {
    NewProduct {
        code: code.to_string(),
        barcode: None,
        name: name.to_string(),
        price,
        category_id: None,
        stock,
        reorder_level: 5,
    }
}

#[tokio::test]
async fn cart_checkout_and_drawer_close() {
    let (db, user_id) = setup().await;
    let soap = db.products().insert(&product("SOAP-1", "Hand Soap", 1000, 10)).await.unwrap();
    let rice = db.products().insert(&product("RICE-1", "Basmati Rice", 450, 3)).await.unwrap();

    let session = db.drawer().open(user_id, 5_000).await.unwrap();

    let mut cart = Cart::new(TaxRate::from_bps(800));
    cart.add(&soap).unwrap();
    cart.add(&soap).unwrap();
    cart.add(&rice).unwrap();

    let request = cart.to_commit_request(PaymentMethod::Cash, None, None);
    let validated = request.validate().unwrap();
    assert_eq!(validated.paid_status, PaidStatus::Paid);

    let today = Utc::now().date_naive();
    let committed = db
        .sales()
        .reserve_and_commit(&validated, user_id, today)
        .await
        .unwrap();
    cart.clear();

    let soap_after = db.products().get_by_id(soap.id).await.unwrap().unwrap();
    let rice_after = db.products().get_by_id(rice.id).await.unwrap().unwrap();
    assert_eq!(soap_after.stock, 8);
    assert_eq!(rice_after.stock, 2);

    let detail = db.sales().get_detail(committed.sale_id).await.unwrap();
    assert_eq!(detail.items.len(), 2);
    assert_eq!(detail.payments.len(), 1);
    // 2 x 10.00 + 4.50 = 24.50, plus 8% tax per line: 1.60 + 0.36
    assert_eq!(detail.sale.total_amount, 2646);

    db.drawer()
        .add_movement(session.id, MovementKind::CashOut, 1_000, Some("float top-up"), user_id)
        .await
        .unwrap();

    let movements = db.drawer().movements(session.id).await.unwrap();
    let cash = db
        .sales()
        .cash_taken_since(user_id, session.opened_at - Duration::seconds(1))
        .await
        .unwrap();
    let recon = DrawerReconciliation::compute(&session, &movements, cash, Some(6_646));
    assert_eq!(recon.expected, 5_000 + 2_646 - 1_000);
    assert_eq!(recon.variance, Some(0));

    let sales = db.sales().list_between(today, today).await.unwrap();
    let units = db.sales().units_sold_between(today, today).await.unwrap();
    let report = SalesReport::new(today, today, sales, units);
    assert_eq!(report.summary.sale_count, 1);
    assert_eq!(report.summary.item_count, 3);
    assert_eq!(report.summary.gross_total, 2646);
}

#[tokio::test]
async fn checkout_rejects_oversell_without_partial_writes() {
    let (db, user_id) = setup().await;
    let soap = db.products().insert(&product("SOAP-1", "Hand Soap", 1000, 5)).await.unwrap();
    let rice = db.products().insert(&product("RICE-1", "Basmati Rice", 450, 1)).await.unwrap();

    let mut cart = Cart::new(TaxRate::zero());
    cart.add(&soap).unwrap();
    cart.add(&rice).unwrap();
    let validated = cart
        .to_commit_request(PaymentMethod::Cash, None, None)
        .validate()
        .unwrap();

    // Someone else sells the last bag of rice first
    db.products().set_stock(rice.id, 0).await.unwrap();

    let err = db
        .sales()
        .reserve_and_commit(&validated, user_id, Utc::now().date_naive())
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        DbError::Rule(CoreError::InsufficientStock { available: 0, requested: 1, .. })
    ));

    // The soap reservation was rolled back with the rest of the transaction
    let soap_after = db.products().get_by_id(soap.id).await.unwrap().unwrap();
    assert_eq!(soap_after.stock, 5);
    let today = Utc::now().date_naive();
    assert!(db.sales().list_between(today, today).await.unwrap().is_empty());
}

#[tokio::test]
async fn credit_sale_is_settled_by_later_payments() {
    let (db, user_id) = setup().await;
    let soap = db.products().insert(&product("SOAP-1", "Hand Soap", 1000, 5)).await.unwrap();
    let customer = db.customers().create("Ana", None, None).await.unwrap();

    let mut cart = Cart::new(TaxRate::zero());
    cart.add(&soap).unwrap();
    let validated = cart
        .to_commit_request(PaymentMethod::Cash, Some(customer.id), Some(400))
        .validate()
        .unwrap();
    assert_eq!(validated.paid_status, PaidStatus::Partial);

    let committed = db
        .sales()
        .commit(&validated, user_id, Utc::now().date_naive())
        .await
        .unwrap();
    assert_eq!(db.sales().list_outstanding().await.unwrap().len(), 1);

    let err = db
        .sales()
        .record_payment(committed.sale_id, 700, PaymentMethod::Cash, user_id)
        .await
        .unwrap_err();
    assert!(matches!(err, DbError::Rule(CoreError::Overpayment { outstanding: 600, .. })));

    let sale = db
        .sales()
        .record_payment(committed.sale_id, 600, PaymentMethod::Cash, user_id)
        .await
        .unwrap();
    assert_eq!(sale.paid_status, PaidStatus::Paid);
    assert!(db.sales().list_outstanding().await.unwrap().is_empty());
}
