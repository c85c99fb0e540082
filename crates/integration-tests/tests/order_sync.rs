//! End-to-end order reconciliation against scripted remote pages.

use serde_json::json;

use woosync_core::{OrderState, PartnerKind};
use woosync_engine::SyncOrchestrator;
use woosync_engine::store::MemoryStore;
use woosync_engine::woo::Resource;
use woosync_integration_tests::{FailingStore, ScriptedCatalog, test_config};

fn order_json(id: i64) -> serde_json::Value {
    json!({
        "id": id,
        "status": "processing",
        "currency": "USD",
        "billing": {"email": "a@x.com", "first_name": "A", "last_name": "B"},
        "line_items": [{"sku": "SKU1", "name": "Widget", "quantity": 1, "price": "9.99"}],
        "total": "9.99"
    })
}

#[tokio::test]
async fn test_full_order_import() {
    let catalog = ScriptedCatalog::new().with_orders(vec![json!({
        "id": 501,
        "status": "on-hold",
        "currency": "USD",
        "billing": {
            "email": "Jane@Example.com",
            "first_name": "Jane",
            "last_name": "Doe",
            "address_1": "1 Main St",
            "city": "Springfield",
            "postcode": "62701",
            "country": "US",
            "state": "IL",
            "phone": "555-0100"
        },
        "shipping": {
            "first_name": "Jane",
            "last_name": "Doe",
            "address_1": "2 Oak Ave",
            "city": "Shelbyville",
            "postcode": "62702",
            "country": "US"
        },
        "line_items": [
            {"sku": "WID-1", "name": "Widget", "quantity": 2, "price": "9.99"},
            {"product_id": 77, "name": "Gadget", "quantity": 1, "price": "4.00"}
        ],
        "total": "29.93",
        "shipping_total": "5.95",
        "customer_note": "leave at the door",
        "date_created": "2024-01-05T09:30:00"
    })]);

    let store = MemoryStore::new();
    let us = store.seed_country("US");
    store.seed_state(us, "IL");
    store.seed_currency("USD");

    let orchestrator = SyncOrchestrator::new(catalog, store, test_config(100));
    let report = orchestrator.sync(Resource::Orders, None).await.expect("pass");
    assert_eq!(report.total, 1);
    assert_eq!(report.success, 1);

    let orders = orchestrator.store().orders();
    assert_eq!(orders.len(), 1);
    let order = &orders[0];
    assert_eq!(order.reference.as_str(), "WOO-shop-501");
    assert_eq!(order.state, OrderState::Sale);
    assert_eq!(order.amount_total.to_string(), "29.93");
    assert_eq!(order.note.as_deref(), Some("leave at the door"));
    assert!(order.date_order.is_some());
    assert!(order.currency_id.is_some());
    // Shipping address differs, so a second partner carries it.
    assert!(order.partner_shipping_id.is_some());

    // Two item lines plus the synthetic shipping line.
    assert_eq!(order.lines.len(), 3);
    let shipping = order.lines.iter().find(|l| l.name == "Shipping").expect("line");
    assert_eq!(shipping.price_unit.to_string(), "5.95");

    // The SKU-less line got a synthesized product.
    let products = orchestrator.store().products();
    assert!(products.iter().any(|p| p.sku.as_deref() == Some("REMOTE_77")));

    // Billing partner carries the resolved geography.
    let partners = orchestrator.store().partners();
    let billing = partners
        .iter()
        .find(|p| p.email.as_deref() == Some("jane@example.com"))
        .expect("billing partner");
    assert_eq!(billing.name, "Jane Doe");
    assert_eq!(billing.kind, PartnerKind::Contact);
    assert_eq!(billing.country_id, Some(us));
    assert!(billing.state_id.is_some());

    // The shipping destination is a delivery child of the billing contact.
    let delivery = partners
        .iter()
        .find(|p| Some(p.id) == order.partner_shipping_id)
        .expect("delivery partner");
    assert_eq!(delivery.kind, PartnerKind::Delivery);
    assert_eq!(delivery.parent_id, Some(billing.id));
    assert_eq!(delivery.city.as_deref(), Some("Shelbyville"));
}

#[tokio::test]
async fn test_resync_is_idempotent() {
    let catalog = ScriptedCatalog::new().with_orders(vec![order_json(501)]);
    let orchestrator = SyncOrchestrator::new(catalog, MemoryStore::new(), test_config(100));

    let first = orchestrator.sync(Resource::Orders, None).await.expect("first");
    assert_eq!(first.success, 1);

    let second = orchestrator.sync(Resource::Orders, None).await.expect("second");
    assert_eq!(second.total, 1);
    assert_eq!(second.skipped, 1);
    assert_eq!(second.success, 0);
    assert_eq!(orchestrator.store().orders().len(), 1);
}

#[tokio::test]
async fn test_item_failure_does_not_stop_the_batch() {
    let catalog = ScriptedCatalog::new().with_orders(vec![
        order_json(501),
        order_json(502),
        order_json(503),
    ]);
    // The middle order's write is rejected by the store.
    let store = FailingStore::rejecting_order("WOO-shop-502");
    let orchestrator = SyncOrchestrator::new(catalog, store, test_config(100));

    let report = orchestrator.sync(Resource::Orders, None).await.expect("pass");
    assert_eq!(report.total, 3);
    assert_eq!(report.success, 2);
    assert_eq!(report.failed, 1);
    assert_eq!(report.success + report.skipped + report.failed, report.total);

    // The order after the failing one was still attempted and landed.
    let orders = orchestrator.store().inner().orders();
    assert_eq!(orders.len(), 2);
    assert!(orders.iter().any(|o| o.reference.as_str() == "WOO-shop-503"));
}

#[tokio::test]
async fn test_missing_billing_email_fails_cleanly() {
    let catalog = ScriptedCatalog::new().with_orders(vec![
        json!({
            "id": 501,
            "status": "processing",
            "billing": {"first_name": "A"},
            "total": "5.00"
        }),
        order_json(502),
    ]);
    let orchestrator = SyncOrchestrator::new(catalog, MemoryStore::new(), test_config(100));

    let report = orchestrator.sync(Resource::Orders, None).await.expect("pass");
    assert_eq!(report.failed, 1);
    assert_eq!(report.success, 1);

    // No partial order or partner for the failed record.
    let orders = orchestrator.store().orders();
    assert_eq!(orders.len(), 1);
    assert_eq!(orders[0].reference.as_str(), "WOO-shop-502");
    assert_eq!(orchestrator.store().partners().len(), 1);
}

#[tokio::test]
async fn test_unknown_currency_degrades() {
    let catalog = ScriptedCatalog::new().with_orders(vec![order_json(501)]);
    // No currencies seeded at all.
    let orchestrator = SyncOrchestrator::new(catalog, MemoryStore::new(), test_config(100));

    let report = orchestrator.sync(Resource::Orders, None).await.expect("pass");
    assert_eq!(report.success, 1);
    let orders = orchestrator.store().orders();
    assert!(orders[0].currency_id.is_none());
}

#[tokio::test]
async fn test_cancelled_order_maps_to_cancel_state() {
    let mut record = order_json(501);
    record["status"] = json!("refunded");
    let catalog = ScriptedCatalog::new().with_orders(vec![record]);
    let orchestrator = SyncOrchestrator::new(catalog, MemoryStore::new(), test_config(100));

    orchestrator.sync(Resource::Orders, None).await.expect("pass");
    assert_eq!(orchestrator.store().orders()[0].state, OrderState::Cancel);
}

#[tokio::test]
async fn test_multi_page_order_run() {
    let catalog = ScriptedCatalog::new().with_order_pages(vec![
        vec![order_json(501), order_json(502)],
        vec![order_json(503)],
    ]);
    let orchestrator = SyncOrchestrator::new(catalog, MemoryStore::new(), test_config(2));

    let report = orchestrator.sync(Resource::Orders, None).await.expect("pass");
    assert_eq!(report.total, 3);
    assert_eq!(report.success, 3);
    assert_eq!(orchestrator.store().orders().len(), 3);
}
