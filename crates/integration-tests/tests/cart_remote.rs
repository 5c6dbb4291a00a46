//! Integration tests for cart reconciliation against the remote service.
//!
//! Each test starts its own in-process fake service on an ephemeral port.
//!
//! Run with: cargo test -p prasanna-farm-integration-tests

use std::sync::Arc;

use prasanna_farm_core::{Cart, CartLineItem, Price, ProductId};
use prasanna_farm_integration_tests::{FakeFarmService, REMOTE_ONLY_PRODUCT, unreachable_remote};
use prasanna_farm_storefront::StorefrontSession;
use prasanna_farm_storefront::catalog::StaticCatalog;
use prasanna_farm_storefront::config::StorefrontConfig;
use prasanna_farm_storefront::store::{KeyValueStore, MemoryStore, load_cart};

async fn start_service() -> FakeFarmService {
    FakeFarmService::start()
        .await
        .expect("Failed to start fake service")
}

async fn session_with(
    service: &FakeFarmService,
    store: Arc<MemoryStore>,
) -> StorefrontSession {
    let dir = std::env::temp_dir();
    StorefrontSession::with_store(service.config(&dir), store)
        .await
        .expect("Failed to start session")
}

fn persisted(store: &dyn KeyValueStore) -> Cart {
    load_cart(store).expect("Cart snapshot missing")
}

fn product_id(id: &str) -> ProductId {
    ProductId::new(id)
}

// ============================================================================
// Healthy remote
// ============================================================================

#[tokio::test]
async fn test_remote_add_replaces_local_state() {
    let service = start_service().await;
    let store = Arc::new(MemoryStore::new());
    let session = session_with(&service, store.clone()).await;
    assert!(session.cart().is_remote_enabled());

    let summary = session
        .add_to_cart(&product_id("fruit-mango"), 2)
        .await
        .expect("add failed");
    assert_eq!(summary.item_count, 2);
    assert_eq!(summary.total_price, Price::from_rupees(900));

    // Server, memory and snapshot agree
    assert_eq!(service.cart(), session.cart().cart());
    assert_eq!(persisted(store.as_ref()), session.cart().cart());
}

#[tokio::test]
async fn test_server_state_wins_over_local_merge() {
    let service = start_service().await;
    let store = Arc::new(MemoryStore::new());
    let session = session_with(&service, store.clone()).await;

    // Another client adds to the same server cart behind our back
    let ghee = StaticCatalog::builtin()
        .product(&product_id("dairy-ghee"))
        .cloned()
        .expect("ghee in catalog");
    service.seed_cart(Cart::from_items([CartLineItem::new(ghee, 1)]));

    session
        .add_to_cart(&product_id("veg-tomato"), 1)
        .await
        .expect("add failed");

    let cart = session.cart().cart();
    assert_eq!(cart.len(), 2);
    assert!(cart.line(&product_id("dairy-ghee")).is_some());
    assert_eq!(persisted(store.as_ref()), cart);
}

#[tokio::test]
async fn test_scenario_against_remote() {
    let service = start_service().await;
    let store = Arc::new(MemoryStore::new());
    let session = session_with(&service, store.clone()).await;
    let cart = session.cart();

    session.add_to_cart(&product_id("veg-tomato"), 1).await.expect("add A");
    session.add_to_cart(&product_id("veg-tomato"), 2).await.expect("add A again");
    let summary = session.add_to_cart(&product_id("fruit-guava"), 1).await.expect("add B");
    assert_eq!(summary.line_count, 2);
    assert_eq!(summary.item_count, 4);
    assert_eq!(summary.total_price, Price::from_rupees(3 * 40 + 90));

    let summary = cart.update_quantity(&product_id("veg-tomato"), 0).await;
    assert_eq!(summary.line_count, 1);

    let summary = cart.clear().await;
    assert_eq!(summary.item_count, 0);
    assert!(service.cart().is_empty());
    assert!(persisted(store.as_ref()).is_empty());
}

#[tokio::test]
async fn test_remote_update_quantity_sets_server_line() {
    let service = start_service().await;
    let store = Arc::new(MemoryStore::new());
    let session = session_with(&service, store.clone()).await;
    let tomato = product_id("veg-tomato");

    session.add_to_cart(&tomato, 1).await.expect("add failed");
    let before = service.request_count();

    let summary = session.cart().update_quantity(&tomato, 5).await;
    assert_eq!(summary.item_count, 5);
    assert_eq!(summary.total_price, Price::from_rupees(5 * 40));
    assert_eq!(service.request_count(), before + 1);

    let server_line = service.cart().line(&tomato).map(|line| line.quantity);
    assert_eq!(server_line, Some(5));
    assert_eq!(session.cart().cart().line(&tomato).map(|l| l.quantity), Some(5));
    assert_eq!(persisted(store.as_ref()), session.cart().cart());
}

#[tokio::test]
async fn test_initialize_from_remote_cart() {
    let service = start_service().await;
    let saffron = {
        let probe = session_with(&service, Arc::new(MemoryStore::new())).await;
        probe
            .catalog()
            .product(&product_id(REMOTE_ONLY_PRODUCT))
            .await
            .expect("remote product")
    };
    service.seed_cart(Cart::from_items([CartLineItem::new(saffron, 3)]));

    let store = Arc::new(MemoryStore::new());
    let session = session_with(&service, store.clone()).await;

    assert_eq!(session.cart().total_items(), 3);
    assert_eq!(persisted(store.as_ref()).total_items(), 3);
}

#[tokio::test]
async fn test_adding_remote_only_product() {
    let service = start_service().await;
    let session = session_with(&service, Arc::new(MemoryStore::new())).await;

    let summary = session
        .add_to_cart(&product_id(REMOTE_ONLY_PRODUCT), 1)
        .await
        .expect("add failed");
    assert_eq!(summary.total_price, Price::from_rupees(320));
}

// ============================================================================
// Failing remote
// ============================================================================

#[tokio::test]
async fn test_failing_remote_falls_back_to_local_arithmetic() {
    let service = start_service().await;
    let store = Arc::new(MemoryStore::new());
    let session = session_with(&service, store.clone()).await;
    service.set_failing(true);

    let local_store = Arc::new(MemoryStore::new());
    let local = StorefrontSession::with_store(StorefrontConfig::local("unused"), local_store)
        .await
        .expect("local session");

    for (id, quantity) in [("veg-tomato", 1), ("veg-tomato", 2), ("fruit-mango", 1)] {
        session.add_to_cart(&product_id(id), quantity).await.expect("remote add");
        local.add_to_cart(&product_id(id), quantity).await.expect("local add");
    }
    session.cart().update_quantity(&product_id("fruit-mango"), 4).await;
    local.cart().update_quantity(&product_id("fruit-mango"), 4).await;

    assert_eq!(session.cart().cart(), local.cart().cart());
    assert_eq!(session.cart().summary(), local.cart().summary());
    assert_eq!(persisted(store.as_ref()), session.cart().cart());
    assert!(service.cart().is_empty());
    assert!(!session.cart().is_loading());
}

#[tokio::test]
async fn test_clear_with_failing_remote_still_empties() {
    let service = start_service().await;
    let store = Arc::new(MemoryStore::new());
    let session = session_with(&service, store.clone()).await;

    session.add_to_cart(&product_id("leafy-mint"), 2).await.expect("add");
    service.set_failing(true);

    let summary = session.cart().clear().await;
    assert_eq!(summary.line_count, 0);
    assert!(session.cart().cart().is_empty());
    assert!(persisted(store.as_ref()).is_empty());
}

#[tokio::test]
async fn test_initialize_with_failing_remote_uses_snapshot() {
    let service = start_service().await;
    let store = Arc::new(MemoryStore::new());
    {
        let first = session_with(&service, store.clone()).await;
        first.add_to_cart(&product_id("grain-toor"), 2).await.expect("add");
    }

    service.set_failing(true);
    let second = session_with(&service, store.clone()).await;
    assert_eq!(second.cart().total_items(), 2);
}

#[tokio::test]
async fn test_recovered_remote_is_authoritative_again() {
    let service = start_service().await;
    let session = session_with(&service, Arc::new(MemoryStore::new())).await;

    service.set_failing(true);
    session.add_to_cart(&product_id("veg-okra"), 1).await.expect("add offline");
    assert_eq!(session.cart().total_items(), 1);

    // The server never saw the offline add; its answer replaces local state
    service.set_failing(false);
    session.add_to_cart(&product_id("veg-carrot"), 1).await.expect("add online");
    let cart = session.cart().cart();
    assert_eq!(cart.len(), 1);
    assert!(cart.line(&product_id("veg-carrot")).is_some());
}

#[tokio::test]
async fn test_unreachable_remote_falls_back() {
    let remote = unreachable_remote().await.expect("probe port");
    let mut config = StorefrontConfig::local("unused");
    config.remote = Some(remote);

    let store = Arc::new(MemoryStore::new());
    let session = StorefrontSession::with_store(config, store.clone())
        .await
        .expect("session");

    let summary = session
        .add_to_cart(&product_id("dairy-milk"), 2)
        .await
        .expect("add");
    assert_eq!(summary.total_price, Price::from_rupees(180));
    assert_eq!(persisted(store.as_ref()).total_items(), 2);
}

#[tokio::test]
async fn test_checkout_clears_remote_cart() {
    let service = start_service().await;
    let store = Arc::new(MemoryStore::new());
    let session = session_with(&service, store.clone()).await;
    session.add_to_cart(&product_id("dairy-paneer"), 1).await.expect("add");

    let form = prasanna_farm_storefront::checkout::CheckoutForm {
        full_name: "Meena Iyer".to_string(),
        email: "meena@example.in".to_string(),
        phone: "9123456780".to_string(),
        address: "7 Lake View".to_string(),
        city: "Chennai".to_string(),
        pincode: "600001".to_string(),
        payment_method: prasanna_farm_core::PaymentMethod::Card,
    };
    let order = session.place_order(&form).await.expect("order");
    assert_eq!(order.total, Price::from_rupees(170));

    assert!(service.cart().is_empty());
    assert!(persisted(store.as_ref()).is_empty());
}

// ============================================================================
// File-backed sessions
// ============================================================================

#[tokio::test]
async fn test_file_store_survives_restart_with_failing_remote() {
    let service = start_service().await;
    let dir = tempfile::tempdir().expect("Failed to create temp dir");

    {
        let session = StorefrontSession::start(service.config(dir.path()))
            .await
            .expect("first session");
        session.add_to_cart(&product_id("fruit-papaya"), 2).await.expect("add");
        session.add_to_cart(&product_id("grain-ragi"), 1).await.expect("add");
    }

    service.set_failing(true);
    let session = StorefrontSession::start(service.config(dir.path()))
        .await
        .expect("second session");
    assert_eq!(session.cart().total_items(), 3);
    assert_eq!(session.cart().total_price(), Price::from_rupees(2 * 60 + 90));
    assert!(dir.path().join("cart.json").exists());
}

#[tokio::test]
async fn test_fake_service_error_contract() {
    let service = start_service().await;
    service.set_failing(true);

    let response = reqwest::get(format!("{}/cart", service.base_url()))
        .await
        .expect("request failed");
    assert_eq!(response.status().as_u16(), 503);
    let body: serde_json::Value = response.json().await.expect("json body");
    assert_eq!(body["message"], "Service Unavailable");
    assert_eq!(service.request_count(), 1);
}
