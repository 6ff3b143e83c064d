#![allow(clippy::unwrap_used)]
// Integration tests for the entity managers: capability checks, state
// guards, dual-write consistency, and hybrid reads.

use std::sync::Arc;
use std::time::Duration;

use pretty_assertions::assert_eq;
use serde_json::json;
use url::Url;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, Request, Respond, ResponseTemplate};

use inventra_api::{ApiClient, TokenCell};
use inventra_core::mirror::{KEY_ASSETS, KEY_PRODUCTS, MirrorStore};
use inventra_core::{
    Asset, AssetDraft, AssetManager, AssetStatus, CoreError, HybridOptions, InventoryStore,
    Notifier, Product, ProductDraft, ProductManager, ProductPatch, Role, Source, StockStatus,
    UserIdentity,
};

// ── Helpers ─────────────────────────────────────────────────────────

fn admin() -> UserIdentity {
    UserIdentity {
        id: "u1".into(),
        email: "admin@example.com".into(),
        name: None,
        role: Role::Admin,
    }
}

fn staff() -> UserIdentity {
    UserIdentity {
        id: "u2".into(),
        email: "staff@example.com".into(),
        name: None,
        role: Role::Staff,
    }
}

fn fast_options() -> HybridOptions {
    HybridOptions {
        retries: 0,
        base_delay: Duration::from_millis(1),
    }
}

struct Harness {
    _dir: tempfile::TempDir,
    mirror: MirrorStore,
    store: Arc<InventoryStore>,
    products: ProductManager,
    assets: AssetManager,
}

fn harness(server_uri: Option<&str>) -> Harness {
    let dir = tempfile::tempdir().unwrap();
    let mirror = MirrorStore::new(dir.path());
    let notifier = Notifier::new(mirror.clone());
    let store = Arc::new(InventoryStore::new());

    let api = server_uri.map(|uri| {
        let base_url = Url::parse(uri).unwrap();
        Arc::new(
            ApiClient::with_client(reqwest::Client::new(), base_url, TokenCell::new())
                .with_retry(0, Duration::from_millis(1)),
        )
    });

    let products = ProductManager::new(
        api.clone(),
        None,
        mirror.clone(),
        Arc::clone(&store),
        notifier.clone(),
        fast_options(),
    );
    let assets = AssetManager::new(
        api,
        None,
        mirror.clone(),
        Arc::clone(&store),
        notifier,
        fast_options(),
    );

    Harness {
        _dir: dir,
        mirror,
        store,
        products,
        assets,
    }
}

/// Echoes the received JSON body back inside a success envelope, the way
/// the server confirms a write.
struct EchoEnvelope;

impl Respond for EchoEnvelope {
    fn respond(&self, request: &Request) -> ResponseTemplate {
        let body: serde_json::Value = serde_json::from_slice(&request.body).unwrap();
        ResponseTemplate::new(200).set_body_json(json!({ "success": true, "data": body }))
    }
}

// ── Product writes ──────────────────────────────────────────────────

#[tokio::test]
async fn add_product_derives_status_and_mirrors_after_remote_confirm() {
    let server = MockServer::start().await;
    let h = harness(Some(&server.uri()));

    Mock::given(method("POST"))
        .and(path("/api/products"))
        .respond_with(EchoEnvelope)
        .expect(1)
        .mount(&server)
        .await;

    let product = h
        .products
        .add(
            &admin(),
            ProductDraft {
                name: "Router".into(),
                stock: 5,
                min_stock: 10,
                ..ProductDraft::default()
            },
        )
        .await
        .unwrap();

    assert_eq!(product.status, StockStatus::LowStock);

    // Mirrored with the identical id after the remote confirmed.
    let mirrored: Vec<Product> = h.mirror.get_list(KEY_PRODUCTS).await.unwrap();
    assert_eq!(mirrored.len(), 1);
    assert_eq!(mirrored[0].id, product.id);
    assert_eq!(*h.store.product(&product.id).unwrap(), product);
}

#[tokio::test]
async fn failed_remote_write_leaves_local_state_untouched() {
    let server = MockServer::start().await;
    let h = harness(Some(&server.uri()));

    Mock::given(method("POST"))
        .and(path("/api/products"))
        .respond_with(
            ResponseTemplate::new(500)
                .set_body_json(json!({ "success": false, "error": "boom" })),
        )
        .mount(&server)
        .await;

    let result = h
        .products
        .add(
            &admin(),
            ProductDraft {
                name: "Router".into(),
                stock: 5,
                min_stock: 10,
                ..ProductDraft::default()
            },
        )
        .await;

    assert!(matches!(result, Err(CoreError::Api { .. })));
    let mirrored: Vec<Product> = h.mirror.get_list(KEY_PRODUCTS).await.unwrap();
    assert!(mirrored.is_empty(), "no partial mirror update on failure");
    assert_eq!(h.store.product_count(), 0);
}

#[tokio::test]
async fn offline_write_lands_locally_and_reads_back() {
    let h = harness(None);

    let product = h
        .products
        .add(
            &admin(),
            ProductDraft {
                name: "Switch".into(),
                stock: 0,
                min_stock: 2,
                ..ProductDraft::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(product.status, StockStatus::OutOfStock);

    let result = h.products.list().await.unwrap();
    assert_eq!(result.source, Source::LocalFallback);
    assert!(result.error.is_none());
    assert_eq!(result.data.len(), 1);
    assert_eq!(result.data[0].id, product.id);
}

#[tokio::test]
async fn update_recomputes_status_through_the_remote() {
    let server = MockServer::start().await;
    let h = harness(Some(&server.uri()));

    Mock::given(method("POST"))
        .and(path("/api/products"))
        .respond_with(EchoEnvelope)
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .respond_with(EchoEnvelope)
        .mount(&server)
        .await;

    let product = h
        .products
        .add(
            &admin(),
            ProductDraft {
                name: "Router".into(),
                stock: 5,
                min_stock: 10,
                ..ProductDraft::default()
            },
        )
        .await
        .unwrap();

    let updated = h
        .products
        .update(
            &admin(),
            &product.id,
            ProductPatch {
                stock: Some(50),
                ..ProductPatch::default()
            },
        )
        .await
        .unwrap();

    assert_eq!(updated.status, StockStatus::InStock);
    let mirrored: Vec<Product> = h.mirror.get_list(KEY_PRODUCTS).await.unwrap();
    assert_eq!(mirrored[0].stock, 50);
}

#[tokio::test]
async fn permission_check_aborts_before_any_io() {
    let server = MockServer::start().await;
    let h = harness(Some(&server.uri()));

    // No mock mounted: any request would 404 and the expect below would
    // catch it anyway.
    Mock::given(method("POST"))
        .and(path("/api/products"))
        .respond_with(EchoEnvelope)
        .expect(0)
        .mount(&server)
        .await;

    let result = h
        .products
        .add(
            &staff(),
            ProductDraft {
                name: "Router".into(),
                ..ProductDraft::default()
            },
        )
        .await;

    assert!(matches!(
        result,
        Err(CoreError::PermissionDenied {
            role: Role::Staff,
            ..
        })
    ));
}

// ── Hybrid reads ────────────────────────────────────────────────────

#[tokio::test]
async fn unreachable_remote_falls_back_to_mirror_contents() {
    let h = harness(Some("http://127.0.0.1:9"));

    // Seed the mirror the way a prior session would have.
    let seeded = Product::from_draft(ProductDraft {
        name: "Cached".into(),
        stock: 9,
        min_stock: 1,
        ..ProductDraft::default()
    });
    h.mirror.put(KEY_PRODUCTS, &vec![seeded.clone()]).await.unwrap();

    let result = h.products.list().await.unwrap();

    assert_eq!(result.source, Source::LocalFallback);
    assert!(result.error.is_some(), "remote failure must be attached");
    assert_eq!(result.data.len(), 1);
    assert_eq!(result.data[0].id, seeded.id);
}

#[tokio::test]
async fn remote_read_repairs_the_mirror() {
    let server = MockServer::start().await;
    let h = harness(Some(&server.uri()));

    let listing = json!({
        "success": true,
        "data": [{
            "id": "p-remote",
            "name": "Firewall",
            "stock": 3,
            "min_stock": 1,
            "unit_price": 900.0,
            "created_at": "2024-06-15T10:30:00Z",
            "updated_at": "2024-06-15T10:30:00Z"
        }]
    });
    Mock::given(method("GET"))
        .and(path("/api/products"))
        .respond_with(ResponseTemplate::new(200).set_body_json(listing))
        .mount(&server)
        .await;

    let result = h.products.list().await.unwrap();
    assert_eq!(result.source, Source::Remote);

    let mirrored: Vec<Product> = h.mirror.get_list(KEY_PRODUCTS).await.unwrap();
    assert_eq!(mirrored.len(), 1);
    assert_eq!(mirrored[0].id, "p-remote");
    assert_eq!(h.store.product_count(), 1);
}

// ── Asset guards ────────────────────────────────────────────────────

#[tokio::test]
async fn borrowed_asset_cannot_be_deleted() {
    let server = MockServer::start().await;
    let h = harness(Some(&server.uri()));

    Mock::given(method("POST"))
        .and(path("/api/assets"))
        .respond_with(EchoEnvelope)
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .respond_with(EchoEnvelope)
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "success": true })))
        .expect(0)
        .mount(&server)
        .await;

    let asset = h
        .assets
        .add(
            &admin(),
            AssetDraft {
                name: "Projector".into(),
                ..AssetDraft::default()
            },
        )
        .await
        .unwrap();
    h.assets.borrow(&staff(), &asset.id, "kim").await.unwrap();

    let result = h.assets.delete(&admin(), &asset.id).await;

    assert!(matches!(
        result,
        Err(CoreError::InvalidStateTransition {
            action: "delete",
            status: AssetStatus::Borrowed,
        })
    ));
    // No mutation anywhere.
    let mirrored: Vec<Asset> = h.mirror.get_list(KEY_ASSETS).await.unwrap();
    assert_eq!(mirrored.len(), 1);
    assert_eq!(mirrored[0].status, AssetStatus::Borrowed);
}

#[tokio::test]
async fn circulation_flow_offline() {
    let h = harness(None);

    let asset = h
        .assets
        .add(
            &admin(),
            AssetDraft {
                name: "Laptop".into(),
                tag: Some("IT-042".into()),
                ..AssetDraft::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(asset.status, AssetStatus::Available);

    // Staff can circulate but not create.
    let borrowed = h.assets.borrow(&staff(), &asset.id, "kim").await.unwrap();
    assert_eq!(borrowed.status, AssetStatus::Borrowed);
    assert_eq!(borrowed.assignee.as_deref(), Some("kim"));

    // Double borrow is rejected.
    let again = h.assets.borrow(&staff(), &asset.id, "lee").await;
    assert!(matches!(
        again,
        Err(CoreError::InvalidStateTransition {
            action: "borrow",
            status: AssetStatus::Borrowed,
        })
    ));

    let returned = h.assets.hand_in(&staff(), &asset.id).await.unwrap();
    assert_eq!(returned.status, AssetStatus::Available);
    assert!(returned.assignee.is_none());

    // Returning an available asset is rejected.
    let again = h.assets.hand_in(&staff(), &asset.id).await;
    assert!(matches!(
        again,
        Err(CoreError::InvalidStateTransition {
            action: "return",
            status: AssetStatus::Available,
        })
    ));
}

#[tokio::test]
async fn update_cannot_fake_circulation() {
    let h = harness(None);

    let asset = h
        .assets
        .add(
            &admin(),
            AssetDraft {
                name: "Camera".into(),
                ..AssetDraft::default()
            },
        )
        .await
        .unwrap();

    let result = h
        .assets
        .update(
            &admin(),
            &asset.id,
            inventra_core::AssetPatch {
                status: Some(AssetStatus::Borrowed),
                ..inventra_core::AssetPatch::default()
            },
        )
        .await;

    assert!(matches!(
        result,
        Err(CoreError::InvalidStateTransition { action: "update", .. })
    ));
}

#[tokio::test]
async fn delete_unknown_product_is_not_found() {
    let h = harness(None);
    let result = h.products.delete(&admin(), "ghost").await;
    assert!(matches!(result, Err(CoreError::NotFound { .. })));
}
