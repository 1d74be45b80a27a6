use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use consign_api::relay::NotifyChannels;
use consign_api::state::{AppState, AuthConfig};
use consign_api::app;
use consign_core::repository::{DeliveryRepository, ShipmentRepository};
use consign_core::EventSink;
use consign_shared::topics;
use consign_store::memory::{MemoryStore, RecordingSink};
use consign_tracking::{DeliveryManager, ShipmentManager};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

fn test_app() -> (Router, Arc<RecordingSink>) {
    let store = MemoryStore::new();
    let sink = Arc::new(RecordingSink::default());
    let events: Arc<dyn EventSink> = sink.clone();

    let shipments: Arc<dyn ShipmentRepository> = Arc::new(store.shipments());
    let deliveries: Arc<dyn DeliveryRepository> = Arc::new(store.deliveries());
    let delivery_manager = Arc::new(DeliveryManager::new(deliveries.clone(), shipments.clone()));
    let tracker = Arc::new(ShipmentManager::new(
        shipments.clone(),
        delivery_manager.clone(),
        events.clone(),
    ));

    let state = AppState {
        shipments,
        cargo: Arc::new(store.cargo()),
        routes: Arc::new(store.routes()),
        vendors: Arc::new(store.vendors()),
        deliveries,
        tracker,
        delivery_manager,
        events,
        notify: NotifyChannels::new(16),
        auth: AuthConfig {
            secret: "test-secret".to_string(),
            expiration: 3600,
        },
    };

    (app(state), sink)
}

fn get(uri: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

fn send_json(method: &str, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn body_json(resp: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

async fn create_shipment(app: &Router) -> String {
    let resp = app
        .clone()
        .oneshot(send_json(
            "POST",
            "/v1/shipments",
            json!({ "origin": "NYC", "destination": "LA" }),
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CREATED);
    let body = body_json(resp).await;
    assert_eq!(body["status"], "Created");
    body["id"].as_str().unwrap().to_string()
}

async fn set_status(app: &Router, id: &str, status: &str) {
    let resp = app
        .clone()
        .oneshot(send_json(
            "PUT",
            &format!("/v1/shipments/{}", id),
            json!({
                "origin": "NYC",
                "destination": "LA",
                "status": status,
                "estimated_delivery": "2024-01-10",
            }),
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
}

#[tokio::test]
async fn delivered_update_materializes_exactly_one_delivery() {
    let (app, sink) = test_app();
    let id = create_shipment(&app).await;

    set_status(&app, &id, "Delivered").await;

    let deliveries = body_json(app.clone().oneshot(get("/v1/deliveries")).await.unwrap()).await;
    let deliveries = deliveries.as_array().unwrap();
    assert_eq!(deliveries.len(), 1);
    assert_eq!(deliveries[0]["shipment_id"], id.as_str());
    assert_eq!(deliveries[0]["recipient"], "Customer at LA");
    assert!(deliveries[0]["actual_delivery_date"]
        .as_str()
        .unwrap()
        .starts_with("2024-01-10T00:00:00"));

    // Repeating the same update leaves exactly one delivery.
    set_status(&app, &id, "Delivered").await;
    let deliveries = body_json(app.clone().oneshot(get("/v1/deliveries")).await.unwrap()).await;
    assert_eq!(deliveries.as_array().unwrap().len(), 1);

    let messages = sink.messages();
    assert!(messages
        .iter()
        .any(|(topic, msg)| topic == topics::SHIPMENT_EVENTS
            && msg.contains("New status: Delivered")));
}

#[tokio::test]
async fn unknown_ids_and_bad_payloads_are_rejected() {
    let (app, sink) = test_app();

    let resp = app
        .clone()
        .oneshot(get(
            "/v1/shipments/00000000-0000-0000-0000-000000000000",
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let resp = app
        .clone()
        .oneshot(send_json(
            "PUT",
            "/v1/shipments/00000000-0000-0000-0000-000000000000",
            json!({ "origin": "NYC", "destination": "LA", "status": "Delivered" }),
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let resp = app
        .clone()
        .oneshot(send_json(
            "POST",
            "/v1/shipments",
            json!({ "origin": "  ", "destination": "LA" }),
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    // Failed operations emit nothing.
    assert!(sink.messages().is_empty());
}

#[tokio::test]
async fn cleanup_is_token_protected_and_reports_the_count() {
    let (app, _) = test_app();
    let id = create_shipment(&app).await;

    // Deliver, then flap away: the delivery row stays behind.
    set_status(&app, &id, "Delivered").await;
    set_status(&app, &id, "InTransit").await;

    let listed = body_json(app.clone().oneshot(get("/v1/deliveries")).await.unwrap()).await;
    assert!(listed.as_array().unwrap().is_empty());

    let resp = app
        .clone()
        .oneshot(send_json(
            "POST",
            "/v1/maintenance/deliveries/cleanup",
            json!({}),
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let resp = app
        .clone()
        .oneshot(send_json("POST", "/v1/auth/guest", json!({})))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let token = body_json(resp).await["token"].as_str().unwrap().to_string();

    let req = Request::builder()
        .method("POST")
        .uri("/v1/maintenance/deliveries/cleanup")
        .header(header::AUTHORIZATION, format!("Bearer {}", token))
        .body(Body::empty())
        .unwrap();
    let resp = app.clone().oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(body_json(resp).await["deleted"], 1);
}

#[tokio::test]
async fn deleting_a_shipment_cascades_to_cargo_and_deliveries() {
    let (app, _) = test_app();
    let id = create_shipment(&app).await;
    set_status(&app, &id, "Delivered").await;

    let resp = app
        .clone()
        .oneshot(send_json(
            "POST",
            "/v1/cargo",
            json!({ "shipment_id": id, "kind": "Electronics", "weight": 120.5, "weight_unit": "kg" }),
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CREATED);

    let resp = app
        .clone()
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri(format!("/v1/shipments/{}", id))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);

    let deliveries = body_json(app.clone().oneshot(get("/v1/deliveries")).await.unwrap()).await;
    assert!(deliveries.as_array().unwrap().is_empty());
    let cargo = body_json(app.clone().oneshot(get("/v1/cargo")).await.unwrap()).await;
    assert!(cargo.as_array().unwrap().is_empty());
}
