use atom_common::mock::{InMemoryCredentialStore, StaticServiceFactory, StaticSessionVerifier};
use atom_common::services::service_names::STRIPE_API_KEY;
use atom_config::{AppConfig, StripeConfig};
use atom_stripe::routes;
use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use serde_json::json;
use std::sync::Arc;
use tower::ServiceExt;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn app(server: &MockServer) -> axum::Router {
    let config = Arc::new(AppConfig {
        use_stripe: true,
        stripe: Some(StripeConfig {
            api_base: Some(server.uri()),
        }),
        ..Default::default()
    });
    let services = Arc::new(StaticServiceFactory {
        credential_store: Some(Arc::new(
            InMemoryCredentialStore::new().with_secret("user-1", STRIPE_API_KEY, "sk_test_123"),
        )),
        session_verifier: Some(Arc::new(
            StaticSessionVerifier::new().with_session("good", "user-1"),
        )),
        ..Default::default()
    });
    routes(config, services)
}

#[tokio::test]
async fn payments_route_lists_intents() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/payment_intents"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "has_more": false,
            "data": [{"id": "pi_1", "amount": 100, "currency": "chf", "status": "succeeded", "created": 1}]
        })))
        .mount(&server)
        .await;

    let response = app(&server)
        .oneshot(
            Request::builder()
                .uri("/atom/stripe/payments?limit=1")
                .header(header::AUTHORIZATION, "Bearer good")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["ok"], true);
    assert_eq!(json["data"]["payments"][0]["currency"], "chf");
    assert_eq!(json["data"]["has_more"], false);
}

#[tokio::test]
async fn details_route_rejects_post() {
    let server = MockServer::start().await;
    let response = app(&server)
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/atom/stripe/payments/pi_1")
                .header(header::AUTHORIZATION, "Bearer good")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
}
