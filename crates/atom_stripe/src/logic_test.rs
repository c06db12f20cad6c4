#[cfg(test)]
mod tests {
    use crate::logic::StripeSkills;
    use crate::models::{ApiPaymentIntent, ListPaymentsOptions, StripePaymentIntent};
    use atom_common::mock::InMemoryCredentialStore;
    use atom_common::services::service_names::STRIPE_API_KEY;
    use atom_common::services::CredentialStore;
    use serde_json::json;
    use std::sync::Arc;
    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn skills(server: &MockServer) -> StripeSkills {
        let credentials = InMemoryCredentialStore::new().with_secret("user-1", STRIPE_API_KEY, "sk_test_123");
        StripeSkills::new(
            Some(Arc::new(credentials) as Arc<dyn CredentialStore>),
            Some(server.uri()),
        )
    }

    #[test]
    fn unexpanded_charge_becomes_placeholder() {
        let api: ApiPaymentIntent = serde_json::from_value(json!({
            "id": "pi_1", "amount": 2000, "currency": "usd", "status": "processing",
            "created": 1700000000, "customer": "cus_9", "description": null,
            "latest_charge": "ch_1"
        }))
        .unwrap();
        let pi = StripePaymentIntent::from(api);
        let charge = pi.latest_charge.unwrap();
        assert_eq!(charge.id, "ch_1");
        assert_eq!(charge.status, "pending");
        assert_eq!(charge.amount, 0);
        assert_eq!(pi.customer.as_deref(), Some("cus_9"));
    }

    #[test]
    fn expanded_customer_and_charge() {
        let api: ApiPaymentIntent = serde_json::from_value(json!({
            "id": "pi_2", "amount": 500, "currency": "eur", "status": "succeeded",
            "created": 1700000001, "customer": {"id": "cus_7", "object": "customer"},
            "latest_charge": {"id": "ch_2", "amount": 500, "currency": "eur",
                              "status": "succeeded", "created": 1700000002,
                              "receipt_url": "https://pay.stripe.com/receipts/ch_2"}
        }))
        .unwrap();
        let pi = StripePaymentIntent::from(api);
        assert_eq!(pi.customer.as_deref(), Some("cus_7"));
        assert_eq!(
            pi.latest_charge.unwrap().receipt_url.as_deref(),
            Some("https://pay.stripe.com/receipts/ch_2")
        );
    }

    #[tokio::test]
    async fn missing_key_is_config_error() {
        let skills = StripeSkills::new(
            Some(Arc::new(InMemoryCredentialStore::new()) as Arc<dyn CredentialStore>),
            None,
        );
        let response = skills
            .list_payments("user-1", &ListPaymentsOptions::default())
            .await;
        assert_eq!(response.error_code(), Some("STRIPE_CONFIG_ERROR"));
        let response = skills.get_payment_details("user-1", "pi_1").await;
        assert_eq!(response.error_code(), Some("STRIPE_CONFIG_ERROR"));
    }

    #[tokio::test]
    async fn list_payments_with_filters() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/payment_intents"))
            // base64("sk_test_123:")
            .and(header("authorization", "Basic c2tfdGVzdF8xMjM6"))
            .and(query_param("limit", "10"))
            .and(query_param("expand[]", "data.latest_charge"))
            .and(query_param("customer", "cus_9"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "object": "list",
                "has_more": true,
                "data": [{"id": "pi_1", "amount": 2000, "currency": "usd", "status": "succeeded",
                          "created": 1700000000, "customer": "cus_9", "latest_charge": null}]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let options = ListPaymentsOptions {
            customer: Some("cus_9".to_string()),
            ..Default::default()
        };
        let data = skills(&server)
            .list_payments("user-1", &options)
            .await
            .data
            .unwrap();
        assert!(data.has_more);
        assert_eq!(data.payments[0].id, "pi_1");
        assert!(data.payments[0].latest_charge.is_none());
    }

    #[tokio::test]
    async fn details_validation_and_not_found() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/payment_intents/pi_missing"))
            .respond_with(ResponseTemplate::new(404).set_body_json(json!({
                "error": {"code": "resource_missing", "message": "No such payment_intent: 'pi_missing'",
                          "param": "intent", "type": "invalid_request_error"}
            })))
            .mount(&server)
            .await;

        let skills = skills(&server);
        let response = skills.get_payment_details("user-1", " ").await;
        assert_eq!(response.error_code(), Some("VALIDATION_ERROR"));

        let error = skills
            .get_payment_details("user-1", "pi_missing")
            .await
            .error
            .unwrap();
        assert_eq!(error.code, "PAYMENT_INTENT_NOT_FOUND");
        assert_eq!(error.message, "PaymentIntent with ID pi_missing not found.");
        assert_eq!(error.status, 404);
        assert_eq!(error.details.unwrap()["param"], "intent");
    }

    #[tokio::test]
    async fn other_api_errors_are_stripe_api_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/payment_intents/pi_1"))
            .respond_with(ResponseTemplate::new(401).set_body_json(json!({
                "error": {"message": "Invalid API Key provided: sk_test_***123", "type": "invalid_request_error"}
            })))
            .mount(&server)
            .await;

        let error = skills(&server)
            .get_payment_details("user-1", "pi_1")
            .await
            .error
            .unwrap();
        assert_eq!(error.code, "STRIPE_API_ERROR");
        assert_eq!(error.status, 401);
        assert!(error.message.starts_with("Invalid API Key"));
    }

    #[tokio::test]
    async fn details_expand_charge_and_customer() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/payment_intents/pi_2"))
            .and(header("stripe-version", "2024-04-10"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": "pi_2", "amount": 500, "currency": "eur", "status": "succeeded",
                "created": 1700000001, "customer": {"id": "cus_7"},
                "latest_charge": {"id": "ch_2", "amount": 500, "currency": "eur",
                                  "status": "succeeded", "created": 1700000002}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let pi = skills(&server)
            .get_payment_details("user-1", "pi_2")
            .await
            .data
            .unwrap();
        assert_eq!(pi.customer.as_deref(), Some("cus_7"));
        assert_eq!(pi.latest_charge.unwrap().id, "ch_2");
    }
}
