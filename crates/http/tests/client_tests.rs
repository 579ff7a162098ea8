//! Integration tests for the Qroom HTTP client

use qroom_core::Session;
use qroom_http::client::{ApiRequest, ClientError, ClientSettings, QroomClient};
use serde_json::json;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn test_client_builder() {
    let client = QroomClient::builder()
        .base_url("http://localhost:8080/")
        .build();

    assert!(client.is_ok());
    let client = client.unwrap();
    assert_eq!(client.base_url(), "http://localhost:8080");
    assert!(!client.is_authenticated());
}

#[tokio::test]
async fn test_client_builder_requires_base_url() {
    let result = QroomClient::builder().build();
    assert!(matches!(result, Err(ClientError::Configuration(_))));
}

#[tokio::test]
async fn test_client_builder_rejects_bad_urls() {
    assert!(matches!(
        QroomClient::new("not a url"),
        Err(ClientError::Configuration(_))
    ));
    assert!(matches!(
        QroomClient::new("ftp://files.qroom.app"),
        Err(ClientError::Configuration(_))
    ));
}

#[tokio::test]
async fn test_settings_drive_refresh_path() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/home"))
        .and(header("authorization", "Bearer A1"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/home"))
        .and(header("authorization", "Bearer A2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": true})))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/v2/token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"accessToken": "A2"})))
        .expect(1)
        .mount(&server)
        .await;

    let settings = ClientSettings {
        base_url: server.uri(),
        refresh_path: "api/v2/token".to_string(),
        ..ClientSettings::default()
    };
    let client = QroomClient::builder().settings(&settings).build().unwrap();
    client.session().save(&Session {
        access_token: "A1".to_string(),
        refresh_token: "R1".to_string(),
        user: None,
    });

    let value = client.execute_value(ApiRequest::get("home")).await.unwrap();
    assert_eq!(value, json!({"ok": true}));
    server.verify().await;
}

#[tokio::test]
async fn test_default_headers() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/quiz/start"))
        .and(header("accept", "application/json"))
        .and(header("content-type", "application/json"))
        .and(header("authorization", "Bearer test-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"started": true})))
        .expect(1)
        .mount(&server)
        .await;

    let client = QroomClient::new(server.uri()).unwrap();
    client.session().save(&Session {
        access_token: "test-token".to_string(),
        refresh_token: "refresh".to_string(),
        user: None,
    });

    let request = ApiRequest::post("/quiz/start")
        .json(&json!({"quiz_id": 4}))
        .unwrap();
    let response: serde_json::Value = client.execute(request).await.unwrap();
    assert_eq!(response["started"], true);
}

#[tokio::test]
async fn test_no_bearer_without_stored_token() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/home"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .mount(&server)
        .await;

    let client = QroomClient::new(server.uri()).unwrap();
    client.execute_value(ApiRequest::get("/home")).await.unwrap();

    let requests = server.received_requests().await.unwrap();
    assert!(requests[0].headers.get("authorization").is_none());
}

#[tokio::test]
async fn test_caller_headers_are_kept() {
    let server = MockServer::start().await;

    Mock::given(method("PUT"))
        .and(path("/notes"))
        .and(header("content-type", "text/plain"))
        .and(header("x-request-id", "abc"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let client = QroomClient::new(server.uri()).unwrap();
    let request = ApiRequest::put("/notes")
        .header(
            reqwest::header::CONTENT_TYPE,
            reqwest::header::HeaderValue::from_static("text/plain"),
        )
        .header(
            reqwest::header::HeaderName::from_static("x-request-id"),
            reqwest::header::HeaderValue::from_static("abc"),
        );

    let value = client.execute_value(request).await.unwrap();
    assert!(value.is_null());
}

#[tokio::test]
async fn test_skip_json_parse_resolves_null() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/export"))
        .respond_with(ResponseTemplate::new(200).set_body_string("plain text"))
        .mount(&server)
        .await;

    let client = QroomClient::new(server.uri()).unwrap();
    let value = client
        .execute_value(ApiRequest::get("/export").skip_json_parse())
        .await
        .unwrap();
    assert!(value.is_null());
}

#[tokio::test]
async fn test_error_handling() {
    let server = MockServer::start().await;

    // Body without a message falls back to the generic text
    Mock::given(method("POST"))
        .and(path("/group/join"))
        .respond_with(ResponseTemplate::new(400).set_body_string("Bad Request"))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/group/new"))
        .respond_with(
            ResponseTemplate::new(422)
                .set_body_json(json!({"message": "examDate must be in the future"})),
        )
        .mount(&server)
        .await;

    let client = QroomClient::new(server.uri()).unwrap();

    let result = client.join_group("ABCD").await;
    match result {
        Err(ClientError::ServerError {
            status,
            message,
            body,
        }) => {
            assert_eq!(status, 400);
            assert_eq!(message, "request failed");
            assert!(body.is_none());
        }
        other => panic!("expected server error, got {other:?}"),
    }

    let result = client
        .execute_value(
            ApiRequest::post("/group/new")
                .json(&json!({"name": "OS"}))
                .unwrap(),
        )
        .await;
    let error = result.unwrap_err();
    assert_eq!(error.status(), Some(422));
    assert_eq!(error.user_message(), "examDate must be in the future");
}

#[tokio::test]
async fn test_transport_error() {
    // Nothing listens on the discard port
    let client = QroomClient::new("http://127.0.0.1:9").unwrap();
    let result = client.execute_value(ApiRequest::get("/home")).await;
    assert!(matches!(result, Err(ClientError::Request(_))));
}
