//! Integration tests for HttpChatGateway against a mock router

use std::time::Duration;

use chat_core::{Config, Source};
use chat_gateway::{ChatGateway, GatewayError, HttpChatGateway};
use serde_json::json;
use wiremock::matchers::{body_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn test_config(server: &MockServer) -> Config {
    Config {
        api_base: format!("{}/api", server.uri()),
        use_system_proxy: false,
        request_timeout_secs: 5,
        ..Config::default()
    }
}

fn gateway_for(server: &MockServer) -> HttpChatGateway {
    HttpChatGateway::new(&test_config(server)).expect("gateway")
}

#[tokio::test]
async fn test_chat_posts_user_id_and_message() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/chat"))
        .and(body_json(json!({"user_id": "demo-user", "message": "how many orders?"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "answer": "42",
            "route": "db",
            "sources": [{"type": "sql"}]
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let gateway = gateway_for(&mock_server);
    let reply = gateway.chat("demo-user", "how many orders?").await.unwrap();

    assert_eq!(reply.answer, "42");
    assert_eq!(reply.route, "db");
    assert_eq!(reply.sources, vec![Source::new("sql")]);
}

#[tokio::test]
async fn test_chat_accepts_null_sources_and_debug_payload() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/chat"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "answer": "Hello!",
            "route": "general",
            "sources": null,
            "debug": {"router_reason": "small talk"}
        })))
        .mount(&mock_server)
        .await;

    let reply = gateway_for(&mock_server).chat("u1", "hi").await.unwrap();
    assert_eq!(reply.route, "general");
    assert!(reply.sources.is_empty());
}

#[tokio::test]
async fn test_source_extra_fields_survive() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/chat"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "answer": "See the handbook.",
            "route": "rag",
            "sources": [{"type": "rag", "meta": {"file": "handbook.docx"}}]
        })))
        .mount(&mock_server)
        .await;

    let reply = gateway_for(&mock_server).chat("u1", "policy?").await.unwrap();
    assert_eq!(reply.sources[0].kind, "rag");
    assert_eq!(reply.sources[0].extra["meta"]["file"], "handbook.docx");
}

#[tokio::test]
async fn test_server_error_is_status_failure_without_retry() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/chat"))
        .respond_with(ResponseTemplate::new(503).set_body_string("Service Unavailable"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let err = gateway_for(&mock_server).chat("u1", "hi").await.unwrap_err();
    match err {
        GatewayError::Status { status, body } => {
            assert_eq!(status, 503);
            assert_eq!(body, "Service Unavailable");
        }
        other => panic!("expected status error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_missing_answer_is_a_failure() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/chat"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "route": "db",
            "sources": []
        })))
        .mount(&mock_server)
        .await;

    let err = gateway_for(&mock_server).chat("u1", "hi").await.unwrap_err();
    assert!(matches!(err, GatewayError::MalformedReply(_)));
}

#[tokio::test]
async fn test_non_json_body_is_a_failure() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/chat"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>proxy page</html>"))
        .mount(&mock_server)
        .await;

    let err = gateway_for(&mock_server).chat("u1", "hi").await.unwrap_err();
    assert!(matches!(err, GatewayError::Json(_)));
}

#[tokio::test]
async fn test_unreachable_backend_is_http_failure() {
    // Reserve a free port, then release it so nothing is listening there.
    let addr = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap()
    };
    let config = Config {
        api_base: format!("http://{addr}/api"),
        use_system_proxy: false,
        request_timeout_secs: 5,
        ..Config::default()
    };

    let gateway = HttpChatGateway::new(&config).unwrap();
    let err = gateway.chat("u1", "hi").await.unwrap_err();
    match err {
        GatewayError::Http(e) => assert!(e.is_connect(), "expected connect error, got {e}"),
        other => panic!("expected transport failure, got {other:?}"),
    }
}

#[tokio::test]
async fn test_slow_backend_times_out() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/chat"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"answer": "late", "route": "web"}))
                .set_delay(Duration::from_secs(3)),
        )
        .mount(&mock_server)
        .await;

    let config = Config {
        request_timeout_secs: 1,
        ..test_config(&mock_server)
    };
    let err = HttpChatGateway::new(&config)
        .unwrap()
        .chat("u1", "hi")
        .await
        .unwrap_err();
    assert!(err.is_timeout(), "expected timeout, got {err:?}");
}

#[tokio::test]
async fn test_history_and_clear_history() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/history/demo-user"))
        .and(query_param("limit", "5"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "user_id": "demo-user",
            "history": [
                {"role": "user", "content": "hi", "timestamp": "2026-10-01T10:00:00"},
                {"role": "assistant", "content": "Hello!", "timestamp": null}
            ],
            "count": 2
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("DELETE"))
        .and(path("/api/history/demo-user"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "success",
            "message": "History cleared for user demo-user"
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let gateway = gateway_for(&mock_server);

    let page = gateway.history("demo-user", 5).await.unwrap();
    assert_eq!(page.count, 2);
    assert_eq!(page.history[1].content, "Hello!");
    assert!(page.history[1].timestamp.is_none());

    let cleared = gateway.clear_history("demo-user").await.unwrap();
    assert_eq!(cleared.status, "success");
}

#[tokio::test]
async fn test_health_check() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/health"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "ok"})))
        .expect(1)
        .mount(&mock_server)
        .await;

    let health = gateway_for(&mock_server).health().await.unwrap();
    assert!(health.is_ok());
}
