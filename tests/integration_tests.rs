//! Request pipeline tests against a wiremock server.

use fathom::{Client, Config, Error, QueryParams, Sleeper, USER_AGENT};
use serde_json::json;
use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Records requested waits instead of sleeping.
#[derive(Clone, Default)]
struct RecordingSleeper {
    waits: Arc<Mutex<Vec<Duration>>>,
}

impl RecordingSleeper {
    fn waits(&self) -> Vec<Duration> {
        self.waits.lock().unwrap().clone()
    }
}

impl Sleeper for RecordingSleeper {
    fn sleep(&self, duration: Duration) -> Pin<Box<dyn Future<Output = ()> + Send>> {
        self.waits.lock().unwrap().push(duration);
        Box::pin(async {})
    }
}

fn client_for(server: &MockServer, config: Config) -> (Client, RecordingSleeper) {
    let sleeper = RecordingSleeper::default();
    let client = Client::builder()
        .config(config)
        .base_url(format!("{}/external/v1", server.uri()))
        .unwrap()
        .sleeper(sleeper.clone())
        .build()
        .unwrap();
    (client, sleeper)
}

fn test_config() -> Config {
    Config::new("test_api_key")
}

#[tokio::test]
async fn test_get_sends_auth_and_json_headers() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/external/v1/meetings"))
        .and(header("x-api-key", "test_api_key"))
        .and(header("content-type", "application/json"))
        .and(header("accept", "application/json"))
        .and(header("user-agent", USER_AGENT))
        .and(|req: &wiremock::Request| req.body.is_empty())
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"items": [{"id": "1"}]})))
        .expect(1)
        .mount(&mock_server)
        .await;

    let (client, _) = client_for(&mock_server, test_config());
    let response = client.get("meetings", &QueryParams::new()).await.unwrap();

    assert_eq!(response.data, json!({"items": [{"id": "1"}]}));
    assert_eq!(response.status.as_u16(), 200);
    assert_eq!(response.attempts, 1);
    assert!(!response.was_retried());
}

#[tokio::test]
async fn test_query_parameters_are_encoded() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/external/v1/meetings"))
        .and(query_param("limit", "10"))
        .and(query_param("team", "Sales & Ops"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"items": []})))
        .expect(1)
        .mount(&mock_server)
        .await;

    let (client, _) = client_for(&mock_server, test_config());
    let mut params = QueryParams::new();
    params.insert("limit".to_string(), "10".to_string());
    params.insert("team".to_string(), "Sales & Ops".to_string());

    let body = client
        .execute(http::Method::GET, "/meetings", &params, None)
        .await
        .unwrap();
    assert_eq!(body, json!({"items": []}));
}

#[tokio::test]
async fn test_post_sends_json_body() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/external/v1/webhooks"))
        .and(body_json(json!({"url": "https://example.com"})))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({"data": {"id": "1"}})))
        .expect(1)
        .mount(&mock_server)
        .await;

    let (client, _) = client_for(&mock_server, test_config());
    let response = client
        .post("webhooks", json!({"url": "https://example.com"}))
        .await
        .unwrap();

    assert_eq!(response.status.as_u16(), 201);
    assert_eq!(response.data, json!({"data": {"id": "1"}}));
}

#[tokio::test]
async fn test_put_sends_json_body() {
    let mock_server = MockServer::start().await;

    Mock::given(method("PUT"))
        .and(path("/external/v1/webhooks/7"))
        .and(body_json(json!({"url": "https://example.com/hook"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": {"id": "7"}})))
        .expect(1)
        .mount(&mock_server)
        .await;

    let (client, _) = client_for(&mock_server, test_config());
    let response = client
        .put("webhooks/7", json!({"url": "https://example.com/hook"}))
        .await
        .unwrap();

    assert_eq!(response.data, json!({"data": {"id": "7"}}));
}

#[tokio::test]
async fn test_redirect_is_not_followed() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/external/v1/meetings"))
        .respond_with(
            ResponseTemplate::new(302)
                .insert_header("Location", format!("{}/elsewhere", mock_server.uri()).as_str()),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/elsewhere"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"items": []})))
        .expect(0)
        .mount(&mock_server)
        .await;

    let (client, _) = client_for(&mock_server, test_config());
    let err = client
        .get("meetings", &QueryParams::new())
        .await
        .unwrap_err();

    match err {
        Error::Unexpected { status, message, .. } => {
            assert_eq!(status.as_u16(), 302);
            assert_eq!(message, "HTTP 302: Found");
        }
        other => panic!("Expected Unexpected, got {:?}", other),
    }
}

#[tokio::test]
async fn test_empty_body_is_omitted() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/external/v1/webhooks"))
        .and(|req: &wiremock::Request| req.body.is_empty())
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({})))
        .expect(1)
        .mount(&mock_server)
        .await;

    let (client, _) = client_for(&mock_server, test_config());
    client.post("webhooks", json!({})).await.unwrap();
}

#[tokio::test]
async fn test_no_content_and_unparseable_bodies_yield_empty_object() {
    let mock_server = MockServer::start().await;

    Mock::given(method("DELETE"))
        .and(path("/external/v1/webhooks/1"))
        .respond_with(ResponseTemplate::new(204))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/external/v1/broken"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&mock_server)
        .await;

    Mock::given(method("POST"))
        .and(path("/external/v1/empty"))
        .respond_with(ResponseTemplate::new(201))
        .mount(&mock_server)
        .await;

    let (client, _) = client_for(&mock_server, test_config());

    let deleted = client.delete("webhooks/1").await.unwrap();
    assert_eq!(deleted.status.as_u16(), 204);
    assert_eq!(deleted.data, json!({}));

    let broken = client.get("broken", &QueryParams::new()).await.unwrap();
    assert_eq!(broken.data, json!({}));
    assert_eq!(broken.raw_body, "not json");

    let empty = client.post("empty", json!({"a": 1})).await.unwrap();
    assert_eq!(empty.data, json!({}));
}

#[tokio::test]
async fn test_error_statuses_map_to_variants() {
    let mock_server = MockServer::start().await;

    for code in [400u16, 401, 403, 404, 500, 502, 503, 409] {
        Mock::given(method("GET"))
            .and(path(format!("/external/v1/status/{}", code)))
            .respond_with(ResponseTemplate::new(code).set_body_json(json!({"error": "boom"})))
            .mount(&mock_server)
            .await;
    }

    let (client, _) = client_for(&mock_server, test_config());

    for code in [400u16, 401, 403, 404, 500, 502, 503, 409] {
        let err = client
            .get(format!("status/{}", code), &QueryParams::new())
            .await
            .unwrap_err();

        let variant_matches = match code {
            400 => matches!(err, Error::BadRequest { .. }),
            401 => matches!(err, Error::Authentication { .. }),
            403 => matches!(err, Error::Forbidden { .. }),
            404 => matches!(err, Error::NotFound { .. }),
            500 | 502 | 503 => matches!(err, Error::Server { .. }),
            _ => matches!(err, Error::Unexpected { .. }),
        };
        assert!(variant_matches, "status {} produced {:?}", code, err);
        assert_eq!(err.status().map(|s| s.as_u16()), Some(code));
        assert_eq!(err.message(), Some("boom"));
        assert_eq!(err.raw_response(), Some(r#"{"error":"boom"}"#));
    }
}

#[tokio::test]
async fn test_error_message_fallbacks() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/external/v1/message"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({"message": "Missing url"})))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/external/v1/html"))
        .respond_with(ResponseTemplate::new(500).set_body_string("<html>oops</html>"))
        .mount(&mock_server)
        .await;

    let (client, _) = client_for(&mock_server, test_config());

    let err = client.get("message", &QueryParams::new()).await.unwrap_err();
    assert_eq!(err.message(), Some("Missing url"));

    let err = client.get("html", &QueryParams::new()).await.unwrap_err();
    assert_eq!(err.message(), Some("HTTP 500: Internal Server Error"));
    assert_eq!(err.raw_response(), Some("<html>oops</html>"));
}

#[tokio::test]
async fn test_rate_limit_headers_are_tracked_and_replaced() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/external/v1/meetings"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"items": []}))
                .insert_header("RateLimit-Limit", "60")
                .insert_header("RateLimit-Remaining", "45")
                .insert_header("RateLimit-Reset", "30"),
        )
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/external/v1/teams"))
        .respond_with(
            ResponseTemplate::new(404)
                .set_body_json(json!({"error": "Not found"}))
                .insert_header("RateLimit-Remaining", "44"),
        )
        .mount(&mock_server)
        .await;

    let (client, _) = client_for(&mock_server, test_config());
    assert!(client.rate_limit().is_empty());

    client.get("meetings", &QueryParams::new()).await.unwrap();
    let state = client.rate_limit();
    assert_eq!(state.limit, Some(60));
    assert_eq!(state.remaining, Some(45));
    assert_eq!(state.reset, Some(30));

    // Failed responses update the snapshot too, replacing every field.
    let _ = client.get("teams", &QueryParams::new()).await;
    let state = client.rate_limit();
    assert_eq!(state.limit, None);
    assert_eq!(state.remaining, Some(44));
    assert_eq!(state.reset, None);
}

#[tokio::test]
async fn test_rate_limited_retries_with_exponential_backoff() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/external/v1/meetings"))
        .respond_with(
            ResponseTemplate::new(429)
                .set_body_json(json!({"error": "Too many requests"}))
                .insert_header("RateLimit-Remaining", "0")
                .insert_header("RateLimit-Reset", "30"),
        )
        .expect(3)
        .mount(&mock_server)
        .await;

    let config = Config::builder()
        .api_key("test_api_key")
        .max_retries(2)
        .build();
    let (client, sleeper) = client_for(&mock_server, config);

    let result = client.get("meetings", &QueryParams::new()).await;

    match result {
        Err(Error::RateLimited {
            status,
            message,
            rate_limit,
            ..
        }) => {
            assert_eq!(status.as_u16(), 429);
            assert_eq!(message, "Too many requests");
            assert_eq!(rate_limit.remaining, Some(0));
            assert_eq!(rate_limit.reset, Some(30));
        }
        other => panic!("Expected RateLimited, got {:?}", other),
    }
    assert_eq!(
        sleeper.waits(),
        vec![Duration::from_secs(1), Duration::from_secs(2)]
    );
}

#[tokio::test]
async fn test_rate_limited_then_success() {
    let mock_server = MockServer::start().await;
    let attempt_count = Arc::new(AtomicUsize::new(0));
    let attempt_count_clone = attempt_count.clone();

    Mock::given(method("GET"))
        .and(path("/external/v1/meetings"))
        .respond_with(move |_req: &wiremock::Request| {
            let count = attempt_count_clone.fetch_add(1, Ordering::SeqCst);
            if count == 0 {
                ResponseTemplate::new(429).insert_header("RateLimit-Remaining", "0")
            } else {
                ResponseTemplate::new(200)
                    .set_body_json(json!({"items": []}))
                    .insert_header("RateLimit-Remaining", "59")
            }
        })
        .mount(&mock_server)
        .await;

    let (client, sleeper) = client_for(&mock_server, test_config());
    let response = client.get("meetings", &QueryParams::new()).await.unwrap();

    assert_eq!(response.data, json!({"items": []}));
    assert_eq!(response.attempts, 2);
    assert!(response.was_retried());
    assert_eq!(attempt_count.load(Ordering::SeqCst), 2);
    assert_eq!(sleeper.waits(), vec![Duration::from_secs(1)]);
    assert_eq!(client.rate_limit().remaining, Some(59));
}

#[tokio::test]
async fn test_last_allowed_retry_can_succeed() {
    let mock_server = MockServer::start().await;
    let attempt_count = Arc::new(AtomicUsize::new(0));
    let attempt_count_clone = attempt_count.clone();

    Mock::given(method("GET"))
        .and(path("/external/v1/meetings"))
        .respond_with(move |_req: &wiremock::Request| {
            if attempt_count_clone.fetch_add(1, Ordering::SeqCst) < 2 {
                ResponseTemplate::new(429)
            } else {
                ResponseTemplate::new(200).set_body_json(json!({"items": [{"id": "1"}]}))
            }
        })
        .expect(3)
        .mount(&mock_server)
        .await;

    let config = Config::builder()
        .api_key("test_api_key")
        .max_retries(2)
        .build();
    let (client, sleeper) = client_for(&mock_server, config);
    let response = client.get("meetings", &QueryParams::new()).await.unwrap();

    assert_eq!(response.data, json!({"items": [{"id": "1"}]}));
    assert_eq!(response.attempts, 3);
    assert_eq!(
        sleeper.waits(),
        vec![Duration::from_secs(1), Duration::from_secs(2)]
    );
}

#[tokio::test]
async fn test_rate_limited_without_auto_retry_fails_immediately() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/external/v1/meetings"))
        .respond_with(ResponseTemplate::new(429))
        .expect(1)
        .mount(&mock_server)
        .await;

    let config = Config::builder()
        .api_key("test_api_key")
        .auto_retry(false)
        .build();
    let (client, sleeper) = client_for(&mock_server, config);

    let err = client
        .get("meetings", &QueryParams::new())
        .await
        .unwrap_err();

    assert!(matches!(err, Error::RateLimited { .. }));
    assert_eq!(err.message(), Some("HTTP 429: Too Many Requests"));
    assert!(sleeper.waits().is_empty());
}

#[tokio::test]
async fn test_retry_that_hits_other_error_fails_with_that_error() {
    let mock_server = MockServer::start().await;
    let attempt_count = Arc::new(AtomicUsize::new(0));
    let attempt_count_clone = attempt_count.clone();

    Mock::given(method("GET"))
        .and(path("/external/v1/meetings"))
        .respond_with(move |_req: &wiremock::Request| {
            if attempt_count_clone.fetch_add(1, Ordering::SeqCst) == 0 {
                ResponseTemplate::new(429)
            } else {
                ResponseTemplate::new(503).set_body_json(json!({"error": "Maintenance"}))
            }
        })
        .mount(&mock_server)
        .await;

    let (client, sleeper) = client_for(&mock_server, test_config());
    let err = client
        .get("meetings", &QueryParams::new())
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Server { .. }));
    assert_eq!(attempt_count.load(Ordering::SeqCst), 2);
    assert_eq!(sleeper.waits(), vec![Duration::from_secs(1)]);
}

#[tokio::test]
async fn test_missing_api_key_sends_nothing() {
    let mock_server = MockServer::start().await;

    Mock::given(wiremock::matchers::any())
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&mock_server)
        .await;

    let (client, _) = client_for(&mock_server, Config::default());
    let err = client
        .get("meetings", &QueryParams::new())
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Configuration(_)));
}

#[tokio::test]
async fn test_connection_failure_is_transport_error() {
    let client = Client::builder()
        .config(test_config())
        .base_url("http://127.0.0.1:1")
        .unwrap()
        .build()
        .unwrap();

    let err = client
        .get("meetings", &QueryParams::new())
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Transport(_)), "got {:?}", err);
    assert_eq!(err.raw_response(), None);
}
