//! Integration tests for the API client
//!
//! Wires the full stack together: [`TokenSource`] refreshing through a real
//! [`OAuthClient`], the in-memory credential store, and [`ApiClient`] talking
//! to a wiremock server that plays both the token endpoint and Front.

use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use frontcli_common::auth::{ClientCredentials, Credential, OAuthClient, TokenSource};
use frontcli_common::testing::MockSecretStore;
use frontcli_domain::constants::{EXIT_AUTH, EXIT_NOT_FOUND};
use frontcli_domain::{
    CommentRequest, Config, ConversationUpdate, ListConversationsOptions, ResourceKind, TagRequest,
};
use frontcli_infra::api::{ApiClient, ApiClientConfig, ApiError};
use serde_json::json;
use wiremock::matchers::{body_json, body_string_contains, header, method, path, path_regex, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const CLIENT: &str = "default";
const IDENTITY: &str = "agent@example.com";

fn token_response(access_token: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({
        "access_token": access_token,
        "token_type": "Bearer",
        "expires_in": 3600
    }))
}

fn config_for(server: &MockServer) -> Config {
    let mut config = Config::default();
    config.api.base_url = server.uri();
    config.auth.account = Some(IDENTITY.to_string());
    config.auth.token_url = format!("{}/oauth/token", server.uri());
    config.resilience.rate_limit_base_delay_ms = 10;
    config.resilience.server_error_delay_ms = 10;
    config
}

fn client_for(config: &Config) -> ApiClient {
    let credentials = ClientCredentials {
        client_id: "cid".to_string(),
        client_secret: "csecret".to_string(),
        redirect_uri: None,
    };
    let exchanger = OAuthClient::with_token_url(credentials, config.auth.token_url.clone(), Duration::from_secs(5))
        .unwrap();
    let store = MockSecretStore::new();
    store.insert(Credential::new(CLIENT, IDENTITY, "refresh-1"));

    let tokens = TokenSource::new(CLIENT, IDENTITY, Arc::new(exchanger), Arc::new(store));
    ApiClient::new(ApiClientConfig::from(config), Arc::new(tokens)).unwrap()
}

/// Validates that a rejected bearer token triggers exactly one refresh.
///
/// # Test Steps
/// 1. Token endpoint hands out `a1` first, then `a2`
/// 2. `/me` rejects `a1` with 401 and accepts `a2`
/// 3. Verify the call succeeds with two refreshes in total
#[tokio::test]
async fn test_expired_token_is_refreshed_once() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/oauth/token"))
        .and(body_string_contains("grant_type=refresh_token"))
        .respond_with(token_response("a1"))
        .up_to_n_times(1)
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/oauth/token"))
        .respond_with(token_response("a2"))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/me"))
        .and(header("Authorization", "Bearer a1"))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/me"))
        .and(header("Authorization", "Bearer a2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "tea_1",
            "email": "agent@example.com",
            "is_valid": true
        })))
        .expect(1)
        .mount(&server)
        .await;

    let config = config_for(&server);
    let me = client_for(&config).me().await.unwrap();
    assert_eq!(me.id, "tea_1");
}

/// Validates the auth error surfaced when a fresh token is rejected too.
#[tokio::test]
async fn test_persistent_401_maps_to_auth_exit_code() {
    let server = MockServer::start().await;
    Mock::given(path("/oauth/token")).respond_with(token_response("a1")).expect(2).mount(&server).await;
    Mock::given(path("/me")).respond_with(ResponseTemplate::new(401)).expect(2).mount(&server).await;

    let config = config_for(&server);
    let err = client_for(&config).me().await.unwrap_err();

    assert_eq!(err.status(), Some(401));
    assert_eq!(err.exit_code(), EXIT_AUTH);
    assert!(err.to_string().contains("try logging in again"));
}

/// Validates that an ID with another resource's prefix never reaches the network.
#[tokio::test]
async fn test_wrong_resource_type_makes_no_request() {
    let server = MockServer::start().await;
    Mock::given(method("GET")).respond_with(ResponseTemplate::new(200)).expect(0).mount(&server).await;
    Mock::given(method("POST")).respond_with(token_response("a1")).expect(0).mount(&server).await;

    let config = config_for(&server);
    let client = client_for(&config);

    let err = client.get_conversation("msg_123").await.unwrap_err();
    match err {
        ApiError::WrongResourceType { expected, actual, id } => {
            assert_eq!(expected, ResourceKind::Conversation);
            assert_eq!(actual, ResourceKind::Message);
            assert_eq!(id, "msg_123");
        }
        other => panic!("unexpected error: {other:?}"),
    }

    assert!(matches!(client.get_tag("../admin").await, Err(ApiError::InvalidId { .. })));
}

#[tokio::test]
async fn test_not_found_names_requested_resource() {
    let server = MockServer::start().await;
    Mock::given(path("/oauth/token")).respond_with(token_response("a1")).mount(&server).await;
    Mock::given(method("GET"))
        .and(path("/conversations/cnv_missing"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&server)
        .await;

    let config = config_for(&server);
    let err = client_for(&config).get_conversation(" cnv_missing ").await.unwrap_err();

    assert_eq!(err.exit_code(), EXIT_NOT_FOUND);
    assert_eq!(err.to_string(), "conversation 'cnv_missing' not found");
}

/// Validates that bulk message fetches keep the caller's order.
#[tokio::test]
async fn test_fetch_messages_preserves_order() {
    let server = MockServer::start().await;
    Mock::given(path("/oauth/token")).respond_with(token_response("a1")).expect(1).mount(&server).await;

    let ids: Vec<String> = (0..8).map(|i| format!("msg_{i}")).collect();
    for (i, id) in ids.iter().enumerate() {
        // Earlier IDs answer slower, so completion order differs from input order
        let delay = Duration::from_millis(80 - 10 * i as u64);
        Mock::given(method("GET"))
            .and(path(format!("/messages/{id}")))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({ "id": id, "type": "email", "body": format!("body {i}") }))
                    .set_delay(delay),
            )
            .expect(1)
            .mount(&server)
            .await;
    }

    let config = config_for(&server);
    let messages = client_for(&config).fetch_messages(&ids).await.unwrap();

    let got: Vec<&str> = messages.iter().map(|m| m.id.as_str()).collect();
    let want: Vec<&str> = ids.iter().map(String::as_str).collect();
    assert_eq!(got, want);
}

fn message_delay(index: usize) -> Duration {
    Duration::from_millis(150 + 60 * (index % 4) as u64)
}

/// Validates that bulk message fetches never exceed the concurrency cap.
///
/// # Test Steps
/// 1. Twelve messages answer after uneven delays, each arrival recorded
/// 2. Each request is in flight on the server from arrival until its delay ends
/// 3. Verify the peak overlap is above one and at most five, and the results
///    come back in input order
#[tokio::test]
async fn test_fetch_messages_caps_in_flight_requests() {
    let server = MockServer::start().await;
    Mock::given(path("/oauth/token")).respond_with(token_response("a1")).expect(1).mount(&server).await;

    let arrivals: Arc<Mutex<Vec<(usize, Instant)>>> = Arc::default();
    let recorder = Arc::clone(&arrivals);
    Mock::given(method("GET"))
        .and(path_regex(r"^/messages/msg_\d+$"))
        .respond_with(move |request: &wiremock::Request| {
            let id = request.url.path().trim_start_matches("/messages/").to_string();
            let index: usize = id.trim_start_matches("msg_").parse().unwrap();
            recorder.lock().unwrap().push((index, Instant::now()));
            ResponseTemplate::new(200)
                .set_body_json(json!({ "id": id, "type": "email", "body": format!("body {index}") }))
                .set_delay(message_delay(index))
        })
        .expect(12)
        .mount(&server)
        .await;

    let ids: Vec<String> = (0..12).map(|i| format!("msg_{i}")).collect();
    let config = config_for(&server);
    let messages = client_for(&config).fetch_messages(&ids).await.unwrap();

    let got: Vec<&str> = messages.iter().map(|m| m.id.as_str()).collect();
    let want: Vec<&str> = ids.iter().map(String::as_str).collect();
    assert_eq!(got, want);

    let windows: Vec<(Instant, Instant)> = arrivals
        .lock()
        .unwrap()
        .iter()
        .map(|(index, arrived)| (*arrived, *arrived + message_delay(*index)))
        .collect();
    assert_eq!(windows.len(), 12);

    let peak = windows
        .iter()
        .map(|(start, _)| windows.iter().filter(|(s, e)| s <= start && start < e).count())
        .max()
        .unwrap();
    assert!(peak <= 5, "{peak} requests were in flight at once");
    assert!(peak >= 2, "requests were never concurrent");
}

#[tokio::test]
async fn test_fetch_messages_validates_every_id_first() {
    let server = MockServer::start().await;
    Mock::given(method("GET")).respond_with(ResponseTemplate::new(200)).expect(0).mount(&server).await;

    let config = config_for(&server);
    let err = client_for(&config).fetch_messages(&["msg_1", "cnv_2"]).await.unwrap_err();
    assert!(matches!(err, ApiError::WrongResourceType { actual: ResourceKind::Conversation, .. }));
}

/// Validates that repeated server errors open the breaker for later calls.
///
/// # Test Steps
/// 1. Threshold 2, one server-error retry per call
/// 2. First call sees two 500s and returns the 500
/// 3. Second call fails fast with `CircuitOpen`
#[tokio::test]
async fn test_server_errors_open_the_circuit() {
    let server = MockServer::start().await;
    Mock::given(path("/oauth/token")).respond_with(token_response("a1")).mount(&server).await;
    Mock::given(method("GET"))
        .and(path("/inboxes"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .expect(2)
        .mount(&server)
        .await;

    let mut config = config_for(&server);
    config.resilience.failure_threshold = 2;
    let client = client_for(&config);

    let first = client.list_inboxes().await.unwrap_err();
    assert_eq!(first.status(), Some(500));
    assert!(client.circuit_breaker().is_open());

    let second = client.list_inboxes().await.unwrap_err();
    assert!(matches!(second, ApiError::CircuitOpen));
}

#[tokio::test]
async fn test_contact_pagination_follows_cursor() {
    let server = MockServer::start().await;
    Mock::given(path("/oauth/token")).respond_with(token_response("a1")).mount(&server).await;
    Mock::given(method("GET"))
        .and(path("/contacts"))
        .and(query_param("limit", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "_results": [{ "id": "ctc_1" }, { "id": "ctc_2" }],
            "_pagination": { "next": format!("{}/contacts?limit=2&page_token=p2", server.uri()) }
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/contacts"))
        .and(query_param("page_token", "p2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "_results": [{ "id": "ctc_3" }],
            "_pagination": {}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let config = config_for(&server);
    let client = client_for(&config);

    let first = client.list_contacts(Some(2)).await.unwrap();
    assert_eq!(first.results.len(), 2);
    let next = first.next_page().unwrap().to_string();

    let second = client.list_contacts_page(&next).await.unwrap();
    assert_eq!(second.results[0].id, "ctc_3");
    assert!(second.next_page().is_none());
}

#[tokio::test]
async fn test_list_conversations_encodes_filters() {
    let server = MockServer::start().await;
    Mock::given(path("/oauth/token")).respond_with(token_response("a1")).mount(&server).await;
    Mock::given(method("GET"))
        .and(path("/conversations"))
        .and(query_param("q[inbox_id]", "inb_1"))
        .and(query_param("limit", "10"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "_results": [] })))
        .expect(1)
        .mount(&server)
        .await;

    let config = config_for(&server);
    let opts = ListConversationsOptions {
        inbox_id: Some("inb_1".to_string()),
        limit: Some(10),
        ..Default::default()
    };
    let page = client_for(&config).list_conversations(&opts).await.unwrap();
    assert!(page.results.is_empty());
}

#[tokio::test]
async fn test_write_operations_send_json_bodies() {
    let server = MockServer::start().await;
    Mock::given(path("/oauth/token")).respond_with(token_response("a1")).mount(&server).await;
    Mock::given(method("PATCH"))
        .and(path("/conversations/cnv_1"))
        .and(body_json(json!({ "status": "archived", "assignee_id": null })))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/conversations/cnv_1/comments"))
        .and(body_json(json!({ "body": "looking into it" })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "id": "cmt_1",
            "body": "looking into it",
            "posted_at": 1700000000.0
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/tags"))
        .and(body_json(json!({ "name": "vip" })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({ "id": "tag_1", "name": "vip" })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/tags/tag_1"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let config = config_for(&server);
    let client = client_for(&config);

    let update = ConversationUpdate { status: Some("archived".to_string()), assignee_id: Some(None) };
    client.update_conversation("cnv_1", &update).await.unwrap();

    let comment = client
        .add_comment("cnv_1", &CommentRequest { body: "looking into it".to_string(), author_id: None })
        .await
        .unwrap();
    assert_eq!(comment.id, "cmt_1");

    let tag = client.create_tag(&TagRequest { name: Some("vip".to_string()), ..Default::default() }).await.unwrap();
    client.delete_tag(&tag.id).await.unwrap();
}

#[tokio::test]
async fn test_download_attachment_does_not_ask_for_json() {
    let server = MockServer::start().await;
    Mock::given(path("/oauth/token")).respond_with(token_response("a1")).mount(&server).await;
    Mock::given(method("GET"))
        .and(path("/download/fil_9"))
        .respond_with(|request: &wiremock::Request| {
            let accept = request.headers.get("accept").and_then(|v| v.to_str().ok()).unwrap_or_default();
            if accept.contains("application/json") {
                return ResponseTemplate::new(406);
            }
            ResponseTemplate::new(200).set_body_bytes(vec![7u8; 4096])
        })
        .expect(1)
        .mount(&server)
        .await;

    let config = config_for(&server);
    let mut out = Vec::new();
    let written = client_for(&config).download_attachment("fil_9", &mut out).await.unwrap();
    assert_eq!(written, 4096);
    assert_eq!(out.len(), 4096);
}
