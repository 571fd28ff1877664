//! Integration tests for the typed admin services.

use keyward::services::{
    CacheService, Characteristics, Currency, Filter, GameSaveService, GameSaveUpdateRequest,
    GlobalInfoService, SearchRequest, SearchService, Stage, Timestamp, UserCreationRequest,
    UserService,
};
use keyward::{AdminClient, Error, HyperTransport, Pipeline};
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{body_json, header, method, path, query_param},
};

fn client(server: &MockServer) -> AdminClient {
    let pipeline = Pipeline::builder()
        .with_defaults("abc123")
        .build(HyperTransport::default());
    AdminClient::new(pipeline, format!("{}/api/v1/admin", server.uri())).expect("api root")
}

fn envelope(data: serde_json::Value) -> serde_json::Value {
    serde_json::json!({"status": 200, "message": "OK", "data": data})
}

fn user_json() -> serde_json::Value {
    serde_json::json!({
        "id": "2c4e2d1a-77d6-4d0b-a8f5-0c2b58e3f1a9",
        "first_name": "Toto",
        "last_name": "TUTU",
        "username": "toto@toto.com",
        "enabled": true,
        "email_verified": true,
        "user_roles": ["USER"],
        "created_timestamp": 1_640_995_200_000_i64
    })
}

#[tokio::test]
async fn test_find_user_by_username_encodes_path() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/admin/users/username/toto+1@toto.com"))
        .respond_with(ResponseTemplate::new(200).set_body_json(envelope(user_json())))
        .expect(1)
        .mount(&server)
        .await;

    let user = UserService::new(client(&server))
        .find_by_username("toto+1@toto.com")
        .await
        .expect("user");

    assert_eq!(user.username, "toto@toto.com");
    assert_eq!(user.user_roles, ["USER"]);
}

#[tokio::test]
async fn test_path_values_cannot_escape_their_segment() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/admin/users/id/a%2Fb"))
        .respond_with(ResponseTemplate::new(200).set_body_json(envelope(user_json())))
        .expect(1)
        .mount(&server)
        .await;

    UserService::new(client(&server))
        .find_by_id("a/b")
        .await
        .expect("user");
}

#[tokio::test]
async fn test_dot_segment_path_values_are_rejected() {
    let server = MockServer::start().await;
    let saves = GameSaveService::new(client(&server));
    let users = UserService::new(client(&server));

    let err = saves.find_by_user("..").await.expect_err("dot-dot");
    assert!(matches!(err, Error::InvalidRequest(_)), "{err:?}");
    let err = users.delete("..").await.expect_err("dot-dot");
    assert!(matches!(err, Error::InvalidRequest(_)), "{err:?}");
    let err = users.find_by_id(".").await.expect_err("dot");
    assert!(matches!(err, Error::InvalidRequest(_)), "{err:?}");

    let requests = server.received_requests().await.expect("recording enabled");
    assert!(requests.is_empty());
}

#[tokio::test]
async fn test_create_user_posts_json_body() {
    let server = MockServer::start().await;

    let request = UserCreationRequest {
        first_name: "Toto".to_string(),
        last_name: "TUTU".to_string(),
        username: "toto@toto.com".to_string(),
        password: "hunter2".to_string(),
        enabled: true,
        email_verified: true,
        user_roles: vec!["USER".to_string()],
    };

    Mock::given(method("POST"))
        .and(path("/api/v1/admin/users"))
        .and(header("Content-Type", "application/json"))
        .and(header("Authorization", "Bearer abc123"))
        .and(body_json(&request))
        .respond_with(ResponseTemplate::new(200).set_body_json(envelope(user_json())))
        .expect(1)
        .mount(&server)
        .await;

    let user = UserService::new(client(&server))
        .create(&request)
        .await
        .expect("created");
    assert_eq!(user.first_name.as_deref(), Some("Toto"));
}

#[tokio::test]
async fn test_update_game_save_posts_to_its_id() {
    let server = MockServer::start().await;

    let request = GameSaveUpdateRequest {
        nickname: "tutu".to_string(),
        characteristics: Characteristics {
            attack: 10,
            ..Characteristics::default()
        },
        currency: Currency {
            gold: 500,
            ..Currency::default()
        },
        stage: Stage {
            current_stage: 2,
            max_stage: 4,
        },
    };

    Mock::given(method("POST"))
        .and(path("/api/v1/admin/game_saves/id/7d9f92ce"))
        .and(body_json(&request))
        .respond_with(ResponseTemplate::new(200).set_body_json(envelope(serde_json::json!({
            "id": "7d9f92ce",
            "user_email": "toto@toto.com",
            "nickname": "tutu",
            "characteristics": {"attack": 10, "crit_chance": 0, "crit_damage": 0, "health": 0, "resistance": 0},
            "currency": {"gold": 500, "diamond": 0, "emerald": 0, "amethyst": 0},
            "stage": {"current_stage": 2, "max_stage": 4}
        }))))
        .expect(1)
        .mount(&server)
        .await;

    let save = GameSaveService::new(client(&server))
        .update("7d9f92ce", &request)
        .await
        .expect("updated");
    assert_eq!(save.nickname, "tutu");
    assert_eq!(save.currency.gold, 500);
}

#[tokio::test]
async fn test_delete_accepts_envelope_without_data() {
    let server = MockServer::start().await;

    Mock::given(method("DELETE"))
        .and(path("/api/v1/admin/game_saves/id/7d9f92ce"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "status": 200, "message": "Game save deleted", "data": null
        })))
        .expect(1)
        .mount(&server)
        .await;

    GameSaveService::new(client(&server))
        .delete("7d9f92ce")
        .await
        .expect("deleted");
}

#[tokio::test]
async fn test_decode_error_reports_json_path() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/admin/game_saves/user/toto@toto.com"))
        .respond_with(ResponseTemplate::new(200).set_body_json(envelope(serde_json::json!([{
            "id": "7d9f92ce",
            "user_email": "toto@toto.com",
            "nickname": "toto",
            "characteristics": {"attack": 1, "crit_chance": 2, "crit_damage": 3, "health": 4, "resistance": 5},
            "currency": {"gold": "lots", "diamond": 0, "emerald": 0, "amethyst": 0},
            "stage": {"current_stage": 1, "max_stage": 1}
        }]))))
        .mount(&server)
        .await;

    let err = GameSaveService::new(client(&server))
        .find_by_user("toto@toto.com")
        .await
        .expect_err("bad gold");

    let Error::JsonDeserialization { path, .. } = &err else {
        panic!("expected a decode error, got {err:?}");
    };
    assert_eq!(path, "data[0].currency.gold");
}

#[tokio::test]
async fn test_forbidden_is_an_http_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/admin/users"))
        .respond_with(ResponseTemplate::new(403))
        .mount(&server)
        .await;

    let err = UserService::new(client(&server))
        .find_all(&["username"])
        .await
        .expect_err("forbidden");

    assert!(err.is_forbidden());
    assert_eq!(err.to_string(), "HTTP error 403: Forbidden");
}

#[tokio::test]
async fn test_connection_refused_is_a_transport_error() {
    let port = std::net::TcpListener::bind("127.0.0.1:0")
        .and_then(|listener| listener.local_addr())
        .expect("free port")
        .port();
    let pipeline = Pipeline::builder().build(HyperTransport::default());
    let client =
        AdminClient::new(pipeline, format!("http://127.0.0.1:{port}/api/v1/admin")).expect("root");

    let err = UserService::new(client)
        .find_all(&[])
        .await
        .expect_err("nothing listens");

    assert!(err.is_connection(), "{err:?}");
}

#[tokio::test]
async fn test_search_users_posts_filters_and_order() {
    let server = MockServer::start().await;

    let request = SearchRequest::new([
        Filter::new("user_roles", "ADMIN"),
        Filter::new("last_name", "TUTU"),
    ]);

    Mock::given(method("POST"))
        .and(path("/api/v1/admin/search/users"))
        .and(query_param("order_by", "LAST_NAME_DESC"))
        .and(body_json(serde_json::json!({"filters": [
            {"type": "user_roles", "value": "ADMIN"},
            {"type": "last_name", "value": "TUTU"}
        ]})))
        .respond_with(ResponseTemplate::new(200).set_body_json(envelope(serde_json::json!([
            user_json()
        ]))))
        .expect(1)
        .mount(&server)
        .await;

    let users = SearchService::new(client(&server))
        .search_users(&request, &["LAST_NAME_DESC"])
        .await
        .expect("users");

    assert_eq!(users.len(), 1);
    assert_eq!(users[0].last_name.as_deref(), Some("TUTU"));
}

#[tokio::test]
async fn test_search_game_saves_rejected_filter_is_bad_request() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/v1/admin/search/game_saves"))
        .respond_with(ResponseTemplate::new(400).set_body_json(serde_json::json!({
            "status": 400, "message": "Invalid filter type", "data": null
        })))
        .expect(1)
        .mount(&server)
        .await;

    let err = SearchService::new(client(&server))
        .search_game_saves(&SearchRequest::new([Filter::new("gold", "1")]), &[])
        .await
        .expect_err("bad filter");

    assert_eq!(err.status(), Some(400));
}

#[tokio::test]
async fn test_cache_operations() {
    let server = MockServer::start().await;

    Mock::given(method("PUT"))
        .and(path("/api/v1/admin/cache/flush"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "status": 200, "message": "OK", "data": null
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v1/admin/cache/enabled"))
        .respond_with(ResponseTemplate::new(200).set_body_json(envelope(serde_json::json!(true))))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/api/v1/admin/cache/toggle"))
        .respond_with(ResponseTemplate::new(200).set_body_json(envelope(serde_json::json!(false))))
        .expect(1)
        .mount(&server)
        .await;

    let cache = CacheService::new(client(&server));
    cache.flush_and_clear().await.expect("flushed");
    assert!(cache.is_enabled().await.expect("enabled"));
    assert!(!cache.toggle().await.expect("toggled"));
}

#[tokio::test]
async fn test_global_info_reads_counters() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/admin/global_info"))
        .and(header("Authorization", "Bearer abc123"))
        .respond_with(ResponseTemplate::new(200).set_body_json(envelope(serde_json::json!({
            "now": 1_700_000_000_000_i64,
            "game_save_counter": 12,
            "user_counter": 5
        }))))
        .expect(1)
        .mount(&server)
        .await;

    let info = GlobalInfoService::new(client(&server))
        .get()
        .await
        .expect("info");

    assert_eq!(info.now, Some(Timestamp::Millis(1_700_000_000_000)));
    assert_eq!(info.game_save_counter, 12);
    assert_eq!(info.user_counter, 5);
}
