//! Integration tests for the admin call pipeline.

use std::io;
use std::sync::{Arc, Mutex};
use std::task::{Context, Poll};

use keyward::services::GameSaveService;
use keyward::tower::{Layer, Service};
use keyward::{
    AdminClient, Error, HyperTransport, Params, Pipeline, RequestContext, Response, ServiceFuture,
};
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{header, method, path, query_param},
};

fn game_saves_body() -> serde_json::Value {
    serde_json::json!({
        "status": 200,
        "message": "OK",
        "data": [{
            "id": "7d9f92ce-3c8e-4695-9df7-ce10c0bbaaeb",
            "user_email": "toto@toto.com",
            "nickname": "toto",
            "characteristics": {"attack": 1, "crit_chance": 2, "crit_damage": 3, "health": 4, "resistance": 5},
            "currency": {"gold": 10, "diamond": 20, "emerald": 30, "amethyst": 40},
            "stage": {"current_stage": 3, "max_stage": 7}
        }]
    })
}

fn client(server: &MockServer, pipeline: Pipeline) -> AdminClient {
    AdminClient::new(pipeline, format!("{}/api/v1/admin", server.uri())).expect("api root")
}

/// Log output collected by a test subscriber.
#[derive(Clone, Default)]
struct LogBuffer(Arc<Mutex<Vec<u8>>>);

impl LogBuffer {
    fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().expect("log buffer")).into_owned()
    }
}

impl io::Write for LogBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().expect("log buffer").extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

fn capture_logs() -> (LogBuffer, tracing::subscriber::DefaultGuard) {
    let logs = LogBuffer::default();
    let writer = logs.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .with_ansi(false)
        .with_writer(move || writer.clone())
        .finish();
    let guard = tracing::subscriber::set_default(subscriber);
    (logs, guard)
}

#[tokio::test]
async fn test_token_is_sent_and_call_is_logged() {
    let (logs, _guard) = capture_logs();
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/admin/game_saves"))
        .and(query_param("order_by", "nickname"))
        .and(header("Authorization", "Bearer abc123"))
        .respond_with(ResponseTemplate::new(200).set_body_json(game_saves_body()))
        .expect(1)
        .mount(&server)
        .await;

    let pipeline = Pipeline::builder()
        .with_defaults("abc123")
        .build(HyperTransport::default());
    let saves = GameSaveService::new(client(&server, pipeline))
        .find_all(&["nickname"])
        .await
        .expect("game saves");

    assert_eq!(saves.len(), 1);
    let logs = logs.contents();
    assert!(logs.contains("calling GameSaveService findAll"), "{logs}");
    assert!(logs.contains("order_by"), "{logs}");
    assert!(!logs.contains("abc123"), "token leaked into logs: {logs}");
}

#[tokio::test]
async fn test_no_token_sends_no_authorization_header() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/admin/game_saves"))
        .respond_with(ResponseTemplate::new(200).set_body_json(game_saves_body()))
        .mount(&server)
        .await;

    let pipeline = Pipeline::builder()
        .with_defaults(None::<String>)
        .build(HyperTransport::default());
    GameSaveService::new(client(&server, pipeline))
        .find_all(&[])
        .await
        .expect("game saves");

    let requests = server.received_requests().await.expect("recording enabled");
    assert_eq!(requests.len(), 1);
    assert!(requests[0].headers.get("authorization").is_none());
    assert_eq!(requests[0].url.query(), None);
}

/// Records when calls pass through it.
#[derive(Clone)]
struct Recorder {
    name: &'static str,
    journal: Arc<Mutex<Vec<String>>>,
}

impl<S> Layer<S> for Recorder {
    type Service = Recorded<S>;

    fn layer(&self, inner: S) -> Self::Service {
        Recorded {
            inner,
            name: self.name,
            journal: Arc::clone(&self.journal),
        }
    }
}

#[derive(Clone)]
struct Recorded<S> {
    inner: S,
    name: &'static str,
    journal: Arc<Mutex<Vec<String>>>,
}

impl<S> Service<RequestContext> for Recorded<S>
where
    S: Service<RequestContext, Response = Response, Error = Error> + Clone + Send + 'static,
    S::Future: Send,
{
    type Response = Response;
    type Error = Error;
    type Future = ServiceFuture;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut ctx: RequestContext) -> Self::Future {
        let name = self.name;
        let journal = Arc::clone(&self.journal);
        journal.lock().expect("journal").push(format!("{name} in"));
        ctx.request_mut()
            .headers_mut()
            .insert(format!("X-Seen-{name}"), "1".to_string());

        let clone = self.inner.clone();
        let mut inner = std::mem::replace(&mut self.inner, clone);
        Box::pin(async move {
            let result = inner.call(ctx).await;
            journal.lock().expect("journal").push(format!("{name} out"));
            result
        })
    }
}

#[tokio::test]
async fn test_middlewares_run_in_order_and_unwind_in_reverse() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/admin/game_saves"))
        .and(header("X-Seen-first", "1"))
        .and(header("X-Seen-second", "1"))
        .and(header("X-Seen-third", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(game_saves_body()))
        .expect(1)
        .mount(&server)
        .await;

    let journal = Arc::new(Mutex::new(Vec::new()));
    let recorder = |name| Recorder {
        name,
        journal: Arc::clone(&journal),
    };
    let pipeline = Pipeline::builder()
        .named_layer("first", recorder("first"))
        .named_layer("second", recorder("second"))
        .named_layer("third", recorder("third"))
        .build(HyperTransport::default());
    assert_eq!(pipeline.layer_names(), ["first", "second", "third"]);

    GameSaveService::new(client(&server, pipeline))
        .find_all(&[])
        .await
        .expect("game saves");

    let journal = journal.lock().expect("journal").clone();
    assert_eq!(
        journal,
        [
            "first in",
            "second in",
            "third in",
            "third out",
            "second out",
            "first out"
        ]
    );
}

/// Answers every call without reaching the transport.
#[derive(Clone)]
struct Canned;

impl<S> Layer<S> for Canned {
    type Service = CannedService;

    fn layer(&self, _inner: S) -> Self::Service {
        CannedService
    }
}

#[derive(Clone)]
struct CannedService;

impl Service<RequestContext> for CannedService {
    type Response = Response;
    type Error = Error;
    type Future = ServiceFuture;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, _ctx: RequestContext) -> Self::Future {
        let body = serde_json::to_vec(&game_saves_body()).expect("body");
        Box::pin(async move { Ok(Response::new(200, Default::default(), body.into())) })
    }
}

#[tokio::test]
async fn test_middleware_can_short_circuit() {
    let server = MockServer::start().await;

    let pipeline = Pipeline::builder()
        .with_logging()
        .named_layer("canned", Canned)
        .build(HyperTransport::default());
    let saves = GameSaveService::new(client(&server, pipeline))
        .find_all(&[])
        .await
        .expect("game saves");

    assert_eq!(saves[0].nickname, "toto");
    let requests = server.received_requests().await.expect("recording enabled");
    assert!(requests.is_empty());
}

#[tokio::test]
async fn test_logged_body_is_still_readable_by_caller() {
    let (logs, _guard) = capture_logs();
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/admin/game_saves"))
        .respond_with(ResponseTemplate::new(200).set_body_json(game_saves_body()))
        .mount(&server)
        .await;

    let pipeline = Pipeline::builder()
        .with_debug_logging()
        .build(HyperTransport::default());
    let response = client(&server, pipeline)
        .call(&GameSaveService::FIND_ALL, Params::new())
        .await
        .expect("response");

    let body: serde_json::Value = response.json().expect("caller body");
    assert_eq!(body, game_saves_body());
    assert!(logs.contents().contains("7d9f92ce-3c8e-4695-9df7-ce10c0bbaaeb"));
}

#[tokio::test]
async fn test_http_error_keeps_body() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/admin/game_saves/id/missing"))
        .respond_with(ResponseTemplate::new(404).set_body_json(serde_json::json!({
            "status": 404,
            "message": "Game save not found",
            "data": null
        })))
        .mount(&server)
        .await;

    let pipeline = Pipeline::builder()
        .with_defaults("abc123")
        .build(HyperTransport::default());
    let err = GameSaveService::new(client(&server, pipeline))
        .find_by_id("missing")
        .await
        .expect_err("not found");

    assert!(err.is_not_found());
    assert_eq!(err.status(), Some(404));
    let envelope: keyward::ApiResponse<serde_json::Value> =
        err.decode_body().expect("body").expect("envelope");
    assert_eq!(envelope.message.as_deref(), Some("Game save not found"));
}
