//! Integration tests for `ApiClient` against a wiremock server.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use assert2::{check, let_assert};
use fetchkit::{
    ApiClient, Content, DeleteParams, DirectorySink, Error, Form, HyperClient, LoadingIndicator,
    MemorySink, Query, Request, RequestOptions, Response, TokenStore, request_fn, response_fn,
};
use serde::Deserialize;
use serde_json::json;
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{
        body_json, body_string_contains, header, method, path, query_param,
        query_param_is_missing,
    },
};

#[derive(Clone, Default)]
struct Counting {
    shows: Arc<AtomicUsize>,
    hides: Arc<AtomicUsize>,
}

impl LoadingIndicator for Counting {
    fn show(&self) {
        self.shows.fetch_add(1, Ordering::SeqCst);
    }

    fn hide(&self) {
        self.hides.fetch_add(1, Ordering::SeqCst);
    }
}

fn api(server: &MockServer) -> ApiClient<HyperClient> {
    ApiClient::builder(HyperClient::new(), format!("{}/api", server.uri()))
        .download_sink(MemorySink::new())
        .build()
        .expect("client")
}

// ============================================================================
// Loading tracker
// ============================================================================

#[tokio::test]
async fn loading_counter_tracks_call_lifetime() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/datasets"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"content": []}))
                .set_delay(Duration::from_millis(200)),
        )
        .mount(&server)
        .await;

    let indicator = Counting::default();
    let client = ApiClient::builder(HyperClient::new(), format!("{}/api", server.uri()))
        .loading_indicator(indicator.clone())
        .hide_delay(Duration::from_millis(20))
        .build()
        .expect("client");

    let call = {
        let client = client.clone();
        tokio::spawn(async move {
            client
                .get("/datasets", &Query::new(), &RequestOptions::loading())
                .await
        })
    };

    tokio::time::sleep(Duration::from_millis(50)).await;
    check!(client.loading().in_flight() == 1);
    check!(indicator.shows.load(Ordering::SeqCst) == 1);

    call.await.expect("join").expect("get");
    check!(client.loading().in_flight() == 0);

    tokio::time::sleep(Duration::from_millis(100)).await;
    check!(indicator.hides.load(Ordering::SeqCst) == 1);
    check!(!client.loading().is_visible());
}

#[tokio::test]
async fn loading_counter_released_on_failure() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let client = api(&server);
    let result = client
        .get("/datasets", &Query::new(), &RequestOptions::loading())
        .await;

    check!(result.is_err());
    check!(client.loading().in_flight() == 0);
}

#[tokio::test]
async fn loading_counter_released_on_transport_failure() {
    // Nothing listens on the discard port.
    let client = ApiClient::new(HyperClient::new(), "http://127.0.0.1:9").expect("client");
    let result = client
        .get("/datasets", &Query::new(), &RequestOptions::loading())
        .await;

    let_assert!(Err(err) = result);
    check!(err.is_transport());
    check!(client.loading().in_flight() == 0);
}

#[tokio::test]
async fn calls_without_show_loading_are_not_counted() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_millis(100)))
        .mount(&server)
        .await;

    let client = api(&server);
    let call = {
        let client = client.clone();
        tokio::spawn(async move { client.get("/datasets", &Query::new(), &RequestOptions::new()).await })
    };

    tokio::time::sleep(Duration::from_millis(30)).await;
    check!(client.loading().in_flight() == 0);
    call.await.expect("join").expect("get");
}

// ============================================================================
// Query strings
// ============================================================================

#[tokio::test]
async fn get_omits_absent_query_values() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/cleaning/tasks"))
        .and(query_param("page", "0"))
        .and(query_param("name", "a b&c"))
        .and(query_param_is_missing("status"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&server)
        .await;

    let query = Query::from_serialize(&json!({"page": 0, "status": null, "name": "a b&c"}))
        .expect("query");
    api(&server)
        .get("/cleaning/tasks", &query, &RequestOptions::new())
        .await
        .expect("get");
}

#[tokio::test]
async fn get_without_query_has_no_question_mark() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/operators"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;

    api(&server)
        .get("/operators", &Query::new(), &RequestOptions::new())
        .await
        .expect("get");

    let requests = server.received_requests().await.expect("recorded");
    let_assert!([request] = requests.as_slice());
    check!(request.url.query().is_none());
}

// ============================================================================
// Delete modes
// ============================================================================

#[tokio::test]
async fn delete_single_id_uses_query() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/api/datasets"))
        .and(query_param("id", "5"))
        .and(header("X-Requested-With", "XMLHttpRequest"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let params = DeleteParams::infer(json!({"id": 5})).expect("params");
    api(&server)
        .delete("/datasets", params, &RequestOptions::new())
        .await
        .expect("delete");
}

#[tokio::test]
async fn delete_with_extra_keys_uses_body() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/api/datasets"))
        .and(query_param_is_missing("id"))
        .and(body_json(json!({"id": 5, "extra": "x"})))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let params = DeleteParams::infer(json!({"id": 5, "extra": "x"})).expect("params");
    api(&server)
        .delete("/datasets", params, &RequestOptions::new())
        .await
        .expect("delete");
}

#[tokio::test]
async fn delete_array_uses_body() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/api/datasets/batch"))
        .and(header("Content-Type", "application/json"))
        .and(body_json(json!([1, 2, 3])))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let params = DeleteParams::infer(json!([1, 2, 3])).expect("params");
    api(&server)
        .delete("/datasets/batch", params, &RequestOptions::new())
        .await
        .expect("delete");
}

// ============================================================================
// Content negotiation
// ============================================================================

#[tokio::test]
async fn json_responses_are_parsed() {
    #[derive(Debug, Deserialize, PartialEq)]
    struct Dataset {
        id: String,
        name: String,
    }

    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/datasets/ds-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": "ds-1", "name": "corpus"})))
        .mount(&server)
        .await;

    let content = api(&server)
        .get("/datasets/ds-1", &Query::new(), &RequestOptions::new())
        .await
        .expect("get");

    check!(content.as_json() == Some(&json!({"id": "ds-1", "name": "corpus"})));
    let dataset: Dataset = content.deserialize().expect("typed");
    check!(dataset == Dataset { id: "ds-1".into(), name: "corpus".into() });
}

#[tokio::test]
async fn text_responses_are_returned_as_text() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/health"))
        .respond_with(ResponseTemplate::new(200).set_body_string("OK"))
        .mount(&server)
        .await;

    let content = api(&server)
        .get("/health", &Query::new(), &RequestOptions::new())
        .await
        .expect("get");

    let_assert!(Content::Text(text) = content);
    check!(text == "OK");
}

#[tokio::test]
async fn malformed_json_success_body_is_an_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("Content-Type", "application/json; charset=utf-8")
                .set_body_string("{not json"),
        )
        .mount(&server)
        .await;

    let result = api(&server)
        .get("/datasets", &Query::new(), &RequestOptions::new())
        .await;
    let_assert!(Err(Error::JsonDeserialization { .. }) = result);
}

// ============================================================================
// Error normalization
// ============================================================================

#[tokio::test]
async fn http_error_carries_status_and_json_data() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/datasets"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({"code": "NAME_TAKEN"})))
        .mount(&server)
        .await;

    let result = api(&server)
        .post("/datasets", json!({"name": "corpus"}), &RequestOptions::new())
        .await;

    let_assert!(Err(err) = result);
    check!(err.status() == Some(400));
    check!(err.status_text() == Some("Bad Request"));
    check!(err.data() == Some(&json!({"code": "NAME_TAKEN"})));
}

#[tokio::test]
async fn http_error_without_json_body_has_no_data() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .respond_with(ResponseTemplate::new(502).set_body_string("<html>bad gateway</html>"))
        .mount(&server)
        .await;

    let result = api(&server)
        .put("/datasets/ds-1", json!({"name": "x"}), &RequestOptions::new())
        .await;

    let_assert!(Err(Error::Http { status, data, .. }) = result);
    check!(status == 502);
    check!(data.is_none());
}

#[tokio::test]
async fn redirect_without_location_is_an_http_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(302))
        .mount(&server)
        .await;

    let transport = HyperClient::builder().with_defaults().build();
    let client = ApiClient::new(transport, format!("{}/api", server.uri())).expect("client");
    let result = client
        .get("/datasets", &Query::new(), &RequestOptions::new())
        .await;

    let_assert!(Err(err) = result);
    check!(err.status() == Some(302));
    check!(err.status_text() == Some("Found"));
}

// ============================================================================
// Interceptors
// ============================================================================

#[tokio::test]
async fn request_interceptors_run_in_order() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(header("X-Trace", "a,b"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(1)
        .mount(&server)
        .await;

    let mut client = api(&server);
    client.add_request_interceptor(request_fn(|request: Request| async move {
        tokio::time::sleep(Duration::from_millis(10)).await;
        Ok(Some(request.with_header("X-Trace", "a")))
    }));
    client.add_request_interceptor(request_fn(|request: Request| async move {
        let seen = request.header("X-Trace").unwrap_or_default().to_string();
        Ok(Some(request.with_header("X-Trace", format!("{seen},b"))))
    }));

    client
        .get("/datasets", &Query::new(), &RequestOptions::new())
        .await
        .expect("get");
}

#[tokio::test]
async fn response_interceptors_run_before_status_handling() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let mut client = api(&server);
    client.add_response_interceptor(response_fn(|response: Response, _request: Request| async move {
        if response.status() == 503 {
            let headers = [("Content-Type", "application/json")].into_iter().collect();
            return Ok(Some(Response::new(200, headers, r#"{"fallback":true}"#)));
        }
        Ok(None)
    }));
    client.add_response_interceptor(response_fn(|response: Response, request: Request| async move {
        assert_eq!(response.status(), 200);
        assert_eq!(request.url().path(), "/api/datasets");
        Ok(None)
    }));

    let content = client
        .get("/datasets", &Query::new(), &RequestOptions::new())
        .await
        .expect("get");
    check!(content.as_json() == Some(&json!({"fallback": true})));
}

#[tokio::test]
async fn interceptor_error_aborts_call() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let mut client = api(&server);
    client.add_request_interceptor(request_fn(|_request: Request| async move {
        Err(Error::interceptor("session expired"))
    }));

    let result = client
        .get("/datasets", &Query::new(), &RequestOptions::loading())
        .await;
    let_assert!(Err(Error::Interceptor(message)) = result);
    check!(message == "session expired");
    check!(client.loading().in_flight() == 0);
}

#[tokio::test]
async fn bearer_token_is_attached() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(header("Authorization", "Bearer abc123"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(1)
        .mount(&server)
        .await;

    let tokens = TokenStore::in_memory();
    tokens.remember("abc123", true).expect("remember");

    let client = ApiClient::builder(HyperClient::new(), format!("{}/api", server.uri()))
        .with_default_interceptors(tokens)
        .build()
        .expect("client");
    check!(client.interceptors().request_len() == 1);
    check!(client.interceptors().response_len() == 1);

    client
        .get("/datasets", &Query::new(), &RequestOptions::new())
        .await
        .expect("get");
}

#[tokio::test]
async fn no_token_means_no_authorization_header() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .mount(&server)
        .await;

    let client = ApiClient::builder(HyperClient::new(), format!("{}/api", server.uri()))
        .with_default_interceptors(TokenStore::in_memory())
        .build()
        .expect("client");
    client
        .get("/datasets", &Query::new(), &RequestOptions::new())
        .await
        .expect("get");

    let requests = server.received_requests().await.expect("recorded");
    let_assert!([request] = requests.as_slice());
    check!(!request.headers.contains_key("authorization"));
}

// ============================================================================
// Multipart
// ============================================================================

#[tokio::test]
async fn multipart_upload_uses_form_boundary() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/operators/upload"))
        .and(header("Content-Type", "multipart/form-data; boundary=FetchkitTest"))
        .and(header("Accept", "*/*"))
        .and(body_string_contains(r#"name="file"; filename="plugin.zip""#))
        .and(body_string_contains("--FetchkitTest--"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"operatorId": "op-1"})))
        .expect(1)
        .mount(&server)
        .await;

    let form = Form::with_boundary("FetchkitTest")
        .text("description", "tokenizer")
        .file("file", "plugin.zip", b"PK\x03\x04".to_vec());

    let content = api(&server)
        .post("/operators/upload", form, &RequestOptions::new())
        .await
        .expect("upload");
    check!(content.as_json() == Some(&json!({"operatorId": "op-1"})));
}

// ============================================================================
// Downloads
// ============================================================================

#[tokio::test]
async fn download_uses_content_disposition_filename() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/cleaning/tasks/7/report"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("Content-Disposition", r#"attachment; filename="report.csv""#)
                .insert_header("Content-Type", "text/csv")
                .set_body_bytes(b"id,status\n7,done\n".to_vec()),
        )
        .mount(&server)
        .await;

    let sink = MemorySink::new();
    let client = ApiClient::builder(HyperClient::new(), format!("{}/api", server.uri()))
        .download_sink(sink.clone())
        .build()
        .expect("client");

    let download = client
        .download("/cleaning/tasks/7/report", &Query::new(), Some("fallback.csv"), &RequestOptions::new())
        .await
        .expect("download");

    check!(download.filename() == "report.csv");
    check!(download.content_type() == Some("text/csv"));
    check!(download.data().as_ref() == b"id,status\n7,done\n");

    let saved = sink.saved();
    let_assert!([saved] = saved.as_slice());
    check!(saved.filename() == "report.csv");
}

#[tokio::test]
async fn download_into_directory_keeps_existing_files() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("Content-Disposition", r#"attachment; filename="../report.csv""#)
                .set_body_bytes(b"fresh".to_vec()),
        )
        .mount(&server)
        .await;

    let nanos = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map_or(0, |d| d.as_nanos());
    let dir = std::env::temp_dir().join(format!("fetchkit-it-{}-{nanos}", std::process::id()));
    std::fs::create_dir_all(&dir).expect("create dir");
    std::fs::write(dir.join("report.csv"), b"precious").expect("seed");

    let client = ApiClient::builder(HyperClient::new(), format!("{}/api", server.uri()))
        .download_sink(DirectorySink::new(&dir))
        .build()
        .expect("client");
    let download = client
        .download("/reports/7", &Query::new(), None, &RequestOptions::new())
        .await
        .expect("download");

    check!(download.filename() == "report (1).csv");
    check!(std::fs::read(dir.join("report.csv")).expect("read") == b"precious");
    check!(std::fs::read(dir.join("report (1).csv")).expect("read") == b"fresh");

    let _ = std::fs::remove_dir_all(&dir);
}

#[tokio::test]
async fn download_falls_back_to_caller_filename() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"xlsx".to_vec()))
        .mount(&server)
        .await;

    let client = api(&server);
    let named = client
        .download("/datasets/ds-1/export", &Query::new(), Some("export.xlsx"), &RequestOptions::new())
        .await
        .expect("download");
    check!(named.filename() == "export.xlsx");

    let unnamed = client
        .download("/datasets/ds-1/export", &Query::new(), None, &RequestOptions::new())
        .await
        .expect("download");
    check!(unnamed.filename() == "download");
}

#[tokio::test]
async fn download_error_is_normalized() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({"message": "no report"})))
        .mount(&server)
        .await;

    let result = api(&server)
        .download("/reports/1", &Query::new(), None, &RequestOptions::loading())
        .await;

    let_assert!(Err(err) = result);
    check!(err.status() == Some(404));
    check!(err.data() == Some(&json!({"message": "no report"})));
}
