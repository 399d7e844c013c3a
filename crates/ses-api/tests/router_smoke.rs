use axum::{
    body::Body,
    http::{header::CONTENT_TYPE, Method, Request, StatusCode},
    response::Response,
    Router,
};
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;

const API_KEY: &str = "test-key";

fn app() -> Router {
    ses_api::create_router(ses_api::test_state(API_KEY))
}

async fn send(app: Router, method: Method, uri: &str, key: Option<&str>, body: Option<&str>) -> Response {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(key) = key {
        builder = builder.header("x-api-key", key);
    }
    let body = match body {
        Some(json) => {
            builder = builder.header(CONTENT_TYPE, "application/json");
            Body::from(json.to_string())
        }
        None => Body::empty(),
    };

    app.oneshot(builder.body(body).unwrap()).await.unwrap()
}

async fn json_body(response: Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn livez_is_public() {
    let response = send(app(), Method::GET, "/livez", None, None).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await["status"], "ok");
}

#[tokio::test]
async fn api_routes_require_api_key() {
    let routes = [
        (Method::POST, "/api/matching/run"),
        (Method::GET, "/api/matching/results?project_id=1"),
        (Method::GET, "/api/projects/1/engineers/2/eligibility"),
        (Method::POST, "/api/reconciliation/match"),
        (Method::GET, "/api/reconciliation/summary"),
        (Method::POST, "/api/reconciliation/1/match"),
        (Method::POST, "/api/reconciliation/1/confirm"),
        (Method::POST, "/api/reconciliation/1/unmatch"),
    ];

    for (method, uri) in routes {
        let response = send(app(), method.clone(), uri, None, None).await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED, "{method} {uri}");

        let response = send(app(), method.clone(), uri, Some("wrong"), None).await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED, "{method} {uri}");
    }
}

#[tokio::test]
async fn unauthorized_body_hides_detail() {
    let response = send(app(), Method::GET, "/api/reconciliation/summary", Some("wrong"), None).await;
    let json = json_body(response).await;
    assert_eq!(json["code"], "unauthorized");
    assert_eq!(json["message"], "unauthorized");
}

#[tokio::test]
async fn matching_run_rejects_non_positive_project_id() {
    let response = send(
        app(),
        Method::POST,
        "/api/matching/run",
        Some(API_KEY),
        Some(r#"{"project_id": 0}"#),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = json_body(response).await;
    assert_eq!(json["code"], "bad_request");
    assert_eq!(json["message"], "project_id must be positive");
}

#[tokio::test]
async fn results_listing_validates_pagination() {
    for uri in [
        "/api/matching/results?project_id=1&limit=0",
        "/api/matching/results?project_id=1&limit=201",
        "/api/matching/results?project_id=1&offset=10001",
        "/api/matching/results?project_id=-1",
    ] {
        let response = send(app(), Method::GET, uri, Some(API_KEY), None).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{uri}");
    }
}

#[tokio::test]
async fn eligibility_rejects_non_positive_ids() {
    let response = send(
        app(),
        Method::GET,
        "/api/projects/1/engineers/0/eligibility",
        Some(API_KEY),
        None,
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(json_body(response).await["message"], "engineer_id must be positive");
}

#[tokio::test]
async fn manual_match_rejects_non_positive_invoice_id() {
    let response = send(
        app(),
        Method::POST,
        "/api/reconciliation/5/match",
        Some(API_KEY),
        Some(r#"{"invoice_id": -3}"#),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(json_body(response).await["message"], "invoice_id must be positive");
}

#[tokio::test]
async fn responses_carry_request_id() {
    let response = send(app(), Method::POST, "/api/reconciliation/0/confirm", Some(API_KEY), None).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let header = response
        .headers()
        .get("x-request-id")
        .and_then(|value| value.to_str().ok())
        .map(str::to_string)
        .unwrap();
    assert_eq!(json_body(response).await["request_id"], header.as_str());
}
