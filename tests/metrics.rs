// tests/metrics.rs
use axum::body::{self, Body};
use axum::http::{Request, StatusCode};
use axum::Router;
use tower::ServiceExt;

use hypertension_risk::config::AppConfig;
use hypertension_risk::ReferenceTable;

// Build full in-process app with /metrics mounted.
fn build_app() -> Router {
    let cfg = AppConfig {
        reference: ReferenceTable::builtin(),
        metrics_enabled: true,
    };
    hypertension_risk::app_with_config(&cfg).expect("app should build Router in tests")
}

fn means_json() -> String {
    serde_json::to_string(&ReferenceTable::builtin().mean_record()).unwrap()
}

async fn body_text(resp: axum::response::Response) -> String {
    // axum::body::to_bytes requires an explicit limit
    let body = body::to_bytes(resp.into_body(), 1_048_576).await.unwrap(); // 1 MiB
    String::from_utf8(body.to_vec()).unwrap()
}

#[tokio::test]
async fn metrics_endpoint_counts_assessments_and_reports() {
    let app = build_app();

    for uri in ["/api/score", "/api/report"] {
        let resp = app
            .clone()
            .oneshot(
                Request::post(uri)
                    .header("content-type", "application/json")
                    .body(Body::from(means_json()))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK, "{uri}");
    }

    let resp = app
        .clone()
        .oneshot(Request::get("/metrics").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let text = body_text(resp).await;

    for needle in ["risk_assessments_total", "tier=\"moderate\"", "risk_reports_total", "risk_score"] {
        assert!(text.contains(needle), "missing {needle} in:\n{text}");
    }
}

#[tokio::test]
async fn metrics_route_absent_when_disabled() {
    let app = hypertension_risk::app_with_config(&AppConfig::default()).unwrap();
    let resp = app
        .oneshot(Request::get("/metrics").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}
