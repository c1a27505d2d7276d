// src/api.rs
//! HTTP surface: the server-rendered form, the explicit scoring trigger, the CSV
//! download, and a small JSON API over the same pipeline.

use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    extract::{Form, State},
    http::{header, StatusCode},
    response::{Html, IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use tower_http::cors::CorsLayer;
use tracing::{debug, info, warn};

use crate::config::AppConfig;
use crate::engine::{self, Assessment, AssessmentView};
use crate::error::RiskError;
use crate::feature::FeatureRecord;
use crate::form::{InputForm, ASSESS_PATH, REPORT_PATH};
use crate::metrics;
use crate::reference::{FeatureDef, ReferenceTable};
use crate::report::{Report, REPORT_CONTENT_TYPE, REPORT_FILE_NAME};
use crate::telemetry::record_fingerprint;

/// Shared, read-only state. Each request owns its own record and score.
#[derive(Clone)]
pub struct AppState {
    pub table: Arc<ReferenceTable>,
    pub form: Arc<InputForm>,
}

impl AppState {
    pub fn new(table: ReferenceTable) -> Self {
        let form = InputForm::from_table(&table);
        Self {
            table: Arc::new(table),
            form: Arc::new(form),
        }
    }

    pub fn from_config(cfg: &AppConfig) -> Self {
        Self::new(cfg.reference.clone())
    }

    fn assess(&self, record: FeatureRecord) -> Assessment {
        let a = engine::assess(&self.table, record);
        // Never log raw health values; the fingerprint is enough to correlate.
        info!(
            target: "risk",
            id = %record_fingerprint(&a.record),
            score = a.score().value(),
            tier = a.tier.label(),
            "assessment"
        );
        metrics::record_assessment(a.tier, a.score().value());
        a
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(|| async { "OK" }))
        .route("/", get(index))
        .route(ASSESS_PATH, post(assess_form))
        .route(REPORT_PATH, post(report_form))
        .route("/api/score", post(api_score))
        .route("/api/report", post(api_report))
        .route("/api/reference", get(api_reference))
        .layer(CorsLayer::very_permissive())
        .with_state(state)
}

async fn index(State(state): State<AppState>) -> Html<String> {
    Html(state.form.render(None, None))
}

async fn assess_form(
    State(state): State<AppState>,
    Form(fields): Form<HashMap<String, String>>,
) -> Result<Html<String>, ApiError> {
    let record = state.form.materialize(&fields)?;
    let a = state.assess(record);
    Ok(Html(state.form.render(Some(&a.record), Some(&a))))
}

async fn report_form(
    State(state): State<AppState>,
    Form(fields): Form<HashMap<String, String>>,
) -> Result<Response, ApiError> {
    let record = state.form.materialize(&fields)?;
    let a = state.assess(record);
    Ok(csv_download(&a.report(&state.table)))
}

async fn api_score(
    State(state): State<AppState>,
    Json(record): Json<FeatureRecord>,
) -> Json<AssessmentView> {
    Json(state.assess(record).view())
}

async fn api_report(State(state): State<AppState>, Json(record): Json<FeatureRecord>) -> Response {
    let a = state.assess(record);
    csv_download(&a.report(&state.table))
}

async fn api_reference(State(state): State<AppState>) -> Json<Vec<FeatureDef>> {
    Json(state.table.iter().cloned().collect())
}

fn csv_download(report: &Report) -> Response {
    metrics::record_report();
    debug!(target: "risk", rows = report.rows.len(), "csv report");
    (
        [
            (
                header::CONTENT_TYPE,
                format!("{REPORT_CONTENT_TYPE}; charset=utf-8"),
            ),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{REPORT_FILE_NAME}\""),
            ),
        ],
        report.to_csv_bytes(),
    )
        .into_response()
}

/// Maps library errors onto HTTP responses (`{"error": "..."}`).
#[derive(Debug)]
pub struct ApiError(RiskError);

impl From<RiskError> for ApiError {
    fn from(e: RiskError) -> Self {
        Self(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, reason) = match &self.0 {
            RiskError::UnknownFeature { .. } => (StatusCode::BAD_REQUEST, "unknown_feature"),
            RiskError::MissingValue(_) => (StatusCode::BAD_REQUEST, "missing_value"),
            RiskError::InvalidValue { .. } => (StatusCode::BAD_REQUEST, "invalid_value"),
            RiskError::InvalidTable(_) => (StatusCode::INTERNAL_SERVER_ERROR, "invalid_table"),
        };
        warn!(target: "risk", error = %self.0, reason, "request rejected");
        metrics::record_rejected(reason);
        (
            status,
            Json(serde_json::json!({ "error": self.0.to_string(), "reason": reason })),
        )
            .into_response()
    }
}
