use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, error, info, instrument, warn};
use utoipa::{OpenApi, ToSchema};

use crate::fetch_error::FetchError;
use crate::period::PeriodKey;
use crate::report::{Highlights, OrgRecord, OrgShare, Totals};
use crate::services::ReportService;

#[derive(Clone)]
pub struct AppState {
    pub report_service: ReportService,
}

#[derive(Serialize, ToSchema)]
pub struct HealthResponse {
    pub status: String,
}

#[derive(Serialize, ToSchema)]
pub struct PeriodInfo {
    pub key: PeriodKey,
    pub label: String,
    pub sheet_name: String,
}

#[derive(Serialize, ToSchema)]
pub struct ReportResponse {
    pub period: PeriodKey,
    pub label: String,
    pub sheet_name: String,
    pub generated_at: DateTime<Utc>,
    pub records: Vec<OrgRecord>,
    pub totals: Totals,
    pub highlights: Highlights,
    /// Active organizations only; empty means nothing to chart.
    pub distribution: Vec<OrgShare>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
}

type ApiError = (StatusCode, Json<ErrorResponse>);

#[derive(OpenApi)]
#[openapi(
    paths(health, list_periods, get_report),
    components(schemas(
        HealthResponse,
        PeriodInfo,
        ReportResponse,
        ErrorResponse,
        PeriodKey,
        OrgRecord,
        Totals,
        Highlights,
        OrgShare
    )),
    tags((name = "reports", description = "Request reports per period"))
)]
pub struct ApiDoc;

pub fn generate_openapi_spec() -> utoipa::openapi::OpenApi {
    ApiDoc::openapi()
}

pub fn create_router(state: AppState) -> Router {
    let api_routes = Router::new()
        .route("/health", get(health))
        .route("/periods", get(list_periods))
        .route("/reports/{period}", get(get_report))
        .route("/openapi.json", get(openapi_json))
        .with_state(state);

    Router::new().nest("/api/v1", api_routes)
}

#[utoipa::path(
    get,
    path = "/api/v1/health",
    responses((status = 200, description = "Service is up", body = HealthResponse)),
    tag = "reports"
)]
#[instrument(skip(_state))]
async fn health(State(_state): State<AppState>) -> impl IntoResponse {
    debug!("Health check requested");
    let response = HealthResponse {
        status: "healthy".to_string(),
    };
    (StatusCode::OK, Json(response))
}

#[utoipa::path(
    get,
    path = "/api/v1/periods",
    responses((status = 200, description = "Selectable periods in display order", body = [PeriodInfo])),
    tag = "reports"
)]
async fn list_periods() -> Json<Vec<PeriodInfo>> {
    let periods = PeriodKey::ALL
        .into_iter()
        .map(|key| PeriodInfo {
            key,
            label: key.label().to_string(),
            sheet_name: key.sheet_name().unwrap_or_default().to_string(),
        })
        .collect();
    Json(periods)
}

#[utoipa::path(
    get,
    path = "/api/v1/reports/{period}",
    params(("period" = String, Path, description = "Period key: jan..dec or year")),
    responses(
        (status = 200, description = "Normalized report", body = ReportResponse),
        (status = 400, description = "Unknown period key", body = ErrorResponse),
        (status = 404, description = "Sheet missing or not accessible", body = ErrorResponse),
        (status = 503, description = "Source unavailable after retries", body = ErrorResponse)
    ),
    tag = "reports"
)]
#[instrument(skip(state), fields(period = %period))]
async fn get_report(
    State(state): State<AppState>,
    Path(period): Path<String>,
) -> Result<Json<ReportResponse>, ApiError> {
    debug!("Loading report for period {}", period);
    let (key, report) = state
        .report_service
        .get_report_for_key(&period)
        .await
        .map_err(|e| fetch_error_response(&period, e))?;

    info!(
        "Serving report for {}: {} organizations, {} requests",
        key,
        report.records.len(),
        report.totals.total
    );

    Ok(Json(ReportResponse {
        period: key,
        label: key.label().to_string(),
        sheet_name: key.sheet_name().unwrap_or_default().to_string(),
        generated_at: Utc::now(),
        records: report.records.clone(),
        totals: report.totals,
        highlights: report.highlights(),
        distribution: report.distribution(),
    }))
}

async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(generate_openapi_spec())
}

fn fetch_error_response(period: &str, err: FetchError) -> ApiError {
    let status = match &err {
        FetchError::Config(_) => {
            warn!("Rejected period '{}': {}", period, err);
            StatusCode::BAD_REQUEST
        }
        FetchError::SourceNotFound { .. } => {
            warn!("Could not load period '{}': {}", period, err);
            StatusCode::NOT_FOUND
        }
        FetchError::SourceUnavailable { .. } | FetchError::InvalidResponse { .. } => {
            error!("Could not load period '{}': {}", period, err);
            StatusCode::SERVICE_UNAVAILABLE
        }
    };

    (
        status,
        Json(ErrorResponse {
            error: format!("could not load period {}: {}", period.trim(), err),
        }),
    )
}
