// 🌐 REST API with Axum
// Routes, request validation and error-to-status mapping around HolidayEngine.

use crate::engine::HolidayEngine;
use crate::error::{EngineError, ValidationError};
use crate::validation::{
    collect, split_country_codes, validate_country_code, validate_country_codes, validate_year,
};
use axum::{
    extract::{rejection::QueryRejection, Path, Query, State},
    http::{StatusCode, Uri},
    response::{IntoResponse, Json, Response},
    routing::get,
    Router,
};
use log::info;
use serde::Serialize;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub engine: HolidayEngine,
}

// ============================================================================
// Response envelope
// ============================================================================

#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorBody>,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub status: u16,
    pub error: String,
    pub message: String,
    pub path: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub details: Vec<String>,
}

impl<T: Serialize> ApiResponse<T> {
    fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }
}

fn error_response(
    status: StatusCode,
    error: &str,
    message: String,
    uri: &Uri,
    details: Vec<String>,
) -> Response {
    let body = ApiResponse::<()> {
        success: false,
        data: None,
        error: Some(ErrorBody {
            status: status.as_u16(),
            error: error.to_string(),
            message,
            path: uri.path().to_string(),
            details,
        }),
    };
    (status, Json(body)).into_response()
}

fn validation_failed(errors: Vec<ValidationError>, uri: &Uri) -> Response {
    let details: Vec<String> = errors.iter().map(ToString::to_string).collect();
    error_response(
        StatusCode::BAD_REQUEST,
        "Validation error",
        details.join("; "),
        uri,
        details,
    )
}

fn engine_failed(err: &EngineError, uri: &Uri) -> Response {
    if err.source_error().is_unavailable() {
        error_response(
            StatusCode::SERVICE_UNAVAILABLE,
            "External API Error",
            "External API is currently unavailable".to_string(),
            uri,
            vec![],
        )
    } else {
        error_response(
            StatusCode::BAD_REQUEST,
            "API Error",
            err.to_string(),
            uri,
            vec![],
        )
    }
}

// ============================================================================
// Parameter parsing
// ============================================================================

/// Raw query pairs, in request order, repeated keys kept
///
/// Decoding into pairs instead of a typed struct keeps every problem
/// (bad flag, repeated key) inside the handler, where it is reported
/// in the `ApiResponse` envelope.
#[derive(Debug, Default)]
struct QueryParams(Vec<(String, String)>);

impl QueryParams {
    fn from_request(
        query: Result<Query<Vec<(String, String)>>, QueryRejection>,
    ) -> Result<Self, ValidationError> {
        query
            .map(|Query(pairs)| QueryParams(pairs))
            .map_err(|rejection| ValidationError::new("query", rejection.body_text()))
    }

    /// First value for `key`
    fn first(&self, key: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Every value for `key`, each split on commas
    fn list(&self, key: &str) -> Vec<String> {
        self.0
            .iter()
            .filter(|(k, _)| k == key)
            .flat_map(|(_, v)| split_country_codes(v))
            .collect()
    }

    /// Missing means false; otherwise "true" or "false"
    fn flag(&self, key: &str) -> Result<bool, ValidationError> {
        match self.first(key) {
            None => Ok(false),
            Some(raw) => match raw.trim() {
                "true" => Ok(true),
                "false" => Ok(false),
                _ => Err(ValidationError::new(key, "Must be true or false")),
            },
        }
    }
}

fn parse_year(raw: Option<&str>) -> Result<i32, ValidationError> {
    let raw = raw.ok_or_else(|| ValidationError::new("year", "Required parameter is missing"))?;
    let year: i32 = raw
        .trim()
        .parse()
        .map_err(|_| ValidationError::new("year", "Year must be a whole number"))?;
    validate_year(year)?;
    Ok(year)
}

fn required_country(field: &str, raw: Option<&str>) -> Result<String, ValidationError> {
    let code = raw.ok_or_else(|| ValidationError::new(field, "Required parameter is missing"))?;
    validate_country_code(field, code)?;
    Ok(code.to_string())
}

// ============================================================================
// API Handlers
// ============================================================================

/// GET /api/health - Health check
async fn health_check() -> impl IntoResponse {
    Json(ApiResponse::ok("OK"))
}

/// GET /api/holidays/most-recent/:country_code/:count
async fn most_recent(
    State(state): State<AppState>,
    Path((country_code, count)): Path<(String, String)>,
    query: Result<Query<Vec<(String, String)>>, QueryRejection>,
    uri: Uri,
) -> Response {
    let count_check = count
        .parse::<usize>()
        .map_err(|_| ValidationError::new("count", "Count must be a non-negative integer"));
    let diagnostics =
        QueryParams::from_request(query).and_then(|params| params.flag("diagnostics"));

    if let Err(errors) = collect(vec![
        validate_country_code("countryCode", &country_code),
        count_check.clone().map(|_| ()),
        diagnostics.clone().map(|_| ()),
    ]) {
        return validation_failed(errors, &uri);
    }
    let count = count_check.unwrap_or_default();
    let diagnostics = diagnostics.unwrap_or_default();

    let recent = state.engine.most_recent_holidays(&country_code, count).await;

    if diagnostics {
        Json(ApiResponse::ok(recent)).into_response()
    } else {
        Json(ApiResponse::ok(recent.holidays)).into_response()
    }
}

/// GET /api/holidays/not-weekends?year=2025&countryCodes=NL,GB
///
/// `countryCodes` may also be repeated: `countryCodes=NL&countryCodes=GB`.
async fn not_weekends(
    State(state): State<AppState>,
    query: Result<Query<Vec<(String, String)>>, QueryRejection>,
    uri: Uri,
) -> Response {
    let params = match QueryParams::from_request(query) {
        Ok(params) => params,
        Err(err) => return validation_failed(vec![err], &uri),
    };
    let year = parse_year(params.first("year"));
    let codes = params.list("countryCodes");
    let diagnostics = params.flag("diagnostics");

    let mut errors: Vec<ValidationError> = Vec::new();
    if let Err(err) = &year {
        errors.push(err.clone());
    }
    if let Err(mut list) = validate_country_codes(&codes) {
        errors.append(&mut list);
    }
    if let Err(err) = &diagnostics {
        errors.push(err.clone());
    }
    let (year, diagnostics) = match (year, diagnostics) {
        (Ok(year), Ok(diagnostics)) if errors.is_empty() => (year, diagnostics),
        _ => return validation_failed(errors, &uri),
    };

    let counts = state.engine.holidays_not_on_weekends(year, &codes).await;

    if diagnostics {
        Json(ApiResponse::ok(counts)).into_response()
    } else {
        Json(ApiResponse::ok(counts.counts)).into_response()
    }
}

/// GET /api/holidays/common?year=2025&countryCode1=NL&countryCode2=GB
async fn common(
    State(state): State<AppState>,
    query: Result<Query<Vec<(String, String)>>, QueryRejection>,
    uri: Uri,
) -> Response {
    let params = match QueryParams::from_request(query) {
        Ok(params) => params,
        Err(err) => return validation_failed(vec![err], &uri),
    };
    let year = parse_year(params.first("year"));
    let first = required_country("countryCode1", params.first("countryCode1"));
    let second = required_country("countryCode2", params.first("countryCode2"));

    let (year, first, second) = match (year, first, second) {
        (Ok(year), Ok(first), Ok(second)) => (year, first, second),
        (year, first, second) => {
            let errors = vec![year.err(), first.err(), second.err()]
                .into_iter()
                .flatten()
                .collect();
            return validation_failed(errors, &uri);
        }
    };

    match state.engine.common_holidays(year, &first, &second).await {
        Ok(common) => Json(ApiResponse::ok(common)).into_response(),
        Err(err) => engine_failed(&err, &uri),
    }
}

// ============================================================================
// Router
// ============================================================================

pub fn router(engine: HolidayEngine) -> Router {
    info!(
        "event=router_built module=api max_lookback_years={}",
        engine.max_lookback_years()
    );
    let state = AppState { engine };

    Router::new()
        .route("/api/health", get(health_check))
        .route(
            "/api/holidays/most-recent/:country_code/:count",
            get(most_recent),
        )
        .route("/api/holidays/not-weekends", get(not_weekends))
        .route("/api/holidays/common", get(common))
        .with_state(state)
        .layer(ServiceBuilder::new().layer(CorsLayer::permissive()))
}

// ============================================================================
// TESTS
// ============================================================================
