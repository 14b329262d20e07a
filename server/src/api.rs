//! HTTP API surface.

use std::sync::Arc;

use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use tracing::info;

use cambio_rates::{ConversionService, CurrencyCode, RateError};

/// Build the API router, nested under `base_path` when it is non-empty.
pub fn app(service: Arc<ConversionService>, base_path: &str) -> Router {
    let routes = Router::new()
        .route("/currencies", get(list_currencies))
        .route("/convert", get(convert))
        .with_state(service);

    if base_path.is_empty() {
        routes
    } else {
        Router::new().nest(base_path, routes)
    }
}

/// One side of a conversion response.
#[derive(Debug, Serialize)]
struct ConvertedAmount {
    currency: CurrencyCode,
    value: f64,
}

/// Body of a successful conversion.
#[derive(Debug, Serialize)]
struct ConvertResponse {
    status: &'static str,
    from: ConvertedAmount,
    to: ConvertedAmount,
}

/// Body of every non-200 response.
#[derive(Debug, Serialize)]
struct StatusBody {
    status: &'static str,
    reason: String,
}

/// Request-scoped failures, mapped onto wire statuses.
#[derive(Debug)]
enum ApiError {
    /// No rate table has been installed yet: 503.
    Loading,
    /// Invalid input or unknown currency: 400.
    BadRequest(String),
    /// Failures a read request should never produce: 500.
    Internal(String),
}

impl From<RateError> for ApiError {
    fn from(error: RateError) -> Self {
        match error {
            RateError::NotReady => ApiError::Loading,
            RateError::UnknownCurrency { .. } => ApiError::BadRequest(error.to_string()),
            other => ApiError::Internal(other.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            ApiError::Loading => (
                StatusCode::SERVICE_UNAVAILABLE,
                StatusBody {
                    status: "loading",
                    reason: "currency data not available yet".to_string(),
                },
            ),
            ApiError::BadRequest(reason) => (
                StatusCode::BAD_REQUEST,
                StatusBody {
                    status: "error",
                    reason,
                },
            ),
            ApiError::Internal(reason) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                StatusBody {
                    status: "error",
                    reason,
                },
            ),
        };
        (status, Json(body)).into_response()
    }
}

async fn list_currencies(
    State(service): State<Arc<ConversionService>>,
) -> Result<Json<Vec<CurrencyCode>>, ApiError> {
    Ok(Json(service.currencies()?))
}

/// Raw query parameters of `/convert`, validated by hand so the reason strings
/// stay precise.
#[derive(Debug, Deserialize)]
struct ConvertQuery {
    from: Option<String>,
    to: Option<String>,
    amount: Option<String>,
}

async fn convert(
    State(service): State<Arc<ConversionService>>,
    query: Result<Query<ConvertQuery>, QueryRejection>,
) -> Result<Json<ConvertResponse>, ApiError> {
    // A query string the extractor cannot deserialize (duplicate keys, bad
    // percent-encoding) still gets the JSON error envelope.
    let Query(query) = query.map_err(|rejection| ApiError::BadRequest(rejection.body_text()))?;
    let (from, to, amount) = parse_convert_query(query)?;
    let value = service.convert(&from, &to, amount)?;
    if !value.is_finite() {
        return Err(ApiError::BadRequest(
            "conversion result out of range".to_string(),
        ));
    }

    info!(from = %from, to = %to, amount, value, "conversion served");

    Ok(Json(ConvertResponse {
        status: "ok",
        from: ConvertedAmount {
            currency: from,
            value: amount,
        },
        to: ConvertedAmount {
            currency: to,
            value,
        },
    }))
}

fn parse_convert_query(query: ConvertQuery) -> Result<(CurrencyCode, CurrencyCode, f64), ApiError> {
    let from = query.from.filter(|code| !code.is_empty());
    let to = query.to.filter(|code| !code.is_empty());
    let (Some(from), Some(to)) = (from, to) else {
        return Err(ApiError::BadRequest(
            "missing \"from\" or \"to\" parameters".to_string(),
        ));
    };

    let Some(raw_amount) = query.amount else {
        return Err(ApiError::BadRequest(
            "missing \"amount\" parameter".to_string(),
        ));
    };
    let amount = raw_amount
        .parse::<f64>()
        .ok()
        .filter(|amount| amount.is_finite())
        .ok_or_else(|| ApiError::BadRequest(format!("invalid \"amount\" parameter: {raw_amount}")))?;

    Ok((CurrencyCode::new(from), CurrencyCode::new(to), amount))
}
