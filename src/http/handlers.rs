//! Lookup endpoint.

use std::time::Instant;

use axum::{
    extract::{RawQuery, State},
    response::{IntoResponse, Response},
};

use crate::http::server::AppState;
use crate::observability::metrics;
use crate::pipeline::LookupOutcome;

/// First value of the `ip` parameter, or empty when it is absent.
///
/// Repeated parameters are not an error; later values are ignored.
fn ip_param(query: Option<&str>) -> String {
    query
        .and_then(|q| {
            url::form_urlencoded::parse(q.as_bytes())
                .find(|(key, _)| key == "ip")
                .map(|(_, value)| value.into_owned())
        })
        .unwrap_or_default()
}

/// `GET /api/v1/find-country?ip=<ip>`
pub async fn find_country(State(state): State<AppState>, RawQuery(query): RawQuery) -> Response {
    let start = Instant::now();
    let ip = ip_param(query.as_deref());

    tracing::debug!(ip = %ip, "Received request to find country");

    let outcome = state.pipeline.handle(&ip);
    match &outcome {
        LookupOutcome::Found { record, .. } => {
            tracing::info!(
                ip = %ip,
                city = %record.city,
                country = %record.country,
                "Found mapping"
            );
        }
        LookupOutcome::LookupMiss => tracing::debug!(ip = %ip, "IP not found in the database"),
        LookupOutcome::RateLimited => {
            tracing::warn!(ip = %ip, limit = state.pipeline.gate().limit(), "Rate limit exceeded");
        }
        LookupOutcome::LookupFailure(reason) => {
            tracing::error!(ip = %ip, reason = %reason, "Failed to query IP database");
        }
        LookupOutcome::MissingParameter => tracing::debug!("IP parameter is missing"),
    }

    metrics::record_request(outcome.as_str(), start);
    outcome.into_response()
}
