//! Response mapping for lookup outcomes.
//!
//! | Outcome            | Status |
//! |--------------------|--------|
//! | `MissingParameter` | 400    |
//! | `RateLimited`      | 429    |
//! | `LookupMiss`       | 404    |
//! | `LookupFailure`    | 500    |
//! | `Found`            | 200    |

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::pipeline::LookupOutcome;

pub const MSG_MISSING_IP: &str = "IP parameter is missing";
pub const MSG_RATE_LIMITED: &str = "Rate limit exceeded";
pub const MSG_NOT_FOUND: &str = "IP not found in the database";
pub const MSG_LOOKUP_FAILED: &str = "Failed to query IP database";

/// Body of a successful lookup.
#[derive(Debug, Serialize)]
pub struct CountryResponse<'a> {
    pub ip: &'a str,
    pub city: &'a str,
    pub country: &'a str,
}

/// Body of every error response.
#[derive(Debug, Serialize)]
pub struct ErrorResponse<'a> {
    pub error: &'a str,
}

fn error_response(status: StatusCode, message: &str) -> Response {
    (status, Json(ErrorResponse { error: message })).into_response()
}

impl IntoResponse for LookupOutcome {
    fn into_response(self) -> Response {
        match self {
            LookupOutcome::MissingParameter => {
                error_response(StatusCode::BAD_REQUEST, MSG_MISSING_IP)
            }
            LookupOutcome::RateLimited => {
                error_response(StatusCode::TOO_MANY_REQUESTS, MSG_RATE_LIMITED)
            }
            LookupOutcome::LookupMiss => error_response(StatusCode::NOT_FOUND, MSG_NOT_FOUND),
            // The underlying reason is logged, not sent to the client.
            LookupOutcome::LookupFailure(_) => {
                error_response(StatusCode::INTERNAL_SERVER_ERROR, MSG_LOOKUP_FAILED)
            }
            LookupOutcome::Found { ip, record } => (
                StatusCode::OK,
                Json(CountryResponse {
                    ip: &ip,
                    city: &record.city,
                    country: &record.country,
                }),
            )
                .into_response(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ipdb::LocationRecord;

    async fn body_string(response: Response) -> String {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn test_status_codes() {
        let cases = [
            (LookupOutcome::MissingParameter, StatusCode::BAD_REQUEST),
            (LookupOutcome::RateLimited, StatusCode::TOO_MANY_REQUESTS),
            (LookupOutcome::LookupMiss, StatusCode::NOT_FOUND),
            (
                LookupOutcome::LookupFailure("boom".into()),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (outcome, status) in cases {
            assert_eq!(outcome.into_response().status(), status);
        }
    }

    #[tokio::test]
    async fn test_error_bodies() {
        assert_eq!(
            body_string(LookupOutcome::MissingParameter.into_response()).await,
            r#"{"error":"IP parameter is missing"}"#
        );
        assert_eq!(
            body_string(LookupOutcome::LookupMiss.into_response()).await,
            r#"{"error":"IP not found in the database"}"#
        );
        // Internal detail stays out of the body.
        let body = body_string(LookupOutcome::LookupFailure("secret".into()).into_response()).await;
        assert_eq!(body, r#"{"error":"Failed to query IP database"}"#);
    }

    #[tokio::test]
    async fn test_found_body() {
        let outcome = LookupOutcome::Found {
            ip: "2.22.233.255".into(),
            record: LocationRecord::new("London", "United Kingdom"),
        };
        let response = outcome.into_response();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            body_string(response).await,
            r#"{"ip":"2.22.233.255","city":"London","country":"United Kingdom"}"#
        );
    }
}
