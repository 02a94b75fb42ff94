//! Axum request handlers for all service endpoints.

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::{Duration, Utc};
use common::protocol::{ErrorResponse, HealthResponse, TempTokenRequest, TempTokenResponse};
use common::ServiceError;
use temp_token::{token::format_expire, Scope};
use tracing::{info, warn};

use super::state::{AppState, TtlPolicy};

/// `POST /temp-token`: mint a scoped temporary token from the parent token.
///
/// The token expires `ttl_secs` after the request (service default when
/// absent). Scope fields present in the body are embedded in the token.
pub async fn temp_token(
    State(state): State<AppState>,
    Json(req): Json<TempTokenRequest>,
) -> Response {
    match issue(&state, req).await {
        Ok(body) => (StatusCode::OK, Json(body)).into_response(),
        Err(err) => error_response(&err),
    }
}

/// `GET /health`: liveness and readiness check.
///
/// Returns `200 OK` when a parent token is loaded, `503` otherwise.
pub async fn health(State(state): State<AppState>) -> Response {
    let parent_token_ready = state.parent_tokens.is_ready().await;

    let (status_code, status_str) = if parent_token_ready {
        (StatusCode::OK, "ok")
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, "degraded")
    };

    let body = HealthResponse {
        status: status_str.into(),
        parent_token_ready,
    };
    (status_code, Json(body)).into_response()
}

/// Catch-all 404 handler.
pub async fn not_found() -> impl IntoResponse {
    let err = ErrorResponse::new("not_found", "the requested resource does not exist");
    (StatusCode::NOT_FOUND, Json(err))
}

async fn issue(state: &AppState, req: TempTokenRequest) -> Result<TempTokenResponse, ServiceError> {
    let ttl_secs = resolve_ttl(req.ttl_secs, state.ttl)?;
    let expire = Duration::try_seconds(ttl_secs)
        .and_then(|ttl| Utc::now().checked_add_signed(ttl))
        .ok_or_else(|| ServiceError::BadRequest("ttl_secs is out of range".into()))?;

    let parent = state
        .parent_tokens
        .current()
        .await
        .map_err(|e| ServiceError::Unavailable(e.to_string()))?;

    let scope = Scope {
        permissions: req.permissions,
        rid: req.rid,
        fid: req.fid,
        source_ipv4: req.sourceipv4,
        host: req.host,
    };

    let mut rng = state.rng.rng();
    let token = parent
        .mint_with_rng(rng.as_mut(), expire, &scope)
        .map_err(|e| {
            warn!(error = %e, account_id = parent.account_id(), "temporary token minting failed");
            if e.is_caller_error() {
                ServiceError::BadRequest(e.to_string())
            } else {
                ServiceError::TokenFailure("token minting failed".into())
            }
        })?;

    info!(
        account_id = parent.account_id(),
        ttl_secs,
        scoped = !scope.is_unrestricted(),
        "temporary token issued"
    );

    let expire = format_expire(&token.expire());
    let (temp_token, _) = token.into_parts();
    Ok(TempTokenResponse { temp_token, expire })
}

/// Apply the TTL policy to a requested lifetime, returning whole seconds.
fn resolve_ttl(requested: Option<u64>, policy: TtlPolicy) -> Result<i64, ServiceError> {
    let ttl = requested.unwrap_or(policy.default_secs);
    if ttl == 0 {
        return Err(ServiceError::BadRequest("ttl_secs must be at least 1".into()));
    }
    if ttl > policy.max_secs {
        return Err(ServiceError::BadRequest(format!(
            "ttl_secs must not exceed {}",
            policy.max_secs
        )));
    }
    i64::try_from(ttl).map_err(|_| ServiceError::BadRequest("ttl_secs is out of range".into()))
}

fn error_response(err: &ServiceError) -> Response {
    let status =
        StatusCode::from_u16(err.http_status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (status, Json(ErrorResponse::from(err))).into_response()
}
