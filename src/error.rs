use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use tracing::error;

/// Domain error taxonomy surfaced by the service layer.
///
/// Handlers return this directly; the `IntoResponse` impl is the only place
/// where domain failures are translated into HTTP statuses. Storage and
/// other infrastructure errors collapse into `Internal` and are logged, not
/// echoed to the client.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Malformed or out-of-range input, user-correctable.
    #[error("{0}")]
    Validation(String),

    /// Uniqueness violation (username, email, duplicate review).
    #[error("{0}")]
    Conflict(String),

    /// Referenced entity absent.
    #[error("{0} not found")]
    NotFound(&'static str),

    /// Missing, invalid or expired credentials.
    #[error("{0}")]
    Unauthorized(&'static str),

    /// Acting identity lacks rights on the target. Distinct from NotFound
    /// so callers can render "forbidden" vs "missing".
    #[error("forbidden")]
    Forbidden,

    /// Metadata collaborator unreachable.
    #[error("metadata service unavailable")]
    Upstream(#[source] anyhow::Error),

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl From<sqlx::Error> for AppError {
    fn from(e: sqlx::Error) -> Self {
        AppError::Internal(e.into())
    }
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden => StatusCode::FORBIDDEN,
            AppError::Upstream(_) => StatusCode::BAD_GATEWAY,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match &self {
            AppError::Internal(e) => {
                error!(error = %e, "internal error");
                "internal error".to_string()
            }
            AppError::Upstream(e) => {
                error!(error = %e, "metadata collaborator unavailable");
                self.to_string()
            }
            _ => self.to_string(),
        };
        (status, Json(json!({ "error": message }))).into_response()
    }
}

/// Postgres unique-constraint violation (SQLSTATE 23505).
pub fn is_unique_violation(e: &sqlx::Error) -> bool {
    matches!(e, sqlx::Error::Database(db) if db.code().as_deref() == Some("23505"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn statuses_match_taxonomy() {
        assert_eq!(
            AppError::Validation("bad".into()).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::Conflict("taken".into()).status(),
            StatusCode::CONFLICT
        );
        assert_eq!(AppError::NotFound("movie").status(), StatusCode::NOT_FOUND);
        assert_eq!(
            AppError::Unauthorized("invalid credentials").status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(AppError::Forbidden.status(), StatusCode::FORBIDDEN);
        assert_eq!(
            AppError::Upstream(anyhow::anyhow!("down")).status(),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            AppError::Internal(anyhow::anyhow!("boom")).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn forbidden_and_not_found_are_distinct() {
        assert_ne!(
            AppError::Forbidden.status(),
            AppError::NotFound("review").status()
        );
    }

    #[test]
    fn not_found_names_the_entity() {
        assert_eq!(AppError::NotFound("movie").to_string(), "movie not found");
    }
}
