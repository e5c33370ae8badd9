use crate::error::FormError;
use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use quarry_derive::api_model;
use tracing::{error, warn};

#[api_model]
/// Error body of the forms routes.
pub(super) struct ErrorBody {
    status: u16,
    message: String,
}

impl FormError {
    const fn status(&self) -> StatusCode {
        match self {
            Self::UnknownForm { .. } | Self::UnknownGroup { .. } | Self::UnknownServer { .. } => {
                StatusCode::NOT_FOUND
            },
            Self::BadRequest { .. } => StatusCode::BAD_REQUEST,
            Self::Storage { source, .. } if is_rejected_path(source) => {
                StatusCode::BAD_REQUEST
            },
            Self::Schema { .. } | Self::Storage { .. } | Self::State { .. } | Self::Internal { .. } => {
                StatusCode::INTERNAL_SERVER_ERROR
            },
        }
    }
}

const fn is_rejected_path(source: &quarry_storage::StorageError) -> bool {
    matches!(
        source,
        quarry_storage::StorageError::InvalidNamespace { .. }
            | quarry_storage::StorageError::PathTraversalAttempt { .. }
    )
}

impl IntoResponse for FormError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!(error = %self, "Forms request failed");
        } else {
            warn!(status = status.as_u16(), error = %self, "Forms request rejected");
        }

        let body = ErrorBody { status: status.as_u16(), message: self.to_string() };
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookups_map_to_not_found() {
        let err = FormError::UnknownGroup { message: "Nope".into(), context: None };
        assert_eq!(err.status(), StatusCode::NOT_FOUND);

        let err = FormError::BadRequest { message: "Bad".into(), context: None };
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);

        let err: FormError = "boom".into();
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn rejected_namespaces_are_client_errors() {
        let source = quarry_storage::StorageError::InvalidNamespace {
            message: "a b".into(),
            context: None,
        };
        let err = FormError::Storage { source, context: None };
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
    }
}
