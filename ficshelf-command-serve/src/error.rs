use std::fmt;

use axum::{
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use ficshelf_common::Report;

use crate::Message;

#[derive(Debug)]
pub enum Error {
    /// A referenced user, story or chapter does not exist
    NotFound(String),
    /// The request body, path or query could not be read into its schema
    Malformed(String),
    /// A unique value is already taken
    Conflict(String),
    /// The route is registered but has no behavior
    NotImplemented(&'static str),
    Internal(Report),
}

impl Error {
    pub fn from_any<A>(err: A) -> Self
    where
        A: Into<Report>,
    {
        Self::Internal(err.into())
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Error::NotFound(_) => StatusCode::NOT_FOUND,
            Error::Malformed(_) => StatusCode::BAD_REQUEST,
            Error::Conflict(_) => StatusCode::CONFLICT,
            Error::NotImplemented(_) => StatusCode::NOT_IMPLEMENTED,
            Error::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::NotFound(message) | Error::Malformed(message) | Error::Conflict(message) => {
                write!(f, "{}", message)
            }
            Error::NotImplemented(message) => write!(f, "{}", message),
            Error::Internal(err) => write!(f, "{}", err),
        }
    }
}

impl From<ficshelf_queries::Error> for Error {
    fn from(err: ficshelf_queries::Error) -> Self {
        match err {
            ficshelf_queries::Error::NotFound(entity) => {
                Error::NotFound(format!("{} cannot be found", entity))
            }
            ficshelf_queries::Error::Conflict(message) => Error::Conflict(message),
            other => Error::from_any(other),
        }
    }
}

impl From<JsonRejection> for Error {
    fn from(rejection: JsonRejection) -> Self {
        Error::Malformed(rejection.body_text())
    }
}

impl From<PathRejection> for Error {
    fn from(rejection: PathRejection) -> Self {
        Error::Malformed(rejection.body_text())
    }
}

impl From<QueryRejection> for Error {
    fn from(rejection: QueryRejection) -> Self {
        Error::Malformed(rejection.body_text())
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = self.status();

        let message = match &self {
            Error::Internal(err) => {
                tracing::error!(error = ?err, "error handling request");

                "internal server error".to_string()
            }
            Error::Conflict(message) => {
                tracing::warn!(%message, "conflicting request");

                message.clone()
            }
            Error::NotImplemented(message) => {
                tracing::warn!(%message, "unimplemented route called");

                message.to_string()
            }
            Error::NotFound(message) | Error::Malformed(message) => {
                tracing::debug!(%message, "client error");

                message.clone()
            }
        };

        (status, Json(Message::new(message))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ficshelf_queries::Entity;

    #[test]
    fn query_errors_keep_their_kind() {
        let not_found = Error::from(ficshelf_queries::Error::NotFound(Entity::Story));
        let conflict = Error::from(ficshelf_queries::Error::Conflict("taken".into()));

        assert_eq!(not_found.status(), StatusCode::NOT_FOUND);
        assert_eq!(not_found.to_string(), "Story cannot be found");
        assert_eq!(conflict.status(), StatusCode::CONFLICT);
        assert_eq!(conflict.to_string(), "taken");
    }

    #[test]
    fn database_failures_are_internal() {
        let err = Error::from(ficshelf_queries::Error::Database(
            ficshelf_queries::DatabaseError::PoolClosed,
        ));

        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.into_response().status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
