use axum::{
    extract::{
        FromRef, Request,
        rejection::{JsonRejection, PathRejection},
    },
    http::{StatusCode, Uri},
    response::{IntoResponse, Response},
};
use json::Json;
use postboard_common::{
    model::{Id, post::PostMarker, user::UserMarker},
    view::{ValidationErrors, post::DanglingAuthorError},
};
use postboard_db::store::{EntityStore, StoreError};
use serde::Serialize;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, error};

mod json;
mod routes;

pub type ServerRouter = axum::Router<ServerState>;

pub type Store = Arc<dyn EntityStore>;

#[derive(Clone, Debug, FromRef)]
pub struct ServerState {
    pub store: Store,
}

pub fn routes() -> ServerRouter {
    routes::routes().fallback(fallback)
}

pub async fn fallback(request: Request) -> ServerError {
    ServerError::UnknownRoute(request.into_parts().0.uri)
}

pub type Result<T, E = ServerError> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("Unknown route requested: {0}")]
    UnknownRoute(Uri),
    #[error("Path rejected: {0}")]
    PathRejection(#[from] PathRejection),
    #[error("Incoming JSON rejected: {0}")]
    JsonRejection(#[from] JsonRejection),
    #[error("JSON response could not be serialized: {0}")]
    JsonResponse(#[from] serde_json::Error),
    #[error("Invalid input: {0}")]
    Validation(#[from] ValidationErrors),
    #[error(transparent)]
    DanglingAuthor(#[from] DanglingAuthorError),
    #[error(transparent)]
    Store(StoreError),
    #[error("Post with id {0} was not found.")]
    PostByIdNotFound(Id<PostMarker>),
    #[error("User with id {0} was not found.")]
    UserByIdNotFound(Id<UserMarker>),
}

impl ServerError {
    #[must_use]
    pub fn missing_author(author: Id<UserMarker>) -> Self {
        ServerError::Validation(ValidationErrors::single(
            "author",
            format!("Invalid pk \"{author}\" - object does not exist."),
        ))
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ServerError::UnknownRoute(_)
            | ServerError::PathRejection(_)
            | ServerError::PostByIdNotFound(_)
            | ServerError::UserByIdNotFound(_) => StatusCode::NOT_FOUND,
            ServerError::JsonRejection(_) | ServerError::Validation(_) => StatusCode::BAD_REQUEST,
            ServerError::JsonResponse(_)
            | ServerError::DanglingAuthor(_)
            | ServerError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<StoreError> for ServerError {
    fn from(value: StoreError) -> Self {
        match value {
            StoreError::DuplicateEmail(_) => ServerError::Validation(ValidationErrors::single(
                "email",
                "user with this email already exists.",
            )),
            StoreError::MissingAuthor(author) => ServerError::missing_author(author),
            other => ServerError::Store(other),
        }
    }
}

#[derive(Clone, Eq, PartialEq, Debug, Hash, Serialize)]
struct ErrorResponse {
    status: u16,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    fields: Option<ValidationErrors>,
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let status = self.status();

        let message = if status.is_server_error() {
            error!(error = %self, %status, "Replying with error");
            status.canonical_reason().unwrap_or_default().to_owned()
        } else {
            debug!(error = %self, %status, "Replying with error");
            self.to_string()
        };

        let fields = match self {
            ServerError::Validation(errors) => Some(errors),
            _ => None,
        };

        let error_response = ErrorResponse {
            status: status.as_u16(),
            message,
            fields,
        };
        (status, Json(error_response)).into_response()
    }
}
