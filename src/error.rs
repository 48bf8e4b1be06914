// SPDX-License-Identifier: MIT
// Copyright 2026 Paceline Authors

//! Application error types with consistent API responses.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

/// Application error type that converts to HTTP responses.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Authentication required")]
    NotAuthenticated,

    #[error("Invalid or expired token")]
    InvalidToken,

    #[error("Not authorized: {0}")]
    NotAuthorized(String),

    #[error("Group not found")]
    GroupNotFound,

    #[error("Already a member of this group")]
    AlreadyMember,

    #[error("Admin must transfer ownership before leaving")]
    AdminMustTransferOwnership,

    #[error("Display name already taken")]
    NameAlreadyTaken,

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Invalid request: {0}")]
    BadRequest(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

/// JSON error response body
#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<String>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error, details) = match &self {
            AppError::NotAuthenticated => (StatusCode::UNAUTHORIZED, "not_authenticated", None),
            AppError::InvalidToken => (StatusCode::UNAUTHORIZED, "invalid_token", None),
            AppError::NotAuthorized(msg) => {
                (StatusCode::FORBIDDEN, "not_authorized", Some(msg.clone()))
            }
            AppError::GroupNotFound => (StatusCode::NOT_FOUND, "group_not_found", None),
            AppError::AlreadyMember => (StatusCode::CONFLICT, "already_member", None),
            AppError::AdminMustTransferOwnership => {
                (StatusCode::CONFLICT, "admin_must_transfer_ownership", None)
            }
            AppError::NameAlreadyTaken => (StatusCode::CONFLICT, "name_already_taken", None),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "not_found", Some(msg.clone())),
            AppError::BadRequest(msg) => {
                (StatusCode::BAD_REQUEST, "bad_request", Some(msg.clone()))
            }
            AppError::Database(msg) => {
                tracing::error!(error = %msg, "Database error");
                (StatusCode::INTERNAL_SERVER_ERROR, "database_error", None)
            }
            AppError::Internal(err) => {
                tracing::error!(error = %err, "Internal server error");
                (StatusCode::INTERNAL_SERVER_ERROR, "internal_error", None)
            }
        };

        let body = ErrorResponse {
            error: error.to_string(),
            details,
        };

        (status, Json(body)).into_response()
    }
}

/// Result type alias for handlers
pub type Result<T> = std::result::Result<T, AppError>;
