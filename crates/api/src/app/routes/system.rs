use axum::{extract::Extension, response::IntoResponse, Json};

use crate::app::dto;
use crate::context::PrincipalContext;

pub async fn ping() -> &'static str {
    "pong"
}

pub async fn whoami(Extension(principal): Extension<PrincipalContext>) -> impl IntoResponse {
    Json(dto::principal_to_json(principal.principal()))
}
