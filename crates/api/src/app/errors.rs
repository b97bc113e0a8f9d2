use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;

use grocery_core::{NodePath, PersonId};
use grocery_directory::StaffError;

pub fn staff_error_to_response(err: StaffError) -> axum::response::Response {
    match err {
        StaffError::Denied(reason) => json_error(StatusCode::FORBIDDEN, "forbidden", reason.to_string()),
        e @ StaffError::NodeNotFound(_) => json_error(StatusCode::NOT_FOUND, "store_not_found", e.to_string()),
        e @ StaffError::PersonNotFound { .. } => json_error(StatusCode::NOT_FOUND, "person_not_found", e.to_string()),
        e @ StaffError::Validation { .. } => json_error(StatusCode::BAD_REQUEST, "validation_error", e.to_string()),
        StaffError::Conflict(msg) => json_error(StatusCode::CONFLICT, "conflict", msg),
        StaffError::Collaborator(msg) => json_error(StatusCode::INTERNAL_SERVER_ERROR, "collaborator_fault", msg),
    }
}

pub fn json_error(
    status: StatusCode,
    code: &'static str,
    message: impl Into<String>,
) -> axum::response::Response {
    (
        status,
        axum::Json(json!({
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}

/// Route params accept slash (percent-encoded) or dot form.
pub fn parse_store_path(raw: &str) -> Result<NodePath, axum::response::Response> {
    NodePath::parse(raw).map_err(|e| {
        json_error(StatusCode::BAD_REQUEST, "invalid_path", format!("store path '{raw}': {e}"))
    })
}

pub fn parse_person_id(raw: &str) -> Result<PersonId, axum::response::Response> {
    raw.parse::<PersonId>()
        .map_err(|e| json_error(StatusCode::BAD_REQUEST, "invalid_id", e.to_string()))
}

pub fn bad_body(rejection: axum::extract::rejection::JsonRejection) -> axum::response::Response {
    json_error(StatusCode::BAD_REQUEST, "invalid_body", rejection.body_text())
}

#[cfg(test)]
mod tests {
    use grocery_auth::DenyReason;

    use super::*;

    #[test]
    fn maps_every_staff_error_to_its_status() {
        let path = NodePath::parse("/a").unwrap();
        let cases = [
            (StaffError::Denied(DenyReason::OutOfScope), StatusCode::FORBIDDEN),
            (StaffError::NodeNotFound(path.clone()), StatusCode::NOT_FOUND),
            (
                StaffError::PersonNotFound {
                    path,
                    id: PersonId::new(),
                },
                StatusCode::NOT_FOUND,
            ),
            (
                StaffError::Validation {
                    field: "email",
                    detail: "bad".into(),
                },
                StatusCode::BAD_REQUEST,
            ),
            (StaffError::Conflict("dup".into()), StatusCode::CONFLICT),
            (StaffError::Collaborator("down".into()), StatusCode::INTERNAL_SERVER_ERROR),
        ];
        for (err, status) in cases {
            assert_eq!(staff_error_to_response(err).status(), status);
        }
    }

    #[test]
    fn rejects_malformed_route_params() {
        assert_eq!(parse_store_path("a..b").unwrap_err().status(), StatusCode::BAD_REQUEST);
        assert_eq!(parse_person_id("nope").unwrap_err().status(), StatusCode::BAD_REQUEST);
        assert!(parse_store_path("srbija.vojvodina").is_ok());
    }
}
