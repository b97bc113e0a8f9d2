use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Extension, Path, Query},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};

use grocery_auth::Role;
use grocery_directory::{Endpoint, PersonDraft, PersonPatch, StaffService};

use crate::app::{dto, errors};
use crate::context::PrincipalContext;

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_stores))
        .route("/:store_path/access", get(explain_access))
        .route("/:store_path/staff", get(list_staff))
        .route("/:store_path/managers", get(list_managers).post(create_manager))
        .route(
            "/:store_path/managers/:id",
            get(get_manager).put(update_manager).delete(delete_manager),
        )
        .route("/:store_path/employees", get(list_employees).post(create_employee))
        .route(
            "/:store_path/employees/:id",
            get(get_employee).put(update_employee).delete(delete_employee),
        )
}

pub async fn list_stores(
    Extension(staff): Extension<Arc<StaffService>>,
    Extension(principal): Extension<PrincipalContext>,
) -> axum::response::Response {
    match staff.list_stores(principal.principal()).await {
        Ok(nodes) => {
            let items = nodes.into_iter().map(dto::node_to_json).collect::<Vec<_>>();
            (StatusCode::OK, Json(items)).into_response()
        }
        Err(e) => errors::staff_error_to_response(e),
    }
}

/// Which operations the caller may perform at a store, and the rule deciding each.
pub async fn explain_access(
    Extension(staff): Extension<Arc<StaffService>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(store_path): Path<String>,
) -> axum::response::Response {
    let target = match errors::parse_store_path(&store_path) {
        Ok(t) => t,
        Err(resp) => return resp,
    };
    let items = staff
        .explain_access(principal.principal(), &target)
        .into_iter()
        .map(dto::explanation_to_json)
        .collect::<Vec<_>>();
    (StatusCode::OK, Json(items)).into_response()
}

/// Managers and employees together, optionally narrowed with `?role=`.
pub async fn list_staff(
    Extension(staff): Extension<Arc<StaffService>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(store_path): Path<String>,
    Query(query): Query<dto::ListQuery>,
) -> axum::response::Response {
    list_people(staff, principal, store_path, query.deep, query.role).await
}

pub async fn list_managers(
    Extension(staff): Extension<Arc<StaffService>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(store_path): Path<String>,
    Query(query): Query<dto::ListQuery>,
) -> axum::response::Response {
    list_people(staff, principal, store_path, query.deep, Some(Role::Manager)).await
}

pub async fn list_employees(
    Extension(staff): Extension<Arc<StaffService>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(store_path): Path<String>,
    Query(query): Query<dto::ListQuery>,
) -> axum::response::Response {
    list_people(staff, principal, store_path, query.deep, Some(Role::Employee)).await
}

pub async fn create_manager(
    Extension(staff): Extension<Arc<StaffService>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(store_path): Path<String>,
    body: Result<Json<PersonDraft>, JsonRejection>,
) -> axum::response::Response {
    create_person(staff, principal, store_path, Endpoint::Managers, body).await
}

pub async fn create_employee(
    Extension(staff): Extension<Arc<StaffService>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(store_path): Path<String>,
    body: Result<Json<PersonDraft>, JsonRejection>,
) -> axum::response::Response {
    create_person(staff, principal, store_path, Endpoint::Employees, body).await
}

pub async fn get_manager(
    Extension(staff): Extension<Arc<StaffService>>,
    Extension(principal): Extension<PrincipalContext>,
    Path((store_path, id)): Path<(String, String)>,
) -> axum::response::Response {
    get_person(staff, principal, store_path, id, Endpoint::Managers).await
}

pub async fn get_employee(
    Extension(staff): Extension<Arc<StaffService>>,
    Extension(principal): Extension<PrincipalContext>,
    Path((store_path, id)): Path<(String, String)>,
) -> axum::response::Response {
    get_person(staff, principal, store_path, id, Endpoint::Employees).await
}

pub async fn update_manager(
    Extension(staff): Extension<Arc<StaffService>>,
    Extension(principal): Extension<PrincipalContext>,
    Path((store_path, id)): Path<(String, String)>,
    body: Result<Json<PersonPatch>, JsonRejection>,
) -> axum::response::Response {
    update_person(staff, principal, store_path, id, Endpoint::Managers, body).await
}

pub async fn update_employee(
    Extension(staff): Extension<Arc<StaffService>>,
    Extension(principal): Extension<PrincipalContext>,
    Path((store_path, id)): Path<(String, String)>,
    body: Result<Json<PersonPatch>, JsonRejection>,
) -> axum::response::Response {
    update_person(staff, principal, store_path, id, Endpoint::Employees, body).await
}

pub async fn delete_manager(
    Extension(staff): Extension<Arc<StaffService>>,
    Extension(principal): Extension<PrincipalContext>,
    Path((store_path, id)): Path<(String, String)>,
) -> axum::response::Response {
    delete_person(staff, principal, store_path, id, Endpoint::Managers).await
}

pub async fn delete_employee(
    Extension(staff): Extension<Arc<StaffService>>,
    Extension(principal): Extension<PrincipalContext>,
    Path((store_path, id)): Path<(String, String)>,
) -> axum::response::Response {
    delete_person(staff, principal, store_path, id, Endpoint::Employees).await
}

async fn list_people(
    staff: Arc<StaffService>,
    principal: PrincipalContext,
    store_path: String,
    deep: bool,
    role: Option<Role>,
) -> axum::response::Response {
    let target = match errors::parse_store_path(&store_path) {
        Ok(t) => t,
        Err(resp) => return resp,
    };

    match staff.list_people(principal.principal(), &target, deep, role).await {
        Ok(people) => (StatusCode::OK, Json(dto::people_to_json(people))).into_response(),
        Err(e) => errors::staff_error_to_response(e),
    }
}

async fn create_person(
    staff: Arc<StaffService>,
    principal: PrincipalContext,
    store_path: String,
    endpoint: Endpoint,
    body: Result<Json<PersonDraft>, JsonRejection>,
) -> axum::response::Response {
    let target = match errors::parse_store_path(&store_path) {
        Ok(t) => t,
        Err(resp) => return resp,
    };
    let Json(draft) = match body {
        Ok(b) => b,
        Err(rejection) => return errors::bad_body(rejection),
    };

    match staff.create_person(principal.principal(), &target, endpoint, draft).await {
        Ok(created) => (StatusCode::CREATED, Json(dto::person_to_json(created))).into_response(),
        Err(e) => errors::staff_error_to_response(e),
    }
}

async fn get_person(
    staff: Arc<StaffService>,
    principal: PrincipalContext,
    store_path: String,
    id: String,
    endpoint: Endpoint,
) -> axum::response::Response {
    let (target, id) = match (errors::parse_store_path(&store_path), errors::parse_person_id(&id)) {
        (Ok(t), Ok(id)) => (t, id),
        (Err(resp), _) | (_, Err(resp)) => return resp,
    };

    match staff.get_person(principal.principal(), &target, endpoint, id).await {
        Ok(person) => (StatusCode::OK, Json(dto::person_to_json(person))).into_response(),
        Err(e) => errors::staff_error_to_response(e),
    }
}

async fn update_person(
    staff: Arc<StaffService>,
    principal: PrincipalContext,
    store_path: String,
    id: String,
    endpoint: Endpoint,
    body: Result<Json<PersonPatch>, JsonRejection>,
) -> axum::response::Response {
    let (target, id) = match (errors::parse_store_path(&store_path), errors::parse_person_id(&id)) {
        (Ok(t), Ok(id)) => (t, id),
        (Err(resp), _) | (_, Err(resp)) => return resp,
    };
    let Json(patch) = match body {
        Ok(b) => b,
        Err(rejection) => return errors::bad_body(rejection),
    };

    match staff
        .update_person(principal.principal(), &target, endpoint, id, patch)
        .await
    {
        Ok(updated) => (StatusCode::OK, Json(dto::person_to_json(updated))).into_response(),
        Err(e) => errors::staff_error_to_response(e),
    }
}

async fn delete_person(
    staff: Arc<StaffService>,
    principal: PrincipalContext,
    store_path: String,
    id: String,
    endpoint: Endpoint,
) -> axum::response::Response {
    let (target, id) = match (errors::parse_store_path(&store_path), errors::parse_person_id(&id)) {
        (Ok(t), Ok(id)) => (t, id),
        (Err(resp), _) | (_, Err(resp)) => return resp,
    };

    match staff.delete_person(principal.principal(), &target, endpoint, id).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => errors::staff_error_to_response(e),
    }
}
