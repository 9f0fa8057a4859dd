use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use tracing::instrument;

use crate::{error::ApiError, state::AppState};

use super::dto::{CreateUserRequest, CreatedUserResponse, PublicUser, UpdateUserRequest};

pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/users", get(list_users).post(create_user))
        .route(
            "/users/:id",
            get(get_user).put(update_user).delete(delete_user),
        )
}

/// POST /users -> 201 with `Location: /users/{id}`
#[instrument(skip(state, payload))]
pub async fn create_user(
    State(state): State<AppState>,
    Json(payload): Json<CreateUserRequest>,
) -> Result<Response, ApiError> {
    let id = state.users.create_user(payload).await?;

    Ok((
        StatusCode::CREATED,
        [(header::LOCATION, format!("/users/{id}"))],
        Json(CreatedUserResponse { id }),
    )
        .into_response())
}

#[instrument(skip(state))]
pub async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response, ApiError> {
    match state.users.get_user_by_id(&id).await? {
        Some(user) => Ok(Json(PublicUser::from(user)).into_response()),
        None => Ok(StatusCode::NOT_FOUND.into_response()),
    }
}

#[instrument(skip(state))]
pub async fn list_users(State(state): State<AppState>) -> Result<Json<Vec<PublicUser>>, ApiError> {
    let users = state.users.list_users().await?;
    Ok(Json(users.into_iter().map(PublicUser::from).collect()))
}

/// Always 204, whether or not the user existed.
#[instrument(skip(state, payload))]
pub async fn update_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(payload): Json<UpdateUserRequest>,
) -> Result<StatusCode, ApiError> {
    state.users.update_user_by_id(&id, payload).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Always 204, whether or not the user existed.
#[instrument(skip(state))]
pub async fn delete_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    state.users.delete_by_id(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}
