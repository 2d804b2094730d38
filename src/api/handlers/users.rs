use crate::{
    api::{
        response::{ApiJson, Deleted, ListBody},
        state::AppState,
    },
    core::{
        auth::Principal,
        pagination::PageQuery,
        user::{self, NewUser, UserPatch},
    },
    entities::UserModel,
    errors::Result,
};
use axum::{
    Extension, Json,
    extract::{Path, Query, State},
};

/// `GET /users/me`
pub async fn me(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
) -> Result<Json<UserModel>> {
    let found = user::get_user(state.db(), &principal, &principal.user_id).await?;
    Ok(Json(found))
}

pub async fn list(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Query(page): Query<PageQuery>,
) -> Result<ListBody<UserModel>> {
    let request = page.resolve(&state.settings.pagination);
    let page = user::list_users(state.db(), &principal, request).await?;
    Ok(ListBody::new("user_items", page))
}

pub async fn get(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(user_id): Path<String>,
) -> Result<Json<UserModel>> {
    let found = user::get_user(state.db(), &principal, &user_id).await?;
    Ok(Json(found))
}

pub async fn create(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    ApiJson(input): ApiJson<NewUser>,
) -> Result<Json<UserModel>> {
    let created = user::create_user(state.db(), &principal, input).await?;
    Ok(Json(created))
}

pub async fn update(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(user_id): Path<String>,
    ApiJson(patch): ApiJson<UserPatch>,
) -> Result<Json<UserModel>> {
    let updated = user::update_user(state.db(), &principal, &user_id, patch).await?;
    Ok(Json(updated))
}

pub async fn delete(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(user_id): Path<String>,
) -> Result<Json<Deleted>> {
    user::delete_user(state.db(), &principal, &user_id).await?;
    Ok(Json(Deleted::ONE))
}
