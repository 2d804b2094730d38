use crate::{
    api::{
        handlers::{OwnerFilter, SharedRead},
        response::{ApiJson, Deleted, ListBody},
        state::AppState,
    },
    core::{
        auth::Principal,
        pagination::PageQuery,
        address::{self, NewAddress, AddressPatch},
    },
    entities::AddressModel,
    errors::Result,
};
use axum::{
    Extension, Json,
    extract::{Path, Query, State},
};

pub async fn list(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Query(filter): Query<OwnerFilter>,
    Query(page): Query<PageQuery>,
) -> Result<ListBody<AddressModel>> {
    let request = page.resolve(&state.settings.pagination);
    let page = address::list_addresses(state.db(), &principal, filter.owner(), request).await?;
    Ok(ListBody::new("address_items", page))
}

pub async fn get(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(address_id): Path<String>,
    Query(read): Query<SharedRead>,
) -> Result<Json<AddressModel>> {
    let found = address::get_address(state.db(), &principal, &address_id, read.is_shared()).await?;
    Ok(Json(found))
}

pub async fn create(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    ApiJson(input): ApiJson<NewAddress>,
) -> Result<Json<AddressModel>> {
    let created = address::create_address(state.db(), &principal, input).await?;
    Ok(Json(created))
}

pub async fn update(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(address_id): Path<String>,
    ApiJson(patch): ApiJson<AddressPatch>,
) -> Result<Json<AddressModel>> {
    let updated = address::update_address(state.db(), &principal, &address_id, patch).await?;
    Ok(Json(updated))
}

/// Soft remove: marks the record inactive.
pub async fn remove(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(address_id): Path<String>,
) -> Result<Json<AddressModel>> {
    let removed = address::remove_address(state.db(), &principal, &address_id).await?;
    Ok(Json(removed))
}

pub async fn delete(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(address_id): Path<String>,
) -> Result<Json<Deleted>> {
    address::delete_address(state.db(), &principal, &address_id).await?;
    Ok(Json(Deleted::ONE))
}
