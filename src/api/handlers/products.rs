use crate::{
    api::{
        handlers::{OwnerFilter, SharedRead},
        response::{ApiJson, Deleted, ListBody},
        state::AppState,
    },
    core::{
        auth::Principal,
        pagination::PageQuery,
        product::{self, NewProduct, ProductPatch},
    },
    entities::ProductModel,
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
) -> Result<ListBody<ProductModel>> {
    let request = page.resolve(&state.settings.pagination);
    let page = product::list_products(state.db(), &principal, filter.owner(), request).await?;
    Ok(ListBody::new("product_items", page))
}

pub async fn get(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(product_id): Path<String>,
    Query(read): Query<SharedRead>,
) -> Result<Json<ProductModel>> {
    let found = product::get_product(state.db(), &principal, &product_id, read.is_shared()).await?;
    Ok(Json(found))
}

pub async fn create(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    ApiJson(input): ApiJson<NewProduct>,
) -> Result<Json<ProductModel>> {
    let created = product::create_product(state.db(), &principal, input).await?;
    Ok(Json(created))
}

pub async fn update(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(product_id): Path<String>,
    ApiJson(patch): ApiJson<ProductPatch>,
) -> Result<Json<ProductModel>> {
    let updated = product::update_product(state.db(), &principal, &product_id, patch).await?;
    Ok(Json(updated))
}

/// Soft remove: marks the record inactive.
pub async fn remove(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(product_id): Path<String>,
) -> Result<Json<ProductModel>> {
    let removed = product::remove_product(state.db(), &principal, &product_id).await?;
    Ok(Json(removed))
}

pub async fn delete(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(product_id): Path<String>,
) -> Result<Json<Deleted>> {
    product::delete_product(state.db(), &principal, &product_id).await?;
    Ok(Json(Deleted::ONE))
}
