use crate::{
    api::{
        handlers::OwnerFilter,
        response::{ApiJson, Deleted, ListBody},
        state::AppState,
    },
    core::{
        auth::Principal,
        pagination::PageQuery,
        payment::{self, NewPayment, PaymentPatch},
    },
    entities::PaymentModel,
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
) -> Result<ListBody<PaymentModel>> {
    let request = page.resolve(&state.settings.pagination);
    let page = payment::list_payments(state.db(), &principal, filter.owner(), request).await?;
    Ok(ListBody::new("payment_items", page))
}

pub async fn get(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(payment_id): Path<String>,
) -> Result<Json<PaymentModel>> {
    let found = payment::get_payment(state.db(), &principal, &payment_id).await?;
    Ok(Json(found))
}

pub async fn create(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    ApiJson(input): ApiJson<NewPayment>,
) -> Result<Json<PaymentModel>> {
    let created = payment::create_payment(state.db(), &principal, input).await?;
    Ok(Json(created))
}

pub async fn update(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(payment_id): Path<String>,
    ApiJson(patch): ApiJson<PaymentPatch>,
) -> Result<Json<PaymentModel>> {
    let updated = payment::update_payment(state.db(), &principal, &payment_id, patch).await?;
    Ok(Json(updated))
}

pub async fn delete(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(payment_id): Path<String>,
) -> Result<Json<Deleted>> {
    payment::delete_payment(state.db(), &principal, &payment_id).await?;
    Ok(Json(Deleted::ONE))
}
