use crate::{
    api::{
        response::{ApiJson, Deleted, ListBody},
        state::AppState,
    },
    core::{
        access::PartyFilter,
        auth::Principal,
        pagination::PageQuery,
        transaction::{self, NewTransaction, TransactionPatch},
    },
    entities::TransactionModel,
    errors::Result,
};
use axum::{
    Extension, Json,
    extract::{Path, Query, State},
};

/// `GET /transactions?user_id=current` lists the caller's sales,
/// `customer_id=current` their purchases. Other filters are admin only.
pub async fn list(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Query(filter): Query<PartyFilter>,
    Query(page): Query<PageQuery>,
) -> Result<ListBody<TransactionModel>> {
    let request = page.resolve(&state.settings.pagination);
    let page = transaction::list_transactions(state.db(), &principal, &filter, request).await?;
    Ok(ListBody::new("transaction_items", page))
}

pub async fn get(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(transaction_id): Path<String>,
    Query(filter): Query<PartyFilter>,
) -> Result<Json<TransactionModel>> {
    let found =
        transaction::get_transaction(state.db(), &principal, &transaction_id, &filter).await?;
    Ok(Json(found))
}

pub async fn create(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    ApiJson(input): ApiJson<NewTransaction>,
) -> Result<Json<TransactionModel>> {
    let created = transaction::create_transaction(state.db(), &principal, input).await?;
    Ok(Json(created))
}

pub async fn update(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(transaction_id): Path<String>,
    ApiJson(patch): ApiJson<TransactionPatch>,
) -> Result<Json<TransactionModel>> {
    let updated =
        transaction::update_transaction(state.db(), &principal, &transaction_id, patch).await?;
    Ok(Json(updated))
}

pub async fn delete(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(transaction_id): Path<String>,
) -> Result<Json<Deleted>> {
    transaction::delete_transaction(state.db(), &principal, &transaction_id).await?;
    Ok(Json(Deleted::ONE))
}
