use crate::{
    api::{
        handlers::OwnerFilter,
        response::{ApiJson, Deleted, ListBody},
        state::AppState,
    },
    core::{
        auth::Principal,
        pagination::PageQuery,
        withdrawal::{self, NewWithdrawal, WithdrawalPatch, WithdrawalReceipt},
    },
    entities::WithdrawalModel,
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
) -> Result<ListBody<WithdrawalModel>> {
    let request = page.resolve(&state.settings.pagination);
    let page =
        withdrawal::list_withdrawals(state.db(), &principal, filter.owner(), request).await?;
    Ok(ListBody::new("withdrawal_items", page))
}

pub async fn get(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(withdrawal_id): Path<String>,
) -> Result<Json<WithdrawalModel>> {
    let found = withdrawal::get_withdrawal(state.db(), &principal, &withdrawal_id).await?;
    Ok(Json(found))
}

/// Debits the balance using the configured ledger mode.
///
/// A two-step withdrawal whose debit failed still answers 200; the receipt
/// carries `balance_updated: false` and a message.
pub async fn create(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    ApiJson(input): ApiJson<NewWithdrawal>,
) -> Result<Json<WithdrawalReceipt>> {
    let mode = state.settings.ledger.mode;
    let receipt = withdrawal::create_withdrawal(state.db(), &principal, input, mode).await?;
    Ok(Json(receipt))
}

pub async fn update(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(withdrawal_id): Path<String>,
    ApiJson(patch): ApiJson<WithdrawalPatch>,
) -> Result<Json<WithdrawalModel>> {
    let updated =
        withdrawal::update_withdrawal(state.db(), &principal, &withdrawal_id, patch).await?;
    Ok(Json(updated))
}

pub async fn delete(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(withdrawal_id): Path<String>,
) -> Result<Json<Deleted>> {
    withdrawal::delete_withdrawal(state.db(), &principal, &withdrawal_id).await?;
    Ok(Json(Deleted::ONE))
}
