//! Balance ledger - Withdrawals debited from a user's balance.
//!
//! Two ledger modes exist. [`LedgerMode::Atomic`] runs a conditional
//! decrement and the insert in one database transaction, so concurrent
//! withdrawals cannot overdraw. [`LedgerMode::TwoStep`] inserts the
//! withdrawal and then writes `read_balance - amount` separately; a failed
//! second write is reported on the receipt instead of failing the request,
//! and two racing withdrawals can both pass the balance check.

use crate::{
    core::{
        access::{
            ACTIVE_STATUS, OwnedAction, OwnedPermission, OwnedRecord, WITHDRAWAL_POLICY,
            authorize_owned,
        },
        auth::Principal,
        new_id,
        pagination::{Page, PageRequest, fetch_page},
        patch::Patch,
        user::resolve_owner,
    },
    entities::{User, UserColumn, Withdrawal, WithdrawalColumn, WithdrawalModel, withdrawal},
    errors::{Error, Result},
};
use sea_orm::{Set, TransactionTrait, prelude::*};
use serde::{Deserialize, Serialize};
use tracing::{error, info, instrument, warn};

/// How a withdrawal debits the balance.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LedgerMode {
    /// Conditional decrement inside one database transaction
    #[default]
    Atomic,
    /// Insert, then overwrite the balance with the value read beforehand
    TwoStep,
}

/// Payload for a new withdrawal.
#[derive(Debug, Clone, Deserialize)]
pub struct NewWithdrawal {
    /// Target username; only read for admin callers
    #[serde(default)]
    pub user_id: Option<String>,
    pub amount: f64,
    #[serde(default)]
    pub status: Option<i32>,
    pub method: String,
    #[serde(default)]
    pub account: Option<String>,
}

/// Admin update of a withdrawal. The amount and owner are fixed.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct WithdrawalPatch {
    pub status: Option<i32>,
    pub method: Option<String>,
    pub account: Patch<String>,
}

/// Outcome of a withdrawal request.
#[derive(Debug, Clone, Serialize)]
pub struct WithdrawalReceipt {
    pub withdrawal: WithdrawalModel,
    /// `false` when the withdrawal was stored but the balance was not debited
    pub balance_updated: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

fn validate_amount(amount: f64) -> Result<()> {
    if !amount.is_finite() || amount <= 0.0 {
        return Err(Error::InvalidAmount { amount });
    }
    Ok(())
}

fn validate_status(status: i32) -> Result<()> {
    if !(1..=3).contains(&status) {
        return Err(Error::validation("withdrawal status must be 1, 2 or 3"));
    }
    Ok(())
}

fn validate_method(method: &str) -> Result<()> {
    let len = method.trim().chars().count();
    if len == 0 || len > 100 {
        return Err(Error::validation(
            "withdrawal method must be 1 to 100 characters",
        ));
    }
    Ok(())
}

impl NewWithdrawal {
    fn validate(&self) -> Result<()> {
        validate_amount(self.amount)?;
        if let Some(status) = self.status {
            validate_status(status)?;
        }
        validate_method(&self.method)
    }

    fn into_record(self, user_id: String) -> WithdrawalModel {
        let now = chrono::Utc::now();
        WithdrawalModel {
            withdrawal_id: new_id(),
            user_id,
            amount: self.amount,
            status: self.status.unwrap_or(ACTIVE_STATUS),
            method: self.method.trim().to_string(),
            account: self.account,
            created_at: now,
            updated_at: now,
        }
    }
}

fn to_active(record: &WithdrawalModel) -> withdrawal::ActiveModel {
    withdrawal::ActiveModel {
        withdrawal_id: Set(record.withdrawal_id.clone()),
        user_id: Set(record.user_id.clone()),
        amount: Set(record.amount),
        status: Set(record.status),
        method: Set(record.method.clone()),
        account: Set(record.account.clone()),
        created_at: Set(record.created_at),
        updated_at: Set(record.updated_at),
    }
}

const fn record(withdrawal: &WithdrawalModel) -> OwnedRecord<'_> {
    OwnedRecord {
        owner: withdrawal.user_id.as_str(),
        status: withdrawal.status,
    }
}

/// Creates a withdrawal and debits the target user's balance.
///
/// Admins name the target user by username; everyone else withdraws from
/// their own balance.
///
/// # Errors
/// Returns an error if:
/// - The amount is not finite or not positive, or status/method are invalid
/// - The named user does not exist
/// - The balance is lower than the amount (nothing is written)
/// - The database write fails (in two-step mode only the insert can fail the request)
#[instrument(skip(db, input), fields(caller = %principal.user_id, amount = input.amount))]
pub async fn create_withdrawal(
    db: &DatabaseConnection,
    principal: &Principal,
    input: NewWithdrawal,
    mode: LedgerMode,
) -> Result<WithdrawalReceipt> {
    input.validate()?;
    let permission = authorize_owned(principal, WITHDRAWAL_POLICY, OwnedAction::Create)?;
    let target = resolve_owner(db, permission, input.user_id.as_deref()).await?;
    let record = input.into_record(target);

    match mode {
        LedgerMode::Atomic => withdraw_atomic(db, record).await,
        LedgerMode::TwoStep => withdraw_two_step(db, record).await,
    }
}

async fn withdraw_atomic(
    db: &DatabaseConnection,
    record: WithdrawalModel,
) -> Result<WithdrawalReceipt> {
    let amount = record.amount;
    let txn = db.begin().await?;

    // Write first: a read before the decrement would hold a shared lock that
    // a second writer can never upgrade past
    let debit = User::update_many()
        .col_expr(UserColumn::Balance, Expr::col(UserColumn::Balance).sub(amount))
        .col_expr(UserColumn::UpdatedAt, Expr::value(record.created_at))
        .filter(UserColumn::UserId.eq(record.user_id.as_str()))
        .filter(UserColumn::Balance.gte(amount))
        .exec(&txn)
        .await?;

    let user = User::find_by_id(record.user_id.clone())
        .one(&txn)
        .await?
        .ok_or_else(|| Error::not_found("user", &record.user_id))?;

    if debit.rows_affected == 0 {
        // Dropping the transaction rolls it back
        return Err(Error::InsufficientFunds {
            current: user.balance,
            required: amount,
        });
    }

    let created = to_active(&record).insert(&txn).await?;
    txn.commit().await?;

    info!(
        withdrawal_id = %created.withdrawal_id,
        user_id = %created.user_id,
        remaining = user.balance,
        "withdrawal created"
    );
    Ok(WithdrawalReceipt {
        withdrawal: created,
        balance_updated: true,
        message: None,
    })
}

async fn withdraw_two_step(
    db: &DatabaseConnection,
    record: WithdrawalModel,
) -> Result<WithdrawalReceipt> {
    let amount = record.amount;
    let user = User::find_by_id(record.user_id.clone())
        .one(db)
        .await?
        .ok_or_else(|| Error::not_found("user", &record.user_id))?;

    if user.balance < amount {
        return Err(Error::InsufficientFunds {
            current: user.balance,
            required: amount,
        });
    }

    Withdrawal::insert(to_active(&record)).exec(db).await?;

    let new_balance = user.balance - amount;
    let debit = User::update_many()
        .col_expr(UserColumn::Balance, Expr::value(new_balance))
        .col_expr(UserColumn::UpdatedAt, Expr::value(chrono::Utc::now()))
        .filter(UserColumn::UserId.eq(record.user_id.as_str()))
        .exec(db)
        .await;

    match debit {
        Ok(result) if result.rows_affected > 0 => {
            info!(
                withdrawal_id = %record.withdrawal_id,
                user_id = %record.user_id,
                remaining = new_balance,
                "withdrawal created"
            );
            Ok(WithdrawalReceipt {
                withdrawal: record,
                balance_updated: true,
                message: None,
            })
        }
        outcome => {
            match outcome {
                Err(e) => error!(
                    withdrawal_id = %record.withdrawal_id,
                    user_id = %record.user_id,
                    "balance update failed after withdrawal insert: {e}"
                ),
                Ok(_) => warn!(
                    withdrawal_id = %record.withdrawal_id,
                    user_id = %record.user_id,
                    "balance update matched no user row after withdrawal insert"
                ),
            }
            warn!(withdrawal_id = %record.withdrawal_id, "returning degraded withdrawal receipt");
            Ok(WithdrawalReceipt {
                withdrawal: record,
                balance_updated: false,
                message: Some("withdrawal created but balance update failed".to_string()),
            })
        }
    }
}

async fn find_existing(db: &DatabaseConnection, withdrawal_id: &str) -> Result<WithdrawalModel> {
    Withdrawal::find_by_id(withdrawal_id.to_string())
        .one(db)
        .await?
        .ok_or_else(|| Error::not_found("withdrawal", withdrawal_id))
}

/// Reads one withdrawal. Owners and admins only.
pub async fn get_withdrawal(
    db: &DatabaseConnection,
    principal: &Principal,
    withdrawal_id: &str,
) -> Result<WithdrawalModel> {
    let withdrawal = find_existing(db, withdrawal_id).await?;
    authorize_owned(
        principal,
        WITHDRAWAL_POLICY,
        OwnedAction::Read {
            record: record(&withdrawal),
            shared: false,
        },
    )?;
    Ok(withdrawal)
}

/// Lists withdrawals visible to the caller, newest first.
pub async fn list_withdrawals(
    db: &DatabaseConnection,
    principal: &Principal,
    requested_owner: Option<&str>,
    page: PageRequest,
) -> Result<Page<WithdrawalModel>> {
    let select = match authorize_owned(
        principal,
        WITHDRAWAL_POLICY,
        OwnedAction::List { requested_owner },
    )? {
        OwnedPermission::ListByOwner { owner, .. } => {
            Withdrawal::find().filter(WithdrawalColumn::UserId.eq(owner))
        }
        _ => Withdrawal::find(),
    };

    fetch_page(db, select, WithdrawalColumn::CreatedAt, page).await
}

/// Updates status, method or account. Admin only; the balance is not touched.
pub async fn update_withdrawal(
    db: &DatabaseConnection,
    principal: &Principal,
    withdrawal_id: &str,
    patch: WithdrawalPatch,
) -> Result<WithdrawalModel> {
    let existing = find_existing(db, withdrawal_id).await?;
    authorize_owned(
        principal,
        WITHDRAWAL_POLICY,
        OwnedAction::Update {
            record: record(&existing),
        },
    )?;

    if let Some(status) = patch.status {
        validate_status(status)?;
    }
    if let Some(method) = &patch.method {
        validate_method(method)?;
    }

    let mut model: withdrawal::ActiveModel = existing.into();
    if let Some(status) = patch.status {
        model.status = Set(status);
    }
    if let Some(method) = patch.method {
        model.method = Set(method.trim().to_string());
    }
    if let Some(account) = patch.account.into_nullable() {
        model.account = Set(account);
    }
    model.updated_at = Set(chrono::Utc::now());

    model.update(db).await.map_err(Into::into)
}

/// Hard-deletes a withdrawal. Admin only; the balance is not refunded.
pub async fn delete_withdrawal(
    db: &DatabaseConnection,
    principal: &Principal,
    withdrawal_id: &str,
) -> Result<()> {
    authorize_owned(principal, WITHDRAWAL_POLICY, OwnedAction::Delete)?;
    let result = Withdrawal::delete_by_id(withdrawal_id.to_string())
        .exec(db)
        .await?;
    if result.rows_affected == 0 {
        return Err(Error::not_found("withdrawal", withdrawal_id));
    }
    Ok(())
}
