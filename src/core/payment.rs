//! Payment records attached to transactions.
//!
//! Owners read all of their payments regardless of status and may edit one
//! while it is still pending. Hard delete is reserved to admins.

use crate::{
    core::{
        access::{
            ACTIVE_STATUS, OwnedAction, OwnedPermission, OwnedRecord, PAYMENT_POLICY,
            authorize_owned,
        },
        auth::Principal,
        new_id,
        pagination::{Page, PageRequest, fetch_page},
        user::resolve_owner,
    },
    entities::{Payment, PaymentColumn, PaymentModel, payment},
    errors::{Error, Result},
};
use sea_orm::{Set, prelude::*};
use serde::Deserialize;
use tracing::info;

#[derive(Debug, Clone, Deserialize)]
pub struct NewPayment {
    /// Owner username; only read for admin callers
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub status: Option<i32>,
    pub amount: f64,
    pub method: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PaymentPatch {
    pub status: Option<i32>,
    pub amount: Option<f64>,
    pub method: Option<String>,
}

fn validate_status(status: i32) -> Result<()> {
    if !(1..=3).contains(&status) {
        return Err(Error::validation("payment status must be 1, 2 or 3"));
    }
    Ok(())
}

fn validate_amount(amount: f64) -> Result<()> {
    if !amount.is_finite() {
        return Err(Error::InvalidAmount { amount });
    }
    Ok(())
}

fn validate_method(method: &str) -> Result<()> {
    let len = method.trim().chars().count();
    if len == 0 || len > 100 {
        return Err(Error::validation("payment method must be 1 to 100 characters"));
    }
    Ok(())
}

async fn find_existing<C: ConnectionTrait>(db: &C, payment_id: &str) -> Result<PaymentModel> {
    Payment::find_by_id(payment_id.to_string())
        .one(db)
        .await?
        .ok_or_else(|| Error::not_found("payment", payment_id))
}

const fn record(payment: &PaymentModel) -> OwnedRecord<'_> {
    OwnedRecord {
        owner: payment.user_id.as_str(),
        status: payment.status,
    }
}

pub async fn create_payment<C: ConnectionTrait>(
    db: &C,
    principal: &Principal,
    input: NewPayment,
) -> Result<PaymentModel> {
    let status = input.status.unwrap_or(ACTIVE_STATUS);
    validate_status(status)?;
    validate_amount(input.amount)?;
    validate_method(&input.method)?;

    let permission = authorize_owned(principal, PAYMENT_POLICY, OwnedAction::Create)?;
    let owner = resolve_owner(db, permission, input.user_id.as_deref()).await?;

    let now = chrono::Utc::now();
    let model = payment::ActiveModel {
        payment_id: Set(new_id()),
        user_id: Set(owner),
        status: Set(status),
        amount: Set(input.amount),
        method: Set(input.method.trim().to_string()),
        created_at: Set(now),
        updated_at: Set(now),
    };

    let created = model.insert(db).await?;
    info!(payment_id = %created.payment_id, owner = %created.user_id, "payment created");
    Ok(created)
}

pub async fn get_payment<C: ConnectionTrait>(
    db: &C,
    principal: &Principal,
    payment_id: &str,
) -> Result<PaymentModel> {
    let payment = find_existing(db, payment_id).await?;
    authorize_owned(
        principal,
        PAYMENT_POLICY,
        OwnedAction::Read {
            record: record(&payment),
            shared: false,
        },
    )?;
    Ok(payment)
}

pub async fn list_payments<C: ConnectionTrait>(
    db: &C,
    principal: &Principal,
    requested_owner: Option<&str>,
    page: PageRequest,
) -> Result<Page<PaymentModel>> {
    let select = match authorize_owned(
        principal,
        PAYMENT_POLICY,
        OwnedAction::List { requested_owner },
    )? {
        OwnedPermission::ListByOwner { owner, .. } => {
            Payment::find().filter(PaymentColumn::UserId.eq(owner))
        }
        _ => Payment::find(),
    };

    fetch_page(db, select, PaymentColumn::CreatedAt, page).await
}

/// Updates a payment. Owners may only edit pending payments.
pub async fn update_payment<C: ConnectionTrait>(
    db: &C,
    principal: &Principal,
    payment_id: &str,
    patch: PaymentPatch,
) -> Result<PaymentModel> {
    let existing = find_existing(db, payment_id).await?;
    authorize_owned(
        principal,
        PAYMENT_POLICY,
        OwnedAction::Update {
            record: record(&existing),
        },
    )?;

    if let Some(status) = patch.status {
        validate_status(status)?;
    }
    if let Some(amount) = patch.amount {
        validate_amount(amount)?;
    }
    if let Some(method) = &patch.method {
        validate_method(method)?;
    }

    let mut model: payment::ActiveModel = existing.into();
    if let Some(status) = patch.status {
        model.status = Set(status);
    }
    if let Some(amount) = patch.amount {
        model.amount = Set(amount);
    }
    if let Some(method) = patch.method {
        model.method = Set(method.trim().to_string());
    }
    model.updated_at = Set(chrono::Utc::now());

    model.update(db).await.map_err(Into::into)
}

pub async fn delete_payment<C: ConnectionTrait>(
    db: &C,
    principal: &Principal,
    payment_id: &str,
) -> Result<()> {
    authorize_owned(principal, PAYMENT_POLICY, OwnedAction::Delete)?;
    let result = Payment::delete_by_id(payment_id.to_string()).exec(db).await?;
    if result.rows_affected == 0 {
        return Err(Error::not_found("payment", payment_id));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::float_cmp)]
    use super::*;
    use crate::test_utils::*;

    #[tokio::test]
    async fn test_owner_reads_settled_payment() -> Result<()> {
        let db = setup_test_db().await?;
        let alice = create_test_user(&db, "alice01").await?;
        let payment = create_test_payment(&db, &alice.user_id, 120.0).await?;

        let settled = update_payment(
            &db,
            &admin_principal(),
            &payment.payment_id,
            PaymentPatch {
                status: Some(2),
                ..PaymentPatch::default()
            },
        )
        .await?;
        assert_eq!(settled.status, 2);

        let seen = get_payment(&db, &principal_of(&alice), &payment.payment_id).await?;
        assert_eq!(seen.amount, 120.0);

        // No longer pending: the owner cannot edit it
        let result = update_payment(
            &db,
            &principal_of(&alice),
            &payment.payment_id,
            PaymentPatch {
                amount: Some(1.0),
                ..PaymentPatch::default()
            },
        )
        .await;
        assert!(matches!(result, Err(Error::Forbidden { message: _ })));
        Ok(())
    }

    #[tokio::test]
    async fn test_payment_hidden_from_other_users() -> Result<()> {
        let db = setup_test_db().await?;
        let alice = create_test_user(&db, "alice01").await?;
        let bob = create_test_user(&db, "bobby01").await?;
        let payment = create_test_payment(&db, &alice.user_id, 50.0).await?;

        let result = get_payment(&db, &principal_of(&bob), &payment.payment_id).await;
        assert!(matches!(result, Err(Error::Forbidden { message: _ })));

        let page = PageRequest {
            offset: 0,
            limit: 10,
        };
        let listed = list_payments(&db, &principal_of(&bob), Some(&alice.user_id), page).await?;
        assert_eq!(listed.total_count, 0);
        Ok(())
    }

    #[tokio::test]
    async fn test_payment_validation() -> Result<()> {
        let db = setup_test_db().await?;
        let alice = create_test_user(&db, "alice01").await?;

        let result = create_payment(
            &db,
            &principal_of(&alice),
            NewPayment {
                user_id: None,
                status: Some(4),
                amount: 10.0,
                method: "card".to_string(),
            },
        )
        .await;
        assert!(matches!(result, Err(Error::Validation { message: _ })));

        let result = create_payment(
            &db,
            &principal_of(&alice),
            NewPayment {
                user_id: None,
                status: None,
                amount: f64::INFINITY,
                method: "card".to_string(),
            },
        )
        .await;
        assert!(matches!(result, Err(Error::InvalidAmount { amount: _ })));
        Ok(())
    }
}
