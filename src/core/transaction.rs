//! Transaction lifecycle - Escrow records between a seller and a buyer.
//!
//! Creation resolves the seller and buyer usernames to stable ids, checks every
//! referenced record and stores the transaction with `status = 1` unless
//! another stage is given. Updates are sparse: only keys present in the
//! payload are written, with one exception. `delivered_at` is set when given
//! and cleared otherwise, so a client that omits it erases a recorded
//! delivery time.
//!
//! Either party may update a transaction and no field is restricted by role,
//! so a buyer can rewrite `fee` or `status`. Only admins delete.

use crate::{
    core::{
        access::{
            PartyFilter, Parties, TransactionAction, TransactionPermission,
            authorize_transaction,
        },
        auth::Principal,
        new_id,
        pagination::{Page, PageRequest, fetch_page},
        patch::Patch,
        references::{ReferenceSet, validate_references},
    },
    entities::{Transaction, TransactionColumn, TransactionModel, transaction},
    errors::{Error, ReferenceField, Result},
};
use sea_orm::{ActiveValue, Set, prelude::*};
use serde::Deserialize;
use tracing::{info, instrument};

/// Stage a new transaction starts in.
pub const INITIAL_STATUS: i32 = 1;

/// Payload for a new transaction.
///
/// `user_id` and `customer_id` carry usernames; they are stored as the
/// resolved user ids.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct NewTransaction {
    /// Seller username. Checked when given, but only admins choose the seller.
    pub user_id: Option<String>,
    /// Buyer username
    pub customer_id: Option<String>,
    pub status: Option<i32>,
    #[serde(rename = "type")]
    pub kind: Option<i32>,
    pub product_id: Option<String>,
    pub product_number: Option<i32>,
    pub address_id: Option<String>,
    pub payment_id: Option<String>,
    pub shipping: Option<String>,
    pub shipping_price: Option<f64>,
    pub shipping_number: Option<String>,
    pub shipping_details: Option<String>,
    pub shipping_image_id: Option<String>,
    pub delivered_at: Option<DateTimeUtc>,
    pub delivered_details: Option<String>,
    pub fee: Option<f64>,
    pub fee_type: Option<i32>,
}

/// Sparse transaction update.
///
/// The parties and the id are immutable and are not part of the patch.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct TransactionPatch {
    pub status: Patch<i32>,
    #[serde(rename = "type")]
    pub kind: Patch<i32>,
    pub product_id: Patch<String>,
    pub product_number: Patch<i32>,
    pub address_id: Patch<String>,
    pub payment_id: Patch<String>,
    pub shipping: Patch<String>,
    pub shipping_price: Patch<f64>,
    pub shipping_number: Patch<String>,
    pub shipping_details: Patch<String>,
    pub shipping_image_id: Patch<String>,
    /// Set when given, cleared when absent or null
    pub delivered_at: Patch<DateTimeUtc>,
    pub delivered_details: Patch<String>,
    pub fee: Patch<f64>,
    pub fee_type: Patch<i32>,
}

fn check_status(status: i32) -> Result<()> {
    if !(1..=6).contains(&status) {
        return Err(Error::validation(format!(
            "status must be between 1 and 6, got {status}"
        )));
    }
    Ok(())
}

fn check_kind(kind: i32) -> Result<()> {
    if !(1..=2).contains(&kind) {
        return Err(Error::validation(format!("type must be 1 or 2, got {kind}")));
    }
    Ok(())
}

fn check_fee_type(fee_type: i32) -> Result<()> {
    if !(1..=3).contains(&fee_type) {
        return Err(Error::validation(format!(
            "fee_type must be 1, 2 or 3, got {fee_type}"
        )));
    }
    Ok(())
}

fn check_product_number(product_number: i32) -> Result<()> {
    if product_number < 0 {
        return Err(Error::validation("product_number cannot be negative"));
    }
    Ok(())
}

fn check_money(amount: f64) -> Result<()> {
    if !amount.is_finite() {
        return Err(Error::InvalidAmount { amount });
    }
    Ok(())
}

impl NewTransaction {
    fn validate(&self) -> Result<()> {
        check_status(self.status.unwrap_or(INITIAL_STATUS))?;
        check_kind(
            self.kind
                .ok_or_else(|| Error::validation("type is required"))?,
        )?;
        if let Some(fee_type) = self.fee_type {
            check_fee_type(fee_type)?;
        }
        if let Some(product_number) = self.product_number {
            check_product_number(product_number)?;
        }
        for amount in [self.shipping_price, self.fee].into_iter().flatten() {
            check_money(amount)?;
        }
        Ok(())
    }
}

/// An empty reference id means "no reference".
fn blank_as_null(patch: Patch<String>) -> Patch<String> {
    match patch {
        Patch::Value(id) if id.is_empty() => Patch::Null,
        other => other,
    }
}

fn stage_nullable<T>(slot: &mut ActiveValue<Option<T>>, patch: Patch<T>)
where
    Option<T>: Into<Value>,
{
    if let Some(value) = patch.into_nullable() {
        *slot = Set(value);
    }
}

impl TransactionPatch {
    fn validate(&self) -> Result<()> {
        match &self.status {
            Patch::Null => return Err(Error::validation("status cannot be null")),
            Patch::Value(status) => check_status(*status)?,
            Patch::Absent => {}
        }
        match &self.kind {
            Patch::Null => return Err(Error::validation("type cannot be null")),
            Patch::Value(kind) => check_kind(*kind)?,
            Patch::Absent => {}
        }
        match &self.product_id {
            Patch::Null => return Err(Error::validation("product_id cannot be cleared")),
            Patch::Value(id) if id.is_empty() => {
                return Err(Error::validation("product_id cannot be cleared"));
            }
            _ => {}
        }
        if let Some(fee_type) = self.fee_type.value() {
            check_fee_type(*fee_type)?;
        }
        if let Some(product_number) = self.product_number.value() {
            check_product_number(*product_number)?;
        }
        for amount in [self.shipping_price.value(), self.fee.value()]
            .into_iter()
            .flatten()
        {
            check_money(*amount)?;
        }
        Ok(())
    }

    /// Stages the patch on top of the stored row and refreshes `updated_at`.
    fn apply(self, model: &mut transaction::ActiveModel, now: DateTimeUtc) {
        if let Patch::Value(status) = self.status {
            model.status = Set(status);
        }
        if let Patch::Value(kind) = self.kind {
            model.kind = Set(kind);
        }
        if let Patch::Value(product_id) = self.product_id {
            model.product_id = Set(product_id);
        }
        stage_nullable(&mut model.product_number, self.product_number);
        stage_nullable(&mut model.address_id, blank_as_null(self.address_id));
        stage_nullable(&mut model.payment_id, blank_as_null(self.payment_id));
        stage_nullable(&mut model.shipping, self.shipping);
        stage_nullable(&mut model.shipping_price, self.shipping_price);
        stage_nullable(&mut model.shipping_number, self.shipping_number);
        stage_nullable(&mut model.shipping_details, self.shipping_details);
        stage_nullable(&mut model.shipping_image_id, self.shipping_image_id);
        model.delivered_at = Set(self.delivered_at.into_set_or_clear());
        stage_nullable(&mut model.delivered_details, self.delivered_details);
        stage_nullable(&mut model.fee, self.fee);
        stage_nullable(&mut model.fee_type, self.fee_type);
        model.updated_at = Set(now);
    }
}

const fn parties(transaction: &TransactionModel) -> Parties<'_> {
    Parties {
        seller: transaction.user_id.as_str(),
        buyer: transaction.customer_id.as_str(),
    }
}

async fn find_existing<C: ConnectionTrait>(
    db: &C,
    transaction_id: &str,
) -> Result<TransactionModel> {
    Transaction::find_by_id(transaction_id.to_string())
        .one(db)
        .await?
        .ok_or_else(|| Error::not_found("transaction", transaction_id))
}

/// Creates a transaction.
///
/// Non-admin callers always become the seller. Admins must name the seller
/// by username.
///
/// # Errors
/// Returns an error if:
/// - `status`, `type`, `fee_type` or an amount is out of range, or `type` is missing
/// - A reference does not resolve (`user_error`, `customer_error`, `product_error`,
///   `address_error`, `payment_error`)
/// - The database insert fails
#[instrument(skip(db, input), fields(caller = %principal.user_id))]
pub async fn create_transaction<C: ConnectionTrait>(
    db: &C,
    principal: &Principal,
    input: NewTransaction,
) -> Result<TransactionModel> {
    input.validate()?;
    let permission = authorize_transaction(principal, TransactionAction::Create)?;

    let resolved = validate_references(
        db,
        ReferenceSet {
            user: input.user_id.as_deref(),
            customer: input.customer_id.as_deref(),
            product_id: input.product_id.as_deref(),
            address_id: input.address_id.as_deref(),
            payment_id: input.payment_id.as_deref(),
            creating: true,
        },
    )
    .await?;

    let seller = match permission {
        TransactionPermission::CreateAsSeller(user_id) => user_id,
        _ => resolved.user_id.ok_or(Error::Reference {
            field: ReferenceField::User,
        })?,
    };
    let buyer = resolved.customer_id.ok_or(Error::Reference {
        field: ReferenceField::Customer,
    })?;
    let product_id = input.product_id.ok_or(Error::Reference {
        field: ReferenceField::Product,
    })?;

    let now = chrono::Utc::now();
    let model = transaction::ActiveModel {
        transaction_id: Set(new_id()),
        user_id: Set(seller),
        customer_id: Set(buyer),
        status: Set(input.status.unwrap_or(INITIAL_STATUS)),
        kind: Set(input.kind.unwrap_or_default()),
        product_id: Set(product_id),
        product_number: Set(input.product_number),
        address_id: Set(input.address_id.filter(|id| !id.is_empty())),
        payment_id: Set(input.payment_id.filter(|id| !id.is_empty())),
        shipping: Set(input.shipping),
        shipping_price: Set(input.shipping_price),
        shipping_number: Set(input.shipping_number),
        shipping_details: Set(input.shipping_details),
        shipping_image_id: Set(input.shipping_image_id),
        delivered_at: Set(input.delivered_at),
        delivered_details: Set(input.delivered_details),
        fee: Set(input.fee),
        fee_type: Set(input.fee_type),
        created_at: Set(now),
        updated_at: Set(now),
    };

    let created = model.insert(db).await?;
    info!(
        transaction_id = %created.transaction_id,
        seller = %created.user_id,
        buyer = %created.customer_id,
        "transaction created"
    );
    Ok(created)
}

/// Reads one transaction.
///
/// Non-admin callers must say which side they are on through the filter
/// (`user_id=current` as seller, `customer_id=current` as buyer).
pub async fn get_transaction<C: ConnectionTrait>(
    db: &C,
    principal: &Principal,
    transaction_id: &str,
    filter: &PartyFilter,
) -> Result<TransactionModel> {
    let transaction = find_existing(db, transaction_id).await?;
    authorize_transaction(
        principal,
        TransactionAction::Read {
            filter,
            parties: parties(&transaction),
        },
    )?;
    Ok(transaction)
}

/// Lists transactions for the side selected by the filter, newest first.
pub async fn list_transactions<C: ConnectionTrait>(
    db: &C,
    principal: &Principal,
    filter: &PartyFilter,
    page: PageRequest,
) -> Result<Page<TransactionModel>> {
    let select = match authorize_transaction(principal, TransactionAction::List { filter })? {
        TransactionPermission::ListBySeller(user_id) => {
            Transaction::find().filter(TransactionColumn::UserId.eq(user_id))
        }
        TransactionPermission::ListByBuyer(user_id) => {
            Transaction::find().filter(TransactionColumn::CustomerId.eq(user_id))
        }
        _ => Transaction::find(),
    };

    fetch_page(db, select, TransactionColumn::CreatedAt, page).await
}

/// Applies a sparse update. Last write wins.
///
/// # Errors
/// Returns an error if:
/// - The transaction does not exist
/// - The caller is neither party nor an admin
/// - A field is out of range, or `status`/`type`/`product_id` is cleared
/// - A new product, address or payment reference does not resolve
/// - The database update fails
#[instrument(skip(db, patch), fields(caller = %principal.user_id))]
pub async fn update_transaction<C: ConnectionTrait>(
    db: &C,
    principal: &Principal,
    transaction_id: &str,
    patch: TransactionPatch,
) -> Result<TransactionModel> {
    let existing = find_existing(db, transaction_id).await?;
    authorize_transaction(
        principal,
        TransactionAction::Update {
            parties: parties(&existing),
        },
    )?;
    patch.validate()?;

    validate_references(
        db,
        ReferenceSet {
            product_id: patch.product_id.value().map(String::as_str),
            address_id: patch.address_id.value().map(String::as_str),
            payment_id: patch.payment_id.value().map(String::as_str),
            ..ReferenceSet::default()
        },
    )
    .await?;

    let mut model: transaction::ActiveModel = existing.into();
    patch.apply(&mut model, chrono::Utc::now());
    model.update(db).await.map_err(Into::into)
}

/// Hard-deletes a transaction. Admin only.
pub async fn delete_transaction<C: ConnectionTrait>(
    db: &C,
    principal: &Principal,
    transaction_id: &str,
) -> Result<()> {
    authorize_transaction(principal, TransactionAction::Delete)?;
    let result = Transaction::delete_by_id(transaction_id.to_string())
        .exec(db)
        .await?;
    if result.rows_affected == 0 {
        return Err(Error::not_found("transaction", transaction_id));
    }
    info!(transaction_id, "transaction deleted");
    Ok(())
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::float_cmp)]
    use super::*;
    use crate::core::access::CURRENT;
    use crate::test_utils::*;
    use sea_orm::{DatabaseBackend, MockDatabase};

    fn page() -> PageRequest {
        PageRequest {
            offset: 0,
            limit: 10,
        }
    }

    fn as_seller() -> PartyFilter {
        PartyFilter {
            user_id: Some(CURRENT.to_string()),
            customer_id: None,
        }
    }

    fn as_buyer() -> PartyFilter {
        PartyFilter {
            user_id: None,
            customer_id: Some(CURRENT.to_string()),
        }
    }

    #[tokio::test]
    async fn test_create_transaction_validation() -> Result<()> {
        let db = MockDatabase::new(DatabaseBackend::Sqlite).into_connection();
        let caller = admin_principal();

        let missing_type = NewTransaction::default();
        assert!(matches!(
            create_transaction(&db, &caller, missing_type).await,
            Err(Error::Validation { message: _ })
        ));

        let bad_status = NewTransaction {
            kind: Some(1),
            status: Some(7),
            ..NewTransaction::default()
        };
        assert!(matches!(
            create_transaction(&db, &caller, bad_status).await,
            Err(Error::Validation { message: _ })
        ));

        let bad_fee_type = NewTransaction {
            kind: Some(2),
            fee_type: Some(4),
            ..NewTransaction::default()
        };
        assert!(matches!(
            create_transaction(&db, &caller, bad_fee_type).await,
            Err(Error::Validation { message: _ })
        ));

        let bad_fee = NewTransaction {
            kind: Some(2),
            fee: Some(f64::NAN),
            ..NewTransaction::default()
        };
        assert!(matches!(
            create_transaction(&db, &caller, bad_fee).await,
            Err(Error::InvalidAmount { amount: _ })
        ));
        Ok(())
    }

    #[tokio::test]
    async fn test_admin_creates_for_named_parties() -> Result<()> {
        let db = setup_test_db().await?;
        let seller = create_test_user(&db, "seller01").await?;
        let alice = create_test_user(&db, "alice").await?;
        let p1 = create_test_product(&db, &seller.user_id, "P1 camera").await?;

        let created = create_transaction(
            &db,
            &admin_principal(),
            NewTransaction {
                user_id: Some("seller01".to_string()),
                customer_id: Some("alice".to_string()),
                kind: Some(1),
                product_id: Some(p1.product_id.clone()),
                ..NewTransaction::default()
            },
        )
        .await?;

        assert_eq!(created.status, INITIAL_STATUS);
        assert_eq!(created.transaction_id.len(), 32);
        assert_eq!(created.customer_id, alice.user_id);
        assert_eq!(created.user_id, seller.user_id);
        assert_eq!(created.product_id, p1.product_id);
        Ok(())
    }

    #[tokio::test]
    async fn test_admin_must_name_seller() -> Result<()> {
        let db = setup_test_db().await?;
        let seller = create_test_user(&db, "seller01").await?;
        create_test_user(&db, "alice").await?;
        let p1 = create_test_product(&db, &seller.user_id, "P1 camera").await?;

        let err = create_transaction(
            &db,
            &admin_principal(),
            NewTransaction {
                customer_id: Some("alice".to_string()),
                kind: Some(1),
                product_id: Some(p1.product_id),
                ..NewTransaction::default()
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(
            err,
            Error::Reference {
                field: ReferenceField::User
            }
        ));
        Ok(())
    }

    #[tokio::test]
    async fn test_non_admin_is_always_seller() -> Result<()> {
        let db = setup_test_db().await?;
        let (seller, buyer, product) = setup_trade(&db).await?;
        let other = create_test_user(&db, "other001").await?;

        let created = create_transaction(
            &db,
            &principal_of(&seller),
            NewTransaction {
                user_id: Some(other.username.clone()),
                customer_id: Some(buyer.username.clone()),
                kind: Some(1),
                product_id: Some(product.product_id),
                ..NewTransaction::default()
            },
        )
        .await?;

        assert_eq!(created.user_id, seller.user_id);
        assert_ne!(created.user_id, other.user_id);
        Ok(())
    }

    #[tokio::test]
    async fn test_unknown_customer_rejected() -> Result<()> {
        let db = setup_test_db().await?;
        let (seller, _, product) = setup_trade(&db).await?;

        let err = create_transaction(
            &db,
            &principal_of(&seller),
            NewTransaction {
                customer_id: Some("nobody00".to_string()),
                kind: Some(1),
                product_id: Some(product.product_id),
                ..NewTransaction::default()
            },
        )
        .await
        .unwrap_err();

        assert!(matches!(
            err,
            Error::Reference {
                field: ReferenceField::Customer
            }
        ));
        let stored = list_transactions(&db, &admin_principal(), &PartyFilter::default(), page())
            .await?;
        assert_eq!(stored.total_count, 0);
        Ok(())
    }

    #[tokio::test]
    async fn test_product_required_on_create() -> Result<()> {
        let db = setup_test_db().await?;
        let (seller, buyer, _) = setup_trade(&db).await?;

        let err = create_transaction(
            &db,
            &principal_of(&seller),
            NewTransaction {
                customer_id: Some(buyer.username.clone()),
                kind: Some(1),
                ..NewTransaction::default()
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(
            err,
            Error::Reference {
                field: ReferenceField::Product
            }
        ));
        Ok(())
    }

    #[tokio::test]
    async fn test_update_without_delivered_at_clears_it() -> Result<()> {
        let db = setup_test_db().await?;
        let (seller, buyer, product) = setup_trade(&db).await?;
        let created = create_test_transaction(&db, &seller, &buyer, &product.product_id).await?;
        let seller_principal = principal_of(&seller);

        let delivered = chrono::Utc::now();
        let updated = update_transaction(
            &db,
            &seller_principal,
            &created.transaction_id,
            TransactionPatch {
                delivered_at: Patch::Value(delivered),
                status: Patch::Value(4),
                ..TransactionPatch::default()
            },
        )
        .await?;
        assert!(updated.delivered_at.is_some());

        let updated = update_transaction(
            &db,
            &seller_principal,
            &created.transaction_id,
            TransactionPatch {
                shipping_number: Patch::Value("TRACK-1".to_string()),
                ..TransactionPatch::default()
            },
        )
        .await?;
        assert_eq!(updated.delivered_at, None);
        assert_eq!(updated.status, 4);
        assert_eq!(updated.shipping_number.as_deref(), Some("TRACK-1"));

        // Clearing an already empty value is a no-op
        let again = update_transaction(
            &db,
            &seller_principal,
            &created.transaction_id,
            TransactionPatch::default(),
        )
        .await?;
        assert_eq!(again.delivered_at, None);
        assert_eq!(again.shipping_number.as_deref(), Some("TRACK-1"));
        assert!(again.updated_at >= updated.updated_at);
        Ok(())
    }

    #[tokio::test]
    async fn test_buyer_may_rewrite_fee_and_status() -> Result<()> {
        let db = setup_test_db().await?;
        let (seller, buyer, product) = setup_trade(&db).await?;
        let created = create_test_transaction(&db, &seller, &buyer, &product.product_id).await?;

        let updated = update_transaction(
            &db,
            &principal_of(&buyer),
            &created.transaction_id,
            TransactionPatch {
                fee: Patch::Value(0.0),
                fee_type: Patch::Value(3),
                status: Patch::Value(6),
                ..TransactionPatch::default()
            },
        )
        .await?;

        assert_eq!(updated.fee, Some(0.0));
        assert_eq!(updated.status, 6);
        Ok(())
    }

    #[tokio::test]
    async fn test_update_rejections() -> Result<()> {
        let db = setup_test_db().await?;
        let (seller, buyer, product) = setup_trade(&db).await?;
        let outsider = create_test_user(&db, "outsider").await?;
        let created = create_test_transaction(&db, &seller, &buyer, &product.product_id).await?;
        let id = created.transaction_id.as_str();

        let result = update_transaction(&db, &principal_of(&outsider), id, TransactionPatch::default()).await;
        assert!(matches!(result, Err(Error::Forbidden { message: _ })));

        let result = update_transaction(
            &db,
            &principal_of(&seller),
            "missing",
            TransactionPatch::default(),
        )
        .await;
        assert!(matches!(
            result,
            Err(Error::NotFound {
                entity: "transaction",
                ..
            })
        ));

        let null_status = TransactionPatch {
            status: Patch::Null,
            ..TransactionPatch::default()
        };
        let result = update_transaction(&db, &principal_of(&seller), id, null_status).await;
        assert!(matches!(result, Err(Error::Validation { message: _ })));

        let bad_payment = TransactionPatch {
            payment_id: Patch::Value("missing".to_string()),
            ..TransactionPatch::default()
        };
        let result = update_transaction(&db, &principal_of(&seller), id, bad_payment).await;
        assert!(matches!(
            result,
            Err(Error::Reference {
                field: ReferenceField::Payment
            })
        ));
        Ok(())
    }

    #[tokio::test]
    async fn test_update_sets_and_clears_references() -> Result<()> {
        let db = setup_test_db().await?;
        let (seller, buyer, product) = setup_trade(&db).await?;
        let address = create_test_address(&db, &buyer.user_id).await?;
        let created = create_test_transaction(&db, &seller, &buyer, &product.product_id).await?;
        let buyer_principal = principal_of(&buyer);

        let updated = update_transaction(
            &db,
            &buyer_principal,
            &created.transaction_id,
            TransactionPatch {
                address_id: Patch::Value(address.address_id.clone()),
                ..TransactionPatch::default()
            },
        )
        .await?;
        assert_eq!(updated.address_id, Some(address.address_id));

        let cleared = update_transaction(
            &db,
            &buyer_principal,
            &created.transaction_id,
            TransactionPatch {
                address_id: Patch::Value(String::new()),
                ..TransactionPatch::default()
            },
        )
        .await?;
        assert_eq!(cleared.address_id, None);
        Ok(())
    }

    #[tokio::test]
    async fn test_list_scopes() -> Result<()> {
        let db = setup_test_db().await?;
        let (seller, buyer, product) = setup_trade(&db).await?;
        create_test_transaction(&db, &seller, &buyer, &product.product_id).await?;
        create_test_transaction(&db, &seller, &buyer, &product.product_id).await?;

        // The buyer sells something back to the seller
        let buyer_product = create_test_product(&db, &buyer.user_id, "Lens").await?;
        create_test_transaction(&db, &buyer, &seller, &buyer_product.product_id).await?;

        let sales = list_transactions(&db, &principal_of(&seller), &as_seller(), page()).await?;
        assert_eq!(sales.total_count, 2);
        assert!(sales.items.iter().all(|t| t.user_id == seller.user_id));

        let purchases = list_transactions(&db, &principal_of(&seller), &as_buyer(), page()).await?;
        assert_eq!(purchases.total_count, 1);
        assert_eq!(purchases.items[0].customer_id, seller.user_id);

        let result =
            list_transactions(&db, &principal_of(&seller), &PartyFilter::default(), page()).await;
        assert!(matches!(result, Err(Error::Forbidden { message: _ })));

        let everything =
            list_transactions(&db, &admin_principal(), &PartyFilter::default(), page()).await?;
        assert_eq!(everything.total_count, 3);

        let windowed = list_transactions(
            &db,
            &admin_principal(),
            &PartyFilter::default(),
            PageRequest {
                offset: 2,
                limit: 10,
            },
        )
        .await?;
        assert_eq!(windowed.total_count, 3);
        assert_eq!(windowed.items.len(), 1);
        Ok(())
    }

    #[tokio::test]
    async fn test_get_requires_matching_side() -> Result<()> {
        let db = setup_test_db().await?;
        let (seller, buyer, product) = setup_trade(&db).await?;
        let created = create_test_transaction(&db, &seller, &buyer, &product.product_id).await?;
        let id = created.transaction_id.as_str();

        assert!(get_transaction(&db, &principal_of(&seller), id, &as_seller()).await.is_ok());
        assert!(get_transaction(&db, &principal_of(&buyer), id, &as_buyer()).await.is_ok());
        assert!(get_transaction(&db, &principal_of(&buyer), id, &as_seller()).await.is_err());
        assert!(
            get_transaction(&db, &admin_principal(), id, &PartyFilter::default())
                .await
                .is_ok()
        );
        Ok(())
    }

    #[tokio::test]
    async fn test_delete_transaction() -> Result<()> {
        let db = setup_test_db().await?;
        let (seller, buyer, product) = setup_trade(&db).await?;
        let created = create_test_transaction(&db, &seller, &buyer, &product.product_id).await?;
        let id = created.transaction_id.as_str();

        let result = delete_transaction(&db, &principal_of(&seller), id).await;
        assert!(matches!(result, Err(Error::Forbidden { message: _ })));

        delete_transaction(&db, &admin_principal(), id).await?;
        let result = delete_transaction(&db, &admin_principal(), id).await;
        assert!(matches!(result, Err(Error::NotFound { .. })));
        Ok(())
    }

    #[test]
    fn test_patch_staging() {
        let now = chrono::Utc::now();
        let mut model = <transaction::ActiveModel as Default>::default();
        TransactionPatch {
            fee: Patch::Null,
            payment_id: Patch::Value(String::new()),
            shipping: Patch::Value("Kerry".to_string()),
            ..TransactionPatch::default()
        }
        .apply(&mut model, now);

        assert_eq!(model.fee, Set(None));
        assert_eq!(model.payment_id, Set(None));
        assert_eq!(model.shipping, Set(Some("Kerry".to_string())));
        assert_eq!(model.delivered_at, Set(None));
        assert_eq!(model.updated_at, Set(now));
        assert!(model.status.is_not_set());
        assert!(model.address_id.is_not_set());
    }
}
