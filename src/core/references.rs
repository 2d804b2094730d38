//! Cross-entity reference checks for transactions.
//!
//! A transaction names its seller and buyer by username and its product,
//! address and payment by id. Each non-empty reference must resolve to a
//! stored record before the transaction is written. Checks run in a fixed
//! order (user, customer, product, address, payment) and stop at the first
//! failure, whose field decides the error code. On creation the customer and
//! product are required, so a missing one fails at its place in that order.

use crate::entities::{
    Address, AddressColumn, Payment, PaymentColumn, Product, ProductColumn, User, UserColumn,
};
use crate::errors::{Error, ReferenceField, Result};
use sea_orm::{ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter};
use tracing::debug;

/// References to check. Empty or absent fields are skipped.
#[derive(Debug, Clone, Copy, Default)]
pub struct ReferenceSet<'a> {
    /// Seller username
    pub user: Option<&'a str>,
    /// Buyer username
    pub customer: Option<&'a str>,
    pub product_id: Option<&'a str>,
    pub address_id: Option<&'a str>,
    pub payment_id: Option<&'a str>,
    /// Customer and product must be present, as on creation
    pub creating: bool,
}

/// Stable user ids resolved from the usernames in a [`ReferenceSet`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolvedReferences {
    pub user_id: Option<String>,
    pub customer_id: Option<String>,
}

fn present(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}

fn unresolved(field: ReferenceField) -> Error {
    debug!(%field, "reference did not resolve");
    Error::Reference { field }
}

async fn resolve_username<C: ConnectionTrait>(
    db: &C,
    username: &str,
    field: ReferenceField,
) -> Result<String> {
    let user = User::find()
        .filter(UserColumn::Username.eq(username))
        .one(db)
        .await?
        .ok_or_else(|| unresolved(field))?;

    if user.user_id.is_empty() {
        return Err(unresolved(field));
    }
    Ok(user.user_id)
}

/// Confirms every non-empty reference exists.
///
/// # Errors
/// Returns [`Error::Reference`] for the first reference that does not resolve,
/// or [`Error::Database`] if a lookup fails.
pub async fn validate_references<C: ConnectionTrait>(
    db: &C,
    refs: ReferenceSet<'_>,
) -> Result<ResolvedReferences> {
    let mut resolved = ResolvedReferences::default();

    if let Some(username) = present(refs.user) {
        resolved.user_id = Some(resolve_username(db, username, ReferenceField::User).await?);
    }

    match present(refs.customer) {
        Some(username) => {
            resolved.customer_id =
                Some(resolve_username(db, username, ReferenceField::Customer).await?);
        }
        None if refs.creating => return Err(unresolved(ReferenceField::Customer)),
        None => {}
    }

    if refs.creating && present(refs.product_id).is_none() {
        return Err(unresolved(ReferenceField::Product));
    }
    if let Some(product_id) = present(refs.product_id) {
        let product = Product::find()
            .filter(ProductColumn::ProductId.eq(product_id))
            .one(db)
            .await?;
        if product.is_none_or(|p| p.product_id.is_empty()) {
            return Err(unresolved(ReferenceField::Product));
        }
    }

    if let Some(address_id) = present(refs.address_id) {
        let address = Address::find()
            .filter(AddressColumn::AddressId.eq(address_id))
            .one(db)
            .await?;
        if address.is_none_or(|a| a.address_id.is_empty()) {
            return Err(unresolved(ReferenceField::Address));
        }
    }

    if let Some(payment_id) = present(refs.payment_id) {
        let payment = Payment::find()
            .filter(PaymentColumn::PaymentId.eq(payment_id))
            .one(db)
            .await?;
        if payment.is_none_or(|p| p.payment_id.is_empty()) {
            return Err(unresolved(ReferenceField::Payment));
        }
    }

    Ok(resolved)
}
