//! Product business logic - Items a seller lists for escrow sale.
//!
//! Products belong to one user. Owners see and edit only their active
//! products; removing a product marks it `status = 2` so transactions that
//! reference it keep resolving. Admins see everything and may hard-delete.

use crate::{
    core::{
        access::{
            ACTIVE_STATUS, OwnedAction, OwnedPermission, OwnedRecord, PRODUCT_POLICY,
            REMOVED_STATUS, authorize_owned,
        },
        auth::Principal,
        new_id,
        pagination::{Page, PageRequest, fetch_page},
        patch::Patch,
        user::resolve_owner,
    },
    entities::{Product, ProductColumn, ProductModel, product},
    errors::{Error, Result},
};
use sea_orm::{Set, prelude::*};
use serde::Deserialize;
use tracing::{info, instrument};

/// Payload for a new product.
#[derive(Debug, Clone, Deserialize)]
pub struct NewProduct {
    /// Owner username; only read for admin callers
    #[serde(default)]
    pub user_id: Option<String>,
    pub name: String,
    #[serde(default)]
    pub status: Option<i32>,
    #[serde(rename = "type")]
    pub kind: i32,
    #[serde(default)]
    pub description: Option<String>,
    pub price: f64,
    #[serde(default, alias = "image_id")]
    pub image_ids: Vec<String>,
    #[serde(default)]
    pub video_id: Option<String>,
}

/// Sparse product update. `status` is ignored for non-admin callers.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ProductPatch {
    pub name: Option<String>,
    pub status: Option<i32>,
    #[serde(rename = "type")]
    pub kind: Option<i32>,
    pub description: Patch<String>,
    pub price: Option<f64>,
    #[serde(alias = "image_id")]
    pub image_ids: Option<Vec<String>>,
    pub video_id: Patch<String>,
}

fn validate_name(name: &str) -> Result<()> {
    let len = name.trim().chars().count();
    if !(2..=100).contains(&len) {
        return Err(Error::validation("product name must be 2 to 100 characters"));
    }
    Ok(())
}

fn validate_status(status: i32) -> Result<()> {
    if status != ACTIVE_STATUS && status != REMOVED_STATUS {
        return Err(Error::validation("product status must be 1 or 2"));
    }
    Ok(())
}

fn validate_kind(kind: i32) -> Result<()> {
    if !(1..=2).contains(&kind) {
        return Err(Error::validation("product type must be 1 or 2"));
    }
    Ok(())
}

fn validate_description(description: &str) -> Result<()> {
    if description.chars().count() > 1000 {
        return Err(Error::validation(
            "product description must be at most 1000 characters",
        ));
    }
    Ok(())
}

fn validate_price(price: f64) -> Result<()> {
    if !price.is_finite() || price < 0.0 {
        return Err(Error::InvalidAmount { amount: price });
    }
    Ok(())
}

async fn find_existing<C: ConnectionTrait>(db: &C, product_id: &str) -> Result<ProductModel> {
    Product::find_by_id(product_id.to_string())
        .one(db)
        .await?
        .ok_or_else(|| Error::not_found("product", product_id))
}

const fn record(product: &ProductModel) -> OwnedRecord<'_> {
    OwnedRecord {
        owner: product.user_id.as_str(),
        status: product.status,
    }
}

/// Creates a product owned by the caller, or by the named user for admins.
///
/// # Errors
/// Returns an error if:
/// - The name, status, type, description or price is out of range
/// - An admin names an owner username that does not exist
/// - The database insert fails
#[instrument(skip(db, input), fields(caller = %principal.user_id))]
pub async fn create_product<C: ConnectionTrait>(
    db: &C,
    principal: &Principal,
    input: NewProduct,
) -> Result<ProductModel> {
    validate_name(&input.name)?;
    let status = input.status.unwrap_or(ACTIVE_STATUS);
    validate_status(status)?;
    validate_kind(input.kind)?;
    if let Some(description) = &input.description {
        validate_description(description)?;
    }
    validate_price(input.price)?;

    let permission = authorize_owned(principal, PRODUCT_POLICY, OwnedAction::Create)?;
    let owner = resolve_owner(db, permission, input.user_id.as_deref()).await?;

    let now = chrono::Utc::now();
    let model = product::ActiveModel {
        product_id: Set(new_id()),
        user_id: Set(owner),
        name: Set(input.name.trim().to_string()),
        status: Set(status),
        kind: Set(input.kind),
        description: Set(input.description),
        price: Set(input.price),
        image_ids: Set(Json::from(input.image_ids)),
        video_id: Set(input.video_id),
        created_at: Set(now),
        updated_at: Set(now),
    };

    let created = model.insert(db).await?;
    info!(product_id = %created.product_id, owner = %created.user_id, "product created");
    Ok(created)
}

/// Reads one product.
///
/// `shared` lets any caller read an active product, as when a buyer opens the
/// product attached to a transaction.
pub async fn get_product<C: ConnectionTrait>(
    db: &C,
    principal: &Principal,
    product_id: &str,
    shared: bool,
) -> Result<ProductModel> {
    let product = find_existing(db, product_id).await?;
    authorize_owned(
        principal,
        PRODUCT_POLICY,
        OwnedAction::Read {
            record: record(&product),
            shared,
        },
    )?;
    Ok(product)
}

/// Lists products visible to the caller, newest first.
pub async fn list_products<C: ConnectionTrait>(
    db: &C,
    principal: &Principal,
    requested_owner: Option<&str>,
    page: PageRequest,
) -> Result<Page<ProductModel>> {
    let select = match authorize_owned(
        principal,
        PRODUCT_POLICY,
        OwnedAction::List { requested_owner },
    )? {
        OwnedPermission::ListByOwner { owner, active_only } => {
            let select = Product::find().filter(ProductColumn::UserId.eq(owner));
            if active_only {
                select.filter(ProductColumn::Status.eq(ACTIVE_STATUS))
            } else {
                select
            }
        }
        _ => Product::find(),
    };

    fetch_page(db, select, ProductColumn::CreatedAt, page).await
}

/// Applies a sparse update. The owner is never changed.
#[instrument(skip(db, patch), fields(caller = %principal.user_id))]
pub async fn update_product<C: ConnectionTrait>(
    db: &C,
    principal: &Principal,
    product_id: &str,
    mut patch: ProductPatch,
) -> Result<ProductModel> {
    let existing = find_existing(db, product_id).await?;
    let permission = authorize_owned(
        principal,
        PRODUCT_POLICY,
        OwnedAction::Update {
            record: record(&existing),
        },
    )?;
    if permission == (OwnedPermission::Update { restricted: true }) {
        patch.status = None;
    }

    if let Some(name) = &patch.name {
        validate_name(name)?;
    }
    if let Some(status) = patch.status {
        validate_status(status)?;
    }
    if let Some(kind) = patch.kind {
        validate_kind(kind)?;
    }
    if let Some(description) = patch.description.value() {
        validate_description(description)?;
    }
    if let Some(price) = patch.price {
        validate_price(price)?;
    }

    let mut model: product::ActiveModel = existing.into();
    if let Some(name) = patch.name {
        model.name = Set(name.trim().to_string());
    }
    if let Some(status) = patch.status {
        model.status = Set(status);
    }
    if let Some(kind) = patch.kind {
        model.kind = Set(kind);
    }
    if let Some(description) = patch.description.into_nullable() {
        model.description = Set(description);
    }
    if let Some(price) = patch.price {
        model.price = Set(price);
    }
    if let Some(image_ids) = patch.image_ids {
        model.image_ids = Set(Json::from(image_ids));
    }
    if let Some(video_id) = patch.video_id.into_nullable() {
        model.video_id = Set(video_id);
    }
    model.updated_at = Set(chrono::Utc::now());

    model.update(db).await.map_err(Into::into)
}

/// Soft-removes a product by setting `status = 2`.
pub async fn remove_product<C: ConnectionTrait>(
    db: &C,
    principal: &Principal,
    product_id: &str,
) -> Result<ProductModel> {
    let existing = find_existing(db, product_id).await?;
    authorize_owned(
        principal,
        PRODUCT_POLICY,
        OwnedAction::Remove {
            record: record(&existing),
        },
    )?;

    let mut model: product::ActiveModel = existing.into();
    model.status = Set(REMOVED_STATUS);
    model.updated_at = Set(chrono::Utc::now());
    let removed = model.update(db).await?;
    info!(product_id, "product removed");
    Ok(removed)
}

/// Hard-deletes a product. Admin only.
pub async fn delete_product<C: ConnectionTrait>(
    db: &C,
    principal: &Principal,
    product_id: &str,
) -> Result<()> {
    authorize_owned(principal, PRODUCT_POLICY, OwnedAction::Delete)?;
    let result = Product::delete_by_id(product_id.to_string()).exec(db).await?;
    if result.rows_affected == 0 {
        return Err(Error::not_found("product", product_id));
    }
    Ok(())
}
