//! Transaction entity - The escrow record between a seller and a buyer.
//!
//! Each transaction names a seller (`user_id`), a buyer (`customer_id`), a
//! `product_id` and optionally an `address_id` and `payment_id`. The
//! `status`, `type` and `fee_type` columns are opaque enumerants: they are
//! range-checked on write and never interpreted.
//! Backticks are used for field names to enable proper documentation linking.
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Transaction database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "transactions")]
pub struct Model {
    /// Unique identifier, generated at creation and stable for life
    #[sea_orm(primary_key, auto_increment = false)]
    pub transaction_id: String,
    /// Seller's stable user id
    pub user_id: String,
    /// Buyer's stable user id
    pub customer_id: String,
    /// Lifecycle stage, one of 1..=6
    pub status: i32,
    /// Transaction category, 1 or 2
    #[sea_orm(column_name = "type")]
    #[serde(rename = "type")]
    pub kind: i32,
    /// Product being sold
    pub product_id: String,
    /// Quantity of the product
    pub product_number: Option<i32>,
    /// Shipping address reference
    pub address_id: Option<String>,
    /// Payment reference
    pub payment_id: Option<String>,
    /// Carrier name
    pub shipping: Option<String>,
    pub shipping_price: Option<f64>,
    /// Carrier tracking number
    pub shipping_number: Option<String>,
    pub shipping_details: Option<String>,
    /// Proof-of-shipping image reference
    pub shipping_image_id: Option<String>,
    /// Set-or-clear on every update, see `core::transaction::update_transaction`
    pub delivered_at: Option<DateTimeUtc>,
    pub delivered_details: Option<String>,
    /// Platform fee snapshot
    pub fee: Option<f64>,
    /// Fee category, one of 1..=3
    pub fee_type: Option<i32>,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

/// References are natural keys checked by `core::references`, not foreign keys.
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
