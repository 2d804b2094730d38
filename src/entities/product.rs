//! Product entity - Represents an item a seller lists for escrow sale.
//!
//! Products are soft-removed by setting `status = 2`; only admins hard-delete them.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Product database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "products")]
pub struct Model {
    /// Unique identifier for the product
    #[sea_orm(primary_key, auto_increment = false)]
    pub product_id: String,
    /// Owner (seller) of the product
    pub user_id: String,
    /// Display name of the product
    pub name: String,
    /// 1 = active, 2 = removed
    pub status: i32,
    /// Product category (1 or 2)
    #[sea_orm(column_name = "type")]
    #[serde(rename = "type")]
    pub kind: i32,
    pub description: Option<String>,
    /// Unit price
    pub price: f64,
    /// Uploaded image references, stored as a JSON array of strings
    pub image_ids: Json,
    pub video_id: Option<String>,
    /// When the product was created
    pub created_at: DateTimeUtc,
    /// When the product was last modified
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
