//! Address entity - Shipping addresses owned by a user.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Address database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "addresses")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub address_id: String,
    pub user_id: String,
    /// Label chosen by the owner (e.g. "Home")
    pub name: String,
    /// 1 = active, 2 = removed
    pub status: i32,
    #[sea_orm(column_name = "type")]
    #[serde(rename = "type")]
    pub kind: i32,
    pub full_name: String,
    pub phone: String,
    pub address_1: String,
    pub address_2: Option<String>,
    pub subdistrict: String,
    pub district: String,
    pub province: String,
    pub country: String,
    pub postal_code: String,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
