//! User entity - Represents an account in the escrow platform.
//!
//! Users act as sellers (`transactions.user_id`) and buyers
//! (`transactions.customer_id`). The `balance` column is the ledger debited by
//! withdrawals.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// User database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "users")]
pub struct Model {
    /// Stable identity, generated at creation
    #[sea_orm(primary_key, auto_increment = false)]
    pub user_id: String,
    /// Natural key used by clients to reference other users
    #[sea_orm(unique)]
    pub username: String,
    /// Contact email, unique across users
    #[sea_orm(unique)]
    pub email: String,
    /// `"ADMIN"` or `"USER"`
    pub user_type: String,
    /// 1 = active, 2 = disabled
    pub status: i32,
    pub first_name: String,
    pub last_name: String,
    pub phone: String,
    /// Withdrawable balance
    pub balance: f64,
    /// Avatar file reference
    pub image_id: Option<String>,
    /// Default shipping address reference
    pub address_id: Option<String>,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

/// Users are referenced by natural key from other tables; no foreign keys are declared.
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
