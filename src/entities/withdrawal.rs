//! Withdrawal entity - A payout request debited from a user's balance.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Withdrawal database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "withdrawals")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub withdrawal_id: String,
    /// User whose balance was debited
    pub user_id: String,
    /// Amount debited, always positive
    pub amount: f64,
    /// 1 = pending, 2 = completed, 3 = canceled
    pub status: i32,
    /// Payout method (e.g. "bank")
    pub method: String,
    /// Destination account number or handle
    pub account: Option<String>,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
