//! Request handlers, one module per resource.
//!
//! Handlers only extract inputs, call into `crate::core` and shape the
//! response; every rule lives in the core functions.

pub mod addresses;
pub mod health;
pub mod payments;
pub mod products;
pub mod transactions;
pub mod users;
pub mod withdrawals;

use serde::Deserialize;

/// `user_id` filter on owned-record lists. Honored for admins only.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OwnerFilter {
    pub user_id: Option<String>,
}

impl OwnerFilter {
    pub fn owner(&self) -> Option<&str> {
        self.user_id.as_deref().filter(|v| !v.is_empty())
    }
}

/// `transaction=true` marks a read made while viewing a transaction, which
/// lets a counterparty see a record they do not own.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SharedRead {
    pub transaction: Option<String>,
}

impl SharedRead {
    pub fn is_shared(&self) -> bool {
        self.transaction
            .as_deref()
            .is_some_and(|v| v.eq_ignore_ascii_case("true"))
    }
}
