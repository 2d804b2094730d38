//! Role-based authorization decisions.
//!
//! Every ownership and role rule lives here as pure functions of the
//! [`Principal`] and the record's ownership facts. Nothing in this module
//! touches storage; callers load the record, ask for a decision, then act on
//! the returned permission.

use crate::core::auth::Principal;
use crate::errors::{Error, Result};
use serde::Deserialize;

/// Query value that stands for the caller's own id.
pub const CURRENT: &str = "current";

/// Status value of an active owned record.
pub const ACTIVE_STATUS: i32 = 1;

/// Status value of a soft-removed record.
pub const REMOVED_STATUS: i32 = 2;

/// `user_id` / `customer_id` query parameters on transaction reads.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PartyFilter {
    pub user_id: Option<String>,
    pub customer_id: Option<String>,
}

impl PartyFilter {
    fn seller(&self) -> Option<&str> {
        self.user_id.as_deref().filter(|v| !v.is_empty())
    }

    fn buyer(&self) -> Option<&str> {
        self.customer_id.as_deref().filter(|v| !v.is_empty())
    }
}

/// Seller and buyer of an existing transaction.
#[derive(Debug, Clone, Copy)]
pub struct Parties<'a> {
    pub seller: &'a str,
    pub buyer: &'a str,
}

impl Parties<'_> {
    fn involves(&self, user_id: &str) -> bool {
        self.seller == user_id || self.buyer == user_id
    }
}

/// An operation a caller attempts on escrow transactions.
#[derive(Debug, Clone, Copy)]
pub enum TransactionAction<'a> {
    List { filter: &'a PartyFilter },
    Read {
        filter: &'a PartyFilter,
        parties: Parties<'a>,
    },
    Create,
    Update { parties: Parties<'a> },
    Delete,
}

/// What the caller may do with transactions, per operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransactionPermission {
    /// Every transaction
    ListAll,
    /// Transactions whose seller is the given user id
    ListBySeller(String),
    /// Transactions whose buyer is the given user id
    ListByBuyer(String),
    Read,
    /// Create with the seller forced to this user id
    CreateAsSeller(String),
    /// Create with the seller resolved from the payload's username
    CreateForNamedSeller,
    /// Update any mutable field
    Update,
    Delete,
}

/// Decides whether `principal` may perform `action` on transactions.
///
/// # Errors
/// Returns [`Error::Forbidden`] when the action is denied.
pub fn authorize_transaction(
    principal: &Principal,
    action: TransactionAction<'_>,
) -> Result<TransactionPermission> {
    let admin = principal.is_admin();
    match action {
        TransactionAction::List { filter } => {
            if let Some(seller) = filter.seller() {
                if seller == CURRENT {
                    Ok(TransactionPermission::ListBySeller(principal.user_id.clone()))
                } else if admin {
                    Ok(TransactionPermission::ListBySeller(seller.to_string()))
                } else {
                    Err(Error::forbidden("only admins may list another user's sales"))
                }
            } else if let Some(buyer) = filter.buyer() {
                if buyer == CURRENT {
                    Ok(TransactionPermission::ListByBuyer(principal.user_id.clone()))
                } else if admin {
                    Ok(TransactionPermission::ListByBuyer(buyer.to_string()))
                } else {
                    Err(Error::forbidden("only admins may list another user's purchases"))
                }
            } else if admin {
                Ok(TransactionPermission::ListAll)
            } else {
                Err(Error::forbidden("only admins may list all transactions"))
            }
        }
        TransactionAction::Read { filter, parties } => {
            let as_seller = filter.seller() == Some(CURRENT) && parties.seller == principal.user_id;
            let as_buyer = filter.buyer() == Some(CURRENT) && parties.buyer == principal.user_id;
            if as_seller || as_buyer || admin {
                Ok(TransactionPermission::Read)
            } else {
                Err(Error::forbidden("you are not authorized to view this transaction"))
            }
        }
        TransactionAction::Create => {
            if admin {
                Ok(TransactionPermission::CreateForNamedSeller)
            } else {
                Ok(TransactionPermission::CreateAsSeller(principal.user_id.clone()))
            }
        }
        TransactionAction::Update { parties } => {
            if admin || parties.involves(&principal.user_id) {
                Ok(TransactionPermission::Update)
            } else {
                Err(Error::forbidden("you are not authorized to update this transaction"))
            }
        }
        TransactionAction::Delete => {
            if admin {
                Ok(TransactionPermission::Delete)
            } else {
                Err(Error::forbidden("only admins may delete transactions"))
            }
        }
    }
}

/// Per-entity rules for records owned by a single user.
#[derive(Debug, Clone, Copy)]
pub struct OwnedPolicy {
    /// Entity name used in messages
    pub entity: &'static str,
    /// Whether owners still see records whose status is not active
    pub owner_sees_inactive: bool,
    /// Whether owners may update (and soft-remove) their active records
    pub owner_may_modify: bool,
}

/// Owners see and edit only their active products.
pub const PRODUCT_POLICY: OwnedPolicy = OwnedPolicy {
    entity: "product",
    owner_sees_inactive: false,
    owner_may_modify: true,
};

/// Owners see and edit only their active addresses.
pub const ADDRESS_POLICY: OwnedPolicy = OwnedPolicy {
    entity: "address",
    owner_sees_inactive: false,
    owner_may_modify: true,
};

/// Owners see every payment they made and may edit it.
pub const PAYMENT_POLICY: OwnedPolicy = OwnedPolicy {
    entity: "payment",
    owner_sees_inactive: true,
    owner_may_modify: true,
};

/// Owners see their withdrawals; only admins change them.
pub const WITHDRAWAL_POLICY: OwnedPolicy = OwnedPolicy {
    entity: "withdrawal",
    owner_sees_inactive: true,
    owner_may_modify: false,
};

/// Ownership facts of a stored record.
#[derive(Debug, Clone, Copy)]
pub struct OwnedRecord<'a> {
    pub owner: &'a str,
    pub status: i32,
}

/// An operation a caller attempts on an owned record.
#[derive(Debug, Clone, Copy)]
pub enum OwnedAction<'a> {
    List { requested_owner: Option<&'a str> },
    /// `shared` lets a non-owner read an active record, e.g. a product viewed
    /// from a transaction
    Read { record: OwnedRecord<'a>, shared: bool },
    Create,
    Update { record: OwnedRecord<'a> },
    Remove { record: OwnedRecord<'a> },
    Delete,
}

/// What an allowed owned-record action may do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OwnedPermission {
    ListAll,
    ListByOwner { owner: String, active_only: bool },
    Read,
    CreateAsOwner(String),
    CreateForNamedOwner,
    /// `restricted` updates may not change the owner or the status
    Update { restricted: bool },
    Remove,
    Delete,
}

/// Decides whether `principal` may perform `action` on an owned record.
///
/// # Errors
/// Returns [`Error::Forbidden`] when the action is denied.
pub fn authorize_owned(
    principal: &Principal,
    policy: OwnedPolicy,
    action: OwnedAction<'_>,
) -> Result<OwnedPermission> {
    let admin = principal.is_admin();
    let entity = policy.entity;
    let owns = |record: &OwnedRecord<'_>| record.owner == principal.user_id;

    match action {
        OwnedAction::List { requested_owner } => {
            if admin {
                Ok(requested_owner.filter(|o| !o.is_empty()).map_or(
                    OwnedPermission::ListAll,
                    |owner| OwnedPermission::ListByOwner {
                        owner: owner.to_string(),
                        active_only: false,
                    },
                ))
            } else {
                Ok(OwnedPermission::ListByOwner {
                    owner: principal.user_id.clone(),
                    active_only: !policy.owner_sees_inactive,
                })
            }
        }
        OwnedAction::Read { record, shared } => {
            let visible = policy.owner_sees_inactive || record.status == ACTIVE_STATUS;
            if admin || ((owns(&record) || shared) && visible) {
                Ok(OwnedPermission::Read)
            } else {
                Err(Error::forbidden(format!(
                    "you are not authorized to view this {entity}"
                )))
            }
        }
        OwnedAction::Create => {
            if admin {
                Ok(OwnedPermission::CreateForNamedOwner)
            } else {
                Ok(OwnedPermission::CreateAsOwner(principal.user_id.clone()))
            }
        }
        OwnedAction::Update { record } => {
            if admin {
                Ok(OwnedPermission::Update { restricted: false })
            } else if policy.owner_may_modify && owns(&record) && record.status == ACTIVE_STATUS {
                Ok(OwnedPermission::Update { restricted: true })
            } else {
                Err(Error::forbidden(format!(
                    "you are not authorized to update this {entity}"
                )))
            }
        }
        OwnedAction::Remove { record } => {
            if admin
                || (policy.owner_may_modify && owns(&record) && record.status == ACTIVE_STATUS)
            {
                Ok(OwnedPermission::Remove)
            } else {
                Err(Error::forbidden(format!(
                    "you are not authorized to remove this {entity}"
                )))
            }
        }
        OwnedAction::Delete => {
            if admin {
                Ok(OwnedPermission::Delete)
            } else {
                Err(Error::forbidden(format!("only admins may delete a {entity}")))
            }
        }
    }
}

/// An operation a caller attempts on user accounts.
#[derive(Debug, Clone, Copy)]
pub enum UserAction<'a> {
    List,
    Read { target: &'a str },
    Create,
    Update { target: &'a str },
    Delete,
}

/// What an allowed user-account action may do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserPermission {
    List,
    Read,
    Create,
    /// `restricted` updates may only touch profile fields
    Update { restricted: bool },
    Delete,
}

/// Decides whether `principal` may perform `action` on user accounts.
///
/// # Errors
/// Returns [`Error::Forbidden`] when the action is denied.
pub fn authorize_user(principal: &Principal, action: UserAction<'_>) -> Result<UserPermission> {
    let admin = principal.is_admin();
    match action {
        UserAction::Read { target } if admin || target == principal.user_id => {
            Ok(UserPermission::Read)
        }
        UserAction::Update { target } if admin || target == principal.user_id => {
            Ok(UserPermission::Update { restricted: !admin })
        }
        UserAction::List if admin => Ok(UserPermission::List),
        UserAction::Create if admin => Ok(UserPermission::Create),
        UserAction::Delete if admin => Ok(UserPermission::Delete),
        _ => Err(Error::forbidden("admin privileges required")),
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::core::auth::Role;

    fn admin() -> Principal {
        Principal::new("admin-1", Role::Admin)
    }

    fn alice() -> Principal {
        Principal::new("alice-id", Role::User)
    }

    fn filter(user_id: Option<&str>, customer_id: Option<&str>) -> PartyFilter {
        PartyFilter {
            user_id: user_id.map(str::to_string),
            customer_id: customer_id.map(str::to_string),
        }
    }

    const SALE: Parties<'static> = Parties {
        seller: "alice-id",
        buyer: "bob-id",
    };

    #[test]
    fn test_list_current_resolves_to_caller() {
        let f = filter(Some(CURRENT), None);
        let permission =
            authorize_transaction(&alice(), TransactionAction::List { filter: &f }).unwrap();
        assert_eq!(
            permission,
            TransactionPermission::ListBySeller("alice-id".to_string())
        );

        let f = filter(None, Some(CURRENT));
        let permission =
            authorize_transaction(&alice(), TransactionAction::List { filter: &f }).unwrap();
        assert_eq!(
            permission,
            TransactionPermission::ListByBuyer("alice-id".to_string())
        );
    }

    #[test]
    fn test_list_literal_or_unfiltered_requires_admin() {
        for f in [
            filter(Some("bob-id"), None),
            filter(None, Some("bob-id")),
            filter(None, None),
            filter(Some(""), Some("")),
        ] {
            let result = authorize_transaction(&alice(), TransactionAction::List { filter: &f });
            assert!(matches!(result, Err(Error::Forbidden { message: _ })));
        }

        let f = filter(Some("bob-id"), None);
        assert_eq!(
            authorize_transaction(&admin(), TransactionAction::List { filter: &f }).unwrap(),
            TransactionPermission::ListBySeller("bob-id".to_string())
        );
        let f = filter(None, None);
        assert_eq!(
            authorize_transaction(&admin(), TransactionAction::List { filter: &f }).unwrap(),
            TransactionPermission::ListAll
        );
    }

    #[test]
    fn test_user_filter_takes_precedence_over_customer_filter() {
        let f = filter(Some(CURRENT), Some("someone-else"));
        assert_eq!(
            authorize_transaction(&alice(), TransactionAction::List { filter: &f }).unwrap(),
            TransactionPermission::ListBySeller("alice-id".to_string())
        );
    }

    #[test]
    fn test_read_requires_matching_context() {
        let as_seller = filter(Some(CURRENT), None);
        assert!(
            authorize_transaction(
                &alice(),
                TransactionAction::Read {
                    filter: &as_seller,
                    parties: SALE
                }
            )
            .is_ok()
        );

        // Alice is the seller, not the buyer
        let as_buyer = filter(None, Some(CURRENT));
        assert!(
            authorize_transaction(
                &alice(),
                TransactionAction::Read {
                    filter: &as_buyer,
                    parties: SALE
                }
            )
            .is_err()
        );

        // No context given
        let none = PartyFilter::default();
        assert!(
            authorize_transaction(
                &alice(),
                TransactionAction::Read {
                    filter: &none,
                    parties: SALE
                }
            )
            .is_err()
        );
        assert!(
            authorize_transaction(
                &admin(),
                TransactionAction::Read {
                    filter: &none,
                    parties: SALE
                }
            )
            .is_ok()
        );
    }

    #[test]
    fn test_create_forces_seller_for_non_admin() {
        assert_eq!(
            authorize_transaction(&alice(), TransactionAction::Create).unwrap(),
            TransactionPermission::CreateAsSeller("alice-id".to_string())
        );
        assert_eq!(
            authorize_transaction(&admin(), TransactionAction::Create).unwrap(),
            TransactionPermission::CreateForNamedSeller
        );
    }

    #[test]
    fn test_update_allowed_for_both_parties_and_admin() {
        let bob = Principal::new("bob-id", Role::User);
        let mallory = Principal::new("mallory-id", Role::User);
        let action = TransactionAction::Update { parties: SALE };

        assert!(authorize_transaction(&alice(), action).is_ok());
        assert!(authorize_transaction(&bob, action).is_ok());
        assert!(authorize_transaction(&admin(), action).is_ok());
        assert!(authorize_transaction(&mallory, action).is_err());
    }

    #[test]
    fn test_delete_is_admin_only() {
        assert!(authorize_transaction(&alice(), TransactionAction::Delete).is_err());
        assert_eq!(
            authorize_transaction(&admin(), TransactionAction::Delete).unwrap(),
            TransactionPermission::Delete
        );
    }

    #[test]
    fn test_owned_list_scopes() {
        let own = authorize_owned(
            &alice(),
            PRODUCT_POLICY,
            OwnedAction::List {
                requested_owner: Some("bob-id"),
            },
        )
        .unwrap();
        assert_eq!(
            own,
            OwnedPermission::ListByOwner {
                owner: "alice-id".to_string(),
                active_only: true
            }
        );

        let payments = authorize_owned(
            &alice(),
            PAYMENT_POLICY,
            OwnedAction::List {
                requested_owner: None,
            },
        )
        .unwrap();
        assert_eq!(
            payments,
            OwnedPermission::ListByOwner {
                owner: "alice-id".to_string(),
                active_only: false
            }
        );

        let all = authorize_owned(
            &admin(),
            PRODUCT_POLICY,
            OwnedAction::List {
                requested_owner: None,
            },
        )
        .unwrap();
        assert_eq!(all, OwnedPermission::ListAll);
    }

    #[test]
    fn test_owned_read_hides_removed_records() {
        let removed = OwnedRecord {
            owner: "alice-id",
            status: REMOVED_STATUS,
        };
        let result = authorize_owned(
            &alice(),
            PRODUCT_POLICY,
            OwnedAction::Read {
                record: removed,
                shared: false,
            },
        );
        assert!(result.is_err());

        let active_foreign = OwnedRecord {
            owner: "bob-id",
            status: ACTIVE_STATUS,
        };
        assert!(
            authorize_owned(
                &alice(),
                PRODUCT_POLICY,
                OwnedAction::Read {
                    record: active_foreign,
                    shared: true
                }
            )
            .is_ok()
        );
        assert!(
            authorize_owned(
                &alice(),
                PRODUCT_POLICY,
                OwnedAction::Read {
                    record: active_foreign,
                    shared: false
                }
            )
            .is_err()
        );
    }

    #[test]
    fn test_owned_update_restrictions() {
        let mine = OwnedRecord {
            owner: "alice-id",
            status: ACTIVE_STATUS,
        };
        assert_eq!(
            authorize_owned(&alice(), ADDRESS_POLICY, OwnedAction::Update { record: mine })
                .unwrap(),
            OwnedPermission::Update { restricted: true }
        );
        assert_eq!(
            authorize_owned(&admin(), ADDRESS_POLICY, OwnedAction::Update { record: mine })
                .unwrap(),
            OwnedPermission::Update { restricted: false }
        );
        assert!(
            authorize_owned(
                &alice(),
                WITHDRAWAL_POLICY,
                OwnedAction::Update { record: mine }
            )
            .is_err()
        );
    }

    #[test]
    fn test_user_permissions() {
        assert_eq!(
            authorize_user(&alice(), UserAction::Read { target: "alice-id" }).unwrap(),
            UserPermission::Read
        );
        assert!(authorize_user(&alice(), UserAction::Read { target: "bob-id" }).is_err());
        assert_eq!(
            authorize_user(&alice(), UserAction::Update { target: "alice-id" }).unwrap(),
            UserPermission::Update { restricted: true }
        );
        assert!(authorize_user(&alice(), UserAction::List).is_err());
        assert_eq!(
            authorize_user(&admin(), UserAction::Delete).unwrap(),
            UserPermission::Delete
        );
    }
}
