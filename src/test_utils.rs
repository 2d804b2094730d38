//! Shared test utilities for `flexcrow`.
//!
//! This module provides common helper functions for setting up test databases
//! and creating test entities with sensible defaults.

use crate::{
    core::{
        address::{self, NewAddress},
        auth::{Principal, Role},
        payment::{self, NewPayment},
        product::{self, NewProduct},
        transaction::{self, NewTransaction},
        user::{self, NewUser},
    },
    entities::{AddressModel, PaymentModel, ProductModel, TransactionModel, UserModel},
    errors::Result,
};
use sea_orm::DatabaseConnection;

/// Creates an in-memory `SQLite` database with all tables initialized.
/// This is the standard setup for all integration tests.
pub async fn setup_test_db() -> Result<DatabaseConnection> {
    let db = sea_orm::Database::connect("sqlite::memory:").await?;
    crate::config::database::create_tables(&db).await?;
    Ok(db)
}

/// Creates a file-backed `SQLite` database behind a pool of up to
/// `max_connections`, so concurrent tests hit real database locking.
/// Keep the returned directory alive for as long as the connection is used.
pub async fn setup_pooled_test_db(
    max_connections: u32,
) -> Result<(tempfile::TempDir, DatabaseConnection)> {
    let dir = tempfile::tempdir()?;
    let url = format!(
        "sqlite://{}?mode=rwc",
        dir.path().join("flexcrow.sqlite").display()
    );
    let mut options = sea_orm::ConnectOptions::new(url);
    options.max_connections(max_connections).sqlx_logging(false);
    let db = sea_orm::Database::connect(options).await?;
    crate::config::database::create_tables(&db).await?;
    Ok((dir, db))
}

/// Routes `tracing` output through the test harness. Safe to call repeatedly.
pub fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("debug")
        .with_test_writer()
        .try_init();
}

/// Builds a valid account payload.
///
/// # Defaults
/// * `email`: `"{username}@example.com"`
/// * `first_name` / `last_name`: "Test" / "User"
/// * `user_type`, `status`, `balance`: unset (USER, active, 0)
pub fn new_user(username: &str) -> NewUser {
    NewUser {
        username: username.to_string(),
        email: format!("{username}@example.com"),
        user_type: None,
        status: None,
        first_name: "Test".to_string(),
        last_name: "User".to_string(),
        phone: "0800000000".to_string(),
        balance: None,
        image_id: None,
        address_id: None,
    }
}

/// Creates a regular, active user with a zero balance.
pub async fn create_test_user(db: &DatabaseConnection, username: &str) -> Result<UserModel> {
    user::insert_user(db, new_user(username)).await
}

/// Creates a regular user holding `balance`.
/// Use this when testing withdrawals.
pub async fn create_user_with_balance(
    db: &DatabaseConnection,
    username: &str,
    balance: f64,
) -> Result<UserModel> {
    let mut input = new_user(username);
    input.balance = Some(balance);
    user::insert_user(db, input).await
}

/// An admin principal that does not correspond to a stored user.
pub fn admin_principal() -> Principal {
    Principal::new("admin-root", Role::Admin)
}

/// The principal a stored user would authenticate as.
pub fn principal_of(user: &UserModel) -> Principal {
    let role = user.user_type.parse().unwrap_or(Role::User);
    Principal::new(user.user_id.clone(), role)
}

/// Creates an active product owned by `owner_id`.
///
/// # Defaults
/// * `type`: 1
/// * `price`: 10.0
/// * no description, images or video
pub async fn create_test_product(
    db: &DatabaseConnection,
    owner_id: &str,
    name: &str,
) -> Result<ProductModel> {
    product::create_product(
        db,
        &Principal::new(owner_id, Role::User),
        NewProduct {
            user_id: None,
            name: name.to_string(),
            status: None,
            kind: 1,
            description: None,
            price: 10.0,
            image_ids: Vec::new(),
            video_id: None,
        },
    )
    .await
}

/// Builds a valid shipping address payload with both address lines set.
pub fn new_address() -> NewAddress {
    NewAddress {
        user_id: None,
        name: "Home".to_string(),
        status: None,
        kind: 1,
        full_name: "Test User".to_string(),
        phone: "0800000000".to_string(),
        address_1: "99 Sukhumvit Road".to_string(),
        address_2: Some("Floor 3".to_string()),
        subdistrict: "Khlong Toei".to_string(),
        district: "Khlong Toei".to_string(),
        province: "Bangkok".to_string(),
        country: "Thailand".to_string(),
        postal_code: "10110".to_string(),
    }
}

/// Creates an active address owned by `owner_id`.
pub async fn create_test_address(db: &DatabaseConnection, owner_id: &str) -> Result<AddressModel> {
    address::create_address(db, &Principal::new(owner_id, Role::User), new_address()).await
}

/// Creates a pending card payment owned by `owner_id`.
pub async fn create_test_payment(
    db: &DatabaseConnection,
    owner_id: &str,
    amount: f64,
) -> Result<PaymentModel> {
    payment::create_payment(
        db,
        &Principal::new(owner_id, Role::User),
        NewPayment {
            user_id: None,
            status: None,
            amount,
            method: "card".to_string(),
        },
    )
    .await
}

/// Creates a seller (`seller01`), a buyer (`buyer001`) and a product listed by the seller.
pub async fn setup_trade(
    db: &DatabaseConnection,
) -> Result<(UserModel, UserModel, ProductModel)> {
    let seller = create_test_user(db, "seller01").await?;
    let buyer = create_test_user(db, "buyer001").await?;
    let product = create_test_product(db, &seller.user_id, "Camera").await?;
    Ok((seller, buyer, product))
}

/// Creates a type-1 transaction as `seller`, naming `buyer` as the customer.
pub async fn create_test_transaction(
    db: &DatabaseConnection,
    seller: &UserModel,
    buyer: &UserModel,
    product_id: &str,
) -> Result<TransactionModel> {
    transaction::create_transaction(
        db,
        &principal_of(seller),
        NewTransaction {
            customer_id: Some(buyer.username.clone()),
            kind: Some(1),
            product_id: Some(product_id.to_string()),
            ..NewTransaction::default()
        },
    )
    .await
}
