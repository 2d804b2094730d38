//! Entity module - Contains all SeaORM entity definitions for the database.
//! These entities represent the database tables. Cross-table references are
//! natural-key strings validated in `core::references`.
//! Each entity has a Model struct for data and an Entity struct for operations.

pub mod address;
pub mod payment;
pub mod product;
pub mod transaction;
pub mod user;
pub mod withdrawal;

// Re-export specific types to avoid conflicts
pub use address::{Column as AddressColumn, Entity as Address, Model as AddressModel};
pub use payment::{Column as PaymentColumn, Entity as Payment, Model as PaymentModel};
pub use product::{Column as ProductColumn, Entity as Product, Model as ProductModel};
pub use transaction::{
    Column as TransactionColumn, Entity as Transaction, Model as TransactionModel,
};
pub use user::{Column as UserColumn, Entity as User, Model as UserModel};
pub use withdrawal::{
    Column as WithdrawalColumn, Entity as Withdrawal, Model as WithdrawalModel,
};
