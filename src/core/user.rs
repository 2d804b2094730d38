//! User directory - account records, profile reads and admin management.
//!
//! Usernames are the natural keys other records use to name sellers and
//! buyers; the stable `user_id` is generated here. Admins manage every
//! account. A user may read their own profile and edit its profile fields,
//! but never their role, status or balance.

use crate::{
    config::settings::BootstrapAdmin,
    core::{
        access::{ACTIVE_STATUS, OwnedPermission, UserAction, UserPermission, authorize_user},
        auth::{Principal, Role},
        new_id,
        pagination::{Page, PageRequest, fetch_page},
        patch::Patch,
    },
    entities::{User, UserColumn, UserModel, user},
    errors::{Error, ReferenceField, Result},
};
use sea_orm::{ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, Set};
use serde::Deserialize;
use tracing::{info, instrument, warn};

/// Payload for a new account.
#[derive(Debug, Clone, Deserialize)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    #[serde(default)]
    pub user_type: Option<Role>,
    #[serde(default)]
    pub status: Option<i32>,
    pub first_name: String,
    pub last_name: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub balance: Option<f64>,
    #[serde(default)]
    pub image_id: Option<String>,
    #[serde(default)]
    pub address_id: Option<String>,
}

/// Sparse account update.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct UserPatch {
    pub username: Option<String>,
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone: Option<String>,
    pub image_id: Patch<String>,
    pub address_id: Patch<String>,
    /// Admin only
    pub user_type: Option<Role>,
    /// Admin only
    pub status: Option<i32>,
    /// Admin only
    pub balance: Option<f64>,
}

impl UserPatch {
    const fn touches_admin_fields(&self) -> bool {
        self.user_type.is_some() || self.status.is_some() || self.balance.is_some()
    }
}

fn validate_username(username: &str) -> Result<()> {
    let len = username.chars().count();
    if !(5..=50).contains(&len) {
        return Err(Error::validation("username must be 5 to 50 characters"));
    }
    Ok(())
}

fn validate_email(email: &str) -> Result<()> {
    if !email.contains('@') {
        return Err(Error::validation("email must be a valid address"));
    }
    Ok(())
}

fn validate_name(field: &str, value: &str) -> Result<()> {
    let len = value.trim().chars().count();
    if !(2..=100).contains(&len) {
        return Err(Error::validation(format!(
            "{field} must be 2 to 100 characters"
        )));
    }
    Ok(())
}

fn validate_status(status: i32) -> Result<()> {
    if !(1..=2).contains(&status) {
        return Err(Error::validation("user status must be 1 or 2"));
    }
    Ok(())
}

fn validate_balance(balance: f64) -> Result<()> {
    if !balance.is_finite() || balance < 0.0 {
        return Err(Error::InvalidAmount { amount: balance });
    }
    Ok(())
}

/// Fails with [`Error::Duplicate`] if another account already uses the email
/// or username. Email is checked first.
async fn ensure_unique<C: ConnectionTrait>(
    db: &C,
    email: Option<&str>,
    username: Option<&str>,
    except_user_id: Option<&str>,
) -> Result<()> {
    let taken = |column: UserColumn, value: &str| {
        let mut query = User::find().filter(column.eq(value));
        if let Some(user_id) = except_user_id {
            query = query.filter(UserColumn::UserId.ne(user_id));
        }
        query
    };

    if let Some(email) = email {
        if taken(UserColumn::Email, email).one(db).await?.is_some() {
            return Err(Error::Duplicate { field: "email" });
        }
    }
    if let Some(username) = username {
        if taken(UserColumn::Username, username).one(db).await?.is_some() {
            return Err(Error::Duplicate { field: "username" });
        }
    }
    Ok(())
}

/// Inserts an account without an authorization check.
///
/// Used by [`create_user`] and by startup seeding.
pub async fn insert_user<C: ConnectionTrait>(db: &C, input: NewUser) -> Result<UserModel> {
    validate_username(&input.username)?;
    validate_email(&input.email)?;
    validate_name("first_name", &input.first_name)?;
    validate_name("last_name", &input.last_name)?;
    let status = input.status.unwrap_or(ACTIVE_STATUS);
    validate_status(status)?;
    let balance = input.balance.unwrap_or(0.0);
    validate_balance(balance)?;

    ensure_unique(db, Some(&input.email), Some(&input.username), None).await?;

    let now = chrono::Utc::now();
    let model = user::ActiveModel {
        user_id: Set(new_id()),
        username: Set(input.username),
        email: Set(input.email),
        user_type: Set(input.user_type.unwrap_or(Role::User).as_str().to_string()),
        status: Set(status),
        first_name: Set(input.first_name.trim().to_string()),
        last_name: Set(input.last_name.trim().to_string()),
        phone: Set(input.phone),
        balance: Set(balance),
        image_id: Set(input.image_id),
        address_id: Set(input.address_id),
        created_at: Set(now),
        updated_at: Set(now),
    };

    let created = model.insert(db).await?;
    info!(user_id = %created.user_id, username = %created.username, "user created");
    Ok(created)
}

/// Creates an account. Admin only.
#[instrument(skip(db, input), fields(caller = %principal.user_id))]
pub async fn create_user<C: ConnectionTrait>(
    db: &C,
    principal: &Principal,
    input: NewUser,
) -> Result<UserModel> {
    authorize_user(principal, UserAction::Create)?;
    insert_user(db, input).await
}

/// Finds an account by username.
pub async fn find_by_username<C: ConnectionTrait>(
    db: &C,
    username: &str,
) -> Result<Option<UserModel>> {
    User::find()
        .filter(UserColumn::Username.eq(username))
        .one(db)
        .await
        .map_err(Into::into)
}

/// Finds an account by its stable id.
pub async fn find_by_id<C: ConnectionTrait>(db: &C, user_id: &str) -> Result<Option<UserModel>> {
    User::find_by_id(user_id.to_string())
        .one(db)
        .await
        .map_err(Into::into)
}

/// Owner id for a new owned record.
///
/// Non-admin callers always own what they create. Admins name the owner by
/// username, which must resolve.
pub async fn resolve_owner<C: ConnectionTrait>(
    db: &C,
    permission: OwnedPermission,
    owner_username: Option<&str>,
) -> Result<String> {
    match permission {
        OwnedPermission::CreateAsOwner(user_id) => Ok(user_id),
        OwnedPermission::CreateForNamedOwner => {
            let username = owner_username.filter(|u| !u.is_empty()).ok_or(Error::Reference {
                field: ReferenceField::User,
            })?;
            find_by_username(db, username)
                .await?
                .map(|user| user.user_id)
                .ok_or(Error::Reference {
                    field: ReferenceField::User,
                })
        }
        _ => Err(Error::forbidden("not permitted to create records")),
    }
}

/// Reads one account. Users may only read their own.
pub async fn get_user<C: ConnectionTrait>(
    db: &C,
    principal: &Principal,
    user_id: &str,
) -> Result<UserModel> {
    authorize_user(principal, UserAction::Read { target: user_id })?;
    find_by_id(db, user_id)
        .await?
        .ok_or_else(|| Error::not_found("user", user_id))
}

/// Lists every account. Admin only.
pub async fn list_users<C: ConnectionTrait>(
    db: &C,
    principal: &Principal,
    page: PageRequest,
) -> Result<Page<UserModel>> {
    authorize_user(principal, UserAction::List)?;
    fetch_page(db, User::find(), UserColumn::CreatedAt, page).await
}

/// Applies a sparse update to an account.
///
/// Admins may change every field. A user editing their own active account
/// may only change profile fields.
#[instrument(skip(db, patch), fields(caller = %principal.user_id))]
pub async fn update_user<C: ConnectionTrait>(
    db: &C,
    principal: &Principal,
    user_id: &str,
    patch: UserPatch,
) -> Result<UserModel> {
    let existing = find_by_id(db, user_id)
        .await?
        .ok_or_else(|| Error::not_found("user", user_id))?;

    let UserPermission::Update { restricted } =
        authorize_user(principal, UserAction::Update { target: user_id })?
    else {
        return Err(Error::forbidden("you are not authorized to update this user"));
    };

    if restricted {
        if existing.status != ACTIVE_STATUS {
            warn!(user_id, "inactive user attempted a self update");
            return Err(Error::forbidden("inactive accounts cannot be updated"));
        }
        if patch.touches_admin_fields() {
            return Err(Error::forbidden(
                "only admins may change user_type, status or balance",
            ));
        }
    }

    if let Some(username) = &patch.username {
        validate_username(username)?;
    }
    if let Some(email) = &patch.email {
        validate_email(email)?;
    }
    if let Some(first_name) = &patch.first_name {
        validate_name("first_name", first_name)?;
    }
    if let Some(last_name) = &patch.last_name {
        validate_name("last_name", last_name)?;
    }
    if let Some(status) = patch.status {
        validate_status(status)?;
    }
    if let Some(balance) = patch.balance {
        validate_balance(balance)?;
    }

    let new_email = patch.email.as_deref().filter(|e| *e != existing.email);
    let new_username = patch
        .username
        .as_deref()
        .filter(|u| *u != existing.username);
    ensure_unique(db, new_email, new_username, Some(user_id)).await?;

    let mut model: user::ActiveModel = existing.into();
    if let Some(username) = patch.username {
        model.username = Set(username);
    }
    if let Some(email) = patch.email {
        model.email = Set(email);
    }
    if let Some(first_name) = patch.first_name {
        model.first_name = Set(first_name.trim().to_string());
    }
    if let Some(last_name) = patch.last_name {
        model.last_name = Set(last_name.trim().to_string());
    }
    if let Some(phone) = patch.phone {
        model.phone = Set(phone);
    }
    if let Some(image_id) = patch.image_id.into_nullable() {
        model.image_id = Set(image_id);
    }
    if let Some(address_id) = patch.address_id.into_nullable() {
        model.address_id = Set(address_id);
    }
    if let Some(role) = patch.user_type {
        model.user_type = Set(role.as_str().to_string());
    }
    if let Some(status) = patch.status {
        model.status = Set(status);
    }
    if let Some(balance) = patch.balance {
        model.balance = Set(balance);
    }
    model.updated_at = Set(chrono::Utc::now());

    model.update(db).await.map_err(Into::into)
}

/// Hard-deletes an account. Admin only.
pub async fn delete_user<C: ConnectionTrait>(
    db: &C,
    principal: &Principal,
    user_id: &str,
) -> Result<()> {
    authorize_user(principal, UserAction::Delete)?;
    let result = User::delete_by_id(user_id.to_string()).exec(db).await?;
    if result.rows_affected == 0 {
        return Err(Error::not_found("user", user_id));
    }
    info!(user_id, "user deleted");
    Ok(())
}

/// Creates the configured admin account unless the username already exists.
///
/// Returns the created account, or `None` when it was already present.
pub async fn ensure_bootstrap_admin<C: ConnectionTrait>(
    db: &C,
    admin: &BootstrapAdmin,
) -> Result<Option<UserModel>> {
    if find_by_username(db, &admin.username).await?.is_some() {
        return Ok(None);
    }

    let created = insert_user(
        db,
        NewUser {
            username: admin.username.clone(),
            email: admin.email.clone(),
            user_type: Some(Role::Admin),
            status: None,
            first_name: admin.first_name.clone(),
            last_name: admin.last_name.clone(),
            phone: admin.phone.clone(),
            balance: None,
            image_id: None,
            address_id: None,
        },
    )
    .await?;
    Ok(Some(created))
}
