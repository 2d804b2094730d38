//! Shipping addresses owned by a user.
//!
//! Same ownership rules as products: owners see and edit only active
//! addresses, removal is a soft `status = 2`, admins may hard-delete.

use crate::{
    core::{
        access::{
            ACTIVE_STATUS, ADDRESS_POLICY, OwnedAction, OwnedPermission, OwnedRecord,
            REMOVED_STATUS, authorize_owned,
        },
        auth::Principal,
        new_id,
        pagination::{Page, PageRequest, fetch_page},
        patch::Patch,
        user::resolve_owner,
    },
    entities::{Address, AddressColumn, AddressModel, address},
    errors::{Error, Result},
};
use sea_orm::{Set, prelude::*};
use serde::Deserialize;
use tracing::info;

#[derive(Debug, Clone, Deserialize)]
pub struct NewAddress {
    /// Owner username; only read for admin callers
    #[serde(default)]
    pub user_id: Option<String>,
    pub name: String,
    #[serde(default)]
    pub status: Option<i32>,
    #[serde(rename = "type")]
    pub kind: i32,
    pub full_name: String,
    pub phone: String,
    pub address_1: String,
    #[serde(default)]
    pub address_2: Option<String>,
    pub subdistrict: String,
    pub district: String,
    pub province: String,
    pub country: String,
    pub postal_code: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AddressPatch {
    pub name: Option<String>,
    pub status: Option<i32>,
    #[serde(rename = "type")]
    pub kind: Option<i32>,
    pub full_name: Option<String>,
    pub phone: Option<String>,
    pub address_1: Option<String>,
    pub address_2: Patch<String>,
    pub subdistrict: Option<String>,
    pub district: Option<String>,
    pub province: Option<String>,
    pub country: Option<String>,
    pub postal_code: Option<String>,
}

fn check_len(field: &str, value: &str, min: usize, max: usize) -> Result<()> {
    let len = value.trim().chars().count();
    if len < min || len > max {
        return Err(Error::validation(format!(
            "{field} must be {min} to {max} characters"
        )));
    }
    Ok(())
}

fn check_enum(field: &str, value: i32) -> Result<()> {
    if !(1..=2).contains(&value) {
        return Err(Error::validation(format!("{field} must be 1 or 2")));
    }
    Ok(())
}

impl NewAddress {
    fn validate(&self) -> Result<()> {
        check_len("name", &self.name, 2, 100)?;
        if let Some(status) = self.status {
            check_enum("status", status)?;
        }
        check_enum("type", self.kind)?;
        check_len("full_name", &self.full_name, 2, 100)?;
        check_len("phone", &self.phone, 1, 50)?;
        check_len("address_1", &self.address_1, 1, 1000)?;
        if let Some(address_2) = &self.address_2 {
            check_len("address_2", address_2, 0, 1000)?;
        }
        check_len("subdistrict", &self.subdistrict, 1, 100)?;
        check_len("district", &self.district, 1, 100)?;
        check_len("province", &self.province, 1, 100)?;
        check_len("country", &self.country, 1, 100)?;
        check_len("postal_code", &self.postal_code, 1, 100)
    }
}

impl AddressPatch {
    fn validate(&self) -> Result<()> {
        let text_fields = [
            ("name", self.name.as_deref(), 2, 100),
            ("full_name", self.full_name.as_deref(), 2, 100),
            ("phone", self.phone.as_deref(), 1, 50),
            ("address_1", self.address_1.as_deref(), 1, 1000),
            ("address_2", self.address_2.value().map(String::as_str), 0, 1000),
            ("subdistrict", self.subdistrict.as_deref(), 1, 100),
            ("district", self.district.as_deref(), 1, 100),
            ("province", self.province.as_deref(), 1, 100),
            ("country", self.country.as_deref(), 1, 100),
            ("postal_code", self.postal_code.as_deref(), 1, 100),
        ];
        for (field, value, min, max) in text_fields {
            if let Some(value) = value {
                check_len(field, value, min, max)?;
            }
        }
        if let Some(status) = self.status {
            check_enum("status", status)?;
        }
        if let Some(kind) = self.kind {
            check_enum("type", kind)?;
        }
        Ok(())
    }
}

async fn find_existing<C: ConnectionTrait>(db: &C, address_id: &str) -> Result<AddressModel> {
    Address::find_by_id(address_id.to_string())
        .one(db)
        .await?
        .ok_or_else(|| Error::not_found("address", address_id))
}

const fn record(address: &AddressModel) -> OwnedRecord<'_> {
    OwnedRecord {
        owner: address.user_id.as_str(),
        status: address.status,
    }
}

pub async fn create_address<C: ConnectionTrait>(
    db: &C,
    principal: &Principal,
    input: NewAddress,
) -> Result<AddressModel> {
    input.validate()?;
    let permission = authorize_owned(principal, ADDRESS_POLICY, OwnedAction::Create)?;
    let owner = resolve_owner(db, permission, input.user_id.as_deref()).await?;

    let now = chrono::Utc::now();
    let model = address::ActiveModel {
        address_id: Set(new_id()),
        user_id: Set(owner),
        name: Set(input.name.trim().to_string()),
        status: Set(input.status.unwrap_or(ACTIVE_STATUS)),
        kind: Set(input.kind),
        full_name: Set(input.full_name.trim().to_string()),
        phone: Set(input.phone),
        address_1: Set(input.address_1),
        address_2: Set(input.address_2),
        subdistrict: Set(input.subdistrict),
        district: Set(input.district),
        province: Set(input.province),
        country: Set(input.country),
        postal_code: Set(input.postal_code),
        created_at: Set(now),
        updated_at: Set(now),
    };

    let created = model.insert(db).await?;
    info!(address_id = %created.address_id, owner = %created.user_id, "address created");
    Ok(created)
}

pub async fn get_address<C: ConnectionTrait>(
    db: &C,
    principal: &Principal,
    address_id: &str,
    shared: bool,
) -> Result<AddressModel> {
    let address = find_existing(db, address_id).await?;
    authorize_owned(
        principal,
        ADDRESS_POLICY,
        OwnedAction::Read {
            record: record(&address),
            shared,
        },
    )?;
    Ok(address)
}

pub async fn list_addresses<C: ConnectionTrait>(
    db: &C,
    principal: &Principal,
    requested_owner: Option<&str>,
    page: PageRequest,
) -> Result<Page<AddressModel>> {
    let select = match authorize_owned(
        principal,
        ADDRESS_POLICY,
        OwnedAction::List { requested_owner },
    )? {
        OwnedPermission::ListByOwner { owner, active_only } => {
            let select = Address::find().filter(AddressColumn::UserId.eq(owner));
            if active_only {
                select.filter(AddressColumn::Status.eq(ACTIVE_STATUS))
            } else {
                select
            }
        }
        _ => Address::find(),
    };

    fetch_page(db, select, AddressColumn::CreatedAt, page).await
}

pub async fn update_address<C: ConnectionTrait>(
    db: &C,
    principal: &Principal,
    address_id: &str,
    mut patch: AddressPatch,
) -> Result<AddressModel> {
    let existing = find_existing(db, address_id).await?;
    let permission = authorize_owned(
        principal,
        ADDRESS_POLICY,
        OwnedAction::Update {
            record: record(&existing),
        },
    )?;
    if permission == (OwnedPermission::Update { restricted: true }) {
        patch.status = None;
    }
    patch.validate()?;

    let mut model: address::ActiveModel = existing.into();
    if let Some(name) = patch.name {
        model.name = Set(name.trim().to_string());
    }
    if let Some(status) = patch.status {
        model.status = Set(status);
    }
    if let Some(kind) = patch.kind {
        model.kind = Set(kind);
    }
    if let Some(full_name) = patch.full_name {
        model.full_name = Set(full_name.trim().to_string());
    }
    if let Some(phone) = patch.phone {
        model.phone = Set(phone);
    }
    if let Some(address_1) = patch.address_1 {
        model.address_1 = Set(address_1);
    }
    if let Some(address_2) = patch.address_2.into_nullable() {
        model.address_2 = Set(address_2);
    }
    if let Some(subdistrict) = patch.subdistrict {
        model.subdistrict = Set(subdistrict);
    }
    if let Some(district) = patch.district {
        model.district = Set(district);
    }
    if let Some(province) = patch.province {
        model.province = Set(province);
    }
    if let Some(country) = patch.country {
        model.country = Set(country);
    }
    if let Some(postal_code) = patch.postal_code {
        model.postal_code = Set(postal_code);
    }
    model.updated_at = Set(chrono::Utc::now());

    model.update(db).await.map_err(Into::into)
}

/// Soft-removes an address by setting `status = 2`.
pub async fn remove_address<C: ConnectionTrait>(
    db: &C,
    principal: &Principal,
    address_id: &str,
) -> Result<AddressModel> {
    let existing = find_existing(db, address_id).await?;
    authorize_owned(
        principal,
        ADDRESS_POLICY,
        OwnedAction::Remove {
            record: record(&existing),
        },
    )?;

    let mut model: address::ActiveModel = existing.into();
    model.status = Set(REMOVED_STATUS);
    model.updated_at = Set(chrono::Utc::now());
    model.update(db).await.map_err(Into::into)
}

/// Hard-deletes an address. Admin only.
pub async fn delete_address<C: ConnectionTrait>(
    db: &C,
    principal: &Principal,
    address_id: &str,
) -> Result<()> {
    authorize_owned(principal, ADDRESS_POLICY, OwnedAction::Delete)?;
    let result = Address::delete_by_id(address_id.to_string()).exec(db).await?;
    if result.rows_affected == 0 {
        return Err(Error::not_found("address", address_id));
    }
    Ok(())
}
