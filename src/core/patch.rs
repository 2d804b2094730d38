//! Tri-state fields for sparse update payloads.
//!
//! JSON distinguishes a missing key from an explicit `null`. [`Patch`] keeps
//! that distinction so update logic can tell "leave untouched" apart from
//! "clear". Fields of this type must carry `#[serde(default)]` so a missing
//! key deserializes to [`Patch::Absent`].

use serde::{Deserialize, Deserializer};

/// A single field of a sparse update.
#[derive(Debug, Clone, PartialEq)]
pub enum Patch<T> {
    /// Key not present in the payload
    Absent,
    /// Key present with an explicit `null`
    Null,
    /// Key present with a value
    Value(T),
}

impl<T> Default for Patch<T> {
    fn default() -> Self {
        Self::Absent
    }
}

impl<T> Patch<T> {
    /// Borrows the value, if one was supplied.
    #[must_use]
    pub const fn value(&self) -> Option<&T> {
        match self {
            Self::Value(v) => Some(v),
            Self::Absent | Self::Null => None,
        }
    }

    /// Staged write for a nullable column: `None` leaves it untouched,
    /// `Some(None)` clears it, `Some(Some(v))` sets it.
    #[must_use]
    pub fn into_nullable(self) -> Option<Option<T>> {
        match self {
            Self::Absent => None,
            Self::Null => Some(None),
            Self::Value(v) => Some(Some(v)),
        }
    }

    /// Write for a set-or-clear column: anything but a value clears it.
    #[must_use]
    pub fn into_set_or_clear(self) -> Option<T> {
        match self {
            Self::Value(v) => Some(v),
            Self::Absent | Self::Null => None,
        }
    }
}

impl<'de, T> Deserialize<'de> for Patch<T>
where
    T: Deserialize<'de>,
{
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        Option::<T>::deserialize(deserializer).map(|value| value.map_or(Self::Null, Self::Value))
    }
}
