//! Data models for the Roadmate backend's REST API.
//!
//! These mirror the backend's serializer output. Two wire-format quirks
//! are handled here: model decimal fields arrive as JSON strings while
//! hand-built responses carry bare numbers, and unused serializer fields
//! are simply ignored.

pub mod booking;
pub mod place;
pub mod user;

pub use booking::{Booking, BookingRequest, BookingStatus, CancelResponse};
pub use place::{Amenity, PlaceFilter, PlaceType, RestPlace};
pub use user::{
    CreditsAdded, CreditsBalance, ProfileUpdate, RegisterRequest, RegisterResponse, UserProfile,
};

use serde::{Deserialize, Deserializer};

/// Accept a decimal serialized either as a string or a bare number
pub(crate) fn de_decimal<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Num(f64),
        Str(String),
    }
    match Raw::deserialize(deserializer)? {
        Raw::Num(n) => Ok(n),
        Raw::Str(s) => s.parse().map_err(serde::de::Error::custom),
    }
}

/// Optional variant of [`de_decimal`]; treats null as absent
pub(crate) fn de_decimal_opt<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Num(f64),
        Str(String),
    }
    match Option::<Raw>::deserialize(deserializer)? {
        Some(Raw::Num(n)) => Ok(Some(n)),
        Some(Raw::Str(s)) => s.parse().map(Some).map_err(serde::de::Error::custom),
        None => Ok(None),
    }
}
