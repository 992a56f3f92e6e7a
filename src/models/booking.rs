use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::de_decimal;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BookingStatus {
    Pending,
    Confirmed,
    Cancelled,
    Completed,
}

impl BookingStatus {
    /// The backend only allows cancelling pending or confirmed bookings
    pub fn is_cancellable(&self) -> bool {
        matches!(self, BookingStatus::Pending | BookingStatus::Confirmed)
    }
}

/// A stay booked at a rest place.
#[derive(Debug, Clone, Deserialize)]
pub struct Booking {
    pub id: i64,
    /// User id; the server fills this from the authenticated session
    pub user: i64,
    pub rest_place: i64,
    #[serde(default)]
    pub rest_place_name: Option<String>,
    #[serde(default)]
    pub user_name: Option<String>,
    pub check_in: DateTime<Utc>,
    pub check_out: DateTime<Utc>,
    pub status: BookingStatus,
    #[serde(deserialize_with = "de_decimal")]
    pub total_price: f64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Payload for booking a stay. User and status are server-assigned.
#[derive(Debug, Clone, Serialize)]
pub struct BookingRequest {
    pub check_in: DateTime<Utc>,
    pub check_out: DateTime<Utc>,
    /// Decimal string, e.g. "1200.00"; the backend stores two places
    pub total_price: String,
}

#[derive(Debug, Deserialize)]
pub struct CancelResponse {
    pub status: String,
}
