use serde::{Deserialize, Serialize};

use super::de_decimal;

/// Profile of the authenticated user, as returned by `/users/profile/`.
#[derive(Debug, Clone, Deserialize)]
pub struct UserProfile {
    pub id: i64,
    pub username: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub phone_number: Option<String>,
    /// Credit balance; a decimal string on the wire
    #[serde(default, deserialize_with = "super::de_decimal_opt")]
    pub credits: Option<f64>,
    #[serde(default)]
    pub is_verified: bool,
}

impl UserProfile {
    /// Name for display: "First Last" when set, else the username
    pub fn display_name(&self) -> String {
        match (self.first_name.as_deref(), self.last_name.as_deref()) {
            (Some(first), Some(last)) if !first.is_empty() && !last.is_empty() => {
                format!("{} {}", first, last)
            }
            (Some(first), _) if !first.is_empty() => first.to_string(),
            _ => self.username.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct RegisterResponse {
    pub message: String,
    pub user: UserProfile,
}

/// Partial profile update; unset fields are not sent
#[derive(Debug, Clone, Default, Serialize)]
pub struct ProfileUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CreditsBalance {
    #[serde(deserialize_with = "de_decimal")]
    pub credits: f64,
}

#[derive(Debug, Deserialize)]
pub struct CreditsAdded {
    pub message: String,
    #[serde(deserialize_with = "de_decimal")]
    pub new_balance: f64,
}
