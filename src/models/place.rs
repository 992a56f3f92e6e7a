use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::de_decimal;

/// Kind of rest place along the highway
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlaceType {
    Hotel,
    Motel,
    RestStop,
}

impl PlaceType {
    /// Wire value used in query parameters
    pub fn as_str(&self) -> &'static str {
        match self {
            PlaceType::Hotel => "hotel",
            PlaceType::Motel => "motel",
            PlaceType::RestStop => "rest_stop",
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Amenity {
    pub id: i64,
    pub name: String,
    /// FontAwesome icon name the UI renders for this amenity
    #[serde(default)]
    pub icon: Option<String>,
}

/// A hotel, motel, or rest stop returned by `/rest-places/places/`.
#[derive(Debug, Clone, Deserialize)]
pub struct RestPlace {
    pub id: i64,
    pub name: String,
    pub place_type: PlaceType,
    #[serde(default)]
    pub description: String,
    #[serde(deserialize_with = "de_decimal")]
    pub latitude: f64,
    #[serde(deserialize_with = "de_decimal")]
    pub longitude: f64,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub state: String,
    #[serde(default)]
    pub country: String,
    /// Relative cost bracket: "$", "$$", or "$$$"
    #[serde(default)]
    pub price_range: String,
    #[serde(default)]
    pub contact_number: String,
    #[serde(default = "default_available")]
    pub is_available: bool,
    #[serde(default)]
    pub amenities: Vec<Amenity>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

fn default_available() -> bool {
    true
}

impl RestPlace {
    pub fn has_amenity(&self, name: &str) -> bool {
        self.amenities
            .iter()
            .any(|a| a.name.eq_ignore_ascii_case(name))
    }
}

/// Search filters for the rest place list endpoint.
///
/// Unset fields are omitted from the query string; the backend treats
/// missing parameters as "no constraint".
#[derive(Debug, Clone, Default)]
pub struct PlaceFilter {
    /// Free-text search across name, description, address, and amenities
    pub search: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub place_type: Option<PlaceType>,
    pub price_range: Option<String>,
}

impl PlaceFilter {
    pub fn query_params(&self) -> Vec<(&'static str, String)> {
        let mut params = Vec::new();
        if let Some(ref search) = self.search {
            params.push(("search", search.clone()));
        }
        if let Some(ref city) = self.city {
            params.push(("city", city.clone()));
        }
        if let Some(ref state) = self.state {
            params.push(("state", state.clone()));
        }
        if let Some(place_type) = self.place_type {
            params.push(("place_type", place_type.as_str().to_string()));
        }
        if let Some(ref price_range) = self.price_range {
            params.push(("price_range", price_range.clone()));
        }
        params
    }
}
