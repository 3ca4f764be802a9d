//! Restaurant aggregate: the restaurant row together with its tables and reservations.

use std::hash::{Hash, Hasher};

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

use super::Customer;

/// A restaurant with every table and reservation it owns.
///
/// The whole value is loaded and saved as one unit.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Restaurant {
    pub id: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cuisine_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub opening_hours: Option<String>,
    pub capacity: u32,
    /// Declared number of tables, used by the capacity rule.
    pub table_count: u32,
    #[serde(default)]
    pub tables: Vec<Table>,
    #[serde(default)]
    pub reservations: Vec<Reservation>,
    #[serde(default)]
    pub updated_at: String,
    /// Internal version for optimistic concurrency control
    #[serde(default)]
    pub version: i64,
}

/// A physical table. Only exists inside its restaurant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Table {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    pub number: u32,
    pub capacity: u32,
    pub available: bool,
}

/// A booked slot at a restaurant.
///
/// Two reservations are the same reservation when their ids match, whatever
/// the other fields hold. Update and removal locate reservations this way.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Reservation {
    pub id: i64,
    #[serde(default)]
    pub restaurant_id: String,
    pub date: NaiveDate,
    pub time: NaiveTime,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub customer: Option<Customer>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub table: Option<Table>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<Comment>,
}

impl Reservation {
    /// Identity comparison: ids only.
    pub fn same_identity(&self, other: &Reservation) -> bool {
        self.id == other.id
    }

    /// Whether this reservation occupies exactly the given slot.
    pub fn is_at(&self, date: NaiveDate, time: NaiveTime) -> bool {
        self.date == date && self.time == time
    }
}

impl PartialEq for Reservation {
    fn eq(&self, other: &Self) -> bool {
        self.same_identity(other)
    }
}

impl Eq for Reservation {}

impl Hash for Reservation {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

/// Feedback left on a reservation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub customer: Option<Customer>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub restaurant_id: Option<String>,
}

impl Comment {
    /// A bare comment with text only.
    pub fn with_text(text: impl Into<String>) -> Self {
        Self {
            id: None,
            text: text.into(),
            rating: None,
            customer: None,
            restaurant_id: None,
        }
    }
}

/// Request body for registering a restaurant.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateRestaurantRequest {
    /// Caller-assigned id. A fresh UUID is used when absent.
    #[serde(default)]
    pub id: Option<String>,
    pub name: String,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub cuisine_type: Option<String>,
    #[serde(default)]
    pub opening_hours: Option<String>,
    #[serde(default)]
    pub capacity: u32,
    #[serde(default)]
    pub table_count: u32,
    #[serde(default)]
    pub tables: Vec<Table>,
    #[serde(default)]
    pub reservations: Vec<Reservation>,
}

/// Request body for updating an existing restaurant.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateRestaurantRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub cuisine_type: Option<String>,
    #[serde(default)]
    pub opening_hours: Option<String>,
    #[serde(default)]
    pub capacity: Option<u32>,
    #[serde(default)]
    pub table_count: Option<u32>,
    #[serde(default)]
    pub tables: Option<Vec<Table>>,
    #[serde(default)]
    pub reservations: Option<Vec<Reservation>>,
    /// Expected version for optimistic concurrency control
    #[serde(default)]
    pub expected_version: Option<i64>,
}

impl UpdateRestaurantRequest {
    /// Merge the provided fields into `restaurant`, keeping the rest.
    pub fn apply_to(&self, restaurant: &mut Restaurant) {
        if let Some(name) = &self.name {
            restaurant.name = name.clone();
        }
        if self.location.is_some() {
            restaurant.location = self.location.clone();
        }
        if self.cuisine_type.is_some() {
            restaurant.cuisine_type = self.cuisine_type.clone();
        }
        if self.opening_hours.is_some() {
            restaurant.opening_hours = self.opening_hours.clone();
        }
        if let Some(capacity) = self.capacity {
            restaurant.capacity = capacity;
        }
        if let Some(table_count) = self.table_count {
            restaurant.table_count = table_count;
        }
        if let Some(tables) = &self.tables {
            restaurant.tables = tables.clone();
        }
        if let Some(reservations) = &self.reservations {
            restaurant.reservations = reservations.clone();
        }
    }
}
