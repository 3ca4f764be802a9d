//! Request bodies for the reservation endpoints.

use chrono::{NaiveDate, NaiveTime};
use serde::Deserialize;

use super::{Comment, Customer, Reservation, Table};

/// Request body for booking a table.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReserveRequest {
    pub restaurant_id: String,
    pub date: NaiveDate,
    pub time: NaiveTime,
    #[serde(default)]
    pub customer_name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub customer_id: Option<String>,
    /// Expected restaurant version for optimistic concurrency control
    #[serde(default)]
    pub expected_version: Option<i64>,
}

impl ReserveRequest {
    /// The customer copy embedded in the new reservation.
    pub fn customer(&self) -> Customer {
        Customer {
            id: self.customer_id.clone(),
            name: self.customer_name.clone(),
            email: self.email.clone(),
            phone: self.phone.clone(),
            address: None,
            updated_at: String::new(),
            version: 0,
        }
    }
}

/// Request body for attaching a comment to a reservation.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddCommentRequest {
    pub comment_text: String,
    #[serde(default)]
    pub expected_version: Option<i64>,
}

/// Request body for overwriting a reservation. The id selects the target.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateReservationRequest {
    pub id: i64,
    pub date: NaiveDate,
    pub time: NaiveTime,
    #[serde(default)]
    pub customer: Option<Customer>,
    #[serde(default)]
    pub table: Option<Table>,
    #[serde(default)]
    pub comment: Option<Comment>,
    #[serde(default)]
    pub expected_version: Option<i64>,
}

impl UpdateReservationRequest {
    pub fn into_reservation(self, restaurant_id: &str) -> Reservation {
        Reservation {
            id: self.id,
            restaurant_id: restaurant_id.to_string(),
            date: self.date,
            time: self.time,
            customer: self.customer,
            table: self.table,
            comment: self.comment,
        }
    }
}

/// Query string (`?expectedVersion=N`) for deletions that want a version check.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VersionQuery {
    #[serde(default)]
    pub expected_version: Option<i64>,
}
