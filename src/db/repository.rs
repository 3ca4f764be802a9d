//! Database repository for restaurant and customer aggregates.
//!
//! Aggregates are always read and written whole. Writes bump the row version;
//! a caller that passes an expected version gets a conditional write, a caller
//! that passes none overwrites whatever is stored.

use chrono::Utc;
use serde::de::DeserializeOwned;
use sqlx::{Row, SqlitePool};

use crate::errors::AppError;
use crate::models::{
    CreateCustomerRequest, CreateRestaurantRequest, Customer, Restaurant, UpdateCustomerRequest,
};

const RESTAURANT_COLUMNS: &str = "id, name, location, cuisine_type, opening_hours, capacity, \
     table_count, tables, reservations, updated_at, version";

const CUSTOMER_COLUMNS: &str = "id, name, email, phone, address, updated_at, version";

/// Restaurant fields that support equality lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RestaurantLookup {
    Name,
    Location,
    CuisineType,
}

impl RestaurantLookup {
    fn column(self) -> &'static str {
        match self {
            RestaurantLookup::Name => "name",
            RestaurantLookup::Location => "location",
            RestaurantLookup::CuisineType => "cuisine_type",
        }
    }
}

/// Customer fields that support equality lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CustomerLookup {
    Name,
    Address,
    Phone,
}

impl CustomerLookup {
    fn column(self) -> &'static str {
        match self {
            CustomerLookup::Name => "name",
            CustomerLookup::Address => "address",
            CustomerLookup::Phone => "phone",
        }
    }
}

/// Database repository for all data operations.
#[derive(Clone)]
pub struct Repository {
    pool: SqlitePool,
}

impl Repository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    // ==================== RESTAURANT OPERATIONS ====================

    /// List all restaurants.
    pub async fn list_restaurants(&self) -> Result<Vec<Restaurant>, AppError> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM restaurants ORDER BY name",
            RESTAURANT_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(restaurant_from_row).collect()
    }

    /// Get a restaurant by ID.
    pub async fn get_restaurant(&self, id: &str) -> Result<Option<Restaurant>, AppError> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM restaurants WHERE id = ?",
            RESTAURANT_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(restaurant_from_row).transpose()
    }

    /// First restaurant whose `field` equals `value`, in insertion order.
    pub async fn find_restaurant(
        &self,
        field: RestaurantLookup,
        value: &str,
    ) -> Result<Option<Restaurant>, AppError> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM restaurants WHERE {} = ? ORDER BY rowid LIMIT 1",
            RESTAURANT_COLUMNS,
            field.column()
        ))
        .bind(value)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(restaurant_from_row).transpose()
    }

    pub async fn find_restaurant_by_name(&self, name: &str) -> Result<Option<Restaurant>, AppError> {
        self.find_restaurant(RestaurantLookup::Name, name).await
    }

    pub async fn find_restaurant_by_location(
        &self,
        location: &str,
    ) -> Result<Option<Restaurant>, AppError> {
        self.find_restaurant(RestaurantLookup::Location, location)
            .await
    }

    pub async fn find_restaurant_by_cuisine_type(
        &self,
        cuisine_type: &str,
    ) -> Result<Option<Restaurant>, AppError> {
        self.find_restaurant(RestaurantLookup::CuisineType, cuisine_type)
            .await
    }

    /// Register a restaurant. A caller-supplied id that already exists is overwritten.
    pub async fn create_restaurant(
        &self,
        request: &CreateRestaurantRequest,
    ) -> Result<Restaurant, AppError> {
        let restaurant = Restaurant {
            id: assign_id(request.id.as_deref()),
            name: request.name.clone(),
            location: request.location.clone(),
            cuisine_type: request.cuisine_type.clone(),
            opening_hours: request.opening_hours.clone(),
            capacity: request.capacity,
            table_count: request.table_count,
            tables: request.tables.clone(),
            reservations: request.reservations.clone(),
            updated_at: String::new(),
            version: 0,
        };

        self.save_restaurant(&restaurant, None).await
    }

    /// Write the whole aggregate: insert when the id is new, overwrite otherwise.
    ///
    /// With `expected_version` the write only happens if the stored version
    /// still matches; a missing row is then `NotFound` rather than an insert.
    pub async fn save_restaurant(
        &self,
        restaurant: &Restaurant,
        expected_version: Option<i64>,
    ) -> Result<Restaurant, AppError> {
        let tables_json = serde_json::to_string(&restaurant.tables)?;
        let reservations_json = serde_json::to_string(&restaurant.reservations)?;
        let now = Utc::now().to_rfc3339();

        let mut tx = self.pool.begin().await?;

        let current: Option<i64> = sqlx::query("SELECT version FROM restaurants WHERE id = ?")
            .bind(&restaurant.id)
            .fetch_optional(&mut *tx)
            .await?
            .map(|row| row.get("version"));

        let new_version = match (current, expected_version) {
            (None, Some(_)) => {
                return Err(AppError::NotFound(format!(
                    "Restaurant {} not found",
                    restaurant.id
                )));
            }
            (Some(current), Some(expected)) if current != expected => {
                return Err(version_mismatch(expected, current));
            }
            (None, None) => {
                sqlx::query(
                    "INSERT INTO restaurants (id, name, location, cuisine_type, opening_hours, capacity, table_count, tables, reservations, updated_at, version) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, 1)"
                )
                .bind(&restaurant.id)
                .bind(&restaurant.name)
                .bind(&restaurant.location)
                .bind(&restaurant.cuisine_type)
                .bind(&restaurant.opening_hours)
                .bind(i64::from(restaurant.capacity))
                .bind(i64::from(restaurant.table_count))
                .bind(&tables_json)
                .bind(&reservations_json)
                .bind(&now)
                .execute(&mut *tx)
                .await?;
                1
            }
            (Some(current), _) => {
                let result = sqlx::query(
                    "UPDATE restaurants SET name = ?, location = ?, cuisine_type = ?, opening_hours = ?, capacity = ?, table_count = ?, tables = ?, reservations = ?, updated_at = ?, version = ? WHERE id = ? AND version = ?"
                )
                .bind(&restaurant.name)
                .bind(&restaurant.location)
                .bind(&restaurant.cuisine_type)
                .bind(&restaurant.opening_hours)
                .bind(i64::from(restaurant.capacity))
                .bind(i64::from(restaurant.table_count))
                .bind(&tables_json)
                .bind(&reservations_json)
                .bind(&now)
                .bind(current + 1)
                .bind(&restaurant.id)
                .bind(current)
                .execute(&mut *tx)
                .await?;

                if result.rows_affected() == 0 {
                    return Err(AppError::Conflict {
                        message: "Concurrent modification detected".to_string(),
                        current_version: current,
                    });
                }
                current + 1
            }
        };

        tx.commit().await?;

        let mut saved = restaurant.clone();
        saved.updated_at = now;
        saved.version = new_version;
        Ok(saved)
    }

    /// Load a restaurant, run `mutate` on it, and save it back whole.
    ///
    /// Nothing is written when `mutate` fails. The expected version, when
    /// given, is checked both on load and on save.
    pub async fn modify_restaurant<T, F>(
        &self,
        id: &str,
        expected_version: Option<i64>,
        mutate: F,
    ) -> Result<(T, Restaurant), AppError>
    where
        F: FnOnce(&mut Restaurant) -> Result<T, AppError>,
    {
        let mut restaurant = self
            .get_restaurant(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Restaurant {} not found", id)))?;

        if let Some(expected) = expected_version {
            if restaurant.version != expected {
                return Err(version_mismatch(expected, restaurant.version));
            }
        }

        let output = mutate(&mut restaurant)?;
        let saved = self.save_restaurant(&restaurant, expected_version).await?;
        Ok((output, saved))
    }

    /// Delete a restaurant together with its tables and reservations.
    pub async fn delete_restaurant(&self, id: &str) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM restaurants WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Restaurant {} not found", id)));
        }

        Ok(())
    }

    // ==================== CUSTOMER OPERATIONS ====================

    /// List all customers.
    pub async fn list_customers(&self) -> Result<Vec<Customer>, AppError> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM customers ORDER BY name",
            CUSTOMER_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(customer_from_row).collect())
    }

    /// Get a customer by ID.
    pub async fn get_customer(&self, id: &str) -> Result<Option<Customer>, AppError> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM customers WHERE id = ?",
            CUSTOMER_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.as_ref().map(customer_from_row))
    }

    /// First customer whose `field` equals `value`, in insertion order.
    pub async fn find_customer(
        &self,
        field: CustomerLookup,
        value: &str,
    ) -> Result<Option<Customer>, AppError> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM customers WHERE {} = ? ORDER BY rowid LIMIT 1",
            CUSTOMER_COLUMNS,
            field.column()
        ))
        .bind(value)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.as_ref().map(customer_from_row))
    }

    pub async fn find_customer_by_name(&self, name: &str) -> Result<Option<Customer>, AppError> {
        self.find_customer(CustomerLookup::Name, name).await
    }

    pub async fn find_customer_by_address(
        &self,
        address: &str,
    ) -> Result<Option<Customer>, AppError> {
        self.find_customer(CustomerLookup::Address, address).await
    }

    pub async fn find_customer_by_phone(&self, phone: &str) -> Result<Option<Customer>, AppError> {
        self.find_customer(CustomerLookup::Phone, phone).await
    }

    /// Register a customer. A caller-supplied id that already exists is overwritten.
    pub async fn create_customer(
        &self,
        request: &CreateCustomerRequest,
    ) -> Result<Customer, AppError> {
        let customer = Customer {
            id: Some(assign_id(request.id.as_deref())),
            name: Some(request.name.clone()),
            email: request.email.clone(),
            phone: request.phone.clone(),
            address: request.address.clone(),
            updated_at: String::new(),
            version: 0,
        };

        self.save_customer(&customer, None).await
    }

    /// Update a customer, merging the provided fields.
    pub async fn update_customer(
        &self,
        id: &str,
        request: &UpdateCustomerRequest,
    ) -> Result<Customer, AppError> {
        let mut customer = self
            .get_customer(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Customer {} not found", id)))?;

        if let Some(expected) = request.expected_version {
            if customer.version != expected {
                return Err(version_mismatch(expected, customer.version));
            }
        }

        if request.name.is_some() {
            customer.name = request.name.clone();
        }
        customer.email = request.email.clone().or(customer.email);
        customer.phone = request.phone.clone().or(customer.phone);
        customer.address = request.address.clone().or(customer.address);

        self.save_customer(&customer, request.expected_version)
            .await
    }

    /// Write a whole customer record; same version rules as restaurants.
    async fn save_customer(
        &self,
        customer: &Customer,
        expected_version: Option<i64>,
    ) -> Result<Customer, AppError> {
        let id = customer
            .id
            .clone()
            .ok_or_else(|| AppError::Validation("Customer id is required".to_string()))?;
        let name = customer.name.clone().unwrap_or_default();
        let now = Utc::now().to_rfc3339();

        let mut tx = self.pool.begin().await?;

        let current: Option<i64> = sqlx::query("SELECT version FROM customers WHERE id = ?")
            .bind(&id)
            .fetch_optional(&mut *tx)
            .await?
            .map(|row| row.get("version"));

        let new_version = match (current, expected_version) {
            (None, Some(_)) => {
                return Err(AppError::NotFound(format!("Customer {} not found", id)));
            }
            (Some(current), Some(expected)) if current != expected => {
                return Err(version_mismatch(expected, current));
            }
            (None, None) => {
                sqlx::query(
                    "INSERT INTO customers (id, name, email, phone, address, updated_at, version) VALUES (?, ?, ?, ?, ?, ?, 1)"
                )
                .bind(&id)
                .bind(&name)
                .bind(&customer.email)
                .bind(&customer.phone)
                .bind(&customer.address)
                .bind(&now)
                .execute(&mut *tx)
                .await?;
                1
            }
            (Some(current), _) => {
                let result = sqlx::query(
                    "UPDATE customers SET name = ?, email = ?, phone = ?, address = ?, updated_at = ?, version = ? WHERE id = ? AND version = ?"
                )
                .bind(&name)
                .bind(&customer.email)
                .bind(&customer.phone)
                .bind(&customer.address)
                .bind(&now)
                .bind(current + 1)
                .bind(&id)
                .bind(current)
                .execute(&mut *tx)
                .await?;

                if result.rows_affected() == 0 {
                    return Err(AppError::Conflict {
                        message: "Concurrent modification detected".to_string(),
                        current_version: current,
                    });
                }
                current + 1
            }
        };

        tx.commit().await?;

        let mut saved = customer.clone();
        saved.updated_at = now;
        saved.version = new_version;
        Ok(saved)
    }

    /// Delete a customer.
    pub async fn delete_customer(&self, id: &str) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM customers WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Customer {} not found", id)));
        }

        Ok(())
    }
}

// Helper functions

fn assign_id(requested: Option<&str>) -> String {
    match requested.map(str::trim) {
        Some(id) if !id.is_empty() => id.to_string(),
        _ => uuid::Uuid::new_v4().to_string(),
    }
}

fn version_mismatch(expected: i64, current: i64) -> AppError {
    AppError::Conflict {
        message: format!(
            "Version mismatch: expected {}, current {}",
            expected, current
        ),
        current_version: current,
    }
}

fn restaurant_from_row(row: &sqlx::sqlite::SqliteRow) -> Result<Restaurant, AppError> {
    let id: String = row.get("id");
    let capacity: i64 = row.get("capacity");
    let table_count: i64 = row.get("table_count");
    let tables: String = row.get("tables");
    let reservations: String = row.get("reservations");
    Ok(Restaurant {
        capacity: column_u32(&id, "capacity", capacity)?,
        table_count: column_u32(&id, "table_count", table_count)?,
        tables: column_json(&id, "tables", &tables)?,
        reservations: column_json(&id, "reservations", &reservations)?,
        name: row.get("name"),
        location: row.get("location"),
        cuisine_type: row.get("cuisine_type"),
        opening_hours: row.get("opening_hours"),
        updated_at: row.get("updated_at"),
        version: row.get("version"),
        id,
    })
}

fn customer_from_row(row: &sqlx::sqlite::SqliteRow) -> Customer {
    Customer {
        id: row.get("id"),
        name: row.get("name"),
        email: row.get("email"),
        phone: row.get("phone"),
        address: row.get("address"),
        updated_at: row.get("updated_at"),
        version: row.get("version"),
    }
}

fn column_u32(id: &str, column: &str, value: i64) -> Result<u32, AppError> {
    u32::try_from(value).map_err(|_| {
        tracing::error!(restaurant_id = %id, column, value, "Stored value out of range");
        AppError::Database(format!(
            "Restaurant {} has out-of-range {}: {}",
            id, column, value
        ))
    })
}

fn column_json<T: DeserializeOwned>(id: &str, column: &str, text: &str) -> Result<T, AppError> {
    serde_json::from_str(text).map_err(|e| {
        tracing::error!(restaurant_id = %id, column, error = %e, "Unreadable JSON column");
        AppError::Database(format!("Restaurant {} has unreadable {}: {}", id, column, e))
    })
}
