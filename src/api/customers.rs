//! Customer API endpoints.

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    Json,
};

use super::{created, found, no_content, success, ApiResult};
use crate::errors::AppError;
use crate::models::{CreateCustomerRequest, Customer, UpdateCustomerRequest};
use crate::AppState;

/// GET /api/customers - List all customers.
pub async fn list_customers(State(state): State<AppState>) -> ApiResult<Vec<Customer>> {
    success(state.repo.list_customers().await?)
}

/// GET /api/customers/:id - Get a single customer.
pub async fn get_customer(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Customer> {
    let customer = state.repo.get_customer(&id).await?;
    success(found(customer, "Customer", &id)?)
}

pub async fn get_customer_by_name(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> ApiResult<Customer> {
    let customer = state.repo.find_customer_by_name(&name).await?;
    success(found(customer, "Customer named", &name)?)
}

pub async fn get_customer_by_address(
    State(state): State<AppState>,
    Path(address): Path<String>,
) -> ApiResult<Customer> {
    let customer = state.repo.find_customer_by_address(&address).await?;
    success(found(customer, "Customer at", &address)?)
}

pub async fn get_customer_by_phone(
    State(state): State<AppState>,
    Path(phone): Path<String>,
) -> ApiResult<Customer> {
    let customer = state.repo.find_customer_by_phone(&phone).await?;
    success(found(customer, "Customer with phone", &phone)?)
}

/// POST /api/customers - Register a customer.
pub async fn create_customer(
    State(state): State<AppState>,
    payload: Result<Json<CreateCustomerRequest>, JsonRejection>,
) -> ApiResult<Customer> {
    let Json(request) = payload?;

    // Validate required fields
    if request.name.trim().is_empty() {
        return Err(AppError::Validation("Customer name is required".to_string()));
    }

    created(state.repo.create_customer(&request).await?)
}

/// PUT /api/customers/:id - Update a customer.
pub async fn update_customer(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<UpdateCustomerRequest>, JsonRejection>,
) -> ApiResult<Customer> {
    let Json(request) = payload?;
    success(state.repo.update_customer(&id, &request).await?)
}

/// DELETE /api/customers/:id - Delete a customer.
pub async fn delete_customer(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    state.repo.delete_customer(&id).await?;
    no_content()
}
