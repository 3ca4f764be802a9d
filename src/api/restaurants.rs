//! Restaurant API endpoints.

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    Json,
};

use super::{created, found, no_content, success, ApiResult};
use crate::errors::AppError;
use crate::models::{CreateRestaurantRequest, Restaurant, UpdateRestaurantRequest};
use crate::AppState;

/// GET /api/restaurants - List all restaurants.
pub async fn list_restaurants(State(state): State<AppState>) -> ApiResult<Vec<Restaurant>> {
    success(state.repo.list_restaurants().await?)
}

/// GET /api/restaurants/:id - Get a single restaurant.
pub async fn get_restaurant(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Restaurant> {
    let restaurant = state.repo.get_restaurant(&id).await?;
    success(found(restaurant, "Restaurant", &id)?)
}

/// GET /api/restaurants/by-name/:name
pub async fn get_restaurant_by_name(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> ApiResult<Restaurant> {
    let restaurant = state.repo.find_restaurant_by_name(&name).await?;
    success(found(restaurant, "Restaurant named", &name)?)
}

/// GET /api/restaurants/by-location/:location
pub async fn get_restaurant_by_location(
    State(state): State<AppState>,
    Path(location): Path<String>,
) -> ApiResult<Restaurant> {
    let restaurant = state.repo.find_restaurant_by_location(&location).await?;
    success(found(restaurant, "Restaurant at", &location)?)
}

/// GET /api/restaurants/by-cuisine/:cuisine_type
pub async fn get_restaurant_by_cuisine_type(
    State(state): State<AppState>,
    Path(cuisine_type): Path<String>,
) -> ApiResult<Restaurant> {
    let restaurant = state
        .repo
        .find_restaurant_by_cuisine_type(&cuisine_type)
        .await?;
    success(found(restaurant, "Restaurant serving", &cuisine_type)?)
}

/// POST /api/restaurants - Register a restaurant.
pub async fn create_restaurant(
    State(state): State<AppState>,
    payload: Result<Json<CreateRestaurantRequest>, JsonRejection>,
) -> ApiResult<Restaurant> {
    let Json(request) = payload?;

    if request.name.trim().is_empty() {
        return Err(AppError::Validation(
            "Restaurant name is required".to_string(),
        ));
    }

    let restaurant = state.repo.create_restaurant(&request).await?;
    tracing::info!(restaurant_id = %restaurant.id, "Registered restaurant");
    created(restaurant)
}

/// PUT /api/restaurants/:id - Update a restaurant.
pub async fn update_restaurant(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<UpdateRestaurantRequest>, JsonRejection>,
) -> ApiResult<Restaurant> {
    let Json(request) = payload?;

    if matches!(&request.name, Some(name) if name.trim().is_empty()) {
        return Err(AppError::Validation(
            "Restaurant name cannot be empty".to_string(),
        ));
    }

    let ((), restaurant) = state
        .repo
        .modify_restaurant(&id, request.expected_version, |restaurant| {
            request.apply_to(restaurant);
            Ok(())
        })
        .await?;
    success(restaurant)
}

/// DELETE /api/restaurants/:id - Delete a restaurant.
pub async fn delete_restaurant(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    state.repo.delete_restaurant(&id).await?;
    tracing::info!(restaurant_id = %id, "Deleted restaurant");
    no_content()
}
