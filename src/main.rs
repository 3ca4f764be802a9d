//! Restaurant reservations backend
//!
//! REST backend for restaurants, customers and table bookings, persisted in SQLite.

mod api;
mod auth;
mod booking;
mod config;
mod db;
mod errors;
mod models;

use std::sync::Arc;

use axum::{
    middleware,
    routing::{delete, get, post, put},
    Router,
};
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use config::Config;
use db::Repository;

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    pub repo: Arc<Repository>,
    pub config: Arc<Config>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::from_env()?;

    // Initialize logging
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    // JSON lines for log shippers, plain text otherwise
    let (json_layer, text_layer) = if config.log_json {
        (Some(tracing_subscriber::fmt::layer().json()), None)
    } else {
        (None, Some(tracing_subscriber::fmt::layer()))
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(json_layer)
        .with(text_layer)
        .init();

    tracing::info!("Starting reservations backend");
    tracing::info!("Database path: {:?}", config.db_path);
    tracing::info!("Bind address: {}", config.bind_addr);

    if config.api_psk.is_none() {
        tracing::warn!("No API PSK configured (RESERVAS_API_PSK). Authentication is disabled!");
    }

    let pool = db::init_database(&config.db_path).await?;
    let repo = Arc::new(Repository::new(pool));

    let state = AppState {
        repo,
        config: Arc::new(config.clone()),
    };

    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    tracing::info!("Server listening on {}", config.bind_addr);

    axum::serve(listener, app).await?;

    Ok(())
}

/// Create the application router with all routes.
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let psk = state.config.api_psk.clone();

    let api_routes = Router::new()
        // Restaurants
        .route(
            "/restaurants",
            get(api::list_restaurants).post(api::create_restaurant),
        )
        .route(
            "/restaurants/{id}",
            get(api::get_restaurant)
                .put(api::update_restaurant)
                .delete(api::delete_restaurant),
        )
        .route("/restaurants/by-name/{name}", get(api::get_restaurant_by_name))
        .route(
            "/restaurants/by-location/{location}",
            get(api::get_restaurant_by_location),
        )
        .route(
            "/restaurants/by-cuisine/{cuisine_type}",
            get(api::get_restaurant_by_cuisine_type),
        )
        // Reservations
        .route("/restaurants/reserve", post(api::reserve))
        .route(
            "/restaurants/{id}/reservations",
            get(api::list_reservations).put(api::update_reservation),
        )
        .route(
            "/restaurants/{id}/reservations/{reservation_id}",
            delete(api::delete_reservation),
        )
        .route(
            "/restaurants/{id}/reservations/{reservation_id}/comment",
            put(api::add_comment),
        )
        // Customers
        .route(
            "/customers",
            get(api::list_customers).post(api::create_customer),
        )
        .route(
            "/customers/{id}",
            get(api::get_customer)
                .put(api::update_customer)
                .delete(api::delete_customer),
        )
        .route("/customers/by-name/{name}", get(api::get_customer_by_name))
        .route(
            "/customers/by-address/{address}",
            get(api::get_customer_by_address),
        )
        .route("/customers/by-phone/{phone}", get(api::get_customer_by_phone))
        // Apply PSK auth middleware
        .layer(middleware::from_fn(move |req, next| {
            auth::psk_auth_layer(psk.clone(), req, next)
        }));

    // Health check (no auth required)
    let health_routes = Router::new().route("/health", get(health_check));

    Router::new()
        .nest("/api", api_routes)
        .merge(health_routes)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors),
        )
        .with_state(state)
}

/// Health check endpoint.
async fn health_check() -> &'static str {
    "OK"
}
