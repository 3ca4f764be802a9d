//! Data models for the reservations backend.
//!
//! JSON field names are camelCase throughout.

mod customer;
mod reservation;
mod restaurant;

pub use customer::*;
pub use reservation::*;
pub use restaurant::*;
