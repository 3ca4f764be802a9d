//! Reservation assignment over a loaded restaurant aggregate.
//!
//! Everything here is synchronous and works on memory only. Callers load the
//! restaurant, run one of these operations, then save the whole aggregate.
//! No locking happens here; concurrent writers are detected, if at all, by the
//! version check in the store.
//!
//! Known limitations, kept on purpose until product decides otherwise:
//! - The capacity rule only rejects when the raw reservation count has reached
//!   the declared table count *and* an existing reservation sits on the exact
//!   same slot. It does not model per-slot occupancy of individual tables.
//! - Removing a reservation leaves its table marked unavailable.

use std::fmt;

use chrono::{NaiveDate, NaiveTime};

use crate::models::{Comment, Customer, Reservation, Restaurant};

/// Why an operation on the aggregate was rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BookingError {
    /// No reservation with this id in the restaurant
    NotFound(i64),
    /// Restaurant is full for the requested slot
    CapacityExceeded { date: NaiveDate, time: NaiveTime },
    /// Every table is already held
    NoTableAvailable,
    /// The largest reservation id is already `i64::MAX`
    ReservationIdsExhausted,
}

impl fmt::Display for BookingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BookingError::NotFound(id) => write!(f, "Reservation {} not found", id),
            BookingError::CapacityExceeded { date, time } => write!(
                f,
                "Restaurant has no capacity left for {} at {}",
                date, time
            ),
            BookingError::NoTableAvailable => write!(f, "No table available"),
            BookingError::ReservationIdsExhausted => {
                write!(f, "No reservation id left after {}", i64::MAX)
            }
        }
    }
}

impl std::error::Error for BookingError {}

/// Capacity rule: full by raw count and the exact slot is already taken.
pub fn is_unavailable(restaurant: &Restaurant, date: NaiveDate, time: NaiveTime) -> bool {
    restaurant.reservations.len() as u64 >= u64::from(restaurant.table_count)
        && restaurant.reservations.iter().any(|r| r.is_at(date, time))
}

/// Book the first available table for `customer` at the given slot.
///
/// On success the table is flipped to unavailable and the reservation is
/// appended to the restaurant. On failure nothing is touched.
pub fn book(
    restaurant: &mut Restaurant,
    date: NaiveDate,
    time: NaiveTime,
    customer: Customer,
) -> Result<Reservation, BookingError> {
    if is_unavailable(restaurant, date, time) {
        return Err(BookingError::CapacityExceeded { date, time });
    }

    let id = next_reservation_id(restaurant)?;
    let table = restaurant
        .tables
        .iter_mut()
        .find(|t| t.available)
        .ok_or(BookingError::NoTableAvailable)?;
    table.available = false;
    let table = table.clone();

    let reservation = Reservation {
        id,
        restaurant_id: restaurant.id.clone(),
        date,
        time,
        customer: Some(customer),
        table: Some(table),
        comment: None,
    };
    restaurant.reservations.push(reservation.clone());

    Ok(reservation)
}

/// Attach a text-only comment, replacing any previous one.
pub fn add_comment(
    restaurant: &mut Restaurant,
    reservation_id: i64,
    text: &str,
) -> Result<Reservation, BookingError> {
    let reservation = find_mut(restaurant, reservation_id)?;
    reservation.comment = Some(Comment::with_text(text));
    Ok(reservation.clone())
}

/// Overwrite the reservation sharing `updated`'s identity.
pub fn update_reservation(
    restaurant: &mut Restaurant,
    updated: Reservation,
) -> Result<Reservation, BookingError> {
    let existing = restaurant
        .reservations
        .iter_mut()
        .find(|r| r.same_identity(&updated))
        .ok_or(BookingError::NotFound(updated.id))?;

    existing.comment = updated.comment;
    existing.customer = updated.customer;
    existing.date = updated.date;
    existing.time = updated.time;
    existing.table = updated.table;

    Ok(existing.clone())
}

/// Drop a reservation. Its table stays held.
pub fn remove_reservation(
    restaurant: &mut Restaurant,
    reservation_id: i64,
) -> Result<(), BookingError> {
    let index = restaurant
        .reservations
        .iter()
        .position(|r| r.id == reservation_id)
        .ok_or(BookingError::NotFound(reservation_id))?;
    restaurant.reservations.remove(index);
    Ok(())
}

fn find_mut(restaurant: &mut Restaurant, id: i64) -> Result<&mut Reservation, BookingError> {
    restaurant
        .reservations
        .iter_mut()
        .find(|r| r.id == id)
        .ok_or(BookingError::NotFound(id))
}

fn next_reservation_id(restaurant: &Restaurant) -> Result<i64, BookingError> {
    match restaurant.reservations.iter().map(|r| r.id).max() {
        None => Ok(1),
        Some(max) => max
            .checked_add(1)
            .ok_or(BookingError::ReservationIdsExhausted),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Table;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn time(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    fn table(number: u32, available: bool) -> Table {
        Table {
            id: Some(number as i64),
            number,
            capacity: 4,
            available,
        }
    }

    fn reservation(id: i64, d: NaiveDate, t: NaiveTime) -> Reservation {
        Reservation {
            id,
            restaurant_id: "r1".to_string(),
            date: d,
            time: t,
            customer: None,
            table: None,
            comment: None,
        }
    }

    fn restaurant(table_count: u32, tables: Vec<Table>, reservations: Vec<Reservation>) -> Restaurant {
        Restaurant {
            id: "r1".to_string(),
            name: "Cantina".to_string(),
            location: Some("Rua das Flores, 10".to_string()),
            cuisine_type: Some("Italian".to_string()),
            opening_hours: Some("11:00-23:00".to_string()),
            capacity: 40,
            table_count,
            tables,
            reservations,
            updated_at: String::new(),
            version: 1,
        }
    }

    fn customer() -> Customer {
        Customer {
            id: Some("c1".to_string()),
            name: Some("Ana".to_string()),
            email: Some("ana@example.com".to_string()),
            phone: Some("5511999990000".to_string()),
            address: None,
            updated_at: String::new(),
            version: 0,
        }
    }

    #[test]
    fn test_book_end_to_end() {
        let mut r = restaurant(10, vec![table(1, true)], vec![]);

        let booked = book(&mut r, date(2024, 1, 1), time(13, 30), customer()).unwrap();

        assert_eq!(booked.date, date(2024, 1, 1));
        assert_eq!(booked.time, time(13, 30));
        assert_eq!(booked.id, 1);
        assert_eq!(booked.restaurant_id, "r1");
        assert_eq!(booked.customer, Some(customer()));
        assert!(!r.tables[0].available);
        assert_eq!(booked.table.as_ref().map(|t| t.available), Some(false));
        assert_eq!(r.reservations.len(), 1);
    }

    #[test]
    fn test_sequential_bookings_pick_different_tables() {
        let mut r = restaurant(10, vec![table(1, true), table(2, true), table(3, true)], vec![]);

        let first = book(&mut r, date(2024, 1, 1), time(12, 0), customer()).unwrap();
        let second = book(&mut r, date(2024, 1, 1), time(20, 0), customer()).unwrap();

        let first_table = first.table.unwrap().number;
        let second_table = second.table.unwrap().number;
        assert_eq!(first_table, 1);
        assert_eq!(second_table, 2);
        assert_ne!(first.id, second.id);
        assert!(r.tables[2].available);
    }

    #[test]
    fn test_capacity_exceeded_on_matching_slot() {
        let existing = reservation(1, date(2024, 1, 1), time(13, 30));
        let mut r = restaurant(1, vec![table(1, false), table(2, true)], vec![existing]);

        let err = book(&mut r, date(2024, 1, 1), time(13, 30), customer()).unwrap_err();

        assert_eq!(
            err,
            BookingError::CapacityExceeded {
                date: date(2024, 1, 1),
                time: time(13, 30)
            }
        );
        assert!(r.tables[1].available);
        assert_eq!(r.reservations.len(), 1);
    }

    #[test]
    fn test_full_restaurant_accepts_other_slot() {
        let existing = reservation(1, date(2024, 1, 1), time(13, 30));
        let mut r = restaurant(1, vec![table(1, false), table(2, true)], vec![existing]);

        let booked = book(&mut r, date(2024, 1, 1), time(19, 0), customer()).unwrap();

        assert_eq!(booked.table.unwrap().number, 2);
        assert_eq!(booked.id, 2);
        assert_eq!(r.reservations.len(), 2);
    }

    #[test]
    fn test_matching_slot_under_count_is_available() {
        let existing = reservation(1, date(2024, 1, 1), time(13, 30));
        let r = restaurant(2, vec![table(1, true)], vec![existing]);

        assert!(!is_unavailable(&r, date(2024, 1, 1), time(13, 30)));
    }

    #[test]
    fn test_no_table_available() {
        let mut r = restaurant(10, vec![table(1, false)], vec![]);

        let err = book(&mut r, date(2024, 1, 1), time(13, 30), customer()).unwrap_err();

        assert_eq!(err, BookingError::NoTableAvailable);
        assert!(r.reservations.is_empty());
    }

    #[test]
    fn test_book_rejects_when_reservation_ids_run_out() {
        let existing = reservation(i64::MAX, date(2024, 1, 1), time(12, 0));
        let mut r = restaurant(10, vec![table(1, true)], vec![existing]);

        let err = book(&mut r, date(2024, 1, 1), time(13, 30), customer()).unwrap_err();

        assert_eq!(err, BookingError::ReservationIdsExhausted);
        assert!(r.tables[0].available);
        assert_eq!(r.reservations.len(), 1);
    }

    #[test]
    fn test_add_comment_overwrites() {
        let mut r = restaurant(10, vec![], vec![reservation(1, date(2024, 1, 1), time(13, 30))]);

        let updated = add_comment(&mut r, 1, "Great food").unwrap();
        assert_eq!(updated.comment.as_ref().unwrap().text, "Great food");
        assert!(updated.comment.as_ref().unwrap().rating.is_none());

        add_comment(&mut r, 1, "Slow service").unwrap();
        let stored = r.reservations[0].comment.as_ref().unwrap();
        assert_eq!(stored.text, "Slow service");
    }

    #[test]
    fn test_add_comment_unknown_reservation() {
        let mut r = restaurant(10, vec![], vec![reservation(1, date(2024, 1, 1), time(13, 30))]);

        assert_eq!(
            add_comment(&mut r, 2, "Great food").unwrap_err(),
            BookingError::NotFound(2)
        );
    }

    #[test]
    fn test_update_reservation_locates_by_id() {
        let mut r = restaurant(
            10,
            vec![],
            vec![
                reservation(1, date(2024, 1, 1), time(12, 0)),
                reservation(2, date(2024, 1, 1), time(13, 0)),
            ],
        );

        let mut changed = reservation(2, date(2024, 2, 2), time(21, 0));
        changed.table = Some(table(5, false));
        changed.comment = Some(Comment::with_text("window seat"));

        let updated = update_reservation(&mut r, changed).unwrap();

        assert_eq!(updated.id, 2);
        assert_eq!(r.reservations[1].date, date(2024, 2, 2));
        assert_eq!(r.reservations[1].time, time(21, 0));
        assert_eq!(r.reservations[1].table.as_ref().unwrap().number, 5);
        assert_eq!(r.reservations[0].time, time(12, 0));

        let missing = reservation(9, date(2024, 2, 2), time(21, 0));
        assert_eq!(
            update_reservation(&mut r, missing).unwrap_err(),
            BookingError::NotFound(9)
        );
    }

    #[test]
    fn test_remove_reservation_keeps_table_held() {
        let mut r = restaurant(10, vec![table(1, true)], vec![]);
        let booked = book(&mut r, date(2024, 1, 1), time(13, 30), customer()).unwrap();

        remove_reservation(&mut r, booked.id).unwrap();

        assert!(r.reservations.is_empty());
        assert!(!r.tables[0].available);
        assert_eq!(
            remove_reservation(&mut r, booked.id).unwrap_err(),
            BookingError::NotFound(booked.id)
        );
    }
}
