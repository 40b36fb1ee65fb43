use chrono::{NaiveDate, NaiveTime};
use rusqlite::Connection;

use crate::db::queries;
use crate::errors::AppError;
use crate::models::Availability;

#[derive(Debug)]
pub enum SchedulingError {
    SlotTaken { date: NaiveDate, time: NaiveTime },
    Store(anyhow::Error),
}

impl std::fmt::Display for SchedulingError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SchedulingError::SlotTaken { date, time } => {
                write!(
                    f,
                    "the therapist is already booked on {date} at {}",
                    time.format("%H:%M")
                )
            }
            SchedulingError::Store(e) => write!(f, "slot lookup failed: {e}"),
        }
    }
}

impl From<SchedulingError> for AppError {
    fn from(e: SchedulingError) -> Self {
        match e {
            SchedulingError::SlotTaken { .. } => AppError::Conflict(e.to_string()),
            SchedulingError::Store(inner) => AppError::Internal(inner),
        }
    }
}

/// Fails when a confirmed or in-progress booking already starts at exactly
/// (`date`, `time`) for the therapist. `exclude_id` lets a booking ignore itself.
pub fn check_slot_free(
    conn: &Connection,
    therapist_id: &str,
    date: &NaiveDate,
    time: &NaiveTime,
    exclude_id: Option<&str>,
) -> Result<(), SchedulingError> {
    let holder = queries::find_slot_holder(conn, therapist_id, date, time, exclude_id)
        .map_err(SchedulingError::Store)?;

    match holder {
        Some(existing) => {
            tracing::debug!(
                therapist_id,
                holder = %existing.id,
                date = %date,
                time = %time.format("%H:%M"),
                "slot already held"
            );
            Err(SchedulingError::SlotTaken {
                date: *date,
                time: *time,
            })
        }
        None => Ok(()),
    }
}

pub fn therapist_availability(
    conn: &Connection,
    therapist_id: &str,
    date: NaiveDate,
) -> Result<Availability, AppError> {
    if queries::get_therapist(conn, therapist_id)?.is_none() {
        return Err(AppError::not_found("therapist"));
    }
    let holders = queries::slot_holders_on(conn, therapist_id, &date)?;
    Ok(Availability::for_day(therapist_id, date, &holders))
}

/// Price scales linearly with the booked duration against the hourly base.
pub fn booking_amount(base_price: f64, duration_minutes: i32) -> f64 {
    base_price * (duration_minutes as f64 / 60.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db;
    use crate::models::availability::{parse_date, parse_time};
    use crate::models::{Booking, BookingStatus, PaymentStatus, Therapist, TherapistStatus, User, UserRole};

    fn setup_db() -> Connection {
        db::init_db(":memory:").unwrap()
    }

    fn seed_therapist(conn: &Connection) -> String {
        let user = User::new("t@example.com", "Tina", "+15550001111", UserRole::Therapist, "h".into());
        queries::insert_user(conn, &user).unwrap();
        let client = User::new("c@example.com", "Carl", "+15550002222", UserRole::Client, "h".into());
        let client = User {
            id: "client-1".to_string(),
            ..client
        };
        queries::insert_user(conn, &client).unwrap();

        let now = chrono::Utc::now().naive_utc();
        let therapist = Therapist {
            id: "therapist-1".to_string(),
            user_id: user.id,
            specialties: vec!["Swedish".to_string()],
            certifications: vec![],
            languages: vec!["English".to_string()],
            service_areas: vec!["Austin".to_string()],
            experience_years: 5,
            bio: None,
            hourly_rate: 120.0,
            status: TherapistStatus::Approved,
            rating: 0.0,
            reviews_count: 0,
            total_bookings: 0,
            profile_image: None,
            gallery_images: vec![],
            is_available: true,
            admin_notes: None,
            created_at: now,
            updated_at: now,
        };
        queries::insert_therapist(conn, &therapist).unwrap();
        therapist.id
    }

    fn insert_booking(conn: &Connection, id: &str, time: &str, status: BookingStatus) {
        let now = chrono::Utc::now().naive_utc();
        let booking = Booking {
            id: id.to_string(),
            client_id: "client-1".to_string(),
            therapist_id: "therapist-1".to_string(),
            service_id: "swedish-massage".to_string(),
            appointment_date: parse_date("2024-01-01").unwrap(),
            appointment_time: parse_time(time).unwrap(),
            duration_minutes: 60,
            location_address: "1 Main St".to_string(),
            location_city: "Austin".to_string(),
            location_state: "TX".to_string(),
            location_zip: "78701".to_string(),
            special_requests: None,
            status,
            total_amount: 120.0,
            payment_status: PaymentStatus::Pending,
            payment_intent_id: None,
            cancellation_reason: None,
            completed_at: None,
            therapist_notes: None,
            created_at: now,
            updated_at: now,
        };
        queries::insert_booking(conn, &booking).unwrap();
    }

    #[test]
    fn test_free_slot_passes() {
        let conn = setup_db();
        let tid = seed_therapist(&conn);
        let date = parse_date("2024-01-01").unwrap();
        let time = parse_time("10:00").unwrap();
        assert!(check_slot_free(&conn, &tid, &date, &time, None).is_ok());
    }

    #[test]
    fn test_confirmed_booking_holds_slot() {
        let conn = setup_db();
        let tid = seed_therapist(&conn);
        insert_booking(&conn, "b-1", "10:00", BookingStatus::Confirmed);

        let date = parse_date("2024-01-01").unwrap();
        let time = parse_time("10:00").unwrap();
        let err = check_slot_free(&conn, &tid, &date, &time, None).unwrap_err();
        assert!(matches!(err, SchedulingError::SlotTaken { .. }));
        assert!(matches!(AppError::from(err), AppError::Conflict(_)));

        // the holder itself is not in its own way
        assert!(check_slot_free(&conn, &tid, &date, &time, Some("b-1")).is_ok());
    }

    #[test]
    fn test_cancelled_and_pending_do_not_hold() {
        let conn = setup_db();
        let tid = seed_therapist(&conn);
        insert_booking(&conn, "b-1", "10:00", BookingStatus::Cancelled);
        insert_booking(&conn, "b-2", "10:00", BookingStatus::Pending);

        let date = parse_date("2024-01-01").unwrap();
        let time = parse_time("10:00").unwrap();
        assert!(check_slot_free(&conn, &tid, &date, &time, None).is_ok());
    }

    #[test]
    fn test_availability_marks_only_held_hour() {
        let conn = setup_db();
        let tid = seed_therapist(&conn);
        insert_booking(&conn, "b-1", "10:00", BookingStatus::Confirmed);

        let a = therapist_availability(&conn, &tid, parse_date("2024-01-01").unwrap()).unwrap();
        let taken: Vec<_> = a
            .available_slots
            .iter()
            .filter(|s| !s.available)
            .map(|s| s.time.as_str())
            .collect();
        assert_eq!(taken, vec!["10:00"]);
    }

    #[test]
    fn test_availability_unknown_therapist() {
        let conn = setup_db();
        let result = therapist_availability(&conn, "nope", parse_date("2024-01-01").unwrap());
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[test]
    fn test_booking_amount() {
        assert_eq!(booking_amount(120.0, 60), 120.0);
        assert_eq!(booking_amount(120.0, 90), 180.0);
        assert_eq!(booking_amount(150.0, 30), 75.0);
    }
}
