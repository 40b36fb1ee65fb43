use chrono::{NaiveDate, NaiveTime, Timelike};
use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::models::Booking;

/// First and last hourly start offered to clients.
pub const FIRST_SLOT_HOUR: u32 = 9;
pub const LAST_SLOT_HOUR: u32 = 19;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Slot {
    pub time: String,
    pub available: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct Availability {
    pub date: NaiveDate,
    pub therapist_id: String,
    pub available_slots: Vec<Slot>,
}

impl Availability {
    /// Marks each hourly start unavailable when a slot-holding booking covers it.
    /// Bookings for other dates or in non-holding statuses never block.
    pub fn for_day(therapist_id: &str, date: NaiveDate, bookings: &[Booking]) -> Self {
        let available_slots = (FIRST_SLOT_HOUR..=LAST_SLOT_HOUR)
            .filter_map(|hour| NaiveTime::from_hms_opt(hour, 0, 0))
            .map(|start| {
                let instant = date.and_time(start);
                Slot {
                    time: start.format("%H:%M").to_string(),
                    available: !bookings.iter().any(|b| b.covers(instant)),
                }
            })
            .collect();

        Availability {
            date,
            therapist_id: therapist_id.to_string(),
            available_slots,
        }
    }

    pub fn is_free(&self, time: &str) -> bool {
        self.available_slots
            .iter()
            .any(|slot| slot.time == time && slot.available)
    }
}

pub fn parse_date(s: &str) -> Result<NaiveDate, AppError> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
        .map_err(|_| AppError::invalid(format!("invalid date '{s}', expected YYYY-MM-DD")))
}

/// Accepts `HH:MM`, or `HH:MM:SS` with zero seconds. Slots are minute-granular.
pub fn parse_time(s: &str) -> Result<NaiveTime, AppError> {
    let s = s.trim();
    let time = NaiveTime::parse_from_str(s, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(s, "%H:%M:%S"))
        .map_err(|_| AppError::invalid(format!("invalid time '{s}', expected HH:MM")))?;
    if time.second() != 0 || time.nanosecond() != 0 {
        return Err(AppError::invalid(format!(
            "invalid time '{s}', seconds are not supported"
        )));
    }
    Ok(time)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{BookingStatus, PaymentStatus};

    fn booking(date: &str, time: &str, duration: i32, status: BookingStatus) -> Booking {
        let now = chrono::Utc::now().naive_utc();
        Booking {
            id: uuid::Uuid::new_v4().to_string(),
            client_id: "client".to_string(),
            therapist_id: "therapist".to_string(),
            service_id: "swedish-massage".to_string(),
            appointment_date: parse_date(date).unwrap(),
            appointment_time: parse_time(time).unwrap(),
            duration_minutes: duration,
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
        }
    }

    fn day() -> NaiveDate {
        parse_date("2024-01-01").unwrap()
    }

    fn unavailable(a: &Availability) -> Vec<&str> {
        a.available_slots
            .iter()
            .filter(|s| !s.available)
            .map(|s| s.time.as_str())
            .collect()
    }

    #[test]
    fn test_empty_day_has_eleven_free_slots() {
        let a = Availability::for_day("therapist", day(), &[]);
        assert_eq!(a.available_slots.len(), 11);
        assert_eq!(a.available_slots[0].time, "09:00");
        assert_eq!(a.available_slots[10].time, "19:00");
        assert!(a.available_slots.iter().all(|s| s.available));
    }

    #[test]
    fn test_confirmed_hour_blocks_only_its_slot() {
        let bookings = [booking("2024-01-01", "10:00", 60, BookingStatus::Confirmed)];
        let a = Availability::for_day("therapist", day(), &bookings);
        assert_eq!(unavailable(&a), vec!["10:00"]);
        assert!(!a.is_free("10:00"));
        assert!(a.is_free("11:00"));
    }

    #[test]
    fn test_long_booking_blocks_every_covered_start() {
        let bookings = [booking("2024-01-01", "13:30", 120, BookingStatus::InProgress)];
        let a = Availability::for_day("therapist", day(), &bookings);
        // 13:30-15:30 covers the 14:00 and 15:00 starts
        assert_eq!(unavailable(&a), vec!["14:00", "15:00"]);
    }

    #[test]
    fn test_pending_and_cancelled_do_not_block() {
        let bookings = [
            booking("2024-01-01", "10:00", 60, BookingStatus::Pending),
            booking("2024-01-01", "11:00", 60, BookingStatus::Cancelled),
            booking("2024-01-01", "12:00", 60, BookingStatus::Completed),
        ];
        let a = Availability::for_day("therapist", day(), &bookings);
        assert!(unavailable(&a).is_empty());
    }

    #[test]
    fn test_other_dates_do_not_block() {
        let bookings = [booking("2024-01-02", "10:00", 60, BookingStatus::Confirmed)];
        let a = Availability::for_day("therapist", day(), &bookings);
        assert!(unavailable(&a).is_empty());
    }

    #[test]
    fn test_parse_date() {
        assert!(parse_date("2024-01-01").is_ok());
        assert!(matches!(parse_date("01/01/2024"), Err(AppError::InvalidInput(_))));
        assert!(parse_date("2024-13-01").is_err());
    }

    #[test]
    fn test_parse_time() {
        assert_eq!(parse_time("10:00").unwrap(), NaiveTime::from_hms_opt(10, 0, 0).unwrap());
        assert_eq!(parse_time("10:30:00").unwrap(), NaiveTime::from_hms_opt(10, 30, 0).unwrap());
        assert!(matches!(parse_time("25:00"), Err(AppError::InvalidInput(_))));
        assert!(parse_time("noon").is_err());
    }

    #[test]
    fn test_parse_time_rejects_seconds() {
        assert!(matches!(parse_time("10:00:30"), Err(AppError::InvalidInput(_))));
        assert!(matches!(parse_time("09:59:59"), Err(AppError::InvalidInput(_))));
    }
}
