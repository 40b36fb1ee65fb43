use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Booking {
    pub id: String,
    pub client_id: String,
    pub therapist_id: String,
    pub service_id: String,
    pub appointment_date: NaiveDate,
    #[serde(with = "clock_time")]
    pub appointment_time: NaiveTime,
    pub duration_minutes: i32,
    pub location_address: String,
    pub location_city: String,
    pub location_state: String,
    pub location_zip: String,
    pub special_requests: Option<String>,
    pub status: BookingStatus,
    pub total_amount: f64,
    pub payment_status: PaymentStatus,
    pub payment_intent_id: Option<String>,
    pub cancellation_reason: Option<String>,
    pub completed_at: Option<NaiveDateTime>,
    pub therapist_notes: Option<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl Booking {
    pub fn starts_at(&self) -> NaiveDateTime {
        self.appointment_date.and_time(self.appointment_time)
    }

    pub fn ends_at(&self) -> NaiveDateTime {
        self.starts_at() + Duration::minutes(self.duration_minutes as i64)
    }

    /// Half-open: a slot starting exactly at `ends_at` is free.
    pub fn covers(&self, instant: NaiveDateTime) -> bool {
        self.status.holds_slot() && self.starts_at() <= instant && instant < self.ends_at()
    }
}

/// A booking joined with the display names a listing needs.
#[derive(Debug, Clone, Serialize)]
pub struct BookingView {
    #[serde(flatten)]
    pub booking: Booking,
    pub therapist_name: Option<String>,
    pub service_name: Option<String>,
    pub client_name: Option<String>,
    pub client_email: Option<String>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum BookingStatus {
    Pending,
    Confirmed,
    InProgress,
    Completed,
    Cancelled,
}

impl BookingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BookingStatus::Pending => "pending",
            BookingStatus::Confirmed => "confirmed",
            BookingStatus::InProgress => "in_progress",
            BookingStatus::Completed => "completed",
            BookingStatus::Cancelled => "cancelled",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(BookingStatus::Pending),
            "confirmed" => Some(BookingStatus::Confirmed),
            "in_progress" => Some(BookingStatus::InProgress),
            "completed" => Some(BookingStatus::Completed),
            "cancelled" => Some(BookingStatus::Cancelled),
            _ => None,
        }
    }

    /// Statuses that occupy the therapist's time.
    pub fn holds_slot(&self) -> bool {
        matches!(self, BookingStatus::Confirmed | BookingStatus::InProgress)
    }

    pub fn can_confirm(&self) -> bool {
        *self == BookingStatus::Pending
    }

    pub fn can_complete(&self) -> bool {
        *self == BookingStatus::Confirmed
    }

    pub fn can_cancel(&self) -> bool {
        !matches!(self, BookingStatus::Completed | BookingStatus::Cancelled)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    Pending,
    Paid,
    Failed,
    Refunded,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Pending => "pending",
            PaymentStatus::Paid => "paid",
            PaymentStatus::Failed => "failed",
            PaymentStatus::Refunded => "refunded",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(PaymentStatus::Pending),
            "paid" => Some(PaymentStatus::Paid),
            "failed" => Some(PaymentStatus::Failed),
            "refunded" => Some(PaymentStatus::Refunded),
            _ => None,
        }
    }
}

/// Appointment times travel as `HH:MM`.
pub mod clock_time {
    use chrono::NaiveTime;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(time: &NaiveTime, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&time.format("%H:%M").to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<NaiveTime, D::Error> {
        let raw = String::deserialize(d)?;
        crate::models::availability::parse_time(&raw).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn booking_at(time: &str, duration: i32, status: BookingStatus) -> Booking {
        let now = chrono::Utc::now().naive_utc();
        Booking {
            id: "b-1".to_string(),
            client_id: "c-1".to_string(),
            therapist_id: "t-1".to_string(),
            service_id: "swedish-massage".to_string(),
            appointment_date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            appointment_time: NaiveTime::parse_from_str(time, "%H:%M").unwrap(),
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

    fn instant(time: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(&format!("2024-01-01 {time}"), "%Y-%m-%d %H:%M").unwrap()
    }

    #[test]
    fn test_transitions() {
        assert!(BookingStatus::Pending.can_confirm());
        assert!(!BookingStatus::Confirmed.can_confirm());
        assert!(!BookingStatus::Cancelled.can_confirm());

        assert!(BookingStatus::Confirmed.can_complete());
        assert!(!BookingStatus::Pending.can_complete());
        assert!(!BookingStatus::InProgress.can_complete());

        assert!(BookingStatus::Pending.can_cancel());
        assert!(BookingStatus::Confirmed.can_cancel());
        assert!(BookingStatus::InProgress.can_cancel());
        assert!(!BookingStatus::Completed.can_cancel());
        assert!(!BookingStatus::Cancelled.can_cancel());
    }

    #[test]
    fn test_status_strings() {
        for status in [
            BookingStatus::Pending,
            BookingStatus::Confirmed,
            BookingStatus::InProgress,
            BookingStatus::Completed,
            BookingStatus::Cancelled,
        ] {
            assert_eq!(BookingStatus::parse(status.as_str()), Some(status));
        }
        assert_eq!(BookingStatus::parse("bogus"), None);
        assert_eq!(
            serde_json::to_value(BookingStatus::InProgress).unwrap(),
            "in_progress"
        );
    }

    #[test]
    fn test_covers_half_open_interval() {
        let b = booking_at("10:00", 90, BookingStatus::Confirmed);
        assert!(!b.covers(instant("09:00")));
        assert!(b.covers(instant("10:00")));
        assert!(b.covers(instant("11:00")));
        assert!(!b.covers(instant("11:30")));
    }

    #[test]
    fn test_pending_booking_covers_nothing() {
        let b = booking_at("10:00", 60, BookingStatus::Pending);
        assert!(!b.covers(instant("10:00")));
    }

    #[test]
    fn test_time_serializes_as_hours_minutes() {
        let b = booking_at("14:00", 60, BookingStatus::Pending);
        let json = serde_json::to_value(&b).unwrap();
        assert_eq!(json["appointment_time"], "14:00");
        assert_eq!(json["appointment_date"], "2024-01-01");
    }
}
