pub mod application;
pub mod availability;
pub mod booking;
pub mod review;
pub mod service;
pub mod therapist;
pub mod user;

pub use application::{ApplicationDetails, ApplicationStatus, TherapistApplication};
pub use availability::{Availability, Slot};
pub use booking::{Booking, BookingStatus, BookingView, PaymentStatus};
pub use review::{NewReview, Review, ReviewView};
pub use service::{NewService, Service, ServiceUpdate};
pub use therapist::{Therapist, TherapistAdminView, TherapistPublic, TherapistSearch, TherapistStatus};
pub use user::{User, UserRole, UserUpdate};

/// Storage format for timestamps.
pub const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
