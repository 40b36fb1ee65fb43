use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize)]
pub struct Therapist {
    pub id: String,
    pub user_id: String,
    pub specialties: Vec<String>,
    pub certifications: Vec<String>,
    pub languages: Vec<String>,
    pub service_areas: Vec<String>,
    pub experience_years: i32,
    pub bio: Option<String>,
    pub hourly_rate: f64,
    pub status: TherapistStatus,
    pub rating: f64,
    pub reviews_count: i64,
    pub total_bookings: i64,
    pub profile_image: Option<String>,
    pub gallery_images: Vec<String>,
    pub is_available: bool,
    pub admin_notes: Option<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl Therapist {
    pub fn is_bookable(&self) -> bool {
        self.status == TherapistStatus::Approved && self.is_available
    }
}

/// Public directory entry: the profile plus the owning user's name.
#[derive(Debug, Clone, Serialize)]
pub struct TherapistPublic {
    pub id: String,
    pub user_id: String,
    pub full_name: String,
    pub specialties: Vec<String>,
    pub experience_years: i32,
    pub service_areas: Vec<String>,
    pub bio: Option<String>,
    pub hourly_rate: f64,
    pub rating: f64,
    pub reviews_count: i64,
    pub profile_image: Option<String>,
    pub gallery_images: Vec<String>,
    pub is_available: bool,
    pub created_at: NaiveDateTime,
}

impl TherapistPublic {
    pub fn from_profile(t: Therapist, full_name: String) -> Self {
        TherapistPublic {
            id: t.id,
            user_id: t.user_id,
            full_name,
            specialties: t.specialties,
            experience_years: t.experience_years,
            service_areas: t.service_areas,
            bio: t.bio,
            hourly_rate: t.hourly_rate,
            rating: t.rating,
            reviews_count: t.reviews_count,
            profile_image: t.profile_image,
            gallery_images: t.gallery_images,
            is_available: t.is_available,
            created_at: t.created_at,
        }
    }
}

/// Admin listing entry with contact details.
#[derive(Debug, Clone, Serialize)]
pub struct TherapistAdminView {
    #[serde(flatten)]
    pub therapist: Therapist,
    pub full_name: String,
    pub email: String,
    pub phone: String,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TherapistStatus {
    Pending,
    Approved,
    Suspended,
    Rejected,
}

impl TherapistStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TherapistStatus::Pending => "pending",
            TherapistStatus::Approved => "approved",
            TherapistStatus::Suspended => "suspended",
            TherapistStatus::Rejected => "rejected",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(TherapistStatus::Pending),
            "approved" => Some(TherapistStatus::Approved),
            "suspended" => Some(TherapistStatus::Suspended),
            "rejected" => Some(TherapistStatus::Rejected),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TherapistSearch {
    pub city: Option<String>,
    pub specialty: Option<String>,
    pub min_rating: Option<f64>,
    pub max_price: Option<f64>,
    pub limit: Option<i64>,
    pub skip: Option<i64>,
}
