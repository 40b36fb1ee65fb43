use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::errors::AppError;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TherapistApplication {
    pub id: String,
    #[serde(flatten)]
    pub details: ApplicationDetails,
    pub status: ApplicationStatus,
    pub admin_notes: Option<String>,
    pub reviewed_by: Option<String>,
    pub reviewed_at: Option<NaiveDateTime>,
    pub created_at: NaiveDateTime,
}

impl TherapistApplication {
    pub fn submit(details: ApplicationDetails) -> Self {
        TherapistApplication {
            id: uuid::Uuid::new_v4().to_string(),
            details,
            status: ApplicationStatus::Pending,
            admin_notes: None,
            reviewed_by: None,
            reviewed_at: None,
            created_at: chrono::Utc::now().naive_utc(),
        }
    }
}

/// What an applicant fills in. List-like fields are comma-separated free text.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApplicationDetails {
    pub full_name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub city: String,
    pub state: String,
    pub zip_code: String,

    pub experience_years: i32,
    pub certifications: String,
    pub specialties: String,
    pub license_number: Option<String>,
    pub insurance_provider: Option<String>,

    pub service_areas: String,
    pub availability: String,
    pub transportation: String,
    pub equipment_owned: String,
    pub languages: String,

    pub references: String,
    pub portfolio_url: Option<String>,

    #[serde(default)]
    pub background_check: bool,
    pub motivation: String,
    pub expectations: String,
}

impl ApplicationDetails {
    pub fn validate(&mut self) -> Result<(), AppError> {
        self.email = self.email.trim().to_lowercase();
        if !self.email.contains('@') {
            return Err(AppError::invalid("a valid email is required"));
        }
        if self.full_name.trim().is_empty() || self.phone.trim().is_empty() {
            return Err(AppError::invalid("full_name and phone are required"));
        }
        if self.experience_years < 0 {
            return Err(AppError::invalid("experience_years cannot be negative"));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ApplicationStatus {
    Pending,
    Approved,
    Rejected,
}

impl ApplicationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ApplicationStatus::Pending => "pending",
            ApplicationStatus::Approved => "approved",
            ApplicationStatus::Rejected => "rejected",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(ApplicationStatus::Pending),
            "approved" => Some(ApplicationStatus::Approved),
            "rejected" => Some(ApplicationStatus::Rejected),
            _ => None,
        }
    }
}

/// Splits "Swedish, Deep Tissue ,," into ["Swedish", "Deep Tissue"].
pub fn split_list(s: &str) -> Vec<String> {
    s.split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_list() {
        assert_eq!(split_list("Swedish, Deep Tissue"), vec!["Swedish", "Deep Tissue"]);
        assert_eq!(split_list(" a ,, b ,"), vec!["a", "b"]);
        assert!(split_list("").is_empty());
    }
}
