use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::errors::AppError;

#[derive(Debug, Clone, Serialize)]
pub struct Service {
    pub id: String,
    pub name: String,
    pub description: String,
    pub duration_minutes: i32,
    pub base_price: f64,
    pub category: String,
    pub is_active: bool,
    pub image_url: Option<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl Service {
    pub fn create(id: String, new: NewService) -> Self {
        let now = chrono::Utc::now().naive_utc();
        Service {
            id,
            name: new.name.trim().to_string(),
            description: new.description,
            duration_minutes: new.duration_minutes,
            base_price: new.base_price,
            category: new.category,
            is_active: true,
            image_url: new.image_url,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn validate(&self) -> Result<(), AppError> {
        if self.name.trim().is_empty() {
            return Err(AppError::invalid("service name is required"));
        }
        if self.duration_minutes <= 0 {
            return Err(AppError::invalid("duration_minutes must be positive"));
        }
        if !self.base_price.is_finite() || self.base_price < 0.0 {
            return Err(AppError::invalid("base_price cannot be negative"));
        }
        Ok(())
    }

    pub fn apply(&mut self, update: ServiceUpdate) -> bool {
        let before = (
            self.name.clone(),
            self.description.clone(),
            self.duration_minutes,
            self.base_price,
            self.category.clone(),
            self.is_active,
            self.image_url.clone(),
        );

        if let Some(v) = update.name {
            self.name = v.trim().to_string();
        }
        if let Some(v) = update.description {
            self.description = v;
        }
        if let Some(v) = update.duration_minutes {
            self.duration_minutes = v;
        }
        if let Some(v) = update.base_price {
            self.base_price = v;
        }
        if let Some(v) = update.category {
            self.category = v;
        }
        if let Some(v) = update.is_active {
            self.is_active = v;
        }
        if let Some(v) = update.image_url {
            self.image_url = Some(v);
        }

        let after = (
            self.name.clone(),
            self.description.clone(),
            self.duration_minutes,
            self.base_price,
            self.category.clone(),
            self.is_active,
            self.image_url.clone(),
        );
        let changed = before != after;
        if changed {
            self.updated_at = chrono::Utc::now().naive_utc();
        }
        changed
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewService {
    pub name: String,
    pub description: String,
    pub duration_minutes: i32,
    pub base_price: f64,
    pub category: String,
    pub image_url: Option<String>,
}

/// Catalog fields an admin may patch. `id` and `created_at` are not patchable.
#[derive(Debug, Default, Deserialize)]
pub struct ServiceUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
    pub duration_minutes: Option<i32>,
    pub base_price: Option<f64>,
    pub category: Option<String>,
    pub is_active: Option<bool>,
    pub image_url: Option<String>,
}

/// Turns "Hot Stone Massage" into "hot-stone-massage".
pub fn slugify(name: &str) -> String {
    name.split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|part| !part.is_empty())
        .map(str::to_ascii_lowercase)
        .collect::<Vec<_>>()
        .join("-")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Service {
        Service::create(
            "swedish-massage".to_string(),
            NewService {
                name: "Swedish Massage".to_string(),
                description: "Relaxing".to_string(),
                duration_minutes: 60,
                base_price: 120.0,
                category: "Relaxation".to_string(),
                image_url: None,
            },
        )
    }

    #[test]
    fn test_validate() {
        assert!(sample().validate().is_ok());

        let mut bad = sample();
        bad.duration_minutes = 0;
        assert!(matches!(bad.validate(), Err(AppError::InvalidInput(_))));

        let mut bad = sample();
        bad.base_price = -1.0;
        assert!(bad.validate().is_err());
    }

    #[test]
    fn test_apply_partial_update() {
        let mut s = sample();
        let changed = s.apply(ServiceUpdate {
            base_price: Some(130.0),
            ..Default::default()
        });
        assert!(changed);
        assert_eq!(s.base_price, 130.0);
        assert_eq!(s.name, "Swedish Massage");

        assert!(!s.apply(ServiceUpdate::default()));
    }

    #[test]
    fn test_slugify() {
        assert_eq!(slugify("Hot Stone Massage"), "hot-stone-massage");
        assert_eq!(slugify("  Couples' Massage!! "), "couples-massage");
    }
}
