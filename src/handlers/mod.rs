pub mod admin;
pub mod applications;
pub mod auth;
pub mod bookings;
pub mod catalog;
pub mod health;
pub mod payments;
pub mod therapists;

use serde::Deserialize;

/// `?limit=&skip=` shared by list endpoints.
#[derive(Debug, Default, Deserialize)]
pub struct Page {
    pub limit: Option<i64>,
    pub skip: Option<i64>,
}

impl Page {
    /// Returns `(limit, skip)`, with the limit clamped to `1..=max`.
    pub fn resolve(&self, default: i64, max: i64) -> (i64, i64) {
        page(self.limit, self.skip, default, max)
    }
}

pub fn page(limit: Option<i64>, skip: Option<i64>, default: i64, max: i64) -> (i64, i64) {
    let limit = limit.unwrap_or(default).clamp(1, max);
    let skip = skip.unwrap_or(0).max(0);
    (limit, skip)
}

fn message(text: &str) -> axum::Json<serde_json::Value> {
    axum::Json(serde_json::json!({ "message": text }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_clamps() {
        assert_eq!(page(None, None, 20, 100), (20, 0));
        assert_eq!(page(Some(500), Some(10), 20, 100), (100, 10));
        assert_eq!(page(Some(0), Some(-5), 20, 100), (1, 0));
    }
}
