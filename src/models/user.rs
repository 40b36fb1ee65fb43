use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize)]
pub struct User {
    pub id: String,
    pub email: String,
    pub full_name: String,
    pub phone: String,
    pub role: UserRole,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub is_active: bool,
    pub profile_image: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zip_code: Option<String>,
    pub emergency_contact: Option<String>,
    pub emergency_phone: Option<String>,
    pub preferences: serde_json::Value,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl User {
    pub fn new(
        email: &str,
        full_name: &str,
        phone: &str,
        role: UserRole,
        password_hash: String,
    ) -> Self {
        let now = chrono::Utc::now().naive_utc();
        User {
            id: uuid::Uuid::new_v4().to_string(),
            email: email.trim().to_lowercase(),
            full_name: full_name.trim().to_string(),
            phone: phone.trim().to_string(),
            role,
            password_hash,
            is_active: true,
            profile_image: None,
            address: None,
            city: None,
            state: None,
            zip_code: None,
            emergency_contact: None,
            emergency_phone: None,
            preferences: serde_json::json!({}),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_admin(&self) -> bool {
        self.role == UserRole::Admin
    }

    /// Applies the allow-listed fields; returns whether anything changed.
    pub fn apply(&mut self, update: UserUpdate) -> bool {
        let mut changed = false;
        let mut set = |slot: &mut Option<String>, value: Option<String>| {
            if let Some(v) = value {
                *slot = Some(v);
                changed = true;
            }
        };
        set(&mut self.profile_image, update.profile_image);
        set(&mut self.address, update.address);
        set(&mut self.city, update.city);
        set(&mut self.state, update.state);
        set(&mut self.zip_code, update.zip_code);
        set(&mut self.emergency_contact, update.emergency_contact);
        set(&mut self.emergency_phone, update.emergency_phone);

        if let Some(name) = update.full_name {
            self.full_name = name.trim().to_string();
            changed = true;
        }
        if let Some(phone) = update.phone {
            self.phone = phone.trim().to_string();
            changed = true;
        }
        if let Some(prefs) = update.preferences {
            self.preferences = prefs;
            changed = true;
        }
        if changed {
            self.updated_at = chrono::Utc::now().naive_utc();
        }
        changed
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    Client,
    Therapist,
    Admin,
}

impl UserRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::Client => "client",
            UserRole::Therapist => "therapist",
            UserRole::Admin => "admin",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "client" => Some(UserRole::Client),
            "therapist" => Some(UserRole::Therapist),
            "admin" => Some(UserRole::Admin),
            _ => None,
        }
    }
}

/// Profile fields a user may change about themselves. Identity, role and
/// credentials are not patchable; unknown keys are ignored.
#[derive(Debug, Default, Deserialize)]
pub struct UserUpdate {
    pub full_name: Option<String>,
    pub phone: Option<String>,
    pub profile_image: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zip_code: Option<String>,
    pub emergency_contact: Option<String>,
    pub emergency_phone: Option<String>,
    pub preferences: Option<serde_json::Value>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_password_hash_never_serialized() {
        let user = User::new("a@b.com", "Alice", "+1555", UserRole::Client, "secret-hash".into());
        let json = serde_json::to_value(&user).unwrap();
        assert!(json.get("password_hash").is_none());
        assert_eq!(json["role"], "client");
    }

    #[test]
    fn test_update_ignores_role_and_identity() {
        let mut user = User::new("a@b.com", "Alice", "+1555", UserRole::Client, "h".into());
        let id = user.id.clone();
        let update: UserUpdate = serde_json::from_str(
            r#"{"id":"x","role":"admin","password_hash":"y","city":"Austin"}"#,
        )
        .unwrap();
        assert!(user.apply(update));
        assert_eq!(user.id, id);
        assert_eq!(user.role, UserRole::Client);
        assert_eq!(user.password_hash, "h");
        assert_eq!(user.city.as_deref(), Some("Austin"));
    }

    #[test]
    fn test_empty_update_changes_nothing() {
        let mut user = User::new("a@b.com", "Alice", "+1555", UserRole::Client, "h".into());
        assert!(!user.apply(UserUpdate::default()));
    }
}
