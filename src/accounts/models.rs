//! Account models

use serde::{Deserialize, Serialize};

/// Stored account record
#[derive(Debug, Clone)]
pub struct Account {
    /// Unique account identifier
    pub id: String,
    /// Lower-cased, unique
    pub username: String,
    /// Unique, compared case-insensitively
    pub email: String,
    pub full_name: String,
    /// URL of the primary profile image
    pub avatar: String,
    /// URL of the optional cover image, empty when absent
    pub cover_image: String,
    /// bcrypt hash of the current password
    pub password_hash: String,
    /// The single live refresh token, if a session is active
    pub refresh_token: Option<String>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

impl Account {
    /// Build a record from validated registration fields
    pub fn new(fields: NewAccount) -> Self {
        let now = chrono::Utc::now();
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            username: fields.username.to_lowercase(),
            email: fields.email,
            full_name: fields.full_name,
            avatar: fields.avatar,
            cover_image: fields.cover_image,
            password_hash: fields.password_hash,
            refresh_token: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Outward-facing projection without credentials
    pub fn to_public(&self) -> PublicAccount {
        PublicAccount::from(self.clone())
    }
}

/// Fields required to insert a new account
#[derive(Debug, Clone)]
pub struct NewAccount {
    pub username: String,
    pub email: String,
    pub full_name: String,
    pub avatar: String,
    pub cover_image: String,
    pub password_hash: String,
}

/// Partial update applied by `AccountStore::update_by_id`.
/// `None` leaves a field untouched.
#[derive(Debug, Clone, Default)]
pub struct AccountPatch {
    pub email: Option<String>,
    pub full_name: Option<String>,
    pub avatar: Option<String>,
    pub cover_image: Option<String>,
    pub password_hash: Option<String>,
    /// `Some(None)` clears the refresh token
    pub refresh_token: Option<Option<String>>,
}

impl AccountPatch {
    pub fn apply(self, account: &mut Account) {
        if let Some(email) = self.email {
            account.email = email;
        }
        if let Some(full_name) = self.full_name {
            account.full_name = full_name;
        }
        if let Some(avatar) = self.avatar {
            account.avatar = avatar;
        }
        if let Some(cover_image) = self.cover_image {
            account.cover_image = cover_image;
        }
        if let Some(password_hash) = self.password_hash {
            account.password_hash = password_hash;
        }
        if let Some(refresh_token) = self.refresh_token {
            account.refresh_token = refresh_token;
        }
        account.updated_at = chrono::Utc::now();
    }
}

/// Account information in responses
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicAccount {
    pub id: String,
    pub username: String,
    pub email: String,
    pub full_name: String,
    pub avatar: String,
    pub cover_image: String,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

impl From<Account> for PublicAccount {
    fn from(account: Account) -> Self {
        Self {
            id: account.id,
            username: account.username,
            email: account.email,
            full_name: account.full_name,
            avatar: account.avatar,
            cover_image: account.cover_image,
            created_at: account.created_at,
            updated_at: account.updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Account {
        Account::new(NewAccount {
            username: "Alice".to_string(),
            email: "a@x.com".to_string(),
            full_name: "Alice Liddell".to_string(),
            avatar: "https://cdn/avatar.png".to_string(),
            cover_image: String::new(),
            password_hash: "$2b$04$hash".to_string(),
        })
    }

    #[test]
    fn test_username_is_lowercased() {
        assert_eq!(sample().username, "alice");
    }

    #[test]
    fn test_public_projection_has_no_credentials() {
        let mut account = sample();
        account.refresh_token = Some("token".to_string());
        let json = serde_json::to_value(account.to_public()).unwrap();
        let obj = json.as_object().unwrap();

        assert!(!obj.contains_key("passwordHash"));
        assert!(!obj.contains_key("password"));
        assert!(!obj.contains_key("refreshToken"));
        assert_eq!(obj["fullName"], "Alice Liddell");
    }

    #[test]
    fn test_patch_clears_refresh_token() {
        let mut account = sample();
        account.refresh_token = Some("token".to_string());
        AccountPatch {
            refresh_token: Some(None),
            ..AccountPatch::default()
        }
        .apply(&mut account);
        assert!(account.refresh_token.is_none());
    }

    #[test]
    fn test_empty_patch_keeps_fields() {
        let mut account = sample();
        account.refresh_token = Some("token".to_string());
        AccountPatch::default().apply(&mut account);
        assert_eq!(account.refresh_token.as_deref(), Some("token"));
        assert_eq!(account.email, "a@x.com");
    }
}
