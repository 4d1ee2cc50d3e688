//! Session lifecycle: registration, login, refresh, logout and password change

mod lifecycle;

pub use lifecycle::*;

use std::path::PathBuf;

use crate::accounts::PublicAccount;
use crate::auth::TokenPair;

/// Registration input. Text fields are `None` when absent from the request.
#[derive(Debug, Clone, Default)]
pub struct Registration {
    pub username: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub full_name: Option<String>,
    /// Staged primary image
    pub avatar: Option<PathBuf>,
    /// Staged secondary image
    pub cover_image: Option<PathBuf>,
}

/// Login input. At least one of `username` or `email` must be present.
#[derive(Debug, Clone, Default)]
pub struct Credentials {
    pub username: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

/// A successful login
#[derive(Debug, Clone)]
pub struct LoginOutcome {
    pub account: PublicAccount,
    pub tokens: TokenPair,
}

/// Trim a field and treat whitespace-only values as absent
pub fn required(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_required_field_rules() {
        assert_eq!(required(None), None);
        assert_eq!(required(Some("")), None);
        assert_eq!(required(Some("   \t")), None);
        assert_eq!(required(Some("  alice ")), Some("alice"));
    }
}
