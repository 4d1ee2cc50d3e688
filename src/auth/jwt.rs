//! JWT token handling

use chrono::{DateTime, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::config::TokenConfig;
use crate::error::{Error, Result};

/// Which secret and lifetime a token was minted with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    Access,
    Refresh,
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenKind::Access => write!(f, "access"),
            TokenKind::Refresh => write!(f, "refresh"),
        }
    }
}

/// JWT claims
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// Subject (account ID)
    pub sub: String,
    pub kind: TokenKind,
    /// Issued at
    pub iat: i64,
    /// Expiration time
    pub exp: i64,
    /// Unique token ID, so two tokens minted in the same second differ
    pub jti: String,
}

/// Access and refresh token issued together
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

struct KeyPair {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl_secs: i64,
}

impl KeyPair {
    fn new(secret: &str, ttl: std::time::Duration) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            ttl_secs: i64::try_from(ttl.as_secs()).unwrap_or(i64::MAX),
        }
    }
}

/// Mints and verifies access and refresh tokens, each kind with its own secret
pub struct TokenIssuer {
    access: KeyPair,
    refresh: KeyPair,
    validation: Validation,
}

impl TokenIssuer {
    pub fn new(config: &TokenConfig) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        Self {
            access: KeyPair::new(&config.access_secret, config.access_ttl),
            refresh: KeyPair::new(&config.refresh_secret, config.refresh_ttl),
            validation,
        }
    }

    fn keys(&self, kind: TokenKind) -> &KeyPair {
        match kind {
            TokenKind::Access => &self.access,
            TokenKind::Refresh => &self.refresh,
        }
    }

    /// Mint a token of `kind` for `account_id` as if issued at `issued_at`
    pub fn issue_at(&self, kind: TokenKind, account_id: &str, issued_at: DateTime<Utc>) -> Result<String> {
        let keys = self.keys(kind);
        let iat = issued_at.timestamp();
        let claims = Claims {
            sub: account_id.to_string(),
            kind,
            iat,
            exp: iat.saturating_add(keys.ttl_secs),
            jti: uuid::Uuid::new_v4().to_string(),
        };
        encode(&Header::new(Algorithm::HS256), &claims, &keys.encoding)
            .map_err(|e| Error::Internal(format!("Failed to create {} token: {}", kind, e)))
    }

    pub fn issue_access_token(&self, account_id: &str) -> Result<String> {
        self.issue_at(TokenKind::Access, account_id, Utc::now())
    }

    pub fn issue_refresh_token(&self, account_id: &str) -> Result<String> {
        self.issue_at(TokenKind::Refresh, account_id, Utc::now())
    }

    pub fn issue_pair(&self, account_id: &str) -> Result<TokenPair> {
        Ok(TokenPair {
            access_token: self.issue_access_token(account_id)?,
            refresh_token: self.issue_refresh_token(account_id)?,
        })
    }

    /// Validate a token of the given kind and return its claims.
    ///
    /// Every failure is `Error::Unauthorized`; the reason is only logged.
    pub fn verify(&self, token: &str, kind: TokenKind) -> Result<Claims> {
        match decode::<Claims>(token, &self.keys(kind).decoding, &self.validation) {
            Ok(data) if data.claims.kind == kind => Ok(data.claims),
            Ok(data) => {
                tracing::debug!("Rejected token: expected {} but got {}", kind, data.claims.kind);
                Err(Error::Unauthorized)
            }
            Err(e) => {
                tracing::debug!("Rejected {} token: {}", kind, e);
                Err(Error::Unauthorized)
            }
        }
    }

    /// Validate an access token and return its account id
    pub fn verify_access(&self, token: &str) -> Result<String> {
        self.verify(token, TokenKind::Access).map(|claims| claims.sub)
    }

    /// Validate a refresh token and return its account id
    pub fn verify_refresh(&self, token: &str) -> Result<String> {
        self.verify(token, TokenKind::Refresh).map(|claims| claims.sub)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn issuer() -> TokenIssuer {
        TokenIssuer::new(&TokenConfig {
            access_secret: "access-secret".to_string(),
            access_ttl: Duration::from_secs(900),
            refresh_secret: "refresh-secret".to_string(),
            refresh_ttl: Duration::from_secs(86400),
        })
    }

    #[test]
    fn test_create_and_validate_token() {
        let issuer = issuer();
        let token = issuer.issue_access_token("acct-1").expect("Failed to create token");
        let claims = issuer.verify(&token, TokenKind::Access).expect("Failed to validate token");

        assert_eq!(claims.sub, "acct-1");
        assert_eq!(claims.kind, TokenKind::Access);
        assert_eq!(claims.exp - claims.iat, 900);
    }

    #[test]
    fn test_refresh_lifetime() {
        let issuer = issuer();
        let token = issuer.issue_refresh_token("acct-1").unwrap();
        let claims = issuer.verify(&token, TokenKind::Refresh).unwrap();
        assert_eq!(claims.exp - claims.iat, 86400);
    }

    #[test]
    fn test_kinds_are_not_interchangeable() {
        let issuer = issuer();
        let access = issuer.issue_access_token("acct-1").unwrap();
        let refresh = issuer.issue_refresh_token("acct-1").unwrap();

        assert!(matches!(issuer.verify_refresh(&access), Err(Error::Unauthorized)));
        assert!(matches!(issuer.verify_access(&refresh), Err(Error::Unauthorized)));
    }

    #[test]
    fn test_same_second_tokens_differ() {
        let issuer = issuer();
        let now = Utc::now();
        let first = issuer.issue_at(TokenKind::Refresh, "acct-1", now).unwrap();
        let second = issuer.issue_at(TokenKind::Refresh, "acct-1", now).unwrap();
        assert_ne!(first, second);
    }

    #[test]
    fn test_expired_token() {
        let issuer = issuer();
        let issued_at = Utc::now() - chrono::Duration::hours(1);
        let token = issuer.issue_at(TokenKind::Access, "acct-1", issued_at).unwrap();
        assert!(matches!(issuer.verify_access(&token), Err(Error::Unauthorized)));
    }

    #[test]
    fn test_invalid_token() {
        let result = issuer().verify_access("invalid.token.here");
        assert!(matches!(result, Err(Error::Unauthorized)));
    }
}
