//! Credentials, tokens and the request guard

pub mod cookies;
pub mod jwt;
pub mod middleware;
pub mod password;

pub use cookies::{CookiePolicy, ACCESS_TOKEN_COOKIE, REFRESH_TOKEN_COOKIE};
pub use jwt::{Claims, TokenIssuer, TokenKind, TokenPair};
pub use middleware::{extract_token, require_auth, CurrentAccount};
pub use password::{hash_password, verify_password};
