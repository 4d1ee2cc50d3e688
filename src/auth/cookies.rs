//! Session cookies

use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};

use super::jwt::TokenPair;
use crate::config::TokenConfig;

pub const ACCESS_TOKEN_COOKIE: &str = "accessToken";
pub const REFRESH_TOKEN_COOKIE: &str = "refreshToken";

/// Cookie attributes shared by both session cookies
#[derive(Debug, Clone)]
pub struct CookiePolicy {
    pub secure: bool,
    pub access_max_age: time::Duration,
    pub refresh_max_age: time::Duration,
}

impl CookiePolicy {
    pub fn new(tokens: &TokenConfig, secure: bool) -> Self {
        Self {
            secure,
            access_max_age: seconds(tokens.access_ttl),
            refresh_max_age: seconds(tokens.refresh_ttl),
        }
    }

    fn build(&self, name: &'static str, value: String) -> Cookie<'static> {
        Cookie::build((name, value))
            .http_only(true)
            .secure(self.secure)
            .same_site(SameSite::Lax)
            .path("/")
            .build()
    }

    /// Add both token cookies to the jar
    pub fn set_tokens(&self, jar: CookieJar, tokens: &TokenPair) -> CookieJar {
        let mut access = self.build(ACCESS_TOKEN_COOKIE, tokens.access_token.clone());
        access.set_max_age(self.access_max_age);
        let mut refresh = self.build(REFRESH_TOKEN_COOKIE, tokens.refresh_token.clone());
        refresh.set_max_age(self.refresh_max_age);
        jar.add(access).add(refresh)
    }

    /// Instruct the client to drop both token cookies.
    /// Removal cookies are sent even if the request carried none.
    pub fn clear_tokens(&self, jar: CookieJar) -> CookieJar {
        let mut access = self.build(ACCESS_TOKEN_COOKIE, String::new());
        access.make_removal();
        let mut refresh = self.build(REFRESH_TOKEN_COOKIE, String::new());
        refresh.make_removal();
        jar.add(access).add(refresh)
    }
}

fn seconds(duration: std::time::Duration) -> time::Duration {
    time::Duration::seconds(i64::try_from(duration.as_secs()).unwrap_or(i64::MAX))
}
