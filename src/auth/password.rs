//! Password hashing and verification

use crate::error::{Error, Result};

/// Hash a password with a fresh salt.
///
/// bcrypt is deliberately slow, so the work runs on the blocking pool.
pub async fn hash_password(password: &str, cost: u32) -> Result<String> {
    let password = password.to_string();
    tokio::task::spawn_blocking(move || bcrypt::hash(password, cost))
        .await
        .map_err(Error::internal)?
        .map_err(|e| Error::Internal(format!("Failed to hash password: {}", e)))
}

/// Check a password against a stored hash.
///
/// A wrong password is `Ok(false)`. A missing or malformed hash is an internal error.
pub async fn verify_password(password: &str, hash: &str) -> Result<bool> {
    if hash.is_empty() {
        return Err(Error::Internal("Account has no password hash".to_string()));
    }
    let password = password.to_string();
    let hash = hash.to_string();
    tokio::task::spawn_blocking(move || bcrypt::verify(password, &hash))
        .await
        .map_err(Error::internal)?
        .map_err(|e| Error::Internal(format!("Stored password hash is unusable: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    const COST: u32 = 4;

    #[tokio::test]
    async fn test_hash_and_verify() {
        let hash = hash_password("hunter22", COST).await.unwrap();
        assert_ne!(hash, "hunter22");
        assert!(verify_password("hunter22", &hash).await.unwrap());
        assert!(!verify_password("hunter23", &hash).await.unwrap());
    }

    #[tokio::test]
    async fn test_hash_is_salted() {
        let first = hash_password("same-password", COST).await.unwrap();
        let second = hash_password("same-password", COST).await.unwrap();
        assert_ne!(first, second);
    }

    #[tokio::test]
    async fn test_malformed_hash_is_internal_error() {
        let result = verify_password("anything", "not-a-bcrypt-hash").await;
        assert!(matches!(result, Err(Error::Internal(_))));

        let result = verify_password("anything", "").await;
        assert!(matches!(result, Err(Error::Internal(_))));
    }
}
