//! Account persistence contract and in-process store

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::error::{Error, Result};

use super::models::{Account, AccountPatch, NewAccount};

/// Persistence operations the session lifecycle depends on.
///
/// Implementations must serialise writes per account. `rotate_refresh_token`
/// must be a single atomic compare-and-set.
#[async_trait]
pub trait AccountStore: Send + Sync {
    /// Find an account by username, falling back to email.
    ///
    /// When a username is supplied and matches, that account wins even if the
    /// email belongs to someone else.
    async fn find_by_username_or_email(
        &self,
        username: Option<&str>,
        email: Option<&str>,
    ) -> Result<Option<Account>>;

    async fn find_by_id(&self, id: &str) -> Result<Option<Account>>;

    /// Insert a new account. Fails with `Conflict` if the username or email is taken.
    async fn insert(&self, fields: NewAccount) -> Result<Account>;

    /// Apply a patch. Returns `None` if the account does not exist.
    async fn update_by_id(&self, id: &str, patch: AccountPatch) -> Result<Option<Account>>;

    /// Replace the refresh token only if the stored value equals `presented`.
    /// Returns `None` when the account is missing or the value did not match.
    async fn rotate_refresh_token(
        &self,
        id: &str,
        presented: &str,
        replacement: Option<String>,
    ) -> Result<Option<Account>>;
}

fn username_matches(account: &Account, username: &str) -> bool {
    account.username == username.trim().to_lowercase()
}

fn email_matches(account: &Account, email: &str) -> bool {
    account.email.eq_ignore_ascii_case(email.trim())
}

/// In-memory account store
pub struct MemoryAccountStore {
    accounts: Arc<RwLock<HashMap<String, Account>>>,
}

impl MemoryAccountStore {
    pub fn new() -> Self {
        Self {
            accounts: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Number of stored accounts
    pub async fn account_count(&self) -> usize {
        self.accounts.read().await.len()
    }
}

impl Default for MemoryAccountStore {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for MemoryAccountStore {
    fn clone(&self) -> Self {
        Self {
            accounts: Arc::clone(&self.accounts),
        }
    }
}

#[async_trait]
impl AccountStore for MemoryAccountStore {
    async fn find_by_username_or_email(
        &self,
        username: Option<&str>,
        email: Option<&str>,
    ) -> Result<Option<Account>> {
        let accounts = self.accounts.read().await;
        let by_username =
            username.and_then(|u| accounts.values().find(|account| username_matches(account, u)));
        let found = by_username.or_else(|| {
            email.and_then(|e| accounts.values().find(|account| email_matches(account, e)))
        });
        Ok(found.cloned())
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Account>> {
        Ok(self.accounts.read().await.get(id).cloned())
    }

    async fn insert(&self, fields: NewAccount) -> Result<Account> {
        let account = Account::new(fields);
        let mut accounts = self.accounts.write().await;

        let taken = accounts.values().any(|existing| {
            username_matches(existing, &account.username) || email_matches(existing, &account.email)
        });
        if taken {
            return Err(Error::Conflict(
                "User with provided email or username already exists".to_string(),
            ));
        }

        accounts.insert(account.id.clone(), account.clone());
        tracing::debug!("Inserted account {}", account.id);
        Ok(account)
    }

    async fn update_by_id(&self, id: &str, patch: AccountPatch) -> Result<Option<Account>> {
        let mut accounts = self.accounts.write().await;

        if let Some(email) = &patch.email {
            let taken = accounts
                .values()
                .any(|other| other.id != id && email_matches(other, email));
            if taken {
                return Err(Error::Conflict("Email is already in use".to_string()));
            }
        }

        Ok(accounts.get_mut(id).map(|account| {
            patch.apply(account);
            account.clone()
        }))
    }

    async fn rotate_refresh_token(
        &self,
        id: &str,
        presented: &str,
        replacement: Option<String>,
    ) -> Result<Option<Account>> {
        let mut accounts = self.accounts.write().await;
        match accounts.get_mut(id) {
            Some(account) if account.refresh_token.as_deref() == Some(presented) => {
                account.refresh_token = replacement;
                account.updated_at = chrono::Utc::now();
                Ok(Some(account.clone()))
            }
            _ => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fields(username: &str, email: &str) -> NewAccount {
        NewAccount {
            username: username.to_string(),
            email: email.to_string(),
            full_name: "Test User".to_string(),
            avatar: "https://cdn/a.png".to_string(),
            cover_image: String::new(),
            password_hash: "hash".to_string(),
        }
    }

    #[tokio::test]
    async fn test_insert_and_find() {
        let store = MemoryAccountStore::new();
        let account = store.insert(fields("Alice", "a@x.com")).await.unwrap();

        let by_id = store.find_by_id(&account.id).await.unwrap();
        assert_eq!(by_id.unwrap().username, "alice");

        let by_name = store
            .find_by_username_or_email(Some("ALICE"), None)
            .await
            .unwrap();
        assert!(by_name.is_some());

        let by_email = store
            .find_by_username_or_email(None, Some("A@X.com"))
            .await
            .unwrap();
        assert!(by_email.is_some());
    }

    #[tokio::test]
    async fn test_username_match_wins_over_email() {
        let store = MemoryAccountStore::new();
        let alice = store.insert(fields("alice", "a@x.com")).await.unwrap();
        let bob = store.insert(fields("bob", "b@x.com")).await.unwrap();

        for _ in 0..10 {
            let found = store
                .find_by_username_or_email(Some("alice"), Some("b@x.com"))
                .await
                .unwrap()
                .unwrap();
            assert_eq!(found.id, alice.id);
        }

        let found = store
            .find_by_username_or_email(Some("nobody"), Some("b@x.com"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(found.id, bob.id);
    }

    #[tokio::test]
    async fn test_insert_duplicate_username_conflicts() {
        let store = MemoryAccountStore::new();
        store.insert(fields("alice", "a@x.com")).await.unwrap();
        let result = store.insert(fields("ALICE", "other@x.com")).await;
        assert!(matches!(result, Err(Error::Conflict(_))));
        assert_eq!(store.account_count().await, 1);
    }

    #[tokio::test]
    async fn test_insert_duplicate_email_conflicts() {
        let store = MemoryAccountStore::new();
        store.insert(fields("alice", "a@x.com")).await.unwrap();
        let result = store.insert(fields("bob", "a@x.com")).await;
        assert!(matches!(result, Err(Error::Conflict(_))));
    }

    #[tokio::test]
    async fn test_update_missing_account() {
        let store = MemoryAccountStore::new();
        let result = store
            .update_by_id("missing", AccountPatch::default())
            .await
            .unwrap();
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_update_email_conflict() {
        let store = MemoryAccountStore::new();
        store.insert(fields("alice", "a@x.com")).await.unwrap();
        let bob = store.insert(fields("bob", "b@x.com")).await.unwrap();

        let patch = AccountPatch {
            email: Some("a@x.com".to_string()),
            ..AccountPatch::default()
        };
        let result = store.update_by_id(&bob.id, patch).await;
        assert!(matches!(result, Err(Error::Conflict(_))));
    }

    #[tokio::test]
    async fn test_rotate_requires_matching_token() {
        let store = MemoryAccountStore::new();
        let account = store.insert(fields("alice", "a@x.com")).await.unwrap();
        let patch = AccountPatch {
            refresh_token: Some(Some("first".to_string())),
            ..AccountPatch::default()
        };
        store.update_by_id(&account.id, patch).await.unwrap();

        let stale = store
            .rotate_refresh_token(&account.id, "other", Some("second".to_string()))
            .await
            .unwrap();
        assert!(stale.is_none());

        let rotated = store
            .rotate_refresh_token(&account.id, "first", Some("second".to_string()))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(rotated.refresh_token.as_deref(), Some("second"));

        let replay = store
            .rotate_refresh_token(&account.id, "first", Some("third".to_string()))
            .await
            .unwrap();
        assert!(replay.is_none());
    }

    #[tokio::test]
    async fn test_rotate_without_session_fails() {
        let store = MemoryAccountStore::new();
        let account = store.insert(fields("alice", "a@x.com")).await.unwrap();
        let result = store
            .rotate_refresh_token(&account.id, "anything", None)
            .await
            .unwrap();
        assert!(result.is_none());
    }
}
