//! Session lifecycle management

use std::path::Path;
use std::sync::Arc;

use crate::accounts::{AccountPatch, AccountStore, NewAccount, PublicAccount};
use crate::auth::{hash_password, verify_password, TokenIssuer, TokenPair};
use crate::error::{Error, Result};
use crate::media::{upload_staged, MediaUploader};

use super::{required, Credentials, LoginOutcome, Registration};

/// Orchestrates credentials, tokens and the account store
pub struct SessionController {
    store: Arc<dyn AccountStore>,
    uploader: Arc<dyn MediaUploader>,
    tokens: TokenIssuer,
    bcrypt_cost: u32,
}

impl SessionController {
    pub fn new(
        store: Arc<dyn AccountStore>,
        uploader: Arc<dyn MediaUploader>,
        tokens: TokenIssuer,
        bcrypt_cost: u32,
    ) -> Self {
        Self {
            store,
            uploader,
            tokens,
            bcrypt_cost,
        }
    }

    pub fn tokens(&self) -> &TokenIssuer {
        &self.tokens
    }

    /// Create an account. No session is started.
    pub async fn register(&self, input: Registration) -> Result<PublicAccount> {
        let fields = [
            required(input.username.as_deref()),
            required(input.email.as_deref()),
            required(input.password.as_deref()),
            required(input.full_name.as_deref()),
        ];
        let [Some(username), Some(email), Some(_), Some(full_name)] = fields else {
            return Err(Error::Validation("All fields are required".to_string()));
        };
        let password = input.password.as_deref().unwrap_or_default();

        if self
            .store
            .find_by_username_or_email(Some(username), Some(email))
            .await?
            .is_some()
        {
            return Err(Error::Conflict(
                "User with provided email or username already exists".to_string(),
            ));
        }

        let avatar_path = input
            .avatar
            .as_deref()
            .ok_or_else(|| Error::Validation("Avatar image is required".to_string()))?;
        let avatar = upload_staged(self.uploader.as_ref(), avatar_path).await?;

        let cover_image = match input.cover_image.as_deref() {
            Some(path) => self.upload_optional(path).await,
            None => String::new(),
        };

        let password_hash = hash_password(password, self.bcrypt_cost).await?;

        // A concurrent registration can claim the username or email while
        // uploads run. The insert re-checks uniqueness; uploaded media is then
        // left with the provider.
        let inserted = match self
            .store
            .insert(NewAccount {
                username: username.to_lowercase(),
                email: email.to_string(),
                full_name: full_name.to_string(),
                avatar: avatar.url.clone(),
                cover_image: cover_image.clone(),
                password_hash,
            })
            .await
        {
            Ok(account) => account,
            Err(e @ Error::Conflict(_)) => {
                tracing::warn!(
                    "Registration for {} lost an insert race; orphaned media: avatar={} cover={:?}",
                    username,
                    avatar.url,
                    cover_image
                );
                return Err(e);
            }
            Err(e) => return Err(e),
        };

        let created = self.store.find_by_id(&inserted.id).await?.ok_or_else(|| {
            Error::Internal("Account missing immediately after registration".to_string())
        })?;

        tracing::info!("Registered account {}", created.id);
        Ok(created.to_public())
    }

    // A failed secondary upload leaves the field empty rather than failing registration.
    async fn upload_optional(&self, path: &Path) -> String {
        match upload_staged(self.uploader.as_ref(), path).await {
            Ok(media) => media.url,
            Err(e) => {
                tracing::debug!("Continuing without secondary image: {}", e);
                String::new()
            }
        }
    }

    /// Verify credentials, issue a token pair and persist the refresh token.
    ///
    /// Unknown account and wrong password are indistinguishable to the caller.
    pub async fn login(&self, credentials: Credentials) -> Result<LoginOutcome> {
        let username = required(credentials.username.as_deref());
        let email = required(credentials.email.as_deref());
        if username.is_none() && email.is_none() {
            return Err(Error::Validation("Username or email is required".to_string()));
        }
        if required(credentials.password.as_deref()).is_none() {
            return Err(Error::Validation("Password is required".to_string()));
        }
        let password = credentials.password.as_deref().unwrap_or_default();

        let Some(account) = self.store.find_by_username_or_email(username, email).await? else {
            tracing::debug!("Login rejected: no matching account");
            return Err(Error::Unauthorized);
        };

        if !verify_password(password, &account.password_hash).await? {
            tracing::debug!("Login rejected for account {}: wrong password", account.id);
            return Err(Error::Unauthorized);
        }

        let tokens = self.tokens.issue_pair(&account.id)?;
        let patch = AccountPatch {
            refresh_token: Some(Some(tokens.refresh_token.clone())),
            ..AccountPatch::default()
        };
        let updated = self
            .store
            .update_by_id(&account.id, patch)
            .await?
            .ok_or_else(|| Error::Internal("Account disappeared during login".to_string()))?;

        tracing::info!("Account {} logged in", updated.id);
        Ok(LoginOutcome {
            account: updated.to_public(),
            tokens,
        })
    }

    /// Exchange the current refresh token for a new pair.
    ///
    /// The stored token is replaced with a single compare-and-set, so a token
    /// can be redeemed at most once.
    pub async fn refresh(&self, presented: Option<&str>) -> Result<TokenPair> {
        let presented = required(presented).ok_or(Error::Unauthorized)?;
        let account_id = self.tokens.verify_refresh(presented)?;

        let tokens = self.tokens.issue_pair(&account_id)?;
        let rotated = self
            .store
            .rotate_refresh_token(&account_id, presented, Some(tokens.refresh_token.clone()))
            .await?;

        if rotated.is_none() {
            tracing::warn!("Refresh token for account {} is stale or revoked", account_id);
            return Err(Error::Unauthorized);
        }

        tracing::info!("Rotated session for account {}", account_id);
        Ok(tokens)
    }

    /// Revoke the account's refresh token. Succeeds if it was already revoked.
    pub async fn logout(&self, account_id: &str) -> Result<()> {
        let patch = AccountPatch {
            refresh_token: Some(None),
            ..AccountPatch::default()
        };
        if self.store.update_by_id(account_id, patch).await?.is_none() {
            tracing::debug!("Logout for missing account {}", account_id);
        } else {
            tracing::info!("Account {} logged out", account_id);
        }
        Ok(())
    }

    /// Replace the password of an authenticated account and end its session
    pub async fn change_password(
        &self,
        account_id: &str,
        old_password: Option<&str>,
        new_password: Option<&str>,
    ) -> Result<()> {
        let (Some(_), Some(_)) = (required(old_password), required(new_password)) else {
            return Err(Error::Validation(
                "Old password and new password are required".to_string(),
            ));
        };
        let old_password = old_password.unwrap_or_default();
        let new_password = new_password.unwrap_or_default();

        let account = self
            .store
            .find_by_id(account_id)
            .await?
            .ok_or(Error::Unauthorized)?;

        if !verify_password(old_password, &account.password_hash).await? {
            tracing::debug!("Password change rejected for account {}", account_id);
            return Err(Error::Unauthorized);
        }

        let patch = AccountPatch {
            password_hash: Some(hash_password(new_password, self.bcrypt_cost).await?),
            refresh_token: Some(None),
            ..AccountPatch::default()
        };
        self.store
            .update_by_id(account_id, patch)
            .await?
            .ok_or(Error::Unauthorized)?;

        tracing::info!("Password changed for account {}; session revoked", account_id);
        Ok(())
    }

    /// Resolve an access token to the account it belongs to
    pub async fn resolve_identity(&self, token: Option<&str>) -> Result<PublicAccount> {
        let token = required(token).ok_or(Error::Unauthorized)?;
        let account_id = self.tokens.verify_access(token)?;
        match self.store.find_by_id(&account_id).await? {
            Some(account) => Ok(account.to_public()),
            None => {
                tracing::debug!("Access token for missing account {}", account_id);
                Err(Error::Unauthorized)
            }
        }
    }

    /// Update the full name and email of an account
    pub async fn update_details(
        &self,
        account_id: &str,
        full_name: Option<&str>,
        email: Option<&str>,
    ) -> Result<PublicAccount> {
        let (Some(full_name), Some(email)) = (required(full_name), required(email)) else {
            return Err(Error::Validation("Full name and email are required".to_string()));
        };

        let patch = AccountPatch {
            full_name: Some(full_name.to_string()),
            email: Some(email.to_string()),
            ..AccountPatch::default()
        };
        self.patch_account(account_id, patch).await
    }

    /// Upload a new primary image and store its URL
    pub async fn update_avatar(&self, account_id: &str, staged: Option<&Path>) -> Result<PublicAccount> {
        let staged =
            staged.ok_or_else(|| Error::Validation("Avatar image is required".to_string()))?;
        let media = upload_staged(self.uploader.as_ref(), staged).await?;
        let patch = AccountPatch {
            avatar: Some(media.url),
            ..AccountPatch::default()
        };
        self.patch_account(account_id, patch).await
    }

    /// Upload a new cover image and store its URL
    pub async fn update_cover_image(
        &self,
        account_id: &str,
        staged: Option<&Path>,
    ) -> Result<PublicAccount> {
        let staged =
            staged.ok_or_else(|| Error::Validation("Cover image is required".to_string()))?;
        let media = upload_staged(self.uploader.as_ref(), staged).await?;
        let patch = AccountPatch {
            cover_image: Some(media.url),
            ..AccountPatch::default()
        };
        self.patch_account(account_id, patch).await
    }

    async fn patch_account(&self, account_id: &str, patch: AccountPatch) -> Result<PublicAccount> {
        self.store
            .update_by_id(account_id, patch)
            .await?
            .map(|account| account.to_public())
            .ok_or_else(|| Error::NotFound("User not found".to_string()))
    }
}
