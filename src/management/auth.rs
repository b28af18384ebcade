use std::path::PathBuf;

use chrono::Utc;

use crate::{config, error::TransportError, spotify, types::Token, warning};

/// Seconds before expiry at which a token is already treated as expired.
const EXPIRY_MARGIN_SECS: u64 = 240;

/// Owns the Spotify token of the current user and the file it is cached in.
///
/// The token is written by `onrepeat auth` and refreshed on demand by
/// [`TokenManager::get_valid_token`]. Every refresh is written back to disk
/// because Spotify rotates refresh tokens under PKCE, which leaves the
/// previously cached one unusable.
pub struct TokenManager {
    token: Token,
    path: PathBuf,
}

impl TokenManager {
    /// Wraps `token`, cached at `<data_local>/onrepeat/cache/token.json`.
    pub fn new(token: Token) -> Self {
        TokenManager {
            token,
            path: Self::token_path(),
        }
    }

    /// Caches the token at `path` instead of the default location.
    pub fn with_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.path = path.into();
        self
    }

    /// Reads the cached token from the default location.
    ///
    /// # Errors
    ///
    /// Returns a message when the file is missing or holds no valid token,
    /// which usually means `onrepeat auth` has not been run yet.
    pub async fn load() -> Result<Self, String> {
        let path = Self::token_path();
        let content = async_fs::read_to_string(&path)
            .await
            .map_err(|e| e.to_string())?;
        let token: Token = serde_json::from_str(&content).map_err(|e| e.to_string())?;
        Ok(Self { token, path })
    }

    /// Writes the token as pretty JSON, creating the cache directory first.
    pub async fn persist(&self) -> Result<(), String> {
        if let Some(parent) = self.path.parent() {
            async_fs::create_dir_all(parent)
                .await
                .map_err(|e| e.to_string())?;
        }

        let json = serde_json::to_string_pretty(&self.token).map_err(|e| e.to_string())?;
        async_fs::write(&self.path, json)
            .await
            .map_err(|e| e.to_string())
    }

    /// Swaps in `token` and writes it to disk.
    ///
    /// The new token stays in use even when the write fails; the error only
    /// tells the caller that the cache on disk is now stale.
    pub async fn replace_token(&mut self, token: Token) -> Result<(), String> {
        self.token = token;
        self.persist().await
    }

    /// Returns an access token that is good for at least a few more minutes,
    /// refreshing (and persisting) it first when needed.
    ///
    /// A refresh that cannot be saved is reported with a warning and the
    /// fresh access token is still returned.
    pub async fn get_valid_token(&mut self) -> Result<String, TransportError> {
        if self.is_expired() {
            let new_token = spotify::auth::refresh_token(&self.token.refresh_token)
                .await
                .map_err(TransportError::Auth)?;
            if let Err(e) = self.replace_token(new_token).await {
                warning!(
                    "Failed to save refreshed token: {}. Run onrepeat auth if the next run fails.",
                    e
                );
            }
        }

        Ok(self.token.access_token.clone())
    }

    pub fn access_token(&self) -> &str {
        &self.token.access_token
    }

    pub fn is_expired(&self) -> bool {
        let now = Utc::now().timestamp() as u64;
        now + EXPIRY_MARGIN_SECS >= self.token.obtained_at + self.token.expires_in
    }

    fn token_path() -> PathBuf {
        let mut path = config::data_dir();
        path.push("cache/token.json");
        path
    }
}
