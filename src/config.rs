//! Configuration management for onrepeat.
//!
//! Values come from environment variables, optionally seeded from a `.env`
//! file in the local data directory. Lookup order:
//! 1. Environment variables (highest priority)
//! 2. `.env` file in the local data directory
//! 3. Application defaults (where applicable)
//!
//! Credentials and the callback address have no default; asking for them
//! while unset yields [`ConfigError::Missing`].

use std::{env, path::PathBuf};

use crate::error::ConfigError;

pub const DEFAULT_PLAYLIST_NAME: &str = "On Repeat Forever";
pub const DEFAULT_PLAYLIST_DESCRIPTION: &str =
    "Any song that has ever shown up in your Top Tracks.";
pub const DEFAULT_COVER_URL: &str = "https://m.media-amazon.com/images/I/61QIdzXGuxL._SL1500_.jpg";
pub const DEFAULT_SCOPE: &str =
    "playlist-read-private playlist-modify-public playlist-modify-private user-top-read ugc-image-upload";

/// Returns the directory onrepeat keeps its `.env` and token cache in.
///
/// - Linux: `~/.local/share/onrepeat`
/// - macOS: `~/Library/Application Support/onrepeat`
/// - Windows: `%LOCALAPPDATA%/onrepeat`
pub fn data_dir() -> PathBuf {
    let mut path = dirs::data_local_dir().unwrap_or_else(|| PathBuf::from("."));
    path.push("onrepeat");
    path
}

/// Loads environment variables from `<data_dir>/.env`.
///
/// Creates the data directory when it is missing. A missing `.env` file is
/// not an error since every value can also come from the environment.
///
/// # Errors
///
/// Fails if the directory cannot be created or the `.env` file exists but
/// cannot be parsed.
pub async fn load_env() -> Result<(), ConfigError> {
    let dir = data_dir();
    async_fs::create_dir_all(&dir).await?;

    let path = dir.join(".env");
    if path.is_file() {
        dotenv::from_path(path)?;
    }
    Ok(())
}

fn required(key: &'static str) -> Result<String, ConfigError> {
    env::var(key).map_err(|_| ConfigError::Missing(key))
}

fn or_default(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Address the local OAuth callback server binds to, e.g. `127.0.0.1:8888`.
pub fn server_addr() -> Result<String, ConfigError> {
    required("SERVER_ADDRESS")
}

/// Client id of the application registered with Spotify.
pub fn spotify_client_id() -> Result<String, ConfigError> {
    required("SPOTIFY_API_AUTH_CLIENT_ID")
}

/// Callback URL registered with Spotify, e.g. `http://127.0.0.1:8888/callback`.
pub fn spotify_redirect_uri() -> Result<String, ConfigError> {
    required("SPOTIFY_API_REDIRECT_URI")
}

pub fn spotify_scope() -> String {
    or_default("SPOTIFY_API_AUTH_SCOPE", DEFAULT_SCOPE)
}

pub fn spotify_apiauth_url() -> String {
    or_default(
        "SPOTIFY_API_AUTH_URL",
        "https://accounts.spotify.com/authorize",
    )
}

pub fn spotify_apiurl() -> String {
    or_default("SPOTIFY_API_URL", "https://api.spotify.com/v1")
}

pub fn spotify_apitoken_url() -> String {
    or_default(
        "SPOTIFY_API_TOKEN_URL",
        "https://accounts.spotify.com/api/token",
    )
}

/// Name of the playlist that collects top tracks.
pub fn playlist_name() -> String {
    or_default("ONREPEAT_PLAYLIST_NAME", DEFAULT_PLAYLIST_NAME)
}

pub fn playlist_description() -> String {
    or_default("ONREPEAT_PLAYLIST_DESCRIPTION", DEFAULT_PLAYLIST_DESCRIPTION)
}

/// Image uploaded as cover art when the playlist is created. Empty disables the upload.
pub fn cover_url() -> String {
    or_default("ONREPEAT_COVER_URL", DEFAULT_COVER_URL)
}
