//! Error types shared by the sync core and the Spotify client.
//!
//! Three layers are kept apart:
//!
//! - [`ConfigError`] - a required environment variable is missing.
//! - [`TransportError`] - the remote collaborator could not complete a call.
//! - [`SyncError`] - what the pagination and sync core hands back to callers.

use thiserror::Error;

use crate::types::{PlaylistId, TrackId};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("cannot prepare config directory: {0}")]
    Io(#[from] std::io::Error),

    #[error("cannot load .env file: {0}")]
    Dotenv(#[from] dotenv::Error),
}

/// A remote call did not complete.
///
/// Covers network, auth, rate-limit and decoding failures. No retry is
/// attempted above the client that produced it.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("http request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("not authenticated: {0}. Please run onrepeat auth")]
    Auth(String),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("remote error: {0}")]
    Remote(String),

    /// The request could not be built, e.g. an insert position past `u32::MAX`.
    #[error("invalid request: {0}")]
    InvalidRequest(String),
}

#[derive(Debug, Error)]
pub enum SyncError {
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// A page broke the limit/offset contract.
    #[error("protocol violation: {0}")]
    ProtocolViolation(String),

    /// The batched add failed; any subset of `attempted` may have landed.
    #[error(
        "adding {} track(s) to playlist {playlist} failed, remote state unknown: {source}",
        .attempted.len()
    )]
    PartialSync {
        playlist: PlaylistId,
        attempted: Vec<TrackId>,
        #[source]
        source: TransportError,
    },
}
