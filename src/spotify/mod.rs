//! # Spotify Integration Module
//!
//! The remote side of onrepeat: everything that talks HTTP to Spotify.
//!
//! ```text
//! CLI (orchestration)
//!          ↓
//! sync / paging core
//!          ↓
//! Spotify Integration Layer
//!     ├── client  (Web API calls, page sources, PlaylistMutator)
//!     ├── auth    (OAuth 2.0 PKCE, token refresh)
//!     └── cover   (cover art download + base64)
//!          ↓
//! Spotify Web API
//! ```
//!
//! ## API Coverage
//!
//! - `GET /me` - current user id
//! - `GET /me/playlists` - the user's playlists, paged
//! - `GET /me/top/tracks` - the user's top tracks for a time range, paged
//! - `GET /playlists/{playlist_id}/tracks` - playlist contents, paged
//! - `POST /users/{user_id}/playlists` - create a playlist
//! - `PUT /playlists/{playlist_id}/images` - upload cover art
//! - `POST /playlists/{playlist_id}/tracks` - add tracks at a position
//! - `POST /api/token` - token exchange and refresh
//!
//! ## Error Handling
//!
//! Rate limiting (`429`) and `502 Bad Gateway` are retried inside
//! [`SpotifyClient`]; every other failure surfaces as a
//! [`TransportError`](crate::error::TransportError) and is never retried
//! by the layers above.

pub mod auth;
pub mod client;
pub mod cover;

pub use client::{SpotifyClient, TopTracks, UserPlaylists};
