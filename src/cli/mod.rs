//! # CLI Module
//!
//! User-facing commands. This is the only layer that prints: the sync
//! core hands back reports and typed errors, and the functions here turn
//! them into tables and colored status lines.
//!
//! - [`auth`] - OAuth 2.0 PKCE login, stores the token locally
//! - [`sync`] - make sure the playlist exists, then add new top tracks
//! - [`top`] - show the current top tracks for a time range
//!
//! ```bash
//! onrepeat auth
//! onrepeat sync
//! onrepeat sync --dry-run --time-range short-term
//! onrepeat top --time-range long-term
//! ```

mod auth;
mod sync;
mod top;

use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};

use crate::{
    error::SyncError,
    paging::fetch_all_from,
    spotify::{SpotifyClient, TopTracks},
    types::{TimeRange, Track},
};

pub use auth::auth;
pub use sync::{SyncOptions, sync};
pub use top::top;

/// Page size the top tracks endpoint is read with.
pub const TOP_TRACKS_LIMIT: u32 = 20;
/// Page size the user's playlists are read with.
pub const USER_PLAYLISTS_LIMIT: u32 = 50;

pub(crate) fn spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(100));
    if let Ok(style) = ProgressStyle::with_template("{spinner:.blue} {msg}") {
        pb.set_style(style.tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏"));
    }
    pb
}

pub(crate) async fn fetch_top_tracks(
    client: &SpotifyClient,
    time_range: TimeRange,
) -> Result<Vec<Track>, SyncError> {
    let source = TopTracks { client, time_range };
    fetch_all_from(&source, Some(TOP_TRACKS_LIMIT), Some(0)).await
}
