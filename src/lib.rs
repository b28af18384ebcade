//! onrepeat library
//!
//! Keeps an "On Repeat Forever" playlist on Spotify filled with every track
//! that has ever shown up in the user's top tracks. New top tracks are
//! added, nothing is ever removed.
//!
//! # Modules
//!
//! - `paging` - flattens limit/offset paginated collections
//! - `sync` - add-only playlist reconciliation with verification
//! - `error` - error types of the core and the Spotify client
//! - `api` - HTTP API endpoints for the local callback server
//! - `cli` - Command-line interface implementations
//! - `config` - Configuration management and environment variables
//! - `management` - Token storage and refresh
//! - `server` - Local HTTP server for OAuth callbacks
//! - `spotify` - Spotify Web API client implementation
//! - `types` - Data structures and type definitions
//! - `utils` - Utility functions and helpers
//!
//! # Example
//!
//! ```ignore
//! use onrepeat::{paging::fetch_all_from, spotify::{SpotifyClient, TopTracks}, sync::PlaylistSyncEngine};
//!
//! let client = SpotifyClient::from_cache().await?;
//! let top = fetch_all_from(&TopTracks { client: &client, time_range }, Some(20), Some(0)).await?;
//! let ids: Vec<_> = top.iter().map(|t| t.id.clone()).collect();
//! let report = PlaylistSyncEngine::new(&client).sync(&playlist_id, &ids).await?;
//! ```

pub mod api;
pub mod cli;
pub mod config;
pub mod error;
pub mod management;
pub mod paging;
pub mod server;
pub mod spotify;
pub mod sync;
pub mod types;
pub mod utils;

/// Result alias for the command layer, where errors are only reported.
///
/// The sync core uses the typed errors in [`error`] instead.
pub type Res<T> = std::result::Result<T, Box<dyn std::error::Error + Send + Sync>>;

/// Prints an informational message with a blue bullet point.
///
/// Used for status lines that need no attention from the user, such as
/// which playlist was picked or that nothing had to be added.
///
/// # Arguments
///
/// Accepts the same arguments as `println!`.
///
/// # Example
///
/// ```ignore
/// info!("Found playlist \"{}\"", name);
/// info!("Would add {} tracks", planned.len());
/// ```
#[macro_export]
macro_rules! info {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "o".blue().bold(), std::format_args!($($arg)*));
  })
}

/// Prints a success message with a green checkmark.
///
/// # Arguments
///
/// Accepts the same arguments as `println!`.
///
/// # Example
///
/// ```ignore
/// success!("Created Spotify playlist \"{}\".", name);
/// ```
#[macro_export]
macro_rules! success {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "✓".green().bold(), std::format_args!($($arg)*));
  })
}

/// Prints an error message with a red exclamation mark to stderr and exits
/// the process with status 1.
///
/// Only the binary calls this; library code returns errors.
///
/// # Arguments
///
/// Accepts the same arguments as `eprintln!`.
///
/// # Example
///
/// ```ignore
/// if let Err(e) = result {
///     error!("{}", e);
/// }
/// ```
#[macro_export]
macro_rules! error {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    eprintln!("[{}] {}", "!".red().bold(), std::format_args!($($arg)*));
    std::process::exit(1);
  })
}

/// Prints a warning message with a yellow exclamation mark.
///
/// For problems the current command can continue past, like a cover image
/// that failed to upload.
///
/// # Arguments
///
/// Accepts the same arguments as `println!`.
///
/// # Example
///
/// ```ignore
/// warning!("Failed to set cover image: {}", e);
/// ```
#[macro_export]
macro_rules! warning {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "!".yellow().bold(), std::format_args!($($arg)*));
  })
}
