//! HTTP endpoints of the local server started during `onrepeat auth`.
//!
//! - [`callback`] - receives the authorization code from Spotify and
//!   finishes the PKCE exchange.
//! - [`health`] - liveness check returning status and version.

mod callback;
mod health;

pub use callback::callback;
pub use health::health;
