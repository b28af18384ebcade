use base64::{Engine, engine::general_purpose::STANDARD};
use reqwest::Client;

use crate::error::TransportError;

/// Spotify rejects cover images above this size once base64 encoded.
pub const MAX_COVER_B64_BYTES: usize = 256 * 1024;

/// Downloads the image at `url` and returns it base64 encoded, ready for
/// [`SpotifyClient::upload_cover`](super::SpotifyClient::upload_cover).
pub async fn fetch_image_base64(url: &str) -> Result<String, TransportError> {
    let bytes = Client::new()
        .get(url)
        .send()
        .await?
        .error_for_status()?
        .bytes()
        .await?;

    let encoded = encode_cover(&bytes);
    if encoded.len() > MAX_COVER_B64_BYTES {
        return Err(TransportError::Remote(format!(
            "cover image is {} bytes encoded, Spotify accepts at most {}",
            encoded.len(),
            MAX_COVER_B64_BYTES
        )));
    }
    Ok(encoded)
}

pub fn encode_cover(image: &[u8]) -> String {
    STANDARD.encode(image)
}
