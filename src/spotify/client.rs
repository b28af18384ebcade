use std::time::Duration;

use reqwest::{Client, RequestBuilder, Response, StatusCode, header};
use serde::de::DeserializeOwned;
use tokio::{sync::Mutex, time::sleep};

use crate::{
    config,
    error::TransportError,
    management::TokenManager,
    paging::{Page, PageSource, PageWindow},
    sync::PlaylistMutator,
    types::{
        AddTracksRequest, CreatePlaylistRequest, CreatePlaylistResponse, CurrentUser, PlaylistId,
        PlaylistSummary, PlaylistTrackItem, SnapshotResponse, TimeRange, Track, TrackId,
    },
};

/// Spotify accepts at most this many track uris per add request.
pub const ADD_TRACKS_CHUNK: usize = 100;

const MAX_ATTEMPTS: u32 = 4;
const BAD_GATEWAY_DELAY: Duration = Duration::from_secs(10);
const DEFAULT_RETRY_AFTER: Duration = Duration::from_secs(5);

/// Authenticated Spotify Web API client.
///
/// Every request goes out with a fresh bearer token from the wrapped
/// [`TokenManager`]. `502 Bad Gateway` is retried after a fixed delay and
/// `429 Too Many Requests` after the delay the API asks for, up to four
/// attempts in total. Everything else is handed back as a [`TransportError`].
pub struct SpotifyClient {
    http: Client,
    api_url: String,
    tokens: Mutex<TokenManager>,
}

impl SpotifyClient {
    pub fn new(tokens: TokenManager) -> Self {
        Self {
            http: Client::new(),
            api_url: config::spotify_apiurl(),
            tokens: Mutex::new(tokens),
        }
    }

    /// Builds a client from the cached token written by `onrepeat auth`.
    pub async fn from_cache() -> Result<Self, TransportError> {
        let tokens = TokenManager::load().await.map_err(TransportError::Auth)?;
        Ok(Self::new(tokens))
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.api_url, path)
    }

    async fn send<F>(&self, build: F) -> Result<Response, TransportError>
    where
        F: Fn(&Client) -> RequestBuilder,
    {
        let mut attempt = 1;
        loop {
            let token = self.tokens.lock().await.get_valid_token().await?;
            let response = build(&self.http).bearer_auth(token).send().await?;

            let delay = match response.status() {
                StatusCode::BAD_GATEWAY => BAD_GATEWAY_DELAY,
                StatusCode::TOO_MANY_REQUESTS => retry_after(&response),
                _ => return Ok(response.error_for_status()?),
            };

            if attempt >= MAX_ATTEMPTS {
                return Ok(response.error_for_status()?);
            }
            attempt += 1;
            sleep(delay).await;
        }
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, TransportError> {
        let url = self.url(path);
        let response = self.send(|http| http.get(&url).query(query)).await?;
        Ok(response.json::<T>().await?)
    }

    pub async fn current_user(&self) -> Result<CurrentUser, TransportError> {
        self.get_json("/me", &[]).await
    }

    pub async fn playlists_page(
        &self,
        window: PageWindow,
    ) -> Result<Page<PlaylistSummary>, TransportError> {
        self.get_json("/me/playlists", &window_query(window)).await
    }

    pub async fn top_tracks_page(
        &self,
        time_range: TimeRange,
        window: PageWindow,
    ) -> Result<Page<Track>, TransportError> {
        let mut query = window_query(window);
        query.push(("time_range", time_range.as_str().to_string()));
        self.get_json("/me/top/tracks", &query).await
    }

    pub async fn playlist_tracks_page(
        &self,
        playlist: &PlaylistId,
        window: PageWindow,
    ) -> Result<Page<PlaylistTrackItem>, TransportError> {
        let mut query = window_query(window);
        query.push(("fields", "items(track(id)),limit,offset,total,next".to_string()));
        self.get_json(&format!("/playlists/{}/tracks", playlist), &query)
            .await
    }

    pub async fn create_playlist(
        &self,
        user_id: &str,
        name: &str,
        description: &str,
    ) -> Result<CreatePlaylistResponse, TransportError> {
        let url = self.url(&format!("/users/{}/playlists", user_id));
        let body = CreatePlaylistRequest {
            name: name.to_string(),
            description: description.to_string(),
            public: true,
            collaborative: false,
        };

        let response = self.send(|http| http.post(&url).json(&body)).await?;
        Ok(response.json::<CreatePlaylistResponse>().await?)
    }

    /// Replaces the playlist cover with a base64 encoded JPEG.
    pub async fn upload_cover(
        &self,
        playlist: &PlaylistId,
        image_b64: &str,
    ) -> Result<(), TransportError> {
        let url = self.url(&format!("/playlists/{}/images", playlist));
        self.send(|http| {
            http.put(&url)
                .header(header::CONTENT_TYPE, "image/jpeg")
                .body(image_b64.to_string())
        })
        .await?;
        Ok(())
    }

    /// Adds `tracks` in order, starting at `position` (or at the end).
    ///
    /// Requests are split into chunks of [`ADD_TRACKS_CHUNK`]; each chunk is
    /// inserted right after the previous one so the tracks stay contiguous.
    pub async fn add_tracks(
        &self,
        playlist: &PlaylistId,
        tracks: &[TrackId],
        position: Option<u32>,
    ) -> Result<(), TransportError> {
        let url = self.url(&format!("/playlists/{}/tracks", playlist));

        for body in add_requests(tracks, position)? {
            self.send(|http| http.post(&url).json(&body))
                .await?
                .json::<SnapshotResponse>()
                .await?;
        }
        Ok(())
    }
}

impl PlaylistMutator for SpotifyClient {
    async fn playlist_items(
        &self,
        playlist: &PlaylistId,
        window: PageWindow,
    ) -> Result<Page<Option<TrackId>>, TransportError> {
        let page = self.playlist_tracks_page(playlist, window).await?;
        Ok(page.map(|item| item.track.and_then(|track| track.id)))
    }

    async fn add_items(
        &self,
        playlist: &PlaylistId,
        items: &[TrackId],
        position: Option<u32>,
    ) -> Result<(), TransportError> {
        self.add_tracks(playlist, items, position).await
    }
}

/// The current user's playlists.
pub struct UserPlaylists<'a> {
    pub client: &'a SpotifyClient,
}

impl PageSource for UserPlaylists<'_> {
    type Item = PlaylistSummary;

    async fn fetch_page(&self, window: PageWindow) -> Result<Page<Self::Item>, TransportError> {
        self.client.playlists_page(window).await
    }
}

/// The current user's top tracks over `time_range`, best first.
pub struct TopTracks<'a> {
    pub client: &'a SpotifyClient,
    pub time_range: TimeRange,
}

impl PageSource for TopTracks<'_> {
    type Item = Track;

    async fn fetch_page(&self, window: PageWindow) -> Result<Page<Self::Item>, TransportError> {
        self.client.top_tracks_page(self.time_range, window).await
    }
}

/// Request bodies adding `tracks` in order, [`ADD_TRACKS_CHUNK`] at a time.
///
/// Chunk `k` is inserted at `position + k * ADD_TRACKS_CHUNK`, so the whole
/// batch ends up as one contiguous block. With `position == None` every
/// chunk is appended, which keeps the order as well.
pub fn add_requests(
    tracks: &[TrackId],
    position: Option<u32>,
) -> Result<Vec<AddTracksRequest>, TransportError> {
    tracks
        .chunks(ADD_TRACKS_CHUNK)
        .enumerate()
        .map(|(index, chunk)| {
            let position = position
                .map(|start| chunk_position(start, index))
                .transpose()?;
            Ok(AddTracksRequest {
                uris: chunk.iter().map(TrackId::uri).collect(),
                position,
            })
        })
        .collect()
}

fn chunk_position(start: u32, index: usize) -> Result<u32, TransportError> {
    index
        .checked_mul(ADD_TRACKS_CHUNK)
        .and_then(|offset| u32::try_from(offset).ok())
        .and_then(|offset| start.checked_add(offset))
        .ok_or_else(|| {
            TransportError::InvalidRequest(format!(
                "insert position overflows for chunk {} starting at {}",
                index, start
            ))
        })
}

fn window_query(window: PageWindow) -> Vec<(&'static str, String)> {
    let mut query = Vec::new();
    if let Some(limit) = window.limit {
        query.push(("limit", limit.to_string()));
    }
    if let Some(offset) = window.offset {
        query.push(("offset", offset.to_string()));
    }
    query
}

fn retry_after(response: &Response) -> Duration {
    response
        .headers()
        .get(header::RETRY_AFTER)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.parse::<u64>().ok())
        .map(Duration::from_secs)
        .unwrap_or(DEFAULT_RETRY_AFTER)
}
