use std::collections::{BTreeSet, HashSet};

use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use rand::{Rng, distr::Alphanumeric};
use sha2::{Digest, Sha256};

use crate::{
    sync,
    types::{PlaylistSummary, Track, TrackId, TrackTableRow},
};

pub fn generate_code_verifier() -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(128)
        .map(char::from)
        .collect()
}

pub fn generate_code_challenge(verifier: &str) -> String {
    let hash = Sha256::digest(verifier.as_bytes());
    URL_SAFE_NO_PAD.encode(hash)
}

pub fn join_artists(track: &Track) -> String {
    track
        .artists
        .iter()
        .map(|a| a.name.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

pub fn track_ids(tracks: &[Track]) -> Vec<TrackId> {
    tracks.iter().map(|t| t.id.clone()).collect()
}

/// First playlist named exactly `name`, in the order Spotify lists them.
pub fn find_playlist<'a>(
    playlists: &'a [PlaylistSummary],
    name: &str,
) -> Option<&'a PlaylistSummary> {
    playlists.iter().find(|p| p.name == name)
}

/// What a sync would add to a playlist that does not exist yet.
///
/// The new playlist is first seeded with `seed`, then `top` is synced
/// against it, so the second list only holds the `top` tracks the seed does
/// not already cover. Both keep rank order with duplicates dropped.
pub fn creation_plan(seed: &[TrackId], top: &[TrackId]) -> (Vec<TrackId>, Vec<TrackId>) {
    let seeded = sync::diff(seed, &HashSet::new());
    let after_seed: HashSet<TrackId> = seeded.iter().cloned().collect();
    let rest = sync::diff(top, &after_seed);
    (seeded, rest)
}

/// Table rows for the tracks in `ids`, numbered 1.. in the order of `ranked`.
///
/// Ids with no matching track in `ranked` are listed last with only the id
/// as title.
pub fn track_rows(ranked: &[Track], ids: &BTreeSet<TrackId>) -> Vec<TrackTableRow> {
    let mut rows: Vec<TrackTableRow> = Vec::new();
    let mut listed = BTreeSet::new();

    for track in ranked {
        if ids.contains(&track.id) && listed.insert(&track.id) {
            rows.push(TrackTableRow {
                rank: rows.len() + 1,
                title: track.name.clone(),
                album: track.album.name.clone(),
                artists: join_artists(track),
            });
        }
    }

    for id in ids.iter().filter(|id| !listed.contains(id)) {
        rows.push(TrackTableRow {
            rank: rows.len() + 1,
            title: id.to_string(),
            album: String::new(),
            artists: String::new(),
        });
    }

    rows
}
