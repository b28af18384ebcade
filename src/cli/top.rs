use tabled::Table;

use crate::{
    Res, info,
    spotify::SpotifyClient,
    types::{TimeRange, TrackTableRow},
    utils,
};

use super::{fetch_top_tracks, spinner};

pub async fn top(time_range: TimeRange) -> Res<()> {
    let client = SpotifyClient::from_cache().await?;

    let pb = spinner(&format!("Fetching {} top tracks...", time_range.label()));
    let tracks = fetch_top_tracks(&client, time_range).await;
    pb.finish_and_clear();
    let tracks = tracks?;

    if tracks.is_empty() {
        info!("No {} top tracks yet.", time_range.label());
        return Ok(());
    }

    let rows: Vec<TrackTableRow> = tracks
        .iter()
        .enumerate()
        .map(|(i, track)| TrackTableRow {
            rank: i + 1,
            title: track.name.clone(),
            album: track.album.name.clone(),
            artists: utils::join_artists(track),
        })
        .collect();

    println!("{}", Table::new(rows));
    Ok(())
}
