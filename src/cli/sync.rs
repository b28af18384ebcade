use std::collections::BTreeSet;

use tabled::Table;

use crate::{
    Res,
    error::SyncError,
    info,
    paging::fetch_all_from,
    spotify::{SpotifyClient, UserPlaylists, cover},
    success,
    sync::{PlaylistSyncEngine, ReconciliationReport},
    types::{PlaylistId, TimeRange, Track, TrackId},
    utils, warning,
};

use super::{USER_PLAYLISTS_LIMIT, fetch_top_tracks, spinner};

#[derive(Debug, Clone)]
pub struct SyncOptions {
    pub playlist_name: String,
    pub playlist_description: String,
    /// Top tracks kept in sync on every run.
    pub time_range: TimeRange,
    /// Top tracks the playlist is seeded with when it gets created.
    pub seed_time_range: TimeRange,
    /// Insertion index for new tracks; `None` appends.
    pub position: Option<u32>,
    /// Cover image uploaded on creation; `None` skips the upload.
    pub cover_url: Option<String>,
    pub dry_run: bool,
}

pub async fn sync(opts: SyncOptions) -> Res<()> {
    let client = SpotifyClient::from_cache().await?;

    let pb = spinner("Fetching your playlists...");
    let lookup = find_playlist(&client, &opts.playlist_name).await;
    pb.finish_and_clear();
    let existing = lookup?;

    let engine = PlaylistSyncEngine::new(&client).with_position(opts.position);

    let playlist_id = match existing {
        Some(id) => {
            info!("Found playlist \"{}\"", opts.playlist_name);
            id
        }
        None if opts.dry_run => {
            info!(
                "Playlist \"{}\" does not exist and would be created.",
                opts.playlist_name
            );
            let pb = spinner("Fetching top tracks...");
            let fetched = async {
                let seed = fetch_top_tracks(&client, opts.seed_time_range).await?;
                let top = fetch_top_tracks(&client, opts.time_range).await?;
                Ok::<_, SyncError>((seed, top))
            }
            .await;
            pb.finish_and_clear();
            let (seed, top) = fetched?;

            let (seeded, rest) =
                utils::creation_plan(&utils::track_ids(&seed), &utils::track_ids(&top));
            render_plan(&seed, &seeded, opts.seed_time_range);
            render_plan(&top, &rest, opts.time_range);
            return Ok(());
        }
        None => {
            let id = create_playlist(&client, &opts).await?;
            let seed = fetch_top_tracks(&client, opts.seed_time_range).await?;
            let report = run_sync(&engine, &id, &seed).await?;
            render_report(&report, &seed, opts.seed_time_range, &opts.playlist_name);
            id
        }
    };

    let pb = spinner(&format!("Fetching {} top tracks...", opts.time_range.label()));
    let top = fetch_top_tracks(&client, opts.time_range).await;
    pb.finish_and_clear();
    let top = top?;

    if opts.dry_run {
        let planned = engine.plan(&playlist_id, &utils::track_ids(&top)).await?;
        render_plan(&top, &planned, opts.time_range);
        return Ok(());
    }

    let report = run_sync(&engine, &playlist_id, &top).await?;
    render_report(&report, &top, opts.time_range, &opts.playlist_name);
    Ok(())
}

async fn find_playlist(
    client: &SpotifyClient,
    name: &str,
) -> Result<Option<PlaylistId>, SyncError> {
    let playlists = fetch_all_from(
        &UserPlaylists { client },
        Some(USER_PLAYLISTS_LIMIT),
        Some(0),
    )
    .await?;
    Ok(utils::find_playlist(&playlists, name).map(|p| p.id.clone()))
}

async fn create_playlist(client: &SpotifyClient, opts: &SyncOptions) -> Res<PlaylistId> {
    let user = client.current_user().await?;
    let created = client
        .create_playlist(&user.id, &opts.playlist_name, &opts.playlist_description)
        .await?;
    success!("Created Spotify playlist \"{}\".", created.name);

    if let Some(url) = &opts.cover_url {
        let uploaded = match cover::fetch_image_base64(url).await {
            Ok(image) => client.upload_cover(&created.id, &image).await,
            Err(e) => Err(e),
        };
        if let Err(e) = uploaded {
            warning!("Failed to set cover image: {}", e);
        }
    }

    Ok(created.id)
}

async fn run_sync(
    engine: &PlaylistSyncEngine<&SpotifyClient>,
    playlist: &PlaylistId,
    ranked: &[Track],
) -> Result<ReconciliationReport, SyncError> {
    let pb = spinner("Syncing playlist...");
    let result = engine.sync(playlist, &utils::track_ids(ranked)).await;
    pb.finish_and_clear();

    if let Err(SyncError::PartialSync { attempted, .. }) = &result {
        warning!(
            "Spotify rejected the add of {} track(s); some may have been added anyway. Running sync again is safe.",
            attempted.len()
        );
    }
    result
}

fn render_report(
    report: &ReconciliationReport,
    ranked: &[Track],
    time_range: TimeRange,
    playlist_name: &str,
) {
    if report.is_noop() {
        info!(
            "No new {} top tracks for \"{}\".",
            time_range.label(),
            playlist_name
        );
        return;
    }

    if !report.added().is_empty() {
        success!(
            "Added {} {} tracks to \"{}\":",
            report.added().len(),
            time_range.label(),
            playlist_name
        );
        println!("{}", Table::new(utils::track_rows(ranked, report.added())));
    }

    if !report.failed().is_empty() {
        warning!(
            "Failed to add {} {} tracks:",
            report.failed().len(),
            time_range.label()
        );
        println!("{}", Table::new(utils::track_rows(ranked, report.failed())));
    }
}

fn render_plan(ranked: &[Track], planned: &[TrackId], time_range: TimeRange) {
    if planned.is_empty() {
        info!(
            "Nothing to add, playlist already has every {} top track.",
            time_range.label()
        );
        return;
    }

    let planned: BTreeSet<TrackId> = planned.iter().cloned().collect();
    info!("Would add {} {} tracks:", planned.len(), time_range.label());
    println!("{}", Table::new(utils::track_rows(ranked, &planned)));
}
