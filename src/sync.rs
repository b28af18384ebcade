//! Add-only reconciliation of a playlist against a desired track list.
//!
//! [`PlaylistSyncEngine::sync`] reads the playlist, adds whatever desired
//! tracks are missing in one batched call, then reads the playlist again
//! and reports which of those tracks are now present. Existing tracks are
//! never removed, and running it again against an unchanged playlist is a
//! no-op.

use std::{
    collections::{BTreeSet, HashSet},
    future::Future,
};

use crate::{
    error::{SyncError, TransportError},
    paging::{Page, PageWindow, fetch_all},
    types::{PlaylistId, TrackId},
};

/// Page size used when reading a playlist's tracks.
pub const PLAYLIST_PAGE_LIMIT: u32 = 100;

/// Read and add access to a remote playlist.
///
/// `playlist_items` yields one entry per playlist slot. Slots that carry no
/// track id (local files, unavailable tracks) are `None` so the page keeps
/// its length for the pagination end check.
pub trait PlaylistMutator {
    fn playlist_items(
        &self,
        playlist: &PlaylistId,
        window: PageWindow,
    ) -> impl Future<Output = Result<Page<Option<TrackId>>, TransportError>>;

    /// Inserts `items` in order at `position`, or appends them when `position` is `None`.
    fn add_items(
        &self,
        playlist: &PlaylistId,
        items: &[TrackId],
        position: Option<u32>,
    ) -> impl Future<Output = Result<(), TransportError>>;
}

impl<M: PlaylistMutator + ?Sized> PlaylistMutator for &M {
    fn playlist_items(
        &self,
        playlist: &PlaylistId,
        window: PageWindow,
    ) -> impl Future<Output = Result<Page<Option<TrackId>>, TransportError>> {
        (**self).playlist_items(playlist, window)
    }

    fn add_items(
        &self,
        playlist: &PlaylistId,
        items: &[TrackId],
        position: Option<u32>,
    ) -> impl Future<Output = Result<(), TransportError>> {
        (**self).add_items(playlist, items, position)
    }
}

/// Outcome of one [`PlaylistSyncEngine::sync`] call.
///
/// `added` and `failed` are disjoint and together hold exactly the tracks
/// the call tried to add.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconciliationReport {
    added: BTreeSet<TrackId>,
    failed: BTreeSet<TrackId>,
}

impl ReconciliationReport {
    /// Tracks that were missing before and are present after the add.
    pub fn added(&self) -> &BTreeSet<TrackId> {
        &self.added
    }

    /// Tracks that were missing before and are still missing.
    pub fn failed(&self) -> &BTreeSet<TrackId> {
        &self.failed
    }

    pub fn attempted(&self) -> BTreeSet<TrackId> {
        self.added.union(&self.failed).cloned().collect()
    }

    pub fn is_noop(&self) -> bool {
        self.added.is_empty() && self.failed.is_empty()
    }
}

/// Tracks of `desired` that are not in `actual`, in `desired` order, without duplicates.
pub fn diff(desired: &[TrackId], actual: &HashSet<TrackId>) -> Vec<TrackId> {
    let mut seen = HashSet::new();
    desired
        .iter()
        .filter(|id| !actual.contains(*id) && seen.insert(*id))
        .cloned()
        .collect()
}

pub struct PlaylistSyncEngine<M> {
    mutator: M,
    position: Option<u32>,
    page_limit: Option<u32>,
}

impl<M: PlaylistMutator> PlaylistSyncEngine<M> {
    /// New tracks go to the head of the playlist; playlist reads use pages of 100.
    pub fn new(mutator: M) -> Self {
        Self {
            mutator,
            position: Some(0),
            page_limit: Some(PLAYLIST_PAGE_LIMIT),
        }
    }

    /// Insertion index for added tracks; `None` appends them.
    pub fn with_position(mut self, position: Option<u32>) -> Self {
        self.position = position;
        self
    }

    /// Page size for playlist reads; `None` uses whatever the remote defaults to.
    pub fn with_page_limit(mut self, page_limit: Option<u32>) -> Self {
        self.page_limit = page_limit;
        self
    }

    pub fn mutator(&self) -> &M {
        &self.mutator
    }

    /// Reads the full, current track membership of `playlist`.
    pub async fn current_items(
        &self,
        playlist: &PlaylistId,
    ) -> Result<HashSet<TrackId>, SyncError> {
        let mutator = &self.mutator;
        let slots = fetch_all(
            move |window| mutator.playlist_items(playlist, window),
            self.page_limit,
            Some(0),
        )
        .await?;

        Ok(slots.into_iter().flatten().collect())
    }

    /// Tracks a [`sync`](Self::sync) would try to add right now. Performs no mutation.
    pub async fn plan(
        &self,
        playlist: &PlaylistId,
        desired: &[TrackId],
    ) -> Result<Vec<TrackId>, SyncError> {
        let actual = self.current_items(playlist).await?;
        Ok(diff(desired, &actual))
    }

    /// Adds the missing `desired` tracks to `playlist` and verifies the result.
    ///
    /// # Errors
    ///
    /// - Any failed read propagates, including the verification read.
    /// - A failed add becomes [`SyncError::PartialSync`] and no
    ///   verification read is made.
    pub async fn sync(
        &self,
        playlist: &PlaylistId,
        desired: &[TrackId],
    ) -> Result<ReconciliationReport, SyncError> {
        let to_add = self.plan(playlist, desired).await?;
        if to_add.is_empty() {
            return Ok(ReconciliationReport::default());
        }

        if let Err(source) = self
            .mutator
            .add_items(playlist, &to_add, self.position)
            .await
        {
            return Err(SyncError::PartialSync {
                playlist: playlist.clone(),
                attempted: to_add,
                source,
            });
        }

        let actual_after = self.current_items(playlist).await?;
        let (added, failed): (BTreeSet<TrackId>, BTreeSet<TrackId>) = to_add
            .into_iter()
            .partition(|id| actual_after.contains(id));

        Ok(ReconciliationReport { added, failed })
    }
}
