use std::cell::{Cell, RefCell};
use std::collections::{BTreeSet, HashSet};

use onrepeat::error::{SyncError, TransportError};
use onrepeat::paging::{Page, PageWindow};
use onrepeat::sync::*;
use onrepeat::types::{PlaylistId, TrackId};

// Add-only fake playlist. Tracks in `dropped` are silently ignored on add,
// like a remote that accepts the request but never stores some items.
#[derive(Default)]
struct FakePlaylist {
    slots: RefCell<Vec<Option<TrackId>>>,
    dropped: HashSet<TrackId>,
    fail_add: bool,
    fail_read_on: Option<usize>,
    reads: Cell<usize>,
    adds: RefCell<Vec<(Vec<TrackId>, Option<u32>)>>,
}

impl FakePlaylist {
    fn with_tracks(ids: &[&str]) -> Self {
        Self {
            slots: RefCell::new(ids.iter().map(|id| Some(TrackId::from(*id))).collect()),
            ..Default::default()
        }
    }

    fn track_ids(&self) -> Vec<TrackId> {
        self.slots.borrow().iter().flatten().cloned().collect()
    }

    fn add_calls(&self) -> usize {
        self.adds.borrow().len()
    }
}

impl PlaylistMutator for FakePlaylist {
    async fn playlist_items(
        &self,
        _playlist: &PlaylistId,
        window: PageWindow,
    ) -> Result<Page<Option<TrackId>>, TransportError> {
        self.reads.set(self.reads.get() + 1);
        if self.fail_read_on == Some(self.reads.get()) {
            return Err(TransportError::Remote("read timed out".to_string()));
        }

        let slots = self.slots.borrow();
        let offset = window.offset.unwrap_or(0);
        let limit = window.limit.unwrap_or(100);
        let start = (offset as usize).min(slots.len());
        let end = (start + limit as usize).min(slots.len());
        Ok(Page::new(slots[start..end].to_vec(), limit, offset))
    }

    async fn add_items(
        &self,
        _playlist: &PlaylistId,
        items: &[TrackId],
        position: Option<u32>,
    ) -> Result<(), TransportError> {
        self.adds.borrow_mut().push((items.to_vec(), position));
        if self.fail_add {
            return Err(TransportError::Remote("503 Service Unavailable".to_string()));
        }

        let kept: Vec<Option<TrackId>> = items
            .iter()
            .filter(|id| !self.dropped.contains(*id))
            .cloned()
            .map(Some)
            .collect();

        let mut slots = self.slots.borrow_mut();
        let at = position.map_or(slots.len(), |p| (p as usize).min(slots.len()));
        slots.splice(at..at, kept);
        Ok(())
    }
}

fn ids(list: &[&str]) -> Vec<TrackId> {
    list.iter().map(|id| TrackId::from(*id)).collect()
}

fn set(list: &[&str]) -> BTreeSet<TrackId> {
    list.iter().map(|id| TrackId::from(*id)).collect()
}

fn playlist() -> PlaylistId {
    PlaylistId::from("onrepeat")
}

#[tokio::test]
async fn test_adds_missing_tracks() {
    let fake = FakePlaylist::with_tracks(&["t2"]);
    let engine = PlaylistSyncEngine::new(&fake);

    let report = engine
        .sync(&playlist(), &ids(&["t1", "t2", "t3"]))
        .await
        .unwrap();

    assert_eq!(report.added(), &set(&["t1", "t3"]));
    assert!(report.failed().is_empty());
    assert_eq!(*fake.adds.borrow(), vec![(ids(&["t1", "t3"]), Some(0))]);
}

#[tokio::test]
async fn test_nothing_to_add_makes_no_mutation() {
    let fake = FakePlaylist::with_tracks(&["t1"]);
    let engine = PlaylistSyncEngine::new(&fake);

    let report = engine.sync(&playlist(), &ids(&["t1"])).await.unwrap();

    assert!(report.is_noop());
    assert_eq!(fake.add_calls(), 0);
    // no verification read either
    assert_eq!(fake.reads.get(), 1);
}

#[tokio::test]
async fn test_silently_dropped_track_is_reported_failed() {
    let fake = FakePlaylist {
        dropped: HashSet::from([TrackId::from("t2")]),
        ..Default::default()
    };
    let engine = PlaylistSyncEngine::new(&fake);

    let report = engine.sync(&playlist(), &ids(&["t1", "t2"])).await.unwrap();

    assert_eq!(report.added(), &set(&["t1"]));
    assert_eq!(report.failed(), &set(&["t2"]));
}

#[tokio::test]
async fn test_second_sync_is_noop() {
    let fake = FakePlaylist::with_tracks(&["a", "b"]);
    let engine = PlaylistSyncEngine::new(&fake);
    let desired = ids(&["c", "a", "d"]);

    let first = engine.sync(&playlist(), &desired).await.unwrap();
    let second = engine.sync(&playlist(), &desired).await.unwrap();

    assert_eq!(first.added(), &set(&["c", "d"]));
    assert!(second.is_noop());
    assert_eq!(fake.add_calls(), 1);
}

#[tokio::test]
async fn test_report_partitions_attempted_tracks() {
    let fake = FakePlaylist {
        slots: RefCell::new(vec![Some(TrackId::from("x"))]),
        dropped: HashSet::from([TrackId::from("b"), TrackId::from("d")]),
        ..Default::default()
    };
    let engine = PlaylistSyncEngine::new(&fake);
    let desired = ids(&["a", "b", "x", "c", "d"]);

    let report = engine.sync(&playlist(), &desired).await.unwrap();

    assert!(report.added().is_disjoint(report.failed()));
    assert_eq!(report.attempted(), set(&["a", "b", "c", "d"]));
    assert_eq!(report.attempted().len(), report.added().len() + report.failed().len());
}

#[tokio::test]
async fn test_existing_tracks_are_never_removed() {
    let fake = FakePlaylist::with_tracks(&["old1", "old2", "old3"]);
    let before: HashSet<TrackId> = fake.track_ids().into_iter().collect();
    let engine = PlaylistSyncEngine::new(&fake);

    engine
        .sync(&playlist(), &ids(&["new1", "old2"]))
        .await
        .unwrap();

    let after: HashSet<TrackId> = fake.track_ids().into_iter().collect();
    assert!(before.is_subset(&after));
}

#[tokio::test]
async fn test_new_tracks_are_prepended_in_rank_order() {
    let fake = FakePlaylist::with_tracks(&["old"]);
    let engine = PlaylistSyncEngine::new(&fake);

    engine
        .sync(&playlist(), &ids(&["first", "second", "old", "third"]))
        .await
        .unwrap();

    assert_eq!(fake.track_ids(), ids(&["first", "second", "third", "old"]));
}

#[tokio::test]
async fn test_position_none_appends() {
    let fake = FakePlaylist::with_tracks(&["old"]);
    let engine = PlaylistSyncEngine::new(&fake).with_position(None);

    engine.sync(&playlist(), &ids(&["new"])).await.unwrap();

    assert_eq!(fake.track_ids(), ids(&["old", "new"]));
    assert_eq!(fake.adds.borrow()[0].1, None);
}

#[tokio::test]
async fn test_duplicate_desired_tracks_are_added_once() {
    let fake = FakePlaylist::default();
    let engine = PlaylistSyncEngine::new(&fake);

    let report = engine
        .sync(&playlist(), &ids(&["t1", "t1", "t2"]))
        .await
        .unwrap();

    assert_eq!(fake.adds.borrow()[0].0, ids(&["t1", "t2"]));
    assert_eq!(report.added(), &set(&["t1", "t2"]));
}

#[tokio::test]
async fn test_reads_every_playlist_page() {
    let existing: Vec<String> = (0..250).map(|i| format!("t{}", i)).collect();
    let existing: Vec<&str> = existing.iter().map(String::as_str).collect();
    let fake = FakePlaylist::with_tracks(&existing);
    let engine = PlaylistSyncEngine::new(&fake);

    let planned = engine
        .plan(&playlist(), &ids(&["t0", "t249", "t250"]))
        .await
        .unwrap();

    assert_eq!(planned, ids(&["t250"]));
    assert_eq!(fake.reads.get(), 3);
}

#[tokio::test]
async fn test_slots_without_track_id_do_not_end_the_read() {
    // a full first page where some slots are local files, then one more page
    let mut slots: Vec<Option<TrackId>> = (0..100)
        .map(|i| (i % 10 != 0).then(|| TrackId::new(format!("t{}", i))))
        .collect();
    slots.push(Some(TrackId::from("late")));
    let fake = FakePlaylist {
        slots: RefCell::new(slots),
        ..Default::default()
    };
    let engine = PlaylistSyncEngine::new(&fake);

    let report = engine
        .sync(&playlist(), &ids(&["late", "t1", "fresh"]))
        .await
        .unwrap();

    assert_eq!(report.added(), &set(&["fresh"]));
}

#[tokio::test]
async fn test_failed_add_is_partial_sync_without_verification() {
    let fake = FakePlaylist {
        fail_add: true,
        ..FakePlaylist::with_tracks(&["t2"])
    };
    let engine = PlaylistSyncEngine::new(&fake);

    let result = engine.sync(&playlist(), &ids(&["t1", "t2", "t3"])).await;

    match result {
        Err(SyncError::PartialSync {
            playlist: failed_playlist,
            attempted,
            source: TransportError::Remote(_),
        }) => {
            assert_eq!(failed_playlist, playlist());
            assert_eq!(attempted, ids(&["t1", "t3"]));
        }
        other => panic!("expected PartialSync, got {:?}", other),
    }
    assert_eq!(fake.reads.get(), 1);
}

#[tokio::test]
async fn test_failed_verification_read_propagates() {
    let fake = FakePlaylist {
        fail_read_on: Some(2),
        ..Default::default()
    };
    let engine = PlaylistSyncEngine::new(&fake);

    let result = engine.sync(&playlist(), &ids(&["t1"])).await;

    assert!(matches!(result, Err(SyncError::Transport(_))));
    assert_eq!(fake.add_calls(), 1);
}

#[test]
fn test_diff_excludes_actual_and_keeps_the_rest() {
    let actual: HashSet<TrackId> = ids(&["b", "d", "z"]).into_iter().collect();
    let desired = ids(&["a", "b", "c", "d", "e"]);

    let to_add = diff(&desired, &actual);

    assert_eq!(to_add, ids(&["a", "c", "e"]));
    assert!(to_add.iter().all(|id| !actual.contains(id)));
    assert!(
        desired
            .iter()
            .filter(|id| !actual.contains(*id))
            .all(|id| to_add.contains(id))
    );
}

#[test]
fn test_diff_against_empty_playlist() {
    assert_eq!(diff(&ids(&["a", "b"]), &HashSet::new()), ids(&["a", "b"]));
    assert!(diff(&[], &HashSet::new()).is_empty());
}
