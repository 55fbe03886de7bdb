use roomnotes_core::{
    MemoryNoteStore, Note, NoteId, NoteStore, NoteSubscription, RepoError, SqliteNoteStore,
    StoreError,
};
use rusqlite::Connection;
use std::collections::BTreeMap;
use std::sync::Arc;

fn ids(snapshot: &[Note]) -> Vec<NoteId> {
    snapshot.iter().map(|note| note.id).collect()
}

/// Returns the only queued emission, failing if there is none or more than one.
fn single_emission(sub: &mut NoteSubscription) -> Arc<[Note]> {
    let snapshot = sub.try_recv().expect("expected one emission");
    assert!(sub.try_recv().is_none(), "expected exactly one emission");
    snapshot
}

async fn milk_roundtrip(store: impl NoteStore) {
    let id = store.insert(Note::new("Milk", "2 liters")).await.unwrap();
    assert!(id > 0);

    let loaded = store.get_by_id(id).await.unwrap().unwrap();
    assert_eq!(loaded.title, "Milk");
    assert_eq!(loaded.description, "2 liters");
}

async fn newest_first_ordering(store: impl NoteStore) {
    let mut sub = store.get_all_notes();
    assert!(sub.recv().await.unwrap().is_empty());

    let a = store.insert(Note::new("A", "first")).await.unwrap();
    assert_eq!(ids(&single_emission(&mut sub)), vec![a]);
    let b = store.insert(Note::new("B", "second")).await.unwrap();
    let snapshot = single_emission(&mut sub);
    assert_eq!(ids(&snapshot), vec![b, a]);
    assert_eq!(snapshot[0].title, "B");
}

async fn update_of_missing_id_is_silent(store: impl NoteStore) {
    store.insert(Note::new("keep", "me")).await.unwrap();
    let mut sub = store.get_all_notes();
    let before = sub.recv().await.unwrap();

    let changed = store
        .update(Note::with_id(999_999, "ghost", "write"))
        .await
        .unwrap();
    assert!(!changed);
    assert!(sub.try_recv().is_none());
    assert!(store.get_by_id(999_999).await.unwrap().is_none());

    let late = store.get_all_notes().recv().await.unwrap();
    assert_eq!(late, before);
}

async fn delete_removes_from_next_emission(store: impl NoteStore) {
    let a = store.insert(Note::new("A", "")).await.unwrap();
    let b = store.insert(Note::new("B", "")).await.unwrap();
    let mut sub = store.get_all_notes();
    sub.recv().await.unwrap();

    let target = store.get_by_id(a).await.unwrap().unwrap();
    assert!(store.delete(target.clone()).await.unwrap());
    assert_eq!(ids(&single_emission(&mut sub)), vec![b]);
    assert!(store.get_by_id(a).await.unwrap().is_none());

    assert!(!store.delete(target).await.unwrap());
    assert!(sub.try_recv().is_none());
}

async fn update_emits_replaced_content(store: impl NoteStore) {
    let id = store.insert(Note::new("draft", "")).await.unwrap();
    let mut sub = store.get_all_notes();
    sub.recv().await.unwrap();

    assert!(store
        .update(Note::with_id(id, " final ", " body "))
        .await
        .unwrap());
    let snapshot = single_emission(&mut sub);
    assert_eq!(snapshot.as_ref(), &[Note::with_id(id, "final", "body")]);

    // Same content again: row matched, collection unchanged, nothing emitted.
    assert!(store
        .update(Note::with_id(id, "final", "body"))
        .await
        .unwrap());
    assert!(sub.try_recv().is_none());
}

async fn upsert_replaces_by_id(store: impl NoteStore) {
    let id = store.insert(Note::new("old", "")).await.unwrap();
    let mut sub = store.get_all_notes();
    sub.recv().await.unwrap();

    assert_eq!(store.upsert(Note::with_id(id, "new", "")).await.unwrap(), id);
    assert_eq!(
        single_emission(&mut sub).as_ref(),
        &[Note::with_id(id, "new", "")]
    );

    let fresh = store.upsert(Note::new("fresh", "")).await.unwrap();
    assert!(fresh > id);
    assert_eq!(ids(&single_emission(&mut sub)), vec![fresh, id]);
}

/// Drives a fixed mixed sequence and compares every emission with a model.
async fn collection_matches_model(store: impl NoteStore) {
    let mut sub = store.get_all_notes();
    sub.recv().await.unwrap();
    let mut model: BTreeMap<NoteId, Note> = BTreeMap::new();

    for step in 0..40_i64 {
        let effective = match step % 5 {
            0 | 1 | 3 => {
                let note = Note::new(format!("t{step}"), format!(" d{step} "));
                let id = store.insert(note.clone()).await.unwrap();
                model.insert(id, Note::with_id(id, &note.title, &note.description));
                true
            }
            2 => {
                let target = model.keys().next().copied().unwrap_or(999_999);
                let note = Note::with_id(target, format!("u{step}"), "");
                let changed = store.update(note.clone()).await.unwrap();
                if changed {
                    model.insert(target, note);
                }
                changed
            }
            _ => {
                let target = model.keys().nth(1).copied().unwrap_or(999_999);
                let changed = store
                    .delete(Note::with_id(target, "", ""))
                    .await
                    .unwrap();
                if changed {
                    model.remove(&target);
                }
                changed
            }
        };

        let expected: Vec<Note> = model.values().rev().cloned().collect();
        if effective {
            assert_eq!(single_emission(&mut sub).as_ref(), expected.as_slice());
        } else {
            assert!(sub.try_recv().is_none());
        }
        for note in &expected {
            assert_eq!(store.get_by_id(note.id).await.unwrap().as_ref(), Some(note));
        }
    }
}

async fn subscribers_are_independent(store: impl NoteStore) {
    let a = store.insert(Note::new("A", "")).await.unwrap();
    let mut early = store.get_all_notes();
    assert_eq!(ids(&early.recv().await.unwrap()), vec![a]);

    let b = store.insert(Note::new("B", "")).await.unwrap();
    let mut late = store.get_all_notes();
    assert_eq!(ids(&late.recv().await.unwrap()), vec![b, a]);
    assert!(late.try_recv().is_none());
    assert_eq!(ids(&single_emission(&mut early)), vec![b, a]);

    drop(early);
    let c = store.insert(Note::new("C", "")).await.unwrap();
    assert_eq!(ids(&single_emission(&mut late)), vec![c, b, a]);
}

async fn deleted_ids_are_not_reused(store: impl NoteStore) {
    let a = store.insert(Note::new("A", "")).await.unwrap();
    let b = store.insert(Note::new("B", "")).await.unwrap();
    assert!(store.delete(Note::with_id(b, "", "")).await.unwrap());

    let c = store.insert(Note::new("C", "")).await.unwrap();
    assert!(c > b);
    assert!(store.get_by_id(b).await.unwrap().is_none());

    // A stale handle to the deleted note must not reach the new one.
    assert!(!store.update(Note::with_id(b, "stale", "")).await.unwrap());
    assert_eq!(store.get_by_id(c).await.unwrap().unwrap().title, "C");
    assert_eq!(ids(&store.get_all_notes().recv().await.unwrap()), vec![c, a]);
}

async fn insert_after_max_id_fails_without_emission(store: impl NoteStore) {
    let top = store.upsert(Note::with_id(NoteId::MAX, "top", "")).await.unwrap();
    assert_eq!(top, NoteId::MAX);
    let mut sub = store.get_all_notes();
    sub.recv().await.unwrap();

    assert!(store.insert(Note::new("next", "")).await.is_err());
    assert!(sub.try_recv().is_none());
    assert_eq!(ids(&store.get_all_notes().recv().await.unwrap()), vec![top]);
}

macro_rules! contract_tests {
    ($module:ident, $make:expr) => {
        mod $module {
            use super::*;

            #[tokio::test]
            async fn insert_then_get_by_id_roundtrips_trimmed_fields() {
                milk_roundtrip($make).await;
            }

            #[tokio::test]
            async fn live_collection_is_newest_first() {
                newest_first_ordering($make).await;
            }

            #[tokio::test]
            async fn update_of_missing_id_changes_nothing() {
                update_of_missing_id_is_silent($make).await;
            }

            #[tokio::test]
            async fn delete_removes_note_everywhere() {
                delete_removes_from_next_emission($make).await;
            }

            #[tokio::test]
            async fn update_emits_only_on_content_change() {
                update_emits_replaced_content($make).await;
            }

            #[tokio::test]
            async fn upsert_replaces_colliding_id() {
                upsert_replaces_by_id($make).await;
            }

            #[tokio::test]
            async fn emissions_track_mixed_mutations() {
                collection_matches_model($make).await;
            }

            #[tokio::test]
            async fn subscribers_replay_latest_and_stay_independent() {
                subscribers_are_independent($make).await;
            }

            #[tokio::test]
            async fn deleted_ids_stay_retired() {
                deleted_ids_are_not_reused($make).await;
            }

            #[tokio::test]
            async fn insert_past_max_id_is_an_error() {
                insert_after_max_id_fails_without_emission($make).await;
            }
        }
    };
}

contract_tests!(sqlite_store, SqliteNoteStore::open_in_memory().unwrap());
contract_tests!(memory_store, MemoryNoteStore::new());
contract_tests!(
    shared_dyn_store,
    Arc::new(MemoryNoteStore::new()) as Arc<dyn NoteStore>
);

#[tokio::test]
async fn failed_mutation_propagates_and_emits_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("faulty.db");
    let store = SqliteNoteStore::open(&path).unwrap();
    let kept = store.insert(Note::new("kept", "")).await.unwrap();
    let mut sub = store.get_all_notes();
    sub.recv().await.unwrap();

    let saboteur = Connection::open(&path).unwrap();
    saboteur
        .execute_batch(
            "CREATE TRIGGER reject_writes BEFORE INSERT ON notes
             BEGIN
                SELECT RAISE(ABORT, 'simulated storage fault');
             END;",
        )
        .unwrap();
    drop(saboteur);

    let err = store.insert(Note::new("lost", "")).await.unwrap_err();
    assert!(matches!(err, StoreError::Repo(RepoError::Db(_))));
    assert!(err.to_string().contains("simulated storage fault"));
    assert!(sub.try_recv().is_none());
    assert_eq!(ids(&store.live().latest()), vec![kept]);
}

#[tokio::test]
async fn notes_survive_reopen_and_are_replayed() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("notes.db");

    let (a, b) = {
        let store = SqliteNoteStore::open(&path).unwrap();
        let a = store.insert(Note::new("A", "")).await.unwrap();
        let b = store.insert(Note::new("B", "")).await.unwrap();
        (a, b)
    };

    let reopened = SqliteNoteStore::open(&path).unwrap();
    let mut sub = reopened.get_all_notes();
    assert_eq!(ids(&sub.recv().await.unwrap()), vec![b, a]);
}

#[tokio::test]
async fn dropped_operation_future_still_completes_write() {
    let store = SqliteNoteStore::open_in_memory().unwrap();
    let mut sub = store.get_all_notes();
    sub.recv().await.unwrap();

    let mut pending = store.insert(Note::new("orphan", "write"));
    let _ = futures::poll!(&mut pending);
    drop(pending);

    let snapshot = sub.recv().await.unwrap();
    assert_eq!(snapshot.len(), 1);
    assert_eq!(snapshot[0].title, "orphan");
}

#[tokio::test]
async fn clones_share_table_and_subscribers() {
    let store = SqliteNoteStore::open_in_memory().unwrap();
    let clone = store.clone();
    let mut sub = store.get_all_notes();
    sub.recv().await.unwrap();

    let id = clone.insert(Note::new("via clone", "")).await.unwrap();
    assert_eq!(ids(&single_emission(&mut sub)), vec![id]);
    assert_eq!(store.live().subscriber_count(), 1);
    drop(sub);
    assert_eq!(clone.live().subscriber_count(), 0);
}

#[tokio::test]
async fn concurrent_writers_each_emit_once() {
    let store = SqliteNoteStore::open_in_memory().unwrap();
    let mut sub = store.get_all_notes();
    sub.recv().await.unwrap();

    let writes = (0..8).map(|idx| {
        let store = store.clone();
        tokio::spawn(async move { store.insert(Note::new(format!("n{idx}"), "")).await })
    });
    for handle in writes.collect::<Vec<_>>() {
        handle.await.unwrap().unwrap();
    }

    let mut lengths = Vec::new();
    while let Some(snapshot) = sub.try_recv() {
        let listed = ids(&snapshot);
        let mut sorted = listed.clone();
        sorted.sort_unstable_by(|a, b| b.cmp(a));
        assert_eq!(listed, sorted);
        lengths.push(snapshot.len());
    }
    assert_eq!(lengths, (1..=8).collect::<Vec<_>>());
}
