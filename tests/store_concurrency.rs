use std::sync::{Arc, Barrier};
use std::thread;

use relnotes::lock::{lock_path_for, FileLock};
use relnotes::error::Error;
use relnotes::repository::SprintRepository;
use relnotes::model::Sprint;
use relnotes::store::{FileStore, KeyValueStore};
use tempfile::TempDir;

#[test]
fn concurrent_writers_do_not_lose_keys() {
    let dir = TempDir::new().expect("tempdir");
    let path = dir.path().join("store.json");
    let writers = 8;
    let per_writer = 10;
    let barrier = Arc::new(Barrier::new(writers));

    let handles: Vec<_> = (0..writers)
        .map(|writer| {
            let path = path.clone();
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                let store = FileStore::open(path).with_lock_timeout(10_000);
                barrier.wait();
                for index in 0..per_writer {
                    store
                        .set("ns", &format!("w{writer}_{index:02}"), "x")
                        .expect("set");
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().expect("writer thread");
    }

    let keys = FileStore::open(&path).keys("ns").expect("keys");
    assert_eq!(keys.len(), writers * per_writer);
}

#[test]
fn held_lock_times_out_store_writes() {
    let dir = TempDir::new().expect("tempdir");
    let path = dir.path().join("store.json");
    let _held = FileLock::acquire(lock_path_for(&path), 1000).expect("hold lock");

    let store = FileStore::open(&path).with_lock_timeout(50);
    let err = store.set("ns", "k", "v").expect_err("lock should be contended");
    assert!(matches!(err, Error::LockFailed(_)));
}

#[test]
fn sprint_records_survive_reopen() {
    let dir = TempDir::new().expect("tempdir");
    let path = dir.path().join("store.json");

    {
        let store = FileStore::open(&path);
        let repo = SprintRepository::new(&store, "tidy_release_notes");
        repo.save(&Sprint::new("1700000000000", "Sprint 1")).expect("save");
        repo.select(Some("1700000000000")).expect("select");
    }

    let store = FileStore::open(&path);
    let repo = SprintRepository::new(&store, "tidy_release_notes");
    let payload = repo.payload().expect("payload");
    assert_eq!(payload.sprints.len(), 1);
    assert_eq!(payload.sprints[0].name, "Sprint 1");
    assert_eq!(payload.last_selected_sprint_id.as_deref(), Some("1700000000000"));
}
