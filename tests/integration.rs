//! Integration tests exercising a read-only handle the way a FUSE bridge does.
//!
//! These tests verify that:
//! 1. Open validation rejects truncate, missing and incomplete files
//! 2. Reads return exactly the bytes at the requested offset, short at the tail
//! 3. The length captured at open is frozen for the handle's lifetime
//! 4. Concurrent reads on one handle never corrupt each other
//! 5. Handles work behind `dyn FuseFileStream` as a bridge would store them

use fuse_file_stream::*;
use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, RwLock};
use std::thread;
use std::time::Duration;

// =============================================================================
// In-memory distributed store
// =============================================================================

/// A store whose files can be "in progress" while a remote writer appends.
#[derive(Default)]
struct MemoryStore {
    files: RwLock<HashMap<PathBuf, StoredFile>>,
    opens: AtomicUsize,
    seeks: Arc<AtomicUsize>,
}

struct StoredFile {
    data: Arc<RwLock<Vec<u8>>>,
    completed: bool,
}

impl MemoryStore {
    fn put(&self, path: &str, data: Vec<u8>, completed: bool) {
        self.files.write().unwrap().insert(
            PathBuf::from(path),
            StoredFile {
                data: Arc::new(RwLock::new(data)),
                completed,
            },
        );
    }

    fn append(&self, path: &str, more: &[u8]) {
        let files = self.files.read().unwrap();
        files[Path::new(path)]
            .data
            .write()
            .unwrap()
            .extend_from_slice(more);
    }

    fn complete(&self, path: &str) {
        self.files
            .write()
            .unwrap()
            .get_mut(Path::new(path))
            .unwrap()
            .completed = true;
    }

    fn seeks(&self) -> usize {
        self.seeks.load(Ordering::SeqCst)
    }
}

/// Reader that hands out at most 3 bytes per call, like a chunked network stream.
#[derive(Debug)]
struct MemoryReader {
    data: Arc<RwLock<Vec<u8>>>,
    pos: usize,
    seeks: Arc<AtomicUsize>,
}

impl SequentialReader for MemoryReader {
    fn seek(&mut self, offset: u64) -> io::Result<()> {
        self.seeks.fetch_add(1, Ordering::SeqCst);
        self.pos = offset as usize;
        Ok(())
    }

    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let data = self.data.read().unwrap();
        let pos = self.pos.min(data.len());
        let n = buf.len().min(data.len() - pos).min(3);
        buf[..n].copy_from_slice(&data[pos..pos + n]);
        self.pos += n;
        Ok(n)
    }

    fn close(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl StorageClient for MemoryStore {
    type Reader = MemoryReader;

    fn open_file(&self, path: &Path) -> io::Result<MemoryReader> {
        self.opens.fetch_add(1, Ordering::SeqCst);
        let files = self.files.read().unwrap();
        let file = files
            .get(path)
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, path.display().to_string()))?;
        Ok(MemoryReader {
            data: Arc::clone(&file.data),
            pos: 0,
            seeks: Arc::clone(&self.seeks),
        })
    }

    fn status(&self, path: &Path) -> io::Result<Option<FileStatus>> {
        let files = self.files.read().unwrap();
        Ok(files.get(path).map(|f| FileStatus {
            length: f.data.read().unwrap().len() as u64,
            completed: f.completed,
        }))
    }
}

fn bytes(len: usize) -> Vec<u8> {
    (0..len).map(|i| (i * 7 % 256) as u8).collect()
}

fn quick_policy() -> WaitPolicy {
    WaitPolicy::default()
        .with_timeout(Duration::from_millis(100))
        .with_interval(Duration::from_millis(2))
}

fn open(store: &MemoryStore, path: &str) -> Result<ReadOnlyFileHandle<MemoryReader>, StreamError> {
    let path = Path::new(path);
    let status = store.status(path).unwrap();
    let waiter = PollingWaiter::new(store, quick_policy());
    ReadOnlyFileHandle::create(store, path, OpenFlags::READ_ONLY, status, &waiter)
}

// =============================================================================
// End-to-end reads
// =============================================================================

#[test]
fn tail_read_past_end_and_empty_read() {
    let store = MemoryStore::default();
    store.put("/f", bytes(100), true);
    let handle = open(&store, "/f").unwrap();
    let mut buf = vec![0u8; 50];

    assert_eq!(handle.read(&mut buf, 50, 80).unwrap(), 20);
    assert_eq!(&buf[..20], &bytes(100)[80..]);

    let seeks = store.seeks();
    assert_eq!(handle.read(&mut buf, 50, 150).unwrap(), 0);
    assert_eq!(handle.read(&mut buf, 0, 10).unwrap(), 0);
    assert_eq!(store.seeks(), seeks);

    handle.close().unwrap();
}

#[test]
fn read_returns_min_of_size_and_remaining() {
    let store = MemoryStore::default();
    store.put("/f", bytes(64), true);
    let handle = open(&store, "/f").unwrap();
    let mut buf = vec![0u8; 32];

    for offset in [0usize, 1, 31, 32, 40, 63] {
        for size in [1usize, 5, 17, 32] {
            let n = handle.read(&mut buf, size, offset as i64).unwrap();
            assert_eq!(n, size.min(64 - offset));
            assert_eq!(&buf[..n], &bytes(64)[offset..offset + n]);
        }
    }
}

#[test]
fn out_of_order_reads() {
    let store = MemoryStore::default();
    store.put("/f", bytes(1000), true);
    let handle = open(&store, "/f").unwrap();
    let expected = bytes(1000);

    for offset in [900usize, 0, 450, 10, 999] {
        let data = handle.read_vec(64, offset as i64).unwrap();
        let end = (offset + 64).min(1000);
        assert_eq!(data, &expected[offset..end]);
    }
}

// =============================================================================
// Open validation
// =============================================================================

#[test]
fn open_missing_file() {
    let store = MemoryStore::default();
    let err = open(&store, "/missing").unwrap_err();
    assert!(matches!(err, StreamError::NotFound { .. }));
    assert_eq!(store.opens.load(Ordering::SeqCst), 0);
}

#[test]
fn open_with_truncate_is_rejected() {
    let store = MemoryStore::default();
    store.put("/f", bytes(10), true);
    let path = Path::new("/f");
    let err = ReadOnlyFileHandle::create(
        &store,
        path,
        OpenFlags(libc::O_WRONLY | libc::O_TRUNC),
        store.status(path).unwrap(),
        &|_: &Path| true,
    )
    .unwrap_err();
    assert!(matches!(err, StreamError::TruncateRequested { .. }));
    assert_eq!(err.errno(), libc::EPERM);
    assert_eq!(store.opens.load(Ordering::SeqCst), 0);
}

#[test]
fn open_incomplete_file_times_out() {
    let store = MemoryStore::default();
    store.put("/f", bytes(10), false);
    let err = open(&store, "/f").unwrap_err();
    assert!(matches!(err, StreamError::Incomplete { .. }));
    assert_eq!(store.opens.load(Ordering::SeqCst), 0);
}

#[test]
fn open_waits_for_writer_to_finish() {
    let store = Arc::new(MemoryStore::default());
    store.put("/job/out", bytes(10), false);
    let path = Path::new("/job/out");
    let status = store.status(path).unwrap();

    let writer = {
        let store = Arc::clone(&store);
        thread::spawn(move || {
            thread::sleep(Duration::from_millis(10));
            store.complete("/job/out");
        })
    };

    let waiter = PollingWaiter::new(
        store.as_ref(),
        WaitPolicy::default()
            .with_timeout(Duration::from_secs(5))
            .with_interval(Duration::from_millis(1)),
    );
    let handle =
        ReadOnlyFileHandle::create(store.as_ref(), path, OpenFlags::READ_ONLY, status, &waiter)
            .unwrap();
    writer.join().unwrap();

    assert_eq!(handle.file_length(), 10);
    assert_eq!(handle.read_vec(10, 0).unwrap(), bytes(10));
}

// =============================================================================
// Frozen length
// =============================================================================

#[test]
fn length_is_frozen_at_open() {
    let store = MemoryStore::default();
    store.put("/f", bytes(10), true);
    let handle = open(&store, "/f").unwrap();

    store.append("/f", &[0xee; 10]);
    assert_eq!(store.status(Path::new("/f")).unwrap().unwrap().length, 20);

    assert_eq!(handle.file_length(), 10);
    let mut buf = [0u8; 20];
    assert_eq!(handle.read(&mut buf, 20, 10).unwrap(), 0);
    assert_eq!(handle.read(&mut buf, 20, 5).unwrap(), 5);
    assert_eq!(&buf[..5], &bytes(10)[5..]);
}

#[test]
fn length_is_frozen_when_file_shrinks() {
    let store = MemoryStore::default();
    store.put("/f", bytes(100), true);
    let handle = open(&store, "/f").unwrap();

    store.put("/f", bytes(10), true);
    assert_eq!(handle.file_length(), 100);
    // The open reader still holds the old bytes; a fresh open would not.
    let fresh = open(&store, "/f").unwrap();
    let mut buf = [0u8; 20];
    assert_eq!(fresh.read(&mut buf, 20, 50).unwrap(), 0);
    assert_eq!(handle.read(&mut buf, 20, 50).unwrap(), 20);
}

#[test]
fn prefetched_length_wins_over_fresh_status() {
    let store = MemoryStore::default();
    store.put("/f", bytes(50), true);
    let handle = ReadOnlyFileHandle::create(
        &store,
        Path::new("/f"),
        OpenFlags::READ_ONLY,
        Some(FileStatus::completed(30)),
        &|_: &Path| true,
    )
    .unwrap();
    assert_eq!(handle.file_length(), 30);
    assert_eq!(handle.read_vec(100, 0).unwrap().len(), 30);
}

// =============================================================================
// Concurrency
// =============================================================================

#[test]
fn parallel_readers_share_one_handle() {
    let store = MemoryStore::default();
    store.put("/big", bytes(10_000), true);
    let handle = Arc::new(open(&store, "/big").unwrap());
    let expected = Arc::new(bytes(10_000));

    let workers: Vec<_> = (0..6)
        .map(|w| {
            let handle = Arc::clone(&handle);
            let expected = Arc::clone(&expected);
            thread::spawn(move || {
                let mut buf = vec![0u8; 257];
                for i in 0..40 {
                    let offset = (w * 1_613 + i * 409) % 10_000;
                    let n = handle.read(&mut buf, 257, offset as i64).unwrap();
                    assert_eq!(&buf[..n], &expected[offset..offset + n]);
                }
            })
        })
        .collect();
    for w in workers {
        w.join().unwrap();
    }
    assert_eq!(store.seeks(), 6 * 40);
}

// =============================================================================
// Bridge-style usage
// =============================================================================

#[test]
fn handles_stored_as_trait_objects() {
    let store = MemoryStore::default();
    store.put("/a", b"alpha".to_vec(), true);
    store.put("/b", b"bravo!".to_vec(), true);

    let mut table: HashMap<u64, Box<dyn FuseFileStream>> = HashMap::new();
    table.insert(1, Box::new(open(&store, "/a").unwrap()));
    table.insert(2, Box::new(open(&store, "/b").unwrap()));

    assert_eq!(table[&1].file_length(), 5);
    assert_eq!(table[&2].read_vec(3, 3).unwrap(), b"vo!");

    let err = table[&1].write(b"x", 1, 0).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Unsupported);
    table[&1].flush().unwrap();

    for (_, stream) in table.drain() {
        stream.close().unwrap();
    }
}

#[test]
fn independent_handles_on_same_file() {
    let store = MemoryStore::default();
    store.put("/f", bytes(100), true);
    let h1 = open(&store, "/f").unwrap();
    let h2 = open(&store, "/f").unwrap();

    h1.close().unwrap();
    assert_eq!(h2.read_vec(10, 90).unwrap(), &bytes(100)[90..]);
    assert_eq!(store.opens.load(Ordering::SeqCst), 2);
}

#[test]
fn local_storage_end_to_end() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::create_dir(dir.path().join("data")).unwrap();
    std::fs::write(dir.path().join("data/blob"), bytes(100)).unwrap();

    let storage = LocalStorage::new(dir.path());
    let path = Path::new("/data/blob");
    let waiter = PollingWaiter::new(&storage, WaitPolicy::default());

    let missing = ReadOnlyFileHandle::create(
        &storage,
        Path::new("/data/none"),
        OpenFlags::READ_ONLY,
        storage.status(Path::new("/data/none")).unwrap(),
        &waiter,
    );
    assert!(matches!(missing, Err(StreamError::NotFound { .. })));

    let handle = ReadOnlyFileHandle::create(
        &storage,
        path,
        OpenFlags::READ_ONLY,
        storage.status(path).unwrap(),
        &waiter,
    )
    .unwrap();
    let mut buf = [0u8; 50];
    assert_eq!(handle.read(&mut buf, 50, 80).unwrap(), 20);
    assert_eq!(&buf[..20], &bytes(100)[80..]);
    assert_eq!(handle.read(&mut buf, 50, 150).unwrap(), 0);
    assert!(handle.truncate(0).is_err());
    handle.close().unwrap();
    assert!(handle.is_closed());
}
