use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::sync::{Arc, Weak};
use std::time::Duration;

use crossbeam_channel::{Receiver, Sender};

use super::storage::{LocalStorage, Storage};
use super::{DeleteCompletion, DeletionReport, FileService, LoadCompletion};
use crate::broadcast::RemovalBroadcast;
use crate::error::{FexError, Result};
use crate::item::{Item, LoadedItem, RawContent, Resource};

type JobId = u64;

/// Callback waiting for a background job
enum Pending {
    Load(LoadCompletion),
    Delete(DeleteCompletion),
}

/// Result sent back from a background job
enum Outcome {
    Loaded(Result<LoadedItem<Resource>>),
    Deleted(DeletionReport),
}

/// `FileService` that runs each job on its own background thread.
///
/// Completions are queued on a channel and only run when the owner calls
/// [`FileService::poll`] or [`LocalFileService::wait`], so callbacks never
/// run off the owning thread. Background threads only hold a weak handle on
/// the storage: once the service is dropped, in-flight loads fail and their
/// results are discarded with the channel.
pub struct LocalFileService {
    storage: Arc<dyn Storage>,
    broadcast: RemovalBroadcast,
    deletion_in_progress: Cell<bool>,
    next_job: Cell<JobId>,
    pending: RefCell<HashMap<JobId, Pending>>,
    completion_tx: Sender<(JobId, Outcome)>,
    completion_rx: Receiver<(JobId, Outcome)>,
}

impl LocalFileService {
    /// Service over the local filesystem
    pub fn new(broadcast: RemovalBroadcast) -> Self {
        Self::with_storage(Arc::new(LocalStorage), broadcast)
    }

    pub fn with_storage(storage: Arc<dyn Storage>, broadcast: RemovalBroadcast) -> Self {
        let (completion_tx, completion_rx) = crossbeam_channel::unbounded();
        Self {
            storage,
            broadcast,
            deletion_in_progress: Cell::new(false),
            next_job: Cell::new(0),
            pending: RefCell::new(HashMap::new()),
            completion_tx,
            completion_rx,
        }
    }

    /// Block until one completion arrives or `timeout` elapses, then
    /// dispatch it along with anything else already queued.
    pub fn wait(&self, timeout: Duration) -> usize {
        match self.completion_rx.recv_timeout(timeout) {
            Ok((id, outcome)) => {
                self.dispatch(id, outcome);
                1 + self.poll()
            }
            Err(_) => 0,
        }
    }

    /// Number of jobs whose completion has not run yet
    pub fn pending_jobs(&self) -> usize {
        self.pending.borrow().len()
    }

    fn register(&self, pending: Pending) -> JobId {
        let id = self.next_job.get();
        self.next_job.set(id + 1);
        self.pending.borrow_mut().insert(id, pending);
        id
    }

    fn dispatch(&self, id: JobId, outcome: Outcome) {
        let pending = self.pending.borrow_mut().remove(&id);

        match (pending, outcome) {
            (Some(Pending::Load(completion)), Outcome::Loaded(result)) => completion(result),
            (Some(Pending::Delete(completion)), Outcome::Deleted(report)) => {
                if !report.removed.is_empty() {
                    self.broadcast.publish(&report.removed);
                }
                self.deletion_in_progress.set(false);
                completion(report);
            }
            _ => tracing::warn!(job = id, "completion without a matching request"),
        }
    }
}

impl FileService for LocalFileService {
    fn load(&self, item: Item, completion: LoadCompletion) {
        let id = self.register(Pending::Load(completion));
        let storage = Arc::downgrade(&self.storage);
        let tx = self.completion_tx.clone();

        tracing::debug!(path = %item.path().display(), job = id, "load started");

        std::thread::spawn(move || {
            let result = load_item(&storage, item);
            if tx.send((id, Outcome::Loaded(result))).is_err() {
                tracing::debug!(job = id, "load finished after the service was dropped");
            }
        });
    }

    fn delete(&self, items: Vec<Item>, completion: DeleteCompletion) {
        if self.deletion_in_progress.get() {
            tracing::debug!(count = items.len(), "delete ignored, another one is in progress");
            return;
        }
        self.deletion_in_progress.set(true);

        let id = self.register(Pending::Delete(completion));
        let storage = Arc::downgrade(&self.storage);
        let tx = self.completion_tx.clone();

        tracing::debug!(count = items.len(), job = id, "delete started");

        std::thread::spawn(move || {
            let report = remove_items(&storage, items);
            if tx.send((id, Outcome::Deleted(report))).is_err() {
                tracing::debug!(job = id, "delete finished after the service was dropped");
            }
        });
    }

    fn is_deletion_in_progress(&self) -> bool {
        self.deletion_in_progress.get()
    }

    fn poll(&self) -> usize {
        let mut dispatched = 0;
        while let Ok((id, outcome)) = self.completion_rx.try_recv() {
            self.dispatch(id, outcome);
            dispatched += 1;
        }
        dispatched
    }
}

fn load_item(storage: &Weak<dyn Storage>, item: Item) -> Result<LoadedItem<Resource>> {
    let Some(storage) = storage.upgrade() else {
        return Err(FexError::loading(item.path(), "file service dropped"));
    };

    let attributes = storage
        .stat(item.path())
        .map_err(|e| FexError::loading(item.path(), e))?;

    let raw = if item.is_directory() {
        RawContent::Listing(
            storage
                .list(item.path())
                .map_err(|e| FexError::loading(item.path(), e))?,
        )
    } else {
        RawContent::Data(
            storage
                .read(item.path())
                .map_err(|e| FexError::loading(item.path(), e))?,
        )
    };

    let resource = item
        .parse(storage.as_ref(), &attributes, raw)
        .ok_or_else(|| FexError::loading(item.path(), "content could not be parsed"))?;

    tracing::debug!(path = %item.path().display(), "load completed");
    Ok(LoadedItem::new(item, attributes, resource))
}

fn remove_items(storage: &Weak<dyn Storage>, items: Vec<Item>) -> DeletionReport {
    let mut removed = Vec::new();
    let mut failed = Vec::new();

    match storage.upgrade() {
        Some(storage) => {
            for item in items {
                match storage.remove(item.path()) {
                    Ok(()) => removed.push(item),
                    Err(e) => {
                        tracing::warn!(path = %item.path().display(), error = %e, "remove failed");
                        failed.push(item);
                    }
                }
            }
        }
        None => failed = items,
    }

    let result = if failed.is_empty() {
        Ok(())
    } else {
        Err(FexError::RemovalFailure {
            removed: removed.clone(),
            failed: failed.clone(),
        })
    };

    tracing::debug!(removed = removed.len(), failed = failed.len(), "delete completed");
    DeletionReport {
        result,
        removed,
        failed,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::item::ItemKind;
    use std::fs;
    use std::rc::Rc;
    use std::time::SystemTime;
    use tempfile::TempDir;

    const TIMEOUT: Duration = Duration::from_secs(5);

    fn fixture() -> TempDir {
        let temp = TempDir::new().unwrap();
        fs::create_dir(temp.path().join("directory")).unwrap();
        fs::create_dir(temp.path().join("directory2")).unwrap();
        fs::write(temp.path().join("audio.mp3"), "mp3").unwrap();
        fs::write(temp.path().join("image.png"), "png").unwrap();
        fs::write(temp.path().join("pdf.pdf"), "pdf").unwrap();
        fs::write(temp.path().join(".hidden"), "hidden").unwrap();
        temp
    }

    fn load_now(
        service: &LocalFileService,
        item: Item,
    ) -> Result<LoadedItem<Resource>> {
        let slot = Rc::new(RefCell::new(None));
        let sink = slot.clone();
        service.load(item, Box::new(move |result| *sink.borrow_mut() = Some(result)));
        service.wait(TIMEOUT);
        slot.borrow_mut().take().expect("load completion did not run")
    }

    #[test]
    fn test_load_directory_skips_hidden() {
        let temp = fixture();
        let service = LocalFileService::new(RemovalBroadcast::new());

        let loaded = load_now(&service, Item::directory(temp.path(), SystemTime::now()))
            .unwrap()
            .into_directory();

        let mut names: Vec<_> = loaded.resource.iter().map(Item::name).collect();
        names.sort();
        assert_eq!(
            names,
            vec!["audio.mp3", "directory", "directory2", "image.png", "pdf.pdf"]
        );
        assert_eq!(loaded.attributes.kind(), Some(ItemKind::Directory));
    }

    #[test]
    fn test_load_file_reads_bytes() {
        let temp = fixture();
        let service = LocalFileService::new(RemovalBroadcast::new());

        let loaded = load_now(
            &service,
            Item::file(temp.path().join("pdf.pdf"), SystemTime::now()),
        )
        .unwrap()
        .into_file();

        assert_eq!(loaded.resource, b"pdf");
        assert_eq!(loaded.attributes.size(), Some(3));
    }

    #[test]
    fn test_load_missing_path_fails() {
        let temp = fixture();
        let service = LocalFileService::new(RemovalBroadcast::new());

        let result = load_now(
            &service,
            Item::file(temp.path().join("missing"), SystemTime::now()),
        );
        assert!(matches!(result, Err(FexError::LoadingFailure { .. })));
    }

    #[test]
    fn test_load_after_storage_dropped_fails() {
        let storage: Arc<dyn Storage> = Arc::new(LocalStorage);
        let weak = Arc::downgrade(&storage);
        drop(storage);

        let result = load_item(&weak, Item::directory("/", SystemTime::now()));
        match result {
            Err(FexError::LoadingFailure { reason, .. }) => {
                assert_eq!(reason, "file service dropped")
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn test_drop_service_with_load_in_flight() {
        let temp = fixture();
        let called = Rc::new(Cell::new(false));
        let flag = called.clone();

        let service = LocalFileService::new(RemovalBroadcast::new());
        service.load(
            Item::directory(temp.path(), SystemTime::now()),
            Box::new(move |_| flag.set(true)),
        );
        drop(service);

        std::thread::sleep(Duration::from_millis(50));
        assert!(!called.get());
    }

    #[test]
    fn test_partial_delete_broadcasts_removed_items() {
        let temp = fixture();
        let broadcast = RemovalBroadcast::new();
        let subscription = broadcast.subscribe();
        let service = LocalFileService::new(broadcast);

        let existing = Item::file(temp.path().join("image.png"), SystemTime::now());
        let missing = Item::file(temp.path().join("missing.png"), SystemTime::now());

        let report = Rc::new(RefCell::new(None));
        let sink = report.clone();
        service.delete(
            vec![existing.clone(), missing.clone()],
            Box::new(move |r| *sink.borrow_mut() = Some(r)),
        );
        assert!(service.is_deletion_in_progress());
        service.wait(TIMEOUT);
        assert!(!service.is_deletion_in_progress());

        let report = report.borrow_mut().take().unwrap();
        assert_eq!(report.removed, vec![existing.clone()]);
        assert_eq!(report.failed, vec![missing]);
        match report.result {
            Err(FexError::RemovalFailure { removed, failed }) => {
                assert_eq!(removed.len(), 1);
                assert_eq!(failed.len(), 1);
            }
            other => panic!("unexpected result: {other:?}"),
        }

        assert_eq!(subscription.drain(), vec![vec![existing]]);
        assert!(!temp.path().join("image.png").exists());
    }

    #[test]
    fn test_delete_directory_recursively() {
        let temp = fixture();
        fs::write(temp.path().join("directory/nested.txt"), "x").unwrap();
        let service = LocalFileService::new(RemovalBroadcast::new());

        let ok = Rc::new(Cell::new(false));
        let flag = ok.clone();
        service.delete(
            vec![Item::directory(temp.path().join("directory"), SystemTime::now())],
            Box::new(move |r| flag.set(r.result.is_ok())),
        );
        service.wait(TIMEOUT);

        assert!(ok.get());
        assert!(!temp.path().join("directory").exists());
    }

    #[test]
    fn test_second_delete_while_in_progress_is_ignored() {
        let temp = fixture();
        let broadcast = RemovalBroadcast::new();
        let subscription = broadcast.subscribe();
        let service = LocalFileService::new(broadcast);

        let calls = Rc::new(Cell::new(0));
        let first = calls.clone();
        let second = calls.clone();
        let item = Item::file(temp.path().join("audio.mp3"), SystemTime::now());

        service.delete(vec![item.clone()], Box::new(move |_| first.set(first.get() + 1)));
        service.delete(vec![item], Box::new(move |_| second.set(second.get() + 1)));
        assert_eq!(service.pending_jobs(), 1);

        service.wait(TIMEOUT);
        std::thread::sleep(Duration::from_millis(20));
        service.poll();

        assert_eq!(calls.get(), 1);
        assert_eq!(subscription.drain().len(), 1);
    }

    #[test]
    fn test_full_delete_success() {
        let temp = fixture();
        let service = LocalFileService::new(RemovalBroadcast::new());

        let report = Rc::new(RefCell::new(None));
        let sink = report.clone();
        service.delete(
            vec![
                Item::file(temp.path().join("audio.mp3"), SystemTime::now()),
                Item::file(temp.path().join("pdf.pdf"), SystemTime::now()),
            ],
            Box::new(move |r| *sink.borrow_mut() = Some(r)),
        );
        service.wait(TIMEOUT);

        let report = report.borrow_mut().take().unwrap();
        assert!(report.result.is_ok());
        assert_eq!(report.removed.len(), 2);
        assert!(report.failed.is_empty());
    }
}
