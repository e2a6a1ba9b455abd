mod local;
mod storage;

pub use local::LocalFileService;
pub use storage::{LocalStorage, Storage};

use crate::error::Result;
use crate::item::{Item, LoadedItem, Resource};

/// Invoked with the outcome of a load, on the thread that pumps the service
pub type LoadCompletion = Box<dyn FnOnce(Result<LoadedItem<Resource>>)>;

/// Invoked with the outcome of a deletion batch, on the thread that pumps the service
pub type DeleteCompletion = Box<dyn FnOnce(DeletionReport)>;

/// Outcome of a deletion batch.
///
/// `result` is an error iff `failed` is non-empty. Both partitions are
/// always reported so callers can reconcile partial successes.
#[derive(Debug)]
pub struct DeletionReport {
    pub result: Result<()>,
    pub removed: Vec<Item>,
    pub failed: Vec<Item>,
}

/// Asynchronous access to items in a backing store.
///
/// Work runs in the background; completions are delivered by `poll` on the
/// calling thread, in the order the background work finished.
pub trait FileService {
    /// Fetch an item's resource: child items for a directory, bytes for a file
    fn load(&self, item: Item, completion: LoadCompletion);

    /// Remove every item independently. Ignored while another deletion is in flight.
    fn delete(&self, items: Vec<Item>, completion: DeleteCompletion);

    fn is_deletion_in_progress(&self) -> bool;

    /// Deliver finished work. Returns the number of completions dispatched.
    fn poll(&self) -> usize;
}
