//! In-memory content store

use super::traits::{ContentStore, NodeCollection};
use crate::types::{ImageNode, PostId, Reference};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

/// Content store that keeps every collection in process memory
///
/// Uids are the hex MD5 digest of their input, the convention static-site graph
/// stores use, so uids computed here match the ones the real graph would assign.
///
/// # Examples
///
/// ```
/// use wp_remote_images::store::{ContentStore, MemoryStore};
///
/// let store = MemoryStore::new();
/// assert_eq!(store.make_uid("a.jpg"), store.make_uid("a.jpg"));
/// assert_ne!(store.make_uid("a.jpg"), store.make_uid("b.jpg"));
/// ```
#[derive(Default)]
pub struct MemoryStore {
    collections: Mutex<HashMap<String, Arc<MemoryCollection>>>,
}

impl MemoryStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the nodes registered under `type_name` (empty if unknown)
    pub fn nodes(&self, type_name: &str) -> Vec<ImageNode> {
        lock(&self.collections)
            .get(type_name)
            .map(|c| lock(&c.nodes).clone())
            .unwrap_or_default()
    }

    /// Names of all registered content types, sorted
    pub fn content_types(&self) -> Vec<String> {
        let mut names: Vec<String> = lock(&self.collections).keys().cloned().collect();
        names.sort();
        names
    }
}

impl ContentStore for MemoryStore {
    fn add_content_type(&self, type_name: &str) -> Arc<dyn NodeCollection> {
        let mut collections = lock(&self.collections);
        let collection = collections
            .entry(type_name.to_string())
            .or_insert_with(|| {
                Arc::new(MemoryCollection {
                    type_name: type_name.to_string(),
                    nodes: Mutex::new(Vec::new()),
                })
            });
        Arc::clone(collection) as Arc<dyn NodeCollection>
    }

    fn create_reference(&self, type_name: &str, id: PostId) -> Reference {
        Reference {
            type_name: type_name.to_string(),
            id: id.to_string(),
        }
    }

    fn make_uid(&self, orig: &str) -> String {
        format!("{:x}", md5::compute(orig.as_bytes()))
    }
}

/// Collection handed out by [`MemoryStore`]
struct MemoryCollection {
    type_name: String,
    nodes: Mutex<Vec<ImageNode>>,
}

impl NodeCollection for MemoryCollection {
    fn type_name(&self) -> &str {
        &self.type_name
    }

    fn add_node(&self, node: ImageNode) {
        lock(&self.nodes).push(node);
    }
}

// A panic while holding the lock cannot leave a Vec/HashMap half-written, so
// poisoned data is still usable.
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
