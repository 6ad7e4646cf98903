//! Traits for the content graph store

use crate::types::{ImageNode, PostId, Reference};
use std::sync::Arc;

/// A registered content type that image nodes are appended to
pub trait NodeCollection: Send + Sync {
    /// Name the collection was registered under
    fn type_name(&self) -> &str;

    /// Append a node. Nodes are never updated or removed by this crate.
    fn add_node(&self, node: ImageNode);
}

/// Interface to the content graph the images are registered in
///
/// Calls are assumed infallible: the graph lives in-process in every known embedder.
/// Implementations must be shareable across tasks.
pub trait ContentStore: Send + Sync {
    /// Register (or look up) a content type and return its collection
    fn add_content_type(&self, type_name: &str) -> Arc<dyn NodeCollection>;

    /// Build a reference to the node `id` of content type `type_name`
    fn create_reference(&self, type_name: &str, id: PostId) -> Reference;

    /// Derive a stable unique id from an arbitrary string
    ///
    /// Equal inputs must produce equal uids; the loader deduplicates images on it.
    fn make_uid(&self, orig: &str) -> String;
}
