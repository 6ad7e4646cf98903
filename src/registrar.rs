//! Registration of image nodes in the content graph

use crate::store::{ContentStore, NodeCollection};
use crate::types::{ImageNode, ImageTask, PostId};

/// Add one node per task to `collection`, each referencing post `post_id`
///
/// Runs for every task of the batch, whether or not its download succeeded.
/// Returns the number of nodes created.
pub fn register_images(
    store: &dyn ContentStore,
    collection: &dyn NodeCollection,
    post_id: PostId,
    tasks: &[ImageTask],
    belongs_to_type_name: &str,
    parent_field: &str,
) -> usize {
    for task in tasks {
        collection.add_node(ImageNode {
            image: task.filepath.clone(),
            parent_field: parent_field.to_string(),
            parent: store.create_reference(belongs_to_type_name, post_id),
        });
    }

    tracing::debug!(
        post_id = post_id.0,
        collection = collection.type_name(),
        nodes = tasks.len(),
        "registered image nodes"
    );

    tasks.len()
}
