//! Content graph store
//!
//! The graph that image nodes end up in belongs to the embedding site generator. This
//! module defines the narrow interface the loader needs from it, so any graph can be
//! plugged in:
//!
//! - [`ContentStore`]: registers content types, builds references, derives uids
//! - [`NodeCollection`]: a registered content type that accepts nodes
//! - [`MemoryStore`]: in-process implementation backed by a `HashMap`
//!
//! ## Usage
//!
//! ```
//! use wp_remote_images::store::{ContentStore, MemoryStore};
//! use wp_remote_images::types::{ImageNode, PostId};
//!
//! let store = MemoryStore::new();
//! let images = store.add_content_type("WordPressPortfolioImage");
//!
//! images.add_node(ImageNode {
//!     image: "/site/src/assets/images/a.jpg".into(),
//!     parent_field: "magnetic_portfolio".into(),
//!     parent: store.create_reference("WordPressMagneticPortfolio", PostId(7)),
//! });
//!
//! assert_eq!(store.nodes("WordPressPortfolioImage").len(), 1);
//! ```

mod memory;
mod traits;

pub use memory::MemoryStore;
pub use traits::{ContentStore, NodeCollection};
