//! Arena-backed filesystem-like tree.
//!
//! Every node is either a **branch** (ordered children) or a **leaf** (an opaque string
//! payload). Nodes live in a [`Tree`] and are addressed by [`NodeId`]; all structural
//! changes go through `Tree` methods, which keep parent back-references and child lists
//! consistent and reject cycles.
//!
//! ```
//! use nodetree::{Codec, Tree};
//!
//! let mut tree = Tree::new();
//! let a = tree.new_leaf("a", "obj-1");
//! let b = tree.new_leaf("b", "obj-2");
//! let root = tree.new_branch("Root", [a, b])?;
//! tree.group_children(root, [0, 1], "Folder")?;
//!
//! let json = Codec::default().encode(&tree, root)?;
//! let mut copy = Tree::new();
//! let decoded = Codec::default().decode(&mut copy, &json)?;
//! assert_eq!(tree.view(root)?, copy.view(decoded)?);
//! # Ok::<(), nodetree::TreeError>(())
//! ```

pub mod arena;
pub mod codec;
pub mod config;
pub mod equality;
pub mod errors;
mod hierarchy;
pub mod introspect;
mod regroup;
pub mod traversal;
pub mod tree_traits;
pub mod util;

pub use arena::{NodeData, NodeId, NodeKind, Tree};
pub use codec::{Codec, Content, NodeRecord};
pub use config::{CodecSettings, Settings};
pub use equality::NodeView;
pub use errors::{TreeError, TreeResult};
pub use tree_traits::TreeNodeConvert;
