//! Wrapping siblings into a new intermediate branch, and the inverse.

use itertools::Itertools;
use tracing::{debug, instrument};

use crate::arena::{NodeId, Tree};
use crate::errors::{TreeError, TreeResult};

impl Tree {
    /// Replaces the children of `parent` at `indices` with a new branch named `name`
    /// that contains them.
    ///
    /// Grouped children keep their ascending index order and the group takes the position
    /// of the smallest index. Duplicate indices collapse. An empty index set changes nothing
    /// and returns `None`.
    #[instrument(level = "debug", skip(self, indices, name))]
    pub fn group_children(
        &mut self,
        parent: NodeId,
        indices: impl IntoIterator<Item = usize>,
        name: impl Into<String>,
    ) -> TreeResult<Option<NodeId>> {
        let children = self.require_branch(parent, "Cannot group children of a leaf node.")?;
        let indices: Vec<usize> = indices.into_iter().sorted_unstable().dedup().collect();
        let (Some(&first), Some(&last)) = (indices.first(), indices.last()) else {
            return Ok(None);
        };
        if last >= children.len() {
            return Err(TreeError::IndexOutOfRange {
                index: last,
                len: children.len(),
            });
        }

        let members: Vec<NodeId> = indices.iter().map(|&i| children[i]).collect();
        // Back to front so the remaining indices stay valid.
        for &index in indices.iter().rev() {
            self.unlink(parent, index);
        }
        let group = self.alloc_branch(name.into(), members);
        self.link(parent, group, first);
        debug!(%parent, %group, grouped = indices.len(), "grouped children");
        Ok(Some(group))
    }

    /// Dissolves branch `node` into its parent: its children take its place, in order,
    /// and `node` is left detached and empty.
    #[instrument(level = "debug", skip(self))]
    pub fn split_group(&mut self, node: NodeId) -> TreeResult<()> {
        if self.node(node)?.is_leaf() {
            return Err(TreeError::invalid("Cannot split leaf node."));
        }
        let (Some(parent), Some(index)) = (self.parent(node), self.index_in_parent(node)) else {
            return Err(TreeError::invalid("Cannot split a node without a parent."));
        };

        self.unlink(parent, index);
        let children = self.take_children(node);
        let count = children.len();
        for (offset, child) in children.into_iter().enumerate() {
            self.link(parent, child, index + offset);
        }
        debug!(%parent, %node, count, "split group");
        Ok(())
    }
}
