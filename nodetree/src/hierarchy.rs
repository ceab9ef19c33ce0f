//! Child insertion, removal and reordering.
//!
//! Every operation validates all of its inputs before touching the arena, so a failed
//! call leaves the tree exactly as it was.

use tracing::{debug, instrument, trace};

use crate::arena::{NodeId, Tree};
use crate::errors::{TreeError, TreeResult};

const INSERT_INTO_LEAF: &str = "Cannot insert children into a leaf node.";
const REMOVE_FROM_LEAF: &str = "Cannot remove children from a leaf node.";
const SWAP_IN_LEAF: &str = "Cannot swap children in a leaf node.";
const CYCLE: &str = "Cannot insert a node into itself or one of its descendants.";

impl Tree {
    /// Inserts `child` at `index` among the children of `parent`.
    ///
    /// `child` is first removed from its current parent. When that parent is `parent`
    /// itself, `index` refers to the positions left after the removal.
    #[instrument(level = "debug", skip(self))]
    pub fn insert_child(&mut self, parent: NodeId, child: NodeId, index: usize) -> TreeResult<()> {
        let len = self.require_branch(parent, INSERT_INTO_LEAF)?.len();
        let current_parent = self.node(child)?.parent();
        if child == parent || self.is_descendant(parent, child) {
            return Err(TreeError::invalid(CYCLE));
        }

        let len = if current_parent == Some(parent) { len - 1 } else { len };
        if index > len {
            return Err(TreeError::IndexOutOfRange { index, len });
        }

        self.remove_from_parent(child);
        self.link(parent, child, index);
        debug!(%parent, %child, index, "inserted child");
        Ok(())
    }

    /// Appends `child` as the last child of `parent`.
    pub fn add_child(&mut self, parent: NodeId, child: NodeId) -> TreeResult<()> {
        let end = self.require_branch(parent, INSERT_INTO_LEAF)?.len();
        let end = if self.parent(child) == Some(parent) { end.saturating_sub(1) } else { end };
        self.insert_child(parent, child, end)
    }

    /// Removes and returns the child at `index`. The returned node stays alive as a root.
    #[instrument(level = "debug", skip(self))]
    pub fn remove_child(&mut self, parent: NodeId, index: usize) -> TreeResult<NodeId> {
        let len = self.require_branch(parent, REMOVE_FROM_LEAF)?.len();
        let child = self
            .unlink(parent, index)
            .ok_or(TreeError::IndexOutOfRange { index, len })?;
        debug!(%parent, %child, index, "removed child");
        Ok(child)
    }

    /// Detaches `node` from its parent. Orphans and unknown ids are left alone.
    #[instrument(level = "trace", skip(self))]
    pub fn remove_from_parent(&mut self, node: NodeId) {
        let Some(parent) = self.parent(node) else {
            return;
        };
        // Identity lookup: structurally equal siblings must not be confused.
        let Some(index) = self.children(parent).iter().position(|&c| c == node) else {
            trace!(%node, %parent, "parent does not list node, nothing to remove");
            return;
        };
        self.unlink(parent, index);
    }

    #[instrument(level = "debug", skip(self))]
    pub fn swap_children(&mut self, parent: NodeId, i: usize, j: usize) -> TreeResult<()> {
        let children = self.require_branch_mut(parent, SWAP_IN_LEAF)?;
        let len = children.len();
        if let Some(&index) = [i, j].iter().find(|&&index| index >= len) {
            return Err(TreeError::IndexOutOfRange { index, len });
        }
        children.swap(i, j);
        Ok(())
    }

    /// Transplants the child at `src_index` of `src_parent` to `dst_index` of `dst_parent`.
    ///
    /// If both parents are the same node this is [`Tree::swap_children`] on that node.
    #[instrument(level = "debug", skip(self))]
    pub fn move_node(
        &mut self,
        src_parent: NodeId,
        src_index: usize,
        dst_parent: NodeId,
        dst_index: usize,
    ) -> TreeResult<()> {
        if src_parent == dst_parent {
            return self.swap_children(src_parent, src_index, dst_index);
        }

        let src_children = self.require_branch(src_parent, REMOVE_FROM_LEAF)?;
        let moving = src_children
            .get(src_index)
            .copied()
            .ok_or(TreeError::IndexOutOfRange {
                index: src_index,
                len: src_children.len(),
            })?;
        let dst_len = self.require_branch(dst_parent, INSERT_INTO_LEAF)?.len();
        if dst_index > dst_len {
            return Err(TreeError::IndexOutOfRange {
                index: dst_index,
                len: dst_len,
            });
        }
        if moving == dst_parent || self.is_descendant(dst_parent, moving) {
            return Err(TreeError::invalid(CYCLE));
        }

        self.unlink(src_parent, src_index);
        self.link(dst_parent, moving, dst_index);
        debug!(%src_parent, %dst_parent, node = %moving, "moved node");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn numbered(tree: &mut Tree, name: &str, count: usize) -> (NodeId, Vec<NodeId>) {
        let children: Vec<NodeId> = (0..count)
            .map(|i| tree.new_leaf(i.to_string(), i.to_string()))
            .collect();
        let parent = tree.new_branch(name, children.clone()).unwrap();
        (parent, children)
    }

    #[test]
    fn test_add_child_appends() {
        let mut tree = Tree::new();
        let root = tree.new_branch("Root", []).unwrap();
        let child0 = tree.new_leaf("Child 0", "123456");
        let child1 = tree.new_leaf("Child 1", "789101");

        tree.add_child(root, child0).unwrap();
        tree.add_child(root, child1).unwrap();

        assert_eq!(tree.children(root), &[child0, child1]);
        assert_eq!(tree.parent(child1), Some(root));
    }

    #[test]
    fn test_add_child_of_existing_child_moves_it_to_end() {
        let mut tree = Tree::new();
        let (parent, children) = numbered(&mut tree, "Parent", 3);

        tree.add_child(parent, children[0]).unwrap();

        assert_eq!(tree.children(parent), &[children[1], children[2], children[0]]);
    }

    #[test]
    fn test_insert_child_within_same_parent_reorders() {
        let mut tree = Tree::new();
        let (parent, children) = numbered(&mut tree, "Parent", 4);

        tree.insert_child(parent, children[3], 0).unwrap();

        assert_eq!(
            tree.children(parent),
            &[children[3], children[0], children[1], children[2]]
        );
    }

    #[test]
    fn test_insert_child_past_end_fails_without_detaching() {
        let mut tree = Tree::new();
        let (parent, _) = numbered(&mut tree, "Parent", 2);
        let (other, others) = numbered(&mut tree, "Other", 1);

        let result = tree.insert_child(parent, others[0], 3);

        assert_eq!(result, Err(TreeError::IndexOutOfRange { index: 3, len: 2 }));
        assert_eq!(tree.parent(others[0]), Some(other));
    }

    #[test]
    fn test_insert_into_leaf_is_invalid() {
        let mut tree = Tree::new();
        let leaf = tree.new_leaf("Leaf", "1");
        let child = tree.new_leaf("Child", "2");

        let result = tree.insert_child(leaf, child, 0);

        assert!(matches!(result, Err(TreeError::InvalidOperation(_))));
        assert_eq!(tree.parent(child), None);
    }

    #[test]
    fn test_remove_child_clears_parent() {
        let mut tree = Tree::new();
        let node = tree.new_leaf("Child", "");
        let parent = tree.new_branch("Parent", [node]).unwrap();

        let removed = tree.remove_child(parent, 0).unwrap();

        assert_eq!(removed, node);
        assert_eq!(tree.parent(node), None);
        assert!(tree.children(parent).is_empty());
    }

    #[test]
    fn test_remove_child_out_of_range() {
        let mut tree = Tree::new();
        let (parent, _) = numbered(&mut tree, "Parent", 2);

        let result = tree.remove_child(parent, 2);

        assert_eq!(result, Err(TreeError::IndexOutOfRange { index: 2, len: 2 }));
    }

    #[test]
    fn test_remove_from_parent_uses_identity() {
        let mut tree = Tree::new();
        let first = tree.new_leaf("Twin", "same");
        let second = tree.new_leaf("Twin", "same");
        let parent = tree.new_branch("Parent", [first, second]).unwrap();

        tree.remove_from_parent(second);

        assert_eq!(tree.children(parent), &[first]);
        assert_eq!(tree.parent(first), Some(parent));
        assert_eq!(tree.parent(second), None);
    }

    #[test]
    fn test_remove_from_missing_parent_is_noop() {
        let mut tree = Tree::new();
        let node = tree.new_leaf("Child", "");

        tree.remove_from_parent(node);

        assert_eq!(tree.parent(node), None);
    }

    #[test]
    fn test_swap_children() {
        let mut tree = Tree::new();
        let (parent, _) = numbered(&mut tree, "Parent", 11);

        tree.swap_children(parent, 3, 7).unwrap();

        let names: Vec<&str> = tree
            .children(parent)
            .iter()
            .filter_map(|&c| tree.name(c))
            .collect();
        assert_eq!(names[3], "7");
        assert_eq!(names[7], "3");
    }

    #[test]
    fn test_swap_out_of_range_leaves_order() {
        let mut tree = Tree::new();
        let (parent, children) = numbered(&mut tree, "Parent", 3);

        let result = tree.swap_children(parent, 0, 5);

        assert_eq!(result, Err(TreeError::IndexOutOfRange { index: 5, len: 3 }));
        assert_eq!(tree.children(parent), children.as_slice());
    }

    #[test]
    fn test_move_within_same_parent_swaps() {
        let mut tree = Tree::new();
        let (parent, children) = numbered(&mut tree, "Parent", 11);

        tree.move_node(parent, 3, parent, 7).unwrap();

        assert_eq!(tree.children(parent)[3], children[7]);
        assert_eq!(tree.children(parent)[7], children[3]);
    }

    #[test]
    fn test_move_into_own_descendant_is_rejected() {
        let mut tree = Tree::new();
        let leaf = tree.new_leaf("leaf", "x");
        let inner = tree.new_branch("Inner", [leaf]).unwrap();
        let middle = tree.new_branch("Middle", [inner]).unwrap();
        let root = tree.new_branch("Root", [middle]).unwrap();

        let result = tree.move_node(root, 0, inner, 0);

        assert!(matches!(result, Err(TreeError::InvalidOperation(_))));
        assert_eq!(tree.children(root), &[middle]);
        assert_eq!(tree.parent(middle), Some(root));
    }

    #[test]
    fn test_insert_self_is_rejected() {
        let mut tree = Tree::new();
        let folder = tree.new_branch("Folder", []).unwrap();

        let result = tree.insert_child(folder, folder, 0);

        assert!(matches!(result, Err(TreeError::InvalidOperation(_))));
        assert_eq!(tree.parent(folder), None);
    }
}
