use tracing::instrument;

use crate::arena::{NodeId, Tree};

/// Walks `parent` links upward, starting with the parent of the given node.
pub struct Ancestors<'a> {
    tree: &'a Tree,
    next: Option<NodeId>,
}

impl Iterator for Ancestors<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next?;
        self.next = self.tree.parent(current);
        Some(current)
    }
}

impl Tree {
    /// Position of `node` among its parent's children, `None` for roots.
    ///
    /// # Panics
    ///
    /// If `node` has a parent that does not list it. That state cannot be reached through
    /// the public API.
    #[instrument(level = "trace", skip(self))]
    pub fn index_in_parent(&self, node: NodeId) -> Option<usize> {
        let parent = self.parent(node)?;
        match self.children(parent).iter().position(|&c| c == node) {
            Some(index) => Some(index),
            None => panic!(
                "node {} ({:?}) not found among the children of its parent {}",
                node,
                self.name(node),
                parent
            ),
        }
    }

    pub fn ancestors(&self, node: NodeId) -> Ancestors<'_> {
        Ancestors {
            tree: self,
            next: self.parent(node),
        }
    }

    /// True if `ancestor` is reachable from `node` through `parent` links.
    /// A node is never its own descendant.
    #[instrument(level = "trace", skip(self))]
    pub fn is_descendant(&self, node: NodeId, ancestor: NodeId) -> bool {
        self.ancestors(node).any(|id| id == ancestor)
    }

    /// Topmost ancestor of `node`, or `node` itself when it is a root.
    pub fn root_of(&self, node: NodeId) -> NodeId {
        self.ancestors(node).last().unwrap_or(node)
    }

    /// Number of levels in the subtree rooted at `node`; a lone node has depth 1.
    /// Unknown ids have depth 0.
    #[instrument(level = "debug", skip(self))]
    pub fn depth(&self, node: NodeId) -> usize {
        if !self.contains(node) {
            return 0;
        }
        let mut max_depth = 0;
        let mut stack = vec![(node, 1)];
        while let Some((current, depth)) = stack.pop() {
            max_depth = max_depth.max(depth);
            stack.extend(self.children(current).iter().map(|&c| (c, depth + 1)));
        }
        max_depth
    }

    /// Leaf nodes below `node` in pre-order. Empty branches are not leaves.
    #[instrument(level = "debug", skip(self))]
    pub fn leaves(&self, node: NodeId) -> Vec<NodeId> {
        self.iter(node)
            .filter(|(_, data)| data.is_leaf())
            .map(|(id, _)| id)
            .collect()
    }

    /// Names from the topmost ancestor down to `node`.
    pub fn path(&self, node: NodeId) -> Vec<&str> {
        let mut names: Vec<&str> = std::iter::once(node)
            .chain(self.ancestors(node))
            .filter_map(|id| self.name(id))
            .collect();
        names.reverse();
        names
    }
}
