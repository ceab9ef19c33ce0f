use tracing::instrument;

use crate::arena::{NodeData, NodeId, Tree};

impl Tree {
    /// Depth-first pre-order walk of the subtree rooted at `node`.
    #[instrument(level = "trace", skip(self))]
    pub fn iter(&self, node: NodeId) -> TreeIterator<'_> {
        TreeIterator::new(self, node)
    }

    /// Depth-first post-order walk: children before their parent.
    #[instrument(level = "trace", skip(self))]
    pub fn iter_postorder(&self, node: NodeId) -> PostOrderIterator<'_> {
        PostOrderIterator::new(self, node)
    }
}

/// Pre-order walk over a subtree, yielding each node before its children.
pub struct TreeIterator<'a> {
    tree: &'a Tree,
    stack: Vec<NodeId>,
}

impl<'a> TreeIterator<'a> {
    fn new(tree: &'a Tree, start: NodeId) -> Self {
        let mut stack = Vec::new();
        if tree.contains(start) {
            stack.push(start);
        }
        Self { tree, stack }
    }
}

impl<'a> Iterator for TreeIterator<'a> {
    type Item = (NodeId, &'a NodeData);

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(current) = self.stack.pop() {
            if let Some(node) = self.tree.get(current) {
                // Push children in reverse order for left-to-right traversal
                self.stack.extend(node.children().iter().rev());
                return Some((current, node));
            }
        }
        None
    }
}

/// Post-order walk over a subtree, yielding each node after all of its children.
pub struct PostOrderIterator<'a> {
    tree: &'a Tree,
    stack: Vec<(NodeId, bool)>,
}

impl<'a> PostOrderIterator<'a> {
    fn new(tree: &'a Tree, start: NodeId) -> Self {
        let mut stack = Vec::new();
        if tree.contains(start) {
            stack.push((start, false));
        }
        Self { tree, stack }
    }
}

impl<'a> Iterator for PostOrderIterator<'a> {
    type Item = (NodeId, &'a NodeData);

    fn next(&mut self) -> Option<Self::Item> {
        while let Some((current, visited)) = self.stack.pop() {
            if let Some(node) = self.tree.get(current) {
                if visited {
                    return Some((current, node));
                }
                self.stack.push((current, true));
                self.stack
                    .extend(node.children().iter().rev().map(|&child| (child, false)));
            }
        }
        None
    }
}
