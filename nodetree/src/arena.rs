use std::fmt;

use generational_arena::{Arena, Index};
use tracing::{debug, instrument};

use crate::errors::{TreeError, TreeResult};

/// Stable identity of a node inside a [`Tree`].
///
/// Two ids are equal only if they name the same node. Ids of deleted nodes are never
/// reused for new nodes (the arena bumps a generation counter on every slot reuse).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(Index);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (slot, generation) = self.0.into_raw_parts();
        write!(f, "#{}v{}", slot, generation)
    }
}

/// Leaf/branch discriminant together with the variant's content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    /// Terminal node carrying an opaque payload.
    Leaf { payload: String },
    /// Ordered children, owned by this node.
    Branch { children: Vec<NodeId> },
}

/// A single node as stored in the arena.
///
/// Fields are private: only [`Tree`] writes `children` and `parent`.
#[derive(Debug, Clone)]
pub struct NodeData {
    name: String,
    kind: NodeKind,
    /// Back-reference to the containing branch, None for roots and detached nodes
    parent: Option<NodeId>,
}

impl NodeData {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> &NodeKind {
        &self.kind
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn is_leaf(&self) -> bool {
        matches!(self.kind, NodeKind::Leaf { .. })
    }

    pub fn is_branch(&self) -> bool {
        matches!(self.kind, NodeKind::Branch { .. })
    }

    /// Children of a branch; a leaf has none.
    pub fn children(&self) -> &[NodeId] {
        match &self.kind {
            NodeKind::Branch { children } => children,
            NodeKind::Leaf { .. } => &[],
        }
    }

    /// Payload of a leaf; a branch has none.
    pub fn payload(&self) -> Option<&str> {
        match &self.kind {
            NodeKind::Leaf { payload } => Some(payload),
            NodeKind::Branch { .. } => None,
        }
    }
}

/// Arena holding every node of one or more hierarchies.
///
/// Nodes without a parent are roots. Freshly created, decoded and removed nodes all
/// live on as roots until they are attached somewhere else or deleted.
#[derive(Debug)]
pub struct Tree {
    arena: Arena<NodeData>,
}

impl Default for Tree {
    fn default() -> Self {
        Self::new()
    }
}

impl Tree {
    pub fn new() -> Self {
        Self {
            arena: Arena::new(),
        }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            arena: Arena::with_capacity(capacity),
        }
    }

    #[instrument(level = "trace", skip(self, name, payload))]
    pub fn new_leaf(&mut self, name: impl Into<String>, payload: impl Into<String>) -> NodeId {
        NodeId(self.arena.insert(NodeData {
            name: name.into(),
            kind: NodeKind::Leaf {
                payload: payload.into(),
            },
            parent: None,
        }))
    }

    /// Creates a branch and attaches `children` to it in order.
    ///
    /// Each child is first removed from its previous parent. A child listed twice ends
    /// up once, at its last position. Fails without creating anything if any id is unknown.
    #[instrument(level = "debug", skip(self, name, children))]
    pub fn new_branch(
        &mut self,
        name: impl Into<String>,
        children: impl IntoIterator<Item = NodeId>,
    ) -> TreeResult<NodeId> {
        let children: Vec<NodeId> = children.into_iter().collect();
        if let Some(&missing) = children.iter().find(|&&child| !self.contains(child)) {
            return Err(TreeError::NodeNotFound(missing));
        }

        let branch = self.alloc_branch(name.into(), Vec::with_capacity(children.len()));
        for child in children {
            self.remove_from_parent(child);
            let end = self.children(branch).len();
            self.link(branch, child, end);
        }
        debug!(%branch, children = self.children(branch).len(), "created branch");
        Ok(branch)
    }

    #[instrument(level = "trace", skip(self))]
    pub fn get(&self, id: NodeId) -> Option<&NodeData> {
        self.arena.get(id.0)
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.arena.contains(id.0)
    }

    /// Number of live nodes across all hierarchies.
    pub fn len(&self) -> usize {
        self.arena.len()
    }

    pub fn is_empty(&self) -> bool {
        self.arena.is_empty()
    }

    /// All parentless nodes, in arena order.
    pub fn roots(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.arena
            .iter()
            .filter(|(_, node)| node.parent.is_none())
            .map(|(idx, _)| NodeId(idx))
    }

    pub fn kind(&self, id: NodeId) -> Option<&NodeKind> {
        self.get(id).map(NodeData::kind)
    }

    pub fn is_leaf(&self, id: NodeId) -> bool {
        self.get(id).is_some_and(NodeData::is_leaf)
    }

    pub fn is_branch(&self, id: NodeId) -> bool {
        self.get(id).is_some_and(NodeData::is_branch)
    }

    pub fn name(&self, id: NodeId) -> Option<&str> {
        self.get(id).map(NodeData::name)
    }

    #[instrument(level = "debug", skip(self, name))]
    pub fn set_name(&mut self, id: NodeId, name: impl Into<String>) -> TreeResult<()> {
        self.node_mut(id)?.name = name.into();
        Ok(())
    }

    /// Live children of a branch. Leaves and unknown ids yield an empty slice.
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.get(id).map(NodeData::children).unwrap_or(&[])
    }

    pub fn payload(&self, id: NodeId) -> Option<&str> {
        self.get(id).and_then(NodeData::payload)
    }

    /// Replaces the payload of a leaf. Branches carry no payload, so this is a no-op there.
    #[instrument(level = "debug", skip(self, payload))]
    pub fn set_payload(&mut self, id: NodeId, payload: impl Into<String>) -> TreeResult<()> {
        if let NodeKind::Leaf { payload: current } = &mut self.node_mut(id)?.kind {
            *current = payload.into();
        }
        Ok(())
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).and_then(NodeData::parent)
    }

    /// Detaches `id` and frees it together with its whole subtree.
    ///
    /// Returns the number of nodes freed.
    #[instrument(level = "debug", skip(self))]
    pub fn delete(&mut self, id: NodeId) -> TreeResult<usize> {
        self.node(id)?;
        self.remove_from_parent(id);

        let mut freed = 0;
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            if let Some(node) = self.arena.remove(current.0) {
                if let NodeKind::Branch { children } = node.kind {
                    stack.extend(children);
                }
                freed += 1;
            }
        }
        debug!(%id, freed, "deleted subtree");
        Ok(freed)
    }

    pub(crate) fn node(&self, id: NodeId) -> TreeResult<&NodeData> {
        self.get(id).ok_or(TreeError::NodeNotFound(id))
    }

    pub(crate) fn node_mut(&mut self, id: NodeId) -> TreeResult<&mut NodeData> {
        self.arena.get_mut(id.0).ok_or(TreeError::NodeNotFound(id))
    }

    /// Children of `id`, or `InvalidOperation(detail)` if it is a leaf.
    pub(crate) fn require_branch(&self, id: NodeId, detail: &str) -> TreeResult<&[NodeId]> {
        match &self.node(id)?.kind {
            NodeKind::Branch { children } => Ok(children),
            NodeKind::Leaf { .. } => Err(TreeError::invalid(detail)),
        }
    }

    pub(crate) fn require_branch_mut(
        &mut self,
        id: NodeId,
        detail: &str,
    ) -> TreeResult<&mut Vec<NodeId>> {
        match &mut self.node_mut(id)?.kind {
            NodeKind::Branch { children } => Ok(children),
            NodeKind::Leaf { .. } => Err(TreeError::invalid(detail)),
        }
    }

    /// Creates a branch owning `children`, which must all be detached.
    pub(crate) fn alloc_branch(&mut self, name: String, children: Vec<NodeId>) -> NodeId {
        let branch = NodeId(self.arena.insert(NodeData {
            name,
            kind: NodeKind::Branch {
                children: Vec::new(),
            },
            parent: None,
        }));
        for child in &children {
            if let Some(node) = self.arena.get_mut(child.0) {
                node.parent = Some(branch);
            }
        }
        if let Some(NodeKind::Branch { children: slot }) =
            self.arena.get_mut(branch.0).map(|node| &mut node.kind)
        {
            *slot = children;
        }
        branch
    }

    /// Places a detached `child` at `index` of branch `parent`. Callers validate first.
    pub(crate) fn link(&mut self, parent: NodeId, child: NodeId, index: usize) {
        if let Some(NodeKind::Branch { children }) =
            self.arena.get_mut(parent.0).map(|node| &mut node.kind)
        {
            children.insert(index, child);
            if let Some(node) = self.arena.get_mut(child.0) {
                node.parent = Some(parent);
            }
        }
    }

    /// Removes the child at `index` of `parent` and clears its back-reference.
    pub(crate) fn unlink(&mut self, parent: NodeId, index: usize) -> Option<NodeId> {
        let child = match self.arena.get_mut(parent.0).map(|node| &mut node.kind) {
            Some(NodeKind::Branch { children }) if index < children.len() => {
                children.remove(index)
            }
            _ => return None,
        };
        if let Some(node) = self.arena.get_mut(child.0) {
            node.parent = None;
        }
        Some(child)
    }

    /// Empties branch `id`, returning its former children as detached nodes.
    pub(crate) fn take_children(&mut self, id: NodeId) -> Vec<NodeId> {
        let children = match self.arena.get_mut(id.0).map(|node| &mut node.kind) {
            Some(NodeKind::Branch { children }) => std::mem::take(children),
            _ => return Vec::new(),
        };
        for child in &children {
            if let Some(node) = self.arena.get_mut(child.0) {
                node.parent = None;
            }
        }
        children
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_leaf_has_payload_and_no_children() {
        let mut tree = Tree::new();
        let leaf = tree.new_leaf("Node 1", "123456");

        assert!(tree.is_leaf(leaf));
        assert!(!tree.is_branch(leaf));
        assert_eq!(tree.payload(leaf), Some("123456"));
        assert!(tree.children(leaf).is_empty());
        assert_eq!(tree.parent(leaf), None);
    }

    #[test]
    fn test_new_branch_adopts_children_in_order() {
        let mut tree = Tree::new();
        let a = tree.new_leaf("a", "1");
        let b = tree.new_leaf("b", "2");
        let folder = tree.new_branch("Folder", [a, b]).unwrap();

        assert!(tree.is_branch(folder));
        assert_eq!(tree.payload(folder), None);
        assert_eq!(tree.children(folder), &[a, b]);
        assert_eq!(tree.parent(a), Some(folder));
        assert_eq!(tree.parent(b), Some(folder));
    }

    #[test]
    fn test_new_branch_steals_children_from_previous_parent() {
        let mut tree = Tree::new();
        let a = tree.new_leaf("a", "1");
        let old = tree.new_branch("Old", [a]).unwrap();
        let new = tree.new_branch("New", [a]).unwrap();

        assert!(tree.children(old).is_empty());
        assert_eq!(tree.children(new), &[a]);
        assert_eq!(tree.parent(a), Some(new));
    }

    #[test]
    fn test_new_branch_with_repeated_child_keeps_single_entry() {
        let mut tree = Tree::new();
        let a = tree.new_leaf("a", "1");
        let b = tree.new_leaf("b", "2");
        let folder = tree.new_branch("Folder", [a, b, a]).unwrap();

        assert_eq!(tree.children(folder), &[b, a]);
    }

    #[test]
    fn test_new_branch_with_unknown_child_creates_nothing() {
        let mut tree = Tree::new();
        let a = tree.new_leaf("a", "1");
        tree.delete(a).unwrap();

        let result = tree.new_branch("Folder", [a]);

        assert_eq!(result, Err(TreeError::NodeNotFound(a)));
        assert!(tree.is_empty());
    }

    #[test]
    fn test_set_payload_replaces_leaf_payload_and_ignores_branch() {
        let mut tree = Tree::new();
        let leaf = tree.new_leaf("Node 1", "123456");
        let folder = tree.new_branch("Folder 1", []).unwrap();

        tree.set_payload(leaf, "7890").unwrap();
        tree.set_payload(folder, "ignored").unwrap();

        assert_eq!(tree.payload(leaf), Some("7890"));
        assert_eq!(tree.payload(folder), None);
        assert!(tree.is_branch(folder));
    }

    #[test]
    fn test_delete_frees_whole_subtree() {
        let mut tree = Tree::new();
        let a = tree.new_leaf("a", "1");
        let b = tree.new_leaf("b", "2");
        let inner = tree.new_branch("Inner", [b]).unwrap();
        let root = tree.new_branch("Root", [a, inner]).unwrap();

        let freed = tree.delete(inner).unwrap();

        assert_eq!(freed, 2);
        assert_eq!(tree.children(root), &[a]);
        assert!(!tree.contains(inner));
        assert!(!tree.contains(b));
        assert_eq!(tree.len(), 2);
    }

    #[test]
    fn test_stale_id_is_not_reused() {
        let mut tree = Tree::new();
        let a = tree.new_leaf("a", "1");
        tree.delete(a).unwrap();
        let b = tree.new_leaf("b", "2");

        assert_ne!(a, b);
        assert!(tree.get(a).is_none());
        assert_eq!(tree.set_name(a, "x"), Err(TreeError::NodeNotFound(a)));
    }

    #[test]
    fn test_roots_lists_parentless_nodes() {
        let mut tree = Tree::new();
        let a = tree.new_leaf("a", "1");
        let root = tree.new_branch("Root", [a]).unwrap();
        let loose = tree.new_leaf("loose", "2");

        let roots: Vec<NodeId> = tree.roots().collect();

        assert_eq!(roots.len(), 2);
        assert!(roots.contains(&root));
        assert!(roots.contains(&loose));
    }
}
