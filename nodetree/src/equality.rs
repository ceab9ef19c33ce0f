use std::fmt;

use tracing::trace;

use crate::arena::{NodeData, NodeId, NodeKind, Tree};
use crate::errors::TreeResult;
use crate::tree_traits::TreeNodeConvert;
use crate::util::stack::grow;

/// Read-only handle on one node and the subtree below it.
///
/// Equality between views is structural: same name, same variant, and equal payloads or
/// pairwise-equal children. Parents are ignored and the two views may belong to
/// different trees.
#[derive(Clone, Copy)]
pub struct NodeView<'a> {
    tree: &'a Tree,
    id: NodeId,
    data: &'a NodeData,
}

impl<'a> NodeView<'a> {
    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn tree(&self) -> &'a Tree {
        self.tree
    }

    pub fn data(&self) -> &'a NodeData {
        self.data
    }

    pub fn name(&self) -> &'a str {
        self.data.name()
    }

    pub fn payload(&self) -> Option<&'a str> {
        self.data.payload()
    }

    /// Views of the children, in order.
    pub fn children(&self) -> impl Iterator<Item = NodeView<'a>> + 'a {
        let tree = self.tree;
        self.data
            .children()
            .iter()
            .filter_map(move |&child| tree.view(child).ok())
    }
}

impl Tree {
    pub fn view(&self, id: NodeId) -> TreeResult<NodeView<'_>> {
        Ok(NodeView {
            tree: self,
            id,
            data: self.node(id)?,
        })
    }

    /// Structural comparison of `a` in this tree with `b` in `other`.
    pub fn subtree_eq(&self, a: NodeId, other: &Tree, b: NodeId) -> bool {
        let mut stack = vec![(a, b)];
        while let Some((left_id, right_id)) = stack.pop() {
            let (Some(left), Some(right)) = (self.get(left_id), other.get(right_id)) else {
                return false;
            };
            if left.name() != right.name() {
                trace!(left = left.name(), right = right.name(), "different names");
                return false;
            }
            match (left.kind(), right.kind()) {
                (NodeKind::Leaf { payload: l }, NodeKind::Leaf { payload: r }) => {
                    if l != r {
                        return false;
                    }
                }
                (NodeKind::Branch { children: l }, NodeKind::Branch { children: r }) => {
                    if l.len() != r.len() {
                        return false;
                    }
                    stack.extend(l.iter().copied().zip(r.iter().copied()));
                }
                _ => {
                    trace!(name = left.name(), "different types");
                    return false;
                }
            }
        }
        true
    }
}

impl PartialEq for NodeView<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.tree.subtree_eq(self.id, other.tree, other.id)
    }
}

impl Eq for NodeView<'_> {}

impl fmt::Debug for NodeView<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        grow(|| {
            let mut out = f.debug_struct("Node");
            out.field("name", &self.name());
            match self.payload() {
                Some(payload) => out.field("payload", &payload),
                None => out.field("children", &self.children().collect::<Vec<_>>()),
            };
            out.finish()
        })
    }
}

impl fmt::Display for NodeView<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_tree_string())
    }
}
