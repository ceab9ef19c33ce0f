use termtree::Tree;
use tracing::instrument;

use crate::arena::{NodeId, Tree as NodeTree};
use crate::equality::NodeView;
use crate::errors::TreeResult;
use crate::util::stack::grow;

pub trait TreeNodeConvert {
    fn to_tree_string(&self) -> Tree<String>;
}

// Branches render as their name, leaves as `name: payload`.
impl TreeNodeConvert for NodeView<'_> {
    #[instrument(level = "trace", skip(self), fields(node = %self.id()))]
    fn to_tree_string(&self) -> Tree<String> {
        let label = match self.payload() {
            Some(payload) => format!("{}: {}", self.name(), payload),
            None => self.name().to_string(),
        };
        let leaves: Vec<_> = self
            .children()
            .map(|c| grow(|| c.to_tree_string()))
            .collect();
        Tree::new(label).with_leaves(leaves)
    }
}

impl NodeTree {
    /// Renders the subtree at `id` as a box-drawing tree.
    pub fn to_tree_string(&self, id: NodeId) -> TreeResult<Tree<String>> {
        Ok(self.view(id)?.to_tree_string())
    }
}
