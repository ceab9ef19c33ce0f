//! Structural serialization.
//!
//! Every node encodes as a record with two keys:
//!
//! ```json
//! { "name": "Root", "content": [ { "name": "a", "content": "payload" } ] }
//! ```
//!
//! `content` is a string for a leaf and a sequence of records for a branch (an empty
//! branch encodes `[]`). There is no type tag: a sequence decodes as a branch and a string
//! as a leaf. Nesting depth is limited only by [`CodecSettings::max_depth`].

use std::fmt;

use serde::de::{self, Deserializer, SeqAccess, Visitor};
use serde::ser::{SerializeStruct, Serializer};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::arena::{NodeId, NodeKind, Tree};
use crate::config::CodecSettings;
use crate::equality::NodeView;
use crate::errors::{TreeError, TreeResult};
use crate::util::stack::grow;

/// Owned, parent-free form of a subtree, as read from or written to the wire.
///
/// Dropping and comparing records walk an explicit stack, so nesting depth is only
/// bounded by memory.
#[derive(Debug, Clone, Deserialize)]
pub struct NodeRecord {
    pub name: String,
    pub content: Content,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Content {
    Branch(Vec<NodeRecord>),
    Leaf(String),
}

impl NodeRecord {
    pub fn leaf(name: impl Into<String>, payload: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            content: Content::Leaf(payload.into()),
        }
    }

    pub fn branch(name: impl Into<String>, children: Vec<NodeRecord>) -> Self {
        Self {
            name: name.into(),
            content: Content::Branch(children),
        }
    }

    /// Number of levels in this record; a leaf or empty branch has depth 1.
    pub fn depth(&self) -> usize {
        let mut max_depth = 0;
        let mut stack = vec![(self, 1)];
        while let Some((record, depth)) = stack.pop() {
            max_depth = max_depth.max(depth);
            if let Content::Branch(children) = &record.content {
                stack.extend(children.iter().map(|c| (c, depth + 1)));
            }
        }
        max_depth
    }

    fn take_content(&mut self) -> Content {
        std::mem::replace(&mut self.content, Content::Branch(Vec::new()))
    }
}

impl Drop for NodeRecord {
    fn drop(&mut self) {
        let Content::Branch(children) = &mut self.content else {
            return;
        };
        let mut stack = std::mem::take(children);
        while let Some(mut record) = stack.pop() {
            if let Content::Branch(grandchildren) = &mut record.content {
                stack.append(grandchildren);
            }
        }
    }
}

impl PartialEq for NodeRecord {
    fn eq(&self, other: &Self) -> bool {
        let mut stack = vec![(self, other)];
        while let Some((left, right)) = stack.pop() {
            if left.name != right.name {
                return false;
            }
            match (&left.content, &right.content) {
                (Content::Leaf(l), Content::Leaf(r)) => {
                    if l != r {
                        return false;
                    }
                }
                (Content::Branch(l), Content::Branch(r)) => {
                    if l.len() != r.len() {
                        return false;
                    }
                    stack.extend(l.iter().zip(r.iter()));
                }
                _ => return false,
            }
        }
        true
    }
}

impl Eq for NodeRecord {}

impl Serialize for NodeRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        grow(|| {
            let mut state = serializer.serialize_struct("Node", 2)?;
            state.serialize_field("name", &self.name)?;
            state.serialize_field("content", &self.content)?;
            state.end()
        })
    }
}

// A sequence is always a branch and a string always a leaf; anything else is rejected.
// Every nesting level passes through here, so this is where the stack grows.
impl<'de> Deserialize<'de> for Content {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        grow(|| deserializer.deserialize_any(ContentVisitor))
    }
}

struct ContentVisitor;

impl<'de> Visitor<'de> for ContentVisitor {
    type Value = Content;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a sequence of child nodes or a payload string")
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Content, A::Error> {
        let mut children = Vec::with_capacity(seq.size_hint().unwrap_or(0));
        while let Some(child) = seq.next_element()? {
            children.push(child);
        }
        Ok(Content::Branch(children))
    }

    fn visit_str<E: de::Error>(self, value: &str) -> Result<Content, E> {
        Ok(Content::Leaf(value.to_owned()))
    }

    fn visit_string<E: de::Error>(self, value: String) -> Result<Content, E> {
        Ok(Content::Leaf(value))
    }
}

impl Serialize for NodeView<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        grow(|| {
            let mut state = serializer.serialize_struct("Node", 2)?;
            state.serialize_field("name", self.name())?;
            match self.data().kind() {
                NodeKind::Leaf { payload } => state.serialize_field("content", payload)?,
                NodeKind::Branch { .. } => {
                    state.serialize_field("content", &ChildrenView(*self))?
                }
            }
            state.end()
        })
    }
}

struct ChildrenView<'a>(NodeView<'a>);

impl Serialize for ChildrenView<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.0.children())
    }
}

/// Branch whose children are still being built by [`Tree::insert_record`].
struct PendingBranch {
    name: String,
    pending: std::vec::IntoIter<NodeRecord>,
    built: Vec<NodeId>,
}

impl Tree {
    /// Owned snapshot of the subtree at `id`.
    ///
    /// Built bottom-up from a post-order walk: when a branch is reached, the records of
    /// its children are the last ones on the stack.
    pub fn to_record(&self, id: NodeId) -> TreeResult<NodeRecord> {
        self.node(id)?;
        let mut built: Vec<NodeRecord> = Vec::new();
        for (_, node) in self.iter_postorder(id) {
            let record = match node.kind() {
                NodeKind::Leaf { payload } => NodeRecord::leaf(node.name(), payload.as_str()),
                NodeKind::Branch { children } => {
                    let first = built.len().saturating_sub(children.len());
                    NodeRecord::branch(node.name(), built.split_off(first))
                }
            };
            built.push(record);
        }
        built.pop().ok_or(TreeError::NodeNotFound(id))
    }

    /// Builds the nodes described by `record` as a new detached subtree.
    ///
    /// Children are created before their parent and then attached to it.
    pub fn insert_record(&mut self, mut record: NodeRecord) -> NodeId {
        let mut stack: Vec<PendingBranch> = Vec::new();
        loop {
            let name = std::mem::take(&mut record.name);
            let mut done = match record.take_content() {
                Content::Leaf(payload) => self.new_leaf(name, payload),
                Content::Branch(children) => {
                    let mut pending = children.into_iter();
                    match pending.next() {
                        Some(first) => {
                            stack.push(PendingBranch {
                                name,
                                pending,
                                built: Vec::new(),
                            });
                            record = first;
                            continue;
                        }
                        None => self.alloc_branch(name, Vec::new()),
                    }
                }
            };

            loop {
                match stack.last_mut() {
                    None => return done,
                    Some(top) => {
                        top.built.push(done);
                        if let Some(next) = top.pending.next() {
                            record = next;
                            break;
                        }
                    }
                }
                if let Some(finished) = stack.pop() {
                    done = self.alloc_branch(finished.name, finished.built);
                }
            }
        }
    }
}

/// JSON encoder/decoder for node trees.
#[derive(Debug, Clone, Default)]
pub struct Codec {
    settings: CodecSettings,
}

impl Codec {
    pub fn new(settings: CodecSettings) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> &CodecSettings {
        &self.settings
    }

    #[instrument(level = "debug", skip(self, tree))]
    pub fn encode(&self, tree: &Tree, id: NodeId) -> TreeResult<String> {
        let view = tree.view(id)?;
        let encoded = if self.settings.pretty {
            serde_json::to_string_pretty(&view)
        } else {
            serde_json::to_string(&view)
        };
        encoded.map_err(|e| TreeError::Encode(e.to_string()))
    }

    /// Parses `input` into a record, enforcing the configured depth limit.
    #[instrument(level = "debug", skip(self, input), fields(bytes = input.len()))]
    pub fn decode_record(&self, input: &str) -> TreeResult<NodeRecord> {
        let corrupt = |e: serde_json::Error| TreeError::DataCorruption(e.to_string());
        let mut json = serde_json::Deserializer::from_str(input);
        json.disable_recursion_limit();
        let record = NodeRecord::deserialize(&mut json).map_err(corrupt)?;
        json.end().map_err(corrupt)?;
        if let Some(max_depth) = self.settings.max_depth {
            let depth = record.depth();
            if depth > max_depth {
                return Err(TreeError::DataCorruption(format!(
                    "nesting depth {} exceeds limit {}",
                    depth, max_depth
                )));
            }
        }
        Ok(record)
    }

    /// Decodes `input` into `tree` as a new detached subtree and returns its root.
    pub fn decode(&self, tree: &mut Tree, input: &str) -> TreeResult<NodeId> {
        let record = self.decode_record(input)?;
        let root = tree.insert_record(record);
        debug!(%root, "decoded subtree");
        Ok(root)
    }
}
