use super::line_ingester::IngestedToken;
use super::value::TypedValue;
use std::collections::BTreeMap;
use tracing::debug;

/// How leading whitespace maps to nesting depth for one dump format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndentPolicy {
    /// Leading whitespace characters per level.
    pub width: usize,
    /// Deepest level the format produces; deeper entries are ignored.
    pub max_depth: usize,
}

impl IndentPolicy {
    pub const fn new(width: usize, max_depth: usize) -> Self {
        Self { width, max_depth }
    }

    /// Depth of an entry, or `None` when the indentation is not one the format produces.
    #[inline]
    pub fn depth(&self, indent: usize) -> Option<usize> {
        let width = self.width.max(1);
        if indent % width != 0 {
            return None;
        }
        let depth = indent / width;
        (depth <= self.max_depth).then_some(depth)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(usize);

pub const ROOT: NodeId = NodeId(0);

/// Every value seen for one bare key inside one block, in source order.
#[derive(Debug, Clone, PartialEq)]
pub struct Leaf {
    instances: Vec<TypedValue>,
}

impl Leaf {
    pub fn new(value: TypedValue) -> Self {
        Self {
            instances: vec![value],
        }
    }

    #[inline]
    pub fn push(&mut self, value: TypedValue) {
        self.instances.push(value);
    }

    /// The value a plain copy sees: the last instance wins.
    #[inline]
    pub fn latest(&self) -> &TypedValue {
        // never empty, built from `Leaf::new`
        &self.instances[self.instances.len() - 1]
    }

    #[inline]
    pub fn instances(&self) -> &[TypedValue] {
        &self.instances
    }

    /// Sum of the integer contribution of every instance, clamped to the `i64` range.
    #[inline]
    pub fn integer_sum(&self) -> i64 {
        self.instances
            .iter()
            .map(TypedValue::as_integer)
            .fold(0, i64::saturating_add)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Block {
    children: BTreeMap<String, NodeId>,
}

impl Block {
    #[inline]
    pub fn child(&self, name: &str) -> Option<NodeId> {
        self.children.get(name).copied()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.children.keys().map(String::as_str)
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Leaf(Leaf),
    Block(Block),
}

/// Statistics tree reconstructed from an indented dump.
///
/// Nodes live in one arena and refer to their children by index; node 0 is
/// the root block.
#[derive(Debug, Clone, PartialEq)]
pub struct StatTree {
    nodes: Vec<Node>,
}

impl Default for StatTree {
    fn default() -> Self {
        Self::new()
    }
}

impl StatTree {
    pub fn new() -> Self {
        Self {
            nodes: vec![Node::Block(Block::default())],
        }
    }

    #[inline]
    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }

    #[inline]
    pub fn block(&self, id: NodeId) -> Option<&Block> {
        match self.node(id) {
            Node::Block(b) => Some(b),
            Node::Leaf(_) => None,
        }
    }

    /// Walks a dotted path from the root.
    pub fn get(&self, path: &str) -> Option<&Node> {
        let mut curr = ROOT;
        for segment in path.split('.') {
            curr = self.block(curr)?.child(segment)?;
        }
        Some(self.node(curr))
    }

    pub fn leaf(&self, path: &str) -> Option<&Leaf> {
        match self.get(path)? {
            Node::Leaf(leaf) => Some(leaf),
            Node::Block(_) => None,
        }
    }

    fn push_node(&mut self, node: Node) -> NodeId {
        self.nodes.push(node);
        NodeId(self.nodes.len() - 1)
    }

    fn block_mut(&mut self, id: NodeId) -> &mut Block {
        match &mut self.nodes[id.0] {
            Node::Block(b) => b,
            Node::Leaf(_) => unreachable!("only blocks are ever opened as parents"),
        }
    }

    /// Opens `name` under `parent`, reusing a block of that name if one exists.
    fn open_block(&mut self, parent: NodeId, name: &str) -> NodeId {
        if let Some(existing) = self.block_mut(parent).child(name) {
            if let Node::Block(_) = self.node(existing) {
                return existing;
            }
            debug!(name, "block replaces a leaf of the same name");
        }
        let id = self.push_node(Node::Block(Block::default()));
        self.block_mut(parent).children.insert(name.to_owned(), id);
        id
    }

    /// Stores a value under `parent`, folding repeats of the same bare name.
    fn push_leaf(&mut self, parent: NodeId, name: &str, value: TypedValue) {
        if let Some(existing) = self.block_mut(parent).child(name) {
            if let Node::Leaf(leaf) = &mut self.nodes[existing.0] {
                leaf.push(value);
                return;
            }
            debug!(name, "leaf replaces a block of the same name");
        }
        let id = self.push_node(Node::Leaf(Leaf::new(value)));
        self.block_mut(parent).children.insert(name.to_owned(), id);
    }
}

pub struct HierarchyBuilder {
    policy: IndentPolicy,
}

impl HierarchyBuilder {
    pub fn new(policy: IndentPolicy) -> Self {
        Self { policy }
    }

    /// Rebuilds the nested groups of an indented dump.
    ///
    /// `slots[d]` is the block that an entry at depth `d` attaches to; a block
    /// opened by a depth-`d` entry occupies `slots[d + 1]`. Depth 0 always
    /// opens a top-level block. Deeper `Null` entries open a block under the
    /// deepest open slot at or above their depth, any other value becomes a
    /// leaf there. Leaves never close a block, so a depth-2 entry always lands
    /// in the block opened by the latest depth-1 `Null` entry.
    pub fn build(&self, tokens: &[IngestedToken]) -> StatTree {
        let mut tree = StatTree::new();
        let mut slots: Vec<Option<NodeId>> = vec![Some(ROOT)];
        let mut ignored: usize = 0;

        for token in tokens {
            let Some(depth) = self.policy.depth(token.indent) else {
                ignored += 1;
                debug!(key = %token.key, line = token.line, indent = token.indent, "ignoring entry at unsupported depth");
                continue;
            };
            let name = token.key.bare();

            if depth == 0 {
                slots.truncate(1);
                let id = tree.open_block(ROOT, name);
                slots.push(Some(id));
                continue;
            }

            let parent = slots[..=depth.min(slots.len() - 1)]
                .iter()
                .rev()
                .find_map(|slot| *slot)
                .unwrap_or(ROOT);

            match token.value {
                TypedValue::Null => {
                    if let Some(Some(previous)) = slots.get(depth + 1) {
                        if tree.block(*previous).is_some_and(Block::is_empty) {
                            debug!(key = %token.key, line = token.line, "replacing an open block that received no entries");
                        }
                    }
                    let id = tree.open_block(parent, name);
                    slots.truncate(depth + 1);
                    slots.resize(depth + 1, None);
                    slots.push(Some(id));
                }
                ref value => tree.push_leaf(parent, name, value.clone()),
            }
        }

        if ignored > 0 {
            debug!(ignored, "entries skipped while rebuilding the hierarchy");
        }
        tree
    }
}
