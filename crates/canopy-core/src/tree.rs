//! The mutable render tree.
//!
//! Nodes live in an arena owned by [`RenderTree`]; ownership flows parent-to-child through
//! [`ChildSlots`] and the `parent` back-reference is only used for lookups.

use crate::geom::Point;
use crate::taxonomy::{DomainNode, NodeKind};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct NodeIndex(pub usize);

/// Visibility state of a node's children.
///
/// A branch with descendants is either `Visible` (expanded) or `Shadow` (collapsed, data
/// kept aside); leaves and empty branches are `Empty`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ChildSlots {
    #[default]
    Empty,
    Visible(Vec<NodeIndex>),
    Shadow(Vec<NodeIndex>),
}

impl ChildSlots {
    /// The complete child set regardless of visibility.
    pub fn all(&self) -> &[NodeIndex] {
        match self {
            ChildSlots::Empty => &[],
            ChildSlots::Visible(c) | ChildSlots::Shadow(c) => c,
        }
    }

    pub fn visible(&self) -> &[NodeIndex] {
        match self {
            ChildSlots::Visible(c) => c,
            _ => &[],
        }
    }

    pub fn shadow(&self) -> &[NodeIndex] {
        match self {
            ChildSlots::Shadow(c) => c,
            _ => &[],
        }
    }

    pub fn is_visible(&self) -> bool {
        matches!(self, ChildSlots::Visible(_))
    }

    pub fn is_shadow(&self) -> bool {
        matches!(self, ChildSlots::Shadow(_))
    }

    /// Moves the child list into the visible slot. No-op for `Empty`.
    pub fn show(&mut self) {
        if let ChildSlots::Shadow(c) = self {
            *self = ChildSlots::Visible(std::mem::take(c));
        }
    }

    /// Moves the child list into the shadow slot. No-op for `Empty`.
    pub fn hide(&mut self) {
        if let ChildSlots::Visible(c) = self {
            *self = ChildSlots::Shadow(std::mem::take(c));
        }
    }
}

#[derive(Debug, Clone)]
pub struct RenderNode {
    /// Reconciliation key, unique among live nodes of one renderer.
    pub identity: u64,
    pub name: String,
    pub kind: NodeKind,
    pub url: Option<String>,
    pub highlighted: bool,
    pub depth: usize,
    pub parent: Option<NodeIndex>,
    pub slots: ChildSlots,
    /// Position from the most recent layout (breadth `x`, depth `y`).
    pub position: Point,
    /// Last committed position, the animation origin for the next render.
    pub previous_position: Option<Point>,
}

impl RenderNode {
    pub fn is_leaf(&self) -> bool {
        self.kind == NodeKind::Leaf
    }

    pub fn has_descendants(&self) -> bool {
        !self.slots.all().is_empty()
    }

    /// Expanded means "children currently shown".
    pub fn is_expanded(&self) -> bool {
        self.slots.is_visible()
    }

    pub fn is_collapsed(&self) -> bool {
        self.slots.is_shadow()
    }
}

#[derive(Debug, Clone)]
pub struct RenderTree {
    nodes: Vec<RenderNode>,
}

impl RenderTree {
    /// Builds a tree from pre-order nodes; `nodes[0]` is the root.
    pub(crate) fn from_nodes(nodes: Vec<RenderNode>) -> Self {
        debug_assert!(!nodes.is_empty());
        Self { nodes }
    }

    pub fn root(&self) -> NodeIndex {
        NodeIndex(0)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Always false: a render tree is created from a root node.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn node(&self, idx: NodeIndex) -> &RenderNode {
        &self.nodes[idx.0]
    }

    pub fn node_mut(&mut self, idx: NodeIndex) -> &mut RenderNode {
        &mut self.nodes[idx.0]
    }

    pub fn get(&self, idx: NodeIndex) -> Option<&RenderNode> {
        self.nodes.get(idx.0)
    }

    pub fn nodes(&self) -> impl Iterator<Item = (NodeIndex, &RenderNode)> {
        self.nodes.iter().enumerate().map(|(i, n)| (NodeIndex(i), n))
    }

    pub fn visible_children(&self, idx: NodeIndex) -> &[NodeIndex] {
        self.node(idx).slots.visible()
    }

    pub fn shadow_children(&self, idx: NodeIndex) -> &[NodeIndex] {
        self.node(idx).slots.shadow()
    }

    pub fn all_children(&self, idx: NodeIndex) -> &[NodeIndex] {
        self.node(idx).slots.all()
    }

    pub fn find_by_identity(&self, identity: u64) -> Option<NodeIndex> {
        // Identities are assigned in pre-order, so arena order is identity order.
        self.nodes
            .binary_search_by_key(&identity, |n| n.identity)
            .ok()
            .map(NodeIndex)
    }

    /// Every node carrying `name`; names are not unique.
    pub fn find_by_name<'a>(&'a self, name: &'a str) -> impl Iterator<Item = NodeIndex> + 'a {
        self.nodes()
            .filter(move |(_, n)| n.name == name)
            .map(|(idx, _)| idx)
    }

    /// Currently visible nodes in pre-order (shadow children are skipped).
    pub fn visible_preorder(&self) -> Vec<NodeIndex> {
        let mut out = Vec::new();
        let mut stack = vec![self.root()];
        while let Some(idx) = stack.pop() {
            out.push(idx);
            stack.extend(self.visible_children(idx).iter().rev().copied());
        }
        out
    }

    /// Recovers the complete domain tree, including collapsed subtrees.
    pub fn to_domain(&self) -> DomainNode {
        let shell = |idx: NodeIndex| {
            let node = self.node(idx);
            DomainNode {
                name: node.name.clone(),
                kind: node.kind,
                url: node.url.clone(),
                highlighted: node.highlighted,
                children: Vec::with_capacity(self.all_children(idx).len()),
            }
        };

        // Pre-order below the root; `None` parents are the root itself.
        let mut built: Vec<(DomainNode, Option<usize>)> = Vec::new();
        let mut stack: Vec<(NodeIndex, Option<usize>)> = self
            .all_children(self.root())
            .iter()
            .rev()
            .map(|&c| (c, None))
            .collect();
        while let Some((idx, parent)) = stack.pop() {
            let at = built.len();
            built.push((shell(idx), parent));
            stack.extend(self.all_children(idx).iter().rev().map(|&c| (c, Some(at))));
        }

        let mut root = shell(self.root());
        while let Some((mut node, parent)) = built.pop() {
            node.children.reverse();
            match parent {
                Some(p) => built[p].0.children.push(node),
                None => root.children.push(node),
            }
        }
        root.children.reverse();
        root
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn show_and_hide_move_the_same_list() {
        let mut slots = ChildSlots::Shadow(vec![NodeIndex(1), NodeIndex(2)]);
        slots.show();
        assert_eq!(slots.visible(), &[NodeIndex(1), NodeIndex(2)]);
        assert!(slots.shadow().is_empty());
        slots.hide();
        assert_eq!(slots.shadow(), &[NodeIndex(1), NodeIndex(2)]);
        assert!(slots.visible().is_empty());
    }

    #[test]
    fn empty_slots_stay_empty() {
        let mut slots = ChildSlots::Empty;
        slots.show();
        assert_eq!(slots, ChildSlots::Empty);
        slots.hide();
        assert_eq!(slots, ChildSlots::Empty);
    }
}
