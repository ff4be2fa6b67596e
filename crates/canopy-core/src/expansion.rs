//! Name-keyed expansion state.
//!
//! Visibility is never stored per node: every render re-derives each node's slot from
//! membership of its `name` in the tracked set. Keys are names, not identities, so the state
//! survives data reloads (which allocate fresh identities) and two nodes sharing a name
//! share one flag.

use crate::tree::{ChildSlots, NodeIndex, RenderTree};
use indexmap::IndexSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToggleOutcome {
    Expanded,
    Collapsed,
    /// Leaves and empty branches have nothing to show or hide.
    Unchanged,
}

#[derive(Debug, Clone, Default)]
pub struct ExpansionTracker {
    expanded: IndexSet<String>,
    snapshot: Option<IndexSet<String>>,
}

impl ExpansionTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.expanded.is_empty()
    }

    pub fn len(&self) -> usize {
        self.expanded.len()
    }

    pub fn is_expanded(&self, name: &str) -> bool {
        self.expanded.contains(name)
    }

    /// Tracked names in the order they were first expanded.
    pub fn expanded_names(&self) -> impl Iterator<Item = &str> {
        self.expanded.iter().map(String::as_str)
    }

    /// Seeds the root as expanded when nothing is tracked yet. Returns whether it seeded.
    pub fn seed_root(&mut self, tree: &RenderTree) -> bool {
        if !self.expanded.is_empty() {
            return false;
        }
        self.expanded.insert(tree.node(tree.root()).name.clone());
        true
    }

    /// Re-derives every reachable node's slot from the tracked set.
    ///
    /// Collapsed subtrees are not descended into; their descendants keep whatever slot they
    /// had until an ancestor is expanded again.
    pub fn apply(&self, tree: &mut RenderTree) {
        self.apply_from(tree, tree.root());
    }

    fn apply_from(&self, tree: &mut RenderTree, start: NodeIndex) {
        let mut stack = vec![start];
        while let Some(idx) = stack.pop() {
            let node = tree.node_mut(idx);
            if !node.has_descendants() {
                continue;
            }
            if self.expanded.contains(&node.name) {
                node.slots.show();
                stack.extend(node.slots.visible().iter().copied());
            } else {
                node.slots.hide();
            }
        }
    }

    /// Flips one node between expanded and collapsed.
    ///
    /// Collapsing touches only that node. Expanding reveals exactly one level: each newly
    /// shown child is re-derived from the tracked set, so it stays collapsed unless its own
    /// name was already expanded.
    pub fn toggle(&mut self, tree: &mut RenderTree, idx: NodeIndex) -> ToggleOutcome {
        let node = tree.node(idx);
        let name = node.name.clone();
        let outcome = match &node.slots {
            ChildSlots::Empty => ToggleOutcome::Unchanged,
            ChildSlots::Visible(_) => {
                self.expanded.shift_remove(&name);
                tree.node_mut(idx).slots.hide();
                ToggleOutcome::Collapsed
            }
            ChildSlots::Shadow(children) => {
                let children = children.clone();
                self.expanded.insert(name.clone());
                tree.node_mut(idx).slots.show();
                for child in children {
                    self.apply_from(tree, child);
                }
                ToggleOutcome::Expanded
            }
        };
        tracing::trace!(name = %name, ?outcome, "toggled node");
        outcome
    }

    /// Marks `name` expanded without touching any tree; takes effect on the next `apply`.
    pub fn expand_name(&mut self, name: &str) -> bool {
        self.expanded.insert(name.to_string())
    }

    pub fn collapse_name(&mut self, name: &str) -> bool {
        self.expanded.shift_remove(name)
    }

    /// Adds every name; returns how many were not tracked before.
    pub fn reveal<I, S>(&mut self, names: I) -> usize
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut added = 0;
        for name in names {
            if self.expanded.insert(name.into()) {
                added += 1;
            }
        }
        added
    }

    /// Re-derives the tracked set from a tree's current visible shape.
    pub fn record_visible(&mut self, tree: &RenderTree) {
        let mut stack = vec![tree.root()];
        while let Some(idx) = stack.pop() {
            let node = tree.node(idx);
            match &node.slots {
                ChildSlots::Visible(children) => {
                    self.expanded.insert(node.name.clone());
                    stack.extend(children.iter().copied());
                }
                ChildSlots::Shadow(_) => {
                    self.expanded.shift_remove(&node.name);
                }
                ChildSlots::Empty => {}
            }
        }
    }

    pub fn clear(&mut self) {
        self.expanded.clear();
    }

    /// Clears the tracked set and seeds `root_name` as the only expanded node.
    pub fn reset(&mut self, root_name: &str) {
        self.expanded.clear();
        self.expanded.insert(root_name.to_string());
    }

    /// Copies the tracked set aside, replacing any earlier snapshot.
    pub fn save_snapshot(&mut self) {
        self.snapshot = Some(self.expanded.clone());
    }

    /// Restores the saved copy; the snapshot itself is kept. Returns false if none was saved.
    pub fn restore_snapshot(&mut self) -> bool {
        match &self.snapshot {
            Some(saved) => {
                self.expanded = saved.clone();
                true
            }
            None => false,
        }
    }

    pub fn has_snapshot(&self) -> bool {
        self.snapshot.is_some()
    }

    pub fn clear_snapshot(&mut self) {
        self.snapshot = None;
    }
}
