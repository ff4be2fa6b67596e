use crate::geom::point;
use crate::taxonomy::{DomainNode, NodeKind};
use crate::tree::{ChildSlots, NodeIndex, RenderNode, RenderTree};

/// Whether identities keep counting across data loads.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum IdentityScope {
    /// One counter for the renderer's lifetime; a reload never reuses an identity.
    #[default]
    Instance,
    /// The counter rewinds on every load, so a structurally identical reload reproduces the
    /// same identities (and therefore the same diff keys).
    Generation,
}

impl IdentityScope {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "instance" => Some(Self::Instance),
            "generation" => Some(Self::Generation),
            _ => None,
        }
    }
}

/// Converts domain trees into render trees with sequential identities.
#[derive(Debug, Clone, Default)]
pub struct IdentityAssigner {
    scope: IdentityScope,
    last: u64,
}

impl IdentityAssigner {
    pub fn new(scope: IdentityScope) -> Self {
        Self { scope, last: 0 }
    }

    pub fn scope(&self) -> IdentityScope {
        self.scope
    }

    /// The most recently allocated identity (0 before the first load).
    pub fn last_identity(&self) -> u64 {
        self.last
    }

    /// Depth-first, pre-order conversion. Branch children start collapsed.
    pub fn assign(&mut self, domain: &DomainNode) -> RenderTree {
        if self.scope == IdentityScope::Generation {
            self.last = 0;
        }
        let first = self.last + 1;

        let mut nodes: Vec<RenderNode> = Vec::new();
        let mut stack: Vec<(&DomainNode, Option<NodeIndex>, usize)> = vec![(domain, None, 0)];
        while let Some((src, parent, depth)) = stack.pop() {
            let idx = NodeIndex(nodes.len());
            self.last += 1;
            nodes.push(RenderNode {
                identity: self.last,
                name: src.name.clone(),
                kind: src.kind,
                url: src.url.clone(),
                highlighted: src.highlighted,
                depth,
                parent,
                slots: if src.kind == NodeKind::Branch && !src.children.is_empty() {
                    ChildSlots::Shadow(Vec::with_capacity(src.children.len()))
                } else {
                    ChildSlots::Empty
                },
                position: point(0.0, 0.0),
                previous_position: None,
            });
            if let Some(p) = parent {
                if let ChildSlots::Shadow(list) = &mut nodes[p.0].slots {
                    list.push(idx);
                }
            }
            stack.extend(
                src.children
                    .iter()
                    .rev()
                    .map(|child| (child, Some(idx), depth + 1)),
            );
        }

        tracing::debug!(
            nodes = nodes.len(),
            first_identity = first,
            last_identity = self.last,
            "assigned render identities"
        );
        RenderTree::from_nodes(nodes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> DomainNode {
        DomainNode::branch(
            "root",
            vec![
                DomainNode::branch("A", vec![DomainNode::leaf("tool1", Some("https://x"))]),
                DomainNode::leaf("tool2", None),
                DomainNode::branch("Empty", Vec::new()),
            ],
        )
    }

    #[test]
    fn identities_follow_preorder() {
        let mut assigner = IdentityAssigner::default();
        let tree = assigner.assign(&sample());
        let order: Vec<(&str, u64)> = tree
            .nodes()
            .map(|(_, n)| (n.name.as_str(), n.identity))
            .collect();
        assert_eq!(
            order,
            vec![("root", 1), ("A", 2), ("tool1", 3), ("tool2", 4), ("Empty", 5)]
        );
    }

    #[test]
    fn branch_children_start_in_shadow_slot() {
        let mut assigner = IdentityAssigner::default();
        let tree = assigner.assign(&sample());
        let root = tree.root();
        assert_eq!(tree.shadow_children(root).len(), 3);
        assert!(tree.visible_children(root).is_empty());

        let a = tree.find_by_name("A").next().unwrap();
        assert_eq!(tree.node(a).depth, 1);
        assert_eq!(tree.node(a).parent, Some(root));

        let empty = tree.find_by_name("Empty").next().unwrap();
        assert_eq!(tree.node(empty).slots, ChildSlots::Empty);
        let leaf = tree.find_by_name("tool1").next().unwrap();
        assert_eq!(tree.node(leaf).slots, ChildSlots::Empty);
    }

    #[test]
    fn instance_scope_never_reuses_identities() {
        let mut assigner = IdentityAssigner::new(IdentityScope::Instance);
        let first = assigner.assign(&sample());
        let second = assigner.assign(&sample());
        assert_eq!(first.node(first.root()).identity, 1);
        assert_eq!(second.node(second.root()).identity, 6);
        assert_eq!(assigner.last_identity(), 10);
    }

    #[test]
    fn generation_scope_reproduces_identities() {
        let mut assigner = IdentityAssigner::new(IdentityScope::Generation);
        let first = assigner.assign(&sample());
        let second = assigner.assign(&sample());
        let a: Vec<u64> = first.nodes().map(|(_, n)| n.identity).collect();
        let b: Vec<u64> = second.nodes().map(|(_, n)| n.identity).collect();
        assert_eq!(a, b);
    }

    #[test]
    fn round_trips_back_to_the_domain_tree() {
        let mut assigner = IdentityAssigner::default();
        let tree = assigner.assign(&sample());
        assert_eq!(tree.to_domain(), sample());
    }

    #[test]
    fn lookup_by_identity_uses_arena_order() {
        let mut assigner = IdentityAssigner::default();
        let _ = assigner.assign(&sample());
        let tree = assigner.assign(&sample());
        let idx = tree.find_by_identity(8).unwrap();
        assert_eq!(tree.node(idx).name, "tool1");
        assert_eq!(tree.find_by_identity(3), None);
    }
}
