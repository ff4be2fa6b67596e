//! Horizontal tidy-tree layout for the visible part of a [`RenderTree`].

use crate::model::{Bounds, Canvas, LinkGeometry, PositionedNode, TreeLayout};
use crate::settings::{ProfileMetrics, RenderSettings, ViewportProfile};
use canopy_core::RenderTree;
use canopy_core::geom::point;
use sapling::{Hierarchy, TidyTree};

/// Shrinks depth spacing for deep trees, never below 40% of the base spacing.
pub fn depth_spacing(base: f64, max_depth: usize) -> f64 {
    let factor = (1.0 / (max_depth as f64 * 0.3).max(1.0)).max(0.4);
    base * factor
}

/// Lays out every visible node and writes the result into each node's `position`.
///
/// `container_width` is what the surface reports; desktop canvases fill it, mobile canvases
/// size themselves to the content.
pub fn compute_layout(
    tree: &mut RenderTree,
    settings: &RenderSettings,
    viewport_width: f64,
    container_width: Option<f64>,
) -> TreeLayout {
    let metrics = settings.metrics_for_width(viewport_width);

    let visible = tree.visible_preorder();
    let mut slot_of: Vec<Option<usize>> = vec![None; tree.len()];
    let mut hierarchy = Hierarchy::with_capacity(visible.len());
    for &idx in &visible {
        let slot = match tree.node(idx).parent.and_then(|p| slot_of[p.0]) {
            Some(parent_slot) => hierarchy.add_child(parent_slot),
            None => hierarchy.root(),
        };
        slot_of[idx.0] = Some(slot);
    }

    let max_depth = hierarchy.max_depth();
    let spacing = depth_spacing(metrics.base_depth_spacing, max_depth);
    let placements = TidyTree::node_size(metrics.breadth_spacing, 1.0).layout(&hierarchy);

    for (&idx, placement) in visible.iter().zip(&placements) {
        tree.node_mut(idx).position = point(placement.x, placement.depth as f64 * spacing);
    }

    let mut nodes = Vec::with_capacity(visible.len());
    let mut links = Vec::with_capacity(visible.len().saturating_sub(1));
    for &idx in &visible {
        let node = tree.node(idx);
        let parent = node.parent.map(|p| tree.node(p));
        nodes.push(PositionedNode {
            index: idx,
            identity: node.identity,
            parent_identity: parent.map(|p| p.identity),
            depth: node.depth,
            position: node.position,
        });
        if let Some(parent) = parent {
            links.push(LinkGeometry {
                identity: node.identity,
                parent_identity: parent.identity,
                depth: node.depth,
                source: parent.position,
                target: node.position,
            });
        }
    }

    let raw = Bounds::from_points(nodes.iter().map(|n| (n.position.x, n.position.y)))
        .unwrap_or(Bounds {
            min_x: 0.0,
            min_y: 0.0,
            max_x: 0.0,
            max_y: 0.0,
        });
    let (bounds, degenerate) = with_fallback_extents(raw, &metrics);
    if degenerate {
        tracing::debug!(
            nodes = nodes.len(),
            "flat layout extent, using fallback extents"
        );
    }

    let canvas = canvas_for(&bounds, &metrics, settings, container_width);
    let margins = metrics.margins;
    let translate = point(margins.left - bounds.min_y, margins.top - bounds.min_x);

    tracing::debug!(
        profile = ?metrics.profile,
        nodes = nodes.len(),
        max_depth,
        depth_spacing = spacing,
        width = canvas.width,
        height = canvas.height,
        "computed tree layout"
    );

    TreeLayout {
        profile: metrics.profile,
        nodes,
        links,
        bounds,
        canvas,
        margins,
        translate,
        depth_spacing: spacing,
        max_depth,
        degenerate,
    }
}

fn with_fallback_extents(mut b: Bounds, metrics: &ProfileMetrics) -> (Bounds, bool) {
    let mut degenerate = false;
    if b.breadth_extent() <= 0.0 {
        b.max_x = b.min_x + metrics.fallback_breadth_extent;
        degenerate = true;
    }
    if b.depth_extent() <= 0.0 {
        b.max_y = b.min_y + metrics.fallback_depth_extent;
        degenerate = true;
    }
    (b, degenerate)
}

fn canvas_for(
    bounds: &Bounds,
    metrics: &ProfileMetrics,
    settings: &RenderSettings,
    container_width: Option<f64>,
) -> Canvas {
    let m = metrics.margins;
    let content_width = bounds.depth_extent();
    let content_height = bounds.breadth_extent();

    let width = match metrics.profile {
        ViewportProfile::Mobile => content_width + m.left + m.right,
        ViewportProfile::Desktop => container_width
            .filter(|w| w.is_finite() && *w > 0.0)
            .unwrap_or(settings.container_width),
    }
    .max(metrics.min_canvas_width);
    let height = content_height.max(metrics.min_content_height) + m.top + m.bottom;

    Canvas {
        width,
        height,
        max_height: metrics.max_height,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use canopy_core::{DomainNode, ExpansionTracker, IdentityAssigner, NodeIndex};

    fn expanded(domain: &DomainNode) -> RenderTree {
        let mut tree = IdentityAssigner::default().assign(domain);
        let mut tracker = ExpansionTracker::new();
        for (_, n) in tree.nodes() {
            tracker.expand_name(&n.name);
        }
        tracker.apply(&mut tree);
        tree
    }

    #[test]
    fn depth_spacing_shrinks_for_deep_trees() {
        assert_eq!(depth_spacing(288.0, 0), 288.0);
        assert_eq!(depth_spacing(288.0, 3), 288.0);
        assert!((depth_spacing(288.0, 5) - 288.0 / 1.5).abs() < 1e-9);
        assert!((depth_spacing(288.0, 20) - 288.0 * 0.4).abs() < 1e-9);
    }

    #[test]
    fn single_node_uses_fallback_extents() {
        let mut tree = expanded(&DomainNode::leaf("only", None));
        let layout = compute_layout(&mut tree, &RenderSettings::default(), 1200.0, None);
        assert!(layout.degenerate);
        assert_eq!(layout.bounds.breadth_extent(), 36.0 * 16.0);
        assert_eq!(layout.bounds.depth_extent(), 54.0 * 16.0);
        assert!(layout.canvas.width > 0.0 && layout.canvas.height > 0.0);
    }

    #[test]
    fn children_sit_one_depth_step_right_of_their_parent() {
        let mut tree = expanded(&DomainNode::branch(
            "root",
            vec![DomainNode::leaf("a", None), DomainNode::leaf("b", None)],
        ));
        let layout = compute_layout(&mut tree, &RenderSettings::default(), 1200.0, None);
        let root = tree.node(tree.root()).position;
        let a = tree.node(NodeIndex(1)).position;
        let b = tree.node(NodeIndex(2)).position;
        assert_eq!(root.y, 0.0);
        assert_eq!(a.y, 288.0);
        assert_eq!(b.y, 288.0);
        assert_eq!(b.x - a.x, 40.0);
        assert_eq!(layout.links.len(), 2);
        assert_eq!(layout.links[0].source, root);
    }

    #[test]
    fn mobile_canvas_grows_with_content_and_has_no_height_cap() {
        let mut tree = expanded(&DomainNode::branch(
            "root",
            vec![DomainNode::branch("a", vec![DomainNode::leaf("x", None)])],
        ));
        let layout = compute_layout(&mut tree, &RenderSettings::default(), 400.0, Some(400.0));
        assert_eq!(layout.profile, ViewportProfile::Mobile);
        assert_eq!(layout.canvas.max_height, None);
        let content = layout.bounds.depth_extent();
        assert_eq!(layout.canvas.width, content + 16.0 * 16.0);
    }

    #[test]
    fn desktop_canvas_fills_the_container() {
        let mut tree = expanded(&DomainNode::branch(
            "root",
            vec![DomainNode::leaf("a", None), DomainNode::leaf("b", None)],
        ));
        let layout = compute_layout(&mut tree, &RenderSettings::default(), 1600.0, Some(1500.0));
        assert_eq!(layout.canvas.width, 1500.0);
        let narrow = compute_layout(&mut tree, &RenderSettings::default(), 1600.0, Some(100.0));
        assert_eq!(narrow.canvas.width, 32.0 * 16.0);
    }

    #[test]
    fn translate_places_the_top_left_node_at_the_margins() {
        let mut tree = expanded(&DomainNode::branch(
            "root",
            vec![DomainNode::leaf("a", None), DomainNode::leaf("b", None)],
        ));
        let layout = compute_layout(&mut tree, &RenderSettings::default(), 1200.0, None);
        let a = tree.node(NodeIndex(1)).position;
        let screen = layout.to_screen(a);
        assert_eq!(screen.y, layout.margins.top);
        let root = layout.to_screen(tree.node(tree.root()).position);
        assert_eq!(root.x, layout.margins.left);
    }
}
