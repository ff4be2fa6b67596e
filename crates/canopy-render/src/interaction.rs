//! Click routing: which node a pointer lands on and what activating it means.

use crate::scene::Scene;
use crate::theme::TextAnchor;
use crate::{Error, Result};
use canopy_core::RenderTree;
use canopy_core::geom::Point;

/// Extra pixels around a circle that still count as a hit.
const CIRCLE_SLOP: f64 = 4.0;
/// Rough advance of one label character, in `em`.
const GLYPH_WIDTH_EM: f64 = 0.6;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Dispatch {
    /// Branch with children: expand or collapse it.
    Toggle { identity: u64 },
    /// Leaf: hand its target to the host.
    Activate {
        identity: u64,
        name: String,
        url: Option<String>,
    },
    /// Branch without children.
    Ignored,
}

pub fn dispatch(tree: &RenderTree, identity: u64) -> Result<Dispatch> {
    let idx = tree
        .find_by_identity(identity)
        .ok_or(Error::UnknownNode { identity })?;
    let node = tree.node(idx);
    Ok(if node.is_leaf() {
        Dispatch::Activate {
            identity,
            name: node.name.clone(),
            url: node.url.clone(),
        }
    } else if node.has_descendants() {
        Dispatch::Toggle { identity }
    } else {
        Dispatch::Ignored
    })
}

/// Finds the topmost node whose circle or label covers `pointer` (canvas pixels).
pub fn hit_test(scene: &Scene, pointer: Point) -> Option<u64> {
    let px = pointer.x - scene.translate.x;
    let py = pointer.y - scene.translate.y;
    scene.nodes.iter().rev().find_map(|node| {
        // Screen x is layout depth.
        let dx = px - node.position.y;
        let dy = py - node.position.x;
        if dx.hypot(dy) <= node.paint.radius + CIRCLE_SLOP {
            return Some(node.identity);
        }

        let label = &node.label;
        let font_px = label.font_size_em * scene.font_size;
        let width = node.name.chars().count() as f64 * font_px * GLYPH_WIDTH_EM;
        let (left, right) = match label.anchor {
            TextAnchor::Start => (label.offset, label.offset + width),
            TextAnchor::End => (label.offset - width, label.offset),
        };
        let inside = dx >= left && dx <= right && dy.abs() <= font_px / 2.0;
        inside.then_some(node.identity)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::compute_layout;
    use crate::scene::build_scene;
    use crate::settings::RenderSettings;
    use crate::theme::Theme;
    use canopy_core::geom::point;
    use canopy_core::{DomainNode, ExpansionTracker, IdentityAssigner};

    fn fixture() -> (RenderTree, Scene) {
        let domain = DomainNode::branch(
            "root",
            vec![
                DomainNode::branch("A", vec![DomainNode::leaf("tool1", Some("https://x"))]),
                DomainNode::leaf("tool2", Some("https://y")),
                DomainNode::branch("Empty", Vec::new()),
            ],
        );
        let mut tree = IdentityAssigner::default().assign(&domain);
        let mut tracker = ExpansionTracker::new();
        tracker.seed_root(&tree);
        tracker.apply(&mut tree);
        let settings = RenderSettings::default();
        let layout = compute_layout(&mut tree, &settings, 1200.0, None);
        let scene = build_scene(&tree, &layout, Theme::Light, &settings.metrics(layout.profile));
        (tree, scene)
    }

    #[test]
    fn dispatch_routes_by_node_shape() {
        let (tree, _) = fixture();
        assert_eq!(dispatch(&tree, 2).unwrap(), Dispatch::Toggle { identity: 2 });
        assert_eq!(
            dispatch(&tree, 4).unwrap(),
            Dispatch::Activate {
                identity: 4,
                name: "tool2".into(),
                url: Some("https://y".into())
            }
        );
        assert_eq!(dispatch(&tree, 5).unwrap(), Dispatch::Ignored);
        assert!(matches!(
            dispatch(&tree, 99),
            Err(Error::UnknownNode { identity: 99 })
        ));
    }

    #[test]
    fn hit_test_finds_circles_and_labels() {
        let (_, scene) = fixture();
        let tool2 = scene.node(4).unwrap();
        let centre = point(
            tool2.position.y + scene.translate.x,
            tool2.position.x + scene.translate.y,
        );
        assert_eq!(hit_test(&scene, centre), Some(4));

        // Leaf labels extend to the right of the circle.
        let on_label = point(centre.x + tool2.label.offset + 10.0, centre.y);
        assert_eq!(hit_test(&scene, on_label), Some(4));

        assert_eq!(hit_test(&scene, point(-1000.0, -1000.0)), None);
    }
}
