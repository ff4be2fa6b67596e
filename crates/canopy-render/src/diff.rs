//! Identity-keyed reconciliation between consecutive scenes.
//!
//! Nodes and links are matched by identity (links by their child's identity). Each render
//! yields one [`Transition`]: entering elements grow out of the source node's previous
//! position, updated elements move from their last committed position, and exiting
//! elements shrink into the source node's new position. Only one transition is live at a
//! time; reconciling again replaces it, so nothing accumulates across rapid renders.
//! Exits still in flight are carried over from where they are drawn: they keep shrinking
//! toward the new source, or turn back into updates if they reappear.

use crate::animation::{self, EasingFn, Frame, FrameLink, FrameNode, VANISH};
use crate::model::Canvas;
use crate::scene::{Scene, SceneLink, SceneNode};
use crate::theme::Theme;
use canopy_core::geom::Point;
use rustc_hash::FxHashMap;
use serde::Serialize;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Enter,
    Update,
    Exit,
}

/// The node whose interaction triggered a render.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SourceAnchor {
    pub identity: u64,
    /// Where the source was drawn before this render; entering elements start here.
    pub previous: Point,
    /// Where the source is drawn after this render; exiting elements end here.
    pub current: Point,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NodeMotion {
    pub phase: Phase,
    pub node: SceneNode,
    pub from: Point,
    pub to: Point,
    pub from_radius: f64,
    pub to_radius: f64,
    pub from_opacity: f64,
    pub to_opacity: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LinkMotion {
    pub phase: Phase,
    pub link: SceneLink,
    pub from: (Point, Point),
    pub to: (Point, Point),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DiffStats {
    pub entered: usize,
    pub updated: usize,
    pub exited: usize,
    pub links_entered: usize,
    pub links_updated: usize,
    pub links_exited: usize,
}

#[derive(Debug, Clone)]
pub struct Transition {
    duration: Duration,
    easing: EasingFn,
    anchor: SourceAnchor,
    theme: Theme,
    canvas: Canvas,
    translate: Point,
    font_size: f64,
    nodes: Vec<NodeMotion>,
    links: Vec<LinkMotion>,
    stats: DiffStats,
}

impl Transition {
    pub fn duration(&self) -> Duration {
        self.duration
    }

    pub fn anchor(&self) -> SourceAnchor {
        self.anchor
    }

    pub fn stats(&self) -> DiffStats {
        self.stats
    }

    pub fn nodes(&self) -> &[NodeMotion] {
        &self.nodes
    }

    pub fn links(&self) -> &[LinkMotion] {
        &self.links
    }

    pub fn node_motion(&self, identity: u64) -> Option<&NodeMotion> {
        self.nodes.iter().find(|m| m.node.identity == identity)
    }

    pub fn link_motion(&self, identity: u64) -> Option<&LinkMotion> {
        self.links.iter().find(|m| m.link.identity == identity)
    }

    /// Interpolated view at `elapsed`. Once complete, exiting elements are gone.
    pub fn frame_at(&self, elapsed: Duration) -> Frame<'_> {
        let linear = animation::progress(elapsed, self.duration);
        let complete = linear >= 1.0;
        let t = if complete { 1.0 } else { (self.easing)(linear) };

        let links = self
            .links
            .iter()
            .filter(|m| !(complete && m.phase == Phase::Exit))
            .map(|m| FrameLink {
                link: &m.link,
                phase: m.phase,
                source: animation::lerp_point(m.from.0, m.to.0, t),
                target: animation::lerp_point(m.from.1, m.to.1, t),
            })
            .collect();
        let nodes = self
            .nodes
            .iter()
            .filter(|m| !(complete && m.phase == Phase::Exit))
            .map(|m| FrameNode {
                node: &m.node,
                phase: m.phase,
                position: animation::lerp_point(m.from, m.to, t),
                radius: animation::lerp(m.from_radius, m.to_radius, t),
                opacity: animation::lerp(m.from_opacity, m.to_opacity, t),
            })
            .collect();

        Frame {
            theme: self.theme,
            canvas: self.canvas,
            translate: self.translate,
            font_size: self.font_size,
            progress: t,
            links,
            nodes,
        }
    }

    /// The final frame: every element at rest, exits removed.
    pub fn settled(&self) -> Frame<'_> {
        self.frame_at(self.duration)
    }
}

struct ShownNode {
    node: SceneNode,
    position: Point,
    radius: f64,
    opacity: f64,
}

struct ShownLink {
    link: SceneLink,
    source: Point,
    target: Point,
}

/// Owns the single live transition and the clock driving it.
#[derive(Debug, Clone)]
pub struct DiffRenderer {
    duration: Duration,
    easing: EasingFn,
    active: Option<Transition>,
    elapsed: Duration,
}

impl DiffRenderer {
    pub fn new(duration: Duration) -> Self {
        Self {
            duration,
            easing: animation::ease_cubic_in_out,
            active: None,
            elapsed: Duration::ZERO,
        }
    }

    pub fn with_easing(mut self, easing: EasingFn) -> Self {
        self.easing = easing;
        self
    }

    pub fn duration(&self) -> Duration {
        self.duration
    }

    pub fn active(&self) -> Option<&Transition> {
        self.active.as_ref()
    }

    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    pub fn is_animating(&self) -> bool {
        self.active.is_some() && self.elapsed < self.duration
    }

    /// Where `identity` comes to rest in the live transition, unless it is exiting.
    pub fn retained_position(&self, identity: u64) -> Option<Point> {
        self.active
            .as_ref()?
            .node_motion(identity)
            .filter(|m| m.phase != Phase::Exit)
            .map(|m| m.to)
    }

    /// Moves the clock forward and returns the frame to draw.
    pub fn advance(&mut self, dt: Duration) -> Option<Frame<'_>> {
        let transition = self.active.as_ref()?;
        self.elapsed = self.elapsed.saturating_add(dt).min(self.duration);
        Some(transition.frame_at(self.elapsed))
    }

    pub fn current_frame(&self) -> Option<Frame<'_>> {
        Some(self.active.as_ref()?.frame_at(self.elapsed))
    }

    /// Drops the live transition and everything it retained.
    pub fn clear(&mut self) {
        self.active = None;
        self.elapsed = Duration::ZERO;
    }

    /// What the next transition starts from: the resting state of everything the live
    /// transition keeps, plus the exits it has not finished yet, at their current frame.
    fn committed(&self) -> (Vec<ShownNode>, Vec<ShownLink>) {
        let Some(t) = self.active.as_ref() else {
            return (Vec::new(), Vec::new());
        };
        let mut nodes: Vec<ShownNode> = t
            .nodes
            .iter()
            .filter(|m| m.phase != Phase::Exit)
            .map(|m| ShownNode {
                node: m.node.clone(),
                position: m.to,
                radius: m.to_radius,
                opacity: 1.0,
            })
            .collect();
        let mut links: Vec<ShownLink> = t
            .links
            .iter()
            .filter(|m| m.phase != Phase::Exit)
            .map(|m| ShownLink {
                link: m.link.clone(),
                source: m.to.0,
                target: m.to.1,
            })
            .collect();

        if self.elapsed < t.duration {
            let frame = t.frame_at(self.elapsed);
            nodes.extend(
                frame
                    .nodes
                    .iter()
                    .filter(|n| n.phase == Phase::Exit)
                    .map(|n| ShownNode {
                        node: n.node.clone(),
                        position: n.position,
                        radius: n.radius,
                        opacity: n.opacity,
                    }),
            );
            links.extend(
                frame
                    .links
                    .iter()
                    .filter(|l| l.phase == Phase::Exit)
                    .map(|l| ShownLink {
                        link: l.link.clone(),
                        source: l.source,
                        target: l.target,
                    }),
            );
        }
        (nodes, links)
    }

    /// Diffs `scene` against the committed state and starts a new transition.
    pub fn reconcile(&mut self, scene: &Scene, anchor: SourceAnchor) -> &Transition {
        let (shown_nodes, shown_links) = self.committed();
        let mut stats = DiffStats::default();

        let mut shown_node_at: FxHashMap<u64, usize> = FxHashMap::default();
        for (i, s) in shown_nodes.iter().enumerate() {
            shown_node_at.insert(s.node.identity, i);
        }
        let mut nodes = Vec::with_capacity(scene.nodes.len());
        for node in &scene.nodes {
            let motion = match shown_node_at.remove(&node.identity) {
                Some(i) => {
                    let s = &shown_nodes[i];
                    stats.updated += 1;
                    NodeMotion {
                        phase: Phase::Update,
                        node: node.clone(),
                        from: s.position,
                        to: node.position,
                        from_radius: s.radius,
                        to_radius: node.paint.radius,
                        from_opacity: s.opacity,
                        to_opacity: 1.0,
                    }
                }
                None => {
                    stats.entered += 1;
                    NodeMotion {
                        phase: Phase::Enter,
                        node: node.clone(),
                        from: anchor.previous,
                        to: node.position,
                        from_radius: VANISH,
                        to_radius: node.paint.radius,
                        from_opacity: VANISH,
                        to_opacity: 1.0,
                    }
                }
            };
            nodes.push(motion);
        }
        for s in shown_nodes {
            if !shown_node_at.contains_key(&s.node.identity) {
                continue;
            }
            stats.exited += 1;
            nodes.push(NodeMotion {
                phase: Phase::Exit,
                from: s.position,
                to: anchor.current,
                from_radius: s.radius,
                to_radius: VANISH,
                from_opacity: s.opacity,
                to_opacity: VANISH,
                node: s.node,
            });
        }

        let mut shown_link_at: FxHashMap<u64, usize> = FxHashMap::default();
        for (i, s) in shown_links.iter().enumerate() {
            shown_link_at.insert(s.link.identity, i);
        }
        let mut links = Vec::with_capacity(scene.links.len());
        for link in &scene.links {
            let motion = match shown_link_at.remove(&link.identity) {
                Some(i) => {
                    let s = &shown_links[i];
                    stats.links_updated += 1;
                    LinkMotion {
                        phase: Phase::Update,
                        link: link.clone(),
                        from: (s.source, s.target),
                        to: (link.source, link.target),
                    }
                }
                None => {
                    stats.links_entered += 1;
                    LinkMotion {
                        phase: Phase::Enter,
                        link: link.clone(),
                        from: (anchor.previous, anchor.previous),
                        to: (link.source, link.target),
                    }
                }
            };
            links.push(motion);
        }
        for s in shown_links {
            if !shown_link_at.contains_key(&s.link.identity) {
                continue;
            }
            stats.links_exited += 1;
            links.push(LinkMotion {
                phase: Phase::Exit,
                from: (s.source, s.target),
                to: (anchor.current, anchor.current),
                link: s.link,
            });
        }

        tracing::debug!(
            source = anchor.identity,
            entered = stats.entered,
            updated = stats.updated,
            exited = stats.exited,
            "reconciled scene"
        );

        self.elapsed = Duration::ZERO;
        self.active.insert(Transition {
            duration: self.duration,
            easing: self.easing,
            anchor,
            theme: scene.theme,
            canvas: scene.canvas,
            translate: scene.translate,
            font_size: scene.font_size,
            nodes,
            links,
            stats,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::compute_layout;
    use crate::scene::build_scene;
    use crate::settings::RenderSettings;
    use canopy_core::geom::point;
    use canopy_core::{DomainNode, ExpansionTracker, IdentityAssigner, RenderTree};

    struct Fixture {
        tree: RenderTree,
        tracker: ExpansionTracker,
        settings: RenderSettings,
    }

    impl Fixture {
        fn new() -> Self {
            let domain = DomainNode::branch(
                "root",
                vec![
                    DomainNode::branch("A", vec![DomainNode::leaf("tool1", Some("https://x"))]),
                    DomainNode::leaf("tool2", None),
                ],
            );
            let mut tree = IdentityAssigner::default().assign(&domain);
            let mut tracker = ExpansionTracker::new();
            tracker.seed_root(&tree);
            tracker.apply(&mut tree);
            Self {
                tree,
                tracker,
                settings: RenderSettings::default(),
            }
        }

        fn scene(&mut self) -> Scene {
            let layout = compute_layout(&mut self.tree, &self.settings, 1200.0, None);
            let metrics = self.settings.metrics(layout.profile);
            build_scene(&self.tree, &layout, Theme::Light, &metrics)
        }

        fn toggle(&mut self, name: &str) {
            let idx = self.tree.find_by_name(name).next().unwrap();
            self.tracker.toggle(&mut self.tree, idx);
        }
    }

    fn anchor_at(scene: &Scene, identity: u64, previous: Point) -> SourceAnchor {
        SourceAnchor {
            identity,
            previous,
            current: scene.node(identity).unwrap().position,
        }
    }

    #[test]
    fn first_render_enters_everything_from_the_anchor() {
        let mut fx = Fixture::new();
        let scene = fx.scene();
        let root = scene.nodes[0].position;
        let mut diff = DiffRenderer::new(Duration::from_millis(750));
        let t = diff.reconcile(&scene, anchor_at(&scene, 1, root));
        assert_eq!(t.stats().entered, 3);
        assert_eq!(t.stats().links_entered, 2);
        for m in t.nodes() {
            assert_eq!(m.phase, Phase::Enter);
            assert_eq!(m.from, root);
            assert_eq!(m.from_radius, VANISH);
            assert_eq!(m.from_opacity, VANISH);
        }
    }

    #[test]
    fn expand_enters_children_from_the_previous_source_position() {
        let mut fx = Fixture::new();
        let scene = fx.scene();
        let mut diff = DiffRenderer::new(Duration::from_millis(750));
        diff.reconcile(&scene, anchor_at(&scene, 1, scene.nodes[0].position));
        diff.advance(Duration::from_secs(1));
        let a_identity = scene.nodes.iter().find(|n| n.name == "A").unwrap().identity;
        let a_before = diff.retained_position(a_identity).unwrap();

        fx.toggle("A");
        let scene = fx.scene();
        let t = diff.reconcile(&scene, anchor_at(&scene, a_identity, a_before));
        let tool1 = t.nodes().iter().find(|m| m.node.name == "tool1").unwrap();
        assert_eq!(tool1.phase, Phase::Enter);
        assert_eq!(tool1.from, a_before);
        let a = t.node_motion(a_identity).unwrap();
        assert_eq!(a.phase, Phase::Update);
        assert_eq!(a.from, a_before);
        assert_eq!(t.stats().exited, 0);
    }

    #[test]
    fn collapse_exits_into_the_new_source_position() {
        let mut fx = Fixture::new();
        let mut diff = DiffRenderer::new(Duration::from_millis(750));
        fx.toggle("A");
        let scene = fx.scene();
        diff.reconcile(&scene, anchor_at(&scene, 1, scene.nodes[0].position));
        diff.advance(Duration::from_secs(1));
        let a_identity = scene.nodes.iter().find(|n| n.name == "A").unwrap().identity;
        let a_before = diff.retained_position(a_identity).unwrap();

        fx.toggle("A");
        let scene = fx.scene();
        let anchor = anchor_at(&scene, a_identity, a_before);
        let t = diff.reconcile(&scene, anchor);
        let tool1 = t.nodes().iter().find(|m| m.node.name == "tool1").unwrap();
        assert_eq!(tool1.phase, Phase::Exit);
        assert_eq!(tool1.to, anchor.current);
        assert_eq!(tool1.to_radius, VANISH);
        let link = t.link_motion(tool1.node.identity).unwrap();
        assert_eq!(link.phase, Phase::Exit);
        assert_eq!(link.to, (anchor.current, anchor.current));

        let settled = t.settled();
        assert!(settled.node(tool1.node.identity).is_none());
        assert!(settled.link(tool1.node.identity).is_none());
    }

    #[test]
    fn exiting_elements_are_still_drawn_mid_transition() {
        let mut fx = Fixture::new();
        fx.toggle("A");
        let mut diff = DiffRenderer::new(Duration::from_millis(100));
        let scene = fx.scene();
        diff.reconcile(&scene, anchor_at(&scene, 1, point(0.0, 0.0)));
        diff.advance(Duration::from_millis(100));

        fx.toggle("A");
        let scene = fx.scene();
        diff.reconcile(&scene, anchor_at(&scene, 2, point(0.0, 0.0)));
        let frame = diff.advance(Duration::from_millis(50)).unwrap();
        let tool1 = frame.nodes.iter().find(|n| n.node.name == "tool1").unwrap();
        assert_eq!(tool1.phase, Phase::Exit);
        assert!(tool1.opacity > VANISH && tool1.opacity < 1.0);
        assert!(!frame.is_complete());
    }

    #[test]
    fn unfinished_exits_survive_an_interrupting_render() {
        let mut fx = Fixture::new();
        fx.toggle("A");
        let mut diff = DiffRenderer::new(Duration::from_millis(100)).with_easing(animation::linear);
        let scene = fx.scene();
        diff.reconcile(&scene, anchor_at(&scene, 1, point(0.0, 0.0)));
        diff.advance(Duration::from_millis(100));

        fx.toggle("A");
        let scene = fx.scene();
        diff.reconcile(&scene, anchor_at(&scene, 2, point(0.0, 0.0)));
        let frame = diff.advance(Duration::from_millis(20)).unwrap();
        let drawn = frame.node(3).unwrap();
        let (drawn_at, drawn_opacity) = (drawn.position, drawn.opacity);
        let drawn_link = frame.link(3).unwrap().target;

        let anchor = anchor_at(&scene, 1, point(0.0, 0.0));
        let t = diff.reconcile(&scene, anchor);
        let tool1 = t.node_motion(3).unwrap();
        assert_eq!(tool1.phase, Phase::Exit);
        assert_eq!(tool1.from, drawn_at);
        assert_eq!(tool1.from_opacity, drawn_opacity);
        assert_eq!(tool1.to, anchor.current);
        let link = t.link_motion(3).unwrap();
        assert_eq!(link.phase, Phase::Exit);
        assert_eq!(link.from.1, drawn_link);
        assert_eq!(t.stats().exited, 1);

        let frame = diff.current_frame().unwrap();
        assert!(frame.node(3).is_some());
        assert!(diff.active().unwrap().settled().node(3).is_none());
    }

    #[test]
    fn unfinished_exit_that_reappears_becomes_an_update() {
        let mut fx = Fixture::new();
        fx.toggle("A");
        let mut diff = DiffRenderer::new(Duration::from_millis(100)).with_easing(animation::linear);
        let scene = fx.scene();
        diff.reconcile(&scene, anchor_at(&scene, 1, point(0.0, 0.0)));
        diff.advance(Duration::from_millis(100));

        fx.toggle("A");
        let collapsed = fx.scene();
        diff.reconcile(&collapsed, anchor_at(&collapsed, 2, point(0.0, 0.0)));
        let drawn_at = diff.advance(Duration::from_millis(50)).unwrap().node(3).unwrap().position;

        fx.toggle("A");
        let expanded = fx.scene();
        let t = diff.reconcile(&expanded, anchor_at(&expanded, 2, point(0.0, 0.0)));
        let tool1 = t.node_motion(3).unwrap();
        assert_eq!(tool1.phase, Phase::Update);
        assert_eq!(tool1.from, drawn_at);
        assert!(tool1.from_opacity < 1.0);
        assert_eq!(tool1.to_opacity, 1.0);
        assert_eq!(t.link_motion(3).unwrap().phase, Phase::Update);
        assert_eq!(t.stats().entered, 0);
        assert_eq!(t.stats().exited, 0);
    }

    #[test]
    fn finished_exits_are_not_carried_over() {
        let mut fx = Fixture::new();
        fx.toggle("A");
        let mut diff = DiffRenderer::new(Duration::from_millis(100));
        let scene = fx.scene();
        diff.reconcile(&scene, anchor_at(&scene, 1, point(0.0, 0.0)));
        diff.advance(Duration::from_millis(100));

        fx.toggle("A");
        let scene = fx.scene();
        diff.reconcile(&scene, anchor_at(&scene, 2, point(0.0, 0.0)));
        diff.advance(Duration::from_millis(100));
        let t = diff.reconcile(&scene, anchor_at(&scene, 1, point(0.0, 0.0)));
        assert!(t.node_motion(3).is_none());
        assert_eq!(t.stats().exited, 0);
    }

    #[test]
    fn interrupted_transition_restarts_from_committed_positions() {
        let mut fx = Fixture::new();
        let mut diff = DiffRenderer::new(Duration::from_millis(100)).with_easing(animation::linear);
        let scene = fx.scene();
        let origin = point(-500.0, -500.0);
        diff.reconcile(&scene, anchor_at(&scene, 1, origin));
        let frame = diff.advance(Duration::from_millis(50)).unwrap();
        let halfway = frame.node(2).unwrap().position;
        let committed = scene.node(2).unwrap().position;
        assert_ne!(halfway, committed);

        let t = diff.reconcile(&scene, anchor_at(&scene, 1, origin));
        let a = t.node_motion(2).unwrap();
        assert_eq!(a.phase, Phase::Update);
        assert_eq!(a.from, committed);
        assert_eq!(a.from_opacity, 1.0);
        assert_eq!(diff.elapsed(), Duration::ZERO);
    }

    #[test]
    fn advance_saturates_at_the_duration() {
        let mut fx = Fixture::new();
        let scene = fx.scene();
        let mut diff = DiffRenderer::new(Duration::from_millis(750));
        assert!(diff.advance(Duration::from_millis(10)).is_none());
        diff.reconcile(&scene, anchor_at(&scene, 1, scene.nodes[0].position));
        assert!(diff.is_animating());
        let frame = diff.advance(Duration::from_secs(3)).unwrap();
        assert!(frame.is_complete());
        assert!(!diff.is_animating());
        assert_eq!(diff.elapsed(), Duration::from_millis(750));
    }
}
