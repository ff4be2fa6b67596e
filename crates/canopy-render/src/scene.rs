use crate::model::{Canvas, TreeLayout};
use crate::settings::ProfileMetrics;
use crate::theme::{self, LabelPaint, LinkPaint, NodeClass, NodePaint, Theme};
use canopy_core::geom::Point;
use canopy_core::{NodeIndex, NodeKind, RenderTree};
use serde::Serialize;

/// A visible node with its resolved paint, ready for diffing.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SceneNode {
    pub identity: u64,
    #[serde(skip)]
    pub index: NodeIndex,
    pub name: String,
    pub kind: NodeKind,
    pub url: Option<String>,
    pub depth: usize,
    pub highlighted: bool,
    pub class: NodeClass,
    /// Layout-space position.
    pub position: Point,
    pub paint: NodePaint,
    pub label: LabelPaint,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SceneLink {
    /// Identity of the child end.
    pub identity: u64,
    pub parent_identity: u64,
    pub depth: usize,
    pub source: Point,
    pub target: Point,
    pub paint: LinkPaint,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Scene {
    pub theme: Theme,
    pub canvas: Canvas,
    pub translate: Point,
    /// Pixel size of `1em`.
    pub font_size: f64,
    pub nodes: Vec<SceneNode>,
    pub links: Vec<SceneLink>,
}

impl Scene {
    pub fn node(&self, identity: u64) -> Option<&SceneNode> {
        self.nodes.iter().find(|n| n.identity == identity)
    }

    pub fn link(&self, identity: u64) -> Option<&SceneLink> {
        self.links.iter().find(|l| l.identity == identity)
    }
}

pub fn build_scene(
    tree: &RenderTree,
    layout: &TreeLayout,
    theme: Theme,
    metrics: &ProfileMetrics,
) -> Scene {
    let nodes = layout
        .nodes
        .iter()
        .map(|placed| {
            let node = tree.node(placed.index);
            SceneNode {
                identity: node.identity,
                index: placed.index,
                name: node.name.clone(),
                kind: node.kind,
                url: node.url.clone(),
                depth: node.depth,
                highlighted: node.highlighted,
                class: NodeClass::of(node),
                position: placed.position,
                paint: theme::node_paint(theme, node, metrics),
                label: theme::label_paint(theme, node, metrics),
            }
        })
        .collect();

    let links = layout
        .links
        .iter()
        .map(|l| SceneLink {
            identity: l.identity,
            parent_identity: l.parent_identity,
            depth: l.depth,
            source: l.source,
            target: l.target,
            paint: theme::link_paint(theme, l.depth),
        })
        .collect();

    Scene {
        theme,
        canvas: layout.canvas,
        translate: layout.translate,
        font_size: metrics.font_size,
        nodes,
        links,
    }
}
