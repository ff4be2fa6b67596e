//! Layout output.
//!
//! Positions are kept in layout space: `x` runs along the breadth axis (screen vertical) and
//! `y` along the depth axis (screen horizontal). The SVG writer swaps them when emitting.

use crate::settings::{Margins, ViewportProfile};
use canopy_core::NodeIndex;
use canopy_core::geom::Point;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Bounds {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl Bounds {
    pub fn from_points(points: impl IntoIterator<Item = (f64, f64)>) -> Option<Self> {
        let mut it = points.into_iter();
        let (x0, y0) = it.next()?;
        let mut b = Self {
            min_x: x0,
            min_y: y0,
            max_x: x0,
            max_y: y0,
        };
        for (x, y) in it {
            b.min_x = b.min_x.min(x);
            b.min_y = b.min_y.min(y);
            b.max_x = b.max_x.max(x);
            b.max_y = b.max_y.max(y);
        }
        Some(b)
    }

    pub fn breadth_extent(&self) -> f64 {
        self.max_x - self.min_x
    }

    pub fn depth_extent(&self) -> f64 {
        self.max_y - self.min_y
    }
}

/// Drawing canvas in screen pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Canvas {
    pub width: f64,
    pub height: f64,
    /// Upper bound for the displayed height; `None` lets the canvas grow.
    pub max_height: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PositionedNode {
    pub index: NodeIndex,
    pub identity: u64,
    pub parent_identity: Option<u64>,
    pub depth: usize,
    pub position: Point,
}

/// One parent→child connection, keyed by the child's identity.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LinkGeometry {
    pub identity: u64,
    pub parent_identity: u64,
    pub depth: usize,
    pub source: Point,
    pub target: Point,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TreeLayout {
    #[serde(skip)]
    pub profile: ViewportProfile,
    /// Visible nodes in pre-order.
    pub nodes: Vec<PositionedNode>,
    pub links: Vec<LinkGeometry>,
    /// Bounding box after the degenerate-extent fallback.
    pub bounds: Bounds,
    pub canvas: Canvas,
    #[serde(skip)]
    pub margins: Margins,
    /// Screen-space offset applied to the whole drawing.
    pub translate: Point,
    pub depth_spacing: f64,
    pub max_depth: usize,
    /// True when at least one axis collapsed to zero extent.
    pub degenerate: bool,
}

impl TreeLayout {
    pub fn node(&self, identity: u64) -> Option<&PositionedNode> {
        self.nodes.iter().find(|n| n.identity == identity)
    }

    /// Maps a layout-space position to canvas coordinates.
    pub fn to_screen(&self, position: Point) -> Point {
        canopy_core::geom::point(
            position.y + self.translate.x,
            position.x + self.translate.y,
        )
    }
}
