//! Light/dark palettes and the per-node paint rules.
//!
//! Colours are resolved when a scene is built, never cached on nodes, so a theme switch
//! followed by a render repaints everything.

use crate::settings::ProfileMetrics;
use canopy_core::{NodeKind, RenderNode};
use serde::Serialize;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

pub const FONT_FAMILY: &str =
    r#"-apple-system, BlinkMacSystemFont, "Segoe UI", Roboto, sans-serif"#;
pub const LINK_OPACITY: f64 = 0.7;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    /// Interprets a numeric dark-mode flag; anything at or above `0.5` is dark.
    pub fn from_flag(flag: f64) -> Self {
        if flag >= 0.5 { Self::Dark } else { Self::Light }
    }

    pub fn from_dark(dark: bool) -> Self {
        if dark { Self::Dark } else { Self::Light }
    }

    pub fn is_dark(self) -> bool {
        self == Self::Dark
    }

    pub fn palette(self) -> &'static Palette {
        match self {
            Self::Light => &LIGHT,
            Self::Dark => &DARK,
        }
    }
}

/// Where the renderer reads the current theme from at paint time.
pub trait ThemeSource {
    fn theme(&self) -> Theme;
}

impl ThemeSource for Theme {
    fn theme(&self) -> Theme {
        *self
    }
}

/// A shared, host-owned dark-mode switch. Clones observe the same flag.
#[derive(Debug, Clone, Default)]
pub struct DarkModeFlag(Arc<AtomicBool>);

impl DarkModeFlag {
    pub fn new(dark: bool) -> Self {
        Self(Arc::new(AtomicBool::new(dark)))
    }

    pub fn set(&self, dark: bool) {
        self.0.store(dark, Ordering::Relaxed);
    }

    pub fn is_dark(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

impl ThemeSource for DarkModeFlag {
    fn theme(&self) -> Theme {
        Theme::from_dark(self.is_dark())
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Palette {
    pub link: &'static str,
    pub leaf_fill: &'static str,
    pub collapsed_fill: &'static str,
    pub expanded_fill: &'static str,
    pub leaf_stroke: &'static str,
    pub collapsed_stroke: &'static str,
    pub expanded_stroke: &'static str,
    pub label: &'static str,
    pub leaf_label: &'static str,
    pub highlight: &'static str,
    /// Circle stroke width in `em` at depth 0.
    pub stroke_width_em: f64,
}

pub const LIGHT: Palette = Palette {
    link: "#e5e7eb",
    leaf_fill: "#8b5cf6",
    collapsed_fill: "#2563eb",
    expanded_fill: "#6b7280",
    leaf_stroke: "rgba(0, 0, 0, 0.1)",
    collapsed_stroke: "rgba(0, 0, 0, 0.1)",
    expanded_stroke: "rgba(0, 0, 0, 0.1)",
    label: "#374151",
    leaf_label: "#8b5cf6",
    highlight: "#ca8a04",
    stroke_width_em: 0.1875,
};

pub const DARK: Palette = Palette {
    link: "#9ca3af",
    leaf_fill: "#d8b4fe",
    collapsed_fill: "#93c5fd",
    expanded_fill: "#e5e7eb",
    leaf_stroke: "#c084fc",
    collapsed_stroke: "#60a5fa",
    expanded_stroke: "#d1d5db",
    label: "#ffffff",
    leaf_label: "#e9d5ff",
    highlight: "#fde047",
    stroke_width_em: 0.25,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum NodeClass {
    Leaf,
    /// Branch whose children are hidden.
    Collapsed,
    /// Expanded branch, or a branch with nothing to show.
    Branch,
}

impl NodeClass {
    pub fn of(node: &RenderNode) -> Self {
        if node.kind == NodeKind::Leaf {
            Self::Leaf
        } else if node.is_collapsed() {
            Self::Collapsed
        } else {
            Self::Branch
        }
    }

    pub fn css_class(self) -> &'static str {
        match self {
            Self::Leaf => "node-leaf",
            Self::Collapsed => "node-collapsed",
            Self::Branch => "node-branch",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TextAnchor {
    Start,
    End,
}

impl TextAnchor {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::End => "end",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct NodePaint {
    pub radius: f64,
    pub fill: &'static str,
    pub stroke: &'static str,
    pub stroke_width_em: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LabelPaint {
    pub fill: &'static str,
    pub font_size_em: f64,
    pub font_weight: u16,
    pub anchor: TextAnchor,
    /// Horizontal offset from the circle centre.
    pub offset: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LinkPaint {
    pub stroke: &'static str,
    pub stroke_width_em: f64,
    pub opacity: f64,
}

fn depth_scale(depth: usize, step: f64, floor: f64) -> f64 {
    (1.0 - step * depth as f64).max(floor)
}

pub fn node_paint(theme: Theme, node: &RenderNode, metrics: &ProfileMetrics) -> NodePaint {
    let p = theme.palette();
    let (fill, stroke) = match NodeClass::of(node) {
        NodeClass::Leaf => (p.leaf_fill, p.leaf_stroke),
        NodeClass::Collapsed => (p.collapsed_fill, p.collapsed_stroke),
        NodeClass::Branch => (p.expanded_fill, p.expanded_stroke),
    };
    let scale = depth_scale(node.depth, 0.1, 0.5);
    NodePaint {
        radius: metrics.circle_radius * scale,
        fill,
        stroke: if node.highlighted { p.highlight } else { stroke },
        stroke_width_em: p.stroke_width_em * scale,
    }
}

/// Nodes with children, shown or hidden, put their label on the left of the circle.
pub fn label_paint(theme: Theme, node: &RenderNode, metrics: &ProfileMetrics) -> LabelPaint {
    let p = theme.palette();
    let depth = node.depth;
    let offset = metrics.label_offset * depth_scale(depth, 0.1, 0.6);
    let (anchor, offset) = if node.has_descendants() {
        (TextAnchor::End, -offset)
    } else {
        (TextAnchor::Start, offset)
    };
    let font_weight = if node.highlighted {
        700
    } else if node.is_leaf() || depth <= 2 {
        500
    } else {
        400
    };
    let fill = if node.highlighted {
        p.highlight
    } else if node.is_leaf() {
        p.leaf_label
    } else {
        p.label
    };
    LabelPaint {
        fill,
        font_size_em: metrics.label_font_em * depth_scale(depth, 0.08, 0.7),
        font_weight,
        anchor,
        offset,
    }
}

/// `depth` is the depth of the link's child end.
pub fn link_paint(theme: Theme, depth: usize) -> LinkPaint {
    LinkPaint {
        stroke: theme.palette().link,
        stroke_width_em: 0.1875 * depth_scale(depth, 0.1, 0.4),
        opacity: LINK_OPACITY,
    }
}
