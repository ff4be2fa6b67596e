//! Easing and interpolated frames.
//!
//! A [`Frame`] is a read-only view of a transition at one instant; it borrows the scene data
//! owned by the transition and only carries the interpolated geometry.

use crate::diff::Phase;
use crate::model::Canvas;
use crate::scene::{SceneLink, SceneNode};
use crate::theme::Theme;
use canopy_core::geom::{Point, point};
use std::time::Duration;

/// Near-zero stand-in for "invisible" that keeps SVG attributes well-formed.
pub const VANISH: f64 = 1e-6;

pub type EasingFn = fn(f64) -> f64;

#[inline]
pub fn linear(t: f64) -> f64 {
    t.clamp(0.0, 1.0)
}

/// Cubic ease-in-out (symmetric, slow start and end).
#[inline]
pub fn ease_cubic_in_out(t: f64) -> f64 {
    let t = t.clamp(0.0, 1.0);
    if t < 0.5 {
        4.0 * t * t * t
    } else {
        1.0 - (-2.0 * t + 2.0).powi(3) / 2.0
    }
}

/// Linear progress of `elapsed` through `duration`; a zero duration is already complete.
pub fn progress(elapsed: Duration, duration: Duration) -> f64 {
    if duration.is_zero() {
        return 1.0;
    }
    (elapsed.as_secs_f64() / duration.as_secs_f64()).clamp(0.0, 1.0)
}

#[inline]
pub fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a + (b - a) * t
}

pub fn lerp_point(a: Point, b: Point, t: f64) -> Point {
    point(lerp(a.x, b.x, t), lerp(a.y, b.y, t))
}

#[derive(Debug, Clone, PartialEq)]
pub struct FrameNode<'a> {
    pub node: &'a SceneNode,
    pub phase: Phase,
    /// Interpolated layout-space position.
    pub position: Point,
    pub radius: f64,
    /// Label opacity.
    pub opacity: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FrameLink<'a> {
    pub link: &'a SceneLink,
    pub phase: Phase,
    pub source: Point,
    pub target: Point,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Frame<'a> {
    pub theme: Theme,
    pub canvas: Canvas,
    pub translate: Point,
    pub font_size: f64,
    /// Eased progress in `[0, 1]`.
    pub progress: f64,
    /// Links draw below nodes.
    pub links: Vec<FrameLink<'a>>,
    pub nodes: Vec<FrameNode<'a>>,
}

impl Frame<'_> {
    pub fn is_complete(&self) -> bool {
        self.progress >= 1.0
    }

    pub fn node(&self, identity: u64) -> Option<&FrameNode<'_>> {
        self.nodes.iter().find(|n| n.node.identity == identity)
    }

    pub fn link(&self, identity: u64) -> Option<&FrameLink<'_>> {
        self.links.iter().find(|l| l.link.identity == identity)
    }
}
