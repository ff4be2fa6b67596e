//! Renderer settings and the per-viewport metric profiles.
//!
//! Lengths are specified in `em` against a base font size and resolved to pixels here, so the
//! rest of the pipeline only deals in pixels.

use canopy_core::{CanopyConfig, IdentityScope};
use std::time::Duration;

pub const DEFAULT_DURATION_MS: f64 = 750.0;
pub const DEFAULT_BASE_FONT_SIZE: f64 = 16.0;
pub const DEFAULT_MOBILE_BREAKPOINT: f64 = 768.0;
pub const DEFAULT_CONTAINER_WIDTH: f64 = 1200.0;
pub const DEFAULT_SVG_ID: &str = "canopy";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewportProfile {
    Mobile,
    Desktop,
}

impl ViewportProfile {
    pub fn is_mobile(self) -> bool {
        self == Self::Mobile
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Margins {
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
    pub left: f64,
}

/// Pixel metrics for one viewport profile.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProfileMetrics {
    pub profile: ViewportProfile,
    pub font_size: f64,
    pub margins: Margins,
    /// Distance between adjacent siblings on the breadth axis.
    pub breadth_spacing: f64,
    /// Depth spacing before the shrink factor for deep trees is applied.
    pub base_depth_spacing: f64,
    /// Stand-in extents when the laid-out tree is flat on an axis.
    pub fallback_breadth_extent: f64,
    pub fallback_depth_extent: f64,
    pub min_canvas_width: f64,
    pub min_content_height: f64,
    pub max_height: Option<f64>,
    pub circle_radius: f64,
    pub label_offset: f64,
    pub label_font_em: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RenderSettings {
    pub duration: Duration,
    pub base_font_size: f64,
    /// Viewports at most this wide use the mobile profile.
    pub mobile_breakpoint: f64,
    /// Desktop canvas width when the surface does not report one.
    pub container_width: f64,
    pub breadth_spacing_em: f64,
    pub mobile_breadth_spacing_em: f64,
    pub identity_scope: IdentityScope,
    pub svg_id: String,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            duration: Duration::from_millis(DEFAULT_DURATION_MS as u64),
            base_font_size: DEFAULT_BASE_FONT_SIZE,
            mobile_breakpoint: DEFAULT_MOBILE_BREAKPOINT,
            container_width: DEFAULT_CONTAINER_WIDTH,
            breadth_spacing_em: 2.5,
            mobile_breadth_spacing_em: 2.0,
            identity_scope: IdentityScope::Instance,
            svg_id: DEFAULT_SVG_ID.to_string(),
        }
    }
}

fn positive(cfg: &CanopyConfig, path: &str) -> Option<f64> {
    cfg.get_f64(path).filter(|v| *v > 0.0)
}

impl RenderSettings {
    /// Reads overrides from `cfg`; missing or invalid values keep their defaults.
    pub fn from_config(cfg: &CanopyConfig) -> Self {
        let mut out = Self::default();
        if let Some(ms) = cfg.get_f64("animation.durationMs").filter(|v| *v >= 0.0) {
            match Duration::try_from_secs_f64(ms / 1000.0) {
                Ok(duration) => out.duration = duration,
                Err(err) => {
                    tracing::warn!(ms, %err, "animation duration out of range, keeping default");
                }
            }
        }
        if let Some(v) = positive(cfg, "layout.baseFontSize") {
            out.base_font_size = v;
        }
        if let Some(v) = positive(cfg, "layout.mobileBreakpoint") {
            out.mobile_breakpoint = v;
        }
        if let Some(v) = positive(cfg, "layout.containerWidth") {
            out.container_width = v;
        }
        if let Some(v) = positive(cfg, "layout.breadthSpacingEm") {
            out.breadth_spacing_em = v;
        }
        if let Some(v) = positive(cfg, "layout.mobileBreadthSpacingEm") {
            out.mobile_breadth_spacing_em = v;
        }
        if let Some(raw) = cfg.get_str("identity.scope") {
            match IdentityScope::parse(raw) {
                Some(scope) => out.identity_scope = scope,
                None => tracing::warn!(scope = raw, "unknown identity scope, keeping default"),
            }
        }
        if let Some(id) = cfg.get_str("svg.id") {
            out.svg_id = crate::svg::sanitize_svg_id(id);
        }
        out
    }

    pub fn profile(&self, viewport_width: f64) -> ViewportProfile {
        if viewport_width <= self.mobile_breakpoint {
            ViewportProfile::Mobile
        } else {
            ViewportProfile::Desktop
        }
    }

    pub fn metrics(&self, profile: ViewportProfile) -> ProfileMetrics {
        let em = self.base_font_size;
        match profile {
            ViewportProfile::Mobile => ProfileMetrics {
                profile,
                font_size: em,
                margins: Margins {
                    top: 4.0 * em,
                    right: 8.0 * em,
                    bottom: 4.0 * em,
                    left: 8.0 * em,
                },
                breadth_spacing: self.mobile_breadth_spacing_em * em,
                base_depth_spacing: 14.0 * em,
                fallback_breadth_extent: 20.0 * em,
                fallback_depth_extent: 32.0 * em,
                min_canvas_width: 32.0 * em,
                min_content_height: 20.0 * em,
                max_height: None,
                circle_radius: 8.0,
                label_offset: 14.0,
                label_font_em: 1.125,
            },
            ViewportProfile::Desktop => ProfileMetrics {
                profile,
                font_size: em,
                margins: Margins {
                    top: 8.0 * em,
                    right: 16.0 * em,
                    bottom: 8.0 * em,
                    left: 16.0 * em,
                },
                breadth_spacing: self.breadth_spacing_em * em,
                base_depth_spacing: 18.0 * em,
                fallback_breadth_extent: 36.0 * em,
                fallback_depth_extent: 54.0 * em,
                min_canvas_width: 32.0 * em,
                min_content_height: 28.0 * em,
                max_height: Some(97.2 * em),
                circle_radius: 10.0,
                label_offset: 16.0,
                label_font_em: 1.25,
            },
        }
    }

    pub fn metrics_for_width(&self, viewport_width: f64) -> ProfileMetrics {
        self.metrics(self.profile(viewport_width))
    }
}
