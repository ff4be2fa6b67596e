//! Host drawing surfaces.

use crate::Result;
use crate::diff::Transition;
use crate::svg::{SvgRenderOptions, render_frame_svg};

/// Where a renderer draws. Hosts that animate drive frames themselves through
/// [`crate::TreeRenderer::tick`]; `present` receives each new transition once.
pub trait Surface {
    /// A detached surface cannot host a renderer.
    fn is_attached(&self) -> bool;

    /// Current drawable width in pixels, if the host knows it.
    fn container_width(&self) -> Option<f64> {
        None
    }

    /// Receives the configured document id before the first transition.
    fn set_diagram_id(&mut self, _id: &str) {}

    fn present(&mut self, transition: &Transition) -> Result<()>;
}

/// Headless surface that keeps the settled SVG of the most recent transition.
#[derive(Debug, Clone)]
pub struct SvgSurface {
    attached: bool,
    container_width: Option<f64>,
    options: SvgRenderOptions,
    document: Option<String>,
    presented: usize,
}

impl Default for SvgSurface {
    fn default() -> Self {
        Self::new()
    }
}

impl SvgSurface {
    pub fn new() -> Self {
        Self {
            attached: true,
            container_width: None,
            options: SvgRenderOptions::default(),
            document: None,
            presented: 0,
        }
    }

    pub fn detached() -> Self {
        Self {
            attached: false,
            ..Self::new()
        }
    }

    pub fn with_container_width(mut self, width: f64) -> Self {
        self.container_width = Some(width);
        self
    }

    pub fn with_options(mut self, options: SvgRenderOptions) -> Self {
        self.options = options;
        self
    }

    pub fn set_container_width(&mut self, width: Option<f64>) {
        self.container_width = width;
    }

    pub fn options(&self) -> &SvgRenderOptions {
        &self.options
    }

    pub fn document(&self) -> Option<&str> {
        self.document.as_deref()
    }

    /// Number of transitions presented so far.
    pub fn presented(&self) -> usize {
        self.presented
    }
}

impl Surface for SvgSurface {
    fn is_attached(&self) -> bool {
        self.attached
    }

    fn container_width(&self) -> Option<f64> {
        self.container_width
    }

    fn set_diagram_id(&mut self, id: &str) {
        self.options.diagram_id = Some(id.to_string());
    }

    fn present(&mut self, transition: &Transition) -> Result<()> {
        self.document = Some(render_frame_svg(&transition.settled(), &self.options));
        self.presented += 1;
        Ok(())
    }
}
