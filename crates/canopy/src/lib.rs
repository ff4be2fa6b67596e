#![forbid(unsafe_code)]

//! `canopy` is a headless, animated explorer for hierarchical link directories.
//!
//! A taxonomy of categories and tools is laid out as a horizontal tidy tree; users expand
//! and collapse categories, and each change is reconciled into an enter/update/exit
//! transition that hosts can draw frame by frame or as a settled SVG document.
//!
//! # Features
//!
//! - `render`: enable layout, diffing and SVG output (`canopy::render`)

pub use canopy_core::*;

#[cfg(feature = "render")]
pub mod render {
    pub use canopy_render::animation::{Frame, FrameLink, FrameNode};
    pub use canopy_render::svg::{SvgRenderOptions, render_frame_svg, sanitize_svg_id};
    pub use canopy_render::{
        DarkModeFlag, DiffStats, Dispatch, RenderOptions, RenderSettings, RendererEvent, Surface,
        SvgSurface, Theme, ThemeSource, Transition, TreeRenderer, ViewportProfile,
    };

    use canopy_core::{DomainNode, NodeKind};

    #[derive(Debug, thiserror::Error)]
    pub enum HeadlessError {
        #[error(transparent)]
        Parse(#[from] canopy_core::Error),
        #[error(transparent)]
        Render(#[from] canopy_render::Error),
    }

    pub type Result<T> = std::result::Result<T, HeadlessError>;

    /// Options for one-shot rendering: stock configuration, light theme, desktop viewport.
    pub fn headless_render_options() -> RenderOptions {
        RenderOptions::default()
    }

    /// Renders `domain` at its default exploration depth and returns the settled SVG.
    pub fn render_svg_sync(domain: &DomainNode, options: RenderOptions) -> Result<String> {
        let mut renderer = TreeRenderer::new(SvgSurface::new(), options)?;
        renderer.render(domain)?;
        Ok(renderer.surface().document().unwrap_or_default().to_string())
    }

    /// Parses a JSON taxonomy and renders it like [`render_svg_sync`].
    pub fn render_json_svg_sync(text: &str, options: RenderOptions) -> Result<String> {
        let domain = DomainNode::from_json_str(text)?;
        render_svg_sync(&domain, options)
    }

    /// Renders `domain` with every branch expanded.
    pub fn render_expanded_svg_sync(domain: &DomainNode, options: RenderOptions) -> Result<String> {
        let mut renderer = TreeRenderer::new(SvgSurface::new(), options)?;
        let mut stack = vec![domain];
        while let Some(node) = stack.pop() {
            if node.kind == NodeKind::Branch {
                renderer.expand_node(&node.name);
            }
            stack.extend(node.children.iter());
        }
        renderer.render(domain)?;
        Ok(renderer.surface().document().unwrap_or_default().to_string())
    }
}
