#![forbid(unsafe_code)]

pub mod animation;
pub mod diff;
pub mod interaction;
pub mod layout;
pub mod model;
pub mod renderer;
pub mod scene;
pub mod settings;
pub mod surface;
pub mod svg;
pub mod theme;

pub use diff::{DiffRenderer, DiffStats, Phase, Transition};
pub use interaction::{Dispatch, dispatch, hit_test};
pub use layout::compute_layout;
pub use renderer::{RenderOptions, RendererEvent, TreeRenderer};
pub use settings::{RenderSettings, ViewportProfile};
pub use surface::{Surface, SvgSurface};
pub use theme::{DarkModeFlag, Theme, ThemeSource};

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Core(#[from] canopy_core::Error),
    #[error("rendering surface unavailable: {reason}")]
    SurfaceUnavailable { reason: String },
    #[error("no tree has been rendered yet")]
    NotRendered,
    #[error("no visible node with identity {identity}")]
    UnknownNode { identity: u64 },
}

pub type Result<T> = std::result::Result<T, Error>;
