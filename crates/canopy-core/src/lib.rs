#![forbid(unsafe_code)]

//! Taxonomy model + render-tree state for the canopy tree explorer (headless).
//!
//! Design goals:
//! - the externally supplied taxonomy is validated once and never mutated
//! - deterministic identity assignment, so diff keys are reproducible
//! - exploration state keyed by node name, so it survives data reloads

pub mod config;
pub mod error;
pub mod expansion;
pub mod geom;
pub mod identity;
pub mod taxonomy;
pub mod tree;

pub use config::CanopyConfig;
pub use error::{Error, Result};
pub use expansion::{ExpansionTracker, ToggleOutcome};
pub use identity::{IdentityAssigner, IdentityScope};
pub use taxonomy::{DomainNode, NodeKind, TaxonomyStats};
pub use tree::{ChildSlots, NodeIndex, RenderNode, RenderTree};
