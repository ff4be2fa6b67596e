//! Tidy tree layout algorithms.
//!
//! Baseline: `d3-hierarchy` `tree()`, which implements the linear-time Buchheim, Jünger and
//! Leipert refinement of Walker's algorithm. Node ordering, separation callbacks and the
//! final `size` / `nodeSize` normalization follow the upstream semantics.

pub mod hierarchy;
pub mod tidy;

pub use hierarchy::Hierarchy;
pub use tidy::{Placement, Sizing, TidyTree, default_separation};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
