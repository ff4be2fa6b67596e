//! The stateful tree explorer: data loads, interaction, and the render cycle.

use crate::animation::Frame;
use crate::diff::{DiffRenderer, DiffStats, SourceAnchor, Transition};
use crate::interaction::{self, Dispatch};
use crate::layout::compute_layout;
use crate::model::TreeLayout;
use crate::scene::{Scene, build_scene};
use crate::settings::RenderSettings;
use crate::surface::Surface;
use crate::theme::{Theme, ThemeSource};
use crate::{Error, Result};
use canopy_core::geom::{Point, point};
use canopy_core::{
    CanopyConfig, DomainNode, ExpansionTracker, IdentityAssigner, NodeIndex, RenderTree,
    ToggleOutcome,
};
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RendererEvent {
    /// A leaf was clicked; the host decides what opening it means.
    NodeActivated {
        identity: u64,
        name: String,
        url: Option<String>,
    },
    /// A branch was expanded or collapsed by the user.
    TreeMutated {
        identity: u64,
        name: String,
        outcome: ToggleOutcome,
    },
}

#[derive(Clone)]
pub struct RenderOptions {
    pub config: CanopyConfig,
    pub theme: Arc<dyn ThemeSource + Send + Sync>,
    pub viewport_width: f64,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            config: CanopyConfig::default(),
            theme: Arc::new(Theme::Light),
            viewport_width: crate::settings::DEFAULT_CONTAINER_WIDTH,
        }
    }
}

impl std::fmt::Debug for RenderOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RenderOptions")
            .field("config", &self.config)
            .field("theme", &self.theme.theme())
            .field("viewport_width", &self.viewport_width)
            .finish()
    }
}

impl RenderOptions {
    pub fn with_config(mut self, config: CanopyConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_theme_source(mut self, theme: Arc<dyn ThemeSource + Send + Sync>) -> Self {
        self.theme = theme;
        self
    }

    pub fn with_viewport_width(mut self, width: f64) -> Self {
        self.viewport_width = width;
        self
    }
}

type EventHandler = Box<dyn FnMut(&RendererEvent)>;

pub struct TreeRenderer<S: Surface> {
    surface: S,
    settings: RenderSettings,
    theme: Arc<dyn ThemeSource + Send + Sync>,
    viewport_width: f64,
    assigner: IdentityAssigner,
    tracker: ExpansionTracker,
    tree: Option<RenderTree>,
    layout: Option<TreeLayout>,
    scene: Option<Scene>,
    diff: DiffRenderer,
    filtering: bool,
    on_event: Option<EventHandler>,
}

impl<S: Surface> TreeRenderer<S> {
    pub fn new(mut surface: S, options: RenderOptions) -> Result<Self> {
        if !surface.is_attached() {
            return Err(Error::SurfaceUnavailable {
                reason: "surface is not attached to a host".to_string(),
            });
        }
        let settings = RenderSettings::from_config(&options.config);
        surface.set_diagram_id(&settings.svg_id);
        Ok(Self {
            surface,
            assigner: IdentityAssigner::new(settings.identity_scope),
            diff: DiffRenderer::new(settings.duration),
            settings,
            theme: options.theme,
            viewport_width: options.viewport_width,
            tracker: ExpansionTracker::new(),
            tree: None,
            layout: None,
            scene: None,
            filtering: false,
            on_event: None,
        })
    }

    pub fn set_event_handler<F>(&mut self, handler: F)
    where
        F: FnMut(&RendererEvent) + 'static,
    {
        self.on_event = Some(Box::new(handler));
    }

    fn emit(&mut self, event: RendererEvent) {
        tracing::trace!(?event, "renderer event");
        if let Some(handler) = self.on_event.as_mut() {
            handler(&event);
        }
    }

    /// Loads a new taxonomy. Expansion state carries over by name.
    pub fn render(&mut self, domain: &DomainNode) -> Result<DiffStats> {
        let mut tree = self.assigner.assign(domain);
        self.tracker.seed_root(&tree);
        self.tracker.apply(&mut tree);
        tracing::debug!(
            nodes = tree.len(),
            expanded = self.tracker.len(),
            "loaded taxonomy"
        );
        let root = tree.root();
        self.tree = Some(tree);
        self.update(root)
    }

    /// Validates and loads a JSON taxonomy.
    pub fn render_value(&mut self, value: &Value) -> Result<DiffStats> {
        let domain = DomainNode::from_value(value)?;
        self.render(&domain)
    }

    /// Runs layout, paint and reconciliation with `source` as the animation anchor.
    fn update(&mut self, source: NodeIndex) -> Result<DiffStats> {
        let tree = self.tree.as_mut().ok_or(Error::NotRendered)?;
        let layout = compute_layout(
            tree,
            &self.settings,
            self.viewport_width,
            self.surface.container_width(),
        );
        let metrics = self.settings.metrics(layout.profile);
        let scene = build_scene(tree, &layout, self.theme.theme(), &metrics);

        let node = tree.node(source);
        let anchor = SourceAnchor {
            identity: node.identity,
            previous: node
                .previous_position
                .or_else(|| self.diff.retained_position(node.identity))
                .unwrap_or(node.position),
            current: node.position,
        };

        let transition = self.diff.reconcile(&scene, anchor);
        let stats = transition.stats();
        self.surface.present(transition)?;

        for placed in &layout.nodes {
            tree.node_mut(placed.index).previous_position = Some(placed.position);
        }
        self.layout = Some(layout);
        self.scene = Some(scene);
        Ok(stats)
    }

    fn root_index(&self) -> Result<NodeIndex> {
        Ok(self.tree.as_ref().ok_or(Error::NotRendered)?.root())
    }

    fn visible_index(&self, identity: u64) -> Result<NodeIndex> {
        let tree = self.tree.as_ref().ok_or(Error::NotRendered)?;
        let visible = self
            .scene
            .as_ref()
            .is_some_and(|s| s.node(identity).is_some());
        match tree.find_by_identity(identity) {
            Some(idx) if visible => Ok(idx),
            _ => Err(Error::UnknownNode { identity }),
        }
    }

    /// Expands or collapses a visible branch and re-renders from it.
    pub fn toggle(&mut self, identity: u64) -> Result<ToggleOutcome> {
        let idx = self.visible_index(identity)?;
        let tree = self.tree.as_mut().ok_or(Error::NotRendered)?;
        let outcome = self.tracker.toggle(tree, idx);
        if outcome == ToggleOutcome::Unchanged {
            return Ok(outcome);
        }
        // Other nodes sharing the name follow the same flag.
        self.tracker.apply(tree);
        let name = tree.node(idx).name.clone();
        self.update(idx)?;
        self.emit(RendererEvent::TreeMutated {
            identity,
            name,
            outcome,
        });
        Ok(outcome)
    }

    /// Routes a click on a visible node.
    pub fn click(&mut self, identity: u64) -> Result<Dispatch> {
        self.visible_index(identity)?;
        let tree = self.tree.as_ref().ok_or(Error::NotRendered)?;
        let action = interaction::dispatch(tree, identity)?;
        match &action {
            Dispatch::Toggle { identity } => {
                self.toggle(*identity)?;
            }
            Dispatch::Activate {
                identity,
                name,
                url,
            } => self.emit(RendererEvent::NodeActivated {
                identity: *identity,
                name: name.clone(),
                url: url.clone(),
            }),
            Dispatch::Ignored => {}
        }
        Ok(action)
    }

    /// Routes a pointer press at canvas coordinates.
    pub fn pointer(&mut self, x: f64, y: f64) -> Result<Dispatch> {
        let scene = self.scene.as_ref().ok_or(Error::NotRendered)?;
        match interaction::hit_test(scene, point(x, y)) {
            Some(identity) => self.click(identity),
            None => Ok(Dispatch::Ignored),
        }
    }

    /// Re-lays out for a new viewport width, keeping expansion state.
    pub fn resize(&mut self, viewport_width: f64) -> Result<DiffStats> {
        self.viewport_width = viewport_width;
        if self.tree.is_none() {
            return Ok(DiffStats::default());
        }
        let root = self.root_index()?;
        self.update(root)
    }

    /// Repaints with whatever the theme source reports now.
    pub fn refresh_colors(&mut self) -> Result<DiffStats> {
        let root = self.root_index()?;
        self.update(root)
    }

    /// Collapses everything back to the root level and reloads the current data.
    pub fn reset_to_default(&mut self) -> Result<DiffStats> {
        let tree = self.tree.as_ref().ok_or(Error::NotRendered)?;
        let domain = tree.to_domain();
        self.tracker.reset(&domain.name);
        self.filtering = false;
        self.render(&domain)
    }

    /// Marks `name` expanded; takes effect on the next render.
    pub fn expand_node(&mut self, name: &str) -> bool {
        self.tracker.expand_name(name)
    }

    pub fn collapse_node(&mut self, name: &str) -> bool {
        self.tracker.collapse_name(name)
    }

    pub fn save_expansion_state(&mut self) {
        self.tracker.save_snapshot();
    }

    pub fn restore_expansion_state(&mut self) -> bool {
        self.tracker.restore_snapshot()
    }

    pub fn clear_saved_state(&mut self) {
        self.tracker.clear_snapshot();
    }

    /// Shows a search-filtered taxonomy with every path to a highlighted node expanded.
    ///
    /// The first call saves the user's expansion state; [`Self::clear_filter`] restores it.
    pub fn show_filtered(&mut self, filtered: &DomainNode) -> Result<DiffStats> {
        if !self.filtering {
            self.tracker.save_snapshot();
            self.filtering = true;
        }
        let added = self
            .tracker
            .reveal(filtered.highlighted_ancestor_names());
        tracing::debug!(added, "revealed highlighted paths");
        self.render(filtered)
    }

    /// Leaves the filtered view, restoring the expansion state saved on entry.
    pub fn clear_filter(&mut self, full: &DomainNode) -> Result<DiffStats> {
        if self.filtering {
            self.tracker.restore_snapshot();
            self.tracker.clear_snapshot();
            self.filtering = false;
        }
        self.render(full)
    }

    /// Advances the live transition and returns the frame to draw.
    pub fn tick(&mut self, dt: Duration) -> Option<Frame<'_>> {
        self.diff.advance(dt)
    }

    pub fn is_animating(&self) -> bool {
        self.diff.is_animating()
    }

    pub fn is_filtering(&self) -> bool {
        self.filtering
    }

    pub fn settings(&self) -> &RenderSettings {
        &self.settings
    }

    pub fn viewport_width(&self) -> f64 {
        self.viewport_width
    }

    pub fn tree(&self) -> Option<&RenderTree> {
        self.tree.as_ref()
    }

    pub fn layout(&self) -> Option<&TreeLayout> {
        self.layout.as_ref()
    }

    pub fn scene(&self) -> Option<&Scene> {
        self.scene.as_ref()
    }

    pub fn transition(&self) -> Option<&Transition> {
        self.diff.active()
    }

    pub fn tracker(&self) -> &ExpansionTracker {
        &self.tracker
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    /// Committed screen position of a visible node, in canvas pixels.
    pub fn screen_position(&self, identity: u64) -> Option<Point> {
        let layout = self.layout.as_ref()?;
        layout
            .node(identity)
            .map(|n| layout.to_screen(n.position))
    }
}
