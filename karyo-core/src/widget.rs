//! The chromosome widget: loads a band model, lays it out, presents it to a
//! render target and turns pointer interaction into selection events.

use log::{debug, error, info, warn};

use crate::events::{ChromosomeEvent, EventBus, EventKind, SubscriptionId};
use crate::layout::{self, KaryotypeScene};
use crate::loader::{loader_for, validate_model, LoadError, ModelLoader};
use crate::options::{ConfigError, WidgetOptions};
use crate::scale::LinearScale;
use crate::selection::{BrushHandle, SelectionController, SelectionError};
use crate::target::RenderTarget;
use crate::types::{BandModel, Selection};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// The loader returned an error or an invalid model.
    Load,
    /// The model's coordinates cannot be mapped onto the canvas.
    Scale,
    /// The render target selector did not resolve.
    Target,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WidgetState {
    Idle,
    Loading,
    Rendered,
    Failed(FailureKind),
}

/// Handle for one in-flight load started by [`Chromosome::begin_draw`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DrawTicket {
    generation: u64,
}

pub struct Chromosome<T: RenderTarget> {
    options: WidgetOptions,
    loader: Box<dyn ModelLoader>,
    target: T,
    events: EventBus,
    state: WidgetState,
    generation: u64,
    model: Option<BandModel>,
    scale: Option<LinearScale>,
    hovered: Option<usize>,
    selection: SelectionController,
    scene: Option<KaryotypeScene>,
}

impl<T: RenderTarget> Chromosome<T> {
    pub fn new(options: WidgetOptions, loader: Box<dyn ModelLoader>, target: T) -> Result<Self, ConfigError> {
        options.validate()?;
        let selection = SelectionController::new(options.include_selector);
        Ok(Self {
            options,
            loader,
            target,
            events: EventBus::new(),
            state: WidgetState::Idle,
            generation: 0,
            model: None,
            scale: None,
            hovered: None,
            selection,
            scene: None,
        })
    }

    /// Build a widget whose loader is chosen from `options.das_source`.
    pub fn from_options(options: WidgetOptions, target: T) -> crate::error::Result<Self> {
        options.validate()?;
        let loader = loader_for(&options)?;
        Ok(Self::new(options, loader, target)?)
    }

    /// Where the model is loaded from.
    pub fn source(&self) -> String {
        self.loader.source()
    }

    pub fn info(&self) -> &WidgetOptions {
        &self.options
    }

    pub fn state(&self) -> WidgetState {
        self.state
    }

    pub fn model(&self) -> Option<&BandModel> {
        self.model.as_ref()
    }

    pub fn scale(&self) -> Option<&LinearScale> {
        self.scale.as_ref()
    }

    pub fn scene(&self) -> Option<&KaryotypeScene> {
        self.scene.as_ref()
    }

    pub fn target(&self) -> &T {
        &self.target
    }

    pub fn target_mut(&mut self) -> &mut T {
        &mut self.target
    }

    pub fn into_target(self) -> T {
        self.target
    }

    pub fn on<F>(&mut self, kind: EventKind, callback: F) -> SubscriptionId
    where
        F: FnMut(&ChromosomeEvent) + 'static,
    {
        self.events.on(kind, callback)
    }

    pub fn on_any<F>(&mut self, callback: F) -> SubscriptionId
    where
        F: FnMut(&ChromosomeEvent) + 'static,
    {
        self.events.on_any(callback)
    }

    pub fn off(&mut self, id: SubscriptionId) -> bool {
        self.events.off(id)
    }

    /// Load the model and render it. Single shot: no retry, no timeout.
    pub fn draw(&mut self) -> WidgetState {
        let ticket = self.begin_draw();
        info!("Loading band model from {}", self.loader.source());
        let result = self.loader.load_model();
        self.complete_draw(ticket, result)
    }

    /// Enter `Loading`. The returned ticket is passed to
    /// [`complete_draw`](Self::complete_draw) once the model is available.
    pub fn begin_draw(&mut self) -> DrawTicket {
        self.generation += 1;
        self.state = WidgetState::Loading;
        debug!("draw #{} started for segment {}", self.generation, self.options.segment);
        DrawTicket { generation: self.generation }
    }

    /// Finish a draw with the loader's outcome. Overlapping draws are not
    /// cancelled: whichever completes last determines the widget state.
    pub fn complete_draw(&mut self, ticket: DrawTicket, result: Result<BandModel, LoadError>) -> WidgetState {
        if ticket.generation != self.generation {
            warn!(
                "draw #{} completed after draw #{} started; it replaces the current state",
                ticket.generation, self.generation
            );
        }

        self.model = None;
        self.scale = None;
        self.hovered = None;
        self.scene = None;
        self.selection.detach();

        let model = match result.and_then(|m| validate_model(&m).map(|_| m)) {
            Ok(model) => model,
            Err(e) => {
                error!("Failed to load segment {}: {}", self.options.segment, e);
                return self.fail(FailureKind::Load, e.to_string());
            }
        };

        let scale = match layout::build_scale(&self.options, &model) {
            Ok(scale) => scale,
            Err(e) => {
                error!("Cannot lay out segment {}: {}", model.id, e);
                self.model = Some(model);
                return self.fail(FailureKind::Scale, e.to_string());
            }
        };

        let model_id = model.id.clone();
        self.model = Some(model);

        if !self.target.has_target(&self.options.target) {
            warn!("invalid html target handle: {}", self.options.target);
            self.fail(FailureKind::Target, format!("invalid render target {}", self.options.target));
        } else {
            self.scale = Some(scale);
            self.selection.attach(scale);
            self.state = WidgetState::Rendered;
            self.refresh();
            if self.state == WidgetState::Rendered {
                info!("Rendered segment {} ({} bands)", model_id, self.model.as_ref().map_or(0, |m| m.bands.len()));
            }
        }

        self.events.trigger(&ChromosomeEvent::ModelLoaded { id: model_id });
        self.state
    }

    pub fn move_selector_to(&mut self, start: f64, end: f64) -> Result<(), SelectionError> {
        self.selection.move_selector_to(start, end)?;
        self.refresh();
        Ok(())
    }

    pub fn get_current_selection(&self) -> Option<Selection> {
        self.selection.get_current_selection()
    }

    /// Show the label of the band under `px`. Returns the band id.
    pub fn hover(&mut self, px: f64) -> Option<String> {
        let id = self.scene.as_ref()?.band_at(px)?.id.clone();
        self.hover_band(&id).then_some(id)
    }

    pub fn hover_band(&mut self, band_id: &str) -> bool {
        let Some(index) = self.band_index(band_id) else {
            return false;
        };
        self.hovered = Some(index);
        self.refresh();
        true
    }

    /// Click the band under `px`. Returns the band id.
    pub fn click(&mut self, px: f64) -> Option<String> {
        let id = self.scene.as_ref()?.band_at(px)?.id.clone();
        self.click_band(&id).map(|_| id)
    }

    /// Select a band's extent and announce it with `bandSelection`.
    pub fn click_band(&mut self, band_id: &str) -> Option<Selection> {
        let index = self.band_index(band_id)?;
        let band = self.model.as_ref()?.bands.get(index)?.clone();
        let (start, end) = (band.start_pos as f64, band.end_pos as f64);

        if let Err(e) = self.selection.move_selector_to(start, end) {
            warn!("band {} has an unusable extent: {}", band.id, e);
        }
        self.refresh();

        self.events.trigger(&ChromosomeEvent::BandSelection {
            segment: self.options.segment.clone(),
            band_id: band.id,
            start,
            end,
        });
        Some(Selection::new(start, end))
    }

    pub fn brush_handle_at(&self, px: f64) -> Option<BrushHandle> {
        self.selection.hit_test(px)
    }

    /// Drag a brush handle and announce the new extent with `selectionChange`.
    pub fn drag(&mut self, handle: BrushHandle, from_px: f64, to_px: f64) -> Option<Selection> {
        if self.state != WidgetState::Rendered {
            return None;
        }
        let before = self.selection.get_current_selection();
        let selection = self.selection.drag(handle, from_px, to_px)?;
        self.refresh();
        if self.state != WidgetState::Rendered {
            return None;
        }
        if before == Some(selection) {
            return Some(selection);
        }
        self.events.trigger(&ChromosomeEvent::SelectionChange {
            segment: self.options.segment.clone(),
            start: selection.start,
            end: selection.end,
        });
        Some(selection)
    }

    /// Press at `from_px`, release at `to_px`: drags whichever handle was hit.
    pub fn pointer_drag(&mut self, from_px: f64, to_px: f64) -> Option<Selection> {
        let handle = self.brush_handle_at(from_px)?;
        self.drag(handle, from_px, to_px)
    }

    fn band_index(&self, band_id: &str) -> Option<usize> {
        if self.state != WidgetState::Rendered {
            return None;
        }
        self.model.as_ref()?.bands.iter().position(|b| b.id == band_id)
    }

    /// Rebuild the scene and present it. Only meaningful while rendered.
    fn refresh(&mut self) {
        if self.state != WidgetState::Rendered {
            return;
        }
        let (Some(model), Some(scale)) = (self.model.as_ref(), self.scale.as_ref()) else {
            return;
        };
        let hovered = self.hovered.and_then(|i| model.bands.get(i));
        let scene = KaryotypeScene::build(&self.options, model, scale, hovered, self.selection.selector());

        if let Err(e) = self.target.present(&self.options.target, &scene) {
            warn!("{}", e);
            self.selection.detach();
            self.scale = None;
            self.fail(FailureKind::Target, e.to_string());
            return;
        }
        self.scene = Some(scene);
    }

    fn fail(&mut self, kind: FailureKind, message: String) -> WidgetState {
        self.state = WidgetState::Failed(kind);
        self.events.trigger(&ChromosomeEvent::Error {
            segment: self.options.segment.clone(),
            message,
        });
        self.state
    }
}

impl<T: RenderTarget + std::fmt::Debug> std::fmt::Debug for Chromosome<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Chromosome")
            .field("options", &self.options)
            .field("source", &self.loader.source())
            .field("target", &self.target)
            .field("state", &self.state)
            .finish()
    }
}
