//! The effects renderer: shared state for the billboard pass, the tracer
//! pass and the external dispatch bridge.
//!
//! The passes themselves live in [`crate::billboard`], [`crate::tracer`] and
//! [`crate::dispatch`] as further `impl EffectsRenderer` blocks.

use crate::backend::TextureId;
use crate::palette::{GammaTable, Palette, TracerColors};
use crate::view::ViewContext;

/// Textures the passes bind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EffectTextures {
    /// Soft round sprite for billboards.
    pub particle: TextureId,
    /// Dot sprite for tracer ribbons.
    pub tracer: TextureId,
}

/// Counters for the current frame.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameStats {
    /// Billboards emitted.
    pub particles: u32,
    /// Tracer ribbons emitted.
    pub tracers: u32,
    /// Tracers rejected by the frustum test.
    pub tracers_culled: u32,
}

/// Owner of the view, color tables and counters used by the passes.
#[derive(Debug, Clone)]
pub struct EffectsRenderer {
    pub(crate) view: ViewContext,
    pub(crate) palette: Palette,
    pub(crate) gamma: GammaTable,
    pub(crate) tracer_colors: TracerColors,
    pub(crate) textures: EffectTextures,
    pub(crate) stats: FrameStats,
}

impl EffectsRenderer {
    /// Create a renderer with a grayscale palette and linear gamma.
    pub fn new(view: ViewContext, textures: EffectTextures) -> Self {
        Self {
            view,
            palette: Palette::default(),
            gamma: GammaTable::default(),
            tracer_colors: TracerColors::default(),
            textures,
            stats: FrameStats::default(),
        }
    }

    /// Replace the billboard palette.
    pub fn with_palette(mut self, palette: Palette) -> Self {
        self.palette = palette;
        self
    }

    /// Replace the gamma table.
    pub fn with_gamma(mut self, gamma: GammaTable) -> Self {
        self.gamma = gamma;
        self
    }

    /// Current view.
    pub fn view(&self) -> &ViewContext {
        &self.view
    }

    /// Replace the view, typically once per frame.
    pub fn set_view(&mut self, view: ViewContext) {
        self.view = view;
    }

    /// Advance the clock without touching the camera.
    pub fn set_time(&mut self, time: f32, frametime: f32) {
        self.view.time = time;
        self.view.frametime = frametime;
    }

    pub fn palette(&self) -> &Palette {
        &self.palette
    }

    pub fn gamma(&self) -> &GammaTable {
        &self.gamma
    }

    /// Cached tracer colors.
    pub fn tracer_colors(&self) -> &TracerColors {
        &self.tracer_colors
    }

    pub fn textures(&self) -> EffectTextures {
        self.textures
    }

    /// Counters accumulated since the last [`reset_stats`](Self::reset_stats).
    pub fn stats(&self) -> FrameStats {
        self.stats
    }

    /// Zero the counters, usually at the start of a frame.
    pub fn reset_stats(&mut self) {
        self.stats = FrameStats::default();
    }
}
