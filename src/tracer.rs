//! Tracer ribbon pass.
//!
//! A tracer is drawn as a thin quad stretched along its recent motion. The
//! ribbon's width direction is chosen in screen space, perpendicular to the
//! projected motion, so the ribbon always shows its full width to the
//! camera. Tracers are blended additively.

use glam::Vec3;

use crate::backend::{QuadVertex, RenderBackend, RenderState};
use crate::config::EffectsConfig;
use crate::cull::Aabb;
use crate::evolution::{tracer_delta, TracerMotion};
use crate::palette::TracerColorSettings;
use crate::particle::Particle;
use crate::project::world_to_screen;
use crate::renderer::EffectsRenderer;
use crate::view::ViewContext;

/// Texture `v` at the far end of the ribbon.
const RIBBON_TAIL_V: f32 = 0.8;

/// World-space half-width offset of a ribbon from `start` to `end`.
///
/// The projected direction `d` of the segment, measured in viewport units,
/// gets the screen-space normal `(d.y, -d.x)` (screen `y` points down), which
/// is rebuilt in world space from the camera's right and up vectors. A
/// segment that projects to a single point has no direction and yields a
/// zero offset.
pub fn ribbon_normal(view: &ViewContext, start: Vec3, end: Vec3, width: f32) -> Vec3 {
    let screen_start = world_to_screen(&view.view_proj, start).position;
    let screen_end = world_to_screen(&view.view_proj, end).position;

    let mut dir = screen_start - screen_end;
    // Normalized x and y span different pixel extents.
    dir.x *= view.aspect;
    dir.z = 0.0;
    let dir = dir.normalize_or_zero();

    view.up * (dir.x * width) + view.right * (dir.y * width)
}

/// Ribbon vertices for a tracer at `start` moving by `delta`.
///
/// Emitted tail first: `start + delta` corners carry `v = 0.8`, `start`
/// corners carry `v = 0`.
pub fn ribbon_quad(start: Vec3, delta: Vec3, normal: Vec3, color: [u8; 4]) -> [QuadVertex; 4] {
    let v0 = start - normal;
    let v1 = start + normal;
    let v2 = v0 + delta;
    let v3 = v1 + delta;

    [
        QuadVertex::new(v2, [0.0, RIBBON_TAIL_V], color),
        QuadVertex::new(v3, [1.0, RIBBON_TAIL_V], color),
        QuadVertex::new(v1, [1.0, 0.0], color),
        QuadVertex::new(v0, [0.0, 0.0], color),
    ]
}

impl EffectsRenderer {
    /// Fold changed tracer color settings into the cached color table.
    ///
    /// Returns whether the table was rewritten. All change flags are clear
    /// afterward.
    pub fn refresh_tracer_colors(&mut self, settings: &mut TracerColorSettings) -> bool {
        let refreshed = settings.refresh(&mut self.tracer_colors);
        if refreshed {
            log::debug!("Tracer color set to {:?}", self.tracer_colors.custom());
        }
        refreshed
    }

    /// Draw every tracer in `tracers` as a ribbon and advance it.
    ///
    /// Tracers are visited once, in order, and integrated over the view's
    /// frame time. Culled tracers are not drawn but
    /// are always moved and have their kind's rule applied. Changed tracer
    /// color settings in `config` are applied first, even when the list is
    /// empty.
    ///
    /// Nothing is drawn or advanced when tracers are disabled, the list is
    /// empty or the tracer texture cannot be bound.
    pub fn draw_tracers<'p, B, I>(
        &mut self,
        backend: &mut B,
        tracers: I,
        config: &mut EffectsConfig,
    ) where
        B: RenderBackend + ?Sized,
        I: IntoIterator<Item = &'p mut Particle>,
    {
        if !config.draw_tracers {
            return;
        }

        self.refresh_tracer_colors(&mut config.tracer_color);

        let mut tracers = tracers.into_iter().peekable();
        if tracers.peek().is_none() {
            return;
        }

        if let Err(err) = backend.bind_texture(self.textures.tracer) {
            log::debug!("Skipping tracer pass: {}", err);
            return;
        }

        backend.begin(RenderState::TRACER);

        let now = self.view.time;
        let motion = TracerMotion::for_frame(self.view.frametime, config.gravity);
        let mut drawn = 0;
        let mut culled = 0;

        for tracer in tracers {
            let delta = tracer_delta(tracer, now);
            let start = tracer.origin;
            let end = start + delta;
            let width = tracer.kind.tracer_width();

            let bounds = Aabb::tracer_bounds(start, end, width);
            if self.view.frustum.cull_box(&bounds) {
                culled += 1;
            } else {
                let normal = ribbon_normal(&self.view, start, end, width);
                let [r, g, b] = self.tracer_colors.color(tracer.color);
                let quad = ribbon_quad(start, delta, normal, [r, g, b, tracer.packed_color]);
                backend.push_quad(&quad);
                drawn += 1;
            }

            motion.advance(tracer, now);
        }

        backend.end();

        self.stats.tracers += drawn;
        self.stats.tracers_culled += culled;
        log::trace!("Tracer pass emitted {} ribbons, culled {}", drawn, culled);
    }
}
