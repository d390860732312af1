//! Camera-facing billboard pass.
//!
//! One alpha-blended batch for the whole list. Each particle is drawn as a
//! square spanned by the camera's right and up vectors, grown slightly with
//! distance so far particles stay visible, then handed to the think step.

use glam::Vec3;

use crate::backend::{QuadVertex, RenderBackend, RenderState};
use crate::config::EffectsConfig;
use crate::evolution::{billboard_alpha, ParticleThink};
use crate::particle::Particle;
use crate::renderer::EffectsRenderer;
use crate::view::ViewContext;

/// View depth beyond which billboards start growing.
pub const GROWTH_START_DEPTH: f32 = 20.0;

/// Half-size added per unit of view depth past [`GROWTH_START_DEPTH`].
pub const GROWTH_PER_UNIT: f32 = 0.002;

/// Half-size of a billboard at `origin`.
///
/// Near the eye the base size is used as is, which keeps particles crossing
/// the near plane from ballooning or vanishing.
pub fn billboard_half_size(view: &ViewContext, base: f32, origin: Vec3) -> f32 {
    let depth = view.depth_of(origin);
    if depth > GROWTH_START_DEPTH {
        base + depth * GROWTH_PER_UNIT
    } else {
        base
    }
}

/// Corners of a billboard. `right` and `up` are already scaled to the
/// half-size.
pub fn billboard_quad(origin: Vec3, right: Vec3, up: Vec3, color: [u8; 4]) -> [QuadVertex; 4] {
    [
        QuadVertex::new(origin - right + up, [0.0, 1.0], color),
        QuadVertex::new(origin + right + up, [0.0, 0.0], color),
        QuadVertex::new(origin + right - up, [1.0, 0.0], color),
        QuadVertex::new(origin - right - up, [1.0, 1.0], color),
    ]
}

impl EffectsRenderer {
    /// Draw every particle in `particles` as a billboard and advance it.
    ///
    /// Particles are visited once, in order. Fully faded blobs are not
    /// drawn but are still advanced. `think` runs after each particle's
    /// geometry is emitted and receives the view's frame time.
    ///
    /// Nothing happens when billboards are disabled, the list is empty or the
    /// particle texture cannot be bound.
    pub fn draw_particles<'p, B, T, I>(
        &mut self,
        backend: &mut B,
        particles: I,
        config: &EffectsConfig,
        think: &mut T,
    ) where
        B: RenderBackend + ?Sized,
        T: ParticleThink + ?Sized,
        I: IntoIterator<Item = &'p mut Particle>,
    {
        if !config.draw_particles {
            return;
        }

        let mut particles = particles.into_iter().peekable();
        if particles.peek().is_none() {
            return;
        }

        if let Err(err) = backend.bind_texture(self.textures.particle) {
            log::debug!("Skipping particle pass: {}", err);
            return;
        }

        backend.begin(RenderState::BILLBOARD);

        let base = config.base_half_size();
        let frametime = self.view.frametime;
        let mut drawn = 0;

        for particle in particles {
            if !particle.is_faded_blob() {
                let quad = self.billboard_for(particle, base);
                backend.push_quad(&quad);
                drawn += 1;
            }

            think.think(frametime, particle);
        }

        backend.end();

        self.stats.particles += drawn;
        log::trace!("Particle pass emitted {} billboards", drawn);
    }

    fn billboard_for(&self, particle: &Particle, base: f32) -> [QuadVertex; 4] {
        let view = &self.view;
        let size = billboard_half_size(view, base, particle.origin);

        let [r, g, b] = self.gamma.apply_rgb(self.palette.color(particle.color));
        let alpha = billboard_alpha(particle.kind, particle.die, view.time);

        billboard_quad(
            particle.origin,
            view.right * size,
            view.up * size,
            [r, g, b, alpha],
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{QuadBatcher, TextureId};
    use crate::particle::ParticleKind;
    use crate::renderer::EffectTextures;
    use glam::Mat4;

    const PARTICLE_TEX: TextureId = TextureId(1);

    fn view() -> ViewContext {
        let proj = Mat4::perspective_rh(90f32.to_radians(), 1.0, 4.0, 4096.0);
        ViewContext::new(Vec3::new(100.0, 0.0, 0.0), Vec3::NEG_X, Vec3::Z, proj).with_time(10.0, 0.1)
    }

    fn renderer() -> EffectsRenderer {
        EffectsRenderer::new(
            view(),
            EffectTextures {
                particle: PARTICLE_TEX,
                tracer: TextureId(2),
            },
        )
    }

    fn backend() -> QuadBatcher {
        let mut backend = QuadBatcher::new();
        backend.register_texture(PARTICLE_TEX);
        backend
    }

    #[test]
    fn test_half_size_near_camera_is_base() {
        let view = view();
        assert_eq!(billboard_half_size(&view, 2.0, Vec3::new(90.0, 0.0, 0.0)), 2.0);
        assert_eq!(billboard_half_size(&view, 2.0, Vec3::new(200.0, 0.0, 0.0)), 2.0);
    }

    #[test]
    fn test_half_size_grows_with_depth() {
        let size = billboard_half_size(&view(), 2.0, Vec3::ZERO);
        assert!((size - 2.2).abs() < 1e-5);
    }

    #[test]
    fn test_quad_faces_camera() {
        let quad = billboard_quad(Vec3::ZERO, Vec3::Y, Vec3::Z, [0; 4]);
        let center = quad.iter().fold(Vec3::ZERO, |acc, v| acc + v.pos()) / 4.0;
        assert!(center.length() < 1e-6);
        for v in &quad {
            // All corners lie in the plane facing the camera along X.
            assert_eq!(v.position[0], 0.0);
        }
        assert_eq!(quad[0].uv, [0.0, 1.0]);
        assert_eq!(quad[2].uv, [1.0, 0.0]);
    }

    #[test]
    fn test_disabled_pass_is_noop() {
        let mut renderer = renderer();
        let mut backend = backend();
        let mut config = EffectsConfig::new();
        config.draw_particles(false);
        let mut particles = vec![Particle::new(ParticleKind::Static, Vec3::ZERO)];
        let mut calls = 0;

        renderer.draw_particles(&mut backend, &mut particles, &config, &mut |_: f32, _: &mut Particle| calls += 1);

        assert_eq!(backend.quad_count(), 0);
        assert_eq!(calls, 0);
    }

    #[test]
    fn test_empty_list_is_noop() {
        let mut renderer = renderer();
        let mut backend = backend();
        let mut particles: Vec<Particle> = Vec::new();

        renderer.draw_particles(&mut backend, &mut particles, &EffectsConfig::new(), &mut |_: f32, _: &mut Particle| {});

        assert!(backend.batches().is_empty());
    }

    #[test]
    fn test_missing_texture_skips_pass() {
        let mut renderer = renderer();
        let mut backend = QuadBatcher::new();
        let mut particles = vec![Particle::new(ParticleKind::Static, Vec3::ZERO)];
        let mut calls = 0;

        renderer.draw_particles(&mut backend, &mut particles, &EffectsConfig::new(), &mut |_: f32, _: &mut Particle| calls += 1);

        assert_eq!(backend.quad_count(), 0);
        assert_eq!(calls, 0);
        assert!(!backend.is_open());
    }

    #[test]
    fn test_think_receives_view_frametime() {
        let mut renderer = renderer();
        renderer.set_time(10.0, 0.25);
        let mut backend = backend();
        let mut particles = vec![Particle::new(ParticleKind::Static, Vec3::ZERO)];
        let mut seen = Vec::new();

        renderer.draw_particles(&mut backend, &mut particles, &EffectsConfig::new(), &mut |dt: f32, _: &mut Particle| seen.push(dt));

        assert_eq!(seen, vec![0.25]);
    }

    #[test]
    fn test_color_goes_through_palette_and_gamma() {
        let mut palette = crate::palette::Palette::grayscale();
        palette.set_color(255, [10, 20, 30]);
        let mut renderer = renderer().with_palette(palette);
        let mut backend = backend();
        let mut particles = vec![Particle::new(ParticleKind::Static, Vec3::ZERO).with_color(999)];

        renderer.draw_particles(&mut backend, &mut particles, &EffectsConfig::new(), &mut |_: f32, _: &mut Particle| {});

        let quad = backend.quads().next().unwrap();
        assert_eq!(quad[0].color, [10, 20, 30, 255]);
    }
}
