//! Per-frame configuration for the effect passes.
//!
//! # Usage
//!
//! ```ignore
//! let mut config = EffectsConfig::new();
//! config.particle_size(2.0).gravity(600.0);
//! config.tracer_color.red(1.0).alpha(0.75);
//! ```

use crate::palette::TracerColorSettings;

/// Default world gravity in units per second squared.
pub const DEFAULT_GRAVITY: f32 = 800.0;

/// Smallest billboard half-size the particle pass will use.
pub const MIN_PARTICLE_SIZE: f32 = 0.5;

/// Settings read by the particle and tracer passes.
///
/// Everything but the tracer color settings is read-only during a frame.
/// The tracer pass consumes the color change flags, so it takes the config
/// mutably.
#[derive(Debug, Clone, PartialEq)]
pub struct EffectsConfig {
    /// Whether the billboard pass draws anything.
    pub draw_particles: bool,
    /// Whether the tracer pass draws anything.
    pub draw_tracers: bool,
    /// Base billboard half-size before distance scaling.
    pub particle_size: f32,
    /// World gravity magnitude.
    pub gravity: f32,
    /// Configurable tracer color channels.
    pub tracer_color: TracerColorSettings,
}

impl Default for EffectsConfig {
    fn default() -> Self {
        Self {
            draw_particles: true,
            draw_tracers: true,
            particle_size: 1.0,
            gravity: DEFAULT_GRAVITY,
            tracer_color: TracerColorSettings::default(),
        }
    }
}

impl EffectsConfig {
    /// Create a config with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable or disable the billboard pass.
    pub fn draw_particles(&mut self, enabled: bool) -> &mut Self {
        self.draw_particles = enabled;
        self
    }

    /// Enable or disable the tracer pass.
    pub fn draw_tracers(&mut self, enabled: bool) -> &mut Self {
        self.draw_tracers = enabled;
        self
    }

    /// Set the base billboard half-size.
    pub fn particle_size(&mut self, size: f32) -> &mut Self {
        self.particle_size = size;
        self
    }

    /// Set the world gravity magnitude.
    pub fn gravity(&mut self, gravity: f32) -> &mut Self {
        self.gravity = gravity;
        self
    }

    /// Billboard half-size actually used, never below [`MIN_PARTICLE_SIZE`].
    #[inline]
    pub fn base_half_size(&self) -> f32 {
        self.particle_size.max(MIN_PARTICLE_SIZE)
    }
}
