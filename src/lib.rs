//! # particle-fx
//!
//! Per-frame particle and tracer effects for a 3D renderer.
//!
//! The crate draws particle lists it does not own. Each frame the owner hands
//! over its active particles and tracers; the passes stream quads to a
//! [`RenderBackend`] and advance every particle in place. Nothing is added,
//! removed or reordered.
//!
//! ## Quick Start
//!
//! ```ignore
//! use particle_fx::prelude::*;
//!
//! let view = ViewContext::from_params(&ViewParams::default()).with_time(now, frametime);
//! let mut renderer = EffectsRenderer::new(view, EffectTextures { particle, tracer });
//! let mut config = EffectsConfig::new();
//! config.particle_size(2.0).gravity(800.0);
//!
//! let mut think = StandardThink::new(config.gravity, now);
//! renderer.draw_particles(&mut backend, &mut particles, &config, &mut think);
//! renderer.draw_tracers(&mut backend, &mut tracers, &mut config);
//! ```
//!
//! ## Passes
//!
//! | Pass | Blending | Per particle |
//! |------|----------|--------------|
//! | [`EffectsRenderer::draw_particles`] | alpha | camera-facing billboard, then think |
//! | [`EffectsRenderer::draw_tracers`] | additive | frustum cull, screen-aligned ribbon, then integrate |
//! | [`EffectsRenderer::draw_particles_external`] | n/a | runs an [`EffectDispatch`] under a temporary view |
//!
//! ## Backends
//!
//! [`QuadBatcher`] records batches in memory. [`gpu::QuadRenderer`] records
//! the same way and uploads the batches to wgpu.

pub mod backend;
mod billboard;
pub mod config;
pub mod cull;
mod dispatch;
pub mod error;
pub mod evolution;
pub mod gpu;
pub mod palette;
pub mod particle;
pub mod project;
mod renderer;
mod tracer;
pub mod view;

pub use backend::{BlendMode, DrawBatch, QuadBatcher, QuadVertex, RenderBackend, RenderState, TextureId};
pub use billboard::{billboard_half_size, billboard_quad};
pub use bytemuck;
pub use config::EffectsConfig;
pub use cull::{Aabb, Frustum};
pub use dispatch::{EffectDispatch, ViewScope};
pub use error::{BackendError, PaletteError};
pub use evolution::{advance_particle, Liveness, ParticleThink, StandardThink, TracerMotion};
pub use glam::{Mat4, Vec3};
pub use palette::{GammaTable, Palette, TracerChannel, TracerColorSettings, TracerColors};
pub use particle::{CustomThink, Particle, ParticleKind};
pub use particle_fx_derive::ParticleKind;
pub use project::{world_to_screen, ScreenPoint};
pub use renderer::{EffectTextures, EffectsRenderer, FrameStats};
pub use tracer::{ribbon_normal, ribbon_quad};
pub use view::{angle_vectors, ViewContext, ViewParams};

/// Convenient re-exports for common usage.
///
/// ```ignore
/// use particle_fx::prelude::*;
/// ```
pub mod prelude {
    pub use crate::backend::{BlendMode, QuadBatcher, RenderBackend, RenderState, TextureId};
    pub use crate::config::EffectsConfig;
    pub use crate::dispatch::EffectDispatch;
    pub use crate::evolution::{Liveness, ParticleThink, StandardThink};
    pub use crate::palette::{GammaTable, Palette, TracerChannel};
    pub use crate::particle::{Particle, ParticleKind};
    pub use crate::renderer::{EffectTextures, EffectsRenderer};
    pub use crate::view::{ViewContext, ViewParams};
    pub use crate::{Mat4, Vec3};
}
