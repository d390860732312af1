//! Per-kind state evolution rules.
//!
//! Pure functions that map a particle's kind, the clock and its current
//! state to its next state: fade curves, tracer trail attenuation, the
//! tracer post-integration rules, and the standard think rules used by the
//! billboard pass.
//!
//! Nothing here removes particles. A rule that decides a particle is done
//! moves its `die` time into the past and reports [`Liveness::Dead`]; the
//! pool that owns the list drops it before the next frame.

use glam::Vec3;

use crate::particle::{Particle, ParticleKind};

/// Billboard alpha falls from 255 to 0 over the last 1/16 s of life.
pub const BILLBOARD_FADE_RATE: f32 = 16.0;

/// Gravity tracers fade over the last 1/2 s of life.
pub const TRACER_FADE_RATE: f32 = 2.0;

/// Upper bound on the tracer trail time factor.
pub const MAX_TRACER_ATTENUATION: f32 = 0.1;

/// Horizontal speed lost per second by gravity tracers.
pub const TRACER_DAMPING: f32 = 0.9;

/// Fraction of world gravity used by the slow-fall rules.
pub const SLOW_GRAVITY_SCALE: f32 = 0.05;

/// Explosion color ramp (palette indices).
pub const EXPLODE_RAMP: [i32; 8] = [0x6f, 0x6d, 0x6b, 0x69, 0x67, 0x65, 0x63, 0x61];

/// Secondary explosion color ramp.
pub const EXPLODE2_RAMP: [i32; 8] = [0x6f, 0x6e, 0x6d, 0x6c, 0x6b, 0x6a, 0x68, 0x66];

/// Fire color ramp.
pub const FIRE_RAMP: [i32; 6] = [0x6d, 0x6b, 6, 5, 4, 3];

/// Whether a particle should stay in the list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Liveness {
    Alive,
    Dead,
}

/// Convert an alpha value to `0..=255`, truncating toward zero.
#[inline]
pub fn clamp_alpha(value: f32) -> u8 {
    // NaN also lands on 0: `as` maps it there.
    value.clamp(0.0, 255.0) as u8
}

/// Alpha of a billboard at time `now`.
///
/// `Static` particles never fade.
pub fn billboard_alpha(kind: ParticleKind, die: f32, now: f32) -> u8 {
    match kind {
        ParticleKind::Static => 255,
        _ => clamp_alpha(255.0 * (die - now) * BILLBOARD_FADE_RATE),
    }
}

/// Packed color of a gravity tracer at time `now`.
pub fn tracer_fade(die: f32, now: f32) -> u8 {
    clamp_alpha(255.0 * (die - now) * TRACER_FADE_RATE)
}

/// Trail time factor: remaining life, capped at [`MAX_TRACER_ATTENUATION`].
#[inline]
pub fn tracer_attenuation(die: f32, now: f32) -> f32 {
    (die - now).min(MAX_TRACER_ATTENUATION)
}

/// World-space trail vector of a tracer at time `now`.
#[inline]
pub fn tracer_delta(particle: &Particle, now: f32) -> Vec3 {
    particle.velocity * (particle.ramp * tracer_attenuation(particle.die, now))
}

/// Tracer integration constants for one frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TracerMotion {
    frametime: f32,
    /// Horizontal velocity scale for gravity tracers, never negative.
    damping: f32,
    /// Vertical velocity lost this frame by gravity tracers.
    gravity_step: f32,
    /// Fixed vertical velocity of slow-gravity tracers.
    slow_fall: f32,
}

impl TracerMotion {
    /// Constants for a frame of `frametime` seconds under `gravity`.
    pub fn for_frame(frametime: f32, gravity: f32) -> Self {
        Self {
            frametime,
            damping: (1.0 - frametime * TRACER_DAMPING).max(0.0),
            gravity_step: frametime * gravity,
            slow_fall: -gravity * SLOW_GRAVITY_SCALE,
        }
    }

    /// Move a tracer one frame and apply its kind's post-integration rule.
    pub fn advance(&self, particle: &mut Particle, now: f32) {
        particle.origin += particle.velocity * self.frametime;

        match particle.kind {
            ParticleKind::Grav => {
                particle.velocity.x *= self.damping;
                particle.velocity.y *= self.damping;
                particle.velocity.z -= self.gravity_step;
                particle.packed_color = tracer_fade(particle.die, now);
            }
            ParticleKind::SlowGrav => {
                particle.velocity.z = self.slow_fall;
            }
            ParticleKind::Static
            | ParticleKind::Fire
            | ParticleKind::Explode
            | ParticleKind::Explode2
            | ParticleKind::Blob
            | ParticleKind::Blob2
            | ParticleKind::VoxSlowGrav
            | ParticleKind::VoxGrav
            | ParticleKind::ClientCustom => {}
        }
    }
}

/// Per-particle advance step run by the billboard pass after each particle.
pub trait ParticleThink {
    /// Advance `particle` by `frametime` seconds.
    fn think(&mut self, frametime: f32, particle: &mut Particle);
}

impl<F> ParticleThink for F
where
    F: FnMut(f32, &mut Particle),
{
    fn think(&mut self, frametime: f32, particle: &mut Particle) {
        self(frametime, particle)
    }
}

/// Standard think rules for every [`ParticleKind`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StandardThink {
    /// World gravity magnitude.
    pub gravity: f32,
    /// Current absolute time.
    pub now: f32,
}

impl StandardThink {
    pub fn new(gravity: f32, now: f32) -> Self {
        Self { gravity, now }
    }
}

impl ParticleThink for StandardThink {
    fn think(&mut self, frametime: f32, particle: &mut Particle) {
        advance_particle(particle, frametime, self.gravity, self.now);
    }
}

/// Apply the standard rule for `particle.kind` over `frametime` seconds.
pub fn advance_particle(particle: &mut Particle, frametime: f32, gravity: f32, now: f32) -> Liveness {
    let grav = frametime * gravity * SLOW_GRAVITY_SCALE;
    let dvel = 4.0 * frametime;

    if particle.kind != ParticleKind::ClientCustom {
        particle.origin += particle.velocity * frametime;
    }

    match particle.kind {
        ParticleKind::Static => {}
        ParticleKind::Fire => {
            particle.ramp += frametime * 5.0;
            if !step_ramp(particle, &FIRE_RAMP, now) {
                return Liveness::Dead;
            }
            particle.velocity.z += grav;
        }
        ParticleKind::Explode => {
            particle.ramp += frametime * 10.0;
            if !step_ramp(particle, &EXPLODE_RAMP, now) {
                return Liveness::Dead;
            }
            particle.velocity += particle.velocity * dvel;
            particle.velocity.z -= grav;
        }
        ParticleKind::Explode2 => {
            particle.ramp += frametime * 15.0;
            if !step_ramp(particle, &EXPLODE2_RAMP, now) {
                return Liveness::Dead;
            }
            particle.velocity -= particle.velocity * frametime;
            particle.velocity.z -= grav;
        }
        ParticleKind::Blob => {
            particle.velocity += particle.velocity * dvel;
            particle.velocity.z -= grav;
        }
        ParticleKind::Blob2 => {
            particle.velocity.x -= particle.velocity.x * dvel;
            particle.velocity.y -= particle.velocity.y * dvel;
            particle.velocity.z -= grav;
        }
        ParticleKind::Grav => particle.velocity.z -= grav * 20.0,
        ParticleKind::SlowGrav => particle.velocity.z -= grav,
        ParticleKind::VoxGrav => particle.velocity.z -= grav * 8.0,
        ParticleKind::VoxSlowGrav => particle.velocity.z -= grav * 4.0,
        ParticleKind::ClientCustom => {
            if let Some(custom) = particle.custom {
                custom(particle, frametime);
            }
        }
    }

    if particle.is_expired(now) {
        Liveness::Dead
    } else {
        Liveness::Alive
    }
}

/// Pick the ramp color for the particle's ramp position, or expire it once
/// the ramp is exhausted. Returns whether the particle is still alive.
fn step_ramp(particle: &mut Particle, ramp: &[i32], now: f32) -> bool {
    let step = particle.ramp.max(0.0) as usize;
    match ramp.get(step) {
        Some(&color) => {
            particle.color = color;
            true
        }
        None => {
            particle.die = particle.die.min(now - 1.0);
            false
        }
    }
}
