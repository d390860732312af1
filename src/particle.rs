//! Particle records shared between the effect pool and the passes.
//!
//! The pool owns storage and ordering. A pass borrows each particle mutably,
//! reads it, and writes the next frame's state back in place. It never adds,
//! removes or reorders entries, so any container that yields `&mut Particle`
//! in order can be handed to a pass: a slice, a `Vec`, a `VecDeque`, a
//! `LinkedList`, or a pool's own iterator.

use glam::Vec3;

/// Per-particle advance callback used by [`ParticleKind::ClientCustom`].
///
/// Receives the particle and the frame time in seconds.
pub type CustomThink = fn(&mut Particle, f32);

/// Effect type of a particle.
///
/// The kind is fixed at spawn time. It selects the tracer ribbon width, the
/// fade law and the state evolution rule. Wire codes follow declaration
/// order (`Static` = 0 .. `ClientCustom` = 10); unknown codes decode to
/// `Static`.
#[derive(particle_fx_derive::ParticleKind, Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ParticleKind {
    /// No motion rule; always drawn at full alpha as a billboard.
    #[default]
    #[tracer_width(1.5)]
    Static,
    /// Full gravity. Tracers of this kind also lose horizontal speed and fade.
    #[tracer_width(0.5)]
    Grav,
    /// Slow, constant descent.
    SlowGrav,
    /// Rising ember walking the fire color ramp.
    Fire,
    /// Accelerating explosion debris.
    Explode,
    /// Decelerating explosion debris.
    Explode2,
    /// Blob explosion. A blob with `packed_color == 255` is fully faded.
    Blob,
    /// Blob explosion with horizontal drag.
    Blob2,
    /// Slow gravity for voxel debris.
    VoxSlowGrav,
    /// Gravity for voxel debris.
    VoxGrav,
    /// Advanced by the particle's own [`CustomThink`] callback.
    ClientCustom,
}

/// Sentinel packed color marking a blob as fully faded.
pub const BLOB_FADED: u8 = 255;

/// A short-lived effect entity.
#[derive(Debug, Clone, PartialEq)]
pub struct Particle {
    /// Effect type; never changes after spawn.
    pub kind: ParticleKind,
    /// World position.
    pub origin: Vec3,
    /// Velocity in units per second.
    pub velocity: Vec3,
    /// Palette index for billboards, tracer color slot for tracers.
    ///
    /// May hold out-of-range values; readers clamp.
    pub color: i32,
    /// Derived intensity. Tracer alpha, blob fade sentinel.
    pub packed_color: u8,
    /// Tracer trail length multiplier, or ramp position for the fire and
    /// explosion rules.
    pub ramp: f32,
    /// Absolute time at which the particle expires.
    pub die: f32,
    /// Advance callback for [`ParticleKind::ClientCustom`].
    pub custom: Option<CustomThink>,
}

impl Default for Particle {
    fn default() -> Self {
        Self {
            kind: ParticleKind::Static,
            origin: Vec3::ZERO,
            velocity: Vec3::ZERO,
            color: 0,
            packed_color: 255,
            ramp: 1.0,
            die: 0.0,
            custom: None,
        }
    }
}

impl Particle {
    /// Create a particle of the given kind at `origin`.
    pub fn new(kind: ParticleKind, origin: Vec3) -> Self {
        Self {
            kind,
            origin,
            ..Self::default()
        }
    }

    /// Set the velocity.
    pub fn with_velocity(mut self, velocity: Vec3) -> Self {
        self.velocity = velocity;
        self
    }

    /// Set the palette index or tracer color slot.
    pub fn with_color(mut self, color: i32) -> Self {
        self.color = color;
        self
    }

    /// Set the packed color (tracer alpha, blob sentinel).
    pub fn with_packed_color(mut self, packed_color: u8) -> Self {
        self.packed_color = packed_color;
        self
    }

    /// Set the ramp factor.
    pub fn with_ramp(mut self, ramp: f32) -> Self {
        self.ramp = ramp;
        self
    }

    /// Set the absolute expiry time.
    pub fn with_die(mut self, die: f32) -> Self {
        self.die = die;
        self
    }

    /// Set the custom advance callback.
    pub fn with_custom(mut self, custom: CustomThink) -> Self {
        self.custom = Some(custom);
        self
    }

    /// Palette index clamped into `0..=255`.
    #[inline]
    pub fn palette_index(&self) -> u8 {
        self.color.clamp(0, 255) as u8
    }

    /// Whether this is a blob that has fully faded out.
    #[inline]
    pub fn is_faded_blob(&self) -> bool {
        self.kind == ParticleKind::Blob && self.packed_color == BLOB_FADED
    }

    /// Whether the particle has expired at time `now`.
    #[inline]
    pub fn is_expired(&self, now: f32) -> bool {
        self.die < now
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_wire_codes() {
        assert_eq!(u8::from(ParticleKind::Static), 0);
        assert_eq!(u8::from(ParticleKind::Grav), 1);
        assert_eq!(u8::from(ParticleKind::Blob), 6);
        assert_eq!(u8::from(ParticleKind::ClientCustom), 10);
        assert_eq!(ParticleKind::from(2u8), ParticleKind::SlowGrav);
        assert_eq!(ParticleKind::count(), 11);
    }

    #[test]
    fn test_unknown_code_decodes_to_static() {
        assert_eq!(ParticleKind::from(200u8), ParticleKind::Static);
    }

    #[test]
    fn test_tracer_widths() {
        assert_eq!(ParticleKind::Static.tracer_width(), 1.5);
        assert_eq!(ParticleKind::Grav.tracer_width(), 0.5);
        assert_eq!(ParticleKind::SlowGrav.tracer_width(), 1.0);
        assert_eq!(ParticleKind::ClientCustom.tracer_width(), 1.0);
    }

    #[test]
    fn test_palette_index_clamps() {
        assert_eq!(Particle::default().with_color(-5).palette_index(), 0);
        assert_eq!(Particle::default().with_color(300).palette_index(), 255);
        assert_eq!(Particle::default().with_color(17).palette_index(), 17);
    }

    #[test]
    fn test_faded_blob() {
        let blob = Particle::new(ParticleKind::Blob, Vec3::ZERO);
        assert!(blob.is_faded_blob());
        assert!(!blob.clone().with_packed_color(10).is_faded_blob());
        assert!(!Particle::new(ParticleKind::Blob2, Vec3::ZERO).is_faded_blob());
    }
}
