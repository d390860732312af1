//! Integration tests for the `ParticleKind` derive macro.
//!
//! These tests exercise the generated conversions and tracer widths on
//! user-defined kind enums as well as on the crate's own `ParticleKind`.

use particle_fx::ParticleKind;

// ============================================================================
// User-defined kinds
// ============================================================================

#[derive(ParticleKind, Clone, Copy, PartialEq, Debug)]
enum Debris {
    #[tracer_width(2.5)]
    Spark,
    Smoke,
    #[tracer_width(0.25)]
    Shard,
}

#[test]
fn test_kind_into_u8() {
    let spark: u8 = Debris::Spark.into();
    let smoke: u8 = Debris::Smoke.into();
    let shard: u8 = Debris::Shard.into();

    assert_eq!(spark, 0);
    assert_eq!(smoke, 1);
    assert_eq!(shard, 2);
}

#[test]
fn test_kind_from_u8() {
    let spark: Debris = 0u8.into();
    let smoke: Debris = 1u8.into();
    let shard: Debris = 2u8.into();

    assert_eq!(spark, Debris::Spark);
    assert_eq!(smoke, Debris::Smoke);
    assert_eq!(shard, Debris::Shard);
}

#[test]
fn test_unknown_code_defaults_to_first() {
    let unknown: Debris = 200u8.into();
    assert_eq!(unknown, Debris::Spark);
}

#[test]
fn test_kind_count() {
    assert_eq!(Debris::count(), 3);
}

#[test]
fn test_tracer_widths() {
    assert_eq!(Debris::Spark.tracer_width(), 2.5);
    assert_eq!(Debris::Smoke.tracer_width(), 1.0);
    assert_eq!(Debris::Shard.tracer_width(), 0.25);
}

#[test]
fn test_tracer_width_is_const() {
    const SPARK_WIDTH: f32 = Debris::Spark.tracer_width();
    assert_eq!(SPARK_WIDTH, 2.5);
}

#[derive(ParticleKind, Clone, Copy, PartialEq, Debug)]
enum SingleVariant {
    Only,
}

#[test]
fn test_single_variant_kind() {
    assert_eq!(SingleVariant::count(), 1);
    assert_eq!(u8::from(SingleVariant::Only), 0);
    let back: SingleVariant = 7u8.into();
    assert_eq!(back, SingleVariant::Only);
}

#[derive(ParticleKind, Clone, Copy, PartialEq, Debug)]
#[rustfmt::skip]
enum ManyVariants {
    A, B, C, D, E, F, G, H,
}

#[test]
fn test_many_variants_kind() {
    assert_eq!(ManyVariants::count(), 8);
    assert_eq!(u8::from(ManyVariants::A), 0);
    assert_eq!(u8::from(ManyVariants::H), 7);
    assert_eq!(ManyVariants::from(5), ManyVariants::F);
}

// ============================================================================
// The crate's own kinds
// ============================================================================

#[test]
fn test_builtin_wire_codes() {
    use particle_fx::particle::ParticleKind as Kind;

    assert_eq!(Kind::count(), 11);
    assert_eq!(u8::from(Kind::Static), 0);
    assert_eq!(u8::from(Kind::Grav), 1);
    assert_eq!(u8::from(Kind::Blob), 6);
    assert_eq!(u8::from(Kind::ClientCustom), 10);
    assert_eq!(Kind::from(11), Kind::Static);
}

#[test]
fn test_builtin_tracer_widths() {
    use particle_fx::particle::ParticleKind as Kind;

    assert_eq!(Kind::Static.tracer_width(), 1.5);
    assert_eq!(Kind::Grav.tracer_width(), 0.5);
    assert_eq!(Kind::SlowGrav.tracer_width(), 1.0);
    assert_eq!(Kind::VoxGrav.tracer_width(), 1.0);
}
