//! Derive macros for the particle-fx effects core.
//!
//! This crate provides one derive macro:
//!
//! - [`ParticleKind`] - Wire-code conversion and per-variant tracer widths
//!   for particle type enums
//!
//! # Usage
//!
//! The macro is re-exported from the main `particle_fx` crate. You don't need
//! to add this crate directly:
//!
//! ```ignore
//! use particle_fx::ParticleKind;
//!
//! #[derive(ParticleKind, Clone, Copy, PartialEq, Debug)]
//! enum Kind {
//!     #[tracer_width(1.5)]
//!     Static,
//!     #[tracer_width(0.5)]
//!     Grav,
//!     Fire, // defaults to 1.0
//! }
//! ```
//!
//! It generates:
//! - `From<EnumName> for u8` - Convert variant to its wire code
//! - `From<u8> for EnumName` - Convert back (unknown codes map to the first variant)
//! - `EnumName::count() -> u16` - Number of variants
//! - `EnumName::tracer_width(self) -> f32` - Ribbon half-width for tracers of this kind

use proc_macro::TokenStream;
use quote::quote;
use syn::{parse_macro_input, Attribute, Data, DeriveInput, Fields, LitFloat};

const DEFAULT_TRACER_WIDTH: f32 = 1.0;

/// Derive macro for particle type enums.
///
/// Variants are assigned sequential codes starting from 0, in declaration
/// order. Each variant may carry a `#[tracer_width(N)]` attribute giving the
/// ribbon half-width used when a particle of that kind is drawn as a tracer.
/// Variants without the attribute use `1.0`.
///
/// # Requirements
///
/// - Must be an enum (not a struct)
/// - All variants must be unit variants (no fields)
/// - At most 256 variants
///
/// # Panics
///
/// The macro panics at compile time if:
/// - Applied to a struct instead of an enum
/// - Any variant has fields (tuple or struct variants)
/// - Enum has zero variants or more than 256
#[proc_macro_derive(ParticleKind, attributes(tracer_width))]
pub fn derive_particle_kind(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    let name = &input.ident;

    let variants = match &input.data {
        Data::Enum(data) => &data.variants,
        _ => panic!("ParticleKind derive only supports enums"),
    };

    for variant in variants.iter() {
        if !matches!(variant.fields, Fields::Unit) {
            panic!(
                "ParticleKind enum variants must be unit variants (no fields). \
                 Found fields on variant '{}'",
                variant.ident
            );
        }
    }

    if variants.is_empty() || variants.len() > 256 {
        panic!("ParticleKind enum must have between 1 and 256 variants");
    }

    let mut widths = Vec::with_capacity(variants.len());
    for variant in variants.iter() {
        match tracer_width(&variant.attrs) {
            Ok(width) => widths.push(width),
            Err(err) => return err.into_compile_error().into(),
        }
    }

    let into_arms: Vec<_> = variants
        .iter()
        .enumerate()
        .map(|(i, variant)| {
            let variant_name = &variant.ident;
            let code = i as u8;
            quote! { #name::#variant_name => #code }
        })
        .collect();

    let from_arms: Vec<_> = variants
        .iter()
        .enumerate()
        .map(|(i, variant)| {
            let variant_name = &variant.ident;
            let code = i as u8;
            quote! { #code => #name::#variant_name }
        })
        .collect();

    let width_arms: Vec<_> = variants
        .iter()
        .zip(widths.iter())
        .map(|(variant, width)| {
            let variant_name = &variant.ident;
            quote! { #name::#variant_name => #width }
        })
        .collect();

    let first_variant = &variants[0].ident;
    // u8 cannot hold 256, so the count is a u16.
    let variant_count = variants.len() as u16;

    let expanded = quote! {
        impl From<#name> for u8 {
            fn from(value: #name) -> u8 {
                match value {
                    #(#into_arms),*
                }
            }
        }

        impl From<u8> for #name {
            #[allow(unreachable_patterns)]
            fn from(value: u8) -> #name {
                match value {
                    #(#from_arms,)*
                    _ => #name::#first_variant,
                }
            }
        }

        impl #name {
            /// Returns the number of variants in this kind enum.
            pub const fn count() -> u16 {
                #variant_count
            }

            /// Ribbon half-width used when this kind is drawn as a tracer.
            pub const fn tracer_width(self) -> f32 {
                match self {
                    #(#width_arms),*
                }
            }
        }
    };

    TokenStream::from(expanded)
}

/// Reads `#[tracer_width(N)]` from a variant's attributes.
fn tracer_width(attrs: &[Attribute]) -> syn::Result<f32> {
    for attr in attrs {
        if attr.path().is_ident("tracer_width") {
            let lit: LitFloat = attr.parse_args()?;
            let width: f32 = lit.base10_parse()?;
            if !(width > 0.0) {
                return Err(syn::Error::new_spanned(lit, "tracer_width must be positive"));
            }
            return Ok(width);
        }
    }
    Ok(DEFAULT_TRACER_WIDTH)
}
