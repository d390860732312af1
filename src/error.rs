//! Error types for particle-fx.
//!
//! The per-frame passes never fail: empty lists, disabled drawing and
//! out-of-range values are ordinary branches. The errors here come from the
//! edges of the crate, where a backend resource is missing or caller data is
//! malformed.

use std::fmt;

use crate::backend::TextureId;

/// Errors reported by a [`RenderBackend`](crate::backend::RenderBackend).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendError {
    /// The requested texture is not loaded or not registered with the backend.
    TextureUnavailable(TextureId),
}

impl fmt::Display for BackendError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BackendError::TextureUnavailable(id) => {
                write!(f, "Texture {} is not available to the render backend", id.0)
            }
        }
    }
}

impl std::error::Error for BackendError {}

/// Errors that can occur when building a [`Palette`](crate::palette::Palette).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PaletteError {
    /// Raw palette data was not exactly 256 RGB triples.
    InvalidLength(usize),
}

impl fmt::Display for PaletteError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PaletteError::InvalidLength(len) => write!(
                f,
                "Palette data must be 768 bytes (256 RGB triples), got {} bytes",
                len
            ),
        }
    }
}

impl std::error::Error for PaletteError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backend_error_display() {
        let err = BackendError::TextureUnavailable(TextureId(7));
        assert!(err.to_string().contains("Texture 7"));
    }

    #[test]
    fn test_palette_error_display() {
        let err = PaletteError::InvalidLength(12);
        assert!(err.to_string().contains("12 bytes"));
    }
}
