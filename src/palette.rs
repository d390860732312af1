//! Color lookup for billboards and tracers.
//!
//! Billboards take their color from a 256-entry [`Palette`] and pass each
//! channel through a [`GammaTable`]. Tracers take theirs from the small
//! [`TracerColors`] table, whose last slot is driven by the four
//! [`TracerColorSettings`] channels.

use crate::error::PaletteError;

/// An 8-bit RGB triple.
pub type Rgb = [u8; 3];

/// Number of palette entries.
pub const PALETTE_SIZE: usize = 256;

/// 256-color palette indexed by a particle's color.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Palette {
    colors: [Rgb; PALETTE_SIZE],
}

impl Palette {
    /// Build a palette from 768 bytes of packed RGB triples.
    pub fn from_rgb_bytes(bytes: &[u8]) -> Result<Self, PaletteError> {
        if bytes.len() != PALETTE_SIZE * 3 {
            return Err(PaletteError::InvalidLength(bytes.len()));
        }

        let mut colors = [[0u8; 3]; PALETTE_SIZE];
        for (color, rgb) in colors.iter_mut().zip(bytes.chunks_exact(3)) {
            color.copy_from_slice(rgb);
        }
        Ok(Self { colors })
    }

    /// Grayscale ramp: entry `i` is `(i, i, i)`.
    pub fn grayscale() -> Self {
        let mut colors = [[0u8; 3]; PALETTE_SIZE];
        for (i, color) in colors.iter_mut().enumerate() {
            *color = [i as u8; 3];
        }
        Self { colors }
    }

    /// Look up a color. The index is clamped into `0..=255` first.
    #[inline]
    pub fn color(&self, index: i32) -> Rgb {
        self.colors[index.clamp(0, 255) as usize]
    }

    /// Replace a single entry.
    pub fn set_color(&mut self, index: u8, color: Rgb) {
        self.colors[index as usize] = color;
    }
}

impl Default for Palette {
    fn default() -> Self {
        Self::grayscale()
    }
}

/// Per-channel light-to-texture gamma correction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GammaTable {
    table: [u8; 256],
}

impl GammaTable {
    /// Identity mapping.
    pub fn linear() -> Self {
        let mut table = [0u8; 256];
        for (i, v) in table.iter_mut().enumerate() {
            *v = i as u8;
        }
        Self { table }
    }

    /// Correction for a display gamma: `out = 255 * (in / 255) ^ (1 / gamma)`.
    ///
    /// Non-positive or non-finite gamma falls back to [`GammaTable::linear`].
    pub fn from_gamma(gamma: f32) -> Self {
        if !gamma.is_finite() || gamma <= 0.0 {
            return Self::linear();
        }

        let exponent = 1.0 / gamma;
        let mut table = [0u8; 256];
        for (i, v) in table.iter_mut().enumerate() {
            let corrected = 255.0 * (i as f32 / 255.0).powf(exponent);
            *v = (corrected + 0.5).clamp(0.0, 255.0) as u8;
        }
        Self { table }
    }

    /// Correct one channel.
    #[inline]
    pub fn apply(&self, value: u8) -> u8 {
        self.table[value as usize]
    }

    /// Correct an RGB triple.
    #[inline]
    pub fn apply_rgb(&self, rgb: Rgb) -> Rgb {
        [self.apply(rgb[0]), self.apply(rgb[1]), self.apply(rgb[2])]
    }
}

impl Default for GammaTable {
    fn default() -> Self {
        Self::linear()
    }
}

/// Number of tracer color slots.
pub const TRACER_COLOR_SLOTS: usize = 5;

/// Slot written from [`TracerColorSettings`].
pub const CUSTOM_TRACER_SLOT: usize = 4;

/// Tracer color table: white, red, green, blue, then the configurable slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TracerColors {
    slots: [Rgb; TRACER_COLOR_SLOTS],
}

impl TracerColors {
    /// Look up a tracer color. The index is clamped into the table.
    #[inline]
    pub fn color(&self, index: i32) -> Rgb {
        self.slots[index.clamp(0, TRACER_COLOR_SLOTS as i32 - 1) as usize]
    }

    /// The configurable slot.
    #[inline]
    pub fn custom(&self) -> Rgb {
        self.slots[CUSTOM_TRACER_SLOT]
    }

    /// Overwrite the configurable slot.
    pub fn set_custom(&mut self, color: Rgb) {
        self.slots[CUSTOM_TRACER_SLOT] = color;
    }
}

impl Default for TracerColors {
    fn default() -> Self {
        Self {
            slots: [
                [255, 255, 255],
                [255, 0, 0],
                [0, 255, 0],
                [0, 0, 255],
                [0, 0, 0],
            ],
        }
    }
}

/// Channel of the configurable tracer color.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TracerChannel {
    Red = 0,
    Green = 1,
    Blue = 2,
    Alpha = 3,
}

/// The four tracer color settings with per-setting change flags.
///
/// Every setter marks its channel changed. The tracer pass folds the
/// settings into [`TracerColors`] when any flag is set and then clears all
/// four.
#[derive(Debug, Clone, PartialEq)]
pub struct TracerColorSettings {
    values: [f32; 4],
    changed: [bool; 4],
}

impl Default for TracerColorSettings {
    fn default() -> Self {
        Self {
            values: [0.8, 0.8, 0.4, 0.5],
            // Freshly registered settings count as changed.
            changed: [true; 4],
        }
    }
}

impl TracerColorSettings {
    /// Create settings from explicit channel values. All flags start set.
    pub fn new(red: f32, green: f32, blue: f32, alpha: f32) -> Self {
        Self {
            values: [red, green, blue, alpha],
            changed: [true; 4],
        }
    }

    /// Current value of a channel.
    #[inline]
    pub fn value(&self, channel: TracerChannel) -> f32 {
        self.values[channel as usize]
    }

    /// Whether a channel has changed since the last refresh.
    #[inline]
    pub fn is_changed(&self, channel: TracerChannel) -> bool {
        self.changed[channel as usize]
    }

    /// Whether any channel has changed since the last refresh.
    #[inline]
    pub fn any_changed(&self) -> bool {
        self.changed.iter().any(|&c| c)
    }

    /// Set a channel value and mark it changed.
    pub fn set(&mut self, channel: TracerChannel, value: f32) -> &mut Self {
        self.values[channel as usize] = value;
        self.changed[channel as usize] = true;
        self
    }

    /// Mark a channel changed without altering its value.
    pub fn mark_changed(&mut self, channel: TracerChannel) -> &mut Self {
        self.changed[channel as usize] = true;
        self
    }

    /// Set the red channel.
    pub fn red(&mut self, value: f32) -> &mut Self {
        self.set(TracerChannel::Red, value)
    }

    /// Set the green channel.
    pub fn green(&mut self, value: f32) -> &mut Self {
        self.set(TracerChannel::Green, value)
    }

    /// Set the blue channel.
    pub fn blue(&mut self, value: f32) -> &mut Self {
        self.set(TracerChannel::Blue, value)
    }

    /// Set the alpha channel. Alpha scales the other three.
    pub fn alpha(&mut self, value: f32) -> &mut Self {
        self.set(TracerChannel::Alpha, value)
    }

    /// Color the settings resolve to, each channel `value * alpha * 255`.
    pub fn resolve(&self) -> Rgb {
        let alpha = self.values[TracerChannel::Alpha as usize];
        // Float to int `as` casts saturate, which clamps into 0..=255.
        let channel = |c: TracerChannel| (self.values[c as usize] * alpha * 255.0) as u8;
        [
            channel(TracerChannel::Red),
            channel(TracerChannel::Green),
            channel(TracerChannel::Blue),
        ]
    }

    /// Write the resolved color into the custom slot if anything changed,
    /// then clear every change flag. Returns whether the table was written.
    pub fn refresh(&mut self, colors: &mut TracerColors) -> bool {
        if !self.any_changed() {
            return false;
        }
        colors.set_custom(self.resolve());
        self.changed = [false; 4];
        true
    }
}
