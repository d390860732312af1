//! Drawing capability consumed by the effect passes.
//!
//! The passes only decide *what* to draw: quads of four [`QuadVertex`]
//! values, grouped into batches that share a [`RenderState`] and a texture.
//! A [`RenderBackend`] turns those into API calls. [`QuadBatcher`] is a
//! backend that simply records the batches, which the wgpu renderer in
//! [`crate::gpu`] uploads and which tests inspect.

use std::collections::HashSet;

use bytemuck::{Pod, Zeroable};

use crate::error::BackendError;

/// Handle to a texture owned by the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TextureId(pub u32);

/// Blend equation for a batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum BlendMode {
    /// `src * src_alpha + dst * (1 - src_alpha)`.
    ///
    /// Used for billboards, which occlude what is behind them.
    #[default]
    Alpha,

    /// `src * src_alpha + dst`.
    ///
    /// Used for tracers, which accumulate and glow.
    Additive,
}

/// Fixed-function state for a batch.
///
/// Texture color is always modulated by vertex color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RenderState {
    pub blend: BlendMode,
    pub depth_write: bool,
}

impl RenderState {
    /// Alpha-blended, depth write off.
    pub const BILLBOARD: Self = Self {
        blend: BlendMode::Alpha,
        depth_write: false,
    };

    /// Additive, depth write off.
    pub const TRACER: Self = Self {
        blend: BlendMode::Additive,
        depth_write: false,
    };
}

/// One corner of a quad.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct QuadVertex {
    pub position: [f32; 3],
    pub uv: [f32; 2],
    pub color: [u8; 4],
}

impl QuadVertex {
    pub fn new(position: glam::Vec3, uv: [f32; 2], color: [u8; 4]) -> Self {
        Self {
            position: position.to_array(),
            uv,
            color,
        }
    }

    /// Position as a vector.
    #[inline]
    pub fn pos(&self) -> glam::Vec3 {
        glam::Vec3::from_array(self.position)
    }
}

/// A consumer of quad geometry.
///
/// A pass calls [`bind_texture`](Self::bind_texture) first and gives up for
/// the frame if it fails. Otherwise it opens one batch with
/// [`begin`](Self::begin), pushes its quads and closes it with
/// [`end`](Self::end), after which depth writes are expected to be back on.
pub trait RenderBackend {
    /// Make `texture` current for the next batch.
    fn bind_texture(&mut self, texture: TextureId) -> Result<(), BackendError>;

    /// Open a batch with the given state.
    fn begin(&mut self, state: RenderState);

    /// Append one quad to the open batch.
    fn push_quad(&mut self, quad: &[QuadVertex; 4]);

    /// Close the open batch and restore depth writes.
    fn end(&mut self);
}

/// A recorded batch.
#[derive(Debug, Clone, PartialEq)]
pub struct DrawBatch {
    pub state: RenderState,
    pub texture: Option<TextureId>,
    /// Four vertices per quad, in submission order.
    pub vertices: Vec<QuadVertex>,
}

impl DrawBatch {
    /// Number of quads in the batch.
    pub fn quad_count(&self) -> usize {
        self.vertices.len() / 4
    }

    /// Quads in submission order.
    pub fn quads(&self) -> impl Iterator<Item = &[QuadVertex]> {
        self.vertices.chunks_exact(4)
    }
}

/// Backend that records batches instead of drawing them.
#[derive(Debug, Clone)]
pub struct QuadBatcher {
    available: HashSet<TextureId>,
    bound: Option<TextureId>,
    open: Option<DrawBatch>,
    batches: Vec<DrawBatch>,
    depth_write: bool,
}

impl QuadBatcher {
    /// Create an empty batcher with no textures available.
    pub fn new() -> Self {
        Self {
            available: HashSet::new(),
            bound: None,
            open: None,
            batches: Vec::new(),
            depth_write: true,
        }
    }

    /// Mark a texture as loaded so it can be bound.
    pub fn register_texture(&mut self, texture: TextureId) -> &mut Self {
        self.available.insert(texture);
        self
    }

    /// Mark a texture as no longer loaded.
    pub fn unregister_texture(&mut self, texture: TextureId) -> &mut Self {
        self.available.remove(&texture);
        if self.bound == Some(texture) {
            self.bound = None;
        }
        self
    }

    /// Batches closed since the last [`clear`](Self::clear).
    pub fn batches(&self) -> &[DrawBatch] {
        &self.batches
    }

    /// Every recorded quad across all batches.
    pub fn quads(&self) -> impl Iterator<Item = &[QuadVertex]> {
        self.batches.iter().flat_map(|batch| batch.quads())
    }

    /// Total recorded quads.
    pub fn quad_count(&self) -> usize {
        self.batches.iter().map(DrawBatch::quad_count).sum()
    }

    /// Whether depth writes are currently enabled.
    pub fn depth_write(&self) -> bool {
        self.depth_write
    }

    /// Whether a batch is open.
    pub fn is_open(&self) -> bool {
        self.open.is_some()
    }

    /// Drop all recorded batches. Registered textures are kept.
    pub fn clear(&mut self) {
        self.open = None;
        self.batches.clear();
    }

    /// Take the recorded batches, leaving the batcher empty.
    pub fn take_batches(&mut self) -> Vec<DrawBatch> {
        std::mem::take(&mut self.batches)
    }
}

impl Default for QuadBatcher {
    fn default() -> Self {
        Self::new()
    }
}

impl RenderBackend for QuadBatcher {
    fn bind_texture(&mut self, texture: TextureId) -> Result<(), BackendError> {
        if !self.available.contains(&texture) {
            return Err(BackendError::TextureUnavailable(texture));
        }
        self.bound = Some(texture);
        Ok(())
    }

    fn begin(&mut self, state: RenderState) {
        debug_assert!(self.open.is_none(), "begin() called with a batch already open");
        self.depth_write = state.depth_write;
        self.open = Some(DrawBatch {
            state,
            texture: self.bound,
            vertices: Vec::new(),
        });
    }

    fn push_quad(&mut self, quad: &[QuadVertex; 4]) {
        debug_assert!(self.open.is_some(), "push_quad() called outside begin()/end()");
        if let Some(batch) = self.open.as_mut() {
            batch.vertices.extend_from_slice(quad);
        }
    }

    fn end(&mut self) {
        if let Some(batch) = self.open.take() {
            // Empty batches carry no draw call.
            if !batch.vertices.is_empty() {
                self.batches.push(batch);
            }
        }
        self.depth_write = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    fn quad() -> [QuadVertex; 4] {
        [QuadVertex::new(Vec3::ZERO, [0.0, 0.0], [255; 4]); 4]
    }

    #[test]
    fn test_vertex_layout() {
        assert_eq!(std::mem::size_of::<QuadVertex>(), 24);
        let v = QuadVertex::new(Vec3::new(1.0, 2.0, 3.0), [0.5, 1.0], [1, 2, 3, 4]);
        let bytes = bytemuck::bytes_of(&v);
        assert_eq!(&bytes[20..24], &[1, 2, 3, 4]);
    }

    #[test]
    fn test_bind_unknown_texture_fails() {
        let mut batcher = QuadBatcher::new();
        assert_eq!(
            batcher.bind_texture(TextureId(3)),
            Err(BackendError::TextureUnavailable(TextureId(3)))
        );
        batcher.register_texture(TextureId(3));
        assert!(batcher.bind_texture(TextureId(3)).is_ok());
    }

    #[test]
    fn test_records_batches() {
        let mut batcher = QuadBatcher::new();
        batcher.register_texture(TextureId(1));
        batcher.bind_texture(TextureId(1)).unwrap();

        batcher.begin(RenderState::TRACER);
        assert!(!batcher.depth_write());
        batcher.push_quad(&quad());
        batcher.push_quad(&quad());
        batcher.end();

        assert!(batcher.depth_write());
        assert_eq!(batcher.batches().len(), 1);
        assert_eq!(batcher.batches()[0].texture, Some(TextureId(1)));
        assert_eq!(batcher.batches()[0].state.blend, BlendMode::Additive);
        assert_eq!(batcher.quad_count(), 2);
    }

    #[test]
    fn test_empty_batch_is_dropped() {
        let mut batcher = QuadBatcher::new();
        batcher.begin(RenderState::BILLBOARD);
        batcher.end();
        assert!(batcher.batches().is_empty());
        assert!(batcher.depth_write());
    }
}
