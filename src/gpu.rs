//! wgpu renderer for recorded effect batches.
//!
//! [`QuadRenderer`] is a [`RenderBackend`]: the passes feed it quads exactly
//! as they feed a [`QuadBatcher`], which it wraps. Once the passes are done,
//! [`prepare`](QuadRenderer::prepare) uploads everything recorded this frame
//! and [`render`](QuadRenderer::render) replays the batches into a render
//! pass, one draw call per batch, with the pipeline matching the batch's
//! blend mode and depth-write setting.

use std::collections::HashMap;
use std::ops::Range;

use bytemuck::{Pod, Zeroable};
use glam::Mat4;
use wgpu::util::DeviceExt;

use crate::backend::{BlendMode, QuadBatcher, QuadVertex, RenderBackend, RenderState, TextureId};
use crate::error::BackendError;

/// Shader for textured, vertex-colored quads.
pub const QUAD_SHADER: &str = r#"
struct Uniforms {
    view_proj: mat4x4<f32>,
};

@group(0) @binding(0) var<uniform> uniforms: Uniforms;
@group(1) @binding(0) var sprite: texture_2d<f32>;
@group(1) @binding(1) var sprite_sampler: sampler;

struct VertexInput {
    @location(0) position: vec3<f32>,
    @location(1) uv: vec2<f32>,
    @location(2) color: vec4<f32>,
};

struct VertexOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) uv: vec2<f32>,
    @location(1) color: vec4<f32>,
};

@vertex
fn vs_main(in: VertexInput) -> VertexOutput {
    var out: VertexOutput;
    out.clip_position = uniforms.view_proj * vec4<f32>(in.position, 1.0);
    out.uv = in.uv;
    out.color = in.color;
    return out;
}

@fragment
fn fs_main(in: VertexOutput) -> @location(0) vec4<f32> {
    // Texture modulated by vertex color.
    return textureSample(sprite, sprite_sampler, in.uv) * in.color;
}
"#;

const VERTEX_ATTRIBUTES: [wgpu::VertexAttribute; 3] =
    wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32x2, 2 => Unorm8x4];

/// Two triangles per quad, corners in submission order.
const QUAD_INDICES: [u32; 6] = [0, 1, 2, 0, 2, 3];

#[repr(C)]
#[derive(Copy, Clone, Pod, Zeroable)]
struct QuadUniforms {
    view_proj: [[f32; 4]; 4],
}

/// Vertex buffer layout of [`QuadVertex`].
pub fn vertex_layout() -> wgpu::VertexBufferLayout<'static> {
    wgpu::VertexBufferLayout {
        array_stride: std::mem::size_of::<QuadVertex>() as wgpu::BufferAddress,
        step_mode: wgpu::VertexStepMode::Vertex,
        attributes: &VERTEX_ATTRIBUTES,
    }
}

/// Blend state for a batch.
pub fn blend_state(mode: BlendMode) -> wgpu::BlendState {
    match mode {
        BlendMode::Alpha => wgpu::BlendState::ALPHA_BLENDING,
        BlendMode::Additive => wgpu::BlendState {
            color: wgpu::BlendComponent {
                src_factor: wgpu::BlendFactor::SrcAlpha,
                dst_factor: wgpu::BlendFactor::One,
                operation: wgpu::BlendOperation::Add,
            },
            alpha: wgpu::BlendComponent {
                src_factor: wgpu::BlendFactor::One,
                dst_factor: wgpu::BlendFactor::One,
                operation: wgpu::BlendOperation::Add,
            },
        },
    }
}

/// Index data for `quads` consecutive quads.
pub fn quad_indices(quads: u32) -> Vec<u32> {
    (0..quads)
        .flat_map(|quad| QUAD_INDICES.iter().map(move |i| quad * 4 + i))
        .collect()
}

/// One uploaded batch.
#[derive(Debug, Clone, PartialEq)]
struct DrawCall {
    state: RenderState,
    texture: Option<TextureId>,
    indices: Range<u32>,
}

/// GPU backend for the effect passes.
pub struct QuadRenderer {
    batcher: QuadBatcher,
    color_format: wgpu::TextureFormat,
    depth_format: Option<wgpu::TextureFormat>,
    shader: wgpu::ShaderModule,
    pipeline_layout: wgpu::PipelineLayout,
    texture_layout: wgpu::BindGroupLayout,
    pipelines: HashMap<RenderState, wgpu::RenderPipeline>,
    textures: HashMap<TextureId, wgpu::BindGroup>,
    uniform_buffer: wgpu::Buffer,
    uniform_bind_group: wgpu::BindGroup,
    vertex_buffer: Option<wgpu::Buffer>,
    index_buffer: Option<wgpu::Buffer>,
    draws: Vec<DrawCall>,
}

impl QuadRenderer {
    /// Create a renderer drawing into `color_format` targets, depth tested
    /// against `depth_format` when given.
    pub fn new(
        device: &wgpu::Device,
        color_format: wgpu::TextureFormat,
        depth_format: Option<wgpu::TextureFormat>,
    ) -> Self {
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Effect Quad Shader"),
            source: wgpu::ShaderSource::Wgsl(QUAD_SHADER.into()),
        });

        let uniform_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Effect Uniform Bind Group Layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            }],
        });

        let texture_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Effect Texture Bind Group Layout"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
            ],
        });

        let uniforms = QuadUniforms {
            view_proj: Mat4::IDENTITY.to_cols_array_2d(),
        };
        let uniform_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Effect Uniform Buffer"),
            contents: bytemuck::bytes_of(&uniforms),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let uniform_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Effect Uniform Bind Group"),
            layout: &uniform_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform_buffer.as_entire_binding(),
            }],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Effect Pipeline Layout"),
            bind_group_layouts: &[&uniform_layout, &texture_layout],
            push_constant_ranges: &[],
        });

        Self {
            batcher: QuadBatcher::new(),
            color_format,
            depth_format,
            shader,
            pipeline_layout,
            texture_layout,
            pipelines: HashMap::new(),
            textures: HashMap::new(),
            uniform_buffer,
            uniform_bind_group,
            vertex_buffer: None,
            index_buffer: None,
            draws: Vec::new(),
        }
    }

    /// Make a sprite available under `id`.
    pub fn register_texture(
        &mut self,
        device: &wgpu::Device,
        id: TextureId,
        view: &wgpu::TextureView,
        sampler: &wgpu::Sampler,
    ) {
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Effect Texture Bind Group"),
            layout: &self.texture_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(sampler),
                },
            ],
        });
        self.textures.insert(id, bind_group);
        self.batcher.register_texture(id);
    }

    /// Forget the sprite registered under `id`.
    pub fn unregister_texture(&mut self, id: TextureId) {
        self.textures.remove(&id);
        self.batcher.unregister_texture(id);
    }

    /// Upload the quads recorded since the last call.
    pub fn prepare(&mut self, device: &wgpu::Device, queue: &wgpu::Queue, view_proj: Mat4) {
        let uniforms = QuadUniforms {
            view_proj: view_proj.to_cols_array_2d(),
        };
        queue.write_buffer(&self.uniform_buffer, 0, bytemuck::bytes_of(&uniforms));

        let batches = self.batcher.take_batches();
        self.draws.clear();
        self.vertex_buffer = None;
        self.index_buffer = None;
        if batches.is_empty() {
            return;
        }

        let mut vertices = Vec::new();
        let mut first_index = 0;
        for batch in &batches {
            vertices.extend_from_slice(&batch.vertices);
            let index_count = batch.quad_count() as u32 * 6;
            self.draws.push(DrawCall {
                state: batch.state,
                texture: batch.texture,
                indices: first_index..first_index + index_count,
            });
            first_index += index_count;

            let color_format = self.color_format;
            let depth_format = self.depth_format;
            let shader = &self.shader;
            let layout = &self.pipeline_layout;
            self.pipelines.entry(batch.state).or_insert_with(|| {
                create_pipeline(device, shader, layout, color_format, depth_format, batch.state)
            });
        }
        let indices = quad_indices((vertices.len() / 4) as u32);

        self.vertex_buffer = Some(device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Effect Vertex Buffer"),
            contents: bytemuck::cast_slice(&vertices),
            usage: wgpu::BufferUsages::VERTEX,
        }));
        self.index_buffer = Some(device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Effect Index Buffer"),
            contents: bytemuck::cast_slice(&indices),
            usage: wgpu::BufferUsages::INDEX,
        }));

        log::trace!(
            "Uploaded {} effect batches ({} quads)",
            self.draws.len(),
            vertices.len() / 4
        );
    }

    /// Record the prepared batches into `pass`.
    pub fn render(&self, pass: &mut wgpu::RenderPass<'_>) {
        let (Some(vertex_buffer), Some(index_buffer)) = (&self.vertex_buffer, &self.index_buffer)
        else {
            return;
        };

        pass.set_vertex_buffer(0, vertex_buffer.slice(..));
        pass.set_index_buffer(index_buffer.slice(..), wgpu::IndexFormat::Uint32);
        pass.set_bind_group(0, &self.uniform_bind_group, &[]);

        for draw in &self.draws {
            let Some(pipeline) = self.pipelines.get(&draw.state) else {
                continue;
            };
            let Some(texture) = draw.texture.and_then(|id| self.textures.get(&id)) else {
                continue;
            };
            pass.set_pipeline(pipeline);
            pass.set_bind_group(1, texture, &[]);
            pass.draw_indexed(draw.indices.clone(), 0, 0..1);
        }
    }

    /// Quads recorded and not yet uploaded.
    pub fn pending_quads(&self) -> usize {
        self.batcher.quad_count()
    }
}

impl RenderBackend for QuadRenderer {
    fn bind_texture(&mut self, texture: TextureId) -> Result<(), BackendError> {
        if !self.textures.contains_key(&texture) {
            return Err(BackendError::TextureUnavailable(texture));
        }
        self.batcher.bind_texture(texture)
    }

    fn begin(&mut self, state: RenderState) {
        self.batcher.begin(state);
    }

    fn push_quad(&mut self, quad: &[QuadVertex; 4]) {
        self.batcher.push_quad(quad);
    }

    fn end(&mut self) {
        self.batcher.end();
    }
}

fn create_pipeline(
    device: &wgpu::Device,
    shader: &wgpu::ShaderModule,
    layout: &wgpu::PipelineLayout,
    color_format: wgpu::TextureFormat,
    depth_format: Option<wgpu::TextureFormat>,
    state: RenderState,
) -> wgpu::RenderPipeline {
    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some(match state.blend {
            BlendMode::Alpha => "Effect Alpha Pipeline",
            BlendMode::Additive => "Effect Additive Pipeline",
        }),
        layout: Some(layout),
        vertex: wgpu::VertexState {
            module: shader,
            entry_point: Some("vs_main"),
            buffers: &[vertex_layout()],
            compilation_options: Default::default(),
        },
        fragment: Some(wgpu::FragmentState {
            module: shader,
            entry_point: Some("fs_main"),
            targets: &[Some(wgpu::ColorTargetState {
                format: color_format,
                blend: Some(blend_state(state.blend)),
                write_mask: wgpu::ColorWrites::ALL,
            })],
            compilation_options: Default::default(),
        }),
        primitive: wgpu::PrimitiveState {
            topology: wgpu::PrimitiveTopology::TriangleList,
            strip_index_format: None,
            front_face: wgpu::FrontFace::Ccw,
            // Ribbons and billboards are seen from either side.
            cull_mode: None,
            polygon_mode: wgpu::PolygonMode::Fill,
            unclipped_depth: false,
            conservative: false,
        },
        depth_stencil: depth_format.map(|format| wgpu::DepthStencilState {
            format,
            depth_write_enabled: state.depth_write,
            depth_compare: wgpu::CompareFunction::LessEqual,
            stencil: wgpu::StencilState::default(),
            bias: wgpu::DepthBiasState::default(),
        }),
        multisample: wgpu::MultisampleState::default(),
        multiview: None,
        cache: None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Validates WGSL code using naga.
    fn validate_wgsl(code: &str) -> Result<(), String> {
        let module = naga::front::wgsl::parse_str(code)
            .map_err(|e| format!("WGSL parse error: {:?}", e))?;

        let mut validator = naga::valid::Validator::new(
            naga::valid::ValidationFlags::all(),
            naga::valid::Capabilities::all(),
        );
        validator
            .validate(&module)
            .map_err(|e| format!("WGSL validation error: {:?}", e))?;

        Ok(())
    }

    #[test]
    fn test_quad_shader_validates() {
        validate_wgsl(QUAD_SHADER).unwrap();
    }

    #[test]
    fn test_vertex_layout_matches_struct() {
        let layout = vertex_layout();
        assert_eq!(layout.array_stride, 24);
        assert_eq!(layout.attributes[1].offset, 12);
        assert_eq!(layout.attributes[2].offset, 20);
        assert_eq!(layout.attributes[2].format, wgpu::VertexFormat::Unorm8x4);
    }

    #[test]
    fn test_quad_indices() {
        assert_eq!(quad_indices(2), vec![0, 1, 2, 0, 2, 3, 4, 5, 6, 4, 6, 7]);
        assert!(quad_indices(0).is_empty());
    }

    #[test]
    fn test_blend_states() {
        assert_eq!(blend_state(BlendMode::Alpha), wgpu::BlendState::ALPHA_BLENDING);
        let additive = blend_state(BlendMode::Additive);
        assert_eq!(additive.color.src_factor, wgpu::BlendFactor::SrcAlpha);
        assert_eq!(additive.color.dst_factor, wgpu::BlendFactor::One);
    }
}
