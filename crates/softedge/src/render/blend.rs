use bytemuck::{Pod, Zeroable};
use wgpu::util::DeviceExt;

use crate::mesh::BlendMesh;
use crate::render::{RenderCtx, RenderTarget};

// ── parameters ────────────────────────────────────────────────────────────

/// Blend-curve parameters, pushed as shader uniforms on every draw.
///
/// `luminance_control` sets the curve value at the overlap midpoint (0.5
/// keeps the two projectors summing to full intensity for a linear screen),
/// `blend_power` the steepness of the falloff, `gamma` the per-channel
/// display gamma, and `base_color` a fill added where both blend weights are
/// saturated, used to mask seams against a non-black wall.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct BlendParams {
    pub gamma: [f32; 3],
    pub luminance_control: f32,
    pub blend_power: f32,
    pub base_color: [f32; 3],
}

impl Default for BlendParams {
    fn default() -> Self {
        Self {
            gamma: [1.0, 1.0, 1.0],
            luminance_control: 0.5,
            blend_power: 2.0,
            base_color: [0.0, 0.0, 0.0],
        }
    }
}

// ── GPU-visible layouts ───────────────────────────────────────────────────

#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
struct ViewportUniform {
    viewport: [f32; 2],
    _pad: [f32; 2], // 16-byte alignment
}

/// `BlendParams` packed for a WGSL uniform block: two vec3s each padded to
/// 16 bytes by the scalar that follows.
#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
struct BlendParamsUniform {
    gamma: [f32; 3],
    luminance_control: f32,
    base_color: [f32; 3],
    blend_power: f32,
}

impl From<BlendParams> for BlendParamsUniform {
    fn from(p: BlendParams) -> Self {
        Self {
            gamma: p.gamma,
            luminance_control: p.luminance_control,
            base_color: p.base_color,
            blend_power: p.blend_power,
        }
    }
}

/// Interleaved vertex: position, blend weights in color.rg, texcoord.
#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
struct BlendVertex {
    pos: [f32; 3],
    color: [f32; 4],
    uv: [f32; 2],
}

impl BlendVertex {
    const ATTRS: [wgpu::VertexAttribute; 3] = wgpu::vertex_attr_array![
        0 => Float32x3, // position
        1 => Float32x4, // color (blend weights in rg)
        2 => Float32x2  // texcoord
    ];

    fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<BlendVertex>() as u64,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRS,
        }
    }
}

fn interleave(mesh: &BlendMesh) -> Vec<BlendVertex> {
    mesh.positions
        .iter()
        .zip(&mesh.colors)
        .zip(&mesh.texcoords)
        .map(|((pos, color), uv)| BlendVertex {
            pos: *pos,
            color: *color,
            uv: *uv,
        })
        .collect()
}

// ── renderer ──────────────────────────────────────────────────────────────

/// Draws a blend mesh with the soft-edge attenuation shader.
///
/// GPU resources are created lazily on first use and the pipeline is rebuilt
/// when the surface format changes. The texture view is caller-supplied per
/// draw, so the bind group is rebuilt each call; everything else is cached.
#[derive(Default)]
pub struct BlendScreenRenderer {
    params: BlendParams,

    pipeline_format: Option<wgpu::TextureFormat>,
    pipeline: Option<wgpu::RenderPipeline>,
    bind_group_layout: Option<wgpu::BindGroupLayout>,

    viewport_ubo: Option<wgpu::Buffer>,
    params_ubo: Option<wgpu::Buffer>,
    sampler: Option<wgpu::Sampler>,

    vbo: Option<wgpu::Buffer>,
    vbo_capacity: usize,
    ibo: Option<wgpu::Buffer>,
    ibo_capacity: usize,

    warned_non_finite: bool,
}

impl BlendScreenRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn params(&self) -> &BlendParams {
        &self.params
    }

    pub fn params_mut(&mut self) -> &mut BlendParams {
        &mut self.params
    }

    /// Draws `mesh` sampling `texture`, attenuated by the blend curve.
    ///
    /// Meshes containing non-finite positions or texcoords (possible when
    /// upstream quads were degenerate) are skipped with a one-time debug
    /// message.
    pub fn render(
        &mut self,
        ctx: &RenderCtx<'_>,
        target: &mut RenderTarget<'_>,
        mesh: &BlendMesh,
        texture: &wgpu::TextureView,
    ) {
        if mesh.indices.is_empty() {
            return;
        }
        if !mesh.is_finite() {
            if !self.warned_non_finite {
                log::debug!("BlendScreenRenderer: mesh has non-finite values; skipping draw");
                self.warned_non_finite = true;
            }
            return;
        }

        self.ensure_pipeline(ctx);
        self.ensure_sampler(ctx);
        self.ensure_uniform_buffers(ctx);
        self.upload_mesh(ctx, mesh);
        self.write_uniforms(ctx);

        let Some(pipeline) = self.pipeline.as_ref() else { return };
        let Some(bgl) = self.bind_group_layout.as_ref() else { return };
        let Some(viewport_ubo) = self.viewport_ubo.as_ref() else { return };
        let Some(params_ubo) = self.params_ubo.as_ref() else { return };
        let Some(sampler) = self.sampler.as_ref() else { return };
        let Some(vbo) = self.vbo.as_ref() else { return };
        let Some(ibo) = self.ibo.as_ref() else { return };

        let bind_group = ctx.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("softedge blend bind group"),
            layout: bgl,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: viewport_ubo.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: params_ubo.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: wgpu::BindingResource::TextureView(texture),
                },
                wgpu::BindGroupEntry {
                    binding: 3,
                    resource: wgpu::BindingResource::Sampler(sampler),
                },
            ],
        });

        let mut rpass = target.encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("softedge blend pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: target.color_view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Load,
                    store: wgpu::StoreOp::Store,
                },
                depth_slice: None,
            })],
            depth_stencil_attachment: None,
            timestamp_writes: None,
            occlusion_query_set: None,
            multiview_mask: None,
        });

        rpass.set_pipeline(pipeline);
        rpass.set_bind_group(0, &bind_group, &[]);
        rpass.set_vertex_buffer(0, vbo.slice(..));
        rpass.set_index_buffer(ibo.slice(..), wgpu::IndexFormat::Uint32);
        rpass.draw_indexed(0..mesh.indices.len() as u32, 0, 0..1);
    }

    // ── lazy-init helpers ──────────────────────────────────────────────────

    fn ensure_pipeline(&mut self, ctx: &RenderCtx<'_>) {
        if self.pipeline_format == Some(ctx.surface_format) && self.pipeline.is_some() {
            return;
        }

        let shader = ctx.device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("softedge blend shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shaders/blend.wgsl").into()),
        });

        let bgl = ctx
            .device
            .create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("softedge blend bgl"),
                entries: &[
                    wgpu::BindGroupLayoutEntry {
                        binding: 0,
                        visibility: wgpu::ShaderStages::VERTEX,
                        ty: wgpu::BindingType::Buffer {
                            ty: wgpu::BufferBindingType::Uniform,
                            has_dynamic_offset: false,
                            min_binding_size: Some(uniform_binding_size::<ViewportUniform>()),
                        },
                        count: None,
                    },
                    wgpu::BindGroupLayoutEntry {
                        binding: 1,
                        visibility: wgpu::ShaderStages::FRAGMENT,
                        ty: wgpu::BindingType::Buffer {
                            ty: wgpu::BufferBindingType::Uniform,
                            has_dynamic_offset: false,
                            min_binding_size: Some(uniform_binding_size::<BlendParamsUniform>()),
                        },
                        count: None,
                    },
                    wgpu::BindGroupLayoutEntry {
                        binding: 2,
                        visibility: wgpu::ShaderStages::FRAGMENT,
                        ty: wgpu::BindingType::Texture {
                            sample_type: wgpu::TextureSampleType::Float { filterable: true },
                            view_dimension: wgpu::TextureViewDimension::D2,
                            multisampled: false,
                        },
                        count: None,
                    },
                    wgpu::BindGroupLayoutEntry {
                        binding: 3,
                        visibility: wgpu::ShaderStages::FRAGMENT,
                        ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                        count: None,
                    },
                ],
            });

        let pipeline_layout = ctx
            .device
            .create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                label: Some("softedge blend pipeline layout"),
                bind_group_layouts: &[&bgl],
                immediate_size: 0,
            });

        let pipeline = ctx
            .device
            .create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                label: Some("softedge blend pipeline"),
                layout: Some(&pipeline_layout),
                vertex: wgpu::VertexState {
                    module: &shader,
                    entry_point: Some("vs_main"),
                    compilation_options: Default::default(),
                    buffers: &[BlendVertex::layout()],
                },
                fragment: Some(wgpu::FragmentState {
                    module: &shader,
                    entry_point: Some("fs_main"),
                    compilation_options: Default::default(),
                    targets: &[Some(wgpu::ColorTargetState {
                        format: ctx.surface_format,
                        blend: None,
                        write_mask: wgpu::ColorWrites::ALL,
                    })],
                }),
                primitive: wgpu::PrimitiveState {
                    topology: wgpu::PrimitiveTopology::TriangleList,
                    strip_index_format: None,
                    front_face: wgpu::FrontFace::Ccw,
                    cull_mode: None,
                    polygon_mode: wgpu::PolygonMode::Fill,
                    unclipped_depth: false,
                    conservative: false,
                },
                depth_stencil: None,
                multisample: wgpu::MultisampleState::default(),
                multiview_mask: None,
                cache: None,
            });

        self.pipeline_format = Some(ctx.surface_format);
        self.pipeline = Some(pipeline);
        self.bind_group_layout = Some(bgl);
        self.viewport_ubo = None;
        self.params_ubo = None;
    }

    fn ensure_sampler(&mut self, ctx: &RenderCtx<'_>) {
        if self.sampler.is_some() {
            return;
        }
        self.sampler = Some(ctx.device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("softedge blend sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            ..Default::default()
        }));
    }

    fn ensure_uniform_buffers(&mut self, ctx: &RenderCtx<'_>) {
        if self.viewport_ubo.is_some() && self.params_ubo.is_some() {
            return;
        }
        self.viewport_ubo = Some(ctx.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("softedge blend viewport ubo"),
            size: std::mem::size_of::<ViewportUniform>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        }));
        self.params_ubo = Some(ctx.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("softedge blend params ubo"),
            size: std::mem::size_of::<BlendParamsUniform>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        }));
    }

    fn upload_mesh(&mut self, ctx: &RenderCtx<'_>, mesh: &BlendMesh) {
        let vertices = interleave(mesh);
        let vertex_bytes = std::mem::size_of_val(vertices.as_slice());
        let index_bytes = std::mem::size_of_val(mesh.indices.as_slice());

        if self.vbo.is_none() || self.vbo_capacity < vertex_bytes {
            self.vbo = Some(ctx.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("softedge blend vbo"),
                contents: bytemuck::cast_slice(&vertices),
                usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            }));
            self.vbo_capacity = vertex_bytes;
        } else if let Some(vbo) = self.vbo.as_ref() {
            ctx.queue.write_buffer(vbo, 0, bytemuck::cast_slice(&vertices));
        }

        if self.ibo.is_none() || self.ibo_capacity < index_bytes {
            self.ibo = Some(ctx.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("softedge blend ibo"),
                contents: bytemuck::cast_slice(&mesh.indices),
                usage: wgpu::BufferUsages::INDEX | wgpu::BufferUsages::COPY_DST,
            }));
            self.ibo_capacity = index_bytes;
        } else if let Some(ibo) = self.ibo.as_ref() {
            ctx.queue.write_buffer(ibo, 0, bytemuck::cast_slice(&mesh.indices));
        }
    }

    fn write_uniforms(&mut self, ctx: &RenderCtx<'_>) {
        if let Some(ubo) = self.viewport_ubo.as_ref() {
            let u = ViewportUniform {
                viewport: [ctx.viewport.width.max(1.0), ctx.viewport.height.max(1.0)],
                _pad: [0.0; 2],
            };
            ctx.queue.write_buffer(ubo, 0, bytemuck::bytes_of(&u));
        }
        if let Some(ubo) = self.params_ubo.as_ref() {
            let u = BlendParamsUniform::from(self.params);
            ctx.queue.write_buffer(ubo, 0, bytemuck::bytes_of(&u));
        }
    }
}

fn uniform_binding_size<T>() -> std::num::NonZeroU64 {
    std::num::NonZeroU64::new(std::mem::size_of::<T>() as u64)
        .expect("uniform struct has non-zero size by construction")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geom::{Quad, Vec2};
    use crate::mesh::{create_mesh, BlendMask};

    #[test]
    fn params_defaults() {
        let p = BlendParams::default();
        assert_eq!(p.gamma, [1.0, 1.0, 1.0]);
        assert_eq!(p.luminance_control, 0.5);
        assert_eq!(p.blend_power, 2.0);
        assert_eq!(p.base_color, [0.0, 0.0, 0.0]);
    }

    #[test]
    fn uniform_layouts_match_wgsl() {
        // vec2f + pad and vec3f/f32 pairs; both blocks are 16-byte aligned.
        assert_eq!(std::mem::size_of::<ViewportUniform>(), 16);
        assert_eq!(std::mem::size_of::<BlendParamsUniform>(), 32);
        assert_eq!(std::mem::size_of::<BlendVertex>(), 36);
    }

    #[test]
    fn interleave_preserves_attribute_order() {
        let outer = Quad::from_size(100.0, 100.0);
        let inner = outer
            .scaled(Vec2::new(0.8, 0.8))
            .translated(Vec2::new(10.0, 10.0));
        let mesh = create_mesh(outer, inner, Quad::default(), BlendMask::ALL);
        let vertices = interleave(&mesh);
        assert_eq!(vertices.len(), 16);
        for (i, vx) in vertices.iter().enumerate() {
            assert_eq!(vx.pos, mesh.positions[i]);
            assert_eq!(vx.color, mesh.colors[i]);
            assert_eq!(vx.uv, mesh.texcoords[i]);
        }
    }
}
