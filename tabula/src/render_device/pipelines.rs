//! Render pipelines, built on first use and kept for the life of the surface format.
//!
//! Pipelines are prepared before a render pass begins (which needs `&mut`) and then borrowed
//! for the duration of the pass.

/// Vertex layout for outline lines, as sent to the GPU.
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
#[repr(C)]
pub struct OutlineVertex {
    /// Clip space.
    pub position: [f32; 2],
    pub color: [f32; 4],
}

#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug, strum::EnumIter)]
pub enum PipelineKind {
    /// Textured triangle list, alpha blended over what's already there.
    TexturedQuad,
    /// Flat colored line list.
    Outline,
    /// Screen-aligned light and dark squares, drawn behind the image.
    Checkerboard,
}

const QUAD_SHADER: &str = r"
struct VertexOutput {
    @builtin(position) position: vec4<f32>,
    @location(0) uv: vec2<f32>,
};

@group(0) @binding(0) var image: texture_2d<f32>;
@group(0) @binding(1) var image_sampler: sampler;

@vertex
fn vs_main(@location(0) position: vec2<f32>, @location(1) uv: vec2<f32>) -> VertexOutput {
    var out: VertexOutput;
    out.position = vec4<f32>(position, 0.0, 1.0);
    out.uv = uv;
    return out;
}

@fragment
fn fs_main(in: VertexOutput) -> @location(0) vec4<f32> {
    return textureSample(image, image_sampler, in.uv);
}
";

const OUTLINE_SHADER: &str = r"
struct VertexOutput {
    @builtin(position) position: vec4<f32>,
    @location(0) color: vec4<f32>,
};

@vertex
fn vs_main(@location(0) position: vec2<f32>, @location(1) color: vec4<f32>) -> VertexOutput {
    var out: VertexOutput;
    out.position = vec4<f32>(position, 0.0, 1.0);
    out.color = color;
    return out;
}

@fragment
fn fs_main(in: VertexOutput) -> @location(0) vec4<f32> {
    return in.color;
}
";

/// Cells are [`CHECKER_CELL`] surface pixels square, white and 70% grey.
const CHECKER_SHADER: &str = r"
const CHECKER_CELL: f32 = 10.0;

@vertex
fn vs_main(@location(0) position: vec2<f32>, @location(1) uv: vec2<f32>) -> @builtin(position) vec4<f32> {
    return vec4<f32>(position, 0.0, 1.0);
}

@fragment
fn fs_main(@builtin(position) position: vec4<f32>) -> @location(0) vec4<f32> {
    let cell = vec2<i32>(floor(position.xy / CHECKER_CELL));
    let light = vec4<f32>(1.0, 1.0, 1.0, 1.0);
    let dark = vec4<f32>(0.7, 0.7, 0.7, 1.0);
    return select(dark, light, ((cell.x + cell.y) & 1) == 0);
}
";

const QUAD_ATTRIBUTES: [wgpu::VertexAttribute; 2] =
    wgpu::vertex_attr_array![0 => Float32x2, 1 => Float32x2];
const OUTLINE_ATTRIBUTES: [wgpu::VertexAttribute; 2] =
    wgpu::vertex_attr_array![0 => Float32x2, 1 => Float32x4];

/// Bind group layout for [`PipelineKind::TexturedQuad`]: the image at binding 0, its sampler at 1.
#[must_use]
pub fn texture_bind_group_layout(device: &wgpu::Device) -> wgpu::BindGroupLayout {
    device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        label: Some("image bind group layout"),
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
    })
}

pub struct PipelineCache {
    format: wgpu::TextureFormat,
    pipelines: hashbrown::HashMap<PipelineKind, wgpu::RenderPipeline>,
}
impl PipelineCache {
    #[must_use]
    pub fn new(format: wgpu::TextureFormat) -> Self {
        Self {
            format,
            pipelines: hashbrown::HashMap::new(),
        }
    }
    /// Pipelines target a specific format, a new one throws everything out.
    pub fn set_format(&mut self, format: wgpu::TextureFormat) {
        if format != self.format {
            log::debug!("surface format changed to {format:?}, dropping pipelines");
            self.format = format;
            self.pipelines.clear();
        }
    }
    /// Make sure `kind` is built.
    pub fn prepare(
        &mut self,
        device: &wgpu::Device,
        texture_layout: &wgpu::BindGroupLayout,
        kind: PipelineKind,
    ) {
        if !self.pipelines.contains_key(&kind) {
            log::trace!("building {kind:?} pipeline for {:?}", self.format);
            let pipeline = Self::build(device, texture_layout, self.format, kind);
            self.pipelines.insert(kind, pipeline);
        }
    }
    /// A pipeline previously [prepared](Self::prepare), if it still is.
    #[must_use]
    pub fn get(&self, kind: PipelineKind) -> Option<&wgpu::RenderPipeline> {
        self.pipelines.get(&kind)
    }
    fn build(
        device: &wgpu::Device,
        texture_layout: &wgpu::BindGroupLayout,
        format: wgpu::TextureFormat,
        kind: PipelineKind,
    ) -> wgpu::RenderPipeline {
        let quad_layouts = [texture_layout];
        let (source, bind_group_layouts, stride, attributes, topology): (
            &str,
            &[&wgpu::BindGroupLayout],
            usize,
            &[wgpu::VertexAttribute],
            wgpu::PrimitiveTopology,
        ) = match kind {
            PipelineKind::TexturedQuad => (
                QUAD_SHADER,
                &quad_layouts,
                std::mem::size_of::<tabula_core::render::QuadVertex>(),
                &QUAD_ATTRIBUTES,
                wgpu::PrimitiveTopology::TriangleList,
            ),
            PipelineKind::Checkerboard => (
                CHECKER_SHADER,
                &[],
                std::mem::size_of::<tabula_core::render::QuadVertex>(),
                &QUAD_ATTRIBUTES,
                wgpu::PrimitiveTopology::TriangleList,
            ),
            PipelineKind::Outline => (
                OUTLINE_SHADER,
                &[],
                std::mem::size_of::<OutlineVertex>(),
                &OUTLINE_ATTRIBUTES,
                wgpu::PrimitiveTopology::LineList,
            ),
        };
        let label = format!("{kind:?}");
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some(&label),
            source: wgpu::ShaderSource::Wgsl(source.into()),
        });
        let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some(&label),
            bind_group_layouts,
            push_constant_ranges: &[],
        });
        device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some(&label),
            layout: Some(&layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: "vs_main",
                buffers: &[wgpu::VertexBufferLayout {
                    array_stride: stride as wgpu::BufferAddress,
                    step_mode: wgpu::VertexStepMode::Vertex,
                    attributes,
                }],
                compilation_options: Default::default(),
            },
            primitive: wgpu::PrimitiveState {
                topology,
                ..Default::default()
            },
            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: "fs_main",
                targets: &[Some(wgpu::ColorTargetState {
                    format,
                    blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: Default::default(),
            }),
            multiview: None,
        })
    }
}
