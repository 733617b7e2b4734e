//! # Render device
//!
//! wgpu implementation of [`RenderBackend`]. Draw calls are recorded during the frame and
//! submitted together in a single render pass by [`RenderContext::present`].
//!
//! Each draw keeps the viewport it was recorded under. Vertex positions arrive relative to that
//! viewport and are converted to clip space against the whole surface, then clipped to the
//! viewport with a scissor rect.

pub mod pipelines;

use pipelines::{OutlineVertex, PipelineCache, PipelineKind};
use std::sync::Arc;
use tabula_core::render::{
    LineVertex, PixelRegion, QuadVertex, RenderBackend, ResourceError, TextureHandle,
};
use tabula_core::util::Rect;

struct GpuTexture {
    texture: wgpu::Texture,
    bind_group: wgpu::BindGroup,
}

enum Draw {
    Quads {
        texture: u64,
        scissor: Rect,
        vertices: Vec<QuadVertex>,
    },
    Lines {
        scissor: Rect,
        vertices: Vec<OutlineVertex>,
    },
    Checkerboard {
        scissor: Rect,
        vertices: Vec<QuadVertex>,
    },
}

/// Part of `viewport` that lies on a `width` by `height` surface.
fn clamp_to_surface(viewport: Rect, width: u32, height: u32) -> Option<Rect> {
    let left = i64::from(viewport.x).max(0);
    let top = i64::from(viewport.y).max(0);
    let right = (i64::from(viewport.x) + i64::from(viewport.w)).min(i64::from(width));
    let bottom = (i64::from(viewport.y) + i64::from(viewport.h)).min(i64::from(height));
    if right <= left || bottom <= top {
        return None;
    }
    // All within 0..=u32::MAX after clamping.
    Some(Rect::new(
        i32::try_from(left).ok()?,
        i32::try_from(top).ok()?,
        u32::try_from(right - left).ok()?,
        u32::try_from(bottom - top).ok()?,
    ))
}

/// Viewport-local pixel position to clip space of a `width` by `height` surface.
#[allow(clippy::cast_precision_loss)]
fn to_clip(position: [f32; 2], viewport: Rect, width: u32, height: u32) -> [f32; 2] {
    let x = viewport.x as f32 + position[0];
    let y = viewport.y as f32 + position[1];
    [
        x / width.max(1) as f32 * 2.0 - 1.0,
        1.0 - y / height.max(1) as f32 * 2.0,
    ]
}

pub struct RenderContext {
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
    pipelines: PipelineCache,
    texture_layout: wgpu::BindGroupLayout,
    sampler: wgpu::Sampler,
    textures: hashbrown::HashMap<u64, GpuTexture>,
    next_texture: u64,
    viewport: Rect,
    draws: Vec<Draw>,
    background: wgpu::Color,
}
impl RenderContext {
    pub fn new_with_window(
        window: Arc<winit::window::Window>,
        background: [f32; 4],
    ) -> anyhow::Result<Self> {
        pollster::block_on(Self::new_async(window, background))
    }
    async fn new_async(
        window: Arc<winit::window::Window>,
        background: [f32; 4],
    ) -> anyhow::Result<Self> {
        let size = window.inner_size();
        let instance = wgpu::Instance::new(wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });
        let surface = instance.create_surface(window)?;
        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::default(),
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .ok_or_else(|| anyhow::anyhow!("no suitable graphics adapter"))?;
        log::info!("using adapter {}", adapter.get_info().name);

        let limits = adapter.limits();
        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    label: Some("Tabula device"),
                    required_features: wgpu::Features::empty(),
                    required_limits: wgpu::Limits {
                        max_texture_dimension_2d: limits.max_texture_dimension_2d,
                        ..wgpu::Limits::downlevel_webgl2_defaults()
                    },
                },
                None,
            )
            .await?;

        let capabilities = surface.get_capabilities(&adapter);
        let format = capabilities
            .formats
            .iter()
            .copied()
            .find(wgpu::TextureFormat::is_srgb)
            .or_else(|| capabilities.formats.first().copied())
            .ok_or_else(|| anyhow::anyhow!("surface supports no formats"))?;
        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: wgpu::PresentMode::AutoVsync,
            desired_maximum_frame_latency: 2,
            alpha_mode: capabilities
                .alpha_modes
                .first()
                .copied()
                .unwrap_or(wgpu::CompositeAlphaMode::Auto),
            view_formats: Vec::new(),
        };
        surface.configure(&device, &config);

        let texture_layout = pipelines::texture_bind_group_layout(&device);
        // Pixels stay crisp when zoomed in.
        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("image sampler"),
            mag_filter: wgpu::FilterMode::Nearest,
            min_filter: wgpu::FilterMode::Nearest,
            mipmap_filter: wgpu::FilterMode::Nearest,
            ..Default::default()
        });

        let [r, g, b, a] = background.map(f64::from);
        Ok(Self {
            surface,
            device,
            queue,
            pipelines: PipelineCache::new(format),
            config,
            texture_layout,
            sampler,
            textures: hashbrown::HashMap::new(),
            next_texture: 0,
            viewport: Rect::new(0, 0, size.width, size.height),
            draws: Vec::new(),
            background: wgpu::Color { r, g, b, a },
        })
    }
    /// Match the surface to a new window size.
    pub fn resize(&mut self, width: u32, height: u32) {
        self.config.width = width.max(1);
        self.config.height = height.max(1);
        self.surface.configure(&self.device, &self.config);
        self.pipelines.set_format(self.config.format);
    }
    fn reconfigure(&mut self) {
        self.surface.configure(&self.device, &self.config);
    }
    fn scissor_for(&self, viewport: Rect) -> Option<Rect> {
        clamp_to_surface(viewport, self.config.width, self.config.height)
    }
    /// Quad vertices in clip space, with the scissor for the current viewport. None if there's
    /// nothing to draw.
    fn clip_quads(&self, vertices: &[QuadVertex]) -> Option<(Rect, Vec<QuadVertex>)> {
        let scissor = self.scissor_for(self.viewport)?;
        if vertices.is_empty() {
            return None;
        }
        let (viewport, width, height) = (self.viewport, self.config.width, self.config.height);
        let vertices = vertices
            .iter()
            .map(|vertex| QuadVertex {
                position: to_clip(vertex.position, viewport, width, height),
                uv: vertex.uv,
            })
            .collect();
        Some((scissor, vertices))
    }
    /// Submit everything drawn since the last present, and show it.
    pub fn present(&mut self) -> anyhow::Result<()> {
        let draws = std::mem::take(&mut self.draws);
        let frame = match self.surface.get_current_texture() {
            Ok(frame) => frame,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                log::info!("Surface unusable. Reconfiguring");
                self.reconfigure();
                return Ok(());
            }
            Err(e) => anyhow::bail!("Surface image acquire failed! {e:?}"),
        };
        let target = frame
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        {
            use strum::IntoEnumIterator;
            for kind in PipelineKind::iter() {
                self.pipelines
                    .prepare(&self.device, &self.texture_layout, kind);
            }
        }
        let buffers: Vec<wgpu::Buffer> = draws
            .iter()
            .map(|draw| {
                use wgpu::util::DeviceExt;
                let contents: &[u8] = match draw {
                    Draw::Quads { vertices, .. } | Draw::Checkerboard { vertices, .. } => {
                        bytemuck::cast_slice(vertices)
                    }
                    Draw::Lines { vertices, .. } => bytemuck::cast_slice(vertices),
                };
                self.device
                    .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                        label: None,
                        contents,
                        usage: wgpu::BufferUsages::VERTEX,
                    })
            })
            .collect();

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("frame"),
            });
        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("image view"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &target,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(self.background),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });
            for (draw, buffer) in draws.iter().zip(&buffers) {
                let (scissor, count) = match draw {
                    Draw::Quads {
                        texture,
                        scissor,
                        vertices,
                    } => {
                        let (Some(pipeline), Some(texture)) = (
                            self.pipelines.get(PipelineKind::TexturedQuad),
                            self.textures.get(texture),
                        ) else {
                            continue;
                        };
                        pass.set_pipeline(pipeline);
                        pass.set_bind_group(0, &texture.bind_group, &[]);
                        (scissor, vertices.len())
                    }
                    Draw::Lines { scissor, vertices } => {
                        let Some(pipeline) = self.pipelines.get(PipelineKind::Outline) else {
                            continue;
                        };
                        pass.set_pipeline(pipeline);
                        (scissor, vertices.len())
                    }
                    Draw::Checkerboard { scissor, vertices } => {
                        let Some(pipeline) = self.pipelines.get(PipelineKind::Checkerboard)
                        else {
                            continue;
                        };
                        pass.set_pipeline(pipeline);
                        (scissor, vertices.len())
                    }
                };
                #[allow(clippy::cast_sign_loss)]
                pass.set_scissor_rect(scissor.x as u32, scissor.y as u32, scissor.w, scissor.h);
                pass.set_vertex_buffer(0, buffer.slice(..));
                let count = u32::try_from(count).unwrap_or(u32::MAX);
                pass.draw(0..count, 0..1);
            }
        }
        self.queue.submit(Some(encoder.finish()));
        frame.present();
        Ok(())
    }
}
impl RenderBackend for RenderContext {
    fn max_texture_dimension(&self) -> u32 {
        self.device.limits().max_texture_dimension_2d
    }
    fn upload_texture(
        &mut self,
        rgba: &[u8],
        width: u32,
        height: u32,
    ) -> Result<TextureHandle, ResourceError> {
        if width == 0 || height == 0 {
            return Err(ResourceError::Empty);
        }
        let limit = self.max_texture_dimension();
        if width > limit || height > limit {
            return Err(ResourceError::TooLarge {
                width,
                height,
                limit,
            });
        }
        let size = wgpu::Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        };

        self.device.push_error_scope(wgpu::ErrorFilter::OutOfMemory);
        let texture = self.device.create_texture(&wgpu::TextureDescriptor {
            label: Some("image layer"),
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Rgba8UnormSrgb,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });
        if let Some(error) = pollster::block_on(self.device.pop_error_scope()) {
            texture.destroy();
            return Err(ResourceError::Backend(error.to_string()));
        }

        self.queue.write_texture(
            wgpu::ImageCopyTexture {
                texture: &texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            rgba,
            wgpu::ImageDataLayout {
                offset: 0,
                bytes_per_row: Some(4 * width),
                rows_per_image: Some(height),
            },
            size,
        );
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        let bind_group = self.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("image layer"),
            layout: &self.texture_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(&self.sampler),
                },
            ],
        });

        let id = self.next_texture;
        self.next_texture += 1;
        self.textures.insert(
            id,
            GpuTexture {
                texture,
                bind_group,
            },
        );
        log::debug!("uploaded texture {id} ({width}x{height})");
        Ok(TextureHandle::new(id))
    }
    fn update_subregion(&mut self, texture: &TextureHandle, region: PixelRegion, rgba: &[u8]) {
        let Some(gpu) = self.textures.get(&texture.id()) else {
            log::warn!("update of unknown texture {}", texture.id());
            return;
        };
        self.queue.write_texture(
            wgpu::ImageCopyTexture {
                texture: &gpu.texture,
                mip_level: 0,
                origin: wgpu::Origin3d {
                    x: region.x,
                    y: region.y,
                    z: 0,
                },
                aspect: wgpu::TextureAspect::All,
            },
            rgba,
            wgpu::ImageDataLayout {
                offset: 0,
                bytes_per_row: Some(4 * region.w),
                rows_per_image: Some(region.h),
            },
            wgpu::Extent3d {
                width: region.w,
                height: region.h,
                depth_or_array_layers: 1,
            },
        );
    }
    fn destroy_texture(&mut self, texture: TextureHandle) {
        if let Some(gpu) = self.textures.remove(&texture.id()) {
            gpu.texture.destroy();
            log::debug!("destroyed texture {}", texture.id());
        }
    }
    fn set_viewport(&mut self, viewport: Rect) {
        self.viewport = viewport;
    }
    fn draw_triangles(&mut self, texture: &TextureHandle, vertices: &[QuadVertex]) {
        if let Some((scissor, vertices)) = self.clip_quads(vertices) {
            self.draws.push(Draw::Quads {
                texture: texture.id(),
                scissor,
                vertices,
            });
        }
    }
    fn draw_checkerboard(&mut self, vertices: &[QuadVertex]) {
        if let Some((scissor, vertices)) = self.clip_quads(vertices) {
            self.draws.push(Draw::Checkerboard { scissor, vertices });
        }
    }
    fn draw_lines(&mut self, vertices: &[LineVertex], color: [f32; 4]) {
        let Some(scissor) = self.scissor_for(self.viewport) else {
            return;
        };
        if vertices.is_empty() {
            return;
        }
        let (viewport, width, height) = (self.viewport, self.config.width, self.config.height);
        let vertices = vertices
            .iter()
            .map(|vertex| OutlineVertex {
                position: to_clip(vertex.position, viewport, width, height),
                color,
            })
            .collect();
        self.draws.push(Draw::Lines { scissor, vertices });
    }
}

#[cfg(test)]
mod test {
    use super::{clamp_to_surface, to_clip};
    use tabula_core::util::Rect;
    #[test]
    fn clamp() {
        assert_eq!(
            clamp_to_surface(Rect::new(-10, 5, 50, 50), 30, 30),
            Some(Rect::new(0, 5, 30, 25))
        );
        assert_eq!(clamp_to_surface(Rect::new(40, 0, 10, 10), 30, 30), None);
        assert_eq!(clamp_to_surface(Rect::new(0, 0, 0, 10), 30, 30), None);
    }
    #[test]
    fn clip_space() {
        let viewport = Rect::new(0, 0, 100, 50);
        assert_eq!(to_clip([0.0, 0.0], viewport, 100, 50), [-1.0, 1.0]);
        assert_eq!(to_clip([100.0, 50.0], viewport, 100, 50), [1.0, -1.0]);
        // Offset viewport, still relative to the whole surface.
        let viewport = Rect::new(50, 0, 50, 50);
        assert_eq!(to_clip([0.0, 25.0], viewport, 100, 50), [0.0, 0.0]);
    }
}
