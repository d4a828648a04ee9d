//! wgpu backend
//!
//! Draw calls are staged into one frame-wide vertex/index stream and encoded
//! into a single render pass at `end_frame`. Each staged draw keeps its own
//! texture/sampler bind group.

use super::{
    monospace_metrics, monospace_width, BackendError, BackendType, DeviceCapabilities, DrawCall,
    RenderBackend, TextDraw,
};
use crate::raster::{FontMetrics, Vertex};
use crate::renderable::{Color, FilterMode, FontId, ImageRef, SamplerMode, WrapMode};
use ahash::AHashMap;
use glam::Mat4;
use std::ops::Range;
use std::sync::Arc;
use wgpu::util::DeviceExt;
use winit::window::Window;

/// Bind-group slot used for untextured geometry.
const WHITE_IMAGE: u32 = u32::MAX;

const INITIAL_VERTEX_CAPACITY: usize = 4096;
const INITIAL_INDEX_CAPACITY: usize = 6144;

/// Probe an adapter's backend and limits.
pub fn query_capabilities(adapter: &wgpu::Adapter) -> DeviceCapabilities {
    let info = adapter.get_info();
    let limits = adapter.limits();
    let backend = match info.backend {
        wgpu::Backend::Metal => BackendType::Metal,
        wgpu::Backend::Dx12 => BackendType::DirectX12,
        wgpu::Backend::Vulkan => BackendType::Vulkan,
        wgpu::Backend::Gl => BackendType::OpenGL,
        wgpu::Backend::BrowserWebGpu => BackendType::BrowserWebGpu,
        _ => BackendType::Headless,
    };
    DeviceCapabilities {
        backend,
        max_texture_size: limits.max_texture_dimension_2d,
        max_buffer_size: limits.max_buffer_size,
    }
}

struct GpuImage {
    #[allow(dead_code)] // Keeps the texture alive behind its view
    texture: wgpu::Texture,
    view: wgpu::TextureView,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct BindKey {
    image: u32,
    sampler: SamplerMode,
}

struct StagedDraw {
    bind: BindKey,
    indices: Range<u32>,
    base_vertex: i32,
}

struct Frame {
    output: wgpu::SurfaceTexture,
    view_projection: Mat4,
    clear: Color,
}

pub struct WgpuBackend {
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
    capabilities: DeviceCapabilities,
    pipeline: wgpu::RenderPipeline,
    texture_layout: wgpu::BindGroupLayout,
    uniform_buffer: wgpu::Buffer,
    uniform_bind_group: wgpu::BindGroup,
    vertex_buffer: wgpu::Buffer,
    vertex_capacity: usize,
    index_buffer: wgpu::Buffer,
    index_capacity: usize,

    white: GpuImage,
    images: AHashMap<u32, GpuImage>,
    samplers: AHashMap<SamplerMode, wgpu::Sampler>,
    bind_groups: AHashMap<BindKey, wgpu::BindGroup>,

    frame: Option<Frame>,
    vertices: Vec<Vertex>,
    indices: Vec<u32>,
    staged: Vec<StagedDraw>,
}

impl WgpuBackend {
    pub async fn new(window: Arc<Window>, vsync: bool) -> Result<Self, BackendError> {
        let size = window.inner_size();

        let instance = wgpu::Instance::new(wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });

        let surface = instance
            .create_surface(window.clone())
            .map_err(|e| BackendError::CreateSurface(e.to_string()))?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::default(),
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .ok_or(BackendError::NoAdapter)?;

        let capabilities = query_capabilities(&adapter);
        tracing::info!(
            backend = ?capabilities.backend,
            adapter = %adapter.get_info().name,
            "GPU adapter selected"
        );

        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    label: Some("Kiln Device"),
                    required_features: wgpu::Features::empty(),
                    required_limits: wgpu::Limits::default(),
                    memory_hints: wgpu::MemoryHints::default(),
                },
                None,
            )
            .await
            .map_err(|e| BackendError::RequestDevice(e.to_string()))?;

        let surface_caps = surface.get_capabilities(&adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .copied()
            .find(|f| f.is_srgb())
            .or_else(|| surface_caps.formats.first().copied())
            .ok_or_else(|| BackendError::CreateSurface("surface reports no formats".into()))?;
        let alpha_mode = surface_caps
            .alpha_modes
            .first()
            .copied()
            .unwrap_or(wgpu::CompositeAlphaMode::Auto);

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: if vsync {
                wgpu::PresentMode::Fifo
            } else {
                wgpu::PresentMode::AutoNoVsync
            },
            alpha_mode,
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Sprite Shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("../../shaders/sprite.wgsl").into()),
        });

        let uniform_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Uniform Buffer"),
            contents: bytemuck::cast_slice(&Mat4::IDENTITY.to_cols_array()),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let uniform_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Uniform Bind Group Layout"),
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

        let uniform_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Uniform Bind Group"),
            layout: &uniform_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform_buffer.as_entire_binding(),
            }],
        });

        let texture_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Texture Bind Group Layout"),
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

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Sprite Pipeline Layout"),
            bind_group_layouts: &[&uniform_layout, &texture_layout],
            push_constant_ranges: &[],
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Sprite Pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                buffers: &[Vertex::layout()],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                targets: &[Some(wgpu::ColorTargetState {
                    format: config.format,
                    blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
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
            multisample: wgpu::MultisampleState {
                count: 1,
                mask: !0,
                alpha_to_coverage_enabled: false,
            },
            multiview: None,
            cache: None,
        });

        let vertex_buffer = create_vertex_buffer(&device, INITIAL_VERTEX_CAPACITY);
        let index_buffer = create_index_buffer(&device, INITIAL_INDEX_CAPACITY);
        let white = upload_image(&device, &queue, "White Texture", 1, 1, &[255; 4]);

        Ok(Self {
            surface,
            device,
            queue,
            config,
            capabilities,
            pipeline,
            texture_layout,
            uniform_buffer,
            uniform_bind_group,
            vertex_buffer,
            vertex_capacity: INITIAL_VERTEX_CAPACITY,
            index_buffer,
            index_capacity: INITIAL_INDEX_CAPACITY,
            white,
            images: AHashMap::new(),
            samplers: AHashMap::new(),
            bind_groups: AHashMap::new(),
            frame: None,
            vertices: Vec::new(),
            indices: Vec::new(),
            staged: Vec::new(),
        })
    }

    pub fn capabilities(&self) -> &DeviceCapabilities {
        &self.capabilities
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        self.config.width = width;
        self.config.height = height;
        self.surface.configure(&self.device, &self.config);
    }

    /// Upload RGBA8 pixels for `image`, replacing any previous upload with the same id.
    pub fn register_image(&mut self, image: ImageRef, rgba: &[u8]) -> Result<(), BackendError> {
        let expected = image.size.x as usize * image.size.y as usize * 4;
        if rgba.len() != expected || expected == 0 {
            return Err(BackendError::ImageSize {
                id: image.id,
                expected,
                actual: rgba.len(),
            });
        }
        let gpu = upload_image(
            &self.device,
            &self.queue,
            "Image Texture",
            image.size.x,
            image.size.y,
            rgba,
        );
        self.images.insert(image.id, gpu);
        self.bind_groups.retain(|key, _| key.image != image.id);
        tracing::debug!(id = image.id, width = image.size.x, height = image.size.y, "image registered");
        Ok(())
    }

    fn ensure_bind_group(&mut self, key: BindKey) -> Result<(), BackendError> {
        if self.bind_groups.contains_key(&key) {
            return Ok(());
        }
        let view = if key.image == WHITE_IMAGE {
            &self.white.view
        } else {
            match self.images.get(&key.image) {
                Some(image) => &image.view,
                None => return Err(BackendError::UnknownImage { id: key.image }),
            }
        };
        let device = &self.device;
        let sampler = self
            .samplers
            .entry(key.sampler)
            .or_insert_with(|| create_sampler(device, key.sampler));

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Texture Bind Group"),
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
        self.bind_groups.insert(key, bind_group);
        Ok(())
    }

    fn reserve_gpu_buffers(&mut self) {
        if self.vertices.len() > self.vertex_capacity {
            self.vertex_capacity = self.vertices.len().next_power_of_two();
            self.vertex_buffer = create_vertex_buffer(&self.device, self.vertex_capacity);
        }
        if self.indices.len() > self.index_capacity {
            self.index_capacity = self.indices.len().next_power_of_two();
            self.index_buffer = create_index_buffer(&self.device, self.index_capacity);
        }
    }
}

impl RenderBackend for WgpuBackend {
    fn begin_frame(&mut self, view_projection: Mat4, clear: Color) -> Result<(), BackendError> {
        self.vertices.clear();
        self.indices.clear();
        self.staged.clear();
        self.frame = None;

        let output = match self.surface.get_current_texture() {
            Ok(output) => output,
            Err(wgpu::SurfaceError::Timeout) => return Err(BackendError::Timeout),
            Err(wgpu::SurfaceError::OutOfMemory) => return Err(BackendError::OutOfMemory),
            Err(error) => {
                tracing::warn!(%error, "surface unavailable; reconfiguring");
                self.surface.configure(&self.device, &self.config);
                return Err(BackendError::SurfaceLost);
            }
        };

        self.frame = Some(Frame {
            output,
            view_projection,
            clear,
        });
        Ok(())
    }

    fn draw(&mut self, call: DrawCall<'_>) {
        if call.indices.is_empty() {
            return;
        }
        let mut bind = BindKey {
            image: call.state.texture.map_or(WHITE_IMAGE, |image| image.id),
            sampler: call.state.sampler,
        };
        if let Err(error) = self.ensure_bind_group(bind) {
            tracing::warn!(%error, "drawing untextured");
            bind.image = WHITE_IMAGE;
            if self.ensure_bind_group(bind).is_err() {
                return;
            }
        }

        let base_vertex = self.vertices.len() as i32;
        let first_index = self.indices.len() as u32;
        self.vertices.extend_from_slice(call.vertices);
        self.indices.extend_from_slice(call.indices);
        self.staged.push(StagedDraw {
            bind,
            indices: first_index..self.indices.len() as u32,
            base_vertex,
        });
    }

    fn draw_text(&mut self, text: TextDraw<'_>) {
        // No glyph rasterizer is attached to this backend yet.
        tracing::trace!(
            font = text.font.0,
            size = text.size,
            text = text.text,
            "text line skipped"
        );
    }

    fn font_metrics(&self, _font: FontId, size: f32) -> FontMetrics {
        monospace_metrics(size)
    }

    fn measure_text(&self, _font: FontId, size: f32, text: &str) -> f32 {
        monospace_width(size, text)
    }

    fn end_frame(&mut self) -> Result<(), BackendError> {
        let frame = self.frame.take().ok_or(BackendError::NoFrame)?;

        self.reserve_gpu_buffers();
        self.queue.write_buffer(
            &self.uniform_buffer,
            0,
            bytemuck::cast_slice(&frame.view_projection.to_cols_array()),
        );
        if !self.vertices.is_empty() {
            self.queue
                .write_buffer(&self.vertex_buffer, 0, bytemuck::cast_slice(&self.vertices));
            self.queue
                .write_buffer(&self.index_buffer, 0, bytemuck::cast_slice(&self.indices));
        }

        let view = frame
            .output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Render Encoder"),
            });

        {
            let [r, g, b, a] = frame.clear.to_f64();
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Render Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color { r, g, b, a }),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                occlusion_query_set: None,
                timestamp_writes: None,
            });

            render_pass.set_pipeline(&self.pipeline);
            render_pass.set_bind_group(0, &self.uniform_bind_group, &[]);
            render_pass.set_vertex_buffer(0, self.vertex_buffer.slice(..));
            render_pass.set_index_buffer(self.index_buffer.slice(..), wgpu::IndexFormat::Uint32);

            for draw in &self.staged {
                let Some(bind_group) = self.bind_groups.get(&draw.bind) else {
                    continue;
                };
                render_pass.set_bind_group(1, bind_group, &[]);
                render_pass.draw_indexed(draw.indices.clone(), draw.base_vertex, 0..1);
            }
        }

        self.queue.submit(std::iter::once(encoder.finish()));
        frame.output.present();
        Ok(())
    }
}

fn create_vertex_buffer(device: &wgpu::Device, capacity: usize) -> wgpu::Buffer {
    device.create_buffer(&wgpu::BufferDescriptor {
        label: Some("Vertex Buffer"),
        size: (std::mem::size_of::<Vertex>() * capacity) as u64,
        usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
        mapped_at_creation: false,
    })
}

fn create_index_buffer(device: &wgpu::Device, capacity: usize) -> wgpu::Buffer {
    device.create_buffer(&wgpu::BufferDescriptor {
        label: Some("Index Buffer"),
        size: (std::mem::size_of::<u32>() * capacity) as u64,
        usage: wgpu::BufferUsages::INDEX | wgpu::BufferUsages::COPY_DST,
        mapped_at_creation: false,
    })
}

fn create_sampler(device: &wgpu::Device, mode: SamplerMode) -> wgpu::Sampler {
    let filter = match mode.filter {
        FilterMode::Nearest => wgpu::FilterMode::Nearest,
        FilterMode::Linear => wgpu::FilterMode::Linear,
    };
    let address = match mode.wrap {
        WrapMode::Clamp => wgpu::AddressMode::ClampToEdge,
        WrapMode::Repeat => wgpu::AddressMode::Repeat,
    };
    device.create_sampler(&wgpu::SamplerDescriptor {
        label: Some("Image Sampler"),
        address_mode_u: address,
        address_mode_v: address,
        address_mode_w: address,
        mag_filter: filter,
        min_filter: filter,
        mipmap_filter: wgpu::FilterMode::Nearest,
        ..Default::default()
    })
}

fn upload_image(
    device: &wgpu::Device,
    queue: &wgpu::Queue,
    label: &str,
    width: u32,
    height: u32,
    rgba: &[u8],
) -> GpuImage {
    let size = wgpu::Extent3d {
        width,
        height,
        depth_or_array_layers: 1,
    };
    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some(label),
        size,
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: wgpu::TextureFormat::Rgba8UnormSrgb,
        usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
        view_formats: &[],
    });
    queue.write_texture(
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
    GpuImage { texture, view }
}
