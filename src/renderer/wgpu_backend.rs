//! wgpu implementation of [`GpuDevice`].
//!
//! Renders into an offscreen `Rgba8UnormSrgb` target with a depth buffer.
//! Draw calls are queued during the frame and encoded into one render pass at
//! [`end_frame`](GpuDevice::end_frame), each with its own 256-byte-aligned slot
//! in a dynamic uniform buffer.

use std::borrow::Cow;
use std::collections::HashMap;

use glam::Vec3;

use crate::errors::{EngineError, Result};
use crate::renderer::device::{
    BufferId, BufferKind, DrawCall, GpuDevice, PolygonMode, TextureId, VertexLayout,
};
use crate::renderer::settings::RenderSettings;
use crate::renderer::uniforms::ShaderUniforms;

pub const COLOR_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8UnormSrgb;
pub const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

const SHADER_SOURCE: &str = include_str!("shader.wgsl");

struct GpuBuffer {
    kind: BufferKind,
    buffer: wgpu::Buffer,
    capacity: u64,
}

struct GpuTexture {
    texture: wgpu::Texture,
    view: wgpu::TextureView,
}

struct PendingDraw {
    call: DrawCall,
    uniform_offset: u32,
}

/// Offscreen wgpu renderer.
pub struct WgpuDevice {
    pub device: wgpu::Device,
    pub queue: wgpu::Queue,
    width: u32,
    height: u32,

    color_target: wgpu::Texture,
    color_view: wgpu::TextureView,
    depth_view: wgpu::TextureView,

    uniform_layout: wgpu::BindGroupLayout,
    texture_layout: wgpu::BindGroupLayout,
    pipeline_layout: wgpu::PipelineLayout,
    shader: wgpu::ShaderModule,
    pipelines: HashMap<(VertexLayout, PolygonMode), wgpu::RenderPipeline>,
    line_mode_supported: bool,

    sampler: wgpu::Sampler,
    fallback: GpuTexture,

    uniform_buffer: wgpu::Buffer,
    uniform_bind_group: wgpu::BindGroup,
    uniform_capacity: u64,
    uniform_stride: u64,
    uniform_data: Vec<u8>,

    buffers: HashMap<BufferId, GpuBuffer>,
    textures: HashMap<TextureId, GpuTexture>,
    next_id: u32,

    clear_color: wgpu::Color,
    pending: Vec<PendingDraw>,
}

impl WgpuDevice {
    /// Creates the adapter, device and offscreen targets. Blocks on adapter/device requests.
    pub fn new(settings: &RenderSettings) -> Result<Self> {
        let instance = wgpu::Instance::default();

        let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: settings.power_preference.to_wgpu(),
            compatible_surface: None,
            force_fallback_adapter: false,
        }))
        .map_err(|e| EngineError::AdapterRequestFailed(e.to_string()))?;

        log::info!("wgpu adapter: {:?}", adapter.get_info());

        let line_mode_supported = adapter.features().contains(wgpu::Features::POLYGON_MODE_LINE);
        let required_features = if line_mode_supported {
            wgpu::Features::POLYGON_MODE_LINE
        } else {
            log::warn!("Adapter has no line polygon mode, wireframe falls back to fill");
            wgpu::Features::empty()
        };

        let (device, queue) = pollster::block_on(adapter.request_device(&wgpu::DeviceDescriptor {
            label: Some("Lumen Device"),
            required_features,
            required_limits: wgpu::Limits::default(),
            memory_hints: wgpu::MemoryHints::Performance,
            ..Default::default()
        }))?;

        Self::from_device(
            device,
            queue,
            settings.width.max(1),
            settings.height.max(1),
            line_mode_supported,
        )
    }

    fn from_device(
        device: wgpu::Device,
        queue: wgpu::Queue,
        width: u32,
        height: u32,
        line_mode_supported: bool,
    ) -> Result<Self> {
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Lumen Shader"),
            source: wgpu::ShaderSource::Wgsl(Cow::Borrowed(SHADER_SOURCE)),
        });
        let info = pollster::block_on(shader.get_compilation_info());
        if let Some(error) = info
            .messages
            .iter()
            .find(|m| m.message_type == wgpu::CompilationMessageType::Error)
        {
            return Err(EngineError::ShaderCompilation(error.message.clone()));
        }

        let uniform_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Uniform Layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: true,
                    min_binding_size: wgpu::BufferSize::new(ShaderUniforms::SIZE),
                },
                count: None,
            }],
        });

        let texture_entry = |binding| wgpu::BindGroupLayoutEntry {
            binding,
            visibility: wgpu::ShaderStages::FRAGMENT,
            ty: wgpu::BindingType::Texture {
                sample_type: wgpu::TextureSampleType::Float { filterable: true },
                view_dimension: wgpu::TextureViewDimension::D2,
                multisampled: false,
            },
            count: None,
        };
        let texture_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Texture Layout"),
            entries: &[
                texture_entry(0),
                texture_entry(1),
                wgpu::BindGroupLayoutEntry {
                    binding: 2,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
            ],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Lumen Pipeline Layout"),
            bind_group_layouts: &[Some(&uniform_layout), Some(&texture_layout)],
            immediate_size: 0,
        });

        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("Linear Sampler"),
            address_mode_u: wgpu::AddressMode::Repeat,
            address_mode_v: wgpu::AddressMode::Repeat,
            address_mode_w: wgpu::AddressMode::Repeat,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            ..Default::default()
        });

        let fallback = create_rgba_texture(&device, 1, 1, "Fallback White");
        upload_rgba(&queue, &fallback.texture, 1, 1, &[255, 255, 255, 255]);

        let alignment = u64::from(device.limits().min_uniform_buffer_offset_alignment);
        let uniform_stride = ShaderUniforms::SIZE.div_ceil(alignment) * alignment;
        let uniform_capacity = uniform_stride * 64;
        let (uniform_buffer, uniform_bind_group) =
            create_uniform_buffer(&device, &uniform_layout, uniform_capacity);

        let (color_target, color_view, depth_view) = create_targets(&device, width, height);

        Ok(Self {
            device,
            queue,
            width,
            height,
            color_target,
            color_view,
            depth_view,
            uniform_layout,
            texture_layout,
            pipeline_layout,
            shader,
            pipelines: HashMap::new(),
            line_mode_supported,
            sampler,
            fallback,
            uniform_buffer,
            uniform_bind_group,
            uniform_capacity,
            uniform_stride,
            uniform_data: Vec::new(),
            buffers: HashMap::new(),
            textures: HashMap::new(),
            next_id: 0,
            clear_color: wgpu::Color::BLACK,
            pending: Vec::new(),
        })
    }

    #[must_use]
    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Copies the last finished frame back as tightly packed RGBA rows.
    pub fn read_pixels(&self) -> Result<Vec<u8>> {
        let unpadded = self.width * 4;
        let padded = unpadded.div_ceil(wgpu::COPY_BYTES_PER_ROW_ALIGNMENT) * wgpu::COPY_BYTES_PER_ROW_ALIGNMENT;

        let staging = self.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Readback Staging Buffer"),
            size: u64::from(padded) * u64::from(self.height),
            usage: wgpu::BufferUsages::COPY_DST | wgpu::BufferUsages::MAP_READ,
            mapped_at_creation: false,
        });

        let mut encoder = self.device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("Readback Encoder"),
        });
        encoder.copy_texture_to_buffer(
            wgpu::TexelCopyTextureInfo {
                texture: &self.color_target,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            wgpu::TexelCopyBufferInfo {
                buffer: &staging,
                layout: wgpu::TexelCopyBufferLayout {
                    offset: 0,
                    bytes_per_row: Some(padded),
                    rows_per_image: Some(self.height),
                },
            },
            self.extent(),
        );
        self.queue.submit(Some(encoder.finish()));

        let slice = staging.slice(..);
        let (tx, rx) = std::sync::mpsc::channel();
        slice.map_async(wgpu::MapMode::Read, move |result| {
            let _ = tx.send(result);
        });
        let _ = self.device.poll(wgpu::PollType::wait_indefinitely());

        match rx.recv() {
            Ok(Ok(())) => {}
            Ok(Err(e)) => return Err(EngineError::AdapterRequestFailed(e.to_string())),
            Err(e) => return Err(EngineError::AdapterRequestFailed(e.to_string())),
        }

        let mapped = slice.get_mapped_range();
        let mut pixels = Vec::with_capacity((unpadded * self.height) as usize);
        for row in mapped.chunks(padded as usize) {
            pixels.extend_from_slice(&row[..unpadded as usize]);
        }
        drop(mapped);
        staging.unmap();
        Ok(pixels)
    }

    fn extent(&self) -> wgpu::Extent3d {
        wgpu::Extent3d {
            width: self.width,
            height: self.height,
            depth_or_array_layers: 1,
        }
    }

    fn allocate_id(&mut self) -> u32 {
        self.next_id += 1;
        self.next_id
    }

    fn pipeline(&mut self, layout: VertexLayout, mode: PolygonMode) -> wgpu::RenderPipeline {
        let mode = if self.line_mode_supported { mode } else { PolygonMode::Fill };
        if let Some(pipeline) = self.pipelines.get(&(layout, mode)) {
            return pipeline.clone();
        }

        let attributes = vertex_attributes(layout);
        let buffers = [wgpu::VertexBufferLayout {
            array_stride: layout.stride(),
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &attributes,
        }];

        let pipeline = self.device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some(&format!("Lumen Pipeline ({layout:?}, {mode:?})")),
            layout: Some(&self.pipeline_layout),
            vertex: wgpu::VertexState {
                module: &self.shader,
                entry_point: Some("vs_main"),
                buffers: &buffers,
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &self.shader,
                entry_point: Some("fs_main"),
                targets: &[Some(wgpu::ColorTargetState {
                    format: COLOR_FORMAT,
                    blend: Some(wgpu::BlendState::REPLACE),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: None,
                polygon_mode: match mode {
                    PolygonMode::Fill => wgpu::PolygonMode::Fill,
                    PolygonMode::Line => wgpu::PolygonMode::Line,
                },
                ..Default::default()
            },
            depth_stencil: Some(wgpu::DepthStencilState {
                format: DEPTH_FORMAT,
                depth_write_enabled: Some(true),
                depth_compare: Some(wgpu::CompareFunction::LessEqual),
                stencil: wgpu::StencilState::default(),
                bias: wgpu::DepthBiasState::default(),
            }),
            multisample: wgpu::MultisampleState::default(),
            multiview_mask: None,
            cache: None,
        });

        self.pipelines.insert((layout, mode), pipeline.clone());
        pipeline
    }

    fn texture_bind_group(&self, ids: [Option<TextureId>; 2]) -> wgpu::BindGroup {
        let view = |id: Option<TextureId>| {
            id.and_then(|id| self.textures.get(&id))
                .map_or(&self.fallback.view, |t| &t.view)
        };
        self.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Texture Bind Group"),
            layout: &self.texture_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(view(ids[0])),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::TextureView(view(ids[1])),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: wgpu::BindingResource::Sampler(&self.sampler),
                },
            ],
        })
    }

    fn ensure_uniform_capacity(&mut self, required: u64) {
        if required <= self.uniform_capacity {
            return;
        }
        let capacity = required.next_power_of_two();
        log::debug!("Growing uniform buffer to {capacity} bytes");
        let (buffer, bind_group) = create_uniform_buffer(&self.device, &self.uniform_layout, capacity);
        self.uniform_buffer = buffer;
        self.uniform_bind_group = bind_group;
        self.uniform_capacity = capacity;
    }
}

impl GpuDevice for WgpuDevice {
    fn create_buffer(&mut self, kind: BufferKind) -> Option<BufferId> {
        let id = BufferId(self.allocate_id());
        // Real storage is created on the first write, once the size is known.
        let buffer = create_gpu_buffer(&self.device, kind, 4);
        self.buffers.insert(
            id,
            GpuBuffer {
                kind,
                buffer,
                capacity: 4,
            },
        );
        Some(id)
    }

    fn write_buffer(&mut self, id: BufferId, data: &[u8]) {
        let Some(entry) = self.buffers.get_mut(&id) else {
            log::warn!("Write to unknown buffer {id:?}");
            return;
        };
        let size = (data.len() as u64).next_multiple_of(wgpu::COPY_BUFFER_ALIGNMENT).max(4);
        if size > entry.capacity {
            entry.buffer.destroy();
            entry.buffer = create_gpu_buffer(&self.device, entry.kind, size);
            entry.capacity = size;
        }
        if data.is_empty() {
            return;
        }
        if data.len() as u64 == size {
            self.queue.write_buffer(&entry.buffer, 0, data);
        } else {
            let mut padded = data.to_vec();
            padded.resize(size as usize, 0);
            self.queue.write_buffer(&entry.buffer, 0, &padded);
        }
    }

    fn release_buffer(&mut self, id: BufferId) {
        if let Some(entry) = self.buffers.remove(&id) {
            entry.buffer.destroy();
        }
    }

    fn create_texture(&mut self, width: u32, height: u32) -> Option<TextureId> {
        let max = self.device.limits().max_texture_dimension_2d;
        if width == 0 || height == 0 || width > max || height > max {
            log::error!("Refusing to create a {width}x{height} texture (limit {max})");
            return None;
        }
        let id = TextureId(self.allocate_id());
        let texture = create_rgba_texture(&self.device, width, height, "Lumen Texture");
        self.textures.insert(id, texture);
        Some(id)
    }

    fn write_texture(&mut self, id: TextureId, width: u32, height: u32, rgb: &[u8]) {
        if !self.textures.contains_key(&id) {
            log::warn!("Write to unknown texture {id:?}");
            return;
        }
        let Some(expected) = crate::resources::ppm::rgb_len(width, height) else {
            log::error!("Texture upload of {width}x{height} overflows");
            return;
        };
        if rgb.len() < expected {
            log::error!("Texture upload needs {expected} bytes, got {}", rgb.len());
            return;
        }

        let size_changed = self.textures.get(&id).is_some_and(|t| {
            let size = t.texture.size();
            size.width != width || size.height != height
        });
        if size_changed {
            let texture = create_rgba_texture(&self.device, width, height, "Lumen Texture");
            if let Some(old) = self.textures.insert(id, texture) {
                old.texture.destroy();
            }
        }

        let rgba: Vec<u8> = rgb[..expected]
            .chunks_exact(3)
            .flat_map(|p| [p[0], p[1], p[2], 255])
            .collect();
        if let Some(texture) = self.textures.get(&id) {
            upload_rgba(&self.queue, &texture.texture, width, height, &rgba);
        }
    }

    fn release_texture(&mut self, id: TextureId) {
        if let Some(texture) = self.textures.remove(&id) {
            texture.texture.destroy();
        }
    }

    /// Recreates the offscreen targets. Zero sizes are ignored.
    fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        self.width = width;
        self.height = height;
        let (color_target, color_view, depth_view) = create_targets(&self.device, width, height);
        self.color_target = color_target;
        self.color_view = color_view;
        self.depth_view = depth_view;
    }

    fn begin_frame(&mut self, clear_color: Vec3) {
        self.clear_color = wgpu::Color {
            r: f64::from(clear_color.x),
            g: f64::from(clear_color.y),
            b: f64::from(clear_color.z),
            a: 1.0,
        };
        self.pending.clear();
        self.uniform_data.clear();
    }

    fn draw(&mut self, call: &DrawCall) {
        let offset = self.uniform_data.len() as u64;
        self.uniform_data.extend_from_slice(bytemuck::bytes_of(&call.uniforms));
        self.uniform_data.resize((offset + self.uniform_stride) as usize, 0);
        self.pending.push(PendingDraw {
            call: call.clone(),
            uniform_offset: offset as u32,
        });
    }

    fn end_frame(&mut self) {
        self.ensure_uniform_capacity(self.uniform_data.len() as u64);
        if !self.uniform_data.is_empty() {
            self.queue.write_buffer(&self.uniform_buffer, 0, &self.uniform_data);
        }

        let pending = std::mem::take(&mut self.pending);
        let prepared: Vec<_> = pending
            .iter()
            .map(|draw| {
                let pipeline = self.pipeline(draw.call.layout, draw.call.polygon_mode);
                let textures = self.texture_bind_group(draw.call.textures);
                (draw, pipeline, textures)
            })
            .collect();

        let mut encoder = self.device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("Lumen Frame Encoder"),
        });
        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Lumen Main Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &self.color_view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(self.clear_color),
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth_view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
                multiview_mask: None,
            });

            for (draw, pipeline, textures) in &prepared {
                let call = &draw.call;
                let (Some(vertex), Some(index)) =
                    (self.buffers.get(&call.vertex_buffer), self.buffers.get(&call.index_buffer))
                else {
                    log::warn!("Skipping draw with released buffers");
                    continue;
                };
                pass.set_pipeline(pipeline);
                pass.set_bind_group(0, &self.uniform_bind_group, &[draw.uniform_offset]);
                pass.set_bind_group(1, textures, &[]);
                pass.set_vertex_buffer(0, vertex.buffer.slice(..));
                pass.set_index_buffer(index.buffer.slice(..), wgpu::IndexFormat::Uint32);
                pass.draw_indexed(0..call.index_count, 0, 0..1);
            }
        }
        self.queue.submit(Some(encoder.finish()));
    }
}

// ============================================================================
// Helpers
// ============================================================================

fn vertex_attributes(layout: VertexLayout) -> [wgpu::VertexAttribute; 8] {
    let second = match layout {
        VertexLayout::Single => 0,
        VertexLayout::Interleaved => 36,
    };
    let attribute = |location, offset, format| wgpu::VertexAttribute {
        format,
        offset,
        shader_location: location,
    };
    [
        attribute(0, 0, wgpu::VertexFormat::Float32x3),
        attribute(1, 12, wgpu::VertexFormat::Float32x2),
        attribute(2, 20, wgpu::VertexFormat::Float32x3),
        attribute(3, 32, wgpu::VertexFormat::Float32),
        attribute(4, second, wgpu::VertexFormat::Float32x3),
        attribute(5, second + 12, wgpu::VertexFormat::Float32x2),
        attribute(6, second + 20, wgpu::VertexFormat::Float32x3),
        attribute(7, second + 32, wgpu::VertexFormat::Float32),
    ]
}

fn create_gpu_buffer(device: &wgpu::Device, kind: BufferKind, size: u64) -> wgpu::Buffer {
    let (label, usage) = match kind {
        BufferKind::Vertex => ("Vertex Buffer", wgpu::BufferUsages::VERTEX),
        BufferKind::Index => ("Index Buffer", wgpu::BufferUsages::INDEX),
    };
    device.create_buffer(&wgpu::BufferDescriptor {
        label: Some(label),
        size,
        usage: usage | wgpu::BufferUsages::COPY_DST,
        mapped_at_creation: false,
    })
}

fn create_uniform_buffer(
    device: &wgpu::Device,
    layout: &wgpu::BindGroupLayout,
    capacity: u64,
) -> (wgpu::Buffer, wgpu::BindGroup) {
    let buffer = device.create_buffer(&wgpu::BufferDescriptor {
        label: Some("Object Uniforms"),
        size: capacity,
        usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        mapped_at_creation: false,
    });
    let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some("Object Uniforms Bind Group"),
        layout,
        entries: &[wgpu::BindGroupEntry {
            binding: 0,
            resource: wgpu::BindingResource::Buffer(wgpu::BufferBinding {
                buffer: &buffer,
                offset: 0,
                size: wgpu::BufferSize::new(ShaderUniforms::SIZE),
            }),
        }],
    });
    (buffer, bind_group)
}

fn create_rgba_texture(device: &wgpu::Device, width: u32, height: u32, label: &str) -> GpuTexture {
    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some(label),
        size: wgpu::Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: wgpu::TextureFormat::Rgba8UnormSrgb,
        usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
        view_formats: &[],
    });
    let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
    GpuTexture { texture, view }
}

fn upload_rgba(queue: &wgpu::Queue, texture: &wgpu::Texture, width: u32, height: u32, rgba: &[u8]) {
    queue.write_texture(
        wgpu::TexelCopyTextureInfo {
            texture,
            mip_level: 0,
            origin: wgpu::Origin3d::ZERO,
            aspect: wgpu::TextureAspect::All,
        },
        rgba,
        wgpu::TexelCopyBufferLayout {
            offset: 0,
            bytes_per_row: Some(width * 4),
            rows_per_image: Some(height),
        },
        wgpu::Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        },
    );
}

fn create_targets(device: &wgpu::Device, width: u32, height: u32) -> (wgpu::Texture, wgpu::TextureView, wgpu::TextureView) {
    let size = wgpu::Extent3d {
        width,
        height,
        depth_or_array_layers: 1,
    };
    let color = device.create_texture(&wgpu::TextureDescriptor {
        label: Some("Offscreen Color"),
        size,
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: COLOR_FORMAT,
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::COPY_SRC,
        view_formats: &[],
    });
    let depth = device.create_texture(&wgpu::TextureDescriptor {
        label: Some("Depth Texture"),
        size,
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: DEPTH_FORMAT,
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
        view_formats: &[],
    });
    let color_view = color.create_view(&wgpu::TextureViewDescriptor::default());
    let depth_view = depth.create_view(&wgpu::TextureViewDescriptor::default());
    (color, color_view, depth_view)
}
