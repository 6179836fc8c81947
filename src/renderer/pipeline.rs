//! GPU side of drawing: one colour pipeline over a per-frame triangle list

use wgpu::util::DeviceExt;

use super::scene::world_to_ndc;
use super::vertex::{Vertex, colors};
use crate::sim::Bounds;

/// Surface, device and the flat-colour pipeline
pub struct RenderState {
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
    pipeline: wgpu::RenderPipeline,
    /// Last uploaded frame, `None` until something was drawn
    frame: Option<(wgpu::Buffer, u32)>,
    /// Surface size in pixels
    pub size: (u32, u32),
}

/// First sRGB format, else whatever the surface lists first
fn pick_format(formats: &[wgpu::TextureFormat]) -> wgpu::TextureFormat {
    formats
        .iter()
        .copied()
        .find(|f| f.is_srgb())
        .or_else(|| formats.first().copied())
        .unwrap_or(wgpu::TextureFormat::Bgra8UnormSrgb)
}

fn sky() -> wgpu::Color {
    let [r, g, b, _] = colors::SKY;
    wgpu::Color {
        r: r as f64,
        g: g as f64,
        b: b as f64,
        a: 1.0,
    }
}

/// World-space vertices to clip space through the camera window
fn to_clip_space(vertices: &[Vertex], view: &Bounds) -> Vec<Vertex> {
    vertices
        .iter()
        .map(|v| {
            let [x, y] = world_to_ndc(view, v.position.into());
            Vertex::new(x, y, v.color)
        })
        .collect()
}

fn colour_pipeline(device: &wgpu::Device, format: wgpu::TextureFormat) -> wgpu::RenderPipeline {
    let module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some("sling-shader"),
        source: wgpu::ShaderSource::Wgsl(include_str!("shader.wgsl").into()),
    });
    let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some("sling-layout"),
        bind_group_layouts: &[],
        immediate_size: 0,
    });

    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some("sling-pipeline"),
        layout: Some(&layout),
        vertex: wgpu::VertexState {
            module: &module,
            entry_point: Some("vs_main"),
            buffers: &[Vertex::desc()],
            compilation_options: Default::default(),
        },
        fragment: Some(wgpu::FragmentState {
            module: &module,
            entry_point: Some("fs_main"),
            targets: &[Some(wgpu::ColorTargetState {
                format,
                blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                write_mask: wgpu::ColorWrites::ALL,
            })],
            compilation_options: Default::default(),
        }),
        // Sprites are 2D and wound either way
        primitive: wgpu::PrimitiveState {
            cull_mode: None,
            ..Default::default()
        },
        depth_stencil: None,
        multisample: wgpu::MultisampleState::default(),
        multiview_mask: None,
        cache: None,
    })
}

impl RenderState {
    pub async fn new(
        surface: wgpu::Surface<'static>,
        adapter: &wgpu::Adapter,
        width: u32,
        height: u32,
    ) -> Result<Self, wgpu::RequestDeviceError> {
        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("turkey-sling-device"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::downlevel_webgl2_defaults(),
                memory_hints: Default::default(),
                trace: Default::default(),
                experimental_features: Default::default(),
            })
            .await?;

        let caps = surface.get_capabilities(adapter);
        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: pick_format(&caps.formats),
            width: width.max(1),
            height: height.max(1),
            present_mode: wgpu::PresentMode::AutoVsync,
            alpha_mode: caps.alpha_modes.first().copied().unwrap_or(wgpu::CompositeAlphaMode::Auto),
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);
        let pipeline = colour_pipeline(&device, config.format);

        log::info!("Render pipeline ready ({width}x{height}, {:?})", config.format);

        Ok(Self {
            surface,
            device,
            queue,
            size: (config.width, config.height),
            config,
            pipeline,
            frame: None,
        })
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        self.size = (width, height);
        self.config.width = width;
        self.config.height = height;
        self.surface.configure(&self.device, &self.config);
    }

    /// Upload world-space vertices and draw them as seen through `view`
    pub fn render(&mut self, vertices: &[Vertex], view: &Bounds) -> Result<(), wgpu::SurfaceError> {
        let clip = to_clip_space(vertices, view);
        self.frame = (!clip.is_empty()).then(|| {
            let buffer = self.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("sling-vertices"),
                contents: bytemuck::cast_slice(&clip),
                usage: wgpu::BufferUsages::VERTEX,
            });
            (buffer, clip.len() as u32)
        });

        let output = self.surface.get_current_texture()?;
        let target = output.texture.create_view(&wgpu::TextureViewDescriptor::default());
        let mut encoder = self.device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("sling-frame"),
        });

        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("sling-pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &target,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(sky()),
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
                multiview_mask: None,
            });

            if let Some((buffer, count)) = &self.frame {
                pass.set_pipeline(&self.pipeline);
                pass.set_vertex_buffer(0, buffer.slice(..));
                pass.draw(0..*count, 0..1);
            }
        }

        self.queue.submit(std::iter::once(encoder.finish()));
        output.present();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use glam::Vec2;

    use super::*;
    use wgpu::TextureFormat;

    #[test]
    fn test_pick_format_prefers_srgb() {
        let formats = [TextureFormat::Bgra8Unorm, TextureFormat::Rgba8UnormSrgb];
        assert_eq!(pick_format(&formats), TextureFormat::Rgba8UnormSrgb);
        assert_eq!(pick_format(&[TextureFormat::Rgba16Float]), TextureFormat::Rgba16Float);
        assert_eq!(pick_format(&[]), TextureFormat::Bgra8UnormSrgb);
    }

    #[test]
    fn test_to_clip_space_keeps_colour() {
        let view = Bounds::new(Vec2::new(100.0, 0.0), Vec2::new(300.0, 200.0));
        let verts = [Vertex::new(200.0, 100.0, colors::TURKEY), Vertex::new(100.0, 0.0, colors::BAND)];
        let clip = to_clip_space(&verts, &view);
        assert_eq!(clip[0].position, [0.0, 0.0]);
        assert_eq!(clip[0].color, colors::TURKEY);
        assert_eq!(clip[1].position, [-1.0, 1.0]);
    }
}
