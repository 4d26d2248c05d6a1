use winit::dpi::PhysicalSize;

use crate::device::GpuFrame;
use crate::frame::FrameStamp;

/// The fixed triangle scene.
///
/// Resources are created exactly once, after device negotiation completes;
/// only the depth texture is recreated on resize.
pub struct TriangleScene {
    pipeline: wgpu::RenderPipeline,
    depth_view: wgpu::TextureView,
}

impl TriangleScene {
    pub const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

    pub fn new(
        device: &wgpu::Device,
        surface_format: wgpu::TextureFormat,
        size: PhysicalSize<u32>,
    ) -> Self {
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("ember triangle shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shaders/triangle.wgsl").into()),
        });

        let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("ember triangle pipeline layout"),
            bind_group_layouts: &[],
            immediate_size: 0,
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("ember triangle pipeline"),
            layout: Some(&layout),

            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                compilation_options: Default::default(),
                buffers: &[],
            },

            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                compilation_options: Default::default(),
                targets: &[Some(wgpu::ColorTargetState {
                    format: surface_format,
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

            // Depth writes with compare Always: the attachment is exercised
            // but never rejects the triangle.
            depth_stencil: Some(wgpu::DepthStencilState {
                format: Self::DEPTH_FORMAT,
                depth_write_enabled: true,
                depth_compare: wgpu::CompareFunction::Always,
                stencil: wgpu::StencilState::default(),
                bias: wgpu::DepthBiasState::default(),
            }),

            multisample: wgpu::MultisampleState::default(),
            multiview_mask: None,
            cache: None,
        });

        let depth_view = create_depth_view(device, size);

        Self { pipeline, depth_view }
    }

    /// Recreates the depth texture for a new drawable size.
    pub fn resize(&mut self, device: &wgpu::Device, size: PhysicalSize<u32>) {
        self.depth_view = create_depth_view(device, size);
    }

    /// Clear color for a frame: fixed red/green, blue sweeping 0→1 across
    /// the frame budget.
    pub fn clear_color(stamp: FrameStamp) -> wgpu::Color {
        wgpu::Color {
            r: 0.5,
            g: 0.5,
            b: f64::from(stamp.index) / f64::from(stamp.cap.max(1)),
            a: 1.0,
        }
    }

    /// Records the render pass for one frame: clear, depth clear to 0, one
    /// three-vertex draw.
    pub fn encode(&self, frame: &mut GpuFrame, stamp: FrameStamp) {
        let mut rpass = frame.encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("ember triangle pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: &frame.view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(Self::clear_color(stamp)),
                    store: wgpu::StoreOp::Store,
                },
                depth_slice: None,
            })],
            depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                view: &self.depth_view,
                depth_ops: Some(wgpu::Operations {
                    load: wgpu::LoadOp::Clear(0.0),
                    store: wgpu::StoreOp::Store,
                }),
                stencil_ops: None,
            }),
            timestamp_writes: None,
            occlusion_query_set: None,
            multiview_mask: None,
        });

        rpass.set_pipeline(&self.pipeline);
        rpass.draw(0..3, 0..1);
    }
}

fn create_depth_view(device: &wgpu::Device, size: PhysicalSize<u32>) -> wgpu::TextureView {
    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some("ember depth texture"),
        size: wgpu::Extent3d {
            width: size.width.max(1),
            height: size.height.max(1),
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: TriangleScene::DEPTH_FORMAT,
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
        view_formats: &[],
    });
    texture.create_view(&wgpu::TextureViewDescriptor::default())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stamp(index: u32, cap: u32) -> FrameStamp {
        FrameStamp { index, cap }
    }

    #[test]
    fn clear_color_sweeps_blue_across_the_budget() {
        assert_eq!(TriangleScene::clear_color(stamp(30, 60)).b, 0.5);
        assert_eq!(TriangleScene::clear_color(stamp(60, 60)).b, 1.0);
    }

    #[test]
    fn clear_color_red_green_are_fixed() {
        let c = TriangleScene::clear_color(stamp(7, 60));
        assert_eq!((c.r, c.g, c.a), (0.5, 0.5, 1.0));
    }

    #[test]
    fn clear_color_is_deterministic_in_the_index() {
        assert_eq!(
            TriangleScene::clear_color(stamp(13, 60)),
            TriangleScene::clear_color(stamp(13, 60))
        );
    }

    #[test]
    fn zero_cap_does_not_divide_by_zero() {
        let c = TriangleScene::clear_color(stamp(0, 0));
        assert!(c.b.is_finite());
    }
}
