//! Campfire rendering: ground, flameys, the central flame and screen overlays

use bytemuck::{Pod, Zeroable};
use flamey_layout::{Flamey, FlameyBuffer};
use glam::Vec3;

use crate::ambience::SceneAmbience;
use crate::camera::PanningCamera;

const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

/// Per-frame scene uniform for GPU
#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
pub struct SceneUniform {
    pub view_proj: [[f32; 4]; 4],
    pub camera_right: [f32; 4],
    pub camera_up: [f32; 4],
    pub camera_position: [f32; 4],
    /// start, end
    pub fog: [f32; 4],
    pub fog_color: [f32; 4],
    /// xyz position, w intensity
    pub light: [f32; 4],
    pub light_color: [f32; 4],
    /// rgb color, a intensity
    pub hemi: [f32; 4],
    /// xyz center, w half extent
    pub ground: [f32; 4],
    pub ground_color: [f32; 4],
    /// rgb color, a weight
    pub vignette: [f32; 4],
    /// x loading cover alpha
    pub overlay: [f32; 4],
}

/// Everything that changes from frame to frame besides the flameys.
pub struct SceneFrame<'a> {
    pub camera: &'a PanningCamera,
    pub ambience: &'a SceneAmbience,
    pub flame_height: f32,
    pub light_intensity: f32,
    pub ground_position: Vec3,
    pub loading_alpha: f32,
}

impl SceneUniform {
    pub fn new(frame: &SceneFrame) -> Self {
        let ambience = frame.ambience;
        let (right, up, _) = frame.camera.basis();
        let light = ambience.light.position;
        let ground = frame.ground_position;

        Self {
            view_proj: frame.camera.build_view_projection_matrix().to_cols_array_2d(),
            camera_right: right.extend(0.0).to_array(),
            camera_up: up.extend(0.0).to_array(),
            camera_position: frame.camera.position().extend(1.0).to_array(),
            fog: [ambience.fog.start, ambience.fog.end, 0.0, 0.0],
            fog_color: ambience.fog.color.to_array(),
            light: [light.x, light.y, light.z, frame.light_intensity],
            light_color: ambience.light.color.to_array(),
            hemi: with_w(ambience.hemi_color.to_array(), ambience.hemi_intensity),
            ground: [ground.x, ground.y, ground.z, ambience.ground_extent],
            ground_color: ambience.ground_color.to_array(),
            vignette: with_w(ambience.vignette.color.to_array(), ambience.vignette.weight),
            overlay: [frame.loading_alpha, 0.0, 0.0, 0.0],
        }
    }
}

fn with_w(mut v: [f32; 4], w: f32) -> [f32; 4] {
    v[3] = w;
    v
}

/// GPU storage for one set of instances plus the bind group that exposes it.
struct InstanceBuffer {
    buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
    capacity: usize,
}

impl InstanceBuffer {
    fn new(
        device: &wgpu::Device,
        layout: &wgpu::BindGroupLayout,
        scene_buffer: &wgpu::Buffer,
        capacity: usize,
        label: &str,
    ) -> Self {
        // Zero-sized storage bindings are invalid
        let capacity = capacity.max(1);
        let buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some(label),
            size: (capacity * std::mem::size_of::<Flamey>()) as u64,
            usage: wgpu::BufferUsages::STORAGE | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some(label),
            layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: scene_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: buffer.as_entire_binding(),
                },
            ],
        });
        Self {
            buffer,
            bind_group,
            capacity,
        }
    }
}

pub struct CampfireRenderer {
    flamey_pipeline: wgpu::RenderPipeline,
    ground_pipeline: wgpu::RenderPipeline,
    overlay_pipeline: wgpu::RenderPipeline,
    scene_buffer: wgpu::Buffer,
    bind_group_layout: wgpu::BindGroupLayout,
    flameys: InstanceBuffer,
    flame: InstanceBuffer,
    flamey_count: u32,
    /// Store generation the flamey buffer was sized for
    uploaded_generation: Option<u64>,
    pub depth_texture: wgpu::TextureView,
}

impl CampfireRenderer {
    pub fn new(device: &wgpu::Device, surface_config: &wgpu::SurfaceConfiguration) -> Self {
        let scene_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Scene Buffer"),
            size: std::mem::size_of::<SceneUniform>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let depth_texture = Self::create_depth_texture(device, surface_config);

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Campfire Shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shaders/campfire.wgsl").into()),
        });

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Campfire Bind Group Layout"),
            entries: &[
                // Scene (Uniform) - Binding 0
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                },
                // Flameys (Storage) - Binding 1
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::VERTEX,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Storage { read_only: true },
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                },
            ],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Campfire Pipeline Layout"),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[],
        });

        let flamey_pipeline = Self::create_pipeline(
            device,
            &pipeline_layout,
            &shader,
            surface_config.format,
            "Flamey Render Pipeline",
            ("vs_flamey", "fs_flamey"),
            true,
        );
        let ground_pipeline = Self::create_pipeline(
            device,
            &pipeline_layout,
            &shader,
            surface_config.format,
            "Ground Render Pipeline",
            ("vs_ground", "fs_ground"),
            true,
        );
        let overlay_pipeline = Self::create_pipeline(
            device,
            &pipeline_layout,
            &shader,
            surface_config.format,
            "Overlay Render Pipeline",
            ("vs_overlay", "fs_overlay"),
            false,
        );

        let flameys = InstanceBuffer::new(
            device,
            &bind_group_layout,
            &scene_buffer,
            flamey_layout::FLAMEY_COUNT,
            "Flamey Buffer",
        );
        let flame = InstanceBuffer::new(
            device,
            &bind_group_layout,
            &scene_buffer,
            1,
            "Flame Buffer",
        );

        Self {
            flamey_pipeline,
            ground_pipeline,
            overlay_pipeline,
            scene_buffer,
            bind_group_layout,
            flameys,
            flame,
            flamey_count: 0,
            uploaded_generation: None,
            depth_texture,
        }
    }

    fn create_pipeline(
        device: &wgpu::Device,
        layout: &wgpu::PipelineLayout,
        shader: &wgpu::ShaderModule,
        format: wgpu::TextureFormat,
        label: &str,
        (vertex, fragment): (&str, &str),
        depth_test: bool,
    ) -> wgpu::RenderPipeline {
        let depth_stencil = if depth_test {
            wgpu::DepthStencilState {
                format: DEPTH_FORMAT,
                depth_write_enabled: true,
                depth_compare: wgpu::CompareFunction::Less,
                stencil: wgpu::StencilState::default(),
                bias: wgpu::DepthBiasState::default(),
            }
        } else {
            wgpu::DepthStencilState {
                format: DEPTH_FORMAT,
                depth_write_enabled: false,
                depth_compare: wgpu::CompareFunction::Always,
                stencil: wgpu::StencilState::default(),
                bias: wgpu::DepthBiasState::default(),
            }
        };

        device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some(label),
            layout: Some(layout),
            vertex: wgpu::VertexState {
                module: shader,
                entry_point: Some(vertex),
                buffers: &[],
                compilation_options: Default::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: shader,
                entry_point: Some(fragment),
                targets: &[Some(wgpu::ColorTargetState {
                    format,
                    blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: Default::default(),
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: None,
                unclipped_depth: false,
                polygon_mode: wgpu::PolygonMode::Fill,
                conservative: false,
            },
            depth_stencil: Some(depth_stencil),
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
            cache: None,
        })
    }

    fn create_depth_texture(
        device: &wgpu::Device,
        config: &wgpu::SurfaceConfiguration,
    ) -> wgpu::TextureView {
        let depth_texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("Depth Texture"),
            size: wgpu::Extent3d {
                width: config.width,
                height: config.height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: DEPTH_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });
        depth_texture.create_view(&wgpu::TextureViewDescriptor::default())
    }

    pub fn resize(&mut self, device: &wgpu::Device, new_config: &wgpu::SurfaceConfiguration) {
        self.depth_texture = Self::create_depth_texture(device, new_config);
    }

    /// Copy the flameys to the GPU.
    ///
    /// The buffer is resized to fit when the store was rebuilt since the last
    /// upload. Contents are written every frame since heights animate.
    pub fn upload_flameys(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        store: &FlameyBuffer,
    ) {
        let flameys = store.flameys();
        if let Some(capacity) = resized_capacity(
            self.uploaded_generation,
            self.flameys.capacity,
            store.generation(),
            flameys.len(),
        ) {
            log::debug!(
                "Resizing flamey buffer from {} to {}",
                self.flameys.capacity,
                capacity
            );
            self.flameys = InstanceBuffer::new(
                device,
                &self.bind_group_layout,
                &self.scene_buffer,
                capacity,
                "Flamey Buffer",
            );
        }
        self.uploaded_generation = Some(store.generation());

        if !flameys.is_empty() {
            queue.write_buffer(&self.flameys.buffer, 0, bytemuck::cast_slice(flameys));
        }
        self.flamey_count = flameys.len() as u32;
    }

    pub fn render(
        &self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        surface_view: &wgpu::TextureView,
        frame: &SceneFrame,
    ) {
        queue.write_buffer(
            &self.scene_buffer,
            0,
            bytemuck::cast_slice(&[SceneUniform::new(frame)]),
        );

        let ambience = frame.ambience;
        let flame = Flamey::new(
            Vec3::new(0.0, frame.flame_height + ambience.flame_scale * 0.5, 0.0),
            ambience.flame_scale,
            ambience.flame_color,
        );
        queue.write_buffer(&self.flame.buffer, 0, bytemuck::cast_slice(&[flame]));

        let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("Render Encoder"),
        });

        {
            let clear = ambience.clear_color;
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Render Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: surface_view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color {
                            r: clear.r as f64,
                            g: clear.g as f64,
                            b: clear.b as f64,
                            a: 1.0,
                        }),
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth_texture,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            render_pass.set_pipeline(&self.ground_pipeline);
            render_pass.set_bind_group(0, &self.flame.bind_group, &[]);
            render_pass.draw(0..6, 0..1);

            render_pass.set_pipeline(&self.flamey_pipeline);
            render_pass.draw(0..6, 0..1);
            if self.flamey_count > 0 {
                render_pass.set_bind_group(0, &self.flameys.bind_group, &[]);
                render_pass.draw(0..6, 0..self.flamey_count);
            }

            render_pass.set_pipeline(&self.overlay_pipeline);
            render_pass.draw(0..3, 0..1);
        }

        queue.submit(std::iter::once(encoder.finish()));
    }
}

/// New instance capacity, or `None` when the current buffer can stay.
///
/// A rebuilt store gets a buffer of exactly its size, so shrinking frees GPU
/// memory. Storage bindings cannot be empty, hence the floor of one.
fn resized_capacity(
    uploaded_generation: Option<u64>,
    capacity: usize,
    generation: u64,
    len: usize,
) -> Option<usize> {
    let needed = len.max(1);
    let rebuilt = uploaded_generation != Some(generation);
    if (rebuilt && needed != capacity) || needed > capacity {
        Some(needed)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::camera::CameraSettings;

    #[test]
    fn test_uniform_layout_matches_shader() {
        assert_eq!(std::mem::size_of::<SceneUniform>(), 256);
        assert_eq!(std::mem::size_of::<Flamey>(), 32);
    }

    #[test]
    fn test_buffer_follows_store_generation() {
        // First upload sizes to the store.
        assert_eq!(resized_capacity(None, 5000, 1, 200), Some(200));
        // Same generation keeps the buffer.
        assert_eq!(resized_capacity(Some(1), 200, 1, 200), None);
        // Rebuilt stores grow or shrink it.
        assert_eq!(resized_capacity(Some(1), 200, 2, 10000), Some(10000));
        assert_eq!(resized_capacity(Some(2), 10000, 3, 1000), Some(1000));
        // A rebuilt store of the same size reuses it.
        assert_eq!(resized_capacity(Some(3), 1000, 4, 1000), None);
        // Empty stores still bind one slot.
        assert_eq!(resized_capacity(Some(4), 1000, 5, 0), Some(1));
        assert_eq!(resized_capacity(Some(5), 1, 6, 0), None);
    }

    #[test]
    fn test_uniform_packs_frame() {
        let camera = PanningCamera::new(CameraSettings::default(), 800, 600);
        let ambience = SceneAmbience::default();
        let frame = SceneFrame {
            camera: &camera,
            ambience: &ambience,
            flame_height: 0.2,
            light_intensity: 1200.0,
            ground_position: Vec3::new(1.0, -5.0, 2.0),
            loading_alpha: 0.75,
        };
        let uniform = SceneUniform::new(&frame);

        assert_eq!(uniform.light, [0.0, 7.0, 0.0, 1200.0]);
        assert_eq!(uniform.fog[..2], [32.0, 96.0]);
        assert_eq!(uniform.ground, [1.0, -5.0, 2.0, 150.0]);
        assert_eq!(uniform.vignette[3], 5.0);
        assert_eq!(uniform.hemi[3], 0.2);
        assert_eq!(uniform.overlay[0], 0.75);
        assert!((uniform.camera_position[1] - camera.position().y).abs() < 1e-6);
    }
}
