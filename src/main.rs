//! Campfire
//!
//! Thousands of flameys floating in rings around a pulsing fire. Drag to pan,
//! click to pick a flamey, press 1-4 to repopulate and C to recenter.

use campfire_renderer::{
    pick_flamey, CameraSettings, CampfireRenderer, FireAnimation, GroundParallax, LoadingFade,
    PanningCamera, RenderError, SceneAmbience, SceneFrame,
};
use flamey_layout::{Campfire, CampfireParams, FlameyBuffer, Population, FLAMEY_COUNT};
use glam::Vec3;
use rand::rngs::ThreadRng;
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Instant;
use winit::{
    application::ApplicationHandler,
    event::*,
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    keyboard::{KeyCode, PhysicalKey},
    window::{Window, WindowId},
};

/// Flamey counts behind the number keys 1-4.
const PRESET_COUNTS: [usize; 4] = [200, 1000, 5000, 10000];
/// Ground plane sits this far below the flameys.
const GROUND_DROP: f32 = 5.0;
const GROUND_PARALLAX: f32 = -0.25;
/// Pointer travel (pixels) beyond which a press is a drag, not a pick.
const CLICK_SLOP: f64 = 4.0;

/// Input collected between frames, applied in order at the start of the next one.
#[derive(Debug, Default)]
struct PendingInput {
    /// Only the latest request matters since each rebuild replaces the last
    population: Option<usize>,
    picks: VecDeque<(f64, f64)>,
}

impl PendingInput {
    fn request_population(&mut self, count: usize) {
        self.population = Some(count);
    }

    fn request_pick(&mut self, x: f64, y: f64) {
        self.picks.push_back((x, y));
    }

    fn take_population(&mut self) -> Option<usize> {
        self.population.take()
    }

    fn next_pick(&mut self) -> Option<(f64, f64)> {
        self.picks.pop_front()
    }
}

struct GpuState {
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,

    renderer: CampfireRenderer,
    camera: PanningCamera,
    parallax: GroundParallax,
    ambience: SceneAmbience,
    fire: FireAnimation,
    loading: LoadingFade,

    campfire: Campfire,
    flameys: FlameyBuffer,
    rng: ThreadRng,

    pending: PendingInput,

    frame_times: VecDeque<f32>,
    last_frame_time: Instant,
}

impl GpuState {
    async fn new(window: Arc<Window>) -> Result<Self, RenderError> {
        let size = window.inner_size();

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor::default());
        let surface = instance.create_surface(window.clone())?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await?;

        log::info!("Using GPU: {}", adapter.get_info().name);

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("Device"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::default(),
                memory_hints: wgpu::MemoryHints::default(),
                experimental_features: wgpu::ExperimentalFeatures::default(),
                trace: wgpu::Trace::Off,
            })
            .await?;

        let surface_caps = surface.get_capabilities(&adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .find(|f| f.is_srgb())
            .or_else(|| surface_caps.formats.first())
            .copied()
            .ok_or(RenderError::NoSurfaceFormat)?;

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: wgpu::PresentMode::AutoVsync,
            alpha_mode: surface_caps
                .alpha_modes
                .first()
                .copied()
                .unwrap_or(wgpu::CompositeAlphaMode::Auto),
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        let renderer = CampfireRenderer::new(&device, &config);
        log::info!("Renderer initialized");

        let camera = PanningCamera::new(CameraSettings::default(), config.width, config.height);
        let parallax = GroundParallax::new(
            camera.position(),
            Vec3::new(0.0, -GROUND_DROP, 0.0),
            GROUND_PARALLAX,
        );

        let campfire = Campfire::new(CampfireParams::default())?;

        Ok(Self {
            surface,
            device,
            queue,
            config,
            renderer,
            camera,
            parallax,
            ambience: SceneAmbience::default(),
            fire: FireAnimation::default(),
            loading: LoadingFade::default(),
            campfire,
            flameys: FlameyBuffer::new(),
            rng: rand::rng(),
            pending: PendingInput {
                population: Some(FLAMEY_COUNT),
                ..PendingInput::default()
            },
            frame_times: VecDeque::with_capacity(100),
            last_frame_time: Instant::now(),
        })
    }

    fn resize(&mut self, new_size: winit::dpi::PhysicalSize<u32>) {
        if new_size.width > 0 && new_size.height > 0 {
            self.config.width = new_size.width;
            self.config.height = new_size.height;
            self.surface.configure(&self.device, &self.config);
            self.renderer.resize(&self.device, &self.config);
            self.camera.resize(new_size.width, new_size.height);
        }
    }

    fn apply_pending(&mut self) {
        if let Some(count) = self.pending.take_population() {
            match self.campfire.populate(&mut self.flameys, count, &mut self.rng) {
                Ok(()) => {
                    self.camera.center();
                    self.loading.hide();
                }
                Err(e) => log::error!("Could not populate {} flameys: {}", count, e),
            }
        }

        while let Some((x, y)) = self.pending.next_pick() {
            let ray = self.camera.screen_to_world_ray(
                x as f32,
                y as f32,
                self.config.width as f32,
                self.config.height as f32,
            );
            let hit = pick_flamey(&ray, self.flameys.flameys());
            if let Some(index) = self.campfire.on_pick(&mut self.flameys, hit) {
                log::info!("Picked flamey {}", index);
            }
        }
    }

    fn render(&mut self) -> Result<(f32, f32), wgpu::SurfaceError> {
        let now = Instant::now();
        let frame_time = (now - self.last_frame_time).as_secs_f32() * 1000.0;
        self.last_frame_time = now;

        self.apply_pending();

        self.camera.update();
        self.campfire.on_frame_tick(&mut self.flameys, frame_time as f64);
        self.loading.update(frame_time);

        let (flame_height, light_intensity) = self.fire.sample(self.campfire.elapsed_ms());
        let ground_position = self.parallax.position(self.camera.position());

        self.renderer.upload_flameys(&self.device, &self.queue, &self.flameys);

        let output = self.surface.get_current_texture()?;
        let view = output.texture.create_view(&wgpu::TextureViewDescriptor::default());

        let frame = SceneFrame {
            camera: &self.camera,
            ambience: &self.ambience,
            flame_height,
            light_intensity,
            ground_position,
            loading_alpha: self.loading.alpha(),
        };
        self.renderer.render(&self.device, &self.queue, &view, &frame);

        output.present();

        self.frame_times.push_back(frame_time);
        if self.frame_times.len() > 100 {
            self.frame_times.pop_front();
        }
        let avg_frame_time = self.frame_times.iter().sum::<f32>() / self.frame_times.len() as f32;
        let fps = if avg_frame_time > 0.0 {
            1000.0 / avg_frame_time
        } else {
            0.0
        };

        Ok((fps, avg_frame_time))
    }
}

struct App {
    window: Option<Arc<Window>>,
    gpu_state: Option<GpuState>,

    left_mouse_pressed: bool,
    last_cursor_pos: Option<(f64, f64)>,
    press_pos: Option<(f64, f64)>,
    dragged: bool,
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        let window_attributes = Window::default_attributes()
            .with_title("Campfire")
            .with_inner_size(winit::dpi::LogicalSize::new(1600, 900));

        let window = match event_loop.create_window(window_attributes) {
            Ok(window) => Arc::new(window),
            Err(e) => {
                log::error!("Failed to create window: {}", e);
                event_loop.exit();
                return;
            }
        };

        match pollster::block_on(GpuState::new(window.clone())) {
            Ok(state) => {
                self.window = Some(window);
                self.gpu_state = Some(state);
            }
            Err(e) => {
                log::error!("GPU initialization failed: {}", e);
                event_loop.exit();
            }
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        match event {
            WindowEvent::CloseRequested
            | WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key: PhysicalKey::Code(KeyCode::Escape),
                        state: ElementState::Pressed,
                        ..
                    },
                ..
            } => event_loop.exit(),

            WindowEvent::Resized(physical_size) => {
                if let Some(gpu_state) = &mut self.gpu_state {
                    gpu_state.resize(physical_size);
                }
            }

            WindowEvent::MouseInput { state, button, .. } => {
                if button == MouseButton::Left {
                    self.left_mouse_pressed = state == ElementState::Pressed;

                    if state == ElementState::Pressed {
                        self.press_pos = self.last_cursor_pos;
                        self.dragged = false;
                    } else if !self.dragged {
                        if let (Some((x, y)), Some(gpu_state)) =
                            (self.last_cursor_pos, &mut self.gpu_state)
                        {
                            gpu_state.pending.request_pick(x, y);
                        }
                    }
                }
            }

            WindowEvent::CursorMoved { position, .. } => {
                if self.left_mouse_pressed {
                    if let Some(last_pos) = self.last_cursor_pos {
                        let delta_x = (position.x - last_pos.0) as f32;
                        let delta_y = (position.y - last_pos.1) as f32;

                        if let Some(gpu_state) = &mut self.gpu_state {
                            gpu_state.camera.pan(delta_x, delta_y);
                        }
                    }
                    if let Some(press) = self.press_pos {
                        let travel = (position.x - press.0).hypot(position.y - press.1);
                        if travel > CLICK_SLOP {
                            self.dragged = true;
                        }
                    }
                }
                self.last_cursor_pos = Some((position.x, position.y));
            }

            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key: PhysicalKey::Code(key_code),
                        state: ElementState::Pressed,
                        repeat: false,
                        ..
                    },
                ..
            } => {
                if let Some(gpu_state) = &mut self.gpu_state {
                    let preset = match key_code {
                        KeyCode::Digit1 => Some(PRESET_COUNTS[0]),
                        KeyCode::Digit2 => Some(PRESET_COUNTS[1]),
                        KeyCode::Digit3 => Some(PRESET_COUNTS[2]),
                        KeyCode::Digit4 => Some(PRESET_COUNTS[3]),
                        KeyCode::KeyC => {
                            gpu_state.camera.center();
                            None
                        }
                        _ => None,
                    };
                    if let Some(count) = preset {
                        gpu_state.pending.request_population(count);
                    }
                }
            }

            WindowEvent::RedrawRequested => {
                if let (Some(window), Some(gpu_state)) = (&self.window, &mut self.gpu_state) {
                    match gpu_state.render() {
                        Ok((fps, frame_time)) => {
                            let count = match gpu_state.campfire.population() {
                                Population::Populated(count) => count,
                                Population::Empty => 0,
                            };
                            let selected = gpu_state
                                .campfire
                                .selection()
                                .index()
                                .map(|i| format!(" - flamey #{i}"))
                                .unwrap_or_default();
                            window.set_title(&format!(
                                "Campfire - {:.0} FPS ({:.2}ms) - {} flameys{}",
                                fps, frame_time, count, selected
                            ));
                        }
                        Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                            gpu_state.resize(window.inner_size())
                        }
                        Err(wgpu::SurfaceError::OutOfMemory) => event_loop.exit(),
                        Err(e) => log::warn!("Render error: {:?}", e),
                    }
                }
            }

            _ => {}
        }

        if let Some(window) = &self.window {
            window.request_redraw();
        }
    }
}

fn main() {
    // Initialize logger (RUST_LOG=debug for verbose output)
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    log::info!("Lighting the campfire...");

    let event_loop = match EventLoop::new() {
        Ok(event_loop) => event_loop,
        Err(e) => {
            log::error!("Failed to create event loop: {}", e);
            return;
        }
    };
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = App {
        window: None,
        gpu_state: None,
        left_mouse_pressed: false,
        last_cursor_pos: None,
        press_pos: None,
        dragged: false,
    };

    if let Err(e) = event_loop.run_app(&mut app) {
        log::error!("Event loop error: {}", e);
    }
}
