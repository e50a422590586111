mod ui;

use anyhow::Result;
use clap::Parser;
use diamond_assets::ResourceRoot;
use diamond_common::Viewport;
use diamond_input::{Action, InputState, Key};
use diamond_persist::StateFile;
use diamond_render::{DebugTextRenderer, Renderer, plan_frame};
use diamond_render_wgpu::{GpuContext, WgpuRenderer};
use diamond_scene::{ProgramState, SceneManifest};
use egui::Context as EguiContext;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use tracing_subscriber::EnvFilter;
use ui::FrameStats;
use winit::application::ApplicationHandler;
use winit::dpi::PhysicalSize;
use winit::event::{DeviceEvent, ElementState, KeyEvent, MouseScrollDelta, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::{CursorGrabMode, Window, WindowId};

const WINDOW_TITLE: &str = "Diamond's Universe";
const INIT_FAILURE_EXIT_CODE: i32 = -1;

#[derive(Parser)]
#[command(name = "diamond-desktop", about = "Diamond's Universe")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Directory all asset paths are resolved against
    #[arg(long, default_value = "resources")]
    resources: PathBuf,

    /// Program state file (defaults to <resources>/program_state.txt)
    #[arg(long)]
    state_file: Option<PathBuf>,

    /// Print the first frame's plan and exit without opening a window
    #[arg(long)]
    describe: bool,
}

impl Cli {
    fn state_file(&self) -> StateFile {
        StateFile::new(
            self.state_file
                .clone()
                .unwrap_or_else(|| self.resources.join("program_state.txt")),
        )
    }
}

fn key_from_code(code: KeyCode) -> Option<Key> {
    Some(match code {
        KeyCode::KeyW => Key::W,
        KeyCode::KeyA => Key::A,
        KeyCode::KeyS => Key::S,
        KeyCode::KeyD => Key::D,
        KeyCode::KeyC => Key::C,
        KeyCode::KeyP => Key::P,
        KeyCode::KeyQ => Key::Q,
        KeyCode::KeyE => Key::E,
        KeyCode::KeyB => Key::B,
        KeyCode::Space => Key::Space,
        KeyCode::F1 => Key::F1,
        KeyCode::F2 => Key::F2,
        KeyCode::Escape => Key::Escape,
        _ => return None,
    })
}

/// Whether an event egui consumed should be withheld from the scene. Key
/// releases always pass through so a key held before the UI took focus is
/// not left down.
fn ui_captures(consumed: bool, settings_open: bool, key_state: Option<ElementState>) -> bool {
    consumed && settings_open && key_state != Some(ElementState::Released)
}

/// Load persisted state over the defaults. Failures leave defaults in place.
fn load_state(file: &StateFile) -> ProgramState {
    let mut state = ProgramState::default();
    match file.load_into(&mut state) {
        Ok(outcome) => tracing::debug!(?outcome, "state file read"),
        Err(e) => tracing::error!("failed to read state file: {e}"),
    }
    state
}

fn load_manifest(root: &ResourceRoot) -> SceneManifest {
    SceneManifest::load(root.path()).unwrap_or_else(|e| {
        tracing::error!("scene manifest unreadable, using built-in scene: {e}");
        SceneManifest::default()
    })
}

/// Everything that exists only once the window is up.
struct Gpu {
    window: Arc<Window>,
    context: GpuContext,
    renderer: WgpuRenderer,
    egui_winit: egui_winit::State,
    egui_renderer: egui_wgpu::Renderer,
}

struct DesktopApp {
    state: ProgramState,
    manifest: SceneManifest,
    resources: ResourceRoot,
    state_file: StateFile,
    input: InputState,
    gpu: Option<Gpu>,
    egui_ctx: EguiContext,
    stats: FrameStats,
    /// Sum of raw mouse motion, fed to the look tracker as a cursor position.
    cursor: (f64, f64),
    cursor_grabbed: bool,
    started: Instant,
    last_frame: Instant,
    init_failed: bool,
}

impl DesktopApp {
    fn new(
        state: ProgramState,
        manifest: SceneManifest,
        resources: ResourceRoot,
        state_file: StateFile,
    ) -> Self {
        let now = Instant::now();
        Self {
            state,
            manifest,
            resources,
            state_file,
            input: InputState::new(),
            gpu: None,
            egui_ctx: EguiContext::default(),
            stats: FrameStats::default(),
            cursor: (0.0, 0.0),
            cursor_grabbed: false,
            started: now,
            last_frame: now,
            init_failed: false,
        }
    }

    fn init_gpu(&self, event_loop: &ActiveEventLoop) -> Result<Gpu> {
        let attrs = Window::default_attributes()
            .with_title(WINDOW_TITLE)
            .with_inner_size(PhysicalSize::new(800u32, 600));
        let window = Arc::new(event_loop.create_window(attrs)?);

        let size = window.inner_size();
        let viewport = Viewport::new(size.width, size.height);
        let context = GpuContext::new(window.clone(), viewport)?;

        let renderer = WgpuRenderer::new(
            &context.device,
            &context.queue,
            context.format(),
            context.viewport(),
            &self.resources,
            &self.manifest,
        );

        let egui_winit = egui_winit::State::new(
            self.egui_ctx.clone(),
            egui::ViewportId::ROOT,
            &window,
            Some(window.scale_factor() as f32),
            None,
            None,
        );
        let egui_renderer =
            egui_wgpu::Renderer::new(&context.device, context.format(), None, 1, false);

        Ok(Gpu {
            window,
            context,
            renderer,
            egui_winit,
            egui_renderer,
        })
    }

    /// Grab the cursor for mouse look unless the settings panel owns it.
    fn sync_cursor(&mut self) {
        let Some(gpu) = &self.gpu else {
            return;
        };
        let want_grab = !self.state.settings_panel_enabled;
        if want_grab == self.cursor_grabbed {
            return;
        }

        if want_grab {
            let grabbed = gpu
                .window
                .set_cursor_grab(CursorGrabMode::Confined)
                .or_else(|_| gpu.window.set_cursor_grab(CursorGrabMode::Locked));
            if let Err(e) = grabbed {
                tracing::warn!("cursor grab unavailable: {e}");
            }
            gpu.window.set_cursor_visible(false);
            self.input.reset_mouse();
        } else {
            if let Err(e) = gpu.window.set_cursor_grab(CursorGrabMode::None) {
                tracing::warn!("cursor release failed: {e}");
            }
            gpu.window.set_cursor_visible(true);
        }
        self.cursor_grabbed = want_grab;
    }

    fn apply(&mut self, event_loop: &ActiveEventLoop, action: Action, dt: f32) {
        if action == Action::Quit {
            event_loop.exit();
            return;
        }
        action.apply(&mut self.state, dt);
    }

    fn redraw(&mut self, event_loop: &ActiveEventLoop) {
        let now = Instant::now();
        let dt = (now - self.last_frame).as_secs_f32();
        self.last_frame = now;
        self.stats.record(dt);

        for action in self.input.poll() {
            self.apply(event_loop, action, dt);
        }
        self.sync_cursor();
        self.state.update_special_zone();

        let Some(gpu) = &mut self.gpu else {
            return;
        };
        let viewport = gpu.context.viewport();
        let frame = plan_frame(
            &self.state,
            &self.manifest,
            viewport,
            self.started.elapsed().as_secs_f32(),
        );

        let Some(output) = gpu.context.acquire() else {
            return;
        };
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let device = &gpu.context.device;
        let queue = &gpu.context.queue;
        let commands = gpu.renderer.target(device, queue, &view).render(&frame);
        queue.submit(std::iter::once(commands));

        let raw_input = gpu.egui_winit.take_egui_input(&gpu.window);
        let state = &mut self.state;
        let stats = &self.stats;
        let full_output = self.egui_ctx.run(raw_input, |ctx| {
            ui::draw(ctx, state, stats);
        });
        gpu.egui_winit
            .handle_platform_output(&gpu.window, full_output.platform_output);

        let paint_jobs = self
            .egui_ctx
            .tessellate(full_output.shapes, full_output.pixels_per_point);
        let screen_descriptor = egui_wgpu::ScreenDescriptor {
            size_in_pixels: [viewport.width, viewport.height],
            pixels_per_point: full_output.pixels_per_point,
        };

        for (id, image_delta) in &full_output.textures_delta.set {
            gpu.egui_renderer
                .update_texture(device, queue, *id, image_delta);
        }
        let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("egui_encoder"),
        });
        gpu.egui_renderer.update_buffers(
            device,
            queue,
            &mut encoder,
            &paint_jobs,
            &screen_descriptor,
        );
        {
            let mut pass = encoder
                .begin_render_pass(&wgpu::RenderPassDescriptor {
                    label: Some("egui_pass"),
                    color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                        view: &view,
                        resolve_target: None,
                        ops: wgpu::Operations {
                            load: wgpu::LoadOp::Load,
                            store: wgpu::StoreOp::Store,
                        },
                    })],
                    depth_stencil_attachment: None,
                    ..Default::default()
                })
                .forget_lifetime();
            gpu.egui_renderer
                .render(&mut pass, &paint_jobs, &screen_descriptor);
        }
        queue.submit(std::iter::once(encoder.finish()));
        for id in &full_output.textures_delta.free {
            gpu.egui_renderer.free_texture(id);
        }

        output.present();
    }
}

impl ApplicationHandler for DesktopApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.gpu.is_some() || self.init_failed {
            return;
        }

        match self.init_gpu(event_loop) {
            Ok(gpu) => {
                self.gpu = Some(gpu);
                self.sync_cursor();
            }
            Err(e) => {
                tracing::error!("initialisation failed: {e:#}");
                self.init_failed = true;
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
        if let Some(gpu) = &mut self.gpu {
            let response = gpu.egui_winit.on_window_event(&gpu.window, &event);
            let key_state = match &event {
                WindowEvent::KeyboardInput { event, .. } => Some(event.state),
                _ => None,
            };
            if ui_captures(
                response.consumed,
                self.state.settings_panel_enabled,
                key_state,
            ) {
                return;
            }
        }

        match event {
            WindowEvent::CloseRequested => {
                event_loop.exit();
            }
            WindowEvent::Resized(new_size) => {
                if let Some(gpu) = &mut self.gpu {
                    let viewport = Viewport::new(new_size.width, new_size.height);
                    gpu.context.resize(viewport);
                    gpu.renderer
                        .resize(&gpu.context.device, gpu.context.viewport());
                    tracing::debug!("resized to {}x{}", viewport.width, viewport.height);
                }
            }
            WindowEvent::Focused(focused) => {
                if focused {
                    self.input.reset_mouse();
                } else {
                    self.input.release_all();
                }
            }
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key: PhysicalKey::Code(code),
                        state: key_state,
                        repeat,
                        ..
                    },
                ..
            } => {
                let Some(key) = key_from_code(code) else {
                    return;
                };
                let pressed = key_state == ElementState::Pressed;
                if let Some(action) = self.input.key_event(key, pressed, repeat) {
                    self.apply(event_loop, action, 0.0);
                    self.sync_cursor();
                }
            }
            WindowEvent::MouseWheel { delta, .. } => {
                let lines = match delta {
                    MouseScrollDelta::LineDelta(_, y) => y,
                    MouseScrollDelta::PixelDelta(p) => p.y as f32 / 20.0,
                };
                let action = self.input.scroll(lines);
                self.apply(event_loop, action, 0.0);
            }
            WindowEvent::RedrawRequested => {
                self.redraw(event_loop);
            }
            _ => {}
        }
    }

    fn device_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _device_id: winit::event::DeviceId,
        event: DeviceEvent,
    ) {
        if let DeviceEvent::MouseMotion { delta } = event {
            if !self.cursor_grabbed {
                return;
            }
            self.cursor.0 += delta.0;
            self.cursor.1 += delta.1;
            let look_enabled = self.state.camera_mouse_update_enabled;
            if let Some(action) = self
                .input
                .cursor_moved(self.cursor.0, self.cursor.1, look_enabled)
            {
                self.apply(event_loop, action, 0.0);
            }
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(gpu) = &self.gpu {
            gpu.window.request_redraw();
        }
    }

    fn exiting(&mut self, _event_loop: &ActiveEventLoop) {
        if self.init_failed {
            return;
        }
        match self.state_file.save(&self.state) {
            Ok(()) => tracing::info!("state saved to {}", self.state_file.path().display()),
            Err(e) => tracing::error!("failed to save state: {e}"),
        }
    }
}

fn describe(state: &ProgramState, manifest: &SceneManifest) {
    let frame = plan_frame(state, manifest, Viewport::default(), 0.0);
    print!("{}", DebugTextRenderer::new().render(&frame));
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    tracing::info!("diamond-desktop starting");

    let resources = ResourceRoot::new(&cli.resources);
    let state_file = cli.state_file();
    let mut state = load_state(&state_file);
    state.update_special_zone();
    let manifest = load_manifest(&resources);

    if cli.describe {
        describe(&state, &manifest);
        return Ok(());
    }

    let event_loop = match EventLoop::new() {
        Ok(event_loop) => event_loop,
        Err(e) => {
            tracing::error!("failed to create event loop: {e}");
            std::process::exit(INIT_FAILURE_EXIT_CODE);
        }
    };
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = DesktopApp::new(state, manifest, resources, state_file);
    event_loop.run_app(&mut app)?;

    if app.init_failed {
        std::process::exit(INIT_FAILURE_EXIT_CODE);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mapped_keys_cover_every_binding() {
        let codes = [
            KeyCode::KeyW,
            KeyCode::KeyA,
            KeyCode::KeyS,
            KeyCode::KeyD,
            KeyCode::KeyC,
            KeyCode::KeyP,
            KeyCode::KeyQ,
            KeyCode::KeyE,
            KeyCode::KeyB,
            KeyCode::Space,
            KeyCode::F1,
            KeyCode::F2,
            KeyCode::Escape,
        ];
        let keys: std::collections::HashSet<Key> =
            codes.iter().filter_map(|c| key_from_code(*c)).collect();
        assert_eq!(keys.len(), codes.len());
    }

    #[test]
    fn unbound_keys_are_ignored() {
        assert_eq!(key_from_code(KeyCode::KeyZ), None);
        assert_eq!(key_from_code(KeyCode::ShiftLeft), None);
    }

    #[test]
    fn key_release_reaches_input_while_ui_has_focus() {
        assert!(!ui_captures(true, true, Some(ElementState::Released)));
        assert!(ui_captures(true, true, Some(ElementState::Pressed)));
        assert!(ui_captures(true, true, None));
        assert!(!ui_captures(true, false, Some(ElementState::Pressed)));
        assert!(!ui_captures(false, true, None));
    }

    #[test]
    fn release_after_swallowed_press_stops_movement() {
        let mut input = InputState::new();
        input.key_event(Key::W, true, false);
        assert!(!input.poll().is_empty());

        // The UI takes focus; the release still arrives.
        if !ui_captures(true, true, Some(ElementState::Released)) {
            input.key_event(Key::W, false, false);
        }
        assert!(!input.is_held(Key::W));
        assert!(input.poll().is_empty());
    }

    #[test]
    fn default_state_file_lives_in_resources() {
        let cli = Cli::parse_from(["diamond-desktop", "--resources", "assets"]);
        assert_eq!(
            cli.state_file().path(),
            PathBuf::from("assets").join("program_state.txt")
        );
    }

    #[test]
    fn explicit_state_file_wins() {
        let cli = Cli::parse_from(["diamond-desktop", "--state-file", "/tmp/state.txt"]);
        assert_eq!(cli.state_file().path(), PathBuf::from("/tmp/state.txt"));
    }

    #[test]
    fn missing_state_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let state = load_state(&StateFile::new(dir.path().join("program_state.txt")));
        assert_eq!(state, ProgramState::default());
    }
}
