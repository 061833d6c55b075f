// Window module - presents composited frames in a desktop window
//
// This is the presentation shell around the rendering pipeline: it owns the
// emulated screen, palette and compositor, negotiates the surface mode, and
// feeds the compositor once per frame tick using the winit and pixels
// crates. All rendering logic lives in the pipeline; the shell only wires
// events to it.

use crate::compositor::{DisplayCompositor, OutputSurface, SurfaceView};
use crate::config::DisplayConfig;
use crate::mapper::CoordinateMapper;
use crate::mode::{negotiate, VideoError, VideoMode};
use crate::pack::Depth;
use crate::palette::Palette;
use crate::screen::{EmulatedScreen, SCREEN_HEIGHT, SCREEN_WIDTH_LO};
use crate::screenshot::save_screenshot;
use pixels::{Pixels, SurfaceTexture};
use std::sync::Arc;
use std::time::{Duration, Instant};
use winit::application::ApplicationHandler;
use winit::dpi::LogicalSize;
use winit::event::{ElementState, KeyEvent, MouseButton, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::{Window, WindowId};

/// Output surface backed by a pixels frame buffer (always RGBA8888)
struct PixelsSurface {
    pixels: Pixels<'static>,
    width: usize,
    height: usize,
}

impl OutputSurface for PixelsSurface {
    fn depth(&self) -> Depth {
        Depth::Rgba8888
    }

    fn width(&self) -> usize {
        self.width
    }

    fn height(&self) -> usize {
        self.height
    }

    fn lock(&mut self) -> SurfaceView<'_> {
        let pitch = self.width * 4;
        SurfaceView {
            data: self.pixels.frame_mut(),
            pitch,
        }
    }
}

/// Display window presenting the composited emulated screen
pub struct DisplayWindow {
    window: Option<Arc<Window>>,
    surface: Option<PixelsSurface>,
    config: DisplayConfig,
    screen: EmulatedScreen,
    palette: Palette,
    compositor: DisplayCompositor,
    paused: bool,
    last_frame_time: Instant,
    pointer: (i32, i32),
}

impl DisplayWindow {
    /// Create the window state and negotiate the surface mode
    ///
    /// The pixels backend only provides 32-bit surfaces, so a configuration
    /// preferring a lower depth fails mode negotiation here and the error
    /// propagates to the caller.
    pub fn new(config: DisplayConfig) -> Result<Self, VideoError> {
        let screen = EmulatedScreen::new(SCREEN_WIDTH_LO, SCREEN_HEIGHT);
        let compositor = DisplayCompositor::new(
            SCREEN_WIDTH_LO,
            SCREEN_HEIGHT,
            Depth::Rgba8888,
            config.compose_options(),
        );

        let (w, h) = compositor.natural_size();
        let mode = negotiate(
            &mut |m: &VideoMode| m.depth == Depth::Rgba8888,
            VideoMode::new(w, h, config.preferred_depth()),
            &[],
        )?;

        Ok(Self {
            window: None,
            surface: None,
            palette: Palette::new(mode.depth),
            config,
            screen,
            compositor,
            paused: false,
            last_frame_time: Instant::now(),
            pointer: (0, 0),
        })
    }

    pub fn screen(&self) -> &EmulatedScreen {
        &self.screen
    }

    pub fn screen_mut(&mut self) -> &mut EmulatedScreen {
        &mut self.screen
    }

    /// Mapper for the rectangles the compositor last computed
    pub fn mapper(&self) -> CoordinateMapper {
        CoordinateMapper::new(
            self.compositor.source_rect(),
            self.compositor.target_rect(),
            true,
        )
    }

    fn frame_duration(&self) -> Duration {
        Duration::from_micros(1_000_000 / self.config.video.fps.max(1) as u64)
    }

    fn should_render_frame(&mut self) -> bool {
        let elapsed = self.last_frame_time.elapsed();
        if elapsed >= self.frame_duration() {
            self.last_frame_time = Instant::now();
            true
        } else {
            false
        }
    }

    /// Run one compositor pass and present the frame
    fn render(&mut self) -> Result<(), pixels::Error> {
        if let Some(surface) = &mut self.surface {
            self.compositor
                .compose(&mut self.screen, &self.palette, surface);
            surface.pixels.render()?;
        }
        Ok(())
    }

    /// Toggle pause: the palette dims while paused
    fn toggle_pause(&mut self) {
        self.paused = !self.paused;
        self.palette.rebuild(self.palette.depth(), self.paused);
        // Colours changed everywhere
        self.screen.mark_all_dirty();
    }

    fn take_screenshot(&self) {
        let result = save_screenshot(
            &self.screen,
            &self.palette,
            &self.config.screenshot.directory,
            self.config.screenshot.include_timestamp,
        );
        match result {
            Ok(path) => println!("Screenshot saved to {}", path.display()),
            Err(e) => eprintln!("Screenshot failed: {}", e),
        }
    }

    fn handle_key(&mut self, key: PhysicalKey, event_loop: &ActiveEventLoop) {
        match key {
            PhysicalKey::Code(KeyCode::Escape) => event_loop.exit(),
            PhysicalKey::Code(KeyCode::KeyP) => self.toggle_pause(),
            PhysicalKey::Code(KeyCode::F9) => self.take_screenshot(),
            _ => {}
        }
    }
}

impl ApplicationHandler for DisplayWindow {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        let (natural_w, natural_h) = self.compositor.natural_size();
        let scale = self.config.video.scale.clamp(1, 4);

        let window_attributes = Window::default_attributes()
            .with_title(format!("coupe-display - {}x{}", natural_w, natural_h))
            .with_inner_size(LogicalSize::new(
                natural_w as u32 * scale,
                natural_h as u32 * scale,
            ))
            .with_resizable(false);

        let window = event_loop
            .create_window(window_attributes)
            .expect("Failed to create window");

        let window = Arc::new(window);
        let window_size = window.inner_size();

        let surface_texture =
            SurfaceTexture::new(window_size.width, window_size.height, window.clone());
        let pixels = Pixels::new(natural_w as u32, natural_h as u32, surface_texture)
            .expect("Failed to create pixel buffer");

        self.window = Some(window);
        self.surface = Some(PixelsSurface {
            pixels,
            width: natural_w,
            height: natural_h,
        });
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        match event {
            WindowEvent::CloseRequested => {
                event_loop.exit();
            }
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key,
                        state: ElementState::Pressed,
                        ..
                    },
                ..
            } => {
                self.handle_key(physical_key, event_loop);
            }
            WindowEvent::CursorMoved { position, .. } => {
                // Window coordinates -> surface pixels -> emulated pixels
                let scale = self.config.video.scale.clamp(1, 4) as f64;
                let (sx, sy) = (position.x / scale, position.y / scale);
                self.pointer = self.mapper().to_emulated_point(sx as i32, sy as i32);
            }
            WindowEvent::MouseInput {
                state: ElementState::Pressed,
                button: MouseButton::Left,
                ..
            } => {
                // Paint a pixel where the pointer is, as a pipeline demo
                let (x, y) = self.pointer;
                if y >= 0 && (y as usize) < self.screen.height() {
                    self.screen.upgrade_line(y as usize);
                }
                self.screen
                    .buffer_mut()
                    .plot(x, y, crate::palette::OVERLAY_WHITE);
            }
            WindowEvent::RedrawRequested => {
                if self.should_render_frame() {
                    if let Err(err) = self.render() {
                        eprintln!("Render error: {}", err);
                        event_loop.exit();
                    }
                }
                if let Some(window) = &self.window {
                    window.request_redraw();
                }
            }
            _ => {}
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(window) = &self.window {
            window.request_redraw();
        }
    }
}

/// Create and run the display window until closed
pub fn run_display(config: DisplayConfig) -> Result<(), Box<dyn std::error::Error>> {
    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut display = DisplayWindow::new(config)?;
    draw_demo_scene(display.screen_mut());

    event_loop.run_app(&mut display)?;
    Ok(())
}

/// Draw a scene exercising the drawing primitives
fn draw_demo_scene(screen: &mut EmulatedScreen) {
    use crate::palette::{OVERLAY_GREY, OVERLAY_WHITE};

    // The scene uses the full high-density grid
    for y in 0..screen.height() {
        screen.upgrade_line(y);
    }

    let width = screen.width_hi() as i32;
    let height = screen.height() as i32;
    let buffer = screen.buffer_mut();

    // Colour bars across the top half
    let bars = 16;
    for i in 0..bars {
        let x = i * width / bars;
        let w = (i + 1) * width / bars - x;
        buffer.fill_rect(x, 0, w, height / 2, (i * 8 + 7) as u8);
    }

    buffer.fill_rect(0, height / 2, width, height / 2, 0);
    buffer.frame_rect(8, height / 2 + 8, width - 16, height / 2 - 16, OVERLAY_GREY, true);
    buffer.draw_string(
        16,
        height / 2 + 16,
        "\x07Wcoupe-display\x07X\n\nP pauses (dimmed palette)\nF9 saves a screenshot\nclick paints a pixel",
        OVERLAY_WHITE,
    );
}
