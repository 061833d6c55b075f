// coupe-display
// Software rendering pipeline for a retro-computer emulator's display:
// palette-indexed pixel buffers, per-line density tracking, dirty-line
// composition to host pixel formats, and host/emulated coordinate mapping.

// Public modules
pub mod compositor;
pub mod config;
pub mod font;
pub mod mapper;
pub mod mode;
pub mod pack;
pub mod palette;
pub mod pixel_buffer;
pub mod rect;
pub mod screen;
pub mod screenshot;
pub mod window;

// Re-export main types for convenience
pub use compositor::{
    ComposeOptions, DisplayCompositor, FrameSource, MemorySurface, OutputSurface, SurfaceView,
};
pub use config::DisplayConfig;
pub use font::Font;
pub use mapper::CoordinateMapper;
pub use mode::{negotiate, ModeProbe, VideoError, VideoMode};
pub use pack::{Depth, Packer};
pub use palette::Palette;
pub use pixel_buffer::{DirtyLines, PixelBuffer};
pub use rect::Rect;
pub use screen::{EmulatedScreen, SCREEN_HEIGHT, SCREEN_WIDTH_HI, SCREEN_WIDTH_LO};
pub use screenshot::{save_screenshot, ScreenshotError};
pub use window::{run_display, DisplayWindow};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_library_components() {
        // Test that the pipeline pieces can be instantiated together
        let _screen = EmulatedScreen::new(SCREEN_WIDTH_LO, SCREEN_HEIGHT);
        let _palette = Palette::new(Depth::Rgba8888);
        let _compositor = DisplayCompositor::new(
            SCREEN_WIDTH_LO,
            SCREEN_HEIGHT,
            Depth::Rgba8888,
            ComposeOptions::default(),
        );
        let _surface = MemorySurface::new(SCREEN_WIDTH_HI, SCREEN_HEIGHT, Depth::Rgba8888);
        let _font = Font::default();
    }
}
