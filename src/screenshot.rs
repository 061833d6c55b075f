// Screenshot functionality
//
// Captures a screen's current contents and saves them as a PNG file. The
// screen is converted through a palette to RGB at its stored density
// (low-density lines are doubled), independent of the host surface depth.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::palette::Palette;
use crate::screen::EmulatedScreen;

/// Errors that can occur during screenshot operations
#[derive(Debug)]
pub enum ScreenshotError {
    /// I/O error
    Io(io::Error),

    /// PNG encoding error
    PngEncoding(png::EncodingError),
}

impl std::fmt::Display for ScreenshotError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ScreenshotError::Io(e) => write!(f, "I/O error: {}", e),
            ScreenshotError::PngEncoding(e) => write!(f, "PNG encoding error: {}", e),
        }
    }
}

impl std::error::Error for ScreenshotError {}

impl From<io::Error> for ScreenshotError {
    fn from(e: io::Error) -> Self {
        ScreenshotError::Io(e)
    }
}

impl From<png::EncodingError> for ScreenshotError {
    fn from(e: png::EncodingError) -> Self {
        ScreenshotError::PngEncoding(e)
    }
}

/// Save a screenshot of the screen's current contents
///
/// The image is always written at the high-density width so mixed-density
/// frames come out square. Returns the path of the saved file.
pub fn save_screenshot(
    screen: &EmulatedScreen,
    palette: &Palette,
    directory: &Path,
    include_timestamp: bool,
) -> Result<PathBuf, ScreenshotError> {
    fs::create_dir_all(directory)?;

    let filename = if include_timestamp {
        let timestamp = chrono::Local::now().format("%Y%m%d_%H%M%S");
        format!("screenshot_{}.png", timestamp)
    } else {
        "screenshot.png".to_string()
    };
    let file_path = directory.join(filename);

    let rgb = screen_to_rgb(screen, palette);
    save_png(
        &file_path,
        &rgb,
        screen.width_hi() as u32,
        screen.height() as u32,
    )?;

    Ok(file_path)
}

/// Convert the screen to RGB888 at the high-density width
fn screen_to_rgb(screen: &EmulatedScreen, palette: &Palette) -> Vec<u8> {
    let width_hi = screen.width_hi();
    let mut rgb = Vec::with_capacity(width_hi * screen.height() * 3);

    for y in 0..screen.height() {
        let line = screen.line(y);
        if screen.is_high_density(y) {
            for &index in &line[..width_hi] {
                rgb.extend_from_slice(&palette.rgb(index));
            }
        } else {
            for &index in &line[..width_hi / 2] {
                let px = palette.rgb(index);
                rgb.extend_from_slice(&px);
                rgb.extend_from_slice(&px);
            }
        }
    }

    rgb
}

/// Save RGB data as a PNG file
fn save_png(path: &Path, data: &[u8], width: u32, height: u32) -> Result<(), ScreenshotError> {
    let file = fs::File::create(path)?;
    let w = io::BufWriter::new(file);

    let mut encoder = png::Encoder::new(w, width, height);
    encoder.set_color(png::ColorType::Rgb);
    encoder.set_depth(png::BitDepth::Eight);

    let mut writer = encoder.write_header()?;
    writer.write_image_data(data)?;

    Ok(())
}
