// Colour palette - maps palette indices to host-native colour values
//
// The emulated machine drives 128 display colours from a 7-bit colour number:
// two intensity bits per G/R/B channel plus a shared half-intensity bit.
// On top of those sit 16 fixed overlay colours used for on-screen UI text
// and frames. The palette is rebuilt whenever the host depth or the dimmed
// state changes; a rebuild is assembled into locals and swapped in whole so
// a compositor pass never observes a half-built table.

use crate::pack::Depth;

/// Number of emulated display colours
pub const DISPLAY_COLOURS: usize = 128;

/// Number of overlay (UI) colours appended after the display colours
pub const OVERLAY_COLOURS: usize = 16;

/// Total palette entries
pub const TOTAL_COLOURS: usize = DISPLAY_COLOURS + OVERLAY_COLOURS;

// Overlay palette indices. The bright variant of a colour is its index + 8.
pub const OVERLAY_BLACK: u8 = 128;
pub const OVERLAY_BLUE: u8 = 129;
pub const OVERLAY_RED: u8 = 130;
pub const OVERLAY_MAGENTA: u8 = 131;
pub const OVERLAY_GREEN: u8 = 132;
pub const OVERLAY_CYAN: u8 = 133;
pub const OVERLAY_YELLOW: u8 = 134;
pub const OVERLAY_GREY: u8 = 135;
pub const OVERLAY_BRIGHT_OFFSET: u8 = 8;
pub const OVERLAY_WHITE: u8 = OVERLAY_GREY + OVERLAY_BRIGHT_OFFSET;

/// Fixed RGB values for the 16 overlay colours (dark set, then bright set)
const OVERLAY_RGB: [[u8; 3]; OVERLAY_COLOURS] = [
    [0x00, 0x00, 0x00],
    [0x00, 0x00, 0xAA],
    [0xAA, 0x00, 0x00],
    [0xAA, 0x00, 0xAA],
    [0x00, 0xAA, 0x00],
    [0x00, 0xAA, 0xAA],
    [0xAA, 0xAA, 0x00],
    [0xAA, 0xAA, 0xAA],
    [0x55, 0x55, 0x55],
    [0x55, 0x55, 0xFF],
    [0xFF, 0x55, 0x55],
    [0xFF, 0x55, 0xFF],
    [0x55, 0xFF, 0x55],
    [0x55, 0xFF, 0xFF],
    [0xFF, 0xFF, 0x55],
    [0xFF, 0xFF, 0xFF],
];

/// RGB for a 7-bit emulated colour number
///
/// Bit layout: 0=B low, 1=R low, 2=G low, 3=half intensity (all channels),
/// 4=B high, 5=R high, 6=G high. Each channel resolves to a 3-bit level
/// (high*4 + low*2 + half) scaled to the full 8-bit range.
pub fn display_rgb(index: u8) -> [u8; 3] {
    let half = (index >> 3) & 1;
    let level = |hi: u8, lo: u8| -> u8 {
        let v = (hi << 2) | (lo << 1) | half;
        ((v as u32 * 0xFF) / 7) as u8
    };

    [
        level((index >> 5) & 1, (index >> 1) & 1),
        level((index >> 6) & 1, (index >> 2) & 1),
        level((index >> 4) & 1, index & 1),
    ]
}

/// Scale a colour to two thirds intensity (paused / inactive / overlay dim)
fn dim([r, g, b]: [u8; 3]) -> [u8; 3] {
    [
        (r as u32 * 2 / 3) as u8,
        (g as u32 * 2 / 3) as u8,
        (b as u32 * 2 / 3) as u8,
    ]
}

/// Pack an RGB triple into the native value for a depth
///
/// For indexed targets the native value is the palette index itself; the
/// surface carries its own hardware palette (see [`Palette::hardware`]).
fn native_value(depth: Depth, index: usize, [r, g, b]: [u8; 3]) -> u32 {
    match depth {
        Depth::Indexed8 => index as u32,
        Depth::Rgb565 => {
            ((r as u32 >> 3) << 11) | ((g as u32 >> 2) << 5) | (b as u32 >> 3)
        }
        Depth::Rgb888 | Depth::Rgba8888 => {
            ((r as u32) << 16) | ((g as u32) << 8) | b as u32
        }
    }
}

/// The full colour table for the current depth and dimmed state
pub struct Palette {
    depth: Depth,
    dimmed: bool,
    rgb: [[u8; 3]; TOTAL_COLOURS],
    native: [u32; TOTAL_COLOURS],
}

impl Palette {
    pub fn new(depth: Depth) -> Self {
        let mut palette = Self {
            depth,
            dimmed: false,
            rgb: [[0; 3]; TOTAL_COLOURS],
            native: [0; TOTAL_COLOURS],
        };
        palette.rebuild(depth, false);
        palette
    }

    /// Rebuild every entry for a new depth and/or dimmed state
    ///
    /// The new tables are built into locals and assigned in one step, so a
    /// reader never sees a mix of old and new entries.
    pub fn rebuild(&mut self, depth: Depth, dimmed: bool) {
        let mut rgb = [[0u8; 3]; TOTAL_COLOURS];
        let mut native = [0u32; TOTAL_COLOURS];

        for (i, entry) in rgb.iter_mut().enumerate() {
            let base = if i < DISPLAY_COLOURS {
                display_rgb(i as u8)
            } else {
                OVERLAY_RGB[i - DISPLAY_COLOURS]
            };
            *entry = if dimmed { dim(base) } else { base };
        }

        for (i, entry) in native.iter_mut().enumerate() {
            *entry = native_value(depth, i, rgb[i]);
        }

        self.depth = depth;
        self.dimmed = dimmed;
        self.rgb = rgb;
        self.native = native;
    }

    pub fn depth(&self) -> Depth {
        self.depth
    }

    pub fn is_dimmed(&self) -> bool {
        self.dimmed
    }

    /// 8-bit RGB triple for a palette index
    #[inline]
    pub fn rgb(&self, index: u8) -> [u8; 3] {
        self.rgb[index as usize % TOTAL_COLOURS]
    }

    /// Host-native packed value for a palette index
    #[inline]
    pub fn native(&self, index: u8) -> u32 {
        self.native[index as usize % TOTAL_COLOURS]
    }

    /// 6-bit-per-channel hardware palette entry, for indexed (8-bit) hosts
    #[inline]
    pub fn hardware(&self, index: u8) -> [u8; 3] {
        let [r, g, b] = self.rgb(index);
        [r >> 2, g >> 2, b >> 2]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_rgb_extremes() {
        // Colour 0 is black, colour 127 is full white
        assert_eq!(display_rgb(0), [0, 0, 0]);
        assert_eq!(display_rgb(127), [0xFF, 0xFF, 0xFF]);
    }

    #[test]
    fn test_display_rgb_channels() {
        // Blue low bit only: level 2 of 7 on the blue channel
        let [r, g, b] = display_rgb(0b0000001);
        assert_eq!((r, g), (0, 0));
        assert_eq!(b, (2 * 0xFF / 7) as u8);

        // Green high bit only: level 4 of 7 on the green channel
        let [r, g, b] = display_rgb(0b1000000);
        assert_eq!((r, b), (0, 0));
        assert_eq!(g, (4 * 0xFF / 7) as u8);
    }

    #[test]
    fn test_native_rgb565_round_trip() {
        let palette = Palette::new(Depth::Rgb565);
        let native = palette.native(OVERLAY_WHITE);
        assert_eq!(native, 0xFFFF);

        let [r, g, b] = palette.rgb(OVERLAY_BLUE);
        let expected =
            ((r as u32 >> 3) << 11) | ((g as u32 >> 2) << 5) | (b as u32 >> 3);
        assert_eq!(palette.native(OVERLAY_BLUE), expected);
    }

    #[test]
    fn test_indexed_native_is_identity() {
        let palette = Palette::new(Depth::Indexed8);
        for i in 0..TOTAL_COLOURS as u8 {
            assert_eq!(palette.native(i), i as u32);
        }
    }

    #[test]
    fn test_dim_rebuild() {
        let mut palette = Palette::new(Depth::Rgba8888);
        let bright = palette.rgb(OVERLAY_WHITE);
        palette.rebuild(Depth::Rgba8888, true);
        let dimmed = palette.rgb(OVERLAY_WHITE);
        assert!(palette.is_dimmed());
        for (d, b) in dimmed.iter().zip(bright.iter()) {
            assert_eq!(*d, (*b as u32 * 2 / 3) as u8);
        }
        // Index tables stay identity for indexed hosts even when dimmed
        palette.rebuild(Depth::Indexed8, true);
        assert_eq!(palette.native(42), 42);
    }

    #[test]
    fn test_hardware_is_six_bit() {
        let palette = Palette::new(Depth::Indexed8);
        for i in 0..TOTAL_COLOURS as u8 {
            for c in palette.hardware(i) {
                assert!(c < 64);
            }
        }
        assert_eq!(palette.hardware(OVERLAY_WHITE), [63, 63, 63]);
    }
}
