// Depth packers - convert palette indices to host-native pixel bytes
//
// A Packer is the per-depth strategy the compositor selects once when the
// output surface is configured. Each strategy consumes 8 source indices per
// iteration and emits packed destination bytes; high-density lines map 8
// source pixels to 8 destination pixels, low-density lines to 16 (each value
// replicated into two adjacent output pixels).

use crate::palette::Palette;

/// Source pixels consumed per packing iteration
pub const PIXELS_PER_CHUNK: usize = 8;

/// Host surface pixel format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Depth {
    /// 8-bit palette-indexed surface; indices pass through unchanged
    Indexed8,
    /// 16-bit RGB565, host byte order
    Rgb565,
    /// 24-bit packed RGB, 3 bytes per pixel
    Rgb888,
    /// 32-bit RGBA with opaque alpha (pixels-crate layout)
    Rgba8888,
}

impl Depth {
    pub fn bits(&self) -> u32 {
        match self {
            Depth::Indexed8 => 8,
            Depth::Rgb565 => 16,
            Depth::Rgb888 => 24,
            Depth::Rgba8888 => 32,
        }
    }

    pub fn bytes_per_pixel(&self) -> usize {
        match self {
            Depth::Indexed8 => 1,
            Depth::Rgb565 => 2,
            Depth::Rgb888 => 3,
            Depth::Rgba8888 => 4,
        }
    }

    /// Map a bit count to a depth
    pub fn from_bits(bits: u32) -> Option<Self> {
        match bits {
            8 => Some(Depth::Indexed8),
            16 => Some(Depth::Rgb565),
            24 => Some(Depth::Rgb888),
            32 => Some(Depth::Rgba8888),
            _ => None,
        }
    }
}

/// Per-depth packing strategy, selected once at surface configuration
#[derive(Debug, Clone, Copy)]
pub struct Packer {
    depth: Depth,
    big_endian_words: bool,
}

impl Packer {
    /// Select the strategy for a depth, using the host byte order for the
    /// 24-bit word-assembly path
    pub fn for_depth(depth: Depth) -> Self {
        Self {
            depth,
            big_endian_words: cfg!(target_endian = "big"),
        }
    }

    pub fn depth(&self) -> Depth {
        self.depth
    }

    pub fn bytes_per_pixel(&self) -> usize {
        self.depth.bytes_per_pixel()
    }

    /// Pack one scan line of palette indices into destination bytes
    ///
    /// `src` holds the stored indices for the line; `dst` must hold
    /// `src.len()` output pixels for a high-density line or `2 * src.len()`
    /// for a low-density one. A trailing partial chunk is packed per pixel.
    pub fn pack_line(&self, src: &[u8], high_density: bool, palette: &Palette, dst: &mut [u8]) {
        let out_pixels = if high_density { src.len() } else { src.len() * 2 };
        debug_assert!(dst.len() >= out_pixels * self.bytes_per_pixel());

        match self.depth {
            Depth::Indexed8 => {
                if high_density {
                    dst[..src.len()].copy_from_slice(src);
                } else {
                    for (i, &index) in src.iter().enumerate() {
                        dst[i * 2] = index;
                        dst[i * 2 + 1] = index;
                    }
                }
            }

            Depth::Rgb565 => {
                if high_density {
                    for (i, &index) in src.iter().enumerate() {
                        let v = (palette.native(index) as u16).to_ne_bytes();
                        dst[i * 2..i * 2 + 2].copy_from_slice(&v);
                    }
                } else {
                    for (i, &index) in src.iter().enumerate() {
                        let v = (palette.native(index) as u16).to_ne_bytes();
                        dst[i * 4..i * 4 + 2].copy_from_slice(&v);
                        dst[i * 4 + 2..i * 4 + 4].copy_from_slice(&v);
                    }
                }
            }

            Depth::Rgb888 => {
                let hi_bytes = PIXELS_PER_CHUNK * 3;
                let main = src.len() - src.len() % PIXELS_PER_CHUNK;
                if high_density {
                    for (chunk, out) in src[..main]
                        .chunks_exact(PIXELS_PER_CHUNK)
                        .zip(dst.chunks_exact_mut(hi_bytes))
                    {
                        let px = gather(chunk, palette);
                        self.pack24(&px, out);
                    }
                    for (i, &index) in src[main..].iter().enumerate() {
                        let at = (main + i) * 3;
                        dst[at..at + 3].copy_from_slice(&rgb24(palette.native(index)));
                    }
                } else {
                    for (chunk, out) in src[..main]
                        .chunks_exact(PIXELS_PER_CHUNK)
                        .zip(dst.chunks_exact_mut(hi_bytes * 2))
                    {
                        let px = gather(chunk, palette);
                        self.pack24(&doubled(&px, 0), &mut out[..hi_bytes]);
                        self.pack24(&doubled(&px, 4), &mut out[hi_bytes..]);
                    }
                    for (i, &index) in src[main..].iter().enumerate() {
                        let v = rgb24(palette.native(index));
                        let at = (main + i) * 6;
                        dst[at..at + 3].copy_from_slice(&v);
                        dst[at + 3..at + 6].copy_from_slice(&v);
                    }
                }
            }

            Depth::Rgba8888 => {
                if high_density {
                    for (i, &index) in src.iter().enumerate() {
                        dst[i * 4..i * 4 + 4].copy_from_slice(&rgba(palette.native(index)));
                    }
                } else {
                    for (i, &index) in src.iter().enumerate() {
                        let v = rgba(palette.native(index));
                        dst[i * 8..i * 8 + 4].copy_from_slice(&v);
                        dst[i * 8 + 4..i * 8 + 8].copy_from_slice(&v);
                    }
                }
            }
        }
    }

    /// 24-bit chunk packer: 8 pixels into 6 destination words
    ///
    /// Both assembly paths emit the identical RGB byte stream; the choice
    /// only affects how the words are built for the host's byte order.
    fn pack24(&self, px: &[u32; PIXELS_PER_CHUNK], dst: &mut [u8]) {
        if self.big_endian_words {
            pack24_be(px, dst);
        } else {
            pack24_le(px, dst);
        }
    }
}

/// Look up 8 indices in the palette
#[inline]
fn gather(chunk: &[u8], palette: &Palette) -> [u32; PIXELS_PER_CHUNK] {
    let mut px = [0u32; PIXELS_PER_CHUNK];
    for (p, &index) in px.iter_mut().zip(chunk.iter()) {
        *p = palette.native(index);
    }
    px
}

/// Replicate 4 pixels starting at `base` into an 8-pixel chunk
#[inline]
fn doubled(px: &[u32; PIXELS_PER_CHUNK], base: usize) -> [u32; PIXELS_PER_CHUNK] {
    [
        px[base],
        px[base],
        px[base + 1],
        px[base + 1],
        px[base + 2],
        px[base + 2],
        px[base + 3],
        px[base + 3],
    ]
}

/// RGB bytes for a 0xRRGGBB native value
#[inline]
fn rgb24(v: u32) -> [u8; 3] {
    [(v >> 16) as u8, (v >> 8) as u8, v as u8]
}

/// RGBA bytes for a 0xRRGGBB native value
#[inline]
fn rgba(v: u32) -> [u8; 4] {
    [(v >> 16) as u8, (v >> 8) as u8, v as u8, 0xFF]
}

/// Little-endian word assembly for the 24-bit RGB byte stream
fn pack24_le(px: &[u32; PIXELS_PER_CHUNK], dst: &mut [u8]) {
    let r = |i: usize| (px[i] >> 16) & 0xFF;
    let g = |i: usize| (px[i] >> 8) & 0xFF;
    let b = |i: usize| px[i] & 0xFF;

    let words = [
        r(0) | g(0) << 8 | b(0) << 16 | r(1) << 24,
        g(1) | b(1) << 8 | r(2) << 16 | g(2) << 24,
        b(2) | r(3) << 8 | g(3) << 16 | b(3) << 24,
        r(4) | g(4) << 8 | b(4) << 16 | r(5) << 24,
        g(5) | b(5) << 8 | r(6) << 16 | g(6) << 24,
        b(6) | r(7) << 8 | g(7) << 16 | b(7) << 24,
    ];

    for (i, w) in words.iter().enumerate() {
        dst[i * 4..i * 4 + 4].copy_from_slice(&w.to_le_bytes());
    }
}

/// Big-endian word assembly, mirror of [`pack24_le`]
fn pack24_be(px: &[u32; PIXELS_PER_CHUNK], dst: &mut [u8]) {
    let r = |i: usize| (px[i] >> 16) & 0xFF;
    let g = |i: usize| (px[i] >> 8) & 0xFF;
    let b = |i: usize| px[i] & 0xFF;

    let words = [
        r(0) << 24 | g(0) << 16 | b(0) << 8 | r(1),
        g(1) << 24 | b(1) << 16 | r(2) << 8 | g(2),
        b(2) << 24 | r(3) << 16 | g(3) << 8 | b(3),
        r(4) << 24 | g(4) << 16 | b(4) << 8 | r(5),
        g(5) << 24 | b(5) << 16 | r(6) << 8 | g(6),
        b(6) << 24 | r(7) << 16 | g(7) << 8 | b(7),
    ];

    for (i, w) in words.iter().enumerate() {
        dst[i * 4..i * 4 + 4].copy_from_slice(&w.to_be_bytes());
    }
}
