// Bitmap fonts for text rendering
//
// A font is a table of 8-row glyph bitmaps covering a contiguous character
// range. Glyph widths are either fixed or derived from the bitmap itself
// (proportional): the width is the right-most used column plus one.
// Characters outside the covered range, and any index past the end of an
// undersized table, fall back to a single fixed glyph instead of failing.

/// Glyph height in pixel rows (all fonts)
pub const CHAR_HEIGHT: usize = 8;

/// Horizontal gap inserted after every glyph
pub const CHAR_SPACING: usize = 1;

/// Extra vertical gap between text lines
pub const LINE_SPACING: usize = 2;

/// Advance width used for glyphs with no set pixels (space)
const BLANK_WIDTH: u8 = 4;

/// A single glyph: row bitmaps (MSB = left-most pixel) plus advance width
#[derive(Debug, Clone, Copy)]
pub struct Glyph {
    pub rows: [u8; CHAR_HEIGHT],
    pub width: u8,
}

/// Bitmap font covering a contiguous character range
#[derive(Debug)]
pub struct Font {
    first: u8,
    glyphs: Vec<Glyph>,
    fallback: Glyph,
}

impl Font {
    /// Build a proportional font from raw row data
    ///
    /// `first` is the first character covered; widths are derived per glyph
    /// by scanning for the right-most used column.
    pub fn proportional(first: u8, rows: &[[u8; CHAR_HEIGHT]]) -> Self {
        let glyphs = rows
            .iter()
            .map(|r| Glyph {
                rows: *r,
                width: derive_width(r),
            })
            .collect();

        Self {
            first,
            glyphs,
            fallback: FALLBACK_GLYPH,
        }
    }

    /// Build a fixed-width font from raw row data
    pub fn fixed(first: u8, rows: &[[u8; CHAR_HEIGHT]], width: u8) -> Self {
        let width = width.clamp(1, 8);
        let glyphs = rows.iter().map(|r| Glyph { rows: *r, width }).collect();

        Self {
            first,
            glyphs,
            fallback: Glyph {
                rows: FALLBACK_GLYPH.rows,
                width,
            },
        }
    }

    /// Look up the glyph for a character
    ///
    /// Out-of-range characters (and characters past the end of an undersized
    /// table) return the fallback glyph.
    pub fn glyph(&self, ch: char) -> &Glyph {
        let code = ch as u32;
        if code < self.first as u32 {
            return &self.fallback;
        }
        self.glyphs
            .get((code - self.first as u32) as usize)
            .unwrap_or(&self.fallback)
    }

    /// Pixel width of a string, not counting trailing character spacing
    ///
    /// Colour escapes (BEL + code) take no space; for multi-line strings the
    /// widest line wins.
    pub fn string_width(&self, s: &str) -> usize {
        let mut widest = 0usize;
        let mut line = 0usize;
        let mut chars = s.chars();

        while let Some(ch) = chars.next() {
            match ch {
                '\n' => {
                    widest = widest.max(line.saturating_sub(CHAR_SPACING));
                    line = 0;
                }
                '\x07' => {
                    // Escape code consumes the next character
                    chars.next();
                }
                _ => line += self.glyph(ch).width as usize + CHAR_SPACING,
            }
        }

        widest.max(line.saturating_sub(CHAR_SPACING))
    }
}

impl Default for Font {
    fn default() -> Self {
        Font::proportional(0x20, &DEFAULT_GLYPHS)
    }
}

/// Derive a proportional width from glyph rows
fn derive_width(rows: &[u8; CHAR_HEIGHT]) -> u8 {
    let used = rows.iter().fold(0u8, |acc, r| acc | r);
    if used == 0 {
        BLANK_WIDTH
    } else {
        8 - used.trailing_zeros() as u8
    }
}

/// Glyph substituted for anything the font cannot represent
const FALLBACK_GLYPH: Glyph = Glyph {
    rows: [0xF8, 0x88, 0x88, 0x88, 0x88, 0x88, 0xF8, 0x00],
    width: 5,
};

/// Built-in 8x8 proportional font, ASCII 0x20-0x7F
///
/// Rows run top to bottom, MSB is the left-most pixel. Most glyphs use a
/// 5-wide cell; the derived proportional widths trim narrow punctuation.
const DEFAULT_GLYPHS: [[u8; CHAR_HEIGHT]; 96] = [
    [0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00], // space
    [0x20, 0x20, 0x20, 0x20, 0x20, 0x00, 0x20, 0x00], // !
    [0x50, 0x50, 0x50, 0x00, 0x00, 0x00, 0x00, 0x00], // "
    [0x50, 0x50, 0xF8, 0x50, 0xF8, 0x50, 0x50, 0x00], // #
    [0x20, 0x78, 0xA0, 0x70, 0x28, 0xF0, 0x20, 0x00], // $
    [0xC0, 0xC8, 0x10, 0x20, 0x40, 0x98, 0x18, 0x00], // %
    [0x40, 0xA0, 0xA0, 0x40, 0xA8, 0x90, 0x68, 0x00], // &
    [0x20, 0x20, 0x40, 0x00, 0x00, 0x00, 0x00, 0x00], // '
    [0x10, 0x20, 0x40, 0x40, 0x40, 0x20, 0x10, 0x00], // (
    [0x40, 0x20, 0x10, 0x10, 0x10, 0x20, 0x40, 0x00], // )
    [0x00, 0x20, 0xA8, 0x70, 0xA8, 0x20, 0x00, 0x00], // *
    [0x00, 0x20, 0x20, 0xF8, 0x20, 0x20, 0x00, 0x00], // +
    [0x00, 0x00, 0x00, 0x00, 0x00, 0x20, 0x20, 0x40], // ,
    [0x00, 0x00, 0x00, 0xF8, 0x00, 0x00, 0x00, 0x00], // -
    [0x00, 0x00, 0x00, 0x00, 0x00, 0x60, 0x60, 0x00], // .
    [0x08, 0x08, 0x10, 0x20, 0x40, 0x80, 0x80, 0x00], // /
    [0x70, 0x88, 0x98, 0xA8, 0xC8, 0x88, 0x70, 0x00], // 0
    [0x20, 0x60, 0x20, 0x20, 0x20, 0x20, 0x70, 0x00], // 1
    [0x70, 0x88, 0x08, 0x30, 0x40, 0x80, 0xF8, 0x00], // 2
    [0x70, 0x88, 0x08, 0x30, 0x08, 0x88, 0x70, 0x00], // 3
    [0x10, 0x30, 0x50, 0x90, 0xF8, 0x10, 0x10, 0x00], // 4
    [0xF8, 0x80, 0xF0, 0x08, 0x08, 0x88, 0x70, 0x00], // 5
    [0x30, 0x40, 0x80, 0xF0, 0x88, 0x88, 0x70, 0x00], // 6
    [0xF8, 0x08, 0x10, 0x20, 0x40, 0x40, 0x40, 0x00], // 7
    [0x70, 0x88, 0x88, 0x70, 0x88, 0x88, 0x70, 0x00], // 8
    [0x70, 0x88, 0x88, 0x78, 0x08, 0x10, 0x60, 0x00], // 9
    [0x00, 0x60, 0x60, 0x00, 0x60, 0x60, 0x00, 0x00], // :
    [0x00, 0x60, 0x60, 0x00, 0x60, 0x20, 0x40, 0x00], // ;
    [0x10, 0x20, 0x40, 0x80, 0x40, 0x20, 0x10, 0x00], // <
    [0x00, 0x00, 0xF8, 0x00, 0xF8, 0x00, 0x00, 0x00], // =
    [0x80, 0x40, 0x20, 0x10, 0x20, 0x40, 0x80, 0x00], // >
    [0x70, 0x88, 0x08, 0x10, 0x20, 0x00, 0x20, 0x00], // ?
    [0x70, 0x88, 0xB8, 0xA8, 0xB8, 0x80, 0x70, 0x00], // @
    [0x20, 0x50, 0x88, 0x88, 0xF8, 0x88, 0x88, 0x00], // A
    [0xF0, 0x88, 0x88, 0xF0, 0x88, 0x88, 0xF0, 0x00], // B
    [0x70, 0x88, 0x80, 0x80, 0x80, 0x88, 0x70, 0x00], // C
    [0xE0, 0x90, 0x88, 0x88, 0x88, 0x90, 0xE0, 0x00], // D
    [0xF8, 0x80, 0x80, 0xF0, 0x80, 0x80, 0xF8, 0x00], // E
    [0xF8, 0x80, 0x80, 0xF0, 0x80, 0x80, 0x80, 0x00], // F
    [0x70, 0x88, 0x80, 0xB8, 0x88, 0x88, 0x78, 0x00], // G
    [0x88, 0x88, 0x88, 0xF8, 0x88, 0x88, 0x88, 0x00], // H
    [0x70, 0x20, 0x20, 0x20, 0x20, 0x20, 0x70, 0x00], // I
    [0x38, 0x10, 0x10, 0x10, 0x10, 0x90, 0x60, 0x00], // J
    [0x88, 0x90, 0xA0, 0xC0, 0xA0, 0x90, 0x88, 0x00], // K
    [0x80, 0x80, 0x80, 0x80, 0x80, 0x80, 0xF8, 0x00], // L
    [0x88, 0xD8, 0xA8, 0xA8, 0x88, 0x88, 0x88, 0x00], // M
    [0x88, 0xC8, 0xA8, 0x98, 0x88, 0x88, 0x88, 0x00], // N
    [0x70, 0x88, 0x88, 0x88, 0x88, 0x88, 0x70, 0x00], // O
    [0xF0, 0x88, 0x88, 0xF0, 0x80, 0x80, 0x80, 0x00], // P
    [0x70, 0x88, 0x88, 0x88, 0xA8, 0x90, 0x68, 0x00], // Q
    [0xF0, 0x88, 0x88, 0xF0, 0xA0, 0x90, 0x88, 0x00], // R
    [0x78, 0x80, 0x80, 0x70, 0x08, 0x08, 0xF0, 0x00], // S
    [0xF8, 0x20, 0x20, 0x20, 0x20, 0x20, 0x20, 0x00], // T
    [0x88, 0x88, 0x88, 0x88, 0x88, 0x88, 0x70, 0x00], // U
    [0x88, 0x88, 0x88, 0x88, 0x88, 0x50, 0x20, 0x00], // V
    [0x88, 0x88, 0x88, 0xA8, 0xA8, 0xA8, 0x50, 0x00], // W
    [0x88, 0x88, 0x50, 0x20, 0x50, 0x88, 0x88, 0x00], // X
    [0x88, 0x88, 0x88, 0x50, 0x20, 0x20, 0x20, 0x00], // Y
    [0xF8, 0x08, 0x10, 0x20, 0x40, 0x80, 0xF8, 0x00], // Z
    [0x70, 0x40, 0x40, 0x40, 0x40, 0x40, 0x70, 0x00], // [
    [0x80, 0x80, 0x40, 0x20, 0x10, 0x08, 0x08, 0x00], // backslash
    [0x70, 0x10, 0x10, 0x10, 0x10, 0x10, 0x70, 0x00], // ]
    [0x20, 0x50, 0x88, 0x00, 0x00, 0x00, 0x00, 0x00], // ^
    [0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0xF8], // _
    [0x40, 0x20, 0x10, 0x00, 0x00, 0x00, 0x00, 0x00], // `
    [0x00, 0x00, 0x70, 0x08, 0x78, 0x88, 0x78, 0x00], // a
    [0x80, 0x80, 0xF0, 0x88, 0x88, 0x88, 0xF0, 0x00], // b
    [0x00, 0x00, 0x70, 0x80, 0x80, 0x88, 0x70, 0x00], // c
    [0x08, 0x08, 0x78, 0x88, 0x88, 0x88, 0x78, 0x00], // d
    [0x00, 0x00, 0x70, 0x88, 0xF8, 0x80, 0x70, 0x00], // e
    [0x30, 0x48, 0x40, 0xE0, 0x40, 0x40, 0x40, 0x00], // f
    [0x00, 0x00, 0x78, 0x88, 0x88, 0x78, 0x08, 0x70], // g
    [0x80, 0x80, 0xF0, 0x88, 0x88, 0x88, 0x88, 0x00], // h
    [0x20, 0x00, 0x60, 0x20, 0x20, 0x20, 0x70, 0x00], // i
    [0x10, 0x00, 0x30, 0x10, 0x10, 0x10, 0x90, 0x60], // j
    [0x80, 0x80, 0x90, 0xA0, 0xC0, 0xA0, 0x90, 0x00], // k
    [0x60, 0x20, 0x20, 0x20, 0x20, 0x20, 0x70, 0x00], // l
    [0x00, 0x00, 0xD0, 0xA8, 0xA8, 0xA8, 0xA8, 0x00], // m
    [0x00, 0x00, 0xF0, 0x88, 0x88, 0x88, 0x88, 0x00], // n
    [0x00, 0x00, 0x70, 0x88, 0x88, 0x88, 0x70, 0x00], // o
    [0x00, 0x00, 0xF0, 0x88, 0x88, 0xF0, 0x80, 0x80], // p
    [0x00, 0x00, 0x78, 0x88, 0x88, 0x78, 0x08, 0x08], // q
    [0x00, 0x00, 0xB0, 0xC8, 0x80, 0x80, 0x80, 0x00], // r
    [0x00, 0x00, 0x78, 0x80, 0x70, 0x08, 0xF0, 0x00], // s
    [0x40, 0x40, 0xE0, 0x40, 0x40, 0x48, 0x30, 0x00], // t
    [0x00, 0x00, 0x88, 0x88, 0x88, 0x98, 0x68, 0x00], // u
    [0x00, 0x00, 0x88, 0x88, 0x88, 0x50, 0x20, 0x00], // v
    [0x00, 0x00, 0x88, 0x88, 0xA8, 0xA8, 0x50, 0x00], // w
    [0x00, 0x00, 0x88, 0x50, 0x20, 0x50, 0x88, 0x00], // x
    [0x00, 0x00, 0x88, 0x88, 0x88, 0x78, 0x08, 0x70], // y
    [0x00, 0x00, 0xF8, 0x10, 0x20, 0x40, 0xF8, 0x00], // z
    [0x18, 0x20, 0x20, 0x40, 0x20, 0x20, 0x18, 0x00], // {
    [0x20, 0x20, 0x20, 0x20, 0x20, 0x20, 0x20, 0x00], // |
    [0xC0, 0x20, 0x20, 0x10, 0x20, 0x20, 0xC0, 0x00], // }
    [0x00, 0x00, 0x40, 0xA8, 0x10, 0x00, 0x00, 0x00], // ~
    [0xA8, 0x50, 0xA8, 0x50, 0xA8, 0x50, 0xA8, 0x00], // DEL (checker)
];
