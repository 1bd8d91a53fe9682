//! Status caption rendering

use font8x8::{BASIC_FONTS, UnicodeFonts};

/// Left edge and baseline of the caption, in frame pixels
pub const CAPTION_ORIGIN: (usize, usize) = (7, 70);

/// Caption colour (`0RGB`)
pub const CAPTION_COLOR: u32 = 0x0000_ff64;

/// Each font pixel becomes a `SCALE`×`SCALE` block
const SCALE: usize = 3;
const GLYPH: usize = 8;

/// Draw `text` onto a `0RGB` buffer at [`CAPTION_ORIGIN`]
///
/// Pixels falling outside the buffer are clipped. Characters without a
/// glyph advance the cursor without drawing.
pub fn draw_caption(buffer: &mut [u32], width: usize, height: usize, text: &str) {
    let (left, baseline) = CAPTION_ORIGIN;
    let top = baseline.saturating_sub(GLYPH * SCALE);

    for (index, ch) in text.chars().enumerate() {
        let Some(glyph) = BASIC_FONTS.get(ch) else {
            continue;
        };
        let x0 = left + index * GLYPH * SCALE;

        for (row, bits) in glyph.iter().enumerate() {
            for col in 0..GLYPH {
                if bits & (1 << col) == 0 {
                    continue;
                }
                fill_block(buffer, width, height, x0 + col * SCALE, top + row * SCALE);
            }
        }
    }
}

fn fill_block(buffer: &mut [u32], width: usize, height: usize, x: usize, y: usize) {
    for dy in 0..SCALE {
        let py = y + dy;
        if py >= height {
            return;
        }
        for dx in 0..SCALE {
            let px = x + dx;
            if px < width {
                buffer[py * width + px] = CAPTION_COLOR;
            }
        }
    }
}
