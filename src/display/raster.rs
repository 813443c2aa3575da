/*
 *  display/raster.rs
 *
 *  PixelDeck - every pixel counts
 *  (c) 2020-26 Stuart Hunter
 *
 *  Text rasterizer - sprite font strings into RGB line buffers and
 *  panel sized windows over them
 *
 *  This program is free software: you can redistribute it and/or modify
 *  it under the terms of the GNU General Public License as published by
 *  the Free Software Foundation, either version 3 of the License, or
 *  (at your option) any later version.
 *
 *  This program is distributed in the hope that it will be useful,
 *  but WITHOUT ANY WARRANTY; without even the implied warranty of
 *  MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 *  GNU General Public License for more details.
 *
 *  See <http://www.gnu.org/licenses/> to get a copy of the GNU General
 *  Public License.
 *
 */

use embedded_graphics::pixelcolor::Rgb888;
use embedded_graphics::prelude::Point;

use crate::display::font::SpriteFont;
use crate::display::traits::PanelGeometry;
use crate::vframebuf::Frame;

/// A string rendered at the font's cell height, not clipped to the panel
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedLine {
    pub frame: Frame,
    pub content_width: u32,
    /// Panel width the line was laid out for
    pub max_width: u32,
}

impl RenderedLine {
    /// Wider than the panel, so it needs scrolling to be read
    pub fn overflows(&self) -> bool {
        self.content_width > self.max_width
    }
}

/// Lay out `text` cell by cell with the font's spacing between glyphs.
/// Unknown characters take the fallback glyph; a missing fallback leaves
/// a blank cell.
pub fn render_line(
    text: &str,
    font: &SpriteFont,
    fg: Rgb888,
    bg: Rgb888,
    max_width: u32,
) -> RenderedLine {
    let cell_w = font.cell_width();
    let cell_h = font.cell_height();
    let spacing = font.spacing();
    let count = text.chars().count() as u32;
    let content_width = if count == 0 {
        0
    } else {
        count * cell_w + (count - 1) * spacing
    };

    let mut frame = Frame::new(content_width, cell_h, bg);
    for (i, ch) in text.chars().enumerate() {
        let Some(cell) = font.cell_or_fallback(ch) else { continue };
        let x0 = i as u32 * (cell_w + spacing);
        for y in 0..cell_h {
            for x in 0..cell_w {
                if cell.is_lit(x, y) {
                    frame.set(x0 + x, y, fg);
                }
            }
        }
    }

    RenderedLine { frame, content_width, max_width }
}

/// Place a line onto a panel sized frame, top aligned.
///
/// Lines that fit are centred and `offset` is ignored. Wider lines are
/// shifted left by `offset` and repeated after a `gap` so the loop reads
/// continuously.
pub fn window(line: &RenderedLine, geometry: PanelGeometry, offset: u32, gap: u32, bg: Rgb888) -> Frame {
    let mut out = geometry.blank(bg);
    if line.content_width == 0 {
        return out;
    }
    if line.content_width <= geometry.width {
        let x = (geometry.width - line.content_width) / 2;
        out.blit(&line.frame, Point::new(x as i32, 0));
        return out;
    }
    let period = line.content_width + gap;
    let start = -((offset % period) as i32);
    out.blit(&line.frame, Point::new(start, 0));
    out.blit(&line.frame, Point::new(start + period as i32, 0));
    out
}
