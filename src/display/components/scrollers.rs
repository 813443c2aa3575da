/*
 *  display/components/scrollers.rs
 *
 *  PixelDeck - every pixel counts
 *  (c) 2020-26 Stuart Hunter
 *
 *  Horizontal scroll state and a scrolling text line bound to one font
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
use std::sync::Arc;

use crate::display::font::SpriteFont;
use crate::display::raster::{render_line, window};
use crate::display::traits::PanelGeometry;
use crate::vframebuf::Frame;

/// Fixed gap between the tail and the repeated head of looping text
pub const GAP_BETWEEN_LOOP_TEXT_FIXED: u32 = 12;

/// Pixels the text moves per tick
pub const SCROLL_STEP: u32 = 1;

/// Scroll offset for one line of text; belongs to exactly one job
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScrollState {
    offset: u32,
    step: u32,
    gap: u32,
}

impl ScrollState {
    pub fn new(step: u32, gap: u32) -> Self {
        Self { offset: 0, step: step.max(1), gap }
    }

    pub fn offset(&self) -> u32 { self.offset }
    pub fn gap(&self) -> u32 { self.gap }

    pub fn reset(&mut self) {
        self.offset = 0;
    }

    /// Move one step; content that fits never scrolls
    pub fn advance(&mut self, content_width: u32, panel_width: u32) {
        if content_width <= panel_width {
            self.offset = 0;
            return;
        }
        self.offset = (self.offset + self.step) % (content_width + self.gap);
    }
}

impl Default for ScrollState {
    fn default() -> Self {
        Self::new(SCROLL_STEP, GAP_BETWEEN_LOOP_TEXT_FIXED)
    }
}

/// A line of text that is re-rendered each tick and scrolls when it
/// does not fit the panel
#[derive(Debug, Clone)]
pub struct ScrollingLine {
    font: Arc<SpriteFont>,
    scroll: ScrollState,
    last_width: u32,
}

impl ScrollingLine {
    pub fn new(font: Arc<SpriteFont>, scroll: ScrollState) -> Self {
        Self { font, scroll, last_width: 0 }
    }

    pub fn offset(&self) -> u32 {
        self.scroll.offset()
    }

    /// Render the current window then step the scroll offset
    pub fn frame(&mut self, text: &str, fg: Rgb888, bg: Rgb888, geometry: PanelGeometry) -> Frame {
        let line = render_line(text, &self.font, fg, bg, geometry.width);
        // a new width means new content, restart from the left edge
        if line.content_width != self.last_width {
            self.scroll.reset();
            self.last_width = line.content_width;
        }
        let out = window(&line, geometry, self.scroll.offset(), self.scroll.gap(), bg);
        self.scroll.advance(line.content_width, geometry.width);
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::display::font::FontTable;
    use embedded_graphics::pixelcolor::RgbColor;

    #[test]
    fn test_fitting_content_never_scrolls() {
        let mut s = ScrollState::new(1, 4);
        s.advance(10, 64);
        s.advance(10, 64);
        assert_eq!(s.offset(), 0);
    }

    #[test]
    fn test_offset_wraps_after_content_and_gap() {
        let mut s = ScrollState::new(3, 2);
        // period 10 for content 8
        for _ in 0..4 {
            s.advance(8, 4);
        }
        assert_eq!(s.offset(), 2);
    }

    #[test]
    fn test_zero_step_clamped() {
        let mut s = ScrollState::new(0, 0);
        s.advance(8, 4);
        assert_eq!(s.offset(), 1);
    }

    #[test]
    fn test_scrolling_line_advances_per_frame() {
        let font = FontTable::new().resolve(None);
        let g = PanelGeometry::new(16, 10).unwrap();
        let mut line = ScrollingLine::new(font, ScrollState::new(2, 4));
        let a = line.frame("HELLO WORLD", Rgb888::WHITE, Rgb888::BLACK, g);
        assert_eq!(line.offset(), 2);
        let b = line.frame("HELLO WORLD", Rgb888::WHITE, Rgb888::BLACK, g);
        assert_eq!(a.len(), b.len());
        assert_ne!(a, b);
    }

    #[test]
    fn test_width_change_resets_offset() {
        let font = FontTable::new().resolve(None);
        let g = PanelGeometry::new(16, 10).unwrap();
        let mut line = ScrollingLine::new(font, ScrollState::new(2, 4));
        line.frame("HELLO WORLD", Rgb888::WHITE, Rgb888::BLACK, g);
        line.frame("HELLO WORLD", Rgb888::WHITE, Rgb888::BLACK, g);
        assert_eq!(line.offset(), 4);
        line.frame("GOODBYE WORLD", Rgb888::WHITE, Rgb888::BLACK, g);
        assert_eq!(line.offset(), 2);
    }
}
