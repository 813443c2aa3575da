/*
 *  vframebuf.rs
 *
 *  PixelDeck - every pixel counts
 *  (c) 2020-26 Stuart Hunter
 *
 *  Runtime-sized pixel buffers: RGB panel frames and 1-bit glyph masks
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

use core::convert::Infallible;
use embedded_graphics::geometry::{OriginDimensions, Size};
use embedded_graphics::pixelcolor::{BinaryColor, PixelColor, Rgb888, RgbColor};
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::Rectangle;

/// A runtime-sized framebuffer for embedded-graphics.
#[derive(Debug, Clone, PartialEq)]
pub struct VarFrameBuf<C: PixelColor> {
    buf: Vec<C>,
    w: usize,
    h: usize,
}

/// One full panel image, row-major RGB.
pub type Frame = VarFrameBuf<Rgb888>;

/// 1-bit sheet used for glyph masks.
pub type Mask = VarFrameBuf<BinaryColor>;

impl<C: PixelColor> VarFrameBuf<C> {
    pub fn new(width: u32, height: u32, fill: C) -> Self {
        let (w, h) = (width as usize, height as usize);
        Self { buf: vec![fill; w * h], w, h }
    }

    pub fn width(&self) -> usize { self.w }
    pub fn height(&self) -> usize { self.h }

    /// Number of pixels (always width * height)
    pub fn len(&self) -> usize { self.buf.len() }

    pub fn is_empty(&self) -> bool { self.buf.is_empty() }

    /// Mutable raw access
    pub fn as_mut_slice(&mut self) -> &mut [C] { &mut self.buf }

    /// Immutable raw access (row-major)
    pub fn as_slice(&self) -> &[C] { &self.buf }

    /// Clear to a color
    pub fn clear_color(&mut self, color: C) {
        self.buf.fill(color);
    }

    pub fn get(&self, x: u32, y: u32) -> Option<C> {
        self.idx(Point::new(x as i32, y as i32)).map(|i| self.buf[i])
    }

    pub fn set(&mut self, x: u32, y: u32, color: C) {
        if let Some(i) = self.idx(Point::new(x as i32, y as i32)) {
            self.buf[i] = color;
        }
    }

    /// True when every pixel equals `color`
    pub fn is_filled_with(&self, color: C) -> bool {
        self.buf.iter().all(|&c| c == color)
    }

    /// Count pixels that differ from `color`
    pub fn count_not(&self, color: C) -> usize {
        self.buf.iter().filter(|&&c| c != color).count()
    }

    /// Copy `src` onto self with its top-left at `at`; pixels falling
    /// outside self are dropped.
    pub fn blit(&mut self, src: &VarFrameBuf<C>, at: Point) {
        for sy in 0..src.h {
            let dy = at.y + sy as i32;
            if dy < 0 || dy as usize >= self.h {
                continue;
            }
            for sx in 0..src.w {
                let dx = at.x + sx as i32;
                if dx < 0 || dx as usize >= self.w {
                    continue;
                }
                self.buf[dy as usize * self.w + dx as usize] = src.buf[sy * src.w + sx];
            }
        }
    }

    /// Map (x,y) to linear index; returns None if out of bounds
    #[inline]
    fn idx(&self, p: Point) -> Option<usize> {
        if p.x >= 0 && p.y >= 0 {
            let (x, y) = (p.x as usize, p.y as usize);
            if x < self.w && y < self.h {
                return Some(y * self.w + x);
            }
        }
        None
    }
}

impl VarFrameBuf<Rgb888> {
    /// Packed RGB triplets, the wire layout most panels accept
    pub fn to_rgb_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.buf.len() * 3);
        for c in &self.buf {
            out.extend_from_slice(&[c.r(), c.g(), c.b()]);
        }
        out
    }
}

impl<C: PixelColor> OriginDimensions for VarFrameBuf<C> {
    fn size(&self) -> Size {
        Size::new(self.w as u32, self.h as u32)
    }
}

impl<C: PixelColor> DrawTarget for VarFrameBuf<C> {
    type Color = C;
    type Error = Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        for Pixel(p, c) in pixels {
            if let Some(i) = self.idx(p) {
                self.buf[i] = c;
            }
        }
        Ok(())
    }

    fn clear(&mut self, color: Self::Color) -> Result<(), Self::Error> {
        self.clear_color(color);
        Ok(())
    }

    fn fill_contiguous<I>(&mut self, area: &Rectangle, colors: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Self::Color>,
    {
        // per-pixel clipping, areas may hang off any edge when scrolling
        let Size { width, height } = area.size;
        if width == 0 || height == 0 { return Ok(()); }
        let mut it = colors.into_iter();
        for row in 0..height as i32 {
            for col in 0..width as i32 {
                let Some(c) = it.next() else { return Ok(()) };
                let p = Point::new(area.top_left.x + col, area.top_left.y + row);
                if let Some(i) = self.idx(p) {
                    self.buf[i] = c;
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embedded_graphics::primitives::{PrimitiveStyle, Rectangle};

    #[test]
    fn test_new_frame_is_uniform() {
        let f = Frame::new(8, 4, Rgb888::BLACK);
        assert_eq!(f.len(), 32);
        assert!(f.is_filled_with(Rgb888::BLACK));
    }

    #[test]
    fn test_fill_clips_negative_origin() {
        let mut f = Frame::new(4, 4, Rgb888::BLACK);
        Rectangle::new(Point::new(-2, -2), Size::new(4, 4))
            .into_styled(PrimitiveStyle::with_fill(Rgb888::RED))
            .draw(&mut f)
            .ok();
        assert_eq!(f.count_not(Rgb888::BLACK), 4);
        assert_eq!(f.get(1, 1), Some(Rgb888::RED));
        assert_eq!(f.get(2, 2), Some(Rgb888::BLACK));
    }

    #[test]
    fn test_blit_offsets() {
        let mut dst = Frame::new(4, 2, Rgb888::BLACK);
        let src = Frame::new(2, 2, Rgb888::GREEN);
        dst.blit(&src, Point::new(3, 0));
        assert_eq!(dst.count_not(Rgb888::BLACK), 2);
        assert_eq!(dst.get(3, 1), Some(Rgb888::GREEN));
    }

    #[test]
    fn test_rgb_bytes_layout() {
        let mut f = Frame::new(2, 1, Rgb888::BLACK);
        f.set(1, 0, Rgb888::new(1, 2, 3));
        assert_eq!(f.to_rgb_bytes(), vec![0, 0, 0, 1, 2, 3]);
    }
}
