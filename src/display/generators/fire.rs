/*
 *  display/generators/fire.rs
 *
 *  PixelDeck - every pixel counts
 *  (c) 2020-26 Stuart Hunter
 *
 *  Heat diffusion fire - random heat at the base, averaged upward
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
use rand::{Rng, rngs::StdRng};

use super::AnimationParams;
use crate::display::color::BACKGROUND;
use crate::display::traits::PanelGeometry;
use crate::vframebuf::Frame;

/// Heat below this is not drawn
const EMBER: u8 = 16;

/// Fixed ember palette, dark red through orange to yellow-white
pub fn heat_color(heat: u8) -> Rgb888 {
    let h = heat as u32;
    match heat {
        0..EMBER => BACKGROUND,
        EMBER..=84 => Rgb888::new((h * 3) as u8, 0, 0),
        85..=169 => Rgb888::new(255, ((h - 85) * 2) as u8, 0),
        _ => Rgb888::new(255, (170 + (h - 170)).min(255) as u8, ((h - 170) * 3) as u8),
    }
}

#[derive(Debug, Clone)]
pub struct FireState {
    heat: Vec<u8>,
    w: usize,
    h: usize,
    rng: StdRng,
}

impl FireState {
    pub fn new(geometry: PanelGeometry, rng: StdRng) -> Self {
        let (w, h) = (geometry.width as usize, geometry.height as usize);
        Self { heat: vec![0; w * h], w, h, rng }
    }

    pub fn heat_at(&self, x: usize, y: usize) -> u8 {
        if x < self.w && y < self.h { self.heat[y * self.w + x] } else { 0 }
    }

    pub fn total_heat(&self) -> u64 {
        self.heat.iter().map(|&v| v as u64).sum()
    }

    pub fn render(&self, geometry: PanelGeometry) -> Frame {
        let mut frame = geometry.blank(BACKGROUND);
        for y in 0..geometry.height {
            for x in 0..geometry.width {
                frame.set(x, y, heat_color(self.heat_at(x as usize, y as usize)));
            }
        }
        frame
    }

    pub fn advance(&mut self, params: &AnimationParams) {
        if self.w == 0 || self.h == 0 {
            return;
        }
        let bottom = (self.h - 1) * self.w;
        for x in 0..self.w {
            self.heat[bottom + x] = if params.injection == 0 {
                0
            } else {
                self.rng.random_range(0..=params.injection)
            };
        }

        // rows above the base take the mean of themselves and the three
        // cells below, then lose `cooling`
        let mut next = self.heat.clone();
        for y in 0..self.h - 1 {
            for x in 0..self.w {
                let mut sum = self.heat[y * self.w + x] as u32;
                let mut n = 1;
                for dx in [-1i32, 0, 1] {
                    let nx = x as i32 + dx;
                    if nx >= 0 && (nx as usize) < self.w {
                        sum += self.heat[(y + 1) * self.w + nx as usize] as u32;
                        n += 1;
                    }
                }
                next[y * self.w + x] = ((sum / n) as u8).saturating_sub(params.cooling);
            }
        }
        self.heat = next;
    }

    pub fn step(&mut self, geometry: PanelGeometry, params: &AnimationParams) -> Frame {
        let frame = self.render(geometry);
        self.advance(params);
        frame
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    #[test]
    fn test_cold_fire_stays_dark() {
        let g = PanelGeometry::new(16, 8).unwrap();
        let p = AnimationParams { injection: 0, ..Default::default() };
        let mut s = FireState::new(g, StdRng::seed_from_u64(9));
        for _ in 0..5 {
            assert!(s.step(g, &p).is_filled_with(BACKGROUND));
        }
        assert_eq!(s.total_heat(), 0);
    }

    #[test]
    fn test_heat_rises_from_base() {
        let g = PanelGeometry::new(8, 8).unwrap();
        let p = AnimationParams { injection: 255, cooling: 0, ..Default::default() };
        let mut s = FireState::new(g, StdRng::seed_from_u64(9));
        for _ in 0..20 {
            s.advance(&p);
        }
        let row_heat = |y: usize| (0..8).map(|x| s.heat_at(x, y) as u32).sum::<u32>();
        assert!(row_heat(6) > 0);

        let p = AnimationParams { injection: 255, cooling: 255, ..Default::default() };
        let mut s = FireState::new(g, StdRng::seed_from_u64(9));
        for _ in 0..20 {
            s.advance(&p);
        }
        assert_eq!((0..8).map(|x| s.heat_at(x, 0) as u32).sum::<u32>(), 0);
    }

    #[test]
    fn test_palette_thresholds() {
        assert_eq!(heat_color(0), BACKGROUND);
        assert_eq!(heat_color(15), BACKGROUND);
        assert_eq!(heat_color(50), Rgb888::new(150, 0, 0));
        assert_eq!(heat_color(100), Rgb888::new(255, 30, 0));
        assert_eq!(heat_color(255), Rgb888::new(255, 255, 255));
    }
}
