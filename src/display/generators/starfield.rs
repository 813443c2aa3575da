/*
 *  display/generators/starfield.rs
 *
 *  PixelDeck - every pixel counts
 *  (c) 2020-26 Stuart Hunter
 *
 *  Parallax starfield - three speed tiers drifting left and down
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

use rand::{Rng, rngs::StdRng};

use super::AnimationParams;
use crate::display::color::BACKGROUND;
use crate::display::traits::PanelGeometry;
use crate::vframebuf::Frame;

const TIERS: u8 = 3;
const DRIFT_X: f32 = 0.5;
const DRIFT_Y: f32 = 0.125;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Star {
    pub x: f32,
    pub y: f32,
    /// 1 (far, slow, dim) ..= 3 (near, fast, bright)
    pub tier: u8,
}

#[derive(Debug, Clone)]
pub struct StarfieldState {
    stars: Vec<Star>,
    w: f32,
    h: f32,
    rng: StdRng,
    phase: u32,
}

impl StarfieldState {
    pub fn new(geometry: PanelGeometry, mut rng: StdRng) -> Self {
        let (w, h) = (geometry.width as f32, geometry.height as f32);
        let count = (geometry.pixel_count() / 16).clamp(3, 512);
        let stars = (0..count)
            .map(|_| Star {
                x: rng.random_range(0.0..w),
                y: rng.random_range(0.0..h),
                tier: rng.random_range(1..=TIERS),
            })
            .collect();
        Self { stars, w, h, rng, phase: 0 }
    }

    pub fn stars(&self) -> &[Star] {
        &self.stars
    }

    fn brightness(tier: u8) -> u8 {
        match tier {
            1 => 90,
            2 => 170,
            _ => 255,
        }
    }

    pub fn render(&self, geometry: PanelGeometry, params: &AnimationParams) -> Frame {
        let mut frame = geometry.blank(BACKGROUND);
        for star in &self.stars {
            let (x, y) = (star.x as u32, star.y as u32);
            if star.x >= 0.0 && star.y >= 0.0 && x < geometry.width && y < geometry.height {
                let color = params.color_scheme.colorize(Self::brightness(star.tier), x, y, self.phase);
                frame.set(x, y, color);
            }
        }
        frame
    }

    pub fn advance(&mut self) {
        for i in 0..self.stars.len() {
            let star = &mut self.stars[i];
            let speed = star.tier as f32;
            star.x -= speed * DRIFT_X;
            star.y += speed * DRIFT_Y;
            if star.x < 0.0 || star.y >= self.h {
                self.stars[i] = self.respawn();
            }
        }
        self.phase = self.phase.wrapping_add(1);
    }

    /// New star on the right or top edge with a fresh tier
    fn respawn(&mut self) -> Star {
        let tier = self.rng.random_range(1..=TIERS);
        if self.rng.random_bool(0.5) {
            Star { x: self.w - 1.0, y: self.rng.random_range(0.0..self.h), tier }
        } else {
            Star { x: self.rng.random_range(0.0..self.w), y: 0.0, tier }
        }
    }

    pub fn step(&mut self, geometry: PanelGeometry, params: &AnimationParams) -> Frame {
        let frame = self.render(geometry, params);
        self.advance();
        frame
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    #[test]
    fn test_stars_stay_on_panel() {
        let g = PanelGeometry::new(32, 8).unwrap();
        let mut s = StarfieldState::new(g, StdRng::seed_from_u64(11));
        for _ in 0..300 {
            s.advance();
            for star in s.stars() {
                assert!(star.x >= 0.0 && star.x < 32.0);
                assert!(star.y >= 0.0 && star.y < 8.0);
                assert!((1..=TIERS).contains(&star.tier));
            }
        }
    }

    #[test]
    fn test_near_stars_move_faster() {
        let g = PanelGeometry::new(64, 16).unwrap();
        let mut s = StarfieldState::new(g, StdRng::seed_from_u64(11));
        s.stars = vec![
            Star { x: 40.0, y: 2.0, tier: 1 },
            Star { x: 40.0, y: 2.0, tier: 3 },
        ];
        s.advance();
        assert!(s.stars[1].x < s.stars[0].x);
        assert!(s.stars[1].y > s.stars[0].y);
    }
}
