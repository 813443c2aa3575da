/*
 *  display/generators/rain.rs
 *
 *  PixelDeck - every pixel counts
 *  (c) 2020-26 Stuart Hunter
 *
 *  Column rain - one falling head per column with a fading trail
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

const MIN_TRAIL: i32 = 3;
const MAX_TRAIL: i32 = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Streak {
    head: i32,
    trail: i32,
}

#[derive(Debug, Clone)]
pub struct RainState {
    streaks: Vec<Streak>,
    height: i32,
    rng: StdRng,
    phase: u32,
}

impl RainState {
    pub fn new(geometry: PanelGeometry, mut rng: StdRng) -> Self {
        let height = geometry.height as i32;
        // staggered start so the first frames are not one flat wave
        let streaks = (0..geometry.width)
            .map(|_| Streak {
                head: rng.random_range(-2 * height..height),
                trail: rng.random_range(MIN_TRAIL..=MAX_TRAIL),
            })
            .collect();
        Self { streaks, height, rng, phase: 0 }
    }

    pub fn render(&self, geometry: PanelGeometry, params: &AnimationParams) -> Frame {
        let mut frame = geometry.blank(BACKGROUND);
        for (x, streak) in self.streaks.iter().enumerate().take(geometry.width as usize) {
            for k in 0..=streak.trail {
                let y = streak.head - k;
                if y < 0 || y >= geometry.height as i32 {
                    continue;
                }
                // head at full intensity, linear fade to the tail
                let value = 255 * (streak.trail + 1 - k) / (streak.trail + 1);
                let color = params.color_scheme.colorize(value as u8, x as u32, y as u32, self.phase);
                frame.set(x as u32, y as u32, color);
            }
        }
        frame
    }

    pub fn advance(&mut self) {
        for streak in self.streaks.iter_mut() {
            streak.head += 1;
            if streak.head - streak.trail >= self.height {
                streak.head = -self.rng.random_range(1..=self.height.max(1));
                streak.trail = self.rng.random_range(MIN_TRAIL..=MAX_TRAIL);
            }
        }
        self.phase = self.phase.wrapping_add(1);
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
    fn test_heads_respawn_above_top() {
        let g = PanelGeometry::new(4, 6).unwrap();
        let mut s = RainState::new(g, StdRng::seed_from_u64(3));
        for _ in 0..200 {
            s.advance();
            for d in &s.streaks {
                assert!(d.head - d.trail < 6);
                assert!((MIN_TRAIL..=MAX_TRAIL).contains(&d.trail));
            }
        }
    }

    #[test]
    fn test_trail_fades_toward_tail() {
        let g = PanelGeometry::new(1, 8).unwrap();
        let mut s = RainState::new(g, StdRng::seed_from_u64(3));
        s.streaks[0] = Streak { head: 5, trail: 3 };
        let f = s.render(g, &AnimationParams::default());
        let v = |y| f.get(0, y).map(|c| embedded_graphics::pixelcolor::RgbColor::r(&c)).unwrap_or(0);
        assert_eq!(v(5), 255);
        assert!(v(5) > v(4) && v(4) > v(3) && v(3) > v(2));
        assert_eq!(v(1), 0);
        assert_eq!(v(6), 0);
    }
}
