/*
 *  display/generators/plasma.rs
 *
 *  PixelDeck - every pixel counts
 *  (c) 2020-26 Stuart Hunter
 *
 *  Interference plasma - three sine fields summed and quantized
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

use super::AnimationParams;
use crate::display::color::BACKGROUND;
use crate::display::traits::PanelGeometry;
use crate::vframebuf::Frame;

const FREQ_X: f32 = 0.35;
const FREQ_Y: f32 = 0.45;
const FREQ_XY: f32 = 0.25;
const PHASE_RATE: f32 = 0.15;

/// Lowest intensity drawn, keeps troughs visible
const FLOOR: f32 = 24.0;

/// Value in [0, 1] for one pixel at a given phase
#[inline]
pub fn plasma_value(x: f32, y: f32, phase: u32) -> f32 {
    let t = phase as f32 * PHASE_RATE;
    let v = (x * FREQ_X + t).sin() + (y * FREQ_Y + t).sin() + ((x + y) * FREQ_XY + t).sin();
    ((v + 3.0) / 6.0).clamp(0.0, 1.0)
}

/// Plasma carries nothing but its phase
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PlasmaState {
    phase: u32,
}

impl PlasmaState {
    pub fn new() -> Self {
        Self { phase: 0 }
    }

    pub fn with_phase(phase: u32) -> Self {
        Self { phase }
    }

    pub fn phase(&self) -> u32 { self.phase }

    pub fn render(&self, geometry: PanelGeometry, params: &AnimationParams) -> Frame {
        let mut frame = geometry.blank(BACKGROUND);
        for y in 0..geometry.height {
            for x in 0..geometry.width {
                let v = plasma_value(x as f32, y as f32, self.phase);
                let value = (FLOOR + v * (255.0 - FLOOR)).round() as u8;
                frame.set(x, y, params.color_scheme.colorize(value, x, y, self.phase));
            }
        }
        frame
    }

    pub fn step(&mut self, geometry: PanelGeometry, params: &AnimationParams) -> Frame {
        let frame = self.render(geometry, params);
        self.phase = self.phase.wrapping_add(1);
        frame
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_phase_same_frame() {
        let g = PanelGeometry::new(32, 16).unwrap();
        let p = AnimationParams::default();
        let a = PlasmaState::with_phase(42).render(g, &p);
        let b = PlasmaState::with_phase(42).render(g, &p);
        assert_eq!(a, b);
        assert_ne!(a, PlasmaState::with_phase(43).render(g, &p));
    }

    #[test]
    fn test_value_in_unit_range() {
        for phase in [0, 7, 1000, u32::MAX] {
            for x in 0..20 {
                let v = plasma_value(x as f32, (x * 3) as f32, phase);
                assert!((0.0..=1.0).contains(&v));
            }
        }
    }

    #[test]
    fn test_every_pixel_lit() {
        let g = PanelGeometry::new(16, 8).unwrap();
        let f = PlasmaState::new().render(g, &AnimationParams::default());
        assert_eq!(f.count_not(BACKGROUND), 16 * 8);
    }
}
