/*
 *  display/generators/life.rs
 *
 *  PixelDeck - every pixel counts
 *  (c) 2020-26 Stuart Hunter
 *
 *  Conway's Game of Life, B3/S23 on a bounded grid
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

#[derive(Debug, Clone, PartialEq)]
pub struct LifeState {
    cells: Vec<bool>,
    w: usize,
    h: usize,
    generation: u64,
}

impl LifeState {
    /// Each cell starts alive with probability `density` (already clamped)
    pub fn new(geometry: PanelGeometry, density: f32, mut rng: StdRng) -> Self {
        let (w, h) = (geometry.width as usize, geometry.height as usize);
        let p = density.clamp(0.0, 1.0) as f64;
        let cells = (0..w * h).map(|_| rng.random_bool(p)).collect();
        Self { cells, w, h, generation: 0 }
    }

    /// Build from an explicit grid, row-major
    pub fn from_cells(geometry: PanelGeometry, cells: Vec<bool>) -> Self {
        let (w, h) = (geometry.width as usize, geometry.height as usize);
        let mut cells = cells;
        cells.resize(w * h, false);
        Self { cells, w, h, generation: 0 }
    }

    pub fn generation(&self) -> u64 { self.generation }

    pub fn alive(&self) -> usize {
        self.cells.iter().filter(|c| **c).count()
    }

    pub fn is_alive(&self, x: usize, y: usize) -> bool {
        x < self.w && y < self.h && self.cells[y * self.w + x]
    }

    fn neighbours(&self, x: usize, y: usize) -> u8 {
        let mut n = 0;
        for dy in -1i32..=1 {
            for dx in -1i32..=1 {
                if dx == 0 && dy == 0 {
                    continue;
                }
                let (nx, ny) = (x as i32 + dx, y as i32 + dy);
                // no wraparound, off-grid counts as dead
                if nx >= 0 && ny >= 0 && self.is_alive(nx as usize, ny as usize) {
                    n += 1;
                }
            }
        }
        n
    }

    pub fn evolve(&mut self) {
        let next = (0..self.h)
            .flat_map(|y| (0..self.w).map(move |x| (x, y)))
            .map(|(x, y)| matches!((self.is_alive(x, y), self.neighbours(x, y)), (true, 2) | (_, 3)))
            .collect();
        self.cells = next;
        self.generation += 1;
    }

    pub fn render(&self, geometry: PanelGeometry, params: &AnimationParams) -> Frame {
        let mut frame = geometry.blank(BACKGROUND);
        for y in 0..geometry.height {
            for x in 0..geometry.width {
                if self.is_alive(x as usize, y as usize) {
                    frame.set(x, y, params.color_scheme.colorize(255, x, y, self.generation as u32));
                }
            }
        }
        frame
    }

    pub fn step(&mut self, geometry: PanelGeometry, params: &AnimationParams) -> Frame {
        let frame = self.render(geometry, params);
        self.evolve();
        frame
    }
}
