/*
 *  display/generators/mod.rs
 *
 *  PixelDeck - every pixel counts
 *  (c) 2020-26 Stuart Hunter
 *
 *  Procedural frame generators - life, rain, fire, starfield, plasma
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

pub mod fire;
pub mod life;
pub mod plasma;
pub mod rain;
pub mod starfield;

use rand::{SeedableRng, rngs::StdRng};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::display::color::ColorScheme;
use crate::display::traits::PanelGeometry;
use crate::vframebuf::Frame;

pub use fire::FireState;
pub use life::LifeState;
pub use plasma::PlasmaState;
pub use rain::RainState;
pub use starfield::StarfieldState;

pub const MIN_FPS: u32 = 1;
pub const MAX_FPS: u32 = 30;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnimationKind {
    GameOfLife,
    Matrix,
    Fire,
    Starfield,
    Plasma,
}

/// Tunables shared by all generators; each reads the ones it needs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnimationParams {
    pub color_scheme: ColorScheme,
    /// Frames per second, 1..=30
    pub fps: u32,
    /// Initial alive probability for life, 0..=1
    pub density: f32,
    /// Heat lost per row for fire
    pub cooling: u8,
    /// Upper bound of heat injected at the bottom row for fire
    pub injection: u8,
    /// Run time; converted to a frame budget of `duration_secs * fps`
    pub duration_secs: Option<u32>,
    /// Fixed RNG seed for reproducible runs
    pub seed: Option<u64>,
}

impl Default for AnimationParams {
    fn default() -> Self {
        Self {
            color_scheme: ColorScheme::White,
            fps: 10,
            density: 0.3,
            cooling: 24,
            injection: 255,
            duration_secs: None,
            seed: None,
        }
    }
}

impl AnimationParams {
    /// Clamp everything into range. NaN density reads as zero.
    pub fn normalized(&self) -> Self {
        let density = if self.density.is_nan() { 0.0 } else { self.density.clamp(0.0, 1.0) };
        Self {
            fps: self.fps.clamp(MIN_FPS, MAX_FPS),
            density,
            duration_secs: self.duration_secs.filter(|d| *d > 0),
            ..self.clone()
        }
    }

    pub fn frame_interval(&self) -> Duration {
        Duration::from_micros(1_000_000u64 / self.fps.clamp(MIN_FPS, MAX_FPS) as u64)
    }

    /// Number of frames before auto stop, if a duration is set
    pub fn frame_budget(&self) -> Option<u32> {
        self.duration_secs
            .map(|d| d.saturating_mul(self.fps.clamp(MIN_FPS, MAX_FPS)).max(1))
    }

    fn rng(&self) -> StdRng {
        match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        }
    }
}

/// Live generator state, owned by one animation job
#[derive(Debug, Clone)]
pub enum GeneratorState {
    Life(LifeState),
    Rain(RainState),
    Fire(FireState),
    Starfield(StarfieldState),
    Plasma(PlasmaState),
}

impl GeneratorState {
    /// Fresh state for a new run; params must already be normalized
    pub fn new(kind: AnimationKind, geometry: PanelGeometry, params: &AnimationParams) -> Self {
        let rng = params.rng();
        match kind {
            AnimationKind::GameOfLife => GeneratorState::Life(LifeState::new(geometry, params.density, rng)),
            AnimationKind::Matrix => GeneratorState::Rain(RainState::new(geometry, rng)),
            AnimationKind::Fire => GeneratorState::Fire(FireState::new(geometry, rng)),
            AnimationKind::Starfield => GeneratorState::Starfield(StarfieldState::new(geometry, rng)),
            AnimationKind::Plasma => GeneratorState::Plasma(PlasmaState::new()),
        }
    }

    pub fn kind(&self) -> AnimationKind {
        match self {
            GeneratorState::Life(_) => AnimationKind::GameOfLife,
            GeneratorState::Rain(_) => AnimationKind::Matrix,
            GeneratorState::Fire(_) => AnimationKind::Fire,
            GeneratorState::Starfield(_) => AnimationKind::Starfield,
            GeneratorState::Plasma(_) => AnimationKind::Plasma,
        }
    }

    /// Frame for the current state, then advance one step
    pub fn step(&mut self, geometry: PanelGeometry, params: &AnimationParams) -> Frame {
        match self {
            GeneratorState::Life(s) => s.step(geometry, params),
            GeneratorState::Rain(s) => s.step(geometry, params),
            GeneratorState::Fire(s) => s.step(geometry, params),
            GeneratorState::Starfield(s) => s.step(geometry, params),
            GeneratorState::Plasma(s) => s.step(geometry, params),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_density_clamped() {
        let low = AnimationParams { density: -1.0, ..Default::default() }.normalized();
        assert_eq!(low.density, 0.0);
        let high = AnimationParams { density: 5.0, ..Default::default() }.normalized();
        assert_eq!(high.density, 1.0);
        let nan = AnimationParams { density: f32::NAN, ..Default::default() }.normalized();
        assert_eq!(nan.density, 0.0);
    }

    #[test]
    fn test_fps_clamped_and_interval() {
        let p = AnimationParams { fps: 0, ..Default::default() }.normalized();
        assert_eq!(p.fps, 1);
        assert_eq!(p.frame_interval(), Duration::from_secs(1));
        let p = AnimationParams { fps: 500, ..Default::default() }.normalized();
        assert_eq!(p.fps, 30);
    }

    #[test]
    fn test_frame_budget() {
        let p = AnimationParams { fps: 20, duration_secs: Some(3), ..Default::default() }.normalized();
        assert_eq!(p.frame_budget(), Some(60));
        let p = AnimationParams { duration_secs: Some(0), ..Default::default() }.normalized();
        assert_eq!(p.frame_budget(), None);
    }

    #[test]
    fn test_params_from_json_defaults() {
        let p: AnimationParams = serde_json::from_str(r#"{"color_scheme":"rainbow","fps":15}"#).unwrap();
        assert_eq!(p.color_scheme, ColorScheme::Rainbow);
        assert_eq!(p.fps, 15);
        assert_eq!(p.cooling, AnimationParams::default().cooling);
    }

    #[test]
    fn test_kind_round_trips_through_state() {
        let g = PanelGeometry::new(8, 8).unwrap();
        let p = AnimationParams { seed: Some(1), ..Default::default() };
        for kind in [
            AnimationKind::GameOfLife,
            AnimationKind::Matrix,
            AnimationKind::Fire,
            AnimationKind::Starfield,
            AnimationKind::Plasma,
        ] {
            assert_eq!(GeneratorState::new(kind, g, &p).kind(), kind);
        }
    }
}
