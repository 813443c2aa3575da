/*
 *  playlist.rs
 *
 *  PixelDeck - every pixel counts
 *  (c) 2020-26 Stuart Hunter
 *
 *  Playlists - ordered presets shown for a dwell time each
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

use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

use crate::display::task::TaskSpec;
use crate::presets::{PresetBook, PresetError};

const MIN_DWELL_SECS: u32 = 1;

fn default_dwell() -> u32 {
    10
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaylistItem {
    pub preset_name: String,
    #[serde(default = "default_dwell")]
    pub duration_secs: u32,
    /// Dwell for the animation's own run time instead
    #[serde(default)]
    pub use_anim_duration: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Playlist {
    pub name: String,
    #[serde(default)]
    pub looped: bool,
    #[serde(default)]
    pub items: Vec<PlaylistItem>,
}

/// A playlist item bound to its task
#[derive(Debug, Clone, PartialEq)]
pub struct PlaylistStep {
    pub preset: String,
    pub task: TaskSpec,
    pub dwell: Duration,
}

impl Playlist {
    /// Look every item up in `book`; an unknown preset fails the whole list
    pub fn resolve(&self, book: &PresetBook) -> Result<Vec<PlaylistStep>, PresetError> {
        self.items
            .iter()
            .map(|item| {
                let preset = book.find(&item.preset_name)?;
                let anim_secs = match (&preset.task, item.use_anim_duration) {
                    (TaskSpec::Animation(a), true) => a.params.duration_secs,
                    _ => None,
                };
                let secs = anim_secs.unwrap_or(item.duration_secs).max(MIN_DWELL_SECS);
                Ok(PlaylistStep {
                    preset: preset.name.clone(),
                    task: preset.task.clone(),
                    dwell: Duration::from_secs(secs as u64),
                })
            })
            .collect()
    }
}

/// Walks the steps of a playlist against a clock. The runtime asks for
/// the next due step and switches the scheduler to it.
#[derive(Debug)]
pub struct PlaylistRunner {
    name: String,
    steps: Vec<PlaylistStep>,
    looped: bool,
    index: usize,
    next_at: Option<Instant>,
    finished: bool,
    paused: bool,
    /// Dwell left on the current step while paused
    remaining: Option<Duration>,
}

impl PlaylistRunner {
    pub fn new(playlist: &Playlist, book: &PresetBook) -> Result<Self, PresetError> {
        let steps = playlist.resolve(book)?;
        info!(
            "Playlist '{}' ready: {} steps{}",
            playlist.name,
            steps.len(),
            if playlist.looped { ", looped" } else { "" }
        );
        Ok(Self {
            name: playlist.name.clone(),
            finished: steps.is_empty(),
            steps,
            looped: playlist.looped,
            index: 0,
            next_at: None,
            paused: false,
            remaining: None,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// When the current step ends
    pub fn deadline(&self) -> Option<Instant> {
        if self.finished || self.paused { None } else { self.next_at }
    }

    /// End the current dwell early, e.g. when a finite animation ran out
    pub fn skip(&mut self) {
        if self.finished {
            return;
        }
        if self.paused {
            self.remaining = None;
        } else {
            self.next_at = None;
        }
    }

    /// Hold the current step, keeping whatever dwell it has left
    pub fn pause(&mut self, now: Instant) {
        if self.finished || self.paused {
            return;
        }
        self.remaining = self.next_at.map(|at| at.saturating_duration_since(now));
        self.next_at = None;
        self.paused = true;
        info!("Playlist '{}' paused", self.name);
    }

    /// Carry on from where [`pause`](Self::pause) left off
    pub fn resume(&mut self, now: Instant) {
        if !self.paused {
            return;
        }
        self.next_at = self.remaining.take().map(|left| now + left);
        self.paused = false;
        info!("Playlist '{}' resumed", self.name);
    }

    /// The step to show at `now`, if the previous dwell has elapsed
    pub fn next_due(&mut self, now: Instant) -> Option<&PlaylistStep> {
        if self.finished || self.paused {
            return None;
        }
        if self.next_at.is_some_and(|at| now < at) {
            return None;
        }
        if self.index >= self.steps.len() {
            if !self.looped {
                info!("Playlist '{}' finished", self.name);
                self.finished = true;
                return None;
            }
            debug!("Playlist '{}' wrapping", self.name);
            self.index = 0;
        }
        let i = self.index;
        let step = self.steps.get(i)?;
        self.index += 1;
        self.next_at = Some(now + step.dwell);
        debug!("Playlist '{}' step {}: {}", self.name, i, step.preset);
        Some(step)
    }
}
