/*
 *  display/mod.rs
 *
 *  PixelDeck - every pixel counts
 *  (c) 2020-26 Stuart Hunter
 *
 *  Display subsystem - fonts, rasterizing, generators and the task scheduler
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

// Core trait definitions
pub mod traits;
pub mod error;
pub mod color;

// Glyph sheets and text rasterizing
pub mod font;
pub mod raster;

// Procedural animations
pub mod generators;

// Content producers
pub mod components;

// Output sinks
pub mod drivers;

// Task model and scheduling
pub mod jobs;
pub mod task;
pub mod scheduler;

// Re-exports for convenience
pub use traits::{BoxedSink, OutputSink, PanelCommand, PanelGeometry, TextAnimation};
pub use error::{DisplayError, FontError, SinkError};
pub use color::{ColorScheme, HexColor};
pub use font::{FontTable, SpriteFont};
pub use generators::{AnimationKind, AnimationParams};
pub use scheduler::{FetchOutcome, FetchRequest, Scheduler, SchedulerEvent, SchedulerPolicy};
pub use task::{TaskKind, TaskSpec};
