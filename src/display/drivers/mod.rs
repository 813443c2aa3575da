/*
 *  display/drivers/mod.rs
 *
 *  PixelDeck - every pixel counts
 *  (c) 2020-26 Stuart Hunter
 *
 *  Output sinks
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

// Terminal preview and log-only sinks
pub mod console;

// Recording sink for tests and dry runs
pub mod mock;

use serde::{Deserialize, Serialize};

use crate::display::traits::BoxedSink;

pub use console::{ConsoleSink, LogSink};
pub use mock::{MockSink, MockSinkState};

/// Sink selected by the `sink` config key or `--sink`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum SinkKind {
    /// ANSI half-block preview on stdout
    #[default]
    Console,
    /// Log a line per frame
    Log,
    /// Record and discard
    Null,
}

/// Build the configured sink
pub fn create_sink(kind: SinkKind) -> BoxedSink {
    match kind {
        SinkKind::Console => Box::new(ConsoleSink::stdout()),
        SinkKind::Log => Box::new(LogSink::new()),
        SinkKind::Null => Box::new(MockSink::new()),
    }
}
