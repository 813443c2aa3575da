/*
 *  display/error.rs
 *
 *  PixelDeck - every pixel counts
 *  (c) 2020-26 Stuart Hunter
 *
 *  Error types for the display subsystem
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

use thiserror::Error;

/// Panel and frame level errors
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DisplayError {
    /// Panel dimensions must both be non-zero
    #[error("Invalid panel geometry: {width}x{height}")]
    InvalidGeometry { width: u32, height: u32 },

    /// Frame size does not match the panel
    #[error("Buffer size mismatch: expected {expected} pixels, got {actual}")]
    BufferSizeMismatch { expected: usize, actual: usize },
}

/// Font registration and lookup errors
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FontError {
    /// Sheet geometry is not a whole grid of equal cells
    #[error("Invalid font '{name}': {reason}")]
    InvalidFont { name: String, reason: String },

    /// Character is not part of the font's glyph order
    #[error("Glyph {ch:?} not found in font '{font}'")]
    GlyphNotFound { font: String, ch: char },

    #[error("Unknown font '{0}'")]
    UnknownFont(String),
}

/// Output sink failures, counted by the scheduler
#[derive(Debug, Error)]
pub enum SinkError {
    #[error("Sink I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Frame rejected: {0}")]
    Rejected(#[from] DisplayError),

    /// Panel link is gone (disconnected, powered off)
    #[error("Sink disconnected: {0}")]
    Disconnected(String),

    #[error("Command not supported by sink: {0}")]
    Unsupported(String),
}
