/*
 *  display/traits.rs
 *
 *  PixelDeck - every pixel counts
 *  (c) 2020-26 Stuart Hunter
 *
 *  Panel geometry and the output sink abstraction
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
use serde::{Deserialize, Serialize};

use crate::display::error::{DisplayError, SinkError};
use crate::vframebuf::Frame;

/// Physical panel size, fixed for the life of a scheduler
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PanelGeometry {
    /// Panel width in pixels
    pub width: u32,

    /// Panel height in pixels
    pub height: u32,
}

impl PanelGeometry {
    pub fn new(width: u32, height: u32) -> Result<Self, DisplayError> {
        if width == 0 || height == 0 {
            return Err(DisplayError::InvalidGeometry { width, height });
        }
        Ok(Self { width, height })
    }

    pub fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }

    /// Blank frame of exactly this size
    pub fn blank(&self, fill: Rgb888) -> Frame {
        Frame::new(self.width, self.height, fill)
    }

    /// Reject frames that would not fill the panel exactly
    pub fn check(&self, frame: &Frame) -> Result<(), DisplayError> {
        if frame.width() != self.width as usize || frame.height() != self.height as usize {
            return Err(DisplayError::BufferSizeMismatch {
                expected: self.pixel_count(),
                actual: frame.len(),
            });
        }
        Ok(())
    }
}

impl Default for PanelGeometry {
    fn default() -> Self {
        Self { width: 64, height: 16 }
    }
}

/// How the panel firmware animates natively rendered text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TextAnimation {
    #[default]
    Static,
    ScrollLeft,
    ScrollRight,
    Flash,
}

impl TextAnimation {
    /// Firmware animation code
    pub fn code(&self) -> u8 {
        match self {
            TextAnimation::Static => 0,
            TextAnimation::ScrollLeft => 1,
            TextAnimation::ScrollRight => 2,
            TextAnimation::Flash => 4,
        }
    }
}

/// Commands for content the panel renders itself
#[derive(Debug, Clone, PartialEq)]
pub enum PanelCommand {
    /// Firmware clock face, style 0..=8
    Clock { style: u8 },

    /// Firmware text renderer
    Text {
        text: String,
        color: Rgb888,
        background: Rgb888,
        animation: TextAnimation,
        /// 1..=100
        speed: u8,
        /// 0 = off, 1..=9 firmware rainbow modes
        rainbow: u8,
    },
}

/// The panel link. Every frame and command the scheduler produces ends up here.
///
/// Implementations must not block for long; the scheduler writes from its
/// tick and counts consecutive failures.
pub trait OutputSink: Send {
    /// Short name used in log lines
    fn name(&self) -> &str;

    /// Push one full panel frame
    fn send(&mut self, frame: &Frame) -> Result<(), SinkError>;

    /// Push a firmware command
    fn send_command(&mut self, command: &PanelCommand) -> Result<(), SinkError>;
}

pub type BoxedSink = Box<dyn OutputSink>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_geometry_rejected() {
        assert!(PanelGeometry::new(0, 16).is_err());
        assert!(PanelGeometry::new(64, 0).is_err());
        assert_eq!(PanelGeometry::new(32, 8).map(|g| g.pixel_count()), Ok(256));
    }

    #[test]
    fn test_check_frame_size() {
        let g = PanelGeometry::new(4, 4).unwrap();
        assert!(g.check(&g.blank(Rgb888::new(0, 0, 0))).is_ok());
        let wrong = Frame::new(4, 3, Rgb888::new(0, 0, 0));
        assert_eq!(
            g.check(&wrong),
            Err(DisplayError::BufferSizeMismatch { expected: 16, actual: 12 })
        );
    }

    #[test]
    fn test_text_animation_codes() {
        assert_eq!(TextAnimation::Static.code(), 0);
        assert_eq!(TextAnimation::ScrollLeft.code(), 1);
        assert_eq!(TextAnimation::ScrollRight.code(), 2);
        assert_eq!(TextAnimation::Flash.code(), 4);
    }
}
