/*
 *  display/drivers/console.rs
 *
 *  PixelDeck - every pixel counts
 *  (c) 2020-26 Stuart Hunter
 *
 *  Console sinks - truecolor half-block preview and a log-only sink
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

use embedded_graphics::pixelcolor::{Rgb888, RgbColor};
use log::{debug, info};
use std::io::{self, Stdout, Write};

use crate::display::color::BACKGROUND;
use crate::display::error::SinkError;
use crate::display::traits::{OutputSink, PanelCommand};
use crate::vframebuf::Frame;

const UPPER_HALF: char = '\u{2580}';
const HOME: &str = "\x1b[H";
const CLEAR: &str = "\x1b[2J";
const RESET: &str = "\x1b[0m";

/// Draws each frame with one character per two pixel rows: the glyph
/// foreground is the upper pixel and its background the lower one.
pub struct ConsoleSink<W: Write + Send> {
    out: W,
    redraw_in_place: bool,
    frames: u64,
    cleared: bool,
}

impl ConsoleSink<Stdout> {
    pub fn stdout() -> Self {
        Self::new(io::stdout(), true)
    }
}

impl<W: Write + Send> ConsoleSink<W> {
    pub fn new(out: W, redraw_in_place: bool) -> Self {
        Self { out, redraw_in_place, frames: 0, cleared: false }
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn write_frame(&mut self, frame: &Frame) -> io::Result<()> {
        if self.redraw_in_place {
            if !self.cleared {
                write!(self.out, "{}", CLEAR)?;
                self.cleared = true;
            }
            write!(self.out, "{}", HOME)?;
        }
        let (w, h) = (frame.width() as u32, frame.height() as u32);
        let mut line = String::with_capacity(w as usize * 40);
        for y in (0..h).step_by(2) {
            line.clear();
            for x in 0..w {
                let top = frame.get(x, y).unwrap_or(BACKGROUND);
                let bottom = frame.get(x, y + 1).unwrap_or(BACKGROUND);
                line.push_str(&ansi_pair(top, bottom));
                line.push(UPPER_HALF);
            }
            line.push_str(RESET);
            writeln!(self.out, "{}", line)?;
        }
        self.out.flush()
    }
}

fn ansi_pair(fg: Rgb888, bg: Rgb888) -> String {
    format!(
        "\x1b[38;2;{};{};{};48;2;{};{};{}m",
        fg.r(),
        fg.g(),
        fg.b(),
        bg.r(),
        bg.g(),
        bg.b()
    )
}

/// One line description of a firmware command
pub fn describe_command(command: &PanelCommand) -> String {
    match command {
        PanelCommand::Clock { style } => format!("firmware clock, style {}", style),
        PanelCommand::Text { text, animation, speed, rainbow, .. } => {
            format!("firmware text {:?} ({:?}, speed {}, rainbow {})", text, animation, speed, rainbow)
        }
    }
}

impl<W: Write + Send> OutputSink for ConsoleSink<W> {
    fn name(&self) -> &str {
        "console"
    }

    fn send(&mut self, frame: &Frame) -> Result<(), SinkError> {
        self.write_frame(frame)?;
        self.frames += 1;
        Ok(())
    }

    fn send_command(&mut self, command: &PanelCommand) -> Result<(), SinkError> {
        if self.redraw_in_place {
            write!(self.out, "{}{}", CLEAR, HOME)?;
            self.cleared = true;
        }
        writeln!(self.out, "[panel] {}", describe_command(command))?;
        self.out.flush()?;
        Ok(())
    }
}

/// Sink that only logs, for headless runs
#[derive(Debug, Default)]
pub struct LogSink {
    frames: u64,
}

impl LogSink {
    pub fn new() -> Self {
        Self::default()
    }
}

impl OutputSink for LogSink {
    fn name(&self) -> &str {
        "log"
    }

    fn send(&mut self, frame: &Frame) -> Result<(), SinkError> {
        self.frames += 1;
        debug!(
            "frame {}: {}x{}, {} lit",
            self.frames,
            frame.width(),
            frame.height(),
            frame.count_not(BACKGROUND)
        );
        Ok(())
    }

    fn send_command(&mut self, command: &PanelCommand) -> Result<(), SinkError> {
        info!("{}", describe_command(command));
        Ok(())
    }
}
