/*
 *  display/components/mod.rs
 *
 *  PixelDeck - every pixel counts
 *  (c) 2020-26 Stuart Hunter
 *
 *  Content producers - turn clock time and feed records into styled text
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

pub mod channel;
pub mod clock;
pub mod scrollers;
pub mod stock;
pub mod weather;

use embedded_graphics::pixelcolor::{Rgb888, RgbColor};

pub use channel::{ChannelFormat, ChannelTicker};
pub use clock::{ClockFace, ClockMode, CountdownFormat, TimeFormat};
pub use scrollers::{ScrollState, ScrollingLine};
pub use stock::{StockFormat, StockTicker};
pub use weather::{WeatherFormat, WeatherTicker};

/// Shown in place of content when the last fetch failed
pub const ERROR_TEXT: &str = "N/A";
pub const ERROR_COLOR: Rgb888 = Rgb888::new(200, 0, 0);

/// Shown until the first fetch lands
pub const PENDING_TEXT: &str = "...";

pub const UP_COLOR: Rgb888 = Rgb888::GREEN;
pub const DOWN_COLOR: Rgb888 = Rgb888::RED;

/// One line of text and the color to draw it in
#[derive(Debug, Clone, PartialEq)]
pub struct StyledText {
    pub text: String,
    pub fg: Rgb888,
}

impl StyledText {
    pub fn new(text: impl Into<String>, fg: Rgb888) -> Self {
        Self { text: text.into(), fg }
    }

    pub fn error() -> Self {
        Self::new(ERROR_TEXT, ERROR_COLOR)
    }
}

/// Direction of a value since the previous successful fetch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Trend {
    Up,
    Down,
    #[default]
    Flat,
}

impl Trend {
    pub fn between(previous: Option<f64>, current: f64) -> Self {
        match previous {
            Some(p) if current > p => Trend::Up,
            Some(p) if current < p => Trend::Down,
            _ => Trend::Flat,
        }
    }

    pub fn color(&self, neutral: Rgb888) -> Rgb888 {
        match self {
            Trend::Up => UP_COLOR,
            Trend::Down => DOWN_COLOR,
            Trend::Flat => neutral,
        }
    }
}

/// Latest outcome of a feed's refresh
#[derive(Debug, Clone, PartialEq, Default)]
pub enum FeedStatus<T> {
    #[default]
    Pending,
    Ready(T),
    Failed(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trend() {
        assert_eq!(Trend::between(None, 5.0), Trend::Flat);
        assert_eq!(Trend::between(Some(4.0), 5.0), Trend::Up);
        assert_eq!(Trend::between(Some(6.0), 5.0), Trend::Down);
        assert_eq!(Trend::between(Some(5.0), 5.0), Trend::Flat);
        assert_eq!(Trend::Flat.color(Rgb888::CYAN), Rgb888::CYAN);
        assert_eq!(Trend::Down.color(Rgb888::CYAN), DOWN_COLOR);
    }
}
