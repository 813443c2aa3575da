/*
 *  display/components/weather.rs
 *
 *  PixelDeck - every pixel counts
 *  (c) 2020-26 Stuart Hunter
 *
 *  Weather ticker producer with cold / mild / hot color bands
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

use super::{FeedStatus, PENDING_TEXT, StyledText};
use crate::feeds::WeatherReading;

/// Celsius at or below this is cold
pub const COLD_BELOW_C: f64 = 5.0;
/// Celsius at or above this is hot
pub const HOT_ABOVE_C: f64 = 27.0;

pub const COLD_COLOR: Rgb888 = Rgb888::new(80, 160, 255);
pub const HOT_COLOR: Rgb888 = Rgb888::new(255, 140, 0);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WeatherFormat {
    Temp,
    #[default]
    TempCondition,
    CityTemp,
    FeelsLike,
    Full,
}

pub fn format_reading(r: &WeatherReading, format: WeatherFormat) -> String {
    let unit = r.units.symbol();
    match format {
        WeatherFormat::Temp => format!("{:.0}{}", r.temp, unit),
        WeatherFormat::TempCondition => format!("{:.0}{} {}", r.temp, unit, r.condition),
        WeatherFormat::CityTemp => format!("{} {:.0}{}", r.city, r.temp, unit),
        WeatherFormat::FeelsLike => format!("{:.0}{} feels {:.0}{}", r.temp, unit, r.feels_like, unit),
        WeatherFormat::Full => format!(
            "{} {:.0}{} {} {:.0}%",
            r.city, r.temp, unit, r.condition, r.humidity
        ),
    }
}

/// Band color for a temperature, compared in Celsius
pub fn band_color(r: &WeatherReading, neutral: Rgb888) -> Rgb888 {
    let c = r.units.to_celsius(r.temp);
    if c <= COLD_BELOW_C {
        COLD_COLOR
    } else if c >= HOT_ABOVE_C {
        HOT_COLOR
    } else {
        neutral
    }
}

#[derive(Debug, Clone)]
pub struct WeatherTicker {
    format: WeatherFormat,
    neutral: Rgb888,
    status: FeedStatus<WeatherReading>,
}

impl WeatherTicker {
    pub fn new(format: WeatherFormat, neutral: Rgb888) -> Self {
        Self { format, neutral, status: FeedStatus::Pending }
    }

    pub fn update(&mut self, result: Result<WeatherReading, String>) {
        self.status = match result {
            Ok(r) => FeedStatus::Ready(r),
            Err(e) => FeedStatus::Failed(e),
        };
    }

    pub fn styled(&self) -> StyledText {
        match &self.status {
            FeedStatus::Pending => StyledText::new(PENDING_TEXT, self.neutral),
            FeedStatus::Ready(r) => StyledText::new(format_reading(r, self.format), band_color(r, self.neutral)),
            FeedStatus::Failed(_) => StyledText::error(),
        }
    }
}
