/*
 *  display/components/clock.rs
 *
 *  PixelDeck - every pixel counts
 *  (c) 2020-26 Stuart Hunter
 *
 *  Clock producer - firmware clock faces, live time formats and countdowns
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

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

use crate::display::traits::PanelCommand;

/// Firmware clock faces are numbered 0..=8
pub const MAX_BUILTIN_STYLE: u8 = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TimeFormat {
    #[serde(rename = "24h:ss")]
    Hms24,
    #[default]
    #[serde(rename = "24h")]
    Hm24,
    #[serde(rename = "12h:ss")]
    Hms12,
    #[serde(rename = "12h")]
    Hm12,
    #[serde(rename = "time+date")]
    TimeDate,
    #[serde(rename = "minimal")]
    Minimal,
    #[serde(rename = "weekday")]
    Weekday,
}

impl TimeFormat {
    pub fn pattern(&self) -> &'static str {
        match self {
            TimeFormat::Hms24 => "%H:%M:%S",
            TimeFormat::Hm24 => "%H:%M",
            TimeFormat::Hms12 => "%I:%M:%S %p",
            TimeFormat::Hm12 => "%I:%M %p",
            TimeFormat::TimeDate => "%H:%M %d/%m",
            TimeFormat::Minimal => "%H:%M",
            TimeFormat::Weekday => "%a %H:%M",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CountdownFormat {
    #[default]
    DaysHoursMins,
    DaysHours,
    HoursMins,
    DaysOnly,
    WithName,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum ClockMode {
    /// Rendered by the panel firmware
    Builtin {
        #[serde(default)]
        style: u8,
    },
    Custom {
        #[serde(default)]
        format: TimeFormat,
    },
    Countdown {
        event: String,
        target: NaiveDateTime,
        #[serde(default)]
        format: CountdownFormat,
    },
}

impl Default for ClockMode {
    fn default() -> Self {
        ClockMode::Custom { format: TimeFormat::default() }
    }
}

impl ClockMode {
    pub fn normalized(&self) -> Self {
        match self {
            ClockMode::Builtin { style } => ClockMode::Builtin { style: (*style).min(MAX_BUILTIN_STYLE) },
            other => other.clone(),
        }
    }

    /// Firmware command for built-in faces; live modes render frames
    pub fn command(&self) -> Option<PanelCommand> {
        match self {
            ClockMode::Builtin { style } => Some(PanelCommand::Clock { style: (*style).min(MAX_BUILTIN_STYLE) }),
            _ => None,
        }
    }
}

pub fn format_time(format: TimeFormat, now: &NaiveDateTime) -> String {
    now.format(format.pattern()).to_string()
}

pub fn format_countdown(event: &str, target: &NaiveDateTime, format: CountdownFormat, now: &NaiveDateTime) -> String {
    let remaining = target.signed_duration_since(*now).num_seconds();
    if remaining <= 0 {
        return format!("{}: NOW!", event);
    }
    let days = remaining / 86_400;
    let hours = (remaining % 86_400) / 3_600;
    let mins = (remaining % 3_600) / 60;
    match format {
        CountdownFormat::DaysHoursMins => format!("{}d {}h {}m", days, hours, mins),
        CountdownFormat::DaysHours => format!("{}d {}h", days, hours),
        CountdownFormat::HoursMins => format!("{}h {}m", remaining / 3_600, mins),
        CountdownFormat::DaysOnly => format!("{} days", days),
        CountdownFormat::WithName => format!("{}: {}d {}h {}m", event, days, hours, mins),
    }
}

/// Live clock text with a minimum re-read interval
#[derive(Debug, Clone)]
pub struct ClockFace {
    mode: ClockMode,
    update: Duration,
    cached: Option<(Instant, String)>,
}

impl ClockFace {
    pub fn new(mode: ClockMode, update: Duration) -> Self {
        Self { mode: mode.normalized(), update, cached: None }
    }

    pub fn mode(&self) -> &ClockMode {
        &self.mode
    }

    pub fn render_text(&self, wall: &NaiveDateTime) -> String {
        match &self.mode {
            ClockMode::Builtin { style } => format!("clock {}", style),
            ClockMode::Custom { format } => format_time(*format, wall),
            ClockMode::Countdown { event, target, format } => format_countdown(event, target, *format, wall),
        }
    }

    /// Text for this tick; the wall clock is read again only once the
    /// update interval has passed
    pub fn text(&mut self, now: Instant, wall: &NaiveDateTime) -> String {
        if let Some((at, text)) = &self.cached {
            if now.saturating_duration_since(*at) < self.update {
                return text.clone();
            }
        }
        let text = self.render_text(wall);
        self.cached = Some((now, text.clone()));
        text
    }
}
