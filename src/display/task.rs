/*
 *  display/task.rs
 *
 *  PixelDeck - every pixel counts
 *  (c) 2020-26 Stuart Hunter
 *
 *  Display task descriptors - one variant per content kind, normalized
 *  rather than rejected
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

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::display::color::HexColor;
use crate::display::components::{ChannelFormat, ClockMode, StockFormat, WeatherFormat};
use crate::display::generators::{AnimationKind, AnimationParams, MAX_FPS};
use crate::display::traits::{PanelCommand, TextAnimation};
use crate::feeds::{FetchQuery, TempUnit};

pub const MIN_REFRESH_SECS: u32 = 30;
pub const MAX_REFRESH_SECS: u32 = 3600;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TaskKind {
    Clock,
    Text,
    Stock,
    ChannelStats,
    Weather,
    Animation(AnimationKind),
    SpriteScroll,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClockTask {
    pub clock: ClockMode,
    pub color: HexColor,
    pub bg_color: HexColor,
    /// Seconds between wall clock reads, 1..=60
    pub update_secs: u32,
    pub font: Option<String>,
}

impl Default for ClockTask {
    fn default() -> Self {
        Self {
            clock: ClockMode::default(),
            color: HexColor::CYAN,
            bg_color: HexColor::BLACK,
            update_secs: 1,
            font: None,
        }
    }
}

/// Text the panel firmware renders and animates itself
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TextTask {
    pub text: String,
    pub color: HexColor,
    pub bg_color: HexColor,
    pub animation: TextAnimation,
    /// 1..=100
    pub speed: u8,
    /// 0 = off, 1..=9
    pub rainbow: u8,
}

impl Default for TextTask {
    fn default() -> Self {
        Self {
            text: String::new(),
            color: HexColor::WHITE,
            bg_color: HexColor::BLACK,
            animation: TextAnimation::Static,
            speed: 50,
            rainbow: 0,
        }
    }
}

impl TextTask {
    pub fn command(&self) -> PanelCommand {
        PanelCommand::Text {
            text: self.text.clone(),
            color: self.color.rgb(),
            background: self.bg_color.rgb(),
            animation: self.animation,
            speed: self.speed,
            rainbow: self.rainbow,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StockTask {
    pub ticker: String,
    pub format: StockFormat,
    pub color: HexColor,
    pub bg_color: HexColor,
    pub auto_refresh: bool,
    pub refresh_secs: u32,
    pub font: Option<String>,
}

impl Default for StockTask {
    fn default() -> Self {
        Self {
            ticker: String::new(),
            format: StockFormat::default(),
            color: HexColor::WHITE,
            bg_color: HexColor::BLACK,
            auto_refresh: true,
            refresh_secs: 300,
            font: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChannelTask {
    /// Channel id or @handle
    pub channel: String,
    pub format: ChannelFormat,
    pub color: HexColor,
    pub bg_color: HexColor,
    pub auto_refresh: bool,
    pub refresh_secs: u32,
    pub font: Option<String>,
}

impl Default for ChannelTask {
    fn default() -> Self {
        Self {
            channel: String::new(),
            format: ChannelFormat::default(),
            color: HexColor::WHITE,
            bg_color: HexColor::BLACK,
            auto_refresh: true,
            refresh_secs: 600,
            font: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WeatherTask {
    pub location: String,
    pub units: TempUnit,
    pub format: WeatherFormat,
    pub color: HexColor,
    pub bg_color: HexColor,
    pub auto_refresh: bool,
    pub refresh_secs: u32,
    pub font: Option<String>,
}

impl Default for WeatherTask {
    fn default() -> Self {
        Self {
            location: String::new(),
            units: TempUnit::Metric,
            format: WeatherFormat::default(),
            color: HexColor::WHITE,
            bg_color: HexColor::BLACK,
            auto_refresh: true,
            refresh_secs: 900,
            font: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnimationTask {
    pub kind: AnimationKind,
    #[serde(default)]
    pub params: AnimationParams,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpriteScrollTask {
    pub text: String,
    pub font: Option<String>,
    pub color: HexColor,
    pub bg_color: HexColor,
    /// Scroll ticks per second, 1..=30
    pub speed: u32,
}

impl Default for SpriteScrollTask {
    fn default() -> Self {
        Self {
            text: String::new(),
            font: None,
            color: HexColor::WHITE,
            bg_color: HexColor::BLACK,
            speed: 20,
        }
    }
}

/// Everything the scheduler can run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TaskSpec {
    Clock(ClockTask),
    Text(TextTask),
    Stock(StockTask),
    ChannelStats(ChannelTask),
    Weather(WeatherTask),
    Animation(AnimationTask),
    SpriteScroll(SpriteScrollTask),
}

fn clamp_refresh(secs: u32) -> u32 {
    secs.clamp(MIN_REFRESH_SECS, MAX_REFRESH_SECS)
}

impl TaskSpec {
    pub fn kind(&self) -> TaskKind {
        match self {
            TaskSpec::Clock(_) => TaskKind::Clock,
            TaskSpec::Text(_) => TaskKind::Text,
            TaskSpec::Stock(_) => TaskKind::Stock,
            TaskSpec::ChannelStats(_) => TaskKind::ChannelStats,
            TaskSpec::Weather(_) => TaskKind::Weather,
            TaskSpec::Animation(a) => TaskKind::Animation(a.kind),
            TaskSpec::SpriteScroll(_) => TaskKind::SpriteScroll,
        }
    }

    /// Clamp every numeric parameter into its valid range
    pub fn normalized(&self) -> Self {
        match self {
            TaskSpec::Clock(t) => TaskSpec::Clock(ClockTask {
                clock: t.clock.normalized(),
                update_secs: t.update_secs.clamp(1, 60),
                ..t.clone()
            }),
            TaskSpec::Text(t) => TaskSpec::Text(TextTask {
                speed: t.speed.clamp(1, 100),
                rainbow: t.rainbow.min(9),
                ..t.clone()
            }),
            TaskSpec::Stock(t) => TaskSpec::Stock(StockTask {
                ticker: t.ticker.trim().to_uppercase(),
                refresh_secs: clamp_refresh(t.refresh_secs),
                ..t.clone()
            }),
            TaskSpec::ChannelStats(t) => TaskSpec::ChannelStats(ChannelTask {
                channel: t.channel.trim().to_string(),
                refresh_secs: clamp_refresh(t.refresh_secs),
                ..t.clone()
            }),
            TaskSpec::Weather(t) => TaskSpec::Weather(WeatherTask {
                location: t.location.trim().to_string(),
                refresh_secs: clamp_refresh(t.refresh_secs),
                ..t.clone()
            }),
            TaskSpec::Animation(t) => TaskSpec::Animation(AnimationTask {
                kind: t.kind,
                params: t.params.normalized(),
            }),
            TaskSpec::SpriteScroll(t) => TaskSpec::SpriteScroll(SpriteScrollTask {
                speed: t.speed.clamp(1, MAX_FPS),
                ..t.clone()
            }),
        }
    }

    /// Feed query for tasks backed by a remote record
    pub fn fetch_query(&self) -> Option<FetchQuery> {
        match self {
            TaskSpec::Stock(t) => Some(FetchQuery::Stock { ticker: t.ticker.clone() }),
            TaskSpec::ChannelStats(t) => Some(FetchQuery::ChannelStats { channel: t.channel.clone() }),
            TaskSpec::Weather(t) => Some(FetchQuery::Weather { location: t.location.clone(), units: t.units }),
            _ => None,
        }
    }

    /// Refresh period; None when the feed is fetched once only
    pub fn refresh_every(&self) -> Option<Duration> {
        let (auto, secs) = match self {
            TaskSpec::Stock(t) => (t.auto_refresh, t.refresh_secs),
            TaskSpec::ChannelStats(t) => (t.auto_refresh, t.refresh_secs),
            TaskSpec::Weather(t) => (t.auto_refresh, t.refresh_secs),
            _ => return None,
        };
        auto.then(|| Duration::from_secs(clamp_refresh(secs) as u64))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::display::color::ColorScheme;
    use crate::display::components::TimeFormat;

    #[test]
    fn test_normalize_clamps() {
        let t = TaskSpec::Text(TextTask { speed: 0, rainbow: 20, ..Default::default() }).normalized();
        let TaskSpec::Text(t) = t else { panic!("kind changed") };
        assert_eq!((t.speed, t.rainbow), (1, 9));

        let s = TaskSpec::Stock(StockTask { ticker: " aapl ".into(), refresh_secs: 5, ..Default::default() });
        let TaskSpec::Stock(s) = s.normalized() else { panic!("kind changed") };
        assert_eq!(s.ticker, "AAPL");
        assert_eq!(s.refresh_secs, MIN_REFRESH_SECS);

        let c = TaskSpec::Clock(ClockTask { clock: ClockMode::Builtin { style: 12 }, update_secs: 0, ..Default::default() });
        let TaskSpec::Clock(c) = c.normalized() else { panic!("kind changed") };
        assert_eq!(c.clock, ClockMode::Builtin { style: 8 });
        assert_eq!(c.update_secs, 1);
    }

    #[test]
    fn test_refresh_only_when_auto() {
        let on = TaskSpec::Weather(WeatherTask { refresh_secs: 99_999, ..Default::default() });
        assert_eq!(on.refresh_every(), Some(Duration::from_secs(3600)));
        let off = TaskSpec::Weather(WeatherTask { auto_refresh: false, ..Default::default() });
        assert_eq!(off.refresh_every(), None);
        assert!(off.fetch_query().is_some());
        assert!(TaskSpec::Clock(ClockTask::default()).fetch_query().is_none());
    }

    #[test]
    fn test_json_descriptors() {
        let t: TaskSpec = serde_json::from_str(
            r##"{"type":"clock","clock":{"mode":"custom","format":"24h:ss"},"color":"#ff0000"}"##,
        )
        .unwrap();
        let TaskSpec::Clock(c) = &t else { panic!("wrong variant") };
        assert_eq!(c.clock, ClockMode::Custom { format: TimeFormat::Hms24 });
        assert_eq!(c.bg_color, HexColor::BLACK);

        let t: TaskSpec = serde_json::from_str(
            r#"{"type":"animation","kind":"game_of_life","params":{"density":0.2,"color_scheme":"green"}}"#,
        )
        .unwrap();
        assert_eq!(t.kind(), TaskKind::Animation(AnimationKind::GameOfLife));
        let TaskSpec::Animation(a) = t else { panic!("wrong variant") };
        assert_eq!(a.params.color_scheme, ColorScheme::Green);

        let t: TaskSpec = serde_json::from_str(r#"{"type":"stock","ticker":"MSFT"}"#).unwrap();
        assert_eq!(t.kind(), TaskKind::Stock);
    }
}
