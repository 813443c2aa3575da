/*
 *  display/components/channel.rs
 *
 *  PixelDeck - every pixel counts
 *  (c) 2020-26 Stuart Hunter
 *
 *  Channel statistics producer
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

use super::{FeedStatus, PENDING_TEXT, StyledText, Trend};
use crate::feeds::ChannelStats;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChannelFormat {
    #[default]
    Subscribers,
    NameSubscribers,
    SubscribersViews,
    Full,
}

/// 950 -> "950", 12_345 -> "12.3K", 1_500_000 -> "1.5M"
pub fn compact_count(n: u64) -> String {
    const UNITS: [(u64, &str); 3] = [(1_000_000_000, "B"), (1_000_000, "M"), (1_000, "K")];
    for (scale, suffix) in UNITS {
        if n >= scale {
            let v = n as f64 / scale as f64;
            let s = format!("{:.1}", v);
            return format!("{}{}", s.trim_end_matches(".0"), suffix);
        }
    }
    n.to_string()
}

pub fn format_stats(stats: &ChannelStats, format: ChannelFormat) -> String {
    let subs = compact_count(stats.subscribers);
    match format {
        ChannelFormat::Subscribers => format!("{} subs", subs),
        ChannelFormat::NameSubscribers => format!("{}: {} subs", stats.name, subs),
        ChannelFormat::SubscribersViews => format!("{} subs {} views", subs, compact_count(stats.views)),
        ChannelFormat::Full => format!(
            "{}: {} subs {} views {} videos",
            stats.name,
            subs,
            compact_count(stats.views),
            stats.video_count
        ),
    }
}

#[derive(Debug, Clone)]
pub struct ChannelTicker {
    format: ChannelFormat,
    neutral: Rgb888,
    status: FeedStatus<ChannelStats>,
    last_subscribers: Option<u64>,
    trend: Trend,
}

impl ChannelTicker {
    pub fn new(format: ChannelFormat, neutral: Rgb888) -> Self {
        Self { format, neutral, status: FeedStatus::Pending, last_subscribers: None, trend: Trend::Flat }
    }

    pub fn update(&mut self, result: Result<ChannelStats, String>) {
        match result {
            Ok(stats) => {
                self.trend = Trend::between(self.last_subscribers.map(|s| s as f64), stats.subscribers as f64);
                self.last_subscribers = Some(stats.subscribers);
                self.status = FeedStatus::Ready(stats);
            }
            Err(e) => self.status = FeedStatus::Failed(e),
        }
    }

    pub fn styled(&self) -> StyledText {
        match &self.status {
            FeedStatus::Pending => StyledText::new(PENDING_TEXT, self.neutral),
            FeedStatus::Ready(s) => StyledText::new(format_stats(s, self.format), self.trend.color(self.neutral)),
            FeedStatus::Failed(_) => StyledText::error(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::display::components::UP_COLOR;
    use embedded_graphics::pixelcolor::RgbColor;

    fn stats(subs: u64) -> ChannelStats {
        ChannelStats { name: "Chan".into(), subscribers: subs, views: 2_500_000, video_count: 12, latest_video_views: 0 }
    }

    #[test]
    fn test_compact_count() {
        assert_eq!(compact_count(950), "950");
        assert_eq!(compact_count(1_000), "1K");
        assert_eq!(compact_count(12_345), "12.3K");
        assert_eq!(compact_count(1_500_000), "1.5M");
        assert_eq!(compact_count(3_000_000_000), "3B");
    }

    #[test]
    fn test_formats() {
        let s = stats(1_200);
        assert_eq!(format_stats(&s, ChannelFormat::Subscribers), "1.2K subs");
        assert_eq!(format_stats(&s, ChannelFormat::NameSubscribers), "Chan: 1.2K subs");
        assert_eq!(format_stats(&s, ChannelFormat::SubscribersViews), "1.2K subs 2.5M views");
        assert_eq!(format_stats(&s, ChannelFormat::Full), "Chan: 1.2K subs 2.5M views 12 videos");
    }

    #[test]
    fn test_subscriber_trend() {
        let mut t = ChannelTicker::new(ChannelFormat::Subscribers, Rgb888::WHITE);
        t.update(Ok(stats(10)));
        t.update(Ok(stats(11)));
        assert_eq!(t.styled().fg, UP_COLOR);
    }
}
