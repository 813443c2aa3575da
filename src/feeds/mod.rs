/*
 *  feeds/mod.rs
 *
 *  PixelDeck - every pixel counts
 *  (c) 2020-26 Stuart Hunter
 *
 *  Remote data feeds - queries, records and the fetcher seam
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

pub mod http;
pub mod stock;
pub mod weather;
pub mod youtube;

use serde::{Deserialize, Serialize};
use std::future::Future;
use thiserror::Error;

pub use http::{ApiKeys, HttpFetcher};

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The service answered with an error message
    #[error("API error: {0}")]
    Api(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Missing data: {0}")]
    MissingData(String),

    #[error("API key required for {0}")]
    NotConfigured(&'static str),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TempUnit {
    #[default]
    Metric,
    Imperial,
}

impl TempUnit {
    pub fn symbol(&self) -> &'static str {
        match self {
            TempUnit::Metric => "°C",
            TempUnit::Imperial => "°F",
        }
    }

    /// Value of the `units` query parameter
    pub fn api_name(&self) -> &'static str {
        match self {
            TempUnit::Metric => "metric",
            TempUnit::Imperial => "imperial",
        }
    }

    pub fn to_celsius(&self, temp: f64) -> f64 {
        match self {
            TempUnit::Metric => temp,
            TempUnit::Imperial => (temp - 32.0) * 5.0 / 9.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StockQuote {
    pub ticker: String,
    pub name: String,
    pub price: f64,
    pub change: f64,
    pub change_pct: f64,
    pub previous_close: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelStats {
    pub name: String,
    pub subscribers: u64,
    pub views: u64,
    pub video_count: u64,
    pub latest_video_views: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherReading {
    pub city: String,
    pub temp: f64,
    pub feels_like: f64,
    pub condition: String,
    pub description: String,
    pub humidity: f64,
    pub wind_speed: f64,
    pub units: TempUnit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FeedKind {
    Stock,
    ChannelStats,
    Weather,
}

/// What a refresh job asks the fetch worker for
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchQuery {
    Stock { ticker: String },
    ChannelStats { channel: String },
    Weather { location: String, units: TempUnit },
}

impl FetchQuery {
    pub fn kind(&self) -> FeedKind {
        match self {
            FetchQuery::Stock { .. } => FeedKind::Stock,
            FetchQuery::ChannelStats { .. } => FeedKind::ChannelStats,
            FetchQuery::Weather { .. } => FeedKind::Weather,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Record {
    Stock(StockQuote),
    ChannelStats(ChannelStats),
    Weather(WeatherReading),
}

impl Record {
    pub fn kind(&self) -> FeedKind {
        match self {
            Record::Stock(_) => FeedKind::Stock,
            Record::ChannelStats(_) => FeedKind::ChannelStats,
            Record::Weather(_) => FeedKind::Weather,
        }
    }
}

/// Source of feed records. Runs on a spawned task, never on the display loop.
pub trait Fetcher: Send + Sync + 'static {
    fn fetch(&self, query: &FetchQuery) -> impl Future<Output = Result<Record, FetchError>> + Send;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_units() {
        assert_eq!(TempUnit::Metric.symbol(), "°C");
        assert_eq!(TempUnit::Imperial.api_name(), "imperial");
        assert!((TempUnit::Imperial.to_celsius(212.0) - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_query_kinds() {
        let q = FetchQuery::Weather { location: "Leeds".into(), units: TempUnit::Metric };
        assert_eq!(q.kind(), FeedKind::Weather);
        let q = FetchQuery::Stock { ticker: "AAPL".into() };
        assert_eq!(q.kind(), FeedKind::Stock);
    }
}
