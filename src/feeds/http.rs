/*
 *  feeds/http.rs
 *
 *  PixelDeck - every pixel counts
 *  (c) 2020-26 Stuart Hunter
 *
 *  reqwest backed fetcher for all feeds
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

use reqwest::{Client, header};
use std::time::Duration;

use super::{FetchError, FetchQuery, Fetcher, Record, stock, weather, youtube};

const USER_AGENT: &str = concat!("pixeldeck/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Clone, Default)]
pub struct ApiKeys {
    pub weather: Option<String>,
    pub youtube: Option<String>,
}

pub struct HttpFetcher {
    client: Client,
    keys: ApiKeys,
}

impl HttpFetcher {
    pub fn new(keys: ApiKeys) -> Result<Self, FetchError> {
        let mut headers = header::HeaderMap::new();
        headers.insert("User-Agent", header::HeaderValue::from_static(USER_AGENT));
        headers.insert("Accept", header::HeaderValue::from_static("application/json"));

        let client = Client::builder()
            .connect_timeout(Duration::from_secs(3))
            .default_headers(headers)
            .timeout(Duration::from_secs(10))
            .build()?;
        Ok(Self { client, keys })
    }

    fn key(value: &Option<String>, service: &'static str) -> Result<String, FetchError> {
        value
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty())
            .map(str::to_string)
            .ok_or(FetchError::NotConfigured(service))
    }
}

impl Fetcher for HttpFetcher {
    async fn fetch(&self, query: &FetchQuery) -> Result<Record, FetchError> {
        match query {
            FetchQuery::Stock { ticker } => {
                stock::fetch_quote(&self.client, ticker).await.map(Record::Stock)
            }
            FetchQuery::ChannelStats { channel } => {
                let key = Self::key(&self.keys.youtube, "YouTube")?;
                youtube::fetch_channel(&self.client, &key, channel).await.map(Record::ChannelStats)
            }
            FetchQuery::Weather { location, units } => {
                let key = Self::key(&self.keys.weather, "OpenWeatherMap")?;
                weather::fetch_weather(&self.client, &key, location, *units).await.map(Record::Weather)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feeds::TempUnit;

    #[tokio::test]
    async fn test_missing_key_fails_without_network() {
        let fetcher = HttpFetcher::new(ApiKeys { weather: Some("  ".into()), youtube: None }).unwrap();
        let q = FetchQuery::Weather { location: "Leeds".into(), units: TempUnit::Metric };
        assert!(matches!(fetcher.fetch(&q).await, Err(FetchError::NotConfigured("OpenWeatherMap"))));
        let q = FetchQuery::ChannelStats { channel: "@test".into() };
        assert!(matches!(fetcher.fetch(&q).await, Err(FetchError::NotConfigured("YouTube"))));
    }
}
