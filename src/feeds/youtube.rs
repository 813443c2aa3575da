/*
 *  feeds/youtube.rs
 *
 *  PixelDeck - every pixel counts
 *  (c) 2020-26 Stuart Hunter
 *
 *  Channel statistics from the YouTube Data API
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

use log::{info, warn};
use reqwest::Client;
use serde_json::Value;

use super::{ChannelStats, FetchError};

pub const CHANNELS_URL: &str = "https://www.googleapis.com/youtube/v3/channels";

/// Accepts a channel id or an @handle
pub async fn fetch_channel(client: &Client, api_key: &str, channel: &str) -> Result<ChannelStats, FetchError> {
    let channel = channel.trim();
    info!("Fetching YouTube stats for: {}", channel);
    let selector = if channel.starts_with('@') { "forHandle" } else { "id" };
    let params = [("part", "statistics,snippet"), (selector, channel), ("key", api_key)];
    let response = client.get(CHANNELS_URL).query(&params).send().await?;
    let status = response.status();
    let body: Value = response.json().await?;
    if !status.is_success() {
        let msg = body["error"]["message"].as_str().unwrap_or("Unknown error").to_string();
        return Err(FetchError::Api(msg));
    }
    let stats = parse_channel(&body).inspect_err(|_| warn!("YouTube channel not found: {}", channel))?;
    info!("Fetched stats for {}", stats.name);
    Ok(stats)
}

/// Counters arrive as decimal strings
fn count(v: &Value) -> u64 {
    match v {
        Value::String(s) => s.parse().unwrap_or(0),
        other => other.as_u64().unwrap_or(0),
    }
}

pub fn parse_channel(body: &Value) -> Result<ChannelStats, FetchError> {
    let item = body["items"]
        .as_array()
        .and_then(|items| items.first())
        .ok_or_else(|| FetchError::NotFound("channel".into()))?;
    let stats = &item["statistics"];
    Ok(ChannelStats {
        name: item["snippet"]["title"].as_str().unwrap_or_default().to_string(),
        subscribers: count(&stats["subscriberCount"]),
        views: count(&stats["viewCount"]),
        video_count: count(&stats["videoCount"]),
        latest_video_views: 0,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_channel() {
        let v: Value = serde_json::from_str(
            r#"{"items":[{"snippet":{"title":"Test Channel"},
                "statistics":{"subscriberCount":"1000","viewCount":"50000","videoCount":"42"}}]}"#,
        )
        .unwrap();
        let s = parse_channel(&v).unwrap();
        assert_eq!(s.name, "Test Channel");
        assert_eq!(s.subscribers, 1000);
        assert_eq!(s.views, 50_000);
        assert_eq!(s.video_count, 42);
        assert_eq!(s.latest_video_views, 0);
    }

    #[test]
    fn test_parse_channel_empty() {
        let v: Value = serde_json::from_str(r#"{"items":[]}"#).unwrap();
        assert!(matches!(parse_channel(&v), Err(FetchError::NotFound(_))));
        let v: Value = serde_json::from_str(r#"{"pageInfo":{}}"#).unwrap();
        assert!(parse_channel(&v).is_err());
    }
}
