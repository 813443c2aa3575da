/*
 *  feeds/weather.rs
 *
 *  PixelDeck - every pixel counts
 *  (c) 2020-26 Stuart Hunter
 *
 *  OpenWeatherMap current conditions
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

use log::{error, info};
use reqwest::Client;
use serde_json::Value;

use super::{FetchError, TempUnit, WeatherReading};

pub const WEATHER_URL: &str = "https://api.openweathermap.org/data/2.5/weather";

pub async fn fetch_weather(
    client: &Client,
    api_key: &str,
    location: &str,
    units: TempUnit,
) -> Result<WeatherReading, FetchError> {
    info!("Fetching weather for: {} (units={})", location, units.api_name());
    let params = [("q", location), ("appid", api_key), ("units", units.api_name())];
    let response = client.get(WEATHER_URL).query(&params).send().await?;
    let status = response.status();
    let body: Value = response.json().await?;
    if !status.is_success() {
        let msg = body["message"].as_str().unwrap_or("Unknown error").to_string();
        error!("Weather API error: {}", msg);
        return Err(FetchError::Api(msg));
    }
    let reading = parse_weather(&body, units)?;
    info!("Weather for {}: {:.1}{}", reading.city, reading.temp, units.symbol());
    Ok(reading)
}

/// Pull the fields we show out of a /weather response
pub fn parse_weather(body: &Value, units: TempUnit) -> Result<WeatherReading, FetchError> {
    let missing = |field: &str| FetchError::MissingData(format!("weather response lacks {field}"));
    let main = &body["main"];
    let first = &body["weather"][0];
    Ok(WeatherReading {
        city: body["name"].as_str().ok_or_else(|| missing("name"))?.to_string(),
        temp: main["temp"].as_f64().ok_or_else(|| missing("main.temp"))?,
        feels_like: main["feels_like"].as_f64().unwrap_or_default(),
        condition: first["main"].as_str().ok_or_else(|| missing("weather[0].main"))?.to_string(),
        description: first["description"].as_str().unwrap_or_default().to_string(),
        humidity: main["humidity"].as_f64().unwrap_or_default(),
        wind_speed: body["wind"]["speed"].as_f64().unwrap_or_default(),
        units,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "weather": [{"id": 500, "main": "Rain", "description": "light rain"}],
        "main": {"temp": 11.4, "feels_like": 10.2, "humidity": 81},
        "wind": {"speed": 4.1},
        "name": "Leeds"
    }"#;

    #[test]
    fn test_parse_weather() {
        let v: Value = serde_json::from_str(SAMPLE).unwrap();
        let r = parse_weather(&v, TempUnit::Metric).unwrap();
        assert_eq!(r.city, "Leeds");
        assert_eq!(r.condition, "Rain");
        assert_eq!(r.description, "light rain");
        assert!((r.temp - 11.4).abs() < 1e-9);
        assert!((r.humidity - 81.0).abs() < 1e-9);
        assert_eq!(r.units, TempUnit::Metric);
    }

    #[test]
    fn test_parse_weather_missing_temp() {
        let v: Value = serde_json::from_str(r#"{"name":"X","main":{},"weather":[{"main":"Sun"}]}"#).unwrap();
        assert!(matches!(parse_weather(&v, TempUnit::Metric), Err(FetchError::MissingData(_))));
    }
}
