/*
 *  feeds/stock.rs
 *
 *  PixelDeck - every pixel counts
 *  (c) 2020-26 Stuart Hunter
 *
 *  Stock quotes from the Yahoo Finance chart endpoint
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

use super::{FetchError, StockQuote};

pub const CHART_URL: &str = "https://query1.finance.yahoo.com/v8/finance/chart";

pub async fn fetch_quote(client: &Client, ticker: &str) -> Result<StockQuote, FetchError> {
    let ticker = ticker.trim().to_uppercase();
    info!("Fetching stock data for: {}", ticker);
    let url = format!("{}/{}", CHART_URL, ticker);
    let body: Value = client
        .get(&url)
        .query(&[("interval", "1d"), ("range", "1d")])
        .send()
        .await?
        .json()
        .await?;
    let quote = parse_chart(&body, &ticker)?;
    info!("{} at {:.2} ({:+.2}%)", quote.name, quote.price, quote.change_pct);
    Ok(quote)
}

/// Quote from a chart response; change is measured against the previous close
pub fn parse_chart(body: &Value, ticker: &str) -> Result<StockQuote, FetchError> {
    let chart = &body["chart"];
    if let Some(desc) = chart["error"]["description"].as_str() {
        warn!("Could not fetch data for ticker {}: {}", ticker, desc);
        return Err(FetchError::NotFound(format!("{ticker}: {desc}")));
    }
    let meta = &chart["result"][0]["meta"];
    let price = meta["regularMarketPrice"]
        .as_f64()
        .ok_or_else(|| FetchError::MissingData(format!("no price for {ticker}")))?;
    let previous_close = meta["chartPreviousClose"]
        .as_f64()
        .or_else(|| meta["previousClose"].as_f64())
        .filter(|p| *p != 0.0);
    let change = previous_close.map(|p| price - p).unwrap_or(0.0);
    let change_pct = previous_close.map(|p| change / p * 100.0).unwrap_or(0.0);
    let symbol = meta["symbol"].as_str().unwrap_or(ticker).to_uppercase();
    let name = meta["shortName"]
        .as_str()
        .or_else(|| meta["longName"].as_str())
        .map(str::to_string)
        .unwrap_or_else(|| symbol.clone());

    Ok(StockQuote { ticker: symbol, name, price, change, change_pct, previous_close })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_chart() {
        let v: Value = serde_json::from_str(
            r#"{"chart":{"result":[{"meta":{"symbol":"AAPL","shortName":"Apple Inc.",
                "regularMarketPrice":202.0,"chartPreviousClose":200.0}}],"error":null}}"#,
        )
        .unwrap();
        let q = parse_chart(&v, "AAPL").unwrap();
        assert_eq!(q.ticker, "AAPL");
        assert_eq!(q.name, "Apple Inc.");
        assert!((q.change - 2.0).abs() < 1e-9);
        assert!((q.change_pct - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_parse_chart_without_previous_close() {
        let v: Value = serde_json::from_str(
            r#"{"chart":{"result":[{"meta":{"regularMarketPrice":5.5}}],"error":null}}"#,
        )
        .unwrap();
        let q = parse_chart(&v, "XYZ").unwrap();
        assert_eq!(q.name, "XYZ");
        assert_eq!(q.change, 0.0);
        assert_eq!(q.previous_close, None);
    }

    #[test]
    fn test_parse_chart_error() {
        let v: Value = serde_json::from_str(
            r#"{"chart":{"result":null,"error":{"code":"Not Found","description":"No data found"}}}"#,
        )
        .unwrap();
        assert!(matches!(parse_chart(&v, "NOPE"), Err(FetchError::NotFound(_))));
    }
}
