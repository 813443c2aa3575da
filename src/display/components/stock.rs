/*
 *  display/components/stock.rs
 *
 *  PixelDeck - every pixel counts
 *  (c) 2020-26 Stuart Hunter
 *
 *  Stock ticker producer
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
use log::debug;
use serde::{Deserialize, Serialize};

use super::{FeedStatus, PENDING_TEXT, StyledText, Trend};
use crate::display::font::{ARROW_DOWN, ARROW_UP};
use crate::feeds::StockQuote;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StockFormat {
    #[default]
    PriceChange,
    PriceOnly,
    TickerPrice,
}

pub fn format_quote(quote: &StockQuote, format: StockFormat) -> String {
    match format {
        StockFormat::PriceChange => {
            let arrow = if quote.change_pct < 0.0 { ARROW_DOWN } else { ARROW_UP };
            format!("{} ${:.2} {}{:.2}%", quote.ticker, quote.price, arrow, quote.change_pct.abs())
        }
        StockFormat::PriceOnly => format!("${:.2}", quote.price),
        StockFormat::TickerPrice => format!("{} ${:.2}", quote.ticker, quote.price),
    }
}

#[derive(Debug, Clone)]
pub struct StockTicker {
    format: StockFormat,
    neutral: Rgb888,
    status: FeedStatus<StockQuote>,
    last_price: Option<f64>,
    trend: Trend,
}

impl StockTicker {
    pub fn new(format: StockFormat, neutral: Rgb888) -> Self {
        Self { format, neutral, status: FeedStatus::Pending, last_price: None, trend: Trend::Flat }
    }

    pub fn trend(&self) -> Trend {
        self.trend
    }

    /// Apply a refresh result; the trend compares against the last good price
    pub fn update(&mut self, result: Result<StockQuote, String>) {
        match result {
            Ok(quote) => {
                self.trend = Trend::between(self.last_price, quote.price);
                debug!("{} {:?}", quote.ticker, self.trend);
                self.last_price = Some(quote.price);
                self.status = FeedStatus::Ready(quote);
            }
            Err(e) => self.status = FeedStatus::Failed(e),
        }
    }

    pub fn styled(&self) -> StyledText {
        match &self.status {
            FeedStatus::Pending => StyledText::new(PENDING_TEXT, self.neutral),
            FeedStatus::Ready(q) => StyledText::new(format_quote(q, self.format), self.trend.color(self.neutral)),
            FeedStatus::Failed(_) => StyledText::error(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::display::components::{DOWN_COLOR, ERROR_TEXT, UP_COLOR};
    use embedded_graphics::pixelcolor::RgbColor;

    fn quote(price: f64, pct: f64) -> StockQuote {
        StockQuote {
            ticker: "AAPL".into(),
            name: "Apple Inc.".into(),
            price,
            change: price * pct / 100.0,
            change_pct: pct,
            previous_close: None,
        }
    }

    #[test]
    fn test_formats() {
        let q = quote(189.321, -1.254);
        assert_eq!(format_quote(&q, StockFormat::PriceChange), "AAPL $189.32 ▼1.25%");
        assert_eq!(format_quote(&q, StockFormat::PriceOnly), "$189.32");
        assert_eq!(format_quote(&q, StockFormat::TickerPrice), "AAPL $189.32");
        assert_eq!(format_quote(&quote(10.0, 0.5), StockFormat::PriceChange), "AAPL $10.00 ▲0.50%");
    }

    #[test]
    fn test_trend_colors_across_fetches() {
        let mut t = StockTicker::new(StockFormat::PriceOnly, Rgb888::WHITE);
        assert_eq!(t.styled().text, PENDING_TEXT);
        t.update(Ok(quote(100.0, 0.0)));
        assert_eq!(t.styled().fg, Rgb888::WHITE);
        t.update(Ok(quote(101.0, 0.0)));
        assert_eq!(t.styled().fg, UP_COLOR);
        t.update(Ok(quote(99.0, 0.0)));
        assert_eq!(t.styled().fg, DOWN_COLOR);
    }

    #[test]
    fn test_error_replaces_stale_quote() {
        let mut t = StockTicker::new(StockFormat::PriceOnly, Rgb888::WHITE);
        t.update(Ok(quote(100.0, 0.0)));
        t.update(Err("timeout".into()));
        assert_eq!(t.styled().text, ERROR_TEXT);
        // recovery compares with the last good price
        t.update(Ok(quote(105.0, 0.0)));
        assert_eq!(t.trend(), Trend::Up);
    }
}
