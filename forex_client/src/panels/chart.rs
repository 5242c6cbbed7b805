//! Rolling price window for one pair.

use super::Panel;
use forex_common::Symbol;
use forex_common::quote::{HistoricalSeries, QuoteMap};
use log::info;
use std::collections::VecDeque;

/// Number of points the chart keeps.
pub const CHART_POINTS: usize = 50;

/// One plotted point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChartPoint {
    /// Epoch milliseconds.
    pub timestamp: i64,
    /// Price at that time.
    pub price: f64,
}

/// Last/min/max over the window.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChartSummary {
    /// Most recent price.
    pub last: f64,
    /// Lowest price in the window.
    pub min: f64,
    /// Highest price in the window.
    pub max: f64,
}

/// Chart consumer for a single symbol.
#[derive(Debug)]
pub struct ChartPanel {
    symbol: Symbol,
    points: VecDeque<ChartPoint>,
}

impl ChartPanel {
    /// Empty chart for `symbol`.
    pub fn new(symbol: Symbol) -> Self {
        Self {
            symbol,
            points: VecDeque::with_capacity(CHART_POINTS + 1),
        }
    }

    /// Pre-fill the window with candle closes.
    pub fn seed(&mut self, series: &HistoricalSeries) {
        if series.symbol != self.symbol {
            return;
        }
        for candle in &series.data {
            self.push(ChartPoint {
                timestamp: candle.timestamp,
                price: candle.close,
            });
        }
    }

    fn push(&mut self, point: ChartPoint) {
        self.points.push_back(point);
        while self.points.len() > CHART_POINTS {
            self.points.pop_front();
        }
    }

    /// Plotted points, oldest first.
    pub fn points(&self) -> impl Iterator<Item = &ChartPoint> {
        self.points.iter()
    }

    /// Window statistics, `None` while empty.
    pub fn summary(&self) -> Option<ChartSummary> {
        let last = self.points.back()?.price;
        let (min, max) = self
            .points
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), p| {
                (lo.min(p.price), hi.max(p.price))
            });
        Some(ChartSummary { last, min, max })
    }
}

impl Panel for ChartPanel {
    fn name(&self) -> &str {
        "chart"
    }

    fn on_quotes(&mut self, quotes: &QuoteMap) {
        let Some(quote) = quotes.get(&self.symbol) else {
            return;
        };
        self.push(ChartPoint {
            timestamp: quote.timestamp,
            price: quote.price,
        });
        if let Some(s) = self.summary() {
            info!(
                "CHART {} last={:.4} low={:.4} high={:.4} points={}",
                self.symbol,
                s.last,
                s.min,
                s.max,
                self.points.len()
            );
        }
    }
}
