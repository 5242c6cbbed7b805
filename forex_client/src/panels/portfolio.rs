//! Portfolio allocation and margin summary.
//!
//! Equity and allocation weights are fixed demo values; only rates and percent
//! changes come from the feed.

use super::Panel;
use forex_common::Symbol;
use forex_common::quote::QuoteMap;
use forex_common::symbols::MajorPair;
use log::info;

/// Demo account equity.
pub const TOTAL_EQUITY: f64 = 125_847.32;
/// Share of equity reported as free margin.
pub const FREE_MARGIN_RATIO: f64 = 0.78;
/// Share of equity reported as used margin.
pub const USED_MARGIN_RATIO: f64 = 0.22;

/// One allocation slice. `symbol` is `None` for the catch-all "Others" slice.
#[derive(Debug, Clone, PartialEq)]
pub struct Allocation {
    /// Pair held, if any.
    pub symbol: Option<Symbol>,
    /// Share of equity, in percent.
    pub percentage: f64,
}

/// Slice valued with the latest quote.
#[derive(Debug, Clone, PartialEq)]
pub struct Holding {
    /// Display name.
    pub name: String,
    /// Share of equity, in percent.
    pub percentage: f64,
    /// Equity assigned to the slice.
    pub amount: f64,
    /// Latest mid, when quoted.
    pub rate: Option<f64>,
    /// Latest percent change, when quoted.
    pub change: Option<f64>,
}

/// Headline figures.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PortfolioStats {
    /// Sum of slice amounts.
    pub total_value: f64,
    /// `total_value * FREE_MARGIN_RATIO`.
    pub free_margin: f64,
    /// `total_value * USED_MARGIN_RATIO`.
    pub used_margin: f64,
    /// `total_value / used_margin * 100`.
    pub margin_level: f64,
    /// Allocation-weighted percent change of the quoted slices.
    pub avg_change: f64,
}

/// Default demo allocation.
pub fn default_allocation() -> Vec<Allocation> {
    vec![
        Allocation {
            symbol: Some(MajorPair::EURUSD.symbol()),
            percentage: 35.0,
        },
        Allocation {
            symbol: Some(MajorPair::GBPUSD.symbol()),
            percentage: 25.0,
        },
        Allocation {
            symbol: Some(MajorPair::USDJPY.symbol()),
            percentage: 20.0,
        },
        Allocation {
            symbol: Some(MajorPair::AUDUSD.symbol()),
            percentage: 12.0,
        },
        Allocation {
            symbol: None,
            percentage: 8.0,
        },
    ]
}

/// Portfolio consumer.
#[derive(Debug)]
pub struct PortfolioPanel {
    equity: f64,
    allocation: Vec<Allocation>,
    holdings: Vec<Holding>,
    stats: Option<PortfolioStats>,
}

impl Default for PortfolioPanel {
    fn default() -> Self {
        Self::new(TOTAL_EQUITY, default_allocation())
    }
}

impl PortfolioPanel {
    /// Panel over an explicit equity and allocation.
    pub fn new(equity: f64, allocation: Vec<Allocation>) -> Self {
        Self {
            equity,
            allocation,
            holdings: Vec::new(),
            stats: None,
        }
    }

    /// Pairs that need quotes for this allocation.
    pub fn symbols(&self) -> Vec<Symbol> {
        self.allocation
            .iter()
            .filter_map(|a| a.symbol.clone())
            .collect()
    }

    /// Value every slice against `quotes` and recompute the headline figures.
    pub fn revalue(&mut self, quotes: &QuoteMap) -> PortfolioStats {
        self.holdings = self
            .allocation
            .iter()
            .map(|slice| {
                let quote = slice.symbol.as_ref().and_then(|s| quotes.get(s));
                Holding {
                    name: slice
                        .symbol
                        .as_ref()
                        .map_or_else(|| "Others".to_string(), Symbol::to_string),
                    percentage: slice.percentage,
                    amount: self.equity * slice.percentage / 100.0,
                    rate: quote.map(|q| q.price),
                    change: quote.map(|q| q.percent_change),
                }
            })
            .collect();

        let total_value: f64 = self.holdings.iter().map(|h| h.amount).sum();
        let used_margin = total_value * USED_MARGIN_RATIO;
        let margin_level = if used_margin > 0.0 {
            total_value / used_margin * 100.0
        } else {
            0.0
        };
        let avg_change = self
            .holdings
            .iter()
            .filter_map(|h| h.change.map(|c| c * h.percentage / 100.0))
            .sum();

        let stats = PortfolioStats {
            total_value,
            free_margin: total_value * FREE_MARGIN_RATIO,
            used_margin,
            margin_level,
            avg_change,
        };
        self.stats = Some(stats);
        stats
    }

    /// Slices from the last revaluation.
    pub fn holdings(&self) -> &[Holding] {
        &self.holdings
    }

    /// Figures from the last revaluation.
    pub fn stats(&self) -> Option<PortfolioStats> {
        self.stats
    }
}

impl Panel for PortfolioPanel {
    fn name(&self) -> &str {
        "portfolio"
    }

    fn on_quotes(&mut self, quotes: &QuoteMap) {
        let s = self.revalue(quotes);
        info!(
            "PORTFOLIO equity={:.2} free={:.2} used={:.2} level={:.2}% change={:+.2}%",
            s.total_value, s.free_margin, s.used_margin, s.margin_level, s.avg_change
        );
    }
}
