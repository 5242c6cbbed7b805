//! Mock trade execution and the in-memory trade history table.
//!
//! Orders never leave the process: a ticket is filled at the latest ask (buy) or
//! bid (sell) of its symbol, logged, and appended to the history.

use super::Panel;
use chrono::{TimeZone, Utc};
use forex_common::quote::{Quote, QuoteMap, now_millis};
use forex_common::validate::is_valid_number;
use forex_common::{FeedError, Result, Symbol};
use log::{error, info};
use std::fmt;
use std::str::FromStr;
use strum_macros::{Display, EnumString};

/// Order direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Side {
    /// Fill at the ask.
    Buy,
    /// Fill at the bid.
    Sell,
}

/// Market order ticket.
#[derive(Debug, Clone, PartialEq)]
pub struct TradeTicket {
    /// Direction.
    pub side: Side,
    /// Notional in base currency units.
    pub amount: f64,
    /// Optional protective stop.
    pub stop_loss: Option<f64>,
    /// Optional profit target.
    pub take_profit: Option<f64>,
}

impl TradeTicket {
    /// Plain market ticket.
    pub fn market(side: Side, amount: f64) -> Self {
        Self {
            side,
            amount,
            stop_loss: None,
            take_profit: None,
        }
    }

    fn validate(&self) -> Result<()> {
        if !is_valid_number(self.amount) || self.amount <= 0.0 {
            return Err(FeedError::InvalidInput(format!(
                "trade amount must be positive, got {}",
                self.amount
            )));
        }
        for level in [self.stop_loss, self.take_profit].into_iter().flatten() {
            if !is_valid_number(level) || level <= 0.0 {
                return Err(FeedError::InvalidInput(format!(
                    "price level must be positive, got {}",
                    level
                )));
            }
        }
        Ok(())
    }
}

impl FromStr for TradeTicket {
    type Err = FeedError;

    /// `side:amount[:sl=price][:tp=price]`, e.g. `buy:10000:sl=1.07`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.trim().split(':');
        let side = parts
            .next()
            .unwrap_or_default()
            .parse::<Side>()
            .map_err(|_| FeedError::InvalidInput(format!("unknown side in {:?}", s)))?;
        let amount = parts
            .next()
            .and_then(|a| a.parse::<f64>().ok())
            .ok_or_else(|| FeedError::InvalidInput(format!("missing amount in {:?}", s)))?;

        let mut ticket = TradeTicket::market(side, amount);
        for part in parts {
            let (key, value) = part
                .split_once('=')
                .ok_or_else(|| FeedError::InvalidInput(format!("bad option {:?}", part)))?;
            let level = value
                .parse::<f64>()
                .map_err(|_| FeedError::InvalidInput(format!("bad price {:?}", value)))?;
            match key {
                "sl" => ticket.stop_loss = Some(level),
                "tp" => ticket.take_profit = Some(level),
                _ => return Err(FeedError::InvalidInput(format!("unknown option {:?}", key))),
            }
        }
        ticket.validate()?;
        Ok(ticket)
    }
}

/// Executed mock trade.
#[derive(Debug, Clone, PartialEq)]
pub struct Fill {
    /// Sequence number within this session, starting at 1.
    pub id: u64,
    /// Traded pair.
    pub symbol: Symbol,
    /// Direction.
    pub side: Side,
    /// Notional.
    pub amount: f64,
    /// Execution price.
    pub price: f64,
    /// Stop from the ticket.
    pub stop_loss: Option<f64>,
    /// Target from the ticket.
    pub take_profit: Option<f64>,
    /// Execution time, epoch milliseconds.
    pub timestamp: i64,
}

impl fmt::Display for Fill {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let time = Utc
            .timestamp_millis_opt(self.timestamp)
            .single()
            .map(|t| t.format("%H:%M:%S").to_string())
            .unwrap_or_else(|| "-".to_string());
        write!(
            f,
            "#{} {} {} {} {:.0} @ {:.5}",
            self.id,
            time,
            self.side.to_string().to_uppercase(),
            self.symbol,
            self.amount,
            self.price
        )
    }
}

/// Execution consumer for one symbol.
#[derive(Debug)]
pub struct ExecutionPanel {
    symbol: Symbol,
    latest: Option<Quote>,
    pending: Option<TradeTicket>,
    history: Vec<Fill>,
}

impl ExecutionPanel {
    /// Panel trading `symbol`.
    pub fn new(symbol: Symbol) -> Self {
        Self {
            symbol,
            latest: None,
            pending: None,
            history: Vec::new(),
        }
    }

    /// Queue a ticket to be filled on the next quote for the panel's symbol.
    pub fn with_pending(mut self, ticket: TradeTicket) -> Self {
        self.pending = Some(ticket);
        self
    }

    /// Fill `ticket` against the latest quote.
    pub fn execute(&mut self, ticket: &TradeTicket) -> Result<Fill> {
        ticket.validate()?;
        let quote = self.latest.ok_or_else(|| {
            FeedError::InvalidInput(format!("no price yet for {}", self.symbol))
        })?;
        let price = match ticket.side {
            Side::Buy => quote.ask,
            Side::Sell => quote.bid,
        };
        if !is_valid_number(price) || price <= 0.0 {
            return Err(FeedError::InvalidInput(format!(
                "no executable {} price for {}",
                ticket.side, self.symbol
            )));
        }

        let fill = Fill {
            id: self.history.len() as u64 + 1,
            symbol: self.symbol.clone(),
            side: ticket.side,
            amount: ticket.amount,
            price,
            stop_loss: ticket.stop_loss,
            take_profit: ticket.take_profit,
            timestamp: now_millis(),
        };
        info!(
            "Executing trade: {} sl={:?} tp={:?}",
            fill, fill.stop_loss, fill.take_profit
        );
        self.history.push(fill.clone());
        Ok(fill)
    }

    /// Trade history, oldest first.
    pub fn history(&self) -> &[Fill] {
        &self.history
    }
}

impl Panel for ExecutionPanel {
    fn name(&self) -> &str {
        "execution"
    }

    fn on_quotes(&mut self, quotes: &QuoteMap) {
        let Some(quote) = quotes.get(&self.symbol) else {
            return;
        };
        self.latest = Some(*quote);
        if let Some(ticket) = self.pending.take() {
            if let Err(e) = self.execute(&ticket) {
                error!("kind={} trade rejected: {}", e.kind(), e);
            }
        }
    }
}
