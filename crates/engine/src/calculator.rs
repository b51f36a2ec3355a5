//! Trading calculator.
//!
//! Converts between order amount, unit price and total in either direction
//! and applies the trading fee:
//!   total = amount × price            (amount-driven)
//!   amount = total ÷ price            (total-driven)
//!   final = total ± total × FEE_RATE  (+ when buying, − when selling)
//!
//! All derived values are recomputed from the inputs on every read.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Trading fee, 0.1% of the order total.
pub const FEE_RATE: f64 = 0.001;

/// Percentage-of-balance shortcuts offered to the user.
pub const PERCENTAGE_PRESETS: [f64; 4] = [25.0, 50.0, 75.0, 100.0];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Buy,
    Sell,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderType {
    Market,
    #[default]
    Limit,
    Stop,
}

/// Which input drives the conversion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CalculationMode {
    #[default]
    Amount,
    Total,
}

#[derive(Debug, Error, PartialEq)]
pub enum CalculatorError {
    #[error("{field} must be a finite, non-negative number (got {value})")]
    InvalidInput { field: &'static str, value: f64 },

    #[error("percentage must be in (0, 100] (got {0})")]
    InvalidPercentage(f64),
}

/// Hypothetical balances behind the percentage shortcuts.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Balances {
    /// Quote currency available for buying (e.g. USDT).
    pub quote: f64,
    /// Base currency available for selling (e.g. BTC).
    pub base: f64,
}

impl Default for Balances {
    fn default() -> Self {
        Self {
            quote: 10_000.0,
            base: 1.5,
        }
    }
}

/// Derived display values.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Calculation {
    pub amount: f64,
    pub price: f64,
    pub total: f64,
    pub fee: f64,
    pub final_total: f64,
}

#[derive(Debug, Clone)]
pub struct TradingCalculator {
    current_price: f64,
    side: Side,
    order_type: OrderType,
    mode: CalculationMode,
    balances: Balances,
    amount: f64,
    total: f64,
    /// Explicit price input; `None` falls back to the current price.
    price: Option<f64>,
}

impl TradingCalculator {
    pub fn new(current_price: f64, side: Side, order_type: OrderType) -> Result<Self, CalculatorError> {
        Ok(Self {
            current_price: check("current_price", current_price)?,
            side,
            order_type,
            mode: CalculationMode::Amount,
            balances: Balances::default(),
            amount: 0.0,
            total: 0.0,
            price: None,
        })
    }

    pub fn with_balances(mut self, balances: Balances) -> Self {
        self.balances = balances;
        self
    }

    pub fn mode(&self) -> CalculationMode {
        self.mode
    }

    pub fn side(&self) -> Side {
        self.side
    }

    pub fn order_type(&self) -> OrderType {
        self.order_type
    }

    /// Price used for conversion. Market orders always use the current
    /// price; otherwise a positive price input wins.
    pub fn effective_price(&self) -> f64 {
        match (self.order_type, self.price) {
            (OrderType::Market, _) => self.current_price,
            (_, Some(p)) if p > 0.0 => p,
            _ => self.current_price,
        }
    }

    /// Amount input; switches to amount-driven mode.
    pub fn set_amount(&mut self, amount: f64) -> Result<(), CalculatorError> {
        self.amount = check("amount", amount)?;
        self.mode = CalculationMode::Amount;
        self.total = self.amount * self.effective_price();
        Ok(())
    }

    /// Total input; switches to total-driven mode.
    pub fn set_total(&mut self, total: f64) -> Result<(), CalculatorError> {
        self.total = check("total", total)?;
        self.mode = CalculationMode::Total;
        self.amount = divide(self.total, self.effective_price());
        Ok(())
    }

    /// Price input. `None` (an empty field) or zero falls back to the
    /// current price. Recomputes the total from the current amount.
    pub fn set_price(&mut self, price: Option<f64>) -> Result<(), CalculatorError> {
        self.price = price.map(|p| check("price", p)).transpose()?;
        if self.amount > 0.0 {
            self.total = self.amount * self.effective_price();
        }
        Ok(())
    }

    pub fn set_current_price(&mut self, price: f64) -> Result<(), CalculatorError> {
        self.current_price = check("current_price", price)?;
        Ok(())
    }

    pub fn set_side(&mut self, side: Side) {
        self.side = side;
    }

    /// Switching to a market order discards the price input.
    pub fn set_order_type(&mut self, order_type: OrderType) {
        self.order_type = order_type;
        if order_type == OrderType::Market {
            self.price = None;
        }
    }

    /// Fill from `percentage` of the available balance. Always returns to
    /// amount-driven mode.
    pub fn apply_percentage(&mut self, percentage: f64) -> Result<(), CalculatorError> {
        if !percentage.is_finite() || percentage <= 0.0 || percentage > 100.0 {
            return Err(CalculatorError::InvalidPercentage(percentage));
        }

        let share = percentage / 100.0;
        let price = self.effective_price();
        match self.side {
            Side::Buy => {
                self.total = self.balances.quote * share;
                self.amount = divide(self.total, price);
            }
            Side::Sell => {
                self.amount = self.balances.base * share;
                self.total = self.amount * price;
            }
        }
        self.mode = CalculationMode::Amount;
        Ok(())
    }

    /// Flip the driving input without touching any value.
    pub fn toggle_mode(&mut self) {
        self.mode = match self.mode {
            CalculationMode::Amount => CalculationMode::Total,
            CalculationMode::Total => CalculationMode::Amount,
        };
    }

    pub fn calculation(&self) -> Calculation {
        let price = self.effective_price();
        if price <= 0.0 {
            return Calculation {
                amount: 0.0,
                price: 0.0,
                total: 0.0,
                fee: 0.0,
                final_total: 0.0,
            };
        }

        let (amount, total) = match self.mode {
            CalculationMode::Amount => (self.amount, self.amount * price),
            CalculationMode::Total => (self.total / price, self.total),
        };

        let fee = total * FEE_RATE;
        let final_total = match self.side {
            Side::Buy => total + fee,
            Side::Sell => total - fee,
        };

        Calculation {
            amount,
            price,
            total,
            fee,
            final_total,
        }
    }
}

/// One-shot calculation input, as accepted by the console API.
#[derive(Debug, Clone, Deserialize)]
pub struct CalculatorRequest {
    pub current_price: f64,
    pub side: Side,
    #[serde(default)]
    pub order_type: OrderType,
    #[serde(default)]
    pub mode: CalculationMode,
    pub amount: Option<f64>,
    pub total: Option<f64>,
    pub price: Option<f64>,
    /// Percentage shortcut; overrides `amount` and `total` when present.
    pub percentage: Option<f64>,
    pub balances: Option<Balances>,
}

impl CalculatorRequest {
    pub fn evaluate(&self) -> Result<Calculation, CalculatorError> {
        let mut calc = TradingCalculator::new(self.current_price, self.side, self.order_type)?
            .with_balances(self.balances.unwrap_or_default());
        calc.set_price(self.price)?;

        match (self.percentage, self.mode) {
            (Some(pct), _) => calc.apply_percentage(pct)?,
            (None, CalculationMode::Amount) => calc.set_amount(self.amount.unwrap_or(0.0))?,
            (None, CalculationMode::Total) => calc.set_total(self.total.unwrap_or(0.0))?,
        }

        Ok(calc.calculation())
    }
}

fn check(field: &'static str, value: f64) -> Result<f64, CalculatorError> {
    if value.is_finite() && value >= 0.0 {
        Ok(value)
    } else {
        Err(CalculatorError::InvalidInput { field, value })
    }
}

fn divide(total: f64, price: f64) -> f64 {
    if price > 0.0 { total / price } else { 0.0 }
}
