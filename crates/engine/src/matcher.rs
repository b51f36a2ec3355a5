//! Transaction filter matcher.
//!
//! Filters are applied on read to the cached transactions payload; the cache
//! itself always holds the unfiltered results.
//! 1. Status: `ALL` or one status
//! 2. Risk band: `HIGH` (score >= 80), `MEDIUM` (40..80), `MINIMAL` (< 40)
//! 3. Timeframe: transactions no older than 24h / 7d / 30d, or all

use std::str::FromStr;

use chrono::{DateTime, TimeDelta, Utc};
use serde::Deserialize;

use lms_common::models::{Page, Transaction, TransactionStatus};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RiskFilter {
    #[default]
    All,
    High,
    Medium,
    Minimal,
}

impl RiskFilter {
    pub fn matches(&self, score: u8) -> bool {
        match self {
            RiskFilter::All => true,
            RiskFilter::High => score >= 80,
            RiskFilter::Medium => (40..80).contains(&score),
            RiskFilter::Minimal => score < 40,
        }
    }
}

impl FromStr for RiskFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "ALL" => Ok(RiskFilter::All),
            "HIGH" => Ok(RiskFilter::High),
            "MEDIUM" => Ok(RiskFilter::Medium),
            "MINIMAL" => Ok(RiskFilter::Minimal),
            other => Err(format!("unknown risk level '{other}'")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
pub enum Timeframe {
    #[serde(rename = "24h")]
    Day,
    #[serde(rename = "7d")]
    Week,
    #[serde(rename = "30d")]
    Month,
    #[default]
    #[serde(rename = "all")]
    All,
}

impl Timeframe {
    /// Maximum age of a matching transaction, `None` for unbounded.
    pub fn window(&self) -> Option<TimeDelta> {
        match self {
            Timeframe::Day => Some(TimeDelta::hours(24)),
            Timeframe::Week => Some(TimeDelta::days(7)),
            Timeframe::Month => Some(TimeDelta::days(30)),
            Timeframe::All => None,
        }
    }
}

impl FromStr for Timeframe {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "24h" => Ok(Timeframe::Day),
            "7d" => Ok(Timeframe::Week),
            "30d" => Ok(Timeframe::Month),
            "all" => Ok(Timeframe::All),
            other => Err(format!("unknown timeframe '{other}'")),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct TransactionFilter {
    /// `None` matches every status.
    pub status: Option<TransactionStatus>,
    pub risk: RiskFilter,
    pub timeframe: Timeframe,
}

impl TransactionFilter {
    /// Build a filter from query-string values. Absent values and `ALL`
    /// match everything.
    pub fn parse(
        status: Option<&str>,
        risk: Option<&str>,
        timeframe: Option<&str>,
    ) -> Result<Self, String> {
        let status = match status {
            None => None,
            Some(s) if s.eq_ignore_ascii_case("all") => None,
            Some(s) => Some(s.parse()?),
        };

        Ok(Self {
            status,
            risk: risk.map(str::parse).transpose()?.unwrap_or_default(),
            timeframe: timeframe.map(str::parse).transpose()?.unwrap_or_default(),
        })
    }

    pub fn matches(&self, tx: &Transaction, now: DateTime<Utc>) -> bool {
        if self.status.is_some_and(|s| s != tx.status) {
            return false;
        }

        if !self.risk.matches(tx.risk_score) {
            return false;
        }

        match self.timeframe.window() {
            Some(window) => now.signed_duration_since(tx.timestamp) <= window,
            None => true,
        }
    }

    pub fn apply<'a>(
        &self,
        transactions: &'a [Transaction],
        now: DateTime<Utc>,
    ) -> Vec<&'a Transaction> {
        transactions.iter().filter(|tx| self.matches(tx, now)).collect()
    }

    /// Filter a cached transactions page. A payload that is not a page of
    /// transactions yields no results.
    pub fn filter_payload(&self, payload: &serde_json::Value, now: DateTime<Utc>) -> Vec<Transaction> {
        let page: Page<Transaction> = match serde_json::from_value(payload.clone()) {
            Ok(page) => page,
            Err(e) => {
                tracing::debug!(error = %e, "Unreadable transactions payload");
                return Vec::new();
            }
        };

        page.results
            .into_iter()
            .filter(|tx| self.matches(tx, now))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lms_common::models::{KycLevel, TransactionType};

    fn make_tx(id: &str, status: TransactionStatus, risk_score: u8, age: TimeDelta, now: DateTime<Utc>) -> Transaction {
        let ts = now - age;
        Transaction {
            id: id.to_string(),
            timestamp: ts,
            user: "Jane Smith".to_string(),
            user_id: "user_456".to_string(),
            tx_type: TransactionType::Withdrawal,
            asset: "ETH".to_string(),
            amount: 1.0,
            value: 3_000.0,
            from_address: "0xabc".to_string(),
            to_address: "0xdef".to_string(),
            status,
            risk_score,
            location: "London, UK".to_string(),
            kyc_level: KycLevel::Level2,
            flags: vec![],
            created_at: ts,
            updated_at: ts,
        }
    }

    fn sample(now: DateTime<Utc>) -> Vec<Transaction> {
        vec![
            make_tx("t1", TransactionStatus::Completed, 15, TimeDelta::hours(1), now),
            make_tx("t2", TransactionStatus::Flagged, 85, TimeDelta::hours(30), now),
            make_tx("t3", TransactionStatus::Pending, 45, TimeDelta::days(10), now),
            make_tx("t4", TransactionStatus::Flagged, 79, TimeDelta::days(40), now),
        ]
    }

    fn ids(txs: &[&Transaction]) -> Vec<String> {
        txs.iter().map(|tx| tx.id.clone()).collect()
    }

    #[test]
    fn test_default_filter_matches_all() {
        let now = Utc::now();
        let txs = sample(now);
        assert_eq!(TransactionFilter::default().apply(&txs, now).len(), 4);
    }

    #[test]
    fn test_status_filter() {
        let now = Utc::now();
        let txs = sample(now);
        let filter = TransactionFilter::parse(Some("FLAGGED"), None, None).unwrap();
        assert_eq!(ids(&filter.apply(&txs, now)), vec!["t2", "t4"]);
    }

    #[test]
    fn test_risk_bands() {
        let now = Utc::now();
        let txs = sample(now);

        let high = TransactionFilter::parse(None, Some("HIGH"), None).unwrap();
        assert_eq!(ids(&high.apply(&txs, now)), vec!["t2"]);

        let medium = TransactionFilter::parse(None, Some("medium"), None).unwrap();
        assert_eq!(ids(&medium.apply(&txs, now)), vec!["t3", "t4"]);

        let minimal = TransactionFilter::parse(None, Some("MINIMAL"), None).unwrap();
        assert_eq!(ids(&minimal.apply(&txs, now)), vec!["t1"]);
    }

    #[test]
    fn test_timeframes() {
        let now = Utc::now();
        let txs = sample(now);

        let day = TransactionFilter::parse(None, None, Some("24h")).unwrap();
        assert_eq!(ids(&day.apply(&txs, now)), vec!["t1"]);

        let week = TransactionFilter::parse(None, None, Some("7d")).unwrap();
        assert_eq!(ids(&week.apply(&txs, now)), vec!["t1", "t2"]);

        let month = TransactionFilter::parse(None, None, Some("30d")).unwrap();
        assert_eq!(ids(&month.apply(&txs, now)), vec!["t1", "t2", "t3"]);
    }

    #[test]
    fn test_combined_filters() {
        let now = Utc::now();
        let txs = sample(now);
        let filter = TransactionFilter::parse(Some("flagged"), Some("HIGH"), Some("7d")).unwrap();
        assert_eq!(ids(&filter.apply(&txs, now)), vec!["t2"]);
    }

    #[test]
    fn test_parse_rejects_unknown_values() {
        assert!(TransactionFilter::parse(Some("LOST"), None, None).is_err());
        assert!(TransactionFilter::parse(None, Some("EXTREME"), None).is_err());
        assert!(TransactionFilter::parse(None, None, Some("1y")).is_err());
        assert!(TransactionFilter::parse(Some("ALL"), Some("ALL"), Some("all")).is_ok());
    }

    #[test]
    fn test_filter_payload() {
        let now = Utc::now();
        let page = Page::complete(4, sample(now));
        let payload = serde_json::to_value(&page).unwrap();

        let filter = TransactionFilter::parse(None, Some("HIGH"), None).unwrap();
        let result = filter.filter_payload(&payload, now);
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].id, "t2");

        assert!(filter.filter_payload(&serde_json::json!({"oops": 1}), now).is_empty());
    }
}
