//! Risk analyzer: labels risk scores and summarizes the dashboard payload.
//!
//! Works on the opaque cached dashboard data and never fails: absent or
//! malformed fields read as zero.

use serde::{Deserialize, Serialize};

use lms_common::models::{RiskDistribution, SystemStatus};

/// Risk band of a 0-100 score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RiskLevel {
    Minimal,
    Low,
    Medium,
    High,
}

impl std::fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RiskLevel::Minimal => write!(f, "MINIMAL"),
            RiskLevel::Low => write!(f, "LOW"),
            RiskLevel::Medium => write!(f, "MEDIUM"),
            RiskLevel::High => write!(f, "HIGH"),
        }
    }
}

pub fn risk_label(score: u8) -> RiskLevel {
    match score {
        80.. => RiskLevel::High,
        60..=79 => RiskLevel::Medium,
        40..=59 => RiskLevel::Low,
        _ => RiskLevel::Minimal,
    }
}

/// Share of each risk bucket, in percent of the total.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct RiskPercentages {
    pub high: f64,
    pub medium: f64,
    pub low: f64,
    pub minimal: f64,
}

pub fn percentages(distribution: &RiskDistribution) -> RiskPercentages {
    // Summed in f64 so extreme counts cannot overflow.
    let buckets = [
        distribution.high,
        distribution.medium,
        distribution.low,
        distribution.minimal,
    ];
    let total: f64 = buckets.iter().map(|n| *n as f64).sum();
    if total == 0.0 {
        return RiskPercentages::default();
    }

    let share = |n: u64| n as f64 / total * 100.0;
    RiskPercentages {
        high: share(distribution.high),
        medium: share(distribution.medium),
        low: share(distribution.low),
        minimal: share(distribution.minimal),
    }
}

/// Headline numbers extracted from a dashboard payload.
#[derive(Debug, Clone, Serialize)]
pub struct RiskSummary {
    pub system_status: SystemStatus,
    pub distribution: RiskDistribution,
    pub percentages: RiskPercentages,
    pub total: u64,
    pub critical_alerts: usize,
    pub kyc_queue: usize,
}

/// The parts of a dashboard payload the summary reads. Nested lists are
/// only counted, so either payload shape (REST or GraphQL) is accepted.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct DashboardHeadline {
    #[serde(alias = "systemStatus")]
    system_status: SystemStatus,
    #[serde(alias = "riskDistribution")]
    risk_distribution: RiskDistribution,
    #[serde(alias = "criticalAlerts")]
    critical_alerts: Vec<serde_json::Value>,
    #[serde(alias = "kycQueue")]
    kyc_queue: Vec<serde_json::Value>,
}

/// Summarize a cached dashboard payload. Anything unreadable yields zeros.
pub fn dashboard_summary(payload: &serde_json::Value) -> RiskSummary {
    let data: DashboardHeadline = serde_json::from_value(payload.clone()).unwrap_or_else(|e| {
        tracing::debug!(error = %e, "Unreadable dashboard payload, using defaults");
        DashboardHeadline::default()
    });

    RiskSummary {
        percentages: percentages(&data.risk_distribution),
        total: data.risk_distribution.total(),
        distribution: data.risk_distribution,
        critical_alerts: data.critical_alerts.len(),
        kyc_queue: data.kyc_queue.len(),
        system_status: data.system_status,
    }
}
