//! Canned LMS data served by the mock sources.
//!
//! Timestamps are relative to `now` so the data always looks recent.

use chrono::{DateTime, TimeDelta, Utc};

use lms_common::models::{
    DashboardData, DocumentStatus, KycApplication, KycDocument, KycLevel, KycStatus,
    LimitTemplate, Page, RiskAlert, RiskAlertSeverity, RiskAlertStatus, RiskAlertType,
    RiskDistribution, SystemStatus, Transaction, TransactionStatus, TransactionType,
};

pub fn transactions(now: DateTime<Utc>) -> Page<Transaction> {
    Page {
        count: 156,
        next: None,
        previous: None,
        results: vec![
            Transaction {
                id: "txn_001".to_string(),
                timestamp: now,
                user: "John Doe".to_string(),
                user_id: "user_123".to_string(),
                tx_type: TransactionType::Deposit,
                asset: "BTC".to_string(),
                amount: 2.5,
                value: 107_619.75,
                from_address: "bc1qxy2kgdygjrsqtzq2n0yrf2493p83kkfjhx0wlh".to_string(),
                to_address: "bc1qw508d6qejxtdg4y5r3zarvary0c5xw7kv8f3t4".to_string(),
                status: TransactionStatus::Completed,
                risk_score: 15,
                location: "New York, US".to_string(),
                kyc_level: KycLevel::Level3,
                flags: vec![],
                created_at: now,
                updated_at: now,
            },
            Transaction {
                id: "txn_002".to_string(),
                timestamp: now - TimeDelta::minutes(210),
                user: "Sarah Chen".to_string(),
                user_id: "user_456".to_string(),
                tx_type: TransactionType::Withdrawal,
                asset: "ETH".to_string(),
                amount: 10.0,
                value: 25_473.20,
                from_address: "0x742d35Cc6647C8532B50aA7B2B9827Ec5b1B6123".to_string(),
                to_address: "0x8ba1f109551bd432803012645hac136c6d7d8a9f".to_string(),
                status: TransactionStatus::Pending,
                risk_score: 85,
                location: "Singapore".to_string(),
                kyc_level: KycLevel::Level2,
                flags: vec!["HIGH_AMOUNT".to_string(), "UNUSUAL_PATTERN".to_string()],
                created_at: now - TimeDelta::minutes(35),
                updated_at: now,
            },
            Transaction {
                id: "txn_003".to_string(),
                timestamp: now - TimeDelta::minutes(35),
                user: "Michael Johnson".to_string(),
                user_id: "user_789".to_string(),
                tx_type: TransactionType::Trade,
                asset: "USDT".to_string(),
                amount: 50_000.0,
                value: 50_000.0,
                from_address: "TRzuMBEeJsHwNdCzGpVEX5sLsLwFZtj5a3".to_string(),
                to_address: "TR7NHqjeKQxGTCi8q8ZY4pL8otSzgjLj6t".to_string(),
                status: TransactionStatus::Flagged,
                risk_score: 95,
                location: "Unknown".to_string(),
                kyc_level: KycLevel::Level1,
                flags: vec![
                    "SUSPICIOUS_LOCATION".to_string(),
                    "LARGE_AMOUNT".to_string(),
                    "PATTERN_MATCH".to_string(),
                ],
                created_at: now - TimeDelta::minutes(35),
                updated_at: now,
            },
        ],
    }
}

pub fn kyc_applications(now: DateTime<Utc>) -> Page<KycApplication> {
    let submitted = now - TimeDelta::hours(2);
    let document = |id: &str, filename: &str, file_type: &str, status| KycDocument {
        id: id.to_string(),
        filename: filename.to_string(),
        file_type: file_type.to_string(),
        uploaded_at: submitted,
        status,
    };

    Page {
        count: 45,
        next: None,
        previous: None,
        results: vec![KycApplication {
            id: "kyc_001".to_string(),
            user: "Emma Wilson".to_string(),
            email: "emma.wilson@email.com".to_string(),
            user_id: "user_101".to_string(),
            current_level: KycLevel::Unverified,
            requested_level: KycLevel::Level2,
            submitted_at: submitted,
            status: KycStatus::UnderReview,
            documents: vec![
                document("doc_001", "passport.jpg", "image/jpeg", DocumentStatus::Verified),
                document("doc_002", "utility_bill.pdf", "application/pdf", DocumentStatus::Verified),
                document("doc_003", "selfie.jpg", "image/jpeg", DocumentStatus::Uploaded),
            ],
            reviewer_id: None,
            score: 78,
            risk_factors: vec!["NEW_USER".to_string()],
            notes: None,
            created_at: submitted,
            updated_at: now,
        }],
    }
}

pub fn risk_alerts(now: DateTime<Utc>) -> Vec<RiskAlert> {
    vec![
        RiskAlert {
            id: "alert_001".to_string(),
            alert_type: RiskAlertType::HighRiskTransaction,
            severity: RiskAlertSeverity::High,
            title: "Suspicious Large Withdrawal Detected".to_string(),
            description: "User attempting to withdraw $25,473 to unknown address".to_string(),
            timestamp: now - TimeDelta::minutes(5),
            status: RiskAlertStatus::Active,
            user_id: Some("user_456".to_string()),
            transaction_id: Some("txn_002".to_string()),
            risk_score: 85,
            assigned_to: None,
            resolution_notes: None,
            created_at: now - TimeDelta::minutes(5),
            updated_at: now,
        },
        RiskAlert {
            id: "alert_002".to_string(),
            alert_type: RiskAlertType::PatternMatch,
            severity: RiskAlertSeverity::Critical,
            title: "Potential Money Laundering Pattern".to_string(),
            description: "Multiple structured transactions detected".to_string(),
            timestamp: now - TimeDelta::minutes(15),
            status: RiskAlertStatus::Active,
            user_id: Some("user_456".to_string()),
            transaction_id: Some("txn_002".to_string()),
            risk_score: 95,
            assigned_to: None,
            resolution_notes: None,
            created_at: now - TimeDelta::minutes(15),
            updated_at: now,
        },
    ]
}

pub fn limit_templates(now: DateTime<Utc>) -> Page<LimitTemplate> {
    Page {
        count: 3,
        next: None,
        previous: None,
        results: vec![LimitTemplate {
            id: "template_001".to_string(),
            name: "Standard User".to_string(),
            description: "Default limits for verified users".to_string(),
            daily_withdrawal_limit: 10_000.0,
            monthly_withdrawal_limit: 100_000.0,
            single_transaction_limit: 5_000.0,
            daily_deposit_limit: 50_000.0,
            monthly_deposit_limit: 500_000.0,
            is_active: true,
            user_level: KycLevel::Level2,
            created_at: now,
            updated_at: now,
        }],
    }
}

/// Dashboard aggregate built from the other fixtures.
pub fn dashboard(now: DateTime<Utc>) -> DashboardData {
    DashboardData {
        system_status: SystemStatus {
            active_alerts: 3,
            pending_kyc: 8,
            daily_volume: 2_400_000.0,
            average_risk_score: 34.0,
        },
        risk_distribution: RiskDistribution {
            high: 5,
            medium: 12,
            low: 23,
            minimal: 89,
        },
        recent_transactions: transactions(now).results.into_iter().take(5).collect(),
        critical_alerts: risk_alerts(now)
            .into_iter()
            .filter(|a| a.severity == RiskAlertSeverity::Critical)
            .collect(),
        kyc_queue: kyc_applications(now).results.into_iter().take(3).collect(),
    }
}
