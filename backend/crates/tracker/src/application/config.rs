//! Application Configuration
//!
//! Configuration for the tracker application layer, derived from one
//! `AppConfig` snapshot.

use std::time::Duration;

use platform::config::AppConfig;

use crate::domain::value_objects::LeadTime;
use crate::error::{TrackerError, TrackerResult};

/// Tracker application configuration
#[derive(Debug, Clone)]
pub struct TrackerConfig {
    /// Reminder window for domain expirations
    pub domain_lead: LeadTime,
    /// Reminder window for certificate expirations
    pub certificate_lead: LeadTime,
    /// Dashboard base URL without a trailing slash
    pub dashboard_base: String,
    /// Pause between two domains in one cycle
    pub domain_pacing: Duration,
    /// Pause between two certificates in one cycle
    pub certificate_pacing: Duration,
    /// Upper bound for fetching and persisting one asset
    pub asset_budget: Duration,
    pub max_raw_payload_bytes: usize,
}

impl TrackerConfig {
    pub fn from_app(app: &AppConfig) -> TrackerResult<Self> {
        let domain_lead = LeadTime::from_days(app.remind_domain_exp_days).ok_or_else(|| {
            TrackerError::InvalidInput("remindDomainExpDays must be at least 1".into())
        })?;
        let certificate_lead = LeadTime::from_days(app.remind_cert_exp_days).ok_or_else(|| {
            TrackerError::InvalidInput("remindCertExpDays must be at least 1".into())
        })?;

        Ok(Self {
            domain_lead,
            certificate_lead,
            dashboard_base: app.dashboard_base().to_string(),
            domain_pacing: app.schedule.domain_pacing(),
            certificate_pacing: app.schedule.certificate_pacing(),
            asset_budget: app.schedule.asset_budget(),
            max_raw_payload_bytes: app.retention.max_raw_payload_bytes,
        })
    }

    /// Defaults with the given lead times; no pacing delay.
    pub fn with_leads(domain_days: u32, certificate_days: u32) -> Option<Self> {
        Some(Self {
            domain_lead: LeadTime::from_days(domain_days)?,
            certificate_lead: LeadTime::from_days(certificate_days)?,
            dashboard_base: String::new(),
            domain_pacing: Duration::ZERO,
            certificate_pacing: Duration::ZERO,
            asset_budget: Duration::from_secs(60),
            max_raw_payload_bytes: 256 * 1024,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "databaseURL": "postgres://localhost/tracker",
        "initUser": "admin",
        "initPassword": "pw",
        "remindDomainExpDays": 45,
        "remindCertExpDays": 14,
        "to_email": "ops@example.com",
        "from_email": "tracker@example.com",
        "smtp_host": "smtp.example.com",
        "baseURL": "https://tracker.example.com/",
        "schedule": { "domainPacingSecs": 2 },
        "retention": { "maxRawPayloadBytes": 1024 }
    }"#;

    #[test]
    fn test_from_app() {
        let app = AppConfig::from_json(SAMPLE).unwrap();
        let config = TrackerConfig::from_app(&app).unwrap();

        assert_eq!(config.domain_lead.days(), 45);
        assert_eq!(config.certificate_lead.days(), 14);
        assert_eq!(config.dashboard_base, "https://tracker.example.com");
        assert_eq!(config.domain_pacing, Duration::from_secs(2));
        assert_eq!(config.certificate_pacing, Duration::from_secs(5));
        assert_eq!(config.max_raw_payload_bytes, 1024);
    }
}
