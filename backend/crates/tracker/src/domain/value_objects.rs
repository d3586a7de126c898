//! Domain Value Objects
//!
//! Immutable value types for the tracker domain.

use std::fmt;

use chrono::Duration;
use thiserror::Error;

/// Maximum length of a DNS name in presentation form
pub const DOMAIN_NAME_MAX_LENGTH: usize = 253;

/// Maximum length of one DNS label
pub const DOMAIN_LABEL_MAX_LENGTH: usize = 63;

// ============================================================================
// Domain Name
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomainNameError {
    #[error("domain is required")]
    Empty,

    #[error("domain is too long: {0} characters")]
    TooLong(usize),

    #[error("domain contains an empty label")]
    EmptyLabel,

    #[error("domain label exceeds {DOMAIN_LABEL_MAX_LENGTH} characters")]
    LabelTooLong,

    #[error("domain contains invalid character {0:?}")]
    InvalidCharacter(char),
}

/// A host or registrable domain in canonical form:
/// lowercase ASCII, no surrounding whitespace, no trailing dot.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DomainName(String);

impl DomainName {
    pub fn parse(raw: &str) -> Result<Self, DomainNameError> {
        let canonical = raw.trim().trim_end_matches('.').to_ascii_lowercase();

        if canonical.is_empty() {
            return Err(DomainNameError::Empty);
        }
        if canonical.len() > DOMAIN_NAME_MAX_LENGTH {
            return Err(DomainNameError::TooLong(canonical.len()));
        }
        if let Some(c) = canonical
            .chars()
            .find(|c| !(c.is_ascii_alphanumeric() || matches!(c, '-' | '.' | '_' | '*')))
        {
            return Err(DomainNameError::InvalidCharacter(c));
        }
        for label in canonical.split('.') {
            if label.is_empty() {
                return Err(DomainNameError::EmptyLabel);
            }
            if label.len() > DOMAIN_LABEL_MAX_LENGTH {
                return Err(DomainNameError::LabelTooLong);
            }
        }

        Ok(Self(canonical))
    }

    /// Wrap a value read back from storage
    pub(crate) fn from_db(value: String) -> Self {
        Self(value)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Rightmost label, used to pick a WHOIS server
    pub fn tld(&self) -> &str {
        self.0.rsplit('.').next().unwrap_or(&self.0)
    }
}

impl fmt::Display for DomainName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ============================================================================
// Nameservers
// ============================================================================

/// Normalized nameserver set: lowercase, trailing dot stripped,
/// sorted ascending, duplicates removed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Nameservers(Vec<String>);

impl Nameservers {
    pub fn normalized<I, S>(hosts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut hosts: Vec<String> = hosts
            .into_iter()
            .map(|h| h.as_ref().trim().trim_end_matches('.').to_lowercase())
            .filter(|h| !h.is_empty())
            .collect();
        hosts.sort();
        hosts.dedup();
        Self(hosts)
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn into_vec(self) -> Vec<String> {
        self.0
    }
}

impl fmt::Display for Nameservers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.join(", "))
    }
}

// ============================================================================
// Lead Time
// ============================================================================

/// Reminder window ahead of an expiration. At least one day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct LeadTime {
    days: u32,
}

impl LeadTime {
    pub const MIN_DAYS: u32 = 1;

    pub fn from_days(days: u32) -> Option<Self> {
        (days >= Self::MIN_DAYS).then_some(Self { days })
    }

    pub fn days(&self) -> u32 {
        self.days
    }

    pub fn duration(&self) -> Duration {
        Duration::days(i64::from(self.days))
    }

    /// Remaining time below this is critical
    pub fn critical_threshold(&self) -> Duration {
        self.duration() / 3
    }

    /// Remaining time below this is at least a warning
    pub fn warning_threshold(&self) -> Duration {
        self.duration() / 2
    }
}

// ============================================================================
// Urgency
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Urgency {
    Critical,
    Warning,
    Informational,
}

impl Urgency {
    pub fn as_str(&self) -> &'static str {
        match self {
            Urgency::Critical => "critical",
            Urgency::Warning => "warning",
            Urgency::Informational => "informational",
        }
    }
}

impl fmt::Display for Urgency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// DNS Record Type
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecordType {
    A,
    Aaaa,
    Mx,
    Ns,
}

impl RecordType {
    pub fn as_str(&self) -> &'static str {
        match self {
            RecordType::A => "A",
            RecordType::Aaaa => "AAAA",
            RecordType::Mx => "MX",
            RecordType::Ns => "NS",
        }
    }
}

impl fmt::Display for RecordType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_domain_name_canonical_form() {
        let name = DomainName::parse("  Example.COM. ").unwrap();
        assert_eq!(name.as_str(), "example.com");
        assert_eq!(name.tld(), "com");
    }

    #[test]
    fn test_domain_name_rejects_bad_input() {
        assert_eq!(DomainName::parse(""), Err(DomainNameError::Empty));
        assert_eq!(DomainName::parse(" . "), Err(DomainNameError::Empty));
        assert_eq!(
            DomainName::parse("exa mple.com"),
            Err(DomainNameError::InvalidCharacter(' '))
        );
        assert_eq!(
            DomainName::parse("https://example.com"),
            Err(DomainNameError::InvalidCharacter(':'))
        );
        assert_eq!(
            DomainName::parse("a..example.com"),
            Err(DomainNameError::EmptyLabel)
        );
        let long_label = format!("{}.com", "a".repeat(64));
        assert_eq!(
            DomainName::parse(&long_label),
            Err(DomainNameError::LabelTooLong)
        );
    }

    #[test]
    fn test_nameservers_normalization() {
        let ns = Nameservers::normalized(["NS2.Example.com.", "ns1.example.com", "ns1.example.com."]);
        assert_eq!(ns.as_slice(), ["ns1.example.com", "ns2.example.com"]);
        assert_eq!(ns.to_string(), "ns1.example.com, ns2.example.com");
    }

    #[test]
    fn test_nameservers_drop_blank_entries() {
        let ns = Nameservers::normalized(["", " . ", "."]);
        assert!(ns.is_empty());
    }

    #[test]
    fn test_lead_time_thresholds() {
        assert!(LeadTime::from_days(0).is_none());

        let lead = LeadTime::from_days(30).unwrap();
        assert_eq!(lead.duration(), Duration::days(30));
        assert_eq!(lead.critical_threshold(), Duration::days(10));
        assert_eq!(lead.warning_threshold(), Duration::days(15));
        assert!(lead.critical_threshold() < lead.warning_threshold());
    }

    #[test]
    fn test_lead_time_thresholds_for_odd_windows() {
        let lead = LeadTime::from_days(1).unwrap();
        assert_eq!(lead.critical_threshold(), Duration::hours(8));
        assert_eq!(lead.warning_threshold(), Duration::hours(12));
    }
}
