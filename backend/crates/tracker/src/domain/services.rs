//! Domain Services
//!
//! Pure decision logic of the refresh pipeline: nameserver drift,
//! reminder selection, urgency bands and raw payload retention.

use chrono::{DateTime, Utc};

use crate::domain::entities::{TrackedCertificate, TrackedDomain};
use crate::domain::value_objects::{LeadTime, Nameservers, Urgency};

// ============================================================================
// Change Detector
// ============================================================================

/// Compare a stored nameserver set with a freshly resolved one.
///
/// Both sides are normalized first, so order, case and trailing dots never
/// count as a change. Returns the normalized current set alongside.
pub fn detect_change<A, B>(stored: &[A], current: &[B]) -> (bool, Nameservers)
where
    A: AsRef<str>,
    B: AsRef<str>,
{
    let stored = Nameservers::normalized(stored);
    let current = Nameservers::normalized(current);
    (stored != current, current)
}

/// Outcome of checking one domain for nameserver drift
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NameserverCheck {
    /// Nothing stored yet; the domain is skipped
    NotInitialized,
    /// The resolver returned nothing; no comparison is made
    Unavailable,
    Unchanged,
    Changed { current: Nameservers },
}

pub fn check_nameservers<B: AsRef<str>>(stored: &Nameservers, resolved: &[B]) -> NameserverCheck {
    if stored.is_empty() {
        return NameserverCheck::NotInitialized;
    }

    let (changed, current) = detect_change(stored.as_slice(), resolved);

    if current.is_empty() {
        NameserverCheck::Unavailable
    } else if changed {
        NameserverCheck::Changed { current }
    } else {
        NameserverCheck::Unchanged
    }
}

// ============================================================================
// Reminder Batcher
// ============================================================================

/// Anything with an expiration that reminders can be sent for
pub trait Expiring {
    fn expiration(&self) -> DateTime<Utc>;
}

impl Expiring for TrackedDomain {
    fn expiration(&self) -> DateTime<Utc> {
        self.expiration
    }
}

impl Expiring for TrackedCertificate {
    fn expiration(&self) -> DateTime<Utc> {
        self.expiration
    }
}

/// An asset is due once `now + lead` is past its expiration
pub fn is_due(expiration: DateTime<Utc>, lead: LeadTime, now: DateTime<Utc>) -> bool {
    now + lead.duration() > expiration
}

/// Assets that fall inside the reminder window, in input order
pub fn select_due_for_reminder<T: Expiring>(
    assets: &[T],
    lead: LeadTime,
    now: DateTime<Utc>,
) -> Vec<&T> {
    assets
        .iter()
        .filter(|asset| is_due(asset.expiration(), lead, now))
        .collect()
}

/// Band the remaining time: `< lead/3` critical, `< lead/2` warning,
/// everything else informational. Already expired assets are critical.
pub fn classify_urgency(expiration: DateTime<Utc>, lead: LeadTime, now: DateTime<Utc>) -> Urgency {
    let remaining = expiration - now;

    if remaining < lead.critical_threshold() {
        Urgency::Critical
    } else if remaining < lead.warning_threshold() {
        Urgency::Warning
    } else {
        Urgency::Informational
    }
}

// ============================================================================
// Raw payload retention
// ============================================================================

/// Stored in place of a registry payload that could not be serialized
pub const UNAVAILABLE_PAYLOAD: &str = "<unavailable>";

/// Appended to a text payload that was cut to fit the retention cap
pub const TRUNCATION_MARKER: &str = "…[truncated]";

/// Cap a text payload at `max_bytes`, cutting on a UTF-8 boundary and
/// appending [`TRUNCATION_MARKER`]. The result never exceeds `max_bytes`.
pub fn cap_text_payload(raw: String, max_bytes: usize) -> String {
    if raw.len() <= max_bytes {
        return raw;
    }

    let Some(budget) = max_bytes.checked_sub(TRUNCATION_MARKER.len()) else {
        return String::new();
    };

    let mut cut = budget;
    while !raw.is_char_boundary(cut) {
        cut -= 1;
    }

    let mut capped = String::with_capacity(cut + TRUNCATION_MARKER.len());
    capped.push_str(&raw[..cut]);
    capped.push_str(TRUNCATION_MARKER);
    capped
}

/// DER blobs are all or nothing: larger than `max_bytes` stores nothing.
pub fn cap_binary_payload(der: Vec<u8>, max_bytes: usize) -> Vec<u8> {
    if der.len() > max_bytes { Vec::new() } else { der }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn lead(days: u32) -> LeadTime {
        LeadTime::from_days(days).unwrap()
    }

    #[test]
    fn test_detect_change_ignores_order_case_and_trailing_dot() {
        let (changed, current) = detect_change(
            &["ns1.example.com.", "ns2.example.com."],
            &["ns2.example.com", "NS1.example.com"],
        );
        assert!(!changed);
        assert_eq!(current.as_slice(), ["ns1.example.com", "ns2.example.com"]);
    }

    #[test]
    fn test_detect_change_reports_new_set() {
        let (changed, current) =
            detect_change(&["ns1.old.net", "ns2.old.net"], &["ns1.new.net", "ns2.new.net"]);
        assert!(changed);
        assert_eq!(current.as_slice(), ["ns1.new.net", "ns2.new.net"]);
    }

    #[test]
    fn test_check_nameservers_states() {
        let stored = Nameservers::normalized(["ns1.example.com"]);

        assert_eq!(
            check_nameservers(&Nameservers::default(), &["ns1.example.com"]),
            NameserverCheck::NotInitialized
        );
        assert_eq!(
            check_nameservers::<&str>(&stored, &[]),
            NameserverCheck::Unavailable
        );
        assert_eq!(
            check_nameservers(&stored, &["ns1.example.com."]),
            NameserverCheck::Unchanged
        );
        assert_eq!(
            check_nameservers(&stored, &["ns9.example.com."]),
            NameserverCheck::Changed {
                current: Nameservers::normalized(["ns9.example.com"])
            }
        );
    }

    #[test]
    fn test_is_due_boundary() {
        let now = Utc::now();
        // now + 30d == expiration is not "after"
        assert!(!is_due(now + Duration::days(30), lead(30), now));
        assert!(is_due(now + Duration::days(30) - Duration::seconds(1), lead(30), now));
        assert!(is_due(now - Duration::days(1), lead(30), now));
    }

    struct Asset(DateTime<Utc>);

    impl Expiring for Asset {
        fn expiration(&self) -> DateTime<Utc> {
            self.0
        }
    }

    #[test]
    fn test_due_selection_tracks_lead_time() {
        let now = Utc::now();
        let assets: Vec<Asset> = [-3i64, 0, 1, 7, 10, 29, 30, 31, 45, 59, 60, 61, 90]
            .into_iter()
            .flat_map(|days| {
                let at = now + Duration::days(days);
                [Asset(at - Duration::seconds(1)), Asset(at), Asset(at + Duration::seconds(1))]
            })
            .collect();

        let mut previous: Option<Vec<DateTime<Utc>>> = None;
        for days in 1..=60u32 {
            let l = lead(days);
            let selected: Vec<DateTime<Utc>> = select_due_for_reminder(&assets, l, now)
                .into_iter()
                .map(|asset| asset.expiration())
                .collect();

            for asset in &assets {
                let inside = now + l.duration() > asset.0;
                assert_eq!(
                    selected.contains(&asset.0),
                    inside,
                    "lead {days}d, expiration {}",
                    asset.0
                );
            }

            // A shorter lead never selects anything a longer one skips
            if let Some(shorter) = &previous {
                assert!(
                    shorter.iter().all(|at| selected.contains(at)),
                    "lead {days}d dropped an asset selected at {}d",
                    days - 1
                );
            }
            previous = Some(selected);
        }
    }

    #[test]
    fn test_classify_urgency_bands() {
        let now = Utc::now();
        let l = lead(30);

        assert_eq!(classify_urgency(now + Duration::days(9), l, now), Urgency::Critical);
        assert_eq!(classify_urgency(now + Duration::days(10), l, now), Urgency::Warning);
        assert_eq!(classify_urgency(now + Duration::days(14), l, now), Urgency::Warning);
        assert_eq!(
            classify_urgency(now + Duration::days(15), l, now),
            Urgency::Informational
        );
        assert_eq!(classify_urgency(now - Duration::days(2), l, now), Urgency::Critical);
    }

    #[test]
    fn test_urgency_bands_partition_the_axis() {
        let now = Utc::now();
        let l = lead(30);

        let mut previous = Urgency::Critical;
        for hours in -48..(40 * 24) {
            let urgency = classify_urgency(now + Duration::hours(hours), l, now);
            // Bands only ever move towards less urgent as remaining time grows
            assert!(urgency >= previous, "band regressed at {hours}h");
            previous = urgency;

            let remaining = Duration::hours(hours);
            let critical = remaining < l.critical_threshold();
            let warning = remaining < l.warning_threshold();
            // crit ⊂ warn
            assert!(!critical || warning);
            match urgency {
                Urgency::Critical => assert!(critical),
                Urgency::Warning => assert!(!critical && warning),
                Urgency::Informational => assert!(!warning),
            }
        }
    }

    #[test]
    fn test_cap_text_payload() {
        assert_eq!(cap_text_payload("short".into(), 100), "short");

        let raw = "x".repeat(100);
        let capped = cap_text_payload(raw, 50);
        assert!(capped.len() <= 50);
        assert!(capped.ends_with(TRUNCATION_MARKER));

        assert_eq!(cap_text_payload("abcdef".into(), 3), "");
    }

    #[test]
    fn test_cap_text_payload_respects_char_boundaries() {
        // Each 'é' is two bytes
        let raw = "é".repeat(40);
        let capped = cap_text_payload(raw, 30);
        assert!(capped.len() <= 30);
        let body = capped.trim_end_matches(TRUNCATION_MARKER);
        assert!(body.chars().all(|c| c == 'é'));
    }

    #[test]
    fn test_cap_binary_payload() {
        assert_eq!(cap_binary_payload(vec![1, 2, 3], 3), vec![1, 2, 3]);
        assert!(cap_binary_payload(vec![1, 2, 3, 4], 3).is_empty());
    }
}
