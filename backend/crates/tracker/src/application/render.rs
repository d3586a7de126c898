//! Message Rendering
//!
//! Turns a batch of due assets or nameserver changes into one HTML email.
//! Every renderer returns `None` for an empty batch so callers never send
//! an empty message.

use std::fmt::Write;

use chrono::{DateTime, Duration, Utc};

use crate::domain::entities::{NameserverChangeEvent, TrackedCertificate, TrackedDomain};
use crate::domain::services::classify_urgency;
use crate::domain::value_objects::{LeadTime, Urgency};

/// `MM/DD/YYYY @ hh:mm:ssAM`
pub const DATE_FORMAT: &str = "%m/%d/%Y @ %I:%M:%S%p";

pub const DOMAIN_REMINDER_SUBJECT: &str = "Domains expiring soon";
pub const CERTIFICATE_REMINDER_SUBJECT: &str = "TLS certificates expiring soon";
pub const NAMESERVER_CHANGE_SUBJECT: &str = "Domain nameserver changes detected";

/// A fully rendered message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub subject: String,
    pub html_body: String,
}

pub fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Relative time such as "in 9 days" or "3 hours ago"
pub fn humanize(target: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let delta = target - now;
    let magnitude = delta.abs();

    if magnitude < Duration::minutes(1) {
        return "now".to_string();
    }

    let (count, unit) = if magnitude < Duration::hours(1) {
        (magnitude.num_minutes(), "minute")
    } else if magnitude < Duration::days(1) {
        (magnitude.num_hours(), "hour")
    } else {
        (magnitude.num_days(), "day")
    };
    let plural = if count == 1 { "" } else { "s" };

    if delta > Duration::zero() {
        format!("in {count} {unit}{plural}")
    } else {
        format!("{count} {unit}{plural} ago")
    }
}

fn urgency_markup(urgency: Urgency, text: &str) -> String {
    match urgency {
        Urgency::Critical => format!("<b style='color: red;'>{text}</b>⚠️"),
        Urgency::Warning => format!("<span style='color: orange;'>{text}</span>"),
        Urgency::Informational => text.to_string(),
    }
}

fn page(heading: &str, intro: Option<&str>, items: &str) -> String {
    let mut body = String::from(
        "<!DOCTYPE html>\n<html>\n<head>\n\
         <meta charset=\"UTF-8\">\n\
         <meta name=\"viewport\" content=\"width=device-width, initial-scale=1.0\">\n\
         </head>\n<body>\n",
    );
    let _ = writeln!(body, "<h3>{heading}</h3>");
    if let Some(intro) = intro {
        let _ = writeln!(body, "<p>{intro}</p>");
    }
    let _ = write!(body, "<ul>\n{items}</ul>\n</body>\n</html>\n");
    body
}

/// Reminder for domains inside the lead window
pub fn render_domain_reminders(
    due: &[&TrackedDomain],
    lead: LeadTime,
    dashboard_base: &str,
    now: DateTime<Utc>,
) -> Option<Notification> {
    if due.is_empty() {
        return None;
    }

    let mut items = String::new();
    for domain in due {
        let name = escape_html(domain.domain.as_str());
        let urgency = classify_urgency(domain.expiration, lead, now);
        let _ = writeln!(
            items,
            "<li><a href='{base}/dash/?q={name}'>{name}</a> is expiring on {date} ({when})</li>",
            base = escape_html(dashboard_base),
            date = domain.expiration.format(DATE_FORMAT),
            when = urgency_markup(urgency, &humanize(domain.expiration, now)),
        );
    }

    Some(Notification {
        subject: DOMAIN_REMINDER_SUBJECT.to_string(),
        html_body: page(
            &format!(
                "The following domain(s) are expiring within the next {} days:",
                lead.days()
            ),
            Some("Click a domain to view it in Domain Tracker"),
            &items,
        ),
    })
}

/// Reminder for certificates inside the lead window
pub fn render_certificate_reminders(
    due: &[&TrackedCertificate],
    lead: LeadTime,
    dashboard_base: &str,
    now: DateTime<Utc>,
) -> Option<Notification> {
    if due.is_empty() {
        return None;
    }

    let mut items = String::new();
    for certificate in due {
        let name = escape_html(&certificate.common_name);
        let urgency = classify_urgency(certificate.expiration, lead, now);
        let _ = writeln!(
            items,
            "<li><a href='{base}/dash/tls/?q={name}'>{name}</a> ({host}) is expiring on {date} UTC ({when})</li>",
            base = escape_html(dashboard_base),
            host = escape_html(certificate.host.as_str()),
            date = certificate.expiration.format(DATE_FORMAT),
            when = urgency_markup(urgency, &humanize(certificate.expiration, now)),
        );
    }

    Some(Notification {
        subject: CERTIFICATE_REMINDER_SUBJECT.to_string(),
        html_body: page(
            &format!(
                "The following TLS certificate(s) are expiring within the next {} days:",
                lead.days()
            ),
            Some("Click a certificate to view it in Domain Tracker"),
            &items,
        ),
    })
}

pub fn render_nameserver_changes(changes: &[NameserverChangeEvent]) -> Option<Notification> {
    if changes.is_empty() {
        return None;
    }

    let mut items = String::new();
    for change in changes {
        let _ = writeln!(
            items,
            "<li><b>{domain}</b><br />Old NS: {old}<br />New NS: {new}<br />Checked At: {at}</li><br />",
            domain = escape_html(change.domain.as_str()),
            old = escape_html(&change.previous.to_string()),
            new = escape_html(&change.current.to_string()),
            at = change.detected_at.format(DATE_FORMAT),
        );
    }

    Some(Notification {
        subject: NAMESERVER_CHANGE_SUBJECT.to_string(),
        html_body: page(
            "The following domains' nameservers have changed:",
            None,
            &items,
        ),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use kernel::id::{ClientId, DomainId};

    use crate::domain::entities::DnsSnapshot;
    use crate::domain::value_objects::{DomainName, Nameservers};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap()
    }

    fn tracked(name: &str, expires_in: Duration) -> TrackedDomain {
        TrackedDomain {
            id: DomainId::from_i32(1),
            domain: DomainName::parse(name).unwrap(),
            expiration: now() + expires_in,
            nameservers: Nameservers::default(),
            registrar: String::new(),
            dns: DnsSnapshot::default(),
            client_id: ClientId::from_i32(1),
            raw_whois_data: String::new(),
            registry_source: None,
            notes: None,
        }
    }

    #[test]
    fn test_humanize() {
        let n = now();
        assert_eq!(humanize(n + Duration::days(9), n), "in 9 days");
        assert_eq!(humanize(n + Duration::days(1), n), "in 1 day");
        assert_eq!(humanize(n - Duration::days(3), n), "3 days ago");
        assert_eq!(humanize(n + Duration::hours(5), n), "in 5 hours");
        assert_eq!(humanize(n + Duration::seconds(10), n), "now");
    }

    #[test]
    fn test_escape_html() {
        assert_eq!(
            escape_html("<a href='x'>&\"</a>"),
            "&lt;a href=&#39;x&#39;&gt;&amp;&quot;&lt;/a&gt;"
        );
    }

    #[test]
    fn test_empty_batches_render_nothing() {
        let lead = LeadTime::from_days(30).unwrap();
        assert!(render_domain_reminders(&[], lead, "https://t.example", now()).is_none());
        assert!(render_certificate_reminders(&[], lead, "https://t.example", now()).is_none());
        assert!(render_nameserver_changes(&[]).is_none());
    }

    #[test]
    fn test_domain_reminder_bands_and_links() {
        let lead = LeadTime::from_days(30).unwrap();
        let critical = tracked("critical.example", Duration::days(9));
        let warning = tracked("warning.example", Duration::days(12));
        let info = tracked("info.example", Duration::days(20));

        let message = render_domain_reminders(
            &[&critical, &warning, &info],
            lead,
            "https://tracker.example.com",
            now(),
        )
        .unwrap();

        assert_eq!(message.subject, DOMAIN_REMINDER_SUBJECT);
        let body = &message.html_body;
        assert!(body.contains("within the next 30 days"));
        assert!(body.contains(
            "<a href='https://tracker.example.com/dash/?q=critical.example'>critical.example</a>"
        ));
        assert!(body.contains("<b style='color: red;'>in 9 days</b>⚠️"));
        assert!(body.contains("<span style='color: orange;'>in 12 days</span>"));
        assert!(body.contains("(in 20 days)"));
        assert!(body.contains("is expiring on 03/10/2026 @ 12:00:00PM"));
    }

    #[test]
    fn test_nameserver_change_message() {
        let event = NameserverChangeEvent {
            domain: DomainName::parse("example.com").unwrap(),
            previous: Nameservers::normalized(["ns1.old.net", "ns2.old.net"]),
            current: Nameservers::normalized(["ns1.new.net"]),
            detected_at: now(),
        };

        let message = render_nameserver_changes(&[event]).unwrap();
        assert_eq!(message.subject, NAMESERVER_CHANGE_SUBJECT);
        assert!(message.html_body.contains(
            "<li><b>example.com</b><br />Old NS: ns1.old.net, ns2.old.net\
             <br />New NS: ns1.new.net<br />Checked At: 03/01/2026 @ 12:00:00PM</li>"
        ));
    }
}
