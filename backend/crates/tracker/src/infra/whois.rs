//! WHOIS registry source (fallback).
//!
//! Plain-text protocol on TCP port 43. The root server names the TLD's
//! registry server (`refer:`); a thin registry that only points at the
//! registrar (`Registrar WHOIS Server:`) is followed once.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::time::timeout;

use crate::application::ports::RegistrySource;
use crate::domain::entities::Registration;
use crate::domain::value_objects::{DomainName, Nameservers};
use crate::error::RegistryError;

pub const WHOIS_SOURCE: &str = "whois";

const WHOIS_PORT: u16 = 43;
const MAX_RESPONSE_BYTES: u64 = 1024 * 1024;

pub struct WhoisSource {
    root_server: String,
    connect_timeout: Duration,
    read_timeout: Duration,
}

impl WhoisSource {
    pub fn new(root_server: impl Into<String>, connect_timeout: Duration, read_timeout: Duration) -> Self {
        Self {
            root_server: root_server.into(),
            connect_timeout,
            read_timeout,
        }
    }

    async fn query(&self, server: &str, query: &str) -> Result<String, RegistryError> {
        let mut stream = timeout(self.connect_timeout, TcpStream::connect((server, WHOIS_PORT)))
            .await
            .map_err(|_| RegistryError::Network(format!("connect to {server} timed out")))?
            .map_err(|e| RegistryError::Network(format!("connect to {server}: {e}")))?;

        let exchange = async {
            stream.write_all(format!("{query}\r\n").as_bytes()).await?;
            let mut buf = Vec::new();
            (&mut stream).take(MAX_RESPONSE_BYTES).read_to_end(&mut buf).await?;
            Ok::<_, std::io::Error>(buf)
        };

        let buf = timeout(self.read_timeout, exchange)
            .await
            .map_err(|_| RegistryError::Network(format!("read from {server} timed out")))?
            .map_err(|e| RegistryError::Network(format!("read from {server}: {e}")))?;

        Ok(String::from_utf8_lossy(&buf).into_owned())
    }
}

#[async_trait]
impl RegistrySource for WhoisSource {
    fn name(&self) -> &'static str {
        WHOIS_SOURCE
    }

    async fn lookup(&self, domain: &DomainName) -> Result<Registration, RegistryError> {
        let root = self.query(&self.root_server, domain.tld()).await?;
        let registry_server = parse_whois_response(&root)
            .referral
            .ok_or_else(|| RegistryError::Unsupported(domain.tld().to_string()))?;

        let response = self.query(&registry_server, domain.as_str()).await?;
        let mut record = parse_whois_response(&response);
        let mut raw_payload = response;

        if record.expiration.is_none() {
            if let Some(registrar_server) = record
                .registrar_server
                .clone()
                .filter(|s| !s.eq_ignore_ascii_case(&registry_server))
            {
                tracing::debug!(
                    domain = %domain,
                    server = %registrar_server,
                    "Following registrar WHOIS referral"
                );
                let response = self.query(&registrar_server, domain.as_str()).await?;
                let referred = parse_whois_response(&response);
                raw_payload.push_str("\n\n");
                raw_payload.push_str(&response);
                record = record.merge(referred);
            }
        }

        record.into_registration(raw_payload)
    }
}

/// Fields extracted from one WHOIS response
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WhoisRecord {
    pub expiration: Option<DateTime<Utc>>,
    pub nameservers: Vec<String>,
    pub registrar: Option<String>,
    /// `refer:` / `whois:` from a root server answer
    pub referral: Option<String>,
    /// `Registrar WHOIS Server:` from a registry answer
    pub registrar_server: Option<String>,
    pub not_found: bool,
}

impl WhoisRecord {
    /// Fill gaps in `self` from a registrar answer
    fn merge(mut self, other: WhoisRecord) -> WhoisRecord {
        if other.expiration.is_some() {
            self.expiration = other.expiration;
        }
        if self.nameservers.is_empty() {
            self.nameservers = other.nameservers;
        }
        if self.registrar.is_none() {
            self.registrar = other.registrar;
        }
        self.not_found = self.not_found && other.not_found;
        self
    }

    fn into_registration(self, raw_payload: String) -> Result<Registration, RegistryError> {
        let Some(expiration) = self.expiration else {
            return Err(if self.not_found {
                RegistryError::NotFound
            } else {
                RegistryError::MissingExpiration
            });
        };

        Ok(Registration {
            expiration,
            nameservers: Nameservers::normalized(&self.nameservers),
            registrar: self.registrar.unwrap_or_default(),
            raw_payload,
            source: WHOIS_SOURCE,
        })
    }
}

const EXPIRY_KEYS: &[&str] = &[
    "registry expiry date",
    "registrar registration expiration date",
    "expiration date",
    "expiry date",
    "expiration time",
    "expire date",
    "expires",
    "expires on",
    "paid-till",
    "renewal date",
];

const NAMESERVER_KEYS: &[&str] = &["name server", "nameserver", "nserver", "name servers"];

const REGISTRAR_KEYS: &[&str] = &["registrar", "sponsoring registrar", "registrar name"];

const NOT_FOUND_MARKERS: &[&str] = &[
    "no match for",
    "not found",
    "no data found",
    "no entries found",
    "status: free",
    "status: available",
];

pub fn parse_whois_response(text: &str) -> WhoisRecord {
    let mut record = WhoisRecord::default();

    for line in text.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('%') || line.starts_with('#') {
            continue;
        }
        let Some((key, value)) = line.split_once(':') else {
            continue;
        };
        let key = key.trim().to_ascii_lowercase();
        let value = value.trim();
        if value.is_empty() {
            continue;
        }

        if EXPIRY_KEYS.contains(&key.as_str()) {
            if record.expiration.is_none() {
                record.expiration = parse_whois_date(value);
            }
        } else if NAMESERVER_KEYS.contains(&key.as_str()) {
            if let Some(host) = value.split_whitespace().next() {
                record.nameservers.push(host.to_string());
            }
        } else if REGISTRAR_KEYS.contains(&key.as_str()) {
            record.registrar.get_or_insert_with(|| value.to_string());
        } else if key == "refer" || key == "whois" {
            record.referral.get_or_insert_with(|| value.to_ascii_lowercase());
        } else if key == "registrar whois server" {
            let server = value
                .trim_start_matches("http://")
                .trim_start_matches("https://")
                .trim_end_matches('/')
                .to_ascii_lowercase();
            record.registrar_server.get_or_insert(server);
        }
    }

    if record.expiration.is_none() {
        let lowered = text.to_ascii_lowercase();
        record.not_found = NOT_FOUND_MARKERS.iter().any(|m| lowered.contains(m));
    }

    record
}

/// Dates seen across registries, assumed UTC when no offset is given.
pub fn parse_whois_date(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim().trim_end_matches("UTC").trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.with_timezone(&Utc));
    }

    const DATETIME_FORMATS: &[&str] = &[
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y.%m.%d %H:%M:%S",
        "%d/%m/%Y %H:%M:%S",
    ];
    for format in DATETIME_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(value, format) {
            return Some(naive.and_utc());
        }
    }

    let date = value.split_whitespace().next()?;
    const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%d-%b-%Y", "%Y.%m.%d", "%d.%m.%Y", "%Y/%m/%d"];
    DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(date, format).ok())
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}
