//! Domain Entities

use chrono::{DateTime, Utc};
use kernel::id::{CertificateId, ClientId, DomainId};
use serde::{Deserialize, Serialize};

use crate::domain::value_objects::{DomainName, Nameservers};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Client {
    pub id: ClientId,
    pub name: String,
}

/// Registration data for a domain as returned by one registry source.
#[derive(Debug, Clone, PartialEq)]
pub struct Registration {
    pub expiration: DateTime<Utc>,
    pub nameservers: Nameservers,
    pub registrar: String,
    /// Raw registry response, kept for audit
    pub raw_payload: String,
    /// Name of the source that answered ("rdap", "whois")
    pub source: &'static str,
}

/// Point-in-time DNS records for a domain, stored as JSON.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DnsSnapshot {
    #[serde(default)]
    pub a: Vec<String>,
    #[serde(default)]
    pub aaaa: Vec<String>,
    #[serde(default)]
    pub mx: Vec<String>,
    #[serde(default)]
    pub ns: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct TrackedDomain {
    pub id: DomainId,
    pub domain: DomainName,
    pub expiration: DateTime<Utc>,
    pub nameservers: Nameservers,
    pub registrar: String,
    pub dns: DnsSnapshot,
    pub client_id: ClientId,
    pub raw_whois_data: String,
    pub registry_source: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone)]
pub struct NewTrackedDomain {
    pub domain: DomainName,
    pub client_id: ClientId,
    pub notes: Option<String>,
    pub registration: Registration,
    pub dns: DnsSnapshot,
}

/// Identity and validity of the leaf certificate a host presented.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeafCertificate {
    pub common_name: String,
    pub not_after: DateTime<Utc>,
    /// Issuer organization, falling back to the issuer common name
    pub issuer: String,
    pub der: Vec<u8>,
}

#[derive(Debug, Clone)]
pub struct TrackedCertificate {
    pub id: CertificateId,
    pub host: DomainName,
    pub common_name: String,
    pub expiration: DateTime<Utc>,
    pub authority: String,
    pub client_id: ClientId,
    pub raw_data: Vec<u8>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone)]
pub struct NewTrackedCertificate {
    pub host: DomainName,
    pub client_id: ClientId,
    pub notes: Option<String>,
    pub leaf: LeafCertificate,
}

/// A nameserver set that moved between two observations. Lives only for
/// the detection pass that produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NameserverChangeEvent {
    pub domain: DomainName,
    pub previous: Nameservers,
    pub current: Nameservers,
    pub detected_at: DateTime<Utc>,
}
