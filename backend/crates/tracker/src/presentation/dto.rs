//! Data Transfer Objects

use chrono::{DateTime, Utc};
use kernel::id::{CertificateId, ClientId, DomainId};
use serde::{Deserialize, Serialize};

use crate::domain::entities::{Client, DnsSnapshot, TrackedCertificate, TrackedDomain};

// ============================================================================
// Requests
// ============================================================================

/// POST /api/add and /api/tlsAddDomain body. Missing fields read as empty
/// and are rejected by the use case with 400.
#[derive(Debug, Deserialize)]
pub struct AddDomainRequest {
    #[serde(default)]
    pub domain: String,
    #[serde(rename = "clientID", default)]
    pub client_id: i32,
    #[serde(default)]
    pub notes: Option<String>,
}

/// POST /api/edit body
#[derive(Debug, Deserialize)]
pub struct EditDomainRequest {
    #[serde(default)]
    pub id: i32,
    #[serde(rename = "clientID", default)]
    pub client_id: i32,
    #[serde(default)]
    pub notes: Option<String>,
}

/// POST /api/clientAdd body
#[derive(Debug, Deserialize)]
pub struct AddClientRequest {
    #[serde(default)]
    pub name: String,
}

// ============================================================================
// Responses
// ============================================================================

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DomainResponse {
    pub id: DomainId,
    pub domain: String,
    pub expiration: DateTime<Utc>,
    pub nameservers: Vec<String>,
    pub registrar: String,
    pub dns: DnsSnapshot,
    #[serde(rename = "clientID")]
    pub client_id: ClientId,
    pub raw_whois_data: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub registry_source: Option<String>,
    pub notes: Option<String>,
}

impl From<TrackedDomain> for DomainResponse {
    fn from(domain: TrackedDomain) -> Self {
        Self {
            id: domain.id,
            domain: domain.domain.to_string(),
            expiration: domain.expiration,
            nameservers: domain.nameservers.into_vec(),
            registrar: domain.registrar,
            dns: domain.dns,
            client_id: domain.client_id,
            raw_whois_data: domain.raw_whois_data,
            registry_source: domain.registry_source,
            notes: domain.notes,
        }
    }
}

/// Certificate listing entry. The DER blob stays server-side.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CertificateResponse {
    pub id: CertificateId,
    pub domain: String,
    pub common_name: String,
    pub expiration: DateTime<Utc>,
    pub authority: String,
    pub client_id: ClientId,
    pub notes: Option<String>,
}

impl From<TrackedCertificate> for CertificateResponse {
    fn from(certificate: TrackedCertificate) -> Self {
        Self {
            id: certificate.id,
            domain: certificate.host.to_string(),
            common_name: certificate.common_name,
            expiration: certificate.expiration,
            authority: certificate.authority,
            client_id: certificate.client_id,
            notes: certificate.notes,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ClientResponse {
    pub id: ClientId,
    pub name: String,
}

impl From<Client> for ClientResponse {
    fn from(client: Client) -> Self {
        Self {
            id: client.id,
            name: client.name,
        }
    }
}

/// Body of the 201 answers: the new record's id plus what was resolved
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatedResponse {
    pub id: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub domain: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub common_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expiration: Option<DateTime<Utc>>,
}

/// Body of the 202 answers
#[derive(Debug, Serialize)]
pub struct AcceptedResponse {
    pub job: &'static str,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::value_objects::{DomainName, Nameservers};
    use chrono::TimeZone;

    #[test]
    fn test_domain_response_field_names() {
        let domain = TrackedDomain {
            id: DomainId::from_i32(3),
            domain: DomainName::parse("example.com").unwrap(),
            expiration: Utc.with_ymd_and_hms(2030, 1, 2, 3, 4, 5).unwrap(),
            nameservers: Nameservers::normalized(["b.ns.example", "a.ns.example"]),
            registrar: "Example Registrar".into(),
            dns: DnsSnapshot::default(),
            client_id: ClientId::from_i32(9),
            raw_whois_data: "{}".into(),
            registry_source: Some("rdap".into()),
            notes: None,
        };

        let json = serde_json::to_value(DomainResponse::from(domain)).unwrap();
        assert_eq!(json["id"], 3);
        assert_eq!(json["clientID"], 9);
        assert_eq!(json["rawWhoisData"], "{}");
        assert_eq!(json["expiration"], "2030-01-02T03:04:05Z");
        assert_eq!(json["nameservers"][0], "a.ns.example");
        assert!(json["notes"].is_null());
    }

    #[test]
    fn test_add_request_defaults() {
        let req: AddDomainRequest = serde_json::from_str(r#"{"domain":"example.com"}"#).unwrap();
        assert_eq!(req.client_id, 0);
        assert!(req.notes.is_none());
    }
}
