//! RDAP registry source.
//!
//! Queries `{base}/domain/{name}` (rdap.org redirects to the authoritative
//! registry) and decodes the expiration event, nameservers and registrar.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde_json::Value;

use crate::application::ports::RegistrySource;
use crate::domain::entities::Registration;
use crate::domain::services::UNAVAILABLE_PAYLOAD;
use crate::domain::value_objects::{DomainName, Nameservers};
use crate::error::RegistryError;
use crate::infra::http::transport_message;

pub const RDAP_SOURCE: &str = "rdap";

pub struct RdapSource {
    client: Client,
    base_url: String,
}

impl RdapSource {
    pub fn new(client: Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl RegistrySource for RdapSource {
    fn name(&self) -> &'static str {
        RDAP_SOURCE
    }

    async fn lookup(&self, domain: &DomainName) -> Result<Registration, RegistryError> {
        let url = format!("{}/domain/{}", self.base_url, domain);
        let response = self
            .client
            .get(&url)
            .header(reqwest::header::ACCEPT, "application/rdap+json, application/json")
            .send()
            .await
            .map_err(|e| RegistryError::Network(transport_message(&e)))?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(RegistryError::NotFound);
        }
        if !status.is_success() {
            return Err(RegistryError::Network(format!("unexpected status {status}")));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| RegistryError::Network(transport_message(&e)))?;

        parse_rdap(&body)
    }
}

#[derive(Debug, Deserialize)]
struct RdapDomainDto {
    #[serde(default)]
    events: Vec<RdapEventDto>,
    #[serde(default)]
    nameservers: Vec<RdapNameserverDto>,
    #[serde(default)]
    entities: Vec<RdapEntityDto>,
}

#[derive(Debug, Deserialize)]
struct RdapEventDto {
    #[serde(rename = "eventAction")]
    action: String,
    #[serde(rename = "eventDate")]
    date: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RdapNameserverDto {
    #[serde(rename = "ldhName")]
    ldh_name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RdapEntityDto {
    #[serde(default)]
    roles: Vec<String>,
    #[serde(rename = "vcardArray")]
    vcard: Option<Value>,
}

impl RdapEntityDto {
    fn is_registrar(&self) -> bool {
        self.roles.iter().any(|r| r.eq_ignore_ascii_case("registrar"))
    }

    /// `fn` property of a jCard: `["vcard", [["fn", {}, "text", "Name"], ...]]`
    fn formatted_name(&self) -> Option<&str> {
        self.vcard
            .as_ref()?
            .get(1)?
            .as_array()?
            .iter()
            .find(|property| property.get(0).and_then(Value::as_str) == Some("fn"))?
            .get(3)?
            .as_str()
    }
}

/// Decode an RDAP domain object.
pub fn parse_rdap(body: &[u8]) -> Result<Registration, RegistryError> {
    let value: Value = serde_json::from_slice(body)
        .map_err(|e| RegistryError::Parse(format!("invalid RDAP JSON: {e}")))?;
    let dto = RdapDomainDto::deserialize(&value)
        .map_err(|e| RegistryError::Parse(format!("unexpected RDAP shape: {e}")))?;

    let raw = dto
        .events
        .iter()
        .find(|event| event.action.eq_ignore_ascii_case("expiration"))
        .and_then(|event| event.date.as_deref())
        .ok_or(RegistryError::MissingExpiration)?;
    let expiration = DateTime::parse_from_rfc3339(raw)
        .map_err(|e| RegistryError::Parse(format!("bad expiration date {raw:?}: {e}")))?
        .with_timezone(&Utc);

    let nameservers =
        Nameservers::normalized(dto.nameservers.iter().filter_map(|ns| ns.ldh_name.as_deref()));

    let registrar = dto
        .entities
        .iter()
        .find(|entity| entity.is_registrar())
        .and_then(RdapEntityDto::formatted_name)
        .unwrap_or_default()
        .to_string();

    let raw_payload = serde_json::to_string(&value).unwrap_or_else(|e| {
        tracing::warn!(error = %e, "Failed to serialize RDAP payload");
        UNAVAILABLE_PAYLOAD.to_string()
    });

    Ok(Registration {
        expiration,
        nameservers,
        registrar,
        raw_payload,
        source: RDAP_SOURCE,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    fn sample() -> Value {
        json!({
            "objectClassName": "domain",
            "ldhName": "EXAMPLE.COM",
            "events": [
                { "eventAction": "registration", "eventDate": "1995-08-14T04:00:00Z" },
                { "eventAction": "expiration", "eventDate": "2026-08-13T04:00:00Z" },
                { "eventAction": "last update of RDAP database", "eventDate": "2026-01-01T00:00:00Z" }
            ],
            "nameservers": [
                { "objectClassName": "nameserver", "ldhName": "B.IANA-SERVERS.NET" },
                { "objectClassName": "nameserver", "ldhName": "A.IANA-SERVERS.NET" }
            ],
            "entities": [
                {
                    "roles": ["technical"],
                    "vcardArray": ["vcard", [["fn", {}, "text", "Not The Registrar"]]]
                },
                {
                    "roles": ["registrar"],
                    "vcardArray": ["vcard", [
                        ["version", {}, "text", "4.0"],
                        ["fn", {}, "text", "RESERVED-Internet Assigned Numbers Authority"]
                    ]]
                }
            ]
        })
    }

    #[test]
    fn test_parse_rdap_domain() {
        let body = serde_json::to_vec(&sample()).unwrap();
        let registration = parse_rdap(&body).unwrap();

        assert_eq!(
            registration.expiration,
            Utc.with_ymd_and_hms(2026, 8, 13, 4, 0, 0).unwrap()
        );
        assert_eq!(
            registration.nameservers.as_slice(),
            ["a.iana-servers.net", "b.iana-servers.net"]
        );
        assert_eq!(
            registration.registrar,
            "RESERVED-Internet Assigned Numbers Authority"
        );
        assert_eq!(registration.source, RDAP_SOURCE);
        assert!(registration.raw_payload.contains("EXAMPLE.COM"));
    }

    #[test]
    fn test_missing_expiration_event_is_an_error() {
        let mut value = sample();
        value["events"] = json!([{ "eventAction": "registration", "eventDate": "1995-08-14T04:00:00Z" }]);
        let body = serde_json::to_vec(&value).unwrap();

        assert_eq!(parse_rdap(&body).unwrap_err(), RegistryError::MissingExpiration);
    }

    #[test]
    fn test_malformed_payloads() {
        assert!(matches!(parse_rdap(b"<html>"), Err(RegistryError::Parse(_))));

        let mut value = sample();
        value["events"][1]["eventDate"] = json!("next tuesday");
        let body = serde_json::to_vec(&value).unwrap();
        assert!(matches!(parse_rdap(&body), Err(RegistryError::Parse(_))));
    }

    #[test]
    fn test_registrar_is_optional() {
        let mut value = sample();
        value["entities"] = json!([]);
        let body = serde_json::to_vec(&value).unwrap();
        assert_eq!(parse_rdap(&body).unwrap().registrar, "");
    }
}
