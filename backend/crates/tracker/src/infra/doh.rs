//! DNS-over-HTTPS resolver using the JSON API (`?name=&type=`).

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use crate::application::ports::DnsResolver;
use crate::domain::value_objects::{DomainName, RecordType};
use crate::infra::http::transport_message;

/// `Status` value meaning NOERROR
const DNS_NOERROR: u32 = 0;

pub struct DohResolver {
    client: Client,
    endpoint: String,
}

impl DohResolver {
    pub fn new(client: Client, endpoint: impl Into<String>) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
        }
    }

    async fn query(&self, domain: &DomainName, record_type: RecordType) -> Result<Vec<String>, String> {
        let response = self
            .client
            .get(&self.endpoint)
            .query(&[("name", domain.as_str()), ("type", record_type.as_str())])
            .header(reqwest::header::ACCEPT, "application/dns-json")
            .send()
            .await
            .map_err(|e| transport_message(&e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(format!("unexpected status {status}"));
        }

        let body = response.bytes().await.map_err(|e| transport_message(&e))?;
        parse_doh(&body)
    }
}

#[async_trait]
impl DnsResolver for DohResolver {
    async fn resolve_records(&self, domain: &DomainName, record_type: RecordType) -> Vec<String> {
        match self.query(domain, record_type).await {
            Ok(records) => records,
            Err(error) => {
                tracing::warn!(
                    domain = %domain,
                    record_type = %record_type,
                    error = %error,
                    "DNS lookup failed"
                );
                Vec::new()
            }
        }
    }
}

#[derive(Debug, Deserialize)]
struct DohResponseDto {
    #[serde(rename = "Status")]
    status: u32,
    #[serde(rename = "Answer", default)]
    answer: Vec<DohAnswerDto>,
}

#[derive(Debug, Deserialize)]
struct DohAnswerDto {
    data: String,
}

/// Record values of a NOERROR answer, lowercased. Any other status yields
/// no records.
pub fn parse_doh(body: &[u8]) -> Result<Vec<String>, String> {
    let decoded: DohResponseDto =
        serde_json::from_slice(body).map_err(|e| format!("invalid DoH JSON payload: {e}"))?;

    if decoded.status != DNS_NOERROR {
        return Ok(Vec::new());
    }

    Ok(decoded
        .answer
        .into_iter()
        .map(|answer| answer.data.to_lowercase())
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_noerror_answer() {
        let body = br#"{
            "Status": 0,
            "TC": false,
            "Question": [{ "name": "example.com.", "type": 2 }],
            "Answer": [
                { "name": "example.com.", "type": 2, "TTL": 86400, "data": "B.IANA-SERVERS.NET." },
                { "name": "example.com.", "type": 2, "TTL": 86400, "data": "a.iana-servers.net." }
            ]
        }"#;
        assert_eq!(
            parse_doh(body).unwrap(),
            vec!["b.iana-servers.net.", "a.iana-servers.net."]
        );
    }

    #[test]
    fn test_nxdomain_and_empty_answers() {
        assert!(parse_doh(br#"{ "Status": 3 }"#).unwrap().is_empty());
        assert!(parse_doh(br#"{ "Status": 0 }"#).unwrap().is_empty());
    }

    #[test]
    fn test_garbage_is_an_error() {
        assert!(parse_doh(b"not json").is_err());
    }
}
