//! TLS certificate fetcher.
//!
//! Completes a verified handshake with `host:443` (webpki roots, no
//! pinning) and decodes the first certificate of the peer chain.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rustls::pki_types::ServerName;
use rustls::{ClientConfig, RootCertStore};
use tokio::net::TcpStream;
use tokio::time::timeout;
use tokio_rustls::TlsConnector;
use x509_parser::prelude::*;

use crate::application::ports::CertificateFetcher;
use crate::domain::entities::LeafCertificate;
use crate::domain::value_objects::DomainName;
use crate::error::CertificateError;

const HTTPS_PORT: u16 = 443;

pub struct TlsCertificateFetcher {
    connector: TlsConnector,
    connect_timeout: Duration,
    handshake_timeout: Duration,
}

impl TlsCertificateFetcher {
    /// # Errors
    ///
    /// Returns an error when the ring provider offers no safe protocol
    /// version.
    pub fn new(connect_timeout: Duration, handshake_timeout: Duration) -> Result<Self, rustls::Error> {
        let mut root_store = RootCertStore::empty();
        root_store.extend(webpki_roots::TLS_SERVER_ROOTS.iter().cloned());

        let config = ClientConfig::builder_with_provider(Arc::new(
            rustls::crypto::ring::default_provider(),
        ))
        .with_safe_default_protocol_versions()?
        .with_root_certificates(root_store)
        .with_no_client_auth();

        Ok(Self {
            connector: TlsConnector::from(Arc::new(config)),
            connect_timeout,
            handshake_timeout,
        })
    }
}

#[async_trait]
impl CertificateFetcher for TlsCertificateFetcher {
    async fn fetch_leaf_certificate(
        &self,
        host: &DomainName,
    ) -> Result<LeafCertificate, CertificateError> {
        let server_name = ServerName::try_from(host.as_str())
            .map_err(|e| CertificateError::Tls(format!("invalid server name: {e}")))?
            .to_owned();

        let stream = timeout(
            self.connect_timeout,
            TcpStream::connect((host.as_str(), HTTPS_PORT)),
        )
        .await
        .map_err(|_| CertificateError::Timeout(self.connect_timeout))?
        .map_err(|e| CertificateError::Connection(e.to_string()))?;

        let tls_stream = timeout(
            self.handshake_timeout,
            self.connector.connect(server_name, stream),
        )
        .await
        .map_err(|_| CertificateError::Timeout(self.handshake_timeout))?
        .map_err(|e| CertificateError::Tls(e.to_string()))?;

        let (_io, connection) = tls_stream.into_inner();
        let leaf = connection
            .peer_certificates()
            .and_then(|chain| chain.first())
            .ok_or(CertificateError::NoPeerCertificate)?;

        let mut parsed = parse_leaf(leaf)?;
        if parsed.common_name.is_empty() {
            // SAN-only certificates carry no subject CN
            parsed.common_name = host.to_string();
        }

        tracing::debug!(
            host = %host,
            common_name = %parsed.common_name,
            not_after = %parsed.not_after,
            "Fetched leaf certificate"
        );
        Ok(parsed)
    }
}

fn first_value<'a, 'b: 'a>(
    mut values: impl Iterator<Item = &'a AttributeTypeAndValue<'b>>,
) -> Option<String> {
    values
        .find_map(|attr| attr.as_str().ok())
        .map(str::to_string)
}

/// Subject CN, expiry and issuer (organization, else CN) of a DER
/// certificate.
pub fn parse_leaf(der: &[u8]) -> Result<LeafCertificate, CertificateError> {
    let (_, cert) =
        X509Certificate::from_der(der).map_err(|e| CertificateError::Parse(e.to_string()))?;

    let common_name = first_value(cert.subject().iter_common_name()).unwrap_or_default();
    let issuer = first_value(cert.issuer().iter_organization())
        .or_else(|| first_value(cert.issuer().iter_common_name()))
        .unwrap_or_default();

    let not_after = DateTime::<Utc>::from_timestamp(cert.validity().not_after.timestamp(), 0)
        .ok_or_else(|| CertificateError::Parse("notAfter out of range".into()))?;

    Ok(LeafCertificate {
        common_name,
        not_after,
        issuer,
        der: der.to_vec(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rcgen::{CertificateParams, DnType, KeyPair};

    fn self_signed(organization: Option<&str>) -> Vec<u8> {
        let mut params = CertificateParams::new(vec!["tracked.example".to_string()]).unwrap();
        params
            .distinguished_name
            .push(DnType::CommonName, "tracked.example");
        if let Some(org) = organization {
            params.distinguished_name.push(DnType::OrganizationName, org);
        }
        params.not_after = rcgen::date_time_ymd(2031, 5, 17);

        let key = KeyPair::generate().unwrap();
        params.self_signed(&key).unwrap().der().to_vec()
    }

    #[test]
    fn test_parse_leaf_fields() {
        let der = self_signed(Some("Example Trust Services"));
        let leaf = parse_leaf(&der).unwrap();

        assert_eq!(leaf.common_name, "tracked.example");
        assert_eq!(leaf.issuer, "Example Trust Services");
        assert_eq!(
            leaf.not_after,
            Utc.with_ymd_and_hms(2031, 5, 17, 0, 0, 0).unwrap()
        );
        assert_eq!(leaf.der, der);
    }

    #[test]
    fn test_issuer_falls_back_to_common_name() {
        let der = self_signed(None);
        assert_eq!(parse_leaf(&der).unwrap().issuer, "tracked.example");
    }

    #[test]
    fn test_garbage_der() {
        assert!(matches!(
            parse_leaf(&[0x30, 0x03, 0x01]),
            Err(CertificateError::Parse(_))
        ));
    }

    #[test]
    fn test_fetcher_builds() {
        assert!(TlsCertificateFetcher::new(Duration::from_secs(1), Duration::from_secs(1)).is_ok());
    }
}
