//! Registration Resolver
//!
//! Ordered fallback over registry sources. The first source that yields a
//! registration wins; every failure is kept so the caller can tell
//! "no data anywhere" from "a source is broken".

use std::sync::Arc;

use crate::application::ports::{DnsResolver, RegistrySource};
use crate::domain::entities::{DnsSnapshot, Registration};
use crate::domain::value_objects::{DomainName, RecordType};
use crate::error::{ResolutionError, SourceFailure};

#[derive(Clone)]
pub struct FallbackResolver {
    sources: Vec<Arc<dyn RegistrySource>>,
}

impl FallbackResolver {
    /// Sources are tried in the given order
    pub fn new(sources: Vec<Arc<dyn RegistrySource>>) -> Self {
        Self { sources }
    }

    pub fn source_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.sources.iter().map(|s| s.name())
    }

    pub async fn resolve(&self, domain: &DomainName) -> Result<Registration, ResolutionError> {
        let mut attempts = Vec::with_capacity(self.sources.len());

        for source in &self.sources {
            match source.lookup(domain).await {
                Ok(registration) => {
                    if !attempts.is_empty() {
                        tracing::info!(
                            domain = %domain,
                            source = source.name(),
                            "Registration resolved by fallback source"
                        );
                    }
                    return Ok(registration);
                }
                Err(error) => {
                    tracing::warn!(
                        domain = %domain,
                        source = source.name(),
                        error = %error,
                        "Registry source failed"
                    );
                    attempts.push(SourceFailure {
                        source: source.name(),
                        error,
                    });
                }
            }
        }

        Err(ResolutionError {
            domain: domain.to_string(),
            attempts,
        })
    }
}

/// Resolve the A, AAAA, MX and NS records of `domain` concurrently
pub async fn snapshot_dns(dns: &dyn DnsResolver, domain: &DomainName) -> DnsSnapshot {
    let (a, aaaa, mx, ns) = tokio::join!(
        dns.resolve_records(domain, RecordType::A),
        dns.resolve_records(domain, RecordType::Aaaa),
        dns.resolve_records(domain, RecordType::Mx),
        dns.resolve_records(domain, RecordType::Ns),
    );

    DnsSnapshot { a, aaaa, mx, ns }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::Utc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use crate::domain::value_objects::Nameservers;
    use crate::error::RegistryError;

    struct StubSource {
        name: &'static str,
        answer: Result<&'static str, RegistryError>,
        calls: AtomicUsize,
    }

    impl StubSource {
        fn new(name: &'static str, answer: Result<&'static str, RegistryError>) -> Arc<Self> {
            Arc::new(Self {
                name,
                answer,
                calls: AtomicUsize::new(0),
            })
        }
    }

    #[async_trait]
    impl RegistrySource for StubSource {
        fn name(&self) -> &'static str {
            self.name
        }

        async fn lookup(&self, _domain: &DomainName) -> Result<Registration, RegistryError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.answer.clone().map(|registrar| Registration {
                expiration: Utc::now(),
                nameservers: Nameservers::normalized(["ns1.example.com"]),
                registrar: registrar.to_string(),
                raw_payload: String::new(),
                source: self.name,
            })
        }
    }

    fn domain() -> DomainName {
        DomainName::parse("example.com").unwrap()
    }

    #[tokio::test]
    async fn test_primary_answer_skips_fallback() {
        let rdap = StubSource::new("rdap", Ok("Registrar A"));
        let whois = StubSource::new("whois", Ok("Registrar B"));
        let resolver = FallbackResolver::new(vec![rdap.clone(), whois.clone()]);

        let registration = resolver.resolve(&domain()).await.unwrap();
        assert_eq!(registration.registrar, "Registrar A");
        assert_eq!(registration.source, "rdap");
        assert_eq!(whois.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_falls_back_on_any_failure() {
        let rdap = StubSource::new("rdap", Err(RegistryError::MissingExpiration));
        let whois = StubSource::new("whois", Ok("Registrar B"));
        let resolver = FallbackResolver::new(vec![rdap, whois]);
        assert_eq!(resolver.source_names().collect::<Vec<_>>(), vec!["rdap", "whois"]);

        let registration = resolver.resolve(&domain()).await.unwrap();
        assert_eq!(registration.source, "whois");
    }

    #[tokio::test]
    async fn test_all_sources_failing_keeps_every_attempt() {
        let resolver = FallbackResolver::new(vec![
            StubSource::new("rdap", Err(RegistryError::Network("reset".into()))),
            StubSource::new("whois", Err(RegistryError::NotFound)),
        ]);

        let err = resolver.resolve(&domain()).await.unwrap_err();
        assert_eq!(err.domain, "example.com");
        assert_eq!(
            err.attempts.iter().map(|a| a.source).collect::<Vec<_>>(),
            vec!["rdap", "whois"]
        );
        assert!(!err.no_data_anywhere());
    }

    struct FixedDns;

    #[async_trait]
    impl DnsResolver for FixedDns {
        async fn resolve_records(&self, _domain: &DomainName, record_type: RecordType) -> Vec<String> {
            match record_type {
                RecordType::A => vec!["93.184.215.14".into()],
                RecordType::Ns => vec!["a.iana-servers.net.".into()],
                _ => vec![],
            }
        }
    }

    #[tokio::test]
    async fn test_snapshot_dns_collects_each_type() {
        let snapshot = snapshot_dns(&FixedDns, &domain()).await;
        assert_eq!(snapshot.a, vec!["93.184.215.14"]);
        assert!(snapshot.aaaa.is_empty());
        assert!(snapshot.mx.is_empty());
        assert_eq!(snapshot.ns, vec!["a.iana-servers.net."]);
    }
}
