//! PostgreSQL Repository Implementations

use chrono::{DateTime, Utc};
use kernel::id::{CertificateId, ClientId, DomainId};
use sqlx::PgPool;
use sqlx::types::Json;

use crate::domain::entities::{
    Client, DnsSnapshot, LeafCertificate, NewTrackedCertificate, NewTrackedDomain, Registration,
    TrackedCertificate, TrackedDomain,
};
use crate::domain::repository::{CertificateRepository, ClientRepository, DomainRepository};
use crate::domain::value_objects::{DomainName, Nameservers};
use crate::error::TrackerResult;

/// PostgreSQL-backed tracker repository
#[derive(Clone)]
pub struct PgTrackerRepository {
    pool: PgPool,
}

impl PgTrackerRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

// ============================================================================
// Client Repository Implementation
// ============================================================================

impl ClientRepository for PgTrackerRepository {
    async fn list_clients(&self) -> TrackerResult<Vec<Client>> {
        let rows = sqlx::query_as::<_, ClientRow>("SELECT id, name FROM clients ORDER BY name")
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.into_iter().map(ClientRow::into_client).collect())
    }

    async fn create_client(&self, name: &str) -> TrackerResult<ClientId> {
        let id: i32 = sqlx::query_scalar("INSERT INTO clients (name) VALUES ($1) RETURNING id")
            .bind(name)
            .fetch_one(&self.pool)
            .await?;

        Ok(ClientId::from_i32(id))
    }

    async fn delete_client(&self, id: ClientId) -> TrackerResult<bool> {
        let deleted = sqlx::query("DELETE FROM clients WHERE id = $1")
            .bind(id.as_i32())
            .execute(&self.pool)
            .await?
            .rows_affected();

        Ok(deleted > 0)
    }
}

// ============================================================================
// Domain Repository Implementation
// ============================================================================

impl DomainRepository for PgTrackerRepository {
    async fn list_domains(&self) -> TrackerResult<Vec<TrackedDomain>> {
        let rows = sqlx::query_as::<_, DomainRow>(
            r#"
            SELECT id, domain, expiration, nameservers, registrar, dns,
                   client_id, raw_whois_data, registry_source, notes
            FROM domains
            ORDER BY expiration
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(DomainRow::into_domain).collect())
    }

    async fn insert_domain(&self, domain: &NewTrackedDomain) -> TrackerResult<DomainId> {
        let registration = &domain.registration;
        let id: i32 = sqlx::query_scalar(
            r#"
            INSERT INTO domains (
                domain, expiration, nameservers, registrar, dns,
                client_id, raw_whois_data, registry_source, notes
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING id
            "#,
        )
        .bind(domain.domain.as_str())
        .bind(registration.expiration)
        .bind(registration.nameservers.as_slice())
        .bind(&registration.registrar)
        .bind(Json(&domain.dns))
        .bind(domain.client_id.as_i32())
        .bind(&registration.raw_payload)
        .bind(registration.source)
        .bind(domain.notes.as_deref())
        .fetch_one(&self.pool)
        .await?;

        Ok(DomainId::from_i32(id))
    }

    async fn update_registration(
        &self,
        id: DomainId,
        registration: &Registration,
        dns: &DnsSnapshot,
    ) -> TrackerResult<bool> {
        let updated = sqlx::query(
            r#"
            UPDATE domains
            SET expiration = $2,
                nameservers = $3,
                registrar = $4,
                dns = $5,
                raw_whois_data = $6,
                registry_source = $7,
                updated_at = now()
            WHERE id = $1
            "#,
        )
        .bind(id.as_i32())
        .bind(registration.expiration)
        .bind(registration.nameservers.as_slice())
        .bind(&registration.registrar)
        .bind(Json(dns))
        .bind(&registration.raw_payload)
        .bind(registration.source)
        .execute(&self.pool)
        .await?
        .rows_affected();

        Ok(updated > 0)
    }

    async fn update_nameservers(
        &self,
        id: DomainId,
        nameservers: &Nameservers,
    ) -> TrackerResult<bool> {
        let updated =
            sqlx::query("UPDATE domains SET nameservers = $2, updated_at = now() WHERE id = $1")
                .bind(id.as_i32())
                .bind(nameservers.as_slice())
                .execute(&self.pool)
                .await?
                .rows_affected();

        Ok(updated > 0)
    }

    async fn update_domain_metadata(
        &self,
        id: DomainId,
        client_id: ClientId,
        notes: Option<&str>,
    ) -> TrackerResult<bool> {
        let updated = sqlx::query(
            "UPDATE domains SET client_id = $2, notes = $3, updated_at = now() WHERE id = $1",
        )
        .bind(id.as_i32())
        .bind(client_id.as_i32())
        .bind(notes)
        .execute(&self.pool)
        .await?
        .rows_affected();

        Ok(updated > 0)
    }

    async fn delete_domain(&self, id: DomainId) -> TrackerResult<bool> {
        let deleted = sqlx::query("DELETE FROM domains WHERE id = $1")
            .bind(id.as_i32())
            .execute(&self.pool)
            .await?
            .rows_affected();

        Ok(deleted > 0)
    }
}

// ============================================================================
// Certificate Repository Implementation
// ============================================================================

impl CertificateRepository for PgTrackerRepository {
    async fn list_certificates(&self) -> TrackerResult<Vec<TrackedCertificate>> {
        let rows = sqlx::query_as::<_, CertificateRow>(
            r#"
            SELECT id, domain, common_name, expiration, authority, client_id, raw_data, notes
            FROM crts
            ORDER BY expiration
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(CertificateRow::into_certificate).collect())
    }

    async fn insert_certificate(
        &self,
        certificate: &NewTrackedCertificate,
    ) -> TrackerResult<CertificateId> {
        let leaf = &certificate.leaf;
        let id: i32 = sqlx::query_scalar(
            r#"
            INSERT INTO crts (domain, common_name, expiration, authority, client_id, raw_data, notes)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id
            "#,
        )
        .bind(certificate.host.as_str())
        .bind(&leaf.common_name)
        .bind(leaf.not_after)
        .bind(&leaf.issuer)
        .bind(certificate.client_id.as_i32())
        .bind(leaf.der.as_slice())
        .bind(certificate.notes.as_deref())
        .fetch_one(&self.pool)
        .await?;

        Ok(CertificateId::from_i32(id))
    }

    async fn update_certificate(
        &self,
        id: CertificateId,
        leaf: &LeafCertificate,
    ) -> TrackerResult<bool> {
        let updated = sqlx::query(
            r#"
            UPDATE crts
            SET common_name = $2,
                expiration = $3,
                authority = $4,
                raw_data = $5,
                updated_at = now()
            WHERE id = $1
            "#,
        )
        .bind(id.as_i32())
        .bind(&leaf.common_name)
        .bind(leaf.not_after)
        .bind(&leaf.issuer)
        .bind(leaf.der.as_slice())
        .execute(&self.pool)
        .await?
        .rows_affected();

        Ok(updated > 0)
    }

    async fn delete_certificate(&self, id: CertificateId) -> TrackerResult<bool> {
        let deleted = sqlx::query("DELETE FROM crts WHERE id = $1")
            .bind(id.as_i32())
            .execute(&self.pool)
            .await?
            .rows_affected();

        Ok(deleted > 0)
    }
}

// ============================================================================
// Row Types
// ============================================================================

#[derive(sqlx::FromRow)]
struct ClientRow {
    id: i32,
    name: String,
}

impl ClientRow {
    fn into_client(self) -> Client {
        Client {
            id: ClientId::from_i32(self.id),
            name: self.name,
        }
    }
}

#[derive(sqlx::FromRow)]
struct DomainRow {
    id: i32,
    domain: String,
    expiration: DateTime<Utc>,
    nameservers: Vec<String>,
    registrar: String,
    dns: Json<DnsSnapshot>,
    client_id: i32,
    raw_whois_data: String,
    registry_source: Option<String>,
    notes: Option<String>,
}

impl DomainRow {
    fn into_domain(self) -> TrackedDomain {
        TrackedDomain {
            id: DomainId::from_i32(self.id),
            domain: DomainName::from_db(self.domain),
            expiration: self.expiration,
            nameservers: Nameservers::normalized(self.nameservers),
            registrar: self.registrar,
            dns: self.dns.0,
            client_id: ClientId::from_i32(self.client_id),
            raw_whois_data: self.raw_whois_data,
            registry_source: self.registry_source,
            notes: self.notes,
        }
    }
}

#[derive(sqlx::FromRow)]
struct CertificateRow {
    id: i32,
    domain: String,
    common_name: String,
    expiration: DateTime<Utc>,
    authority: String,
    client_id: i32,
    raw_data: Vec<u8>,
    notes: Option<String>,
}

impl CertificateRow {
    fn into_certificate(self) -> TrackedCertificate {
        TrackedCertificate {
            id: CertificateId::from_i32(self.id),
            host: DomainName::from_db(self.domain),
            common_name: self.common_name,
            expiration: self.expiration,
            authority: self.authority,
            client_id: ClientId::from_i32(self.client_id),
            raw_data: self.raw_data,
            notes: self.notes,
        }
    }
}
