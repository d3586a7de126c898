//! Infrastructure Layer
//!
//! Postgres storage and the network adapters behind the application ports.

pub mod doh;
pub mod http;
pub mod postgres;
pub mod rdap;
pub mod smtp;
pub mod tls;
pub mod whois;

pub use doh::DohResolver;
pub use postgres::PgTrackerRepository;
pub use rdap::RdapSource;
pub use smtp::SmtpMailer;
pub use tls::TlsCertificateFetcher;
pub use whois::WhoisSource;
