//! Infrastructure Layer
//!
//! Postgres storage for admin accounts and their sessions.

pub mod postgres;

pub use postgres::PgAuthRepository;
