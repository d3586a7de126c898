//! Platform Crate - Technical Infrastructure
//!
//! This crate provides shared technical foundations:
//! - Configuration snapshot with an explicit reload boundary
//! - Cryptographic utilities (random session tokens)
//! - Password hashing (Argon2id)
//! - Cookie management
//! - Named periodic jobs with run reporting

pub mod config;
pub mod cookie;
pub mod crypto;
pub mod password;
pub mod scheduler;
