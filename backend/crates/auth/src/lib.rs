//! Auth (Authentication) Backend Module
//!
//! Clean Architecture structure:
//! - `domain/` - Entities, value objects, repository traits
//! - `application/` - Use cases, admin bootstrap, session cleanup job
//! - `infra/` - Database implementations
//! - `presentation/` - HTTP handlers, DTOs, router, guard middleware
//!
//! ## Security Model
//! - Passwords hashed with Argon2id
//! - Opaque 256-bit session tokens stored server-side, 24 hour lifetime
//! - Session cookie is HttpOnly, Secure, SameSite=Strict
//! - Exactly one privileged identity: the bootstrapped admin user

pub mod application;
pub mod domain;
pub mod error;
pub mod infra;
pub mod presentation;

// Re-exports for convenience
pub use application::bootstrap::EnsureAdminUseCase;
pub use application::cleanup::SessionCleanupJob;
pub use application::config::AuthConfig;
pub use error::{AuthError, AuthResult};
pub use infra::postgres::PgAuthRepository;
pub use presentation::middleware::{AuthMiddlewareState, require_admin};
pub use presentation::router::auth_router;
