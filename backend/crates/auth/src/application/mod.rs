//! Application Layer
//!
//! Use cases and application services.

pub mod bootstrap;
pub mod check_session;
pub mod cleanup;
pub mod config;
pub mod login;
pub mod logout;

// Re-exports
pub use bootstrap::EnsureAdminUseCase;
pub use check_session::CheckSessionUseCase;
pub use cleanup::SessionCleanupJob;
pub use config::AuthConfig;
pub use login::{LoginInput, LoginOutput, LoginUseCase};
pub use logout::LogoutUseCase;
