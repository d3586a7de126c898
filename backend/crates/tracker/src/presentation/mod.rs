//! Presentation Layer
//!
//! HTTP handlers, DTOs and the guarded dashboard router.

pub mod dto;
pub mod handlers;
pub mod router;

pub use handlers::TrackerAppState;
pub use router::tracker_router;
