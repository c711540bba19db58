//! Presentation Layer
//!
//! HTTP handlers, DTOs, router, and middleware.

pub mod dto;
pub mod handlers;
pub mod middleware;
pub mod router;

pub use handlers::AuthAppState;
pub use middleware::{
    AuthGate, CurrentUser, OwnerRule, authenticate, optional_authenticate, require_role,
    require_self_or_role,
};
pub use router::{auth_router, auth_router_from_state, auth_router_generic};
