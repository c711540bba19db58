//! Domain Layer
//!
//! Contains entities, value objects, and the traits of the outbound ports.

pub mod entity;
pub mod notifier;
pub mod repository;
pub mod value_object;

// Re-exports
pub use entity::{
    credentials::{Credentials, LockoutPolicy},
    user::User,
};
pub use notifier::{Notifier, NotifyError};
pub use repository::UserRepository;
