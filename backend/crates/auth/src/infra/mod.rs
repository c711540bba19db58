//! Infrastructure Layer
//!
//! Database, cache and mail adapters.

pub mod mailer;
pub mod memory;
pub mod postgres;
pub mod session_cache;

pub use mailer::{MailSettings, SmtpNotifier};
pub use memory::MemoryUserRepository;
pub use postgres::PgUserRepository;
pub use session_cache::SessionMirror;
