//! Application Layer
//!
//! Use cases and application services.

pub mod authenticate;
pub mod change_password;
pub mod config;
pub mod login;
pub mod logout;
pub mod manage_users;
pub mod password_reset;
pub mod register;
pub mod token;

// Re-exports
pub use authenticate::AuthenticateUseCase;
pub use change_password::{ChangePasswordInput, ChangePasswordUseCase};
pub use config::AuthConfig;
pub use login::{LoginInput, LoginUseCase};
pub use logout::LogoutUseCase;
pub use manage_users::{ManageUsersUseCase, UpdateUserInput};
pub use password_reset::{
    ForgotPasswordUseCase, ResetPasswordInput, ResetPasswordUseCase, VerifyResetTokenUseCase,
};
pub use register::{RegisterInput, RegisterUseCase};
pub use token::{IssuedSession, TokenError, TokenService};

/// A request field that is present and not blank
pub(crate) fn present(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
