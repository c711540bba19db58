//! User Entity
//!
//! Profile data that is safe to hand to clients.
//! The password hash and lockout/reset state live in [`Credentials`].
//!
//! [`Credentials`]: super::credentials::Credentials

use chrono::{DateTime, Utc};

use crate::domain::value_object::{
    email::Email, user_id::UserId, user_name::UserName, user_role::UserRole,
};

#[derive(Debug, Clone)]
pub struct User {
    pub user_id: UserId,
    /// Display handle (unique)
    pub user_name: UserName,
    /// Login identifier (unique)
    pub email: Email,
    pub user_role: UserRole,
    /// Inactive users cannot authenticate or reset their password
    pub is_active: bool,
    /// Last successful login time
    pub last_login_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Create a new, active user
    pub fn new(user_name: UserName, email: Email, user_role: UserRole) -> Self {
        let now = Utc::now();

        Self {
            user_id: UserId::new(),
            user_name,
            email,
            user_role,
            is_active: true,
            last_login_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Record successful login
    pub fn record_login(&mut self, now: DateTime<Utc>) {
        self.last_login_at = Some(now);
        self.updated_at = now;
    }

    pub fn set_role(&mut self, role: UserRole) {
        self.user_role = role;
        self.updated_at = Utc::now();
    }

    pub fn set_active(&mut self, is_active: bool) {
        self.is_active = is_active;
        self.updated_at = Utc::now();
    }

    pub fn set_user_name(&mut self, user_name: UserName) {
        self.user_name = user_name;
        self.updated_at = Utc::now();
    }

    pub fn set_email(&mut self, email: Email) {
        self.email = email;
        self.updated_at = Utc::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> User {
        User::new(
            UserName::new("founder").unwrap(),
            Email::new("founder@example.com").unwrap(),
            UserRole::User,
        )
    }

    #[test]
    fn test_new_user_is_active_without_login() {
        let user = sample();
        assert!(user.is_active);
        assert!(user.last_login_at.is_none());
        assert_eq!(user.created_at, user.updated_at);
    }

    #[test]
    fn test_record_login() {
        let mut user = sample();
        let now = Utc::now();
        user.record_login(now);
        assert_eq!(user.last_login_at, Some(now));
        assert_eq!(user.updated_at, now);
    }
}
