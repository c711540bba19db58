//! Credentials Entity
//!
//! Authentication state for a user, separated from [`User`] so the hash and
//! reset token are only loaded when a use case asks for them.
//!
//! [`User`]: super::user::User

use chrono::{DateTime, Duration, Utc};

use crate::domain::value_object::{user_id::UserId, user_password::UserPassword};

/// Failed-login lockout rule
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LockoutPolicy {
    /// Failures (counted since the last success or expired lock) that trigger a lock
    pub max_attempts: u32,
    pub lock_duration: Duration,
}

impl Default for LockoutPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            lock_duration: Duration::minutes(15),
        }
    }
}

impl LockoutPolicy {
    /// State after one more failed attempt: `(login_attempts, lock_until)`
    ///
    /// A failure after an expired lock restarts the count at 1 and clears the
    /// stale lock. An active lock is never extended.
    pub fn after_failure(
        &self,
        login_attempts: u32,
        lock_until: Option<DateTime<Utc>>,
        now: DateTime<Utc>,
    ) -> (u32, Option<DateTime<Utc>>) {
        match lock_until {
            Some(until) if until <= now => (1, None),
            Some(until) => (login_attempts.saturating_add(1), Some(until)),
            None => {
                let attempts = login_attempts.saturating_add(1);
                let lock = (attempts >= self.max_attempts).then(|| now + self.lock_duration);
                (attempts, lock)
            }
        }
    }
}

#[derive(Debug, Clone)]
pub struct Credentials {
    pub user_id: UserId,
    pub password_hash: UserPassword,
    pub login_attempts: u32,
    pub lock_until: Option<DateTime<Utc>>,
    /// SHA-256 hex of the outstanding reset token
    pub reset_token_hash: Option<String>,
    pub reset_token_expires_at: Option<DateTime<Utc>>,
}

impl Credentials {
    pub fn new(user_id: UserId, password_hash: UserPassword) -> Self {
        Self {
            user_id,
            password_hash,
            login_attempts: 0,
            lock_until: None,
            reset_token_hash: None,
            reset_token_expires_at: None,
        }
    }

    pub fn is_locked(&self, now: DateTime<Utc>) -> bool {
        self.lock_until.is_some_and(|until| until > now)
    }

    pub fn record_failure(&mut self, policy: &LockoutPolicy, now: DateTime<Utc>) {
        let (attempts, lock) = policy.after_failure(self.login_attempts, self.lock_until, now);
        self.login_attempts = attempts;
        self.lock_until = lock;
    }

    pub fn reset_failures(&mut self) {
        self.login_attempts = 0;
        self.lock_until = None;
    }

    pub fn has_failures(&self) -> bool {
        self.login_attempts > 0 || self.lock_until.is_some()
    }

    /// Store a new reset token digest; the fields are always set together
    pub fn set_reset_token(&mut self, token_hash: String, expires_at: DateTime<Utc>) {
        self.reset_token_hash = Some(token_hash);
        self.reset_token_expires_at = Some(expires_at);
    }

    pub fn clear_reset_token(&mut self) {
        self.reset_token_hash = None;
        self.reset_token_expires_at = None;
    }

    /// Whether `token_hash` names the outstanding, unexpired reset token
    pub fn reset_token_matches(&self, token_hash: &str, now: DateTime<Utc>) -> bool {
        match (&self.reset_token_hash, self.reset_token_expires_at) {
            (Some(stored), Some(expires_at)) => stored == token_hash && expires_at > now,
            _ => false,
        }
    }

    pub fn set_password(&mut self, password_hash: UserPassword) {
        self.password_hash = password_hash;
    }
}
