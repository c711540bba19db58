//! Email Value Object
//!
//! A trimmed, lower-cased address. Used as the login identifier and as the
//! destination for welcome and password reset mail.

use std::fmt;

use kernel::error::app_error::{AppError, AppResult};
use serde::{Deserialize, Serialize};

/// Longest deliverable address (RFC 5321 path limit)
const EMAIL_MAX_LENGTH: usize = 254;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Email(String);

impl Email {
    pub fn new(raw: impl AsRef<str>) -> AppResult<Self> {
        let email = raw.as_ref().trim().to_lowercase();

        if email.chars().count() > EMAIL_MAX_LENGTH || !looks_deliverable(&email) {
            return Err(AppError::bad_request("Please provide a valid email"));
        }

        Ok(Self(email))
    }

    /// Stored values were validated on the way in
    pub fn from_db(email: impl Into<String>) -> Self {
        Self(email.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// `local@domain.tld`: no whitespace, one `@`, a dot inside the domain
fn looks_deliverable(email: &str) -> bool {
    if email.chars().any(char::is_whitespace) {
        return false;
    }

    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };

    !local.is_empty()
        && !domain.contains('@')
        && domain
            .rsplit_once('.')
            .is_some_and(|(host, tld)| !host.is_empty() && !tld.is_empty())
}

impl fmt::Display for Email {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalized() {
        let email = Email::new("  Founder@Example.COM \n").unwrap();
        assert_eq!(email.as_str(), "founder@example.com");
    }

    #[test]
    fn test_shapes() {
        for ok in ["a@b.co", "first.last+tag@mail.example.org"] {
            assert!(Email::new(ok).is_ok(), "{ok}");
        }
        for bad in ["", "plain", "@example.com", "user@", "user@example", "a@@b.com", "a b@c.com", "user@.com"] {
            assert!(Email::new(bad).is_err(), "{bad}");
        }
    }

    #[test]
    fn test_message() {
        let err = Email::new("nope").unwrap_err();
        assert_eq!(err.message(), "Please provide a valid email");
    }
}
