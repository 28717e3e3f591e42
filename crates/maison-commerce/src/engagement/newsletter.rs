//! Newsletter subscriptions.

use crate::error::CommerceError;
use serde::{Deserialize, Serialize};

/// Trim and lower-case an email address, then check its shape.
pub fn normalize_email(email: &str) -> Result<String, CommerceError> {
    let email = email.trim().to_lowercase();
    let invalid = || CommerceError::validation("invalid email address");

    if email.len() > 254 || email.chars().any(char::is_whitespace) {
        return Err(invalid());
    }
    let (local, domain) = email.split_once('@').ok_or_else(invalid)?;
    if local.is_empty() || domain.contains('@') {
        return Err(invalid());
    }
    let domain_ok = domain.contains('.')
        && !domain.starts_with('.')
        && !domain.ends_with('.')
        && !domain.contains("..");
    if !domain_ok {
        return Err(invalid());
    }
    Ok(email)
}

/// A newsletter subscriber.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Subscriber {
    pub email: String,
    pub subscribed_at: i64,
    pub unsubscribed_at: Option<i64>,
}

impl Subscriber {
    /// Subscribe a normalized address.
    pub fn new(email: &str, now: i64) -> Result<Self, CommerceError> {
        Ok(Self {
            email: normalize_email(email)?,
            subscribed_at: now,
            unsubscribed_at: None,
        })
    }

    pub fn is_active(&self) -> bool {
        self.unsubscribed_at.is_none()
    }

    /// Re-activate an unsubscribed address. Returns `false` if already active.
    pub fn resubscribe(&mut self, now: i64) -> bool {
        if self.is_active() {
            return false;
        }
        self.subscribed_at = now;
        self.unsubscribed_at = None;
        true
    }

    /// Returns `false` if already unsubscribed.
    pub fn unsubscribe(&mut self, now: i64) -> bool {
        if !self.is_active() {
            return false;
        }
        self.unsubscribed_at = Some(now);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_email() {
        assert_eq!(
            normalize_email("  Asha.Rao@Example.COM ").unwrap(),
            "asha.rao@example.com"
        );
        for bad in ["", "asha", "@example.com", "asha@", "asha@example", "a b@x.com", "a@@x.com", "a@x..com"] {
            assert!(normalize_email(bad).is_err(), "{bad} should be rejected");
        }
    }

    #[test]
    fn test_subscription_lifecycle() {
        let mut sub = Subscriber::new("Fan@Example.com", 1).unwrap();
        assert_eq!(sub.email, "fan@example.com");
        assert!(sub.is_active());
        assert!(!sub.resubscribe(2));

        assert!(sub.unsubscribe(3));
        assert!(!sub.unsubscribe(4));
        assert!(sub.resubscribe(5));
        assert_eq!(sub.subscribed_at, 5);
    }
}
