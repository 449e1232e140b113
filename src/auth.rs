//! Admin session: a two-state machine unlocked by the shared secret.
//!
//! `Anonymous -> Admin` when the SHA-256 digest of the submitted secret equals
//! the configured digest. There is no transition back: the session ends when
//! it is dropped. No expiry, no attempt limiting.

use sha2::{Digest, Sha256};
use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum AuthError {
    #[error("admin login is disabled (admin.password_sha256 is empty)")]
    NotConfigured,
    #[error("wrong password")]
    WrongSecret,
    #[error("this action requires the admin session")]
    NotAdmin,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionState {
    #[default]
    Anonymous,
    Admin,
}

/// Hex SHA-256 of a secret, as stored in `admin.password_sha256`.
pub fn hash_secret(secret: &str) -> String {
    format!("{:x}", Sha256::digest(secret.as_bytes()))
}

#[derive(Debug, Clone)]
pub struct Session {
    expected_digest: String,
    state: SessionState,
}

impl Session {
    pub fn new(expected_digest: &str) -> Self {
        Self {
            expected_digest: expected_digest.trim().to_ascii_lowercase(),
            state: SessionState::Anonymous,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn is_admin(&self) -> bool {
        self.state == SessionState::Admin
    }

    /// Try to enter the admin state. A wrong secret leaves the state unchanged.
    pub fn login(&mut self, secret: &str) -> Result<(), AuthError> {
        if self.expected_digest.is_empty() {
            return Err(AuthError::NotConfigured);
        }
        if !digests_equal(&hash_secret(secret), &self.expected_digest) {
            tracing::warn!("admin login rejected");
            return Err(AuthError::WrongSecret);
        }
        self.state = SessionState::Admin;
        Ok(())
    }

    pub fn require_admin(&self) -> Result<(), AuthError> {
        if self.is_admin() {
            Ok(())
        } else {
            Err(AuthError::NotAdmin)
        }
    }
}

/// Compare two hex digests without stopping at the first difference.
fn digests_equal(a: &str, b: &str) -> bool {
    a.len() == b.len()
        && a
            .bytes()
            .zip(b.bytes())
            .fold(0u8, |acc, (x, y)| acc | (x ^ y))
            == 0
}
