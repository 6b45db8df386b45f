//! Identity verification boundary.
//!
//! Token issuance and validation belong to an external identity provider;
//! the server only asks "does this token prove this user id" and gets a
//! yes/no back. Refused connects never reach the session registry or the
//! simulation.

/// Decides whether a connect handshake is authenticated.
pub trait Verifier: Send + Sync {
    fn verify(&self, user_id: &str, token: &str) -> bool;
}

/// Accepts tokens equal to a shared secret configured at startup. Stands in
/// for a real identity provider in self-hosted deployments.
pub struct SharedSecretVerifier {
    secret: String,
}

impl SharedSecretVerifier {
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
        }
    }
}

impl Verifier for SharedSecretVerifier {
    fn verify(&self, user_id: &str, token: &str) -> bool {
        !user_id.is_empty() && token == self.secret
    }
}

/// Accepts everyone. For local development only.
pub struct AllowAll;

impl Verifier for AllowAll {
    fn verify(&self, user_id: &str, _token: &str) -> bool {
        !user_id.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shared_secret_accepts_matching_token() {
        let verifier = SharedSecretVerifier::new("hunter2");
        assert!(verifier.verify("alice", "hunter2"));
    }

    #[test]
    fn test_shared_secret_rejects_wrong_token() {
        let verifier = SharedSecretVerifier::new("hunter2");
        assert!(!verifier.verify("alice", "wrong"));
        assert!(!verifier.verify("alice", ""));
    }

    #[test]
    fn test_empty_user_id_always_rejected() {
        let verifier = SharedSecretVerifier::new("hunter2");
        assert!(!verifier.verify("", "hunter2"));
        assert!(!AllowAll.verify("", "anything"));
    }

    #[test]
    fn test_allow_all_accepts_any_token() {
        assert!(AllowAll.verify("alice", ""));
        assert!(AllowAll.verify("bob", "whatever"));
    }
}
