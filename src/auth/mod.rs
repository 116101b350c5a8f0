//! Admin session gate.
//!
//! One configured back-office identity; sessions are short-lived HS512
//! tokens signed with the configured secret. The interface stays the
//! create/validate pair the rest of the system expects, so nothing
//! outside this module cares how the token is produced.

use chrono::{TimeDelta, Utc};
use error_stack::{Result, ResultExt};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha512};
use thiserror::Error;

use crate::config;

static SESSION_ISSUER: &str = "kinesa.admin.session";

const NONCE_CHARSET: &str = "0123456789abcdefghijklmnopqrstuvwxyz";
const NONCE_LEN: usize = 16;

#[derive(Debug, Deserialize, Serialize)]
pub struct SessionClaims {
    pub iat: i64,
    pub exp: i64,
    pub iss: String,
    pub sub: String,
    /// Random per-session value so two sessions issued within the same
    /// second still differ.
    pub nonce: String,
}

impl SessionClaims {
    fn generate(auth: &config::Auth, username: &str) -> Self {
        let now = Utc::now();
        let ttl = TimeDelta::hours(auth.session_ttl_hours.get() as i64);
        Self {
            iat: now.timestamp(),
            exp: (now + ttl).timestamp(),
            iss: SESSION_ISSUER.to_string(),
            sub: username.to_string(),
            nonce: random_string::generate(NONCE_LEN, NONCE_CHARSET),
        }
    }
}

#[derive(Debug, Error)]
#[error("Failed to issue admin session token")]
pub struct CreateSessionError;

/// Issues a signed, expiring session token for the admin identity.
pub fn create_session(auth: &config::Auth, username: &str) -> Result<String, CreateSessionError> {
    let claims = SessionClaims::generate(auth, username);
    let key = EncodingKey::from_secret(auth.session_secret.as_str().as_bytes());
    jsonwebtoken::encode(&Header::new(Algorithm::HS512), &claims, &key)
        .change_context(CreateSessionError)
}

/// Checks signature, expiry and issuer. Any failure is just "not a
/// session"; the caller never learns why.
pub fn validate_session(auth: &config::Auth, token: &str) -> bool {
    let mut validation = Validation::new(Algorithm::HS512);
    validation.leeway = 30;
    validation.validate_exp = true;
    validation.set_issuer(&[SESSION_ISSUER]);
    validation.set_required_spec_claims(&["exp", "iss"]);

    let key = DecodingKey::from_secret(auth.session_secret.as_str().as_bytes());
    let token = token.replace(char::is_whitespace, "");
    jsonwebtoken::decode::<SessionClaims>(&token, &key, &validation).is_ok()
}

/// Compares the supplied credentials against the configured admin
/// identity. The password comparison walks full SHA-512 digests so the
/// time spent does not depend on where the first difference sits.
pub fn verify_credentials(auth: &config::Auth, username: &str, password: &str) -> bool {
    let supplied = hex::encode(Sha512::digest(password.as_bytes()));
    let expected = hex::encode(Sha512::digest(auth.password.as_str().as_bytes()));

    let mut matched = true;
    for (a, b) in supplied.bytes().zip(expected.bytes()) {
        matched &= a == b;
    }

    username == auth.username && matched
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::util::Sensitive;
    use std::num::NonZeroU64;

    fn auth() -> config::Auth {
        config::Auth {
            username: "admin".to_string(),
            password: Sensitive::from("letmein-123456"),
            session_secret: Sensitive::from("0123456789abcdef"),
            session_ttl_hours: NonZeroU64::new(24).unwrap(),
        }
    }

    #[test]
    fn session_round_trip() {
        let auth = auth();
        let token = create_session(&auth, "admin").unwrap();
        assert!(validate_session(&auth, &token));
    }

    #[test]
    fn rejects_tampered_token() {
        let auth = auth();
        let mut token = create_session(&auth, "admin").unwrap();
        token.push('x');
        assert!(!validate_session(&auth, &token));
        assert!(!validate_session(&auth, "not-a-token"));
    }

    #[test]
    fn rejects_token_signed_with_other_secret() {
        let issuing = auth();
        let mut validating = auth();
        validating.session_secret = Sensitive::from("another-secret-key");

        let token = create_session(&issuing, "admin").unwrap();
        assert!(!validate_session(&validating, &token));
    }

    #[test]
    fn rejects_expired_token() {
        let auth = auth();
        let now = Utc::now();
        let claims = SessionClaims {
            iat: (now - TimeDelta::hours(48)).timestamp(),
            exp: (now - TimeDelta::hours(24)).timestamp(),
            iss: SESSION_ISSUER.to_string(),
            sub: "admin".to_string(),
            nonce: "abcdefgh12345678".to_string(),
        };
        let key = EncodingKey::from_secret(auth.session_secret.as_str().as_bytes());
        let token = jsonwebtoken::encode(&Header::new(Algorithm::HS512), &claims, &key).unwrap();

        assert!(!validate_session(&auth, &token));
    }

    #[test]
    fn verifies_credentials() {
        let auth = auth();
        assert!(verify_credentials(&auth, "admin", "letmein-123456"));
        assert!(!verify_credentials(&auth, "admin", "wrong"));
        assert!(!verify_credentials(&auth, "root", "letmein-123456"));
    }
}
