//! Principal assertion signing and verification.

use base64::Engine as _;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use hmac::{Hmac, Mac};
use sha2::Sha256;

use crate::domain::entities::{Principal, Role};
use crate::error::AppError;
use serde_json::json;

type HmacSha256 = Hmac<Sha256>;

/// Issues and verifies signed principal assertions.
///
/// An assertion has the form `base64url(user_id).ROLE.hex(mac)` where the MAC is
/// HMAC-SHA256 over `base64url(user_id).ROLE`, keyed by `signing_secret`. The
/// host application's login flow issues an assertion; request handlers verify it
/// and pass the resulting [`Principal`] to the services. A role therefore never
/// comes from unsigned request data.
pub struct AuthService {
    signing_secret: String,
}

impl AuthService {
    /// Creates a new authentication service.
    ///
    /// `signing_secret` must match the value used when assertions were issued.
    pub fn new(signing_secret: String) -> Self {
        Self { signing_secret }
    }

    fn mac(&self) -> HmacSha256 {
        HmacSha256::new_from_slice(self.signing_secret.as_bytes())
            .expect("HMAC accepts any key length")
    }

    /// Signs an assertion for `user_id` with `role`.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Validation`] if `user_id` is blank.
    pub fn issue(&self, user_id: &str, role: Role) -> Result<String, AppError> {
        if user_id.trim().is_empty() {
            return Err(AppError::bad_request(
                "User id must not be empty",
                json!({}),
            ));
        }

        let payload = format!("{}.{}", URL_SAFE_NO_PAD.encode(user_id), role.as_str());
        let mut mac = self.mac();
        mac.update(payload.as_bytes());
        let signature = hex::encode(mac.finalize().into_bytes());

        Ok(format!("{payload}.{signature}"))
    }

    /// Verifies an assertion and returns the principal it names.
    ///
    /// The signature is compared in constant time.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Unauthorized`] if the assertion is malformed, names an
    /// unknown role, or carries a signature that does not match.
    pub fn verify(&self, assertion: &str) -> Result<Principal, AppError> {
        let unauthorized = |reason: &str| {
            tracing::warn!(reason, "Rejected principal assertion");
            AppError::unauthorized("Unauthorized", json!({ "reason": reason }))
        };

        let mut parts = assertion.trim().splitn(3, '.');
        let (Some(encoded_user), Some(role), Some(signature)) =
            (parts.next(), parts.next(), parts.next())
        else {
            return Err(unauthorized("Malformed assertion"));
        };

        let signature = hex::decode(signature).map_err(|_| unauthorized("Malformed signature"))?;

        let mut mac = self.mac();
        mac.update(format!("{encoded_user}.{role}").as_bytes());
        mac.verify_slice(&signature)
            .map_err(|_| unauthorized("Invalid signature"))?;

        let role = Role::parse(role).ok_or_else(|| unauthorized("Unknown role"))?;
        let user_id = URL_SAFE_NO_PAD
            .decode(encoded_user)
            .ok()
            .and_then(|bytes| String::from_utf8(bytes).ok())
            .filter(|id| !id.trim().is_empty())
            .ok_or_else(|| unauthorized("Malformed user id"))?;

        Ok(Principal::new(user_id, role))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service() -> AuthService {
        AuthService::new("test-signing-secret".to_string())
    }

    #[test]
    fn test_issue_then_verify() {
        let service = service();

        let assertion = service.issue("user-42", Role::User).unwrap();
        let principal = service.verify(&assertion).unwrap();

        assert_eq!(principal.user_id(), "user-42");
        assert_eq!(principal.role(), Role::User);
    }

    #[test]
    fn test_user_id_with_dots() {
        let service = service();

        let assertion = service.issue("alice.smith@example.com", Role::Admin).unwrap();
        let principal = service.verify(&assertion).unwrap();

        assert_eq!(principal.user_id(), "alice.smith@example.com");
        assert!(principal.is_admin());
    }

    #[test]
    fn test_role_tampering_is_rejected() {
        let service = service();

        let assertion = service.issue("user-42", Role::User).unwrap();
        let forged = assertion.replacen(".USER.", ".ADMIN.", 1);

        let result = service.verify(&forged);
        assert!(matches!(result, Err(AppError::Unauthorized { .. })));
    }

    #[test]
    fn test_secret_matters() {
        let issuer = AuthService::new("secret-a".to_string());
        let verifier = AuthService::new("secret-b".to_string());

        let assertion = issuer.issue("user-42", Role::User).unwrap();
        assert!(verifier.verify(&assertion).is_err());
    }

    #[test]
    fn test_malformed_assertions() {
        let service = service();

        for input in ["", "abc", "abc.USER", "abc.USER.zz", "abc.USER.00"] {
            assert!(
                matches!(service.verify(input), Err(AppError::Unauthorized { .. })),
                "accepted {input:?}"
            );
        }
    }

    #[test]
    fn test_blank_user_id_cannot_be_issued() {
        assert!(matches!(
            service().issue("  ", Role::User),
            Err(AppError::Validation { .. })
        ));
    }
}
