//! Authentication configuration.

/// Hard ceiling on access token lifetime (1 hour). Configured values
/// above this are clamped at issuance.
pub const MAX_ACCESS_TOKEN_LIFETIME_SECS: u64 = 3_600;

/// Hard ceiling on refresh session lifetime (7 days).
pub const MAX_REFRESH_TOKEN_LIFETIME_SECS: u64 = 604_800;

/// Configuration for the authentication service.
#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// PEM-encoded Ed25519 private key for JWT signing.
    pub jwt_private_key_pem: String,
    /// PEM-encoded Ed25519 public key for JWT verification.
    pub jwt_public_key_pem: String,
    /// JWT issuer (`iss` claim).
    pub jwt_issuer: String,
    /// Access token lifetime in seconds (default: 3600 = 1 hour).
    pub access_token_lifetime_secs: u64,
    /// Refresh session lifetime in seconds (default: 604800 = 7 days).
    pub refresh_token_lifetime_secs: u64,
    /// Optional pepper prepended to passwords before Argon2id hashing.
    pub pepper: Option<String>,
    /// Minimum password length for policy enforcement.
    pub min_password_length: usize,
}

impl AuthConfig {
    /// Effective access token lifetime, clamped to the hard ceiling.
    pub fn access_lifetime(&self) -> u64 {
        self.access_token_lifetime_secs
            .min(MAX_ACCESS_TOKEN_LIFETIME_SECS)
    }

    /// Effective refresh session lifetime, clamped to the hard ceiling.
    pub fn refresh_lifetime(&self) -> u64 {
        self.refresh_token_lifetime_secs
            .min(MAX_REFRESH_TOKEN_LIFETIME_SECS)
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_private_key_pem: String::new(),
            jwt_public_key_pem: String::new(),
            jwt_issuer: "photoshare".into(),
            access_token_lifetime_secs: 3_600,
            refresh_token_lifetime_secs: 604_800,
            pepper: None,
            min_password_length: 12,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lifetimes_are_clamped() {
        let config = AuthConfig {
            access_token_lifetime_secs: 86_400,
            refresh_token_lifetime_secs: 5_000_000,
            ..Default::default()
        };
        assert_eq!(config.access_lifetime(), MAX_ACCESS_TOKEN_LIFETIME_SECS);
        assert_eq!(config.refresh_lifetime(), MAX_REFRESH_TOKEN_LIFETIME_SECS);
    }
}
