//! Configuration for ID token issuance and authorization codes.
//!
//! The ID token lifetime is not configurable; it is fixed at
//! [`ID_TOKEN_LIFETIME_SECS`](crate::oidc::ID_TOKEN_LIFETIME_SECS).

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::token::SigningAlgorithm;

/// Longest accepted authorization code lifetime (RFC 6749 §4.1.2).
pub const MAX_AUTHORIZATION_CODE_LIFETIME: Duration = Duration::from_secs(600);

/// Root configuration.
///
/// # Example (TOML)
///
/// ```toml
/// issuer = "https://idp.example.com/oidc"
///
/// [authorization_code]
/// lifetime = "60s"
/// reaper_interval = "1m"
///
/// [signing]
/// algorithm = "RS256"
/// default_certificate = "default"
/// ```
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct AuthConfig {
    /// Issuer identifier placed in the `iss` claim.
    /// When unset, ID tokens carry a null issuer.
    pub issuer: Option<String>,

    /// Authorization code configuration.
    pub authorization_code: AuthorizationCodeConfig,

    /// Token signing configuration.
    pub signing: SigningConfig,
}

/// Authorization code lifecycle configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AuthorizationCodeConfig {
    /// Time between issuance and expiry of a code, at most
    /// [`MAX_AUTHORIZATION_CODE_LIFETIME`].
    #[serde(with = "humantime_serde")]
    pub lifetime: Duration,

    /// How often the background reaper purges expired codes.
    #[serde(with = "humantime_serde")]
    pub reaper_interval: Duration,

    /// How many fresh code values to try when the store reports a collision.
    pub max_create_attempts: u32,
}

impl Default for AuthorizationCodeConfig {
    fn default() -> Self {
        Self {
            lifetime: Duration::from_secs(60),
            reaper_interval: Duration::from_secs(60),
            max_create_attempts: 3,
        }
    }
}

/// Token signing configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SigningConfig {
    /// Algorithm for generated default keys.
    /// Supported: "RS256", "RS384", "ES384"
    pub algorithm: String,

    /// Identifier of the process-wide default certificate.
    pub default_certificate: String,
}

impl Default for SigningConfig {
    fn default() -> Self {
        Self {
            algorithm: "RS256".to_string(),
            default_certificate: "default".to_string(),
        }
    }
}

impl SigningConfig {
    /// Parses the configured algorithm.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` for unsupported algorithm names.
    pub fn signing_algorithm(&self) -> Result<SigningAlgorithm, ConfigError> {
        match self.algorithm.as_str() {
            "RS256" => Ok(SigningAlgorithm::RS256),
            "RS384" => Ok(SigningAlgorithm::RS384),
            "ES384" => Ok(SigningAlgorithm::ES384),
            other => Err(ConfigError::InvalidValue(format!(
                "Invalid signing algorithm: '{}'. Must be RS256, RS384, or ES384",
                other
            ))),
        }
    }
}

/// Configuration validation errors.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ConfigError {
    /// An invalid configuration value was provided.
    #[error("Invalid configuration value: {0}")]
    InvalidValue(String),

    /// The configuration source could not be parsed.
    #[error("Failed to parse configuration: {0}")]
    Parse(String),
}

impl AuthConfig {
    /// Parses and validates a TOML document.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Parse` for malformed TOML and
    /// `ConfigError::InvalidValue` if validation fails.
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(source).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` if:
    /// - The issuer is present but empty
    /// - Any authorization code duration or attempt count is zero
    /// - The code lifetime exceeds [`MAX_AUTHORIZATION_CODE_LIFETIME`]
    /// - The signing algorithm is not supported
    /// - The default certificate identifier is empty
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.issuer.as_deref().is_some_and(str::is_empty) {
            return Err(ConfigError::InvalidValue(
                "issuer cannot be empty".to_string(),
            ));
        }

        let code = &self.authorization_code;
        if code.lifetime.is_zero() {
            return Err(ConfigError::InvalidValue(
                "authorization_code.lifetime must be > 0".to_string(),
            ));
        }
        if code.lifetime > MAX_AUTHORIZATION_CODE_LIFETIME {
            return Err(ConfigError::InvalidValue(format!(
                "authorization_code.lifetime must be at most {}s",
                MAX_AUTHORIZATION_CODE_LIFETIME.as_secs()
            )));
        }
        if code.reaper_interval.is_zero() {
            return Err(ConfigError::InvalidValue(
                "authorization_code.reaper_interval must be > 0".to_string(),
            ));
        }
        if code.max_create_attempts == 0 {
            return Err(ConfigError::InvalidValue(
                "authorization_code.max_create_attempts must be > 0".to_string(),
            ));
        }

        self.signing.signing_algorithm()?;

        if self.signing.default_certificate.is_empty() {
            return Err(ConfigError::InvalidValue(
                "signing.default_certificate cannot be empty".to_string(),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_validates() {
        let config = AuthConfig::default();
        assert!(config.validate().is_ok());
        assert!(config.issuer.is_none());
        assert_eq!(config.signing.algorithm, "RS256");
        assert_eq!(
            config.authorization_code.lifetime,
            Duration::from_secs(60)
        );
    }

    #[test]
    fn test_empty_issuer_fails_validation() {
        let mut config = AuthConfig::default();
        config.issuer = Some(String::new());
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("issuer"));
    }

    #[test]
    fn test_invalid_algorithm_fails_validation() {
        let mut config = AuthConfig::default();
        config.signing.algorithm = "HS256".to_string();
        let err = config.validate().unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue(_)));
        assert!(err.to_string().contains("signing algorithm"));
    }

    #[test]
    fn test_valid_algorithms() {
        for alg in ["RS256", "RS384", "ES384"] {
            let mut config = AuthConfig::default();
            config.signing.algorithm = alg.to_string();
            assert!(config.validate().is_ok(), "Algorithm {} should be valid", alg);
        }
    }

    #[test]
    fn test_zero_code_lifetime_fails_validation() {
        let mut config = AuthConfig::default();
        config.authorization_code.lifetime = Duration::ZERO;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("lifetime"));
    }

    #[test]
    fn test_code_lifetime_upper_bound() {
        let mut config = AuthConfig::default();
        config.authorization_code.lifetime = MAX_AUTHORIZATION_CODE_LIFETIME;
        assert!(config.validate().is_ok());

        config.authorization_code.lifetime += Duration::from_secs(1);
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("at most 600s"));
    }

    #[test]
    fn test_huge_code_lifetime_rejected_from_toml() {
        let err = AuthConfig::from_toml_str("[authorization_code]\nlifetime = \"100000years\"")
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue(_)));
        assert!(err.to_string().contains("authorization_code.lifetime"));
    }

    #[test]
    fn test_zero_attempts_fails_validation() {
        let mut config = AuthConfig::default();
        config.authorization_code.max_create_attempts = 0;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("max_create_attempts"));
    }

    #[test]
    fn test_from_toml_str() {
        let config = AuthConfig::from_toml_str(
            r#"
            issuer = "https://idp.example.com/oidc"

            [authorization_code]
            lifetime = "2m"
            reaper_interval = "30s"

            [signing]
            algorithm = "ES384"
            "#,
        )
        .unwrap();

        assert_eq!(config.issuer.as_deref(), Some("https://idp.example.com/oidc"));
        assert_eq!(config.authorization_code.lifetime, Duration::from_secs(120));
        assert_eq!(
            config.authorization_code.reaper_interval,
            Duration::from_secs(30)
        );
        assert_eq!(config.authorization_code.max_create_attempts, 3);
        assert_eq!(
            config.signing.signing_algorithm().unwrap(),
            SigningAlgorithm::ES384
        );
        assert_eq!(config.signing.default_certificate, "default");
    }

    #[test]
    fn test_from_toml_str_rejects_garbage() {
        let err = AuthConfig::from_toml_str("issuer = [").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }
}
