use std::fmt;

use jsonwebtoken::{DecodingKey, Validation};
use thiserror::Error;

use crate::config::{KeyMaterial, VerificationOptions};
use crate::error::ConfigError;
use crate::services::auth::claims::TokenClaims;

// Errors returned by token verification. All of them are client-side problems.
#[derive(Debug, Error)]
pub enum VerifyError {
    #[error("jwt verification failed: {0}")]
    Jwt(#[from] jsonwebtoken::errors::Error),
    #[error("missing required claim '{0}'")]
    MissingClaim(String),
    #[error("'{0}' is not a NumericDate")]
    InvalidNumericDate(&'static str),
    #[error("token expired")]
    Expired,
    #[error("token not active yet")]
    NotYetValid,
    #[error("missing 'iat' claim (required by max age)")]
    MissingIssuedAt,
    #[error("token is older than the configured max age")]
    MaxAgeExceeded,
}

/// Signature + registered claim verifier, built once per strategy.
///
/// - Key material is intentionally not printable via Debug.
/// - Time claims are checked here, not by jsonwebtoken: it only understands
///   integer NumericDates and silently skips fractional ones.
#[derive(Clone)]
pub struct TokenVerifier {
    decoding_key: DecodingKey,
    validation: Validation,
    leeway_seconds: u64,
    validate_exp: bool,
    validate_nbf: bool,
    required_claims: Vec<String>,
    max_age_seconds: Option<u64>,
}

impl fmt::Debug for TokenVerifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenVerifier")
            .field("validation", &self.validation)
            .field("leeway_seconds", &self.leeway_seconds)
            .field("required_claims", &self.required_claims)
            .field("max_age_seconds", &self.max_age_seconds)
            .finish()
    }
}

impl TokenVerifier {
    pub fn new(key: &KeyMaterial, options: &VerificationOptions) -> Result<Self, ConfigError> {
        if key.is_empty() {
            return Err(ConfigError::Missing("secret"));
        }

        let decoding_key = match key {
            KeyMaterial::Secret(secret) => DecodingKey::from_secret(secret),
            KeyMaterial::RsaPem(pem) => {
                DecodingKey::from_rsa_pem(pem.as_bytes()).map_err(ConfigError::InvalidKey)?
            }
            KeyMaterial::EcPem(pem) => {
                DecodingKey::from_ec_pem(pem.as_bytes()).map_err(ConfigError::InvalidKey)?
            }
            KeyMaterial::EdPem(pem) => {
                DecodingKey::from_ed_pem(pem.as_bytes()).map_err(ConfigError::InvalidKey)?
            }
        };

        let algorithms = options.effective_algorithms(key.family())?;

        let mut validation = Validation::new(algorithms[0]);
        validation.algorithms = algorithms;
        validation.validate_exp = false;
        validation.validate_nbf = false;
        validation.required_spec_claims.clear();

        // jsonwebtoken rejects any token carrying `aud` unless an audience is set,
        // so the check is switched off entirely when none is configured.
        if options.audience.is_empty() {
            validation.validate_aud = false;
        } else {
            validation.set_audience(&options.audience);
        }
        if !options.issuer.is_empty() {
            validation.set_issuer(&options.issuer);
        }
        validation.sub = options.subject.clone();

        Ok(Self {
            decoding_key,
            validation,
            leeway_seconds: options.clock_tolerance.as_secs(),
            validate_exp: !options.ignore_expiration,
            validate_nbf: !options.ignore_not_before,
            required_claims: options.required_claims.clone(),
            max_age_seconds: options.max_age.map(|d| d.as_secs()),
        })
    }

    /// Verify and decode a token.
    ///
    /// `jsonwebtoken::Validation` checks the signature, the `alg` allow-list
    /// and `aud`/`iss`/`sub` when configured. Presence of required claims,
    /// `exp`/`nbf` within the leeway and max age (against `iat`) are checked here.
    pub fn verify(&self, token: &str) -> Result<TokenClaims, VerifyError> {
        let data = jsonwebtoken::decode::<TokenClaims>(token, &self.decoding_key, &self.validation)?;
        let claims = data.claims;

        if let Some(missing) = self.required_claims.iter().find(|c| !claims.contains(c)) {
            return Err(VerifyError::MissingClaim(missing.clone()));
        }

        let now = chrono::Utc::now().timestamp() as f64;
        let leeway = self.leeway_seconds as f64;

        if self.validate_exp {
            if let Some(exp) = numeric_date(&claims, "exp")? {
                if now >= exp + leeway {
                    return Err(VerifyError::Expired);
                }
            }
        }

        if self.validate_nbf {
            if let Some(nbf) = numeric_date(&claims, "nbf")? {
                if now + leeway < nbf {
                    return Err(VerifyError::NotYetValid);
                }
            }
        }

        if let Some(max_age) = self.max_age_seconds {
            // a non-numeric iat counts as missing here
            let iat = claims
                .numeric_date("iat")
                .ok_or(VerifyError::MissingIssuedAt)?;
            if now >= iat + max_age as f64 + leeway {
                return Err(VerifyError::MaxAgeExceeded);
            }
        }

        Ok(claims)
    }
}

/// `Ok(None)` when absent; a present claim must be a number.
fn numeric_date(claims: &TokenClaims, name: &'static str) -> Result<Option<f64>, VerifyError> {
    match claims.get(name) {
        None => Ok(None),
        Some(value) => value
            .as_f64()
            .map(Some)
            .ok_or(VerifyError::InvalidNumericDate(name)),
    }
}
