/*
 * Responsibility
 * - Strategy configuration: key material, verification options, passthrough flag
 * - Environment loading (JWT_* variables, .env aware)
 *
 * Notes
 * - Nothing here is checked eagerly except in `from_lookup` parsing.
 *   `validate` runs from `JwtStrategyBuilder::build`, so a strategy without a
 *   secret never gets registered.
 * - JWT_SECRET is read as raw bytes (no base64). Asymmetric keys are PEM and
 *   have to be wired in code for now (`KeyMaterial::RsaPem` etc).
 */
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use jsonwebtoken::Algorithm;

use crate::error::ConfigError;

/// Clock drift tolerated on `exp` / `nbf` / max-age checks unless configured otherwise.
pub const DEFAULT_CLOCK_TOLERANCE: Duration = Duration::from_secs(60);

/// Verification key. HMAC secrets are raw bytes; asymmetric keys are PEM.
#[derive(Clone)]
pub enum KeyMaterial {
    Secret(Vec<u8>),
    RsaPem(String),
    EcPem(String),
    EdPem(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyFamily {
    Hmac,
    Rsa,
    Ec,
    Ed,
}

impl KeyFamily {
    pub fn of(alg: Algorithm) -> Self {
        match alg {
            Algorithm::HS256 | Algorithm::HS384 | Algorithm::HS512 => Self::Hmac,
            Algorithm::RS256
            | Algorithm::RS384
            | Algorithm::RS512
            | Algorithm::PS256
            | Algorithm::PS384
            | Algorithm::PS512 => Self::Rsa,
            Algorithm::ES256 | Algorithm::ES384 => Self::Ec,
            Algorithm::EdDSA => Self::Ed,
        }
    }

    /// Algorithms accepted when no allow-list is configured.
    pub fn default_algorithms(self) -> Vec<Algorithm> {
        match self {
            Self::Hmac => vec![Algorithm::HS256, Algorithm::HS384, Algorithm::HS512],
            Self::Rsa => vec![
                Algorithm::RS256,
                Algorithm::RS384,
                Algorithm::RS512,
                Algorithm::PS256,
                Algorithm::PS384,
                Algorithm::PS512,
            ],
            Self::Ec => vec![Algorithm::ES256, Algorithm::ES384],
            Self::Ed => vec![Algorithm::EdDSA],
        }
    }
}

impl KeyMaterial {
    pub fn secret(secret: impl Into<Vec<u8>>) -> Self {
        Self::Secret(secret.into())
    }

    pub fn family(&self) -> KeyFamily {
        match self {
            Self::Secret(_) => KeyFamily::Hmac,
            Self::RsaPem(_) => KeyFamily::Rsa,
            Self::EcPem(_) => KeyFamily::Ec,
            Self::EdPem(_) => KeyFamily::Ed,
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            Self::Secret(bytes) => bytes.is_empty(),
            Self::RsaPem(pem) | Self::EcPem(pem) | Self::EdPem(pem) => pem.trim().is_empty(),
        }
    }
}

impl fmt::Debug for KeyMaterial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Do not print key material
        write!(f, "KeyMaterial::{:?}(..)", self.family())
    }
}

/// Options forwarded to token verification on every request.
#[derive(Debug, Clone)]
pub struct VerificationOptions {
    /// Allowed `alg` values. Empty means the key family's default set.
    pub algorithms: Vec<Algorithm>,
    /// Accepted audiences (any-of). Empty disables the `aud` check.
    pub audience: Vec<String>,
    /// Accepted issuers (any-of). Empty disables the `iss` check.
    pub issuer: Vec<String>,
    pub subject: Option<String>,
    pub clock_tolerance: Duration,
    pub ignore_expiration: bool,
    pub ignore_not_before: bool,
    /// Maximum allowed age of the token, measured from `iat`.
    pub max_age: Option<Duration>,
    /// Registered claims that must be present (e.g. "exp").
    pub required_claims: Vec<String>,
}

impl Default for VerificationOptions {
    fn default() -> Self {
        Self {
            algorithms: Vec::new(),
            audience: Vec::new(),
            issuer: Vec::new(),
            subject: None,
            clock_tolerance: DEFAULT_CLOCK_TOLERANCE,
            ignore_expiration: false,
            ignore_not_before: false,
            max_age: None,
            required_claims: Vec::new(),
        }
    }
}

impl VerificationOptions {
    pub fn algorithms(mut self, algorithms: impl IntoIterator<Item = Algorithm>) -> Self {
        self.algorithms = algorithms.into_iter().collect();
        self
    }

    pub fn audience<S: Into<String>>(mut self, audience: impl IntoIterator<Item = S>) -> Self {
        self.audience = audience.into_iter().map(Into::into).collect();
        self
    }

    pub fn issuer<S: Into<String>>(mut self, issuer: impl IntoIterator<Item = S>) -> Self {
        self.issuer = issuer.into_iter().map(Into::into).collect();
        self
    }

    pub fn subject(mut self, subject: impl Into<String>) -> Self {
        self.subject = Some(subject.into());
        self
    }

    pub fn clock_tolerance(mut self, tolerance: Duration) -> Self {
        self.clock_tolerance = tolerance;
        self
    }

    pub fn ignore_expiration(mut self, ignore: bool) -> Self {
        self.ignore_expiration = ignore;
        self
    }

    pub fn ignore_not_before(mut self, ignore: bool) -> Self {
        self.ignore_not_before = ignore;
        self
    }

    pub fn max_age(mut self, max_age: Duration) -> Self {
        self.max_age = Some(max_age);
        self
    }

    pub fn required_claims<S: Into<String>>(mut self, claims: impl IntoIterator<Item = S>) -> Self {
        self.required_claims = claims.into_iter().map(Into::into).collect();
        self
    }

    /// The allow-list actually enforced for `family`.
    pub fn effective_algorithms(&self, family: KeyFamily) -> Result<Vec<Algorithm>, ConfigError> {
        if self.algorithms.is_empty() {
            return Ok(family.default_algorithms());
        }
        if self.algorithms.iter().any(|alg| KeyFamily::of(*alg) != family) {
            return Err(ConfigError::Invalid("algorithms"));
        }
        Ok(self.algorithms.clone())
    }
}

/// Created once when the strategy is registered; read-only afterwards.
#[derive(Debug, Clone)]
pub struct StrategyConfig {
    pub key: KeyMaterial,
    pub verification: VerificationOptions,
    pub pass_request_to_resolver: bool,
}

impl StrategyConfig {
    pub fn new(key: KeyMaterial) -> Self {
        Self {
            key,
            verification: VerificationOptions::default(),
            pass_request_to_resolver: false,
        }
    }

    pub fn with_secret(secret: impl Into<Vec<u8>>) -> Self {
        Self::new(KeyMaterial::secret(secret))
    }

    pub fn verification(mut self, verification: VerificationOptions) -> Self {
        self.verification = verification;
        self
    }

    pub fn pass_request_to_resolver(mut self, pass: bool) -> Self {
        self.pass_request_to_resolver = pass;
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.key.is_empty() {
            return Err(ConfigError::Missing("secret"));
        }
        self.verification.effective_algorithms(self.key.family())?;
        Ok(())
    }

    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`StrategyConfig::from_env`], reading values through `lookup`.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let secret = lookup("JWT_SECRET")
            .filter(|s| !s.is_empty())
            .ok_or(ConfigError::Missing("JWT_SECRET"))?;

        let mut verification = VerificationOptions::default();

        if let Some(raw) = lookup("JWT_ALGORITHMS") {
            verification.algorithms = split_list(&raw)
                .iter()
                .map(|s| Algorithm::from_str(s))
                .collect::<Result<Vec<_>, _>>()
                .map_err(|_| ConfigError::Invalid("JWT_ALGORITHMS"))?;
        }

        if let Some(raw) = lookup("JWT_AUDIENCE") {
            verification.audience = split_list(&raw);
        }

        if let Some(raw) = lookup("JWT_ISSUER") {
            verification.issuer = split_list(&raw);
        }

        verification.subject = lookup("JWT_SUBJECT").filter(|s| !s.trim().is_empty());

        if let Some(raw) = lookup("JWT_CLOCK_TOLERANCE_SECONDS") {
            let secs = raw
                .trim()
                .parse::<u64>()
                .map_err(|_| ConfigError::Invalid("JWT_CLOCK_TOLERANCE_SECONDS"))?;
            verification.clock_tolerance = Duration::from_secs(secs);
        }

        if let Some(raw) = lookup("JWT_MAX_AGE_SECONDS") {
            let secs = raw
                .trim()
                .parse::<u64>()
                .map_err(|_| ConfigError::Invalid("JWT_MAX_AGE_SECONDS"))?;
            verification.max_age = Some(Duration::from_secs(secs));
        }

        if let Some(raw) = lookup("JWT_IGNORE_EXPIRATION") {
            verification.ignore_expiration =
                parse_flag(&raw).ok_or(ConfigError::Invalid("JWT_IGNORE_EXPIRATION"))?;
        }

        let pass_request_to_resolver = match lookup("JWT_PASS_REQUEST_TO_RESOLVER") {
            Some(raw) => {
                parse_flag(&raw).ok_or(ConfigError::Invalid("JWT_PASS_REQUEST_TO_RESOLVER"))?
            }
            None => false,
        };

        Ok(Self {
            key: KeyMaterial::secret(secret),
            verification,
            pass_request_to_resolver,
        })
    }
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" | "" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn from_lookup_requires_secret() {
        let err = StrategyConfig::from_lookup(lookup_from(&[])).unwrap_err();
        assert!(matches!(err, ConfigError::Missing("JWT_SECRET")));

        let err = StrategyConfig::from_lookup(lookup_from(&[("JWT_SECRET", "")])).unwrap_err();
        assert!(matches!(err, ConfigError::Missing("JWT_SECRET")));
    }

    #[test]
    fn from_lookup_defaults() {
        let config = StrategyConfig::from_lookup(lookup_from(&[("JWT_SECRET", "abc")])).unwrap();

        assert!(matches!(&config.key, KeyMaterial::Secret(s) if s == b"abc"));
        assert!(!config.pass_request_to_resolver);
        assert_eq!(config.verification.clock_tolerance, DEFAULT_CLOCK_TOLERANCE);
        assert!(config.verification.algorithms.is_empty());
        assert!(config.verification.max_age.is_none());
    }

    #[test]
    fn from_lookup_reads_every_option() {
        let config = StrategyConfig::from_lookup(lookup_from(&[
            ("JWT_SECRET", "abc"),
            ("JWT_ALGORITHMS", "HS256, HS512"),
            ("JWT_AUDIENCE", "api,admin"),
            ("JWT_ISSUER", "https://issuer.example"),
            ("JWT_SUBJECT", "svc"),
            ("JWT_CLOCK_TOLERANCE_SECONDS", "5"),
            ("JWT_MAX_AGE_SECONDS", "3600"),
            ("JWT_IGNORE_EXPIRATION", "true"),
            ("JWT_PASS_REQUEST_TO_RESOLVER", "1"),
        ]))
        .unwrap();

        let v = &config.verification;
        assert_eq!(v.algorithms, vec![Algorithm::HS256, Algorithm::HS512]);
        assert_eq!(v.audience, vec!["api", "admin"]);
        assert_eq!(v.issuer, vec!["https://issuer.example"]);
        assert_eq!(v.subject.as_deref(), Some("svc"));
        assert_eq!(v.clock_tolerance, Duration::from_secs(5));
        assert_eq!(v.max_age, Some(Duration::from_secs(3600)));
        assert!(v.ignore_expiration);
        assert!(config.pass_request_to_resolver);
    }

    #[test]
    fn from_lookup_rejects_garbage() {
        let err = StrategyConfig::from_lookup(lookup_from(&[
            ("JWT_SECRET", "abc"),
            ("JWT_ALGORITHMS", "HS999"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid("JWT_ALGORITHMS")));

        let err = StrategyConfig::from_lookup(lookup_from(&[
            ("JWT_SECRET", "abc"),
            ("JWT_CLOCK_TOLERANCE_SECONDS", "soon"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid("JWT_CLOCK_TOLERANCE_SECONDS")));
    }

    #[test]
    fn validate_rejects_empty_secret_and_mixed_families() {
        let err = StrategyConfig::with_secret("").validate().unwrap_err();
        assert!(matches!(err, ConfigError::Missing("secret")));

        let err = StrategyConfig::with_secret("abc")
            .verification(VerificationOptions::default().algorithms([Algorithm::RS256]))
            .validate()
            .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid("algorithms")));

        StrategyConfig::with_secret("abc")
            .verification(VerificationOptions::default().algorithms([Algorithm::HS512]))
            .validate()
            .unwrap();
    }

    #[test]
    fn debug_hides_key_material() {
        let rendered = format!("{:?}", StrategyConfig::with_secret("super-secret"));
        assert!(!rendered.contains("super-secret"));
    }
}
