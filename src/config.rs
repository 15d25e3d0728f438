use std::env;

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("{0} must be a valid number")]
    Invalid(&'static str),
}

/// Superadmin seeded at startup when both variables are present.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SuperadminSeed {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone)]
pub struct Settings {
    pub database_url: String,
    pub jwt_secret: String,
    pub host: String,
    pub port: u16,
    pub stripe_secret_key: String,
    pub stripe_webhook_secret: String,
    pub stripe_api_base: String,
    /// Service-account JSON; push is disabled without it.
    pub firebase_credentials: Option<String>,
    pub email_from: String,
    pub frontend_url: String,
    pub superadmin: Option<SuperadminSeed>,
}

impl Settings {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds settings from any key lookup. Blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let required = |key: &'static str| get(key).ok_or(ConfigError::Missing(key));
        let or = |key: &str, default: &str| get(key).unwrap_or_else(|| default.to_string());

        let port = match get("PORT") {
            Some(raw) => raw.trim().parse().map_err(|_| ConfigError::Invalid("PORT"))?,
            None => 8080,
        };
        let superadmin = match (get("SUPERADMIN_EMAIL"), get("SUPERADMIN_PASSWORD")) {
            (Some(email), Some(password)) => Some(SuperadminSeed { email, password }),
            _ => None,
        };

        Ok(Settings {
            database_url: required("DATABASE_URL")?,
            jwt_secret: required("JWT_SECRET")?,
            host: or("HOST", "0.0.0.0"),
            port,
            stripe_secret_key: or("STRIPE_SECRET_KEY", ""),
            stripe_webhook_secret: or("STRIPE_WEBHOOK_SECRET", ""),
            stripe_api_base: or("STRIPE_API_BASE", "https://api.stripe.com"),
            firebase_credentials: get("FIREBASE_CREDENTIALS"),
            email_from: or("EMAIL_FROM", "no-reply@portalized.local"),
            frontend_url: or("FRONTEND_URL", "http://localhost:3000"),
            superadmin,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_apply_when_optional_values_are_absent() {
        let settings =
            Settings::from_lookup(lookup(&[("DATABASE_URL", "postgres://x"), ("JWT_SECRET", "s")]))
                .unwrap();
        assert_eq!(settings.host, "0.0.0.0");
        assert_eq!(settings.port, 8080);
        assert_eq!(settings.stripe_api_base, "https://api.stripe.com");
        assert!(settings.firebase_credentials.is_none());
        assert!(settings.superadmin.is_none());
    }

    #[test]
    fn database_url_is_required() {
        let err = Settings::from_lookup(lookup(&[("JWT_SECRET", "s")])).unwrap_err();
        assert_eq!(err, ConfigError::Missing("DATABASE_URL"));
        assert_eq!(err.to_string(), "DATABASE_URL must be set");
    }

    #[test]
    fn blank_jwt_secret_counts_as_missing() {
        let err = Settings::from_lookup(lookup(&[("DATABASE_URL", "postgres://x"), ("JWT_SECRET", " ")]))
            .unwrap_err();
        assert_eq!(err, ConfigError::Missing("JWT_SECRET"));
    }

    #[test]
    fn port_must_be_numeric() {
        let err = Settings::from_lookup(lookup(&[
            ("DATABASE_URL", "postgres://x"),
            ("JWT_SECRET", "s"),
            ("PORT", "eighty"),
        ]))
        .unwrap_err();
        assert_eq!(err, ConfigError::Invalid("PORT"));
    }

    #[test]
    fn superadmin_needs_both_email_and_password() {
        let base = [("DATABASE_URL", "postgres://x"), ("JWT_SECRET", "s")];
        let only_email = [base[0], base[1], ("SUPERADMIN_EMAIL", "root@example.com")];
        assert!(Settings::from_lookup(lookup(&only_email))
            .unwrap()
            .superadmin
            .is_none());

        let both = [
            base[0],
            base[1],
            ("SUPERADMIN_EMAIL", "root@example.com"),
            ("SUPERADMIN_PASSWORD", "hunter22"),
        ];
        let seed = Settings::from_lookup(lookup(&both)).unwrap().superadmin.unwrap();
        assert_eq!(seed.email, "root@example.com");
    }
}
