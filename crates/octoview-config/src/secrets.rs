//! OAuth client credential resolution.
//!
//! Resolution order:
//! 1. Environment variable (`GITHUB_CLIENT_ID` / `GITHUB_CLIENT_SECRET`)
//! 2. Config file `[github]` section (secret produces a load warning)

use crate::{ConfigError, OctoviewConfig, Result};

/// Environment variable holding the OAuth client id.
pub const CLIENT_ID_ENV: &str = "GITHUB_CLIENT_ID";

/// Environment variable holding the OAuth client secret.
pub const CLIENT_SECRET_ENV: &str = "GITHUB_CLIENT_SECRET";

/// Result of credential resolution with provenance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedSecret {
    /// The secret value.
    pub value: String,
    /// Where the secret was found.
    pub source: SecretSource,
}

/// Where a secret was resolved from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SecretSource {
    /// Environment variable.
    EnvVar(String),
    /// Config file (plaintext).
    ConfigFile,
}

impl std::fmt::Display for SecretSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SecretSource::EnvVar(var) => write!(f, "env var {}", var),
            SecretSource::ConfigFile => write!(f, "config file"),
        }
    }
}

/// Resolve the OAuth client id.
pub fn resolve_client_id(config: &OctoviewConfig) -> Result<ResolvedSecret> {
    let configured = config.github.as_ref().and_then(|g| g.client_id.as_deref());
    resolve(CLIENT_ID_ENV, configured).ok_or_else(|| ConfigError::MissingCredential {
        field: "client_id".to_string(),
        env_var: CLIENT_ID_ENV.to_string(),
    })
}

/// Resolve the OAuth client secret.
pub fn resolve_client_secret(config: &OctoviewConfig) -> Result<ResolvedSecret> {
    let configured = config
        .github
        .as_ref()
        .and_then(|g| g.client_secret.as_deref());
    resolve(CLIENT_SECRET_ENV, configured).ok_or_else(|| ConfigError::MissingCredential {
        field: "client_secret".to_string(),
        env_var: CLIENT_SECRET_ENV.to_string(),
    })
}

fn resolve(env_var: &str, config_value: Option<&str>) -> Option<ResolvedSecret> {
    if let Ok(value) = std::env::var(env_var)
        && !value.is_empty()
    {
        return Some(ResolvedSecret {
            value,
            source: SecretSource::EnvVar(env_var.to_string()),
        });
    }

    config_value
        .filter(|v| !v.is_empty())
        .map(|v| ResolvedSecret {
            value: v.to_string(),
            source: SecretSource::ConfigFile,
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_from_config_value() {
        let resolved = resolve("OCTOVIEW_TEST_UNSET_VAR_1", Some("from-file")).unwrap();
        assert_eq!(resolved.value, "from-file");
        assert_eq!(resolved.source, SecretSource::ConfigFile);
    }

    #[test]
    fn test_resolve_empty_config_value_is_none() {
        assert!(resolve("OCTOVIEW_TEST_UNSET_VAR_2", Some("")).is_none());
        assert!(resolve("OCTOVIEW_TEST_UNSET_VAR_2", None).is_none());
    }

    #[test]
    fn test_env_var_wins_over_config() {
        // SAFETY: the variable name is unique to this test.
        unsafe { std::env::set_var("OCTOVIEW_TEST_SECRET_ENV", "from-env") };
        let resolved = resolve("OCTOVIEW_TEST_SECRET_ENV", Some("from-file")).unwrap();
        assert_eq!(resolved.value, "from-env");
        assert_eq!(
            resolved.source,
            SecretSource::EnvVar("OCTOVIEW_TEST_SECRET_ENV".to_string())
        );
        unsafe { std::env::remove_var("OCTOVIEW_TEST_SECRET_ENV") };
    }

    #[test]
    fn test_secret_source_display() {
        assert_eq!(
            SecretSource::EnvVar("GITHUB_CLIENT_ID".to_string()).to_string(),
            "env var GITHUB_CLIENT_ID"
        );
        assert_eq!(SecretSource::ConfigFile.to_string(), "config file");
    }

    #[test]
    fn test_missing_credential_error_names_env_var() {
        let err = ConfigError::MissingCredential {
            field: "client_id".to_string(),
            env_var: CLIENT_ID_ENV.to_string(),
        };
        assert!(err.to_string().contains("GITHUB_CLIENT_ID"));
    }
}
