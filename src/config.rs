use crate::errors::{BackupToolError, Result};
use crate::shared::constants::{DEFAULT_PATH_PREFIX, DEFAULT_REGION};
use std::env;
use std::fmt;

pub const ENV_ACCESS_KEY_ID: &str = "R2_ACCESS_KEY_ID";
pub const ENV_SECRET_ACCESS_KEY: &str = "R2_SECRET_ACCESS_KEY";
pub const ENV_ENDPOINT: &str = "R2_ENDPOINT";
pub const ENV_BUCKET: &str = "R2_BUCKET";
pub const ENV_PATH: &str = "R2_PATH";
pub const ENV_REGION: &str = "R2_REGION";

/// Object store settings for the listing/download tool
#[derive(Clone)]
pub struct Config {
    pub access_key_id: String,
    pub secret_access_key: String,
    pub endpoint: String,
    pub bucket: String,
    pub path_prefix: String,
    pub region: String,
}

impl Config {
    /// Load from `.env` and the process environment
    pub fn load() -> Result<Self> {
        dotenv::dotenv().ok();
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Validate every required variable in one pass.
    ///
    /// Empty values count as absent. All missing names are reported together
    /// so the operator can fix them in one go.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let mut missing = Vec::new();
        let mut required = |name: &'static str| {
            get(name).unwrap_or_else(|| {
                missing.push(name);
                String::new()
            })
        };

        let access_key_id = required(ENV_ACCESS_KEY_ID);
        let secret_access_key = required(ENV_SECRET_ACCESS_KEY);
        let endpoint = required(ENV_ENDPOINT);
        let bucket = required(ENV_BUCKET);

        if !missing.is_empty() {
            return Err(BackupToolError::MissingConfiguration(missing));
        }

        Ok(Config {
            access_key_id,
            secret_access_key,
            endpoint,
            bucket,
            path_prefix: get(ENV_PATH).unwrap_or_else(|| DEFAULT_PATH_PREFIX.to_string()),
            region: get(ENV_REGION).unwrap_or_else(|| DEFAULT_REGION.to_string()),
        })
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("access_key_id", &self.access_key_id)
            .field("secret_access_key", &"***")
            .field("endpoint", &self.endpoint)
            .field("bucket", &self.bucket)
            .field("path_prefix", &self.path_prefix)
            .field("region", &self.region)
            .finish()
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
        move |name: &str| map.get(name).cloned()
    }

    fn full_env() -> Vec<(&'static str, &'static str)> {
        vec![
            (ENV_ACCESS_KEY_ID, "key"),
            (ENV_SECRET_ACCESS_KEY, "secret"),
            (ENV_ENDPOINT, "https://abc123.r2.cloudflarestorage.com"),
            (ENV_BUCKET, "backups"),
        ]
    }

    #[test]
    fn test_defaults_applied() -> Result<()> {
        let config = Config::from_lookup(lookup_from(&full_env()))?;
        assert_eq!(config.path_prefix, "mysql-backup");
        assert_eq!(config.region, "auto");
        assert_eq!(config.bucket, "backups");
        Ok(())
    }

    #[test]
    fn test_optional_overrides() -> Result<()> {
        let mut env = full_env();
        env.push((ENV_PATH, "prod/mysql/"));
        env.push((ENV_REGION, "eu-central-1"));

        let config = Config::from_lookup(lookup_from(&env))?;
        assert_eq!(config.path_prefix, "prod/mysql/");
        assert_eq!(config.region, "eu-central-1");
        Ok(())
    }

    #[test]
    fn test_empty_path_falls_back_to_default() -> Result<()> {
        let mut env = full_env();
        env.push((ENV_PATH, ""));

        let config = Config::from_lookup(lookup_from(&env))?;
        assert_eq!(config.path_prefix, "mysql-backup");
        Ok(())
    }

    #[test]
    fn test_all_missing_fields_reported() {
        let env = vec![(ENV_ACCESS_KEY_ID, "key"), (ENV_BUCKET, "  ")];

        match Config::from_lookup(lookup_from(&env)) {
            Err(BackupToolError::MissingConfiguration(missing)) => {
                assert_eq!(
                    missing,
                    vec![ENV_SECRET_ACCESS_KEY, ENV_ENDPOINT, ENV_BUCKET]
                );
            }
            other => panic!("expected missing configuration, got {:?}", other),
        }
    }

    #[test]
    fn test_debug_redacts_secret() -> Result<()> {
        let config = Config::from_lookup(lookup_from(&full_env()))?;
        let rendered = format!("{:?}", config);
        assert!(!rendered.contains("secret\""));
        assert!(rendered.contains("***"));
        Ok(())
    }
}
