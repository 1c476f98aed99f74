use crate::error::ConfigError;

const DEFAULT_REGION: &str = "us-east-1";
const DEFAULT_ACCOUNTS_TABLE: &str = "Accounts";
const DEFAULT_PROFILES_TABLE: &str = "Profiles";

/// Process configuration, read once at cold start and handed to constructors.
#[derive(Debug, Clone)]
pub struct Config {
    pub region: String,
    pub dynamo_endpoint: Option<String>,
    pub accounts_table: String,
    pub profiles_table: String,
    pub tmdb_api_key: String,
    pub guidebox_api_key: Option<String>,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary variable source. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let tmdb_api_key = get("TMDB_API_KEY").ok_or(ConfigError::Missing("TMDB_API_KEY"))?;

        Ok(Self {
            region: get("AWS_REGION").unwrap_or_else(|| DEFAULT_REGION.to_string()),
            dynamo_endpoint: get("DYNAMO_ENDPOINT"),
            accounts_table: get("ACCOUNTS_TABLE")
                .unwrap_or_else(|| DEFAULT_ACCOUNTS_TABLE.to_string()),
            profiles_table: get("PROFILES_TABLE")
                .unwrap_or_else(|| DEFAULT_PROFILES_TABLE.to_string()),
            tmdb_api_key,
            guidebox_api_key: get("GUIDEBOX_API_KEY"),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_applied() {
        let config = Config::from_lookup(lookup(&[("TMDB_API_KEY", "abc")])).unwrap();
        assert_eq!(config.region, "us-east-1");
        assert_eq!(config.accounts_table, "Accounts");
        assert_eq!(config.profiles_table, "Profiles");
        assert!(config.dynamo_endpoint.is_none());
        assert!(config.guidebox_api_key.is_none());
    }

    #[test]
    fn test_missing_tmdb_key_fails() {
        let err = Config::from_lookup(lookup(&[("AWS_REGION", "eu-west-1")])).unwrap_err();
        assert_eq!(err.to_string(), "TMDB_API_KEY must be set");

        let err = Config::from_lookup(lookup(&[("TMDB_API_KEY", "  ")])).unwrap_err();
        assert!(matches!(err, ConfigError::Missing("TMDB_API_KEY")));
    }

    #[test]
    fn test_overrides() {
        let config = Config::from_lookup(lookup(&[
            ("TMDB_API_KEY", "abc"),
            ("GUIDEBOX_API_KEY", "gb"),
            ("DYNAMO_ENDPOINT", "http://localhost:8000"),
            ("ACCOUNTS_TABLE", "reelscout-accounts"),
        ]))
        .unwrap();
        assert_eq!(config.guidebox_api_key.as_deref(), Some("gb"));
        assert_eq!(config.dynamo_endpoint.as_deref(), Some("http://localhost:8000"));
        assert_eq!(config.accounts_table, "reelscout-accounts");
    }
}
