use serde::de::Deserializer;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Upper bound on contacts requested per group query
pub const DEFAULT_MAX_RESULTS: usize = 5000;

/// Configuration loading errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Unable to determine config directory")]
    NoConfigDir,

    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid configuration: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

pub type ConfigResult<T> = Result<T, ConfigError>;

/// One remote account to pull contacts from
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AccountConfig {
    /// Section name, only used for display
    pub name: String,
    pub login: String,
    pub password: String,
    /// Group ids to fetch. Without a list nothing is fetched for the account.
    #[serde(default, deserialize_with = "group_list")]
    pub groups: Option<Vec<String>>,
}

impl AccountConfig {
    pub fn new(
        name: impl Into<String>,
        login: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            login: login.into(),
            password: password.into(),
            groups: None,
        }
    }

    pub fn with_groups<I, S>(mut self, groups: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.groups = Some(groups.into_iter().map(Into::into).collect());
        self
    }
}

/// Top-level configuration file
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AppConfig {
    #[serde(default = "default_max_results")]
    pub max_results: usize,

    #[serde(default)]
    pub accounts: Vec<AccountConfig>,
}

fn default_max_results() -> usize {
    DEFAULT_MAX_RESULTS
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            max_results: DEFAULT_MAX_RESULTS,
            accounts: Vec::new(),
        }
    }
}

impl AppConfig {
    /// Load configuration from `path`, or from the default location
    pub fn load(path: Option<&Path>) -> ConfigResult<Self> {
        let config_path = match path {
            Some(path) => path.to_path_buf(),
            None => Self::config_file_path()?,
        };

        tracing::debug!("Loading configuration from {}", config_path.display());

        let content = fs::read_to_string(&config_path).map_err(|source| ConfigError::Io {
            path: config_path.clone(),
            source,
        })?;

        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> ConfigResult<Self> {
        let config: AppConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> ConfigResult<()> {
        if self.max_results == 0 {
            return Err(ConfigError::Invalid(
                "max_results must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }

    /// Get the path to the default configuration file
    pub fn config_file_path() -> ConfigResult<PathBuf> {
        dirs::config_dir()
            .map(|dir| dir.join("contacts2bbdb").join("config.toml"))
            .ok_or(ConfigError::NoConfigDir)
    }
}

/// Accept `groups = ["a", "b"]` as well as the comma separated `groups = "a, b"`
fn group_list<'de, D>(deserializer: D) -> Result<Option<Vec<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Groups {
        List(Vec<String>),
        Joined(String),
    }

    let groups = Option::<Groups>::deserialize(deserializer)?;
    let raw = match groups {
        None => return Ok(None),
        Some(Groups::List(list)) => list,
        Some(Groups::Joined(joined)) => joined.split(',').map(str::to_string).collect(),
    };

    Ok(Some(
        raw.into_iter()
            .map(|group| group.trim().to_string())
            .filter(|group| !group.is_empty())
            .collect(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_accounts() {
        let config = AppConfig::from_toml(
            r#"
            [[accounts]]
            name = "personal"
            login = "winston@gmail.com"
            password = "bigbrother"
            groups = ["http://www.google.com/m8/feeds/groups/winston%40gmail.com/base/6"]

            [[accounts]]
            name = "work"
            login = "wsmith@minitrue.gov"
            password = "2+2=5"
            "#,
        )
        .unwrap();

        assert_eq!(config.max_results, DEFAULT_MAX_RESULTS);
        assert_eq!(config.accounts.len(), 2);
        assert_eq!(config.accounts[0].name, "personal");
        assert_eq!(config.accounts[0].groups.as_ref().unwrap().len(), 1);
        assert_eq!(config.accounts[1].groups, None);
    }

    #[test]
    fn test_comma_separated_groups() {
        let config = AppConfig::from_toml(
            r#"
            max_results = 250

            [[accounts]]
            name = "personal"
            login = "winston@gmail.com"
            password = "secret"
            groups = " g/6 , g/7,, "
            "#,
        )
        .unwrap();

        assert_eq!(config.max_results, 250);
        assert_eq!(
            config.accounts[0].groups,
            Some(vec!["g/6".to_string(), "g/7".to_string()])
        );
    }

    #[test]
    fn test_missing_credentials_is_an_error() {
        let result = AppConfig::from_toml(
            r#"
            [[accounts]]
            name = "personal"
            login = "winston@gmail.com"
            "#,
        );
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_zero_max_results_is_rejected() {
        let result = AppConfig::from_toml("max_results = 0");
        assert!(matches!(result, Err(ConfigError::Invalid(_))));
    }
}
