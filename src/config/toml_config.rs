use crate::config::AppConfig;
use crate::utils::error::{ContactError, Result};
use regex::{Captures, Regex};
use std::path::Path;
use std::sync::OnceLock;

fn env_placeholder() -> &'static Regex {
    static PLACEHOLDER: OnceLock<Regex> = OnceLock::new();
    PLACEHOLDER.get_or_init(|| Regex::new(r"\$\{([^}]+)\}").expect("placeholder pattern is valid"))
}

impl AppConfig {
    /// Loads configuration from a TOML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(ContactError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// Parses TOML, replacing `${VAR}` placeholders from the environment so
    /// secrets can stay out of the file.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed = substitute_env_vars(content, |name| std::env::var(name).ok());
        Self::parse_toml(&processed)
    }

    fn parse_toml(content: &str) -> Result<Self> {
        let mut config: AppConfig = toml::from_str(content).map_err(|e| ContactError::ConfigError {
            message: format!("TOML parsing error: {}", e),
        })?;

        if config.firebase.public.database_url.is_none() {
            config.firebase.public.database_url = Some(config.firebase.database_url.clone());
        }

        Ok(config)
    }
}

/// Unknown variables are left as-is so validation reports them verbatim.
pub(crate) fn substitute_env_vars<F>(content: &str, lookup: F) -> String
where
    F: Fn(&str) -> Option<String>,
{
    env_placeholder()
        .replace_all(content, |caps: &Captures| {
            let var_name = &caps[1];
            lookup(var_name).unwrap_or_else(|| format!("${{{}}}", var_name))
        })
        .into_owned()
}
