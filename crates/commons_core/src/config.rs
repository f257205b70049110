use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::ops::Range;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::ConfigError;
use crate::filter::DateRange;
use crate::schema::{DivisionId, parse_date};

/// Settings for one run. Every key is optional in the TOML file; missing keys take the defaults.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RunConfig {
    pub api_base_url: String,
    pub division_start: DivisionId,
    pub division_end: DivisionId, // exclusive
    pub date_start: String,       // YYYY-MM-DD, inclusive
    pub date_end: String,         // YYYY-MM-DD, inclusive
    pub output_dir: PathBuf,
    pub matrix_file: String,
    pub members_file: String,
    pub member_url: String,
    pub http_timeout_secs: u64,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            api_base_url: "https://commonsvotes-api.parliament.uk/data".to_string(),
            division_start: 723,
            division_end: 1810,
            date_start: "2019-12-11".to_string(),
            date_end: "2024-07-03".to_string(),
            output_dir: PathBuf::from("output"),
            matrix_file: "votematrix-2019.dat".to_string(),
            members_file: "votematrix-2019.txt".to_string(),
            member_url: "<empty>".to_string(),
            http_timeout_secs: 10,
        }
    }
}

impl RunConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        Self::from_toml_str(&raw).with_context(|| format!("parsing config {}", path.display()))
    }

    pub fn from_toml_str(raw: &str) -> Result<Self> {
        Ok(toml::from_str(raw)?)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.division_ids()?;
        self.date_range()?;
        self.http_timeout()?;
        Ok(())
    }

    pub fn division_ids(&self) -> Result<Range<DivisionId>, ConfigError> {
        if self.division_start > self.division_end {
            return Err(ConfigError::ReversedDivisions {
                start: self.division_start,
                end: self.division_end,
            });
        }
        Ok(self.division_start..self.division_end)
    }

    pub fn date_range(&self) -> Result<DateRange, ConfigError> {
        let start = config_date("date_start", &self.date_start)?;
        let end = config_date("date_end", &self.date_end)?;
        DateRange::new(start, end)
    }

    pub fn http_timeout(&self) -> Result<Duration, ConfigError> {
        if self.http_timeout_secs == 0 {
            return Err(ConfigError::ZeroTimeout);
        }
        Ok(Duration::from_secs(self.http_timeout_secs))
    }

    pub fn matrix_path(&self) -> PathBuf {
        self.output_dir.join(&self.matrix_file)
    }

    pub fn members_path(&self) -> PathBuf {
        self.output_dir.join(&self.members_file)
    }
}

fn config_date(key: &'static str, value: &str) -> Result<time::Date, ConfigError> {
    parse_date(value).ok_or_else(|| ConfigError::InvalidDate {
        key,
        value: value.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::date;

    #[test]
    fn defaults_are_valid() {
        let config = RunConfig::default();
        config.validate().unwrap();
        assert_eq!(config.division_ids().unwrap(), 723..1810);
        let range = config.date_range().unwrap();
        assert_eq!(range.start(), date!(2019-12-11));
        assert_eq!(range.end(), date!(2024-07-03));
        assert_eq!(config.matrix_path(), PathBuf::from("output/votematrix-2019.dat"));
    }

    #[test]
    fn partial_file_keeps_defaults() {
        let config = RunConfig::from_toml_str(
            r#"
            division_start = 1000
            division_end = 1010
            date_end = "2020-12-31"
            "#,
        )
        .unwrap();
        assert_eq!(config.division_ids().unwrap(), 1000..1010);
        assert_eq!(config.date_range().unwrap().end(), date!(2020-12-31));
        assert_eq!(config.member_url, "<empty>");
        assert_eq!(config.http_timeout().unwrap(), Duration::from_secs(10));
    }

    #[test]
    fn unknown_keys_are_rejected() {
        assert!(RunConfig::from_toml_str("division_begin = 5").is_err());
    }

    #[test]
    fn invalid_values_are_reported() {
        let config = RunConfig {
            date_start: "11/12/2019".to_string(),
            ..RunConfig::default()
        };
        assert_eq!(
            config.validate(),
            Err(ConfigError::InvalidDate {
                key: "date_start",
                value: "11/12/2019".to_string(),
            })
        );

        let config = RunConfig {
            division_start: 20,
            division_end: 10,
            ..RunConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::ReversedDivisions { start: 20, end: 10 })
        ));

        let config = RunConfig {
            http_timeout_secs: 0,
            ..RunConfig::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::ZeroTimeout));
    }
}
