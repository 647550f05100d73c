//! Decoder configuration.
//!
//! The SAV information element numbers are still provisional (the draft
//! leaves them TBD), so they are read from configuration rather than fixed in
//! code. Configuration is TOML:
//!
//! ```toml
//! trailing_bytes = "strict"
//!
//! [info_elements]
//! rule_type = 500
//! target_type = 501
//! matched_content = 502
//! policy_action = 503
//! match_count = 504
//! ```

use crate::error::{Result, SavError};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Handling of bytes left after the last whole record of a list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrailingBytesPolicy {
    /// Keep the whole records, report a warning diagnostic.
    #[default]
    Lenient,
    /// Fail the decode with `SavError::TrailingBytes`.
    Strict,
}

/// Information element numbers of the outer SAV record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InfoElementIds {
    /// savRuleType
    #[serde(default = "default_rule_type")]
    pub rule_type: u16,

    /// savTargetType
    #[serde(default = "default_target_type")]
    pub target_type: u16,

    /// savMatchedContentList (subTemplateList)
    #[serde(default = "default_matched_content")]
    pub matched_content: u16,

    /// savPolicyAction
    #[serde(default = "default_policy_action")]
    pub policy_action: u16,

    /// savMatchCount, if the exporter sends one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub match_count: Option<u16>,

    /// Explicit validation mode field, if the exporter sends one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub validation_mode: Option<u16>,
}

/// Complete decoder configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecoderConfig {
    #[serde(default)]
    pub trailing_bytes: TrailingBytesPolicy,

    #[serde(default)]
    pub info_elements: InfoElementIds,
}

fn default_rule_type() -> u16 {
    500
}

fn default_target_type() -> u16 {
    501
}

fn default_matched_content() -> u16 {
    502
}

fn default_policy_action() -> u16 {
    503
}

impl Default for InfoElementIds {
    fn default() -> Self {
        Self {
            rule_type: default_rule_type(),
            target_type: default_target_type(),
            matched_content: default_matched_content(),
            policy_action: default_policy_action(),
            match_count: None,
            validation_mode: None,
        }
    }
}

impl InfoElementIds {
    /// All configured ids, optional ones included when set.
    pub fn all(&self) -> Vec<u16> {
        let mut ids = vec![
            self.rule_type,
            self.target_type,
            self.matched_content,
            self.policy_action,
        ];
        ids.extend(self.match_count);
        ids.extend(self.validation_mode);
        ids
    }
}

impl DecoderConfig {
    /// Strict configuration with default IE numbers.
    pub fn strict() -> Self {
        Self {
            trailing_bytes: TrailingBytesPolicy::Strict,
            ..Self::default()
        }
    }

    /// Parses and validates a TOML document.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)
            .map_err(|e| SavError::Config(format!("Failed to parse config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from file, falling back to defaults if file not found
    pub fn load_or_default(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        match fs::read_to_string(path) {
            Ok(content) => Self::from_toml_str(&content).map_err(|e| match e {
                SavError::Config(msg) => {
                    SavError::Config(format!("{}: {}", path.display(), msg))
                }
                other => other,
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::info!(
                    path = %path.display(),
                    "SAV decoder config not found, using defaults"
                );
                Ok(Self::default())
            }
            Err(e) => Err(SavError::Io(e)),
        }
    }

    /// Save configuration to file
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| SavError::Config(format!("Failed to serialize config: {}", e)))?;

        fs::write(path, content)?;

        Ok(())
    }

    /// Checks that every configured IE number is distinct.
    pub fn validate(&self) -> Result<()> {
        let mut ids = self.info_elements.all();
        let total = ids.len();
        ids.sort_unstable();
        ids.dedup();

        if ids.len() != total {
            return Err(SavError::Config(
                "SAV information element numbers must be distinct".to_string(),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::NamedTempFile;

    #[test]
    fn test_defaults() {
        let config = DecoderConfig::default();
        assert_eq!(config.trailing_bytes, TrailingBytesPolicy::Lenient);
        assert_eq!(config.info_elements.all(), vec![500, 501, 502, 503]);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_toml() {
        let config = DecoderConfig::from_toml_str(
            r#"
            trailing_bytes = "strict"

            [info_elements]
            matched_content = 30003
            match_count = 30004
            "#,
        )
        .unwrap();

        assert_eq!(config.trailing_bytes, TrailingBytesPolicy::Strict);
        assert_eq!(config.info_elements.rule_type, 500);
        assert_eq!(config.info_elements.matched_content, 30003);
        assert_eq!(config.info_elements.match_count, Some(30004));
        assert_eq!(config.info_elements.validation_mode, None);
    }

    #[test]
    fn test_duplicate_ids_rejected() {
        let err = DecoderConfig::from_toml_str(
            r#"
            [info_elements]
            rule_type = 501
            "#,
        )
        .unwrap_err();
        assert!(matches!(err, SavError::Config(_)));
    }

    #[test]
    fn test_bad_policy_rejected() {
        assert!(DecoderConfig::from_toml_str(r#"trailing_bytes = "loose""#).is_err());
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = DecoderConfig::load_or_default(dir.path().join("absent.toml")).unwrap();
        assert_eq!(config, DecoderConfig::default());
    }

    #[test]
    fn test_save_and_load() {
        let file = NamedTempFile::new().unwrap();
        let mut config = DecoderConfig::strict();
        config.info_elements.validation_mode = Some(505);

        config.save(file.path()).unwrap();
        let loaded = DecoderConfig::load_or_default(file.path()).unwrap();
        assert_eq!(loaded, config);
    }
}
