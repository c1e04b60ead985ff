// backendtool/src/config/mod.rs
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::Path;

use crate::errors::AppError;
use crate::paths;
use crate::prompt::Prompter;

/// Regions in which the managed backend services are available.
pub const AWS_REGIONS: &[&str] = &[
    "us-east-1",
    "us-east-2",
    "us-west-2",
    "eu-west-1",
    "eu-west-2",
    "eu-central-1",
    "ap-northeast-1",
    "ap-northeast-2",
    "ap-southeast-1",
    "ap-southeast-2",
];

pub const DEFAULT_ACCESS_KEY_ID: &str = "<accessKeyId>";
pub const DEFAULT_SECRET_ACCESS_KEY: &str = "<secretAccessKey>";
pub const DEFAULT_REGION: &str = "us-east-1";

/// AWS account settings used for every remote call.
///
/// Stored as JSON under the per-user config directory; environment variables
/// take precedence, then the tool's own file, then the system `~/.aws` files.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AwsConfig {
    pub access_key_id: String,
    pub secret_access_key: String,
    pub region: String,
}

impl Default for AwsConfig {
    fn default() -> Self {
        AwsConfig {
            access_key_id: DEFAULT_ACCESS_KEY_ID.to_string(),
            secret_access_key: DEFAULT_SECRET_ACCESS_KEY.to_string(),
            region: DEFAULT_REGION.to_string(),
        }
    }
}

impl AwsConfig {
    pub fn is_valid(&self) -> bool {
        validate_access_key_id(&self.access_key_id)
            && validate_secret_access_key(&self.secret_access_key)
            && validate_region(&self.region)
    }
}

pub fn validate_access_key_id(access_key_id: &str) -> bool {
    !access_key_id.is_empty() && access_key_id != DEFAULT_ACCESS_KEY_ID
}

pub fn validate_secret_access_key(secret_access_key: &str) -> bool {
    !secret_access_key.is_empty() && secret_access_key != DEFAULT_SECRET_ACCESS_KEY
}

pub fn validate_region(region: &str) -> bool {
    AWS_REGIONS.contains(&region)
}

/// Resolves the AWS settings without any user interaction.
///
/// Precedence: process environment, then the tool's config file, then the
/// `[default]` section of the system aws credential/config files. Falls back
/// to placeholder values that will fail validation.
pub fn resolve_aws_config() -> AwsConfig {
    if let Some(config) = config_from_env() {
        return config;
    }

    if let Some(file_path) = paths::system_aws_config_file() {
        if let Some(config) = load_aws_config_file(&file_path) {
            if config.is_valid() {
                return config;
            }
        }
    }

    config_from_system_aws_files().unwrap_or_default()
}

/// Ensures a usable AWS configuration, asking the operator to supply one when
/// the resolved settings are missing or invalid.
pub fn check_aws_config(prompter: &mut dyn Prompter) -> Result<AwsConfig> {
    let config = resolve_aws_config();
    if config.is_valid() {
        return Ok(config);
    }

    println!("❌ Missing aws account credentials.");
    let configure = prompter.confirm("configure aws account settings", true)?;
    if !configure {
        return Err(AppError::Cancelled(
            "aws account settings were not configured".to_string(),
        )
        .into());
    }

    let config = configure_aws(prompter, config)?;
    if config.is_valid() {
        if let Some(file_path) = paths::system_aws_config_file() {
            save_aws_config_file(&file_path, &config)?;
        }
        Ok(config)
    } else {
        Err(AppError::AwsConfig("invalid aws account settings".to_string()).into())
    }
}

/// Interactive configuration of the AWS settings; the caller persists the
/// result.
pub fn configure_aws(prompter: &mut dyn Prompter, current: AwsConfig) -> Result<AwsConfig> {
    let access_key_id = prompter
        .input("accessKeyId: ", &current.access_key_id)?
        .trim()
        .to_string();
    let secret_access_key = prompter
        .input("secretAccessKey: ", &current.secret_access_key)?
        .trim()
        .to_string();

    let default_region_index = AWS_REGIONS
        .iter()
        .position(|r| *r == current.region)
        .unwrap_or(0);
    let region_index = prompter.choose("region: ", AWS_REGIONS, default_region_index)?;

    Ok(AwsConfig {
        access_key_id,
        secret_access_key,
        region: AWS_REGIONS[region_index].to_string(),
    })
}

fn config_from_env() -> Option<AwsConfig> {
    let access_key_id = env::var("AWS_ACCESS_KEY_ID").ok()?;
    let secret_access_key = env::var("AWS_SECRET_ACCESS_KEY").ok()?;
    let region = env::var("AWS_REGION")
        .or_else(|_| env::var("AWS_DEFAULT_REGION"))
        .unwrap_or_else(|_| DEFAULT_REGION.to_string());

    let config = AwsConfig {
        access_key_id,
        secret_access_key,
        region,
    };
    config.is_valid().then_some(config)
}

fn config_from_system_aws_files() -> Option<AwsConfig> {
    let credentials_path = paths::sys_aws_credentials_file()?;
    let credentials_content = fs::read_to_string(credentials_path).ok()?;
    let credentials = parse_ini_default_section(&credentials_content);

    let mut config = AwsConfig {
        access_key_id: credentials.get("aws_access_key_id")?.clone(),
        secret_access_key: credentials.get("aws_secret_access_key")?.clone(),
        region: DEFAULT_REGION.to_string(),
    };

    if let Some(config_path) = paths::sys_aws_config_file() {
        if let Ok(content) = fs::read_to_string(config_path) {
            if let Some(region) = parse_ini_default_section(&content).get("region") {
                config.region = region.clone();
            }
        }
    }

    Some(config)
}

/// Extracts `key = value` pairs from the `[default]` section of an ini-style
/// aws credentials/config file.
pub fn parse_ini_default_section(content: &str) -> std::collections::HashMap<String, String> {
    let mut result = std::collections::HashMap::new();
    let mut in_default = false;
    for line in content.lines() {
        let line = line.trim();
        if line.starts_with('[') {
            in_default = line == "[default]";
        } else if in_default {
            if let Some((key, value)) = line.split_once('=') {
                result.insert(key.trim().to_string(), value.trim().to_string());
            }
        }
    }
    result
}

pub fn load_aws_config_file(file_path: &Path) -> Option<AwsConfig> {
    let content = fs::read_to_string(file_path).ok()?;
    serde_json::from_str(&content).ok()
}

pub fn save_aws_config_file(file_path: &Path, config: &AwsConfig) -> Result<()> {
    if let Some(parent) = file_path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create config directory {}", parent.display()))?;
    }
    let json_string = serde_json::to_string_pretty(config)?;
    fs::write(file_path, json_string)
        .with_context(|| format!("Failed to write aws config file {}", file_path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prompt::ScriptedPrompter;

    #[test]
    fn test_default_config_is_invalid() {
        let config = AwsConfig::default();
        assert!(!config.is_valid());
    }

    #[test]
    fn test_valid_config() {
        let config = AwsConfig {
            access_key_id: "AKIAEXAMPLE".to_string(),
            secret_access_key: "secret".to_string(),
            region: "us-west-2".to_string(),
        };
        assert!(config.is_valid());
    }

    #[test]
    fn test_unknown_region_is_invalid() {
        let config = AwsConfig {
            access_key_id: "AKIAEXAMPLE".to_string(),
            secret_access_key: "secret".to_string(),
            region: "mars-north-1".to_string(),
        };
        assert!(!config.is_valid());
    }

    #[test]
    fn test_parse_ini_default_section() {
        let content = "\
[default]
aws_access_key_id = AKIAEXAMPLE
aws_secret_access_key = wJalrXUtnFEMI
[other]
aws_access_key_id = AKIAOTHER
";
        let parsed = parse_ini_default_section(content);
        assert_eq!(parsed.get("aws_access_key_id").unwrap(), "AKIAEXAMPLE");
        assert_eq!(parsed.get("aws_secret_access_key").unwrap(), "wJalrXUtnFEMI");
        assert_eq!(parsed.len(), 2);
    }

    #[test]
    fn test_parse_ini_no_default_section() {
        let content = "[profile dev]\nregion = eu-west-1\n";
        let parsed = parse_ini_default_section(content);
        assert!(parsed.is_empty());
    }

    #[test]
    fn test_aws_config_file_round_trip() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let file_path = dir.path().join("aws-config.json");
        let config = AwsConfig {
            access_key_id: "AKIAEXAMPLE".to_string(),
            secret_access_key: "secret".to_string(),
            region: "ap-northeast-1".to_string(),
        };
        save_aws_config_file(&file_path, &config)?;
        let loaded = load_aws_config_file(&file_path).expect("config file should load");
        assert_eq!(loaded.access_key_id, config.access_key_id);
        assert_eq!(loaded.region, config.region);
        Ok(())
    }

    #[test]
    fn test_configure_aws_applies_answers() -> anyhow::Result<()> {
        let mut prompter = ScriptedPrompter::new();
        prompter.push_input("AKIANEWKEY");
        prompter.push_input("newsecret");
        prompter.push_choice(2); // us-west-2

        let config = configure_aws(&mut prompter, AwsConfig::default())?;
        assert_eq!(config.access_key_id, "AKIANEWKEY");
        assert_eq!(config.secret_access_key, "newsecret");
        assert_eq!(config.region, "us-west-2");
        Ok(())
    }
}
