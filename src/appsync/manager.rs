// backendtool/src/appsync/manager.rs
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use serde::de::DeserializeOwned;
use std::fs;
use std::path::Path;

use crate::appsync::diff::TableSpec;
use crate::paths;

pub const DATA_SOURCE_TYPE_DYNAMODB: &str = "AMAZON_DYNAMODB";
pub const DEFAULT_AUTHENTICATION_TYPE: &str = "API_KEY";

const DEFAULT_SCHEMA: &str = "\
schema {
    query: Query
}

type Query {
    status: String
}
";

/// Operator-editable AppSync feature spec, read from
/// `backend/appsync/settings.yml`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppSyncSettings {
    pub api_name: String,
    #[serde(default = "default_authentication_type")]
    pub authentication_type: String,
    #[serde(default)]
    pub data_sources: Vec<DataSourceSetting>,
    #[serde(default)]
    pub resolvers: Vec<ResolverSetting>,
}

fn default_authentication_type() -> String {
    DEFAULT_AUTHENTICATION_TYPE.to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataSourceSetting {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(rename = "type")]
    pub source_type: String,
    #[serde(default)]
    pub table: Option<TableSpec>,
}

impl DataSourceSetting {
    pub fn is_dynamodb(&self) -> bool {
        self.source_type == DATA_SOURCE_TYPE_DYNAMODB
    }
}

/// A resolver attachment; the mapping template fields name files under
/// `backend/appsync/resolver-mappings/`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolverSetting {
    pub type_name: String,
    pub field_name: String,
    pub data_source_name: String,
    pub request_mapping_template: String,
    pub response_mapping_template: String,
}

/// Summary of the backend API as of the last create/update/sync, stored at
/// `.backendtool/current-backend-info/appsync-info.json`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AppSyncInfo {
    pub api_id: String,
    pub name: String,
    pub graphql_endpoint: String,
    pub region: String,
    pub authentication_type: String,
    pub api_key: String,
    pub creation_time: String,
    pub last_update_time: String,
    pub last_sync_time: String,
}

// Dressed records mirrored into the current-backend info directory.

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GraphqlApiRecord {
    pub api_id: String,
    pub name: String,
    pub authentication_type: String,
    pub graphql_endpoint: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataSourceRecord {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(rename = "type")]
    pub source_type: String,
    pub service_role_arn: String,
    #[serde(default)]
    pub table: Option<TableSpec>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolverRecord {
    pub type_name: String,
    pub field_name: String,
    pub data_source_name: String,
    #[serde(default)]
    pub request_mapping_template: String,
    #[serde(default)]
    pub response_mapping_template: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiKeyRecord {
    pub id: String,
    #[serde(default)]
    pub description: Option<String>,
}

pub fn is_feature_enabled(project_path: &Path) -> bool {
    paths::appsync_settings_file(project_path).is_file()
}

pub fn get_settings(project_path: &Path) -> crate::errors::Result<AppSyncSettings> {
    let file_path = paths::appsync_settings_file(project_path);
    let content = fs::read_to_string(&file_path)?;
    let settings: AppSyncSettings = serde_yaml::from_str(&content)?;
    Ok(settings)
}

pub fn get_schema(project_path: &Path) -> crate::errors::Result<String> {
    Ok(fs::read_to_string(paths::appsync_schema_file(project_path))?)
}

pub fn get_mapping(project_path: &Path, name: &str) -> Result<String> {
    let file_path = paths::appsync_resolver_mappings_dir(project_path).join(name);
    fs::read_to_string(&file_path)
        .with_context(|| format!("Failed to read resolver mapping {}", file_path.display()))
}

pub fn get_appsync_info(project_path: &Path) -> Option<AppSyncInfo> {
    let content = fs::read_to_string(paths::appsync_info_file(project_path)).ok()?;
    serde_json::from_str(&content).ok()
}

pub fn update_appsync_info(project_path: &Path, info: &AppSyncInfo) -> Result<()> {
    write_json_file(&paths::appsync_info_file(project_path), info)
}

pub fn clear_appsync_info(project_path: &Path) -> Result<()> {
    write_json_file(&paths::appsync_info_file(project_path), &AppSyncInfo::default())
}

/// Scaffolds the feature directory with a default spec when none exists.
pub fn enable(project_path: &Path, api_name: &str) -> Result<()> {
    let feature_dir = paths::appsync_feature_dir(project_path);
    if is_feature_enabled(project_path) {
        return Ok(());
    }
    fs::create_dir_all(paths::appsync_resolver_mappings_dir(project_path)).with_context(|| {
        format!("Failed to create feature directory {}", feature_dir.display())
    })?;

    let settings = AppSyncSettings {
        api_name: api_name.to_string(),
        authentication_type: DEFAULT_AUTHENTICATION_TYPE.to_string(),
        data_sources: Vec::new(),
        resolvers: Vec::new(),
    };
    let yaml_string = serde_yaml::to_string(&settings)?;
    fs::write(paths::appsync_settings_file(project_path), yaml_string)
        .context("Failed to write default appsync settings")?;

    let schema_file = paths::appsync_schema_file(project_path);
    if !schema_file.exists() {
        fs::write(&schema_file, DEFAULT_SCHEMA).context("Failed to write default schema")?;
    }
    Ok(())
}

/// Writes the dressed remote state into the current-backend info directory.
pub fn write_current_backend_info(
    project_path: &Path,
    api: &GraphqlApiRecord,
    data_sources: &[DataSourceRecord],
    resolvers: &[ResolverRecord],
    api_keys: &[ApiKeyRecord],
    schema: &str,
) -> Result<()> {
    let current_dir = paths::current_appsync_dir(project_path);
    fs::create_dir_all(&current_dir).with_context(|| {
        format!(
            "Failed to create current backend info directory {}",
            current_dir.display()
        )
    })?;

    write_json_file(&current_dir.join(paths::APPSYNC_GRAPHQL_API_FILE_NAME), api)?;
    write_json_file(
        &current_dir.join(paths::APPSYNC_DATA_SOURCES_FILE_NAME),
        &data_sources,
    )?;
    write_json_file(
        &current_dir.join(paths::APPSYNC_RESOLVERS_FILE_NAME),
        &resolvers,
    )?;
    write_json_file(&current_dir.join(paths::APPSYNC_API_KEYS_FILE_NAME), &api_keys)?;
    fs::write(current_dir.join(paths::APPSYNC_SCHEMA_FILE_NAME), schema)
        .context("Failed to write current backend schema")?;
    Ok(())
}

pub fn read_json_file<T: DeserializeOwned>(file_path: &Path) -> Result<T> {
    let content = fs::read_to_string(file_path)
        .with_context(|| format!("Failed to read {}", file_path.display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse JSON from {}", file_path.display()))
}

fn write_json_file<T: Serialize>(file_path: &Path, value: &T) -> Result<()> {
    if let Some(parent) = file_path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory {}", parent.display()))?;
    }
    let json_string = serde_json::to_string_pretty(value)?;
    fs::write(file_path, json_string)
        .with_context(|| format!("Failed to write {}", file_path.display()))?;
    Ok(())
}
