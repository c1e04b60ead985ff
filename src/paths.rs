// backendtool/src/paths.rs
//
// Path layout of a backendtool project workspace:
//
//   <project>/
//     .backendtool/                   tool workspace, not to be edited by hand
//       project-info.json
//       current-backend-info/         backend state as of the last sync
//     backend/                        operator-editable backend feature specs
//       appsync/
//         settings.yml
//         schema.graphql
//         resolver-mappings/
use std::path::{Path, PathBuf};

pub const WORKSPACE_DIR_NAME: &str = ".backendtool";
pub const BACKEND_DIR_NAME: &str = "backend";
pub const PROJECT_INFO_FILE_NAME: &str = "project-info.json";
pub const CURRENT_BACKEND_INFO_DIR_NAME: &str = "current-backend-info";
pub const AWS_CONFIG_FILE_NAME: &str = "aws-config.json";

pub const APPSYNC_FEATURE_NAME: &str = "appsync";
pub const APPSYNC_SETTINGS_FILE_NAME: &str = "settings.yml";
pub const APPSYNC_SCHEMA_FILE_NAME: &str = "schema.graphql";
pub const APPSYNC_RESOLVER_MAPPINGS_DIR_NAME: &str = "resolver-mappings";
pub const APPSYNC_INFO_FILE_NAME: &str = "appsync-info.json";
pub const APPSYNC_GRAPHQL_API_FILE_NAME: &str = "graphql-api.json";
pub const APPSYNC_DATA_SOURCES_FILE_NAME: &str = "data-sources.json";
pub const APPSYNC_RESOLVERS_FILE_NAME: &str = "resolvers.json";
pub const APPSYNC_API_KEYS_FILE_NAME: &str = "api-keys.json";

pub fn workspace_dir(project_path: &Path) -> PathBuf {
    project_path.join(WORKSPACE_DIR_NAME)
}

pub fn project_info_file(project_path: &Path) -> PathBuf {
    workspace_dir(project_path).join(PROJECT_INFO_FILE_NAME)
}

pub fn current_backend_info_dir(project_path: &Path) -> PathBuf {
    workspace_dir(project_path).join(CURRENT_BACKEND_INFO_DIR_NAME)
}

pub fn backend_dir(project_path: &Path) -> PathBuf {
    project_path.join(BACKEND_DIR_NAME)
}

pub fn appsync_feature_dir(project_path: &Path) -> PathBuf {
    backend_dir(project_path).join(APPSYNC_FEATURE_NAME)
}

pub fn appsync_settings_file(project_path: &Path) -> PathBuf {
    appsync_feature_dir(project_path).join(APPSYNC_SETTINGS_FILE_NAME)
}

pub fn appsync_schema_file(project_path: &Path) -> PathBuf {
    appsync_feature_dir(project_path).join(APPSYNC_SCHEMA_FILE_NAME)
}

pub fn appsync_resolver_mappings_dir(project_path: &Path) -> PathBuf {
    appsync_feature_dir(project_path).join(APPSYNC_RESOLVER_MAPPINGS_DIR_NAME)
}

pub fn appsync_info_file(project_path: &Path) -> PathBuf {
    current_backend_info_dir(project_path).join(APPSYNC_INFO_FILE_NAME)
}

pub fn current_appsync_dir(project_path: &Path) -> PathBuf {
    current_backend_info_dir(project_path).join(APPSYNC_FEATURE_NAME)
}

/// Per-user directory holding tool-level settings such as the AWS config file.
pub fn system_config_dir() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(WORKSPACE_DIR_NAME))
}

pub fn system_aws_config_file() -> Option<PathBuf> {
    system_config_dir().map(|dir| dir.join(AWS_CONFIG_FILE_NAME))
}

pub fn sys_aws_credentials_file() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".aws").join("credentials"))
}

pub fn sys_aws_config_file() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".aws").join("config"))
}
