// backendtool/src/project/mod.rs
use anyhow::{Context, Result};
use chrono::Local;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::backend::BackendHandle;
use crate::paths;
use crate::prompt::Prompter;

pub const DATE_TIME_FORMAT: &str = "%Y-%m-%d-%H-%M-%S";

/// Persisted record of the local project and its backend association.
///
/// Written as JSON with the original PascalCase key names so existing
/// project-info files keep working. Overwritten in place, never deleted.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct ProjectInfo {
    pub project_name: String,
    pub project_path: PathBuf,
    pub source_dir: String,
    pub distribution_dir: String,
    pub build_command: String,
    pub start_command: String,
    #[serde(rename = "BackendProjectID")]
    pub backend_project_id: String,
    pub backend_project_name: String,
    pub backend_project_creation_time: String,
    pub backend_project_last_updated_time: String,
    pub backend_project_console_url: String,
    pub initialization_time: String,
    pub last_configuration_time: String,
    pub last_sync_time: String,
}

pub fn now_timestamp() -> String {
    Local::now().format(DATE_TIME_FORMAT).to_string()
}

/// Creates a fresh project info record for the given project directory and
/// writes it to the workspace.
pub fn initialize(project_path: &Path) -> Result<ProjectInfo> {
    let project_name = project_path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("untitled")
        .to_string();

    let info = ProjectInfo {
        project_name,
        project_path: project_path.to_path_buf(),
        source_dir: "src".to_string(),
        distribution_dir: "dist".to_string(),
        build_command: "npm run-script build".to_string(),
        start_command: "npm run-script start".to_string(),
        initialization_time: now_timestamp(),
        ..ProjectInfo::default()
    };
    save(&info)?;
    Ok(info)
}

pub fn load(project_path: &Path) -> crate::errors::Result<ProjectInfo> {
    let file_path = paths::project_info_file(project_path);
    let content = fs::read_to_string(&file_path)?;
    let mut info: ProjectInfo = serde_json::from_str(&content)?;
    // The recorded path goes stale when the project directory is moved.
    info.project_path = project_path.to_path_buf();
    Ok(info)
}

pub fn save(info: &ProjectInfo) -> Result<()> {
    let file_path = paths::project_info_file(&info.project_path);
    if let Some(parent) = file_path.parent() {
        fs::create_dir_all(parent).with_context(|| {
            format!("Failed to create workspace directory {}", parent.display())
        })?;
    }
    let json_string = serde_json::to_string_pretty(info)?;
    fs::write(&file_path, json_string)
        .with_context(|| format!("Failed to write project info file {}", file_path.display()))?;
    Ok(())
}

/// Walks up the directory tree looking for a project root (a directory with a
/// readable project info file).
pub fn search_project_root(start: &Path) -> Option<PathBuf> {
    let mut current = start.to_path_buf();
    loop {
        if paths::project_info_file(&current).is_file() {
            return Some(current);
        }
        if !current.pop() {
            return None;
        }
    }
}

/// Maps remote backend details onto the project record; `None` clears the
/// association.
pub fn update_backend_details(info: &mut ProjectInfo, handle: Option<&BackendHandle>) {
    match handle {
        Some(handle) if !handle.project_id.is_empty() => {
            info.backend_project_id = handle.project_id.clone();
            info.backend_project_name = handle.name.clone();
            info.backend_project_creation_time = handle.creation_time.clone();
            info.backend_project_last_updated_time = handle.last_updated_time.clone();
            info.backend_project_console_url = handle.console_url.clone();
        }
        _ => {
            info.backend_project_id = String::new();
            info.backend_project_name = String::new();
            info.backend_project_creation_time = String::new();
            info.backend_project_last_updated_time = String::new();
            info.backend_project_console_url = String::new();
        }
    }
}

/// Asks the operator the project layout questions and stamps the
/// configuration time.
pub fn configure_project_info(
    prompter: &mut dyn Prompter,
    info: &mut ProjectInfo,
) -> Result<()> {
    info.source_dir = prompter.input(
        "Where is your project's source directory: ",
        &info.source_dir,
    )?;
    info.distribution_dir = prompter.input(
        "Where is your project's distribution directory that stores build artifacts: ",
        &info.distribution_dir,
    )?;
    info.build_command = prompter.input(
        "What is your project's build command: ",
        &info.build_command,
    )?;
    info.start_command = prompter.input(
        "What is your project's start command for local test run: ",
        &info.start_command,
    )?;
    info.last_configuration_time = now_timestamp();
    save(info)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prompt::ScriptedPrompter;

    fn sample_handle() -> BackendHandle {
        BackendHandle {
            project_id: "api-123".to_string(),
            name: "demo-backend".to_string(),
            creation_time: "2026-01-01-00-00-00".to_string(),
            last_updated_time: "2026-01-02-00-00-00".to_string(),
            console_url: "https://console.aws.amazon.com/appsync/home".to_string(),
        }
    }

    #[test]
    fn test_initialize_and_load_round_trip() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let project_path = dir.path().join("myapp");
        fs::create_dir_all(&project_path)?;

        let info = initialize(&project_path)?;
        assert_eq!(info.project_name, "myapp");
        assert!(!info.initialization_time.is_empty());

        let loaded = load(&project_path)?;
        assert_eq!(loaded, info);
        Ok(())
    }

    #[test]
    fn test_load_missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load(dir.path()).is_err());
    }

    #[test]
    fn test_search_project_root_walks_up() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let project_path = dir.path().join("myapp");
        let nested = project_path.join("src").join("components");
        fs::create_dir_all(&nested)?;
        initialize(&project_path)?;

        assert_eq!(search_project_root(&nested), Some(project_path.clone()));
        assert_eq!(search_project_root(&project_path), Some(project_path));
        Ok(())
    }

    #[test]
    fn test_search_project_root_none_outside_project() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(search_project_root(dir.path()), None);
    }

    #[test]
    fn test_update_backend_details_set_and_clear() {
        let mut info = ProjectInfo::default();
        update_backend_details(&mut info, Some(&sample_handle()));
        assert_eq!(info.backend_project_id, "api-123");
        assert_eq!(info.backend_project_name, "demo-backend");

        update_backend_details(&mut info, None);
        assert!(info.backend_project_id.is_empty());
        assert!(info.backend_project_console_url.is_empty());
    }

    #[test]
    fn test_configure_project_info_applies_answers() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let project_path = dir.path().join("myapp");
        fs::create_dir_all(&project_path)?;
        let mut info = initialize(&project_path)?;

        let mut prompter = ScriptedPrompter::new();
        prompter.push_input("app/src");
        prompter.push_input("app/dist");
        prompter.push_input("make build");
        prompter.push_input("make run");

        configure_project_info(&mut prompter, &mut info)?;
        assert_eq!(info.source_dir, "app/src");
        assert_eq!(info.distribution_dir, "app/dist");
        assert_eq!(info.build_command, "make build");
        assert_eq!(info.start_command, "make run");
        assert!(!info.last_configuration_time.is_empty());
        assert_eq!(prompter.prompt_count(), 4);
        Ok(())
    }

    #[test]
    fn test_project_info_uses_original_key_names() -> anyhow::Result<()> {
        let mut info = ProjectInfo::default();
        info.backend_project_id = "api-123".to_string();
        let json = serde_json::to_string(&info)?;
        assert!(json.contains("\"BackendProjectID\""));
        assert!(json.contains("\"ProjectName\""));
        Ok(())
    }
}
