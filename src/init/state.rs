// backendtool/src/init/state.rs
use std::path::Path;

use crate::appsync::manager;
use crate::paths;
use crate::project;

/// Condition of the working directory at the start of an init invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InitState {
    /// No prior project artifacts at all.
    CleanSlate,
    /// Artifacts exist but neither the project info nor the backend spec is
    /// usable.
    Invalid,
    /// A usable backend spec exists locally but no project info.
    BackendValid,
    /// Project info exists but the backend spec does not (or is unusable).
    ProjectInfoValid,
    /// Both the project info and the backend spec are present and parse.
    Valid,
}

/// Classifies the project directory. Corruption never raises here; it maps
/// to `Invalid` so the caller can surface it to the operator.
pub fn detect(project_path: &Path) -> InitState {
    let workspace_present = paths::workspace_dir(project_path).exists();
    let backend_present = paths::backend_dir(project_path).exists();

    if !workspace_present && !backend_present {
        return InitState::CleanSlate;
    }

    let info_ok = project::load(project_path).is_ok();
    let spec_ok = manager::get_settings(project_path).is_ok();

    match (info_ok, spec_ok) {
        (true, true) => InitState::Valid,
        (true, false) => InitState::ProjectInfoValid,
        (false, true) => InitState::BackendValid,
        (false, false) => InitState::Invalid,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_detect_clean_slate() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(detect(dir.path()), InitState::CleanSlate);
    }

    #[test]
    fn test_detect_valid() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        project::initialize(dir.path())?;
        manager::enable(dir.path(), "myapp-api")?;
        assert_eq!(detect(dir.path()), InitState::Valid);
        Ok(())
    }

    #[test]
    fn test_detect_project_info_valid_without_spec() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        project::initialize(dir.path())?;
        assert_eq!(detect(dir.path()), InitState::ProjectInfoValid);
        Ok(())
    }

    #[test]
    fn test_detect_backend_valid_without_info() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        manager::enable(dir.path(), "myapp-api")?;
        assert_eq!(detect(dir.path()), InitState::BackendValid);
        Ok(())
    }

    #[test]
    fn test_detect_invalid_on_corrupted_info() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        fs::create_dir_all(paths::workspace_dir(dir.path()))?;
        fs::write(paths::project_info_file(dir.path()), "not json at all")?;
        assert_eq!(detect(dir.path()), InitState::Invalid);
        Ok(())
    }

    #[test]
    fn test_detect_invalid_on_empty_workspace_dir() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        fs::create_dir_all(paths::workspace_dir(dir.path()))?;
        assert_eq!(detect(dir.path()), InitState::Invalid);
        Ok(())
    }

    #[test]
    fn test_detect_valid_requires_parsable_spec() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        project::initialize(dir.path())?;
        fs::create_dir_all(paths::appsync_feature_dir(dir.path()))?;
        fs::write(paths::appsync_settings_file(dir.path()), ": not [ yaml")?;
        assert_eq!(detect(dir.path()), InitState::ProjectInfoValid);
        Ok(())
    }
}
