// backendtool/src/appsync/mod.rs
pub(crate) mod create;
pub(crate) mod delete;
pub(crate) mod diff;
pub(crate) mod manager;
pub(crate) mod retrieve;
pub(crate) mod role;
pub(crate) mod update;
pub(crate) mod wait;

use anyhow::{Context, Result};
use std::env;
use std::path::PathBuf;

use crate::config;
use crate::errors::AppError;
use crate::project::{self, ProjectInfo};
use crate::prompt::{Prompter, StdinPrompter};

fn locate_project() -> Result<(PathBuf, ProjectInfo)> {
    let current_dir = env::current_dir().context("Failed to determine the current directory")?;
    let project_path = project::search_project_root(&current_dir).ok_or_else(|| {
        AppError::InvalidWorkspace(
            "you are not working inside a valid backendtool project".to_string(),
        )
    })?;
    let info = project::load(&project_path)?;
    Ok((project_path, info))
}

/// Public entry point for the pull process: refresh the local
/// current-backend info from the linked remote backend.
pub async fn run_pull_flow() -> Result<()> {
    let (project_path, mut info) = locate_project()?;
    if info.backend_project_id.is_empty() {
        anyhow::bail!("this project has no backend association; run 'backendtool init' first");
    }

    let mut prompter = StdinPrompter;
    let aws = config::check_aws_config(&mut prompter)?;
    let backend_id = info.backend_project_id.clone();
    let handle = retrieve::run(&project_path, &aws, &backend_id).await?;

    project::update_backend_details(&mut info, Some(&handle));
    info.last_sync_time = project::now_timestamp();
    project::save(&info)?;
    Ok(())
}

/// Public entry point for the push process: apply the local feature spec to
/// the linked remote backend.
pub async fn run_push_flow() -> Result<()> {
    let (project_path, mut info) = locate_project()?;
    // push never creates; linking is decided by the operator through init
    if info.backend_project_id.is_empty() {
        anyhow::bail!(
            "this project has no backend association; run 'backendtool init' to create or link a backend before pushing"
        );
    }

    let mut prompter = StdinPrompter;
    let aws = config::check_aws_config(&mut prompter)?;
    let backend_id = info.backend_project_id.clone();
    let handle = update::run(&project_path, &aws, &backend_id).await?;

    project::update_backend_details(&mut info, Some(&handle));
    info.last_sync_time = project::now_timestamp();
    project::save(&info)?;
    Ok(())
}

/// Public entry point for the delete process.
pub async fn run_delete_flow() -> Result<()> {
    let (project_path, mut info) = locate_project()?;
    if info.backend_project_id.is_empty() {
        anyhow::bail!("this project has no backend association; nothing to delete");
    }

    let mut prompter = StdinPrompter;
    let confirmed = prompter.confirm(
        &format!(
            "delete the backend project {} (api id: {})",
            info.backend_project_name, info.backend_project_id
        ),
        false,
    )?;
    if !confirmed {
        println!("Delete aborted.");
        return Ok(());
    }

    let aws = config::check_aws_config(&mut prompter)?;
    delete::run(&project_path, &aws).await?;

    project::update_backend_details(&mut info, None);
    project::save(&info)?;
    Ok(())
}
