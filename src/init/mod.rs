// backendtool/src/init/mod.rs
pub(crate) mod setup;
pub(crate) mod state;
pub(crate) mod strategy;

use anyhow::{Context, Result};
use std::env;
use std::path::Path;

use crate::appsync::manager;
use crate::backend::AwsBackendService;
use crate::config;
use crate::paths;
use crate::project::{self, ProjectInfo};
use crate::prompt::{Prompter, StdinPrompter};
use self::state::InitState;
use self::strategy::InitContext;

/// Public entry point for the init process: detect the workspace condition,
/// derive a strategy, and establish the backend association.
pub async fn run_init_flow(target_backend_id: Option<String>) -> Result<()> {
    let current_dir = env::current_dir().context("Failed to determine the current directory")?;
    let project_path = project::search_project_root(&current_dir).unwrap_or(current_dir);
    let mut prompter = StdinPrompter;
    run_init(&project_path, target_backend_id, &mut prompter).await
}

async fn run_init(
    project_path: &Path,
    target_backend_id: Option<String>,
    prompter: &mut dyn Prompter,
) -> Result<()> {
    let initial_state = state::detect(project_path);

    let project_info = match initial_state {
        InitState::Invalid => None,
        InitState::CleanSlate | InitState::BackendValid => {
            Some(initialize_workspace(project_path, prompter)?)
        }
        InitState::ProjectInfoValid | InitState::Valid => Some(project::load(project_path)?),
    };

    let mut ctx = InitContext::new(
        project_path.to_path_buf(),
        initial_state,
        project_info,
        target_backend_id,
    );
    strategy::choose_strategy(&mut ctx, prompter)?;

    if ctx.strategy.is_none() {
        println!("Init finished without changing the backend association.");
        return Ok(());
    }

    // The spec may still be missing when the operator chose to create from a
    // project-info-only workspace.
    if !manager::is_feature_enabled(project_path) {
        let api_name = default_api_name(&ctx);
        manager::enable(project_path, &api_name)?;
    }

    let aws_config = config::check_aws_config(prompter)?;
    let service = AwsBackendService::new(aws_config);
    let handle = setup::execute(&ctx, &service).await?;

    if let Some(handle) = handle {
        let mut info = match ctx.project_info {
            Some(info) => info,
            None => project::load(project_path)?,
        };
        project::update_backend_details(&mut info, Some(&handle));
        info.last_sync_time = project::now_timestamp();
        project::save(&info)?;

        println!();
        println!("Success! Your project is now initialized with backendtool.");
        print_welcome_message(project_path);
    }
    Ok(())
}

/// Scaffolds a fresh workspace: project info, backend spec defaults, and the
/// project layout questions.
fn initialize_workspace(
    project_path: &Path,
    prompter: &mut dyn Prompter,
) -> Result<ProjectInfo> {
    let mut info = project::initialize(project_path)?;
    if !manager::is_feature_enabled(project_path) {
        manager::enable(project_path, &format!("{}-api", info.project_name))?;
    }

    println!("Please tell us about your project:");
    project::configure_project_info(prompter, &mut info)?;
    Ok(info)
}

fn default_api_name(ctx: &InitContext) -> String {
    let project_name = ctx
        .project_info
        .as_ref()
        .map(|info| info.project_name.clone())
        .unwrap_or_else(|| "backend".to_string());
    format!("{}-api", project_name)
}

fn print_welcome_message(project_path: &Path) {
    println!();
    println!("   {}", paths::workspace_dir(project_path).display());
    println!("     is the workspace of backendtool, please do not modify its contents");
    println!();
    println!("   {}", paths::current_backend_info_dir(project_path).display());
    println!("     contains the information of your backend project from the last");
    println!("     synchronization");
    println!();
    println!("   {}", paths::backend_dir(project_path).display());
    println!("     is where you develop the spec of your backend project");
    println!();
    println!("   backendtool pull");
    println!("     retrieves the latest details of the backend project");
    println!();
    println!("   backendtool push");
    println!("     applies the local backend spec to the cloud");
}
