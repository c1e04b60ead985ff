// backendtool/src/init/strategy.rs
use anyhow::Result;
use std::path::PathBuf;

use crate::init::state::InitState;
use crate::project::ProjectInfo;
use crate::prompt::Prompter;

/// The chosen path for establishing or re-establishing the backend
/// association. An unset strategy means the setup step does nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    /// Create a new backend from the local feature spec.
    Create,
    /// A usable backend spec is already in the project; create a new backend
    /// based on it.
    Clone,
    /// Link to the backend identified by the target backend id.
    Link,
}

/// State threaded through the init steps; owned by the command invocation.
#[derive(Debug)]
pub struct InitContext {
    pub project_path: PathBuf,
    pub initial_state: InitState,
    pub project_info: Option<ProjectInfo>,
    pub target_backend_id: Option<String>,
    pub strategy: Option<Strategy>,
}

impl InitContext {
    pub fn new(
        project_path: PathBuf,
        initial_state: InitState,
        project_info: Option<ProjectInfo>,
        target_backend_id: Option<String>,
    ) -> Self {
        InitContext {
            project_path,
            initial_state,
            project_info,
            target_backend_id,
            strategy: None,
        }
    }
}

/// Derives the strategy from the detected state, the existing project info
/// and the optional caller-supplied target backend id.
///
/// Ambiguous intent (a target conflicting with the recorded association) is
/// always routed through a confirmation gate, never resolved automatically.
/// Misconfiguration results in no strategy rather than an error.
pub fn choose_strategy(ctx: &mut InitContext, prompter: &mut dyn Prompter) -> Result<()> {
    ctx.strategy = match ctx.initial_state {
        InitState::Invalid => {
            println!(
                "❌ The local project state under {} is invalid.",
                ctx.project_path.display()
            );
            println!("Please repair or remove the corrupted files, then run init again.");
            None
        }
        InitState::CleanSlate => {
            if ctx.target_backend_id.is_some() {
                Some(Strategy::Link)
            } else {
                Some(Strategy::Create)
            }
        }
        InitState::BackendValid => {
            if ctx.target_backend_id.is_some() {
                Some(Strategy::Link)
            } else {
                Some(Strategy::Clone)
            }
        }
        InitState::ProjectInfoValid => choose_for_project_info_valid(ctx, prompter)?,
        InitState::Valid => choose_for_valid(ctx, prompter)?,
    };
    Ok(())
}

fn choose_for_project_info_valid(
    ctx: &mut InitContext,
    prompter: &mut dyn Prompter,
) -> Result<Option<Strategy>> {
    let Some(info) = ctx.project_info.clone() else {
        return Ok(None);
    };
    print_current_backend(&info);

    match ctx.target_backend_id.clone() {
        Some(target) if target != info.backend_project_id => {
            if confirm_switch(prompter, &target)? {
                Ok(Some(prep_switch()))
            } else if confirm_reestablish(prompter)? {
                Ok(Some(prep_reestablish(ctx, &info)))
            } else {
                Ok(None)
            }
        }
        Some(_) => Ok(Some(prep_reestablish(ctx, &info))),
        None => match choose_reestablish_or_new(prompter)? {
            ReestablishOrNew::Create => Ok(Some(prep_create_new())),
            ReestablishOrNew::Reestablish => Ok(Some(prep_reestablish(ctx, &info))),
        },
    }
}

fn choose_for_valid(
    ctx: &mut InitContext,
    prompter: &mut dyn Prompter,
) -> Result<Option<Strategy>> {
    let Some(info) = ctx.project_info.clone() else {
        return Ok(None);
    };
    print_current_backend(&info);

    match ctx.target_backend_id.clone() {
        Some(target) if target != info.backend_project_id => {
            if confirm_switch(prompter, &target)? {
                Ok(Some(prep_switch()))
            } else {
                Ok(None)
            }
        }
        Some(target) => {
            println!("You have specified the same id: {}", target);
            println!("Init is aborted.");
            println!("# to retrieve the latest details of the backend project");
            println!("    $ backendtool pull");
            Ok(None)
        }
        None => {
            if confirm_create_new(prompter)? {
                Ok(Some(prep_create_new()))
            } else {
                Ok(None)
            }
        }
    }
}

fn print_current_backend(info: &ProjectInfo) {
    println!(
        "This project's backend is currently set to be {}",
        info.backend_project_name
    );
    println!("with backend project id = {}", info.backend_project_id);
    println!("and was initialized at {}", info.initialization_time);
}

// Each gate asks exactly one question and maps the answer to at most one
// strategy mutation.

fn confirm_switch(prompter: &mut dyn Prompter, target: &str) -> Result<bool> {
    prompter.confirm(
        &format!("switch backend to the project with id = {}", target),
        false,
    )
}

fn confirm_reestablish(prompter: &mut dyn Prompter) -> Result<bool> {
    prompter.confirm(
        "re-establish association with the original backend project",
        true,
    )
}

fn confirm_create_new(prompter: &mut dyn Prompter) -> Result<bool> {
    prompter.confirm("create a new backend project as the backend", false)
}

enum ReestablishOrNew {
    Create,
    Reestablish,
}

fn choose_reestablish_or_new(prompter: &mut dyn Prompter) -> Result<ReestablishOrNew> {
    let choice = prompter.choose(
        "create a new backend or re-establish association with the original backend",
        &["create a new backend", "re-establish association"],
        0,
    )?;
    Ok(if choice == 1 {
        ReestablishOrNew::Reestablish
    } else {
        ReestablishOrNew::Create
    })
}

fn prep_create_new() -> Strategy {
    println!("Init will now try to create a new backend project.");
    Strategy::Create
}

fn prep_switch() -> Strategy {
    println!("Init will now try to switch to the newly specified backend.");
    Strategy::Link
}

/// Restores the target id from the recorded association before linking.
fn prep_reestablish(ctx: &mut InitContext, info: &ProjectInfo) -> Strategy {
    println!("Init will now try to re-establish the association with the backend project.");
    ctx.target_backend_id = Some(info.backend_project_id.clone());
    Strategy::Link
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prompt::ScriptedPrompter;

    fn info_with_backend(backend_id: &str) -> ProjectInfo {
        ProjectInfo {
            project_name: "myapp".to_string(),
            backend_project_id: backend_id.to_string(),
            backend_project_name: "myapp-backend".to_string(),
            initialization_time: "2026-01-01-00-00-00".to_string(),
            ..ProjectInfo::default()
        }
    }

    fn context(
        state: InitState,
        info: Option<ProjectInfo>,
        target: Option<&str>,
    ) -> InitContext {
        InitContext::new(
            PathBuf::from("/tmp/myapp"),
            state,
            info,
            target.map(str::to_string),
        )
    }

    fn run(ctx: &mut InitContext, prompter: &mut ScriptedPrompter) {
        choose_strategy(ctx, prompter).unwrap();
    }

    #[test]
    fn test_clean_slate_with_target_links() {
        let mut ctx = context(InitState::CleanSlate, None, Some("proj-123"));
        let mut prompter = ScriptedPrompter::new();
        run(&mut ctx, &mut prompter);
        assert_eq!(ctx.strategy, Some(Strategy::Link));
        assert_eq!(prompter.prompt_count(), 0);
    }

    #[test]
    fn test_clean_slate_without_target_creates() {
        let mut ctx = context(InitState::CleanSlate, None, None);
        let mut prompter = ScriptedPrompter::new();
        run(&mut ctx, &mut prompter);
        assert_eq!(ctx.strategy, Some(Strategy::Create));
        assert_eq!(prompter.prompt_count(), 0);
    }

    #[test]
    fn test_backend_valid_with_target_links() {
        let mut ctx = context(InitState::BackendValid, None, Some("proj-123"));
        let mut prompter = ScriptedPrompter::new();
        run(&mut ctx, &mut prompter);
        assert_eq!(ctx.strategy, Some(Strategy::Link));
        assert_eq!(prompter.prompt_count(), 0);
    }

    #[test]
    fn test_backend_valid_without_target_clones() {
        let mut ctx = context(InitState::BackendValid, None, None);
        let mut prompter = ScriptedPrompter::new();
        run(&mut ctx, &mut prompter);
        assert_eq!(ctx.strategy, Some(Strategy::Clone));
        assert_eq!(prompter.prompt_count(), 0);
    }

    #[test]
    fn test_invalid_yields_no_strategy() {
        let mut ctx = context(InitState::Invalid, None, Some("proj-123"));
        let mut prompter = ScriptedPrompter::new();
        run(&mut ctx, &mut prompter);
        assert_eq!(ctx.strategy, None);
        assert_eq!(prompter.prompt_count(), 0);
    }

    #[test]
    fn test_project_info_valid_differing_target_switch_accepted() {
        let mut ctx = context(
            InitState::ProjectInfoValid,
            Some(info_with_backend("proj-123")),
            Some("proj-999"),
        );
        let mut prompter = ScriptedPrompter::new();
        prompter.push_confirm(true);
        run(&mut ctx, &mut prompter);
        assert_eq!(ctx.strategy, Some(Strategy::Link));
        assert_eq!(ctx.target_backend_id.as_deref(), Some("proj-999"));
        assert_eq!(prompter.prompt_count(), 1);
    }

    #[test]
    fn test_project_info_valid_switch_declined_reestablish_accepted() {
        let mut ctx = context(
            InitState::ProjectInfoValid,
            Some(info_with_backend("proj-123")),
            Some("proj-999"),
        );
        let mut prompter = ScriptedPrompter::new();
        prompter.push_confirm(false);
        prompter.push_confirm(true);
        run(&mut ctx, &mut prompter);
        assert_eq!(ctx.strategy, Some(Strategy::Link));
        // the target is restored from the recorded association
        assert_eq!(ctx.target_backend_id.as_deref(), Some("proj-123"));
        assert_eq!(prompter.prompt_count(), 2);
    }

    #[test]
    fn test_project_info_valid_both_gates_declined_is_noop() {
        let mut ctx = context(
            InitState::ProjectInfoValid,
            Some(info_with_backend("proj-123")),
            Some("proj-999"),
        );
        let mut prompter = ScriptedPrompter::new();
        prompter.push_confirm(false);
        prompter.push_confirm(false);
        run(&mut ctx, &mut prompter);
        assert_eq!(ctx.strategy, None);
        assert_eq!(prompter.prompt_count(), 2);
    }

    #[test]
    fn test_project_info_valid_same_target_links_without_prompt() {
        let mut ctx = context(
            InitState::ProjectInfoValid,
            Some(info_with_backend("proj-123")),
            Some("proj-123"),
        );
        let mut prompter = ScriptedPrompter::new();
        run(&mut ctx, &mut prompter);
        assert_eq!(ctx.strategy, Some(Strategy::Link));
        assert_eq!(ctx.target_backend_id.as_deref(), Some("proj-123"));
        assert_eq!(prompter.prompt_count(), 0);
    }

    #[test]
    fn test_project_info_valid_no_target_asks_exactly_once_create() {
        let mut ctx = context(
            InitState::ProjectInfoValid,
            Some(info_with_backend("proj-123")),
            None,
        );
        let mut prompter = ScriptedPrompter::new();
        prompter.push_choice(0);
        run(&mut ctx, &mut prompter);
        assert_eq!(ctx.strategy, Some(Strategy::Create));
        assert_eq!(prompter.prompt_count(), 1);
    }

    #[test]
    fn test_project_info_valid_no_target_asks_exactly_once_reestablish() {
        let mut ctx = context(
            InitState::ProjectInfoValid,
            Some(info_with_backend("proj-123")),
            None,
        );
        let mut prompter = ScriptedPrompter::new();
        prompter.push_choice(1);
        run(&mut ctx, &mut prompter);
        assert_eq!(ctx.strategy, Some(Strategy::Link));
        assert_eq!(ctx.target_backend_id.as_deref(), Some("proj-123"));
        assert_eq!(prompter.prompt_count(), 1);
    }

    #[test]
    fn test_valid_differing_target_switch_accepted() {
        let mut ctx = context(
            InitState::Valid,
            Some(info_with_backend("proj-123")),
            Some("proj-999"),
        );
        let mut prompter = ScriptedPrompter::new();
        prompter.push_confirm(true);
        run(&mut ctx, &mut prompter);
        assert_eq!(ctx.strategy, Some(Strategy::Link));
        assert_eq!(prompter.prompt_count(), 1);
    }

    #[test]
    fn test_valid_differing_target_switch_declined_aborts() {
        let mut ctx = context(
            InitState::Valid,
            Some(info_with_backend("proj-123")),
            Some("proj-999"),
        );
        let mut prompter = ScriptedPrompter::new();
        prompter.push_confirm(false);
        run(&mut ctx, &mut prompter);
        assert_eq!(ctx.strategy, None);
        assert_eq!(prompter.prompt_count(), 1);
    }

    #[test]
    fn test_valid_same_target_aborts_without_prompt() {
        let mut ctx = context(
            InitState::Valid,
            Some(info_with_backend("proj-123")),
            Some("proj-123"),
        );
        let mut prompter = ScriptedPrompter::new();
        run(&mut ctx, &mut prompter);
        assert_eq!(ctx.strategy, None);
        assert_eq!(prompter.prompt_count(), 0);
    }

    #[test]
    fn test_valid_no_target_create_confirmed() {
        let mut ctx = context(InitState::Valid, Some(info_with_backend("proj-123")), None);
        let mut prompter = ScriptedPrompter::new();
        prompter.push_confirm(true);
        run(&mut ctx, &mut prompter);
        assert_eq!(ctx.strategy, Some(Strategy::Create));
        assert_eq!(prompter.prompt_count(), 1);
    }

    #[test]
    fn test_valid_no_target_create_declined_is_noop() {
        let mut ctx = context(InitState::Valid, Some(info_with_backend("proj-123")), None);
        let mut prompter = ScriptedPrompter::new();
        prompter.push_confirm(false);
        run(&mut ctx, &mut prompter);
        assert_eq!(ctx.strategy, None);
        assert_eq!(prompter.prompt_count(), 1);
    }

    #[test]
    fn test_selector_is_idempotent_without_gate_interaction() {
        for _ in 0..2 {
            let mut ctx = context(InitState::CleanSlate, None, Some("proj-123"));
            let mut prompter = ScriptedPrompter::new();
            run(&mut ctx, &mut prompter);
            assert_eq!(ctx.strategy, Some(Strategy::Link));
            assert_eq!(prompter.prompt_count(), 0);
        }
    }
}
