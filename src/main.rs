//! Backend Lifecycle Tool
//!
//! Provides a CLI for initializing a project's cloud backend association and
//! driving create/link/pull/push/delete operations against it.

// backendtool/src/main.rs
mod appsync;
mod backend;
mod config;
mod errors;
mod init;
mod paths;
mod project;
mod prompt;

use anyhow::{Context, Result};
use std::env;
use std::process::ExitCode;

/// Main entry point for the backend lifecycle tool
#[tokio::main]
async fn main() -> ExitCode {
    match run_app().await {
        Ok(_) => {
            println!("✅ Operation completed successfully.");
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("❌ Error: {:?}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run_app() -> Result<()> {
    dotenv::dotenv().ok();

    let args: Vec<String> = env::args().collect();
    let choice = if args.len() > 1 {
        args[1].trim().to_string()
    } else {
        prompt_choice()?
    };

    match choice.as_str() {
        "1" | "init" => {
            println!("🚀 Starting Init Process...");
            let target_backend_id = args.get(2).map(|id| id.trim().to_string());
            init::run_init_flow(target_backend_id)
                .await
                .context("Init process failed")?;
        }
        "2" | "pull" => {
            println!("🔄 Starting Pull Process...");
            appsync::run_pull_flow().await.context("Pull process failed")?;
        }
        "3" | "push" => {
            println!("⚙️ Starting Push Process...");
            appsync::run_push_flow().await.context("Push process failed")?;
        }
        "4" | "delete" => {
            println!("🔥 Starting Delete Process...");
            appsync::run_delete_flow()
                .await
                .context("Delete process failed")?;
        }
        _ => {
            println!(
                "❌ Invalid choice. Please enter '1' (init), '2' (pull), '3' (push), or '4' (delete)."
            );
            anyhow::bail!("Invalid operation choice");
        }
    }
    Ok(())
}

/// Prompts user to select an operation
///
/// Returns the user's choice as String
fn prompt_choice() -> Result<String> {
    use std::io::{Write, stdin, stdout};

    println!("Select an operation:");
    println!("1. Init Project Backend (or type 'init')");
    println!("2. Pull Backend Details (or type 'pull')");
    println!("3. Push Backend Spec (or type 'push')");
    println!("4. Delete Backend (or type 'delete')");
    print!("Enter your choice: ");
    let _ = stdout().flush().context("Failed to flush stdout")?;

    let mut input = String::new();
    stdin()
        .read_line(&mut input)
        .context("Failed to read user input")?;
    Ok(input.trim().to_string())
}
