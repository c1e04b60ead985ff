// backendtool/src/appsync/delete.rs
use anyhow::{Context, Result};
use std::path::Path;

use crate::appsync::{manager, role};
use crate::backend::AwsClients;
use crate::config::AwsConfig;
use crate::errors::AppError;

/// Deletes the remote backend api and its service role. DynamoDB tables are
/// retained and reported so destroying data stays an explicit operator step.
pub async fn run(project_path: &Path, aws: &AwsConfig) -> Result<()> {
    let info = manager::get_appsync_info(project_path)
        .filter(|info| !info.api_id.is_empty())
        .ok_or_else(|| {
            AppError::Backend("no backend api is recorded for this project".to_string())
        })?;

    let clients = AwsClients::connect(aws).await;

    println!("🔥 Deleting backend {} (api id: {})...", info.name, info.api_id);
    clients
        .appsync
        .delete_graphql_api()
        .api_id(&info.api_id)
        .send()
        .await
        .with_context(|| format!("Failed to delete graphql api {}", info.api_id))?;
    println!("✓ Deleted graphql api {}.", info.api_id);

    role::delete_service_role(&clients.iam, &info.name).await;

    if let Ok(settings) = manager::get_settings(project_path) {
        for data_source in settings.data_sources.iter().filter(|d| d.is_dynamodb()) {
            if let Some(table) = &data_source.table {
                println!(
                    "DynamoDB table {} is retained; delete it manually if it is no longer needed.",
                    table.table_name
                );
            }
        }
    }

    manager::clear_appsync_info(project_path)?;
    println!("✅ Backend deleted.");
    Ok(())
}
