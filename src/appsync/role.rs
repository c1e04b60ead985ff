// backendtool/src/appsync/role.rs
use anyhow::{Context, Result};
use serde_json::json;

use crate::errors::AppError;

pub fn service_role_name(api_name: &str) -> String {
    format!("{}-appsync-service-role", api_name)
}

pub fn policy_name(api_name: &str) -> String {
    format!("{}-datasource-access", api_name)
}

fn assume_role_policy_document() -> String {
    json!({
        "Version": "2012-10-17",
        "Statement": [{
            "Effect": "Allow",
            "Principal": { "Service": "appsync.amazonaws.com" },
            "Action": "sts:AssumeRole"
        }]
    })
    .to_string()
}

fn data_source_policy_document(table_arns: &[String]) -> String {
    let mut resources = Vec::new();
    for arn in table_arns {
        resources.push(arn.clone());
        resources.push(format!("{}/index/*", arn));
    }
    json!({
        "Version": "2012-10-17",
        "Statement": [{
            "Effect": "Allow",
            "Action": [
                "dynamodb:GetItem",
                "dynamodb:PutItem",
                "dynamodb:UpdateItem",
                "dynamodb:DeleteItem",
                "dynamodb:Query",
                "dynamodb:Scan",
                "dynamodb:BatchGetItem",
                "dynamodb:BatchWriteItem"
            ],
            "Resource": resources
        }]
    })
    .to_string()
}

/// Returns the ARN of the service role the api's data sources assume,
/// creating the role when it does not exist yet.
pub async fn ensure_service_role(client: &aws_sdk_iam::Client, api_name: &str) -> Result<String> {
    let role_name = service_role_name(api_name);

    if let Ok(existing) = client.get_role().role_name(&role_name).send().await {
        if let Some(role) = existing.role() {
            return Ok(role.arn().to_string());
        }
    }

    let created = client
        .create_role()
        .role_name(&role_name)
        .assume_role_policy_document(assume_role_policy_document())
        .send()
        .await
        .with_context(|| format!("Failed to create service role {}", role_name))?;
    let role = created
        .role()
        .ok_or_else(|| AppError::Backend("create_role returned no role".to_string()))?;
    println!("✓ Created service role {}.", role_name);
    Ok(role.arn().to_string())
}

/// Grants the service role access to the given tables via an inline policy.
pub async fn put_role_policy(
    client: &aws_sdk_iam::Client,
    api_name: &str,
    table_arns: &[String],
) -> Result<()> {
    if table_arns.is_empty() {
        return Ok(());
    }
    client
        .put_role_policy()
        .role_name(service_role_name(api_name))
        .policy_name(policy_name(api_name))
        .policy_document(data_source_policy_document(table_arns))
        .send()
        .await
        .context("Failed to put the data source access policy")?;
    Ok(())
}

/// Best-effort removal of the role and its inline policy; deletion failures
/// are reported, not fatal.
pub async fn delete_service_role(client: &aws_sdk_iam::Client, api_name: &str) {
    let role_name = service_role_name(api_name);

    if let Err(e) = client
        .delete_role_policy()
        .role_name(&role_name)
        .policy_name(policy_name(api_name))
        .send()
        .await
    {
        eprintln!("⚠️ Could not delete policy of role {}: {}", role_name, e);
    }
    match client.delete_role().role_name(&role_name).send().await {
        Ok(_) => println!("✓ Deleted service role {}.", role_name),
        Err(e) => eprintln!("⚠️ Could not delete role {}: {}", role_name, e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_and_policy_names() {
        assert_eq!(service_role_name("notes-api"), "notes-api-appsync-service-role");
        assert_eq!(policy_name("notes-api"), "notes-api-datasource-access");
    }

    #[test]
    fn test_assume_role_policy_targets_appsync() {
        let document = assume_role_policy_document();
        assert!(document.contains("appsync.amazonaws.com"));
        assert!(document.contains("sts:AssumeRole"));
    }

    #[test]
    fn test_data_source_policy_covers_indexes() {
        let arns = vec!["arn:aws:dynamodb:us-east-1:123:table/notes".to_string()];
        let document = data_source_policy_document(&arns);
        assert!(document.contains("arn:aws:dynamodb:us-east-1:123:table/notes"));
        assert!(document.contains("table/notes/index/*"));
        assert!(document.contains("dynamodb:Query"));
    }
}
