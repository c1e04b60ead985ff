// backendtool/src/appsync/update.rs
use anyhow::{Context, Result};
use aws_sdk_appsync::primitives::Blob;
use aws_sdk_appsync::types::{AuthenticationType, DataSourceType, DynamodbDataSourceConfig};
use aws_sdk_dynamodb::types::ProvisionedThroughput;
use std::collections::HashSet;
use std::path::Path;

use crate::appsync::create;
use crate::appsync::diff::{self, DiffMark, TableSpec};
use crate::appsync::manager::{self, DataSourceSetting};
use crate::appsync::{retrieve, role, wait};
use crate::backend::{AwsClients, BackendHandle, console_url};
use crate::config::AwsConfig;
use crate::project;

/// Applies the local feature spec to the already-linked remote backend.
///
/// Every divergence is reconciled with a genuine update call; this path
/// never falls back to re-creating the api.
pub async fn run(project_path: &Path, aws: &AwsConfig, api_id: &str) -> Result<BackendHandle> {
    let settings =
        manager::get_settings(project_path).context("Failed to load the appsync feature settings")?;
    let schema = manager::get_schema(project_path).context("Failed to read the graphql schema")?;
    let clients = AwsClients::connect(aws).await;

    println!(
        "⚙️ Updating backend {} (api id: {})...",
        settings.api_name, api_id
    );

    let ds_output = clients
        .appsync
        .list_data_sources()
        .api_id(api_id)
        .send()
        .await
        .context("Failed to list data sources")?;
    let remote_data_source_names: HashSet<String> = ds_output
        .data_sources()
        .iter()
        .filter_map(|d| d.name().map(str::to_string))
        .collect();

    let mut remote_tables = Vec::new();
    for data_source in ds_output.data_sources() {
        if let Some(config) = data_source.dynamodb_config() {
            if let Ok(output) = clients
                .dynamodb
                .describe_table()
                .table_name(config.table_name())
                .send()
                .await
            {
                if let Some(description) = output.table() {
                    remote_tables.push(diff::dress_table(description));
                }
            }
        }
    }

    let local_tables: Vec<TableSpec> = settings
        .data_sources
        .iter()
        .filter(|d| d.is_dynamodb())
        .filter_map(|d| d.table.clone())
        .collect();

    for (mark, spec) in diff::diff_tables(&local_tables, &remote_tables) {
        match mark {
            DiffMark::Create => {
                create::ensure_ddb_table(&clients.dynamodb, &spec).await?;
            }
            DiffMark::Update => {
                update_ddb_table(&clients.dynamodb, &spec, &remote_tables).await?;
            }
            DiffMark::Delete => {
                println!(
                    "Table {} no longer appears in the local spec; it is retained and must be removed manually.",
                    spec.table_name
                );
            }
            DiffMark::None => {}
        }
    }

    let mut table_arns = Vec::new();
    for spec in &local_tables {
        if let Ok(output) = clients
            .dynamodb
            .describe_table()
            .table_name(&spec.table_name)
            .send()
            .await
        {
            if let Some(arn) = output.table().and_then(|t| t.table_arn()) {
                table_arns.push(arn.to_string());
            }
        }
    }

    let role_arn = if settings.data_sources.iter().any(|d| d.is_dynamodb()) {
        let arn = role::ensure_service_role(&clients.iam, &settings.api_name).await?;
        role::put_role_policy(&clients.iam, &settings.api_name, &table_arns).await?;
        Some(arn)
    } else {
        None
    };

    clients
        .appsync
        .update_graphql_api()
        .api_id(api_id)
        .name(&settings.api_name)
        .authentication_type(AuthenticationType::from(
            settings.authentication_type.as_str(),
        ))
        .send()
        .await
        .context("Failed to update the graphql api")?;

    clients
        .appsync
        .start_schema_creation()
        .api_id(api_id)
        .definition(Blob::new(schema.into_bytes()))
        .send()
        .await
        .context("Failed to start schema creation")?;
    wait::wait_for_schema_creation(&clients.appsync, api_id).await?;
    println!("✓ Schema updated.");

    for data_source in &settings.data_sources {
        if remote_data_source_names.contains(&data_source.name) {
            update_data_source(&clients, api_id, data_source, role_arn.as_deref()).await?;
        } else {
            create::create_data_source(&clients, api_id, data_source, role_arn.as_deref()).await?;
        }
    }

    let mut existing_resolvers = HashSet::new();
    let type_names: HashSet<&str> = settings
        .resolvers
        .iter()
        .map(|r| r.type_name.as_str())
        .collect();
    for type_name in type_names {
        if let Ok(output) = clients
            .appsync
            .list_resolvers()
            .api_id(api_id)
            .type_name(type_name)
            .send()
            .await
        {
            for resolver in output.resolvers() {
                existing_resolvers.insert((
                    resolver.type_name().unwrap_or_default().to_string(),
                    resolver.field_name().unwrap_or_default().to_string(),
                ));
            }
        }
    }

    for resolver in &settings.resolvers {
        let request = manager::get_mapping(project_path, &resolver.request_mapping_template)?;
        let response = manager::get_mapping(project_path, &resolver.response_mapping_template)?;
        let exists = existing_resolvers
            .contains(&(resolver.type_name.clone(), resolver.field_name.clone()));
        if exists {
            clients
                .appsync
                .update_resolver()
                .api_id(api_id)
                .type_name(&resolver.type_name)
                .field_name(&resolver.field_name)
                .data_source_name(&resolver.data_source_name)
                .request_mapping_template(request)
                .response_mapping_template(response)
                .send()
                .await
                .with_context(|| {
                    format!(
                        "Failed to update resolver {}.{}",
                        resolver.type_name, resolver.field_name
                    )
                })?;
            println!(
                "✓ Updated resolver {}.{}.",
                resolver.type_name, resolver.field_name
            );
        } else {
            clients
                .appsync
                .create_resolver()
                .api_id(api_id)
                .type_name(&resolver.type_name)
                .field_name(&resolver.field_name)
                .data_source_name(&resolver.data_source_name)
                .request_mapping_template(request)
                .response_mapping_template(response)
                .send()
                .await
                .with_context(|| {
                    format!(
                        "Failed to create resolver {}.{}",
                        resolver.type_name, resolver.field_name
                    )
                })?;
            println!(
                "✓ Created resolver {}.{}.",
                resolver.type_name, resolver.field_name
            );
        }
    }

    if settings.authentication_type == manager::DEFAULT_AUTHENTICATION_TYPE {
        let keys_output = clients
            .appsync
            .list_api_keys()
            .api_id(api_id)
            .send()
            .await
            .context("Failed to list api keys")?;
        if keys_output.api_keys().is_empty() {
            clients
                .appsync
                .create_api_key()
                .api_id(api_id)
                .send()
                .await
                .context("Failed to create the api key")?;
            println!("✓ Created api key.");
        }
    }

    let now = project::now_timestamp();
    let mut info = manager::get_appsync_info(project_path).unwrap_or_default();
    info.last_update_time = now.clone();
    manager::update_appsync_info(project_path, &info)?;

    retrieve::sync_current_backend_info(project_path, &clients, api_id).await?;

    println!("✅ Backend {} updated.", settings.api_name);
    Ok(BackendHandle {
        project_id: api_id.to_string(),
        name: settings.api_name.clone(),
        creation_time: info.creation_time.clone(),
        last_updated_time: now,
        console_url: console_url(&clients.region, api_id),
    })
}

async fn update_ddb_table(
    client: &aws_sdk_dynamodb::Client,
    spec: &TableSpec,
    remote_tables: &[TableSpec],
) -> Result<()> {
    let Some(current) = remote_tables
        .iter()
        .find(|r| r.table_name == spec.table_name)
    else {
        return Ok(());
    };

    if current.read_capacity_units != spec.read_capacity_units
        || current.write_capacity_units != spec.write_capacity_units
    {
        client
            .update_table()
            .table_name(&spec.table_name)
            .provisioned_throughput(
                ProvisionedThroughput::builder()
                    .read_capacity_units(spec.read_capacity_units)
                    .write_capacity_units(spec.write_capacity_units)
                    .build()
                    .with_context(|| {
                        format!("Invalid provisioned throughput on {}", spec.table_name)
                    })?,
            )
            .send()
            .await
            .with_context(|| format!("Failed to update dynamoDB table {}", spec.table_name))?;
        println!("✓ Updated throughput of table {}.", spec.table_name);
    }

    if current.attribute_definitions != spec.attribute_definitions
        || current.key_schema != spec.key_schema
    {
        println!(
            "⚠️ Table {} differs from the local spec in attributes or key schema; such changes require a manual table migration and were not applied.",
            spec.table_name
        );
    }

    Ok(())
}

async fn update_data_source(
    clients: &AwsClients,
    api_id: &str,
    data_source: &DataSourceSetting,
    role_arn: Option<&str>,
) -> Result<()> {
    let mut request = clients
        .appsync
        .update_data_source()
        .api_id(api_id)
        .name(&data_source.name)
        .r#type(DataSourceType::from(data_source.source_type.as_str()));
    if let Some(description) = &data_source.description {
        request = request.description(description);
    }
    if data_source.is_dynamodb() {
        if let (Some(table), Some(role_arn)) = (data_source.table.as_ref(), role_arn) {
            request = request.service_role_arn(role_arn).dynamodb_config(
                DynamodbDataSourceConfig::builder()
                    .table_name(&table.table_name)
                    .aws_region(&clients.region)
                    .use_caller_credentials(false)
                    .build()
                    .with_context(|| {
                        format!("Invalid dynamoDB config on data source {}", data_source.name)
                    })?,
            );
        }
    }

    request
        .send()
        .await
        .with_context(|| format!("Failed to update data source {}", data_source.name))?;
    println!("✓ Updated data source {}.", data_source.name);
    Ok(())
}
