// backendtool/src/appsync/create.rs
use anyhow::{Context, Result};
use aws_sdk_appsync::primitives::Blob;
use aws_sdk_appsync::types::{AuthenticationType, DataSourceType, DynamodbDataSourceConfig};
use aws_sdk_dynamodb::types::{
    AttributeDefinition, KeySchemaElement, KeyType, ProvisionedThroughput, ScalarAttributeType,
};
use std::path::Path;
use uuid::Uuid;

use crate::appsync::diff::TableSpec;
use crate::appsync::manager::{self, AppSyncInfo, AppSyncSettings, DataSourceSetting};
use crate::appsync::{retrieve, role, wait};
use crate::backend::{AwsClients, BackendHandle, console_url};
use crate::config::AwsConfig;
use crate::errors::AppError;
use crate::project;

/// Creates a new backend from the project's feature spec.
pub async fn run(project_path: &Path, aws: &AwsConfig) -> Result<BackendHandle> {
    let settings =
        manager::get_settings(project_path).context("Failed to load the appsync feature settings")?;
    let api_name = settings.api_name.clone();
    run_pipeline(project_path, aws, settings, api_name).await
}

/// Creates a new backend based on the existing local spec, under a fresh
/// name so it cannot collide with the original.
pub async fn run_clone(project_path: &Path, aws: &AwsConfig) -> Result<BackendHandle> {
    let settings =
        manager::get_settings(project_path).context("Failed to load the appsync feature settings")?;
    let api_name = format!("{}-{}", settings.api_name, short_suffix());
    println!("🔄 Cloning the local backend spec into new backend {}...", api_name);
    run_pipeline(project_path, aws, settings, api_name).await
}

fn short_suffix() -> String {
    let id = Uuid::new_v4().simple().to_string();
    id[..8].to_string()
}

async fn run_pipeline(
    project_path: &Path,
    aws: &AwsConfig,
    settings: AppSyncSettings,
    api_name: String,
) -> Result<BackendHandle> {
    let schema = manager::get_schema(project_path).context("Failed to read the graphql schema")?;
    let clients = AwsClients::connect(aws).await;

    println!("🚀 Creating backend {}...", api_name);

    // DynamoDB tables back the data sources, so they come first.
    let mut table_arns = Vec::new();
    for data_source in &settings.data_sources {
        if data_source.is_dynamodb() {
            let table = data_source.table.as_ref().ok_or_else(|| {
                AppError::Backend(format!(
                    "data source {} has no table spec",
                    data_source.name
                ))
            })?;
            table_arns.push(ensure_ddb_table(&clients.dynamodb, table).await?);
        }
    }

    let role_arn = if settings.data_sources.iter().any(|d| d.is_dynamodb()) {
        let arn = role::ensure_service_role(&clients.iam, &api_name).await?;
        role::put_role_policy(&clients.iam, &api_name, &table_arns).await?;
        Some(arn)
    } else {
        None
    };

    let create_api_output = clients
        .appsync
        .create_graphql_api()
        .name(&api_name)
        .authentication_type(AuthenticationType::from(
            settings.authentication_type.as_str(),
        ))
        .send()
        .await
        .context("Failed to create the graphql api")?;
    let graphql_api = create_api_output
        .graphql_api()
        .ok_or_else(|| AppError::Backend("create_graphql_api returned no api".to_string()))?;
    let api_id = graphql_api.api_id().unwrap_or_default().to_string();
    let graphql_endpoint = graphql_api
        .uris()
        .and_then(|uris| uris.get("GRAPHQL"))
        .cloned()
        .unwrap_or_default();
    println!("✓ Created graphql api {} (api id: {}).", api_name, api_id);

    clients
        .appsync
        .start_schema_creation()
        .api_id(&api_id)
        .definition(Blob::new(schema.into_bytes()))
        .send()
        .await
        .context("Failed to start schema creation")?;
    wait::wait_for_schema_creation(&clients.appsync, &api_id).await?;
    println!("✓ Schema created.");

    for data_source in &settings.data_sources {
        create_data_source(&clients, &api_id, data_source, role_arn.as_deref()).await?;
    }

    for resolver in &settings.resolvers {
        let request = manager::get_mapping(project_path, &resolver.request_mapping_template)?;
        let response = manager::get_mapping(project_path, &resolver.response_mapping_template)?;
        clients
            .appsync
            .create_resolver()
            .api_id(&api_id)
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

    let api_key = if settings.authentication_type == manager::DEFAULT_AUTHENTICATION_TYPE {
        let output = clients
            .appsync
            .create_api_key()
            .api_id(&api_id)
            .send()
            .await
            .context("Failed to create the api key")?;
        output
            .api_key()
            .and_then(|key| key.id())
            .unwrap_or_default()
            .to_string()
    } else {
        String::new()
    };

    let now = project::now_timestamp();
    let info = AppSyncInfo {
        api_id: api_id.clone(),
        name: api_name.clone(),
        graphql_endpoint,
        region: clients.region.clone(),
        authentication_type: settings.authentication_type.clone(),
        api_key,
        creation_time: now.clone(),
        last_update_time: now.clone(),
        last_sync_time: now.clone(),
    };
    manager::update_appsync_info(project_path, &info)?;

    retrieve::sync_current_backend_info(project_path, &clients, &api_id).await?;

    println!("✅ Backend {} created.", api_name);
    Ok(BackendHandle {
        project_id: api_id.clone(),
        name: api_name,
        creation_time: now.clone(),
        last_updated_time: now,
        console_url: console_url(&clients.region, &api_id),
    })
}

/// Creates the table described by the spec, reusing it when it already
/// exists. Returns the table ARN.
pub(crate) async fn ensure_ddb_table(
    client: &aws_sdk_dynamodb::Client,
    spec: &TableSpec,
) -> Result<String> {
    if let Ok(existing) = client
        .describe_table()
        .table_name(&spec.table_name)
        .send()
        .await
    {
        if let Some(table) = existing.table() {
            println!("Table {} already exists, reusing it.", spec.table_name);
            return Ok(table.table_arn().unwrap_or_default().to_string());
        }
    }

    let mut attribute_definitions = Vec::new();
    for attr in &spec.attribute_definitions {
        attribute_definitions.push(
            AttributeDefinition::builder()
                .attribute_name(&attr.attribute_name)
                .attribute_type(ScalarAttributeType::from(attr.attribute_type.as_str()))
                .build()
                .with_context(|| format!("Invalid attribute definition on {}", spec.table_name))?,
        );
    }
    let mut key_schema = Vec::new();
    for key in &spec.key_schema {
        key_schema.push(
            KeySchemaElement::builder()
                .attribute_name(&key.attribute_name)
                .key_type(KeyType::from(key.key_type.as_str()))
                .build()
                .with_context(|| format!("Invalid key schema element on {}", spec.table_name))?,
        );
    }

    let output = client
        .create_table()
        .table_name(&spec.table_name)
        .set_attribute_definitions(Some(attribute_definitions))
        .set_key_schema(Some(key_schema))
        .provisioned_throughput(
            ProvisionedThroughput::builder()
                .read_capacity_units(spec.read_capacity_units)
                .write_capacity_units(spec.write_capacity_units)
                .build()
                .with_context(|| format!("Invalid provisioned throughput on {}", spec.table_name))?,
        )
        .send()
        .await
        .with_context(|| format!("Failed to create dynamoDB table {}", spec.table_name))?;

    println!("✓ Created dynamoDB table {}.", spec.table_name);
    Ok(output
        .table_description()
        .and_then(|t| t.table_arn())
        .unwrap_or_default()
        .to_string())
}

pub(crate) async fn create_data_source(
    clients: &AwsClients,
    api_id: &str,
    data_source: &DataSourceSetting,
    role_arn: Option<&str>,
) -> Result<()> {
    let mut request = clients
        .appsync
        .create_data_source()
        .api_id(api_id)
        .name(&data_source.name)
        .r#type(DataSourceType::from(data_source.source_type.as_str()));
    if let Some(description) = &data_source.description {
        request = request.description(description);
    }
    if data_source.is_dynamodb() {
        let table = data_source.table.as_ref().ok_or_else(|| {
            AppError::Backend(format!(
                "data source {} has no table spec",
                data_source.name
            ))
        })?;
        let role_arn = role_arn.ok_or_else(|| {
            AppError::Backend(format!(
                "no service role available for data source {}",
                data_source.name
            ))
        })?;
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

    request
        .send()
        .await
        .with_context(|| format!("Failed to create data source {}", data_source.name))?;
    println!("✓ Created data source {}.", data_source.name);
    Ok(())
}
