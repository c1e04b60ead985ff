// backendtool/src/appsync/retrieve.rs
use anyhow::{Context, Result};
use aws_sdk_appsync::types::{DataSource, OutputType, TypeDefinitionFormat};
use std::path::Path;

use crate::appsync::diff;
use crate::appsync::manager::{
    self, ApiKeyRecord, DataSourceRecord, GraphqlApiRecord, ResolverRecord,
};
use crate::backend::{AwsClients, BackendHandle, console_url};
use crate::config::AwsConfig;
use crate::errors::AppError;
use crate::project;

/// Retrieves the remote backend identified by `api_id` and mirrors it into
/// the current-backend info store.
pub async fn run(project_path: &Path, aws: &AwsConfig, api_id: &str) -> Result<BackendHandle> {
    let clients = AwsClients::connect(aws).await;
    println!("🔄 Retrieving backend details for api id {}...", api_id);
    let handle = sync_current_backend_info(project_path, &clients, api_id).await?;
    println!("✅ Current backend info synchronized.");
    Ok(handle)
}

pub(crate) async fn sync_current_backend_info(
    project_path: &Path,
    clients: &AwsClients,
    api_id: &str,
) -> Result<BackendHandle> {
    let api_output = clients
        .appsync
        .get_graphql_api()
        .api_id(api_id)
        .send()
        .await
        .with_context(|| format!("Failed to retrieve graphql api {}", api_id))?;
    let api = api_output
        .graphql_api()
        .ok_or_else(|| AppError::Backend(format!("no graphql api found with id {}", api_id)))?;

    let name = api.name().unwrap_or_default().to_string();
    let authentication_type = api
        .authentication_type()
        .map(|t| t.as_str().to_string())
        .unwrap_or_default();
    let graphql_endpoint = api
        .uris()
        .and_then(|uris| uris.get("GRAPHQL"))
        .cloned()
        .unwrap_or_default();

    let api_record = GraphqlApiRecord {
        api_id: api_id.to_string(),
        name: name.clone(),
        authentication_type: authentication_type.clone(),
        graphql_endpoint: graphql_endpoint.clone(),
    };

    // A freshly linked api may not have a schema yet; that is not fatal.
    let schema = match clients
        .appsync
        .get_introspection_schema()
        .api_id(api_id)
        .format(OutputType::Sdl)
        .send()
        .await
    {
        Ok(output) => output
            .schema()
            .map(|blob| String::from_utf8_lossy(blob.as_ref()).to_string())
            .unwrap_or_default(),
        Err(e) => {
            eprintln!("⚠️ Could not retrieve the schema: {}", e);
            String::new()
        }
    };

    let ds_output = clients
        .appsync
        .list_data_sources()
        .api_id(api_id)
        .send()
        .await
        .context("Failed to list data sources")?;
    let mut data_sources = Vec::new();
    for data_source in ds_output.data_sources() {
        data_sources.push(dress_remote_data_source(clients, data_source).await);
    }

    let mut resolvers = Vec::new();
    let types_output = clients
        .appsync
        .list_types()
        .api_id(api_id)
        .format(TypeDefinitionFormat::Sdl)
        .send()
        .await
        .context("Failed to list schema types")?;
    for schema_type in types_output.types() {
        let type_name = schema_type.name().unwrap_or_default();
        if type_name.is_empty() {
            continue;
        }
        let resolvers_output = clients
            .appsync
            .list_resolvers()
            .api_id(api_id)
            .type_name(type_name)
            .send()
            .await
            .with_context(|| format!("Failed to list resolvers for type {}", type_name))?;
        for resolver in resolvers_output.resolvers() {
            resolvers.push(ResolverRecord {
                type_name: resolver.type_name().unwrap_or_default().to_string(),
                field_name: resolver.field_name().unwrap_or_default().to_string(),
                data_source_name: resolver.data_source_name().unwrap_or_default().to_string(),
                request_mapping_template: resolver
                    .request_mapping_template()
                    .unwrap_or_default()
                    .to_string(),
                response_mapping_template: resolver
                    .response_mapping_template()
                    .unwrap_or_default()
                    .to_string(),
            });
        }
    }

    let keys_output = clients
        .appsync
        .list_api_keys()
        .api_id(api_id)
        .send()
        .await
        .context("Failed to list api keys")?;
    let api_keys: Vec<ApiKeyRecord> = keys_output
        .api_keys()
        .iter()
        .map(|key| ApiKeyRecord {
            id: key.id().unwrap_or_default().to_string(),
            description: key.description().map(str::to_string),
        })
        .collect();

    manager::write_current_backend_info(
        project_path,
        &api_record,
        &data_sources,
        &resolvers,
        &api_keys,
        &schema,
    )?;

    let now = project::now_timestamp();
    let mut info = manager::get_appsync_info(project_path).unwrap_or_default();
    info.api_id = api_id.to_string();
    info.name = name.clone();
    info.graphql_endpoint = graphql_endpoint;
    info.region = clients.region.clone();
    info.authentication_type = authentication_type;
    if let Some(key) = api_keys.first() {
        info.api_key = key.id.clone();
    }
    if info.creation_time.is_empty() {
        info.creation_time = now.clone();
    }
    info.last_sync_time = now;
    manager::update_appsync_info(project_path, &info)?;

    Ok(BackendHandle {
        project_id: api_id.to_string(),
        name,
        creation_time: info.creation_time.clone(),
        last_updated_time: info.last_update_time.clone(),
        console_url: console_url(&clients.region, api_id),
    })
}

async fn dress_remote_data_source(clients: &AwsClients, data_source: &DataSource) -> DataSourceRecord {
    let source_type = data_source
        .r#type()
        .map(|t| t.as_str().to_string())
        .unwrap_or_default();

    let mut table = None;
    if source_type == manager::DATA_SOURCE_TYPE_DYNAMODB {
        if let Some(config) = data_source.dynamodb_config() {
            match clients
                .dynamodb
                .describe_table()
                .table_name(config.table_name())
                .send()
                .await
            {
                Ok(output) => {
                    if let Some(description) = output.table() {
                        table = Some(diff::dress_table(description));
                    }
                }
                Err(e) => {
                    eprintln!("⚠️ Could not describe table {}: {}", config.table_name(), e)
                }
            }
        }
    }

    DataSourceRecord {
        name: data_source.name().unwrap_or_default().to_string(),
        description: data_source.description().map(str::to_string),
        source_type,
        service_role_arn: diff::MANAGED_BY_TOOL.to_string(),
        table,
    }
}
