// backendtool/src/backend/mod.rs
use anyhow::Result;
use async_trait::async_trait;
use aws_sdk_appsync::config::{BehaviorVersion, Credentials, Region};
use std::path::Path;

use crate::appsync;
use crate::config::AwsConfig;

/// Details of the remote backend an operation established or refreshed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BackendHandle {
    pub project_id: String,
    pub name: String,
    pub creation_time: String,
    pub last_updated_time: String,
    pub console_url: String,
}

/// Remote backend management operations.
///
/// The init decision flow only talks to this trait; the AWS wiring lives
/// behind it so the selector and executor stay transport-free.
#[async_trait]
pub trait BackendService {
    /// Creates a new backend from the project's local feature spec.
    async fn create_backend(&self, project_path: &Path) -> Result<BackendHandle>;
    /// Creates a new backend based on the existing local spec, under a fresh
    /// name.
    async fn clone_backend(&self, project_path: &Path) -> Result<BackendHandle>;
    /// Associates the project with an existing remote backend.
    async fn link_backend(&self, project_path: &Path, backend_id: &str) -> Result<BackendHandle>;
}

/// SDK clients for the services the tool drives, built once per operation.
pub struct AwsClients {
    pub appsync: aws_sdk_appsync::Client,
    pub dynamodb: aws_sdk_dynamodb::Client,
    pub iam: aws_sdk_iam::Client,
    pub region: String,
}

impl AwsClients {
    pub async fn connect(aws: &AwsConfig) -> AwsClients {
        let sdk_config = aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(aws.region.clone()))
            .credentials_provider(Credentials::new(
                &aws.access_key_id,
                &aws.secret_access_key,
                None,     // session_token
                None,     // expiry
                "Static", // provider_name
            ))
            .load()
            .await;

        AwsClients {
            appsync: aws_sdk_appsync::Client::new(&sdk_config),
            dynamodb: aws_sdk_dynamodb::Client::new(&sdk_config),
            iam: aws_sdk_iam::Client::new(&sdk_config),
            region: aws.region.clone(),
        }
    }
}

pub fn console_url(region: &str, api_id: &str) -> String {
    format!(
        "https://console.aws.amazon.com/appsync/home?region={}#/{}/v1/home",
        region, api_id
    )
}

/// The concrete backend service driving AppSync, DynamoDB and IAM.
pub struct AwsBackendService {
    aws_config: AwsConfig,
}

impl AwsBackendService {
    pub fn new(aws_config: AwsConfig) -> Self {
        AwsBackendService { aws_config }
    }
}

#[async_trait]
impl BackendService for AwsBackendService {
    async fn create_backend(&self, project_path: &Path) -> Result<BackendHandle> {
        appsync::create::run(project_path, &self.aws_config).await
    }

    async fn clone_backend(&self, project_path: &Path) -> Result<BackendHandle> {
        appsync::create::run_clone(project_path, &self.aws_config).await
    }

    async fn link_backend(&self, project_path: &Path, backend_id: &str) -> Result<BackendHandle> {
        appsync::retrieve::run(project_path, &self.aws_config, backend_id).await
    }
}
