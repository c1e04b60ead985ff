// backendtool/src/init/setup.rs
use anyhow::Result;

use crate::backend::{BackendHandle, BackendService};
use crate::errors::AppError;
use crate::init::strategy::{InitContext, Strategy};

/// Dispatches the resolved strategy to exactly one backend operation.
/// With no strategy set this step carries out no functions.
pub async fn execute(
    ctx: &InitContext,
    service: &dyn BackendService,
) -> Result<Option<BackendHandle>> {
    match ctx.strategy {
        None => Ok(None),
        Some(Strategy::Create) => service.create_backend(&ctx.project_path).await.map(Some),
        Some(Strategy::Clone) => service.clone_backend(&ctx.project_path).await.map(Some),
        Some(Strategy::Link) => {
            let target = ctx.target_backend_id.as_deref().unwrap_or_default();
            if target.is_empty() {
                return Err(AppError::Backend(
                    "no target backend id is available for linking".to_string(),
                )
                .into());
            }
            service.link_backend(&ctx.project_path, target).await.map(Some)
        }
    }
}
