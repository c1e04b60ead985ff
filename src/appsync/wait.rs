// backendtool/src/appsync/wait.rs
use aws_sdk_appsync::types::SchemaStatus;
use std::future::Future;
use std::time::Duration;

use crate::errors::AppError;

pub const WAIT_INTERVAL: Duration = Duration::from_secs(5);
pub const MAX_WAIT_ATTEMPTS: u32 = 100;

/// Polls `probe` at a fixed interval until it yields a value, the attempt
/// budget runs out, or it fails.
///
/// `probe` returns `Ok(Some(value))` when the awaited condition is met,
/// `Ok(None)` to keep waiting, and `Err` to stop immediately.
pub async fn wait_until<T, F, Fut>(
    interval: Duration,
    max_attempts: u32,
    mut probe: F,
) -> Result<T, AppError>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<Option<T>, AppError>>,
{
    for attempt in 1..=max_attempts {
        if let Some(value) = probe(attempt).await? {
            return Ok(value);
        }
        if attempt < max_attempts {
            tokio::time::sleep(interval).await;
        }
    }
    Err(AppError::WaitTimeout {
        attempts: max_attempts,
    })
}

/// Waits for an asynchronous schema-creation job to finish, checking its
/// status every five seconds up to the attempt limit.
pub async fn wait_for_schema_creation(
    client: &aws_sdk_appsync::Client,
    api_id: &str,
) -> Result<(), AppError> {
    wait_until(WAIT_INTERVAL, MAX_WAIT_ATTEMPTS, |attempt| {
        let client = client.clone();
        let api_id = api_id.to_string();
        async move {
            let response = client
                .get_schema_creation_status()
                .api_id(&api_id)
                .send()
                .await
                .map_err(|e| AppError::Backend(format!("schema status check failed: {}", e)))?;

            match response.status() {
                Some(SchemaStatus::Success) | Some(SchemaStatus::Active) => Ok(Some(())),
                Some(SchemaStatus::Failed) => Err(AppError::SchemaCreation(
                    response
                        .details()
                        .unwrap_or("no details reported")
                        .to_string(),
                )),
                _ => {
                    println!(
                        "⏳ Schema creation in progress (status check #{})...",
                        attempt
                    );
                    Ok(None)
                }
            }
        }
    })
    .await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_wait_until_returns_on_first_success() {
        let result = wait_until(Duration::from_millis(1), 3, |_| async { Ok(Some(42)) }).await;
        assert_eq!(result.unwrap(), 42);
    }

    #[tokio::test]
    async fn test_wait_until_retries_until_ready() {
        let result = wait_until(Duration::from_millis(1), 10, |attempt| async move {
            if attempt >= 4 {
                Ok(Some(attempt))
            } else {
                Ok(None)
            }
        })
        .await;
        assert_eq!(result.unwrap(), 4);
    }

    #[tokio::test]
    async fn test_wait_until_times_out() {
        let result: Result<(), AppError> =
            wait_until(Duration::from_millis(1), 2, |_| async { Ok(None) }).await;
        match result {
            Err(AppError::WaitTimeout { attempts }) => assert_eq!(attempts, 2),
            other => panic!("expected wait timeout, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_wait_until_propagates_probe_errors() {
        let result: Result<(), AppError> = wait_until(Duration::from_millis(1), 5, |_| async {
            Err(AppError::Backend("boom".to_string()))
        })
        .await;
        match result {
            Err(AppError::Backend(message)) => assert_eq!(message, "boom"),
            other => panic!("expected backend error, got {:?}", other),
        }
    }
}
