use anyhow::Result;
use backend::usecases::generation::{GenerationUseCase, ImageEditGateway};
use domain::repositories::{
    assets::AssetRepository, credits::CreditRepository,
    generation_jobs::GenerationJobRepository, storage::StorageClient,
    usage_counters::UsageCounterRepository,
};
use std::{sync::Arc, time::Duration};
use tracing::{error, info};

/// Polls for queued jobs and drains them one at a time. An empty queue or a
/// processing error backs off for one poll interval; a drained job loops
/// straight into the next poll.
pub async fn run_worker_loop<J, A, U, C, St, G>(
    generation_usecase: Arc<GenerationUseCase<J, A, U, C, St, G>>,
    poll_interval: Duration,
) -> Result<()>
where
    J: GenerationJobRepository + Send + Sync + 'static,
    A: AssetRepository + Send + Sync + 'static,
    U: UsageCounterRepository + Send + Sync + 'static,
    C: CreditRepository + Send + Sync + 'static,
    St: StorageClient + Send + Sync + 'static,
    G: ImageEditGateway + Send + Sync + 'static,
{
    info!(poll_interval_secs = poll_interval.as_secs(), "Generation worker started");

    loop {
        match generation_usecase.process_next_job().await {
            Ok(true) => {}
            Ok(false) => tokio::time::sleep(poll_interval).await,
            Err(e) => {
                error!("Error while processing generation job: {}", e);
                tokio::time::sleep(poll_interval).await;
            }
        }
    }
}
