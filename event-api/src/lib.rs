pub mod api;
pub mod config;
pub mod fetch;
pub mod resolve;
pub mod retry;
pub mod types;

use crate::config::Config;
use crate::fetch::{EventFetcher, TracingObserver};
use std::sync::Arc;

#[derive(thiserror::Error, Debug)]
pub enum RunError {
    #[error("could not build http client: {0}")]
    Client(#[from] reqwest::Error),
    #[error("could not serve api: {0}")]
    Serve(#[from] api::ApiServeError),
    #[error("could not build runtime: {0}")]
    Runtime(#[from] std::io::Error),
}

pub fn run(config: Config) -> Result<(), RunError> {
    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    rt.block_on(run_async(config))
}

pub async fn run_async(config: Config) -> Result<(), RunError> {
    // One fetcher, and so one outbound client, for the life of the process.
    let fetcher = Arc::new(EventFetcher::new(
        &config.upstream,
        Arc::new(TracingObserver),
    )?);

    api::serve(config.listener, fetcher).await?;

    Ok(())
}
