use lambda_runtime::{run, service_fn, Error, LambdaEvent};
use reelscout_shared::config::Config;
use reelscout_shared::AppState;
use serde_json::Value;
use std::sync::Arc;

mod invoke_handler;

#[tokio::main]
async fn main() -> Result<(), Error> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .with_target(false)
        .without_time()
        .init();

    let config = Config::from_env().map_err(|e| {
        tracing::error!("Invalid configuration: {}", e);
        e
    })?;
    let state = AppState::from_config(&config).await;

    run(service_fn(move |event: LambdaEvent<Value>| {
        let state = Arc::clone(&state);
        async move { invoke_handler::function_handler(event, state).await }
    }))
    .await
}
