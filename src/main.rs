use convert_bucket::handler::{build_dispatcher, function_handler};
use convert_bucket::load_config::load_config;
use lambda_runtime::{run, service_fn, Error};

#[tokio::main]
async fn main() -> Result<(), Error> {
    convert_bucket::init_tracing();
    tracing::info!("Cold start: tracing initialised");

    let config = load_config()?;
    config.trace_loaded();

    let dispatcher = build_dispatcher(&config).await?;
    dispatcher.config().trace_loaded();

    run(service_fn(|event| function_handler(event, &dispatcher))).await
}
