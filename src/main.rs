use spa_host::config::{HostConfig, DEFAULT_CONFIG_FILE};
use spa_host::pipeline::{self, AttachOptions, DevTooling, PipelineBuilder};
use spa_host::{logger, server};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| DEFAULT_CONFIG_FILE.to_string());
    let cfg = HostConfig::load_from(&config_path)?;
    logger::init(&cfg)?;

    let mut builder = PipelineBuilder::new();
    let options = AttachOptions {
        client_assembly_path: cfg.app.client_assembly_path.clone(),
    };
    let tooling = DevTooling::default();
    if let Err(e) = pipeline::attach(&mut builder, &options, &cfg.environment(), &tooling) {
        logger::log_error(&format!("Failed to attach client application: {e}"));
        return Err(e.into());
    }
    let pipeline = builder.build();

    // Create the Tokio runtime, sized by the workers setting
    let mut runtime_builder = tokio::runtime::Builder::new_multi_thread();
    runtime_builder.enable_all();

    if let Some(workers) = cfg.server.workers {
        runtime_builder.worker_threads(workers);
    }

    let runtime = runtime_builder.build()?;
    runtime.block_on(server::run(cfg, pipeline))?;
    Ok(())
}
