use clap::Parser;
use contact_backend::utils::{logger, validation::Validate};
use contact_backend::{Application, ServerArgs};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = ServerArgs::parse();

    let config = match args.load_config() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ Configuration could not be loaded: {}", e);
            std::process::exit(1);
        }
    };

    // Logger must be installed before validation reports errors.
    logger::init_logger(config.server.debug, config.server.json_logs);

    tracing::info!("Starting contact-backend");
    tracing::debug!("Config: {:?}", config);

    // Fail fast on misconfiguration.
    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        eprintln!("❌ {}", e);
        std::process::exit(1);
    }

    let app = match Application::build(config) {
        Ok(app) => app,
        Err(e) => {
            tracing::error!("❌ Initialization failed: {}", e);
            std::process::exit(1);
        }
    };

    app.run().await?;

    tracing::info!("✅ Shutdown complete");
    Ok(())
}
