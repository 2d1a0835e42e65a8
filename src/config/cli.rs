use crate::config::AppConfig;
use crate::utils::error::Result;
use clap::Parser;
use std::path::PathBuf;

#[derive(Debug, Clone, Parser)]
#[command(name = "contact-backend")]
#[command(about = "Contact form backend: static frontend, public config and form submissions")]
pub struct ServerArgs {
    #[arg(long, help = "TOML configuration file (environment variables are used when omitted)")]
    pub config: Option<PathBuf>,

    #[arg(long, help = "Override the listen port")]
    pub port: Option<u16>,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Emit logs as JSON lines")]
    pub json_logs: bool,
}

impl ServerArgs {
    pub fn load_config(&self) -> Result<AppConfig> {
        let mut config = match &self.config {
            Some(path) => AppConfig::from_file(path)?,
            None => AppConfig::from_env()?,
        };

        if let Some(port) = self.port {
            config.server.port = port;
        }
        config.server.debug |= self.verbose;
        config.server.json_logs |= self.json_logs;

        Ok(config)
    }
}
