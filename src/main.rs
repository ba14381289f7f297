// src/main.rs

use color_eyre::eyre::Result;

use aegis_rs_assessor::config::AppConfig;
use aegis_rs_assessor::{logging, start_server};

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    logging::initialize_logging()?;

    let config = AppConfig::from_env();
    start_server(config).await
}
