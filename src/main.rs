use anyhow::Context;
use dotenv::dotenv;
use gemchat::{api::GeminiClient, config::Config, logging::init_logging, ui::run_ui};
use log::{error, info};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();

    let config = Config::load().context("failed to load configuration")?;
    let _logger = init_logging(&config).context("failed to start logging")?;
    info!("loaded config: {:?}", config);

    let client = GeminiClient::new(&config);
    if let Err(e) = run_ui(&config, &client).await {
        error!("chat session aborted: {}", e);
        return Err(e).context("chat session aborted");
    }

    info!("chat session closed");
    Ok(())
}
