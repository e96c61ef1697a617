//! `aura gateway`: start the HTTP API server.

use aura_config::AppConfig;

pub async fn run(port_override: Option<u16>) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?;

    if let Some(port) = port_override {
        config.gateway.port = port;
    }

    println!("Aura Gateway");
    println!("   Listening: http://{}:{}", config.gateway.host, config.gateway.port);
    println!("   Provider:  {} ({})", config.provider, config.model);
    if !config.has_api_key() {
        println!("   API key:   missing, chat answers with the fallback reply");
    }

    aura_gateway::start(config).await?;

    Ok(())
}
