//! `aura tools`: list the tools the assistant can call.

use std::sync::Arc;

use aura_config::AppConfig;
use aura_tools::TaskStore;

pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?;
    let registry = aura_tools::default_registry(&config.tools, Arc::new(TaskStore::new()));

    println!("Available tools ({})", registry.len());
    println!();
    for def in registry.definitions() {
        println!("  {:<14} {}", def.name, def.description);
        if let Some(required) = def.parameters["required"].as_array() {
            let names: Vec<&str> = required.iter().filter_map(|v| v.as_str()).collect();
            if !names.is_empty() {
                println!("  {:<14} requires: {}", "", names.join(", "));
            }
        }
    }
    println!();
    println!("  Per-call timeout: {}s", config.tools.timeout_secs);

    Ok(())
}
