//! `aura config`: configuration file management.

use aura_config::AppConfig;

fn config_path() -> std::path::PathBuf {
    AppConfig::config_dir().join("config.toml")
}

pub async fn path() -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", config_path().display());
    Ok(())
}

pub async fn init() -> Result<(), Box<dyn std::error::Error>> {
    let path = config_path();
    if path.exists() {
        println!("Config already exists at {}", path.display());
        return Ok(());
    }
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir)?;
    }
    std::fs::write(&path, AppConfig::default_toml())?;
    println!("Wrote default config to {}", path.display());
    Ok(())
}

pub async fn validate() -> Result<(), Box<dyn std::error::Error>> {
    println!("Validating configuration...");

    match AppConfig::load() {
        Ok(config) => {
            println!("   Config parsed successfully");

            let mut warnings = Vec::new();
            if !config.has_api_key() {
                warnings.push("No API key set (set GROQ_API_KEY or AURA_API_KEY)".to_string());
            }
            if config.tools.weather.api_key.is_none() {
                warnings.push("get_weather has no key (WEATHER_API_KEY)".to_string());
            }
            if config.tools.search.api_key.is_none() {
                warnings.push("search_web has no key (TAVILY_API_KEY)".to_string());
            }
            if config.tools.email.api_key.is_none() || config.tools.email.from.is_none() {
                warnings.push("send_email needs EMAIL_API_KEY and EMAIL_FROM".to_string());
            }
            if config.gateway.host == "0.0.0.0" && config.gateway.cors_origin.is_none() {
                warnings.push("Gateway bound to 0.0.0.0 with CORS open to any origin".to_string());
            }

            if warnings.is_empty() {
                println!("   All checks passed");
            } else {
                println!();
                for w in &warnings {
                    println!("   warning: {w}");
                }
            }

            println!();
            println!("   Provider:  {}", config.provider);
            println!("   Model:     {}", config.model);
            println!("   Max steps: {}", config.agent.max_steps);
            println!(
                "   Context:   {} messages, {} tokens",
                config.context.max_messages, config.context.token_budget
            );
            println!("   Gateway:   {}:{}", config.gateway.host, config.gateway.port);
        }
        Err(e) => {
            println!("   Config error: {e}");
            return Err(e.into());
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    #[test]
    fn config_path_is_valid() {
        let path = super::config_path();
        assert!(path.to_str().unwrap().contains("config.toml"));
        assert!(path.to_str().unwrap().contains(".aura"));
    }
}
