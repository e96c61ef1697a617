//! Current-weather tool backed by OpenWeatherMap.

use crate::{http_client, request_error, required_str};
use async_trait::async_trait;
use aura_config::WeatherConfig;
use aura_core::error::ToolError;
use aura_core::tool::{ExecutionContext, Tool};
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

const NAME: &str = "get_weather";

pub struct GetWeatherTool {
    config: WeatherConfig,
    timeout: Duration,
    client: reqwest::Client,
}

impl GetWeatherTool {
    pub fn new(config: WeatherConfig, timeout: Duration) -> Self {
        Self {
            config,
            timeout,
            client: http_client(timeout),
        }
    }
}

#[derive(Debug, Deserialize)]
struct WeatherResponse {
    main: MainReading,
    #[serde(default)]
    weather: Vec<Condition>,
}

#[derive(Debug, Deserialize)]
struct MainReading {
    temp: f64,
}

#[derive(Debug, Deserialize)]
struct Condition {
    description: String,
}

#[async_trait]
impl Tool for GetWeatherTool {
    fn name(&self) -> &str {
        NAME
    }

    fn description(&self) -> &str {
        "Get real weather for a city"
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "city": { "type": "string" }
            },
            "required": ["city"]
        })
    }

    async fn execute(
        &self,
        arguments: serde_json::Value,
        _ctx: &ExecutionContext,
    ) -> Result<serde_json::Value, ToolError> {
        let city = required_str(&arguments, "city")?;
        let api_key = self
            .config
            .api_key
            .as_deref()
            .ok_or_else(|| ToolError::NotConfigured {
                tool_name: NAME.into(),
                reason: "WEATHER_API_KEY is not set".into(),
            })?;

        debug!(tool = NAME, city, "Fetching weather");

        let url = format!(
            "{}/data/2.5/weather",
            self.config.base_url.trim_end_matches('/')
        );
        let response = self
            .client
            .get(&url)
            .query(&[("q", city), ("appid", api_key), ("units", "metric")])
            .send()
            .await
            .map_err(|e| request_error(NAME, self.timeout, e))?;

        // An unknown city is an answer for the model, not a failure.
        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(serde_json::json!(format!("No weather data found for {city}.")));
        }
        if !response.status().is_success() {
            return Err(ToolError::ExecutionFailed {
                tool_name: NAME.into(),
                reason: format!("weather API returned {}", response.status()),
            });
        }

        let body: WeatherResponse =
            response
                .json()
                .await
                .map_err(|e| ToolError::ExecutionFailed {
                    tool_name: NAME.into(),
                    reason: format!("unreadable weather response: {e}"),
                })?;

        let description = body
            .weather
            .first()
            .map(|c| c.description.as_str())
            .unwrap_or("no description");

        Ok(serde_json::Value::String(format!(
            "Weather in {city}: {}°C, {description}",
            body.main.temp
        )))
    }
}
