//! Tools with typed arguments.

use crate::arguments;
use mcpmux_core::types::{CallToolResult, Tool};
use mcpmux_server::{Server, ServerBuilder};
use schemars::JsonSchema;
use serde::Deserialize;

/// Arguments of `sum`.
#[derive(Debug, Deserialize, JsonSchema)]
pub struct SumArgs {
    /// First addend.
    pub a: i64,
    /// Second addend.
    pub b: i64,
}

/// Arguments of `get_weather`.
#[derive(Debug, Deserialize, JsonSchema)]
pub struct WeatherArgs {
    /// City to report on.
    pub city: String,
    /// `celsius` or `fahrenheit`.
    #[serde(default = "default_unit")]
    pub unit: String,
}

fn default_unit() -> String {
    "celsius".to_string()
}

/// Canned report; a real server would call a weather API here.
fn weather_report(city: &str, unit: &str) -> String {
    let symbol: String = unit.chars().take(1).flat_map(char::to_uppercase).collect();
    format!("Weather in {city}: 22degrees{symbol}")
}

/// The "Tool Example" server.
#[must_use]
pub fn server() -> Server {
    ServerBuilder::new("Tool Example", env!("CARGO_PKG_VERSION"))
        .tool(
            Tool::new("sum")
                .description("Add two numbers together.")
                .schema_for::<SumArgs>(),
            |args, _| async move {
                let SumArgs { a, b } = arguments("sum", args)?;
                Ok(CallToolResult::text((a + b).to_string()))
            },
        )
        .tool(
            Tool::new("get_weather")
                .description("Get weather for a city.")
                .schema_for::<WeatherArgs>(),
            |args, _| async move {
                let args: WeatherArgs = arguments("get_weather", args)?;
                Ok(CallToolResult::text(weather_report(&args.city, &args.unit)))
            },
        )
        .build()
}
