//! A tool that asks the user to pick another date when the first is full.

use crate::arguments;
use mcpmux_core::types::{CallToolResult, ElicitRequest, Tool};
use mcpmux_server::{Server, ServerBuilder};
use schemars::JsonSchema;
use serde::Deserialize;

/// The only fully booked date.
const FULLY_BOOKED: &str = "2024-12-25";

/// Arguments of `book_table`.
#[derive(Debug, Deserialize, JsonSchema)]
pub struct BookingArgs {
    /// Date as YYYY-MM-DD.
    pub date: String,
    /// Time as HH:MM.
    pub time: String,
    /// Number of guests.
    pub party_size: u32,
}

/// What the user is asked for when the requested date is full.
#[derive(Debug, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct BookingPreferences {
    /// Would you like to check another date?
    pub check_alternative: bool,
    /// Alternative date (YYYY-MM-DD)
    #[serde(default = "default_alternative")]
    pub alternative_date: String,
}

fn default_alternative() -> String {
    "2024-12-26".to_string()
}

/// The "Elicitation Example" server.
#[must_use]
pub fn server() -> Server {
    ServerBuilder::new("Elicitation Example", env!("CARGO_PKG_VERSION"))
        .tool(
            Tool::new("book_table")
                .description("Book a table with date availability check.")
                .schema_for::<BookingArgs>(),
            |args, ctx| async move {
                let booking: BookingArgs = arguments("book_table", args)?;
                if booking.date != FULLY_BOOKED {
                    return Ok(CallToolResult::text(format!(
                        "[SUCCESS] Booked for {} at {}",
                        booking.date, booking.time
                    )));
                }

                let request = ElicitRequest::for_type::<BookingPreferences>(format!(
                    "No tables available for {} on {}. Would you like to try another date?",
                    booking.party_size, booking.date
                ))?;
                let answer = ctx.elicit(request).await?;
                let text = match answer.accepted::<BookingPreferences>()? {
                    Some(prefs) if prefs.check_alternative => {
                        format!("[SUCCESS] Booked for {}", prefs.alternative_date)
                    }
                    Some(_) => "[CANCELLED] No booking made".to_string(),
                    None => "[CANCELLED] Booking cancelled".to_string(),
                };
                Ok(CallToolResult::text(text))
            },
        )
        .build()
}
