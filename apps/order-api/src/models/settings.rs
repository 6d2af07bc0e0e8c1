use std::collections::BTreeMap;

use chrono::NaiveTime;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::error::FieldError;

/// ID of the singleton settings document.
pub const SETTINGS_ID: &str = "main_settings";

/// Opening hours for one weekday. Times are `HH:MM`, restaurant-local.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DailyHours {
    #[serde(default = "default_is_open")]
    pub is_open: bool,
    #[serde(default = "default_open_time")]
    pub open_time: String,
    #[serde(default = "default_close_time")]
    pub close_time: String,
}

fn default_is_open() -> bool {
    true
}

fn default_open_time() -> String {
    "11:00".to_string()
}

fn default_close_time() -> String {
    "22:00".to_string()
}

impl DailyHours {
    fn new(is_open: bool, open_time: &str, close_time: &str) -> Self {
        Self {
            is_open,
            open_time: open_time.to_string(),
            close_time: close_time.to_string(),
        }
    }
}

/// Restaurant-wide settings. Exactly one document exists, keyed `main_settings`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RestaurantSettings {
    pub id: String,
    /// Weekday (`"1"` = Monday … `"7"` = Sunday) → opening hours.
    pub hours: BTreeMap<String, DailyHours>,
}

impl Default for RestaurantSettings {
    fn default() -> Self {
        let mut hours = BTreeMap::new();
        for day in 1..=4 {
            hours.insert(day.to_string(), DailyHours::new(true, "11:00", "22:00"));
        }
        hours.insert("5".to_string(), DailyHours::new(true, "11:00", "23:00"));
        hours.insert("6".to_string(), DailyHours::new(true, "11:00", "23:00"));
        hours.insert("7".to_string(), DailyHours::new(false, "11:00", "22:00"));

        Self {
            id: SETTINGS_ID.to_string(),
            hours,
        }
    }
}

/// Check weekday keys and `HH:MM` times, collecting one error per bad field.
pub fn validate_hours(hours: &BTreeMap<String, DailyHours>) -> Vec<FieldError> {
    let mut errors = Vec::new();

    for (day, daily) in hours {
        if !matches!(day.parse::<u8>(), Ok(1..=7)) {
            errors.push(FieldError {
                field: format!("hours.{day}"),
                message: "Weekday must be between 1 (Monday) and 7 (Sunday)".to_string(),
            });
            continue;
        }
        for (name, value) in [("openTime", &daily.open_time), ("closeTime", &daily.close_time)] {
            if NaiveTime::parse_from_str(value, "%H:%M").is_err() {
                errors.push(FieldError {
                    field: format!("hours.{day}.{name}"),
                    message: "Time must use HH:MM format".to_string(),
                });
            }
        }
    }

    errors
}
