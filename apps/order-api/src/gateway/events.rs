//! Event types and wire format pushed to gateway connections.

use serde::Serialize;
use serde_json::{Map, Value};

use crate::models::order::Order;
use crate::models::settings::RestaurantSettings;

// ---------------------------------------------------------------------------
// Event names
// ---------------------------------------------------------------------------

/// Event names dispatched to clients.
pub struct EventName;

impl EventName {
    pub const MENU_UPDATE: &'static str = "MENU_UPDATE";
    pub const NEW_ORDER: &'static str = "NEW_ORDER";
    pub const ORDER_STATUS_UPDATE: &'static str = "ORDER_STATUS_UPDATE";
    pub const SETTINGS_UPDATED: &'static str = "SETTINGS_UPDATED";
}

// ---------------------------------------------------------------------------
// Event
// ---------------------------------------------------------------------------

/// A server → client event, serialized as `{"type": "...", ...fields}`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Event {
    #[serde(rename = "type")]
    pub event_type: String,
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl Event {
    /// A bare event with no fields beyond `type`.
    pub fn new(event_type: impl Into<String>) -> Self {
        Self {
            event_type: event_type.into(),
            fields: Map::new(),
        }
    }

    /// Attach a top-level field. A field named `type` is ignored.
    pub fn with(mut self, key: &str, value: Value) -> Self {
        if key != "type" {
            self.fields.insert(key.to_string(), value);
        }
        self
    }

    /// Signal clients to refetch the catalog.
    pub fn menu_update() -> Self {
        Self::new(EventName::MENU_UPDATE)
    }

    /// A freshly placed order, for the admin dashboards.
    pub fn new_order(order: &Order) -> Self {
        Self::new(EventName::NEW_ORDER).with("order", to_value(order))
    }

    /// An order whose status changed, for the customer who placed it.
    pub fn order_status_update(order: &Order) -> Self {
        Self::new(EventName::ORDER_STATUS_UPDATE).with("order", to_value(order))
    }

    pub fn settings_updated(settings: &RestaurantSettings) -> Self {
        Self::new(EventName::SETTINGS_UPDATED).with("settings", to_value(settings))
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

fn to_value<T: Serialize>(record: &T) -> Value {
    serde_json::to_value(record).unwrap_or_else(|err| {
        tracing::error!(?err, "failed to serialize event payload");
        Value::Null
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn bare_event_serializes_type_only() {
        let json: Value = serde_json::from_str(&Event::menu_update().to_json().unwrap()).unwrap();
        assert_eq!(json, json!({ "type": "MENU_UPDATE" }));
    }

    #[test]
    fn fields_are_flattened_next_to_type() {
        let event = Event::new(EventName::NEW_ORDER).with("order", json!({ "id": "o1" }));
        let json: Value = serde_json::from_str(&event.to_json().unwrap()).unwrap();
        assert_eq!(json, json!({ "type": "NEW_ORDER", "order": { "id": "o1" } }));
    }

    #[test]
    fn type_field_cannot_be_overridden() {
        let event = Event::menu_update().with("type", json!("SPOOFED"));
        let json: Value = serde_json::from_str(&event.to_json().unwrap()).unwrap();
        assert_eq!(json["type"], "MENU_UPDATE");
    }

    #[test]
    fn settings_event_carries_record() {
        let settings = RestaurantSettings::default();
        let json = serde_json::to_value(Event::settings_updated(&settings)).unwrap();
        assert_eq!(json["type"], "SETTINGS_UPDATED");
        assert_eq!(json["settings"]["id"], "main_settings");
        assert_eq!(json["settings"]["hours"]["7"]["isOpen"], false);
    }
}
